pub mod color;
pub mod data;
pub mod logging;
pub mod narrative;
pub mod record;
pub mod session;
pub mod state;
pub mod strategy;
pub mod view;
pub mod zone;
