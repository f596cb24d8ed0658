//! Point colours and the pressure-keyed gradients used by the chart.
//!
//! Every gradient is a straight per-channel RGB interpolation between two
//! fixed endpoints, keyed on average pressure normalised into `[0, 1]`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pressure value at which every gradient saturates.
pub const PRESSURE_SATURATION: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{}", hex::encode([self.r, self.g, self.b]))
    }

    /// CSS functional notation, e.g. `rgb(244, 63, 94)`.
    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Named palette endpoints.
pub mod palette {
    use super::{Gradient, Rgb};

    /// Muted slate for the baseline cloud and faded points (`#334155`).
    pub const SLATE: Rgb = Rgb::new(51, 65, 85);
    /// Indigo accent for the act-2 fracture bands (`#6366f1`).
    pub const INDIGO: Rgb = Rgb::new(99, 102, 241);
    /// Light indigo for the elite tier (`#818cf8`).
    pub const LIGHT_INDIGO: Rgb = Rgb::new(129, 140, 248);

    pub const RESISTANCE: Gradient = Gradient::new(Rgb::new(244, 63, 94), Rgb::new(127, 29, 29));
    pub const ANCHOR: Gradient = Gradient::new(Rgb::new(16, 185, 129), Rgb::new(52, 211, 153));
    pub const BASE: Gradient = Gradient::new(Rgb::new(99, 102, 241), Rgb::new(14, 165, 233));
}

/// Maps average pressure into `[0, 1]`; values past saturation clamp to 1.
pub fn normalize_pressure(avg_pressure: f64) -> f64 {
    if avg_pressure.is_nan() {
        return 0.0;
    }
    (avg_pressure / PRESSURE_SATURATION).clamp(0.0, 1.0)
}

fn lerp_channel(c0: u8, c1: u8, p: f64) -> u8 {
    let c0 = c0 as f64;
    let c1 = c1 as f64;
    (c0 + (c1 - c0) * p).floor().clamp(0.0, 255.0) as u8
}

/// Two-stop linear gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gradient {
    pub start: Rgb,
    pub end: Rgb,
}

impl Gradient {
    pub const fn new(start: Rgb, end: Rgb) -> Self {
        Self { start, end }
    }

    /// Channel-wise `floor(c0 + (c1 - c0) * p)`; `p` is clamped to `[0, 1]`.
    pub fn at(&self, p: f64) -> Rgb {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        Rgb::new(
            lerp_channel(self.start.r, self.end.r, p),
            lerp_channel(self.start.g, self.end.g, p),
            lerp_channel(self.start.b, self.end.b, p),
        )
    }

    pub fn at_pressure(&self, avg_pressure: f64) -> Rgb {
        self.at(normalize_pressure(avg_pressure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_saturates_and_floors() {
        assert_eq!(normalize_pressure(0.0), 0.0);
        assert!((normalize_pressure(1.0) - 0.4).abs() < 1e-12);
        assert_eq!(normalize_pressure(2.5), 1.0);
        assert_eq!(normalize_pressure(7.0), 1.0);
        assert_eq!(normalize_pressure(-1.0), 0.0);
        assert_eq!(normalize_pressure(f64::NAN), 0.0);
    }

    #[test]
    fn gradient_hits_endpoints_exactly() {
        let g = palette::RESISTANCE;
        assert_eq!(g.at(0.0), g.start);
        assert_eq!(g.at(1.0), g.end);
        assert_eq!(g.at(3.0), g.end);
        assert_eq!(g.at(-3.0), g.start);
    }

    #[test]
    fn gradient_floors_each_channel() {
        // 16 + 36*0.4 = 30.4, 185 + 26*0.4 = 195.4, 129 + 24*0.4 = 138.6
        assert_eq!(palette::ANCHOR.at(0.4), Rgb::new(30, 195, 138));
        // Descending channels floor downwards: 244 - 117*0.5 = 185.5
        assert_eq!(palette::RESISTANCE.at(0.5).r, 185);
    }

    #[test]
    fn hex_notation_matches_palette() {
        assert_eq!(palette::SLATE.to_hex(), "#334155");
        assert_eq!(palette::LIGHT_INDIGO.to_hex(), "#818cf8");
        assert_eq!(palette::INDIGO.to_hex(), "#6366f1");
        assert_eq!(Rgb::new(0, 6, 23).to_hex(), "#000617");
    }

    #[test]
    fn css_notation() {
        assert_eq!(Rgb::new(244, 63, 94).to_css(), "rgb(244, 63, 94)");
    }
}
