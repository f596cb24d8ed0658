//! Derived view: which innings to plot for the current act, and how.
//!
//! [`derive_view`] is pure and recomputes everything from scratch. Calling it
//! twice with the same inputs yields equal views (and equal [`view_hash`]es).

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::record::{Dataset, InningsRecord};
use crate::state::{FilterConfig, StoryAct, StoryState};
use crate::strategy::{ActStrategy, ViewStrategy, VisualStyle};
use crate::zone::{is_anchor, shows_zone_overlay};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledPoint<'a> {
    pub record: &'a InningsRecord,
    pub style: VisualStyle,
    pub anchor: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedView<'a> {
    /// Raw act ordinal the view was derived for (may be out of range).
    pub act: u8,
    pub strategy: &'static str,
    pub zone_overlay: bool,
    pub points: Vec<StyledPoint<'a>>,
}

impl<'a> DerivedView<'a> {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn anchors(&self) -> usize {
        self.points.iter().filter(|p| p.anchor).count()
    }

    pub fn summary(&self, dataset_len: usize) -> ViewSummary {
        ViewSummary {
            act: self.act,
            strategy: self.strategy,
            total: dataset_len,
            shown: self.len(),
            anchors: self.anchors(),
            zone_overlay: self.zone_overlay,
            hash: view_hash(self),
        }
    }
}

/// Compact description of a view, for logs and CLI output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSummary {
    pub act: u8,
    pub strategy: &'static str,
    pub total: usize,
    pub shown: usize,
    pub anchors: usize,
    pub zone_overlay: bool,
    pub hash: String,
}

pub fn derive_view<'a>(dataset: &'a Dataset, act: u8, filters: &FilterConfig) -> DerivedView<'a> {
    let strategy = ViewStrategy::for_ordinal(act);
    let points = strategy
        .select(dataset, filters)
        .into_iter()
        .map(|record| StyledPoint {
            record,
            style: strategy.style(record, filters),
            anchor: is_anchor(record.runs, record.impact),
        })
        .collect();
    DerivedView {
        act,
        strategy: strategy.id(),
        zone_overlay: StoryAct::from_ordinal(act)
            .map(|a| shows_zone_overlay(a, filters))
            .unwrap_or(false),
        points,
    }
}

pub fn derive_for_state<'a>(dataset: &'a Dataset, state: &StoryState) -> DerivedView<'a> {
    derive_view(dataset, state.act.ordinal(), &state.filters)
}

/// SHA-256 over the serialized view; stable across runs for equal views.
pub fn view_hash(view: &DerivedView<'_>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(view).unwrap_or_default());
    hex::encode(hasher.finalize())
}
