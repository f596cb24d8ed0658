// View strategies: one per narrative act, all behind the same
// (dataset, filters) -> selection + per-record style shape.

use serde::Serialize;

use crate::color::{normalize_pressure, palette, Rgb};
use crate::record::{Dataset, InningsRecord};
use crate::state::{FilterConfig, StoryAct};
use crate::zone::is_anchor;

/// Size of the elite tier kept when `show_top100` is on.
pub const TOP_TIER_SIZE: usize = 100;

/// Run bands highlighted in the fracture act, inclusive on both ends.
pub const FRACTURE_BANDS: [(u32, u32); 3] = [(29, 31), (49, 51), (98, 102)];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualStyle {
    pub fill: Rgb,
    pub opacity: f64,
    pub radius: f64,
}

impl VisualStyle {
    pub const fn new(fill: Rgb, opacity: f64, radius: f64) -> Self {
        Self { fill, opacity, radius }
    }
}

/// Undifferentiated slate dot; also the style for any act without its own rule.
pub const FALLBACK_STYLE: VisualStyle = VisualStyle::new(palette::SLATE, 0.1, 2.0);
const FADED_STYLE: VisualStyle = VisualStyle::new(palette::SLATE, 0.04, 1.5);
const FRACTURE_STYLE: VisualStyle = VisualStyle::new(palette::INDIGO, 0.6, 2.5);
const ELITE_STYLE: VisualStyle = VisualStyle::new(palette::LIGHT_INDIGO, 0.8, 6.0);

pub trait ActStrategy {
    fn id(&self) -> &'static str;

    /// Records to plot, in display order.
    fn select<'a>(&self, dataset: &'a Dataset, filters: &FilterConfig) -> Vec<&'a InningsRecord>;

    fn style(&self, record: &InningsRecord, filters: &FilterConfig) -> VisualStyle;
}

/// Act 1: a fixed half of the cloud (even indices), all in muted slate.
#[derive(Debug, Clone, Copy)]
pub struct Orientation;

impl ActStrategy for Orientation {
    fn id(&self) -> &'static str {
        "orientation"
    }

    fn select<'a>(&self, dataset: &'a Dataset, _filters: &FilterConfig) -> Vec<&'a InningsRecord> {
        dataset.iter().step_by(2).collect()
    }

    fn style(&self, _record: &InningsRecord, _filters: &FilterConfig) -> VisualStyle {
        FALLBACK_STYLE
    }
}

/// Act 2: round-number run totals, same volume with very different impact.
#[derive(Debug, Clone, Copy)]
pub struct Fracture;

pub fn in_fracture_band(runs: u32) -> bool {
    FRACTURE_BANDS.iter().any(|&(lo, hi)| runs >= lo && runs <= hi)
}

impl ActStrategy for Fracture {
    fn id(&self) -> &'static str {
        "fracture"
    }

    fn select<'a>(&self, dataset: &'a Dataset, _filters: &FilterConfig) -> Vec<&'a InningsRecord> {
        dataset.iter().filter(|r| in_fracture_band(r.runs)).collect()
    }

    fn style(&self, _record: &InningsRecord, _filters: &FilterConfig) -> VisualStyle {
        FRACTURE_STYLE
    }
}

/// Act 3: everything, coloured red to maroon by pressure.
#[derive(Debug, Clone, Copy)]
pub struct Resistance;

impl ActStrategy for Resistance {
    fn id(&self) -> &'static str {
        "resistance"
    }

    fn select<'a>(&self, dataset: &'a Dataset, _filters: &FilterConfig) -> Vec<&'a InningsRecord> {
        dataset.iter().collect()
    }

    fn style(&self, record: &InningsRecord, _filters: &FilterConfig) -> VisualStyle {
        let p = normalize_pressure(record.avg_pressure);
        VisualStyle::new(palette::RESISTANCE.at(p), 0.5 + 0.4 * p, 2.5 + 1.5 * p)
    }
}

fn anchor_style(record: &InningsRecord, radius: f64) -> VisualStyle {
    VisualStyle::new(palette::ANCHOR.at_pressure(record.avg_pressure), 1.0, radius)
}

/// Act 4: anchors in green, everything else nearly invisible.
#[derive(Debug, Clone, Copy)]
pub struct ValueZone;

impl ActStrategy for ValueZone {
    fn id(&self) -> &'static str {
        "value_zone"
    }

    fn select<'a>(&self, dataset: &'a Dataset, _filters: &FilterConfig) -> Vec<&'a InningsRecord> {
        dataset.iter().collect()
    }

    fn style(&self, record: &InningsRecord, _filters: &FilterConfig) -> VisualStyle {
        if is_anchor(record.runs, record.impact) {
            anchor_style(record, 5.0)
        } else {
            FADED_STYLE
        }
    }
}

/// Act 5: viewer-driven thresholds, optional elite tier.
#[derive(Debug, Clone, Copy)]
pub struct ControlPlane;

/// Records clearing both floors; reduced to the top tier by impact when asked.
pub fn filtered_selection<'a>(dataset: &'a Dataset, filters: &FilterConfig) -> Vec<&'a InningsRecord> {
    let mut kept: Vec<&InningsRecord> = dataset
        .iter()
        .filter(|r| r.runs >= filters.min_runs && r.impact >= filters.min_impact)
        .collect();
    if filters.show_top100 {
        // Stable: equal impact keeps input order. NaN impacts never clear the floor.
        kept.sort_by(|a, b| b.impact.total_cmp(&a.impact));
        kept.truncate(TOP_TIER_SIZE);
    }
    kept
}

impl ActStrategy for ControlPlane {
    fn id(&self) -> &'static str {
        "control_plane"
    }

    fn select<'a>(&self, dataset: &'a Dataset, filters: &FilterConfig) -> Vec<&'a InningsRecord> {
        filtered_selection(dataset, filters)
    }

    fn style(&self, record: &InningsRecord, filters: &FilterConfig) -> VisualStyle {
        // Order matters: an anchor in the elite tier stays green.
        if filters.show_zone && is_anchor(record.runs, record.impact) {
            return anchor_style(record, 4.0);
        }
        if filters.show_top100 {
            return ELITE_STYLE;
        }
        let p = normalize_pressure(record.avg_pressure);
        VisualStyle::new(palette::BASE.at(p), 0.4, 2.5)
    }
}

/// Act 6: the chart sits hidden behind the summary card. It keeps the act-5
/// selection so the fade-out matches what the viewer last saw.
#[derive(Debug, Clone, Copy)]
pub struct Resolution;

impl ActStrategy for Resolution {
    fn id(&self) -> &'static str {
        "resolution"
    }

    fn select<'a>(&self, dataset: &'a Dataset, filters: &FilterConfig) -> Vec<&'a InningsRecord> {
        filtered_selection(dataset, filters)
    }

    fn style(&self, _record: &InningsRecord, _filters: &FilterConfig) -> VisualStyle {
        FALLBACK_STYLE
    }
}

/// Unrecognised act ordinal: whole dataset, fallback style.
#[derive(Debug, Clone, Copy)]
pub struct Fallback;

impl ActStrategy for Fallback {
    fn id(&self) -> &'static str {
        "fallback"
    }

    fn select<'a>(&self, dataset: &'a Dataset, _filters: &FilterConfig) -> Vec<&'a InningsRecord> {
        dataset.iter().collect()
    }

    fn style(&self, _record: &InningsRecord, _filters: &FilterConfig) -> VisualStyle {
        FALLBACK_STYLE
    }
}

/// Closed set of strategies, picked from an act ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStrategy {
    Orientation,
    Fracture,
    Resistance,
    ValueZone,
    ControlPlane,
    Resolution,
    Fallback,
}

impl ViewStrategy {
    pub fn for_act(act: StoryAct) -> Self {
        match act {
            StoryAct::Orientation => ViewStrategy::Orientation,
            StoryAct::Fracture => ViewStrategy::Fracture,
            StoryAct::Resistance => ViewStrategy::Resistance,
            StoryAct::ValueZone => ViewStrategy::ValueZone,
            StoryAct::ControlPlane => ViewStrategy::ControlPlane,
            StoryAct::Resolution => ViewStrategy::Resolution,
        }
    }

    pub fn for_ordinal(n: u8) -> Self {
        StoryAct::from_ordinal(n)
            .map(Self::for_act)
            .unwrap_or(ViewStrategy::Fallback)
    }

    fn inner(&self) -> &'static dyn ActStrategy {
        match self {
            ViewStrategy::Orientation => &Orientation,
            ViewStrategy::Fracture => &Fracture,
            ViewStrategy::Resistance => &Resistance,
            ViewStrategy::ValueZone => &ValueZone,
            ViewStrategy::ControlPlane => &ControlPlane,
            ViewStrategy::Resolution => &Resolution,
            ViewStrategy::Fallback => &Fallback,
        }
    }
}

impl ActStrategy for ViewStrategy {
    fn id(&self) -> &'static str {
        self.inner().id()
    }

    fn select<'a>(&self, dataset: &'a Dataset, filters: &FilterConfig) -> Vec<&'a InningsRecord> {
        self.inner().select(dataset, filters)
    }

    fn style(&self, record: &InningsRecord, filters: &FilterConfig) -> VisualStyle {
        self.inner().style(record, filters)
    }
}
