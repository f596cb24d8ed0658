//! Per-act presentation data: copy, controls, backdrop and tooltip content.
//!
//! None of this affects which points are drawn; it is what the presentation
//! layer needs alongside a [`crate::view::DerivedView`].

use serde::Serialize;

use crate::color::Rgb;
use crate::record::InningsRecord;
use crate::state::{FilterConfig, StoryAct, StoryState};
use crate::zone::{is_anchor, shows_zone_overlay, ValueAnchorZone, ANCHOR_ZONE};

/// Axis extents of the scatter chart.
pub const RUNS_AXIS: (f64, f64) = (0.0, 180.0);
pub const IMPACT_AXIS: (f64, f64) = (0.0, 200.0);

/// Fixed chart domains, independent of the data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Axes {
    pub runs: (f64, f64),
    pub impact: (f64, f64),
}

pub const AXES: Axes = Axes {
    runs: RUNS_AXIS,
    impact: IMPACT_AXIS,
};

/// Number of acts represented in the progress strip (the resolution has none).
pub const PROGRESS_ACTS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Narrative,
    Controls,
    SummaryCard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActCopy {
    pub chapter: &'static str,
    pub headline: &'static str,
    pub lede: &'static str,
    pub body: &'static str,
}

pub fn act_copy(act: StoryAct) -> Option<ActCopy> {
    let copy = match act {
        StoryAct::Orientation => ActCopy {
            chapter: "Act I: Orientation",
            headline: "The scale of history.",
            lede: "Every point represents a single innings. A moment of effort recorded.",
            body: "Horizontal: volume (runs). Vertical: consequence (impact).",
        },
        StoryAct::Fracture => ActCopy {
            chapter: "Act II: The Fracture",
            headline: "Same runs. Different weights.",
            lede: "Observe the vertical spread for fixed runs.",
            body: "A 50 can be a stat-padder's dream or a team's survival. In IPL, volume is secondary; consequence is the only truth.",
        },
        StoryAct::Resistance => ActCopy {
            chapter: "Act III: Resistance",
            headline: "Pressure creates value.",
            lede: "Value is mined where the game resists.",
            body: "We've mapped the intensity of situational pressure. Deep rose markers represent innings forged in high-leverage moments.",
        },
        StoryAct::ValueZone => ActCopy {
            chapter: "Act IV: The Value Zone",
            headline: "The impact anchors.",
            lede: "Where efficiency meets necessity.",
            body: "Highlighted in emerald green are impact anchors: 30-50 runs scored under extreme pressure. These are the innings that actually win trophies.",
        },
        StoryAct::ControlPlane | StoryAct::Resolution => return None,
    };
    Some(copy)
}

pub fn panel_for(act: StoryAct) -> Panel {
    match act {
        StoryAct::ControlPlane => Panel::Controls,
        StoryAct::Resolution => Panel::SummaryCard,
        _ => Panel::Narrative,
    }
}

pub fn next_label(act: StoryAct) -> &'static str {
    match act {
        StoryAct::Orientation => "Explore",
        StoryAct::ValueZone => "Discover",
        StoryAct::ControlPlane => "Resolution",
        _ => "Proceed",
    }
}

pub fn back_enabled(act: StoryAct) -> bool {
    act != StoryAct::FIRST
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pip {
    Visited,
    Current,
    Upcoming,
}

pub fn progress(act: StoryAct) -> Vec<Pip> {
    (1..=PROGRESS_ACTS)
        .map(|i| match i.cmp(&act.ordinal()) {
            std::cmp::Ordering::Less => Pip::Visited,
            std::cmp::Ordering::Equal => Pip::Current,
            std::cmp::Ordering::Greater => Pip::Upcoming,
        })
        .collect()
}

/// Two backdrop blob colours per act.
pub fn backdrop(act: u8) -> (Rgb, Rgb) {
    const fn c(r: u8, g: u8, b: u8) -> Rgb {
        Rgb::new(r, g, b)
    }
    match act {
        1 => (c(0x0e, 0xa5, 0xe9), c(0x0e, 0xa5, 0xe9)),
        2 => (c(0x63, 0x66, 0xf1), c(0x4f, 0x46, 0xe5)),
        3 => (c(0xf4, 0x3f, 0x5e), c(0x7f, 0x1d, 0x1d)),
        4 => (c(0x10, 0xb9, 0x81), c(0x06, 0x4e, 0x3b)),
        5 => (c(0x63, 0x66, 0xf1), c(0x02, 0x06, 0x17)),
        6 => (c(0x7f, 0x1d, 0x1d), c(0x02, 0x06, 0x17)),
        _ => (c(0x1e, 0x29, 0x3b), c(0x02, 0x06, 0x17)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryCard {
    pub league: &'static str,
    pub seasons: &'static str,
    pub lines: [&'static str; 4],
    pub handle: &'static str,
    pub reset_label: &'static str,
}

pub const SUMMARY_CARD: SummaryCard = SummaryCard {
    league: "IPL",
    seasons: "2008-2025",
    lines: ["Runs", "are Easy.", "Impact", "is Earned."],
    handle: "@IPL_Research",
    reset_label: "RESET",
};

/// Everything the chrome around the chart needs for one state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub act: StoryAct,
    pub panel: Panel,
    pub copy: Option<ActCopy>,
    pub next_label: &'static str,
    pub back_enabled: bool,
    pub progress: Vec<Pip>,
    pub backdrop: (String, String),
    pub axes: Axes,
    /// Reference rectangle, present only while the overlay is drawn.
    pub zone: Option<ValueAnchorZone>,
    pub summary: Option<SummaryCard>,
}

pub fn scene(state: &StoryState) -> Scene {
    let act = state.act;
    let (b1, b2) = backdrop(act.ordinal());
    Scene {
        act,
        panel: panel_for(act),
        copy: act_copy(act),
        next_label: next_label(act),
        back_enabled: back_enabled(act),
        progress: progress(act),
        backdrop: (b1.to_hex(), b2.to_hex()),
        axes: AXES,
        zone: shows_zone_overlay(act, &state.filters).then_some(ANCHOR_ZONE),
        summary: act.is_terminal().then_some(SUMMARY_CARD),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tooltip {
    /// Present only when names are revealed.
    pub badge: Option<&'static str>,
    pub batter: Option<String>,
    pub volume: String,
    pub impact: String,
    pub leverage: String,
    pub anchor: bool,
}

pub fn tooltip(record: &InningsRecord, filters: &FilterConfig) -> Tooltip {
    let anchor = is_anchor(record.runs, record.impact);
    let (badge, batter) = if filters.reveal_names {
        let badge = if anchor { "Impact Anchor" } else { "Profile Identified" };
        (Some(badge), Some(record.batter.clone()))
    } else {
        (None, None)
    };
    Tooltip {
        badge,
        batter,
        volume: format!("{} ({})", record.runs, record.balls),
        impact: format!("{:.1}", record.impact),
        leverage: format!("{:.2}x", record.avg_pressure),
        anchor,
    }
}
