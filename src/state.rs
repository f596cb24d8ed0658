use std::fmt;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// Runtime configuration. Mirrors the env-driven layout the binaries share.
#[derive(Debug, Clone)]
pub struct Config {
    /// CSV location, either a filesystem path or an http(s) URL.
    pub data_location: String,
    pub start_act: StoryAct,
    /// Echo the derived view after every command.
    pub echo_view: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            data_location: std::env::var("STORY_DATA").unwrap_or_else(|_| "innings_impact.csv".to_string()),
            start_act: std::env::var("STORY_START_ACT")
                .ok()
                .and_then(|v| v.parse::<u8>().ok())
                .and_then(StoryAct::from_ordinal)
                .unwrap_or(StoryAct::FIRST),
            echo_view: std::env::var("STORY_ECHO_VIEW")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(true),
        }
    }
}

/// One stage of the guided narrative. Ordinals run 1..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum StoryAct {
    Orientation = 1,
    Fracture = 2,
    Resistance = 3,
    ValueZone = 4,
    ControlPlane = 5,
    Resolution = 6,
}

impl StoryAct {
    pub const FIRST: StoryAct = StoryAct::Orientation;
    pub const LAST: StoryAct = StoryAct::Resolution;
    pub const ALL: [StoryAct; 6] = [
        StoryAct::Orientation,
        StoryAct::Fracture,
        StoryAct::Resistance,
        StoryAct::ValueZone,
        StoryAct::ControlPlane,
        StoryAct::Resolution,
    ];

    pub fn from_ordinal(n: u8) -> Option<Self> {
        match n {
            1 => Some(StoryAct::Orientation),
            2 => Some(StoryAct::Fracture),
            3 => Some(StoryAct::Resistance),
            4 => Some(StoryAct::ValueZone),
            5 => Some(StoryAct::ControlPlane),
            6 => Some(StoryAct::Resolution),
            _ => None,
        }
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Adjacent act forward, saturating at the resolution.
    pub fn next(self) -> Self {
        Self::from_ordinal(self.ordinal() + 1).unwrap_or(Self::LAST)
    }

    /// Adjacent act backward, saturating at the orientation.
    pub fn prev(self) -> Self {
        Self::from_ordinal(self.ordinal().saturating_sub(1)).unwrap_or(Self::FIRST)
    }

    pub fn is_terminal(self) -> bool {
        self == Self::LAST
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StoryAct::Orientation => "orientation",
            StoryAct::Fracture => "fracture",
            StoryAct::Resistance => "resistance",
            StoryAct::ValueZone => "value_zone",
            StoryAct::ControlPlane => "control_plane",
            StoryAct::Resolution => "resolution",
        }
    }
}

impl From<StoryAct> for u8 {
    fn from(act: StoryAct) -> Self {
        act.ordinal()
    }
}

impl TryFrom<u8> for StoryAct {
    type Error = anyhow::Error;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        StoryAct::from_ordinal(n).ok_or_else(|| anyhow!("act out of range: {}", n))
    }
}

impl fmt::Display for StoryAct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ordinal())
    }
}

/// Slider ranges exposed by the control panel.
pub const MIN_RUNS_RANGE: (u32, u32) = (0, 100);
pub const MIN_IMPACT_RANGE: (f64, f64) = (0.0, 150.0);

/// Control-panel filters. Fields are independent of each other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub min_runs: u32,
    pub min_impact: f64,
    pub reveal_names: bool,
    pub show_top100: bool,
    pub show_zone: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_runs: 0,
            min_impact: 0.0,
            reveal_names: false,
            show_top100: false,
            show_zone: true,
        }
    }
}

impl FilterConfig {
    pub fn set_min_runs(&mut self, runs: u32) -> bool {
        let runs = runs.clamp(MIN_RUNS_RANGE.0, MIN_RUNS_RANGE.1);
        let changed = self.min_runs != runs;
        self.min_runs = runs;
        changed
    }

    pub fn set_min_impact(&mut self, impact: f64) -> bool {
        let impact = if impact.is_nan() {
            MIN_IMPACT_RANGE.0
        } else {
            impact.clamp(MIN_IMPACT_RANGE.0, MIN_IMPACT_RANGE.1).trunc()
        };
        let changed = self.min_impact != impact;
        self.min_impact = impact;
        changed
    }

    pub fn toggle_reveal_names(&mut self) {
        self.reveal_names = !self.reveal_names;
    }

    pub fn toggle_top100(&mut self) {
        self.show_top100 = !self.show_top100;
    }

    pub fn toggle_zone(&mut self) {
        self.show_zone = !self.show_zone;
    }
}

/// Process-local story state: active act plus control-panel filters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StoryState {
    pub act: StoryAct,
    pub filters: FilterConfig,
}

impl Default for StoryAct {
    fn default() -> Self {
        StoryAct::FIRST
    }
}

impl StoryState {
    pub fn new(act: StoryAct) -> Self {
        Self {
            act,
            filters: FilterConfig::default(),
        }
    }

    /// Returns true when the act actually moved.
    pub fn advance(&mut self) -> bool {
        let next = self.act.next();
        let moved = next != self.act;
        self.act = next;
        moved
    }

    pub fn retreat(&mut self) -> bool {
        let prev = self.act.prev();
        let moved = prev != self.act;
        self.act = prev;
        moved
    }

    /// Restart the sequence from the orientation. Filters are left alone.
    pub fn reset(&mut self) -> bool {
        let moved = self.act != StoryAct::FIRST;
        self.act = StoryAct::FIRST;
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn act_navigation_is_clamped() {
        assert_eq!(StoryAct::Orientation.prev(), StoryAct::Orientation);
        assert_eq!(StoryAct::Resolution.next(), StoryAct::Resolution);
        assert_eq!(StoryAct::Fracture.next(), StoryAct::Resistance);
        assert_eq!(StoryAct::Fracture.prev(), StoryAct::Orientation);
    }

    #[test]
    fn walk_forward_visits_every_act_once() {
        let mut state = StoryState::default();
        let mut seen = vec![state.act];
        while state.advance() {
            seen.push(state.act);
        }
        assert_eq!(seen, StoryAct::ALL.to_vec());
        assert!(state.act.is_terminal());
        assert!(!state.advance());
    }

    #[test]
    fn reset_returns_to_first_and_keeps_filters() {
        let mut state = StoryState::new(StoryAct::Resolution);
        state.filters.set_min_runs(40);
        assert!(state.reset());
        assert_eq!(state.act, StoryAct::Orientation);
        assert_eq!(state.filters.min_runs, 40);
        assert!(!state.reset());
    }

    #[test]
    fn ordinal_roundtrip_and_rejects_out_of_range() {
        for act in StoryAct::ALL {
            assert_eq!(StoryAct::from_ordinal(act.ordinal()), Some(act));
        }
        assert_eq!(StoryAct::from_ordinal(0), None);
        assert_eq!(StoryAct::from_ordinal(7), None);
        assert!(StoryAct::try_from(9u8).is_err());
    }

    #[test]
    fn act_serializes_as_ordinal() {
        let json = serde_json::to_string(&StoryAct::ValueZone).unwrap();
        assert_eq!(json, "4");
        let back: StoryAct = serde_json::from_str("2").unwrap();
        assert_eq!(back, StoryAct::Fracture);
        assert!(serde_json::from_str::<StoryAct>("0").is_err());
    }

    #[test]
    fn filter_defaults() {
        let f = FilterConfig::default();
        assert_eq!(f.min_runs, 0);
        assert_eq!(f.min_impact, 0.0);
        assert!(!f.reveal_names);
        assert!(!f.show_top100);
        assert!(f.show_zone);
    }

    #[test]
    fn filter_setters_clamp_to_slider_range() {
        let mut f = FilterConfig::default();
        assert!(f.set_min_runs(250));
        assert_eq!(f.min_runs, 100);
        assert!(!f.set_min_runs(100));
        assert!(f.set_min_impact(999.0));
        assert_eq!(f.min_impact, 150.0);
        f.set_min_impact(-5.0);
        assert_eq!(f.min_impact, 0.0);
        f.set_min_impact(42.7);
        assert_eq!(f.min_impact, 42.0);
    }

    #[test]
    fn toggles_flip_independently() {
        let mut f = FilterConfig::default();
        f.toggle_top100();
        assert!(f.show_top100);
        assert!(f.show_zone);
        f.toggle_zone();
        assert!(!f.show_zone);
        f.toggle_reveal_names();
        assert!(f.reveal_names);
        assert!(f.show_top100);
    }
}
