//! The value-anchor zone: modest run totals carrying outsized impact.
//!
//! Both the act-4 highlight and the act-5 `show_zone` highlight (and the
//! tooltip badge) go through [`is_anchor`]. Do not inline the thresholds.

use serde::Serialize;

use crate::state::{FilterConfig, StoryAct};

/// Rectangle in (runs, impact) space drawn as the reference area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueAnchorZone {
    pub runs_min: u32,
    pub runs_max: u32,
    pub impact_min: f64,
    /// Display extent only; membership is open-ended above `impact_min`.
    pub impact_max: f64,
}

pub const ANCHOR_ZONE: ValueAnchorZone = ValueAnchorZone {
    runs_min: 25,
    runs_max: 55,
    impact_min: 65.0,
    impact_max: 180.0,
};

impl ValueAnchorZone {
    pub fn contains(&self, runs: u32, impact: f64) -> bool {
        runs >= self.runs_min && runs <= self.runs_max && impact >= self.impact_min
    }
}

/// `25 <= runs <= 55 && impact >= 65`.
pub fn is_anchor(runs: u32, impact: f64) -> bool {
    ANCHOR_ZONE.contains(runs, impact)
}

/// Whether the presentation layer should draw the zone overlay.
pub fn shows_zone_overlay(act: StoryAct, filters: &FilterConfig) -> bool {
    match act {
        StoryAct::ValueZone => true,
        StoryAct::ControlPlane => filters.show_zone,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_boundaries() {
        assert!(!is_anchor(24, 100.0));
        assert!(!is_anchor(40, 64.0));
        assert!(is_anchor(40, 65.0));
        assert!(is_anchor(25, 65.0));
        assert!(is_anchor(55, 65.0));
        assert!(!is_anchor(56, 100.0));
    }

    #[test]
    fn display_ceiling_is_not_a_membership_bound() {
        assert!(is_anchor(30, 500.0));
    }

    #[test]
    fn overlay_only_in_value_zone_or_control_plane_with_zone() {
        let mut f = FilterConfig::default();
        assert!(shows_zone_overlay(StoryAct::ValueZone, &f));
        assert!(shows_zone_overlay(StoryAct::ControlPlane, &f));
        f.toggle_zone();
        assert!(!shows_zone_overlay(StoryAct::ControlPlane, &f));
        assert!(shows_zone_overlay(StoryAct::ValueZone, &f));
        for act in [StoryAct::Orientation, StoryAct::Fracture, StoryAct::Resistance, StoryAct::Resolution] {
            assert!(!shows_zone_overlay(act, &FilterConfig::default()));
        }
    }
}
