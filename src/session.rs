//! Story session: loading lifecycle plus a pure reducer over user commands.
//!
//! ```text
//!   Loading ──finish_loading(dataset)──► Ready
//!                                          │  apply(Command)
//!                                          ▼
//!                          reduce(state) ─► derive_view ─► ViewSummary
//! ```
//!
//! Every accepted command re-derives the view synchronously before the next
//! command can be applied. Commands arriving while loading are rejected.

use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use serde_json::json;

use crate::logging::{log_act_change, log_command_rejected, log_filter_change, log_view, v_str, ProfileScope};
use crate::narrative::{scene, Scene};
use crate::record::Dataset;
use crate::state::{StoryAct, StoryState};
use crate::view::{derive_for_state, DerivedView, ViewSummary};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Next,
    Back,
    Reset,
    SetMinRuns(u32),
    SetMinImpact(f64),
    ToggleRevealNames,
    ToggleTop100,
    ToggleZone,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Next => "next",
            Command::Back => "back",
            Command::Reset => "reset",
            Command::SetMinRuns(_) => "runs",
            Command::SetMinImpact(_) => "impact",
            Command::ToggleRevealNames => "names",
            Command::ToggleTop100 => "top",
            Command::ToggleZone => "zone",
        }
    }

    /// Parse one line of the text control protocol, e.g. `next` or `runs 40`.
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().ok_or_else(|| anyhow!("empty command"))?;
        let arg = parts.next();
        if parts.next().is_some() {
            bail!("too many arguments: {:?}", line);
        }
        let needs_arg = |name: &str| arg.ok_or_else(|| anyhow!("{} needs a number", name));
        let cmd = match verb.to_lowercase().as_str() {
            "next" | "n" => Command::Next,
            "back" | "prev" | "b" => Command::Back,
            "reset" => Command::Reset,
            "runs" => Command::SetMinRuns(needs_arg("runs")?.parse()?),
            "impact" => Command::SetMinImpact(needs_arg("impact")?.parse()?),
            "names" => Command::ToggleRevealNames,
            "top" | "top100" => Command::ToggleTop100,
            "zone" => Command::ToggleZone,
            other => bail!("unknown command: {:?}", other),
        };
        if arg.is_some() && !matches!(cmd, Command::SetMinRuns(_) | Command::SetMinImpact(_)) {
            bail!("{} takes no argument", cmd.name());
        }
        Ok(cmd)
    }

    fn touches_act(&self) -> bool {
        matches!(self, Command::Next | Command::Back | Command::Reset)
    }
}

/// Apply one command to the story state. Returns true when the state changed.
pub fn reduce(state: &mut StoryState, command: Command) -> bool {
    match command {
        Command::Next => state.advance(),
        Command::Back => state.retreat(),
        Command::Reset => {
            // Reset is the resolution card's action; elsewhere it is a no-op.
            if state.act.is_terminal() {
                state.reset()
            } else {
                false
            }
        }
        Command::SetMinRuns(n) => state.filters.set_min_runs(n),
        Command::SetMinImpact(v) => state.filters.set_min_impact(v),
        Command::ToggleRevealNames => {
            state.filters.toggle_reveal_names();
            true
        }
        Command::ToggleTop100 => {
            state.filters.toggle_top100();
            true
        }
        Command::ToggleZone => {
            state.filters.toggle_zone();
            true
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Changed,
    Unchanged,
    Rejected(String),
}

#[derive(Debug)]
enum Phase {
    Loading,
    Ready(Dataset),
}

#[derive(Debug)]
pub struct StorySession {
    phase: Phase,
    state: StoryState,
    summary: Option<ViewSummary>,
}

impl Default for StorySession {
    fn default() -> Self {
        Self::new(StoryAct::FIRST)
    }
}

impl StorySession {
    pub fn new(start_act: StoryAct) -> Self {
        Self {
            phase: Phase::Loading,
            state: StoryState::new(start_act),
            summary: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    /// Hand over the loaded dataset and derive the first view.
    pub fn finish_loading(&mut self, dataset: Dataset) -> &ViewSummary {
        self.phase = Phase::Ready(dataset);
        self.recompute()
    }

    pub fn state(&self) -> &StoryState {
        &self.state
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        match &self.phase {
            Phase::Ready(ds) => Some(ds),
            Phase::Loading => None,
        }
    }

    pub fn summary(&self) -> Option<&ViewSummary> {
        self.summary.as_ref()
    }

    /// Current view, derived fresh from the dataset and state.
    pub fn view(&self) -> Option<DerivedView<'_>> {
        self.dataset().map(|ds| derive_for_state(ds, &self.state))
    }

    pub fn scene(&self) -> Scene {
        scene(&self.state)
    }

    pub fn apply(&mut self, command: Command) -> Outcome {
        if self.is_loading() {
            log_command_rejected(command.name(), "dataset still loading");
            return Outcome::Rejected("dataset still loading".to_string());
        }
        let before = self.state.act;
        if !reduce(&mut self.state, command) {
            return Outcome::Unchanged;
        }
        if command.touches_act() {
            log_act_change(before.ordinal(), self.state.act.ordinal(), command.name());
        } else {
            log_filter_change(command.name(), &json!(self.state.filters));
        }
        self.recompute();
        Outcome::Changed
    }

    fn recompute(&mut self) -> &ViewSummary {
        let _scope = ProfileScope::with_context("derive_view", &[("act", v_str(self.state.act.as_str()))]);
        let summary = match &self.phase {
            Phase::Ready(ds) => {
                let view = derive_for_state(ds, &self.state);
                view.summary(ds.len())
            }
            Phase::Loading => derive_for_state(&Dataset::default(), &self.state).summary(0),
        };
        log_view(summary.act, summary.strategy, summary.shown, summary.anchors, &summary.hash);
        self.summary.insert(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::InningsRecord;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            InningsRecord::new("1", "A", 30, 70.0, 20, 1.0),
            InningsRecord::new("2", "B", 80, 120.0, 50, 2.0),
            InningsRecord::new("3", "C", 50, 30.0, 40, 0.5),
        ])
    }

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("next").unwrap(), Command::Next);
        assert_eq!(Command::parse(" B ").unwrap(), Command::Back);
        assert_eq!(Command::parse("runs 40").unwrap(), Command::SetMinRuns(40));
        assert_eq!(Command::parse("impact 75").unwrap(), Command::SetMinImpact(75.0));
        assert_eq!(Command::parse("top").unwrap(), Command::ToggleTop100);
        assert!(Command::parse("runs").is_err());
        assert!(Command::parse("runs x").is_err());
        assert!(Command::parse("zone 3").is_err());
        assert!(Command::parse("jump 4").is_err());
        assert!(Command::parse("").is_err());
    }

    #[test]
    fn commands_rejected_while_loading() {
        let mut s = StorySession::default();
        assert!(s.is_loading());
        assert!(matches!(s.apply(Command::Next), Outcome::Rejected(_)));
        assert_eq!(s.state().act, StoryAct::Orientation);
        assert!(s.view().is_none());
        assert!(s.summary().is_none());
    }

    #[test]
    fn finish_loading_derives_first_view() {
        let mut s = StorySession::default();
        let summary = s.finish_loading(dataset()).clone();
        assert_eq!(summary.act, 1);
        assert_eq!(summary.shown, 2);
        assert!(!s.is_loading());
    }

    #[test]
    fn navigation_recomputes_view() {
        let mut s = StorySession::default();
        s.finish_loading(dataset());
        assert_eq!(s.apply(Command::Back), Outcome::Unchanged);
        for _ in 0..3 {
            assert_eq!(s.apply(Command::Next), Outcome::Changed);
        }
        let summary = s.summary().unwrap();
        assert_eq!(summary.act, 4);
        assert_eq!(summary.anchors, 1);
        assert!(summary.zone_overlay);
    }

    #[test]
    fn filters_drive_control_plane() {
        let mut s = StorySession::new(StoryAct::ControlPlane);
        s.finish_loading(dataset());
        assert_eq!(s.summary().unwrap().shown, 3);
        s.apply(Command::SetMinRuns(50));
        assert_eq!(s.summary().unwrap().shown, 2);
        s.apply(Command::SetMinImpact(100.0));
        assert_eq!(s.summary().unwrap().shown, 1);
        assert_eq!(s.apply(Command::SetMinImpact(100.0)), Outcome::Unchanged);
        s.apply(Command::ToggleZone);
        assert!(!s.summary().unwrap().zone_overlay);
    }

    #[test]
    fn reset_only_from_resolution() {
        let mut s = StorySession::new(StoryAct::Resistance);
        s.finish_loading(dataset());
        assert_eq!(s.apply(Command::Reset), Outcome::Unchanged);
        while s.apply(Command::Next) == Outcome::Changed {}
        assert_eq!(s.state().act, StoryAct::Resolution);
        assert_eq!(s.scene().next_label, "Proceed");
        assert_eq!(s.apply(Command::Reset), Outcome::Changed);
        assert_eq!(s.state().act, StoryAct::Orientation);
    }

    #[test]
    fn view_matches_summary() {
        let mut s = StorySession::default();
        s.finish_loading(dataset());
        s.apply(Command::Next);
        let view = s.view().unwrap();
        let fresh = view.summary(3);
        assert_eq!(&fresh, s.summary().unwrap());
    }
}
