//! Customer journey phases and progress tracking.
//!
//! A customer moves through a fixed sequence of phases:
//! `onboarding -> landingpage -> ads -> whatsapp -> webinar`. The user row
//! stores the current phase, the list of completed phases, and a cached
//! progress percentage. Every rule that derives one of those values lives in
//! this module so the handlers never disagree about them.
//!
//! The string-taking functions ([`progress_for_phase`], [`is_step_completed`],
//! [`next_phase`], [`previous_phase`], [`all_prior_phases`]) are total: an
//! unknown phase name never errors, it falls back to the first phase (or to
//! 20% for progress once onboarding is done).

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// One stage of the customer journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Onboarding,
    Landingpage,
    Ads,
    Whatsapp,
    Webinar,
}

/// All phases in journey order.
pub const PHASE_SEQUENCE: [Phase; 5] = [
    Phase::Onboarding,
    Phase::Landingpage,
    Phase::Ads,
    Phase::Whatsapp,
    Phase::Webinar,
];

/// Progress shown while onboarding has not been completed.
pub const PROGRESS_BEFORE_ONBOARDING: i32 = 0;

/// Progress for an unrecognized phase name once onboarding is completed.
pub const PROGRESS_UNKNOWN_PHASE: i32 = 20;

impl Phase {
    /// Parse a phase name, ignoring ASCII case and surrounding whitespace.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        PHASE_SEQUENCE
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
    }

    /// Parse a phase name, treating anything unrecognized as the first phase.
    pub fn parse_or_first(name: &str) -> Self {
        Self::parse(name).unwrap_or(Phase::Onboarding)
    }

    /// Canonical lowercase name, as stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Onboarding => "onboarding",
            Self::Landingpage => "landingpage",
            Self::Ads => "ads",
            Self::Whatsapp => "whatsapp",
            Self::Webinar => "webinar",
        }
    }

    /// 1-based position in [`PHASE_SEQUENCE`].
    pub fn rank(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Fixed progress percentage for a customer sitting in this phase.
    pub fn progress(self) -> i32 {
        i32::from(self.rank()) * 20
    }

    /// Successor phase; the last phase is its own successor.
    pub fn next(self) -> Self {
        PHASE_SEQUENCE
            .get(self.index() + 1)
            .copied()
            .unwrap_or(self)
    }

    /// Predecessor phase; the first phase is its own predecessor.
    pub fn previous(self) -> Self {
        match self.index() {
            0 => self,
            i => PHASE_SEQUENCE[i - 1],
        }
    }

    /// Every phase strictly before this one, in order.
    pub fn priors(self) -> &'static [Phase] {
        &PHASE_SEQUENCE[..self.index()]
    }

    fn index(self) -> usize {
        match self {
            Self::Onboarding => 0,
            Self::Landingpage => 1,
            Self::Ads => 2,
            Self::Whatsapp => 3,
            Self::Webinar => 4,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// String-level operations
// ---------------------------------------------------------------------------

/// Whether `onboarding` appears in a stored completed-phase list.
pub fn onboarding_completed<S: AsRef<str>>(completed_phases: &[S]) -> bool {
    completed_phases
        .iter()
        .any(|p| Phase::parse(p.as_ref()) == Some(Phase::Onboarding))
}

/// Progress percentage for `phase` given the completed-phase list.
///
/// Everything is gated behind onboarding: until `onboarding` is completed the
/// result is 0 no matter which phase is current.
pub fn progress_for_phase<S: AsRef<str>>(phase: &str, completed_phases: &[S]) -> i32 {
    if !onboarding_completed(completed_phases) {
        return PROGRESS_BEFORE_ONBOARDING;
    }
    Phase::parse(phase).map_or(PROGRESS_UNKNOWN_PHASE, Phase::progress)
}

/// Whether roadmap step `step_id` (1..=5) is shown as done.
///
/// Step 1 combines onboarding and the checklist and is done once `onboarding`
/// is completed. Steps 2-5 are done when their rank is at or below the rank
/// of the current phase. Step ids outside 1..=5 are never done.
pub fn is_step_completed<S: AsRef<str>>(
    step_id: u8,
    current_phase: &str,
    completed_phases: &[S],
) -> bool {
    match step_id {
        1 => onboarding_completed(completed_phases),
        2..=5 => step_id <= Phase::parse_or_first(current_phase).rank(),
        _ => false,
    }
}

/// Phase an admin "advance" moves to.
pub fn next_phase(phase: &str) -> Phase {
    Phase::parse_or_first(phase).next()
}

/// Phase an admin "rollback" moves to.
pub fn previous_phase(phase: &str) -> Phase {
    Phase::parse_or_first(phase).previous()
}

/// Every phase strictly before `phase`, used to rebuild the completed list
/// when an admin jumps a customer to `phase`.
pub fn all_prior_phases(phase: &str) -> Vec<Phase> {
    Phase::parse_or_first(phase).priors().to_vec()
}

// ---------------------------------------------------------------------------
// Roadmap
// ---------------------------------------------------------------------------

/// A fixed step of the customer-facing onboarding roadmap.
#[derive(Debug, Clone, Copy)]
pub struct RoadmapStep {
    pub id: u8,
    pub title: &'static str,
    pub description: &'static str,
}

/// The five roadmap steps shown on the customer dashboard.
pub const ROADMAP: [RoadmapStep; 5] = [
    RoadmapStep {
        id: 1,
        title: "Onboarding & Checkliste",
        description: "Erste Schritte und Grundeinstellung",
    },
    RoadmapStep {
        id: 2,
        title: "Landingpage",
        description: "Erstellung und Optimierung der Landingpage",
    },
    RoadmapStep {
        id: 3,
        title: "Werbeanzeigen",
        description: "Einrichtung und Aktivierung von Werbekampagnen",
    },
    RoadmapStep {
        id: 4,
        title: "WhatsApp-Bot",
        description: "Integration der WhatsApp-Kommunikation",
    },
    RoadmapStep {
        id: 5,
        title: "Webinar",
        description: "Abschließendes Training und Schulung",
    },
];

/// A roadmap step together with its completion flag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapStatus {
    pub id: u8,
    pub title: &'static str,
    pub description: &'static str,
    pub completed: bool,
}

/// Evaluate every roadmap step against the given phase state.
pub fn roadmap<S: AsRef<str>>(current_phase: &str, completed_phases: &[S]) -> Vec<RoadmapStatus> {
    ROADMAP
        .iter()
        .map(|step| RoadmapStatus {
            id: step.id,
            title: step.title,
            description: step.description,
            completed: is_step_completed(step.id, current_phase, completed_phases),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// PhaseState
// ---------------------------------------------------------------------------

/// The phase fields of a user row, normalized.
///
/// `completed` is always a prefix of [`PHASE_SEQUENCE`]. Progress and the
/// onboarding flag are derived, so persisting a `PhaseState` writes all
/// cached columns from one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseState {
    current: Phase,
    completed: Vec<Phase>,
}

impl PhaseState {
    /// State of a freshly registered customer.
    pub fn initial() -> Self {
        Self {
            current: Phase::Onboarding,
            completed: Vec::new(),
        }
    }

    /// Rebuild a state from stored columns.
    ///
    /// Unknown names are dropped and the completed list is cut at the first
    /// gap, so rows written before the prefix rule existed still load.
    pub fn from_stored<S: AsRef<str>>(current_phase: &str, completed_phases: &[S]) -> Self {
        let known: Vec<Phase> = completed_phases
            .iter()
            .filter_map(|p| Phase::parse(p.as_ref()))
            .collect();
        let completed = PHASE_SEQUENCE
            .into_iter()
            .take_while(|p| known.contains(p))
            .collect();
        Self {
            current: Phase::parse_or_first(current_phase),
            completed,
        }
    }

    pub fn current(&self) -> Phase {
        self.current
    }

    pub fn completed(&self) -> &[Phase] {
        &self.completed
    }

    /// Completed phases as stored strings, in journey order.
    pub fn completed_names(&self) -> Vec<String> {
        self.completed.iter().map(|p| p.as_str().to_string()).collect()
    }

    pub fn onboarding_completed(&self) -> bool {
        self.completed.contains(&Phase::Onboarding)
    }

    /// Progress percentage derived from the current phase.
    pub fn progress(&self) -> i32 {
        if self.onboarding_completed() {
            self.current.progress()
        } else {
            PROGRESS_BEFORE_ONBOARDING
        }
    }

    /// Roadmap for this state.
    pub fn roadmap(&self) -> Vec<RoadmapStatus> {
        roadmap(self.current.as_str(), &self.completed_names())
    }

    /// Mark onboarding (videos + checklist) as done. Idempotent.
    pub fn complete_onboarding(mut self) -> Self {
        if !self.onboarding_completed() {
            self.completed.insert(0, Phase::Onboarding);
        }
        self
    }

    /// Put the customer into `target`, overwriting the completed list with
    /// every phase before it.
    ///
    /// Onboarding credit earned by the customer survives a rollback to the
    /// onboarding phase.
    pub fn move_to(self, target: Phase) -> Self {
        let mut completed = target.priors().to_vec();
        if completed.is_empty() && self.onboarding_completed() {
            completed.push(Phase::Onboarding);
        }
        Self {
            current: target,
            completed,
        }
    }

    /// Move to the next phase (no-op at the last phase).
    pub fn advance(self) -> Self {
        let target = self.current.next();
        self.move_to(target)
    }

    /// Move to the previous phase (no-op at the first phase).
    pub fn rollback(self) -> Self {
        let target = self.current.previous();
        self.move_to(target)
    }
}

impl Default for PhaseState {
    fn default() -> Self {
        Self::initial()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    fn is_prefix(completed: &[Phase]) -> bool {
        completed == &PHASE_SEQUENCE[..completed.len()]
    }

    // -- Phase --

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Phase::parse("Landingpage"), Some(Phase::Landingpage));
        assert_eq!(Phase::parse("ADS"), Some(Phase::Ads));
        assert_eq!(Phase::parse(" webinar "), Some(Phase::Webinar));
        assert_eq!(Phase::parse("Checkliste"), None);
        assert_eq!(Phase::parse(""), None);
    }

    #[test]
    fn rank_and_progress_follow_sequence() {
        let progress: Vec<i32> = PHASE_SEQUENCE.iter().map(|p| p.progress()).collect();
        assert_eq!(progress, vec![20, 40, 60, 80, 100]);
        let ranks: Vec<u8> = PHASE_SEQUENCE.iter().map(|p| p.rank()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Phase::Whatsapp).unwrap();
        assert_eq!(json, "\"whatsapp\"");
        let parsed: Phase = serde_json::from_str("\"landingpage\"").unwrap();
        assert_eq!(parsed, Phase::Landingpage);
    }

    // -- progress_for_phase --

    #[test]
    fn progress_is_zero_before_onboarding() {
        assert_eq!(progress_for_phase("landingpage", &NONE), 0);
        assert_eq!(progress_for_phase("webinar", &["landingpage", "ads"]), 0);
        assert_eq!(progress_for_phase("unknown", &NONE), 0);
    }

    #[test]
    fn progress_uses_fixed_mapping_after_onboarding() {
        assert_eq!(progress_for_phase("webinar", &["onboarding"]), 100);
        assert_eq!(progress_for_phase("onboarding", &["onboarding"]), 20);
        assert_eq!(progress_for_phase("Ads", &["onboarding"]), 60);
        assert_eq!(progress_for_phase("WhatsApp", &["Onboarding"]), 80);
    }

    #[test]
    fn unknown_phase_progress_defaults_to_twenty() {
        for name in ["Checkliste", "Complete", "", "Einführungsvideo"] {
            assert_eq!(progress_for_phase(name, &["onboarding"]), 20);
            assert_eq!(progress_for_phase(name, &NONE), 0);
        }
    }

    // -- is_step_completed --

    #[test]
    fn step_one_tracks_onboarding_only() {
        assert!(is_step_completed(1, "landingpage", &["onboarding"]));
        assert!(!is_step_completed(1, "webinar", &NONE));
    }

    #[test]
    fn later_steps_follow_current_rank() {
        assert!(is_step_completed(2, "landingpage", &["onboarding"]));
        assert!(!is_step_completed(3, "landingpage", &["onboarding"]));
        assert!(is_step_completed(5, "WEBINAR", &NONE));
        assert!(!is_step_completed(2, "nonsense", &["onboarding"]));
    }

    #[test]
    fn out_of_range_steps_are_never_done() {
        assert!(!is_step_completed(0, "webinar", &["onboarding"]));
        assert!(!is_step_completed(6, "webinar", &["onboarding"]));
    }

    // -- next / previous / priors --

    #[test]
    fn next_and_previous_are_idempotent_at_bounds() {
        assert_eq!(next_phase("webinar"), Phase::Webinar);
        assert_eq!(previous_phase("onboarding"), Phase::Onboarding);
    }

    #[test]
    fn next_then_previous_round_trips_inner_phases() {
        for phase in &PHASE_SEQUENCE[..4] {
            assert_eq!(previous_phase(next_phase(phase.as_str()).as_str()), *phase);
        }
        for phase in &PHASE_SEQUENCE[1..] {
            assert_eq!(next_phase(previous_phase(phase.as_str()).as_str()), *phase);
        }
    }

    #[test]
    fn unknown_phase_is_treated_as_first() {
        assert_eq!(next_phase("Checkliste"), Phase::Landingpage);
        assert_eq!(previous_phase("Checkliste"), Phase::Onboarding);
        assert!(all_prior_phases("Checkliste").is_empty());
    }

    #[test]
    fn all_prior_phases_lists_strict_predecessors() {
        assert_eq!(
            all_prior_phases("ads"),
            vec![Phase::Onboarding, Phase::Landingpage]
        );
        assert!(all_prior_phases("onboarding").is_empty());
        assert_eq!(all_prior_phases("webinar").len(), 4);
    }

    // -- roadmap --

    #[test]
    fn roadmap_marks_steps_up_to_current_phase() {
        let steps = roadmap("ads", &["onboarding", "landingpage"]);
        let done: Vec<bool> = steps.iter().map(|s| s.completed).collect();
        assert_eq!(done, vec![true, true, true, false, false]);
        assert_eq!(steps[0].title, "Onboarding & Checkliste");
    }

    // -- PhaseState --

    #[test]
    fn initial_state_has_zero_progress() {
        let state = PhaseState::initial();
        assert_eq!(state.current(), Phase::Onboarding);
        assert!(state.completed().is_empty());
        assert_eq!(state.progress(), 0);
        assert!(!state.onboarding_completed());
    }

    #[test]
    fn completing_onboarding_yields_twenty_percent() {
        let state = PhaseState::initial().complete_onboarding();
        assert_eq!(state.completed_names(), vec!["onboarding".to_string()]);
        assert_eq!(state.progress(), 20);

        let again = state.clone().complete_onboarding();
        assert_eq!(again, state);
    }

    #[test]
    fn move_to_overwrites_completed_with_priors() {
        let state = PhaseState::initial().move_to(Phase::Ads);
        assert_eq!(state.completed(), &[Phase::Onboarding, Phase::Landingpage]);
        assert_eq!(state.progress(), 60);
        assert!(state.onboarding_completed());

        let back = state.move_to(Phase::Landingpage);
        assert_eq!(back.completed(), &[Phase::Onboarding]);
        assert_eq!(back.progress(), 40);
    }

    #[test]
    fn rollback_to_onboarding_keeps_customer_credit() {
        let state = PhaseState::initial()
            .complete_onboarding()
            .advance()
            .rollback();
        assert_eq!(state.current(), Phase::Onboarding);
        assert_eq!(state.completed(), &[Phase::Onboarding]);
        assert_eq!(state.progress(), 20);

        let untouched = PhaseState::initial().rollback();
        assert_eq!(untouched, PhaseState::initial());
    }

    #[test]
    fn advance_walks_full_sequence_and_stops() {
        let mut state = PhaseState::initial().complete_onboarding();
        for expected in &PHASE_SEQUENCE[1..] {
            state = state.advance();
            assert_eq!(state.current(), *expected);
            assert!(is_prefix(state.completed()));
        }
        let end = state.clone().advance();
        assert_eq!(end, state);
        assert_eq!(end.progress(), 100);
    }

    #[test]
    fn from_stored_cuts_gaps_and_drops_unknown_names() {
        let state = PhaseState::from_stored("ads", &["ads", "onboarding", "Checkliste"]);
        assert_eq!(state.completed(), &[Phase::Onboarding]);
        assert_eq!(state.current(), Phase::Ads);

        let legacy = PhaseState::from_stored("Complete", &["Checkliste", "Einführungsvideo"]);
        assert_eq!(legacy, PhaseState::initial());
    }
}
