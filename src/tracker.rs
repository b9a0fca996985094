use crate::completed::CompletedDaySet;
use crate::day_key::DayKey;
use crate::errors::TrackerError;
use crate::streak::compute_streak;
use serde::Serialize;
use std::ops::{BitOr, BitOrAssign};

pub const DEFAULT_GOAL_ML: f64 = 2000.0;
pub const QUICK_ADD_AMOUNTS_ML: [f64; 2] = [200.0, 300.0];
/// Largest single intake entry; four keypad digits.
pub const MAX_AMOUNT_ML: f64 = 9999.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingState {
    pub progress_ml: f64,
    pub goal_ml: f64,
    pub current_day: DayKey,
    pub streak: u32,
}

/// Fields touched by a mutation, used to decide what to persist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    pub progress: bool,
    pub goal: bool,
    pub current_day: bool,
    pub streak: bool,
    pub completed_days: bool,
}

impl Changes {
    pub fn all() -> Self {
        Self {
            progress: true,
            goal: true,
            current_day: true,
            streak: true,
            completed_days: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl BitOr for Changes {
    type Output = Changes;

    fn bitor(self, rhs: Self) -> Self::Output {
        Changes {
            progress: self.progress || rhs.progress,
            goal: self.goal || rhs.goal,
            current_day: self.current_day || rhs.current_day,
            streak: self.streak || rhs.streak,
            completed_days: self.completed_days || rhs.completed_days,
        }
    }
}

impl BitOrAssign for Changes {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

/// Result of a day advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub from: DayKey,
    pub to: DayKey,
    /// The outgoing day was added to the completed set by this advance.
    pub committed: bool,
    pub changes: Changes,
}

impl Advance {
    pub fn advanced(&self) -> bool {
        self.from != self.to
    }
}

/// Today's intake plus the history it feeds into.
#[derive(Debug, Clone)]
pub struct Tracker {
    state: TrackingState,
    completed: CompletedDaySet,
}

impl Tracker {
    pub fn new(today: DayKey) -> Self {
        Self::restore(CompletedDaySet::new(), 0.0, DEFAULT_GOAL_ML, today)
    }

    /// Rebuilds the tracker from persisted parts. Out-of-range values are clamped to defaults.
    pub fn restore(
        completed: CompletedDaySet,
        progress_ml: f64,
        goal_ml: f64,
        current_day: DayKey,
    ) -> Self {
        let progress_ml = if progress_ml.is_finite() && progress_ml > 0.0 {
            progress_ml
        } else {
            0.0
        };
        let goal_ml = if valid_quantity(goal_ml) {
            goal_ml
        } else {
            DEFAULT_GOAL_ML
        };
        let streak = compute_streak(&completed, current_day);
        Self {
            state: TrackingState {
                progress_ml,
                goal_ml,
                current_day,
                streak,
            },
            completed,
        }
    }

    pub fn state(&self) -> &TrackingState {
        &self.state
    }

    pub fn completed(&self) -> &CompletedDaySet {
        &self.completed
    }

    /// Fraction of the goal reached, capped at 1.
    pub fn fraction(&self) -> f64 {
        (self.state.progress_ml / self.state.goal_ml).min(1.0)
    }

    pub fn add_amount(&mut self, ml: f64) -> Result<Changes, TrackerError> {
        if !valid_amount(ml) {
            return Err(TrackerError::InvalidAmount(ml));
        }
        let next = self.state.progress_ml + ml;
        if !next.is_finite() {
            return Err(TrackerError::InvalidAmount(ml));
        }
        self.state.progress_ml = next;
        let mut changes = Changes {
            progress: true,
            ..Changes::default()
        };
        if self.state.progress_ml > 0.0 {
            changes.completed_days = self.completed.insert(self.state.current_day);
        }
        changes.streak = self.refresh_streak();
        Ok(changes)
    }

    /// Clamps at zero. Never un-marks a completed day.
    pub fn subtract_amount(&mut self, ml: f64) -> Result<Changes, TrackerError> {
        if !valid_amount(ml) {
            return Err(TrackerError::InvalidAmount(ml));
        }
        let before = self.state.progress_ml;
        self.state.progress_ml = (before - ml).max(0.0);
        Ok(Changes {
            progress: self.state.progress_ml != before,
            ..Changes::default()
        })
    }

    pub fn set_goal(&mut self, ml: f64) -> Result<Changes, TrackerError> {
        if !valid_quantity(ml) {
            return Err(TrackerError::InvalidGoal(ml));
        }
        let changed = self.state.goal_ml != ml;
        self.state.goal_ml = ml;
        Ok(Changes {
            goal: changed,
            ..Changes::default()
        })
    }

    /// Closes the current day and opens `new_day`.
    ///
    /// A no-op unless `new_day` is later than the current day, so repeated
    /// or stale calls neither double-count nor move the day backwards.
    pub fn advance_day(&mut self, new_day: DayKey) -> Advance {
        let from = self.state.current_day;
        if new_day <= from {
            return Advance {
                from,
                to: from,
                committed: false,
                changes: Changes::default(),
            };
        }

        let mut changes = Changes {
            current_day: true,
            ..Changes::default()
        };
        let committed = self.state.progress_ml > 0.0 && self.completed.insert(from);
        changes.completed_days = committed;

        self.state.current_day = new_day;
        if self.state.progress_ml != 0.0 {
            self.state.progress_ml = 0.0;
            changes.progress = true;
        }
        changes.streak = self.refresh_streak();

        Advance {
            from,
            to: new_day,
            committed,
            changes,
        }
    }

    /// Advances exactly one calendar day past the current one.
    pub fn skip_day(&mut self) -> Advance {
        match self.state.current_day.succ() {
            Some(next) => self.advance_day(next),
            None => self.advance_day(self.state.current_day),
        }
    }

    /// Forgets all history and restarts at `today` with the current goal.
    pub fn reset_all(&mut self, today: DayKey) -> Changes {
        let completed_days = self.completed.reset_all();
        let progress = self.state.progress_ml != 0.0;
        let current_day = self.state.current_day != today;
        self.state.progress_ml = 0.0;
        self.state.current_day = today;
        let streak = self.refresh_streak();
        Changes {
            progress,
            goal: false,
            current_day,
            streak,
            completed_days,
        }
    }

    fn refresh_streak(&mut self) -> bool {
        let streak = compute_streak(&self.completed, self.state.current_day);
        let changed = streak != self.state.streak;
        self.state.streak = streak;
        changed
    }
}

fn valid_quantity(ml: f64) -> bool {
    ml.is_finite() && ml > 0.0
}

fn valid_amount(ml: f64) -> bool {
    valid_quantity(ml) && ml <= MAX_AMOUNT_ML
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    fn tracker_on(day: &str) -> Tracker {
        Tracker::new(key(day))
    }

    #[test]
    fn starts_with_defaults() {
        let tracker = tracker_on("2025-03-26");
        let state = tracker.state();
        assert_eq!(state.progress_ml, 0.0);
        assert_eq!(state.goal_ml, DEFAULT_GOAL_ML);
        assert_eq!(state.streak, 0);
        assert!(tracker.completed().is_empty());
    }

    #[test]
    fn additions_accumulate_and_complete_the_day() {
        let mut tracker = tracker_on("2025-03-26");
        let first = tracker.add_amount(200.0).unwrap();
        assert!(first.completed_days);
        assert!(first.streak);
        assert!(tracker.completed().contains(key("2025-03-26")));
        assert_eq!(tracker.state().streak, 1);

        let second = tracker.add_amount(300.0).unwrap();
        assert!(!second.completed_days);
        tracker.add_amount(12.5).unwrap();
        assert_eq!(tracker.state().progress_ml, 512.5);
        assert_eq!(tracker.completed().len(), 1);
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let mut tracker = tracker_on("2025-03-26");
        assert!(matches!(tracker.add_amount(0.0), Err(TrackerError::InvalidAmount(_))));
        assert!(matches!(tracker.add_amount(-1.0), Err(TrackerError::InvalidAmount(_))));
        assert!(matches!(
            tracker.subtract_amount(f64::NAN),
            Err(TrackerError::InvalidAmount(_))
        ));
        assert!(tracker.completed().is_empty());
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        let mut tracker = tracker_on("2025-03-26");
        tracker.add_amount(MAX_AMOUNT_ML).unwrap();
        for amount in [MAX_AMOUNT_ML + 1.0, f64::MAX] {
            assert!(matches!(
                tracker.add_amount(amount),
                Err(TrackerError::InvalidAmount(_))
            ));
            assert!(matches!(
                tracker.subtract_amount(amount),
                Err(TrackerError::InvalidAmount(_))
            ));
        }
        assert_eq!(tracker.state().progress_ml, MAX_AMOUNT_ML);
    }

    #[test]
    fn progress_stays_finite_and_serializable() {
        let mut tracker =
            Tracker::restore(CompletedDaySet::new(), f64::MAX, 2000.0, key("2025-03-26"));
        for _ in 0..1000 {
            let _ = tracker.add_amount(MAX_AMOUNT_ML);
        }
        assert!(tracker.state().progress_ml.is_finite());

        let json = serde_json::to_value(tracker.state()).unwrap();
        assert!(json["progress_ml"].is_number());
    }

    #[test]
    fn subtraction_clamps_at_zero_and_keeps_completion() {
        let mut tracker = tracker_on("2025-03-26");
        tracker.add_amount(250.0).unwrap();
        tracker.subtract_amount(100.0).unwrap();
        assert_eq!(tracker.state().progress_ml, 150.0);
        for amount in [500.0, 1.0, 9999.0] {
            tracker.subtract_amount(amount).unwrap();
            assert_eq!(tracker.state().progress_ml, 0.0);
        }
        assert!(tracker.completed().contains(key("2025-03-26")));
        assert_eq!(tracker.state().streak, 1);
        let unchanged = tracker.subtract_amount(10.0).unwrap();
        assert!(unchanged.is_empty());
    }

    #[test]
    fn goal_must_be_positive() {
        let mut tracker = tracker_on("2025-03-26");
        assert!(matches!(tracker.set_goal(0.0), Err(TrackerError::InvalidGoal(_))));
        assert!(matches!(tracker.set_goal(-250.0), Err(TrackerError::InvalidGoal(_))));
        assert!(matches!(
            tracker.set_goal(f64::INFINITY),
            Err(TrackerError::InvalidGoal(_))
        ));
        assert_eq!(tracker.state().goal_ml, DEFAULT_GOAL_ML);
        assert!(tracker.set_goal(2500.0).unwrap().goal);
        assert_eq!(tracker.state().goal_ml, 2500.0);
    }

    #[test]
    fn fraction_is_capped() {
        let mut tracker = tracker_on("2025-03-26");
        tracker.add_amount(500.0).unwrap();
        assert_eq!(tracker.fraction(), 0.25);
        tracker.add_amount(5000.0).unwrap();
        assert_eq!(tracker.fraction(), 1.0);
    }

    #[test]
    fn advance_commits_day_with_intake() {
        let mut tracker = Tracker::restore(
            CompletedDaySet::from_keys(["2025-03-25"]),
            300.0,
            DEFAULT_GOAL_ML,
            key("2025-03-26"),
        );
        let advance = tracker.advance_day(key("2025-03-27"));
        assert!(advance.advanced());
        assert!(advance.committed);
        assert!(advance.changes.completed_days);
        assert_eq!(tracker.state().current_day, key("2025-03-27"));
        assert_eq!(tracker.state().progress_ml, 0.0);
        assert_eq!(tracker.state().streak, 2);
    }

    #[test]
    fn advance_after_empty_day_breaks_streak() {
        let mut tracker = Tracker::restore(
            CompletedDaySet::from_keys(["2025-03-25"]),
            0.0,
            DEFAULT_GOAL_ML,
            key("2025-03-26"),
        );
        assert_eq!(tracker.state().streak, 1);
        let advance = tracker.advance_day(key("2025-03-27"));
        assert!(!advance.committed);
        assert_eq!(tracker.state().streak, 0);
    }

    #[test]
    fn advance_is_idempotent() {
        let mut once = tracker_on("2025-03-26");
        once.add_amount(200.0).unwrap();
        let mut twice = once.clone();

        once.advance_day(key("2025-03-27"));
        twice.advance_day(key("2025-03-27"));
        let repeat = twice.advance_day(key("2025-03-27"));

        assert!(!repeat.advanced());
        assert!(repeat.changes.is_empty());
        assert_eq!(once.state(), twice.state());
        assert_eq!(once.completed(), twice.completed());
    }

    #[test]
    fn advance_never_regresses() {
        let mut tracker = tracker_on("2025-03-26");
        tracker.add_amount(100.0).unwrap();
        let advance = tracker.advance_day(key("2025-03-20"));
        assert!(!advance.advanced());
        assert_eq!(tracker.state().current_day, key("2025-03-26"));
        assert_eq!(tracker.state().progress_ml, 100.0);
    }

    #[test]
    fn catch_up_over_several_days_commits_only_last_active_day() {
        let mut tracker = tracker_on("2025-03-26");
        tracker.add_amount(100.0).unwrap();
        tracker.advance_day(key("2025-03-30"));
        assert_eq!(tracker.completed().to_keys(), vec!["2025-03-26".to_string()]);
        assert_eq!(tracker.state().streak, 0);
    }

    #[test]
    fn skip_day_moves_forward_by_one() {
        let mut tracker = tracker_on("2025-12-31");
        tracker.add_amount(200.0).unwrap();
        let advance = tracker.skip_day();
        assert_eq!(advance.to, key("2026-01-01"));
        assert_eq!(tracker.state().streak, 1);
    }

    #[test]
    fn reset_all_returns_to_defaults_but_keeps_goal() {
        let mut tracker = tracker_on("2025-03-26");
        tracker.set_goal(1800.0).unwrap();
        tracker.add_amount(200.0).unwrap();
        tracker.advance_day(key("2025-03-27"));
        tracker.add_amount(200.0).unwrap();

        let changes = tracker.reset_all(key("2025-03-27"));
        assert!(changes.completed_days);
        assert!(changes.progress);
        assert!(changes.streak);
        assert!(!changes.current_day);
        let state = tracker.state();
        assert_eq!(state.progress_ml, 0.0);
        assert_eq!(state.streak, 0);
        assert_eq!(state.goal_ml, 1800.0);
        assert!(tracker.completed().is_empty());
    }

    #[test]
    fn restore_clamps_bad_values() {
        let tracker = Tracker::restore(CompletedDaySet::new(), -40.0, 0.0, key("2025-03-26"));
        assert_eq!(tracker.state().progress_ml, 0.0);
        assert_eq!(tracker.state().goal_ml, DEFAULT_GOAL_ML);
    }

    #[test]
    fn changes_merge() {
        let a = Changes {
            progress: true,
            ..Changes::default()
        };
        let mut b = Changes {
            goal: true,
            ..Changes::default()
        };
        b |= a;
        assert!(b.progress && b.goal);
        assert!(!b.streak);
        assert!(Changes::default().is_empty());
    }
}
