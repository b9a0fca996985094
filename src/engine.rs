use crate::clock::ClockSource;
use crate::completed::CompletedDaySet;
use crate::day_key::{key_of, DayKey};
use crate::errors::{StoreError, TrackerError};
use crate::models::Snapshot;
use crate::storage::{ScalarKey, Store};
use crate::tracker::{Advance, Changes, QUICK_ADD_AMOUNTS_ML, Tracker};
use crate::week::{current_week, WeekDay};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Single owner of the tracker. Loads once, persists after every mutation.
pub struct Engine {
    tracker: Tracker,
    store: Box<dyn Store>,
    clock: Arc<dyn ClockSource>,
    /// Fields whose last write failed; retried with the next mutation.
    pending: Changes,
    warning: Option<String>,
}

impl Engine {
    /// Restores state from `store`, falling back per field, then catches up to the clock's day.
    pub async fn load(
        store: Box<dyn Store>,
        clock: Arc<dyn ClockSource>,
        default_goal_ml: f64,
    ) -> Self {
        let today = key_of(&clock.now());
        let (tracker, pending, warning) = restore(store.as_ref(), today, default_goal_ml);

        let mut engine = Self {
            tracker,
            store,
            clock,
            pending,
            warning,
        };
        info!(
            "loaded tracker: day={} progress={}ml goal={}ml streak={} completed_days={}",
            engine.tracker.state().current_day,
            engine.tracker.state().progress_ml,
            engine.tracker.state().goal_ml,
            engine.tracker.state().streak,
            engine.tracker.completed().len()
        );
        engine.resync().await;
        engine
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn today(&self) -> DayKey {
        key_of(&self.clock.now())
    }

    /// Catch-up check: advances to the clock's day if a boundary was crossed.
    pub async fn resync(&mut self) -> Advance {
        let today = self.today();
        self.advance_day(today).await
    }

    pub async fn advance_day(&mut self, new_day: DayKey) -> Advance {
        let advance = self.tracker.advance_day(new_day);
        if advance.advanced() {
            info!(
                "advanced day {} -> {} (committed={}, streak={})",
                advance.from,
                advance.to,
                advance.committed,
                self.tracker.state().streak
            );
        }
        self.persist(advance.changes).await;
        advance
    }

    pub async fn skip_day(&mut self) -> Advance {
        let advance = self.tracker.skip_day();
        info!("skipped ahead {} -> {}", advance.from, advance.to);
        self.persist(advance.changes).await;
        advance
    }

    pub async fn add_amount(&mut self, ml: f64) -> Result<(), TrackerError> {
        let changes = self.tracker.add_amount(ml)?;
        if changes.completed_days {
            info!("day {} completed", self.tracker.state().current_day);
        }
        self.persist(changes).await;
        Ok(())
    }

    pub async fn quick_add(&mut self, index: usize) -> Option<Result<(), TrackerError>> {
        let amount = QUICK_ADD_AMOUNTS_ML.get(index).copied()?;
        Some(self.add_amount(amount).await)
    }

    pub async fn subtract_amount(&mut self, ml: f64) -> Result<(), TrackerError> {
        let changes = self.tracker.subtract_amount(ml)?;
        self.persist(changes).await;
        Ok(())
    }

    pub async fn set_goal(&mut self, ml: f64) -> Result<(), TrackerError> {
        let changes = self.tracker.set_goal(ml)?;
        self.persist(changes).await;
        Ok(())
    }

    pub async fn reset_all(&mut self) {
        let today = self.today();
        let changes = self.tracker.reset_all(today);
        warn!("all tracking data reset, day={today}");
        self.persist(changes).await;
    }

    /// Rewrites every field. Called before shutdown.
    pub async fn flush(&mut self) -> Result<(), TrackerError> {
        self.persist(Changes::all()).await;
        match &self.warning {
            Some(_) if !self.pending.is_empty() => Err(TrackerError::PersistenceWrite(
                StoreError::Unavailable(format!("{:?} not written", self.pending)),
            )),
            _ => Ok(()),
        }
    }

    pub fn week(&self) -> Vec<WeekDay> {
        current_week(self.tracker.state().current_day, self.tracker.completed())
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.tracker.state();
        Snapshot {
            date: state.current_day,
            progress_ml: state.progress_ml,
            goal_ml: state.goal_ml,
            streak: state.streak,
            fraction: self.tracker.fraction(),
            goal_reached: state.progress_ml >= state.goal_ml,
            quick_add_ml: QUICK_ADD_AMOUNTS_ML.to_vec(),
            warning: self.warning.clone(),
        }
    }

    /// Stages the changed fields plus any left over from a failed commit, then commits once.
    async fn persist(&mut self, changes: Changes) {
        let todo = changes | self.pending;
        if todo.is_empty() {
            return;
        }

        let state = self.tracker.state();
        if todo.completed_days {
            let days = self.tracker.completed().to_keys();
            self.store.save_completed_days(&days);
        }
        let scalars: [(bool, ScalarKey, Value); 4] = [
            (todo.progress, ScalarKey::Progress, json!(state.progress_ml)),
            (todo.goal, ScalarKey::Goal, json!(state.goal_ml)),
            (todo.current_day, ScalarKey::CurrentDay, json!(state.current_day)),
            (todo.streak, ScalarKey::Streak, json!(state.streak)),
        ];
        for (needed, key, value) in scalars {
            if needed {
                self.store.save_scalar(key, value);
            }
        }

        match self.store.commit().await {
            Ok(()) => {
                self.pending = Changes::default();
                self.warning = None;
            }
            Err(err) => {
                let err = TrackerError::PersistenceWrite(err);
                warn!("{err}; will retry on next change");
                self.pending = todo;
                self.warning = Some(err.to_string());
            }
        }
    }
}

/// Reads every persisted field, falling back individually. Returns the tracker,
/// the fields that need rewriting, and the read warning if any.
fn restore(
    store: &dyn Store,
    today: DayKey,
    default_goal_ml: f64,
) -> (Tracker, Changes, Option<String>) {
    let mut warning = None;
    let mut record = |err: StoreError| {
        let err = TrackerError::PersistenceRead(err);
        warn!("{err}; using defaults");
        warning = Some(err.to_string());
    };

    let completed = match store.load_completed_days() {
        Ok(Some(days)) => CompletedDaySet::from_keys(days),
        Ok(None) => CompletedDaySet::new(),
        Err(err) => {
            record(err);
            CompletedDaySet::new()
        }
    };

    let mut scalar = |key: ScalarKey| match store.load_scalar(key) {
        Ok(value) => value,
        Err(err) => {
            record(err);
            None
        }
    };
    let progress = scalar(ScalarKey::Progress).and_then(|v| v.as_f64());
    let goal = scalar(ScalarKey::Goal).and_then(|v| v.as_f64());
    let current_day = scalar(ScalarKey::CurrentDay)
        .and_then(|v| v.as_str().and_then(|s| s.parse::<DayKey>().ok()));
    let stored_streak = scalar(ScalarKey::Streak).and_then(|v| v.as_u64());

    if current_day.is_none() {
        debug!("no persisted current day, starting at {today}");
    }
    let goal = goal.filter(|g| g.is_finite() && *g > 0.0).unwrap_or(default_goal_ml);
    let tracker = Tracker::restore(
        completed,
        progress.unwrap_or(0.0),
        goal,
        current_day.unwrap_or(today),
    );

    let mut pending = Changes::default();
    if stored_streak != Some(u64::from(tracker.state().streak)) {
        pending.streak = true;
    }
    if current_day.is_none() {
        pending.current_day = true;
    }
    (tracker, pending, warning)
}
