use crate::clock::ClockSource;
use crate::engine::Engine;
use chrono::{DateTime, FixedOffset};
use std::{sync::Arc, time::Duration};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{info, warn};

/// Wait used when the next midnight cannot be computed; the fire path re-checks the day anyway.
const REARM_FALLBACK: Duration = Duration::from_secs(15 * 60);

/// First instant of the local day after `now`.
pub fn next_midnight(
    clock: &dyn ClockSource,
    now: DateTime<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    let tomorrow = now.date_naive().succ_opt()?;
    clock.start_of_day(tomorrow)
}

pub fn delay_until_next_midnight(clock: &dyn ClockSource) -> Option<Duration> {
    let now = clock.now();
    let midnight = next_midnight(clock, now)?;
    (midnight - now).to_std().ok()
}

/// Runs the midnight rollover loop: sleep until local midnight, advance, re-arm.
///
/// Each fire goes through the same engine lock as user requests.
pub fn spawn_rollover_task(
    engine: Arc<Mutex<Engine>>,
    clock: Arc<dyn ClockSource>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let delay = match delay_until_next_midnight(clock.as_ref()) {
                Some(delay) => {
                    info!("rollover armed, firing in {}s", delay.as_secs());
                    delay
                }
                None => {
                    warn!(
                        "could not arm rollover timer, re-checking in {}s",
                        REARM_FALLBACK.as_secs()
                    );
                    REARM_FALLBACK
                }
            };

            tokio::time::sleep(delay).await;

            let mut engine = engine.lock().await;
            let advance = engine.resync().await;
            if advance.advanced() {
                info!("rollover fired: now tracking {}", advance.to);
            }
        }
    })
}
