//! Daily jobs on a single repeating timer.

use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Time from `now` to the next local midnight in `now`'s time zone.
pub fn until_next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
    let next = now
        .date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|midnight| now.timezone().from_local_datetime(&midnight).earliest());

    match next {
        Some(next) => (next - now.clone()).to_std().unwrap_or(DAY),
        // Midnight skipped by a DST jump; try again in a day
        None => DAY,
    }
}

/// Run `job` after `first_delay`, then every 24 hours, until `cancel` fires.
pub fn spawn_daily<F>(first_delay: Duration, cancel: CancellationToken, mut job: F) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + first_delay, DAY);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Daily job cancelled");
                    break;
                }
                _ = interval.tick() => job(),
            }
        }
    })
}

/// Run `job` at every local midnight until `cancel` fires.
pub fn spawn_at_midnight<F>(cancel: CancellationToken, job: F) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    let delay = until_next_midnight(&Local::now());
    tracing::debug!("Next midnight in {}s", delay.as_secs());
    spawn_daily(delay, cancel, job)
}
