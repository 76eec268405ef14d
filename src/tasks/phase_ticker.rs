//! The single tick task that advances a running clock

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::state::{AppState, Schedule};

/// Background task that polls the clock while it runs.
///
/// At most one interval is alive at a time: every schedule change cancels
/// the current one before the next is created.
pub async fn phase_ticker_task(state: Arc<AppState>, tick: Duration) {
    info!("Starting phase ticker task ({}ms ticks)", tick.as_millis());

    let mut schedule_rx = state.subscribe_schedule();

    loop {
        let schedule = *schedule_rx.borrow_and_update();

        let open = if schedule.running {
            run_schedule(&state, &mut schedule_rx, schedule, tick).await
        } else {
            debug!("Clock not running, waiting for a schedule change");
            schedule_rx.changed().await.is_ok()
        };

        if !open {
            info!("Schedule channel closed, stopping phase ticker task");
            break;
        }
    }
}

/// Poll on every tick until the schedule changes. Returns false once the
/// schedule channel is closed.
async fn run_schedule(
    state: &AppState,
    schedule_rx: &mut watch::Receiver<Schedule>,
    schedule: Schedule,
    tick: Duration,
) -> bool {
    debug!("Scheduling polls for generation {}", schedule.generation);

    let mut ticks = interval(tick);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                if let Err(e) = state.poll(schedule.generation) {
                    error!("Failed to poll clock: {}", e);
                }
            }

            changed = schedule_rx.changed() => {
                debug!("Cancelling polls for generation {}", schedule.generation);
                return changed.is_ok();
            }
        }
    }
}
