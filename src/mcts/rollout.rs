//! Parallel rollouts on the job scheduler.
//!
//! One expansion schedules a batch of `RolloutJob`s against the same shared
//! state. Each job writes its own slot of the batch's result buffer; the
//! controlling thread waits on the batch tag and then sums the slots, so the
//! aggregate does not depend on completion order.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::core::SimRng;
use crate::rules::GameState;
use crate::scheduler::{Job, JobScheduler, JobTag};

/// Result slots of one rollout batch; `None` until the job reports.
pub type RolloutResults = Arc<Mutex<Vec<Option<f64>>>>;

/// One rollout of a shared state, reporting into a result slot.
pub struct RolloutJob<S: GameState> {
    state: Arc<S>,
    rng: SimRng,
    slot: usize,
    results: RolloutResults,
    tag: JobTag,
}

impl<S: GameState> RolloutJob<S> {
    /// Create a job that rolls `state` out with `rng` into `results[slot]`.
    pub fn new(
        state: Arc<S>,
        rng: SimRng,
        slot: usize,
        results: RolloutResults,
        tag: JobTag,
    ) -> Self {
        Self {
            state,
            rng,
            slot,
            results,
            tag,
        }
    }
}

impl<S: GameState> Job for RolloutJob<S> {
    fn tag(&self) -> Option<JobTag> {
        Some(self.tag)
    }

    fn execute(mut self: Box<Self>) {
        let score = self.state.rollout(&mut self.rng);
        let score = if score.is_nan() {
            warn!(slot = self.slot, "rollout returned NaN; discarded");
            None
        } else if !(0.0..=1.0).contains(&score) {
            warn!(slot = self.slot, score, "rollout score outside [0, 1]; clamped");
            Some(score.clamp(0.0, 1.0))
        } else {
            Some(score)
        };
        self.results.lock()[self.slot] = score;
    }
}

/// Run `fan_out` rollouts of `state` in parallel and wait for all of them.
///
/// Returns the summed score and the number of rollouts that reported.
/// Each job gets its own fork of `rng`.
pub fn run_batch<S: GameState>(
    scheduler: &JobScheduler,
    state: &Arc<S>,
    rng: &mut SimRng,
    fan_out: usize,
) -> (f64, u32) {
    let results: RolloutResults = Arc::new(Mutex::new(vec![None; fan_out]));
    let tag = scheduler.next_tag();

    for slot in 0..fan_out {
        scheduler.schedule(Box::new(RolloutJob::new(
            Arc::clone(state),
            rng.fork(),
            slot,
            Arc::clone(&results),
            tag,
        )));
    }
    scheduler.wait_until_finished(Some(tag));

    let results = results.lock();
    let (score, count) = results
        .iter()
        .flatten()
        .fold((0.0, 0u32), |(sum, n), &s| (sum + s, n + 1));

    if (count as usize) < fan_out {
        warn!(%tag, reported = count, expected = fan_out, "rollout batch came back short");
    }
    trace!(%tag, score, count, "rollout batch finished");
    (score, count)
}
