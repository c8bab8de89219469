// src/workers/mod.rs

//! Sample workers for the image pipeline.
//!
//! These stand in for real image processing so the CLI and the tests have
//! something concrete to run. They only shuffle URIs around; the
//! "work" is a configurable delay that respects stop requests.

use std::time::Duration;

use crate::chain::Chain;
use crate::config::WorkersSection;
use crate::errors::WorkError;
use crate::exec::{WorkContext, WorkerRegistry};
use crate::types::Constraint;
use crate::work::WorkUnitSpec;

pub mod blur;
pub mod cleanup;
pub mod save;

pub use blur::BlurWorker;
pub use cleanup::CleanupWorker;
pub use save::SaveWorker;

/// Input/output key carrying the image location.
pub const KEY_IMAGE_URI: &str = "uri";
/// Tag put on every blur unit.
pub const TAG_PROGRESS: &str = "progress";
/// Tag put on the final save unit.
pub const TAG_OUTPUT: &str = "output";
/// Unique chain name used for the image pipeline.
pub const IMAGE_MANIPULATION_WORK_NAME: &str = "image_manipulation_work";

pub const KIND_CLEANUP: &str = "cleanup";
pub const KIND_BLUR: &str = "blur";
pub const KIND_SAVE: &str = "save";

/// Registry with the three sample kinds.
pub fn sample_registry(settings: &WorkersSection) -> WorkerRegistry {
    let delay = Duration::from_millis(settings.simulated_delay_ms);
    WorkerRegistry::new()
        .with(KIND_CLEANUP, CleanupWorker::new(delay))
        .with(KIND_BLUR, BlurWorker::new(delay))
        .with(KIND_SAVE, SaveWorker::new(delay))
}

/// Cleanup, then `blur_level` blur passes, then a save that only runs while
/// charging.
///
/// Only the first blur gets the image URI as input; later passes pick up
/// the URI from the previous pass's output.
pub fn image_pipeline(image_uri: &str, blur_level: usize) -> Chain {
    let mut chain = Chain::begin(WorkUnitSpec::new(KIND_CLEANUP));

    for i in 0..blur_level {
        let mut blur = WorkUnitSpec::new(KIND_BLUR).tag(TAG_PROGRESS);
        if i == 0 {
            blur = blur.input(KEY_IMAGE_URI, image_uri);
        }
        chain = chain.then(blur);
    }

    chain.then(
        WorkUnitSpec::new(KIND_SAVE)
            .tag(TAG_OUTPUT)
            .constraint(Constraint::Charging),
    )
}

/// Sleep for `delay`, returning early with an error if the unit is stopped.
pub(crate) async fn simulate_work(ctx: &WorkContext, delay: Duration) -> Result<(), WorkError> {
    if delay.is_zero() {
        return Ok(());
    }

    tokio::select! {
        _ = tokio::time::sleep(delay) => Ok(()),
        _ = ctx.stopped() => Err(WorkError::Execution("stopped".to_string())),
    }
}
