// src/workers/cleanup.rs

use std::time::Duration;

use tracing::debug;

use crate::exec::{WorkContext, WorkFuture, Worker};
use crate::work::WorkData;
use crate::workers::simulate_work;

/// Clears temporary state before a pipeline run. Produces no output.
#[derive(Debug, Clone)]
pub struct CleanupWorker {
    delay: Duration,
}

impl CleanupWorker {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Worker for CleanupWorker {
    fn execute(&self, ctx: WorkContext) -> WorkFuture<'_> {
        Box::pin(async move {
            debug!(chain = %ctx.chain, unit = %ctx.unit_id, "cleaning up temporary files");
            simulate_work(&ctx, self.delay).await?;
            Ok(WorkData::new())
        })
    }
}
