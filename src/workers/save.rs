// src/workers/save.rs

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::info;

use crate::exec::{WorkContext, WorkFuture, Worker};
use crate::work::WorkData;
use crate::workers::{simulate_work, KEY_IMAGE_URI};

/// Stores the final image. Outputs the saved location under `uri` and the
/// source under `saved_from`.
#[derive(Debug)]
pub struct SaveWorker {
    delay: Duration,
    saved: AtomicU64,
}

impl SaveWorker {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            saved: AtomicU64::new(0),
        }
    }
}

impl Worker for SaveWorker {
    fn execute(&self, ctx: WorkContext) -> WorkFuture<'_> {
        Box::pin(async move {
            let source = ctx.require_str(KEY_IMAGE_URI)?.to_string();
            simulate_work(&ctx, self.delay).await?;

            let n = self.saved.fetch_add(1, Ordering::SeqCst) + 1;
            let target = format!("saved://{n}");
            info!(chain = %ctx.chain, unit = %ctx.unit_id, %source, %target, "image saved");

            Ok(WorkData::new()
                .with(KEY_IMAGE_URI, target)
                .with("saved_from", source))
        })
    }
}
