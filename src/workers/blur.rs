// src/workers/blur.rs

use std::time::Duration;

use tracing::info;

use crate::exec::{WorkContext, WorkFuture, Worker};
use crate::work::WorkData;
use crate::workers::{simulate_work, KEY_IMAGE_URI};

/// One blur pass. Requires a non-empty `uri` input and outputs the URI of
/// the blurred image.
#[derive(Debug, Clone)]
pub struct BlurWorker {
    delay: Duration,
}

impl BlurWorker {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Worker for BlurWorker {
    fn execute(&self, ctx: WorkContext) -> WorkFuture<'_> {
        Box::pin(async move {
            let source = ctx.require_str(KEY_IMAGE_URI)?.to_string();
            info!(chain = %ctx.chain, unit = %ctx.unit_id, %source, "blurring image");

            simulate_work(&ctx, self.delay).await?;

            Ok(WorkData::new().with(KEY_IMAGE_URI, format!("{source}#blurred")))
        })
    }
}
