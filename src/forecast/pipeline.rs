use crate::error::Result;
use crate::forecast::invoker::ModelInvoker;
use crate::forecast::model::ForecastResult;
use crate::forecast::translate;
use crate::upload::UploadStore;

/// The per-request orchestrator: intake, model invocation, translation, and
/// unconditional cleanup. One pipeline instance serves all requests; each
/// call is an isolated unit of work with no shared mutable state beyond the
/// upload directory namespace and the invoker's permit pool.
pub struct ForecastPipeline {
    store: UploadStore,
    invoker: ModelInvoker,
}

impl ForecastPipeline {
    pub fn new(store: UploadStore, invoker: ModelInvoker) -> Self {
        Self { store, invoker }
    }

    /// Run one upload through the full pipeline. The transient file is
    /// deleted before the outcome is resolved, on every path past intake,
    /// including launch failure; a deletion failure is logged and never
    /// changes the outcome.
    pub async fn run(&self, original_filename: &str, bytes: &[u8]) -> Result<ForecastResult> {
        let mut artifact = self.store.store(original_filename, bytes).await?;

        let outcome = self.invoker.invoke(artifact.path()).await;

        artifact.cleanup().await;

        translate::translate(outcome?)
    }
}
