//! Forecast orchestration: model invocation, output translation, and the
//! per-request pipeline tying them to upload intake and cleanup.

pub mod invoker;
pub mod model;
pub mod pipeline;
pub mod translate;

pub use invoker::ModelInvoker;
pub use model::{ActualPoint, ForecastPoint, ForecastResult};
pub use pipeline::ForecastPipeline;
pub use translate::translate;
