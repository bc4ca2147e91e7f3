use crate::error::{ForecastError, Result};
use crate::forecast::model::ForecastResult;
use crate::subprocess::{ExitStatus, ProcessOutput};

/// Interpret a finished model process: a zero exit with shape-valid stdout
/// becomes a `ForecastResult`, everything else a classified error. No numeric
/// validation and no reordering happen here; the model's output is the
/// response.
pub fn translate(output: ProcessOutput) -> Result<ForecastResult> {
    match output.status {
        ExitStatus::Success => serde_json::from_str(&output.stdout).map_err(|e| {
            tracing::warn!("Model stdout did not parse as a forecast: {}", e);
            ForecastError::UnparseableOutput
        }),
        ExitStatus::Timeout => Err(ForecastError::ModelFailed(format!(
            "Forecast model timed out after {:?}",
            output.duration
        ))),
        ExitStatus::Error(_) | ExitStatus::Signal(_) => {
            let stderr = output.stderr.trim();
            let message = if stderr.is_empty() {
                "Forecast model failed".to_string()
            } else {
                stderr.to_string()
            };
            Err(ForecastError::ModelFailed(message))
        }
    }
}
