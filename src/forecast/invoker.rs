use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::subprocess::{ProcessCommandBuilder, ProcessError, ProcessOutput, SubprocessManager};

/// Launches the external forecasting model, one process per call, with the
/// uploaded file's path as its sole positional argument.
///
/// Concurrent launches are gated by a semaphore so a burst of requests cannot
/// fork an unbounded number of model processes; waiters queue in arrival
/// order until a permit frees up.
pub struct ModelInvoker {
    program: String,
    leading_args: Vec<String>,
    timeout: Option<Duration>,
    subprocess: SubprocessManager,
    permits: Arc<Semaphore>,
}

impl ModelInvoker {
    pub fn new(
        program: String,
        leading_args: Vec<String>,
        timeout: Option<Duration>,
        max_concurrent: usize,
        subprocess: SubprocessManager,
    ) -> Self {
        Self {
            program,
            leading_args,
            timeout,
            subprocess,
            permits: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Run the model against one input file and capture everything it wrote.
    /// Exit-code semantics are left to the translator.
    pub async fn invoke(&self, input: &Path) -> Result<ProcessOutput, ProcessError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ProcessError::Internal {
                message: "Forecast process pool is closed".to_string(),
            })?;

        tracing::debug!("Invoking forecast model on {}", input.display());

        let mut builder = ProcessCommandBuilder::new(&self.program)
            .args(&self.leading_args)
            .arg(&input.to_string_lossy());

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        self.subprocess.runner().run(builder.build()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn invoker(subprocess: SubprocessManager) -> ModelInvoker {
        ModelInvoker::new(
            "python".to_string(),
            vec!["./ml/ml_model.py".to_string()],
            None,
            2,
            subprocess,
        )
    }

    #[tokio::test]
    async fn passes_input_path_as_last_argument() {
        let (subprocess, mut mock) = SubprocessManager::mock();
        mock.expect_command("python")
            .returns_stdout("{}")
            .finish();

        let invoker = invoker(subprocess);
        invoker
            .invoke(&PathBuf::from("uploads/abc.csv"))
            .await
            .unwrap();

        let history = mock.get_call_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].args, vec!["./ml/ml_model.py", "uploads/abc.csv"]);
    }

    #[tokio::test]
    async fn launches_exactly_one_process_per_call() {
        let (subprocess, mut mock) = SubprocessManager::mock();
        mock.expect_command("python").returns_exit_code(1).finish();

        let invoker = invoker(subprocess);
        let output = invoker.invoke(&PathBuf::from("a.csv")).await.unwrap();
        assert_eq!(output.status.code(), Some(1));
        assert!(mock.verify_called("python", 1));
    }

    #[tokio::test]
    async fn configured_deadline_reaches_the_command() {
        let (subprocess, mut mock) = SubprocessManager::mock();
        mock.expect_command("python").returns_stdout("{}").finish();

        let invoker = ModelInvoker::new(
            "python".to_string(),
            vec![],
            Some(Duration::from_secs(42)),
            1,
            subprocess,
        );
        invoker.invoke(&PathBuf::from("a.csv")).await.unwrap();

        let history = mock.get_call_history();
        assert_eq!(history[0].timeout, Some(Duration::from_secs(42)));
    }
}
