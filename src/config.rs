use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, assembled once at startup and passed into the
/// components explicitly. Nothing here is global: tests construct their own
/// `Config` with an isolated upload directory and stub model command.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Directory for transient per-request upload files.
    pub upload_dir: PathBuf,
    /// Shell-style command line for the forecasting model; the uploaded
    /// file's path is appended as the final argument.
    pub model_command: String,
    /// Deadline for one model run. `None` disables the timeout.
    pub model_timeout: Option<Duration>,
    /// Upper bound on concurrently running model processes.
    pub max_concurrent_forecasts: usize,
    /// Allowed CORS origin; `None` means permissive.
    pub cors_origin: Option<String>,
}

impl Config {
    /// Split `model_command` into a program and its leading arguments.
    pub fn model_program(&self) -> Result<(String, Vec<String>)> {
        let mut words = shell_words::split(&self.model_command)?;
        if words.is_empty() {
            bail!("Model command is empty");
        }
        let program = words.remove(0);
        Ok((program, words))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            upload_dir: PathBuf::from("uploads"),
            model_command: "python ./ml/ml_model.py".to_string(),
            model_timeout: Some(Duration::from_secs(120)),
            max_concurrent_forecasts: 4,
            cors_origin: None,
        }
    }
}
