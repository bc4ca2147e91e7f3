use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error};

use demandcast::config::Config;
use demandcast::server;

/// Demand forecasting API server
#[derive(Parser)]
#[command(name = "demandcast")]
#[command(about = "Serve demand forecasts by running an external forecasting model", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Address to bind the HTTP server to
    #[arg(long, env = "DEMANDCAST_BIND", default_value = "0.0.0.0:5000")]
    bind: String,

    /// Directory for transient upload files
    #[arg(long, env = "DEMANDCAST_UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Command line for the forecasting model; the uploaded file's path is
    /// appended as the final argument
    #[arg(
        long,
        env = "DEMANDCAST_MODEL_COMMAND",
        default_value = "python ./ml/ml_model.py"
    )]
    model_command: String,

    /// Seconds one model run may take before it is killed (0 disables)
    #[arg(long, env = "DEMANDCAST_MODEL_TIMEOUT_SECS", default_value = "120")]
    model_timeout_secs: u64,

    /// Upper bound on concurrently running model processes
    #[arg(long, env = "DEMANDCAST_MAX_CONCURRENT", default_value = "4")]
    max_concurrent_forecasts: usize,

    /// Allowed CORS origin (permissive when unset)
    #[arg(long, env = "DEMANDCAST_CORS_ORIGIN")]
    cors_origin: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .init();

    debug!("Demandcast started with verbosity level: {}", cli.verbose);

    let config = Config {
        bind_addr: cli.bind,
        upload_dir: cli.upload_dir,
        model_command: cli.model_command,
        model_timeout: match cli.model_timeout_secs {
            0 => None,
            secs => Some(std::time::Duration::from_secs(secs)),
        },
        max_concurrent_forecasts: cli.max_concurrent_forecasts.max(1),
        cors_origin: cli.cors_origin,
    };

    if let Err(e) = server::serve(config).await {
        error!("Server error: {:#}", e);
        std::process::exit(1);
    }
}
