use std::path::PathBuf;
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("libras=info,libras_lib=info"));
    fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let snapshot = std::env::var_os("LIBRAS_SNAPSHOT").map(PathBuf::from);

    match libras_lib::run(config_path, snapshot).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
