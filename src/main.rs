use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use plnav::{cli, output, router};

/// Log filter comes from `PLNAV_LOG`; logs go to stderr so stdout stays
/// machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("PLNAV_LOG").unwrap_or_else(|_| EnvFilter::new("plnav=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = cli::parse();
    let json = cli.json;
    let code = match router::dispatch(cli).await {
        Ok(code) => code,
        Err(err) => output::format_error(&err, json),
    };
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
