use clap::Parser;
use tracing_subscriber::EnvFilter;

use cert_portal::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file_error = cert_portal::config::load_env_file();

    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Some(e) = env_file_error {
        tracing::warn!("ignoring unreadable .env file: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = cert_portal::cli::run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
