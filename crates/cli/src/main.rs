use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = alkahest_cli::run(alkahest_cli::args::Cli::parse()).await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
