use clap::Parser;
use justetf_rs::cli::{self, DiscoveryArgs};

#[tokio::main]
async fn main() {
    let args = DiscoveryArgs::parse();
    cli::init_tracing();
    let status = cli::run_discovery(&args).await;
    std::process::exit(status.exit_code());
}
