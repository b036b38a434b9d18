use clap::Parser;
use justetf_rs::cli::{self, ProfileArgs};

#[tokio::main]
async fn main() {
    let args = ProfileArgs::parse();
    cli::init_tracing();
    let status = cli::run_profiles(&args).await;
    std::process::exit(status.exit_code());
}
