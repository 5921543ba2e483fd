use clap::Parser;
use portfolio_manager::cli::{self, Cli};
use portfolio_manager::config::Service;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = cli::run(Service::Auth, cli).await {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}
