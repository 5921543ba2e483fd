use clap::Parser;
use portfolio_manager::cli::{self, Cli};
use portfolio_manager::config::Service;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = cli::run(Service::Api, cli).await {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}
