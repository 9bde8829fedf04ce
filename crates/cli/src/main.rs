//! offload-bench CLI entry point.

use colored::Colorize;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = offload_bench_cli::run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
