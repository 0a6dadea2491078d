use clap::Parser;
use colored::*;
use delimited_ingest::cli::{self, Args};
use std::process;

fn main() {
    let args = Args::parse();
    cli::setup_logging(&args);

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    // Ingestion cannot be cancelled cleanly mid-file; Ctrl-C abandons the run
    let result = runtime.block_on(async {
        let shutdown_signal = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to install CTRL+C signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            result = cli::run(args) => result,
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, ingestion interrupted");
                Err(anyhow::anyhow!("Ingestion interrupted by user"))
            }
        }
    });

    match result {
        Ok(reports) => {
            let total: usize = reports.iter().map(|r| r.row_count).sum();
            tracing::debug!("Ingested {} rows from {} files", total, reports.len());
            process::exit(0);
        }
        Err(error) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), error);
            process::exit(1);
        }
    }
}
