use anyhow::Result;
use bench_report::cli;

// Main entry point
fn main() -> Result<()> {
    cli::handle_calls()
}
