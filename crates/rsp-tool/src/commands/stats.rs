use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use rsp_io::AnyMatrix;
use serde_json::json;

use super::Session;

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Matrix file to summarize.
    pub file: PathBuf,
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &StatsArgs, session: &Session) -> Result<(), Box<dyn Error>> {
    let matrix = session.load(&args.file)?;
    println!("{}", render(&matrix, args.json)?);
    Ok(())
}

/// Text or JSON statistics report of `matrix`.
pub fn render(matrix: &AnyMatrix, as_json: bool) -> Result<String, Box<dyn Error>> {
    let statistics = matrix.statistics();
    if !as_json {
        return Ok(statistics.to_string());
    }
    let payload = json!({
        "family": matrix.family(),
        "simulated_events": matrix.meta().simulated_events,
        "anchor": matrix.meta().anchor,
        "statistics": statistics,
    });
    Ok(serde_json::to_string_pretty(&payload)?)
}
