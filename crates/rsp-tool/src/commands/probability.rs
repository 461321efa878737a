use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use super::{combine_pair, Session};

#[derive(Args, Debug)]
pub struct ProbabilityArgs {
    /// Matrix file of the counted outcome.
    pub a: PathBuf,
    /// Matrix file of the competing outcome.
    pub b: PathBuf,
    /// Destination of `a / (a + b)`.
    #[arg(long, short)]
    pub output: PathBuf,
}

pub fn run(args: &ProbabilityArgs, session: &Session) -> Result<(), Box<dyn Error>> {
    combine_pair(session, &args.a, &args.b, &args.output, |a, b| {
        a.probability(b)
    })?;
    Ok(())
}
