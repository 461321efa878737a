use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use super::{combine_pair, Session};

#[derive(Args, Debug)]
pub struct RatioArgs {
    /// Matrix file holding the numerator.
    pub numerator: PathBuf,
    /// Matrix file holding the denominator.
    pub denominator: PathBuf,
    /// Destination of the normalized ratio.
    #[arg(long, short)]
    pub output: PathBuf,
}

pub fn run(args: &RatioArgs, session: &Session) -> Result<(), Box<dyn Error>> {
    combine_pair(
        session,
        &args.numerator,
        &args.denominator,
        &args.output,
        |numerator, denominator| numerator.ratio(denominator),
    )?;
    Ok(())
}
