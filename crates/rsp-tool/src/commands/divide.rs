use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use super::{combine_pair, Session};

#[derive(Args, Debug)]
pub struct DivideArgs {
    /// Matrix file holding the dividend.
    pub numerator: PathBuf,
    /// Matrix file holding the divisor.
    pub denominator: PathBuf,
    /// Destination of the quotient.
    #[arg(long, short)]
    pub output: PathBuf,
}

/// Divides bin by bin; bins with a zero divisor become zero.
pub fn run(args: &DivideArgs, session: &Session) -> Result<(), Box<dyn Error>> {
    combine_pair(
        session,
        &args.numerator,
        &args.denominator,
        &args.output,
        |numerator, denominator| numerator.try_div_assign(denominator),
    )?;
    Ok(())
}
