use std::error::Error;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use rsp_tool::commands::{
    append::{self, AppendArgs},
    divide::{self, DivideArgs},
    join::{self, JoinArgs},
    probability::{self, ProbabilityArgs},
    ratio::{self, RatioArgs},
    stats::{self, StatsArgs},
};
use rsp_tool::{Session, ToolConfig};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "rsp-tool", about = "Response matrix file manipulation")]
struct Cli {
    /// YAML configuration with engine limits, join suffixes and the default encoding.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Raise the log level; repeat for more detail.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Write sparse text bodies instead of binary streams.
    #[arg(long, global = true)]
    sparse: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sum like-typed matrix files into one.
    Append(AppendArgs),
    /// Divide two matrices bin by bin.
    Divide(DivideArgs),
    /// Divide two matrices and rescale by the ratio of their sums.
    Ratio(RatioArgs),
    /// Compute `a / (a + b)` bin by bin.
    Probability(ProbabilityArgs),
    /// Join all `prefix*suffix` files of a directory into `prefix+suffix`.
    Join(JoinArgs),
    /// Print summary statistics of a matrix file.
    Stats(StatsArgs),
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    let config = ToolConfig::load(cli.config.as_deref())?;
    let session = Session::new(config, cli.sparse);
    match cli.command {
        Command::Append(args) => append::run(&args, &session),
        Command::Divide(args) => divide::run(&args, &session),
        Command::Ratio(args) => ratio::run(&args, &session),
        Command::Probability(args) => probability::run(&args, &session),
        Command::Join(args) => join::run(&args, &session),
        Command::Stats(args) => stats::run(&args, &session),
    }
}
