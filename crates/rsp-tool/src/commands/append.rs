use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use rsp_core::RspError;
use rsp_io::AnyMatrix;
use tracing::{info, warn};

use super::Session;

#[derive(Args, Debug)]
pub struct AppendArgs {
    /// Matrix files; the sum keeps the name and axes of the first.
    #[arg(required = true, num_args = 2..)]
    pub files: Vec<PathBuf>,
    /// Destination, `<first>.new` when omitted.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &AppendArgs, session: &Session) -> Result<(), Box<dyn Error>> {
    let (first, rest) = args
        .files
        .split_first()
        .ok_or("append needs at least one input file")?;
    let total = append(session, first, rest)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| appended_path(first));
    session.store(&output, &total)?;
    Ok(())
}

/// `<first>.new`.
pub fn appended_path(first: &Path) -> PathBuf {
    let mut name = first.as_os_str().to_owned();
    name.push(".new");
    PathBuf::from(name)
}

/// Sums `rest` into the matrix read from `first`.
///
/// Matrices whose shape differs from the first are skipped with a warning; unreadable
/// files abort the whole append.
pub fn append(session: &Session, first: &Path, rest: &[PathBuf]) -> Result<AnyMatrix, RspError> {
    let mut total = session.load(first)?;
    for path in rest {
        let matrix = session.load(path)?;
        match total.try_add_assign(&matrix) {
            Ok(()) => {
                let events = &mut total.meta_mut().simulated_events;
                *events = events.saturating_add(matrix.meta().simulated_events);
                info!(path = %path.display(), "appended response matrix");
            }
            Err(RspError::Mismatch(mismatch)) => {
                warn!(
                    path = %path.display(),
                    code = %mismatch.code,
                    "skipping matrix of a different shape"
                );
            }
            Err(err) => return Err(err),
        }
    }
    Ok(total)
}
