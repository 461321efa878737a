use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use rsp_core::RspError;
use rsp_io::AnyMatrix;
use serde::Serialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use super::Session;

#[derive(Args, Debug)]
pub struct JoinArgs {
    /// Common file name prefix, optionally preceded by a directory.
    pub prefix: PathBuf,
    /// Suffix of the files to join; repeat for several outputs.
    #[arg(long = "suffix", value_name = "SUFFIX")]
    pub suffixes: Vec<String>,
}

/// Result of joining the files of one suffix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinOutcome {
    /// Joined file `prefix + suffix`.
    pub output: PathBuf,
    /// Files that went into the sum, in order.
    pub joined: Vec<PathBuf>,
    /// Unreadable or incompatible files.
    pub skipped: Vec<PathBuf>,
    /// Summed `TS` of the joined files.
    pub simulated_events: u64,
}

pub fn run(args: &JoinArgs, session: &Session) -> Result<(), Box<dyn Error>> {
    let suffixes = if args.suffixes.is_empty() {
        &session.config.join.suffixes
    } else {
        &args.suffixes
    };
    let mut written = 0usize;
    for suffix in suffixes {
        match join(session, &args.prefix, suffix)? {
            Some(outcome) => {
                info!(
                    output = %outcome.output.display(),
                    joined = outcome.joined.len(),
                    skipped = outcome.skipped.len(),
                    simulated_events = outcome.simulated_events,
                    "joined response files"
                );
                written += 1;
            }
            None => info!(suffix = %suffix, "no files of this type"),
        }
    }
    if written == 0 {
        return Err(format!("no files found to join for prefix {}", args.prefix.display()).into());
    }
    Ok(())
}

fn split_prefix(prefix: &Path) -> Result<(PathBuf, String), Box<dyn Error>> {
    let stem = prefix
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| format!("join prefix {} has no file name part", prefix.display()))?;
    let directory = match prefix.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((directory, stem.to_string()))
}

/// Files in the prefix's directory named `prefix*suffix`, except `prefix + suffix`
/// itself, sorted by name.
pub fn candidates(prefix: &Path, suffix: &str) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let (directory, stem) = split_prefix(prefix)?;
    let joined = format!("{stem}{suffix}");
    let files = WalkDir::new(&directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry.file_name().to_str().is_some_and(|name| {
                name.starts_with(&stem) && name.ends_with(suffix) && name != joined
            })
        })
        .map(|entry| entry.into_path())
        .collect();
    Ok(files)
}

/// Sums every candidate of `suffix` into `prefix + suffix`.
///
/// The first readable file fixes the shape; later files that cannot be read or do not
/// match it are skipped. Returns `None` when there is nothing to join.
pub fn join(
    session: &Session,
    prefix: &Path,
    suffix: &str,
) -> Result<Option<JoinOutcome>, Box<dyn Error>> {
    let files = candidates(prefix, suffix)?;
    if files.is_empty() {
        return Ok(None);
    }
    let (directory, stem) = split_prefix(prefix)?;

    let mut total: Option<AnyMatrix> = None;
    let mut joined = Vec::new();
    let mut skipped = Vec::new();
    let mut simulated_events = 0u64;
    for path in files {
        let matrix = match session.load(&path) {
            Ok(matrix) => matrix,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable file");
                skipped.push(path);
                continue;
            }
        };
        let events = matrix.meta().simulated_events;
        match total.as_mut() {
            None => total = Some(matrix),
            Some(sum) => match sum.try_add_assign(&matrix) {
                Ok(()) => {}
                Err(RspError::Mismatch(mismatch)) => {
                    warn!(
                        path = %path.display(),
                        code = %mismatch.code,
                        "skipping file of a different shape"
                    );
                    skipped.push(path);
                    continue;
                }
                Err(err) => return Err(err.into()),
            },
        }
        simulated_events = simulated_events.saturating_add(events);
        joined.push(path);
    }

    let Some(mut total) = total else {
        return Ok(None);
    };
    total.meta_mut().simulated_events = simulated_events;
    let output = directory.join(format!("{stem}{suffix}"));
    session.store(&output, &total)?;
    Ok(Some(JoinOutcome {
        output,
        joined,
        skipped,
        simulated_events,
    }))
}
