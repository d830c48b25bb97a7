use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::error::TranscodeError;
use super::types::{TranscodeJob, TranscodeOutcome};
use crate::config::EncodingConfig;
use crate::stats::BatchSummary;

/// Walk `root` recursively and invoke a callback for every file whose name
/// matches the configured extensions.
///
/// Entries come in the filesystem's natural walk order, which is not sorted.
/// The first callback error stops the walk.
pub fn scan_streaming<F, E>(root: &Path, config: &EncodingConfig, mut on_file: F) -> Result<(), E>
where
    F: FnMut(PathBuf) -> Result<(), E>,
{
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        // directory links are not descended, file links are kept
        if !entry.path().is_file() {
            continue;
        }
        if config.matches_extension(&entry.file_name().to_string_lossy()) {
            on_file(entry.into_path())?;
        }
    }

    Ok(())
}

/// Number of matching files under `root`
pub fn count_matching(root: &Path, config: &EncodingConfig) -> usize {
    let mut count = 0;
    let _ = scan_streaming::<_, ()>(root, config, |_| {
        count += 1;
        Ok(())
    });
    count
}

/// Mirror `input`'s location under `input_root` onto `output_root`
pub fn output_path_for(input_root: &Path, output_root: &Path, input: &Path) -> PathBuf {
    match input.strip_prefix(input_root) {
        Ok(relative) => output_root.join(relative),
        Err(_) => output_root.join(input.file_name().unwrap_or(input.as_os_str())),
    }
}

/// Jobs a batch run would execute, without touching the filesystem
pub fn plan_jobs(config: &EncodingConfig) -> Vec<TranscodeJob> {
    let input_root = &config.input_directory;
    let total_jobs = count_matching(input_root, config);

    let mut jobs = Vec::with_capacity(total_jobs);
    let _ = scan_streaming::<_, ()>(input_root, config, |input_path| {
        let output_path = output_path_for(input_root, &config.output_directory, &input_path);
        jobs.push(TranscodeJob::new(
            input_path,
            output_path,
            jobs.len() + 1,
            total_jobs,
        ));
        Ok(())
    });
    jobs
}

fn ensure_dir(path: &Path) -> Result<bool, TranscodeError> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path).map_err(|e| TranscodeError::io(path, e))?;
    Ok(true)
}

/// Transcode every matching file under the input root, one job at a time.
///
/// Creates both roots when missing, counts the matching files, then walks the
/// tree again and hands each job to `run_job` after creating its output
/// directory. An error from `run_job` stops the batch; a verification failure
/// is only counted.
pub fn process<F>(config: &EncodingConfig, mut run_job: F) -> Result<BatchSummary, TranscodeError>
where
    F: FnMut(&TranscodeJob) -> Result<TranscodeOutcome, TranscodeError>,
{
    let input_root = &config.input_directory;
    let output_root = &config.output_directory;

    debug!("Input directory: {}", input_root.display());
    debug!("Output directory: {}", output_root.display());
    debug!("File extensions to process: {:?}", config.file_extensions);

    for root in [input_root, output_root] {
        if ensure_dir(root)? {
            info!("Created directory: {}", root.display());
        }
    }

    let mut summary = BatchSummary {
        total_jobs: count_matching(input_root, config),
        ..Default::default()
    };
    info!("Found {} file(s) to transcode", summary.total_jobs);

    let mut sequence_index = 0;
    scan_streaming::<_, TranscodeError>(input_root, config, |input_path| {
        sequence_index += 1;

        let output_path = output_path_for(input_root, output_root, &input_path);
        if let Some(parent) = output_path.parent() {
            ensure_dir(parent)?;
        }

        let job = TranscodeJob::new(
            input_path,
            output_path,
            sequence_index,
            summary.total_jobs,
        );
        match run_job(&job)? {
            TranscodeOutcome::Verified => summary.verified += 1,
            TranscodeOutcome::VerificationFailed(_) => summary.verification_failed += 1,
        }
        Ok(())
    })?;

    info!("Finished processing all directories and files");
    Ok(summary)
}
