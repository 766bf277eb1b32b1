//! Pre-flight checks before any processing.
//!
//! Validates that the credentials a run needs are present before the first
//! API call, so a run never stops halfway for a missing key.

use crate::config::{ContentStrategy, Credentials, Settings};
use crate::error::{Result, TubebriefError};

/// Run pre-flight checks for a run.
///
/// Returns Ok(()) if all checks pass, or an error naming everything missing.
pub fn check(settings: &Settings, credentials: &Credentials, dry_run: bool) -> Result<()> {
    let missing = credentials.missing(dry_run, settings.generation.provider);
    if !missing.is_empty() {
        return Err(TubebriefError::Config(format!(
            "Missing environment variables: {}",
            missing.join(", ")
        )));
    }

    check_strategy(settings)
}

/// The direct strategy needs a backend that can watch a video.
fn check_strategy(settings: &Settings) -> Result<()> {
    if settings.pipeline.strategy == ContentStrategy::DirectClassify
        && settings.generation.provider == crate::generation::GenerationProvider::OpenAi
    {
        return Err(TubebriefError::Config(format!(
            "Provider {} cannot classify videos directly. Set [pipeline] strategy = \"{}\"",
            settings.generation.provider,
            ContentStrategy::TranscriptThenSummarize
        )));
    }
    Ok(())
}
