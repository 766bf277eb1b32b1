//! Process command implementation.

use crate::cli::preflight;
use crate::cli::{ConsoleObserver, Output};
use crate::config::{Credentials, Settings};
use crate::notify::Delivery;
use crate::orchestrator::{parse_channel_list, PipelineObserver, PipelineOrchestrator};
use anyhow::Result;
use std::sync::Arc;

/// What to process.
#[derive(Debug, Clone, Default)]
pub struct ProcessRequest {
    pub url: Option<String>,
    pub channels: Vec<String>,
    pub count: Option<usize>,
    pub dry_run: bool,
}

impl ProcessRequest {
    pub fn new(
        url: Option<&str>,
        channel: Option<&str>,
        count: Option<usize>,
        dry_run: bool,
    ) -> Self {
        Self {
            url: url.map(str::to_string),
            channels: channel.map(parse_channel_list).unwrap_or_default(),
            count,
            dry_run,
        }
    }
}

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// Pre-flight validation failed or the single video failed.
    Failed,
}

/// Run the pipeline for a video and/or channels.
pub async fn run_process(
    request: &ProcessRequest,
    settings: Settings,
    credentials: Credentials,
) -> Result<RunStatus> {
    if let Err(e) = preflight::check(&settings, &credentials, request.dry_run) {
        Output::error(&format!("{}", e));
        return Ok(RunStatus::Failed);
    }

    if request.url.is_none() && request.channels.is_empty() {
        Output::error("Give --url or at least one --channel id");
        return Ok(RunStatus::Failed);
    }

    if request.dry_run {
        Output::info("Dry run: nothing will be saved or sent");
    }

    let observer = Arc::new(ConsoleObserver::new());
    let orchestrator = PipelineOrchestrator::from_settings(&settings, &credentials)?
        .with_observer(observer.clone());

    let mut status = RunStatus::Success;

    if let Some(url) = &request.url {
        Output::header(&format!("Video {}", url));
        observer.video_started(1, 1, url);
        let result = orchestrator.run_video(url, request.dry_run).await;
        if !result.is_success() {
            status = RunStatus::Failed;
        }
    }

    if request.channels.is_empty() {
        return Ok(status);
    }

    let count = request.count.unwrap_or(settings.pipeline.default_count);
    Output::header(&format!(
        "Channels {} (latest {} each)",
        request.channels.join(", "),
        count
    ));

    let reports = orchestrator
        .run_channels(&request.channels, count, request.dry_run)
        .await;

    for (channel_id, report) in reports {
        let report = match report {
            Ok(report) => report,
            Err(e) => {
                Output::error(&format!("Could not list videos of {}: {}", channel_id, e));
                continue;
            }
        };

        Output::batch_summary(&report);
        if report.processed() == 0 {
            Output::warning("No videos found");
        }

        if let Some(digest) = &report.digest {
            Output::block("Digest", digest);
        }
        match report.digest_delivery {
            Some(Delivery::Sent) => Output::success("Digest sent"),
            Some(Delivery::Skipped) => Output::info("Dry run: digest skipped"),
            None => {}
        }
    }

    Ok(status)
}
