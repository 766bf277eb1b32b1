//! Pipeline orchestrator for Tubebrief.
//!
//! Runs the per-video sequence (resolve, metadata, content, persist, notify)
//! and the per-channel batch on top of it. A failing video never stops the
//! batch; its failure is recorded and the next video runs.

use crate::classifier::{ClassificationResult, ContentClassifier};
use crate::config::{
    keys, ContentStrategy, Credentials, PipelineSettings, PostAction, Prompts, Settings,
};
use crate::digest::{reference_date, DigestAggregator, DigestBatch};
use crate::error::{FailureKind, Result, TubebriefError};
use crate::generation::{GeminiClient, GenerationProvider, GenerativeProvider, OpenAiClient};
use crate::http::{create_client, create_client_with_timeout};
use crate::notify::{Delivery, LineMessaging, NotificationDispatcher};
use crate::store::{NotionStore, PersistenceFacade, VideoRecord};
use crate::transcript::{TranscriptResolver, YoutubeCaptions};
use crate::video_source::{
    MetadataProvider, VideoIdentifierResolver, VideoMetadata, VideoReference, YoutubeDataApi,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// How videos are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelinePolicy {
    pub strategy: ContentStrategy,
    pub post_action: PostAction,
    /// Delay between consecutive videos of a batch.
    pub pacing: Duration,
}

impl Default for PipelinePolicy {
    fn default() -> Self {
        Self::from(&PipelineSettings::default())
    }
}

impl From<&PipelineSettings> for PipelinePolicy {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            strategy: settings.strategy,
            post_action: settings.post_action,
            pacing: Duration::from_secs(settings.pacing_seconds),
        }
    }
}

/// Why a video was not processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl std::fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Outcome of one single-video run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    /// Resolved identifier, or the raw input when resolution failed.
    pub video_id: String,
    pub metadata: Option<VideoMetadata>,
    pub classification: Option<ClassificationResult>,
    pub failure: Option<PipelineFailure>,
    /// Non-fatal problems (persistence, notification).
    pub warnings: Vec<String>,
}

impl PipelineResult {
    pub fn success(
        video_id: &str,
        metadata: VideoMetadata,
        classification: ClassificationResult,
    ) -> Self {
        Self {
            video_id: video_id.to_string(),
            metadata: Some(metadata),
            classification: Some(classification),
            failure: None,
            warnings: Vec::new(),
        }
    }

    pub fn failure(video_id: &str, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            video_id: video_id.to_string(),
            metadata: None,
            classification: None,
            failure: Some(PipelineFailure {
                kind,
                message: message.into(),
            }),
            warnings: Vec::new(),
        }
    }

    fn with_metadata(mut self, metadata: VideoMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none() && self.classification.is_some()
    }

    /// Successful and classified as NEWS.
    pub fn is_digest_eligible(&self) -> bool {
        self.is_success()
            && self
                .classification
                .as_ref()
                .is_some_and(ClassificationResult::is_digest_eligible)
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.title.as_str())
    }
}

/// Outcome of one channel batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub channel_id: String,
    /// Successfully processed videos, in processing order.
    pub results: Vec<PipelineResult>,
    /// Videos whose run failed.
    pub failed: Vec<PipelineResult>,
    /// Digest text, when one was composed.
    pub digest: Option<String>,
    pub digest_delivery: Option<Delivery>,
    /// Non-fatal batch-level problems (digest generation or delivery).
    pub warnings: Vec<String>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.results.len() + self.failed.len()
    }

    pub fn digest_eligible(&self) -> usize {
        self.results.iter().filter(|r| r.is_digest_eligible()).count()
    }
}

/// Progress callbacks for long runs.
pub trait PipelineObserver: Send + Sync {
    /// A video of a batch is about to run (1-based index).
    fn video_started(&self, _index: usize, _total: usize, _video_id: &str) {}

    /// A video finished, successfully or not.
    fn video_finished(&self, _result: &PipelineResult) {}

    /// The batch is waiting before the next video.
    fn pacing(&self, _delay: Duration) {}
}

struct SilentObserver;

impl PipelineObserver for SilentObserver {}

/// The main orchestrator for the Tubebrief pipeline.
pub struct PipelineOrchestrator {
    resolver: VideoIdentifierResolver,
    metadata: Arc<dyn MetadataProvider>,
    transcripts: TranscriptResolver,
    classifier: ContentClassifier,
    digest: DigestAggregator,
    store: PersistenceFacade,
    notifier: NotificationDispatcher,
    policy: PipelinePolicy,
    utc_offset_hours: i32,
    observer: Arc<dyn PipelineObserver>,
}

impl PipelineOrchestrator {
    /// Create an orchestrator wired to the real providers.
    ///
    /// Providers whose credentials are absent are left disabled; such an
    /// orchestrator only works in dry-run mode.
    pub fn from_settings(settings: &Settings, credentials: &Credentials) -> Result<Self> {
        let prompts = Arc::new(Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?);

        let http = create_client()?;
        let generation_http = create_client_with_timeout(Duration::from_secs(
            settings.generation.timeout_seconds,
        ))?;

        let metadata: Arc<dyn MetadataProvider> = Arc::new(YoutubeDataApi::new(
            http.clone(),
            credentials.require(keys::YOUTUBE_API_KEY)?,
        ));

        let model = settings.generation.model();
        let generator: Arc<dyn GenerativeProvider> = match settings.generation.provider {
            GenerationProvider::Gemini => Arc::new(GeminiClient::new(
                generation_http,
                credentials.require(keys::GEMINI_API_KEY)?,
                model,
            )),
            GenerationProvider::OpenAi => Arc::new(OpenAiClient::new(
                generation_http,
                credentials.require(keys::OPENAI_API_KEY)?,
                model,
            )),
        };
        info!("Using {} ({})", settings.generation.provider, model);

        if settings.pipeline.strategy == ContentStrategy::DirectClassify
            && !generator.supports_media()
        {
            return Err(TubebriefError::Config(format!(
                "Provider {} cannot classify videos directly; use strategy = \"{}\"",
                settings.generation.provider,
                ContentStrategy::TranscriptThenSummarize
            )));
        }

        let transcripts = TranscriptResolver::new(
            Arc::new(YoutubeCaptions::new(http.clone())),
            &settings.transcript.target_language,
            &settings.transcript.secondary_language,
        )
        .with_order(settings.transcript.fallback_order.clone());

        let classifier = ContentClassifier::new(generator.clone(), prompts.clone())
            .with_max_transcript_chars(settings.generation.max_transcript_chars);
        let digest = DigestAggregator::new(generator, prompts)
            .with_max_chars(settings.digest.max_chars);

        let store = match (&credentials.notion_token, &credentials.notion_database_id) {
            (Some(token), Some(database_id)) => PersistenceFacade::new(
                Arc::new(NotionStore::new(http.clone(), token, database_id)),
                settings.store.clone(),
            ),
            _ => PersistenceFacade::disabled(),
        };

        let notifier = match (
            &credentials.line_channel_access_token,
            &credentials.line_user_id,
        ) {
            (Some(token), Some(user_id)) => {
                NotificationDispatcher::new(Arc::new(LineMessaging::new(http, token)), user_id)
            }
            _ => NotificationDispatcher::disabled(),
        };

        Ok(Self::with_components(
            metadata,
            transcripts,
            classifier,
            digest,
            store,
            notifier,
            PipelinePolicy::from(&settings.pipeline),
        )
        .with_utc_offset(settings.digest.utc_offset_hours))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        metadata: Arc<dyn MetadataProvider>,
        transcripts: TranscriptResolver,
        classifier: ContentClassifier,
        digest: DigestAggregator,
        store: PersistenceFacade,
        notifier: NotificationDispatcher,
        policy: PipelinePolicy,
    ) -> Self {
        Self {
            resolver: VideoIdentifierResolver::new(),
            metadata,
            transcripts,
            classifier,
            digest,
            store,
            notifier,
            policy,
            utc_offset_hours: 9,
            observer: Arc::new(SilentObserver),
        }
    }

    pub fn with_utc_offset(mut self, hours: i32) -> Self {
        self.utc_offset_hours = hours;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn policy(&self) -> &PipelinePolicy {
        &self.policy
    }

    /// Run the pipeline for one video reference (URL or bare id).
    ///
    /// Never fails: a failing step ends the run and is recorded in the result.
    #[instrument(skip(self), fields(input = %input))]
    pub async fn run_video(&self, input: &str, dry_run: bool) -> PipelineResult {
        let result = self.process_video(input, dry_run).await;
        match &result.failure {
            Some(failure) => warn!("Video {} failed: {}", result.video_id, failure),
            None => info!("Video {} processed", result.video_id),
        }
        self.observer.video_finished(&result);
        result
    }

    async fn process_video(&self, input: &str, dry_run: bool) -> PipelineResult {
        let reference = match self.resolver.resolve(input) {
            Ok(reference) => reference,
            Err(e) => return stage_failure(input.trim(), e, FailureKind::InvalidReference),
        };

        let metadata = match self.metadata.get_info(&reference.id).await {
            Ok(metadata) => metadata,
            Err(e) => return stage_failure(&reference.id, e, FailureKind::MetadataFetchFailure),
        };
        info!("Title: {}", metadata.title);

        let classification = match self.obtain_content(&reference, &metadata).await {
            Ok(classification) => classification,
            Err((kind, e)) => {
                return stage_failure(&reference.id, e, kind).with_metadata(metadata);
            }
        };

        let mut warnings = Vec::new();

        let record = VideoRecord::new(&reference, &metadata, &classification);
        if let Err(e) = self.store.save(&record, dry_run).await {
            warn!("Persistence failed for {}: {}", reference.id, e);
            warnings.push(warning(FailureKind::PersistenceFailure, &e));
        }

        if self.policy.post_action == PostAction::NotifyImmediately {
            if let Err(e) = self
                .notifier
                .notify_video(&reference, &metadata, &classification, dry_run)
                .await
            {
                warn!("Notification failed for {}: {}", reference.id, e);
                warnings.push(warning(FailureKind::NotificationFailure, &e));
            }
        }

        let mut result = PipelineResult::success(&reference.id, metadata, classification);
        result.warnings = warnings;
        result
    }

    async fn obtain_content(
        &self,
        reference: &VideoReference,
        metadata: &VideoMetadata,
    ) -> std::result::Result<ClassificationResult, (FailureKind, TubebriefError)> {
        match self.policy.strategy {
            ContentStrategy::DirectClassify => self
                .classifier
                .classify_video(reference)
                .await
                .map_err(|e| (FailureKind::ClassificationFailure, e)),
            ContentStrategy::TranscriptThenSummarize => {
                let transcript = self
                    .transcripts
                    .resolve(&reference.id)
                    .await
                    .map_err(|e| (FailureKind::TranscriptUnavailable, e))?;
                info!(
                    "Transcript: {} ({}), {} chars",
                    transcript.language_code,
                    transcript.provenance,
                    transcript.text.chars().count()
                );
                self.classifier
                    .summarize_transcript(&metadata.title, &transcript)
                    .await
                    .map_err(|e| (FailureKind::ClassificationFailure, e))
            }
        }
    }

    /// Run the latest `count` videos of a channel.
    ///
    /// Fails only when the channel search itself fails.
    #[instrument(skip(self))]
    pub async fn run_channel(
        &self,
        channel_id: &str,
        count: usize,
        dry_run: bool,
    ) -> Result<BatchReport> {
        let video_ids = self.metadata.search_latest(channel_id, count).await?;
        info!("Found {} videos for channel {}", video_ids.len(), channel_id);

        let mut report = BatchReport {
            channel_id: channel_id.to_string(),
            ..Default::default()
        };

        let total = video_ids.len();
        for (i, video_id) in video_ids.iter().enumerate() {
            if i > 0 && !self.policy.pacing.is_zero() {
                self.observer.pacing(self.policy.pacing);
                tokio::time::sleep(self.policy.pacing).await;
            }

            self.observer.video_started(i + 1, total, video_id);
            let result = self.run_video(video_id, dry_run).await;
            if result.is_success() {
                report.results.push(result);
            } else {
                report.failed.push(result);
            }
        }

        if self.policy.post_action == PostAction::CollectForDigest {
            self.deliver_digest(&mut report, dry_run).await;
        }

        Ok(report)
    }

    async fn deliver_digest(&self, report: &mut BatchReport, dry_run: bool) {
        let batch =
            DigestBatch::from_results(&report.results, reference_date(self.utc_offset_hours));
        if batch.is_empty() {
            info!("No NEWS videos; skipping digest");
            return;
        }
        if dry_run {
            info!("Dry run: skipping digest of {} videos", batch.len());
            report.digest_delivery = Some(Delivery::Skipped);
            return;
        }

        let text = match self.digest.compose(&batch).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Digest generation failed: {}", e);
                report
                    .warnings
                    .push(warning(FailureKind::NotificationFailure, &e));
                return;
            }
        };

        match self.notifier.send_digest(&text, None, dry_run).await {
            Ok(delivery) => report.digest_delivery = Some(delivery),
            Err(e) => {
                warn!("Digest delivery failed: {}", e);
                report
                    .warnings
                    .push(warning(FailureKind::NotificationFailure, &e));
            }
        }
        report.digest = Some(text);
    }

    /// Run several channels, one batch after another.
    ///
    /// A channel whose search fails is reported and skipped.
    pub async fn run_channels(
        &self,
        channel_ids: &[String],
        count: usize,
        dry_run: bool,
    ) -> Vec<(String, Result<BatchReport>)> {
        let mut reports = Vec::with_capacity(channel_ids.len());
        for channel_id in channel_ids {
            let report = self.run_channel(channel_id, count, dry_run).await;
            if let Err(e) = &report {
                warn!("Skipping channel {}: {}", channel_id, e);
            }
            reports.push((channel_id.clone(), report));
        }
        reports
    }
}

/// Split a comma separated channel list, dropping blanks.
pub fn parse_channel_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

fn stage_failure(video_id: &str, error: TubebriefError, stage: FailureKind) -> PipelineResult {
    let kind = error
        .kind()
        .filter(FailureKind::is_per_video)
        .unwrap_or(stage);
    PipelineResult::failure(video_id, kind, error.to_string())
}

fn warning(kind: FailureKind, error: &TubebriefError) -> String {
    format!("{}: {}", kind, error)
}
