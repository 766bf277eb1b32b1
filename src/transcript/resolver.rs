//! Transcript fallback chain.

use super::{join_entries, Provenance, TranscriptHandle, TranscriptProvider, TranscriptResult};
use crate::error::{Result, TubebriefError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// One attempt of the transcript fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackStep {
    /// Manually authored transcript in the target language.
    ManualTarget,
    /// Auto-generated transcript in the target language.
    GeneratedTarget,
    /// Manual transcript in the secondary language, translated to the target.
    ManualSecondaryTranslated,
    /// First transcript in any language, translated to the target.
    AnyTranslated,
}

impl FallbackStep {
    /// The default chain: provenance interleaved with language.
    pub fn default_order() -> Vec<FallbackStep> {
        vec![
            FallbackStep::ManualTarget,
            FallbackStep::GeneratedTarget,
            FallbackStep::ManualSecondaryTranslated,
            FallbackStep::AnyTranslated,
        ]
    }
}

impl std::fmt::Display for FallbackStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackStep::ManualTarget => write!(f, "manual-target"),
            FallbackStep::GeneratedTarget => write!(f, "generated-target"),
            FallbackStep::ManualSecondaryTranslated => write!(f, "manual-secondary-translated"),
            FallbackStep::AnyTranslated => write!(f, "any-translated"),
        }
    }
}

impl std::str::FromStr for FallbackStep {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual-target" => Ok(FallbackStep::ManualTarget),
            "generated-target" => Ok(FallbackStep::GeneratedTarget),
            "manual-secondary-translated" => Ok(FallbackStep::ManualSecondaryTranslated),
            "any-translated" => Ok(FallbackStep::AnyTranslated),
            _ => Err(format!("Unknown fallback step: {}", s)),
        }
    }
}

/// Acquires the best available transcript of a video.
///
/// Steps run in the configured order. A step that reports "not found" hands
/// over to the next one; any other error ends the chain immediately.
pub struct TranscriptResolver {
    provider: Arc<dyn TranscriptProvider>,
    target_language: String,
    secondary_language: String,
    order: Vec<FallbackStep>,
}

impl TranscriptResolver {
    pub fn new(
        provider: Arc<dyn TranscriptProvider>,
        target_language: &str,
        secondary_language: &str,
    ) -> Self {
        Self {
            provider,
            target_language: target_language.to_string(),
            secondary_language: secondary_language.to_string(),
            order: FallbackStep::default_order(),
        }
    }

    /// Use a custom fallback order.
    pub fn with_order(mut self, order: Vec<FallbackStep>) -> Self {
        self.order = order;
        self
    }

    /// Resolve a transcript for `video_id`.
    #[instrument(skip(self))]
    pub async fn resolve(&self, video_id: &str) -> Result<TranscriptResult> {
        let tracks = match self.provider.list_available(video_id).await {
            Ok(tracks) => tracks,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e),
        };

        debug!("{} caption tracks listed for {}", tracks.len(), video_id);

        for step in &self.order {
            match self.attempt(*step, &tracks, video_id).await {
                Ok(result) => {
                    info!(
                        "Transcript found via {} ({}, {})",
                        step, result.language_code, result.provenance
                    );
                    return Ok(result);
                }
                Err(e) if e.is_not_found() => {
                    debug!("Fallback step {} found nothing: {}", step, e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(TubebriefError::TranscriptUnavailable(video_id.to_string()))
    }

    async fn attempt(
        &self,
        step: FallbackStep,
        tracks: &[TranscriptHandle],
        video_id: &str,
    ) -> Result<TranscriptResult> {
        let handle = self.select(step, tracks).ok_or_else(|| {
            TubebriefError::TranscriptNotFound(format!("{} has no {} track", video_id, step))
        })?;

        let entries = self.provider.fetch(&handle).await?;

        Ok(TranscriptResult {
            language_code: handle.effective_language().to_string(),
            provenance: handle.provenance,
            text: join_entries(&entries),
        })
    }

    /// Pick the track a step would fetch, if any.
    fn select(&self, step: FallbackStep, tracks: &[TranscriptHandle]) -> Option<TranscriptHandle> {
        match step {
            FallbackStep::ManualTarget => {
                find_track(tracks, &self.target_language, Provenance::Manual).cloned()
            }
            FallbackStep::GeneratedTarget => {
                find_track(tracks, &self.target_language, Provenance::Generated).cloned()
            }
            FallbackStep::ManualSecondaryTranslated => {
                find_track(tracks, &self.secondary_language, Provenance::Manual)
                    .and_then(|track| self.translate(track))
            }
            FallbackStep::AnyTranslated => tracks.first().and_then(|track| self.translate(track)),
        }
    }

    fn translate(&self, track: &TranscriptHandle) -> Option<TranscriptHandle> {
        if same_language(&track.language_code, &self.target_language) {
            return Some(track.clone());
        }
        track
            .is_translatable
            .then(|| track.translated(&self.target_language))
    }
}

fn find_track<'a>(
    tracks: &'a [TranscriptHandle],
    language: &str,
    provenance: Provenance,
) -> Option<&'a TranscriptHandle> {
    tracks
        .iter()
        .find(|t| t.provenance == provenance && same_language(&t.language_code, language))
}

fn same_language(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{CaptionSegment, TranscriptEntry};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn track(lang: &str, provenance: Provenance, translatable: bool) -> TranscriptHandle {
        TranscriptHandle {
            video_id: "dQw4w9WgXcQ".to_string(),
            language_code: lang.to_string(),
            language_name: lang.to_string(),
            provenance,
            is_translatable: translatable,
            locator: format!("{}-{}", lang, provenance),
            translate_to: None,
        }
    }

    /// Fake provider that records every fetch and answers from a fixed list.
    struct FakeProvider {
        tracks: std::result::Result<Vec<TranscriptHandle>, fn(String) -> TubebriefError>,
        fetch_error: Option<fn(String) -> TubebriefError>,
        fetched: Mutex<Vec<TranscriptHandle>>,
    }

    impl FakeProvider {
        fn with_tracks(tracks: Vec<TranscriptHandle>) -> Self {
            Self {
                tracks: Ok(tracks),
                fetch_error: None,
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn fetched(&self) -> Vec<TranscriptHandle> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TranscriptProvider for FakeProvider {
        async fn list_available(&self, video_id: &str) -> Result<Vec<TranscriptHandle>> {
            match &self.tracks {
                Ok(tracks) => Ok(tracks.clone()),
                Err(make) => Err(make(video_id.to_string())),
            }
        }

        async fn fetch(&self, handle: &TranscriptHandle) -> Result<Vec<Box<dyn TranscriptEntry>>> {
            self.fetched.lock().unwrap().push(handle.clone());
            if let Some(make) = self.fetch_error {
                return Err(make(handle.locator.clone()));
            }
            let label = format!("{}:{}", handle.locator, handle.effective_language());
            Ok(vec![
                Box::new(CaptionSegment::new(0.0, 1.0, &label)),
                Box::new(CaptionSegment::new(1.0, 1.0, "end")),
            ])
        }
    }

    fn resolver(provider: Arc<FakeProvider>) -> TranscriptResolver {
        TranscriptResolver::new(provider, "ja", "en")
    }

    #[tokio::test]
    async fn test_manual_target_preferred() {
        let provider = Arc::new(FakeProvider::with_tracks(vec![
            track("ja", Provenance::Generated, true),
            track("ja", Provenance::Manual, true),
        ]));

        let result = resolver(provider.clone()).resolve("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(result.provenance, Provenance::Manual);
        assert_eq!(result.language_code, "ja");
        assert_eq!(result.text, "ja-manual:ja end");
        assert_eq!(provider.fetched().len(), 1);
    }

    #[tokio::test]
    async fn test_generated_target_second() {
        let provider = Arc::new(FakeProvider::with_tracks(vec![
            track("en", Provenance::Manual, true),
            track("ja", Provenance::Generated, true),
        ]));

        let result = resolver(provider).resolve("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(result.provenance, Provenance::Generated);
        assert_eq!(result.text, "ja-generated:ja end");
    }

    #[tokio::test]
    async fn test_secondary_manual_translated() {
        let provider = Arc::new(FakeProvider::with_tracks(vec![
            track("fr", Provenance::Generated, true),
            track("en", Provenance::Manual, true),
        ]));

        let result = resolver(provider.clone()).resolve("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(result.language_code, "ja");
        assert_eq!(result.text, "en-manual:ja end");
        assert_eq!(provider.fetched()[0].translate_to.as_deref(), Some("ja"));
    }

    #[tokio::test]
    async fn test_any_translated_last() {
        let provider = Arc::new(FakeProvider::with_tracks(vec![
            track("fr", Provenance::Generated, true),
            track("de", Provenance::Manual, true),
        ]));

        let result = resolver(provider).resolve("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(result.provenance, Provenance::Generated);
        assert_eq!(result.text, "fr-generated:ja end");
    }

    #[tokio::test]
    async fn test_untranslatable_tracks_are_unavailable() {
        let provider = Arc::new(FakeProvider::with_tracks(vec![track(
            "fr",
            Provenance::Manual,
            false,
        )]));

        let err = resolver(provider.clone()).resolve("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, TubebriefError::TranscriptUnavailable(_)));
        assert!(provider.fetched().is_empty());
    }

    #[tokio::test]
    async fn test_no_tracks_is_unavailable() {
        let provider = Arc::new(FakeProvider::with_tracks(Vec::new()));
        let err = resolver(provider).resolve("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, TubebriefError::TranscriptUnavailable(_)));
    }

    #[tokio::test]
    async fn test_disabled_transcripts_short_circuit() {
        let provider = Arc::new(FakeProvider {
            tracks: Err(TubebriefError::TranscriptsDisabled),
            fetch_error: None,
            fetched: Mutex::new(Vec::new()),
        });

        let err = resolver(provider.clone()).resolve("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, TubebriefError::TranscriptsDisabled(_)));
        assert!(provider.fetched().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_fetch_advances_chain() {
        let provider = Arc::new(FakeProvider {
            tracks: Ok(vec![
                track("ja", Provenance::Manual, true),
                track("ja", Provenance::Generated, true),
            ]),
            fetch_error: Some(TubebriefError::TranscriptNotFound),
            fetched: Mutex::new(Vec::new()),
        });

        let err = resolver(provider.clone()).resolve("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, TubebriefError::TranscriptUnavailable(_)));
        // manual-target, generated-target, then any-translated on the first track
        assert_eq!(provider.fetched().len(), 3);
    }

    #[tokio::test]
    async fn test_other_fetch_error_stops_chain() {
        let provider = Arc::new(FakeProvider {
            tracks: Ok(vec![
                track("ja", Provenance::Manual, true),
                track("ja", Provenance::Generated, true),
            ]),
            fetch_error: Some(TubebriefError::VideoUnavailable),
            fetched: Mutex::new(Vec::new()),
        });

        let err = resolver(provider.clone()).resolve("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, TubebriefError::VideoUnavailable(_)));
        assert_eq!(provider.fetched().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_order() {
        let provider = Arc::new(FakeProvider::with_tracks(vec![
            track("ja", Provenance::Manual, true),
            track("ja", Provenance::Generated, true),
        ]));

        let result = resolver(provider)
            .with_order(vec![FallbackStep::GeneratedTarget, FallbackStep::ManualTarget])
            .resolve("dQw4w9WgXcQ")
            .await
            .unwrap();
        assert_eq!(result.provenance, Provenance::Generated);
    }

    #[test]
    fn test_step_round_trip_names() {
        for step in FallbackStep::default_order() {
            assert_eq!(step.to_string().parse::<FallbackStep>().unwrap(), step);
        }
        assert!("whatever".parse::<FallbackStep>().is_err());
    }
}
