//! Daily digest composition.

use crate::config::Prompts;
use crate::error::{Result, TubebriefError};
use crate::generation::{GenerationRequest, GenerativeProvider};
use crate::orchestrator::PipelineResult;
use chrono::{FixedOffset, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

const CIRCLED_NUMBERS: [char; 20] = [
    '①', '②', '③', '④', '⑤', '⑥', '⑦', '⑧', '⑨', '⑩', '⑪', '⑫', '⑬', '⑭', '⑮', '⑯', '⑰',
    '⑱', '⑲', '⑳',
];

/// Topic marker for the n-th item (1-based).
pub fn circled_number(n: usize) -> String {
    match n.checked_sub(1).and_then(|i| CIRCLED_NUMBERS.get(i)) {
        Some(c) => c.to_string(),
        None => format!("({})", n),
    }
}

/// Today's date in the given UTC offset. Out-of-range offsets fall back to UTC.
pub fn reference_date(utc_offset_hours: i32) -> NaiveDate {
    let now = Utc::now();
    match FixedOffset::east_opt(utc_offset_hours * 3600) {
        Some(offset) => now.with_timezone(&offset).date_naive(),
        None => now.date_naive(),
    }
}

/// One summarized video in the digest input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestItem {
    pub title: String,
    pub summary: String,
}

/// The NEWS summaries of one batch plus the date they are reported for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestBatch {
    pub items: Vec<DigestItem>,
    pub reference_date: NaiveDate,
}

impl DigestBatch {
    /// Collect the digest-eligible results, keeping their order.
    pub fn from_results(results: &[PipelineResult], reference_date: NaiveDate) -> Self {
        let items = results
            .iter()
            .filter(|r| r.is_digest_eligible())
            .filter_map(|r| {
                let metadata = r.metadata.as_ref()?;
                let classification = r.classification.as_ref()?;
                Some(DigestItem {
                    title: metadata.title.clone(),
                    summary: classification.summary.clone(),
                })
            })
            .collect();

        Self {
            items,
            reference_date,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Reference date as `MM/DD`.
    pub fn date_label(&self) -> String {
        self.reference_date.format("%m/%d").to_string()
    }

    /// Source blocks handed to the model, one per item.
    pub fn source_blocks(&self) -> String {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                format!("--- Source {}: {} ---\n{}\n", i + 1, item.title, item.summary)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Output outline with one numbered topic slot per item.
    pub fn skeleton(&self) -> String {
        (1..=self.items.len())
            .map(|n| format!("{} (topic)\n(2-3 line explanation)\n", circled_number(n)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Turns a batch of summaries into one digest text.
pub struct DigestAggregator {
    provider: Arc<dyn GenerativeProvider>,
    prompts: Arc<Prompts>,
    max_chars: usize,
}

impl DigestAggregator {
    pub fn new(provider: Arc<dyn GenerativeProvider>, prompts: Arc<Prompts>) -> Self {
        Self {
            provider,
            prompts,
            max_chars: 1000,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Render the digest prompt for a batch.
    pub fn build_prompt(&self, batch: &DigestBatch) -> String {
        let mut vars = HashMap::new();
        vars.insert("today".to_string(), batch.date_label());
        vars.insert("summaries".to_string(), batch.source_blocks());
        vars.insert("skeleton".to_string(), batch.skeleton());
        vars.insert("max_chars".to_string(), self.max_chars.to_string());
        self.prompts.render_with_custom(&self.prompts.digest.user, &vars)
    }

    /// Generate the digest text.
    #[instrument(skip(self, batch), fields(items = batch.len()))]
    pub async fn compose(&self, batch: &DigestBatch) -> Result<String> {
        if batch.is_empty() {
            return Err(TubebriefError::Generation(
                "Digest batch is empty".to_string(),
            ));
        }

        let prompt = self.build_prompt(batch);
        let text = self.provider.generate(GenerationRequest::text(prompt)).await?;
        let text = text.trim().to_string();

        info!("Composed digest of {} chars", text.chars().count());
        Ok(text)
    }
}
