//! Prompt templates for Tubebrief.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    /// Direct video classification (the video itself is attached).
    pub classify: ClassifyPrompts,
    /// Transcript summarization.
    pub summarize: SummarizePrompts,
    /// Daily digest composition.
    pub digest: DigestPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Output format shared by classification and summarization so that both
/// content strategies feed the same response parser.
const OUTPUT_FORMAT: &str = r#"━━━━━━━━━━━━━━━━━━
Output format (strict)
━━━━━━━━━━━━━━━━━━
Line 1: the category label, e.g. CATEGORY: NEWS
Line 2: comma separated keywords, e.g. KEYWORDS: Gemini, SVG, AI tooling
Line 3 onwards: the summary, written in Japanese, using exactly these sections:

【概要】
(about 140 characters describing the video)

【重要なポイント】
・point 1
・point 2
・point 3

【アクションアイテム/結論】
(what the viewer should do next, or the conclusion of the video)"#;

const CATEGORY_GUIDE: &str = r#"Task 1: classify the content as exactly one of
- NEWS: new information. Releases, updates to existing services, industry moves, new features, regulation changes, new technology.
- HOWTO: how to build or use something. App tutorials, tool walkthroughs, programming lessons, setup guides.
- GENERAL: general knowledge or opinion. Leadership, ways of working, self improvement, re-explanations of well known topics.
When unsure, lean towards NEWS.

Task 2: extract 3 to 5 keywords that describe the content. Prefer proper nouns such as product or technology names.

Task 3: summarize the content."#;

/// Prompt for classifying a video handed to the model as media.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyPrompts {
    pub user: String,
}

impl Default for ClassifyPrompts {
    fn default() -> Self {
        Self {
            user: format!(
                "You are an expert at summarizing YouTube videos accurately and concisely.\nWatch this video and complete three tasks.\n\n{}\n\n{}",
                CATEGORY_GUIDE, OUTPUT_FORMAT
            ),
        }
    }
}

/// Prompt for summarizing a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizePrompts {
    pub user: String,
}

impl Default for SummarizePrompts {
    fn default() -> Self {
        Self {
            user: format!(
                "You are an expert at summarizing YouTube videos accurately and concisely.\nRead the transcript of the video \"{{{{title}}}}\" below and complete three tasks.\n\n{}\n\n{}\n\nTranscript:\n{{{{transcript}}}}",
                CATEGORY_GUIDE, OUTPUT_FORMAT
            ),
        }
    }
}

/// Prompt for composing the digest from several summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestPrompts {
    pub user: String,
}

impl Default for DigestPrompts {
    fn default() -> Self {
        Self {
            user: r#"You are an expert at explaining the latest AI and technology news in plain words.
Read the summaries below and write a short "today's topics" digest in Japanese that the reader can forward to friends.

Rules (strict):
- Never mention where the information came from: no channel names, no YouTube, no videos.
- Never report on the process ("saved to Notion", "I summarized", and so on).
- Write in a natural tone, as if you gathered the news yourself.
- Give every topic a circled number (①②③...) and keep each one to 2 or 3 lines.
- End with one friendly closing line, e.g. "Ask me if anything catches your eye!"
- Keep the whole digest within {{max_chars}} characters.

Output format:
📰 {{today}} AI・テクノロジー最新トピック

{{skeleton}}
💡 (friendly closing line)

---
Summaries:

{{summaries}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let classify_path = custom_path.join("classify.toml");
            if classify_path.exists() {
                let content = std::fs::read_to_string(&classify_path)?;
                prompts.classify = toml::from_str(&content)?;
            }

            let summarize_path = custom_path.join("summarize.toml");
            if summarize_path.exists() {
                let content = std::fs::read_to_string(&summarize_path)?;
                prompts.summarize = toml::from_str(&content)?;
            }

            let digest_path = custom_path.join("digest.toml");
            if digest_path.exists() {
                let content = std::fs::read_to_string(&digest_path)?;
                prompts.digest = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
