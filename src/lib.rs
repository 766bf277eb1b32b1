//! Tubebrief - YouTube summaries, delivered
//!
//! A CLI tool that classifies and summarizes YouTube videos with a generative
//! model, files each one in a Notion database and pushes a daily digest of the
//! news to LINE.
//!
//! # Overview
//!
//! Tubebrief allows you to:
//! - Summarize a single video from any common YouTube URL shape
//! - Process the latest videos of one or more channels in a paced batch
//! - Classify every video as NEWS, HOWTO or GENERAL
//! - Compose one digest from the NEWS videos of a batch
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings, prompt templates and credentials
//! - `video_source` - Video reference resolution and metadata
//! - `transcript` - Caption tracks and the transcript fallback chain
//! - `generation` - Generative model backends
//! - `classifier` - Response parsing and summarization
//! - `store` - Document store (Notion) persistence
//! - `notify` - Push notifications (LINE)
//! - `digest` - Digest composition
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use tubebrief::config::{Credentials, Settings};
//! use tubebrief::orchestrator::PipelineOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let credentials = Credentials::from_env();
//!     let orchestrator = PipelineOrchestrator::from_settings(&settings, &credentials)?;
//!
//!     // Summarize one video without saving or sending anything
//!     let result = orchestrator.run_video("https://youtu.be/dQw4w9WgXcQ", true).await;
//!     if let Some(classification) = result.classification {
//!         println!("{}: {}", classification.category, classification.summary);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod cli;
pub mod config;
pub mod digest;
pub mod error;
pub mod generation;
pub mod http;
pub mod notify;
pub mod orchestrator;
pub mod store;
pub mod transcript;
pub mod video_source;

pub use error::{FailureKind, Result, TubebriefError};
