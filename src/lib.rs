//! Lexicon-based sentiment scoring for spreadsheets of free-text feedback.
//!
//! Two batch stages share this library:
//! - [`classifier::run`] scores one text column and writes the table back out
//!   with `compound_score` and `sentiment_label` filled in;
//! - [`summarizer::run`] tallies the labels and renders a pie chart.

pub mod chart;
pub mod classifier;
pub mod config;
pub mod error;
pub mod sentiment;
pub mod summarizer;
pub mod table;
pub mod tally;

pub use config::{ClassifierSettings, Settings, SummarySettings, Thresholds};
pub use error::{report_failure, StageError, StageResult};
pub use sentiment::{classify, Classification, PolarityScorer, SentimentLabel, TextInput, VaderScorer};

/// Sets up `tracing` output for the binaries, honouring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .try_init();
}
