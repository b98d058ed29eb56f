use std::env;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::StageResult;
use crate::sentiment::SentimentLabel;

const CONFIG_FILE_VAR: &str = "SENTIMENT_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "sentiment.toml";

/// Settings for both stages. Every field has a default, so an absent config
/// file and an empty environment reproduce the fixed paths of the batch tools.
///
/// Sources, later ones winning:
/// 1. built-in defaults
/// 2. `sentiment.toml` (or the file named by `SENTIMENT_CONFIG`), if present
/// 3. `SENTIMENT_<SECTION>__<FIELD>` environment variables,
///    e.g. `SENTIMENT_CLASSIFIER__TEXT_COLUMN=Review`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub classifier: ClassifierSettings,
    pub summary: SummarySettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Spreadsheet holding the raw feedback. Default `CRM_v2.xlsx`.
    pub input: PathBuf,
    /// Where the scored table is written. Default `feedback_analyzed.xlsx`.
    pub output: PathBuf,
    /// Sheet to read; the first sheet when unset.
    pub sheet: Option<String>,
    /// Column holding the free text. Default `Requirement`.
    pub text_column: String,
    pub score_column: String,
    pub label_column: String,
    pub thresholds: Thresholds,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        ClassifierSettings {
            input: PathBuf::from("CRM_v2.xlsx"),
            output: PathBuf::from("feedback_analyzed.xlsx"),
            sheet: None,
            text_column: "Requirement".to_string(),
            score_column: "compound_score".to_string(),
            label_column: "sentiment_label".to_string(),
            thresholds: Thresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummarySettings {
    /// The classifier's output. Default `feedback_analyzed.xlsx`.
    pub input: PathBuf,
    pub sheet: Option<String>,
    pub label_column: String,
    /// `.svg`, or `.png` when built with the `png` feature.
    pub chart_path: PathBuf,
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Fail on labels without a chart color instead of drawing them in the
    /// fallback color.
    pub strict_labels: bool,
}

impl Default for SummarySettings {
    fn default() -> Self {
        SummarySettings {
            input: PathBuf::from("feedback_analyzed.xlsx"),
            sheet: None,
            label_column: "sentiment_label".to_string(),
            chart_path: PathBuf::from("sentiment_pie_chart.svg"),
            title: "Overall Sentiment Distribution of Feedback".to_string(),
            width: 800,
            height: 800,
            strict_labels: false,
        }
    }
}

/// Compound-score cut-offs. Scores at or above `positive` are Positive, at or
/// below `negative` are Negative, anything strictly between is Neutral.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct Thresholds {
    pub positive: f64,
    pub negative: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            positive: 0.05,
            negative: -0.05,
        }
    }
}

impl Thresholds {
    pub fn label_for(&self, score: f64) -> SentimentLabel {
        if score >= self.positive {
            SentimentLabel::Positive
        } else if score <= self.negative {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl Settings {
    pub fn load() -> StageResult<Settings> {
        let file = env::var(CONFIG_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&file)
    }

    /// Layers `file` (optional) and the environment over the defaults.
    pub fn load_from(file: &Path) -> StageResult<Settings> {
        let settings = Config::builder()
            .add_source(File::from(file).required(false))
            .add_source(
                Environment::with_prefix("SENTIMENT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
