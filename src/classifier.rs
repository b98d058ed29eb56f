use std::path::Path;

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::{ClassifierSettings, Thresholds};
use crate::error::StageResult;
use crate::sentiment::{classify, Classification, PolarityScorer, SentimentLabel, TextInput};
use crate::table::{read_table, write_table, CellValue, Table};

/// Counts from one classifier run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifyReport {
    pub rows: usize,
    /// Rows whose text went through the scorer.
    pub scored: usize,
    /// Missing, blank or non-text rows given the neutral default.
    pub fallback: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl ClassifyReport {
    fn record(&mut self, input: TextInput<'_>, c: &Classification) {
        self.rows += 1;
        if input.scorable().is_some() {
            self.scored += 1;
        } else {
            self.fallback += 1;
        }
        match c.label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }

    pub fn print(&self) {
        println!("  rows: {}", self.rows);
        println!("  scored: {} (neutral default: {})", self.scored, self.fallback);
        println!(
            "  positive: {}  negative: {}  neutral: {}",
            self.positive, self.negative, self.neutral
        );
    }
}

#[cfg(feature = "rayon")]
fn classify_all(
    inputs: &[TextInput<'_>],
    scorer: &dyn PolarityScorer,
    thresholds: &Thresholds,
) -> Vec<Classification> {
    inputs
        .par_iter()
        .map(|input| classify(*input, scorer, thresholds))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn classify_all(
    inputs: &[TextInput<'_>],
    scorer: &dyn PolarityScorer,
    thresholds: &Thresholds,
) -> Vec<Classification> {
    inputs
        .iter()
        .map(|input| classify(*input, scorer, thresholds))
        .collect()
}

/// Scores every row of `text_column` and fills the score and label columns.
/// A derived column already in the table (from an earlier run) is
/// overwritten where it stands; absent ones are appended at the end.
pub fn score_table(
    mut table: Table,
    source: &Path,
    settings: &ClassifierSettings,
    scorer: &dyn PolarityScorer,
) -> StageResult<(Table, ClassifyReport)> {
    let text_idx = table.require_column(&settings.text_column, source)?;

    let inputs: Vec<TextInput<'_>> = table.column(text_idx).map(TextInput::from).collect();
    let results = classify_all(&inputs, scorer, &settings.thresholds);

    let mut report = ClassifyReport::default();
    for (input, c) in inputs.iter().zip(&results) {
        report.record(*input, c);
    }

    let scores = results.iter().map(|c| CellValue::Number(c.score)).collect();
    let labels = results
        .iter()
        .map(|c| CellValue::Text(c.label.to_string()))
        .collect();
    table.set_column(&settings.score_column, scores);
    table.set_column(&settings.label_column, labels);

    Ok((table, report))
}

/// Classifier stage: read, score, write. Nothing is written unless every
/// step before the write succeeds.
pub fn run(settings: &ClassifierSettings, scorer: &dyn PolarityScorer) -> StageResult<ClassifyReport> {
    info!(
        input = %settings.input.display(),
        text_column = %settings.text_column,
        "starting classifier"
    );

    let table = read_table(&settings.input, settings.sheet.as_deref())?;
    if table.is_empty() {
        warn!(input = %settings.input.display(), "sheet has a header but no data rows");
    }
    let (scored, report) = score_table(table, &settings.input, settings, scorer)?;
    write_table(&scored, &settings.output)?;

    info!(
        output = %settings.output.display(),
        rows = report.rows,
        scored = report.scored,
        "classifier finished"
    );
    Ok(report)
}
