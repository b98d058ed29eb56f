use tracing::{info, warn};

use crate::chart;
use crate::config::SummarySettings;
use crate::error::StageResult;
use crate::table::read_table;
use crate::tally::SentimentTally;

#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub tally: SentimentTally,
}

/// Summarizer stage: tally the label column and draw the pie chart.
/// Color problems are caught before the chart file is touched.
pub fn run(settings: &SummarySettings) -> StageResult<SummaryReport> {
    info!(
        input = %settings.input.display(),
        label_column = %settings.label_column,
        "starting summary"
    );

    let table = read_table(&settings.input, settings.sheet.as_deref())?;
    let tally = SentimentTally::from_table(&table, &settings.label_column, &settings.input)?;
    if tally.is_empty() {
        warn!(input = %settings.input.display(), "no labelled rows; the chart will be empty");
    }
    let slices = chart::layout(&tally, settings.strict_labels)?;
    chart::render(&slices, settings, &settings.chart_path)?;

    info!(
        chart = %settings.chart_path.display(),
        rows = tally.total(),
        labels = tally.entries().len(),
        "summary finished"
    );
    Ok(SummaryReport { tally })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StageError;
    use crate::table::{write_table, CellValue, Table};
    use tempfile::TempDir;

    fn labelled(labels: &[&str]) -> Table {
        let mut t = Table::new("Sheet1", vec!["Requirement".into(), "sentiment_label".into()]);
        for (i, label) in labels.iter().enumerate() {
            t.push_row(vec![
                CellValue::Text(format!("row {i}")),
                CellValue::Text(label.to_string()),
            ]);
        }
        t
    }

    fn settings_in(dir: &TempDir) -> SummarySettings {
        SummarySettings {
            input: dir.path().join("feedback_analyzed.xlsx"),
            chart_path: dir.path().join("pie.svg"),
            ..SummarySettings::default()
        }
    }

    #[test]
    fn tallies_and_draws() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        let mut labels = vec!["Positive"; 6];
        labels.extend(["Negative"; 3]);
        labels.push("Neutral");
        write_table(&labelled(&labels), &settings.input).unwrap();

        let report = run(&settings).unwrap();
        assert_eq!(report.tally.total(), 10);
        assert_eq!(report.tally.get("Negative"), 3);
        assert!(settings.chart_path.exists());
    }

    #[test]
    fn header_only_sheet_gives_an_empty_chart() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        write_table(&labelled(&[]), &settings.input).unwrap();

        let report = run(&settings).unwrap();
        assert!(report.tally.is_empty());
        assert!(settings.chart_path.exists());
    }

    #[test]
    fn missing_input() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        let err = run(&settings).unwrap_err();
        assert!(matches!(err, StageError::SourceNotFound { .. }));
        assert!(!settings.chart_path.exists());
    }

    #[test]
    fn missing_label_column() {
        let dir = TempDir::new().unwrap();
        let settings = SummarySettings {
            label_column: "Sentiment_Label".into(),
            ..settings_in(&dir)
        };
        write_table(&labelled(&["Positive"]), &settings.input).unwrap();

        let err = run(&settings).unwrap_err();
        assert!(matches!(err, StageError::MissingColumn { .. }));
        assert!(!settings.chart_path.exists());
    }

    #[test]
    fn strict_labels_reject_unknown_values() {
        let dir = TempDir::new().unwrap();
        let settings = SummarySettings {
            strict_labels: true,
            ..settings_in(&dir)
        };
        write_table(&labelled(&["Positive", "Mixed"]), &settings.input).unwrap();

        let err = run(&settings).unwrap_err();
        assert!(matches!(err, StageError::UnclassifiedCategory { .. }));
        assert!(!settings.chart_path.exists());
    }
}
