use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StageError {
    #[error("could not find the file named '{}'", .path.display())]
    SourceNotFound { path: PathBuf },

    #[error("the column '{column}' was not found in '{}'", .path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("no chart color is configured for sentiment label '{label}'")]
    UnclassifiedCategory { label: String },

    #[error("sheet '{sheet}' was not found in '{}'", .path.display())]
    SheetNotFound { sheet: String, path: PathBuf },

    #[error("'{}' contains no sheets", .path.display())]
    EmptyWorkbook { path: PathBuf },

    #[error("unsupported chart format for '{}' (expected .svg, or .png with the `png` feature)", .path.display())]
    UnsupportedChartFormat { path: PathBuf },

    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("failed to write spreadsheet: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to render chart: {0}")]
    Chart(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

impl StageError {
    /// Errors an operator can fix by changing the input or settings. The
    /// binaries report these with a hint instead of propagating them.
    pub fn is_anticipated(&self) -> bool {
        matches!(
            self,
            StageError::SourceNotFound { .. }
                | StageError::MissingColumn { .. }
                | StageError::UnclassifiedCategory { .. }
        )
    }

    pub fn hint(&self) -> Option<String> {
        match self {
            StageError::SourceNotFound { path } => Some(format!(
                "Please make sure '{}' exists, or point the settings at the right file.",
                path.display()
            )),
            StageError::MissingColumn { column, .. } => Some(format!(
                "Check the header row for '{column}', or set the column name in sentiment.toml."
            )),
            StageError::UnclassifiedCategory { .. } => Some(
                "Labels must be Positive, Negative or Neutral; re-run the classifier or disable strict_labels."
                    .to_string(),
            ),
            _ => None,
        }
    }

    /// The operator-facing report: the message, then the hint if any.
    pub fn diagnostic(&self) -> String {
        match self.hint() {
            Some(hint) => format!("ERROR: {self}.\n{hint}"),
            None => format!("ERROR: {self}."),
        }
    }
}

/// Prints `err` to stderr for an anticipated failure and picks the exit code.
pub fn report_failure(err: &StageError) -> ExitCode {
    eprintln!("\n{}", err.diagnostic());
    ExitCode::FAILURE
}

pub type StageResult<T> = Result<T, StageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anticipated_kinds() {
        let not_found = StageError::SourceNotFound {
            path: PathBuf::from("CRM_v2.xlsx"),
        };
        let missing = StageError::MissingColumn {
            column: "Requirement".into(),
            path: PathBuf::from("CRM_v2.xlsx"),
        };
        let chart = StageError::Chart("backend".into());

        assert!(not_found.is_anticipated());
        assert!(missing.is_anticipated());
        assert!(!chart.is_anticipated());
        assert!(chart.hint().is_none());
    }

    #[test]
    fn messages_name_the_file_and_column() {
        let err = StageError::MissingColumn {
            column: "Requirement".into(),
            path: PathBuf::from("CRM_v2.xlsx"),
        };
        let msg = err.to_string();
        assert!(msg.contains("Requirement"));
        assert!(msg.contains("CRM_v2.xlsx"));
        assert!(err.hint().unwrap().contains("Requirement"));
    }

    #[test]
    fn diagnostic_appends_the_hint() {
        let err = StageError::SourceNotFound {
            path: PathBuf::from("CRM_v2.xlsx"),
        };
        let text = err.diagnostic();
        let (first, second) = text.split_once('\n').unwrap();
        assert_eq!(first, "ERROR: could not find the file named 'CRM_v2.xlsx'.");
        assert!(second.contains("CRM_v2.xlsx"));

        let chart = StageError::Chart("backend".into());
        assert_eq!(chart.diagnostic(), "ERROR: failed to render chart: backend.");
    }
}
