use std::process::ExitCode;

use anyhow::Result;
use feedback_sentiment::{classifier, init_tracing, report_failure, Settings, VaderScorer};
use tracing::info;

fn main() -> Result<ExitCode> {
    init_tracing();
    let settings = Settings::load()?.classifier;
    info!(settings_loaded = ?settings, msg = "Starting sentiment classifier");

    println!("Feedback Sentiment Classifier");
    println!("=============================\n");
    println!("Input: {:?} (column '{}')", settings.input, settings.text_column);

    let scorer = VaderScorer::new();
    match classifier::run(&settings, &scorer) {
        Ok(report) => {
            report.print();
            println!("\nAnalysis complete!");
            println!("Results saved to {}", settings.output.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_anticipated() => Ok(report_failure(&err)),
        Err(err) => Err(err.into()),
    }
}
