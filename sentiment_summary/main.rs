use std::process::ExitCode;

use anyhow::Result;
use feedback_sentiment::{init_tracing, report_failure, summarizer, Settings};
use tracing::info;

fn main() -> Result<ExitCode> {
    init_tracing();
    let settings = Settings::load()?.summary;
    info!(settings_loaded = ?settings, msg = "Starting sentiment summary");

    println!("Feedback Sentiment Summary");
    println!("==========================\n");
    println!("Input: {:?}\n", settings.input);

    match summarizer::run(&settings) {
        Ok(report) => {
            println!("{}", report.tally.render_markdown("Sentiment Distribution"));
            println!("Chart saved successfully as: {}", settings.chart_path.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_anticipated() => Ok(report_failure(&err)),
        Err(err) => Err(err.into()),
    }
}
