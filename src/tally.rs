use std::path::Path;

use itertools::Itertools;

use crate::error::StageResult;
use crate::table::Table;

/// Label used for rows whose label cell is empty.
pub const BLANK_LABEL: &str = "(blank)";

/// Row counts per sentiment label, most frequent first. Labels with equal
/// counts keep the order in which they first appear in the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentimentTally {
    counts: Vec<(String, usize)>,
}

impl SentimentTally {
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for label in labels {
            let label = label.as_ref();
            match counts.iter_mut().find(|(l, _)| l == label) {
                Some((_, n)) => *n += 1,
                None => counts.push((label.to_string(), 1)),
            }
        }
        // stable: ties stay in first-seen order
        let counts = counts
            .into_iter()
            .sorted_by(|a, b| b.1.cmp(&a.1))
            .collect();
        SentimentTally { counts }
    }

    pub fn from_table(table: &Table, label_column: &str, source: &Path) -> StageResult<Self> {
        let idx = table.require_column(label_column, source)?;
        let labels = table.column(idx).map(|cell| {
            cell.as_display()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| BLANK_LABEL.to_string())
        });
        Ok(Self::from_labels(labels))
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.counts
    }

    pub fn get(&self, label: &str) -> usize {
        self.counts
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn percent(&self, label: &str) -> f64 {
        percent(self.get(label), self.total())
    }

    pub fn render_markdown(&self, title: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("## {}\n", title));
        out.push_str(&format!("- Total rows: {}\n", self.total()));
        for (label, count) in &self.counts {
            out.push_str(&format!(
                "- {}: {} ({:.1}%)\n",
                label,
                count,
                percent(*count, self.total())
            ));
        }
        out
    }
}

pub fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}
