use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::config::Thresholds;
use crate::table::CellValue;

// Accepts decorated labels from older output files, e.g. "POSITIVE 😊".
static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(positive|negative|neutral)\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = LABEL_RE.captures(s).ok_or(())?;
        match caps[1].to_ascii_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            _ => Err(()),
        }
    }
}

/// What the classifier sees of a cell: text, nothing, or something else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextInput<'a> {
    Text(&'a str),
    Missing,
    Other,
}

impl<'a> TextInput<'a> {
    /// The text to hand to a scorer; `None` for missing, non-text and blank
    /// cells, which all take the neutral default.
    pub fn scorable(&self) -> Option<&'a str> {
        match *self {
            TextInput::Text(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }
}

impl<'a> From<&'a CellValue> for TextInput<'a> {
    fn from(cell: &'a CellValue) -> Self {
        match cell {
            CellValue::Missing => TextInput::Missing,
            CellValue::Text(s) => TextInput::Text(s),
            _ => TextInput::Other,
        }
    }
}

/// Source of compound polarity scores in [-1.0, 1.0].
pub trait PolarityScorer: Sync {
    fn compound(&self, text: &str) -> f64;
}

/// Lexicon and rule based scorer (VADER).
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        VaderScorer {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for VaderScorer {
    fn compound(&self, text: &str) -> f64 {
        self.analyzer
            .polarity_scores(text)
            .get("compound")
            .copied()
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub score: f64,
    pub label: SentimentLabel,
}

impl Classification {
    pub const NEUTRAL: Classification = Classification {
        score: 0.0,
        label: SentimentLabel::Neutral,
    };
}

/// Scores one cell. Missing, non-text and blank cells are Neutral with a
/// score of 0.0; the scorer is only consulted for real text.
pub fn classify(
    input: TextInput<'_>,
    scorer: &dyn PolarityScorer,
    thresholds: &Thresholds,
) -> Classification {
    let Some(text) = input.scorable() else {
        return Classification::NEUTRAL;
    };

    let raw = scorer.compound(text);
    let score = if raw.is_nan() { 0.0 } else { raw.clamp(-1.0, 1.0) };
    Classification {
        score,
        label: thresholds.label_for(score),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Returns the same score for every input.
    pub(crate) struct FixedScorer(pub f64);

    impl PolarityScorer for FixedScorer {
        fn compound(&self, _text: &str) -> f64 {
            self.0
        }
    }

    /// Scores by keyword so table tests stay independent of the lexicon.
    pub(crate) struct KeywordScorer;

    impl PolarityScorer for KeywordScorer {
        fn compound(&self, text: &str) -> f64 {
            let lower = text.to_lowercase();
            if lower.contains("good") {
                0.7
            } else if lower.contains("bad") {
                -0.6
            } else {
                0.01
            }
        }
    }

    #[test]
    fn missing_and_other_are_neutral() {
        let t = Thresholds::default();
        let scorer = FixedScorer(0.9);
        assert_eq!(classify(TextInput::Missing, &scorer, &t), Classification::NEUTRAL);
        assert_eq!(classify(TextInput::Other, &scorer, &t), Classification::NEUTRAL);
        assert_eq!(
            classify((&CellValue::Number(123.0)).into(), &scorer, &t),
            Classification::NEUTRAL
        );
        assert_eq!(
            classify((&CellValue::Bool(true)).into(), &scorer, &t),
            Classification::NEUTRAL
        );
    }

    #[test]
    fn only_non_blank_text_is_scorable() {
        assert_eq!(TextInput::Text(" ok ").scorable(), Some(" ok "));
        assert_eq!(TextInput::Text(" \t").scorable(), None);
        assert_eq!(TextInput::Missing.scorable(), None);
        assert_eq!(TextInput::Other.scorable(), None);
    }

    #[test]
    fn blank_text_is_neutral() {
        let t = Thresholds::default();
        let scorer = FixedScorer(0.9);
        assert_eq!(classify(TextInput::Text(""), &scorer, &t), Classification::NEUTRAL);
        assert_eq!(classify(TextInput::Text("  \n"), &scorer, &t), Classification::NEUTRAL);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let t = Thresholds::default();
        let c = classify(TextInput::Text("x"), &FixedScorer(3.0), &t);
        assert_eq!(c.score, 1.0);
        assert_eq!(c.label, SentimentLabel::Positive);
        let c = classify(TextInput::Text("x"), &FixedScorer(f64::NAN), &t);
        assert_eq!(c, Classification::NEUTRAL);
    }

    #[test]
    fn vader_scenarios() {
        let t = Thresholds::default();
        let vader = VaderScorer::new();

        let love = classify(TextInput::Text("I love this product!"), &vader, &t);
        assert!(love.score >= 0.05, "score was {}", love.score);
        assert_eq!(love.label, SentimentLabel::Positive);

        let bad = classify(TextInput::Text("This is terrible and broken."), &vader, &t);
        assert!(bad.score <= -0.05, "score was {}", bad.score);
        assert_eq!(bad.label, SentimentLabel::Negative);
    }

    #[test]
    fn parses_plain_and_decorated_labels() {
        assert_eq!("Positive".parse(), Ok(SentimentLabel::Positive));
        assert_eq!("NEGATIVE 😠".parse(), Ok(SentimentLabel::Negative));
        assert_eq!(" neutral".parse(), Ok(SentimentLabel::Neutral));
        assert!("Mixed".parse::<SentimentLabel>().is_err());
        assert!("positively".parse::<SentimentLabel>().is_err());
        for label in [
            SentimentLabel::Positive,
            SentimentLabel::Negative,
            SentimentLabel::Neutral,
        ] {
            assert_eq!(label.to_string().parse(), Ok(label));
        }
    }

    proptest! {
        #[test]
        fn label_follows_thresholds(score in -1.0f64..=1.0) {
            let c = classify(TextInput::Text("text"), &FixedScorer(score), &Thresholds::default());
            prop_assert!((-1.0..=1.0).contains(&c.score));
            prop_assert_eq!(c.label == SentimentLabel::Positive, c.score >= 0.05);
            prop_assert_eq!(c.label == SentimentLabel::Negative, c.score <= -0.05);
            prop_assert_eq!(
                c.label == SentimentLabel::Neutral,
                c.score > -0.05 && c.score < 0.05
            );
        }

        #[test]
        fn vader_scores_stay_in_range(s in "[a-z]{1,10}( [a-z]{1,10}){0,6}") {
            let c = classify(TextInput::Text(&s), &VaderScorer::new(), &Thresholds::default());
            prop_assert!((-1.0..=1.0).contains(&c.score));
            prop_assert_eq!(c.label, Thresholds::default().label_for(c.score));
        }
    }
}
