use std::f64::consts::PI;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::warn;

use crate::config::SummarySettings;
use crate::error::{StageError, StageResult};
use crate::sentiment::SentimentLabel;
use crate::tally::SentimentTally;

// matplotlib "tab" palette
pub const POSITIVE_COLOR: RGBColor = RGBColor(0x2c, 0xa0, 0x2c);
pub const NEGATIVE_COLOR: RGBColor = RGBColor(0xd6, 0x27, 0x28);
pub const NEUTRAL_COLOR: RGBColor = RGBColor(0x7f, 0x7f, 0x7f);
pub const FALLBACK_COLOR: RGBColor = RGBColor(0x94, 0x67, 0xbd);

const START_ANGLE: f64 = 90.0;
const LABEL_DISTANCE: f64 = 1.1;
const PERCENT_DISTANCE: f64 = 0.6;
const RADIUS_FRACTION: f64 = 0.35;
const TITLE_SIZE: f64 = 22.0;
const LABEL_SIZE: f64 = 16.0;

pub fn color_for(label: &str) -> Option<RGBColor> {
    match label.parse::<SentimentLabel>().ok()? {
        SentimentLabel::Positive => Some(POSITIVE_COLOR),
        SentimentLabel::Negative => Some(NEGATIVE_COLOR),
        SentimentLabel::Neutral => Some(NEUTRAL_COLOR),
    }
}

/// One wedge of the pie. Angles are in degrees, counter-clockwise from
/// 3 o'clock, with `end > start`.
#[derive(Debug, Clone)]
pub struct Slice {
    pub label: String,
    pub count: usize,
    pub start: f64,
    pub end: f64,
    pub color: RGBColor,
}

impl Slice {
    pub fn fraction(&self) -> f64 {
        (self.end - self.start) / 360.0
    }

    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.fraction() * 100.0)
    }

    fn mid_angle(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Lays the tally out as wedges in tally order, starting at 12 o'clock.
/// Labels without a color fail in strict mode and otherwise get
/// `FALLBACK_COLOR`.
pub fn layout(tally: &SentimentTally, strict: bool) -> StageResult<Vec<Slice>> {
    let total = tally.total();
    let mut start = START_ANGLE;
    let mut slices = Vec::with_capacity(tally.entries().len());

    for (label, count) in tally.entries() {
        let color = match color_for(label) {
            Some(c) => c,
            None if strict => {
                return Err(StageError::UnclassifiedCategory {
                    label: label.clone(),
                })
            }
            None => {
                warn!(label = %label, "no chart color for label, using fallback");
                FALLBACK_COLOR
            }
        };
        let sweep = if total == 0 {
            0.0
        } else {
            360.0 * *count as f64 / total as f64
        };
        slices.push(Slice {
            label: label.clone(),
            count: *count,
            start,
            end: start + sweep,
            color,
        });
        start += sweep;
    }
    Ok(slices)
}

/// Renders `slices` to `path`. The format follows the file extension.
pub fn render(slices: &[Slice], settings: &SummarySettings, path: &Path) -> StageResult<()> {
    let size = (settings.width, settings.height);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("svg") => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_pie(&root, slices, &settings.title).map_err(chart_err)?;
            root.present().map_err(chart_err)
        }
        #[cfg(feature = "png")]
        Some("png") => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_pie(&root, slices, &settings.title).map_err(chart_err)?;
            root.present().map_err(chart_err)
        }
        _ => Err(StageError::UnsupportedChartFormat {
            path: path.to_path_buf(),
        }),
    }
}

fn chart_err<E: std::fmt::Display>(err: E) -> StageError {
    StageError::Chart(err.to_string())
}

fn draw_pie<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    slices: &[Slice],
    title: &str,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let (w, h) = root.dim_in_pixel();

    let title_style = TextStyle::from(("sans-serif", TITLE_SIZE)).pos(Pos::new(HPos::Center, VPos::Top));
    root.draw(&Text::new(title.to_string(), (w as i32 / 2, 16), title_style))?;

    // square plot area below the title keeps the pie a circle
    let radius = f64::from(w.min(h)) * RADIUS_FRACTION;
    let center = (f64::from(w) / 2.0, f64::from(h) / 2.0 + TITLE_SIZE);

    for slice in slices.iter().filter(|s| s.end > s.start) {
        let outline = wedge_points(center, radius, slice.start, slice.end);
        root.draw(&Polygon::new(outline.clone(), slice.color.filled()))?;

        let mut border = outline;
        if let Some(first) = border.first().copied() {
            border.push(first);
        }
        root.draw(&PathElement::new(border, BLACK.stroke_width(1)))?;
    }

    for slice in slices.iter().filter(|s| s.end > s.start) {
        let mid = slice.mid_angle();
        let (lx, ly) = polar(center, radius * LABEL_DISTANCE, mid);
        let h_pos = if mid.to_radians().cos() >= 0.0 {
            HPos::Left
        } else {
            HPos::Right
        };
        let label_style = TextStyle::from(("sans-serif", LABEL_SIZE)).pos(Pos::new(h_pos, VPos::Center));
        root.draw(&Text::new(slice.label.clone(), (lx, ly), label_style))?;

        let pct_style = TextStyle::from(("sans-serif", LABEL_SIZE)).pos(Pos::new(HPos::Center, VPos::Center));
        let (px, py) = polar(center, radius * PERCENT_DISTANCE, mid);
        root.draw(&Text::new(slice.percent_label(), (px, py), pct_style))?;
    }
    Ok(())
}

/// Closed outline of a wedge: the center followed by points along the arc.
fn wedge_points(center: (f64, f64), radius: f64, start: f64, end: f64) -> Vec<(i32, i32)> {
    let steps = ((end - start).ceil() as usize).max(2);
    let mut points = Vec::with_capacity(steps + 2);
    points.push((center.0.round() as i32, center.1.round() as i32));
    for i in 0..=steps {
        let angle = start + (end - start) * i as f64 / steps as f64;
        points.push(polar(center, radius, angle));
    }
    points
}

fn polar(center: (f64, f64), radius: f64, degrees: f64) -> (i32, i32) {
    let rad = degrees * PI / 180.0;
    let x = center.0 + radius * rad.cos();
    // screen y grows downward
    let y = center.1 - radius * rad.sin();
    (x.round() as i32, y.round() as i32)
}
