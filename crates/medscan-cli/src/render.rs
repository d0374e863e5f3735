//! Text rendering of controller state.
//!
//! Colors follow the session theme: the dark palette uses bright tier
//! colors with dimmed secondary text, the light palette darker tier colors
//! without dimming so nothing washes out on a light background.

use colored::{Color, ColoredString, Colorize};
use medscan_application::ControllerSnapshot;
use medscan_core::classification::{ConfidenceLevel, Prediction};
use medscan_core::history::HistoryRecord;
use medscan_core::theme::Theme;

/// Terminal styling derived from a [`Theme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Palette {
    high: Color,
    medium: Color,
    low: Color,
    dim_secondary: bool,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                high: Color::BrightGreen,
                medium: Color::BrightYellow,
                low: Color::BrightRed,
                dim_secondary: true,
            },
            Theme::Light => Self {
                high: Color::Green,
                medium: Color::TrueColor {
                    r: 176,
                    g: 112,
                    b: 0,
                },
                low: Color::Red,
                dim_secondary: false,
            },
        }
    }

    fn tier(&self, level: ConfidenceLevel) -> Color {
        match level {
            ConfidenceLevel::High => self.high,
            ConfidenceLevel::Medium => self.medium,
            ConfidenceLevel::Low => self.low,
        }
    }

    fn tier_color(&self, prediction: &Prediction, text: String) -> ColoredString {
        text.color(self.tier(prediction.confidence_level()))
    }

    fn secondary(&self, text: &str) -> ColoredString {
        if self.dim_secondary {
            text.dimmed()
        } else {
            text.normal()
        }
    }
}

fn confidence_bar(prediction: &Prediction) -> String {
    let filled = (prediction.percentage().clamp(0, 100) / 5) as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(20 - filled))
}

/// Full detail view of one record in `theme`.
pub fn record(record: &HistoryRecord, theme: Theme) -> String {
    let palette = Palette::for_theme(theme);
    let mut out = Vec::new();
    let top = record.top_prediction();
    out.push(format!(
        "{} {}",
        "Top prediction:".bold(),
        palette
            .tier_color(top, format!("{} ({}%)", top.class, top.percentage()))
            .bold()
    ));

    for prediction in record.result().predictions() {
        out.push(format!(
            "  {:<24} {} {}",
            prediction.class,
            palette.tier_color(prediction, confidence_bar(prediction)),
            palette.tier_color(prediction, format!("{:>3}%", prediction.percentage()))
        ));
    }

    let attention = record.result().attention();
    out.push(format!("{} {}", "Explanation:".bold(), attention.explanation));

    let area = attention.focus_area;
    let mut focus = format!(
        "top {}%, left {}%, width {}%, height {}%",
        area.top, area.left, area.width, area.height
    );
    if !area.is_within_bounds() {
        let shown = area.clamped();
        let note = format!(
            "(outside the image; drawn as top {}%, left {}%, width {}%, height {}%)",
            shown.top, shown.left, shown.width, shown.height
        );
        focus.push_str(&format!(" {}", palette.secondary(&note)));
    }
    out.push(format!("{} {}", "Focus area:".bold(), focus));

    let indicator = record.feedback().indicator();
    out.push(format!(
        "{} {} {}",
        "Feedback:".bold(),
        indicator.glyph,
        indicator.label
    ));
    out.push(format!(
        "{} {}",
        palette.secondary("ID:"),
        palette.secondary(record.id())
    ));
    out.push(palette.secondary(&record.summary()).to_string());
    out.join("\n")
}

/// History listing, newest first; the current record is marked.
pub fn history(snapshot: &ControllerSnapshot) -> String {
    let palette = Palette::for_theme(snapshot.theme);
    if snapshot.history.is_empty() {
        return palette.secondary("No predictions yet.").to_string();
    }

    let current = snapshot.current_record().map(|r| r.id());
    snapshot
        .history
        .iter()
        .map(|record| {
            let marker = if Some(record.id()) == current { ">" } else { " " };
            let top = record.top_prediction();
            format!(
                "{marker} {}  {}  {}",
                palette.secondary(record.id()),
                palette.tier_color(top, record.summary()),
                record.feedback().indicator().glyph
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn failure(message: &str) -> ColoredString {
    message.red().bold()
}

pub fn warning(message: &str) -> ColoredString {
    message.yellow()
}

pub fn theme(theme: Theme) -> String {
    match theme {
        Theme::Dark => format!("Theme: {}", "dark".bold()),
        Theme::Light => format!("Theme: {}", "light".bold()),
    }
}
