//! crates/drift_core/src/export.rs
//!
//! CSV report of the full entry collection followed by a summary block.

use chrono::NaiveDate;

use crate::aggregation::{emotion_label, most_frequent_emotion, positivity, stability_index};
use crate::domain::JournalEntry;

pub const EXPORT_FILENAME_PREFIX: &str = "emotional-drift-report-";

const HEADERS: [&str; 15] = [
    "Timestamp",
    "Text",
    "Dominant Emotion",
    "Joy",
    "Sadness",
    "Anger",
    "Fear",
    "Calm",
    "Surprise",
    "Intensity",
    "Confidence (%)",
    "Behavior-Assisted Confidence (%)",
    "User Rating (1-5)",
    "Typing Speed (cps)",
    "Time Spent (s)",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV buffer error: {0}")]
    Buffer(String),
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// `emotional-drift-report-YYYY-MM-DD.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("{}{}.csv", EXPORT_FILENAME_PREFIX, date.format("%Y-%m-%d"))
}

fn writer(style: csv::QuoteStyle) -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .flexible(true)
        .quote_style(style)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn into_bytes(wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    wtr.into_inner()
        .map_err(|e| ExportError::Buffer(e.error().to_string()))
}

/// The text column is always quoted, with inner quotes doubled.
fn quoted_text(text: &str) -> Result<String, ExportError> {
    let mut wtr = writer(csv::QuoteStyle::Always);
    wtr.write_record([text])?;
    let mut field = String::from_utf8(into_bytes(wtr)?)?;
    field.pop();
    Ok(field)
}

fn entry_row(e: &JournalEntry) -> Result<Vec<String>, ExportError> {
    let s = &e.emotions;
    Ok(vec![
        e.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        quoted_text(&e.text)?,
        e.dominant_emotion.key().to_string(),
        format!("{:.2}", s.joy),
        format!("{:.2}", s.sadness),
        format!("{:.2}", s.anger),
        format!("{:.2}", s.fear),
        format!("{:.2}", s.calm),
        format!("{:.2}", s.surprise),
        e.intensity.to_string(),
        e.confidence.to_string(),
        e.behavior_confidence.to_string(),
        e.user_rating.to_string(),
        format!("{:.2}", e.behavioral_signals.typing_speed),
        format!("{:.1}", e.behavioral_signals.time_spent),
    ])
}

/// Renders `entries` (in the given, newest-first order) as a CSV report.
///
/// The text column is always quoted; every other column is written bare.
/// A blank line separates the rows from the summary block.
pub fn export_csv(entries: &[JournalEntry]) -> Result<String, ExportError> {
    // Rows carry the text already quoted, so the row writer must not quote again.
    let mut wtr = writer(csv::QuoteStyle::Never);
    wtr.write_record(HEADERS)?;
    for entry in entries {
        wtr.write_record(entry_row(entry)?)?;
    }
    let mut out = into_bytes(wtr)?;

    // The csv writer renders an empty record as `""`, so the separator is written raw.
    out.push(b'\n');

    let ratios = positivity(entries);
    let mut summary = writer(csv::QuoteStyle::Necessary);
    summary.write_record(["Summary Insights"])?;
    summary.write_record([
        "Stability Indicator".to_string(),
        format!("{}%", stability_index(entries)),
    ])?;
    summary.write_record([
        "Most Frequent Emotion",
        emotion_label(most_frequent_emotion(entries)),
    ])?;
    summary.write_record(["Positive Ratio".to_string(), format!("{}%", ratios.positive)])?;
    summary.write_record(["Negative Ratio".to_string(), format!("{}%", ratios.negative)])?;
    out.extend(into_bytes(summary)?);

    Ok(String::from_utf8(out)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BehavioralData, Emotion, EmotionScores};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn entry(text: &str) -> JournalEntry {
        JournalEntry {
            id: Uuid::new_v4(),
            user_id: "user-1".into(),
            text: text.into(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
            emotions: EmotionScores {
                joy: 0.756,
                calm: 0.2,
                ..EmotionScores::zeroed()
            },
            dominant_emotion: Emotion::Joy,
            intensity: 6,
            confidence: 82,
            behavior_confidence: 88,
            user_rating: 4,
            behavioral_signals: BehavioralData {
                typing_speed: 3.14159,
                time_spent: 42.3,
                text_length: text.chars().count(),
            },
        }
    }

    #[test]
    fn filename_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(export_filename(date), "emotional-drift-report-2026-10-19.csv");
    }

    #[test]
    fn quotes_in_text_are_doubled_and_wrapped() {
        let csv = export_csv(&[entry("He said \"hi\"")]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains(",\"He said \"\"hi\"\"\",joy,"), "row was {row}");
    }

    #[test]
    fn plain_text_is_still_quoted() {
        let csv = export_csv(&[entry("plain day")]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains(",\"plain day\",joy,"), "row was {row}");
    }

    #[test]
    fn commas_and_newlines_stay_inside_the_text_field() {
        let csv = export_csv(&[entry("one, two\nthree")]).unwrap();
        assert!(csv.contains(",\"one, two\nthree\",joy,"), "csv was {csv}");
    }

    #[test]
    fn row_formats_numbers() {
        let csv = export_csv(&[entry("fine")]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "2026-03-14T09:30:00.000Z,\"fine\",joy,0.76,0.00,0.00,0.00,0.20,0.00,6,82,88,4,3.14,42.3"
        );
    }

    #[test]
    fn summary_block_follows_blank_line() {
        let csv = export_csv(&[entry("fine")]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0].split(',').count(), 15);
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "Summary Insights");
        assert_eq!(lines[4], "Stability Indicator,100%");
        assert_eq!(lines[5], "Most Frequent Emotion,Joy");
        assert_eq!(lines[6], "Positive Ratio,91%");
        assert_eq!(lines[7], "Negative Ratio,0%");
    }

    #[test]
    fn empty_collection_still_has_header_and_summary() {
        let csv = export_csv(&[]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert!(lines[0].starts_with("Timestamp,Text,Dominant Emotion"));
        assert_eq!(lines[1], "");
        assert_eq!(lines[3], "Stability Indicator,100%");
        assert_eq!(lines[4], "Most Frequent Emotion,None");
        assert_eq!(lines[5], "Positive Ratio,0%");
    }
}
