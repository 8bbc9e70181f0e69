//! Transcript export: CSV and JSON renderings of a session's history.
//!
//! Offers and counter values are written with 6 decimals; timestamps are
//! ISO-8601 with millisecond precision.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{BargainError, Result};
use crate::offer::OfferPolicy;
use crate::types::{Decision, HistoryEntry, Proposer};

/// Column layout of the CSV transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptFormat {
    FixedSkew,
    Alternating,
}

impl TranscriptFormat {
    pub fn for_policy(policy: &OfferPolicy) -> Self {
        match policy {
            OfferPolicy::FixedSkew { .. } => TranscriptFormat::FixedSkew,
            OfferPolicy::AlternatingProposer { .. } => TranscriptFormat::Alternating,
        }
    }

    pub fn header(&self) -> &'static [&'static str] {
        match self {
            TranscriptFormat::FixedSkew => {
                &["sessionId", "round", "offerA", "offerB", "decision", "timestamp"]
            }
            TranscriptFormat::Alternating => &[
                "sessionId",
                "round",
                "proposer",
                "offerA",
                "offerB",
                "decision",
                "counterA",
                "timestamp",
            ],
        }
    }

    fn file_prefix(&self) -> &'static str {
        match self {
            TranscriptFormat::FixedSkew => "negotiation_b_favored",
            TranscriptFormat::Alternating => "negotiation_alternating",
        }
    }
}

/// Download file name for a session's CSV transcript.
pub fn transcript_file_name(session_id: &str, format: TranscriptFormat) -> String {
    format!("{}_{}.csv", format.file_prefix(), session_id)
}

fn fmt6(x: f64) -> String {
    format!("{x:.6}")
}

fn fmt_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One data row, without trailing newline.
pub fn csv_row(entry: &HistoryEntry, format: TranscriptFormat) -> String {
    let mut cells = vec![entry.session_id.clone(), entry.round.to_string()];
    if format == TranscriptFormat::Alternating {
        cells.push(entry.proposer.map(|p| p.to_string()).unwrap_or_default());
    }
    cells.push(fmt6(entry.offer_a));
    cells.push(fmt6(entry.offer_b));
    cells.push(entry.decision.to_string());
    if format == TranscriptFormat::Alternating {
        cells.push(entry.counter_value.map(fmt6).unwrap_or_default());
    }
    cells.push(fmt_timestamp(&entry.timestamp));
    cells.join(",")
}

/// Header plus one row per entry, joined with `\n`.
pub fn to_csv(history: &[HistoryEntry], format: TranscriptFormat) -> String {
    let mut lines = vec![format.header().join(",")];
    lines.extend(history.iter().map(|e| csv_row(e, format)));
    lines.join("\n")
}

/// Pretty-printed JSON array of the history.
pub fn to_json(history: &[HistoryEntry]) -> Result<String> {
    serde_json::to_string_pretty(history)
        .map_err(|e| BargainError::Export(format!("JSON serialization failed: {e}")))
}

/// A CSV data row read back into typed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRecord {
    pub session_id: String,
    pub round: u32,
    pub proposer: Option<Proposer>,
    pub offer_a: f64,
    pub offer_b: f64,
    pub decision: Decision,
    pub counter_value: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

pub fn parse_csv_row(line: &str, format: TranscriptFormat) -> Result<CsvRecord> {
    let cells: Vec<&str> = line.trim_end_matches(&['\r', '\n'][..]).split(',').collect();
    let expected = format.header().len();
    if cells.len() != expected {
        return Err(BargainError::Export(format!(
            "expected {expected} columns, found {}",
            cells.len()
        )));
    }

    let mut it = cells.into_iter();
    let mut next = || it.next().unwrap_or_default();

    let session_id = next().to_string();
    let round = next()
        .parse::<u32>()
        .map_err(|e| BargainError::Export(format!("bad round: {e}")))?;
    let proposer = match format {
        TranscriptFormat::Alternating => match next() {
            "" => None,
            p => Some(
                Proposer::parse(p)
                    .ok_or_else(|| BargainError::Export(format!("bad proposer '{p}'")))?,
            ),
        },
        TranscriptFormat::FixedSkew => None,
    };
    let offer_a = parse_f64(next(), "offerA")?;
    let offer_b = parse_f64(next(), "offerB")?;
    let decision_raw = next();
    let decision = Decision::parse(decision_raw)
        .ok_or_else(|| BargainError::Export(format!("bad decision '{decision_raw}'")))?;
    let counter_value = match format {
        TranscriptFormat::Alternating => match next() {
            "" => None,
            v => Some(parse_f64(v, "counterA")?),
        },
        TranscriptFormat::FixedSkew => None,
    };
    let timestamp = DateTime::parse_from_rfc3339(next())
        .map_err(|e| BargainError::Export(format!("bad timestamp: {e}")))?
        .with_timezone(&Utc);

    Ok(CsvRecord {
        session_id,
        round,
        proposer,
        offer_a,
        offer_b,
        decision,
        counter_value,
        timestamp,
    })
}

fn parse_f64(raw: &str, column: &str) -> Result<f64> {
    raw.parse::<f64>()
        .map_err(|e| BargainError::Export(format!("bad {column}: {e}")))
}

/// Writes transcripts into a directory.
pub struct TranscriptExporter {
    pub output_dir: PathBuf,
}

impl TranscriptExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub async fn write_csv(
        &self,
        session_id: &str,
        history: &[HistoryEntry],
        format: TranscriptFormat,
    ) -> Result<PathBuf> {
        let path = self.output_dir.join(transcript_file_name(session_id, format));
        self.write(&path, to_csv(history, format)).await?;
        info!(session_id, rows = history.len(), path = %path.display(), "Exported CSV transcript");
        Ok(path)
    }

    pub async fn write_json(&self, session_id: &str, history: &[HistoryEntry]) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("negotiation_{session_id}.json"));
        self.write(&path, to_json(history)?).await?;
        info!(session_id, rows = history.len(), path = %path.display(), "Exported JSON transcript");
        Ok(path)
    }

    async fn write(&self, path: &Path, contents: String) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;
        tokio::fs::write(path, contents)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(decision: Decision, proposer: Option<Proposer>, counter: Option<f64>) -> HistoryEntry {
        HistoryEntry {
            session_id: "20250102030405".to_string(),
            round: 3,
            proposer,
            offer_a: 0.123_456_789,
            offer_b: 0.876_543_211,
            decision,
            counter_value: counter,
            timestamp: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn fixed_skew_row_layout() {
        let row = csv_row(&entry(Decision::Reject, None, None), TranscriptFormat::FixedSkew);
        assert_eq!(
            row,
            "20250102030405,3,0.123457,0.876543,reject,2025-01-02T03:04:05.000Z"
        );
    }

    #[test]
    fn alternating_row_blanks_missing_counter() {
        let row = csv_row(
            &entry(Decision::Counter, Some(Proposer::A), None),
            TranscriptFormat::Alternating,
        );
        assert_eq!(
            row,
            "20250102030405,3,A,0.123457,0.876543,counter,,2025-01-02T03:04:05.000Z"
        );
    }

    #[test]
    fn csv_has_header_and_rows() {
        let history = vec![
            entry(Decision::Reject, None, None),
            entry(Decision::Accept, None, None),
        ];
        let csv = to_csv(&history, TranscriptFormat::FixedSkew);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "sessionId,round,offerA,offerB,decision,timestamp");
    }

    #[test]
    fn csv_row_reads_back() {
        let original = entry(Decision::Counter, Some(Proposer::B), Some(0.6));
        let line = csv_row(&original, TranscriptFormat::Alternating);
        let rec = parse_csv_row(&line, TranscriptFormat::Alternating).unwrap();
        assert_eq!(rec.session_id, original.session_id);
        assert_eq!(rec.round, original.round);
        assert_eq!(rec.proposer, Some(Proposer::B));
        assert_eq!(rec.decision, Decision::Counter);
        assert!((rec.offer_a - original.offer_a).abs() < 5e-7);
        assert!((rec.offer_b - original.offer_b).abs() < 5e-7);
        assert_eq!(rec.counter_value, Some(0.6));
        assert_eq!(rec.timestamp, original.timestamp);
    }

    #[test]
    fn parse_rejects_wrong_width() {
        let err = parse_csv_row("a,1,0.1", TranscriptFormat::FixedSkew).unwrap_err();
        assert!(err.to_string().contains("expected 6 columns"));
    }

    #[test]
    fn json_uses_transcript_keys() {
        let json = to_json(&[entry(Decision::Reject, None, None)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let row = &value[0];
        assert_eq!(row["sessionId"], "20250102030405");
        assert_eq!(row["decision"], "reject");
        assert!(row["counterA"].is_null());
        assert!(row["proposer"].is_null());
        assert!(json.contains('\n'));
    }

    #[test]
    fn file_names() {
        assert_eq!(
            transcript_file_name("20250102030405", TranscriptFormat::FixedSkew),
            "negotiation_b_favored_20250102030405.csv"
        );
        assert_eq!(
            transcript_file_name("x", TranscriptFormat::Alternating),
            "negotiation_alternating_x.csv"
        );
    }

    #[tokio::test]
    async fn exporter_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = TranscriptExporter::new(dir.path().join("out"));
        let history = vec![entry(Decision::Accept, None, None)];

        let csv_path = exporter
            .write_csv("20250102030405", &history, TranscriptFormat::FixedSkew)
            .await
            .unwrap();
        let body = std::fs::read_to_string(&csv_path).unwrap();
        assert!(body.starts_with("sessionId,round"));

        let json_path = exporter.write_json("20250102030405", &history).await.unwrap();
        assert!(json_path.ends_with("negotiation_20250102030405.json"));
    }
}
