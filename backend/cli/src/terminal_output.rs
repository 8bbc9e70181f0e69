//! Terminal output utilities: ANSI notes, table rendering, and the session board.

use bargain_core::{HistoryEntry, SessionStatus, SessionView};

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn paint(color: &str, s: &str) -> String {
    if supports_color() {
        format!("{color}{s}{RESET}")
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

/// Print a formatted INFO note to stdout.
pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

/// Print a formatted WARNING note.
pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

/// Print a formatted ERROR note.
pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

/// Print a formatted SUCCESS note.
pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

/// Column alignment.
pub enum Align {
    Left,
    Right,
}

/// A table column definition.
pub struct Column {
    pub header: String,
    pub align: Align,
}

impl Column {
    pub fn left(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Left }
    }
    pub fn right(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Right }
    }
}

/// Render a table with given columns and rows.
pub fn render_table(columns: &[Column], rows: &[Vec<String>]) -> String {
    let num_cols = columns.len();
    let mut widths: Vec<usize> = columns.iter().map(|c| strip_ansi(&c.header).chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(num_cols) {
            widths[i] = widths[i].max(strip_ansi(cell).chars().count());
        }
    }

    let mut out = String::new();

    let header_cells: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| pad_cell(&col.header, widths[i], &col.align))
        .collect();
    out.push_str(&format!("  {}  \n", paint(BOLD, &header_cells.join("  "))));

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("  {}  \n", sep.join("  ")));

    for row in rows {
        let cells: Vec<String> = (0..num_cols)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                pad_cell(cell, widths[i], &columns[i].align)
            })
            .collect();
        out.push_str(&format!("  {}  \n", cells.join("  ")));
    }

    out
}

fn pad_cell(s: &str, width: usize, align: &Align) -> String {
    let visible_len = strip_ansi(s).chars().count();
    let pad = width.saturating_sub(visible_len);
    match align {
        Align::Left => format!("{s}{}", " ".repeat(pad)),
        Align::Right => format!("{}{s}", " ".repeat(pad)),
    }
}

// ---------------------------------------------------------------------------
// Session board
// ---------------------------------------------------------------------------

/// `0.3` → `30.0%`.
pub fn pct(x: f64) -> String {
    format!("{:.1}%", 100.0 * x)
}

fn status_line(status: SessionStatus) -> String {
    let text = format!("Status: {status}");
    match status {
        SessionStatus::InProgress => paint(CYAN, &text),
        SessionStatus::Accepted => paint(GREEN, &text),
        SessionStatus::Rejected => paint(RED, &text),
    }
}

fn transcript_rows(history: &[HistoryEntry], with_proposer: bool) -> Vec<Vec<String>> {
    history
        .iter()
        .map(|h| {
            let mut row = vec![h.round.to_string()];
            if with_proposer {
                row.push(h.proposer.map(|p| p.to_string()).unwrap_or_default());
            }
            row.push(format!("{:.3}", h.offer_a));
            row.push(format!("{:.3}", h.offer_b));
            row.push(h.decision.to_string());
            if with_proposer {
                row.push(h.counter_value.map(|c| format!("{c:.3}")).unwrap_or_default());
            }
            row.push(
                h.timestamp
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            );
            row
        })
        .collect()
}

/// Round, status, current offer, and the transcript so far.
pub fn render_view(view: &SessionView, with_proposer: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}  Session: {}  Round: {} / {}",
        paint(DIM, "──"),
        view.session_id,
        view.round,
        view.max_rounds
    ));
    if let (true, Some(p)) = (with_proposer, view.proposer) {
        out.push_str(&format!("  Proposer: {p}"));
    }
    out.push('\n');
    out.push_str(&status_line(view.status));
    out.push('\n');

    match view.offer {
        Some(offer) => out.push_str(&format!(
            "Offer  A: {}   B: {}\n",
            paint(BOLD, &pct(offer.share_a)),
            paint(BOLD, &pct(offer.share_b))
        )),
        None => out.push_str("Offer  A: —   B: —\n"),
    }

    if !view.history.is_empty() {
        let mut columns = vec![Column::right("Round")];
        if with_proposer {
            columns.push(Column::left("Proposer"));
        }
        columns.push(Column::right("Offer A"));
        columns.push(Column::right("Offer B"));
        columns.push(Column::left("Decision"));
        if with_proposer {
            columns.push(Column::right("Counter A"));
        }
        columns.push(Column::left("Time"));
        out.push('\n');
        out.push_str(&render_table(&columns, &transcript_rows(&view.history, with_proposer)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bargain_core::{NegotiationSession, SessionConfig};

    #[test]
    fn strips_ansi() {
        let colored = format!("{GREEN}hello{RESET}");
        assert_eq!(strip_ansi(&colored), "hello");
    }

    #[test]
    fn renders_table() {
        let cols = vec![Column::left("Decision"), Column::right("Round")];
        let rows = vec![
            vec!["reject".to_string(), "1".to_string()],
            vec!["accept".to_string(), "2".to_string()],
        ];
        let table = strip_ansi(&render_table(&cols, &rows));
        assert!(table.contains("reject"));
        assert!(table.contains("--------"));
    }

    #[test]
    fn pct_formats_one_decimal() {
        assert_eq!(pct(0.3), "30.0%");
        assert_eq!(pct(0.12345), "12.3%");
    }

    #[test]
    fn board_shows_round_and_transcript() {
        let mut s = NegotiationSession::with_seed(SessionConfig::alternating(), 12);
        s.start().unwrap();
        s.counter(0.4).unwrap();
        let board = strip_ansi(&render_view(&s.view(), true));
        assert!(board.contains("Round: 2 / 5"));
        assert!(board.contains("Proposer: B"));
        assert!(board.contains("Counter A"));
        assert!(board.contains("0.400"));
        assert!(board.contains("Status: In progress"));
    }

    #[test]
    fn finished_board_has_no_offer() {
        let mut s = NegotiationSession::with_seed(SessionConfig::fixed_skew().with_max_rounds(0), 1);
        s.start().unwrap();
        let board = strip_ansi(&render_view(&s.view(), false));
        assert!(board.contains("A: —"));
        assert!(board.contains("Rejected"));
    }
}
