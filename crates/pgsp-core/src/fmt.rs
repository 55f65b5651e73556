//! Shared text formatting helpers.
//!
//! Pure string builders used by progress records and the renderer:
//! ASCII tables for the wide form, `label | value` listings for the compact
//! form, and elapsed-time formatting for finished operations.

use std::fmt;
use std::time::Duration;

/// A single decoded column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl FieldValue {
    fn is_numeric(&self) -> bool {
        matches!(self, FieldValue::Int(_))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(&normalize_for_display(s)),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        FieldValue::Text(v.clone())
    }
}

/// Named column of a progress record.
pub type Field = (&'static str, FieldValue);

// ---------------------------------------------------------------------------
// Wide form
// ---------------------------------------------------------------------------

/// Renders a single-row ASCII table.
///
/// Headers are upper-cased with `_` replaced by spaces and centered; numeric
/// cells are right-aligned, text cells left-aligned.
///
/// ```text
/// +-----+---------+
/// | PID | DATNAME |
/// +-----+---------+
/// |  42 | app     |
/// +-----+---------+
/// ```
pub fn render_table(fields: &[Field]) -> String {
    if fields.is_empty() {
        return String::new();
    }

    let headers: Vec<String> = fields
        .iter()
        .map(|(name, _)| name.replace('_', " ").to_uppercase())
        .collect();
    let cells: Vec<String> = fields.iter().map(|(_, v)| v.to_string()).collect();
    let widths: Vec<usize> = headers
        .iter()
        .zip(&cells)
        .map(|(h, c)| text_width(h).max(text_width(c)))
        .collect();

    let border = {
        let mut s = String::from("+");
        for w in &widths {
            s.push_str(&"-".repeat(w + 2));
            s.push('+');
        }
        s.push('\n');
        s
    };

    let mut out = String::new();
    out.push_str(&border);

    out.push('|');
    for (h, w) in headers.iter().zip(&widths) {
        out.push(' ');
        out.push_str(&pad_center(h, *w));
        out.push_str(" |");
    }
    out.push('\n');
    out.push_str(&border);

    out.push('|');
    for (((_, value), cell), w) in fields.iter().zip(&cells).zip(&widths) {
        out.push(' ');
        if value.is_numeric() {
            out.push_str(&pad_left(cell, *w));
        } else {
            out.push_str(&pad_right(cell, *w));
        }
        out.push_str(" |");
    }
    out.push('\n');
    out.push_str(&border);

    out
}

/// Renders fields as one or two stacked tables, split before column `split`.
pub fn render_split_table(fields: &[Field], split: Option<usize>) -> String {
    match split {
        Some(at) if at > 0 && at < fields.len() => {
            let mut out = render_table(&fields[..at]);
            out.push_str(&render_table(&fields[at..]));
            out
        }
        _ => render_table(fields),
    }
}

// ---------------------------------------------------------------------------
// Compact form
// ---------------------------------------------------------------------------

/// Renders fields vertically, one ` label | value` line per field.
///
/// Labels are padded to the longest label so the bars line up.
pub fn render_vertical(fields: &[Field]) -> String {
    let label_width = fields
        .iter()
        .map(|(name, _)| text_width(name))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (name, value) in fields {
        out.push(' ');
        out.push_str(&pad_right(name, label_width));
        out.push_str(" | ");
        out.push_str(&value.to_string());
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Durations
// ---------------------------------------------------------------------------

/// Formats an elapsed duration truncated to whole seconds.
///
/// `"0s"`, `"45s"`, `"3m5s"`, `"1h2m3s"`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{}h{}m{}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Normalize text for single-line display with space collapsing.
/// Replaces newlines and tabs with spaces, drops carriage returns.
pub fn normalize_for_display(s: &str) -> String {
    let s = s.replace('\n', " ").replace('\r', "").replace('\t', " ");
    let mut result = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch == ' ' {
            if !prev_space {
                result.push(ch);
            }
            prev_space = true;
        } else {
            result.push(ch);
            prev_space = false;
        }
    }
    result
}

fn text_width(s: &str) -> usize {
    s.chars().count()
}

fn pad_right(s: &str, width: usize) -> String {
    let gap = width.saturating_sub(text_width(s));
    format!("{}{}", s, " ".repeat(gap))
}

fn pad_left(s: &str, width: usize) -> String {
    let gap = width.saturating_sub(text_width(s));
    format!("{}{}", " ".repeat(gap), s)
}

fn pad_center(s: &str, width: usize) -> String {
    let gap = width.saturating_sub(text_width(s));
    let left = gap / 2;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(gap - left))
}
