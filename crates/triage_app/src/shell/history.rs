use std::collections::{BTreeMap, VecDeque};

use chrono::Local;
use triage_core::ArchiveEntry;

/// Only the most recent analyses are kept; the oldest fall off the end.
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub display_name: String,
    pub date: String,
    pub file_type: String,
    pub results: BTreeMap<String, String>,
}

/// In-memory, bounded, newest-first record of completed analyses.
#[derive(Debug, Default)]
pub struct AnalysisHistory {
    entries: VecDeque<HistoryEntry>,
}

impl AnalysisHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, archived: ArchiveEntry) -> &HistoryEntry {
        let entry = HistoryEntry {
            display_name: display_name_from_filename(&archived.file_name),
            date: Local::now().format("%d/%m/%Y").to_string(),
            file_type: file_type_label(&archived.file_name),
            results: archived.results,
        };
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_LIMIT);
        &self.entries[0]
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derive a patient-facing name from the uploaded filename. Tried in order:
/// `Medical Report - NAME - ...`, `report_NAME_...`, `NAME_medical...`, the
/// first of two whitespace-separated words, and finally the bare stem.
/// Underscores read as spaces in every case.
pub fn display_name_from_filename(filename: &str) -> String {
    if let Some(name) = between(filename, "Medical Report - ", " -") {
        return tidy(name);
    }
    if let Some(name) = between(filename, "report_", "_") {
        return tidy(name);
    }
    if let Some(idx) = filename.find("_medical") {
        if idx > 0 {
            return tidy(&filename[..idx]);
        }
    }
    if let Some(word) = first_of_word_pair(filename) {
        return tidy(word);
    }
    let stem = filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(filename);
    tidy(stem)
}

pub fn file_type_label(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_uppercase())
        .unwrap_or_else(|| filename.to_uppercase())
}

fn tidy(name: &str) -> String {
    name.replace('_', " ").trim().to_string()
}

/// Shortest non-empty slice of `text` strictly between `open` and `close`.
fn between<'a>(text: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = text.find(open)? + open.len();
    let len = text[start..].find(close)?;
    if len == 0 {
        return None;
    }
    Some(&text[start..start + len])
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// First word of the first `word whitespace word` pair, if any.
fn first_of_word_pair(text: &str) -> Option<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut i = 0;
    while i < chars.len() {
        if !is_word(chars[i].1) {
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && is_word(chars[i].1) {
            i += 1;
        }
        let word_end = i;
        let mut j = i;
        while j < chars.len() && chars[j].1.is_whitespace() {
            j += 1;
        }
        if j > word_end && j < chars.len() && is_word(chars[j].1) {
            let s = chars[start].0;
            let e = if word_end < chars.len() {
                chars[word_end].0
            } else {
                text.len()
            };
            return Some(&text[s..e]);
        }
    }
    None
}
