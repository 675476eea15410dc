use triage_core::{AgentPhase, Block, Inline, RenderedDocument, SessionPhase, SessionViewModel};

use super::history::AnalysisHistory;

pub fn print_status(view: &SessionViewModel) {
    for line in status_lines(view) {
        println!("{line}");
    }
    println!();
}

/// One line per worker plus a session header, ready for a dumb terminal.
pub fn status_lines(view: &SessionViewModel) -> Vec<String> {
    let phase_label = match view.phase {
        SessionPhase::Idle => "Idle",
        SessionPhase::Submitting => "Uploading",
        SessionPhase::Polling => "Analyzing",
        SessionPhase::Completed => "Completed",
        SessionPhase::Failed => "Failed",
    };
    let mut lines = Vec::with_capacity(view.agents.len() + 2);
    match &view.file_name {
        Some(name) => lines.push(format!("Session: {phase_label} | File: {name}")),
        None => lines.push(format!("Session: {phase_label}")),
    }
    for row in &view.agents {
        let phase = match row.phase {
            AgentPhase::Waiting => "waiting",
            AgentPhase::Processing => "processing",
            AgentPhase::Completed => "completed",
        };
        lines.push(format!(
            "  {:<16} {:>3}%  {}",
            row.display_name, row.percent, phase
        ));
    }
    if let Some(error) = &view.error {
        lines.push(format!("  Error: {error}"));
    }
    lines
}

pub fn print_final_reports(view: &SessionViewModel) {
    for row in &view.agents {
        if let Some(report) = &row.report {
            println!("===== {} =====", row.display_name);
            println!("{}", document_text(report));
        }
    }
}

pub fn print_history(history: &AnalysisHistory) {
    if history.is_empty() {
        return;
    }
    println!("History ({} of last {}):", history.len(), super::history::HISTORY_LIMIT);
    for (index, entry) in history.entries().enumerate() {
        println!(
            "  {}. {} ({}) - {}",
            index + 1,
            entry.display_name,
            entry.file_type,
            entry.date
        );
    }
}

/// Flatten a rendered document for terminal output: underlined headings,
/// dashed list items, blank lines between blocks.
pub fn document_text(doc: &RenderedDocument) -> String {
    let mut out = String::new();
    for block in &doc.blocks {
        match block {
            Block::Heading { text, .. } => {
                out.push_str(text);
                out.push('\n');
                out.push_str(&"-".repeat(text.chars().count().max(1)));
                out.push_str("\n\n");
            }
            Block::Paragraph(spans) => {
                push_spans(&mut out, spans);
                out.push_str("\n\n");
            }
            Block::List(items) => {
                for item in items {
                    out.push_str("  - ");
                    push_spans(&mut out, item);
                    out.push('\n');
                }
                out.push('\n');
            }
        }
    }
    out.trim_end().to_string()
}

fn push_spans(out: &mut String, spans: &[Inline]) {
    for span in spans {
        match span {
            Inline::Plain(text) | Inline::Bold(text) => out.push_str(text),
            Inline::LineBreak => out.push('\n'),
        }
    }
}
