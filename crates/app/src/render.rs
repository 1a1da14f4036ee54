use std::fmt::Write as _;

use serde_json::Value;
use tutor_core::model::{ChatMessage, ChatRole, ResultRow};
use tutor_core::{LessonCatalog, LessonSnapshot, ProgressState, Resolution, SubmissionState};

const PROGRESS_BAR_WIDTH: usize = 20;

pub fn lesson(snapshot: &LessonSnapshot) -> String {
    let lesson = &snapshot.lesson;
    let mut out = String::new();
    let done = if snapshot.is_completed { " [done]" } else { "" };
    let _ = writeln!(
        out,
        "\n== Lesson {}/{} ({}) {}{} ==",
        snapshot.index + 1,
        snapshot.total,
        lesson.difficulty().label(),
        lesson.title(),
        done
    );
    if !lesson.description().is_empty() {
        let _ = writeln!(out, "{}", lesson.description());
    }
    let _ = writeln!(out, "\nTask: {}", lesson.task());
    if !lesson.schema().is_empty() {
        let _ = writeln!(out, "Schema: {}", lesson.schema());
    }
    let _ = writeln!(out, "Progress: {}", progress_bar(snapshot.completion_ratio));
    let _ = writeln!(out, "Draft: {}", snapshot.draft);
    out
}

pub fn submission(state: &SubmissionState) -> String {
    match state {
        SubmissionState::Idle => "No attempt yet.\n".to_string(),
        SubmissionState::Pending { query } => format!("Evaluating `{query}`...\n"),
        SubmissionState::Resolved(resolution) => resolved(resolution),
    }
}

fn resolved(resolution: &Resolution) -> String {
    let mut out = String::new();
    let verdict = if resolution.is_correct { "Correct" } else { "Not quite" };
    let _ = writeln!(out, "\n{verdict}: {}", resolution.feedback);
    if let Some(message) = &resolution.error_message {
        let _ = writeln!(out, "! {message}");
    }
    if !resolution.rows.is_empty() {
        out.push_str(&table(&resolution.columns, &resolution.rows));
    }
    out
}

/// Render rows as a fixed-width text table. Missing cells print as blanks.
pub fn table(columns: &[String], rows: &[ResultRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(column).map(cell).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, columns, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &cells {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, values: &[String], widths: &[usize]) {
    let line: Vec<String> = values
        .iter()
        .zip(widths)
        .map(|(value, width)| format!("{value:<width$}"))
        .collect();
    let _ = writeln!(out, "| {} |", line.join(" | "));
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "NULL".to_string(),
        other => other.to_string(),
    }
}

pub fn catalog(catalog: &LessonCatalog, progress: &ProgressState) -> String {
    let mut out = String::new();
    for (difficulty, lessons) in catalog.by_difficulty() {
        let _ = writeln!(out, "\n{}", difficulty.label());
        for lesson in lessons {
            let index = catalog.index_of(lesson.id()).unwrap_or_default();
            let marker = if index == progress.current_index {
                '>'
            } else if progress.is_completed(lesson.id()) {
                '*'
            } else {
                ' '
            };
            let _ = writeln!(
                out,
                "{marker} {:>2}. [{}] {}",
                index + 1,
                lesson.id(),
                lesson.title()
            );
        }
    }
    let _ = writeln!(out, "\nProgress: {}", progress_bar(progress.completion_ratio()));
    out
}

pub fn chat_message(message: &ChatMessage) -> String {
    let speaker = match message.role() {
        ChatRole::User => "you",
        ChatRole::Assistant => "tutor",
    };
    format!("[{}] {speaker}: {}\n", message.sent_at().format("%H:%M"), message.text())
}

pub fn transcript(messages: &[ChatMessage]) -> String {
    if messages.is_empty() {
        return "No messages yet. Ask with `:ask <question>`.\n".to_string();
    }
    messages.iter().map(chat_message).collect()
}

fn progress_bar(ratio: f64) -> String {
    let ratio = ratio.clamp(0.0, 1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = (ratio * PROGRESS_BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:.0}%",
        "#".repeat(filled),
        ".".repeat(PROGRESS_BAR_WIDTH - filled),
        ratio * 100.0
    )
}

pub const HELP: &str = "\
Type a SQL query and press enter to submit it.

  :next, :prev        move between lessons
  :goto <n|id>        jump to lesson number n or lesson id
  :reset              clear the attempt and reseed the draft
  :show               show the lesson and the last result
  :draft              show the current draft
  :lessons            list lessons by difficulty
  :ask <question>     ask the tutor
  :chat               show the tutor conversation
  :help               show this help
  :quit               leave
";
