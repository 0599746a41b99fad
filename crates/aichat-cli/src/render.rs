//! Terminal rendering of transcript messages.

use aichat_core::message::{Classification, Message, Sender, classify};
use colored::Colorize;

pub fn print_message(message: &Message) {
    let (header, body) = layout(message);
    match message.sender {
        Sender::User => {
            println!("{}", header.green().bold());
            for line in body {
                println!("{}", line.green());
            }
        }
        Sender::Assistant => {
            println!("{}", header.bright_magenta().bold());
            for line in body {
                println!("{}", line.bright_blue());
            }
        }
    }
    println!();
}

pub fn print_transcript(messages: &[Message]) {
    if messages.is_empty() {
        println!("{}", "(no messages)".bright_black());
        return;
    }
    for message in messages {
        print_message(message);
    }
}

/// Header line plus body lines, uncolored. Assistant text is normalized and,
/// when it carries a table, its pipe rows are column-aligned.
pub fn layout(message: &Message) -> (String, Vec<String>) {
    let label = match message.sender {
        Sender::User => "You",
        Sender::Assistant => "Assistant",
    };
    let header = format!("[{} {}]", label, message.created_at.format("%Y-%m-%d %H:%M"));

    let body = match message.sender {
        Sender::User => message.content.lines().map(str::to_string).collect(),
        Sender::Assistant => assistant_lines(&classify(&message.content)),
    };
    (header, body)
}

fn assistant_lines(classification: &Classification) -> Vec<String> {
    let lines: Vec<&str> = classification.text.lines().collect();
    if !classification.has_table {
        return lines.into_iter().map(str::to_string).collect();
    }

    let mut out = Vec::with_capacity(lines.len());
    let mut block: Vec<&str> = Vec::new();
    for line in lines {
        if line.contains('|') {
            block.push(line);
            continue;
        }
        out.extend(align_table(&block));
        block.clear();
        out.push(line.to_string());
    }
    out.extend(align_table(&block));
    out
}

fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}

fn is_rule(cell: &str) -> bool {
    !cell.is_empty() && cell.chars().all(|c| c == '-' || c == ':')
}

/// Pads every cell of a block of pipe rows to its column width.
fn align_table(rows: &[&str]) -> Vec<String> {
    if rows.is_empty() {
        return Vec::new();
    }

    let table: Vec<Vec<String>> = rows.iter().map(|row| split_cells(row)).collect();
    let columns = table.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in &table {
        for (i, cell) in row.iter().enumerate() {
            if !is_rule(cell) {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    table
        .iter()
        .map(|row| {
            let rule_row = row.iter().all(|cell| is_rule(cell));
            let cells: Vec<String> = (0..columns)
                .map(|i| {
                    let width = widths[i].max(3);
                    if rule_row {
                        "-".repeat(width)
                    } else {
                        let cell = row.get(i).map(String::as_str).unwrap_or("");
                        format!("{:<width$}", cell, width = width)
                    }
                })
                .collect();
            format!("| {} |", cells.join(" | "))
        })
        .collect()
}
