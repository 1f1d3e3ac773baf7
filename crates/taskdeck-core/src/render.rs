use std::io::{self, IsTerminal, Write};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use taskdeck_shared::{FindManyArgs, Task};
use unicode_width::UnicodeWidthStr;

use crate::date_range::format_date_time;
use crate::selection::Selection;

const OVERDUE: &str = "31";
const SELECTED: &str = "1";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    timezone: Tz,
}

#[derive(Serialize)]
struct QueryReport<'a> {
    args: &'a FindManyArgs,
    tasks: &'a [Task],
}

/// A table cell whose display width is measured before any colour is
/// applied, so padding never has to look past escape codes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Cell {
    text: String,
    width: usize,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        let width = UnicodeWidthStr::width(text.as_str());
        Self { text, width }
    }
}

impl Renderer {
    /// Colour is only emitted when asked for and stdout is a terminal.
    pub fn new(color: bool, timezone: Tz) -> Self {
        Self {
            color: color && io::stdout().is_terminal(),
            timezone,
        }
    }

    #[tracing::instrument(skip(self, tasks, selected, now))]
    pub fn print_task_table(
        &self,
        tasks: &[Task],
        selected: &Selection,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        let rows = self.task_rows(tasks, selected, now);
        write_table(out, &headers(), &rows)
    }

    pub fn print_json(&self, args: &FindManyArgs, tasks: &[Task]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, &QueryReport { args, tasks })?;
        writeln!(out)?;
        Ok(())
    }

    fn task_rows(&self, tasks: &[Task], selected: &Selection, now: DateTime<Utc>) -> Vec<Vec<Cell>> {
        tasks
            .iter()
            .map(|task| {
                let is_selected = selected.contains(&task.id);
                let mark = Cell::plain(if is_selected { "*" } else { "" });
                let mark = self.paint_if(is_selected, mark, SELECTED);

                let due = task
                    .due_date
                    .map(|due| format_date_time(due, &self.timezone))
                    .unwrap_or_default();

                vec![
                    mark,
                    Cell::plain(short_id(&task.id)),
                    Cell::plain(task.priority.as_str()),
                    Cell::plain(task.status.as_str()),
                    Cell::plain(task.title.as_str()),
                    self.paint_if(task.is_overdue(now), Cell::plain(due), OVERDUE),
                ]
            })
            .collect()
    }

    fn paint_if(&self, when: bool, cell: Cell, code: &str) -> Cell {
        if !self.color || !when || cell.text.is_empty() {
            return cell;
        }
        Cell {
            text: format!("\x1b[{code}m{}\x1b[0m", cell.text),
            width: cell.width,
        }
    }
}

fn headers() -> Vec<Cell> {
    ["", "ID", "Pri", "Status", "Title", "Due"]
        .into_iter()
        .map(Cell::plain)
        .collect()
}

fn short_id(id: &str) -> &str {
    id.char_indices()
        .nth(8)
        .map(|(idx, _)| &id[..idx])
        .unwrap_or(id)
}

fn write_table<W: Write>(mut writer: W, headers: &[Cell], rows: &[Vec<Cell>]) -> anyhow::Result<()> {
    let widths: Vec<usize> = (0..headers.len())
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .chain(std::iter::once(&headers[col]))
                .map(|cell| cell.width)
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule: Vec<Cell> = widths
        .iter()
        .map(|&width| Cell {
            text: "-".repeat(width),
            width,
        })
        .collect();

    for line in std::iter::once(headers)
        .chain(std::iter::once(rule.as_slice()))
        .chain(rows.iter().map(Vec::as_slice))
    {
        for (cell, width) in line.iter().zip(&widths) {
            let padding = width.saturating_sub(cell.width);
            write!(writer, "{}{} ", cell.text, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use taskdeck_shared::{TaskPriority, TaskStatus};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 16, 5, 0, 0)
            .single()
            .expect("valid now")
    }

    fn sample() -> Task {
        Task {
            id: "0c9f3d52-1111-4222-8333-944455556666".to_string(),
            title: "Überprüfen".to_string(),
            description: None,
            status: TaskStatus::ToDo,
            priority: TaskPriority::P0,
            due_date: Some(now() - chrono::Duration::hours(2)),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn colored() -> Renderer {
        Renderer {
            color: true,
            timezone: chrono_tz::UTC,
        }
    }

    #[test]
    fn rows_mark_selection_and_overdue() {
        let rows = colored().task_rows(
            &[sample()],
            &Selection::keys(["0c9f3d52-1111-4222-8333-944455556666"]),
            now(),
        );
        let row = &rows[0];
        assert_eq!(row[0].text, "\x1b[1m*\x1b[0m");
        assert_eq!(row[0].width, 1);
        assert_eq!(row[1].text, "0c9f3d52");
        assert_eq!(row[2].text, "p0");
        assert!(row[5].text.starts_with("\x1b[31m"));
        assert_eq!(row[5].width, "16/02/26, 03:00".len());
    }

    #[test]
    fn padding_ignores_escape_codes() {
        let rows = colored().task_rows(&[sample()], &Selection::default(), now());

        let mut buf = Vec::new();
        write_table(&mut buf, &headers(), &rows).expect("write table");
        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], " -------- --- ------ ---------- --------------- ");
        assert!(lines[2].ends_with("\x1b[31m16/02/26, 03:00\x1b[0m "));
        assert!(lines[2].contains("Überprüfen "));
    }

    #[test]
    fn no_color_leaves_text_plain() {
        let renderer = Renderer {
            color: false,
            timezone: chrono_tz::UTC,
        };
        let rows = renderer.task_rows(&[sample()], &Selection::All, now());
        assert_eq!(rows[0][0], Cell::plain("*"));
        assert_eq!(rows[0][5], Cell::plain("16/02/26, 03:00"));
    }
}
