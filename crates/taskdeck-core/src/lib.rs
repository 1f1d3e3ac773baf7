pub mod cli;
pub mod config;
pub mod create;
pub mod date_range;
pub mod filter;
pub mod query;
pub mod render;
pub mod select;
pub mod selection;
pub mod selectors;
pub mod sort;
pub mod store;
pub mod validation;

use std::ffi::OsString;
use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use taskdeck_shared::Task;
use tracing::{
  debug,
  info,
  warn
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting taskdeck"
  );

  let cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  let mut store =
    store::TaskStore::from_config(&cfg);
  cli.dispatch_into(&mut store);

  let tasks = load_tasks(&cli.tasks)
    .with_context(|| {
      format!(
        "failed to load tasks from {}",
        cli.tasks.display()
      )
    })?;

  let now = Utc::now();
  let args =
    selectors::find_many_args_at(
      &store, now
    );
  debug!(?args, "derived query parameters");

  let live =
    query::LiveQuery::new(tasks, args);
  let renderer = render::Renderer::new(
    !cli.no_color,
    *store.timezone()
  );

  if cli.json {
    renderer.print_json(
      live.args(),
      live.results()
    )?;
  } else {
    renderer.print_task_table(
      live.results(),
      &selectors::selected_tasks(&store),
      now
    )?;
  }

  info!(
    shown = live.results().len(),
    "done"
  );
  Ok(())
}

/// Reads a JSON array of task records. Records without a title are
/// skipped.
pub fn load_tasks(
  path: &Path
) -> anyhow::Result<Vec<Task>> {
  let text = fs::read_to_string(path)
    .with_context(|| {
      format!(
        "failed to read {}",
        path.display()
      )
    })?;
  parse_tasks(&text)
}

pub fn parse_tasks(
  text: &str
) -> anyhow::Result<Vec<Task>> {
  let records: Vec<Task> =
    serde_json::from_str(text)
      .context("invalid task records")?;
  let total = records.len();

  let tasks: Vec<Task> = records
    .into_iter()
    .filter(|task| {
      let keep =
        !task.title.trim().is_empty();
      if !keep {
        warn!(
          id = %task.id,
          "skipping task record with empty title"
        );
      }
      keep
    })
    .collect();

  debug!(
    count = tasks.len(),
    skipped = total - tasks.len(),
    "loaded tasks"
  );
  Ok(tasks)
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  const RECORDS: &str = r#"[
    {"id": "a", "title": "Ship release", "status": "to_do", "priority": "p1",
     "created_at": "2026-02-16T05:00:00Z", "updated_at": "2026-02-16T05:00:00Z"},
    {"id": "b", "title": "   ", "status": "completed", "priority": "p2",
     "created_at": "2026-02-16T05:00:00Z", "updated_at": "2026-02-16T05:00:00Z"},
    {"id": "c", "title": "", "status": "in_progress", "priority": "p0",
     "created_at": "2026-02-16T05:00:00Z", "updated_at": "2026-02-16T05:00:00Z"}
  ]"#;

  #[test]
  fn blank_titles_are_skipped() {
    let tasks = parse_tasks(RECORDS)
      .expect("valid records");
    let ids: Vec<&str> = tasks
      .iter()
      .map(|t| t.id.as_str())
      .collect();
    assert_eq!(ids, ["a"]);
    assert_eq!(tasks[0].due_date, None);
  }

  #[test]
  fn load_tasks_reads_a_file() {
    let mut file =
      tempfile::NamedTempFile::new()
        .expect("temp file");
    write!(file, "{RECORDS}")
      .expect("write records");

    let tasks = load_tasks(file.path())
      .expect("load tasks");
    assert_eq!(tasks.len(), 1);

    assert!(parse_tasks("{}").is_err());
  }
}
