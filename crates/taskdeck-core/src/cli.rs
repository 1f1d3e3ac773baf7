use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::selection::SerializableSelection;
use crate::sort::SortDirection;
use crate::store::{TaskAction, TaskStore};
use crate::validation;

/// `COLUMN[:DIRECTION]`, direction defaulting to ascending. The column
/// stays a raw string: it is validated by the store like any widget id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl std::str::FromStr for SortSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, direction) = match s.split_once(':') {
            Some((column, raw)) => {
                let direction = SortDirection::from_key(raw.trim())
                    .ok_or_else(|| anyhow!("unknown sort direction: {raw}"))?;
                (column, direction)
            }
            None => (s, SortDirection::Ascending),
        };
        Ok(Self {
            column: column.trim().to_string(),
            direction,
        })
    }
}

fn parse_selection(s: &str) -> anyhow::Result<SerializableSelection> {
    let trimmed = s.trim();
    if trimmed == "all" {
        return Ok(SerializableSelection::All);
    }
    Ok(SerializableSelection::Ids(
        trimmed
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect(),
    ))
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskdeck",
    version,
    about = "Filter, sort and select tasks the way the task table does",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// JSON array of task records.
    #[arg(long = "tasks")]
    pub tasks: PathBuf,

    /// Toggles a status filter; repeating a status toggles it back off.
    #[arg(long = "status", action = ArgAction::Append)]
    pub statuses: Vec<String>,

    #[arg(long = "due")]
    pub due: Option<String>,

    #[arg(
        long = "sort",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<SortSpec>())
    )]
    pub sort: Option<SortSpec>,

    /// `all` or a comma-separated list of task ids.
    #[arg(
        long = "select",
        value_parser = clap::builder::ValueParser::new(parse_selection)
    )]
    pub select: Option<SerializableSelection>,

    #[arg(long = "json")]
    pub json: bool,

    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl GlobalCli {
    /// Translates the flags into store intents, in the order a user
    /// would click them. Unknown keys are dropped like widget input.
    #[tracing::instrument(skip_all)]
    pub fn dispatch_into(&self, store: &mut TaskStore) {
        for raw in &self.statuses {
            match validation::parse_status_key(raw) {
                Some(status) => store.dispatch(TaskAction::StatusFilterToggled(status)),
                None => warn!(status = %raw, "ignoring unknown status filter"),
            }
        }

        if let Some(raw) = &self.due {
            match validation::parse_range_key(raw) {
                Some(range) => store.dispatch(TaskAction::DueDateFilterApplied(range)),
                None => warn!(due = %raw, "ignoring unknown due date range"),
            }
        }

        if let Some(spec) = &self.sort {
            let accepted = store.sort_by_key(&spec.column, spec.direction);
            if !accepted {
                warn!(column = %spec.column, "ignoring unsortable column");
            }
        }

        if let Some(selection) = &self.select {
            store.dispatch(TaskAction::SelectionUpdated(selection.clone()));
        }
    }
}

/// Level used when `RUST_LOG` is unset. Any `-q` wins over `-v`.
fn default_log_level(verbose: u8, quiet: u8) -> &'static str {
    match (quiet, verbose) {
        (0, 0) => "warn",
        (0, 1) => "info",
        (0, 2) => "debug",
        (0, _) => "trace",
        (1, _) => "warn",
        _ => "error",
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let level = default_log_level(verbose, quiet);
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|e| anyhow!("invalid log level {level}: {e}"))?,
    };

    let stderr_is_tty = std::io::stderr().is_terminal();
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_ansi(stderr_is_tty)
        .try_init()
    {
        debug!(error = %err, "tracing already initialised");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use taskdeck_shared::TaskStatus;

    use super::*;
    use crate::date_range::PreselectedRange;

    fn parse(args: &[&str]) -> GlobalCli {
        let mut full = vec!["taskdeck", "--tasks", "tasks.json"];
        full.extend_from_slice(args);
        GlobalCli::try_parse_from(full).expect("valid args")
    }

    #[test]
    fn quiet_overrides_verbose() {
        assert_eq!(default_log_level(0, 0), "warn");
        assert_eq!(default_log_level(2, 0), "debug");
        assert_eq!(default_log_level(5, 0), "trace");
        assert_eq!(default_log_level(3, 1), "warn");
        assert_eq!(default_log_level(0, 2), "error");
    }

    #[test]
    fn sort_spec_defaults_to_ascending() {
        let spec: SortSpec = "title".parse().expect("spec");
        assert_eq!(spec.direction, SortDirection::Ascending);

        let spec: SortSpec = "due_date:desc".parse().expect("spec");
        assert_eq!(spec.column, "due_date");
        assert_eq!(spec.direction, SortDirection::Descending);

        assert!("title:up".parse::<SortSpec>().is_err());
    }

    #[test]
    fn selection_flag_accepts_all_or_ids() {
        assert_eq!(
            parse_selection("all").expect("all"),
            SerializableSelection::All
        );
        assert_eq!(
            parse_selection("a, b,,c").expect("ids"),
            SerializableSelection::Ids(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn flags_dispatch_like_clicks() {
        let cli = parse(&[
            "--status",
            "to_do",
            "--status",
            "completed",
            "--status",
            "to_do",
            "--status",
            "bogus",
            "--due",
            "next_7_days",
            "--sort",
            "not_a_real_column:asc",
        ]);
        let mut store = TaskStore::new();
        cli.dispatch_into(&mut store);

        let statuses: Vec<_> = store.filter().statuses().iter().copied().collect();
        assert_eq!(statuses, vec![TaskStatus::Completed]);
        assert_eq!(
            store.filter().due_date(),
            Some(PreselectedRange::Next7Days)
        );
        assert_eq!(store.sort().descriptor(), None);
    }
}
