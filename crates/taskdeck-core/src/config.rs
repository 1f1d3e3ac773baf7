use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use chrono_tz::Tz;
use serde::Deserialize;
use taskdeck_shared::{
  OrderByClause,
  QueryDirection,
  TaskField,
  TaskPriority,
  TaskStatus
};
use tracing::{
  debug,
  error,
  info,
  warn
};

pub const CONFIG_ENV_VAR: &str =
  "TASKDECK_CONFIG";
const LOCAL_CONFIG_FILE: &str =
  "taskdeck.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
  timezone: Option<String>,
  defaults: RawDefaults,
  sort:     Option<RawSort>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawDefaults {
  priority:       Option<TaskPriority>,
  status:         Option<TaskStatus>,
  create_another: Option<bool>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSort {
  column:    TaskField,
  direction: QueryDirection
}

/// Initial session values. Nothing here is written back; the store
/// only reads it once at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
  default_priority: TaskPriority,
  default_status:   TaskStatus,
  create_another:   bool,
  timezone:         Tz,
  fallback_order:   OrderByClause,
  pub loaded_file:  Option<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      default_priority: TaskPriority::P1,
      default_status:   TaskStatus::ToDo,
      create_another:   false,
      timezone:         chrono_tz::UTC,
      fallback_order:   OrderByClause::default(),
      loaded_file:      None
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let Some(path) =
      resolve_config_path(config_override)?
    else {
      warn!(
        "no taskdeck config found; \
         using defaults"
      );
      return Ok(Self::default());
    };

    info!(config = %path.display(), "loading config");
    Self::load_file(&path)
  }

  pub fn load_file(
    path: &Path
  ) -> anyhow::Result<Self> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    let mut cfg = Self::parse(&text)
      .with_context(|| {
        format!(
          "invalid config {}",
          path.display()
        )
      })?;
    cfg.loaded_file = Some(path);
    Ok(cfg)
  }

  pub fn parse(
    text: &str
  ) -> anyhow::Result<Self> {
    let raw: RawConfig =
      toml::from_str(text)?;
    let base = Self::default();

    let timezone = raw
      .timezone
      .as_deref()
      .map(parse_timezone)
      .unwrap_or(base.timezone);

    let fallback_order = raw
      .sort
      .map(|sort| {
        OrderByClause::new(
          sort.column,
          sort.direction
        )
      })
      .unwrap_or(base.fallback_order);

    let cfg = Self {
      default_priority: raw
        .defaults
        .priority
        .unwrap_or(base.default_priority),
      default_status: raw
        .defaults
        .status
        .unwrap_or(base.default_status),
      create_another: raw
        .defaults
        .create_another
        .unwrap_or(base.create_another),
      timezone,
      fallback_order,
      loaded_file: None
    };
    debug!(?cfg, "parsed config");
    Ok(cfg)
  }

  pub fn default_priority(
    &self
  ) -> TaskPriority {
    self.default_priority
  }

  pub fn default_status(
    &self
  ) -> TaskStatus {
    self.default_status
  }

  pub fn create_another(&self) -> bool {
    self.create_another
  }

  pub fn timezone(&self) -> Tz {
    self.timezone
  }

  pub fn fallback_order(
    &self
  ) -> OrderByClause {
    self.fallback_order
  }
}

fn parse_timezone(raw: &str) -> Tz {
  let trimmed = raw.trim();
  match trimmed.parse::<Tz>() {
    | Ok(tz) => tz,
    | Err(err) => {
      error!(
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id; using UTC"
      );
      chrono_tz::UTC
    }
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_config_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return Err(anyhow!(
        "{CONFIG_ENV_VAR} is set but \
         empty"
      ));
    }
    return Ok(Some(PathBuf::from(
      trimmed
    )));
  }

  let local = std::env::current_dir()
    .context(
      "cannot determine current \
       directory"
    )?
    .join(LOCAL_CONFIG_FILE);
  if local.exists() {
    return Ok(Some(local));
  }

  if let Some(dir) = dirs::config_dir() {
    let candidate = dir
      .join("taskdeck")
      .join("config.toml");
    if candidate.exists() {
      return Ok(Some(candidate));
    }
  }

  Ok(None)
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}
