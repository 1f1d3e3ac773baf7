//! Checks for keys that arrive as plain strings from generic widgets
//! (table column ids, menu item ids). Each returns a typed value or
//! `None`; rejected keys are logged and go no further.

use taskdeck_shared::{
  SortColumn,
  TaskField,
  TaskPriority,
  TaskStatus
};
use tracing::debug;

use crate::date_range::PreselectedRange;

pub fn is_task_key(key: &str) -> bool {
  TaskField::from_key(key).is_some()
}

pub fn parse_sort_column(
  key: &str
) -> Option<SortColumn> {
  let column = SortColumn::from_key(key);
  if column.is_none() {
    debug!(key, "ignoring unsortable column");
  }
  column
}

pub fn parse_status_key(
  key: &str
) -> Option<TaskStatus> {
  let status = TaskStatus::from_key(key);
  if status.is_none() {
    debug!(key, "ignoring unknown status");
  }
  status
}

pub fn parse_priority_key(
  key: &str
) -> Option<TaskPriority> {
  let priority =
    TaskPriority::from_key(key);
  if priority.is_none() {
    debug!(
      key,
      "ignoring unknown priority"
    );
  }
  priority
}

pub fn parse_range_key(
  key: &str
) -> Option<PreselectedRange> {
  let range =
    PreselectedRange::from_key(key);
  if range.is_none() {
    debug!(
      key,
      "ignoring unknown date range"
    );
  }
  range
}
