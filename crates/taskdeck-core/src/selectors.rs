//! Read-only views over [`TaskStore`]. Query parameters are always
//! computed here from the slices, never cached in them.

use chrono::{
  DateTime,
  Utc
};
use taskdeck_shared::{
  FindManyArgs,
  OrderByClause,
  TaskPriority,
  TaskStatus,
  WhereClause
};

use crate::date_range::PreselectedRange;
use crate::selection::Selection;
use crate::sort::SortDescriptor;
use crate::store::TaskStore;

pub fn are_tasks_filtered(
  store: &TaskStore
) -> bool {
  store.filter().is_any_filter_active()
}

pub fn status_filters(
  store: &TaskStore
) -> Vec<TaskStatus> {
  store
    .filter()
    .statuses()
    .iter()
    .copied()
    .collect()
}

pub fn due_date_filter(
  store: &TaskStore
) -> Option<PreselectedRange> {
  store.filter().due_date()
}

pub fn where_clause_at(
  store: &TaskStore,
  now: DateTime<Utc>
) -> WhereClause {
  store
    .filter()
    .where_clause_at(now, store.timezone())
}

pub fn where_clause(
  store: &TaskStore
) -> WhereClause {
  where_clause_at(store, Utc::now())
}

pub fn order_by_clause(
  store: &TaskStore
) -> OrderByClause {
  store.sort().order_by_clause()
}

pub fn sort_descriptor(
  store: &TaskStore
) -> Option<SortDescriptor> {
  store.sort().descriptor()
}

/// Everything the live query needs, resolved against `now`.
pub fn find_many_args_at(
  store: &TaskStore,
  now: DateTime<Utc>
) -> FindManyArgs {
  FindManyArgs {
    where_clause: where_clause_at(
      store, now
    ),
    order_by:     order_by_clause(store)
  }
}

pub fn find_many_args(
  store: &TaskStore
) -> FindManyArgs {
  find_many_args_at(store, Utc::now())
}

pub fn selected_tasks(
  store: &TaskStore
) -> Selection {
  store.selection().as_widget()
}

pub fn default_priority(
  store: &TaskStore
) -> TaskPriority {
  store.create().default_priority()
}

pub fn default_status(
  store: &TaskStore
) -> TaskStatus {
  store.create().default_status()
}

pub fn is_create_dialog_open(
  store: &TaskStore
) -> bool {
  store.create().is_dialog_open()
}
