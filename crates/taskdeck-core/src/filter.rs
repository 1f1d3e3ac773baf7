use std::collections::BTreeSet;

use chrono::{
  DateTime,
  Utc
};
use chrono_tz::Tz;
use taskdeck_shared::{
  InClause,
  TaskStatus,
  WhereClause
};
use tracing::debug;

use crate::date_range::{
  DateTimeRange,
  PreselectedRange
};

/// Active status and due-date filters. The `where` clause is always
/// derived from this, never stored next to it.
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct FilterState {
  status:   BTreeSet<TaskStatus>,
  due_date: Option<PreselectedRange>
}

impl FilterState {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds `status` if absent, removes it if present.
  pub fn toggle_status(
    &mut self,
    status: TaskStatus
  ) {
    if self.status.remove(&status) {
      debug!(%status, "status filter removed");
    } else {
      self.status.insert(status);
      debug!(%status, "status filter added");
    }
  }

  pub fn set_due_date_range(
    &mut self,
    range: PreselectedRange
  ) {
    debug!(%range, "due date filter set");
    self.due_date = Some(range);
  }

  pub fn clear_due_date_range(
    &mut self
  ) {
    self.due_date = None;
  }

  pub fn clear_status_filters(
    &mut self
  ) {
    self.status.clear();
  }

  pub fn clear_all(&mut self) {
    self.clear_status_filters();
    self.clear_due_date_range();
  }

  pub fn statuses(
    &self
  ) -> &BTreeSet<TaskStatus> {
    &self.status
  }

  pub fn due_date(
    &self
  ) -> Option<PreselectedRange> {
    self.due_date
  }

  pub fn is_any_filter_active(
    &self
  ) -> bool {
    !self.status.is_empty()
      || self.due_date.is_some()
  }

  /// Derives the predicate for the live query, resolving any relative
  /// due-date range against `now`.
  #[tracing::instrument(skip(self, now, tz))]
  pub fn where_clause_at(
    &self,
    now: DateTime<Utc>,
    tz: &Tz
  ) -> WhereClause {
    let status = if self.status.is_empty()
    {
      None
    } else {
      Some(InClause {
        values: self
          .status
          .iter()
          .copied()
          .collect()
      })
    };

    let due_date =
      self.due_date.map(|range| {
        DateTimeRange::resolve(
          range, now, tz
        )
        .to_clause()
      });

    WhereClause {
      id: None,
      status,
      due_date
    }
  }

  pub fn where_clause(
    &self,
    tz: &Tz
  ) -> WhereClause {
    self.where_clause_at(Utc::now(), tz)
  }
}
