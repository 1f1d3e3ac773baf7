//! In-memory evaluation of query parameters over task records.
//!
//! The sync client runs these parameters against its embedded database.
//! This module gives the same answers over a plain slice so the derived
//! parameters can be exercised without one: the CLI uses it, and so do
//! the integration tests.

use std::cmp::Ordering;

use taskdeck_shared::{
  DeleteManyArgs,
  FindManyArgs,
  OrderByClause,
  QueryDirection,
  Task,
  TaskField,
  WhereClause
};
use tracing::{
  debug,
  trace
};

/// Whether `task` satisfies every present clause. An empty clause
/// matches everything.
pub fn matches(
  clause: &WhereClause,
  task: &Task
) -> bool {
  if let Some(ids) = &clause.id
    && !ids.values.contains(&task.id)
  {
    return false;
  }

  if let Some(statuses) = &clause.status
    && !statuses.values.contains(&task.status)
  {
    return false;
  }

  if let Some(range) = &clause.due_date {
    let Some(due) = task.due_date else {
      return false;
    };
    if due < range.gte || due > range.lte {
      return false;
    }
  }

  true
}

/// Orders by the clause's field. Tasks without a due date sort last in
/// either direction; ties fall back to the id.
pub fn compare(
  order: &OrderByClause,
  a: &Task,
  b: &Task
) -> Ordering {
  let primary = match order.field {
    | TaskField::DueDate => {
      match (a.due_date, b.due_date) {
        | (Some(x), Some(y)) => {
          directed(order.direction, x.cmp(&y))
        }
        | (Some(_), None) => Ordering::Less,
        | (None, Some(_)) => {
          Ordering::Greater
        }
        | (None, None) => Ordering::Equal
      }
    }
    | field => directed(
      order.direction,
      compare_field(field, a, b)
    )
  };

  primary.then_with(|| a.id.cmp(&b.id))
}

fn directed(
  direction: QueryDirection,
  ord: Ordering
) -> Ordering {
  match direction {
    | QueryDirection::Asc => ord,
    | QueryDirection::Desc => ord.reverse()
  }
}

fn compare_field(
  field: TaskField,
  a: &Task,
  b: &Task
) -> Ordering {
  match field {
    | TaskField::Id => a.id.cmp(&b.id),
    | TaskField::Title => a
      .title
      .to_lowercase()
      .cmp(&b.title.to_lowercase()),
    | TaskField::Description => {
      a.description.cmp(&b.description)
    }
    | TaskField::Status => {
      a.status.cmp(&b.status)
    }
    | TaskField::Priority => {
      a.priority.cmp(&b.priority)
    }
    | TaskField::DueDate => {
      a.due_date.cmp(&b.due_date)
    }
    | TaskField::CreatedAt => {
      a.created_at.cmp(&b.created_at)
    }
    | TaskField::UpdatedAt => {
      a.updated_at.cmp(&b.updated_at)
    }
  }
}

#[tracing::instrument(skip(tasks, args), fields(total = tasks.len()))]
pub fn find_many(
  tasks: &[Task],
  args: &FindManyArgs
) -> Vec<Task> {
  let mut out: Vec<Task> = tasks
    .iter()
    .filter(|task| {
      matches(&args.where_clause, task)
    })
    .cloned()
    .collect();
  out.sort_by(|a, b| {
    compare(&args.order_by, a, b)
  });
  debug!(matched = out.len(), "query evaluated");
  out
}

/// A record set plus the parameters of one query over it. Results are
/// recomputed whenever either side changes; `revision` advances only
/// when the visible rows actually differ.
#[derive(Debug, Clone)]
pub struct LiveQuery {
  records:  Vec<Task>,
  args:     FindManyArgs,
  results:  Vec<Task>,
  revision: u64
}

impl LiveQuery {
  pub fn new(
    records: Vec<Task>,
    args: FindManyArgs
  ) -> Self {
    let results = find_many(&records, &args);
    Self {
      records,
      args,
      results,
      revision: 0
    }
  }

  pub fn results(&self) -> &[Task] {
    &self.results
  }

  pub fn revision(&self) -> u64 {
    self.revision
  }

  pub fn args(&self) -> &FindManyArgs {
    &self.args
  }

  pub fn records(&self) -> &[Task] {
    &self.records
  }

  /// Returns whether the results re-emitted.
  pub fn set_args(
    &mut self,
    args: FindManyArgs
  ) -> bool {
    if args == self.args {
      return false;
    }
    self.args = args;
    self.refresh()
  }

  /// Inserts `task`, replacing any record with the same id.
  pub fn upsert(
    &mut self,
    task: Task
  ) -> bool {
    match self
      .records
      .iter_mut()
      .find(|existing| existing.id == task.id)
    {
      | Some(existing) => *existing = task,
      | None => self.records.push(task)
    }
    self.refresh()
  }

  /// Applies a bulk delete and returns how many records went away.
  pub fn delete_many(
    &mut self,
    args: &DeleteManyArgs
  ) -> usize {
    let before = self.records.len();
    match &args.where_clause {
      | None => self.records.clear(),
      | Some(clause) => {
        self
          .records
          .retain(|task| !matches(clause, task))
      }
    }
    let removed =
      before - self.records.len();
    debug!(removed, "records deleted");
    self.refresh();
    removed
  }

  fn refresh(&mut self) -> bool {
    let next =
      find_many(&self.records, &self.args);
    if next == self.results {
      trace!("live query unchanged");
      return false;
    }
    self.results = next;
    self.revision += 1;
    true
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    DateTime,
    Duration,
    TimeZone,
    Utc
  };
  use taskdeck_shared::{
    InClause,
    RangeClause,
    TaskPriority,
    TaskStatus
  };

  use super::*;

  fn now() -> DateTime<Utc> {
    Utc
      .with_ymd_and_hms(
        2026, 2, 16, 5, 0, 0
      )
      .single()
      .expect("valid now")
  }

  fn task(
    id: &str,
    title: &str,
    status: TaskStatus,
    priority: TaskPriority,
    due_in_hours: Option<i64>
  ) -> Task {
    Task {
      id: id.to_string(),
      title: title.to_string(),
      description: None,
      status,
      priority,
      due_date: due_in_hours
        .map(|h| now() + Duration::hours(h)),
      created_at: now(),
      updated_at: now()
    }
  }

  fn fixture() -> Vec<Task> {
    vec![
      task(
        "a",
        "Write tests",
        TaskStatus::ToDo,
        TaskPriority::P2,
        Some(-3)
      ),
      task(
        "b",
        "fix login",
        TaskStatus::InProgress,
        TaskPriority::P0,
        Some(5)
      ),
      task(
        "c",
        "Archive logs",
        TaskStatus::Completed,
        TaskPriority::P3,
        None
      ),
    ]
  }

  fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks
      .iter()
      .map(|t| t.id.as_str())
      .collect()
  }

  #[test]
  fn empty_clause_matches_everything() {
    let out = find_many(
      &fixture(),
      &FindManyArgs::default()
    );
    assert_eq!(ids(&out), ["c", "b", "a"]);
  }

  #[test]
  fn status_and_due_clauses_intersect() {
    let clause = WhereClause {
      id:       None,
      status:   Some(InClause {
        values: vec![
          TaskStatus::ToDo,
          TaskStatus::InProgress,
        ]
      }),
      due_date: Some(RangeClause {
        gte: now() - Duration::days(1),
        lte: now()
      })
    };
    let tasks = fixture();
    let hits: Vec<_> = tasks
      .iter()
      .filter(|t| matches(&clause, t))
      .collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "a");
  }

  #[test]
  fn missing_due_dates_sort_last_both_ways()
  {
    for direction in [
      QueryDirection::Asc,
      QueryDirection::Desc
    ] {
      let out = find_many(
        &fixture(),
        &FindManyArgs {
          where_clause: WhereClause::default(),
          order_by:     OrderByClause::new(
            TaskField::DueDate,
            direction
          )
        }
      );
      assert_eq!(
        out.last().map(|t| t.id.as_str()),
        Some("c")
      );
    }
  }

  #[test]
  fn title_sort_ignores_case() {
    let out = find_many(
      &fixture(),
      &FindManyArgs {
        where_clause: WhereClause::default(),
        order_by:     OrderByClause::new(
          TaskField::Title,
          QueryDirection::Asc
        )
      }
    );
    assert_eq!(ids(&out), ["c", "b", "a"]);
  }

  #[test]
  fn live_query_re_emits_only_on_change() {
    let mut live = LiveQuery::new(
      fixture(),
      FindManyArgs::default()
    );
    assert_eq!(live.revision(), 0);
    assert!(
      !live.set_args(FindManyArgs::default())
    );

    let mut args = FindManyArgs::default();
    args.where_clause.status =
      Some(InClause {
        values: vec![TaskStatus::Completed]
      });
    assert!(live.set_args(args));
    assert_eq!(ids(live.results()), ["c"]);
    assert_eq!(live.revision(), 1);

    let hidden = task(
      "d",
      "still open",
      TaskStatus::ToDo,
      TaskPriority::P1,
      None
    );
    assert!(!live.upsert(hidden));
    assert_eq!(live.revision(), 1);
    assert_eq!(live.records().len(), 4);
  }

  #[test]
  fn delete_many_honours_the_id_clause() {
    let mut live = LiveQuery::new(
      fixture(),
      FindManyArgs::default()
    );
    let removed =
      live.delete_many(&DeleteManyArgs {
        where_clause: Some(WhereClause {
          id: Some(InClause {
            values: vec![
              "a".to_string(),
              "zz".to_string(),
            ]
          }),
          ..WhereClause::default()
        })
      });
    assert_eq!(removed, 1);
    assert_eq!(ids(live.results()), ["c", "b"]);

    let removed = live
      .delete_many(&DeleteManyArgs::default());
    assert_eq!(removed, 2);
    assert!(live.results().is_empty());
  }
}
