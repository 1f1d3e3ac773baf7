use std::collections::BTreeMap;
use std::fmt;

use chrono::{
  DateTime,
  Utc
};
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{
  Deserialize,
  Deserializer,
  Serialize,
  Serializer
};

pub type TaskId = String;

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
  ToDo,
  InProgress,
  Completed
}

impl TaskStatus {
  pub const ALL: [TaskStatus; 3] = [
    TaskStatus::ToDo,
    TaskStatus::InProgress,
    TaskStatus::Completed
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | TaskStatus::ToDo => "to_do",
      | TaskStatus::InProgress => {
        "in_progress"
      }
      | TaskStatus::Completed => {
        "completed"
      }
    }
  }

  pub fn from_key(
    key: &str
  ) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|status| status.as_str() == key)
  }
}

impl fmt::Display for TaskStatus {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Ordered most to least urgent, so `P0 < P3`.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
  P0,
  P1,
  P2,
  P3
}

impl TaskPriority {
  pub const ALL: [TaskPriority; 4] = [
    TaskPriority::P0,
    TaskPriority::P1,
    TaskPriority::P2,
    TaskPriority::P3
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | TaskPriority::P0 => "p0",
      | TaskPriority::P1 => "p1",
      | TaskPriority::P2 => "p2",
      | TaskPriority::P3 => "p3"
    }
  }

  pub fn from_key(
    key: &str
  ) -> Option<Self> {
    Self::ALL.into_iter().find(
      |priority| priority.as_str() == key
    )
  }
}

impl fmt::Display for TaskPriority {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A task record as owned by the sync client.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Task {
  pub id:          TaskId,
  pub title:       String,
  #[serde(default)]
  pub description: Option<String>,
  pub status:      TaskStatus,
  pub priority:    TaskPriority,
  #[serde(default)]
  pub due_date:    Option<DateTime<Utc>>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>
}

impl Task {
  #[must_use]
  pub fn is_overdue(
    &self,
    now: DateTime<Utc>
  ) -> bool {
    self.status != TaskStatus::Completed
      && self
        .due_date
        .is_some_and(|due| due < now)
  }
}

/// Every key of [`Task`]. Column ids reported by table widgets are
/// checked against this list before they reach typed code.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskField {
  Id,
  Title,
  Description,
  Status,
  Priority,
  DueDate,
  CreatedAt,
  UpdatedAt
}

impl TaskField {
  pub const ALL: [TaskField; 8] = [
    TaskField::Id,
    TaskField::Title,
    TaskField::Description,
    TaskField::Status,
    TaskField::Priority,
    TaskField::DueDate,
    TaskField::CreatedAt,
    TaskField::UpdatedAt
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | TaskField::Id => "id",
      | TaskField::Title => "title",
      | TaskField::Description => {
        "description"
      }
      | TaskField::Status => "status",
      | TaskField::Priority => "priority",
      | TaskField::DueDate => "due_date",
      | TaskField::CreatedAt => {
        "created_at"
      }
      | TaskField::UpdatedAt => {
        "updated_at"
      }
    }
  }

  pub fn from_key(
    key: &str
  ) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|field| field.as_str() == key)
  }
}

/// The subset of [`TaskField`] a user may sort the table by.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
  Title,
  DueDate,
  Status,
  Priority
}

impl SortColumn {
  pub const ALL: [SortColumn; 4] = [
    SortColumn::Title,
    SortColumn::DueDate,
    SortColumn::Status,
    SortColumn::Priority
  ];

  pub fn as_str(self) -> &'static str {
    self.field().as_str()
  }

  pub fn field(self) -> TaskField {
    match self {
      | SortColumn::Title => {
        TaskField::Title
      }
      | SortColumn::DueDate => {
        TaskField::DueDate
      }
      | SortColumn::Status => {
        TaskField::Status
      }
      | SortColumn::Priority => {
        TaskField::Priority
      }
    }
  }

  pub fn from_key(
    key: &str
  ) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|column| column.as_str() == key)
  }
}

/// Direction in query vocabulary, as opposed to the table widget's
/// ascending/descending.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum QueryDirection {
  Asc,
  Desc
}

impl QueryDirection {
  pub fn as_str(self) -> &'static str {
    match self {
      | QueryDirection::Asc => "asc",
      | QueryDirection::Desc => "desc"
    }
  }

  pub fn from_key(
    key: &str
  ) -> Option<Self> {
    match key {
      | "asc" => Some(QueryDirection::Asc),
      | "desc" => {
        Some(QueryDirection::Desc)
      }
      | _ => None
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct InClause<T> {
  #[serde(rename = "in")]
  pub values: Vec<T>
}

/// Inclusive bounds, serialized as `{gte, lte}`.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct RangeClause {
  pub gte: DateTime<Utc>,
  pub lte: DateTime<Utc>
}

/// Predicate handed to the live query. A `None` field means the clause
/// is absent, never "match everything" or "match nothing".
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct WhereClause {
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub id:       Option<InClause<TaskId>>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub status:   Option<InClause<TaskStatus>>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub due_date: Option<RangeClause>
}

impl WhereClause {
  pub fn is_empty(&self) -> bool {
    self.id.is_none()
      && self.status.is_none()
      && self.due_date.is_none()
  }
}

/// Single-field ordering, serialized as `{"<field>": "asc" | "desc"}`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct OrderByClause {
  pub field:     TaskField,
  pub direction: QueryDirection
}

impl OrderByClause {
  pub fn new(
    field: TaskField,
    direction: QueryDirection
  ) -> Self {
    Self {
      field,
      direction
    }
  }
}

impl Default for OrderByClause {
  fn default() -> Self {
    Self::new(
      TaskField::Status,
      QueryDirection::Desc
    )
  }
}

impl Serialize for OrderByClause {
  fn serialize<S>(
    &self,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    let mut map =
      serializer.serialize_map(Some(1))?;
    map.serialize_entry(
      self.field.as_str(),
      &self.direction
    )?;
    map.end()
  }
}

impl<'de> Deserialize<'de> for OrderByClause {
  fn deserialize<D>(
    deserializer: D
  ) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw = BTreeMap::<
      String,
      QueryDirection
    >::deserialize(deserializer)?;
    if raw.len() != 1 {
      return Err(D::Error::custom(
        format!(
          "expected exactly one order \
           field, got {}",
          raw.len()
        )
      ));
    }
    let Some((key, direction)) =
      raw.into_iter().next()
    else {
      return Err(D::Error::custom(
        "empty order clause"
      ));
    };
    let field = TaskField::from_key(&key)
      .ok_or_else(|| {
        D::Error::custom(format!(
          "unknown task field: {key}"
        ))
      })?;
    Ok(Self {
      field,
      direction
    })
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct FindManyArgs {
  #[serde(rename = "where", default)]
  pub where_clause: WhereClause,
  #[serde(rename = "orderBy", default)]
  pub order_by:     OrderByClause
}

/// `where: None` deletes every task.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct DeleteManyArgs {
  #[serde(
    rename = "where",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub where_clause: Option<WhereClause>
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn enum_keys_match_wire_names() {
    for status in TaskStatus::ALL {
      let json =
        serde_json::to_string(&status)
          .expect("serialize status");
      assert_eq!(
        json,
        format!("\"{}\"", status.as_str())
      );
      assert_eq!(
        TaskStatus::from_key(
          status.as_str()
        ),
        Some(status)
      );
    }
    for field in TaskField::ALL {
      let json =
        serde_json::to_string(&field)
          .expect("serialize field");
      assert_eq!(
        json,
        format!("\"{}\"", field.as_str())
      );
    }
    assert_eq!(
      TaskPriority::from_key("p2"),
      Some(TaskPriority::P2)
    );
    assert_eq!(
      TaskPriority::from_key("urgent"),
      None
    );
  }

  #[test]
  fn empty_where_clause_serializes_to_empty_object()
   {
    let json = serde_json::to_value(
      WhereClause::default()
    )
    .expect("serialize where");
    assert_eq!(
      json,
      serde_json::json!({})
    );
  }

  #[test]
  fn where_clause_uses_in_and_range_keys()
  {
    let gte = Utc
      .with_ymd_and_hms(
        2026, 3, 1, 0, 0, 0
      )
      .single()
      .expect("valid gte");
    let lte = Utc
      .with_ymd_and_hms(
        2026, 3, 8, 0, 0, 0
      )
      .single()
      .expect("valid lte");
    let clause = WhereClause {
      id:       None,
      status:   Some(InClause {
        values: vec![
          TaskStatus::ToDo,
          TaskStatus::InProgress,
        ]
      }),
      due_date: Some(RangeClause {
        gte,
        lte
      })
    };

    let json = serde_json::to_value(
      &clause
    )
    .expect("serialize where");
    assert_eq!(
      json,
      serde_json::json!({
        "status": { "in": ["to_do", "in_progress"] },
        "due_date": {
          "gte": "2026-03-01T00:00:00Z",
          "lte": "2026-03-08T00:00:00Z"
        }
      })
    );
  }

  #[test]
  fn order_by_is_a_single_key_object() {
    let clause = OrderByClause::new(
      TaskField::DueDate,
      QueryDirection::Asc
    );
    let json = serde_json::to_value(
      clause
    )
    .expect("serialize order");
    assert_eq!(
      json,
      serde_json::json!({ "due_date": "asc" })
    );

    let back: OrderByClause =
      serde_json::from_value(json)
        .expect("deserialize order");
    assert_eq!(back, clause);

    let err = serde_json::from_value::<
      OrderByClause
    >(serde_json::json!({
      "title": "asc",
      "status": "desc"
    }));
    assert!(err.is_err());
  }

  #[test]
  fn default_order_is_status_descending()
  {
    let args = FindManyArgs::default();
    let json = serde_json::to_value(
      &args
    )
    .expect("serialize args");
    assert_eq!(
      json,
      serde_json::json!({
        "where": {},
        "orderBy": { "status": "desc" }
      })
    );
  }

  #[test]
  fn overdue_ignores_completed_tasks() {
    let now = Utc
      .with_ymd_and_hms(
        2026, 3, 1, 12, 0, 0
      )
      .single()
      .expect("valid now");
    let mut task = Task {
      id:          "a".to_string(),
      title:       "ship it".to_string(),
      description: None,
      status:      TaskStatus::ToDo,
      priority:    TaskPriority::P1,
      due_date:    Some(
        now - chrono::Duration::hours(1)
      ),
      created_at:  now,
      updated_at:  now
    };
    assert!(task.is_overdue(now));

    task.status = TaskStatus::Completed;
    assert!(!task.is_overdue(now));

    task.status = TaskStatus::InProgress;
    task.due_date = None;
    assert!(!task.is_overdue(now));
  }
}
