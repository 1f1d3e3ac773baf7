use serde::{
  Deserialize,
  Serialize
};
use taskdeck_shared::{
  OrderByClause,
  QueryDirection,
  SortColumn
};
use tracing::debug;

/// Direction as reported by the table widget. `None` means the user
/// cleared the column's sort.
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
pub enum SortDirection {
  Ascending,
  Descending,
  None
}

impl SortDirection {
  pub fn from_key(
    key: &str
  ) -> Option<Self> {
    match key {
      | "ascending" | "asc" => {
        Some(SortDirection::Ascending)
      }
      | "descending" | "desc" => {
        Some(SortDirection::Descending)
      }
      | "none" | "" => {
        Some(SortDirection::None)
      }
      | _ => None
    }
  }

  pub fn to_query(
    self
  ) -> Option<QueryDirection> {
    match self {
      | SortDirection::Ascending => {
        Some(QueryDirection::Asc)
      }
      | SortDirection::Descending => {
        Some(QueryDirection::Desc)
      }
      | SortDirection::None => None
    }
  }
}

/// What the table widget needs to draw its sort indicator.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct SortDescriptor {
  pub column:    SortColumn,
  pub direction: QueryDirection
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct SortState {
  descriptor: Option<SortDescriptor>,
  fallback:   OrderByClause
}

impl SortState {
  pub fn new() -> Self {
    Self::default()
  }

  /// State whose cleared ordering is `fallback` instead of
  /// `status desc`.
  pub fn with_fallback(
    fallback: OrderByClause
  ) -> Self {
    Self {
      descriptor: None,
      fallback
    }
  }

  /// Sorts by `column`, replacing any other sorted column. A `None`
  /// direction clears the sort entirely.
  pub fn set_sort(
    &mut self,
    column: SortColumn,
    direction: SortDirection
  ) {
    self.descriptor =
      direction.to_query().map(
        |direction| SortDescriptor {
          column,
          direction
        }
      );
    debug!(
      column = column.as_str(),
      ?direction,
      "column sorted"
    );
  }

  pub fn clear_sort(&mut self) {
    self.descriptor = None;
  }

  pub fn descriptor(
    &self
  ) -> Option<SortDescriptor> {
    self.descriptor
  }

  pub fn fallback(&self) -> OrderByClause {
    self.fallback
  }

  pub fn order_by_clause(
    &self
  ) -> OrderByClause {
    match self.descriptor {
      | Some(descriptor) => {
        OrderByClause::new(
          descriptor.column.field(),
          descriptor.direction
        )
      }
      | None => self.fallback
    }
  }
}
