use chrono_tz::Tz;
use taskdeck_shared::{
  SortColumn,
  Task,
  TaskPriority,
  TaskStatus
};
use tracing::{
  debug,
  trace
};

use crate::config::Config;
use crate::create::CreateDefaults;
use crate::date_range::PreselectedRange;
use crate::filter::FilterState;
use crate::select::SelectionState;
use crate::selection::{
  Selection,
  SerializableSelection
};
use crate::sort::{
  SortDirection,
  SortState
};
use crate::validation;

/// Intents the presentation layer can dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
  StatusFilterToggled(TaskStatus),
  StatusFilterCleared,
  DueDateFilterApplied(PreselectedRange),
  DueDateFilterCleared,
  FiltersCleared,
  /// Column ids come from the table widget untyped; unknown ones are
  /// dropped.
  ColumnSorted {
    column:    String,
    direction: SortDirection
  },
  SortCleared,
  SelectionUpdated(SerializableSelection),
  SelectionCleared,
  DefaultPriorityUpdated(TaskPriority),
  DefaultStatusUpdated(TaskStatus),
  CreateAnotherUpdated(bool),
  CreateDialogOpenChanged(bool),
  /// A task from the creation dialog was persisted.
  TaskCreated(Task)
}

/// What the caller should do with an open detail view after rows went
/// away.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum DetailNavigation {
  Stay,
  Close
}

/// Session state for the task screens. One instance per session, handed
/// by reference to whatever needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskStore {
  filter:    FilterState,
  sort:      SortState,
  selection: SelectionState,
  create:    CreateDefaults,
  timezone:  Tz
}

impl Default for TaskStore {
  fn default() -> Self {
    Self {
      filter:    FilterState::new(),
      sort:      SortState::new(),
      selection: SelectionState::new(),
      create:    CreateDefaults::default(),
      timezone:  chrono_tz::UTC
    }
  }
}

impl TaskStore {
  pub fn new() -> Self {
    Self::default()
  }

  #[tracing::instrument(skip(cfg))]
  pub fn from_config(cfg: &Config) -> Self {
    let store = Self {
      filter:    FilterState::new(),
      sort:      SortState::with_fallback(
        cfg.fallback_order()
      ),
      selection: SelectionState::new(),
      create:    CreateDefaults::new(
        cfg.default_priority(),
        cfg.default_status(),
        cfg.create_another()
      ),
      timezone:  cfg.timezone()
    };
    debug!(
      timezone = %store.timezone,
      "task store initialised from config"
    );
    store
  }

  pub fn dispatch(
    &mut self,
    action: TaskAction
  ) {
    trace!(?action, "dispatch");
    match action {
      | TaskAction::StatusFilterToggled(
        status
      ) => self.filter.toggle_status(status),
      | TaskAction::StatusFilterCleared => {
        self.filter.clear_status_filters()
      }
      | TaskAction::DueDateFilterApplied(
        range
      ) => {
        self.filter.set_due_date_range(range)
      }
      | TaskAction::DueDateFilterCleared => {
        self.filter.clear_due_date_range()
      }
      | TaskAction::FiltersCleared => {
        self.filter.clear_all()
      }
      | TaskAction::ColumnSorted {
        column,
        direction
      } => {
        self.sort_by_key(&column, direction);
      }
      | TaskAction::SortCleared => {
        self.sort.clear_sort()
      }
      | TaskAction::SelectionUpdated(
        value
      ) => self.selection.set_selection(value),
      | TaskAction::SelectionCleared => {
        self.selection.clear_selection()
      }
      | TaskAction::DefaultPriorityUpdated(
        priority
      ) => {
        self
          .create
          .set_default_priority(priority)
      }
      | TaskAction::DefaultStatusUpdated(
        status
      ) => {
        self.create.set_default_status(status)
      }
      | TaskAction::CreateAnotherUpdated(
        value
      ) => {
        self.create.set_create_another(value)
      }
      | TaskAction::CreateDialogOpenChanged(
        open
      ) => self.create.set_dialog_open(open),
      | TaskAction::TaskCreated(task) => {
        self.create.record_submission(&task)
      }
    }
  }

  /// Sorts by a widget column id. Returns whether the id was accepted;
  /// unknown ids leave the sort untouched.
  pub fn sort_by_key(
    &mut self,
    column: &str,
    direction: SortDirection
  ) -> bool {
    match validation::parse_sort_column(
      column
    ) {
      | Some(column) => {
        self.set_sort(column, direction);
        true
      }
      | None => false
    }
  }

  pub fn set_sort(
    &mut self,
    column: SortColumn,
    direction: SortDirection
  ) {
    self.sort.set_sort(column, direction);
  }

  /// Feeds a key press to the creation shortcut.
  pub fn handle_key(
    &mut self,
    key: &str,
    target_is_editable: bool
  ) -> bool {
    self
      .create
      .handle_shortcut(key, target_is_editable)
  }

  /// Bookkeeping once a bulk delete resolved: the selection is reset,
  /// and an open detail view for a deleted row must close.
  #[tracing::instrument(skip(self, deleted))]
  pub fn complete_bulk_delete(
    &mut self,
    deleted: &Selection,
    open_detail: Option<&str>
  ) -> DetailNavigation {
    self.selection.clear_selection();
    match open_detail {
      | Some(id) if deleted.contains(id) => {
        debug!(
          id,
          "open task was deleted"
        );
        DetailNavigation::Close
      }
      | _ => DetailNavigation::Stay
    }
  }

  /// Called when the live query re-emits. If the open detail row is no
  /// longer visible the selection is reset and the view must close.
  pub fn reconcile_visible<'a, I>(
    &mut self,
    visible: I,
    open_detail: Option<&str>
  ) -> DetailNavigation
  where
    I: IntoIterator<Item = &'a str>
  {
    let Some(open) = open_detail else {
      return DetailNavigation::Stay;
    };
    if visible
      .into_iter()
      .any(|id| id == open)
    {
      return DetailNavigation::Stay;
    }
    debug!(
      id = open,
      "open task left the visible set"
    );
    self.selection.clear_selection();
    DetailNavigation::Close
  }

  pub fn filter(&self) -> &FilterState {
    &self.filter
  }

  pub fn sort(&self) -> &SortState {
    &self.sort
  }

  pub fn selection(
    &self
  ) -> &SelectionState {
    &self.selection
  }

  pub fn create(
    &self
  ) -> &CreateDefaults {
    &self.create
  }

  pub fn timezone(&self) -> &Tz {
    &self.timezone
  }
}
