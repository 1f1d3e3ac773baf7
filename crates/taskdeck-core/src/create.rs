use chrono::{
  DateTime,
  Utc
};
use taskdeck_shared::{
  Task,
  TaskPriority,
  TaskStatus
};
use tracing::debug;
use uuid::Uuid;

/// Key that opens the creation dialog from anywhere outside a text
/// field.
pub const NEW_TASK_SHORTCUT: &str = "c";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DraftError {
  #[error("task title cannot be empty")]
  EmptyTitle
}

/// Sticky values for the "new task" dialog. Whatever was used last
/// pre-populates the next invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDefaults {
  create_another:   bool,
  default_priority: TaskPriority,
  default_status:   TaskStatus,
  dialog_open:      bool
}

impl Default for CreateDefaults {
  fn default() -> Self {
    Self {
      create_another:   false,
      default_priority: TaskPriority::P1,
      default_status:   TaskStatus::ToDo,
      dialog_open:      false
    }
  }
}

impl CreateDefaults {
  pub fn new(
    priority: TaskPriority,
    status: TaskStatus,
    create_another: bool
  ) -> Self {
    Self {
      create_another,
      default_priority: priority,
      default_status: status,
      dialog_open: false
    }
  }

  pub fn set_default_priority(
    &mut self,
    priority: TaskPriority
  ) {
    self.default_priority = priority;
  }

  pub fn set_default_status(
    &mut self,
    status: TaskStatus
  ) {
    self.default_status = status;
  }

  pub fn set_dialog_open(
    &mut self,
    open: bool
  ) {
    debug!(open, "create dialog toggled");
    self.dialog_open = open;
  }

  pub fn set_create_another(
    &mut self,
    create_another: bool
  ) {
    self.create_another = create_another;
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

  pub fn is_dialog_open(&self) -> bool {
    self.dialog_open
  }

  pub fn create_another(&self) -> bool {
    self.create_another
  }

  /// Opens the dialog when `key` is the shortcut, the dialog is
  /// closed, and focus is not in an editable element. Returns whether
  /// the key was consumed.
  pub fn handle_shortcut(
    &mut self,
    key: &str,
    target_is_editable: bool
  ) -> bool {
    if target_is_editable
      || self.dialog_open
      || key != NEW_TASK_SHORTCUT
    {
      return false;
    }
    self.set_dialog_open(true);
    true
  }

  pub fn draft(
    &self,
    title: impl Into<String>
  ) -> TaskDraft {
    TaskDraft {
      title:       title.into(),
      description: None,
      status:      self.default_status,
      priority:    self.default_priority,
      due_date:    None
    }
  }

  /// Bookkeeping after a successful submit: the values used become the
  /// new defaults, and the dialog stays open only for "create another".
  pub fn record_submission(
    &mut self,
    submitted: &Task
  ) {
    self.default_priority =
      submitted.priority;
    self.default_status =
      submitted.status;
    if !self.create_another {
      self.dialog_open = false;
    }
  }
}

/// Form values for a task that doesn't exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
  pub title:       String,
  pub description: Option<String>,
  pub status:      TaskStatus,
  pub priority:    TaskPriority,
  pub due_date:    Option<DateTime<Utc>>
}

impl TaskDraft {
  pub fn into_task(
    self,
    now: DateTime<Utc>
  ) -> Result<Task, DraftError> {
    let title = self.title.trim();
    if title.is_empty() {
      return Err(DraftError::EmptyTitle);
    }

    let description = self
      .description
      .map(|text| text.trim().to_string())
      .filter(|text| !text.is_empty());

    Ok(Task {
      id: Uuid::new_v4().to_string(),
      title: title.to_string(),
      description,
      status: self.status,
      priority: self.priority,
      due_date: self.due_date,
      created_at: now,
      updated_at: now
    })
  }
}
