use tracing::debug;

use crate::selection::{
  self,
  Selection,
  SerializableSelection
};

/// Rows currently selected for bulk actions, kept in plain form.
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct SelectionState {
  selected: SerializableSelection
}

impl SelectionState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set_selection(
    &mut self,
    value: SerializableSelection
  ) {
    match &value {
      | SerializableSelection::All => {
        debug!("selection updated to all")
      }
      | SerializableSelection::Ids(ids) => {
        debug!(
          ids = ids.len(),
          "selection updated"
        )
      }
    }
    self.selected = value;
  }

  /// Stores a widget selection.
  pub fn set_from_widget(
    &mut self,
    value: &Selection
  ) {
    self.set_selection(selection::encode(
      value
    ));
  }

  pub fn clear_selection(&mut self) {
    self.selected =
      SerializableSelection::default();
  }

  pub fn selected(
    &self
  ) -> &SerializableSelection {
    &self.selected
  }

  /// The selection as the table widget wants it.
  pub fn as_widget(&self) -> Selection {
    selection::decode(&self.selected)
  }
}
