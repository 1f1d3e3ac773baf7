//! Row selection as the table widget sees it, and the plain form the
//! store keeps.
//!
//! A widget selection is either "every visible row" or a set of keys.
//! Sets don't belong in a plain state container, so the store holds a
//! [`SerializableSelection`] instead and converts at the boundary.

use std::collections::BTreeSet;

use serde::de::Error as _;
use serde::{
  Deserialize,
  Deserializer,
  Serialize,
  Serializer
};
use taskdeck_shared::{
  DeleteManyArgs,
  InClause,
  TaskId,
  WhereClause
};

const ALL_SENTINEL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
  All,
  Keys(BTreeSet<TaskId>)
}

impl Default for Selection {
  fn default() -> Self {
    Selection::Keys(BTreeSet::new())
  }
}

impl Selection {
  pub fn keys<I, S>(ids: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<TaskId>
  {
    Selection::Keys(
      ids.into_iter().map(Into::into).collect()
    )
  }

  /// Whether a bulk action has anything to act on.
  pub fn has_selection(&self) -> bool {
    match self {
      | Selection::All => true,
      | Selection::Keys(keys) => {
        !keys.is_empty()
      }
    }
  }

  pub fn contains(
    &self,
    id: &str
  ) -> bool {
    match self {
      | Selection::All => true,
      | Selection::Keys(keys) => {
        keys.contains(id)
      }
    }
  }

  /// Arguments for deleting the selected rows. `All` deletes without a
  /// predicate.
  pub fn delete_args(
    &self
  ) -> DeleteManyArgs {
    match self {
      | Selection::All => {
        DeleteManyArgs {
          where_clause: None
        }
      }
      | Selection::Keys(keys) => {
        DeleteManyArgs {
          where_clause: Some(
            WhereClause {
              id: Some(InClause {
                values: keys
                  .iter()
                  .cloned()
                  .collect()
              }),
              ..WhereClause::default()
            }
          )
        }
      }
    }
  }
}

/// `"all"` or a list of ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializableSelection {
  All,
  Ids(Vec<TaskId>)
}

impl Default for SerializableSelection {
  fn default() -> Self {
    SerializableSelection::Ids(Vec::new())
  }
}

impl Serialize for SerializableSelection {
  fn serialize<S>(
    &self,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    match self {
      | SerializableSelection::All => {
        serializer
          .serialize_str(ALL_SENTINEL)
      }
      | SerializableSelection::Ids(
        ids
      ) => ids.serialize(serializer)
    }
  }
}

impl<'de> Deserialize<'de>
  for SerializableSelection
{
  fn deserialize<D>(
    deserializer: D
  ) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>
  {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
      Word(String),
      Ids(Vec<TaskId>)
    }

    match Raw::deserialize(deserializer)?
    {
      | Raw::Word(word)
        if word == ALL_SENTINEL =>
      {
        Ok(SerializableSelection::All)
      }
      | Raw::Word(word) => {
        Err(D::Error::custom(format!(
          "expected \"{ALL_SENTINEL}\" \
           or a list of ids, got \
           {word:?}"
        )))
      }
      | Raw::Ids(ids) => {
        Ok(SerializableSelection::Ids(ids))
      }
    }
  }
}

#[must_use]
pub fn encode(
  selection: &Selection
) -> SerializableSelection {
  match selection {
    | Selection::All => {
      SerializableSelection::All
    }
    | Selection::Keys(keys) => {
      SerializableSelection::Ids(
        keys.iter().cloned().collect()
      )
    }
  }
}

#[must_use]
pub fn decode(
  selection: &SerializableSelection
) -> Selection {
  match selection {
    | SerializableSelection::All => {
      Selection::All
    }
    | SerializableSelection::Ids(ids) => {
      Selection::Keys(
        ids.iter().cloned().collect()
      )
    }
  }
}
