//! Item types.
//!
//! An [`Item`] is one entry of the list. New items enter through [`NewItem`],
//! which validates the name and due date up front, and existing items change
//! through [`ItemPatch`], where every field is optional so that "not provided"
//! and "set to the zero value" stay distinguishable.

use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// `chrono` format string for due dates (`DD-MM-YYYY`).
pub const DUE_DATE_FORMAT: &str = "%d-%m-%Y";

/// Parses a due date in `DD-MM-YYYY` form.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDue`] if `due` is not a real calendar
/// date in that format.
pub fn parse_due(due: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(due, DUE_DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDue(due.to_string()))
}

/// Unique identifier for an item
///
/// Identifiers are assigned by the sequencer and are never reused while it runs.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    /// Creates an `ItemId` from its numeric value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the identifier that follows this one, or `None` at `u64::MAX`
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A single todo item
///
/// Serialized with the field names used by the data file: `ID`, `Name`,
/// `Completed` and `Due`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier
    #[serde(rename = "ID")]
    pub id: ItemId,
    /// Title of the item
    #[serde(rename = "Name")]
    pub name: String,
    /// Whether the item is completed
    #[serde(rename = "Completed", default)]
    pub completed: bool,
    /// Due date in `DD-MM-YYYY` form
    #[serde(rename = "Due", default)]
    pub due: String,
}

impl Item {
    /// Creates a new, not yet completed item from a validated payload
    #[must_use]
    pub fn new(id: ItemId, item: NewItem) -> Self {
        Self {
            id,
            name: item.name,
            completed: false,
            due: item.due,
        }
    }
}

/// Validated payload for adding an item
///
/// The only way to build one is [`NewItem::new`], so a `NewItem` always has a
/// non-empty name and a well-formed due date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewItem {
    name: String,
    due: String,
}

impl NewItem {
    /// Validates and creates a new item payload
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyName`] if `name` is blank
    /// - [`ValidationError::InvalidDue`] if `due` is not `DD-MM-YYYY`
    pub fn new(name: impl Into<String>, due: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let due = due.into();

        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        parse_due(&due)?;

        Ok(Self { name, due })
    }

    /// Returns the item name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the due date
    #[must_use]
    pub fn due(&self) -> &str {
        &self.due
    }
}

/// Field-level update for an existing item
///
/// `None` leaves a field unchanged. `Some(false)` or `Some(String::new())`
/// are real values and overwrite the field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    /// New name, if provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New due date, if provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    /// New completion flag, if provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl ItemPatch {
    /// Creates an empty patch
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: None,
            due: None,
            completed: None,
        }
    }

    /// Sets the name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the due date
    #[must_use]
    pub fn due(mut self, due: impl Into<String>) -> Self {
        self.due = Some(due.into());
        self
    }

    /// Sets the completion flag
    #[must_use]
    pub const fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Returns true when no field is provided
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.due.is_none() && self.completed.is_none()
    }

    /// Checks the provided fields with the same rules as [`NewItem::new`]
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(ValidationError::EmptyName);
        }
        if let Some(due) = &self.due {
            parse_due(due)?;
        }
        Ok(())
    }

    /// Writes the provided fields into `item`
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name.clone_from(name);
        }
        if let Some(due) = &self.due {
            item.due.clone_from(due);
        }
        if let Some(completed) = self.completed {
            item.completed = completed;
        }
    }
}
