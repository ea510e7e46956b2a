//! Travel record domain model.
//!
//! # Responsibility
//! - Define the typed record shared by the table, the store and callers.
//! - Validate editable fields before they reach persistence.
//!
//! # Invariants
//! - `id` is assigned once and never changes for the lifetime of a record.
//! - `city` and `country` are never blank; `year` is a 4-digit calendar year.
//! - An empty note is represented as `None`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned record identifier. Valid ids start at `1`.
pub type TravelId = i64;

/// Smallest year accepted by validation.
pub const MIN_YEAR: i32 = 1000;
/// Largest year accepted by validation.
pub const MAX_YEAR: i32 = 9999;

/// Validation failures for travel input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TravelValidationError {
    /// `city` is empty or whitespace only.
    BlankCity,
    /// `country` is empty or whitespace only.
    BlankCountry,
    /// `year` is not a 4-digit calendar year.
    YearOutOfRange(i32),
    /// Explicit ids must be positive.
    InvalidId(TravelId),
}

impl Display for TravelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankCity => write!(f, "city must not be blank"),
            Self::BlankCountry => write!(f, "country must not be blank"),
            Self::YearOutOfRange(year) => write!(
                f,
                "year {year} is outside the supported range {MIN_YEAR}..={MAX_YEAR}"
            ),
            Self::InvalidId(id) => write!(f, "travel id must be positive, got {id}"),
        }
    }
}

impl Error for TravelValidationError {}

/// Editable content of a travel record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelFields {
    pub city: String,
    pub country: String,
    pub year: i32,
    pub note: Option<String>,
}

impl TravelFields {
    /// Builds fields with an empty note.
    pub fn new(city: impl Into<String>, country: impl Into<String>, year: i32) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
            year,
            note: None,
        }
    }

    /// Sets the note, treating an empty string as "no note".
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = normalize_note(Some(note.into()));
        self
    }

    /// Checks the record invariants without touching storage.
    pub fn validate(&self) -> Result<(), TravelValidationError> {
        if self.city.trim().is_empty() {
            return Err(TravelValidationError::BlankCity);
        }
        if self.country.trim().is_empty() {
            return Err(TravelValidationError::BlankCountry);
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(TravelValidationError::YearOutOfRange(self.year));
        }
        Ok(())
    }
}

/// Insert request. `id: None` asks the store to assign the next free id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTravel {
    pub id: Option<TravelId>,
    pub fields: TravelFields,
}

impl NewTravel {
    /// Insert with a store-assigned id.
    pub fn auto(fields: TravelFields) -> Self {
        Self { id: None, fields }
    }

    /// Insert with a caller-chosen id, used by import and edit-merge paths.
    pub fn with_id(id: TravelId, fields: TravelFields) -> Self {
        Self {
            id: Some(id),
            fields,
        }
    }

    pub fn validate(&self) -> Result<(), TravelValidationError> {
        if let Some(id) = self.id {
            if id < 1 {
                return Err(TravelValidationError::InvalidId(id));
            }
        }
        self.fields.validate()
    }
}

/// One persisted travel entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelRecord {
    pub id: TravelId,
    pub city: String,
    pub country: String,
    pub year: i32,
    pub note: Option<String>,
}

impl TravelRecord {
    pub fn from_parts(id: TravelId, fields: TravelFields) -> Self {
        Self {
            id,
            city: fields.city,
            country: fields.country,
            year: fields.year,
            note: normalize_note(fields.note),
        }
    }

    /// Returns a copy of the editable content.
    pub fn fields(&self) -> TravelFields {
        TravelFields {
            city: self.city.clone(),
            country: self.country.clone(),
            year: self.year,
            note: self.note.clone(),
        }
    }

    /// Note text, or `placeholder` when the record has none.
    pub fn note_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.note.as_deref().unwrap_or(placeholder)
    }
}

/// Collapses empty notes to `None` so storage never holds `''`.
pub(crate) fn normalize_note(note: Option<String>) -> Option<String> {
    note.filter(|value| !value.is_empty())
}
