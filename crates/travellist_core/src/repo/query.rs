//! Typed query vocabulary shared by the table, the store and the resolver.
//!
//! # Responsibility
//! - Name the columns callers may project and sort by.
//! - Carry projected rows without exposing raw SQLite rows.
//!
//! # Invariants
//! - SQL fragments are produced from enums only; caller text never reaches
//!   a statement.
//! - Every ordering ends with the insertion sequence so equal keys keep a
//!   stable order.

use crate::model::travel::{TravelId, TravelRecord};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Addressable column of a travel row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    City,
    Country,
    Year,
    Note,
}

impl Column {
    /// All columns in schema order.
    pub const ALL: [Column; 5] = [
        Column::Id,
        Column::City,
        Column::Country,
        Column::Year,
        Column::Note,
    ];

    /// Column name as exposed to callers and used in SQL.
    pub fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::City => "city",
            Self::Country => "country",
            Self::Year => "year",
            Self::Note => "note",
        }
    }

    /// Resolves a column name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|column| column.name().eq_ignore_ascii_case(name))
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Ordering for cursor queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TravelOrder {
    pub column: Column,
    pub direction: SortDirection,
}

impl TravelOrder {
    pub const fn new(column: Column, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Default listing order: most recent year first.
    pub const fn year_desc() -> Self {
        Self::new(Column::Year, SortDirection::Desc)
    }

    pub const fn year_asc() -> Self {
        Self::new(Column::Year, SortDirection::Asc)
    }

    pub(crate) fn sql_clause(&self) -> String {
        format!(
            "ORDER BY {} {}, seq ASC",
            self.column.name(),
            self.direction.sql()
        )
    }
}

impl Default for TravelOrder {
    fn default() -> Self {
        Self::year_desc()
    }
}

impl Display for TravelOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.column, self.direction.sql())
    }
}

/// Subset of columns a caller wants to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    columns: Vec<Column>,
}

impl Projection {
    /// Every column, in schema order.
    pub fn all() -> Self {
        Self {
            columns: Column::ALL.to_vec(),
        }
    }

    /// The given columns in caller order, duplicates dropped.
    pub fn of(columns: &[Column]) -> Self {
        let mut unique = Vec::with_capacity(columns.len());
        for column in columns {
            if !unique.contains(column) {
                unique.push(*column);
            }
        }
        Self { columns: unique }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn contains(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::all()
    }
}

/// Value read from one projected column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
    Integer(i64),
    Text(String),
    Null,
}

/// One cursor row restricted to a projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedRow {
    values: Vec<(Column, ColumnValue)>,
}

impl ProjectedRow {
    pub(crate) fn from_record(record: &TravelRecord, projection: &Projection) -> Self {
        let values = projection
            .columns()
            .iter()
            .map(|column| {
                let value = match column {
                    Column::Id => ColumnValue::Integer(record.id),
                    Column::City => ColumnValue::Text(record.city.clone()),
                    Column::Country => ColumnValue::Text(record.country.clone()),
                    Column::Year => ColumnValue::Integer(i64::from(record.year)),
                    Column::Note => match record.note.as_ref() {
                        Some(note) => ColumnValue::Text(note.clone()),
                        None => ColumnValue::Null,
                    },
                };
                (*column, value)
            })
            .collect();
        Self { values }
    }

    /// Returns `None` when the column was not projected.
    pub fn get(&self, column: Column) -> Option<&ColumnValue> {
        self.values
            .iter()
            .find(|(current, _)| *current == column)
            .map(|(_, value)| value)
    }

    pub fn get_i64(&self, column: Column) -> Option<i64> {
        match self.get(column)? {
            ColumnValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_str(&self, column: Column) -> Option<&str> {
        match self.get(column)? {
            ColumnValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<TravelId> {
        self.get_i64(Column::Id)
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.values.iter().map(|(column, _)| *column)
    }
}

impl Serialize for ProjectedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in &self.values {
            match value {
                ColumnValue::Integer(number) => map.serialize_entry(column.name(), number)?,
                ColumnValue::Text(text) => map.serialize_entry(column.name(), text)?,
                ColumnValue::Null => map.serialize_entry(column.name(), &Option::<()>::None)?,
            }
        }
        map.end()
    }
}
