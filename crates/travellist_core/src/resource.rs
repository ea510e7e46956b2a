//! URI-style addressing over the travel store.
//!
//! # Responsibility
//! - Parse collection (`travels`) and item (`travels/{id}`) addresses.
//! - Parse projection and ordering clauses into typed query values.
//! - Route `query/insert/update/delete` requests to the store facade.
//!
//! # Invariants
//! - Caller text is parsed into enums before any storage call; unknown
//!   columns or malformed clauses fail with `InvalidRequest`.
//! - Inserts target the collection; updates and deletes target one item.
//! - Record ids are immutable through this interface.

use crate::model::travel::{NewTravel, TravelFields, TravelId};
use crate::repo::query::{Column, ProjectedRow, Projection, SortDirection, TravelOrder};
use crate::repo::travel_table::{
    ProjectedRows, StoreError, StoreResult, TravelCursor, TravelTable,
};
use crate::service::travel_store::TravelStore;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

/// Collection segment used by every travel address.
pub const COLLECTION: &str = "travels";

static URI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:content://[A-Za-z0-9._-]+/)?travels(?:/([0-9]+))?/?$")
        .expect("valid travel uri regex")
});
static ORDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*([a-z_]+)(?:\s+(asc|desc))?\s*$").expect("valid order clause regex")
});

/// Address of the whole collection or of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceUri {
    Collection,
    Item(TravelId),
}

impl ResourceUri {
    /// Parses `travels` or `travels/{id}`, optionally behind a
    /// `content://<authority>/` prefix.
    pub fn parse(text: &str) -> StoreResult<Self> {
        let trimmed = text.trim();
        let captures = URI_RE
            .captures(trimmed)
            .ok_or_else(|| invalid(format!("unknown resource `{trimmed}`")))?;

        match captures.get(1) {
            None => Ok(Self::Collection),
            Some(raw_id) => {
                let id = raw_id
                    .as_str()
                    .parse::<TravelId>()
                    .map_err(|_| invalid(format!("travel id `{}` is out of range", raw_id.as_str())))?;
                if id < 1 {
                    return Err(invalid(format!("travel id must be positive, got {id}")));
                }
                Ok(Self::Item(id))
            }
        }
    }

    pub fn item_id(self) -> Option<TravelId> {
        match self {
            Self::Collection => None,
            Self::Item(id) => Some(id),
        }
    }
}

impl Display for ResourceUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection => f.write_str(COLLECTION),
            Self::Item(id) => write!(f, "{COLLECTION}/{id}"),
        }
    }
}

/// Parses a comma-separated column list. `None`, blank or `*` selects every
/// column. `_id` is accepted as an alias for `id`.
pub fn parse_projection(text: Option<&str>) -> StoreResult<Projection> {
    let Some(text) = text.map(str::trim).filter(|value| !value.is_empty() && *value != "*") else {
        return Ok(Projection::all());
    };

    let mut columns = Vec::new();
    for name in text.split(',') {
        columns.push(parse_column(name.trim())?);
    }
    Ok(Projection::of(&columns))
}

/// Parses `"<column> [ASC|DESC]"`. `None` or blank yields `year DESC`.
pub fn parse_order(text: Option<&str>) -> StoreResult<TravelOrder> {
    let Some(text) = text.filter(|value| !value.trim().is_empty()) else {
        return Ok(TravelOrder::default());
    };

    let captures = ORDER_RE
        .captures(text)
        .ok_or_else(|| invalid(format!("malformed order clause `{text}`")))?;
    let column = parse_column(&captures[1])?;
    let direction = match captures.get(2) {
        Some(value) if value.as_str().eq_ignore_ascii_case("desc") => SortDirection::Desc,
        _ => SortDirection::Asc,
    };
    Ok(TravelOrder::new(column, direction))
}

fn parse_column(name: &str) -> StoreResult<Column> {
    if name.eq_ignore_ascii_case("_id") {
        return Ok(Column::Id);
    }
    Column::from_name(name).ok_or_else(|| invalid(format!("unknown column `{name}`")))
}

/// Column values for insert and update requests. Absent fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TravelValues {
    pub id: Option<TravelId>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub year: Option<i32>,
    /// `Some("")` clears the note on update.
    pub note: Option<String>,
}

impl TravelValues {
    /// Values carrying every editable field.
    pub fn from_fields(fields: TravelFields) -> Self {
        Self {
            id: None,
            city: Some(fields.city),
            country: Some(fields.country),
            year: Some(fields.year),
            note: fields.note,
        }
    }

    fn into_new_travel(self) -> StoreResult<NewTravel> {
        let city = self.city.ok_or_else(|| missing(Column::City))?;
        let country = self.country.ok_or_else(|| missing(Column::Country))?;
        let year = self.year.ok_or_else(|| missing(Column::Year))?;
        let mut fields = TravelFields::new(city, country, year);
        if let Some(note) = self.note {
            fields = fields.with_note(note);
        }
        Ok(NewTravel {
            id: self.id,
            fields,
        })
    }

    fn merge_into(self, mut fields: TravelFields) -> TravelFields {
        if let Some(city) = self.city {
            fields.city = city;
        }
        if let Some(country) = self.country {
            fields.country = country;
        }
        if let Some(year) = self.year {
            fields.year = year;
        }
        if let Some(note) = self.note {
            fields = fields.with_note(note);
        }
        fields
    }
}

/// Query result: a cursor plus the projection its rows are restricted to.
///
/// Dropping the result set (or calling [`ResultSet::close`]) releases the
/// underlying statement.
pub struct ResultSet<'conn> {
    cursor: TravelCursor<'conn>,
    projection: Projection,
}

impl ResultSet<'_> {
    /// Executes the query and iterates projected rows.
    pub fn rows(&mut self) -> StoreResult<ProjectedRows<'_, '_>> {
        self.cursor.rows(&self.projection)
    }

    /// Executes the query and collects every projected row.
    pub fn collect_rows(&mut self) -> StoreResult<Vec<ProjectedRow>> {
        self.rows()?.collect()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn close(self) {
        self.cursor.close();
    }
}

/// Routes URI-addressed requests to a [`TravelStore`].
pub struct TravelResolver<T: TravelTable> {
    store: TravelStore<T>,
}

impl<T: TravelTable> TravelResolver<T> {
    pub fn new(store: TravelStore<T>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TravelStore<T> {
        &self.store
    }

    /// Queries the collection or one item.
    ///
    /// `order` is ignored for item addresses, which yield at most one row.
    pub fn query(
        &self,
        uri: &str,
        projection: Option<&str>,
        order: Option<&str>,
    ) -> StoreResult<ResultSet<'_>> {
        let uri = ResourceUri::parse(uri)?;
        let projection = parse_projection(projection)?;
        let cursor = match uri {
            ResourceUri::Collection => self.store.query(parse_order(order)?)?,
            ResourceUri::Item(id) => self.store.query_item(id)?,
        };
        Ok(ResultSet { cursor, projection })
    }

    /// Inserts into the collection and returns the new item address.
    pub fn insert(&self, uri: &str, values: TravelValues) -> StoreResult<ResourceUri> {
        match ResourceUri::parse(uri)? {
            ResourceUri::Collection => {
                let request = values.into_new_travel()?;
                let id = self.store.insert(&request)?;
                Ok(ResourceUri::Item(id))
            }
            ResourceUri::Item(_) => Err(invalid(format!(
                "insert must target `{COLLECTION}`, got `{uri}`"
            ))),
        }
    }

    /// Merges `values` over the stored record and writes the result.
    pub fn update(&self, uri: &str, values: TravelValues) -> StoreResult<()> {
        let id = require_item(uri, "update")?;
        if let Some(value_id) = values.id {
            if value_id != id {
                return Err(invalid(format!(
                    "travel ids are immutable: cannot change {id} to {value_id}"
                )));
            }
        }

        self.store
            .edit(id, |current| values.merge_into(current))
            .map(|_| ())
    }

    /// Deletes one item. Missing items are not an error.
    pub fn delete(&self, uri: &str) -> StoreResult<()> {
        let id = require_item(uri, "delete")?;
        self.store.delete(id)
    }
}

fn require_item(uri: &str, operation: &str) -> StoreResult<TravelId> {
    ResourceUri::parse(uri)?.item_id().ok_or_else(|| {
        invalid(format!(
            "{operation} must target `{COLLECTION}/{{id}}`, got `{uri}`"
        ))
    })
}

fn missing(column: Column) -> StoreError {
    invalid(format!("missing required column `{column}`"))
}

fn invalid(message: String) -> StoreError {
    StoreError::InvalidRequest(message)
}
