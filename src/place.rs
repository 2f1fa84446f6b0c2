//! Place and country reference data
//!
//! Members refer to places by id; places refer to countries by id. Neither is
//! touched by the relationship engine beyond lookups.

use serde::{Deserialize, Serialize};

/// Identifier of a place
pub type PlaceId = i64;

/// Identifier of a country
pub type CountryId = i64;

/// A named location within a country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub country_id: CountryId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
}

/// Place record used for bootstrapping, with an explicit id and the country by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceSeed {
    pub id: PlaceId,
    pub name: String,
    pub country: String,
}

impl PlaceSeed {
    pub fn new(id: PlaceId, name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            country: country.into(),
        }
    }
}

/// Place and country names for display; both empty when the reference is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPlace {
    pub place: String,
    pub country: String,
}

impl ResolvedPlace {
    pub fn new(place: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            place: place.into(),
            country: country.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.place.is_empty() && self.country.is_empty()
    }
}

impl std::fmt::Display for ResolvedPlace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        write!(f, "{}, {}", self.place, self.country)
    }
}
