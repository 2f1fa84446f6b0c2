//! Member record - one person in the family tree
//!
//! A member carries its own details plus three direct links:
//! - `father_id` / `mother_id`: the two parent links every derived relative is built from
//! - `partner_id`: a forward link, not required to be mirrored on the partner

use crate::place::PlaceId;
use crate::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifier assigned to a member by the repository
pub type MemberId = i64;

/// Longest first or last name the schema accepts
pub const MAX_NAME_LEN: usize = 50;

/// Optional member fields that a "missing data" search can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberField {
    DateOfBirth,
    PlaceOfBirth,
    DateOfDeath,
    PlaceOfDeath,
    Partner,
    Father,
    Mother,
}

impl MemberField {
    /// Get the string representation of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberField::DateOfBirth => "date_of_birth",
            MemberField::PlaceOfBirth => "place_of_birth",
            MemberField::DateOfDeath => "date_of_death",
            MemberField::PlaceOfDeath => "place_of_death",
            MemberField::Partner => "partner",
            MemberField::Father => "father",
            MemberField::Mother => "mother",
        }
    }

    /// Storage column backing this field
    pub fn column(&self) -> &'static str {
        match self {
            MemberField::DateOfBirth => "date_of_birth",
            MemberField::PlaceOfBirth => "place_of_birth_id",
            MemberField::DateOfDeath => "date_of_death",
            MemberField::PlaceOfDeath => "place_of_death_id",
            MemberField::Partner => "partner_id",
            MemberField::Father => "father_id",
            MemberField::Mother => "mother_id",
        }
    }

    /// Get all fields
    pub fn all() -> &'static [MemberField] {
        &[
            MemberField::DateOfBirth,
            MemberField::PlaceOfBirth,
            MemberField::DateOfDeath,
            MemberField::PlaceOfDeath,
            MemberField::Partner,
            MemberField::Father,
            MemberField::Mother,
        ]
    }

    /// Whether `member` has no value for this field
    pub fn is_missing(&self, member: &Member) -> bool {
        match self {
            MemberField::DateOfBirth => member.date_of_birth.is_none(),
            MemberField::PlaceOfBirth => member.place_of_birth_id.is_none(),
            MemberField::DateOfDeath => member.date_of_death.is_none(),
            MemberField::PlaceOfDeath => member.place_of_death_id.is_none(),
            MemberField::Partner => member.partner_id.is_none(),
            MemberField::Father => member.father_id.is_none(),
            MemberField::Mother => member.mother_id.is_none(),
        }
    }
}

impl FromStr for MemberField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "date_of_birth" | "birth_date" | "dob" | "born" => Ok(MemberField::DateOfBirth),
            "place_of_birth" | "birth_place" | "birthplace" => Ok(MemberField::PlaceOfBirth),
            "date_of_death" | "death_date" | "died" => Ok(MemberField::DateOfDeath),
            "place_of_death" | "death_place" => Ok(MemberField::PlaceOfDeath),
            "partner" | "spouse" => Ok(MemberField::Partner),
            "father" | "dad" => Ok(MemberField::Father),
            "mother" | "mom" | "mum" => Ok(MemberField::Mother),
            _ => Err(Error::Validation(format!("Unknown member field: {}", s))),
        }
    }
}

impl std::fmt::Display for MemberField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A person in the family tree.
///
/// Only the parent and partner links are stored; every other relationship is
/// derived by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Repository-assigned identifier (0 until created)
    #[serde(default)]
    pub id: MemberId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub place_of_birth_id: Option<PlaceId>,
    #[serde(default)]
    pub date_of_death: Option<NaiveDate>,
    #[serde(default)]
    pub place_of_death_id: Option<PlaceId>,
    #[serde(default)]
    pub partner_id: Option<MemberId>,
    #[serde(default)]
    pub father_id: Option<MemberId>,
    #[serde(default)]
    pub mother_id: Option<MemberId>,
}

impl Member {
    /// Create a bare member with only a name
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: 0, // Set by repository
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth: None,
            place_of_birth_id: None,
            date_of_death: None,
            place_of_death_id: None,
            partner_id: None,
            father_id: None,
            mother_id: None,
        }
    }

    /// Set an explicit id (bulk loading only; `create` ignores it)
    pub fn with_id(mut self, id: MemberId) -> Self {
        self.id = id;
        self
    }

    pub fn with_birth(mut self, date: Option<NaiveDate>, place: Option<PlaceId>) -> Self {
        self.date_of_birth = date;
        self.place_of_birth_id = place;
        self
    }

    pub fn with_death(mut self, date: Option<NaiveDate>, place: Option<PlaceId>) -> Self {
        self.date_of_death = date;
        self.place_of_death_id = place;
        self
    }

    pub fn with_father(mut self, father_id: MemberId) -> Self {
        self.father_id = Some(father_id);
        self
    }

    pub fn with_mother(mut self, mother_id: MemberId) -> Self {
        self.mother_id = Some(mother_id);
        self
    }

    pub fn with_partner(mut self, partner_id: MemberId) -> Self {
        self.partner_id = Some(partner_id);
        self
    }

    /// A member with a recorded date or place of death is deceased
    pub fn is_deceased(&self) -> bool {
        self.date_of_death.is_some() || self.place_of_death_id.is_some()
    }

    /// Age in whole years on `on`, if the birth date is known
    pub fn age_on(&self, on: NaiveDate) -> Option<i32> {
        let born = self.date_of_birth?;
        let mut age = on.year() - born.year();
        if (on.month(), on.day()) < (born.month(), born.day()) {
            age -= 1;
        }
        Some(age)
    }

    /// Whether any of the three direct links points at `id`
    pub fn references(&self, id: MemberId) -> bool {
        self.partner_id == Some(id) || self.father_id == Some(id) || self.mother_id == Some(id)
    }

    /// Clear every direct link pointing at `id`. Returns true if anything changed.
    pub fn clear_links_to(&mut self, id: MemberId) -> bool {
        let mut changed = false;
        for link in [&mut self.partner_id, &mut self.father_id, &mut self.mother_id] {
            if *link == Some(id) {
                *link = None;
                changed = true;
            }
        }
        changed
    }

    /// Check the record before it is written
    pub fn validate(&self) -> Result<()> {
        validate_name("first name", &self.first_name)?;
        validate_name("last name", &self.last_name)?;
        if let (Some(born), Some(died)) = (self.date_of_birth, self.date_of_death) {
            if died < born {
                return Err(Error::Validation(format!(
                    "{} has a date of death ({}) before the date of birth ({})",
                    self, died, born
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

fn validate_name(label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} must not be empty", label)));
    }
    if value.trim() != value {
        return Err(Error::Validation(format!(
            "{} '{}' has leading or trailing whitespace",
            label, value
        )));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(Error::Validation(format!(
            "{} must be at most {} characters",
            label, MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| Error::Validation(format!("Malformed date '{}': {}", input, e)))
}

/// Upper-case the first letter of a name, leaving the rest untouched
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
