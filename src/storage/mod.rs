//! Storage Layer - the member repository contract and its backends
//!
//! The [`MemberRepository`] trait is the only boundary between the family tree
//! logic and storage. Backends:
//! - [`SqliteStore`]: members(...), places(id, name, country_id), countries(id, name)
//! - [`MemoryStore`]: ordered maps, no persistence

pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::member::{Member, MemberField, MemberId};
use crate::place::{Place, PlaceId, PlaceSeed, ResolvedPlace};
use crate::{Error, Result};

/// Contract every storage backend implements.
///
/// Reads never fail because nothing matched: they return `None` or an empty
/// vector. Writes addressing a missing member fail with [`crate::Error::NotFound`].
/// Backend failures surface as [`crate::Error::Storage`] and are not
/// reinterpreted by callers.
pub trait MemberRepository {
    /// Insert a new member, ignoring `member.id`, and return the assigned id.
    ///
    /// Fields are stored as given. Names with surrounding whitespace fail
    /// validation rather than being trimmed.
    fn create(&mut self, member: &Member) -> Result<MemberId>;

    fn get_by_id(&self, id: MemberId) -> Result<Option<Member>>;

    /// Case-insensitive substring search, see [`NameQuery`] for how the query is split
    fn get_by_name(&self, query: &str) -> Result<Vec<Member>>;

    /// Members whose father or mother is `parent_id`, ordered by id
    fn get_by_parent(&self, parent_id: MemberId) -> Result<Vec<Member>>;

    /// All members ordered by id, optionally only those missing `missing`
    fn get_all(&self, missing: Option<MemberField>) -> Result<Vec<Member>>;

    /// Overwrite every mutable field of the member with `member.id`
    fn update(&mut self, member: &Member) -> Result<()>;

    /// Remove a member. Links on other members are left dangling; see
    /// [`crate::family::remove_member`] for the cascade.
    fn delete(&mut self, id: MemberId) -> Result<()>;

    /// Clear `partner_id`, `father_id` and `mother_id` on every member that
    /// points at `id`. Returns the number of members changed.
    fn clear_references(&mut self, id: MemberId) -> Result<usize> {
        let mut cleared = 0;
        for mut member in self.get_all(None)? {
            if member.clear_links_to(id) {
                self.update(&member)?;
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    /// Place and country names, empty when `place_id` is absent or dangling
    fn resolve_place(&self, place_id: Option<PlaceId>) -> Result<ResolvedPlace>;

    /// Id of the place called `name`, creating the place (and its country) if needed
    fn resolve_or_create_place(&mut self, name: &str, country: &str) -> Result<PlaceId>;

    /// Places whose name contains `query`, case-insensitively
    fn find_places(&self, query: &str) -> Result<Vec<Place>>;

    /// Load an initial data set, preserving the explicit ids
    fn bulk_load(&mut self, members: &[Member], places: &[PlaceSeed]) -> Result<()>;

    fn count_members(&self) -> Result<usize>;

    fn count_places(&self) -> Result<usize>;

    fn count_countries(&self) -> Result<usize>;

    /// Get store statistics
    fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            members: self.count_members()?,
            places: self.count_places()?,
            countries: self.count_countries()?,
        })
    }
}

/// A parsed name query.
///
/// Two or more whitespace-separated tokens: the first must occur in the first
/// name and the second in the last name. One token: it must occur in either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameQuery {
    Empty,
    Either(String),
    Full { first: String, last: String },
}

impl NameQuery {
    pub fn parse(query: &str) -> Self {
        let mut tokens = query.split_whitespace().map(str::to_lowercase);
        match (tokens.next(), tokens.next()) {
            (None, _) => NameQuery::Empty,
            (Some(token), None) => NameQuery::Either(token),
            (Some(first), Some(last)) => NameQuery::Full { first, last },
        }
    }

    pub fn matches(&self, member: &Member) -> bool {
        let first_name = member.first_name.to_lowercase();
        let last_name = member.last_name.to_lowercase();
        match self {
            NameQuery::Empty => false,
            NameQuery::Either(token) => first_name.contains(token) || last_name.contains(token),
            NameQuery::Full { first, last } => first_name.contains(first) && last_name.contains(last),
        }
    }
}

/// Trimmed place and country names, both required
pub(crate) fn validate_place<'a>(name: &'a str, country: &'a str) -> Result<(&'a str, &'a str)> {
    let (name, country) = (name.trim(), country.trim());
    if name.is_empty() || country.is_empty() {
        return Err(Error::Validation("place and country names must not be empty".into()));
    }
    Ok((name, country))
}

/// Store statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StoreStats {
    pub members: usize,
    pub places: usize,
    pub countries: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Family Tree Statistics:")?;
        writeln!(f, "  Members: {}", self.members)?;
        writeln!(f, "  Places: {}", self.places)?;
        writeln!(f, "  Countries: {}", self.countries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_query_parse() {
        assert_eq!(NameQuery::parse("   "), NameQuery::Empty);
        assert_eq!(NameQuery::parse("Anna"), NameQuery::Either("anna".into()));
        assert_eq!(
            NameQuery::parse(" Anna  Svensson "),
            NameQuery::Full { first: "anna".into(), last: "svensson".into() }
        );
    }

    #[test]
    fn test_name_query_matches() {
        let anna = Member::new("Anna", "Svensson");
        assert!(NameQuery::parse("ann").matches(&anna));
        assert!(NameQuery::parse("SVENS").matches(&anna));
        assert!(NameQuery::parse("anna sven").matches(&anna));
        assert!(!NameQuery::parse("anna karl").matches(&anna));
        assert!(!NameQuery::parse("").matches(&anna));
    }

    fn check_non_ascii_case_folding<R: MemberRepository>(repo: &mut R) {
        let asa = repo.create(&Member::new("Åsa", "Öberg")).unwrap();
        repo.create(&Member::new("Örjan", "Ek")).unwrap();

        let ids = |found: Vec<Member>| found.iter().map(|m| m.id).collect::<Vec<_>>();
        assert_eq!(ids(repo.get_by_name("åsa öberg").unwrap()), vec![asa]);
        assert_eq!(ids(repo.get_by_name("ÖBERG").unwrap()), vec![asa]);
        assert_eq!(repo.get_by_name("ö").unwrap().len(), 2);

        let gothenburg = repo.resolve_or_create_place("Göteborg", "Sverige").unwrap();
        assert_eq!(repo.resolve_or_create_place("GÖTEBORG", "SVERIGE").unwrap(), gothenburg);
        repo.resolve_or_create_place("Älmhult", "SVERIGE").unwrap();
        assert_eq!(repo.count_places().unwrap(), 2);
        assert_eq!(repo.count_countries().unwrap(), 1);

        let found = repo.find_places("ÄLM").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Älmhult");
        assert!(repo.find_places("  ").unwrap().is_empty());
    }

    #[test]
    fn test_non_ascii_case_folding_sqlite() {
        check_non_ascii_case_folding(&mut SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_non_ascii_case_folding_memory() {
        check_non_ascii_case_folding(&mut MemoryStore::new());
    }

    fn check_duplicate_place_ids_in_batch<R: MemberRepository>(repo: &mut R) {
        let places = [PlaceSeed::new(1, "Oslo", "Norge"), PlaceSeed::new(1, "Bergen", "Norge")];
        assert!(matches!(repo.bulk_load(&[], &places), Err(Error::Validation(_))));
        assert!(repo.resolve_place(Some(1)).unwrap().is_empty());
        assert_eq!(repo.count_places().unwrap(), 0);
    }

    #[test]
    fn test_duplicate_place_ids_in_batch_sqlite() {
        check_duplicate_place_ids_in_batch(&mut SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_duplicate_place_ids_in_batch_memory() {
        check_duplicate_place_ids_in_batch(&mut MemoryStore::new());
    }

    fn check_names_stored_as_given<R: MemberRepository>(repo: &mut R) {
        assert!(matches!(repo.create(&Member::new(" Anna", "Berg")), Err(Error::Validation(_))));
        assert_eq!(repo.count_members().unwrap(), 0);

        let member = Member::new("Anna Lisa", "von Berg");
        let id = repo.create(&member).unwrap();
        assert_eq!(repo.get_by_id(id).unwrap().unwrap(), Member { id, ..member });
    }

    #[test]
    fn test_names_stored_as_given_sqlite() {
        check_names_stored_as_given(&mut SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn test_names_stored_as_given_memory() {
        check_names_stored_as_given(&mut MemoryStore::new());
    }
}
