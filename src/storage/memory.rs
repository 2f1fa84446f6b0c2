//! In-memory storage implementation
//!
//! Keeps everything in ordered maps so results come back in id order, the
//! same order the SQLite backend returns.

use std::collections::{BTreeMap, HashSet};
use crate::{Error, Result};
use crate::member::{Member, MemberField, MemberId};
use crate::place::{Country, CountryId, Place, PlaceId, PlaceSeed, ResolvedPlace};
use super::{validate_place, MemberRepository, NameQuery};

/// Map-backed family tree store with no persistence
#[derive(Debug, Default)]
pub struct MemoryStore {
    members: BTreeMap<MemberId, Member>,
    places: BTreeMap<PlaceId, Place>,
    countries: BTreeMap<CountryId, Country>,
    /// Highest id ever handed out or loaded, per table
    last_member_id: MemberId,
    last_place_id: PlaceId,
    last_country_id: CountryId,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn find_or_create_country(&mut self, name: &str) -> CountryId {
        let lower = name.to_lowercase();
        if let Some(country) = self.countries.values().find(|c| c.name.to_lowercase() == lower) {
            return country.id;
        }
        self.last_country_id += 1;
        let id = self.last_country_id;
        self.countries.insert(id, Country { id, name: name.to_string() });
        id
    }

    fn owned<'a>(members: impl Iterator<Item = &'a Member>) -> Vec<Member> {
        members.cloned().collect()
    }
}

impl MemberRepository for MemoryStore {
    fn create(&mut self, member: &Member) -> Result<MemberId> {
        member.validate()?;
        self.last_member_id += 1;
        let id = self.last_member_id;
        self.members.insert(id, Member { id, ..member.clone() });
        tracing::debug!("Created member {} ({})", id, member);
        Ok(id)
    }

    fn get_by_id(&self, id: MemberId) -> Result<Option<Member>> {
        Ok(self.members.get(&id).cloned())
    }

    fn get_by_name(&self, query: &str) -> Result<Vec<Member>> {
        let query = NameQuery::parse(query);
        Ok(Self::owned(self.members.values().filter(|m| query.matches(m))))
    }

    fn get_by_parent(&self, parent_id: MemberId) -> Result<Vec<Member>> {
        Ok(Self::owned(self.members.values().filter(|m| {
            m.father_id == Some(parent_id) || m.mother_id == Some(parent_id)
        })))
    }

    fn get_all(&self, missing: Option<MemberField>) -> Result<Vec<Member>> {
        Ok(Self::owned(
            self.members
                .values()
                .filter(|m| missing.is_none_or(|field| field.is_missing(m))),
        ))
    }

    fn update(&mut self, member: &Member) -> Result<()> {
        member.validate()?;
        let stored = self
            .members
            .get_mut(&member.id)
            .ok_or(Error::NotFound(member.id))?;
        *stored = member.clone();
        tracing::debug!("Updated member {} ({})", member.id, member);
        Ok(())
    }

    fn delete(&mut self, id: MemberId) -> Result<()> {
        self.members.remove(&id).ok_or(Error::NotFound(id))?;
        tracing::debug!("Deleted member {}", id);
        Ok(())
    }

    fn resolve_place(&self, place_id: Option<PlaceId>) -> Result<ResolvedPlace> {
        let resolved = place_id
            .and_then(|id| self.places.get(&id))
            .and_then(|place| {
                self.countries
                    .get(&place.country_id)
                    .map(|country| ResolvedPlace::new(place.name.clone(), country.name.clone()))
            });
        Ok(resolved.unwrap_or_default())
    }

    fn resolve_or_create_place(&mut self, name: &str, country: &str) -> Result<PlaceId> {
        let (name, country) = validate_place(name, country)?;
        let lower = name.to_lowercase();
        if let Some(place) = self.places.values().find(|p| p.name.to_lowercase() == lower) {
            return Ok(place.id);
        }
        let country_id = self.find_or_create_country(country);
        self.last_place_id += 1;
        let id = self.last_place_id;
        self.places.insert(id, Place { id, name: name.to_string(), country_id });
        Ok(id)
    }

    fn find_places(&self, query: &str) -> Result<Vec<Place>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let mut places: Vec<Place> = self
            .places
            .values()
            .filter(|p| p.name.to_lowercase().contains(&query))
            .cloned()
            .collect();
        places.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(places)
    }

    fn bulk_load(&mut self, members: &[Member], places: &[PlaceSeed]) -> Result<()> {
        let mut seen = HashSet::new();
        for member in members {
            member.validate()?;
            if self.members.contains_key(&member.id) || !seen.insert(member.id) {
                return Err(Error::Validation(format!("duplicate member id {} in bulk load", member.id)));
            }
        }
        let mut seen_places = HashSet::new();
        for place in places {
            validate_place(&place.name, &place.country)?;
            if self.places.contains_key(&place.id) || !seen_places.insert(place.id) {
                return Err(Error::Validation(format!("duplicate place id {} in bulk load", place.id)));
            }
        }

        for place in places {
            let country_id = self.find_or_create_country(place.country.trim());
            self.places.insert(
                place.id,
                Place { id: place.id, name: place.name.trim().to_string(), country_id },
            );
            self.last_place_id = self.last_place_id.max(place.id);
        }
        for member in members {
            self.members.insert(member.id, member.clone());
            self.last_member_id = self.last_member_id.max(member.id);
        }
        tracing::info!("Loaded {} members and {} places", members.len(), places.len());
        Ok(())
    }

    fn count_members(&self) -> Result<usize> {
        Ok(self.members.len())
    }

    fn count_places(&self) -> Result<usize> {
        Ok(self.places.len())
    }

    fn count_countries(&self) -> Result<usize> {
        Ok(self.countries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_crud() {
        let mut store = MemoryStore::new();
        let member = Member::new("Anna", "Svensson").with_father(3).with_id(50);
        let id = store.create(&member).unwrap();
        assert_eq!(id, 1);
        assert_eq!(store.get_by_id(id).unwrap().unwrap(), Member { id, ..member });

        let mut renamed = store.get_by_id(id).unwrap().unwrap();
        renamed.first_name = "Annika".into();
        store.update(&renamed).unwrap();
        assert_eq!(store.get_by_id(id).unwrap().unwrap().first_name, "Annika");

        store.delete(id).unwrap();
        assert!(store.get_by_id(id).unwrap().is_none());
        assert!(matches!(store.delete(id), Err(Error::NotFound(_))));
        assert!(matches!(store.update(&renamed), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_ids_not_reused() {
        let mut store = MemoryStore::new();
        store.bulk_load(&[Member::new("Seed", "Member").with_id(30)], &[]).unwrap();
        let next = store.create(&Member::new("New", "Member")).unwrap();
        assert_eq!(next, 31);
        store.delete(next).unwrap();
        assert_eq!(store.create(&Member::new("Later", "Member")).unwrap(), 32);
    }

    #[test]
    fn test_name_search_matches_sqlite_semantics() {
        let mut store = MemoryStore::new();
        store.create(&Member::new("Anna", "Svensson")).unwrap();
        store.create(&Member::new("Anna", "Karlsson")).unwrap();

        let found = store.get_by_name("anna svensson").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].last_name, "Svensson");
        assert_eq!(store.get_by_name("ANNA").unwrap().len(), 2);
    }

    #[test]
    fn test_default_clear_references() {
        let mut store = MemoryStore::new();
        let gone = store.create(&Member::new("Gone", "Member")).unwrap();
        let kid = store.create(&Member::new("Kid", "Member").with_mother(gone).with_partner(gone)).unwrap();
        store.delete(gone).unwrap();
        assert_eq!(store.clear_references(gone).unwrap(), 1);
        let kid = store.get_by_id(kid).unwrap().unwrap();
        assert_eq!((kid.mother_id, kid.partner_id), (None, None));
    }

    #[test]
    fn test_places_and_bulk_load() {
        let mut store = MemoryStore::new();
        store
            .bulk_load(&[], &[PlaceSeed::new(4, "Göteborg", "Sverige")])
            .unwrap();
        assert_eq!(store.resolve_or_create_place("göteborg", "Sverige").unwrap(), 4);
        let malmo = store.resolve_or_create_place("Malmö", "SVERIGE").unwrap();
        assert_eq!(malmo, 5);
        assert_eq!(store.count_countries().unwrap(), 1);
        assert_eq!(store.resolve_place(Some(malmo)).unwrap(), ResolvedPlace::new("Malmö", "Sverige"));
        assert!(store.bulk_load(&[], &[PlaceSeed::new(4, "Again", "Sverige")]).is_err());
    }
}
