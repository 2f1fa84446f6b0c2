//! Family operations spanning several repository calls
//!
//! - Find-or-create linking: look a person up by name, then act on a choice the
//!   caller made (pick an existing member, create a bare one, or skip)
//! - Cascade delete: remove a member and clear every link pointing at it
//! - Symmetric partner linking
//! - Seeding from a bulk-load document

use crate::member::{capitalize, Member, MemberId};
use crate::place::PlaceSeed;
use crate::storage::MemberRepository;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Existing members matching a name, offered to the caller before linking.
///
/// A non-empty list means the person may already be recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkCandidates {
    pub name: String,
    pub candidates: Vec<Member>,
}

impl LinkCandidates {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The single candidate, when the name is unambiguous
    pub fn unique(&self) -> Option<&Member> {
        match self.candidates.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Choice for callers that cannot ask: the single match, or `CreateNew`
    /// (`Skip` unless `create_missing`) when nobody matches. `None` when
    /// several members match.
    ///
    /// Reads nothing and writes nothing, so every link of a new member can be
    /// decided before any of them is created.
    pub fn automatic_choice(&self, create_missing: bool) -> Result<Option<LinkChoice>> {
        if let Some(only) = self.unique() {
            return Ok(Some(LinkChoice::Existing(only.id)));
        }
        if !self.is_empty() {
            return Ok(None);
        }
        if !create_missing {
            return Ok(Some(LinkChoice::Skip));
        }
        bare_member(&self.name)?;
        Ok(Some(LinkChoice::CreateNew))
    }
}

/// What to link to, decided by the caller after seeing the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChoice {
    /// Use this existing member
    Existing(MemberId),
    /// Create a bare member from the searched name
    CreateNew,
    /// Leave the link unset
    Skip,
}

/// Phase one: members whose name matches, sorted by first name
pub fn link_candidates<R: MemberRepository + ?Sized>(repo: &R, name: &str) -> Result<LinkCandidates> {
    let mut candidates = repo.get_by_name(name)?;
    candidates.sort_by(|a, b| a.first_name.cmp(&b.first_name).then(a.id.cmp(&b.id)));
    Ok(LinkCandidates { name: name.trim().to_string(), candidates })
}

/// Phase two: turn the caller's choice into the id to store on the link
pub fn resolve_link<R: MemberRepository + ?Sized>(
    repo: &mut R,
    name: &str,
    choice: LinkChoice,
) -> Result<Option<MemberId>> {
    match choice {
        LinkChoice::Existing(id) => {
            if repo.get_by_id(id)?.is_none() {
                return Err(Error::NotFound(id));
            }
            Ok(Some(id))
        }
        LinkChoice::CreateNew => {
            let member = bare_member(name)?;
            let id = repo.create(&member)?;
            tracing::info!("Created {} (id {}) while linking", member, id);
            Ok(Some(id))
        }
        LinkChoice::Skip => Ok(None),
    }
}

/// Bare member from a "First Last" string: first token is the first name, the rest the last name
fn bare_member(name: &str) -> Result<Member> {
    let mut tokens = name.split_whitespace();
    let first = tokens.next().unwrap_or_default();
    let last = tokens.collect::<Vec<_>>().join(" ");
    if last.is_empty() {
        return Err(Error::Validation(format!(
            "'{}' needs both a first and a last name",
            name.trim()
        )));
    }
    let member = Member::new(capitalize(first), capitalize(&last));
    member.validate()?;
    Ok(member)
}

/// Outcome of [`remove_member`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub deleted: Member,
    /// Members whose partner, father or mother link was cleared
    pub cleared: usize,
}

/// Delete a member, then clear every partner/father/mother link that pointed at it
pub fn remove_member<R: MemberRepository + ?Sized>(repo: &mut R, id: MemberId) -> Result<CascadeReport> {
    let deleted = repo.get_by_id(id)?.ok_or(Error::NotFound(id))?;
    repo.delete(id)?;
    let cleared = repo.clear_references(id)?;
    tracing::info!("Deleted {} (id {}), cleared links on {} members", deleted, id, cleared);
    Ok(CascadeReport { deleted, cleared })
}

/// Point `a` and `b` at each other as partners.
///
/// A previous partner of either side keeps its own forward link; only `a` and
/// `b` are rewritten.
pub fn link_partners<R: MemberRepository + ?Sized>(repo: &mut R, a: MemberId, b: MemberId) -> Result<()> {
    if a == b {
        return Err(Error::Validation(format!("member {} cannot be their own partner", a)));
    }
    let mut first = repo.get_by_id(a)?.ok_or(Error::NotFound(a))?;
    let mut second = repo.get_by_id(b)?.ok_or(Error::NotFound(b))?;
    first.partner_id = Some(b);
    second.partner_id = Some(a);
    repo.update(&first)?;
    repo.update(&second)?;
    tracing::debug!("Linked {} and {} as partners", first, second);
    Ok(())
}

/// Bulk-load document: places first, then members, all with explicit ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub places: Vec<PlaceSeed>,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Seed {
    /// Parse a JSON seed document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON seed document from disk
    pub fn read(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

/// Apply a seed document to the repository
pub fn seed<R: MemberRepository + ?Sized>(repo: &mut R, seed: &Seed) -> Result<()> {
    repo.bulk_load(&seed.members, &seed.places)
}
