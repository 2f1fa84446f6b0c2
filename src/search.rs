//! Member search filters
//!
//! Name and missing-field searches go straight to the repository; the rest
//! filter the full member list, which is small for a single family.

use chrono::NaiveDate;
use crate::Result;
use crate::member::{Member, MemberField};
use crate::storage::MemberRepository;

/// Condition a member search is run with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberFilter {
    All,
    Name(String),
    Missing(MemberField),
    Alive,
    Deceased,
    /// ISO date prefix: `1952`, `1952-04` or `1952-04-07`
    BornOn(String),
    /// Members with a known birth date aged `min..=max` on `on`
    AgeRange { min: i32, max: i32, on: NaiveDate },
}

impl MemberFilter {
    /// Run the search, results ordered by id
    pub fn apply<R: MemberRepository + ?Sized>(&self, repo: &R) -> Result<Vec<Member>> {
        let members = match self {
            MemberFilter::All => repo.get_all(None)?,
            MemberFilter::Name(query) => repo.get_by_name(query)?,
            MemberFilter::Missing(field) => repo.get_all(Some(*field))?,
            other => {
                let mut members = repo.get_all(None)?;
                members.retain(|m| other.matches(m));
                members
            }
        };
        tracing::debug!("{:?} matched {} members", self, members.len());
        Ok(members)
    }

    /// Whether a single member satisfies the filter
    pub fn matches(&self, member: &Member) -> bool {
        match self {
            MemberFilter::All => true,
            MemberFilter::Name(query) => crate::storage::NameQuery::parse(query).matches(member),
            MemberFilter::Missing(field) => field.is_missing(member),
            MemberFilter::Alive => !member.is_deceased(),
            MemberFilter::Deceased => member.is_deceased(),
            MemberFilter::BornOn(prefix) => {
                let prefix = prefix.trim();
                !prefix.is_empty()
                    && member
                        .date_of_birth
                        .is_some_and(|born| born.format("%Y-%m-%d").to_string().starts_with(prefix))
            }
            MemberFilter::AgeRange { min, max, on } => member
                .age_on(*on)
                .is_some_and(|age| (*min..=*max).contains(&age)),
        }
    }
}
