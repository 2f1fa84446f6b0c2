//! Relationship resolver
//!
//! Derives relatives from the two parent links (and the partner link) stored on
//! each member. Every step is an explicit repository lookup, and the deepest
//! category (cousins) is three steps away, so malformed self-references cannot
//! make a derivation run away.
//!
//! Missing links at any level simply produce fewer results.

use std::collections::HashSet;
use crate::Result;
use crate::member::{Member, MemberId};
use crate::relation::Relation;
use crate::storage::MemberRepository;

/// Relatives of one category together with the label used when reporting them
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Relatives {
    pub members: Vec<Member>,
    pub label: &'static str,
}

impl Relatives {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Stateless relationship queries over a borrowed repository
pub struct RelationshipResolver<'a, R: MemberRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: MemberRepository + ?Sized> RelationshipResolver<'a, R> {
    /// Create a new resolver
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Father then mother, skipping links that are absent, dangling or point back at `member`
    pub fn parents(&self, member: &Member) -> Result<Vec<Member>> {
        let mut parents = Vec::with_capacity(2);
        for parent_id in [member.father_id, member.mother_id].into_iter().flatten() {
            if parent_id == member.id {
                continue;
            }
            if let Some(parent) = self.repo.get_by_id(parent_id)? {
                parents.push(parent);
            }
        }
        Ok(parents)
    }

    /// Members listing `member` as father or mother, each once
    pub fn children(&self, member: &Member) -> Result<Vec<Member>> {
        let mut seen = HashSet::new();
        Ok(self
            .repo
            .get_by_parent(member.id)?
            .into_iter()
            .filter(|child| seen.insert(child.id))
            .collect())
    }

    /// Everyone sharing at least one parent id with `member`, excluding `member`.
    ///
    /// No parent ids means no siblings.
    pub fn siblings(&self, member: &Member) -> Result<Vec<Member>> {
        let mut seen: HashSet<MemberId> = HashSet::from([member.id]);
        let mut siblings = Vec::new();
        for parent_id in [member.father_id, member.mother_id].into_iter().flatten() {
            for sibling in self.repo.get_by_parent(parent_id)? {
                if seen.insert(sibling.id) {
                    siblings.push(sibling);
                }
            }
        }
        Ok(siblings)
    }

    /// Siblings of each parent, concatenated (an aunt shared by both sides appears twice)
    pub fn aunts_and_uncles(&self, member: &Member) -> Result<Vec<Member>> {
        let mut aunts_and_uncles = Vec::new();
        for parent in self.parents(member)? {
            aunts_and_uncles.extend(self.siblings(&parent)?);
        }
        Ok(aunts_and_uncles)
    }

    /// Children of each aunt or uncle, concatenated
    pub fn cousins(&self, member: &Member) -> Result<Vec<Member>> {
        let mut cousins = Vec::new();
        for aunt_or_uncle in self.aunts_and_uncles(member)? {
            cousins.extend(self.children(&aunt_or_uncle)?);
        }
        Ok(cousins)
    }

    /// Father's parents then mother's parents
    pub fn grandparents(&self, member: &Member) -> Result<Vec<Member>> {
        let mut grandparents = Vec::new();
        for parent in self.parents(member)? {
            grandparents.extend(self.parents(&parent)?);
        }
        Ok(grandparents)
    }

    /// The member `partner_id` points at, if any. The reverse link is not consulted.
    pub fn partner(&self, member: &Member) -> Result<Option<Member>> {
        match member.partner_id {
            Some(partner_id) => self.repo.get_by_id(partner_id),
            None => Ok(None),
        }
    }

    /// Dispatch to one of the relation queries
    pub fn relatives_of(&self, member: &Member, relation: Relation) -> Result<Relatives> {
        let members = match relation {
            Relation::Parents => self.parents(member)?,
            Relation::Children => self.children(member)?,
            Relation::Partner => self.partner(member)?.into_iter().collect(),
            Relation::Siblings => self.siblings(member)?,
            Relation::Cousins => self.cousins(member)?,
            Relation::AuntsAndUncles => self.aunts_and_uncles(member)?,
            Relation::Grandparents => self.grandparents(member)?,
        };
        tracing::debug!("{} has {} {}", member, members.len(), relation.label());
        Ok(Relatives { members, label: relation.label() })
    }

    /// Like [`Self::relatives_of`] but from a category tag; an unknown tag
    /// gives an empty list with an empty label.
    pub fn relatives_by_tag(&self, member: &Member, tag: &str) -> Result<Relatives> {
        match tag.parse::<Relation>() {
            Ok(relation) => self.relatives_of(member, relation),
            Err(_) => Ok(Relatives::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SqliteStore};

    fn ids(members: &[Member]) -> Vec<MemberId> {
        members.iter().map(|m| m.id).collect()
    }

    fn sorted(mut ids: Vec<MemberId>) -> Vec<MemberId> {
        ids.sort();
        ids
    }

    /// Three generations:
    ///
    /// ```text
    ///   gf1 + gm1          gf2 + gm2
    ///       |                  |
    ///   +---+---+          +---+---+
    ///  dad     uncle      mum     aunt
    ///   \      |            /      |
    ///    +- me, sis -------+    cousin
    ///           uncle's kid: cousin2
    /// ```
    struct Family {
        gf1: MemberId,
        gm1: MemberId,
        gf2: MemberId,
        gm2: MemberId,
        dad: MemberId,
        uncle: MemberId,
        mum: MemberId,
        aunt: MemberId,
        me: MemberId,
        sis: MemberId,
        cousin: MemberId,
        cousin2: MemberId,
    }

    fn build_family<R: MemberRepository>(repo: &mut R) -> Family {
        let gf1 = repo.create(&Member::new("Gustav", "Berg")).unwrap();
        let gm1 = repo.create(&Member::new("Hilda", "Berg")).unwrap();
        let gf2 = repo.create(&Member::new("Oskar", "Lind")).unwrap();
        let gm2 = repo.create(&Member::new("Elsa", "Lind")).unwrap();
        let dad = repo.create(&Member::new("Nils", "Berg").with_father(gf1).with_mother(gm1)).unwrap();
        let uncle = repo.create(&Member::new("Olle", "Berg").with_father(gf1).with_mother(gm1)).unwrap();
        let mum = repo.create(&Member::new("Greta", "Berg").with_father(gf2).with_mother(gm2)).unwrap();
        let aunt = repo.create(&Member::new("Karin", "Lind").with_mother(gm2)).unwrap();
        let me = repo
            .create(&Member::new("Lars", "Berg").with_father(dad).with_mother(mum).with_partner(gf2))
            .unwrap();
        let sis = repo.create(&Member::new("Ulla", "Berg").with_father(dad).with_mother(mum)).unwrap();
        let cousin = repo.create(&Member::new("Maja", "Lind").with_mother(aunt)).unwrap();
        let cousin2 = repo.create(&Member::new("Erik", "Berg").with_father(uncle)).unwrap();
        Family { gf1, gm1, gf2, gm2, dad, uncle, mum, aunt, me, sis, cousin, cousin2 }
    }

    fn get<R: MemberRepository>(repo: &R, id: MemberId) -> Member {
        repo.get_by_id(id).unwrap().unwrap()
    }

    fn check_family<R: MemberRepository>(repo: &mut R) {
        let f = build_family(repo);
        let resolver = RelationshipResolver::new(&*repo);
        let me = get(repo, f.me);

        assert_eq!(ids(&resolver.parents(&me).unwrap()), vec![f.dad, f.mum]);
        assert_eq!(ids(&resolver.siblings(&me).unwrap()), vec![f.sis]);
        assert_eq!(
            ids(&resolver.grandparents(&me).unwrap()),
            vec![f.gf1, f.gm1, f.gf2, f.gm2]
        );
        assert_eq!(ids(&resolver.aunts_and_uncles(&me).unwrap()), vec![f.uncle, f.aunt]);
        assert_eq!(sorted(ids(&resolver.cousins(&me).unwrap())), sorted(vec![f.cousin, f.cousin2]));
        assert_eq!(resolver.partner(&me).unwrap().map(|p| p.id), Some(f.gf2));

        let dad = get(repo, f.dad);
        assert_eq!(ids(&resolver.children(&dad).unwrap()), vec![f.me, f.sis]);
        // The partner link is one-directional
        let gf2 = get(repo, f.gf2);
        assert!(resolver.partner(&gf2).unwrap().is_none());
    }

    #[test]
    fn test_family_sqlite() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        check_family(&mut store);
    }

    #[test]
    fn test_family_memory() {
        let mut store = MemoryStore::new();
        check_family(&mut store);
    }

    #[test]
    fn test_children_and_siblings_scenario() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let a = store.create(&Member::new("Anders", "Holm")).unwrap();
        let b = store.create(&Member::new("Britt", "Holm").with_father(a)).unwrap();
        let c = store.create(&Member::new("Carl", "Holm").with_father(a)).unwrap();

        let resolver = RelationshipResolver::new(&store);
        let a = get(&store, a);
        assert_eq!(sorted(ids(&resolver.children(&a).unwrap())), vec![b, c]);
        assert_eq!(ids(&resolver.siblings(&get(&store, b)).unwrap()), vec![c]);
    }

    #[test]
    fn test_no_parents_means_no_siblings() {
        let mut store = MemoryStore::new();
        let orphan = store.create(&Member::new("Ensam", "Person")).unwrap();
        store.create(&Member::new("Other", "Person")).unwrap();

        let resolver = RelationshipResolver::new(&store);
        let orphan = get(&store, orphan);
        assert!(resolver.siblings(&orphan).unwrap().is_empty());
        assert!(resolver.parents(&orphan).unwrap().is_empty());
        assert!(resolver.aunts_and_uncles(&orphan).unwrap().is_empty());
        assert!(resolver.cousins(&orphan).unwrap().is_empty());
        assert!(resolver.grandparents(&orphan).unwrap().is_empty());
    }

    #[test]
    fn test_grandparents_through_mother_only() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let gf = store.create(&Member::new("Olof", "Ek")).unwrap();
        let gm = store.create(&Member::new("Signe", "Ek")).unwrap();
        let mum = store.create(&Member::new("Ingrid", "Ek").with_father(gf).with_mother(gm)).unwrap();
        let kid = store.create(&Member::new("Tove", "Ek").with_mother(mum)).unwrap();

        let resolver = RelationshipResolver::new(&store);
        let grandparents = resolver.grandparents(&get(&store, kid)).unwrap();
        assert_eq!(ids(&grandparents), vec![gf, gm]);
    }

    #[test]
    fn test_dangling_and_self_links() {
        let mut store = MemoryStore::new();
        let odd = store.create(&Member::new("Self", "Ref")).unwrap();
        let mut member = get(&store, odd);
        member.father_id = Some(odd);
        member.mother_id = Some(9_999);
        member.partner_id = Some(9_998);
        store.update(&member).unwrap();

        let resolver = RelationshipResolver::new(&store);
        assert!(resolver.parents(&member).unwrap().is_empty());
        assert!(resolver.siblings(&member).unwrap().is_empty());
        assert!(resolver.partner(&member).unwrap().is_none());
        assert!(resolver.grandparents(&member).unwrap().is_empty());
        // Listed as its own child; the resolver reports it rather than guessing
        assert_eq!(ids(&resolver.children(&member).unwrap()), vec![odd]);
    }

    #[test]
    fn test_sibling_through_both_parents_counted_once() {
        let mut store = MemoryStore::new();
        let dad = store.create(&Member::new("Far", "Ek")).unwrap();
        let mum = store.create(&Member::new("Mor", "Ek")).unwrap();
        let me = store.create(&Member::new("Jag", "Ek").with_father(dad).with_mother(mum)).unwrap();
        let full = store.create(&Member::new("Hel", "Ek").with_father(dad).with_mother(mum)).unwrap();
        let half = store.create(&Member::new("Halv", "Ek").with_mother(mum)).unwrap();

        let resolver = RelationshipResolver::new(&store);
        assert_eq!(ids(&resolver.siblings(&get(&store, me)).unwrap()), vec![full, half]);
    }

    #[test]
    fn test_aunts_shared_by_both_parents_not_deduplicated() {
        let mut store = MemoryStore::new();
        let gm = store.create(&Member::new("Gammel", "Mor")).unwrap();
        let dad = store.create(&Member::new("Far", "Ek").with_mother(gm)).unwrap();
        let mum = store.create(&Member::new("Mor", "Ek").with_mother(gm)).unwrap();
        let aunt = store.create(&Member::new("Moster", "Ek").with_mother(gm)).unwrap();
        let me = store.create(&Member::new("Jag", "Ek").with_father(dad).with_mother(mum)).unwrap();
        let cousin = store.create(&Member::new("Kusin", "Ek").with_mother(aunt)).unwrap();

        let resolver = RelationshipResolver::new(&store);
        let me = get(&store, me);
        assert_eq!(ids(&resolver.aunts_and_uncles(&me).unwrap()), vec![mum, aunt, dad, aunt]);

        let expected: Vec<MemberId> = resolver
            .aunts_and_uncles(&me)
            .unwrap()
            .iter()
            .flat_map(|a| resolver.children(a).unwrap())
            .map(|m| m.id)
            .collect();
        let cousins = ids(&resolver.cousins(&me).unwrap());
        assert_eq!(cousins, expected);
        assert_eq!(cousins.iter().filter(|&&id| id == cousin).count(), 2);
    }

    #[test]
    fn test_relatives_dispatch() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let f = build_family(&mut store);
        let resolver = RelationshipResolver::new(&store);
        let me = get(&store, f.me);

        let aunts = resolver.relatives_of(&me, Relation::AuntsAndUncles).unwrap();
        assert_eq!(aunts.label, "aunts or uncles");
        assert_eq!(aunts.members.len(), 2);

        let partner = resolver.relatives_by_tag(&me, "partner").unwrap();
        assert_eq!(ids(&partner.members), vec![f.gf2]);

        let sis = get(&store, f.sis);
        let no_partner = resolver.relatives_of(&sis, Relation::Partner).unwrap();
        assert!(no_partner.is_empty());
        assert_eq!(no_partner.label, "partner");

        let unknown = resolver.relatives_by_tag(&me, "second cousins").unwrap();
        assert!(unknown.is_empty());
        assert_eq!(unknown.label, "");
    }
}
