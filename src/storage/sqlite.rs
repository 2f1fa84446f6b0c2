//! SQLite storage implementation

use std::path::Path;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use crate::{Error, Result};
use crate::member::{Member, MemberField, MemberId};
use crate::place::{CountryId, Place, PlaceId, PlaceSeed, ResolvedPlace};
use super::{validate_place, MemberRepository, NameQuery, schema};

/// SQLite-backed storage for the family tree
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        register_functions(&conn)?;
        let store = Self { conn };
        store.initialize_schema()?;
        tracing::debug!("Opened family tree database at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        register_functions(&conn)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Run a member SELECT with the given WHERE/ORDER clause
    fn query_members<P: rusqlite::Params>(&self, clause: &str, params: P) -> Result<Vec<Member>> {
        let sql = format!("SELECT {} FROM members {}", schema::MEMBER_COLUMNS, clause);
        let mut stmt = self.conn.prepare(&sql)?;
        let members = stmt
            .query_map(params, row_to_member)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(members)
    }

    fn count(&self, table: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl MemberRepository for SqliteStore {
    fn create(&mut self, member: &Member) -> Result<MemberId> {
        member.validate()?;
        self.conn.execute(
            r#"
            INSERT INTO members (first_name, last_name, date_of_birth, place_of_birth_id,
                                 date_of_death, place_of_death_id, partner_id, father_id, mother_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                &member.first_name,
                &member.last_name,
                member.date_of_birth,
                member.place_of_birth_id,
                member.date_of_death,
                member.place_of_death_id,
                member.partner_id,
                member.father_id,
                member.mother_id,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!("Created member {} ({})", id, member);
        Ok(id)
    }

    fn get_by_id(&self, id: MemberId) -> Result<Option<Member>> {
        let sql = format!("SELECT {} FROM members WHERE id = ?1", schema::MEMBER_COLUMNS);
        self.conn
            .query_row(&sql, [id], row_to_member)
            .optional()
            .map_err(Into::into)
    }

    fn get_by_name(&self, query: &str) -> Result<Vec<Member>> {
        match NameQuery::parse(query) {
            NameQuery::Empty => Ok(Vec::new()),
            NameQuery::Either(token) => self.query_members(
                "WHERE instr(fold_case(first_name), ?1) > 0 OR instr(fold_case(last_name), ?1) > 0 ORDER BY id",
                [token],
            ),
            NameQuery::Full { first, last } => self.query_members(
                "WHERE instr(fold_case(first_name), ?1) > 0 AND instr(fold_case(last_name), ?2) > 0 ORDER BY id",
                [first, last],
            ),
        }
    }

    fn get_by_parent(&self, parent_id: MemberId) -> Result<Vec<Member>> {
        self.query_members("WHERE father_id = ?1 OR mother_id = ?1 ORDER BY id", [parent_id])
    }

    fn get_all(&self, missing: Option<MemberField>) -> Result<Vec<Member>> {
        match missing {
            Some(field) => {
                let clause = format!("WHERE {} IS NULL ORDER BY id", field.column());
                self.query_members(&clause, [])
            }
            None => self.query_members("ORDER BY id", []),
        }
    }

    fn update(&mut self, member: &Member) -> Result<()> {
        member.validate()?;
        let changed = self.conn.execute(
            r#"
            UPDATE members SET first_name = ?1, last_name = ?2, date_of_birth = ?3,
                place_of_birth_id = ?4, date_of_death = ?5, place_of_death_id = ?6,
                partner_id = ?7, father_id = ?8, mother_id = ?9
            WHERE id = ?10
            "#,
            params![
                &member.first_name,
                &member.last_name,
                member.date_of_birth,
                member.place_of_birth_id,
                member.date_of_death,
                member.place_of_death_id,
                member.partner_id,
                member.father_id,
                member.mother_id,
                member.id,
            ],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(member.id));
        }
        tracing::debug!("Updated member {} ({})", member.id, member);
        Ok(())
    }

    fn delete(&mut self, id: MemberId) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM members WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(Error::NotFound(id));
        }
        tracing::debug!("Deleted member {}", id);
        Ok(())
    }

    fn clear_references(&mut self, id: MemberId) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let touched: i64 = tx.query_row(
            "SELECT COUNT(*) FROM members WHERE partner_id = ?1 OR father_id = ?1 OR mother_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        for column in ["partner_id", "father_id", "mother_id"] {
            tx.execute(
                &format!("UPDATE members SET {column} = NULL WHERE {column} = ?1"),
                [id],
            )?;
        }
        tx.commit()?;
        Ok(touched as usize)
    }

    fn resolve_place(&self, place_id: Option<PlaceId>) -> Result<ResolvedPlace> {
        let Some(place_id) = place_id else {
            return Ok(ResolvedPlace::default());
        };
        let resolved = self
            .conn
            .query_row(
                r#"
                SELECT p.name, c.name FROM places p
                JOIN countries c ON c.id = p.country_id
                WHERE p.id = ?1
                "#,
                [place_id],
                |row| Ok(ResolvedPlace::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        if resolved.is_none() {
            tracing::debug!("Place {} is referenced but not stored", place_id);
        }
        Ok(resolved.unwrap_or_default())
    }

    fn resolve_or_create_place(&mut self, name: &str, country: &str) -> Result<PlaceId> {
        let (name, country) = validate_place(name, country)?;
        let existing: Option<PlaceId> = self
            .conn
            .query_row(
                "SELECT id FROM places WHERE fold_case(name) = ?1 ORDER BY id LIMIT 1",
                [name.to_lowercase()],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        let tx = self.conn.transaction()?;
        let country_id = find_or_create_country(&tx, country)?;
        tx.execute(
            "INSERT INTO places (name, country_id) VALUES (?1, ?2)",
            params![name, country_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        tracing::debug!("Created place {} ({}, {})", id, name, country);
        Ok(id)
    }

    fn find_places(&self, query: &str) -> Result<Vec<Place>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            "SELECT id, name, country_id FROM places WHERE instr(fold_case(name), ?1) > 0 ORDER BY name, id",
        )?;
        let places = stmt
            .query_map([query], |row| {
                Ok(Place {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    country_id: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(places)
    }

    fn bulk_load(&mut self, members: &[Member], places: &[PlaceSeed]) -> Result<()> {
        for member in members {
            member.validate()?;
        }

        let tx = self.conn.transaction()?;
        for place in places {
            let (name, country) = validate_place(&place.name, &place.country)?;
            let country_id = find_or_create_country(&tx, country)?;
            tx.execute(
                "INSERT INTO places (id, name, country_id) VALUES (?1, ?2, ?3)",
                params![place.id, name, country_id],
            )
            .map_err(|e| duplicate_id(e, "place", place.id))?;
        }
        for member in members {
            tx.execute(
                &format!(
                    "INSERT INTO members ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    schema::MEMBER_COLUMNS
                ),
                params![
                    member.id,
                    &member.first_name,
                    &member.last_name,
                    member.date_of_birth,
                    member.place_of_birth_id,
                    member.date_of_death,
                    member.place_of_death_id,
                    member.partner_id,
                    member.father_id,
                    member.mother_id,
                ],
            )
            .map_err(|e| duplicate_id(e, "member", member.id))?;
        }
        tx.commit()?;
        tracing::info!("Loaded {} members and {} places", members.len(), places.len());
        Ok(())
    }

    fn count_members(&self) -> Result<usize> {
        self.count("members")
    }

    fn count_places(&self) -> Result<usize> {
        self.count("places")
    }

    fn count_countries(&self) -> Result<usize> {
        self.count("countries")
    }
}

/// Helper to convert a row to a Member
fn row_to_member(row: &rusqlite::Row) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        date_of_birth: row.get(3)?,
        place_of_birth_id: row.get(4)?,
        date_of_death: row.get(5)?,
        place_of_death_id: row.get(6)?,
        partner_id: row.get(7)?,
        father_id: row.get(8)?,
        mother_id: row.get(9)?,
    })
}

fn find_or_create_country(conn: &Connection, name: &str) -> rusqlite::Result<CountryId> {
    let existing: Option<CountryId> = conn
        .query_row(
            "SELECT id FROM countries WHERE fold_case(name) = ?1 ORDER BY id LIMIT 1",
            [name.to_lowercase()],
            |row| row.get(0),
        )
        .optional()?;
    match existing {
        Some(id) => Ok(id),
        None => {
            conn.execute("INSERT INTO countries (name) VALUES (?1)", [name])?;
            Ok(conn.last_insert_rowid())
        }
    }
}

/// Register `fold_case(text)`, a Unicode lower-casing used for every
/// case-insensitive comparison. SQLite's own `LIKE` and `NOCASE` fold ASCII only.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|text| text.to_lowercase())),
    )
}

fn duplicate_id(err: rusqlite::Error, what: &str, id: i64) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(ref e, _) if e.code == ErrorCode::ConstraintViolation => {
            Error::Validation(format!("duplicate {} id {} in bulk load", what, id))
        }
        other => Error::Storage(other),
    }
}
