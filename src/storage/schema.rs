//! Database schema definitions

/// SQL to create the members table
///
/// `AUTOINCREMENT` keeps SQLite from handing out the id of a deleted member again.
pub const CREATE_MEMBERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS members (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    date_of_birth TEXT,
    place_of_birth_id INTEGER REFERENCES places(id),
    date_of_death TEXT,
    place_of_death_id INTEGER REFERENCES places(id),
    partner_id INTEGER,
    father_id INTEGER,
    mother_id INTEGER
)
"#;

/// SQL to create the places table
pub const CREATE_PLACES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS places (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    country_id INTEGER NOT NULL REFERENCES countries(id)
)
"#;

/// SQL to create the countries table
pub const CREATE_COUNTRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS countries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_members_father ON members(father_id)",
    "CREATE INDEX IF NOT EXISTS idx_members_mother ON members(mother_id)",
    "CREATE INDEX IF NOT EXISTS idx_members_partner ON members(partner_id)",
    "CREATE INDEX IF NOT EXISTS idx_members_last_name ON members(last_name)",
    "CREATE INDEX IF NOT EXISTS idx_places_name ON places(name)",
];

/// Columns selected for every member row, in `row_to_member` order
pub const MEMBER_COLUMNS: &str = "id, first_name, last_name, date_of_birth, place_of_birth_id, \
     date_of_death, place_of_death_id, partner_id, father_id, mother_id";

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_COUNTRIES_TABLE,
        CREATE_PLACES_TABLE,
        CREATE_MEMBERS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
