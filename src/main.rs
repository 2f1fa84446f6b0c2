//! Genealogy CLI - record family members and query their relatives

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use genealogy::config::{self, GenealogyConfig};
use genealogy::family::{self, LinkChoice, Seed};
use genealogy::member::{capitalize, parse_date, Member, MemberField, MemberId};
use genealogy::storage::{MemberRepository, SqliteStore};
use genealogy::ui::{self, Icons};
use genealogy::{MemberFilter, Relation, RelationshipResolver};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "genealogy")]
#[command(version = "0.1.0")]
#[command(about = "Family tree records with relationship queries")]
#[command(long_about = r#"
Genealogy keeps a family tree in a local SQLite database and answers
questions about it:
  • Parents, children and partners
  • Siblings, cousins, aunts/uncles and grandparents
  • Members missing data, alive or deceased, born on a date, in an age range

Example usage:
  genealogy init
  genealogy add --first Eva --last Berg --born 1981-02-03 --father "Karl Berg"
  genealogy relatives --id 3 --kind cousins
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create an empty database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Load members and places from a JSON seed file
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Add a member; parent and partner names are matched against existing members
    Add {
        #[arg(long)]
        first: String,

        #[arg(long)]
        last: String,

        #[command(flatten)]
        life: LifeArgs,

        /// Father's full name
        #[arg(long)]
        father: Option<String>,

        /// Mother's full name
        #[arg(long)]
        mother: Option<String>,

        /// Partner's full name
        #[arg(long)]
        partner: Option<String>,

        /// Create bare members for parent/partner names that match nobody
        #[arg(long)]
        create_missing: bool,
    },

    /// Show a member with places and direct links resolved
    Show {
        #[arg(short, long)]
        id: MemberId,
    },

    /// Search members
    Search {
        /// Name or part of it; "first last" matches both names
        #[arg(short, long)]
        name: Option<String>,

        /// Members missing this field (date-of-birth, place-of-birth, partner, father, ...)
        #[arg(long)]
        missing: Option<MemberField>,

        #[arg(long, conflicts_with = "deceased")]
        alive: bool,

        #[arg(long)]
        deceased: bool,

        /// Birth date prefix: YYYY, YYYY-MM or YYYY-MM-DD
        #[arg(long)]
        born: Option<String>,

        #[arg(long, requires = "max_age")]
        min_age: Option<i32>,

        #[arg(long, requires = "min_age")]
        max_age: Option<i32>,

        /// Reference date for the age range (defaults to today)
        #[arg(long)]
        on: Option<String>,
    },

    /// List a member's relatives of one kind
    Relatives {
        #[arg(short, long)]
        id: MemberId,

        /// parents, children, partner, siblings, cousins, aunts-and-uncles, grandparents (or 1-7)
        #[arg(short, long)]
        kind: Relation,
    },

    /// Change fields of an existing member
    Update {
        #[arg(short, long)]
        id: MemberId,

        #[arg(long)]
        first: Option<String>,

        #[arg(long)]
        last: Option<String>,

        #[command(flatten)]
        life: LifeArgs,

        #[arg(long)]
        father: Option<MemberId>,

        #[arg(long)]
        mother: Option<MemberId>,

        #[arg(long)]
        partner: Option<MemberId>,

        /// Clear a field (repeatable)
        #[arg(long)]
        clear: Vec<MemberField>,
    },

    /// Delete a member and clear links pointing at it
    Delete {
        #[arg(short, long)]
        id: MemberId,
    },

    /// Record two members as partners
    Partner {
        #[arg(short, long)]
        id: MemberId,

        #[arg(short, long)]
        with: MemberId,

        /// Also point the second member back at the first
        #[arg(long)]
        symmetric: bool,
    },

    /// Search recorded places by name
    Places {
        #[arg(short, long)]
        name: String,
    },

    /// Show statistics about the family tree
    Stats,
}

#[derive(Args)]
struct LifeArgs {
    /// Date of birth, YYYY-MM-DD
    #[arg(long)]
    born: Option<String>,

    /// Place of birth as "Place, Country"
    #[arg(long)]
    born_in: Option<String>,

    /// Date of death, YYYY-MM-DD
    #[arg(long)]
    died: Option<String>,

    /// Place of death as "Place, Country"
    #[arg(long)]
    died_in: Option<String>,
}

impl LifeArgs {
    fn apply_dates(&self, member: &mut Member) -> anyhow::Result<()> {
        if let Some(born) = &self.born {
            member.date_of_birth = Some(parse_date(born)?);
        }
        if let Some(died) = &self.died {
            member.date_of_death = Some(parse_date(died)?);
        }
        Ok(())
    }

    /// Point `member` at the given places, creating them as needed
    fn apply_places(&self, store: &mut SqliteStore, member: &mut Member) -> anyhow::Result<()> {
        if let Some(place) = &self.born_in {
            member.place_of_birth_id = Some(place_id(store, place)?);
        }
        if let Some(place) = &self.died_in {
            member.place_of_death_id = Some(place_id(store, place)?);
        }
        Ok(())
    }
}

fn place_id(store: &mut SqliteStore, input: &str) -> anyhow::Result<i64> {
    let (place, country) = input
        .split_once(',')
        .with_context(|| format!("place '{}' must be given as \"Place, Country\"", input))?;
    Ok(store.resolve_or_create_place(place.trim(), country.trim())?)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli) {
        ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let settings = config::load_config(Some(&config_path))?.unwrap_or_default();
    let db_path = cli.database.clone().unwrap_or_else(|| settings.database_path());

    config::ensure_db_dir(&db_path)?;
    let mut store = SqliteStore::open(&db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;
    tracing::debug!("Using database {}", db_path.display());

    match cli.command {
        Commands::Init { force } => {
            let new_config = GenealogyConfig {
                database: Some(db_path.display().to_string()),
                symmetric_partners: settings.symmetric_partners,
            };
            config::write_config(&config_path, &new_config, force)?;
            ui::success(&format!("Initialized {}", config_path.display()));
            ui::info("Database", &db_path.display().to_string());
        }

        Commands::Import { file } => {
            let seed = Seed::read(&file).with_context(|| format!("reading {}", file.display()))?;
            family::seed(&mut store, &seed)?;
            ui::success(&format!(
                "Imported {} members and {} places from {}",
                seed.members.len(),
                seed.places.len(),
                file.display()
            ));
        }

        Commands::Add {
            first,
            last,
            life,
            father,
            mother,
            partner,
            create_missing,
        } => {
            let mut member = Member::new(first.trim(), last.trim());
            life.apply_dates(&mut member)?;
            member.validate()?;

            // Nothing is written until every name has been matched
            let father = plan_link(&store, father.as_deref(), create_missing)?;
            let mother = plan_link(&store, mother.as_deref(), create_missing)?;
            let partner = plan_link(&store, partner.as_deref(), create_missing)?;

            life.apply_places(&mut store, &mut member)?;
            member.father_id = apply_link(&mut store, father)?;
            member.mother_id = apply_link(&mut store, mother)?;
            member.partner_id = apply_link(&mut store, partner)?;

            let id = store.create(&member)?;
            if let (Some(partner_id), true) = (member.partner_id, settings.symmetric_partners) {
                family::link_partners(&mut store, id, partner_id)?;
            }
            let created = member.with_id(id);
            if cli.json {
                print_json(&created)?;
            } else {
                ui::success(&format!("Added {}", ui::member_line(&created)));
            }
        }

        Commands::Show { id } => {
            let member = store
                .get_by_id(id)?
                .ok_or(genealogy::Error::NotFound(id))?;
            let details = MemberDetails::load(&store, member)?;
            if cli.json {
                print_json(&details)?;
            } else {
                details.print();
            }
        }

        Commands::Search {
            name,
            missing,
            alive,
            deceased,
            born,
            min_age,
            max_age,
            on,
        } => {
            let filter = if let Some(name) = name {
                MemberFilter::Name(name)
            } else if let Some(field) = missing {
                MemberFilter::Missing(field)
            } else if alive {
                MemberFilter::Alive
            } else if deceased {
                MemberFilter::Deceased
            } else if let Some(prefix) = born {
                MemberFilter::BornOn(prefix)
            } else if let (Some(min), Some(max)) = (min_age, max_age) {
                let on = match on {
                    Some(date) => parse_date(&date)?,
                    None => chrono::Local::now().date_naive(),
                };
                MemberFilter::AgeRange { min, max, on }
            } else {
                MemberFilter::All
            };

            let members = filter.apply(&store)?;
            if cli.json {
                print_json(&members)?;
            } else if members.is_empty() {
                ui::warn("No members found");
            } else {
                ui::header(&format!("{} {} members", Icons::SEARCH, members.len()));
                println!("{}", ui::member_table(&members));
            }
        }

        Commands::Relatives { id, kind } => {
            let member = store
                .get_by_id(id)?
                .ok_or(genealogy::Error::NotFound(id))?;
            let relatives = RelationshipResolver::new(&store).relatives_of(&member, kind)?;
            if cli.json {
                print_json(&relatives)?;
            } else {
                ui::header(&format!("{} of {}", capitalize(relatives.label), member));
                ui::relatives(relatives.label, &relatives.members);
            }
        }

        Commands::Update {
            id,
            first,
            last,
            life,
            father,
            mother,
            partner,
            clear,
        } => {
            let mut member = store
                .get_by_id(id)?
                .ok_or(genealogy::Error::NotFound(id))?;
            if let Some(first) = first {
                member.first_name = first.trim().to_string();
            }
            if let Some(last) = last {
                member.last_name = last.trim().to_string();
            }
            life.apply_dates(&mut member)?;
            for (link, value) in [
                (&mut member.father_id, father),
                (&mut member.mother_id, mother),
                (&mut member.partner_id, partner),
            ] {
                if let Some(target) = value {
                    ensure_exists(&store, target)?;
                    *link = Some(target);
                }
            }
            for field in clear {
                clear_field(&mut member, field);
            }
            member.validate()?;
            life.apply_places(&mut store, &mut member)?;

            store.update(&member)?;
            if cli.json {
                print_json(&member)?;
            } else {
                ui::success(&format!("Updated {}", ui::member_line(&member)));
            }
        }

        Commands::Delete { id } => {
            let report = family::remove_member(&mut store, id)?;
            if cli.json {
                print_json(&report)?;
            } else {
                ui::success(&format!("{} Deleted {}", Icons::DEL, ui::member_line(&report.deleted)));
                ui::summary_row("Links cleared on", &format!("{} members", report.cleared));
            }
        }

        Commands::Partner { id, with, symmetric } => {
            if symmetric || settings.symmetric_partners {
                family::link_partners(&mut store, id, with)?;
            } else {
                if id == with {
                    anyhow::bail!("member {} cannot be their own partner", id);
                }
                ensure_exists(&store, with)?;
                let mut member = store
                    .get_by_id(id)?
                    .ok_or(genealogy::Error::NotFound(id))?;
                member.partner_id = Some(with);
                store.update(&member)?;
            }
            ui::success(&format!("{} Linked #{} with #{}", Icons::LINK, id, with));
        }

        Commands::Places { name } => {
            let places = store.find_places(&name)?;
            if cli.json {
                print_json(&places)?;
            } else if places.is_empty() {
                ui::warn(&format!("No places matching '{}'", name.trim()));
            } else {
                ui::header(&format!("{} {} places", Icons::SEARCH, places.len()));
                for place in &places {
                    let resolved = store.resolve_place(Some(place.id))?;
                    ui::summary_row(&format!("#{}", place.id), &resolved.to_string());
                }
            }
        }

        Commands::Stats => {
            let stats = store.stats()?;
            if cli.json {
                print_json(&stats)?;
            } else {
                ui::header(&format!("{} Family tree statistics", Icons::STATS));
                ui::info("Database", &db_path.display().to_string());
                println!("{}", ui::stats_table(&stats));
            }
        }
    }

    Ok(())
}

/// Decide a parent or partner link through the find-or-create flow, without writing.
///
/// A unique match is linked, several matches abort with the candidate list,
/// and no match either creates a bare member or leaves the link unset.
fn plan_link<'n>(
    store: &SqliteStore,
    name: Option<&'n str>,
    create_missing: bool,
) -> anyhow::Result<Option<(&'n str, LinkChoice)>> {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    let found = family::link_candidates(store, name)?;
    let Some(choice) = found.automatic_choice(create_missing)? else {
        let listed: Vec<String> = found.candidates.iter().map(ui::member_line).collect();
        anyhow::bail!(
            "'{}' matches several members, pass an id with `update` instead:\n  {}",
            found.name,
            listed.join("\n  ")
        );
    };
    if choice == LinkChoice::Skip {
        ui::warn(&format!("No member named '{}', link left empty", found.name));
    }
    Ok(Some((name, choice)))
}

fn apply_link(
    store: &mut SqliteStore,
    planned: Option<(&str, LinkChoice)>,
) -> anyhow::Result<Option<MemberId>> {
    match planned {
        Some((name, choice)) => Ok(family::resolve_link(store, name, choice)?),
        None => Ok(None),
    }
}

fn ensure_exists(store: &SqliteStore, id: MemberId) -> anyhow::Result<()> {
    if store.get_by_id(id)?.is_none() {
        return Err(genealogy::Error::NotFound(id).into());
    }
    Ok(())
}

fn clear_field(member: &mut Member, field: MemberField) {
    match field {
        MemberField::DateOfBirth => member.date_of_birth = None,
        MemberField::PlaceOfBirth => member.place_of_birth_id = None,
        MemberField::DateOfDeath => member.date_of_death = None,
        MemberField::PlaceOfDeath => member.place_of_death_id = None,
        MemberField::Partner => member.partner_id = None,
        MemberField::Father => member.father_id = None,
        MemberField::Mother => member.mother_id = None,
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A member with places and direct links resolved for display
#[derive(Serialize)]
struct MemberDetails {
    member: Member,
    birth_place: genealogy::ResolvedPlace,
    death_place: genealogy::ResolvedPlace,
    father: Option<Member>,
    mother: Option<Member>,
    partner: Option<Member>,
}

impl MemberDetails {
    fn load(store: &SqliteStore, member: Member) -> anyhow::Result<Self> {
        let lookup = |id: Option<MemberId>| -> anyhow::Result<Option<Member>> {
            Ok(match id {
                Some(id) => store.get_by_id(id)?,
                None => None,
            })
        };
        Ok(Self {
            birth_place: store.resolve_place(member.place_of_birth_id)?,
            death_place: store.resolve_place(member.place_of_death_id)?,
            father: lookup(member.father_id)?,
            mother: lookup(member.mother_id)?,
            partner: lookup(member.partner_id)?,
            member,
        })
    }

    fn print(&self) {
        let place = |p: &genealogy::ResolvedPlace| (!p.is_empty()).then(|| p.to_string());
        let name = |m: &Option<Member>| m.as_ref().map(|m| m.to_string());

        ui::header(&format!("{} {}", Icons::PERSON, self.member));
        ui::summary_row("Id:", &self.member.id.to_string());
        ui::section(&format!(" {} Birth ", Icons::BIRTH));
        ui::summary_row(
            "Date:",
            &ui::or_unknown(self.member.date_of_birth.map(|d| d.to_string())),
        );
        ui::summary_row("Place:", &ui::or_unknown(place(&self.birth_place)));
        if self.member.is_deceased() {
            ui::section(&format!(" {} Death ", Icons::DEATH));
            ui::summary_row(
                "Date:",
                &ui::or_unknown(self.member.date_of_death.map(|d| d.to_string())),
            );
            ui::summary_row("Place:", &ui::or_unknown(place(&self.death_place)));
        }
        ui::section(&format!(" {} Family ", Icons::FAMILY));
        ui::summary_row("Father:", &ui::or_unknown(name(&self.father)));
        ui::summary_row("Mother:", &ui::or_unknown(name(&self.mother)));
        ui::summary_row("Partner:", &ui::or_unknown(name(&self.partner)));
    }
}
