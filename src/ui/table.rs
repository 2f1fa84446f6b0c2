use crate::member::Member;
use crate::storage::StoreStats;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct MemberRow {
    #[tabled(rename = "Id")]
    pub id: i64,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Born")]
    pub born: String,
    #[tabled(rename = "Died")]
    pub died: String,
}

impl From<&Member> for MemberRow {
    fn from(member: &Member) -> Self {
        let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
        Self {
            id: member.id,
            name: member.to_string(),
            born: date(member.date_of_birth),
            died: date(member.date_of_death),
        }
    }
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: usize,
}

pub fn member_table(members: &[Member]) -> String {
    if members.is_empty() {
        return String::new();
    }
    let rows: Vec<MemberRow> = members.iter().map(MemberRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn stats_table(stats: &StoreStats) -> String {
    let rows = [
        StatRow { metric: "Members", value: stats.members },
        StatRow { metric: "Places", value: stats.places },
        StatRow { metric: "Countries", value: stats.countries },
    ];
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::parse_date;

    #[test]
    fn test_member_table_lists_members() {
        let members = vec![
            Member::new("Anna", "Berg")
                .with_id(1)
                .with_birth(Some(parse_date("1952-04-07").unwrap()), None),
            Member::new("Karl", "Berg").with_id(2),
        ];
        let table = member_table(&members);
        assert!(table.contains("Anna Berg"));
        assert!(table.contains("1952-04-07"));
        assert!(table.contains("Karl Berg"));
    }

    #[test]
    fn test_empty_member_table() {
        assert!(member_table(&[]).is_empty());
    }

    #[test]
    fn test_stats_table() {
        let stats = StoreStats {
            members: 4,
            places: 2,
            countries: 1,
        };
        let table = stats_table(&stats);
        assert!(table.contains("Members"));
        assert!(table.contains("Countries"));
    }
}
