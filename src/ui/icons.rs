pub struct Icons;

impl Icons {
    pub const TREE: &str = "🌳";
    pub const SEARCH: &str = "🔍";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const LINK: &str = "🔗";
    pub const PERSON: &str = "👤";
    pub const FAMILY: &str = "👪";
    pub const DEL: &str = "🗑️";
    pub const BIRTH: &str = "🍼";
    pub const DEATH: &str = "✝";
    pub const EMPTY: &str = "∅";
}
