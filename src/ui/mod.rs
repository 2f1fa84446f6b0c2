pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    error, header, info, member_line, or_unknown, relatives, section, success, summary_row, warn,
};
pub use table::{member_table, stats_table, MemberRow};
pub use theme::{theme, Theme};
