use crate::member::Member;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    if theme().quiet {
        return;
    }
    println!("{} {}", Icons::TREE, text.style(theme().title));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().ok));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().failure));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().caution));
}

pub fn info(label: &str, value: &str) {
    println!("{} {}: {}", Icons::INFO, label.style(theme().label), value);
}

pub fn section(title: &str) {
    if theme().quiet {
        return;
    }
    println!();
    println!("━{}━", title.style(theme().title));
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().label), value);
}

/// Value for a detail row, or a highlighted "Unknown" when absent
pub fn or_unknown(value: Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "Unknown".style(theme().unknown).to_string(),
    }
}

pub fn member_line(member: &Member) -> String {
    format!("{} {}", format!("#{}", member.id).style(theme().label), member)
}

/// Print one relative category, with an explicit marker when it is empty
pub fn relatives(label: &str, members: &[Member]) {
    section(&format!(" {} {} ", Icons::FAMILY, label));
    if members.is_empty() {
        println!("  {} {}", Icons::EMPTY, format!("No {label} recorded").style(theme().label));
        return;
    }
    for member in members {
        println!("  {} {}", Icons::PERSON, member_line(member));
    }
}
