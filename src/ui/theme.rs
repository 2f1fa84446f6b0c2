use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Terminal styles for the family tree CLI
#[derive(Debug, Clone)]
pub struct Theme {
    pub title: Style,
    pub ok: Style,
    pub failure: Style,
    pub caution: Style,
    /// Row labels and member ids
    pub label: Style,
    /// "Unknown" placeholders for missing dates, places and relatives
    pub unknown: Style,
    /// Headers and section rules are skipped when set (`GENEALOGY_QUIET=1`)
    pub quiet: bool,
}

impl Theme {
    pub fn detect() -> Self {
        let quiet = quiet_requested(std::env::var("GENEALOGY_QUIET").ok().as_deref());
        Self::new(console::colors_enabled(), quiet)
    }

    pub fn new(colored: bool, quiet: bool) -> Self {
        let pick = |style: Style| if colored { style } else { Style::new() };
        Self {
            title: pick(Style::new().green().bold()),
            ok: pick(Style::new().green()),
            failure: pick(Style::new().red().bold()),
            caution: pick(Style::new().yellow()),
            label: pick(Style::new().bright_black()),
            unknown: pick(Style::new().red().italic()),
            quiet,
        }
    }
}

fn quiet_requested(value: Option<&str>) -> bool {
    value.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
