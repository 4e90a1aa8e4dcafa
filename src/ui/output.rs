//! Human-facing terminal lines. Everything except errors honours quiet mode.

use crate::output::is_quiet;
use crate::ui::Icons;
use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;

static COLORED: OnceLock<bool> = OnceLock::new();

/// Colored when stdout is a terminal and colors are not disabled (`NO_COLOR`)
fn colored() -> bool {
    *COLORED.get_or_init(|| console::Term::stdout().is_term() && console::colors_enabled())
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Header,
    Success,
    Failure,
    Caution,
    Label,
    Muted,
}

impl Tone {
    fn style(self, colored: bool) -> Style {
        if !colored {
            return Style::new();
        }
        match self {
            Tone::Header => Style::new().cyan().bold(),
            Tone::Success => Style::new().green().bold(),
            Tone::Failure => Style::new().red().bold(),
            Tone::Caution => Style::new().yellow().bold(),
            Tone::Label => Style::new().magenta(),
            Tone::Muted => Style::new().white().dimmed(),
        }
    }

    fn paint(self, text: &str) -> String {
        text.style(self.style(colored())).to_string()
    }
}

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::ROCKET, Tone::Header.paint(text));
}

pub fn listening(addr: &str) {
    if is_quiet() {
        return;
    }
    println!("{} Server running at http://{}", Icons::GLOBE, Tone::Success.paint(addr));
}

pub fn info(label: &str, value: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}: {}", Tone::Label.paint(Icons::INFO), Tone::Muted.paint(label), value);
}

pub fn success(label: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::CHECK, Tone::Success.paint(label));
}

pub fn warn(label: &str) {
    if is_quiet() {
        return;
    }
    eprintln!("{} {}", Icons::WARN, Tone::Caution.paint(label));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, Tone::Failure.paint(label));
}
