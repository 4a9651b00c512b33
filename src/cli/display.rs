// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Terminal output for the quarry CLI.
//!
//! OneDark on dark terminals, One Light on light ones. The theme comes from
//! `QUARRY_THEME` when set, then the `COLORFGBG` background hint, then dark.
//! `NO_COLOR` and non-TTY stdout switch styling off entirely, so piped output
//! is plain text.

use chrono::{DateTime, Utc};
use quarry::{Diagnostics, ExecutedBy, ItemKind};
use std::sync::OnceLock;

/// Inner width of a box, between the two vertical borders.
pub const BOX_WIDTH: usize = 78;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

static THEME: OnceLock<Theme> = OnceLock::new();

fn detect_theme() -> Theme {
    if let Ok(theme) = std::env::var("QUARRY_THEME") {
        match theme.to_lowercase().as_str() {
            "light" | "l" => return Theme::Light,
            "dark" | "d" => return Theme::Dark,
            _ => {}
        }
    }

    // "fg;bg"; background 7 and 9..=15 are the light ones
    if let Ok(colorfgbg) = std::env::var("COLORFGBG") {
        if let Some(Ok(bg)) = colorfgbg.split(';').next_back().map(str::parse::<u8>) {
            if bg >= 7 && bg != 8 {
                return Theme::Light;
            }
        }
    }

    Theme::Dark
}

pub fn theme() -> Theme {
    *THEME.get_or_init(detect_theme)
}

fn rgb((r, g, b): (u8, u8, u8)) -> String {
    format!("\x1b[38;2;{};{};{}m", r, g, b)
}

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

mod onedark {
    pub const RED: (u8, u8, u8) = (224, 108, 117);
    pub const GREEN: (u8, u8, u8) = (152, 195, 121);
    pub const YELLOW: (u8, u8, u8) = (229, 192, 123);
    pub const BLUE: (u8, u8, u8) = (97, 175, 239);
    pub const MAGENTA: (u8, u8, u8) = (198, 120, 221);
    pub const CYAN: (u8, u8, u8) = (86, 182, 194);
    pub const GRAY: (u8, u8, u8) = (92, 99, 112);
}

mod onelight {
    pub const RED: (u8, u8, u8) = (228, 86, 73);
    pub const GREEN: (u8, u8, u8) = (80, 161, 79);
    pub const YELLOW: (u8, u8, u8) = (193, 132, 1);
    pub const BLUE: (u8, u8, u8) = (64, 120, 242);
    pub const MAGENTA: (u8, u8, u8) = (166, 38, 164);
    pub const CYAN: (u8, u8, u8) = (1, 132, 188);
    pub const GRAY: (u8, u8, u8) = (160, 161, 167);
}

macro_rules! theme_color {
    ($name:ident) => {
        #[allow(non_snake_case)]
        pub fn $name() -> String {
            rgb(match theme() {
                Theme::Dark => onedark::$name,
                Theme::Light => onelight::$name,
            })
        }
    };
}

theme_color!(RED);
theme_color!(GREEN);
theme_color!(YELLOW);
theme_color!(BLUE);
theme_color!(MAGENTA);
theme_color!(CYAN);
theme_color!(GRAY);

pub fn use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    atty::is(atty::Stream::Stdout)
}

/// Theme color plus modifiers, or plain text when colors are off.
pub fn themed(color_fn: fn() -> String, modifiers: &[&str], text: &str) -> String {
    if use_colors() {
        format!("{}{}{}{}", modifiers.join(""), color_fn(), text, RESET)
    } else {
        text.to_string()
    }
}

/// Length in characters, ignoring ANSI escapes.
pub fn visible_len(s: &str) -> usize {
    let mut in_escape = false;
    let mut len = 0;
    for c in s.chars() {
        if c == '\x1b' {
            in_escape = true;
        } else if in_escape && c == 'm' {
            in_escape = false;
        } else if !in_escape {
            len += 1;
        }
    }
    len
}

pub fn pad_right(s: &str, width: usize) -> String {
    let visible = visible_len(s);
    if visible >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visible))
    }
}

/// Cut plain text to `max` characters, marking the cut with `…`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

// Box drawing

fn border(text: &str) -> String {
    if use_colors() {
        format!("{}{}{}", GRAY(), text, RESET)
    } else {
        text.to_string()
    }
}

/// `│ content        │`
pub fn row(content: &str) {
    let pad = BOX_WIDTH.saturating_sub(visible_len(content) + 1);
    println!("{} {}{}{}", border("│"), content, " ".repeat(pad), border("│"));
}

fn labelled_rule(left: &str, label: &str, right: &str) {
    let label_part = format!("─ {} ", themed(CYAN, &[BOLD], label));
    let remaining = BOX_WIDTH.saturating_sub(visible_len(&label_part));
    println!(
        "{}{}{}",
        border(left),
        label_part,
        border(&format!("{}{}", "─".repeat(remaining), right))
    );
}

/// `┌─ LABEL ──────┐`
pub fn section_top(label: &str) {
    labelled_rule("┌", label, "┐");
}

/// `├─ LABEL ──────┤`
pub fn section_mid(label: &str) {
    labelled_rule("├", label, "┤");
}

/// `└──────────────┘`
pub fn section_bot() {
    println!("{}", border(&format!("└{}┘", "─".repeat(BOX_WIDTH))));
}

// Domain formatters

pub fn kind_badge(kind: ItemKind) -> String {
    let label = match kind {
        ItemKind::Post => "POST",
        ItemKind::Comment => "CMNT",
    };
    if !use_colors() {
        return format!("[{}]", label);
    }
    let color = match kind {
        ItemKind::Post => BLUE(),
        ItemKind::Comment => MAGENTA(),
    };
    format!("{}[{}]{}", color, label, RESET)
}

/// `YYYY-MM-DD` in UTC, or `?` for timestamps chrono cannot represent.
pub fn posted_date(posted_at_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(posted_at_ms)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// Item score, green when positive and red when negative.
pub fn score_value(score: i64) -> String {
    let text = format!("{:>5}", score);
    match score {
        s if s > 0 => themed(GREEN, &[], &text),
        s if s < 0 => themed(RED, &[], &text),
        _ => themed(GRAY, &[], &text),
    }
}

/// Milliseconds against the query budget: green well inside, yellow close,
/// red at or past it.
pub fn timing_ms(elapsed_ms: u64, budget_ms: u64) -> String {
    let text = format!("{} ms", elapsed_ms);
    if elapsed_ms * 2 < budget_ms {
        themed(GREEN, &[], &text)
    } else if elapsed_ms < budget_ms {
        themed(YELLOW, &[], &text)
    } else {
        themed(RED, &[BOLD], &text)
    }
}

pub fn executed_by_label(executed_by: ExecutedBy) -> String {
    match executed_by {
        ExecutedBy::Background => themed(CYAN, &[], "background"),
        ExecutedBy::Local => themed(YELLOW, &[], "local"),
    }
}

/// Status flags worth calling out, in a fixed order.
pub fn diagnostic_flags(diagnostics: &Diagnostics) -> Vec<String> {
    let mut flags = Vec::new();
    if !diagnostics.parse_valid {
        flags.push(themed(RED, &[BOLD], "invalid query"));
    }
    if diagnostics.partial {
        flags.push(themed(YELLOW, &[BOLD], "partial"));
    }
    if diagnostics.stale_rerun {
        flags.push(themed(YELLOW, &[], "stale rerun"));
    }
    if diagnostics.regex_downgraded {
        flags.push(themed(YELLOW, &[], "regex downgraded"));
    }
    flags
}

pub fn warning(message: &str) -> String {
    format!("{} {}", themed(YELLOW, &[BOLD], "!"), themed(YELLOW, &[DIM], message))
}
