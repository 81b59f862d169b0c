//! Shared CLI output helpers.
//!
//! On a GitHub Actions runner (`GITHUB_ACTIONS=true`) errors, warnings and
//! groups are emitted as workflow commands so they show up as annotations and
//! collapsible sections. Elsewhere they are plain coloured lines.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success
//! - Red: errors
//! - Yellow: warnings
//! - Cyan: hints, names
//! - Dimmed: secondary info

use std::fmt::Display;

use console::style;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn on_runner() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// Escape a message for a workflow command.
fn escape(msg: &str) -> String {
    msg.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Print a success message with checkmark.
///
/// Example: `✓ version d4e9 created`
pub fn success(msg: &str) {
    if colors_enabled() {
        println!("{} {}", style("✓").green(), msg);
    } else {
        println!("✓ {}", msg);
    }
}

/// Print an error to stderr, or an `::error::` annotation on a runner.
pub fn error(msg: &str) {
    if on_runner() {
        println!("::error::{}", escape(msg));
    } else if colors_enabled() {
        eprintln!("{} {}", style("✗").red(), msg);
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// Print a warning, or a `::warning::` annotation on a runner.
pub fn warn(msg: &str) {
    if on_runner() {
        println!("::warning::{}", escape(msg));
    } else if colors_enabled() {
        println!("{} {}", style("⚠").yellow(), msg);
    } else {
        println!("⚠ {}", msg);
    }
}

/// Print a hint message.
///
/// Example: `→ provide a bucket for archives over 3.5 MiB`
pub fn hint(msg: &str) {
    if colors_enabled() {
        println!("{} {}", style("→").cyan(), style(msg).cyan());
    } else {
        println!("→ {}", msg);
    }
}

/// Print a key-value pair (label dimmed, value bold).
pub fn kv(label: &str, value: impl Display) {
    if colors_enabled() {
        println!("  {}  {}", style(label).dim(), style(value).bold());
    } else {
        println!("  {}  {}", label, value);
    }
}

/// Print a dimmed line.
pub fn dimmed(msg: &str) {
    if colors_enabled() {
        println!("{}", style(msg).dim());
    } else {
        println!("{}", msg);
    }
}

/// Format a name in cyan for inline use.
pub fn name(n: &str) -> String {
    if colors_enabled() {
        style(n).cyan().to_string()
    } else {
        n.to_string()
    }
}

/// Open a collapsible section. Close it with [`end_group`].
pub fn group(title: &str) {
    if on_runner() {
        println!("::group::{}", title);
    } else if colors_enabled() {
        println!("{}", style(title).bold());
    } else {
        println!("{}", title);
    }
}

pub fn end_group() {
    if on_runner() {
        println!("::endgroup::");
    }
}

/// Mask a value in runner logs.
pub fn mask(value: &str) {
    if on_runner() && !value.is_empty() {
        println!("::add-mask::{}", escape(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a\nb"), "a%0Ab");
        assert_eq!(escape("100%"), "100%25");
        assert_eq!(escape("plain"), "plain");
    }
}
