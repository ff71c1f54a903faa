// ABOUTME: Terminal implementations of the client's notifier and navigator
// ABOUTME: Notices and navigation requests are printed to stderr

use colored::Colorize;
use jpom_client::{Navigation, Navigator, Notice, Notifier, Severity};
use std::time::Duration;

pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let label = match notice.severity {
            Severity::Info => "info".cyan(),
            Severity::Success => "ok".green(),
            Severity::Warning => "warning".yellow(),
            Severity::Error => "error".red(),
        };
        eprintln!("{} {}: {}", label.bold(), notice.title, notice.description);
    }
}

/// There is no page to move in a terminal; tell the user what to do instead.
/// The process usually exits before any delay would run out, so it is ignored.
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, target: Navigation, _after: Duration) {
        eprintln!("{}", navigation_hint(&target).dimmed());
    }
}

pub fn navigation_hint(target: &Navigation) -> String {
    match target {
        Navigation::Login { path } => format!(
            "Session ended. Log in at {path} and store the new token with `jpom-admin session set <token>`."
        ),
        Navigation::Forbidden { path } => {
            format!("This address is not allowed to use the server ({path}).")
        }
        Navigation::Reload => "Session renewed. Run the command again.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_hints() {
        assert!(navigation_hint(&Navigation::Login {
            path: "/login".to_string()
        })
        .contains("session set"));
        assert!(navigation_hint(&Navigation::Forbidden {
            path: "/prohibit-access".to_string()
        })
        .contains("/prohibit-access"));
        assert!(navigation_hint(&Navigation::Reload).contains("again"));
    }
}
