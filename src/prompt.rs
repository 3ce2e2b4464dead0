//! Operator interaction during login.

use std::io::{BufRead, Write};

/// Warning shown before persisting a token that the sealer cannot protect
/// beyond file permissions.
pub const UNPROTECTED_CACHE_WARNING: &str = "The token cache on this platform is protected by \
file permissions only, not encryption. Anyone who obtains the cache file (for example from a \
disk moved to another computer) can read the token. Enter 'yes' to continue, anything else to \
stop. (no/yes)";

/// Injected capability for talking to the operator during a login.
///
/// `show` surfaces the authority's device-code instructions; `confirm` asks
/// for explicit consent and returns whether the operator affirmed. All
/// blocking I/O decisions live in the implementation, not in the manager.
pub trait OperatorPrompt: Send + Sync {
    fn show(&self, message: &str);
    fn confirm(&self, warning: &str) -> bool;
}

/// Interactive prompt over stdout/stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdioPrompt;

impl OperatorPrompt for StdioPrompt {
    fn show(&self, message: &str) {
        println!("{message}");
    }

    fn confirm(&self, warning: &str) -> bool {
        println!("{warning}");
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut input = String::new();
        match std::io::stdin().lock().read_line(&mut input) {
            Ok(0) | Err(_) => false, // EOF or read failure declines
            Ok(_) => is_affirmative(&input),
        }
    }
}

/// Non-interactive prompt: declines every consent request without blocking,
/// and routes messages to the log instead of a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecline;

impl OperatorPrompt for AutoDecline {
    fn show(&self, message: &str) {
        tracing::info!(message, "device authorization instructions");
    }

    fn confirm(&self, _warning: &str) -> bool {
        false
    }
}

/// Only an exact case-insensitive "yes" affirms.
pub fn is_affirmative(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("yes")
}
