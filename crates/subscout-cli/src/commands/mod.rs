//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Subscription detection over a file or sample history
//! - `config` - Effective configuration display
//! - `sample` - Synthetic history generation

pub mod analyze;
pub mod config;
pub mod sample;

// Re-export command functions for main.rs
pub use analyze::*;
pub use config::*;
pub use sample::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
