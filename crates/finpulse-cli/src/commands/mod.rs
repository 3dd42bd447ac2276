//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `detect` - Recurring charge detection and shared config loading
//! - `normalize` - Merchant name normalization preview
//! - `config` - Effective configuration display

pub mod config;
pub mod detect;
pub mod normalize;

// Re-export command functions for main.rs
pub use config::*;
pub use detect::*;
pub use normalize::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
