//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_port() -> u16 {
    6667
}

// =============================================================================
// Pacing Defaults
// =============================================================================

/// Minimum gap between any two outbound lines.
pub fn default_message_delay_ms() -> u64 {
    1000
}

/// Pause after each autojoin, on top of the message delay.
pub fn default_join_delay_ms() -> u64 {
    1000
}

// =============================================================================
// IGDB Defaults
// =============================================================================

pub fn default_max_concurrent_searches() -> usize {
    4
}

pub fn default_search_timeout_secs() -> u64 {
    10
}
