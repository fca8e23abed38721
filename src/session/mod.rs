//! Session tracking and discovery
//!
//! # Error Handling Strategy
//!
//! Discovery is a heuristic, not a transactional read:
//!
//! - **Slot operations** (`write_active`, `read_active`, `clear_active`) return ordinary
//!   `Result`s so the hook boundary can log what went wrong.
//!
//! - **Discovery** (`discover`) never fails. A source that cannot be read or parsed is
//!   logged at debug level and treated as "no session found".

pub mod index;
pub mod tracker;

pub use tracker::{
    DISCOVERY_ORDER, DiscoverySource, RECENT_SESSION_WINDOW, STALE_SESSION_TIMEOUT,
    SessionTracker, is_active, is_active_at, select_recent_entry,
};
