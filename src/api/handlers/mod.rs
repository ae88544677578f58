//! API request handlers.

/// Registration, login and current-user handlers.
pub mod users;
