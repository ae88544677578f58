//! User persistence
//!
//! - [`traits`] - the [`UserRepository`] abstraction and the [`User`] record
//! - [`memory`] - thread-safe in-memory repository
//! - [`users`] - [`UserManager`] for account creation and credential checks

/// In-memory repository implementation.
pub mod memory;
/// Repository trait and user records.
pub mod traits;
/// Account creation and password checks.
pub mod users;

pub use memory::InMemoryUserRepository;
pub use traits::{NewUser, User, UserRepository};
pub use users::UserManager;
