// Adapters layer: concrete implementations of the domain ports.

pub mod mailer;
pub mod sqlite_store;

pub use mailer::{LogMailer, Mailer, ResendMailer};
pub use sqlite_store::SqliteStore;
