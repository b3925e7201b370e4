pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{LogMailer, Mailer, ResendMailer, SqliteStore};
pub use app::{build_router, AppState};
#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::SanctuaryConfig;
pub use core::{directory::SanctuaryDirectory, reconciler::AnimalReconciler};
pub use utils::error::{Result, SanctuaryError};
