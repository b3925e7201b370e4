pub mod assignment;
pub mod capacity;
pub mod directory;
pub mod locks;
pub mod notification;
pub mod reconciler;

pub use crate::domain::model::{Animal, AnimalDraft, Habitat, Keeper};
pub use crate::domain::ports::{EntityStore, NotificationSink};
pub use crate::utils::error::Result;
