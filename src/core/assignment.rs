//! Caretaker rules: the requirement gate and the change classifier.
//!
//! The classifier is a pure function of the keeper before and after one
//! mutation. Keepers are compared by id, so two copies of the same row loaded
//! at different times are the same keeper.

use crate::domain::model::{Animal, Keeper, KeeperId};
use crate::utils::error::{Result, SanctuaryError};

/// Every create and update must name a keeper. Deletes are never gated.
pub fn require_keeper(proposed: Option<KeeperId>) -> Result<KeeperId> {
    proposed.ok_or(SanctuaryError::CaretakerRequired)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    NewAssignment,
    DetailsUpdated,
    Unassignment,
    Deleted,
}

/// A pending notification, not yet rendered or sent.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationIntent {
    pub kind: NotificationKind,
    pub recipient: Keeper,
    pub animal_name: String,
    pub species: String,
}

/// What became of the animal in the mutation being classified.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    /// Created or updated, now assigned to this keeper (or none).
    Persisted(Option<&'a Keeper>),
    Deleted,
}

pub fn classify(
    animal: &Animal,
    before: Option<&Keeper>,
    outcome: Outcome<'_>,
) -> Vec<NotificationIntent> {
    let intent = |kind, keeper: &Keeper| NotificationIntent {
        kind,
        recipient: keeper.clone(),
        animal_name: animal.name.clone(),
        species: animal.species.clone(),
    };

    match (before, outcome) {
        (Some(old), Outcome::Deleted) => vec![intent(NotificationKind::Deleted, old)],
        (None, Outcome::Deleted) => Vec::new(),
        (None, Outcome::Persisted(Some(new))) => {
            vec![intent(NotificationKind::NewAssignment, new)]
        }
        (Some(old), Outcome::Persisted(Some(new))) if old.id == new.id => {
            vec![intent(NotificationKind::DetailsUpdated, new)]
        }
        (Some(old), Outcome::Persisted(Some(new))) => vec![
            intent(NotificationKind::NewAssignment, new),
            intent(NotificationKind::Unassignment, old),
        ],
        (Some(old), Outcome::Persisted(None)) => {
            vec![intent(NotificationKind::Unassignment, old)]
        }
        (None, Outcome::Persisted(None)) => Vec::new(),
    }
}
