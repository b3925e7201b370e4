use crate::domain::model::{EntityKind, HabitatId};
use crate::domain::ports::{AnimalRepository, HabitatRepository};
use crate::utils::error::{Result, SanctuaryError};
use std::sync::Arc;

/// Confirms a habitat has room for one more animal.
pub struct CapacityValidator<S> {
    store: Arc<S>,
}

impl<S> CapacityValidator<S>
where
    S: AnimalRepository + HabitatRepository,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Only a habitat *change* is checked. Staying in the same habitat, or
    /// having no habitat at all, always passes. A habitat holding exactly
    /// `capacity` animals rejects one more.
    pub async fn check(&self, target: Option<HabitatId>, previous: Option<HabitatId>) -> Result<()> {
        let Some(target_id) = target else {
            return Ok(());
        };
        if previous == Some(target_id) {
            tracing::debug!("Habitat {} unchanged, skipping capacity check", target_id);
            return Ok(());
        }

        let habitat = self
            .store
            .find_habitat(target_id)
            .await?
            .ok_or_else(|| SanctuaryError::not_found(EntityKind::Habitat, target_id))?;

        let occupants = self.store.count_in_habitat(target_id).await?;
        if occupants >= habitat.capacity {
            tracing::warn!(
                "Habitat capacity exceeded for habitat ID: {} (current: {}, capacity: {})",
                habitat.id,
                occupants,
                habitat.capacity
            );
            return Err(SanctuaryError::HabitatCapacityExceeded {
                habitat_id: habitat.id,
                name: habitat.name,
                capacity: habitat.capacity,
                occupants,
            });
        }

        tracing::debug!(
            "Habitat capacity check passed for habitat ID: {} ({}/{})",
            habitat.id,
            occupants,
            habitat.capacity
        );
        Ok(())
    }
}
