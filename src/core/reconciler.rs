//! Animal create/update/delete with caretaker and capacity invariants.
//!
//! Gate failures abort before anything is written and nothing is sent.
//! Notifications go out only after the write has committed, and their
//! failures never reach the caller.

use crate::core::assignment::{classify, require_keeper, Outcome};
use crate::core::capacity::CapacityValidator;
use crate::core::locks::HabitatLocks;
use crate::core::notification::NotificationDispatcher;
use crate::domain::model::{Animal, AnimalDraft, AnimalFilter, AnimalId, EntityKind, Keeper, KeeperId};
use crate::domain::ports::{EntityStore, NotificationSink};
use crate::utils::error::{Result, SanctuaryError};
use crate::utils::validation::{require_non_blank, Validate};
use std::sync::Arc;

impl Validate for AnimalDraft {
    fn validate(&self) -> Result<()> {
        require_non_blank("name", &self.name)?;
        require_non_blank("species", &self.species)?;
        require_non_blank("sex", &self.sex)?;
        require_non_blank("status", &self.status)?;
        Ok(())
    }
}

pub struct AnimalReconciler<S, N> {
    store: Arc<S>,
    capacity: CapacityValidator<S>,
    dispatcher: NotificationDispatcher<N>,
    locks: HabitatLocks,
}

impl<S, N> AnimalReconciler<S, N>
where
    S: EntityStore,
    N: NotificationSink,
{
    pub fn new(store: Arc<S>, dispatcher: NotificationDispatcher<N>, locks: HabitatLocks) -> Self {
        Self {
            capacity: CapacityValidator::new(Arc::clone(&store)),
            store,
            dispatcher,
            locks,
        }
    }

    pub async fn get(&self, id: AnimalId) -> Result<Animal> {
        tracing::debug!("Fetching animal with ID: {}", id);
        self.find_existing(id).await
    }

    pub async fn list(&self, filter: &AnimalFilter) -> Result<Vec<Animal>> {
        let animals = self.store.list_animals(filter).await?;
        tracing::debug!("Found {} animals (filtered: {})", animals.len(), !filter.is_empty());
        Ok(animals)
    }

    pub async fn create(&self, draft: AnimalDraft) -> Result<Animal> {
        tracing::info!("Attempting to create new animal: {}", draft.name);
        draft.validate()?;
        let keeper_id = self.gate_keeper(draft.keeper_id, &draft.name)?;
        let keeper = self.resolve_references(&draft, keeper_id).await?;

        let guard = self.locks.acquire_opt(draft.habitat_id).await;
        self.capacity.check(draft.habitat_id, None).await?;
        let animal = self.store.insert_animal(&draft).await?;
        drop(guard);

        tracing::info!("Animal created successfully with ID: {}", animal.id);

        let intents = classify(&animal, None, Outcome::Persisted(Some(&keeper)));
        let report = self.dispatcher.dispatch(&intents).await;
        tracing::debug!("Create notifications for animal {}: {:?}", animal.id, report);
        Ok(animal)
    }

    /// The target habitat is locked whenever one is named, and the current
    /// placement is re-read under that lock, so a concurrent move cannot
    /// make this update skip the capacity check on stale data.
    pub async fn update(&self, id: AnimalId, draft: AnimalDraft) -> Result<Animal> {
        tracing::info!("Attempting to update animal with ID: {}", id);
        self.find_existing(id).await?;
        draft.validate()?;
        let keeper_id = self.gate_keeper(draft.keeper_id, &draft.name)?;
        let new_keeper = self.resolve_references(&draft, keeper_id).await?;

        let guard = self.locks.acquire_opt(draft.habitat_id).await;
        let existing = self.find_existing(id).await?;
        self.capacity
            .check(draft.habitat_id, existing.habitat_id)
            .await?;
        let old_keeper = self.load_keeper(existing.keeper_id).await?;

        let updated = self
            .store
            .update_animal(&Animal::from_draft(id, draft))
            .await?;
        drop(guard);

        tracing::info!("Animal with ID {} updated successfully.", updated.id);

        let intents = classify(
            &updated,
            old_keeper.as_ref(),
            Outcome::Persisted(Some(&new_keeper)),
        );
        let report = self.dispatcher.dispatch(&intents).await;
        tracing::debug!("Update notifications for animal {}: {:?}", updated.id, report);
        Ok(updated)
    }

    pub async fn delete(&self, id: AnimalId) -> Result<()> {
        tracing::info!("Attempting to delete animal with ID: {}", id);
        let existing = self.find_existing(id).await?;
        let keeper = self.load_keeper(existing.keeper_id).await?;

        if !self.store.delete_animal(id).await? {
            return Err(SanctuaryError::not_found(EntityKind::Animal, id));
        }
        tracing::info!("Animal with ID {} deleted successfully.", id);

        if keeper.is_none() {
            tracing::info!(
                "No keeper present for animal: {}. Skipping email notification.",
                existing.name
            );
        }
        let intents = classify(&existing, keeper.as_ref(), Outcome::Deleted);
        self.dispatcher.dispatch(&intents).await;
        Ok(())
    }

    async fn find_existing(&self, id: AnimalId) -> Result<Animal> {
        self.store.find_animal(id).await?.ok_or_else(|| {
            tracing::warn!("Animal not found with ID: {}", id);
            SanctuaryError::not_found(EntityKind::Animal, id)
        })
    }

    fn gate_keeper(&self, proposed: Option<KeeperId>, animal_name: &str) -> Result<KeeperId> {
        require_keeper(proposed).map_err(|e| {
            tracing::warn!("Caretaker required for animal: {}", animal_name);
            e
        })
    }

    async fn load_keeper(&self, id: Option<KeeperId>) -> Result<Option<Keeper>> {
        match id {
            Some(id) => self.store.find_keeper(id).await,
            None => Ok(None),
        }
    }

    /// Every reference the draft carries must point at an existing row.
    /// Returns the resolved keeper.
    async fn resolve_references(&self, draft: &AnimalDraft, keeper_id: KeeperId) -> Result<Keeper> {
        let keeper = self
            .store
            .find_keeper(keeper_id)
            .await?
            .ok_or_else(|| SanctuaryError::not_found(EntityKind::Keeper, keeper_id))?;

        if let Some(habitat_id) = draft.habitat_id {
            if self.store.find_habitat(habitat_id).await?.is_none() {
                return Err(SanctuaryError::not_found(EntityKind::Habitat, habitat_id));
            }
        }
        if let Some(vet_id) = draft.vet_id {
            if self.store.find_vet(vet_id).await?.is_none() {
                return Err(SanctuaryError::not_found(EntityKind::Vet, vet_id));
            }
        }
        if let Some(plan_id) = draft.feeding_plan_id {
            if self.store.find_feeding_plan(plan_id).await?.is_none() {
                return Err(SanctuaryError::not_found(EntityKind::FeedingPlan, plan_id));
            }
        }
        Ok(keeper)
    }
}
