//! CRUD for the records animals point at: keepers, habitats, vets and
//! feeding plans. These entities carry their own guards: unique contact and
//! license numbers, and no deletion while an animal still references them.

use crate::core::locks::HabitatLocks;
use crate::domain::model::{
    EntityKind, FeedingPlan, FeedingPlanDraft, FeedingPlanFilter, FeedingPlanId, Habitat,
    HabitatDraft, HabitatFilter, HabitatId, Keeper, KeeperDraft, KeeperFilter, KeeperId, Vet,
    VetDraft, VetFilter, VetId,
};
use crate::domain::ports::EntityStore;
use crate::utils::error::{Result, SanctuaryError};
use crate::utils::validation::{require_non_blank, Validate};
use std::sync::Arc;

impl Validate for KeeperDraft {
    fn validate(&self) -> Result<()> {
        require_non_blank("name", &self.name)?;
        require_non_blank("contact", &self.contact)?;
        require_non_blank("specialty", &self.specialty)?;
        require_non_blank("status", &self.status)?;
        require_non_blank("workShift", &self.work_shift)?;
        Ok(())
    }
}

impl Validate for HabitatDraft {
    fn validate(&self) -> Result<()> {
        require_non_blank("name", &self.name)?;
        require_non_blank("type", &self.kind)?;
        require_non_blank("status", &self.status)?;
        Ok(())
    }
}

impl Validate for VetDraft {
    fn validate(&self) -> Result<()> {
        require_non_blank("name", &self.name)?;
        require_non_blank("crmv", &self.crmv)?;
        require_non_blank("specialty", &self.specialty)?;
        require_non_blank("status", &self.status)?;
        Ok(())
    }
}

impl Validate for FeedingPlanDraft {
    fn validate(&self) -> Result<()> {
        require_non_blank("planName", &self.plan_name)?;
        require_non_blank("foodType", &self.food_type)?;
        require_non_blank("quantity", &self.quantity)?;
        require_non_blank("frequency", &self.frequency)?;
        Ok(())
    }
}

fn in_use(entity: EntityKind, id: i64, references: u32) -> Result<()> {
    if references > 0 {
        tracing::warn!(
            "Refusing to delete {} {}: still referenced by {} animal(s)",
            entity,
            id,
            references
        );
        return Err(SanctuaryError::InUseConflict {
            entity,
            id,
            references,
        });
    }
    Ok(())
}

pub struct SanctuaryDirectory<S> {
    store: Arc<S>,
    locks: HabitatLocks,
}

impl<S: EntityStore> SanctuaryDirectory<S> {
    pub fn new(store: Arc<S>, locks: HabitatLocks) -> Self {
        Self { store, locks }
    }

    // Keepers

    pub async fn get_keeper(&self, id: KeeperId) -> Result<Keeper> {
        self.store
            .find_keeper(id)
            .await?
            .ok_or_else(|| SanctuaryError::not_found(EntityKind::Keeper, id))
    }

    pub async fn list_keepers(&self, filter: &KeeperFilter) -> Result<Vec<Keeper>> {
        self.store.list_keepers(filter).await
    }

    pub async fn create_keeper(&self, draft: KeeperDraft) -> Result<Keeper> {
        draft.validate()?;
        if self.store.find_keeper_by_contact(&draft.contact).await?.is_some() {
            return Err(SanctuaryError::DuplicateContact {
                contact: draft.contact,
            });
        }
        let keeper = self.store.insert_keeper(&draft).await?;
        tracing::info!("Keeper created with ID: {}", keeper.id);
        Ok(keeper)
    }

    pub async fn update_keeper(&self, id: KeeperId, draft: KeeperDraft) -> Result<Keeper> {
        let existing = self.get_keeper(id).await?;
        draft.validate()?;
        if existing.contact != draft.contact {
            if let Some(holder) = self.store.find_keeper_by_contact(&draft.contact).await? {
                if holder.id != id {
                    return Err(SanctuaryError::DuplicateContact {
                        contact: draft.contact,
                    });
                }
            }
        }

        let keeper = Keeper {
            id,
            name: draft.name,
            contact: draft.contact,
            specialty: draft.specialty,
            status: draft.status,
            work_shift: draft.work_shift,
        };
        let keeper = self.store.update_keeper(&keeper).await?;
        tracing::info!("Keeper with ID {} updated", id);
        Ok(keeper)
    }

    pub async fn delete_keeper(&self, id: KeeperId) -> Result<()> {
        self.get_keeper(id).await?;
        in_use(EntityKind::Keeper, id, self.store.count_by_keeper(id).await?)?;
        self.store.delete_keeper(id).await?;
        tracing::info!("Keeper with ID {} deleted", id);
        Ok(())
    }

    // Habitats

    pub async fn get_habitat(&self, id: HabitatId) -> Result<Habitat> {
        self.store
            .find_habitat(id)
            .await?
            .ok_or_else(|| SanctuaryError::not_found(EntityKind::Habitat, id))
    }

    pub async fn list_habitats(&self, filter: &HabitatFilter) -> Result<Vec<Habitat>> {
        self.store.list_habitats(filter).await
    }

    pub async fn create_habitat(&self, draft: HabitatDraft) -> Result<Habitat> {
        draft.validate()?;
        let habitat = self.store.insert_habitat(&draft).await?;
        tracing::info!(
            "Habitat created with ID: {} (capacity {})",
            habitat.id,
            habitat.capacity
        );
        Ok(habitat)
    }

    /// Capacity may not drop below the animals already living there.
    pub async fn update_habitat(&self, id: HabitatId, draft: HabitatDraft) -> Result<Habitat> {
        self.get_habitat(id).await?;
        draft.validate()?;

        let _guard = self.locks.acquire(id).await;
        let occupants = self.store.count_in_habitat(id).await?;
        if draft.capacity < occupants {
            tracing::warn!(
                "Rejecting capacity {} for habitat {}: {} animals already assigned",
                draft.capacity,
                id,
                occupants
            );
            return Err(SanctuaryError::HabitatCapacityExceeded {
                habitat_id: id,
                name: draft.name,
                capacity: draft.capacity,
                occupants,
            });
        }

        let habitat = Habitat {
            id,
            name: draft.name,
            kind: draft.kind,
            capacity: draft.capacity,
            status: draft.status,
        };
        let habitat = self.store.update_habitat(&habitat).await?;
        tracing::info!("Habitat with ID {} updated", id);
        Ok(habitat)
    }

    pub async fn delete_habitat(&self, id: HabitatId) -> Result<()> {
        self.get_habitat(id).await?;
        let _guard = self.locks.acquire(id).await;
        in_use(EntityKind::Habitat, id, self.store.count_in_habitat(id).await?)?;
        self.store.delete_habitat(id).await?;
        tracing::info!("Habitat with ID {} deleted", id);
        Ok(())
    }

    // Vets

    pub async fn get_vet(&self, id: VetId) -> Result<Vet> {
        self.store
            .find_vet(id)
            .await?
            .ok_or_else(|| SanctuaryError::not_found(EntityKind::Vet, id))
    }

    pub async fn list_vets(&self, filter: &VetFilter) -> Result<Vec<Vet>> {
        self.store.list_vets(filter).await
    }

    pub async fn create_vet(&self, draft: VetDraft) -> Result<Vet> {
        draft.validate()?;
        if self.store.find_vet_by_crmv(&draft.crmv).await?.is_some() {
            return Err(SanctuaryError::DuplicateLicense { crmv: draft.crmv });
        }
        let vet = self.store.insert_vet(&draft).await?;
        tracing::info!("Vet created with ID: {}", vet.id);
        Ok(vet)
    }

    pub async fn update_vet(&self, id: VetId, draft: VetDraft) -> Result<Vet> {
        let existing = self.get_vet(id).await?;
        draft.validate()?;
        if existing.crmv != draft.crmv {
            if let Some(holder) = self.store.find_vet_by_crmv(&draft.crmv).await? {
                if holder.id != id {
                    return Err(SanctuaryError::DuplicateLicense { crmv: draft.crmv });
                }
            }
        }

        let vet = Vet {
            id,
            name: draft.name,
            crmv: draft.crmv,
            specialty: draft.specialty,
            status: draft.status,
        };
        self.store.update_vet(&vet).await
    }

    pub async fn delete_vet(&self, id: VetId) -> Result<()> {
        self.get_vet(id).await?;
        in_use(EntityKind::Vet, id, self.store.count_by_vet(id).await?)?;
        self.store.delete_vet(id).await?;
        tracing::info!("Vet with ID {} deleted", id);
        Ok(())
    }

    // Feeding plans

    pub async fn get_feeding_plan(&self, id: FeedingPlanId) -> Result<FeedingPlan> {
        self.store
            .find_feeding_plan(id)
            .await?
            .ok_or_else(|| SanctuaryError::not_found(EntityKind::FeedingPlan, id))
    }

    pub async fn list_feeding_plans(&self, filter: &FeedingPlanFilter) -> Result<Vec<FeedingPlan>> {
        self.store.list_feeding_plans(filter).await
    }

    pub async fn create_feeding_plan(&self, draft: FeedingPlanDraft) -> Result<FeedingPlan> {
        draft.validate()?;
        let plan = self.store.insert_feeding_plan(&draft).await?;
        tracing::info!("Feeding plan created with ID: {}", plan.id);
        Ok(plan)
    }

    pub async fn update_feeding_plan(
        &self,
        id: FeedingPlanId,
        draft: FeedingPlanDraft,
    ) -> Result<FeedingPlan> {
        self.get_feeding_plan(id).await?;
        draft.validate()?;
        let plan = FeedingPlan {
            id,
            plan_name: draft.plan_name,
            food_type: draft.food_type,
            quantity: draft.quantity,
            frequency: draft.frequency,
        };
        self.store.update_feeding_plan(&plan).await
    }

    pub async fn delete_feeding_plan(&self, id: FeedingPlanId) -> Result<()> {
        self.get_feeding_plan(id).await?;
        in_use(
            EntityKind::FeedingPlan,
            id,
            self.store.count_by_feeding_plan(id).await?,
        )?;
        self.store.delete_feeding_plan(id).await?;
        tracing::info!("Feeding plan with ID {} deleted", id);
        Ok(())
    }
}
