use crate::domain::model::{
    Animal, AnimalDraft, AnimalFilter, AnimalId, FeedingPlan, FeedingPlanDraft, FeedingPlanFilter,
    FeedingPlanId, Habitat, HabitatDraft, HabitatFilter, HabitatId, Keeper, KeeperDraft,
    KeeperFilter, KeeperId, Vet, VetDraft, VetFilter, VetId,
};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait AnimalRepository: Send + Sync {
    async fn find_animal(&self, id: AnimalId) -> Result<Option<Animal>>;
    async fn list_animals(&self, filter: &AnimalFilter) -> Result<Vec<Animal>>;
    async fn insert_animal(&self, draft: &AnimalDraft) -> Result<Animal>;
    /// Replaces every mutable field of an existing animal.
    async fn update_animal(&self, animal: &Animal) -> Result<Animal>;
    async fn delete_animal(&self, id: AnimalId) -> Result<bool>;

    async fn count_in_habitat(&self, habitat_id: HabitatId) -> Result<u32>;
    async fn count_by_keeper(&self, keeper_id: KeeperId) -> Result<u32>;
    async fn count_by_vet(&self, vet_id: VetId) -> Result<u32>;
    async fn count_by_feeding_plan(&self, plan_id: FeedingPlanId) -> Result<u32>;
}

#[async_trait]
pub trait KeeperRepository: Send + Sync {
    async fn find_keeper(&self, id: KeeperId) -> Result<Option<Keeper>>;
    async fn find_keeper_by_contact(&self, contact: &str) -> Result<Option<Keeper>>;
    async fn list_keepers(&self, filter: &KeeperFilter) -> Result<Vec<Keeper>>;
    async fn insert_keeper(&self, draft: &KeeperDraft) -> Result<Keeper>;
    async fn update_keeper(&self, keeper: &Keeper) -> Result<Keeper>;
    async fn delete_keeper(&self, id: KeeperId) -> Result<bool>;
}

#[async_trait]
pub trait HabitatRepository: Send + Sync {
    async fn find_habitat(&self, id: HabitatId) -> Result<Option<Habitat>>;
    async fn list_habitats(&self, filter: &HabitatFilter) -> Result<Vec<Habitat>>;
    async fn insert_habitat(&self, draft: &HabitatDraft) -> Result<Habitat>;
    async fn update_habitat(&self, habitat: &Habitat) -> Result<Habitat>;
    async fn delete_habitat(&self, id: HabitatId) -> Result<bool>;
}

#[async_trait]
pub trait VetRepository: Send + Sync {
    async fn find_vet(&self, id: VetId) -> Result<Option<Vet>>;
    async fn find_vet_by_crmv(&self, crmv: &str) -> Result<Option<Vet>>;
    async fn list_vets(&self, filter: &VetFilter) -> Result<Vec<Vet>>;
    async fn insert_vet(&self, draft: &VetDraft) -> Result<Vet>;
    async fn update_vet(&self, vet: &Vet) -> Result<Vet>;
    async fn delete_vet(&self, id: VetId) -> Result<bool>;
}

#[async_trait]
pub trait FeedingPlanRepository: Send + Sync {
    async fn find_feeding_plan(&self, id: FeedingPlanId) -> Result<Option<FeedingPlan>>;
    async fn list_feeding_plans(&self, filter: &FeedingPlanFilter) -> Result<Vec<FeedingPlan>>;
    async fn insert_feeding_plan(&self, draft: &FeedingPlanDraft) -> Result<FeedingPlan>;
    async fn update_feeding_plan(&self, plan: &FeedingPlan) -> Result<FeedingPlan>;
    async fn delete_feeding_plan(&self, id: FeedingPlanId) -> Result<bool>;
}

/// Everything the reconciliation engine and the directory need from persistence.
pub trait EntityStore:
    AnimalRepository + KeeperRepository + HabitatRepository + VetRepository + FeedingPlanRepository
{
}

impl<T> EntityStore for T where
    T: AnimalRepository
        + KeeperRepository
        + HabitatRepository
        + VetRepository
        + FeedingPlanRepository
{
}

/// Outbound email. Callers treat every error as non-fatal.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}
