use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type AnimalId = i64;
pub type KeeperId = i64;
pub type HabitatId = i64;
pub type VetId = i64;
pub type FeedingPlanId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Animal,
    Keeper,
    Habitat,
    Vet,
    FeedingPlan,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Animal => "Animal",
            EntityKind::Keeper => "Keeper",
            EntityKind::Habitat => "Habitat",
            EntityKind::Vet => "Vet",
            EntityKind::FeedingPlan => "Feeding plan",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub id: AnimalId,
    pub name: String,
    pub species: String,
    pub age: u32,
    pub sex: String,
    pub arrival_date: NaiveDate,
    pub status: String,
    pub image: Option<String>,
    pub keeper_id: Option<KeeperId>,
    pub vet_id: Option<VetId>,
    pub habitat_id: Option<HabitatId>,
    pub feeding_plan_id: Option<FeedingPlanId>,
}

/// Proposed animal state as supplied by a caller, before any gate has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalDraft {
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub age: u32,
    pub sex: String,
    pub arrival_date: NaiveDate,
    pub status: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub keeper_id: Option<KeeperId>,
    #[serde(default)]
    pub vet_id: Option<VetId>,
    #[serde(default)]
    pub habitat_id: Option<HabitatId>,
    #[serde(default)]
    pub feeding_plan_id: Option<FeedingPlanId>,
}

impl Animal {
    pub fn from_draft(id: AnimalId, draft: AnimalDraft) -> Self {
        Self {
            id,
            name: draft.name,
            species: draft.species,
            age: draft.age,
            sex: draft.sex,
            arrival_date: draft.arrival_date,
            status: draft.status,
            image: draft.image,
            keeper_id: draft.keeper_id,
            vet_id: draft.vet_id,
            habitat_id: draft.habitat_id,
            feeding_plan_id: draft.feeding_plan_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keeper {
    pub id: KeeperId,
    pub name: String,
    pub contact: String,
    pub specialty: String,
    /// Employment status, e.g. "Active" or "On Leave".
    pub status: String,
    pub work_shift: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeeperDraft {
    pub name: String,
    pub contact: String,
    pub specialty: String,
    pub status: String,
    pub work_shift: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habitat {
    pub id: HabitatId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub capacity: u32,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitatDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub capacity: u32,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vet {
    pub id: VetId,
    pub name: String,
    pub crmv: String,
    pub specialty: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VetDraft {
    pub name: String,
    pub crmv: String,
    pub specialty: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedingPlan {
    pub id: FeedingPlanId,
    pub plan_name: String,
    pub food_type: String,
    pub quantity: String,
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedingPlanDraft {
    pub plan_name: String,
    pub food_type: String,
    pub quantity: String,
    pub frequency: String,
}

/// Optional animal search criteria. Present fields are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalFilter {
    pub species: Option<String>,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    /// Case-insensitive substring match.
    pub name: Option<String>,
}

impl AnimalFilter {
    pub fn is_empty(&self) -> bool {
        self.species.as_deref().map_or(true, str::is_empty)
            && self.age_min.is_none()
            && self.age_max.is_none()
            && self.name.as_deref().map_or(true, str::is_empty)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeeperFilter {
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitatFilter {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VetFilter {
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedingPlanFilter {
    pub food_type: Option<String>,
    /// Restricts the result to the plan referenced by this animal.
    pub animal_id: Option<AnimalId>,
}
