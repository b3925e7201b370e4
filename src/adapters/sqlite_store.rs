//! SQLite-backed [`EntityStore`](crate::domain::ports::EntityStore).
//!
//! One connection behind a mutex; every statement runs to completion while the
//! lock is held, so no guard ever crosses an `.await`.

use crate::domain::model::{
    Animal, AnimalDraft, AnimalFilter, AnimalId, FeedingPlan, FeedingPlanDraft, FeedingPlanFilter,
    FeedingPlanId, Habitat, HabitatDraft, HabitatFilter, HabitatId, Keeper, KeeperDraft,
    KeeperFilter, KeeperId, Vet, VetDraft, VetFilter, VetId, EntityKind,
};
use crate::domain::ports::{
    AnimalRepository, FeedingPlanRepository, HabitatRepository, KeeperRepository, VetRepository,
};
use crate::utils::error::{Result, SanctuaryError};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS keepers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        contact TEXT NOT NULL UNIQUE,
        specialty TEXT NOT NULL,
        status TEXT NOT NULL,
        work_shift TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS habitats (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        type TEXT NOT NULL,
        capacity INTEGER NOT NULL CHECK (capacity >= 0),
        status TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS vets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        crmv TEXT NOT NULL UNIQUE,
        specialty TEXT NOT NULL,
        status TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS feeding_plans (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        plan_name TEXT NOT NULL,
        food_type TEXT NOT NULL,
        quantity TEXT NOT NULL,
        frequency TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS animals (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        species TEXT NOT NULL,
        age INTEGER NOT NULL,
        sex TEXT NOT NULL,
        arrival_date TEXT NOT NULL,
        status TEXT NOT NULL,
        image TEXT,
        keeper_id INTEGER REFERENCES keepers(id),
        vet_id INTEGER REFERENCES vets(id),
        habitat_id INTEGER REFERENCES habitats(id),
        feeding_plan_id INTEGER REFERENCES feeding_plans(id)
    );

    CREATE INDEX IF NOT EXISTS idx_animals_habitat ON animals(habitat_id);
    CREATE INDEX IF NOT EXISTS idx_animals_keeper ON animals(keeper_id);
    CREATE INDEX IF NOT EXISTS idx_animals_vet ON animals(vet_id);
    CREATE INDEX IF NOT EXISTS idx_animals_feeding_plan ON animals(feeding_plan_id);
";

const ANIMAL_COLUMNS: &str = "id, name, species, age, sex, arrival_date, status, image, \
                              keeper_id, vet_id, habitat_id, feeding_plan_id";
const KEEPER_COLUMNS: &str = "id, name, contact, specialty, status, work_shift";
const HABITAT_COLUMNS: &str = "id, name, type, capacity, status";
const VET_COLUMNS: &str = "id, name, crmv, specialty, status";
const FEEDING_PLAN_COLUMNS: &str = "id, plan_name, food_type, quantity, frequency";

type RowMapper<T> = fn(&Row<'_>) -> rusqlite::Result<T>;

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a database file and applies the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!("SQLite schema ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| SanctuaryError::Storage {
            message: "connection lock poisoned".to_string(),
        })
    }

    fn query_one<T>(&self, sql: &str, id: i64, map: RowMapper<T>) -> Result<Option<T>> {
        let conn = self.conn()?;
        let found = conn.query_row(sql, params![id], map).optional()?;
        Ok(found)
    }

    fn query_list<T>(
        &self,
        base: &str,
        clauses: &[&str],
        values: Vec<Value>,
        map: RowMapper<T>,
    ) -> Result<Vec<T>> {
        let mut sql = base.to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), map)?;
        let items = rows.collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(items)
    }

    fn count_where(&self, sql: &str, id: i64) -> Result<u32> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(sql, params![id], |row| row.get(0))?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    fn delete_where(&self, sql: &str, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(sql, params![id])?;
        Ok(changed > 0)
    }

    /// Turns a UNIQUE violation into the caller's typed error; other
    /// failures pass through unchanged.
    fn on_unique_violation(
        err: rusqlite::Error,
        typed: impl FnOnce() -> SanctuaryError,
    ) -> SanctuaryError {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, _)
                if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                typed()
            }
            other => SanctuaryError::Database(other),
        }
    }

    fn ensure_updated(changed: usize, entity: EntityKind, id: i64) -> Result<()> {
        if changed == 0 {
            return Err(SanctuaryError::not_found(entity, id));
        }
        Ok(())
    }
}

fn animal_from_row(row: &Row<'_>) -> rusqlite::Result<Animal> {
    Ok(Animal {
        id: row.get(0)?,
        name: row.get(1)?,
        species: row.get(2)?,
        age: row.get(3)?,
        sex: row.get(4)?,
        arrival_date: row.get(5)?,
        status: row.get(6)?,
        image: row.get(7)?,
        keeper_id: row.get(8)?,
        vet_id: row.get(9)?,
        habitat_id: row.get(10)?,
        feeding_plan_id: row.get(11)?,
    })
}

fn keeper_from_row(row: &Row<'_>) -> rusqlite::Result<Keeper> {
    Ok(Keeper {
        id: row.get(0)?,
        name: row.get(1)?,
        contact: row.get(2)?,
        specialty: row.get(3)?,
        status: row.get(4)?,
        work_shift: row.get(5)?,
    })
}

fn habitat_from_row(row: &Row<'_>) -> rusqlite::Result<Habitat> {
    Ok(Habitat {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        capacity: row.get(3)?,
        status: row.get(4)?,
    })
}

fn vet_from_row(row: &Row<'_>) -> rusqlite::Result<Vet> {
    Ok(Vet {
        id: row.get(0)?,
        name: row.get(1)?,
        crmv: row.get(2)?,
        specialty: row.get(3)?,
        status: row.get(4)?,
    })
}

fn feeding_plan_from_row(row: &Row<'_>) -> rusqlite::Result<FeedingPlan> {
    Ok(FeedingPlan {
        id: row.get(0)?,
        plan_name: row.get(1)?,
        food_type: row.get(2)?,
        quantity: row.get(3)?,
        frequency: row.get(4)?,
    })
}

/// Makes `%`, `_` and `\` in user text match literally under `ESCAPE '\'`.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[async_trait]
impl AnimalRepository for SqliteStore {
    async fn find_animal(&self, id: AnimalId) -> Result<Option<Animal>> {
        let sql = format!("SELECT {} FROM animals WHERE id = ?1", ANIMAL_COLUMNS);
        self.query_one(&sql, id, animal_from_row)
    }

    async fn list_animals(&self, filter: &AnimalFilter) -> Result<Vec<Animal>> {
        let base = format!("SELECT {} FROM animals", ANIMAL_COLUMNS);
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        if let Some(species) = non_empty(&filter.species) {
            clauses.push("species = ?");
            values.push(Value::Text(species.to_string()));
        }
        if let Some(min) = filter.age_min {
            clauses.push("age >= ?");
            values.push(Value::Integer(i64::from(min)));
        }
        if let Some(max) = filter.age_max {
            clauses.push("age <= ?");
            values.push(Value::Integer(i64::from(max)));
        }
        if let Some(name) = non_empty(&filter.name) {
            clauses.push("LOWER(name) LIKE ? ESCAPE '\\'");
            values.push(Value::Text(format!(
                "%{}%",
                escape_like(&name.to_lowercase())
            )));
        }

        self.query_list(&base, &clauses, values, animal_from_row)
    }

    async fn insert_animal(&self, draft: &AnimalDraft) -> Result<Animal> {
        let id = {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO animals (name, species, age, sex, arrival_date, status, image, \
                 keeper_id, vet_id, habitat_id, feeding_plan_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    draft.name,
                    draft.species,
                    draft.age,
                    draft.sex,
                    draft.arrival_date,
                    draft.status,
                    draft.image,
                    draft.keeper_id,
                    draft.vet_id,
                    draft.habitat_id,
                    draft.feeding_plan_id,
                ],
            )?;
            conn.last_insert_rowid()
        };
        Ok(Animal::from_draft(id, draft.clone()))
    }

    async fn update_animal(&self, animal: &Animal) -> Result<Animal> {
        let changed = {
            let conn = self.conn()?;
            conn.execute(
                "UPDATE animals SET name = ?1, species = ?2, age = ?3, sex = ?4, \
                 arrival_date = ?5, status = ?6, image = ?7, keeper_id = ?8, vet_id = ?9, \
                 habitat_id = ?10, feeding_plan_id = ?11 WHERE id = ?12",
                params![
                    animal.name,
                    animal.species,
                    animal.age,
                    animal.sex,
                    animal.arrival_date,
                    animal.status,
                    animal.image,
                    animal.keeper_id,
                    animal.vet_id,
                    animal.habitat_id,
                    animal.feeding_plan_id,
                    animal.id,
                ],
            )?
        };
        Self::ensure_updated(changed, EntityKind::Animal, animal.id)?;
        Ok(animal.clone())
    }

    async fn delete_animal(&self, id: AnimalId) -> Result<bool> {
        self.delete_where("DELETE FROM animals WHERE id = ?1", id)
    }

    async fn count_in_habitat(&self, habitat_id: HabitatId) -> Result<u32> {
        self.count_where(
            "SELECT COUNT(*) FROM animals WHERE habitat_id = ?1",
            habitat_id,
        )
    }

    async fn count_by_keeper(&self, keeper_id: KeeperId) -> Result<u32> {
        self.count_where("SELECT COUNT(*) FROM animals WHERE keeper_id = ?1", keeper_id)
    }

    async fn count_by_vet(&self, vet_id: VetId) -> Result<u32> {
        self.count_where("SELECT COUNT(*) FROM animals WHERE vet_id = ?1", vet_id)
    }

    async fn count_by_feeding_plan(&self, plan_id: FeedingPlanId) -> Result<u32> {
        self.count_where(
            "SELECT COUNT(*) FROM animals WHERE feeding_plan_id = ?1",
            plan_id,
        )
    }
}

#[async_trait]
impl KeeperRepository for SqliteStore {
    async fn find_keeper(&self, id: KeeperId) -> Result<Option<Keeper>> {
        let sql = format!("SELECT {} FROM keepers WHERE id = ?1", KEEPER_COLUMNS);
        self.query_one(&sql, id, keeper_from_row)
    }

    async fn find_keeper_by_contact(&self, contact: &str) -> Result<Option<Keeper>> {
        let sql = format!("SELECT {} FROM keepers WHERE contact = ?1", KEEPER_COLUMNS);
        let conn = self.conn()?;
        let found = conn
            .query_row(&sql, params![contact], keeper_from_row)
            .optional()?;
        Ok(found)
    }

    async fn list_keepers(&self, filter: &KeeperFilter) -> Result<Vec<Keeper>> {
        let base = format!("SELECT {} FROM keepers", KEEPER_COLUMNS);
        let mut clauses = Vec::new();
        let mut values = Vec::new();
        if let Some(specialty) = non_empty(&filter.specialty) {
            clauses.push("specialty = ?");
            values.push(Value::Text(specialty.to_string()));
        }
        self.query_list(&base, &clauses, values, keeper_from_row)
    }

    async fn insert_keeper(&self, draft: &KeeperDraft) -> Result<Keeper> {
        let id = {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO keepers (name, contact, specialty, status, work_shift) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    draft.name,
                    draft.contact,
                    draft.specialty,
                    draft.status,
                    draft.work_shift
                ],
            )
            .map_err(|e| {
                Self::on_unique_violation(e, || SanctuaryError::DuplicateContact {
                    contact: draft.contact.clone(),
                })
            })?;
            conn.last_insert_rowid()
        };
        Ok(Keeper {
            id,
            name: draft.name.clone(),
            contact: draft.contact.clone(),
            specialty: draft.specialty.clone(),
            status: draft.status.clone(),
            work_shift: draft.work_shift.clone(),
        })
    }

    async fn update_keeper(&self, keeper: &Keeper) -> Result<Keeper> {
        let changed = {
            let conn = self.conn()?;
            conn.execute(
                "UPDATE keepers SET name = ?1, contact = ?2, specialty = ?3, status = ?4, \
                 work_shift = ?5 WHERE id = ?6",
                params![
                    keeper.name,
                    keeper.contact,
                    keeper.specialty,
                    keeper.status,
                    keeper.work_shift,
                    keeper.id
                ],
            )
            .map_err(|e| {
                Self::on_unique_violation(e, || SanctuaryError::DuplicateContact {
                    contact: keeper.contact.clone(),
                })
            })?
        };
        Self::ensure_updated(changed, EntityKind::Keeper, keeper.id)?;
        Ok(keeper.clone())
    }

    async fn delete_keeper(&self, id: KeeperId) -> Result<bool> {
        self.delete_where("DELETE FROM keepers WHERE id = ?1", id)
    }
}

#[async_trait]
impl HabitatRepository for SqliteStore {
    async fn find_habitat(&self, id: HabitatId) -> Result<Option<Habitat>> {
        let sql = format!("SELECT {} FROM habitats WHERE id = ?1", HABITAT_COLUMNS);
        self.query_one(&sql, id, habitat_from_row)
    }

    async fn list_habitats(&self, filter: &HabitatFilter) -> Result<Vec<Habitat>> {
        let base = format!("SELECT {} FROM habitats", HABITAT_COLUMNS);
        let mut clauses = Vec::new();
        let mut values = Vec::new();
        if let Some(kind) = non_empty(&filter.kind) {
            clauses.push("type = ?");
            values.push(Value::Text(kind.to_string()));
        }
        self.query_list(&base, &clauses, values, habitat_from_row)
    }

    async fn insert_habitat(&self, draft: &HabitatDraft) -> Result<Habitat> {
        let id = {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO habitats (name, type, capacity, status) VALUES (?1, ?2, ?3, ?4)",
                params![draft.name, draft.kind, draft.capacity, draft.status],
            )?;
            conn.last_insert_rowid()
        };
        Ok(Habitat {
            id,
            name: draft.name.clone(),
            kind: draft.kind.clone(),
            capacity: draft.capacity,
            status: draft.status.clone(),
        })
    }

    async fn update_habitat(&self, habitat: &Habitat) -> Result<Habitat> {
        let changed = {
            let conn = self.conn()?;
            conn.execute(
                "UPDATE habitats SET name = ?1, type = ?2, capacity = ?3, status = ?4 WHERE id = ?5",
                params![
                    habitat.name,
                    habitat.kind,
                    habitat.capacity,
                    habitat.status,
                    habitat.id
                ],
            )?
        };
        Self::ensure_updated(changed, EntityKind::Habitat, habitat.id)?;
        Ok(habitat.clone())
    }

    async fn delete_habitat(&self, id: HabitatId) -> Result<bool> {
        self.delete_where("DELETE FROM habitats WHERE id = ?1", id)
    }
}

#[async_trait]
impl VetRepository for SqliteStore {
    async fn find_vet(&self, id: VetId) -> Result<Option<Vet>> {
        let sql = format!("SELECT {} FROM vets WHERE id = ?1", VET_COLUMNS);
        self.query_one(&sql, id, vet_from_row)
    }

    async fn find_vet_by_crmv(&self, crmv: &str) -> Result<Option<Vet>> {
        let sql = format!("SELECT {} FROM vets WHERE crmv = ?1", VET_COLUMNS);
        let conn = self.conn()?;
        let found = conn.query_row(&sql, params![crmv], vet_from_row).optional()?;
        Ok(found)
    }

    async fn list_vets(&self, filter: &VetFilter) -> Result<Vec<Vet>> {
        let base = format!("SELECT {} FROM vets", VET_COLUMNS);
        let mut clauses = Vec::new();
        let mut values = Vec::new();
        if let Some(specialty) = non_empty(&filter.specialty) {
            clauses.push("specialty = ?");
            values.push(Value::Text(specialty.to_string()));
        }
        self.query_list(&base, &clauses, values, vet_from_row)
    }

    async fn insert_vet(&self, draft: &VetDraft) -> Result<Vet> {
        let id = {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO vets (name, crmv, specialty, status) VALUES (?1, ?2, ?3, ?4)",
                params![draft.name, draft.crmv, draft.specialty, draft.status],
            )
            .map_err(|e| {
                Self::on_unique_violation(e, || SanctuaryError::DuplicateLicense {
                    crmv: draft.crmv.clone(),
                })
            })?;
            conn.last_insert_rowid()
        };
        Ok(Vet {
            id,
            name: draft.name.clone(),
            crmv: draft.crmv.clone(),
            specialty: draft.specialty.clone(),
            status: draft.status.clone(),
        })
    }

    async fn update_vet(&self, vet: &Vet) -> Result<Vet> {
        let changed = {
            let conn = self.conn()?;
            conn.execute(
                "UPDATE vets SET name = ?1, crmv = ?2, specialty = ?3, status = ?4 WHERE id = ?5",
                params![vet.name, vet.crmv, vet.specialty, vet.status, vet.id],
            )
            .map_err(|e| {
                Self::on_unique_violation(e, || SanctuaryError::DuplicateLicense {
                    crmv: vet.crmv.clone(),
                })
            })?
        };
        Self::ensure_updated(changed, EntityKind::Vet, vet.id)?;
        Ok(vet.clone())
    }

    async fn delete_vet(&self, id: VetId) -> Result<bool> {
        self.delete_where("DELETE FROM vets WHERE id = ?1", id)
    }
}

#[async_trait]
impl FeedingPlanRepository for SqliteStore {
    async fn find_feeding_plan(&self, id: FeedingPlanId) -> Result<Option<FeedingPlan>> {
        let sql = format!(
            "SELECT {} FROM feeding_plans WHERE id = ?1",
            FEEDING_PLAN_COLUMNS
        );
        self.query_one(&sql, id, feeding_plan_from_row)
    }

    async fn list_feeding_plans(&self, filter: &FeedingPlanFilter) -> Result<Vec<FeedingPlan>> {
        let base = format!("SELECT {} FROM feeding_plans", FEEDING_PLAN_COLUMNS);
        let mut clauses = Vec::new();
        let mut values = Vec::new();
        if let Some(food_type) = non_empty(&filter.food_type) {
            clauses.push("food_type = ?");
            values.push(Value::Text(food_type.to_string()));
        }
        if let Some(animal_id) = filter.animal_id {
            clauses.push("id IN (SELECT feeding_plan_id FROM animals WHERE id = ?)");
            values.push(Value::Integer(animal_id));
        }
        self.query_list(&base, &clauses, values, feeding_plan_from_row)
    }

    async fn insert_feeding_plan(&self, draft: &FeedingPlanDraft) -> Result<FeedingPlan> {
        let id = {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO feeding_plans (plan_name, food_type, quantity, frequency) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    draft.plan_name,
                    draft.food_type,
                    draft.quantity,
                    draft.frequency
                ],
            )?;
            conn.last_insert_rowid()
        };
        Ok(FeedingPlan {
            id,
            plan_name: draft.plan_name.clone(),
            food_type: draft.food_type.clone(),
            quantity: draft.quantity.clone(),
            frequency: draft.frequency.clone(),
        })
    }

    async fn update_feeding_plan(&self, plan: &FeedingPlan) -> Result<FeedingPlan> {
        let changed = {
            let conn = self.conn()?;
            conn.execute(
                "UPDATE feeding_plans SET plan_name = ?1, food_type = ?2, quantity = ?3, \
                 frequency = ?4 WHERE id = ?5",
                params![
                    plan.plan_name,
                    plan.food_type,
                    plan.quantity,
                    plan.frequency,
                    plan.id
                ],
            )?
        };
        Self::ensure_updated(changed, EntityKind::FeedingPlan, plan.id)?;
        Ok(plan.clone())
    }

    async fn delete_feeding_plan(&self, id: FeedingPlanId) -> Result<bool> {
        self.delete_where("DELETE FROM feeding_plans WHERE id = ?1", id)
    }
}
