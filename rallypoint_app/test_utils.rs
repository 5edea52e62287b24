#[cfg(any(test, feature = "test-utils"))]
#[cfg(not(tarpaulin_include))]
pub mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };
    use uuid::Uuid;

    use rallypoint_game::models::{
        garrison::GarrisonStack, idempotency::IdempotencyRecord, movement::Movement,
        rally_point::RallyPoint, village::Village, village_state::VillageState,
    };
    use rallypoint_types::{
        army::UnitTypeId,
        errors::{ApplicationError, NotFoundError},
        map::Position,
    };

    use crate::{
        repository::{
            GarrisonRepository, IdempotencyRepository, MovementRepository, RallyPointRepository,
            VillageRepository, VillageStateRepository,
        },
        uow::UnitOfWork,
    };

    #[derive(Default, Clone)]
    pub struct MockVillageRepository {
        villages: Arc<Mutex<HashMap<u32, Village>>>,
    }

    #[async_trait]
    impl VillageRepository for MockVillageRepository {
        async fn get_by_id(&self, village_id: u32) -> Result<Village, ApplicationError> {
            let villages = self.villages.lock().unwrap();
            Ok(villages
                .get(&village_id)
                .cloned()
                .ok_or(NotFoundError::Village(village_id))?)
        }

        async fn get_by_position(
            &self,
            position: Position,
        ) -> Result<Option<Village>, ApplicationError> {
            let villages = self.villages.lock().unwrap();
            Ok(villages.values().find(|v| v.position == position).cloned())
        }

        async fn save(&self, village: &Village) -> Result<(), ApplicationError> {
            self.villages
                .lock()
                .unwrap()
                .insert(village.id, village.clone());
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    pub struct MockRallyPointRepository {
        rally_points: Arc<Mutex<HashMap<u32, RallyPoint>>>,
    }

    #[async_trait]
    impl RallyPointRepository for MockRallyPointRepository {
        async fn get_by_village_id(&self, village_id: u32) -> Result<RallyPoint, ApplicationError> {
            let rally_points = self.rally_points.lock().unwrap();
            Ok(rally_points
                .get(&village_id)
                .cloned()
                .ok_or(NotFoundError::RallyPoint(village_id))?)
        }

        async fn save(&self, rally_point: &RallyPoint) -> Result<(), ApplicationError> {
            self.rally_points
                .lock()
                .unwrap()
                .insert(rally_point.village_id, rally_point.clone());
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    pub struct MockGarrisonRepository {
        stacks: Arc<Mutex<HashMap<(u32, Uuid, UnitTypeId), GarrisonStack>>>,
    }

    #[async_trait]
    impl GarrisonRepository for MockGarrisonRepository {
        async fn get(
            &self,
            village_id: u32,
            account_id: Uuid,
            unit: &UnitTypeId,
        ) -> Result<Option<GarrisonStack>, ApplicationError> {
            let stacks = self.stacks.lock().unwrap();
            Ok(stacks.get(&(village_id, account_id, unit.clone())).cloned())
        }

        async fn list_by_village(
            &self,
            village_id: u32,
        ) -> Result<Vec<GarrisonStack>, ApplicationError> {
            let stacks = self.stacks.lock().unwrap();
            Ok(stacks
                .values()
                .filter(|s| s.village_id == village_id)
                .cloned()
                .collect())
        }

        async fn save(&self, stack: &GarrisonStack) -> Result<(), ApplicationError> {
            self.stacks.lock().unwrap().insert(
                (stack.village_id, stack.account_id, stack.unit.clone()),
                stack.clone(),
            );
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    pub struct MockMovementRepository {
        movements: Arc<Mutex<HashMap<Uuid, Movement>>>,
    }

    impl MockMovementRepository {
        pub fn all(&self) -> Vec<Movement> {
            self.movements.lock().unwrap().values().cloned().collect()
        }
    }

    #[async_trait]
    impl MovementRepository for MockMovementRepository {
        async fn add(&self, movement: &Movement) -> Result<(), ApplicationError> {
            self.movements
                .lock()
                .unwrap()
                .insert(movement.id, movement.clone());
            Ok(())
        }

        async fn get_by_id(&self, movement_id: Uuid) -> Result<Movement, ApplicationError> {
            let movements = self.movements.lock().unwrap();
            Ok(movements
                .get(&movement_id)
                .cloned()
                .ok_or(NotFoundError::Movement(movement_id))?)
        }

        async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<Movement>, ApplicationError> {
            let movements = self.movements.lock().unwrap();
            Ok(movements.values().filter(|m| m.is_due(now)).cloned().collect())
        }

        async fn list_by_account(
            &self,
            account_id: Uuid,
        ) -> Result<Vec<Movement>, ApplicationError> {
            let movements = self.movements.lock().unwrap();
            Ok(movements
                .values()
                .filter(|m| m.account_id == account_id)
                .cloned()
                .collect())
        }

        async fn save(&self, movement: &Movement) -> Result<(), ApplicationError> {
            self.add(movement).await
        }
    }

    #[derive(Default, Clone)]
    pub struct MockIdempotencyRepository {
        records: Arc<Mutex<HashMap<String, IdempotencyRecord>>>,
    }

    #[async_trait]
    impl IdempotencyRepository for MockIdempotencyRepository {
        async fn get(&self, key: &str) -> Result<Option<IdempotencyRecord>, ApplicationError> {
            Ok(self.records.lock().unwrap().get(key).cloned())
        }

        async fn save(&self, record: &IdempotencyRecord) -> Result<(), ApplicationError> {
            self.records
                .lock()
                .unwrap()
                .insert(record.key.clone(), record.clone());
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    pub struct MockVillageStateRepository {
        states: Arc<Mutex<HashMap<u32, VillageState>>>,
    }

    #[async_trait]
    impl VillageStateRepository for MockVillageStateRepository {
        async fn get_or_default(&self, village_id: u32) -> Result<VillageState, ApplicationError> {
            let states = self.states.lock().unwrap();
            Ok(states
                .get(&village_id)
                .cloned()
                .unwrap_or_else(|| VillageState::new(village_id)))
        }

        async fn save(&self, state: &VillageState) -> Result<(), ApplicationError> {
            self.states
                .lock()
                .unwrap()
                .insert(state.village_id, state.clone());
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    pub struct MockUnitOfWork {
        pub villages: Arc<MockVillageRepository>,
        pub rally_points: Arc<MockRallyPointRepository>,
        pub garrisons: Arc<MockGarrisonRepository>,
        pub movements: Arc<MockMovementRepository>,
        pub idempotency: Arc<MockIdempotencyRepository>,
        pub village_states: Arc<MockVillageStateRepository>,

        // Flags to check if commit/rollback was called
        committed: Arc<Mutex<bool>>,
        rolled_back: Arc<Mutex<bool>>,
    }

    impl MockUnitOfWork {
        pub fn new() -> Self {
            Default::default()
        }
    }

    #[async_trait]
    impl<'a> UnitOfWork<'a> for MockUnitOfWork {
        fn villages(&self) -> Arc<dyn VillageRepository + 'a> {
            self.villages.clone()
        }
        fn rally_points(&self) -> Arc<dyn RallyPointRepository + 'a> {
            self.rally_points.clone()
        }
        fn garrisons(&self) -> Arc<dyn GarrisonRepository + 'a> {
            self.garrisons.clone()
        }
        fn movements(&self) -> Arc<dyn MovementRepository + 'a> {
            self.movements.clone()
        }
        fn idempotency(&self) -> Arc<dyn IdempotencyRepository + 'a> {
            self.idempotency.clone()
        }
        fn village_states(&self) -> Arc<dyn VillageStateRepository + 'a> {
            self.village_states.clone()
        }

        async fn commit(self: Box<Self>) -> Result<(), ApplicationError> {
            *self.committed.lock().unwrap() = true;
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<(), ApplicationError> {
            *self.rolled_back.lock().unwrap() = true;
            Ok(())
        }
    }
}
