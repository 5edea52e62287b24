#[cfg(test)]
pub mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Arc;
    use uuid::Uuid;

    use rallypoint_app::{
        app::RallyPointEngine,
        arrivals::worker::MovementWorker,
        clock::ManualClock,
        config::Config,
        cqrs::commands::{MissionTarget, SendMission},
        uow::UnitOfWorkProvider,
    };
    use rallypoint_db::uow::InMemoryUnitOfWorkProvider;
    use rallypoint_game::{
        battle::StandardCombatResolver,
        catalog::{StandardUnitCatalog, UnitCatalog},
        models::{village::Village, village_state::VillageState},
        night::{DisabledNightPolicy, NightPolicy},
        test_utils::{
            RallyPointFactoryOptions, VillageFactoryOptions, rally_point_factory, troops,
            village_factory,
        },
    };
    use rallypoint_types::{
        Result,
        army::{TechLevels, UnitTypeId},
        map::Position,
        mission::MissionKind,
        tribe::Tribe,
    };

    pub struct TestApp {
        pub engine: Arc<RallyPointEngine>,
        pub worker: Arc<MovementWorker>,
        pub provider: Arc<InMemoryUnitOfWorkProvider>,
        pub clock: Arc<ManualClock>,
    }

    /// Fixed start so night windows and travel math are reproducible.
    pub fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[allow(dead_code)]
    pub fn setup_app() -> TestApp {
        setup_app_with_night(Arc::new(DisabledNightPolicy))
    }

    #[allow(dead_code)]
    pub fn setup_app_with_night(night_policy: Arc<dyn NightPolicy>) -> TestApp {
        let config = Arc::new(Config::default());
        let provider = Arc::new(InMemoryUnitOfWorkProvider::new());
        let clock = Arc::new(ManualClock::new(start_time()));
        let catalog: Arc<dyn UnitCatalog> = Arc::new(StandardUnitCatalog::new());

        let engine = Arc::new(RallyPointEngine::new(
            config,
            provider.clone(),
            catalog.clone(),
            Arc::new(StandardCombatResolver::new(catalog)),
            night_policy,
            clock.clone(),
        ));
        let worker = Arc::new(MovementWorker::new(engine.clone()));

        TestApp {
            engine,
            worker,
            provider,
            clock,
        }
    }

    /// Creates a village with a rally point and a garrison owned by its account.
    #[allow(dead_code)]
    pub async fn setup_village(
        app: &TestApp,
        id: u32,
        position: Position,
        tribe: Tribe,
        units: &[(&str, u32)],
    ) -> Result<Village> {
        let village = village_factory(VillageFactoryOptions {
            id: Some(id),
            position: Some(position),
            tribe: Some(tribe),
            ..Default::default()
        });

        let uow = app.provider.tx().await?;
        uow.villages().save(&village).await?;
        uow.rally_points()
            .save(&rally_point_factory(RallyPointFactoryOptions {
                village_id: Some(village.id),
                ..Default::default()
            }))
            .await?;
        for (unit, count) in troops(units) {
            uow.garrisons()
                .deposit(village.id, village.account_id, &unit, count, None)
                .await?;
        }
        uow.commit().await?;

        Ok(village)
    }

    #[allow(dead_code)]
    pub async fn set_protection(app: &TestApp, village: &Village, protected: bool) -> Result<()> {
        let mut village = village.clone();
        village.beginner_protection = protected;
        let uow = app.provider.tx().await?;
        uow.villages().save(&village).await?;
        uow.commit().await
    }

    #[allow(dead_code)]
    pub async fn set_village_state(app: &TestApp, state: &VillageState) -> Result<()> {
        let uow = app.provider.tx().await?;
        uow.village_states().save(state).await?;
        uow.commit().await
    }

    #[allow(dead_code)]
    pub async fn set_tech(
        app: &TestApp,
        village_id: u32,
        account_id: Uuid,
        unit: &str,
        tech: TechLevels,
    ) -> Result<()> {
        let uow = app.provider.tx().await?;
        let unit = UnitTypeId::new(unit);
        if let Some(mut stack) = uow.garrisons().get(village_id, account_id, &unit).await? {
            stack.tech = Some(tech);
            uow.garrisons().save(&stack).await?;
        }
        uow.commit().await
    }

    /// Units of `account_id` stationed at `village_id`.
    #[allow(dead_code)]
    pub async fn garrison_count(
        app: &TestApp,
        village_id: u32,
        account_id: Uuid,
        unit: &str,
    ) -> Result<u32> {
        let uow = app.provider.tx().await?;
        let stack = uow
            .garrisons()
            .get(village_id, account_id, &UnitTypeId::new(unit))
            .await?;
        uow.rollback().await?;
        Ok(stack.map(|s| s.count()).unwrap_or(0))
    }

    #[allow(dead_code)]
    pub fn mission(
        from: &Village,
        to: &Village,
        kind: MissionKind,
        units: &[(&str, u32)],
    ) -> SendMission {
        SendMission {
            idempotency_key: Uuid::new_v4().to_string(),
            account_id: from.account_id,
            source_village_id: from.id,
            kind,
            target: MissionTarget::Village(to.id),
            units: troops(units),
            catapult_targets: vec![],
            preferred_arrival: None,
        }
    }
}
