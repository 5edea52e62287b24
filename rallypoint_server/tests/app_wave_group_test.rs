mod test_utils;

use chrono::Duration;
use uuid::Uuid;

use rallypoint_app::{
    cqrs::commands::{MissionTarget, SendWaveGroup, WaveMember},
    uow::UnitOfWorkProvider,
};
use rallypoint_game::{
    models::{rally_point::RallyPoint, village::Village},
    test_utils::troops,
};
use rallypoint_types::{
    Result,
    errors::{ApplicationError, ValidationError},
    map::Position,
    mission::MissionKind,
    tribe::Tribe,
};

use crate::test_utils::tests::{TestApp, garrison_count, setup_app, setup_village, start_time};

fn member(from: &Village, to: &Village, units: &[(&str, u32)]) -> WaveMember {
    WaveMember {
        source_village_id: from.id,
        kind: MissionKind::Attack,
        target: MissionTarget::Village(to.id),
        units: troops(units),
        catapult_targets: vec![],
    }
}

fn wave(from: &Village, members: Vec<WaveMember>, hours: i64) -> SendWaveGroup {
    SendWaveGroup {
        idempotency_key: Uuid::new_v4().to_string(),
        account_id: from.account_id,
        tag: "morning".to_string(),
        arrive_at: start_time() + Duration::hours(hours),
        members,
    }
}

async fn set_wave_window(app: &TestApp, village_id: u32, window_ms: u32) -> Result<()> {
    let uow = app.provider.tx().await?;
    uow.rally_points()
        .save(&RallyPoint::new(village_id, 1).with_wave_window(window_ms))
        .await?;
    uow.commit().await
}

async fn setup_villages(app: &TestApp) -> Result<(Village, Village)> {
    let source = setup_village(
        app,
        1,
        Position::new(0, 0),
        Tribe::Teuton,
        &[("maceman", 100), ("axeman", 50), ("catapult", 10)],
    )
    .await?;
    let target = setup_village(app, 2, Position::new(6, 8), Tribe::Roman, &[]).await?;
    Ok((source, target))
}

#[tokio::test]
async fn test_wave_lands_within_window() -> Result<()> {
    let app = setup_app();
    let (source, target) = setup_villages(&app).await?;
    set_wave_window(&app, source.id, 50).await?;

    let cmd = wave(
        &source,
        vec![
            member(&source, &target, &[("maceman", 40)]),
            member(&source, &target, &[("axeman", 20), ("catapult", 5)]),
            member(&source, &target, &[("maceman", 40)]),
        ],
        3,
    );
    let dispatches = app.engine.send_wave_group(cmd).await?;
    assert_eq!(dispatches.len(), 3);

    let landings: Vec<_> = dispatches.iter().map(|d| d.movement.arrive_at).collect();
    let earliest = landings.iter().min().copied().expect("wave is not empty");
    let latest = landings.iter().max().copied().expect("wave is not empty");
    assert!(latest - earliest <= Duration::milliseconds(50));

    // Slower members leave first
    assert!(dispatches[1].movement.depart_at < dispatches[0].movement.depart_at);
    for (index, dispatch) in dispatches.iter().enumerate() {
        let wave = dispatch.movement.wave.as_ref().expect("member of a wave");
        assert_eq!(wave.tag, "morning");
        assert_eq!(wave.index, index as u32);
    }

    assert_eq!(
        garrison_count(&app, source.id, source.account_id, "maceman").await?,
        20
    );
    assert_eq!(
        garrison_count(&app, source.id, source.account_id, "catapult").await?,
        5
    );

    Ok(())
}

#[tokio::test]
async fn test_wave_resolves_in_member_order() -> Result<()> {
    let app = setup_app();
    let (source, target) = setup_villages(&app).await?;

    let cmd = wave(
        &source,
        vec![
            member(&source, &target, &[("maceman", 10)]),
            member(&source, &target, &[("axeman", 10)]),
        ],
        3,
    );
    let dispatches = app.engine.send_wave_group(cmd).await?;

    app.clock.advance(Duration::hours(3));
    let resolved = app.engine.resolve_due_movements(None).await?;
    let order: Vec<Uuid> = resolved
        .iter()
        .filter(|r| r.movement.wave.is_some())
        .map(|r| r.movement.id)
        .collect();
    assert_eq!(
        order,
        vec![dispatches[0].movement.id, dispatches[1].movement.id]
    );

    Ok(())
}

#[tokio::test]
async fn test_wave_is_all_or_nothing() -> Result<()> {
    let app = setup_app();
    let (source, target) = setup_villages(&app).await?;

    let cmd = wave(
        &source,
        vec![
            member(&source, &target, &[("maceman", 60)]),
            member(&source, &target, &[("maceman", 60)]),
        ],
        3,
    );
    let result = app.engine.send_wave_group(cmd).await;

    assert!(matches!(
        result,
        Err(ApplicationError::Validation(
            ValidationError::InsufficientTroops { .. }
        ))
    ));
    assert_eq!(
        garrison_count(&app, source.id, source.account_id, "maceman").await?,
        100
    );
    assert!(app.engine.movements_of(source.account_id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_wave_rejects_unreachable_arrival() -> Result<()> {
    let app = setup_app();
    let (source, target) = setup_villages(&app).await?;

    // Catapults need 10/6 hours to cover the distance
    let cmd = wave(
        &source,
        vec![
            member(&source, &target, &[("maceman", 10)]),
            member(&source, &target, &[("catapult", 1)]),
        ],
        1,
    );
    let result = app.engine.send_wave_group(cmd).await;

    assert!(matches!(
        result,
        Err(ApplicationError::Validation(
            ValidationError::WaveArrivalUnreachable { index: 1, .. }
        ))
    ));
    assert_eq!(
        garrison_count(&app, source.id, source.account_id, "maceman").await?,
        100
    );

    Ok(())
}
