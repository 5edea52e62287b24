mod test_utils;

use chrono::Duration;
use uuid::Uuid;

use rallypoint_app::cqrs::commands::CancelMovement;
use rallypoint_types::{Result, map::Position, mission::{MissionKind, MovementStatus}, tribe::Tribe};

use crate::test_utils::tests::{garrison_count, mission, setup_app, setup_village};

fn cancel(movement_id: Uuid, account_id: Uuid) -> CancelMovement {
    CancelMovement {
        idempotency_key: Uuid::new_v4().to_string(),
        movement_id,
        account_id,
    }
}

#[tokio::test]
async fn test_cancel_within_grace_restores_troops() -> Result<()> {
    let app = setup_app();
    let source =
        setup_village(&app, 1, Position::new(0, 0), Tribe::Teuton, &[("maceman", 80)]).await?;
    let target = setup_village(&app, 2, Position::new(20, 0), Tribe::Roman, &[]).await?;

    let dispatch = app
        .engine
        .send_mission(mission(&source, &target, MissionKind::Attack, &[("maceman", 50)]))
        .await?;
    assert_eq!(
        garrison_count(&app, source.id, source.account_id, "maceman").await?,
        30
    );

    app.clock.advance(Duration::seconds(30));
    let cancelled = app
        .engine
        .cancel_movement(cancel(dispatch.movement.id, source.account_id))
        .await?;
    assert!(cancelled);
    assert_eq!(
        garrison_count(&app, source.id, source.account_id, "maceman").await?,
        80
    );

    let movements = app.engine.movements_of(source.account_id).await?;
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].status(), MovementStatus::Cancelled);

    // A cancelled movement never resolves
    app.clock.set(dispatch.movement.arrive_at);
    assert!(app.engine.resolve_due_movements(None).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_cancel_after_grace_is_refused() -> Result<()> {
    let app = setup_app();
    let source =
        setup_village(&app, 1, Position::new(0, 0), Tribe::Teuton, &[("maceman", 80)]).await?;
    let target = setup_village(&app, 2, Position::new(20, 0), Tribe::Roman, &[]).await?;

    let dispatch = app
        .engine
        .send_mission(mission(&source, &target, MissionKind::Attack, &[("maceman", 50)]))
        .await?;

    app.clock.advance(Duration::seconds(91));
    let cancelled = app
        .engine
        .cancel_movement(cancel(dispatch.movement.id, source.account_id))
        .await?;
    assert!(!cancelled);
    assert_eq!(
        garrison_count(&app, source.id, source.account_id, "maceman").await?,
        30
    );
    let movements = app.engine.movements_of(source.account_id).await?;
    assert_eq!(movements[0].status(), MovementStatus::EnRoute);

    Ok(())
}

#[tokio::test]
async fn test_cancel_after_arrival_is_refused() -> Result<()> {
    let app = setup_app();
    let source =
        setup_village(&app, 1, Position::new(0, 0), Tribe::Teuton, &[("maceman", 80)]).await?;
    let target = setup_village(&app, 2, Position::new(1, 0), Tribe::Roman, &[]).await?;

    let dispatch = app
        .engine
        .send_mission(mission(&source, &target, MissionKind::Reinforce, &[("maceman", 50)]))
        .await?;

    app.clock.set(dispatch.movement.arrive_at);
    app.engine.resolve_due_movements(None).await?;

    let cancelled = app
        .engine
        .cancel_movement(cancel(dispatch.movement.id, source.account_id))
        .await?;
    assert!(!cancelled);
    assert_eq!(
        garrison_count(&app, target.id, source.account_id, "maceman").await?,
        50
    );

    Ok(())
}
