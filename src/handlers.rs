use crate::errors::AppError;
use crate::models::{GoalRequest, IntakeAction, IntakeRequest, Snapshot, WeekResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};

// Every handler re-checks the day first so a request after a missed midnight sees the new day.

pub async fn get_today(State(state): State<AppState>) -> Json<Snapshot> {
    let mut engine = state.engine.lock().await;
    engine.resync().await;
    Json(engine.snapshot())
}

pub async fn get_week(State(state): State<AppState>) -> Json<WeekResponse> {
    let mut engine = state.engine.lock().await;
    engine.resync().await;
    Json(WeekResponse {
        today: engine.tracker().state().current_day,
        days: engine.week(),
    })
}

pub async fn intake(
    State(state): State<AppState>,
    Json(payload): Json<IntakeRequest>,
) -> Result<Json<Snapshot>, AppError> {
    let mut engine = state.engine.lock().await;
    engine.resync().await;
    match payload.action {
        IntakeAction::Add => engine.add_amount(payload.amount_ml).await?,
        IntakeAction::Subtract => engine.subtract_amount(payload.amount_ml).await?,
    }
    Ok(Json(engine.snapshot()))
}

pub async fn quick_add(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<Snapshot>, AppError> {
    let mut engine = state.engine.lock().await;
    engine.resync().await;
    engine
        .quick_add(index)
        .await
        .ok_or_else(|| AppError::not_found(format!("no quick-add preset {index}")))??;
    Ok(Json(engine.snapshot()))
}

pub async fn set_goal(
    State(state): State<AppState>,
    Json(payload): Json<GoalRequest>,
) -> Result<Json<Snapshot>, AppError> {
    let mut engine = state.engine.lock().await;
    engine.resync().await;
    engine.set_goal(payload.goal_ml).await?;
    Ok(Json(engine.snapshot()))
}

pub async fn reset(State(state): State<AppState>) -> Json<Snapshot> {
    let mut engine = state.engine.lock().await;
    engine.reset_all().await;
    Json(engine.snapshot())
}

pub async fn skip_day(State(state): State<AppState>) -> Result<Json<Snapshot>, AppError> {
    if !state.allow_day_skip {
        return Err(AppError::not_found("day skipping is disabled"));
    }
    let mut engine = state.engine.lock().await;
    engine.resync().await;
    engine.skip_day().await;
    Ok(Json(engine.snapshot()))
}
