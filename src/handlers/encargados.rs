// src/handlers/encargados.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{common::error::AppError, config::AppState};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PayloadEncargado {
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub nombre: String,

    #[serde(default)]
    pub area_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadVinculo {
    pub area_id: i64,
    pub encargado_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PayloadArea {
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub nombre: String,
}

// ---
// Handlers: encargados
// ---

pub async fn listar(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let encargados = app_state.encargados_service.listar().await?;
    Ok(Json(encargados))
}

pub async fn crear(
    State(app_state): State<AppState>,
    Json(payload): Json<PayloadEncargado>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let encargado = app_state
        .encargados_service
        .crear_con_areas(&payload.nombre, &payload.area_ids)
        .await?;

    Ok((StatusCode::CREATED, Json(encargado)))
}

pub async fn asignar(
    State(app_state): State<AppState>,
    Json(payload): Json<PayloadVinculo>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .encargados_service
        .asignar(payload.area_id, payload.encargado_id)
        .await?;
    Ok(Json(json!({ "mensaje": "Encargado asignado al área." })))
}

pub async fn quitar(
    State(app_state): State<AppState>,
    Json(payload): Json<PayloadVinculo>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .encargados_service
        .quitar(payload.area_id, payload.encargado_id)
        .await?;
    Ok(Json(json!({ "mensaje": "Encargado desvinculado del área." })))
}

pub async fn por_area(
    State(app_state): State<AppState>,
    Path(area_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let encargados = app_state
        .encargados_service
        .encargados_por_area(area_id)
        .await?;
    Ok(Json(encargados))
}

pub async fn areas_por_encargado(
    State(app_state): State<AppState>,
    Path(encargado_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let areas = app_state
        .encargados_service
        .areas_por_encargado(encargado_id)
        .await?;
    Ok(Json(areas))
}

pub async fn eliminar(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.encargados_service.eliminar(id).await?;
    Ok(Json(json!({ "mensaje": "Encargado eliminado." })))
}

// ---
// Handlers: áreas
// ---

pub async fn listar_areas(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let areas = app_state.encargados_service.listar_areas().await?;
    Ok(Json(areas))
}

pub async fn crear_area(
    State(app_state): State<AppState>,
    Json(payload): Json<PayloadArea>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let area = app_state.encargados_service.crear_area(&payload.nombre).await?;
    Ok((StatusCode::CREATED, Json(area)))
}
