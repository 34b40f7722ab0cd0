// src/handlers/entradas.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError, config::AppState, services::entrada_service::FilaEntrada,
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PayloadEntrada {
    #[validate(length(min = 1, message = "El artículo es obligatorio."))]
    pub articulo: String,

    #[validate(range(min = 1, message = "La cantidad debe ser un entero positivo."))]
    pub cantidad: i64,

    #[validate(length(min = 1, message = "El código es obligatorio."))]
    pub codigo: String,

    pub fecha: NaiveDate,
}

// ---
// Handlers
// ---

pub async fn crear(
    State(app_state): State<AppState>,
    Json(payload): Json<PayloadEntrada>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entrada = app_state
        .entrada_service
        .crear(&payload.articulo, payload.cantidad, &payload.codigo, payload.fecha)
        .await?;

    Ok((StatusCode::CREATED, Json(entrada)))
}

pub async fn listar(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let entradas = app_state.entrada_service.listar().await?;
    Ok(Json(entradas))
}

pub async fn editar(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PayloadEntrada>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entrada = app_state
        .entrada_service
        .editar(id, &payload.articulo, payload.cantidad, &payload.codigo, payload.fecha)
        .await?;

    Ok(Json(entrada))
}

pub async fn eliminar(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let reversion = app_state.entrada_service.eliminar(id).await?;

    Ok(Json(json!({
        "mensaje": "Entrada eliminada.",
        "inventarioAjustado": reversion.inventario_ajustado(),
    })))
}

pub async fn importar(
    State(app_state): State<AppState>,
    Json(filas): Json<Vec<FilaEntrada>>,
) -> Result<impl IntoResponse, AppError> {
    let insertadas = app_state.entrada_service.importar(&filas).await?;

    Ok(Json(json!({
        "mensaje": "Importación de entradas completada.",
        "insertadas": insertadas,
    })))
}
