// src/handlers/inventario.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError, config::AppState, services::inventario_service::FilaInventario,
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PayloadInventario {
    #[validate(length(min = 1, message = "El artículo es obligatorio."))]
    pub articulo: String,

    #[validate(range(min = 1, message = "La cantidad debe ser un entero positivo."))]
    pub cantidad: i64,

    #[validate(length(min = 1, message = "El código es obligatorio."))]
    pub codigo: String,
}

/// La corrección manual sí admite cantidad cero (dejar un artículo sin
/// stock es un estado válido).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PayloadCorreccion {
    #[validate(length(min = 1, message = "El artículo es obligatorio."))]
    pub articulo: String,

    #[validate(range(min = 0, message = "La cantidad no puede ser negativa."))]
    pub cantidad: i64,

    #[validate(length(min = 1, message = "El código es obligatorio."))]
    pub codigo: String,
}

// ---
// Handlers
// ---

pub async fn crear(
    State(app_state): State<AppState>,
    Json(payload): Json<PayloadInventario>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let inventario = app_state
        .inventario_service
        .crear(&payload.articulo, payload.cantidad, &payload.codigo)
        .await?;

    Ok((StatusCode::CREATED, Json(inventario)))
}

pub async fn listar(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let inventarios = app_state.inventario_service.listar().await?;
    Ok(Json(inventarios))
}

pub async fn buscar(
    State(app_state): State<AppState>,
    Path(articulo): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let inventario = app_state
        .inventario_service
        .buscar_por_articulo(&articulo)
        .await?;
    Ok(Json(inventario))
}

pub async fn actualizar(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PayloadCorreccion>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let inventario = app_state
        .inventario_service
        .actualizar(id, &payload.articulo, payload.cantidad, &payload.codigo)
        .await?;

    Ok(Json(inventario))
}

pub async fn eliminar(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.inventario_service.eliminar(id).await?;
    Ok(Json(json!({ "mensaje": "Inventario eliminado." })))
}

pub async fn importar(
    State(app_state): State<AppState>,
    Json(filas): Json<Vec<FilaInventario>>,
) -> Result<impl IntoResponse, AppError> {
    let aplicadas = app_state.inventario_service.importar(&filas).await?;

    Ok(Json(json!({
        "mensaje": "Importación de inventario completada.",
        "aplicadas": aplicadas,
    })))
}
