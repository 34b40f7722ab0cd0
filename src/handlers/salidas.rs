// src/handlers/salidas.rs

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
    common::error::AppError,
    config::AppState,
    services::salida_service::{EdicionSalida, NuevaSalida},
};

// ---
// Payloads
// ---

/// El área y el destinatario aceptan id o nombre libre; con nombre, el
/// registro lateral se resuelve o se crea sin distinguir mayúsculas.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PayloadSalida {
    #[validate(length(min = 1, message = "El artículo es obligatorio."))]
    pub articulo: String,

    #[validate(range(min = 1, message = "La cantidad debe ser un entero positivo."))]
    pub cantidad: i64,

    pub codigo: Option<String>,

    pub fecha: NaiveDate,

    pub area_id: Option<i64>,
    pub area: Option<String>,

    pub destinatario_id: Option<i64>,
    pub destinatario: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PayloadEdicionSalida {
    #[validate(length(min = 1, message = "El artículo es obligatorio."))]
    pub articulo: String,

    #[validate(range(min = 1, message = "La cantidad debe ser un entero positivo."))]
    pub cantidad: i64,

    pub fecha: NaiveDate,

    #[serde(default)]
    pub area: String,

    #[validate(length(min = 1, message = "El destinatario es obligatorio."))]
    pub destinatario: String,
}

// ---
// Handlers
// ---

pub async fn crear(
    State(app_state): State<AppState>,
    Json(payload): Json<PayloadSalida>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let salida = app_state
        .salida_service
        .crear(NuevaSalida {
            articulo: payload.articulo,
            cantidad: payload.cantidad,
            codigo: payload.codigo,
            fecha: payload.fecha,
            area_id: payload.area_id,
            area: payload.area,
            destinatario_id: payload.destinatario_id,
            destinatario: payload.destinatario,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(salida)))
}

pub async fn listar(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let salidas = app_state.salida_service.listar().await?;
    Ok(Json(salidas))
}

pub async fn editar(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PayloadEdicionSalida>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let salida = app_state
        .salida_service
        .editar(
            id,
            EdicionSalida {
                articulo: payload.articulo,
                cantidad: payload.cantidad,
                fecha: payload.fecha,
                area: payload.area,
                destinatario: payload.destinatario,
            },
        )
        .await?;

    Ok(Json(salida))
}

pub async fn eliminar(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let reversion = app_state.salida_service.eliminar(id).await?;

    Ok(Json(json!({
        "mensaje": "Salida eliminada.",
        "inventarioAjustado": reversion.inventario_ajustado(),
    })))
}

/// La planilla llega como grilla cruda de celdas de texto; la ubicación
/// del encabezado y la interpretación de filas corren en el servicio.
pub async fn importar(
    State(app_state): State<AppState>,
    Json(filas): Json<Vec<Vec<String>>>,
) -> Result<impl IntoResponse, AppError> {
    let insertadas = app_state.salida_service.importar(&filas).await?;

    Ok(Json(json!({
        "mensaje": "Importación de salidas completada.",
        "insertadas": insertadas,
    })))
}
