// src/models/movimientos.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Movimiento de entrada (mercancía que llega al almacén).
//
// inventario_id se captura al crear la fila y nunca se vuelve a resolver
// por nombre. Queda en NULL solo si el inventario enlazado se borra a mano
// (no hay cascada).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Entrada {
    pub id: i64,
    pub articulo: String,
    pub codigo: String,
    pub cantidad: i64,
    pub fecha: NaiveDate,
    pub inventario_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Movimiento de salida (mercancía entregada a un área / destinatario).
// 'area' puede ser cadena vacía: una salida sin área es representable.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Salida {
    pub id: i64,
    pub articulo: String,
    pub codigo: String,
    pub cantidad: i64,
    pub fecha: NaiveDate,
    pub area: String,
    pub destinatario: String,
    pub inventario_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
