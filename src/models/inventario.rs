// src/models/inventario.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// El saldo corriente por artículo. Única fuente de verdad del stock:
// cantidad debe coincidir con entrada - salida después de cada operación
// unitaria del libro de movimientos.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Inventario {
    pub id: i64,
    pub articulo: String,
    pub codigo: String,
    pub cantidad: i64,
    pub entrada: i64,
    pub salida: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
