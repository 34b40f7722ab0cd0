// src/models/encargados.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Departamento / destino que puede recibir mercancía.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: i64,
    pub nombre: String,
    pub created_at: DateTime<Utc>,
}

// Persona responsable de recibir mercancía, asociable a varias áreas
// (tabla de unión area_encargado).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Encargado {
    pub id: i64,
    pub nombre: String,
    pub created_at: DateTime<Utc>,
}
