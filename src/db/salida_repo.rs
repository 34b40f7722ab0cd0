// src/db/salida_repo.rs

use chrono::{NaiveDate, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{common::error::AppError, models::Salida};

#[derive(Clone)]
pub struct SalidaRepository {
    pool: SqlitePool,
}

impl SalidaRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Las lecturas sueltas son simples y pueden usar la pool principal.
    pub async fn listar(&self) -> Result<Vec<Salida>, AppError> {
        let salidas = sqlx::query_as::<_, Salida>("SELECT * FROM salida ORDER BY fecha DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(salidas)
    }

    pub async fn buscar_por_id<'e, E>(
        &self,
        executor: E,
        id: i64,
    ) -> Result<Option<Salida>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let salida = sqlx::query_as::<_, Salida>("SELECT * FROM salida WHERE id = ?1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(salida)
    }

    pub async fn insertar<'e, E>(
        &self,
        executor: E,
        articulo: &str,
        codigo: &str,
        cantidad: i64,
        fecha: NaiveDate,
        area: &str,
        destinatario: &str,
        inventario_id: i64,
    ) -> Result<Salida, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let ahora = Utc::now();
        let salida = sqlx::query_as::<_, Salida>(
            r#"
            INSERT INTO salida (articulo, codigo, cantidad, fecha, area, destinatario, inventario_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            RETURNING *
            "#,
        )
        .bind(articulo)
        .bind(codigo)
        .bind(cantidad)
        .bind(fecha)
        .bind(area)
        .bind(destinatario)
        .bind(inventario_id)
        .bind(ahora)
        .fetch_one(executor)
        .await?;
        Ok(salida)
    }

    /// Actualiza los campos propios de la fila. A propósito NO re-resuelve
    /// ni re-enlaza área/destinatario: en la edición son texto histórico.
    pub async fn actualizar<'e, E>(
        &self,
        executor: E,
        id: i64,
        articulo: &str,
        cantidad: i64,
        fecha: NaiveDate,
        area: &str,
        destinatario: &str,
    ) -> Result<Salida, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let ahora = Utc::now();
        let salida = sqlx::query_as::<_, Salida>(
            r#"
            UPDATE salida
            SET articulo = ?2, cantidad = ?3, fecha = ?4, area = ?5, destinatario = ?6, updated_at = ?7
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(articulo)
        .bind(cantidad)
        .bind(fecha)
        .bind(area)
        .bind(destinatario)
        .bind(ahora)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::SalidaNoEncontrada)?;
        Ok(salida)
    }

    pub async fn eliminar<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query("DELETE FROM salida WHERE id = ?1")
            .bind(id)
            .execute(executor)
            .await?;
        if resultado.rows_affected() == 0 {
            return Err(AppError::SalidaNoEncontrada);
        }
        Ok(())
    }

    /// Vacía el libro completo. Solo lo usa la importación masiva.
    pub async fn eliminar_todas<'e, E>(&self, executor: E) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query("DELETE FROM salida").execute(executor).await?;
        Ok(resultado.rows_affected())
    }
}
