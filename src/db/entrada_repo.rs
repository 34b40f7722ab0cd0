// src/db/entrada_repo.rs

use chrono::{NaiveDate, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{common::error::AppError, models::Entrada};

#[derive(Clone)]
pub struct EntradaRepository {
    pool: SqlitePool,
}

impl EntradaRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Las lecturas sueltas son simples y pueden usar la pool principal.
    pub async fn listar(&self) -> Result<Vec<Entrada>, AppError> {
        let entradas =
            sqlx::query_as::<_, Entrada>("SELECT * FROM entrada ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(entradas)
    }

    pub async fn buscar_por_id<'e, E>(
        &self,
        executor: E,
        id: i64,
    ) -> Result<Option<Entrada>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let entrada = sqlx::query_as::<_, Entrada>("SELECT * FROM entrada WHERE id = ?1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(entrada)
    }

    pub async fn insertar<'e, E>(
        &self,
        executor: E,
        articulo: &str,
        codigo: &str,
        cantidad: i64,
        fecha: NaiveDate,
        inventario_id: i64,
    ) -> Result<Entrada, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let ahora = Utc::now();
        let entrada = sqlx::query_as::<_, Entrada>(
            r#"
            INSERT INTO entrada (articulo, codigo, cantidad, fecha, inventario_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING *
            "#,
        )
        .bind(articulo)
        .bind(codigo)
        .bind(cantidad)
        .bind(fecha)
        .bind(inventario_id)
        .bind(ahora)
        .fetch_one(executor)
        .await?;
        Ok(entrada)
    }

    pub async fn actualizar<'e, E>(
        &self,
        executor: E,
        id: i64,
        articulo: &str,
        codigo: &str,
        cantidad: i64,
        fecha: NaiveDate,
    ) -> Result<Entrada, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let ahora = Utc::now();
        let entrada = sqlx::query_as::<_, Entrada>(
            r#"
            UPDATE entrada
            SET articulo = ?2, codigo = ?3, cantidad = ?4, fecha = ?5, updated_at = ?6
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(articulo)
        .bind(codigo)
        .bind(cantidad)
        .bind(fecha)
        .bind(ahora)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::EntradaNoEncontrada)?;
        Ok(entrada)
    }

    pub async fn eliminar<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query("DELETE FROM entrada WHERE id = ?1")
            .bind(id)
            .execute(executor)
            .await?;
        if resultado.rows_affected() == 0 {
            return Err(AppError::EntradaNoEncontrada);
        }
        Ok(())
    }

    /// Vacía el libro completo. Solo lo usa la importación masiva, que
    /// reemplaza todas las filas y después recalcula los saldos.
    pub async fn eliminar_todas<'e, E>(&self, executor: E) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query("DELETE FROM entrada").execute(executor).await?;
        Ok(resultado.rows_affected())
    }
}
