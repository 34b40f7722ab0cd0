// src/db/encargados_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

use crate::{
    common::error::AppError,
    models::{Area, Encargado},
};

/// Regla de normalización para comparar nombres escritos a mano:
/// recorte de espacios + minúsculas. Es la única regla; cualquier
/// búsqueda "sin distinguir mayúsculas" del sistema pasa por aquí.
pub fn normalizar_nombre(nombre: &str) -> String {
    nombre.trim().to_lowercase()
}

#[derive(Clone)]
pub struct EncargadosRepository {
    pool: SqlitePool,
}

impl EncargadosRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---
    // Encargados
    // ---

    pub async fn listar_encargados(&self) -> Result<Vec<Encargado>, AppError> {
        let encargados =
            sqlx::query_as::<_, Encargado>("SELECT * FROM encargados ORDER BY nombre ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(encargados)
    }

    pub async fn buscar_encargado<'e, E>(
        &self,
        executor: E,
        id: i64,
    ) -> Result<Option<Encargado>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let encargado = sqlx::query_as::<_, Encargado>("SELECT * FROM encargados WHERE id = ?1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(encargado)
    }

    pub async fn crear_encargado<'e, E>(
        &self,
        executor: E,
        nombre: &str,
    ) -> Result<Encargado, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let encargado = sqlx::query_as::<_, Encargado>(
            "INSERT INTO encargados (nombre, created_at) VALUES (?1, ?2) RETURNING *",
        )
        .bind(nombre.trim())
        .bind(Utc::now())
        .fetch_one(executor)
        .await?;
        Ok(encargado)
    }

    /// Busca por nombre normalizado; si no existe, lo crea. Idempotente
    /// dentro de la transacción de la operación que lo invoque.
    pub async fn resolver_o_crear_encargado(
        &self,
        conn: &mut SqliteConnection,
        nombre: &str,
    ) -> Result<Encargado, AppError> {
        let existente = sqlx::query_as::<_, Encargado>(
            "SELECT * FROM encargados WHERE LOWER(TRIM(nombre)) = ?1",
        )
        .bind(normalizar_nombre(nombre))
        .fetch_optional(&mut *conn)
        .await?;

        match existente {
            Some(encargado) => Ok(encargado),
            None => self.crear_encargado(&mut *conn, nombre).await,
        }
    }

    pub async fn eliminar_encargado<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query("DELETE FROM encargados WHERE id = ?1")
            .bind(id)
            .execute(executor)
            .await?;
        if resultado.rows_affected() == 0 {
            return Err(AppError::EncargadoNoEncontrado);
        }
        Ok(())
    }

    // ---
    // Áreas
    // ---

    pub async fn listar_areas(&self) -> Result<Vec<Area>, AppError> {
        let areas = sqlx::query_as::<_, Area>("SELECT * FROM areas ORDER BY nombre ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(areas)
    }

    pub async fn buscar_area<'e, E>(&self, executor: E, id: i64) -> Result<Option<Area>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let area = sqlx::query_as::<_, Area>("SELECT * FROM areas WHERE id = ?1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(area)
    }

    pub async fn crear_area<'e, E>(&self, executor: E, nombre: &str) -> Result<Area, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let area = sqlx::query_as::<_, Area>(
            "INSERT INTO areas (nombre, created_at) VALUES (?1, ?2) RETURNING *",
        )
        .bind(nombre.trim())
        .bind(Utc::now())
        .fetch_one(executor)
        .await?;
        Ok(area)
    }

    pub async fn resolver_o_crear_area(
        &self,
        conn: &mut SqliteConnection,
        nombre: &str,
    ) -> Result<Area, AppError> {
        let existente =
            sqlx::query_as::<_, Area>("SELECT * FROM areas WHERE LOWER(TRIM(nombre)) = ?1")
                .bind(normalizar_nombre(nombre))
                .fetch_optional(&mut *conn)
                .await?;

        match existente {
            Some(area) => Ok(area),
            None => self.crear_area(&mut *conn, nombre).await,
        }
    }

    // ---
    // Relación muchos-a-muchos
    // ---

    /// Asocia encargado y área. INSERT OR IGNORE: repetir el vínculo no
    /// es un error.
    pub async fn vincular<'e, E>(
        &self,
        executor: E,
        area_id: i64,
        encargado_id: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("INSERT OR IGNORE INTO area_encargado (area_id, encargado_id) VALUES (?1, ?2)")
            .bind(area_id)
            .bind(encargado_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn desvincular<'e, E>(
        &self,
        executor: E,
        area_id: i64,
        encargado_id: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("DELETE FROM area_encargado WHERE area_id = ?1 AND encargado_id = ?2")
            .bind(area_id)
            .bind(encargado_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn encargados_de_area(&self, area_id: i64) -> Result<Vec<Encargado>, AppError> {
        let encargados = sqlx::query_as::<_, Encargado>(
            r#"
            SELECT e.*
            FROM encargados e
            INNER JOIN area_encargado ae ON ae.encargado_id = e.id
            WHERE ae.area_id = ?1
            ORDER BY e.nombre ASC
            "#,
        )
        .bind(area_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(encargados)
    }

    pub async fn areas_de_encargado(&self, encargado_id: i64) -> Result<Vec<Area>, AppError> {
        let areas = sqlx::query_as::<_, Area>(
            r#"
            SELECT a.*
            FROM areas a
            INNER JOIN area_encargado ae ON ae.area_id = a.id
            WHERE ae.encargado_id = ?1
            ORDER BY a.nombre ASC
            "#,
        )
        .bind(encargado_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(areas)
    }
}

#[cfg(test)]
mod tests {
    use super::normalizar_nombre;

    #[test]
    fn normaliza_espacios_y_mayusculas() {
        assert_eq!(normalizar_nombre("  Almacén Central  "), "almacén central");
        assert_eq!(normalizar_nombre("JUAN"), "juan");
        assert_eq!(normalizar_nombre("juan"), "juan");
    }

    #[test]
    fn cadena_vacia_queda_vacia() {
        assert_eq!(normalizar_nombre("   "), "");
    }
}
