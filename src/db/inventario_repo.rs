// src/db/inventario_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

use crate::{common::error::AppError, models::Inventario};

#[derive(Clone)]
pub struct InventarioRepository {
    pool: SqlitePool,
}

impl InventarioRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---
    // Funciones de lectura
    // ---
    // Las lecturas sueltas son simples y pueden usar la pool principal.

    pub async fn listar(&self) -> Result<Vec<Inventario>, AppError> {
        let inventarios = sqlx::query_as::<_, Inventario>(
            "SELECT * FROM inventario ORDER BY articulo ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(inventarios)
    }

    pub async fn buscar_por_id<'e, E>(
        &self,
        executor: E,
        id: i64,
    ) -> Result<Option<Inventario>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let inventario = sqlx::query_as::<_, Inventario>("SELECT * FROM inventario WHERE id = ?1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(inventario)
    }

    pub async fn buscar_por_articulo<'e, E>(
        &self,
        executor: E,
        articulo: &str,
    ) -> Result<Option<Inventario>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let inventario =
            sqlx::query_as::<_, Inventario>("SELECT * FROM inventario WHERE articulo = ?1")
                .bind(articulo)
                .fetch_optional(executor)
                .await?;
        Ok(inventario)
    }

    // ---
    // Funciones de escritura (pensadas para correr dentro de una transacción)
    // ---

    pub async fn crear<'e, E>(
        &self,
        executor: E,
        articulo: &str,
        codigo: &str,
        cantidad: i64,
        entrada: i64,
        salida: i64,
    ) -> Result<Inventario, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let ahora = Utc::now();
        let inventario = sqlx::query_as::<_, Inventario>(
            r#"
            INSERT INTO inventario (articulo, codigo, cantidad, entrada, salida, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING *
            "#,
        )
        .bind(articulo)
        .bind(codigo)
        .bind(cantidad)
        .bind(entrada)
        .bind(salida)
        .bind(ahora)
        .fetch_one(executor)
        .await?;
        Ok(inventario)
    }

    /// Aplica deltas (con signo) sobre los tres saldos de una fila.
    /// Un solo UPDATE: la lectura previa y este ajuste viven en la misma
    /// transacción del servicio.
    pub async fn ajustar<'e, E>(
        &self,
        executor: E,
        id: i64,
        delta_cantidad: i64,
        delta_entrada: i64,
        delta_salida: i64,
    ) -> Result<Inventario, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let ahora = Utc::now();
        let inventario = sqlx::query_as::<_, Inventario>(
            r#"
            UPDATE inventario
            SET cantidad = cantidad + ?2,
                entrada  = entrada  + ?3,
                salida   = salida   + ?4,
                updated_at = ?5
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(delta_cantidad)
        .bind(delta_entrada)
        .bind(delta_salida)
        .bind(ahora)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::InventarioNoEncontrado)?;
        Ok(inventario)
    }

    /// Renombra el artículo (y su código) en una sola fila. Como el libro
    /// de movimientos enlaza por id, un renombre no toca ninguna otra tabla.
    pub async fn renombrar<'e, E>(
        &self,
        executor: E,
        id: i64,
        articulo: &str,
        codigo: &str,
    ) -> Result<Inventario, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let ahora = Utc::now();
        let inventario = sqlx::query_as::<_, Inventario>(
            r#"
            UPDATE inventario
            SET articulo = ?2, codigo = ?3, updated_at = ?4
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(articulo)
        .bind(codigo)
        .bind(ahora)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::InventarioNoEncontrado)?;
        Ok(inventario)
    }

    /// Actualización directa (pantalla de inventario): artículo, cantidad
    /// y código, sin tocar los acumulados.
    pub async fn actualizar<'e, E>(
        &self,
        executor: E,
        id: i64,
        articulo: &str,
        cantidad: i64,
        codigo: &str,
    ) -> Result<Inventario, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let ahora = Utc::now();
        let inventario = sqlx::query_as::<_, Inventario>(
            r#"
            UPDATE inventario
            SET articulo = ?2, cantidad = ?3, codigo = ?4, updated_at = ?5
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(articulo)
        .bind(cantidad)
        .bind(codigo)
        .bind(ahora)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::InventarioNoEncontrado)?;
        Ok(inventario)
    }

    pub async fn eliminar<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query("DELETE FROM inventario WHERE id = ?1")
            .bind(id)
            .execute(executor)
            .await?;
        if resultado.rows_affected() == 0 {
            return Err(AppError::InventarioNoEncontrado);
        }
        Ok(())
    }

    /// Upsert por artículo para la importación de inventario desde Excel:
    /// pisa cantidad/entrada/salida/código con lo que traiga la fila.
    pub async fn upsert_importacion(
        &self,
        conn: &mut SqliteConnection,
        articulo: &str,
        codigo: &str,
        cantidad: i64,
        entrada: i64,
        salida: i64,
    ) -> Result<Inventario, AppError> {
        // SQLite no tiene ON CONFLICT sobre columnas sin índice único, y
        // 'articulo' no lo es: se resuelve a mano dentro de la transacción.
        let existente = self.buscar_por_articulo(&mut *conn, articulo).await?;
        let ahora = Utc::now();
        let inventario = match existente {
            Some(inv) => {
                sqlx::query_as::<_, Inventario>(
                    r#"
                    UPDATE inventario
                    SET cantidad = ?2, entrada = ?3, salida = ?4, codigo = ?5, updated_at = ?6
                    WHERE id = ?1
                    RETURNING *
                    "#,
                )
                .bind(inv.id)
                .bind(cantidad)
                .bind(entrada)
                .bind(salida)
                .bind(codigo)
                .bind(ahora)
                .fetch_one(&mut *conn)
                .await?
            }
            None => {
                self.crear(&mut *conn, articulo, codigo, cantidad, entrada, salida)
                    .await?
            }
        };
        Ok(inventario)
    }

    /// Recalcula entrada/salida/cantidad de TODO el inventario a partir de
    /// ambos libros, agrupando por inventario_id. Es la segunda fase de las
    /// importaciones masivas (reemplazo destructivo + recomputación).
    pub async fn recalcular_saldos(&self, conn: &mut SqliteConnection) -> Result<(), AppError> {
        let ahora = Utc::now();
        sqlx::query(
            r#"
            UPDATE inventario
            SET entrada = COALESCE((SELECT SUM(e.cantidad) FROM entrada e WHERE e.inventario_id = inventario.id), 0),
                salida  = COALESCE((SELECT SUM(s.cantidad) FROM salida  s WHERE s.inventario_id = inventario.id), 0),
                updated_at = ?1
            "#,
        )
        .bind(ahora)
        .execute(&mut *conn)
        .await?;

        // En un UPDATE de SQLite las columnas de la derecha ya ven los
        // valores nuevos solo en una sentencia aparte.
        sqlx::query("UPDATE inventario SET cantidad = entrada - salida")
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
