// src/services/inventario_service.rs

use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    common::error::AppError, db::InventarioRepository, models::Inventario,
    services::validar_cantidad_positiva,
};

/// Fila de la planilla de inventario ya decodificada por el cliente.
/// Los acumulados son opcionales: la planilla puede traer solo el stock.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilaInventario {
    #[serde(default)]
    pub articulo: String,
    #[serde(default)]
    pub codigo: String,
    pub cantidad: Option<i64>,
    pub entrada: Option<i64>,
    pub salida: Option<i64>,
}

#[derive(Clone)]
pub struct InventarioService {
    inventario_repo: InventarioRepository,
    pool: SqlitePool,
}

impl InventarioService {
    pub fn new(inventario_repo: InventarioRepository, pool: SqlitePool) -> Self {
        Self {
            inventario_repo,
            pool,
        }
    }

    pub async fn listar(&self) -> Result<Vec<Inventario>, AppError> {
        self.inventario_repo.listar().await
    }

    pub async fn buscar_por_articulo(&self, articulo: &str) -> Result<Inventario, AppError> {
        self.inventario_repo
            .buscar_por_articulo(&self.pool, articulo)
            .await?
            .ok_or(AppError::InventarioNoEncontrado)
    }

    /// Alta manual: el stock inicial cuenta como entrada acumulada para
    /// que cantidad = entrada - salida valga desde el primer día.
    pub async fn crear(
        &self,
        articulo: &str,
        cantidad: i64,
        codigo: &str,
    ) -> Result<Inventario, AppError> {
        validar_cantidad_positiva(cantidad)?;
        let mut tx = self.pool.begin().await?;
        let inventario = self
            .inventario_repo
            .crear(&mut *tx, articulo, codigo, cantidad, cantidad, 0)
            .await?;
        tx.commit().await?;
        Ok(inventario)
    }

    /// Corrección directa desde la pantalla de inventario: pisa artículo,
    /// cantidad y código sin tocar los acumulados.
    pub async fn actualizar(
        &self,
        id: i64,
        articulo: &str,
        cantidad: i64,
        codigo: &str,
    ) -> Result<Inventario, AppError> {
        let mut tx = self.pool.begin().await?;
        let inventario = self
            .inventario_repo
            .actualizar(&mut *tx, id, articulo, cantidad, codigo)
            .await?;
        tx.commit().await?;
        Ok(inventario)
    }

    /// Borra la fila de inventario. Los movimientos históricos que la
    /// enlazaban quedan con inventario_id en NULL (lo resuelve la FK).
    pub async fn eliminar(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        self.inventario_repo.eliminar(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Importación masiva: upsert por artículo, fila por fila. Las filas
    /// sin artículo o sin código se saltan. Devuelve cuántas se aplicaron.
    pub async fn importar(&self, filas: &[FilaInventario]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut aplicadas = 0u64;

        for fila in filas {
            let articulo = fila.articulo.trim();
            let codigo = fila.codigo.trim();
            if articulo.is_empty() || codigo.is_empty() {
                continue;
            }

            // Si la planilla no trae acumulados, el stock hace de entrada.
            let entrada = fila.entrada.or(fila.cantidad).unwrap_or(0);
            let salida = fila.salida.unwrap_or(0);
            let cantidad = entrada - salida;

            self.inventario_repo
                .upsert_importacion(&mut *tx, articulo, codigo, cantidad, entrada, salida)
                .await?;
            aplicadas += 1;
        }

        tx.commit().await?;
        Ok(aplicadas)
    }
}
