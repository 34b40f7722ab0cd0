// src/services/entrada_service.rs

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{EntradaRepository, InventarioRepository},
    models::Entrada,
};

use super::{validar_cantidad_positiva, Reversion};

/// Fila ya normalizada por el colaborador de importación (fechas
/// parseadas, números coercionados). Los campos que falten dejan la fila
/// fuera, sin abortar la importación.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilaEntrada {
    #[serde(default)]
    pub articulo: String,
    #[serde(default)]
    pub codigo: String,
    pub cantidad: Option<i64>,
    pub fecha: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct EntradaService {
    entrada_repo: EntradaRepository,
    inventario_repo: InventarioRepository,
    pool: SqlitePool,
}

impl EntradaService {
    pub fn new(
        entrada_repo: EntradaRepository,
        inventario_repo: InventarioRepository,
        pool: SqlitePool,
    ) -> Self {
        Self {
            entrada_repo,
            inventario_repo,
            pool,
        }
    }

    pub async fn listar(&self) -> Result<Vec<Entrada>, AppError> {
        self.entrada_repo.listar().await
    }

    /// Registra mercancía entrante. Si el artículo no existe en el
    /// inventario lo crea arrancando con este movimiento; si existe, suma
    /// la cantidad al stock y al acumulado de entradas. Todo en una
    /// transacción.
    pub async fn crear(
        &self,
        articulo: &str,
        cantidad: i64,
        codigo: &str,
        fecha: NaiveDate,
    ) -> Result<Entrada, AppError> {
        validar_cantidad_positiva(cantidad)?;
        let mut tx = self.pool.begin().await?;

        let inventario = match self
            .inventario_repo
            .buscar_por_articulo(&mut *tx, articulo)
            .await?
        {
            Some(inv) => {
                self.inventario_repo
                    .ajustar(&mut *tx, inv.id, cantidad, cantidad, 0)
                    .await?
            }
            None => {
                self.inventario_repo
                    .crear(&mut *tx, articulo, codigo, cantidad, cantidad, 0)
                    .await?
            }
        };

        let entrada = self
            .entrada_repo
            .insertar(&mut *tx, articulo, codigo, cantidad, fecha, inventario.id)
            .await?;

        tx.commit().await?;
        Ok(entrada)
    }

    /// Edita una entrada ajustando el inventario por la diferencia:
    /// delta = cantidad nueva - cantidad vieja, aplicado a cantidad y al
    /// acumulado de entradas. El inventario se resuelve por el id estable
    /// capturado al crear la entrada, nunca por nombre. Si cambió el
    /// artículo o el código, el renombre es una única actualización sobre
    /// la fila de inventario (el libro no se toca).
    pub async fn editar(
        &self,
        id: i64,
        articulo: &str,
        cantidad: i64,
        codigo: &str,
        fecha: NaiveDate,
    ) -> Result<Entrada, AppError> {
        validar_cantidad_positiva(cantidad)?;
        let mut tx = self.pool.begin().await?;

        let entrada = self
            .entrada_repo
            .buscar_por_id(&mut *tx, id)
            .await?
            .ok_or(AppError::EntradaNoEncontrada)?;
        let inventario_id = entrada.inventario_id.ok_or(AppError::InventarioNoEncontrado)?;

        let delta = cantidad - entrada.cantidad;
        self.inventario_repo
            .ajustar(&mut *tx, inventario_id, delta, delta, 0)
            .await?;

        if entrada.articulo != articulo || entrada.codigo != codigo {
            self.inventario_repo
                .renombrar(&mut *tx, inventario_id, articulo, codigo)
                .await?;
        }

        let actualizada = self
            .entrada_repo
            .actualizar(&mut *tx, id, articulo, codigo, cantidad, fecha)
            .await?;

        tx.commit().await?;
        Ok(actualizada)
    }

    /// Elimina la entrada revirtiendo su efecto sobre el inventario. Si el
    /// inventario enlazado ya no existe, la fila se borra igual y el
    /// llamador recibe el aviso.
    pub async fn eliminar(&self, id: i64) -> Result<Reversion, AppError> {
        let mut tx = self.pool.begin().await?;

        let entrada = self
            .entrada_repo
            .buscar_por_id(&mut *tx, id)
            .await?
            .ok_or(AppError::EntradaNoEncontrada)?;

        let inventario = match entrada.inventario_id {
            Some(inv_id) => self.inventario_repo.buscar_por_id(&mut *tx, inv_id).await?,
            None => None,
        };

        let reversion = match inventario {
            Some(inv) => {
                self.inventario_repo
                    .ajustar(&mut *tx, inv.id, -entrada.cantidad, -entrada.cantidad, 0)
                    .await?;
                Reversion::Aplicada
            }
            None => {
                tracing::warn!(
                    entrada_id = id,
                    articulo = %entrada.articulo,
                    "Se elimina una entrada sin inventario enlazado; no hay saldo que revertir"
                );
                Reversion::InventarioAusente
            }
        };

        self.entrada_repo.eliminar(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(reversion)
    }

    /// Importación masiva: reemplazo destructivo del libro de entradas y
    /// recomputación completa de los saldos a partir de ambos libros.
    /// Las filas incompletas se saltan en silencio; devuelve cuántas
    /// quedaron insertadas.
    pub async fn importar(&self, filas: &[FilaEntrada]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        let borradas = self.entrada_repo.eliminar_todas(&mut *tx).await?;
        tracing::info!(borradas, "Importación de entradas: libro anterior vaciado");

        let mut insertadas = 0u64;
        for fila in filas {
            let articulo = fila.articulo.trim();
            let codigo = fila.codigo.trim();
            let (Some(cantidad), Some(fecha)) = (fila.cantidad, fila.fecha) else {
                continue;
            };
            if articulo.is_empty() || codigo.is_empty() || cantidad <= 0 {
                continue;
            }

            let inventario = match self
                .inventario_repo
                .buscar_por_articulo(&mut *tx, articulo)
                .await?
            {
                Some(inv) => inv,
                None => {
                    self.inventario_repo
                        .crear(&mut *tx, articulo, codigo, 0, 0, 0)
                        .await?
                }
            };

            self.entrada_repo
                .insertar(&mut *tx, articulo, codigo, cantidad, fecha, inventario.id)
                .await?;
            insertadas += 1;
        }

        self.inventario_repo.recalcular_saldos(&mut *tx).await?;
        tx.commit().await?;
        Ok(insertadas)
    }
}
