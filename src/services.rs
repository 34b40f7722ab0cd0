pub mod encargados_service;
pub mod entrada_service;
pub mod importacion;
pub mod inventario_service;
pub mod salida_service;

pub use encargados_service::EncargadosService;
pub use entrada_service::EntradaService;
pub use inventario_service::InventarioService;
pub use salida_service::SalidaService;

use crate::common::error::AppError;

/// Resultado de revertir un movimiento sobre el inventario al borrarlo.
/// Que el inventario enlazado ya no exista no impide borrar la fila
/// histórica, pero el llamador debe poder distinguirlo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reversion {
    /// El inventario enlazado existía y su saldo quedó revertido.
    Aplicada,
    /// El inventario enlazado ya no existe; se eliminó la fila sin
    /// ajustar ningún saldo.
    InventarioAusente,
}

impl Reversion {
    pub fn inventario_ajustado(&self) -> bool {
        matches!(self, Reversion::Aplicada)
    }
}

// Los handlers ya validan la cantidad, pero el núcleo se defiende igual:
// ninguna operación del libro acepta cantidades no positivas.
pub(crate) fn validar_cantidad_positiva(cantidad: i64) -> Result<(), AppError> {
    if cantidad <= 0 {
        let mut errores = validator::ValidationErrors::new();
        let mut error = validator::ValidationError::new("range");
        error.message = Some("La cantidad debe ser un entero positivo.".into());
        errores.add("cantidad", error);
        return Err(AppError::ValidationError(errores));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod pruebas {
    use std::str::FromStr;

    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;

    use super::*;
    use crate::db::{
        EncargadosRepository, EntradaRepository, InventarioRepository, SalidaRepository,
    };

    pub async fn pool_en_memoria() -> SqlitePool {
        let opciones = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("URL de la base en memoria inválida")
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opciones)
            .await
            .expect("no se pudo abrir la base en memoria");
        sqlx::migrate!()
            .run(&pool)
            .await
            .expect("fallaron las migraciones");
        pool
    }

    pub fn entradas(pool: &SqlitePool) -> EntradaService {
        EntradaService::new(
            EntradaRepository::new(pool.clone()),
            InventarioRepository::new(pool.clone()),
            pool.clone(),
        )
    }

    pub fn salidas(pool: &SqlitePool) -> SalidaService {
        SalidaService::new(
            SalidaRepository::new(pool.clone()),
            InventarioRepository::new(pool.clone()),
            EncargadosRepository::new(pool.clone()),
            pool.clone(),
        )
    }

    pub fn inventarios(pool: &SqlitePool) -> InventarioService {
        InventarioService::new(InventarioRepository::new(pool.clone()), pool.clone())
    }

    pub fn encargados(pool: &SqlitePool) -> EncargadosService {
        EncargadosService::new(EncargadosRepository::new(pool.clone()), pool.clone())
    }
}
