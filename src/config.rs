// src/config.rs

use std::{env, str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::{
    db::{EncargadosRepository, EntradaRepository, InventarioRepository, SalidaRepository},
    services::{EncargadosService, EntradaService, InventarioService, SalidaService},
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub entrada_service: EntradaService,
    pub salida_service: SalidaService,
    pub inventario_service: InventarioService,
    pub encargados_service: EncargadosService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://almacen.db".to_string());

        let opciones = SqliteConnectOptions::from_str(&database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let db_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(opciones)
            .await?;

        tracing::info!("✅ Conexión con la base de datos establecida!");

        // --- Arma el grafo de dependencias ---
        let entrada_repo = EntradaRepository::new(db_pool.clone());
        let salida_repo = SalidaRepository::new(db_pool.clone());
        let inventario_repo = InventarioRepository::new(db_pool.clone());
        let encargados_repo = EncargadosRepository::new(db_pool.clone());

        let entrada_service = EntradaService::new(
            entrada_repo,
            inventario_repo.clone(),
            db_pool.clone(),
        );
        let salida_service = SalidaService::new(
            salida_repo,
            inventario_repo.clone(),
            encargados_repo.clone(),
            db_pool.clone(),
        );
        let inventario_service = InventarioService::new(inventario_repo, db_pool.clone());
        let encargados_service = EncargadosService::new(encargados_repo, db_pool.clone());

        Ok(Self {
            db_pool,
            entrada_service,
            salida_service,
            inventario_service,
            encargados_service,
        })
    }
}
