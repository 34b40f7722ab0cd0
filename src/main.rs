// src/main.rs

use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;

mod common;
mod config;
mod db;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Si la configuración falla, la aplicación no debe arrancar.
    let app_state = AppState::new()
        .await
        .expect("Falló la inicialización del estado de la aplicación.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Fallaron las migraciones de la base de datos.");

    tracing::info!("✅ Migraciones de la base de datos ejecutadas con éxito!");

    let rutas_entradas = Router::new()
        .route(
            "/",
            post(handlers::entradas::crear).get(handlers::entradas::listar),
        )
        .route(
            "/{id}",
            put(handlers::entradas::editar).delete(handlers::entradas::eliminar),
        )
        .route("/importar", post(handlers::entradas::importar));

    let rutas_salidas = Router::new()
        .route(
            "/",
            post(handlers::salidas::crear).get(handlers::salidas::listar),
        )
        .route(
            "/{id}",
            put(handlers::salidas::editar).delete(handlers::salidas::eliminar),
        )
        .route("/importar", post(handlers::salidas::importar));

    let rutas_inventarios = Router::new()
        .route(
            "/",
            post(handlers::inventario::crear).get(handlers::inventario::listar),
        )
        // Un solo segmento dinámico: GET busca por artículo, PUT y DELETE
        // operan por id (el extractor parsea el segmento según el handler).
        .route(
            "/{clave}",
            get(handlers::inventario::buscar)
                .put(handlers::inventario::actualizar)
                .delete(handlers::inventario::eliminar),
        )
        .route("/importar", post(handlers::inventario::importar));

    let rutas_encargados = Router::new()
        .route(
            "/",
            get(handlers::encargados::listar).post(handlers::encargados::crear),
        )
        .route("/assign", post(handlers::encargados::asignar))
        .route("/remove", post(handlers::encargados::quitar))
        .route("/area/{area_id}", get(handlers::encargados::por_area))
        .route(
            "/encargado/{encargado_id}",
            get(handlers::encargados::areas_por_encargado)
                .delete(handlers::encargados::eliminar),
        );

    let rutas_areas = Router::new().route(
        "/",
        get(handlers::encargados::listar_areas).post(handlers::encargados::crear_area),
    );

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/entradas", rutas_entradas)
        .nest("/api/salidas", rutas_salidas)
        .nest("/api/inventarios", rutas_inventarios)
        .nest("/api/encargados", rutas_encargados)
        .nest("/api/areas", rutas_areas)
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falló el arranque del listener TCP");
    tracing::info!(
        "🚀 Servidor escuchando en {}",
        listener
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| addr.to_string())
    );
    axum::serve(listener, app)
        .await
        .expect("Error en el servidor Axum");
}
