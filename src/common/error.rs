use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nuestro tipo de error, con `thiserror` para mejor ergonomía.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Entrada no encontrada")]
    EntradaNoEncontrada,

    #[error("Salida no encontrada")]
    SalidaNoEncontrada,

    #[error("Artículo no encontrado en inventario")]
    InventarioNoEncontrado,

    #[error("Área no encontrada")]
    AreaNoEncontrada,

    #[error("Encargado no encontrado")]
    EncargadoNoEncontrado,

    #[error("El destinatario es obligatorio")]
    DestinatarioRequerido,

    // Una salida (o una edición que aumenta la cantidad) dejaría el stock
    // en negativo. Se rechaza antes de tocar nada.
    #[error("Cantidad insuficiente en inventario: '{articulo}' tiene {disponible} y se pidieron {solicitado}")]
    CantidadInsuficiente {
        articulo: String,
        disponible: i64,
        solicitado: i64,
    },

    #[error("El archivo no tiene las columnas esperadas: faltan {0}")]
    ColumnasFaltantes(String),

    // Variante para errores de base de datos (sqlx)
    #[error("Error de base de datos")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para cualquier otro error inesperado.
    // `anyhow::Error` es ideal para capturar el contexto del error.
    #[error("Error interno del servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Devolvemos todos los detalles de la validación, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::CantidadInsuficiente { .. } => {
                let body = Json(json!({ "error": self.to_string() }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::ColumnasFaltantes(_) => {
                let body = Json(json!({ "error": self.to_string() }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::EntradaNoEncontrada => (StatusCode::NOT_FOUND, "Entrada no encontrada."),
            AppError::SalidaNoEncontrada => (StatusCode::NOT_FOUND, "Salida no encontrada."),
            AppError::InventarioNoEncontrado => {
                (StatusCode::NOT_FOUND, "Artículo no encontrado en inventario.")
            }
            AppError::AreaNoEncontrada => (StatusCode::NOT_FOUND, "Área no encontrada."),
            AppError::EncargadoNoEncontrado => (StatusCode::NOT_FOUND, "Encargado no encontrado."),
            AppError::DestinatarioRequerido => {
                (StatusCode::BAD_REQUEST, "El destinatario es obligatorio.")
            }

            // Todo lo demás (DatabaseError, InternalServerError) es un 500.
            // El `tracing` deja registrada la causa detallada.
            ref e => {
                tracing::error!("Error interno del servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocurrió un error inesperado.")
            }
        };

        // Respuesta estándar para errores simples que solo llevan un mensaje.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
