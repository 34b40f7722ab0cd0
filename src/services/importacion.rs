// src/services/importacion.rs
//
// Normalización de planillas crudas de salidas: el archivo llega como una
// grilla de celdas de texto y el encabezado no siempre está en la primera
// fila ni con los nombres exactos. Aquí se ubica el encabezado por
// coincidencia difusa y se interpretan las filas de datos. Todo funciones
// puras, sin tocar la base.

use chrono::NaiveDate;

use crate::common::error::AppError;

// Alternativas aceptadas por columna (comparadas sobre texto normalizado).
const COLUMNA_FECHA: &[&str] = &["fecha"];
const COLUMNA_AREA: &[&str] = &["area", "área"];
const COLUMNA_DESTINATARIO: &[&str] = &["destino", "destinatario", "encargado"];
const COLUMNA_ARTICULO: &[&str] = &["articulo", "artículo", "descripcion", "descripción"];
const COLUMNA_CANTIDAD: &[&str] = &["cantidad", "cant."];

// Cuántas filas iniciales se exploran buscando el encabezado (las
// planillas reales traen títulos y filas vacías arriba).
const FILAS_A_EXPLORAR: usize = 10;

/// Índices de columna de una planilla de salidas ya reconocida.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapaColumnas {
    pub fecha: usize,
    pub area: usize,
    pub destinatario: usize,
    pub articulo: usize,
    pub cantidad: usize,
}

/// Una fila de datos ya interpretada y lista para insertar.
#[derive(Debug, Clone)]
pub struct RegistroSalida {
    pub fecha: NaiveDate,
    pub area: String,
    pub destinatario: String,
    pub articulo: String,
    pub cantidad: i64,
}

fn normalizar_celda(celda: &str) -> String {
    celda.trim().to_lowercase()
}

fn indice_de(fila: &[String], alternativas: &[&str]) -> Option<usize> {
    fila.iter().position(|celda| {
        let celda = normalizar_celda(celda);
        alternativas.iter().any(|alt| celda.contains(alt))
    })
}

fn mapear_columnas(fila: &[String]) -> (Option<MapaColumnas>, Vec<&'static str>) {
    let fecha = indice_de(fila, COLUMNA_FECHA);
    let area = indice_de(fila, COLUMNA_AREA);
    let destinatario = indice_de(fila, COLUMNA_DESTINATARIO);
    let articulo = indice_de(fila, COLUMNA_ARTICULO);
    let cantidad = indice_de(fila, COLUMNA_CANTIDAD);

    let mut faltantes = Vec::new();
    if fecha.is_none() {
        faltantes.push("fecha");
    }
    if area.is_none() {
        faltantes.push("area");
    }
    if destinatario.is_none() {
        faltantes.push("destino");
    }
    if articulo.is_none() {
        faltantes.push("articulo");
    }
    if cantidad.is_none() {
        faltantes.push("cantidad");
    }

    match (fecha, area, destinatario, articulo, cantidad) {
        (Some(fecha), Some(area), Some(destinatario), Some(articulo), Some(cantidad)) => (
            Some(MapaColumnas {
                fecha,
                area,
                destinatario,
                articulo,
                cantidad,
            }),
            faltantes,
        ),
        _ => (None, faltantes),
    }
}

/// Busca el encabezado entre las primeras filas. Si ninguna fila trae las
/// cinco columnas, informa qué faltó en la fila más parecida.
pub fn localizar_encabezado(filas: &[Vec<String>]) -> Result<(usize, MapaColumnas), AppError> {
    let mut mejores_faltantes: Vec<&'static str> =
        vec!["fecha", "area", "destino", "articulo", "cantidad"];

    for (indice, fila) in filas.iter().take(FILAS_A_EXPLORAR).enumerate() {
        let (mapa, faltantes) = mapear_columnas(fila);
        if let Some(mapa) = mapa {
            return Ok((indice, mapa));
        }
        if faltantes.len() < mejores_faltantes.len() {
            mejores_faltantes = faltantes;
        }
    }

    Err(AppError::ColumnasFaltantes(mejores_faltantes.join(", ")))
}

/// Interpreta una fila de datos según el mapa de columnas. Devuelve None
/// si falta algún dato obligatorio o no se puede interpretar: la
/// importación salta la fila, nunca aborta por una fila.
pub fn interpretar_fila(fila: &[String], columnas: &MapaColumnas) -> Option<RegistroSalida> {
    let celda = |indice: usize| fila.get(indice).map(|c| c.trim()).unwrap_or_default();

    let articulo = celda(columnas.articulo);
    let destinatario = celda(columnas.destinatario);
    if articulo.is_empty() || destinatario.is_empty() {
        return None;
    }

    let cantidad = parsear_cantidad(celda(columnas.cantidad))?;
    let fecha = parsear_fecha(celda(columnas.fecha))?;

    Some(RegistroSalida {
        fecha,
        // El área puede venir vacía: una salida sin área es representable.
        area: celda(columnas.area).to_string(),
        destinatario: destinatario.to_string(),
        articulo: articulo.to_string(),
        cantidad,
    })
}

/// Cantidades: entero directo, o decimal sin parte fraccionaria real
/// (las planillas suelen traer "40.0"). Debe ser positiva.
pub fn parsear_cantidad(celda: &str) -> Option<i64> {
    let celda = celda.trim();
    let cantidad = match celda.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            let decimal = celda.parse::<f64>().ok()?;
            if decimal.fract() != 0.0 {
                return None;
            }
            decimal as i64
        }
    };
    (cantidad > 0).then_some(cantidad)
}

/// Fechas: ISO o los formatos día/mes/año comunes en las planillas.
pub fn parsear_fecha(celda: &str) -> Option<NaiveDate> {
    let celda = celda.trim();
    for formato in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(fecha) = NaiveDate::parse_from_str(celda, formato) {
            return Some(fecha);
        }
    }
    None
}
