// src/services/salida_service.rs

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{EncargadosRepository, InventarioRepository, SalidaRepository},
    models::Salida,
};

use super::{importacion, validar_cantidad_positiva, Reversion};

/// Código centinela para inventario auto-creado al registrar una salida
/// de un artículo sin código conocido.
pub const CODIGO_SIN_ASIGNAR: &str = "S/C";

/// Código centinela que estampa la importación masiva de salidas.
pub const CODIGO_IMPORTACION: &str = "SIN-CODIGO";

/// Datos para registrar una salida. Área y destinatario aceptan id o
/// nombre libre; el nombre se resuelve (o crea) sin distinguir mayúsculas.
#[derive(Debug, Clone)]
pub struct NuevaSalida {
    pub articulo: String,
    pub cantidad: i64,
    pub codigo: Option<String>,
    pub fecha: NaiveDate,
    pub area_id: Option<i64>,
    pub area: Option<String>,
    pub destinatario_id: Option<i64>,
    pub destinatario: Option<String>,
}

/// Edición de una salida. No re-resuelve área ni destinatario: los textos
/// se pisan tal cual y el vínculo con los registros laterales no cambia.
#[derive(Debug, Clone)]
pub struct EdicionSalida {
    pub articulo: String,
    pub cantidad: i64,
    pub fecha: NaiveDate,
    pub area: String,
    pub destinatario: String,
}

#[derive(Clone)]
pub struct SalidaService {
    salida_repo: SalidaRepository,
    inventario_repo: InventarioRepository,
    encargados_repo: EncargadosRepository,
    pool: SqlitePool,
}

impl SalidaService {
    pub fn new(
        salida_repo: SalidaRepository,
        inventario_repo: InventarioRepository,
        encargados_repo: EncargadosRepository,
        pool: SqlitePool,
    ) -> Self {
        Self {
            salida_repo,
            inventario_repo,
            encargados_repo,
            pool,
        }
    }

    pub async fn listar(&self) -> Result<Vec<Salida>, AppError> {
        self.salida_repo.listar().await
    }

    /// Registra mercancía saliente. El orden importa:
    /// 1. resuelve (o crea) el área, 2. resuelve (o crea) el destinatario
    /// y lo vincula al área, 3. resuelve (o crea en cero) el inventario,
    /// 4. chequea el stock ANTES de mutar nada, 5. aplica el movimiento,
    /// 6. inserta la fila. Un fallo en cualquier paso revierte la
    /// transacción completa, auto-creaciones incluidas.
    pub async fn crear(&self, datos: NuevaSalida) -> Result<Salida, AppError> {
        validar_cantidad_positiva(datos.cantidad)?;
        let mut tx = self.pool.begin().await?;

        let area = match (datos.area_id, datos.area.as_deref()) {
            (Some(id), _) => Some(
                self.encargados_repo
                    .buscar_area(&mut *tx, id)
                    .await?
                    .ok_or(AppError::AreaNoEncontrada)?,
            ),
            (None, Some(nombre)) if !nombre.trim().is_empty() => Some(
                self.encargados_repo
                    .resolver_o_crear_area(&mut *tx, nombre)
                    .await?,
            ),
            // Una salida sin área es representable.
            _ => None,
        };

        let encargado = match (datos.destinatario_id, datos.destinatario.as_deref()) {
            (Some(id), _) => self
                .encargados_repo
                .buscar_encargado(&mut *tx, id)
                .await?
                .ok_or(AppError::EncargadoNoEncontrado)?,
            (None, Some(nombre)) if !nombre.trim().is_empty() => {
                self.encargados_repo
                    .resolver_o_crear_encargado(&mut *tx, nombre)
                    .await?
            }
            _ => return Err(AppError::DestinatarioRequerido),
        };

        if let Some(area) = &area {
            self.encargados_repo
                .vincular(&mut *tx, area.id, encargado.id)
                .await?;
        }

        let codigo = datos
            .codigo
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let inventario = match self
            .inventario_repo
            .buscar_por_articulo(&mut *tx, &datos.articulo)
            .await?
        {
            Some(inv) => inv,
            None => {
                self.inventario_repo
                    .crear(
                        &mut *tx,
                        &datos.articulo,
                        codigo.unwrap_or(CODIGO_SIN_ASIGNAR),
                        0,
                        0,
                        0,
                    )
                    .await?
            }
        };

        if inventario.cantidad < datos.cantidad {
            return Err(AppError::CantidadInsuficiente {
                articulo: inventario.articulo,
                disponible: inventario.cantidad,
                solicitado: datos.cantidad,
            });
        }

        self.inventario_repo
            .ajustar(&mut *tx, inventario.id, -datos.cantidad, 0, datos.cantidad)
            .await?;

        let area_nombre = area.map(|a| a.nombre).unwrap_or_default();
        let salida = self
            .salida_repo
            .insertar(
                &mut *tx,
                &datos.articulo,
                codigo.unwrap_or(inventario.codigo.as_str()),
                datos.cantidad,
                datos.fecha,
                &area_nombre,
                &encargado.nombre,
                inventario.id,
            )
            .await?;

        tx.commit().await?;
        Ok(salida)
    }

    /// Edita una salida por diferencia: delta = cantidad nueva - vieja.
    /// Aumentar la salida consume más stock (y re-chequea suficiencia);
    /// reducirla lo devuelve. El inventario se resuelve por el id estable
    /// de la fila, nunca por nombre.
    pub async fn editar(&self, id: i64, datos: EdicionSalida) -> Result<Salida, AppError> {
        validar_cantidad_positiva(datos.cantidad)?;
        let mut tx = self.pool.begin().await?;

        let salida = self
            .salida_repo
            .buscar_por_id(&mut *tx, id)
            .await?
            .ok_or(AppError::SalidaNoEncontrada)?;
        let inventario_id = salida.inventario_id.ok_or(AppError::InventarioNoEncontrado)?;
        let inventario = self
            .inventario_repo
            .buscar_por_id(&mut *tx, inventario_id)
            .await?
            .ok_or(AppError::InventarioNoEncontrado)?;

        let delta = datos.cantidad - salida.cantidad;
        if delta > 0 && inventario.cantidad < delta {
            return Err(AppError::CantidadInsuficiente {
                articulo: inventario.articulo,
                disponible: inventario.cantidad,
                solicitado: delta,
            });
        }

        self.inventario_repo
            .ajustar(&mut *tx, inventario_id, -delta, 0, delta)
            .await?;

        let actualizada = self
            .salida_repo
            .actualizar(
                &mut *tx,
                id,
                &datos.articulo,
                datos.cantidad,
                datos.fecha,
                &datos.area,
                &datos.destinatario,
            )
            .await?;

        tx.commit().await?;
        Ok(actualizada)
    }

    /// Elimina la salida devolviendo su cantidad al inventario. Si el
    /// inventario enlazado ya no existe, la fila se borra igual y el
    /// llamador recibe el aviso.
    pub async fn eliminar(&self, id: i64) -> Result<Reversion, AppError> {
        let mut tx = self.pool.begin().await?;

        let salida = self
            .salida_repo
            .buscar_por_id(&mut *tx, id)
            .await?
            .ok_or(AppError::SalidaNoEncontrada)?;

        let inventario = match salida.inventario_id {
            Some(inv_id) => self.inventario_repo.buscar_por_id(&mut *tx, inv_id).await?,
            None => None,
        };

        let reversion = match inventario {
            Some(inv) => {
                self.inventario_repo
                    .ajustar(&mut *tx, inv.id, salida.cantidad, 0, -salida.cantidad)
                    .await?;
                Reversion::Aplicada
            }
            None => {
                tracing::warn!(
                    salida_id = id,
                    articulo = %salida.articulo,
                    "Se elimina una salida sin inventario enlazado; no hay saldo que revertir"
                );
                Reversion::InventarioAusente
            }
        };

        self.salida_repo.eliminar(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(reversion)
    }

    /// Importación masiva desde una planilla cruda: ubica el encabezado
    /// por coincidencia difusa de nombres de columna, vacía el libro de
    /// salidas, inserta las filas interpretables (el resto se salta) y
    /// recalcula todos los saldos a partir de ambos libros.
    pub async fn importar(&self, filas: &[Vec<String>]) -> Result<u64, AppError> {
        let (indice, columnas) = importacion::localizar_encabezado(filas)?;

        let mut tx = self.pool.begin().await?;

        let borradas = self.salida_repo.eliminar_todas(&mut *tx).await?;
        tracing::info!(borradas, "Importación de salidas: libro anterior vaciado");

        let mut insertadas = 0u64;
        for fila in filas.iter().skip(indice + 1) {
            let Some(registro) = importacion::interpretar_fila(fila, &columnas) else {
                continue;
            };

            let inventario = match self
                .inventario_repo
                .buscar_por_articulo(&mut *tx, &registro.articulo)
                .await?
            {
                Some(inv) => inv,
                None => {
                    self.inventario_repo
                        .crear(&mut *tx, &registro.articulo, CODIGO_IMPORTACION, 0, 0, 0)
                        .await?
                }
            };

            self.salida_repo
                .insertar(
                    &mut *tx,
                    &registro.articulo,
                    CODIGO_IMPORTACION,
                    registro.cantidad,
                    registro.fecha,
                    &registro.area,
                    &registro.destinatario,
                    inventario.id,
                )
                .await?;
            insertadas += 1;
        }

        self.inventario_repo.recalcular_saldos(&mut *tx).await?;
        tx.commit().await?;
        Ok(insertadas)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::services::pruebas;

    fn fecha(dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, dia).unwrap()
    }

    fn salida_basica(articulo: &str, cantidad: i64) -> NuevaSalida {
        NuevaSalida {
            articulo: articulo.into(),
            cantidad,
            codigo: Some("B1".into()),
            fecha: fecha(5),
            area_id: None,
            area: Some("Almacen".into()),
            destinatario_id: None,
            destinatario: Some("Juan".into()),
        }
    }

    #[tokio::test]
    async fn crear_salida_descuenta_stock_y_crea_laterales() {
        // 100 tornillos en stock, salen 30 hacia Almacen/Juan.
        let pool = pruebas::pool_en_memoria().await;
        let entradas = pruebas::entradas(&pool);
        let servicio = pruebas::salidas(&pool);
        let inventarios = pruebas::inventarios(&pool);
        let encargados = pruebas::encargados(&pool);

        entradas.crear("Tornillos", 100, "B1", fecha(1)).await.unwrap();
        let salida = servicio.crear(salida_basica("Tornillos", 30)).await.unwrap();
        assert_eq!(salida.area, "Almacen");
        assert_eq!(salida.destinatario, "Juan");

        let inv = inventarios.buscar_por_articulo("Tornillos").await.unwrap();
        assert_eq!(inv.cantidad, 70);
        assert_eq!(inv.salida, 30);
        assert_eq!(inv.cantidad, inv.entrada - inv.salida);

        // Área y encargado quedaron creados y vinculados.
        let areas = encargados.listar_areas().await.unwrap();
        assert_eq!(areas.len(), 1);
        let vinculados = encargados.encargados_por_area(areas[0].id).await.unwrap();
        assert_eq!(vinculados.len(), 1);
        assert_eq!(vinculados[0].nombre, "Juan");
    }

    #[tokio::test]
    async fn crear_salida_sin_stock_suficiente_no_muta_nada() {
        // Pedir 9999 con 70 en stock falla y no cambia nada.
        let pool = pruebas::pool_en_memoria().await;
        let entradas = pruebas::entradas(&pool);
        let servicio = pruebas::salidas(&pool);
        let inventarios = pruebas::inventarios(&pool);

        entradas.crear("Tornillos", 100, "B1", fecha(1)).await.unwrap();
        servicio.crear(salida_basica("Tornillos", 30)).await.unwrap();

        let resultado = servicio.crear(salida_basica("Tornillos", 9999)).await;
        assert!(matches!(
            resultado,
            Err(AppError::CantidadInsuficiente { disponible: 70, .. })
        ));

        let inv = inventarios.buscar_por_articulo("Tornillos").await.unwrap();
        assert_eq!(inv.cantidad, 70);
        assert_eq!(inv.salida, 30);
        assert_eq!(servicio.listar().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn articulo_desconocido_arranca_en_cero_y_rechaza() {
        // Contrato estricto: el inventario auto-creado arranca en 0,
        // así que cualquier cantidad positiva es insuficiente. El rollback
        // también deshace las auto-creaciones de esa misma petición.
        let pool = pruebas::pool_en_memoria().await;
        let servicio = pruebas::salidas(&pool);
        let inventarios = pruebas::inventarios(&pool);
        let encargados = pruebas::encargados(&pool);

        let resultado = servicio.crear(salida_basica("Fantasma", 1)).await;
        assert!(matches!(
            resultado,
            Err(AppError::CantidadInsuficiente { disponible: 0, .. })
        ));

        assert!(inventarios.buscar_por_articulo("Fantasma").await.is_err());
        assert!(encargados.listar_areas().await.unwrap().is_empty());
        assert!(encargados.listar().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolucion_de_laterales_es_idempotente_por_nombre_normalizado() {
        // " almacen " y "ALMACEN" son la misma área; "juan" el mismo
        // encargado. No se duplican filas ni vínculos.
        let pool = pruebas::pool_en_memoria().await;
        let entradas = pruebas::entradas(&pool);
        let servicio = pruebas::salidas(&pool);
        let encargados = pruebas::encargados(&pool);

        entradas.crear("Tornillos", 100, "B1", fecha(1)).await.unwrap();

        let mut primera = salida_basica("Tornillos", 10);
        primera.area = Some(" Almacen ".into());
        primera.destinatario = Some("JUAN".into());
        servicio.crear(primera).await.unwrap();

        let mut segunda = salida_basica("Tornillos", 10);
        segunda.area = Some("ALMACEN".into());
        segunda.destinatario = Some("juan".into());
        servicio.crear(segunda).await.unwrap();

        assert_eq!(encargados.listar_areas().await.unwrap().len(), 1);
        assert_eq!(encargados.listar().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn editar_salida_aumenta_consume_y_rechequea() {
        let pool = pruebas::pool_en_memoria().await;
        let entradas = pruebas::entradas(&pool);
        let servicio = pruebas::salidas(&pool);
        let inventarios = pruebas::inventarios(&pool);

        entradas.crear("Tornillos", 100, "B1", fecha(1)).await.unwrap();
        let salida = servicio.crear(salida_basica("Tornillos", 30)).await.unwrap();

        // Subir de 30 a 50 consume 20 más.
        let edicion = EdicionSalida {
            articulo: "Tornillos".into(),
            cantidad: 50,
            fecha: fecha(6),
            area: "Almacen".into(),
            destinatario: "Juan".into(),
        };
        servicio.editar(salida.id, edicion.clone()).await.unwrap();

        let inv = inventarios.buscar_por_articulo("Tornillos").await.unwrap();
        assert_eq!(inv.cantidad, 50);
        assert_eq!(inv.salida, 50);
        assert_eq!(inv.cantidad, inv.entrada - inv.salida);

        // Subir a más de lo disponible se rechaza sin mutar.
        let exagerada = EdicionSalida {
            cantidad: 5000,
            ..edicion
        };
        let resultado = servicio.editar(salida.id, exagerada).await;
        assert!(matches!(resultado, Err(AppError::CantidadInsuficiente { .. })));

        let inv = inventarios.buscar_por_articulo("Tornillos").await.unwrap();
        assert_eq!(inv.cantidad, 50);
        assert_eq!(inv.salida, 50);
    }

    #[tokio::test]
    async fn editar_salida_reduciendo_devuelve_stock() {
        let pool = pruebas::pool_en_memoria().await;
        let entradas = pruebas::entradas(&pool);
        let servicio = pruebas::salidas(&pool);
        let inventarios = pruebas::inventarios(&pool);

        entradas.crear("Tornillos", 100, "B1", fecha(1)).await.unwrap();
        let salida = servicio.crear(salida_basica("Tornillos", 30)).await.unwrap();

        let edicion = EdicionSalida {
            articulo: "Tornillos".into(),
            cantidad: 10,
            fecha: fecha(6),
            area: "Almacen".into(),
            destinatario: "Juan".into(),
        };
        servicio.editar(salida.id, edicion).await.unwrap();

        let inv = inventarios.buscar_por_articulo("Tornillos").await.unwrap();
        assert_eq!(inv.cantidad, 90);
        assert_eq!(inv.salida, 10);
        assert_eq!(inv.cantidad, inv.entrada - inv.salida);
    }

    #[tokio::test]
    async fn eliminar_salida_revierte_por_completo() {
        // Borrar la salida de 30 devuelve el stock a 100.
        let pool = pruebas::pool_en_memoria().await;
        let entradas = pruebas::entradas(&pool);
        let servicio = pruebas::salidas(&pool);
        let inventarios = pruebas::inventarios(&pool);

        entradas.crear("Tornillos", 100, "B1", fecha(1)).await.unwrap();
        let salida = servicio.crear(salida_basica("Tornillos", 30)).await.unwrap();

        let reversion = servicio.eliminar(salida.id).await.unwrap();
        assert_eq!(reversion, Reversion::Aplicada);

        let inv = inventarios.buscar_por_articulo("Tornillos").await.unwrap();
        assert_eq!(inv.cantidad, 100);
        assert_eq!(inv.salida, 0);
    }

    #[tokio::test]
    async fn eliminar_salida_inexistente_falla() {
        let pool = pruebas::pool_en_memoria().await;
        let servicio = pruebas::salidas(&pool);

        let resultado = servicio.eliminar(12345).await;
        assert!(matches!(resultado, Err(AppError::SalidaNoEncontrada)));
    }

    #[tokio::test]
    async fn importar_salidas_reemplaza_y_recalcula() {
        let pool = pruebas::pool_en_memoria().await;
        let entradas = pruebas::entradas(&pool);
        let servicio = pruebas::salidas(&pool);
        let inventarios = pruebas::inventarios(&pool);

        entradas.crear("Tornillos", 100, "B1", fecha(1)).await.unwrap();
        servicio.crear(salida_basica("Tornillos", 30)).await.unwrap();

        let filas: Vec<Vec<String>> = vec![
            vec!["Planilla de salidas".into()],
            vec![
                "Fecha".into(),
                "Área".into(),
                "Destino".into(),
                "Artículo".into(),
                "Cantidad".into(),
            ],
            vec![
                "2024-02-01".into(),
                "Taller".into(),
                "Pedro".into(),
                "Tornillos".into(),
                "40".into(),
            ],
            // Sin cantidad interpretable: se salta.
            vec![
                "2024-02-02".into(),
                "Taller".into(),
                "Pedro".into(),
                "Tornillos".into(),
                "muchos".into(),
            ],
        ];

        let insertadas = servicio.importar(&filas).await.unwrap();
        assert_eq!(insertadas, 1);

        let salidas = servicio.listar().await.unwrap();
        assert_eq!(salidas.len(), 1);
        assert_eq!(salidas[0].codigo, CODIGO_IMPORTACION);

        // Saldos recalculados desde ambos libros: 100 de entrada, 40 de
        // salida (la salida previa de 30 fue reemplazada).
        let inv = inventarios.buscar_por_articulo("Tornillos").await.unwrap();
        assert_eq!(inv.entrada, 100);
        assert_eq!(inv.salida, 40);
        assert_eq!(inv.cantidad, 60);
    }

    #[tokio::test]
    async fn importar_sin_columnas_esperadas_falla() {
        let pool = pruebas::pool_en_memoria().await;
        let servicio = pruebas::salidas(&pool);

        let filas: Vec<Vec<String>> = vec![vec!["a".into(), "b".into(), "c".into()]];
        let resultado = servicio.importar(&filas).await;
        assert!(matches!(resultado, Err(AppError::ColumnasFaltantes(_))));
    }

    #[tokio::test]
    async fn salida_sin_destinatario_se_rechaza() {
        let pool = pruebas::pool_en_memoria().await;
        let entradas = pruebas::entradas(&pool);
        let servicio = pruebas::salidas(&pool);

        entradas.crear("Tornillos", 100, "B1", fecha(1)).await.unwrap();

        let mut datos = salida_basica("Tornillos", 10);
        datos.destinatario = None;
        let resultado = servicio.crear(datos).await;
        assert!(matches!(resultado, Err(AppError::DestinatarioRequerido)));
    }

    #[tokio::test]
    async fn salida_sin_area_es_valida() {
        let pool = pruebas::pool_en_memoria().await;
        let entradas = pruebas::entradas(&pool);
        let servicio = pruebas::salidas(&pool);

        entradas.crear("Tornillos", 100, "B1", fecha(1)).await.unwrap();

        let mut datos = salida_basica("Tornillos", 10);
        datos.area = None;
        let salida = servicio.crear(datos).await.unwrap();
        assert_eq!(salida.area, "");
    }

    #[tokio::test]
    async fn salida_sin_codigo_hereda_el_del_inventario() {
        let pool = pruebas::pool_en_memoria().await;
        let entradas = pruebas::entradas(&pool);
        let servicio = pruebas::salidas(&pool);

        entradas.crear("Tornillos", 100, "B1", fecha(1)).await.unwrap();

        let mut datos = salida_basica("Tornillos", 10);
        datos.codigo = None;
        let salida = servicio.crear(datos).await.unwrap();
        assert_eq!(salida.codigo, "B1");
    }
}
