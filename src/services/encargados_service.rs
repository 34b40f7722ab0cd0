// src/services/encargados_service.rs

use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::EncargadosRepository,
    models::{Area, Encargado},
};

#[derive(Clone)]
pub struct EncargadosService {
    encargados_repo: EncargadosRepository,
    pool: SqlitePool,
}

impl EncargadosService {
    pub fn new(encargados_repo: EncargadosRepository, pool: SqlitePool) -> Self {
        Self {
            encargados_repo,
            pool,
        }
    }

    // ---
    // Encargados
    // ---

    pub async fn listar(&self) -> Result<Vec<Encargado>, AppError> {
        self.encargados_repo.listar_encargados().await
    }

    /// Alta de encargado con sus áreas iniciales. Reusa el encargado si ya
    /// existe uno con el mismo nombre (normalizado); las áreas deben
    /// existir, un id desconocido aborta el alta completa.
    pub async fn crear_con_areas(
        &self,
        nombre: &str,
        area_ids: &[i64],
    ) -> Result<Encargado, AppError> {
        let mut tx = self.pool.begin().await?;

        let encargado = self
            .encargados_repo
            .resolver_o_crear_encargado(&mut *tx, nombre)
            .await?;

        for &area_id in area_ids {
            self.encargados_repo
                .buscar_area(&mut *tx, area_id)
                .await?
                .ok_or(AppError::AreaNoEncontrada)?;
            self.encargados_repo
                .vincular(&mut *tx, area_id, encargado.id)
                .await?;
        }

        tx.commit().await?;
        Ok(encargado)
    }

    /// Borra el encargado; sus vínculos caen por la FK en cascada. Las
    /// salidas históricas guardan el nombre como texto y no se tocan.
    pub async fn eliminar(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        self.encargados_repo.eliminar_encargado(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    // ---
    // Vínculos área ↔ encargado
    // ---

    pub async fn asignar(&self, area_id: i64, encargado_id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        self.encargados_repo
            .buscar_area(&mut *tx, area_id)
            .await?
            .ok_or(AppError::AreaNoEncontrada)?;
        self.encargados_repo
            .buscar_encargado(&mut *tx, encargado_id)
            .await?
            .ok_or(AppError::EncargadoNoEncontrado)?;
        self.encargados_repo
            .vincular(&mut *tx, area_id, encargado_id)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn quitar(&self, area_id: i64, encargado_id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        self.encargados_repo
            .desvincular(&mut *tx, area_id, encargado_id)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn encargados_por_area(&self, area_id: i64) -> Result<Vec<Encargado>, AppError> {
        self.encargados_repo
            .buscar_area(&self.pool, area_id)
            .await?
            .ok_or(AppError::AreaNoEncontrada)?;
        self.encargados_repo.encargados_de_area(area_id).await
    }

    pub async fn areas_por_encargado(&self, encargado_id: i64) -> Result<Vec<Area>, AppError> {
        self.encargados_repo
            .buscar_encargado(&self.pool, encargado_id)
            .await?
            .ok_or(AppError::EncargadoNoEncontrado)?;
        self.encargados_repo.areas_de_encargado(encargado_id).await
    }

    // ---
    // Áreas
    // ---

    pub async fn listar_areas(&self) -> Result<Vec<Area>, AppError> {
        self.encargados_repo.listar_areas().await
    }

    /// Alta idempotente: crear un área con un nombre ya usado (salvo
    /// mayúsculas o espacios) devuelve la existente.
    pub async fn crear_area(&self, nombre: &str) -> Result<Area, AppError> {
        let mut tx = self.pool.begin().await?;
        let area = self
            .encargados_repo
            .resolver_o_crear_area(&mut *tx, nombre)
            .await?;
        tx.commit().await?;
        Ok(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::pruebas;

    #[tokio::test]
    async fn crear_con_areas_vincula_y_reusa_por_nombre() {
        let pool = pruebas::pool_en_memoria().await;
        let servicio = pruebas::encargados(&pool);

        let taller = servicio.crear_area("Taller").await.unwrap();
        let deposito = servicio.crear_area("Depósito").await.unwrap();

        let juan = servicio
            .crear_con_areas("Juan", &[taller.id, deposito.id])
            .await
            .unwrap();

        let areas = servicio.areas_por_encargado(juan.id).await.unwrap();
        assert_eq!(areas.len(), 2);

        // Mismo nombre con otra grafía: se reusa la fila existente.
        let repetido = servicio.crear_con_areas("  JUAN ", &[]).await.unwrap();
        assert_eq!(repetido.id, juan.id);
        assert_eq!(servicio.listar().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn crear_con_area_inexistente_no_deja_rastro() {
        let pool = pruebas::pool_en_memoria().await;
        let servicio = pruebas::encargados(&pool);

        let resultado = servicio.crear_con_areas("Pedro", &[999]).await;
        assert!(matches!(resultado, Err(AppError::AreaNoEncontrada)));
        // La transacción revierte también el alta del encargado.
        assert!(servicio.listar().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn asignar_y_quitar_vinculos() {
        let pool = pruebas::pool_en_memoria().await;
        let servicio = pruebas::encargados(&pool);

        let taller = servicio.crear_area("Taller").await.unwrap();
        let ana = servicio.crear_con_areas("Ana", &[]).await.unwrap();

        servicio.asignar(taller.id, ana.id).await.unwrap();
        // Repetir el vínculo no es un error ni duplica.
        servicio.asignar(taller.id, ana.id).await.unwrap();

        let encargados = servicio.encargados_por_area(taller.id).await.unwrap();
        assert_eq!(encargados.len(), 1);
        assert_eq!(encargados[0].nombre, "Ana");

        servicio.quitar(taller.id, ana.id).await.unwrap();
        assert!(servicio
            .encargados_por_area(taller.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn asignar_valida_ambos_extremos() {
        let pool = pruebas::pool_en_memoria().await;
        let servicio = pruebas::encargados(&pool);

        let taller = servicio.crear_area("Taller").await.unwrap();
        let ana = servicio.crear_con_areas("Ana", &[]).await.unwrap();

        let sin_area = servicio.asignar(999, ana.id).await;
        assert!(matches!(sin_area, Err(AppError::AreaNoEncontrada)));
        let sin_encargado = servicio.asignar(taller.id, 999).await;
        assert!(matches!(sin_encargado, Err(AppError::EncargadoNoEncontrado)));
    }

    #[tokio::test]
    async fn eliminar_encargado_limpia_sus_vinculos() {
        let pool = pruebas::pool_en_memoria().await;
        let servicio = pruebas::encargados(&pool);

        let taller = servicio.crear_area("Taller").await.unwrap();
        let ana = servicio.crear_con_areas("Ana", &[taller.id]).await.unwrap();

        servicio.eliminar(ana.id).await.unwrap();

        assert!(servicio.listar().await.unwrap().is_empty());
        assert!(servicio
            .encargados_por_area(taller.id)
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(
            servicio.eliminar(ana.id).await,
            Err(AppError::EncargadoNoEncontrado)
        ));
    }

    #[tokio::test]
    async fn crear_area_es_idempotente_por_nombre_normalizado() {
        let pool = pruebas::pool_en_memoria().await;
        let servicio = pruebas::encargados(&pool);

        let primera = servicio.crear_area("Almacén").await.unwrap();
        let repetida = servicio.crear_area("  ALMACÉN ").await.unwrap();
        assert_eq!(primera.id, repetida.id);
        assert_eq!(servicio.listar_areas().await.unwrap().len(), 1);
    }
}
