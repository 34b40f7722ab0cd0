pub mod encargados_repo;
pub mod entrada_repo;
pub mod inventario_repo;
pub mod salida_repo;

pub use encargados_repo::EncargadosRepository;
pub use entrada_repo::EntradaRepository;
pub use inventario_repo::InventarioRepository;
pub use salida_repo::SalidaRepository;
