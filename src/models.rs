pub mod encargados;
pub mod inventario;
pub mod movimientos;

pub use encargados::{Area, Encargado};
pub use inventario::Inventario;
pub use movimientos::{Entrada, Salida};
