pub mod encargados;
pub mod entradas;
pub mod inventario;
pub mod salidas;
