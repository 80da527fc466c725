//! Product catalog and stock domain module.
//!
//! The inventory screens of the system work against this aggregate: each
//! producto carries an IGV-inclusive sale price, a SUNAT measurement unit
//! and a stock level that never goes negative. Pure deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod producto;

pub use producto::{
    ActualizarPrecio, AjustarStock, CrearProducto, DesactivarProducto, EstadoProducto,
    PrecioActualizado, Producto, ProductoCommand, ProductoCreado, ProductoDesactivado,
    ProductoEvent, ProductoId, StockAjustado, UNIDAD_DEFAULT,
};
