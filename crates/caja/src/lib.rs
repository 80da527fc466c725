//! Till (caja) domain module.
//!
//! A till session runs from an opening float to a physical count at close.
//! The reconciliation arithmetic lives in [`arqueo`] as pure functions; the
//! session lifecycle (open, record sales and cash movements, close) is the
//! [`sesion`] aggregate. No IO, no HTTP, no storage.

pub mod arqueo;
pub mod sesion;

pub use arqueo::{ArqueoCaja, EstadoArqueo, arquear};
pub use sesion::{
    AbrirCaja, CajaAbierta, CajaCerrada, CajaCommand, CajaEvent, CajaSesion, CajaSesionId,
    CerrarCaja, EstadoCaja, MovimientoRegistrado, RegistrarMovimiento, RegistrarVenta,
    TipoMovimiento, VentaRegistrada,
};
