//! Customer registry domain module.
//!
//! Business rules for the customers of the issuing business, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage). The
//! identity-document rules follow the SUNAT catalog: a factura needs a RUC,
//! a boleta a DNI, and walk-in ticket sales go to the generic customer.

pub mod cliente;

pub use cliente::{
    ActualizarCliente, CLIENTE_GENERICO, Cliente, ClienteActualizado, ClienteCommand,
    ClienteDesactivado, ClienteEvent, ClienteId, ClienteRegistrado, DesactivarCliente,
    DocumentoIdentidad, EstadoCliente, RegistrarCliente, TipoDocumento,
};
