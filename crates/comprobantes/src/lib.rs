//! Sales-document domain module.
//!
//! Business rules for the documents a printing business emits — tickets,
//! boletas, facturas, notas de crédito and guías de remisión — implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).
//! Emission computes the IGV breakdown and the "importe en letras" legend;
//! any failure there blocks the document entirely, because a wrong legend on
//! a fiscal document is the one silent bug this system cannot afford.

pub mod comprobante;
pub mod guia;
pub mod serie;

pub use comprobante::{
    AnularComprobante, Comprobante, ComprobanteAnulado, ComprobanteCommand, ComprobanteEmitido,
    ComprobanteEvent, ComprobanteId, Cuota, DatosCliente, DetalleComprobante, EmitirComprobante,
    EstadoComprobante, FormaPago, PagoRegistrado, ReferenciaNotaCredito, RegistrarPago,
};
pub use guia::{
    AnularGuia, DetalleGuia, EmitirGuia, EstadoGuia, GuiaAnulada, GuiaCommand, GuiaEmitida,
    GuiaEvent, GuiaRemision, GuiaRemisionId, ModalidadTraslado, MotivoTraslado, PuntoTraslado,
};
pub use serie::{NumeroComprobante, Serie, TipoComprobante};
