//! Reporting read models.
//!
//! Projections that fold the document and till event streams into the
//! queryable summaries behind the reports screens: daily sales totals per
//! document kind and the history of till closings. Read models are
//! disposable; replaying the stream rebuilds them from scratch.

pub mod historial_caja;
pub mod resumen_ventas;

pub use historial_caja::{AperturaVigente, CierreCaja, HistorialCaja};
pub use resumen_ventas::{ResumenVentas, TotalesVentas};
