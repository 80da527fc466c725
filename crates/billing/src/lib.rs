//! Monetary arithmetic and legal-text rendering for Peruvian sales documents.
//!
//! This crate holds the computational heart of the system, implemented purely
//! as deterministic, stateless functions (no IO, no HTTP, no storage):
//!
//! - [`letras`] — the "importe en letras" converter that spells an amount in
//!   upper-case Spanish for the legal legend of a comprobante.
//! - [`igv`] — the fixed-rate (18%) IGV breakdown between op. gravada, IGV
//!   and total, plus the document-level aggregation policy.
//! - [`monto`] — parsing of operator-typed amounts and the `"S/ "` display
//!   form.

pub mod igv;
pub mod letras;
pub mod monto;

pub use igv::{DesgloseIgv, IGV_RATE, redondear2};
pub use letras::{LetrasError, numero_a_letras};
pub use monto::{formato_soles, parse_monto};
