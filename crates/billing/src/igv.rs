//! Fixed-rate IGV (18%) breakdown between op. gravada, IGV and total.
//!
//! All arithmetic runs in full floating precision; rounding happens once, at
//! the presentation boundary ([`DesgloseIgv::redondeado`] / [`redondear2`]).
//! Document-level totals are the sum of raw per-line values, never a
//! recomputation from already-rounded figures — summing rounded values and
//! rounding a raw sum can differ by a cent across a multi-line document.

use serde::{Deserialize, Serialize};

use facturador_core::ValueObject;

/// Peruvian IGV rate, fixed at 18%.
pub const IGV_RATE: f64 = 0.18;

/// Round to 2 decimals (cents). Presentation boundary only.
pub fn redondear2(valor: f64) -> f64 {
    (valor * 100.0).round() / 100.0
}

/// Three-way tax breakdown of a monetary amount.
///
/// Exactly one of `total` (tax-inclusive) or `op_gravada` (tax-exclusive)
/// is the independent variable, depending on the constructor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesgloseIgv {
    /// Tax-exclusive base subject to IGV.
    pub op_gravada: f64,
    pub igv: f64,
    /// Tax-inclusive amount payable.
    pub total: f64,
}

impl DesgloseIgv {
    /// Breakdown from a tax-inclusive amount. `total` is echoed exactly.
    pub fn desde_total(total: f64) -> Self {
        let op_gravada = total / (1.0 + IGV_RATE);
        Self {
            op_gravada,
            igv: total - op_gravada,
            total,
        }
    }

    /// Breakdown from a tax-exclusive base.
    pub fn desde_op_gravada(op_gravada: f64) -> Self {
        let igv = op_gravada * IGV_RATE;
        Self {
            op_gravada,
            igv,
            total: op_gravada + igv,
        }
    }

    /// Document-level breakdown from raw per-line tax-exclusive values
    /// (the factura detail flow).
    pub fn de_valores_gravados(valores: impl IntoIterator<Item = f64>) -> Self {
        Self::desde_op_gravada(valores.into_iter().sum())
    }

    /// Document-level breakdown from raw per-line tax-inclusive totals
    /// (the ticket/boleta flow).
    pub fn de_importes_totales(importes: impl IntoIterator<Item = f64>) -> Self {
        Self::desde_total(importes.into_iter().sum())
    }

    /// The presentation form: every field rounded to cents.
    pub fn redondeado(&self) -> Self {
        Self {
            op_gravada: redondear2(self.op_gravada),
            igv: redondear2(self.igv),
            total: redondear2(self.total),
        }
    }
}

impl ValueObject for DesgloseIgv {}
