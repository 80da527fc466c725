//! Till reconciliation arithmetic.
//!
//! Pure, total arithmetic over reals: no clamping, no currency formatting
//! (formatting belongs to the caller). The expected cash at close is the
//! opening float plus the session's sales; the variance is whatever the
//! physical count says minus that expectation.

use serde::{Deserialize, Serialize};

use facturador_core::ValueObject;

/// Classification of a till count, driving the close-dialog badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoArqueo {
    /// Positive variance: more cash than expected.
    Sobrante,
    /// Negative variance: missing cash.
    Faltante,
    /// Zero variance.
    Cuadrada,
}

impl EstadoArqueo {
    pub fn de_diferencia(diferencia: f64) -> Self {
        if diferencia > 0.0 {
            EstadoArqueo::Sobrante
        } else if diferencia < 0.0 {
            EstadoArqueo::Faltante
        } else {
            EstadoArqueo::Cuadrada
        }
    }

    /// Label shown on the close dialog.
    pub fn etiqueta(&self) -> &'static str {
        match self {
            EstadoArqueo::Sobrante => "Sobrante",
            EstadoArqueo::Faltante => "Faltante",
            EstadoArqueo::Cuadrada => "Caja Cuadrada",
        }
    }
}

/// Result of reconciling a till session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArqueoCaja {
    pub monto_apertura: f64,
    pub total_ventas: f64,
    pub monto_esperado: f64,
    pub monto_cierre_fisico: f64,
    pub diferencia: f64,
}

impl ArqueoCaja {
    pub fn estado(&self) -> EstadoArqueo {
        EstadoArqueo::de_diferencia(self.diferencia)
    }
}

impl ValueObject for ArqueoCaja {}

/// Reconcile a till: `monto_esperado = apertura + ventas`,
/// `diferencia = cierre físico - esperado`.
///
/// Sign convention: positive variance is a surplus, negative a shortage,
/// zero a balanced till.
pub fn arquear(monto_apertura: f64, total_ventas: f64, monto_cierre_fisico: f64) -> ArqueoCaja {
    let monto_esperado = monto_apertura + total_ventas;
    ArqueoCaja {
        monto_apertura,
        total_ventas,
        monto_esperado,
        monto_cierre_fisico,
        diferencia: monto_cierre_fisico - monto_esperado,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn caja_cuadrada() {
        let a = arquear(100.0, 250.50, 350.50);
        assert_eq!(a.diferencia, 0.0);
        assert_eq!(a.estado(), EstadoArqueo::Cuadrada);
        assert_eq!(a.estado().etiqueta(), "Caja Cuadrada");
    }

    #[test]
    fn faltante() {
        let a = arquear(100.0, 250.50, 300.0);
        assert_eq!(a.diferencia, -50.50);
        assert_eq!(a.estado(), EstadoArqueo::Faltante);
    }

    #[test]
    fn sobrante() {
        let a = arquear(100.0, 250.50, 400.0);
        assert_eq!(a.diferencia, 49.50);
        assert_eq!(a.estado(), EstadoArqueo::Sobrante);
    }

    proptest! {
        /// The variance is exactly count minus (opening + sales).
        #[test]
        fn la_diferencia_cierra(
            apertura in 0.0f64..10_000.0,
            ventas in 0.0f64..100_000.0,
            cierre in 0.0f64..200_000.0,
        ) {
            let a = arquear(apertura, ventas, cierre);
            prop_assert_eq!(a.monto_esperado, apertura + ventas);
            prop_assert_eq!(a.diferencia, cierre - (apertura + ventas));
        }

        /// The badge agrees with the sign of the variance.
        #[test]
        fn el_estado_sigue_el_signo(diferencia in -1000.0f64..1000.0) {
            let estado = EstadoArqueo::de_diferencia(diferencia);
            match estado {
                EstadoArqueo::Sobrante => prop_assert!(diferencia > 0.0),
                EstadoArqueo::Faltante => prop_assert!(diferencia < 0.0),
                EstadoArqueo::Cuadrada => prop_assert!(diferencia == 0.0),
            }
        }
    }
}
