//! Till closing history read model.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use facturador_billing::redondear2;
use facturador_caja::{CajaEvent, CajaSesionId, EstadoArqueo};
use facturador_core::UserId;
use facturador_events::{EventEnvelope, Projection};

/// One closed till session, as shown on the history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CierreCaja {
    pub caja_id: CajaSesionId,
    pub monto_apertura: f64,
    pub total_ventas: f64,
    pub total_ingresos: f64,
    pub total_egresos: f64,
    pub monto_esperado: f64,
    pub monto_cierre_fisico: f64,
    pub diferencia: f64,
    pub estado_arqueo: EstadoArqueo,
    pub observacion: Option<String>,
}

/// The till currently open, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AperturaVigente {
    pub caja_id: CajaSesionId,
    pub usuario: UserId,
    pub monto_apertura: f64,
    pub fecha_apertura: NaiveDate,
    pub hora_apertura: NaiveTime,
}

/// Read model: chronological list of till closings plus the open session.
#[derive(Debug, Default)]
pub struct HistorialCaja {
    cierres: Vec<CierreCaja>,
    abierta: Option<AperturaVigente>,
}

impl HistorialCaja {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cierres(&self) -> &[CierreCaja] {
        &self.cierres
    }

    pub fn sesion_abierta(&self) -> Option<&AperturaVigente> {
        self.abierta.as_ref()
    }

    /// Cash missing across the whole history (sum of shortages, positive).
    pub fn faltante_acumulado(&self) -> f64 {
        let suma: f64 = self
            .cierres
            .iter()
            .filter(|c| c.estado_arqueo == EstadoArqueo::Faltante)
            .map(|c| -c.diferencia)
            .sum();
        redondear2(suma)
    }

    /// Cash surplus across the whole history.
    pub fn sobrante_acumulado(&self) -> f64 {
        let suma: f64 = self
            .cierres
            .iter()
            .filter(|c| c.estado_arqueo == EstadoArqueo::Sobrante)
            .map(|c| c.diferencia)
            .sum();
        redondear2(suma)
    }
}

impl Projection for HistorialCaja {
    type Ev = CajaEvent;

    fn apply(&mut self, envelope: &EventEnvelope<Self::Ev>) {
        match envelope.payload() {
            CajaEvent::CajaAbierta(e) => {
                self.abierta = Some(AperturaVigente {
                    caja_id: e.caja_id,
                    usuario: e.usuario,
                    monto_apertura: e.monto_apertura,
                    fecha_apertura: e.fecha_apertura,
                    hora_apertura: e.hora_apertura,
                });
            }
            CajaEvent::CajaCerrada(e) => {
                if self
                    .abierta
                    .as_ref()
                    .is_some_and(|a| a.caja_id == e.caja_id)
                {
                    self.abierta = None;
                }
                self.cierres.push(CierreCaja {
                    caja_id: e.caja_id,
                    monto_apertura: e.monto_apertura,
                    total_ventas: e.total_ventas,
                    total_ingresos: e.total_ingresos,
                    total_egresos: e.total_egresos,
                    monto_esperado: e.monto_esperado,
                    monto_cierre_fisico: e.monto_cierre_fisico,
                    diferencia: e.diferencia,
                    estado_arqueo: e.estado_arqueo,
                    observacion: e.observacion.clone(),
                });
            }
            // Running totals live in the aggregate; the history only records
            // aperturas and cierres.
            CajaEvent::VentaRegistrada(_) | CajaEvent::MovimientoRegistrado(_) => {}
        }
    }
}
