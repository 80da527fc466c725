//! Daily sales summary read model.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use facturador_billing::redondear2;
use facturador_comprobantes::{ComprobanteEvent, TipoComprobante};
use facturador_core::AggregateId;
use facturador_events::{EventEnvelope, Projection};

/// Accumulated totals for one bucket (a day, or a document kind).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalesVentas {
    pub documentos: u32,
    pub anulados: u32,
    pub op_gravadas: f64,
    pub igv: f64,
    pub total: f64,
}

impl TotalesVentas {
    fn sumar(&mut self, op_gravadas: f64, igv: f64, total: f64) {
        self.documentos += 1;
        self.op_gravadas += op_gravadas;
        self.igv += igv;
        self.total += total;
    }

    fn restar(&mut self, op_gravadas: f64, igv: f64, total: f64) {
        self.anulados += 1;
        self.op_gravadas -= op_gravadas;
        self.igv -= igv;
        self.total -= total;
    }

    /// Presentation form: every amount rounded to cents.
    pub fn redondeado(&self) -> Self {
        Self {
            documentos: self.documentos,
            anulados: self.anulados,
            op_gravadas: redondear2(self.op_gravadas),
            igv: redondear2(self.igv),
            total: redondear2(self.total),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct EmisionRegistrada {
    fecha: NaiveDate,
    tipo: TipoComprobante,
    op_gravadas: f64,
    igv: f64,
    total: f64,
}

/// Read model: sales totals per day and per document kind.
///
/// Anulaciones subtract the document they void, so the summary always shows
/// the net emitted amounts.
#[derive(Debug, Default)]
pub struct ResumenVentas {
    por_dia: BTreeMap<NaiveDate, TotalesVentas>,
    por_tipo: BTreeMap<TipoComprobante, TotalesVentas>,
    // Emission data by stream, needed to reverse an anulación.
    emisiones: HashMap<AggregateId, EmisionRegistrada>,
}

impl ResumenVentas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn totales_del_dia(&self, fecha: NaiveDate) -> TotalesVentas {
        self.por_dia
            .get(&fecha)
            .copied()
            .unwrap_or_default()
            .redondeado()
    }

    pub fn totales_por_tipo(&self, tipo: TipoComprobante) -> TotalesVentas {
        self.por_tipo
            .get(&tipo)
            .copied()
            .unwrap_or_default()
            .redondeado()
    }

    /// Net totals across the whole replayed history.
    pub fn totales_generales(&self) -> TotalesVentas {
        let mut acumulado = TotalesVentas::default();
        for t in self.por_dia.values() {
            acumulado.documentos += t.documentos;
            acumulado.anulados += t.anulados;
            acumulado.op_gravadas += t.op_gravadas;
            acumulado.igv += t.igv;
            acumulado.total += t.total;
        }
        acumulado.redondeado()
    }

    pub fn dias(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.por_dia.keys().copied()
    }
}

impl Projection for ResumenVentas {
    type Ev = ComprobanteEvent;

    fn apply(&mut self, envelope: &EventEnvelope<Self::Ev>) {
        match envelope.payload() {
            ComprobanteEvent::ComprobanteEmitido(e) => {
                self.por_dia
                    .entry(e.fecha_emision)
                    .or_default()
                    .sumar(e.op_gravadas, e.igv, e.total);
                self.por_tipo
                    .entry(e.tipo)
                    .or_default()
                    .sumar(e.op_gravadas, e.igv, e.total);
                self.emisiones.insert(
                    envelope.aggregate_id(),
                    EmisionRegistrada {
                        fecha: e.fecha_emision,
                        tipo: e.tipo,
                        op_gravadas: e.op_gravadas,
                        igv: e.igv,
                        total: e.total,
                    },
                );
            }
            ComprobanteEvent::ComprobanteAnulado(_) => {
                if let Some(emision) = self.emisiones.remove(&envelope.aggregate_id()) {
                    if let Some(dia) = self.por_dia.get_mut(&emision.fecha) {
                        dia.restar(emision.op_gravadas, emision.igv, emision.total);
                    }
                    if let Some(tipo) = self.por_tipo.get_mut(&emision.tipo) {
                        tipo.restar(emision.op_gravadas, emision.igv, emision.total);
                    }
                }
            }
            // Payments do not change emitted amounts.
            ComprobanteEvent::PagoRegistrado(_) => {}
        }
    }
}
