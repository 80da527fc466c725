//! Guía de remisión (dispatch guide) — the document that moves goods.
//!
//! A guía carries no monetary amounts: its substance is the traslado data
//! (motivo, modalidad, weight, origin/destination) that the transport
//! inspection checks on the road.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use facturador_core::{Aggregate, AggregateId, AggregateRoot, DomainError, EmisorId, ValueObject};
use facturador_events::Event;

use crate::comprobante::DatosCliente;
use crate::serie::NumeroComprobante;

/// Guía identifier (emisor-scoped via `emisor_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuiaRemisionId(pub AggregateId);

impl GuiaRemisionId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for GuiaRemisionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Reason for the transfer, per the SUNAT motivo catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotivoTraslado {
    Venta,
    Compra,
    TrasladoEntreEstablecimientos,
    /// Requires a free-text description.
    Otros,
}

impl MotivoTraslado {
    pub fn codigo_sunat(&self) -> &'static str {
        match self {
            MotivoTraslado::Venta => "01",
            MotivoTraslado::Compra => "02",
            MotivoTraslado::TrasladoEntreEstablecimientos => "04",
            MotivoTraslado::Otros => "13",
        }
    }
}

/// Who carries the goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalidadTraslado {
    TransportePublico,
    TransportePrivado,
}

impl ModalidadTraslado {
    pub fn codigo_sunat(&self) -> &'static str {
        match self {
            ModalidadTraslado::TransportePublico => "01",
            ModalidadTraslado::TransportePrivado => "02",
        }
    }
}

/// Origin or destination point: ubigeo (6 digits) + street address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuntoTraslado {
    ubigeo: String,
    direccion: String,
}

impl PuntoTraslado {
    pub fn nuevo(ubigeo: &str, direccion: &str) -> Result<Self, DomainError> {
        let ubigeo = ubigeo.trim();
        if ubigeo.len() != 6 || !ubigeo.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation("ubigeo must be exactly 6 digits"));
        }
        let direccion = direccion.trim();
        if direccion.is_empty() {
            return Err(DomainError::validation("dirección cannot be empty"));
        }
        Ok(Self {
            ubigeo: ubigeo.to_string(),
            direccion: direccion.to_string(),
        })
    }

    pub fn ubigeo(&self) -> &str {
        &self.ubigeo
    }

    pub fn direccion(&self) -> &str {
        &self.direccion
    }
}

impl ValueObject for PuntoTraslado {}

/// One line of transported goods (no amounts, only quantities).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetalleGuia {
    pub descripcion: String,
    pub unidad_id: String,
    pub cantidad: f64,
}

impl DetalleGuia {
    pub fn nuevo(descripcion: &str, unidad_id: &str, cantidad: f64) -> Result<Self, DomainError> {
        if descripcion.trim().is_empty() {
            return Err(DomainError::validation("descripción cannot be empty"));
        }
        if !cantidad.is_finite() || cantidad <= 0.0 {
            return Err(DomainError::validation("cantidad must be positive"));
        }
        Ok(Self {
            descripcion: descripcion.trim().to_string(),
            unidad_id: unidad_id.to_string(),
            cantidad,
        })
    }
}

/// Guía status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoGuia {
    Emitida,
    Anulada,
}

/// Aggregate root: GuiaRemision.
#[derive(Debug, Clone, PartialEq)]
pub struct GuiaRemision {
    id: GuiaRemisionId,
    emisor_id: Option<EmisorId>,
    numero: Option<NumeroComprobante>,
    estado: EstadoGuia,
    version: u64,
    created: bool,
}

impl GuiaRemision {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: GuiaRemisionId) -> Self {
        Self {
            id,
            emisor_id: None,
            numero: None,
            estado: EstadoGuia::Emitida,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> GuiaRemisionId {
        self.id
    }

    pub fn emisor_id(&self) -> Option<EmisorId> {
        self.emisor_id
    }

    pub fn numero(&self) -> Option<&NumeroComprobante> {
        self.numero.as_ref()
    }

    pub fn estado(&self) -> EstadoGuia {
        self.estado
    }
}

impl AggregateRoot for GuiaRemision {
    type Id = GuiaRemisionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: EmitirGuia.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitirGuia {
    pub emisor_id: EmisorId,
    pub guia_id: GuiaRemisionId,
    /// Number already allocated from the guía serie.
    pub numero: NumeroComprobante,
    pub fecha_traslado: NaiveDate,
    pub motivo: MotivoTraslado,
    /// Required when `motivo` is [`MotivoTraslado::Otros`].
    pub descripcion_motivo: Option<String>,
    pub modalidad: ModalidadTraslado,
    /// Required when `modalidad` is transporte privado.
    pub vehiculo_placa: Option<String>,
    pub peso_bruto_kg: f64,
    pub destinatario: DatosCliente,
    pub partida: PuntoTraslado,
    pub llegada: PuntoTraslado,
    pub detalles: Vec<DetalleGuia>,
    /// Sale document that originated the transfer, if any.
    pub comprobante_relacionado: Option<NumeroComprobante>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AnularGuia.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnularGuia {
    pub emisor_id: EmisorId,
    pub guia_id: GuiaRemisionId,
    pub motivo: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GuiaCommand {
    EmitirGuia(EmitirGuia),
    AnularGuia(AnularGuia),
}

/// Event: GuiaEmitida.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiaEmitida {
    pub emisor_id: EmisorId,
    pub guia_id: GuiaRemisionId,
    pub numero: NumeroComprobante,
    pub fecha_traslado: NaiveDate,
    pub motivo: MotivoTraslado,
    pub descripcion_motivo: Option<String>,
    pub modalidad: ModalidadTraslado,
    pub vehiculo_placa: Option<String>,
    pub peso_bruto_kg: f64,
    pub destinatario: DatosCliente,
    pub partida: PuntoTraslado,
    pub llegada: PuntoTraslado,
    pub detalles: Vec<DetalleGuia>,
    pub comprobante_relacionado: Option<NumeroComprobante>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: GuiaAnulada.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiaAnulada {
    pub emisor_id: EmisorId,
    pub guia_id: GuiaRemisionId,
    pub motivo: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GuiaEvent {
    GuiaEmitida(GuiaEmitida),
    GuiaAnulada(GuiaAnulada),
}

impl Event for GuiaEvent {
    fn event_type(&self) -> &'static str {
        match self {
            GuiaEvent::GuiaEmitida(_) => "comprobantes.guia.emitida",
            GuiaEvent::GuiaAnulada(_) => "comprobantes.guia.anulada",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            GuiaEvent::GuiaEmitida(e) => e.occurred_at,
            GuiaEvent::GuiaAnulada(e) => e.occurred_at,
        }
    }
}

impl Aggregate for GuiaRemision {
    type Command = GuiaCommand;
    type Event = GuiaEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            GuiaEvent::GuiaEmitida(e) => {
                self.id = e.guia_id;
                self.emisor_id = Some(e.emisor_id);
                self.numero = Some(e.numero.clone());
                self.estado = EstadoGuia::Emitida;
                self.created = true;
            }
            GuiaEvent::GuiaAnulada(_) => {
                self.estado = EstadoGuia::Anulada;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            GuiaCommand::EmitirGuia(cmd) => self.handle_emitir(cmd),
            GuiaCommand::AnularGuia(cmd) => self.handle_anular(cmd),
        }
    }
}

impl GuiaRemision {
    fn ensure_emisor(&self, emisor_id: EmisorId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.emisor_id != Some(emisor_id) {
            return Err(DomainError::invariant("emisor mismatch"));
        }
        Ok(())
    }

    fn handle_emitir(&self, cmd: &EmitirGuia) -> Result<Vec<GuiaEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("guía already emitted"));
        }
        if cmd.detalles.is_empty() {
            return Err(DomainError::validation(
                "cannot emit a guía without detalles",
            ));
        }
        if !cmd.peso_bruto_kg.is_finite() || cmd.peso_bruto_kg <= 0.0 {
            return Err(DomainError::validation("peso bruto must be positive"));
        }
        if cmd.destinatario.razon_social.trim().is_empty() {
            return Err(DomainError::validation("destinatario cannot be empty"));
        }

        if cmd.motivo == MotivoTraslado::Otros
            && cmd
                .descripcion_motivo
                .as_deref()
                .is_none_or(|d| d.trim().is_empty())
        {
            return Err(DomainError::validation(
                "motivo 'otros' requires a description",
            ));
        }

        let vehiculo_placa = match cmd.modalidad {
            ModalidadTraslado::TransportePrivado => {
                let placa = cmd
                    .vehiculo_placa
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| {
                        DomainError::validation(
                            "transporte privado requires the vehicle placa",
                        )
                    })?;
                if placa.len() < 6
                    || placa.len() > 8
                    || !placa.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
                {
                    return Err(DomainError::validation("placa has an invalid format"));
                }
                Some(placa.to_ascii_uppercase())
            }
            // The carrier's own paperwork identifies the vehicle.
            ModalidadTraslado::TransportePublico => None,
        };

        Ok(vec![GuiaEvent::GuiaEmitida(GuiaEmitida {
            emisor_id: cmd.emisor_id,
            guia_id: cmd.guia_id,
            numero: cmd.numero.clone(),
            fecha_traslado: cmd.fecha_traslado,
            motivo: cmd.motivo,
            descripcion_motivo: cmd.descripcion_motivo.clone(),
            modalidad: cmd.modalidad,
            vehiculo_placa,
            peso_bruto_kg: cmd.peso_bruto_kg,
            destinatario: cmd.destinatario.clone(),
            partida: cmd.partida.clone(),
            llegada: cmd.llegada.clone(),
            detalles: cmd.detalles.clone(),
            comprobante_relacionado: cmd.comprobante_relacionado.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_anular(&self, cmd: &AnularGuia) -> Result<Vec<GuiaEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_emisor(cmd.emisor_id)?;

        if self.estado == EstadoGuia::Anulada {
            return Err(DomainError::conflict("guía is already anulled"));
        }

        Ok(vec![GuiaEvent::GuiaAnulada(GuiaAnulada {
            emisor_id: cmd.emisor_id,
            guia_id: cmd.guia_id,
            motivo: cmd.motivo.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
