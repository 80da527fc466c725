use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use facturador_billing::redondear2;
use facturador_core::{Aggregate, AggregateId, AggregateRoot, DomainError, EmisorId, UserId};
use facturador_events::Event;

use crate::arqueo::{EstadoArqueo, arquear};

/// Caja session identifier (one aggregate per apertura..cierre cycle).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CajaSesionId(pub AggregateId);

impl CajaSesionId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CajaSesionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Till session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoCaja {
    Abierta,
    Cerrada,
}

/// Manual cash movement between open and close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoMovimiento {
    Ingreso,
    Egreso,
}

/// Aggregate root: CajaSesion.
///
/// Expected cash at close is `apertura + ventas + ingresos - egresos`; the
/// physical count against that expectation yields the session's arqueo.
#[derive(Debug, Clone, PartialEq)]
pub struct CajaSesion {
    id: CajaSesionId,
    emisor_id: Option<EmisorId>,
    estado: EstadoCaja,
    monto_apertura: f64,
    total_ventas: f64,
    total_ingresos: f64,
    total_egresos: f64,
    version: u64,
    created: bool,
}

impl CajaSesion {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: CajaSesionId) -> Self {
        Self {
            id,
            emisor_id: None,
            estado: EstadoCaja::Abierta,
            monto_apertura: 0.0,
            total_ventas: 0.0,
            total_ingresos: 0.0,
            total_egresos: 0.0,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> CajaSesionId {
        self.id
    }

    pub fn emisor_id(&self) -> Option<EmisorId> {
        self.emisor_id
    }

    pub fn estado(&self) -> EstadoCaja {
        self.estado
    }

    pub fn monto_apertura(&self) -> f64 {
        self.monto_apertura
    }

    pub fn total_ventas(&self) -> f64 {
        self.total_ventas
    }

    pub fn total_ingresos(&self) -> f64 {
        self.total_ingresos
    }

    pub fn total_egresos(&self) -> f64 {
        self.total_egresos
    }

    /// Invariant helper: sales can only be rung up against an open till.
    pub fn acepta_operaciones(&self) -> bool {
        self.created && self.estado == EstadoCaja::Abierta
    }

    /// Cash the drawer should hold right now.
    pub fn monto_esperado(&self) -> f64 {
        self.monto_apertura + self.total_ventas + self.total_ingresos - self.total_egresos
    }
}

impl AggregateRoot for CajaSesion {
    type Id = CajaSesionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AbrirCaja.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbrirCaja {
    pub emisor_id: EmisorId,
    pub caja_id: CajaSesionId,
    pub usuario: UserId,
    /// Opening float counted into the drawer. Must be finite and >= 0.
    pub monto_apertura: f64,
    pub fecha_apertura: NaiveDate,
    pub hora_apertura: NaiveTime,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RegistrarVenta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrarVenta {
    pub emisor_id: EmisorId,
    pub caja_id: CajaSesionId,
    /// Document that produced the cash, for traceability.
    pub comprobante_id: AggregateId,
    pub importe: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RegistrarMovimiento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrarMovimiento {
    pub emisor_id: EmisorId,
    pub caja_id: CajaSesionId,
    pub tipo: TipoMovimiento,
    pub concepto: String,
    pub monto: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CerrarCaja.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CerrarCaja {
    pub emisor_id: EmisorId,
    pub caja_id: CajaSesionId,
    /// Physical count at close. Must be finite and >= 0.
    pub monto_cierre_fisico: f64,
    pub observacion: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CajaCommand {
    AbrirCaja(AbrirCaja),
    RegistrarVenta(RegistrarVenta),
    RegistrarMovimiento(RegistrarMovimiento),
    CerrarCaja(CerrarCaja),
}

/// Event: CajaAbierta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CajaAbierta {
    pub emisor_id: EmisorId,
    pub caja_id: CajaSesionId,
    pub usuario: UserId,
    pub monto_apertura: f64,
    pub fecha_apertura: NaiveDate,
    pub hora_apertura: NaiveTime,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VentaRegistrada.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VentaRegistrada {
    pub emisor_id: EmisorId,
    pub caja_id: CajaSesionId,
    pub comprobante_id: AggregateId,
    pub importe: f64,
    pub total_ventas: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: MovimientoRegistrado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovimientoRegistrado {
    pub emisor_id: EmisorId,
    pub caja_id: CajaSesionId,
    pub tipo: TipoMovimiento,
    pub concepto: String,
    pub monto: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CajaCerrada.
///
/// Carries the full arqueo, already rounded to cents (this is the
/// presentation/record boundary for the session's arithmetic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CajaCerrada {
    pub emisor_id: EmisorId,
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
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CajaEvent {
    CajaAbierta(CajaAbierta),
    VentaRegistrada(VentaRegistrada),
    MovimientoRegistrado(MovimientoRegistrado),
    CajaCerrada(CajaCerrada),
}

impl Event for CajaEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CajaEvent::CajaAbierta(_) => "caja.sesion.abierta",
            CajaEvent::VentaRegistrada(_) => "caja.sesion.venta_registrada",
            CajaEvent::MovimientoRegistrado(_) => "caja.sesion.movimiento_registrado",
            CajaEvent::CajaCerrada(_) => "caja.sesion.cerrada",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CajaEvent::CajaAbierta(e) => e.occurred_at,
            CajaEvent::VentaRegistrada(e) => e.occurred_at,
            CajaEvent::MovimientoRegistrado(e) => e.occurred_at,
            CajaEvent::CajaCerrada(e) => e.occurred_at,
        }
    }
}

impl Aggregate for CajaSesion {
    type Command = CajaCommand;
    type Event = CajaEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CajaEvent::CajaAbierta(e) => {
                self.id = e.caja_id;
                self.emisor_id = Some(e.emisor_id);
                self.estado = EstadoCaja::Abierta;
                self.monto_apertura = e.monto_apertura;
                self.total_ventas = 0.0;
                self.total_ingresos = 0.0;
                self.total_egresos = 0.0;
                self.created = true;
            }
            CajaEvent::VentaRegistrada(e) => {
                self.total_ventas = e.total_ventas;
            }
            CajaEvent::MovimientoRegistrado(e) => match e.tipo {
                TipoMovimiento::Ingreso => self.total_ingresos += e.monto,
                TipoMovimiento::Egreso => self.total_egresos += e.monto,
            },
            CajaEvent::CajaCerrada(_) => {
                self.estado = EstadoCaja::Cerrada;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CajaCommand::AbrirCaja(cmd) => self.handle_abrir(cmd),
            CajaCommand::RegistrarVenta(cmd) => self.handle_venta(cmd),
            CajaCommand::RegistrarMovimiento(cmd) => self.handle_movimiento(cmd),
            CajaCommand::CerrarCaja(cmd) => self.handle_cerrar(cmd),
        }
    }
}

impl CajaSesion {
    fn ensure_emisor(&self, emisor_id: EmisorId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.emisor_id != Some(emisor_id) {
            return Err(DomainError::invariant("emisor mismatch"));
        }
        Ok(())
    }

    fn ensure_abierta(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::invariant(
                "caja must be opened before operating",
            ));
        }
        if self.estado == EstadoCaja::Cerrada {
            return Err(DomainError::invariant("caja is already closed"));
        }
        Ok(())
    }

    fn validar_monto(monto: f64, contexto: &str) -> Result<(), DomainError> {
        if !monto.is_finite() || monto < 0.0 {
            return Err(DomainError::validation(format!(
                "{contexto} must be a non-negative amount"
            )));
        }
        Ok(())
    }

    fn handle_abrir(&self, cmd: &AbrirCaja) -> Result<Vec<CajaEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("caja session already opened"));
        }
        Self::validar_monto(cmd.monto_apertura, "monto de apertura")?;

        Ok(vec![CajaEvent::CajaAbierta(CajaAbierta {
            emisor_id: cmd.emisor_id,
            caja_id: cmd.caja_id,
            usuario: cmd.usuario,
            monto_apertura: cmd.monto_apertura,
            fecha_apertura: cmd.fecha_apertura,
            hora_apertura: cmd.hora_apertura,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_venta(&self, cmd: &RegistrarVenta) -> Result<Vec<CajaEvent>, DomainError> {
        self.ensure_abierta()?;
        self.ensure_emisor(cmd.emisor_id)?;

        if !cmd.importe.is_finite() || cmd.importe <= 0.0 {
            return Err(DomainError::validation("importe must be positive"));
        }

        Ok(vec![CajaEvent::VentaRegistrada(VentaRegistrada {
            emisor_id: cmd.emisor_id,
            caja_id: cmd.caja_id,
            comprobante_id: cmd.comprobante_id,
            importe: cmd.importe,
            total_ventas: self.total_ventas + cmd.importe,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_movimiento(&self, cmd: &RegistrarMovimiento) -> Result<Vec<CajaEvent>, DomainError> {
        self.ensure_abierta()?;
        self.ensure_emisor(cmd.emisor_id)?;

        if cmd.concepto.trim().is_empty() {
            return Err(DomainError::validation("concepto cannot be empty"));
        }
        if !cmd.monto.is_finite() || cmd.monto <= 0.0 {
            return Err(DomainError::validation("monto must be positive"));
        }

        Ok(vec![CajaEvent::MovimientoRegistrado(MovimientoRegistrado {
            emisor_id: cmd.emisor_id,
            caja_id: cmd.caja_id,
            tipo: cmd.tipo,
            concepto: cmd.concepto.clone(),
            monto: cmd.monto,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cerrar(&self, cmd: &CerrarCaja) -> Result<Vec<CajaEvent>, DomainError> {
        self.ensure_abierta()?;
        self.ensure_emisor(cmd.emisor_id)?;
        Self::validar_monto(cmd.monto_cierre_fisico, "monto de cierre")?;

        let total_sesion = self.total_ventas + self.total_ingresos - self.total_egresos;
        let arqueo = arquear(self.monto_apertura, total_sesion, cmd.monto_cierre_fisico);

        // Record boundary: amounts on the closing record are rounded to cents.
        let diferencia = redondear2(arqueo.diferencia);
        let estado_arqueo = EstadoArqueo::de_diferencia(diferencia);

        tracing::debug!(
            caja_id = %cmd.caja_id,
            monto_esperado = arqueo.monto_esperado,
            diferencia,
            estado = estado_arqueo.etiqueta(),
            "cerrando caja"
        );

        Ok(vec![CajaEvent::CajaCerrada(CajaCerrada {
            emisor_id: cmd.emisor_id,
            caja_id: cmd.caja_id,
            monto_apertura: self.monto_apertura,
            total_ventas: redondear2(self.total_ventas),
            total_ingresos: redondear2(self.total_ingresos),
            total_egresos: redondear2(self.total_egresos),
            monto_esperado: redondear2(arqueo.monto_esperado),
            monto_cierre_fisico: cmd.monto_cierre_fisico,
            diferencia,
            estado_arqueo,
            observacion: cmd.observacion.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
