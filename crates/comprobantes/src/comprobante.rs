use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use facturador_billing::{DesgloseIgv, IGV_RATE, numero_a_letras};
use facturador_core::{Aggregate, AggregateId, AggregateRoot, DomainError, EmisorId, ValueObject};
use facturador_clientes::{CLIENTE_GENERICO, DocumentoIdentidad, TipoDocumento};
use facturador_events::Event;

use crate::serie::{NumeroComprobante, TipoComprobante};

/// Comprobante identifier (emisor-scoped via `emisor_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComprobanteId(pub AggregateId);

impl ComprobanteId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ComprobanteId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Comprobante status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoComprobante {
    Emitido,
    Pagado,
    Anulado,
}

/// Payment terms of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormaPago {
    Contado,
    Credito { fecha_vencimiento: NaiveDate },
}

/// Credit installment generated at emission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cuota {
    pub numero: u32,
    pub importe: f64,
    pub fecha_vencimiento: NaiveDate,
}

/// Customer snapshot printed on the document.
///
/// Tickets without an identified customer use [`DatosCliente::generico`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatosCliente {
    pub documento: DocumentoIdentidad,
    pub razon_social: String,
    pub direccion: Option<String>,
}

impl DatosCliente {
    /// The anonymous walk-in customer.
    pub fn generico() -> Self {
        Self {
            documento: DocumentoIdentidad::sin_documento(),
            razon_social: CLIENTE_GENERICO.to_string(),
            direccion: None,
        }
    }
}

impl ValueObject for DatosCliente {}

/// Reference from a nota de crédito to the document it corrects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenciaNotaCredito {
    pub tipo_afectado: TipoComprobante,
    pub numero_afectado: NumeroComprobante,
    pub motivo: String,
}

/// One line of a comprobante, with the full per-line IGV decomposition at
/// raw floating precision. Construction is the only validation point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetalleComprobante {
    pub item: u32,
    pub descripcion: String,
    pub unidad_id: String,
    pub cantidad: f64,
    /// Unit value, IGV-exclusive.
    pub valor_unitario: f64,
    /// Unit price, IGV-inclusive.
    pub precio_unitario: f64,
    pub igv: f64,
    pub porcentaje_igv: f64,
    /// Line value, IGV-exclusive (`valor_unitario * cantidad`).
    pub valor_total: f64,
    /// Line total, IGV-inclusive (`precio_unitario * cantidad`).
    pub importe_total: f64,
}

impl DetalleComprobante {
    /// Line from an IGV-inclusive unit price (ticket/boleta capture flow).
    pub fn desde_precio_con_igv(
        item: u32,
        descripcion: &str,
        unidad_id: &str,
        cantidad: f64,
        precio_unitario: f64,
    ) -> Result<Self, DomainError> {
        Self::validar(descripcion, cantidad, precio_unitario)?;
        let valor_unitario = precio_unitario / (1.0 + IGV_RATE);
        Ok(Self::armar(
            item,
            descripcion,
            unidad_id,
            cantidad,
            valor_unitario,
            precio_unitario,
        ))
    }

    /// Line from an IGV-exclusive unit value (factura detail flow).
    pub fn desde_valor_sin_igv(
        item: u32,
        descripcion: &str,
        unidad_id: &str,
        cantidad: f64,
        valor_unitario: f64,
    ) -> Result<Self, DomainError> {
        Self::validar(descripcion, cantidad, valor_unitario)?;
        let precio_unitario = valor_unitario * (1.0 + IGV_RATE);
        Ok(Self::armar(
            item,
            descripcion,
            unidad_id,
            cantidad,
            valor_unitario,
            precio_unitario,
        ))
    }

    fn validar(descripcion: &str, cantidad: f64, precio: f64) -> Result<(), DomainError> {
        if descripcion.trim().is_empty() {
            return Err(DomainError::validation("descripción cannot be empty"));
        }
        if !cantidad.is_finite() || cantidad <= 0.0 {
            return Err(DomainError::validation("cantidad must be positive"));
        }
        if !precio.is_finite() || precio <= 0.0 {
            return Err(DomainError::validation("precio must be positive"));
        }
        Ok(())
    }

    fn armar(
        item: u32,
        descripcion: &str,
        unidad_id: &str,
        cantidad: f64,
        valor_unitario: f64,
        precio_unitario: f64,
    ) -> Self {
        Self {
            item,
            descripcion: descripcion.trim().to_string(),
            unidad_id: unidad_id.to_string(),
            cantidad,
            valor_unitario,
            precio_unitario,
            igv: valor_unitario * IGV_RATE,
            porcentaje_igv: IGV_RATE * 100.0,
            valor_total: valor_unitario * cantidad,
            importe_total: precio_unitario * cantidad,
        }
    }
}

/// Aggregate root: Comprobante (ticket, boleta, factura or nota de crédito).
#[derive(Debug, Clone, PartialEq)]
pub struct Comprobante {
    id: ComprobanteId,
    emisor_id: Option<EmisorId>,
    tipo: TipoComprobante,
    numero: Option<NumeroComprobante>,
    estado: EstadoComprobante,
    detalles: Vec<DetalleComprobante>,
    desglose: DesgloseIgv,
    importe_en_letras: String,
    cuotas: Vec<Cuota>,
    total_pagado: f64,
    version: u64,
    created: bool,
}

/// Compare amounts at cent resolution (records are rounded to cents).
fn a_centavos(valor: f64) -> i64 {
    (valor * 100.0).round() as i64
}

impl Comprobante {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ComprobanteId) -> Self {
        Self {
            id,
            emisor_id: None,
            tipo: TipoComprobante::Ticket,
            numero: None,
            estado: EstadoComprobante::Emitido,
            detalles: Vec::new(),
            desglose: DesgloseIgv::desde_total(0.0),
            importe_en_letras: String::new(),
            cuotas: Vec::new(),
            total_pagado: 0.0,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ComprobanteId {
        self.id
    }

    pub fn emisor_id(&self) -> Option<EmisorId> {
        self.emisor_id
    }

    pub fn tipo(&self) -> TipoComprobante {
        self.tipo
    }

    pub fn numero(&self) -> Option<&NumeroComprobante> {
        self.numero.as_ref()
    }

    pub fn estado(&self) -> EstadoComprobante {
        self.estado
    }

    pub fn detalles(&self) -> &[DetalleComprobante] {
        &self.detalles
    }

    /// Document totals, rounded to cents.
    pub fn desglose(&self) -> DesgloseIgv {
        self.desglose
    }

    pub fn importe_en_letras(&self) -> &str {
        &self.importe_en_letras
    }

    pub fn cuotas(&self) -> &[Cuota] {
        &self.cuotas
    }

    pub fn total_pagado(&self) -> f64 {
        self.total_pagado
    }

    pub fn saldo_pendiente(&self) -> f64 {
        (self.desglose.total - self.total_pagado).max(0.0)
    }

    /// Invariant: an anulled or fully paid document accepts no payment.
    pub fn acepta_pagos(&self) -> bool {
        self.estado == EstadoComprobante::Emitido
            && a_centavos(self.total_pagado) < a_centavos(self.desglose.total)
    }
}

impl AggregateRoot for Comprobante {
    type Id = ComprobanteId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: EmitirComprobante.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitirComprobante {
    pub emisor_id: EmisorId,
    pub comprobante_id: ComprobanteId,
    pub tipo: TipoComprobante,
    /// Number already allocated from the corresponding serie.
    pub numero: NumeroComprobante,
    pub fecha_emision: NaiveDate,
    pub cliente: DatosCliente,
    pub detalles: Vec<DetalleComprobante>,
    pub forma_pago: FormaPago,
    /// Required when `tipo` is nota de crédito.
    pub referencia: Option<ReferenciaNotaCredito>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RegistrarPago.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrarPago {
    pub emisor_id: EmisorId,
    pub comprobante_id: ComprobanteId,
    pub monto: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AnularComprobante.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnularComprobante {
    pub emisor_id: EmisorId,
    pub comprobante_id: ComprobanteId,
    pub motivo: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComprobanteCommand {
    EmitirComprobante(EmitirComprobante),
    RegistrarPago(RegistrarPago),
    AnularComprobante(AnularComprobante),
}

/// Event: ComprobanteEmitido.
///
/// Totals are rounded to cents and the legend is final: this event is what
/// gets printed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprobanteEmitido {
    pub emisor_id: EmisorId,
    pub comprobante_id: ComprobanteId,
    pub tipo: TipoComprobante,
    pub numero: NumeroComprobante,
    pub fecha_emision: NaiveDate,
    pub cliente: DatosCliente,
    pub detalles: Vec<DetalleComprobante>,
    pub op_gravadas: f64,
    pub igv: f64,
    pub total: f64,
    pub importe_en_letras: String,
    pub forma_pago: FormaPago,
    pub cuotas: Vec<Cuota>,
    pub referencia: Option<ReferenciaNotaCredito>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PagoRegistrado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagoRegistrado {
    pub emisor_id: EmisorId,
    pub comprobante_id: ComprobanteId,
    pub monto: f64,
    pub nuevo_total_pagado: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ComprobanteAnulado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprobanteAnulado {
    pub emisor_id: EmisorId,
    pub comprobante_id: ComprobanteId,
    pub motivo: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComprobanteEvent {
    ComprobanteEmitido(ComprobanteEmitido),
    PagoRegistrado(PagoRegistrado),
    ComprobanteAnulado(ComprobanteAnulado),
}

impl Event for ComprobanteEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ComprobanteEvent::ComprobanteEmitido(_) => "comprobantes.comprobante.emitido",
            ComprobanteEvent::PagoRegistrado(_) => "comprobantes.comprobante.pago_registrado",
            ComprobanteEvent::ComprobanteAnulado(_) => "comprobantes.comprobante.anulado",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ComprobanteEvent::ComprobanteEmitido(e) => e.occurred_at,
            ComprobanteEvent::PagoRegistrado(e) => e.occurred_at,
            ComprobanteEvent::ComprobanteAnulado(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Comprobante {
    type Command = ComprobanteCommand;
    type Event = ComprobanteEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ComprobanteEvent::ComprobanteEmitido(e) => {
                self.id = e.comprobante_id;
                self.emisor_id = Some(e.emisor_id);
                self.tipo = e.tipo;
                self.numero = Some(e.numero.clone());
                self.estado = EstadoComprobante::Emitido;
                self.detalles = e.detalles.clone();
                self.desglose = DesgloseIgv {
                    op_gravada: e.op_gravadas,
                    igv: e.igv,
                    total: e.total,
                };
                self.importe_en_letras = e.importe_en_letras.clone();
                self.cuotas = e.cuotas.clone();
                self.total_pagado = 0.0;
                self.created = true;
            }
            ComprobanteEvent::PagoRegistrado(e) => {
                self.total_pagado = e.nuevo_total_pagado;
                if a_centavos(self.total_pagado) >= a_centavos(self.desglose.total) {
                    self.estado = EstadoComprobante::Pagado;
                }
            }
            ComprobanteEvent::ComprobanteAnulado(_) => {
                self.estado = EstadoComprobante::Anulado;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ComprobanteCommand::EmitirComprobante(cmd) => self.handle_emitir(cmd),
            ComprobanteCommand::RegistrarPago(cmd) => self.handle_pago(cmd),
            ComprobanteCommand::AnularComprobante(cmd) => self.handle_anular(cmd),
        }
    }
}

impl Comprobante {
    fn ensure_emisor(&self, emisor_id: EmisorId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.emisor_id != Some(emisor_id) {
            return Err(DomainError::invariant("emisor mismatch"));
        }
        Ok(())
    }

    fn ensure_comprobante_id(&self, comprobante_id: ComprobanteId) -> Result<(), DomainError> {
        if self.id != comprobante_id {
            return Err(DomainError::invariant("comprobante_id mismatch"));
        }
        Ok(())
    }

    fn validar_cliente(
        tipo: TipoComprobante,
        cliente: &DatosCliente,
    ) -> Result<(), DomainError> {
        if cliente.razon_social.trim().is_empty() {
            return Err(DomainError::validation("razón social cannot be empty"));
        }
        match tipo {
            TipoComprobante::Factura => {
                if !cliente.documento.es_ruc() {
                    return Err(DomainError::validation(
                        "factura requires the customer's RUC",
                    ));
                }
            }
            TipoComprobante::Boleta => {
                if !cliente.documento.es_dni()
                    && cliente.documento.tipo() != TipoDocumento::SinDocumento
                {
                    return Err(DomainError::validation(
                        "boleta requires a DNI or an unidentified customer",
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_emitir(&self, cmd: &EmitirComprobante) -> Result<Vec<ComprobanteEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("comprobante already emitted"));
        }
        if !cmd.tipo.lleva_importes() {
            return Err(DomainError::validation(
                "guía de remisión carries no amounts",
            ));
        }
        if cmd.detalles.is_empty() {
            return Err(DomainError::validation(
                "cannot emit a comprobante without detalles",
            ));
        }
        Self::validar_cliente(cmd.tipo, &cmd.cliente)?;

        match cmd.tipo {
            TipoComprobante::NotaCredito => {
                let referencia = cmd.referencia.as_ref().ok_or_else(|| {
                    DomainError::validation(
                        "nota de crédito requires the reference to the affected comprobante",
                    )
                })?;
                if referencia.motivo.trim().is_empty() {
                    return Err(DomainError::validation(
                        "nota de crédito requires a motivo",
                    ));
                }
            }
            _ if cmd.referencia.is_some() => {
                return Err(DomainError::validation(
                    "only a nota de crédito references another comprobante",
                ));
            }
            _ => {}
        }

        if let FormaPago::Credito { fecha_vencimiento } = cmd.forma_pago {
            if fecha_vencimiento < cmd.fecha_emision {
                return Err(DomainError::validation(
                    "fecha de vencimiento cannot precede the emission date",
                ));
            }
        }

        // Sum raw per-line bases, round once at the record boundary.
        let desglose =
            DesgloseIgv::de_valores_gravados(cmd.detalles.iter().map(|d| d.valor_total))
                .redondeado();

        // A legend failure blocks emission entirely.
        let importe_en_letras = numero_a_letras(desglose.total)
            .map_err(|e| DomainError::validation(format!("importe en letras: {e}")))?;

        let cuotas = match cmd.forma_pago {
            FormaPago::Contado => Vec::new(),
            FormaPago::Credito { fecha_vencimiento } => vec![Cuota {
                numero: 1,
                importe: desglose.total,
                fecha_vencimiento,
            }],
        };

        tracing::debug!(
            comprobante_id = %cmd.comprobante_id,
            numero = %cmd.numero,
            tipo = cmd.tipo.codigo_sunat(),
            total = desglose.total,
            "emitiendo comprobante"
        );

        Ok(vec![ComprobanteEvent::ComprobanteEmitido(
            ComprobanteEmitido {
                emisor_id: cmd.emisor_id,
                comprobante_id: cmd.comprobante_id,
                tipo: cmd.tipo,
                numero: cmd.numero.clone(),
                fecha_emision: cmd.fecha_emision,
                cliente: cmd.cliente.clone(),
                detalles: cmd.detalles.clone(),
                op_gravadas: desglose.op_gravada,
                igv: desglose.igv,
                total: desglose.total,
                importe_en_letras,
                forma_pago: cmd.forma_pago,
                cuotas,
                referencia: cmd.referencia.clone(),
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_pago(&self, cmd: &RegistrarPago) -> Result<Vec<ComprobanteEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_emisor(cmd.emisor_id)?;
        self.ensure_comprobante_id(cmd.comprobante_id)?;

        if !self.acepta_pagos() {
            return Err(DomainError::invariant(
                "cannot register payment on an anulled or fully paid comprobante",
            ));
        }
        if !cmd.monto.is_finite() || cmd.monto <= 0.0 {
            return Err(DomainError::validation("payment monto must be positive"));
        }

        let nuevo_total_pagado = self.total_pagado + cmd.monto;
        if a_centavos(nuevo_total_pagado) > a_centavos(self.desglose.total) {
            return Err(DomainError::invariant("cannot overpay a comprobante"));
        }

        Ok(vec![ComprobanteEvent::PagoRegistrado(PagoRegistrado {
            emisor_id: cmd.emisor_id,
            comprobante_id: cmd.comprobante_id,
            monto: cmd.monto,
            nuevo_total_pagado,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_anular(
        &self,
        cmd: &AnularComprobante,
    ) -> Result<Vec<ComprobanteEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_emisor(cmd.emisor_id)?;
        self.ensure_comprobante_id(cmd.comprobante_id)?;

        if self.estado == EstadoComprobante::Anulado {
            return Err(DomainError::conflict("comprobante is already anulled"));
        }

        Ok(vec![ComprobanteEvent::ComprobanteAnulado(
            ComprobanteAnulado {
                emisor_id: cmd.emisor_id,
                comprobante_id: cmd.comprobante_id,
                motivo: cmd.motivo.clone(),
                occurred_at: cmd.occurred_at,
            },
        )])
    }
}
