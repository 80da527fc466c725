use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use facturador_core::{Aggregate, AggregateId, AggregateRoot, DomainError, EmisorId, ValueObject};
use facturador_events::Event;

/// Legend used on ticket sales without an identified customer.
pub const CLIENTE_GENERICO: &str = "CLIENTES VARIOS";

/// Cliente identifier (emisor-scoped via `emisor_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClienteId(pub AggregateId);

impl ClienteId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ClienteId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Identity-document kind, per the SUNAT document catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipoDocumento {
    SinDocumento,
    Dni,
    CarnetExtranjeria,
    Ruc,
    Pasaporte,
}

impl TipoDocumento {
    /// Catalog code as transmitted on electronic comprobantes.
    pub fn codigo_sunat(&self) -> &'static str {
        match self {
            TipoDocumento::SinDocumento => "0",
            TipoDocumento::Dni => "1",
            TipoDocumento::CarnetExtranjeria => "4",
            TipoDocumento::Ruc => "6",
            TipoDocumento::Pasaporte => "7",
        }
    }
}

/// Validated identity document of a cliente.
///
/// Construction is the only validation point: a `DocumentoIdentidad` in hand
/// always satisfies the numbering rules of its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentoIdentidad {
    tipo: TipoDocumento,
    numero: String,
}

impl DocumentoIdentidad {
    /// Validate and build a document. Rules: DNI is exactly 8 digits, RUC
    /// exactly 11 digits, carnet/pasaporte 1..=12 alphanumeric characters.
    pub fn nuevo(tipo: TipoDocumento, numero: &str) -> Result<Self, DomainError> {
        let numero = numero.trim();
        match tipo {
            TipoDocumento::SinDocumento => {
                if !numero.is_empty() {
                    return Err(DomainError::validation(
                        "documento 'sin documento' carries no number",
                    ));
                }
            }
            TipoDocumento::Dni => {
                if numero.len() != 8 || !numero.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(DomainError::validation("DNI must be exactly 8 digits"));
                }
            }
            TipoDocumento::Ruc => {
                if numero.len() != 11 || !numero.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(DomainError::validation("RUC must be exactly 11 digits"));
                }
            }
            TipoDocumento::CarnetExtranjeria | TipoDocumento::Pasaporte => {
                if numero.is_empty()
                    || numero.len() > 12
                    || !numero.bytes().all(|b| b.is_ascii_alphanumeric())
                {
                    return Err(DomainError::validation(
                        "document number must be 1..=12 alphanumeric characters",
                    ));
                }
            }
        }
        Ok(Self {
            tipo,
            numero: numero.to_string(),
        })
    }

    /// The anonymous walk-in customer document.
    pub fn sin_documento() -> Self {
        Self {
            tipo: TipoDocumento::SinDocumento,
            numero: String::new(),
        }
    }

    pub fn tipo(&self) -> TipoDocumento {
        self.tipo
    }

    pub fn numero(&self) -> &str {
        &self.numero
    }

    pub fn es_ruc(&self) -> bool {
        self.tipo == TipoDocumento::Ruc
    }

    pub fn es_dni(&self) -> bool {
        self.tipo == TipoDocumento::Dni
    }
}

impl ValueObject for DocumentoIdentidad {}

/// Cliente status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoCliente {
    Activo,
    Inactivo,
}

/// Aggregate root: Cliente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cliente {
    id: ClienteId,
    emisor_id: Option<EmisorId>,
    documento: DocumentoIdentidad,
    razon_social: String,
    direccion: Option<String>,
    estado: EstadoCliente,
    version: u64,
    created: bool,
}

impl Cliente {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ClienteId) -> Self {
        Self {
            id,
            emisor_id: None,
            documento: DocumentoIdentidad::sin_documento(),
            razon_social: String::new(),
            direccion: None,
            estado: EstadoCliente::Activo,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ClienteId {
        self.id
    }

    pub fn emisor_id(&self) -> Option<EmisorId> {
        self.emisor_id
    }

    pub fn documento(&self) -> &DocumentoIdentidad {
        &self.documento
    }

    pub fn razon_social(&self) -> &str {
        &self.razon_social
    }

    pub fn direccion(&self) -> Option<&str> {
        self.direccion.as_deref()
    }

    pub fn estado(&self) -> EstadoCliente {
        self.estado
    }

    /// Invariant helper: inactive clientes cannot appear on new documents.
    pub fn puede_comprar(&self) -> bool {
        self.estado == EstadoCliente::Activo
    }
}

impl AggregateRoot for Cliente {
    type Id = ClienteId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegistrarCliente.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrarCliente {
    pub emisor_id: EmisorId,
    pub cliente_id: ClienteId,
    pub documento: DocumentoIdentidad,
    pub razon_social: String,
    pub direccion: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ActualizarCliente.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualizarCliente {
    pub emisor_id: EmisorId,
    pub cliente_id: ClienteId,
    /// Optional new razón social (if None, keep existing).
    pub razon_social: Option<String>,
    /// Optional new dirección (if None, keep existing).
    pub direccion: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DesactivarCliente.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesactivarCliente {
    pub emisor_id: EmisorId,
    pub cliente_id: ClienteId,
    pub motivo: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClienteCommand {
    RegistrarCliente(RegistrarCliente),
    ActualizarCliente(ActualizarCliente),
    DesactivarCliente(DesactivarCliente),
}

/// Event: ClienteRegistrado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClienteRegistrado {
    pub emisor_id: EmisorId,
    pub cliente_id: ClienteId,
    pub documento: DocumentoIdentidad,
    pub razon_social: String,
    pub direccion: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ClienteActualizado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClienteActualizado {
    pub emisor_id: EmisorId,
    pub cliente_id: ClienteId,
    pub razon_social: String,
    pub direccion: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ClienteDesactivado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClienteDesactivado {
    pub emisor_id: EmisorId,
    pub cliente_id: ClienteId,
    pub motivo: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClienteEvent {
    ClienteRegistrado(ClienteRegistrado),
    ClienteActualizado(ClienteActualizado),
    ClienteDesactivado(ClienteDesactivado),
}

impl Event for ClienteEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ClienteEvent::ClienteRegistrado(_) => "clientes.cliente.registrado",
            ClienteEvent::ClienteActualizado(_) => "clientes.cliente.actualizado",
            ClienteEvent::ClienteDesactivado(_) => "clientes.cliente.desactivado",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ClienteEvent::ClienteRegistrado(e) => e.occurred_at,
            ClienteEvent::ClienteActualizado(e) => e.occurred_at,
            ClienteEvent::ClienteDesactivado(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Cliente {
    type Command = ClienteCommand;
    type Event = ClienteEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ClienteEvent::ClienteRegistrado(e) => {
                self.id = e.cliente_id;
                self.emisor_id = Some(e.emisor_id);
                self.documento = e.documento.clone();
                self.razon_social = e.razon_social.clone();
                self.direccion = e.direccion.clone();
                self.estado = EstadoCliente::Activo;
                self.created = true;
            }
            ClienteEvent::ClienteActualizado(e) => {
                self.razon_social = e.razon_social.clone();
                self.direccion = e.direccion.clone();
            }
            ClienteEvent::ClienteDesactivado(_) => {
                self.estado = EstadoCliente::Inactivo;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ClienteCommand::RegistrarCliente(cmd) => self.handle_registrar(cmd),
            ClienteCommand::ActualizarCliente(cmd) => self.handle_actualizar(cmd),
            ClienteCommand::DesactivarCliente(cmd) => self.handle_desactivar(cmd),
        }
    }
}

impl Cliente {
    fn ensure_emisor(&self, emisor_id: EmisorId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.emisor_id != Some(emisor_id) {
            return Err(DomainError::invariant("emisor mismatch"));
        }
        Ok(())
    }

    fn ensure_cliente_id(&self, cliente_id: ClienteId) -> Result<(), DomainError> {
        if self.id != cliente_id {
            return Err(DomainError::invariant("cliente_id mismatch"));
        }
        Ok(())
    }

    fn handle_registrar(&self, cmd: &RegistrarCliente) -> Result<Vec<ClienteEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("cliente already exists"));
        }

        if cmd.razon_social.trim().is_empty() {
            return Err(DomainError::validation("razón social cannot be empty"));
        }

        Ok(vec![ClienteEvent::ClienteRegistrado(ClienteRegistrado {
            emisor_id: cmd.emisor_id,
            cliente_id: cmd.cliente_id,
            documento: cmd.documento.clone(),
            razon_social: cmd.razon_social.clone(),
            direccion: cmd.direccion.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_actualizar(&self, cmd: &ActualizarCliente) -> Result<Vec<ClienteEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_emisor(cmd.emisor_id)?;
        self.ensure_cliente_id(cmd.cliente_id)?;

        if self.estado == EstadoCliente::Inactivo {
            return Err(DomainError::invariant(
                "inactive cliente cannot be updated",
            ));
        }

        let razon_social = cmd
            .razon_social
            .clone()
            .unwrap_or_else(|| self.razon_social.clone());
        if razon_social.trim().is_empty() {
            return Err(DomainError::validation("razón social cannot be empty"));
        }

        let direccion = cmd.direccion.clone().or_else(|| self.direccion.clone());

        Ok(vec![ClienteEvent::ClienteActualizado(ClienteActualizado {
            emisor_id: cmd.emisor_id,
            cliente_id: cmd.cliente_id,
            razon_social,
            direccion,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_desactivar(
        &self,
        cmd: &DesactivarCliente,
    ) -> Result<Vec<ClienteEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_emisor(cmd.emisor_id)?;
        self.ensure_cliente_id(cmd.cliente_id)?;

        if self.estado == EstadoCliente::Inactivo {
            return Err(DomainError::conflict("cliente is already inactive"));
        }

        Ok(vec![ClienteEvent::ClienteDesactivado(ClienteDesactivado {
            emisor_id: cmd.emisor_id,
            cliente_id: cmd.cliente_id,
            motivo: cmd.motivo.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facturador_core::AggregateId;
    use proptest::prelude::*;

    fn test_emisor_id() -> EmisorId {
        EmisorId::new()
    }

    fn test_cliente_id() -> ClienteId {
        ClienteId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn registrar_cmd(emisor_id: EmisorId, cliente_id: ClienteId) -> RegistrarCliente {
        RegistrarCliente {
            emisor_id,
            cliente_id,
            documento: DocumentoIdentidad::nuevo(TipoDocumento::Ruc, "20601030013").unwrap(),
            razon_social: "Imprenta Gráfica Andina S.A.C.".to_string(),
            direccion: Some("Av. Los Pinos 123, Lima".to_string()),
            occurred_at: test_time(),
        }
    }

    #[test]
    fn documento_dni_exige_ocho_digitos() {
        assert!(DocumentoIdentidad::nuevo(TipoDocumento::Dni, "12345678").is_ok());
        assert!(DocumentoIdentidad::nuevo(TipoDocumento::Dni, "1234567").is_err());
        assert!(DocumentoIdentidad::nuevo(TipoDocumento::Dni, "123456789").is_err());
        assert!(DocumentoIdentidad::nuevo(TipoDocumento::Dni, "1234567a").is_err());
    }

    #[test]
    fn documento_ruc_exige_once_digitos() {
        assert!(DocumentoIdentidad::nuevo(TipoDocumento::Ruc, "20601030013").is_ok());
        assert!(DocumentoIdentidad::nuevo(TipoDocumento::Ruc, "2060103001").is_err());
        assert!(DocumentoIdentidad::nuevo(TipoDocumento::Ruc, "20601030013X").is_err());
    }

    #[test]
    fn documento_sin_numero_y_pasaporte() {
        assert!(DocumentoIdentidad::nuevo(TipoDocumento::SinDocumento, "").is_ok());
        assert!(DocumentoIdentidad::nuevo(TipoDocumento::SinDocumento, "123").is_err());
        assert!(DocumentoIdentidad::nuevo(TipoDocumento::Pasaporte, "PE1234567").is_ok());
        assert!(DocumentoIdentidad::nuevo(TipoDocumento::Pasaporte, "").is_err());
        assert!(
            DocumentoIdentidad::nuevo(TipoDocumento::Pasaporte, "ABCDEFGHIJKLM").is_err()
        );
    }

    #[test]
    fn registrar_cliente_emite_evento() {
        let cliente = Cliente::empty(test_cliente_id());
        let emisor_id = test_emisor_id();
        let cliente_id = test_cliente_id();
        let cmd = registrar_cmd(emisor_id, cliente_id);

        let events = cliente
            .handle(&ClienteCommand::RegistrarCliente(cmd.clone()))
            .unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            ClienteEvent::ClienteRegistrado(e) => {
                assert_eq!(e.emisor_id, emisor_id);
                assert_eq!(e.cliente_id, cliente_id);
                assert_eq!(e.documento.numero(), "20601030013");
                assert!(e.documento.es_ruc());
                assert_eq!(e.razon_social, "Imprenta Gráfica Andina S.A.C.");
            }
            _ => panic!("Expected ClienteRegistrado event"),
        }
    }

    #[test]
    fn registrar_rechaza_razon_social_vacia() {
        let cliente = Cliente::empty(test_cliente_id());
        let mut cmd = registrar_cmd(test_emisor_id(), test_cliente_id());
        cmd.razon_social = "   ".to_string();

        let err = cliente
            .handle(&ClienteCommand::RegistrarCliente(cmd))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn registrar_rechaza_duplicado() {
        let mut cliente = Cliente::empty(test_cliente_id());
        let cmd = registrar_cmd(test_emisor_id(), test_cliente_id());

        let events = cliente
            .handle(&ClienteCommand::RegistrarCliente(cmd.clone()))
            .unwrap();
        cliente.apply(&events[0]);

        let err = cliente
            .handle(&ClienteCommand::RegistrarCliente(cmd))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn actualizar_conserva_campos_no_enviados() {
        let mut cliente = Cliente::empty(test_cliente_id());
        let emisor_id = test_emisor_id();
        let cliente_id = test_cliente_id();
        let events = cliente
            .handle(&ClienteCommand::RegistrarCliente(registrar_cmd(
                emisor_id, cliente_id,
            )))
            .unwrap();
        cliente.apply(&events[0]);

        let cmd = ActualizarCliente {
            emisor_id,
            cliente_id,
            razon_social: Some("Imprenta Andina S.A.C.".to_string()),
            direccion: None,
            occurred_at: test_time(),
        };
        let events = cliente
            .handle(&ClienteCommand::ActualizarCliente(cmd))
            .unwrap();

        match &events[0] {
            ClienteEvent::ClienteActualizado(e) => {
                assert_eq!(e.razon_social, "Imprenta Andina S.A.C.");
                // Dirección was not sent; the existing one survives.
                assert_eq!(e.direccion.as_deref(), Some("Av. Los Pinos 123, Lima"));
            }
            _ => panic!("Expected ClienteActualizado event"),
        }
    }

    #[test]
    fn cliente_inactivo_no_se_actualiza_ni_compra() {
        let mut cliente = Cliente::empty(test_cliente_id());
        let emisor_id = test_emisor_id();
        let cliente_id = test_cliente_id();
        let events = cliente
            .handle(&ClienteCommand::RegistrarCliente(registrar_cmd(
                emisor_id, cliente_id,
            )))
            .unwrap();
        cliente.apply(&events[0]);
        assert!(cliente.puede_comprar());

        let events = cliente
            .handle(&ClienteCommand::DesactivarCliente(DesactivarCliente {
                emisor_id,
                cliente_id,
                motivo: Some("Datos duplicados".to_string()),
                occurred_at: test_time(),
            }))
            .unwrap();
        cliente.apply(&events[0]);
        assert_eq!(cliente.estado(), EstadoCliente::Inactivo);
        assert!(!cliente.puede_comprar());

        let err = cliente
            .handle(&ClienteCommand::ActualizarCliente(ActualizarCliente {
                emisor_id,
                cliente_id,
                razon_social: Some("Otro nombre".to_string()),
                direccion: None,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        let err = cliente
            .handle(&ClienteCommand::DesactivarCliente(DesactivarCliente {
                emisor_id,
                cliente_id,
                motivo: None,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn version_incrementa_por_evento_aplicado() {
        let mut cliente = Cliente::empty(test_cliente_id());
        assert_eq!(cliente.version(), 0);

        let emisor_id = test_emisor_id();
        let cliente_id = test_cliente_id();
        let events = cliente
            .handle(&ClienteCommand::RegistrarCliente(registrar_cmd(
                emisor_id, cliente_id,
            )))
            .unwrap();
        cliente.apply(&events[0]);
        assert_eq!(cliente.version(), 1);

        let events = cliente
            .handle(&ClienteCommand::DesactivarCliente(DesactivarCliente {
                emisor_id,
                cliente_id,
                motivo: None,
                occurred_at: test_time(),
            }))
            .unwrap();
        cliente.apply(&events[0]);
        assert_eq!(cliente.version(), 2);
    }

    proptest! {
        /// Any 8-digit string is a valid DNI; any other length is not.
        #[test]
        fn dni_valido_por_longitud(numero in "[0-9]{1,12}") {
            let result = DocumentoIdentidad::nuevo(TipoDocumento::Dni, &numero);
            prop_assert_eq!(result.is_ok(), numero.len() == 8);
        }

        /// Any 11-digit string is a valid RUC; any other length is not.
        #[test]
        fn ruc_valido_por_longitud(numero in "[0-9]{1,12}") {
            let result = DocumentoIdentidad::nuevo(TipoDocumento::Ruc, &numero);
            prop_assert_eq!(result.is_ok(), numero.len() == 11);
        }
    }
}
