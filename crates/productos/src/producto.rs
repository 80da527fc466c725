use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use facturador_core::{Aggregate, AggregateId, AggregateRoot, DomainError, EmisorId};
use facturador_events::Event;

/// SUNAT measurement unit for unit goods ("número de unidades").
pub const UNIDAD_DEFAULT: &str = "NIU";

/// Producto identifier (emisor-scoped via `emisor_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductoId(pub AggregateId);

impl ProductoId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductoId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Producto status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoProducto {
    Activo,
    Inactivo,
}

/// Aggregate root: Producto (catalog entry + stock level).
#[derive(Debug, Clone, PartialEq)]
pub struct Producto {
    id: ProductoId,
    emisor_id: Option<EmisorId>,
    nombre: String,
    unidad_id: String,
    /// Sale price, IGV-inclusive.
    precio_unitario: f64,
    stock: i64,
    estado: EstadoProducto,
    version: u64,
    created: bool,
}

impl Producto {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ProductoId) -> Self {
        Self {
            id,
            emisor_id: None,
            nombre: String::new(),
            unidad_id: UNIDAD_DEFAULT.to_string(),
            precio_unitario: 0.0,
            stock: 0,
            estado: EstadoProducto::Activo,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ProductoId {
        self.id
    }

    pub fn emisor_id(&self) -> Option<EmisorId> {
        self.emisor_id
    }

    pub fn nombre(&self) -> &str {
        &self.nombre
    }

    pub fn unidad_id(&self) -> &str {
        &self.unidad_id
    }

    pub fn precio_unitario(&self) -> f64 {
        self.precio_unitario
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    pub fn estado(&self) -> EstadoProducto {
        self.estado
    }

    /// Invariant helper: only active productos appear on new documents.
    pub fn puede_venderse(&self) -> bool {
        self.estado == EstadoProducto::Activo
    }
}

impl AggregateRoot for Producto {
    type Id = ProductoId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CrearProducto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrearProducto {
    pub emisor_id: EmisorId,
    pub producto_id: ProductoId,
    pub nombre: String,
    /// SUNAT measurement unit (defaults to [`UNIDAD_DEFAULT`] when empty).
    pub unidad_id: Option<String>,
    /// Sale price, IGV-inclusive. Must be positive and finite.
    pub precio_unitario: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ActualizarPrecio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualizarPrecio {
    pub emisor_id: EmisorId,
    pub producto_id: ProductoId,
    pub precio_unitario: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AjustarStock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AjustarStock {
    pub emisor_id: EmisorId,
    pub producto_id: ProductoId,
    /// Positive for receipts, negative for sales/mermas.
    pub delta: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DesactivarProducto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesactivarProducto {
    pub emisor_id: EmisorId,
    pub producto_id: ProductoId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProductoCommand {
    CrearProducto(CrearProducto),
    ActualizarPrecio(ActualizarPrecio),
    AjustarStock(AjustarStock),
    DesactivarProducto(DesactivarProducto),
}

/// Event: ProductoCreado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductoCreado {
    pub emisor_id: EmisorId,
    pub producto_id: ProductoId,
    pub nombre: String,
    pub unidad_id: String,
    pub precio_unitario: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PrecioActualizado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecioActualizado {
    pub emisor_id: EmisorId,
    pub producto_id: ProductoId,
    pub precio_unitario: f64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockAjustado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAjustado {
    pub emisor_id: EmisorId,
    pub producto_id: ProductoId,
    pub delta: i64,
    pub nuevo_stock: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductoDesactivado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductoDesactivado {
    pub emisor_id: EmisorId,
    pub producto_id: ProductoId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProductoEvent {
    ProductoCreado(ProductoCreado),
    PrecioActualizado(PrecioActualizado),
    StockAjustado(StockAjustado),
    ProductoDesactivado(ProductoDesactivado),
}

impl Event for ProductoEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductoEvent::ProductoCreado(_) => "productos.producto.creado",
            ProductoEvent::PrecioActualizado(_) => "productos.producto.precio_actualizado",
            ProductoEvent::StockAjustado(_) => "productos.producto.stock_ajustado",
            ProductoEvent::ProductoDesactivado(_) => "productos.producto.desactivado",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductoEvent::ProductoCreado(e) => e.occurred_at,
            ProductoEvent::PrecioActualizado(e) => e.occurred_at,
            ProductoEvent::StockAjustado(e) => e.occurred_at,
            ProductoEvent::ProductoDesactivado(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Producto {
    type Command = ProductoCommand;
    type Event = ProductoEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductoEvent::ProductoCreado(e) => {
                self.id = e.producto_id;
                self.emisor_id = Some(e.emisor_id);
                self.nombre = e.nombre.clone();
                self.unidad_id = e.unidad_id.clone();
                self.precio_unitario = e.precio_unitario;
                self.stock = 0;
                self.estado = EstadoProducto::Activo;
                self.created = true;
            }
            ProductoEvent::PrecioActualizado(e) => {
                self.precio_unitario = e.precio_unitario;
            }
            ProductoEvent::StockAjustado(e) => {
                self.stock = e.nuevo_stock;
            }
            ProductoEvent::ProductoDesactivado(_) => {
                self.estado = EstadoProducto::Inactivo;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductoCommand::CrearProducto(cmd) => self.handle_crear(cmd),
            ProductoCommand::ActualizarPrecio(cmd) => self.handle_actualizar_precio(cmd),
            ProductoCommand::AjustarStock(cmd) => self.handle_ajustar_stock(cmd),
            ProductoCommand::DesactivarProducto(cmd) => self.handle_desactivar(cmd),
        }
    }
}

impl Producto {
    fn ensure_emisor(&self, emisor_id: EmisorId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.emisor_id != Some(emisor_id) {
            return Err(DomainError::invariant("emisor mismatch"));
        }
        Ok(())
    }

    fn ensure_activo(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.estado == EstadoProducto::Inactivo {
            return Err(DomainError::invariant("inactive producto cannot change"));
        }
        Ok(())
    }

    fn validar_precio(precio: f64) -> Result<(), DomainError> {
        if !precio.is_finite() || precio <= 0.0 {
            return Err(DomainError::validation("precio must be a positive amount"));
        }
        Ok(())
    }

    fn handle_crear(&self, cmd: &CrearProducto) -> Result<Vec<ProductoEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("producto already exists"));
        }
        if cmd.nombre.trim().is_empty() {
            return Err(DomainError::validation("nombre cannot be empty"));
        }
        Self::validar_precio(cmd.precio_unitario)?;

        let unidad_id = cmd
            .unidad_id
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| UNIDAD_DEFAULT.to_string());

        Ok(vec![ProductoEvent::ProductoCreado(ProductoCreado {
            emisor_id: cmd.emisor_id,
            producto_id: cmd.producto_id,
            nombre: cmd.nombre.clone(),
            unidad_id,
            precio_unitario: cmd.precio_unitario,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_actualizar_precio(
        &self,
        cmd: &ActualizarPrecio,
    ) -> Result<Vec<ProductoEvent>, DomainError> {
        self.ensure_activo()?;
        self.ensure_emisor(cmd.emisor_id)?;
        Self::validar_precio(cmd.precio_unitario)?;

        Ok(vec![ProductoEvent::PrecioActualizado(PrecioActualizado {
            emisor_id: cmd.emisor_id,
            producto_id: cmd.producto_id,
            precio_unitario: cmd.precio_unitario,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_ajustar_stock(&self, cmd: &AjustarStock) -> Result<Vec<ProductoEvent>, DomainError> {
        self.ensure_activo()?;
        self.ensure_emisor(cmd.emisor_id)?;

        if cmd.delta == 0 {
            return Err(DomainError::validation("stock delta cannot be zero"));
        }

        let nuevo_stock = self
            .stock
            .checked_add(cmd.delta)
            .ok_or_else(|| DomainError::invariant("stock adjustment overflow"))?;
        if nuevo_stock < 0 {
            return Err(DomainError::invariant("stock cannot go negative"));
        }

        Ok(vec![ProductoEvent::StockAjustado(StockAjustado {
            emisor_id: cmd.emisor_id,
            producto_id: cmd.producto_id,
            delta: cmd.delta,
            nuevo_stock,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_desactivar(
        &self,
        cmd: &DesactivarProducto,
    ) -> Result<Vec<ProductoEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_emisor(cmd.emisor_id)?;
        if self.estado == EstadoProducto::Inactivo {
            return Err(DomainError::conflict("producto is already inactive"));
        }

        Ok(vec![ProductoEvent::ProductoDesactivado(
            ProductoDesactivado {
                emisor_id: cmd.emisor_id,
                producto_id: cmd.producto_id,
                occurred_at: cmd.occurred_at,
            },
        )])
    }
}
