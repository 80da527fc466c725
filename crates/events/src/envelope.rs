use serde::{Deserialize, Serialize};
use uuid::Uuid;

use facturador_core::{AggregateId, EmisorId};

/// Envelope for an event, containing emisor + stream metadata.
///
/// This is the unit you append to an event stream.
///
/// Notes:
/// - **Emisor scoping** is enforced here via `emisor_id`.
/// - **Append-only**: `sequence_number` is monotonically increasing per stream.
/// - `payload` is the domain-agnostic event payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    emisor_id: EmisorId,

    aggregate_id: AggregateId,
    aggregate_type: String,

    /// Monotonically increasing position in the aggregate stream.
    sequence_number: u64,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        emisor_id: EmisorId,
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            emisor_id,
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn emisor_id(&self) -> EmisorId {
        self.emisor_id
    }

    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
