use crate::{Event, EventEnvelope};

/// A projection builds a read model from an append-only event stream.
///
/// Events are the source of truth; read models are **disposable** views that
/// can be rebuilt from scratch at any time by replaying history. Projections
/// here are pure event consumers — persistence of the resulting read model is
/// outside this crate.
///
/// Implementations must be **idempotent at the stream level**: applying the
/// same ordered history twice produces the same read model. The
/// `ProjectionRunner` enforces monotonic sequencing so duplicates are
/// rejected before they reach `apply`.
pub trait Projection {
    type Ev: Event;

    /// Apply a single event to the projection, updating the read model.
    ///
    /// Events not relevant to this projection should simply be ignored.
    /// The envelope carries `emisor_id`, which scopes read-model updates to
    /// the issuing business.
    fn apply(&mut self, envelope: &EventEnvelope<Self::Ev>);
}
