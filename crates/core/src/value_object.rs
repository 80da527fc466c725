//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** — identity does
/// not matter, only the values do. A tax breakdown of S/ 118.00 equals any
/// other tax breakdown of S/ 118.00; a till session with the same amounts is
/// still a different till session (that one is an entity, not a value).
///
/// The bounds keep value objects cheap to copy, comparable and debuggable.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
