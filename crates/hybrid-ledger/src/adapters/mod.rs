//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the driven ports:
//!
//! - `InMemoryEventLog` / `BroadcastEventBus` implement `EventSink`
//! - `Eip712PermitVerifier` implements `PermitVerifier`
//! - `SystemTimeSource` / `ControllableTimeSource` implement `TimeSource`

pub mod event_bus;
pub mod event_log;
pub mod permit;
pub mod time;

pub use event_bus::*;
pub use event_log::*;
pub use permit::*;
pub use time::*;
