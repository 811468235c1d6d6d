//! Session layer: connection lifecycle, message routing, and the
//! controller that runs them together.

pub mod controller;
pub mod manager;
pub mod router;

pub use controller::{Session, SessionEnd};
pub use manager::{ConnectionManager, InitOutcome};
pub use router::{MessageRouter, SendOutcome, send};
