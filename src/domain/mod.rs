//! Domain layer: page context, lifecycle state, and close details.
//!
//! These types carry no I/O. The transport and session layers build on
//! them.

pub mod close_info;
pub mod connection_state;
pub mod host_page;

pub use close_info::CloseInfo;
pub use connection_state::{ConnectionState, InvalidTransition, LifecycleEvent};
pub use host_page::{HostPage, REALTIME_SERVER_ATTR, StepElement};
