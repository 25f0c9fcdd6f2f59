//! Domain events module.
//!
//! Domain event types and the sink trait services emit through after
//! successful mutations. The hosting application implements the sink.

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
