//! Messenger abstractions: inbound message model, outbound port, decorators.

pub mod port;
pub mod timeout;
pub mod types;
