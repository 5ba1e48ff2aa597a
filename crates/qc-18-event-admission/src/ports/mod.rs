//! Ports layer - trait definitions for inbound/outbound interfaces

pub mod inbound;
pub mod outbound;
