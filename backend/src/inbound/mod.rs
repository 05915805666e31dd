//! Inbound adapters translating external requests into account port calls.
//!
//! HTTP is the only transport; handlers live under [`http`].

pub mod http;
