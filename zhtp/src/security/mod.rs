//! Security and Protocol Filtering
//! 
//! Provides security features including protocol-level filtering for bootstrap nodes

pub mod protocol_filter;

pub use protocol_filter::{Protocol, ProtocolFilter};
