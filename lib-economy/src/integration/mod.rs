//! Integration interfaces with other ZHTP components

pub mod blockchain_integration;
pub mod network_integration;

pub use blockchain_integration::*;
pub use network_integration::*;
