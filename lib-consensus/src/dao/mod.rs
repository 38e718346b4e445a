//! DAO governance system for ZHTP

pub mod dao_types;
pub mod dao_engine;
pub mod proposals;
pub mod voting;
pub mod treasury;

// Re-export all DAO types
pub use dao_engine::DaoEngine;
pub use proposals::*;
