//! Main consensus engine implementation

pub mod consensus_engine;
pub mod bft_engine;
pub mod enhanced_bft_engine;
pub mod hybrid_engine;
pub mod zk_integration;

pub use consensus_engine::*;
pub use bft_engine::*;
pub use enhanced_bft_engine::*;
pub use hybrid_engine::*;
pub use zk_integration::*;
