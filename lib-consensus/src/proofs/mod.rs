//! Proof systems for ZHTP consensus

pub mod work_proof;
pub mod stake_proof;
pub mod storage_proof;

pub use work_proof::*;
pub use stake_proof::*;
pub use storage_proof::*;
