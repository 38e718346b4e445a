//! Recovery mechanisms for ZHTP Identity

pub mod recovery_keys;
pub mod recovery_phrases;
pub mod biometric_recovery;
pub mod social_recovery;

// Re-exports
pub use recovery_keys::*;
pub use recovery_phrases::*;
pub use biometric_recovery::*;
pub use social_recovery::*;
