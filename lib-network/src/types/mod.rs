// Re-exports for all type modules
pub use crate::types::relay_type::*;
pub use crate::types::wifi_security::*;
pub use crate::types::mesh_capability::*;
pub use crate::types::mesh_message::*;
pub use crate::types::api_response::*;
pub use crate::types::geographic::*;
pub use crate::types::connection_details::*;
pub use crate::types::network_statistics::*;

pub mod relay_type;
pub mod wifi_security;
pub mod mesh_capability;
pub mod mesh_message;
pub mod api_response;
pub mod geographic;
pub mod connection_details;
pub mod network_statistics;
