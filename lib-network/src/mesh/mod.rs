pub mod server;
pub mod connection;
pub mod statistics;
pub mod config;
pub mod shared_resources;

pub use server::ZhtpMeshServer;
pub use connection::MeshConnection;
pub use statistics::MeshProtocolStats;
pub use shared_resources::SharedResources;
