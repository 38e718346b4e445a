//! API Handlers Module
//!
//! Clean, minimal handler modules for ZHTP API

pub mod identity;
pub mod guardian;
pub mod zkp;
pub mod blockchain;
pub mod storage;
pub mod protocol;
pub mod network;
pub mod wallet;
pub mod dao;
pub mod dht;
pub mod web4;
pub mod dns;
pub mod wallet_content;
pub mod marketplace;
pub mod mesh;
pub mod validator;
pub mod crypto;

pub use identity::IdentityHandler;
pub use guardian::GuardianHandler;
pub use zkp::ZkpHandler;
pub use blockchain::BlockchainHandler;
pub use storage::StorageHandler;
pub use protocol::ProtocolHandler;
pub use network::NetworkHandler;
pub use wallet::WalletHandler;
pub use dao::DaoHandler;
pub use dht::DhtHandler;
pub use web4::Web4Handler;
pub use dns::DnsHandler;
pub use wallet_content::WalletContentHandler;
pub use marketplace::MarketplaceHandler;
pub use mesh::MeshHandler;
pub use validator::ValidatorHandler;
pub use crypto::CryptoHandler;
