// Service modules - business logic extracted from components
// NOTE: routing_rewards, storage_rewards, reward_orchestrator, and blockchain_factory
// are in the parent runtime/ directory, not in services/ subdirectory
pub mod transaction_builder;
pub mod mining_service;
pub mod genesis_funding;
pub mod bootstrap_service;

// Re-export service types
pub use transaction_builder::TransactionBuilder;
pub use mining_service::MiningService;
pub use genesis_funding::{GenesisFundingService, GenesisValidator};
pub use bootstrap_service::BootstrapService;
