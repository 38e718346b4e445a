//! ZHTP Orchestrator CLI Commands

pub mod node;
pub mod wallet;
pub mod dao;
pub mod identity;
pub mod network;
pub mod blockchain;
pub mod monitor;
pub mod component;
pub mod interactive;
pub mod server;
pub mod isolation;
pub mod rewards;
pub mod deploy;
pub mod trust;

pub use node::handle_node_command;
pub use wallet::handle_wallet_command;
pub use dao::handle_dao_command;
pub use identity::handle_identity_command;
pub use network::handle_network_command;
pub use blockchain::handle_blockchain_command;
pub use monitor::handle_monitor_command;
pub use component::handle_component_command;
pub use isolation::handle_isolation_command;
pub use interactive::handle_interactive_command;
pub use server::handle_server_command;
pub use rewards::handle_reward_command;
pub use deploy::handle_deploy_command;
pub use trust::handle_trust_command;
