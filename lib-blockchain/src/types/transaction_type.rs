//! Transaction type definitions
//!
//! Defines the types of transactions supported by the ZHTP blockchain.
//! Note: Identity transaction processing is handled by integration with lib-identity package.

use serde::{Serialize, Deserialize};

/// Transaction types supported by ZHTP blockchain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Standard value transfer between accounts
    Transfer,
    /// Identity registration on blockchain (delegates to lib-identity)
    IdentityRegistration,
    /// Identity update/modification (delegates to lib-identity)  
    IdentityUpdate,
    /// Identity revocation (delegates to lib-identity)
    IdentityRevocation,
    /// Smart contract deployment (delegates to lib-contracts)
    ContractDeployment,
    /// Smart contract execution (delegates to lib-contracts)
    ContractExecution,
    /// Session creation for audit/tracking purposes
    SessionCreation,
    /// Session termination for audit/tracking purposes
    SessionTermination,
    /// Content upload transaction
    ContentUpload,
    /// Universal Basic Income distribution
    UbiDistribution,
    /// Wallet registration/creation on blockchain
    WalletRegistration,
    /// Validator registration for consensus participation
    ValidatorRegistration,
    /// Validator information update
    ValidatorUpdate,
    /// Validator unregistration/exit from consensus
    ValidatorUnregister,
    /// DAO governance proposal submission
    DaoProposal,
    /// DAO governance vote on a proposal
    DaoVote,
    /// DAO proposal execution (treasury spending)
    DaoExecution,
}

impl TransactionType {
    /// Check if this transaction type relates to identity management
    pub fn is_identity_transaction(&self) -> bool {
        matches!(self, 
            TransactionType::IdentityRegistration |
            TransactionType::IdentityUpdate |
            TransactionType::IdentityRevocation
        )
    }

    /// Check if this transaction type relates to smart contracts
    pub fn is_contract_transaction(&self) -> bool {
        matches!(self,
            TransactionType::ContractDeployment |
            TransactionType::ContractExecution
        )
    }

    /// Check if this is a standard transfer transaction
    pub fn is_transfer(&self) -> bool {
        matches!(self, TransactionType::Transfer)
    }

    /// Check if this transaction type relates to validator management
    pub fn is_validator_transaction(&self) -> bool {
        matches!(self,
            TransactionType::ValidatorRegistration |
            TransactionType::ValidatorUpdate |
            TransactionType::ValidatorUnregister
        )
    }

    /// Check if this transaction type relates to DAO governance
    pub fn is_dao_transaction(&self) -> bool {
        matches!(self,
            TransactionType::DaoProposal |
            TransactionType::DaoVote |
            TransactionType::DaoExecution
        )
    }

    /// Get a human-readable description of the transaction type
    pub fn description(&self) -> &'static str {
        match self {
            TransactionType::Transfer => "Standard value transfer",
            TransactionType::IdentityRegistration => "Identity registration",
            TransactionType::IdentityUpdate => "Identity update",
            TransactionType::IdentityRevocation => "Identity revocation",
            TransactionType::ContractDeployment => "Smart contract deployment",
            TransactionType::ContractExecution => "Smart contract execution",
            TransactionType::SessionCreation => "Session creation for audit/tracking",
            TransactionType::SessionTermination => "Session termination for audit/tracking",
            TransactionType::ContentUpload => "Content upload transaction",
            TransactionType::UbiDistribution => "Universal Basic Income distribution",
            TransactionType::WalletRegistration => "Wallet registration/creation",
            TransactionType::ValidatorRegistration => "Validator registration for consensus",
            TransactionType::ValidatorUpdate => "Validator information update",
            TransactionType::ValidatorUnregister => "Validator unregistration/exit",
            TransactionType::DaoProposal => "DAO governance proposal submission",
            TransactionType::DaoVote => "DAO governance vote on proposal",
            TransactionType::DaoExecution => "DAO proposal execution (treasury spending)",
        }
    }

    /// Get the transaction type as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Transfer => "transfer",
            TransactionType::IdentityRegistration => "identity_registration",
            TransactionType::IdentityUpdate => "identity_update",
            TransactionType::IdentityRevocation => "identity_revocation",
            TransactionType::ContractDeployment => "contract_deployment",
            TransactionType::ContractExecution => "contract_execution",
            TransactionType::SessionCreation => "session_creation",
            TransactionType::SessionTermination => "session_termination",
            TransactionType::ContentUpload => "content_upload",
            TransactionType::UbiDistribution => "ubi_distribution",
            TransactionType::WalletRegistration => "wallet_registration",
            TransactionType::ValidatorRegistration => "validator_registration",
            TransactionType::ValidatorUpdate => "validator_update",
            TransactionType::ValidatorUnregister => "validator_unregister",
            TransactionType::DaoProposal => "dao_proposal",
            TransactionType::DaoVote => "dao_vote",
            TransactionType::DaoExecution => "dao_execution",
        }
    }

    /// Parse transaction type from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "transfer" => Some(TransactionType::Transfer),
            "identity_registration" => Some(TransactionType::IdentityRegistration),
            "identity_update" => Some(TransactionType::IdentityUpdate),
            "identity_revocation" => Some(TransactionType::IdentityRevocation),
            "contract_deployment" => Some(TransactionType::ContractDeployment),
            "contract_execution" => Some(TransactionType::ContractExecution),
            "session_creation" => Some(TransactionType::SessionCreation),
            "session_termination" => Some(TransactionType::SessionTermination),
            "content_upload" => Some(TransactionType::ContentUpload),
            "ubi_distribution" => Some(TransactionType::UbiDistribution),
            "wallet_registration" => Some(TransactionType::WalletRegistration),
            "validator_registration" => Some(TransactionType::ValidatorRegistration),
            "validator_update" => Some(TransactionType::ValidatorUpdate),
            "validator_unregister" => Some(TransactionType::ValidatorUnregister),
            "dao_proposal" => Some(TransactionType::DaoProposal),
            "dao_vote" => Some(TransactionType::DaoVote),
            "dao_execution" => Some(TransactionType::DaoExecution),
            _ => None,
        }
    }
}
