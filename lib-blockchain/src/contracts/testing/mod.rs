use crate::contracts::{
    executor::{ContractExecutor, ExecutionContext, MemoryStorage},
    integration::{BlockchainIntegration, ContractTransactionBuilder, ContractEvent},
    utils::*,
};
use crate::types::*;
use crate::contracts::tokens::*;
use crate::contracts::messaging::*;
use crate::contracts::contacts::*;
use crate::contracts::groups::*;
use crate::contracts::files::*;
use anyhow::Result;
use crate::integration::crypto_integration::{KeyPair, PublicKey};
use std::collections::HashMap;

/// Comprehensive test framework for smart contracts
pub struct ContractTestFramework {
    executor: ContractExecutor<MemoryStorage>,
    keypairs: HashMap<String, KeyPair>,
    current_block: u64,
    current_timestamp: u64,
}

impl ContractTestFramework {
    /// Create new test framework
    pub fn new() -> Self {
        let storage = MemoryStorage::default();
        let executor = ContractExecutor::new(storage);
        
        Self {
            executor,
            keypairs: HashMap::new(),
            current_block: 1,
            current_timestamp: 1640995200, // 2022-01-01 00:00:00 UTC
        }
    }

    /// Add a test user
    pub fn add_user(&mut self, name: &str) -> Result<PublicKey> {
        let keypair = KeyPair::generate()?;
        let public_key = keypair.public_key.clone();
        self.keypairs.insert(name.to_string(), keypair);
        Ok(public_key)
    }

    /// Get user's public key
    pub fn get_user(&self, name: &str) -> Option<&PublicKey> {
        self.keypairs.get(name).map(|kp| &kp.public_key)
    }

    /// Get user's keypair
    pub fn get_keypair(&self, name: &str) -> Option<&KeyPair> {
        self.keypairs.get(name)
    }

    /// Execute contract call as user
    pub fn execute_as_user(
        &mut self,
        user: &str,
        call: ContractCall,
        gas_limit: u64,
    ) -> Result<ContractResult> {
        let keypair = self.keypairs.get(user)
            .ok_or_else(|| anyhow::anyhow!("User not found: {}", user))?;

        let mut context = ExecutionContext::new(
            keypair.public_key.clone(),
            self.current_block,
            self.current_timestamp,
            gas_limit,
            [0u8; 32], // Mock transaction hash
        );

        self.executor.execute_call(call, &mut context)
    }

    /// Advance time and block
    pub fn advance_time(&mut self, seconds: u64, blocks: u64) {
        self.current_timestamp += seconds;
        self.current_block += blocks;
    }

    /// Get ZHTP token balance for user
    pub fn get_lib_balance(&self, user: &str) -> u64 {
        if let Some(keypair) = self.keypairs.get(user) {
            let lib_id = generate_lib_token_id();
            if let Some(token) = self.executor.get_token_contract(&lib_id) {
                return token.balance_of(&keypair.public_key);
            }
        }
        0
    }

    /// Get custom token balance for user
    pub fn get_token_balance(&self, user: &str, token_id: &[u8; 32]) -> u64 {
        if let Some(keypair) = self.keypairs.get(user) {
            if let Some(token) = self.executor.get_token_contract(token_id) {
                return token.balance_of(&keypair.public_key);
            }
        }
        0
    }

    /// Create test token
    pub fn create_test_token(
        &mut self,
        creator: &str,
        name: &str,
        symbol: &str,
        supply: u64,
    ) -> Result<[u8; 32]> {
        let call = ContractCall {
            contract_type: ContractType::Token,
            method: "create_custom_token".to_string(),
            params: bincode::serialize(&(name.to_string(), symbol.to_string(), supply))?,
            permissions: CallPermissions::Public,
        };

        let result = self.execute_as_user(creator, call, 100000)?;
        if result.success {
            Ok(bincode::deserialize(&result.return_data)?)
        } else {
            Err(anyhow::anyhow!("Token creation failed"))
        }
    }

    /// Transfer tokens between users
    pub fn transfer_tokens(
        &mut self,
        from: &str,
        to: &str,
        token_id: &[u8; 32],
        amount: u64,
    ) -> Result<ContractResult> {
        let to_key = self.get_user(to)
            .ok_or_else(|| anyhow::anyhow!("Recipient not found"))?
            .clone();

        let call = ContractCall {
            contract_type: ContractType::Token,
            method: "transfer".to_string(),
            params: bincode::serialize(&(*token_id, to_key, amount))?,
            permissions: CallPermissions::Public,
        };

        self.execute_as_user(from, call, 100000)
    }

    /// Send message between users
    pub fn send_message(
        &mut self,
        sender: &str,
        recipient: Option<&str>,
        content: &str,
        group_id: Option<[u8; 32]>,
    ) -> Result<[u8; 32]> {
        let recipient_key = recipient.map(|r| 
            self.get_user(r)
                .ok_or_else(|| anyhow::anyhow!("Recipient not found"))
                .map(|k| k.clone())
        ).transpose()?;

        let call = ContractCall {
            contract_type: ContractType::WhisperMessaging,
            method: "send_message".to_string(),
            params: bincode::serialize(&(
                recipient_key,
                group_id,
                content.to_string(),
                None::<[u8; 32]>, // No file attachment
                false, // Not auto-burn
                None::<u64>, // No burn timestamp
            ))?,
            permissions: CallPermissions::Public,
        };

        let result = self.execute_as_user(sender, call, 100000)?;
        if result.success {
            Ok(bincode::deserialize(&result.return_data)?)
        } else {
            Err(anyhow::anyhow!("Message sending failed"))
        }
    }

    /// Add contact
    pub fn add_contact(
        &mut self,
        owner: &str,
        contact: &str,
        display_name: &str,
    ) -> Result<[u8; 32]> {
        let contact_key = self.get_user(contact)
            .ok_or_else(|| anyhow::anyhow!("Contact not found"))?
            .clone();

        let call = ContractCall {
            contract_type: ContractType::ContactRegistry,
            method: "add_contact".to_string(),
            params: bincode::serialize(&(contact_key, display_name.to_string()))?,
            permissions: CallPermissions::Public,
        };

        let result = self.execute_as_user(owner, call, 100000)?;
        if result.success {
            Ok(bincode::deserialize(&result.return_data)?)
        } else {
            Err(anyhow::anyhow!("Contact addition failed"))
        }
    }

    /// Create group
    pub fn create_group(
        &mut self,
        creator: &str,
        name: &str,
        description: &str,
        max_members: u32,
        is_private: bool,
    ) -> Result<[u8; 32]> {
        let call = ContractCall {
            contract_type: ContractType::GroupChat,
            method: "create_group".to_string(),
            params: bincode::serialize(&(
                name.to_string(),
                description.to_string(),
                max_members,
                is_private,
                0u64, // No whisper token cost
            ))?,
            permissions: CallPermissions::Public,
        };

        let result = self.execute_as_user(creator, call, 100000)?;
        if result.success {
            Ok(bincode::deserialize(&result.return_data)?)
        } else {
            Err(anyhow::anyhow!("Group creation failed"))
        }
    }

    /// Share file
    pub fn share_file(
        &mut self,
        owner: &str,
        filename: &str,
        content_hash: [u8; 32],
        file_size: u64,
        is_public: bool,
    ) -> Result<[u8; 32]> {
        let call = ContractCall {
            contract_type: ContractType::FileSharing,
            method: "share_file".to_string(),
            params: bincode::serialize(&(
                filename.to_string(),
                "Test file".to_string(), // description
                content_hash,
                file_size,
                "application/octet-stream".to_string(), // mime_type
                is_public,
                0u64, // download_cost
                false, // is_encrypted
                None::<[u8; 32]>, // encryption_key_hash
                vec!["test".to_string()], // tags
                0u64, // max_downloads (unlimited)
            ))?,
            permissions: CallPermissions::Public,
        };

        let result = self.execute_as_user(owner, call, 100000)?;
        if result.success {
            Ok(bincode::deserialize(&result.return_data)?)
        } else {
            Err(anyhow::anyhow!("File sharing failed"))
        }
    }

    /// Get contract logs
    pub fn get_logs(&self) -> &[ContractLog] {
        self.executor.get_logs()
    }

    /// Clear logs
    pub fn clear_logs(&mut self) {
        self.executor.clear_logs();
    }

    /// Print test summary
    pub fn print_summary(&self) {
        println!("=== Test Framework Summary ===");
        println!("Users: {}", self.keypairs.len());
        println!("Current Block: {}", self.current_block);
        println!("Current Timestamp: {}", self.current_timestamp);
        println!("Logs: {}", self.executor.get_logs().len());
        
        // Print user balances
        for (name, _keypair) in &self.keypairs {
            let lib_balance = self.get_lib_balance(name);
            println!("User {}: ZHTP Balance = {}", name, lib_balance);
        }
    }
}

impl Default for ContractTestFramework {
    fn default() -> Self {
        Self::new()
    }
}

/// Integration test scenarios
pub struct IntegrationTestScenarios;

impl IntegrationTestScenarios {
    /// Test complete token lifecycle
    pub fn test_token_lifecycle() -> Result<()> {
        let mut framework = ContractTestFramework::new();
        
        // Add test users
        framework.add_user("alice")?;
        framework.add_user("bob")?;
        framework.add_user("charlie")?;

        // Create custom token
        let token_id = framework.create_test_token("alice", "TestCoin", "TEST", 1000000)?;
        
        // Check initial balance
        assert_eq!(framework.get_token_balance("alice", &token_id), 1000000);
        assert_eq!(framework.get_token_balance("bob", &token_id), 0);

        // Transfer tokens
        let result = framework.transfer_tokens("alice", "bob", &token_id, 10000)?;
        assert!(result.success);

        // Check balances after transfer
        assert_eq!(framework.get_token_balance("alice", &token_id), 990000);
        assert_eq!(framework.get_token_balance("bob", &token_id), 10000);

        // Transfer from bob to charlie
        let result = framework.transfer_tokens("bob", "charlie", &token_id, 5000)?;
        assert!(result.success);

        // Final balance check
        assert_eq!(framework.get_token_balance("alice", &token_id), 990000);
        assert_eq!(framework.get_token_balance("bob", &token_id), 5000);
        assert_eq!(framework.get_token_balance("charlie", &token_id), 5000);

        println!("Token lifecycle test passed");
        Ok(())
    }

    /// Test messaging system
    pub fn test_messaging_system() -> Result<()> {
        let mut framework = ContractTestFramework::new();
        
        // Add test users
        framework.add_user("alice")?;
        framework.add_user("bob")?;

        // Send direct message
        let message_id = framework.send_message(
            "alice",
            Some("bob"),
            "Hello Bob!",
            None,
        )?;

        // Verify message was created
        assert_ne!(message_id, [0u8; 32]);

        println!("Messaging system test passed");
        Ok(())
    }

    /// Test contact management
    pub fn test_contact_management() -> Result<()> {
        let mut framework = ContractTestFramework::new();
        
        // Add test users
        framework.add_user("alice")?;
        framework.add_user("bob")?;

        // Add contact
        let contact_id = framework.add_contact("alice", "bob", "Bob Smith")?;

        // Verify contact was created
        assert_ne!(contact_id, [0u8; 32]);

        println!("Contact management test passed");
        Ok(())
    }

    /// Test group functionality
    pub fn test_group_functionality() -> Result<()> {
        let mut framework = ContractTestFramework::new();
        
        // Add test users
        framework.add_user("alice")?;
        framework.add_user("bob")?;
        framework.add_user("charlie")?;

        // Create group
        let group_id = framework.create_group(
            "alice",
            "Test Group",
            "A test group for demonstration",
            10,
            false,
        )?;

        // Verify group was created
        assert_ne!(group_id, [0u8; 32]);

        // Send group message
        let message_id = framework.send_message(
            "alice",
            None,
            "Hello group!",
            Some(group_id),
        )?;

        assert_ne!(message_id, [0u8; 32]);

        println!("Group functionality test passed");
        Ok(())
    }

    /// Test file sharing
    pub fn test_file_sharing() -> Result<()> {
        let mut framework = ContractTestFramework::new();
        
        // Add test users
        framework.add_user("alice")?;
        framework.add_user("bob")?;

        // Share file
        let content_hash = [1u8; 32];
        let file_id = framework.share_file(
            "alice",
            "test.txt",
            content_hash,
            1024,
            true,
        )?;

        // Verify file was shared
        assert_ne!(file_id, [0u8; 32]);

        println!("File sharing test passed");
        Ok(())
    }

    /// Run all integration tests
    pub fn run_all_tests() -> Result<()> {
        println!(" Starting integration tests...\n");

        Self::test_token_lifecycle()?;
        Self::test_messaging_system()?;
        Self::test_contact_management()?;
        Self::test_group_functionality()?;
        Self::test_file_sharing()?;

        println!("\n All integration tests passed!");
        Ok(())
    }
}

/// Performance benchmarks
pub struct PerformanceBenchmarks;

impl PerformanceBenchmarks {
    /// Benchmark token transfers
    pub fn benchmark_token_transfers(num_transfers: usize) -> Result<()> {
        let mut framework = ContractTestFramework::new();
        
        // Add test users
        framework.add_user("alice")?;
        framework.add_user("bob")?;

        // Create token
        let token_id = framework.create_test_token("alice", "BenchCoin", "BENCH", 1000000)?;

        let start_time = std::time::Instant::now();

        // Perform transfers
        for i in 0..num_transfers {
            let amount = 100 + (i as u64);
            framework.transfer_tokens("alice", "bob", &token_id, amount)?;
            framework.transfer_tokens("bob", "alice", &token_id, amount)?;
        }

        let duration = start_time.elapsed();
        let tps = (num_transfers * 2) as f64 / duration.as_secs_f64();

        println!("Token Transfer Benchmark:");
        println!("  Transfers: {}", num_transfers * 2);
        println!("  Duration: {:?}", duration);
        println!("  TPS: {:.2}", tps);

        Ok(())
    }

    /// Benchmark message sending
    pub fn benchmark_message_sending(num_messages: usize) -> Result<()> {
        let mut framework = ContractTestFramework::new();
        
        // Add test users
        framework.add_user("alice")?;
        framework.add_user("bob")?;

        let start_time = std::time::Instant::now();

        // Send messages
        for i in 0..num_messages {
            let content = format!("Message number {}", i);
            framework.send_message("alice", Some("bob"), &content, None)?;
        }

        let duration = start_time.elapsed();
        let mps = num_messages as f64 / duration.as_secs_f64();

        println!("Message Sending Benchmark:");
        println!("  Messages: {}", num_messages);
        println!("  Duration: {:?}", duration);
        println!("  MPS: {:.2}", mps);

        Ok(())
    }

    /// Run all benchmarks
    pub fn run_all_benchmarks() -> Result<()> {
        println!("üèÅ Starting performance benchmarks...\n");

        Self::benchmark_token_transfers(1000)?;
        Self::benchmark_message_sending(1000)?;

        println!("\n All benchmarks completed!");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_creation() {
        let framework = ContractTestFramework::new();
        assert_eq!(framework.current_block, 1);
        assert!(framework.keypairs.is_empty());
    }

    #[test]
    fn test_user_management() {
        let mut framework = ContractTestFramework::new();
        
        let alice_key = framework.add_user("alice").unwrap();
        let bob_key = framework.add_user("bob").unwrap();

        assert_ne!(alice_key, bob_key);
        assert!(framework.get_user("alice").is_some());
        assert!(framework.get_user("bob").is_some());
        assert!(framework.get_user("charlie").is_none());
    }

    #[test]
    fn test_time_advancement() {
        let mut framework = ContractTestFramework::new();
        let initial_time = framework.current_timestamp;
        let initial_block = framework.current_block;

        framework.advance_time(3600, 5);

        assert_eq!(framework.current_timestamp, initial_time + 3600);
        assert_eq!(framework.current_block, initial_block + 5);
    }

    #[test]
    fn test_integration_scenarios() {
        assert!(IntegrationTestScenarios::test_token_lifecycle().is_ok());
        assert!(IntegrationTestScenarios::test_messaging_system().is_ok());
        assert!(IntegrationTestScenarios::test_contact_management().is_ok());
        assert!(IntegrationTestScenarios::test_group_functionality().is_ok());
        assert!(IntegrationTestScenarios::test_file_sharing().is_ok());
    }
}
