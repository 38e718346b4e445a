//! Cross-package integration with ZHTP crypto, ZK, and economics packages


use crate::identity::ZhtpIdentity;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, Instant};

/// Integration layer for coordinating between ZHTP packages
#[derive(Debug, Clone)]
pub struct CrossPackageIntegration {
    /// Connection to crypto package
    crypto_connection: CryptoConnection,
    /// Connection to ZK package
    zk_connection: ZkConnection,
    /// Connection to economics package
    economics_connection: EconomicsConnection,
    /// Connection to network package
    network_connection: NetworkConnection,
    /// Cache for package responses
    integration_cache: HashMap<String, IntegrationResponse>,
}

/// Connection to lib-crypto package
#[derive(Debug, Clone)]
pub struct CryptoConnection {
    pub endpoint: String,
    pub authenticated: bool,
    pub last_ping: Option<Instant>,
    pub quantum_ready: bool,
}

/// Connection to lib-proofs package
#[derive(Debug, Clone)]
pub struct ZkConnection {
    pub endpoint: String,
    pub authenticated: bool,
    pub circuit_loaded: bool,
    pub proof_cache_size: usize,
}

/// Connection to lib-economy package
#[derive(Debug, Clone)]
pub struct EconomicsConnection {
    pub endpoint: String,
    pub authenticated: bool,
    pub ubi_system_active: bool,
    pub market_data_fresh: bool,
}

/// Connection to lib-network package
#[derive(Debug, Clone)]
pub struct NetworkConnection {
    pub endpoint: String,
    pub authenticated: bool,
    pub peer_count: usize,
    pub mesh_health: f32,
}

/// Response from package integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationResponse {
    pub package: String,
    pub operation: String,
    pub success: bool,
    pub data: serde_json::Value,
    pub timestamp: u64,
    pub signature: Option<Vec<u8>>,
}

/// Cross-package operation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossPackageRequest {
    pub target_package: String,
    pub operation: String,
    pub parameters: serde_json::Value,
    pub identity_context: Option<String>,
    pub requires_proof: bool,
    pub timeout_ms: u64,
}

impl CrossPackageIntegration {
    /// Create new integration manager
    pub fn new() -> Self {
        Self {
            crypto_connection: CryptoConnection {
                endpoint: "zhtp://crypto-service".to_string(),
                authenticated: false,
                last_ping: None,
                quantum_ready: false,
            },
            zk_connection: ZkConnection {
                endpoint: "zhtp://zk-service".to_string(),
                authenticated: false,
                circuit_loaded: false,
                proof_cache_size: 0,
            },
            economics_connection: EconomicsConnection {
                endpoint: "zhtp://economics-service".to_string(),
                authenticated: false,
                ubi_system_active: false,
                market_data_fresh: false,
            },
            network_connection: NetworkConnection {
                endpoint: "zhtp://network-service".to_string(),
                authenticated: false,
                peer_count: 0,
                mesh_health: 0.0,
            },
            integration_cache: HashMap::new(),
        }
    }

    /// Initialize all package connections
    pub async fn initialize_connections(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Initialize crypto connection
        self.initialize_crypto_connection().await?;
        
        // Initialize ZK connection
        self.initialize_zk_connection().await?;
        
        // Initialize economics connection
        self.initialize_economics_connection().await?;
        
        // Initialize network connection
        self.initialize_network_connection().await?;
        
        Ok(())
    }

    /// Initialize connection to crypto package
    async fn initialize_crypto_connection(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Authenticate with crypto service
        let auth_request = CrossPackageRequest {
            target_package: "lib-crypto".to_string(),
            operation: "authenticate".to_string(),
            parameters: serde_json::json!({
                "service": "lib-identity",
                "capabilities": ["post_quantum", "signing", "verification"]
            }),
            identity_context: None,
            requires_proof: false,
            timeout_ms: 5000,
        };

        match self.send_package_request(auth_request).await {
            Ok(response) => {
                if response.success {
                    self.crypto_connection.authenticated = true;
                    self.crypto_connection.last_ping = Some(Instant::now());
                    
                    // Check quantum readiness
                    if let Some(quantum_ready) = response.data.get("quantum_ready") {
                        self.crypto_connection.quantum_ready = quantum_ready.as_bool().unwrap_or(false);
                    }
                    
                    println!("✓ Crypto package connection established");
                } else {
                    return Err("Failed to authenticate with crypto package".into());
                }
            },
            Err(e) => return Err(format!("Crypto connection failed: {}", e).into()),
        }

        Ok(())
    }

    /// Initialize connection to ZK package
    async fn initialize_zk_connection(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Load ZK circuits for identity verification
        let circuit_request = CrossPackageRequest {
            target_package: "lib-proofs".to_string(),
            operation: "load_circuits".to_string(),
            parameters: serde_json::json!({
                "circuits": ["identity_proof", "citizenship_proof", "privacy_proof"],
                "cache_size": 1000
            }),
            identity_context: None,
            requires_proof: false,
            timeout_ms: 10000,
        };

        match self.send_package_request(circuit_request).await {
            Ok(response) => {
                if response.success {
                    self.zk_connection.authenticated = true;
                    self.zk_connection.circuit_loaded = true;
                    
                    if let Some(cache_size) = response.data.get("proof_cache_size") {
                        self.zk_connection.proof_cache_size = cache_size.as_u64().unwrap_or(0) as usize;
                    }
                    
                    println!("✓ ZK package connection established");
                } else {
                    return Err("Failed to load ZK circuits".into());
                }
            },
            Err(e) => return Err(format!("ZK connection failed: {}", e).into()),
        }

        Ok(())
    }

    /// Initialize connection to economics package
    async fn initialize_economics_connection(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Connect to UBI and economic systems
        let econ_request = CrossPackageRequest {
            target_package: "lib-economy".to_string(),
            operation: "connect_ubi_system".to_string(),
            parameters: serde_json::json!({
                "service": "lib-identity",
                "permissions": ["ubi_distribution", "citizen_verification", "economic_modeling"]
            }),
            identity_context: None,
            requires_proof: false,
            timeout_ms: 5000,
        };

        match self.send_package_request(econ_request).await {
            Ok(response) => {
                if response.success {
                    self.economics_connection.authenticated = true;
                    
                    if let Some(ubi_active) = response.data.get("ubi_system_active") {
                        self.economics_connection.ubi_system_active = ubi_active.as_bool().unwrap_or(false);
                    }
                    
                    if let Some(market_fresh) = response.data.get("market_data_fresh") {
                        self.economics_connection.market_data_fresh = market_fresh.as_bool().unwrap_or(false);
                    }
                    
                    println!("✓ Economics package connection established");
                } else {
                    return Err("Failed to connect to economics system".into());
                }
            },
            Err(e) => return Err(format!("Economics connection failed: {}", e).into()),
        }

        Ok(())
    }

    /// Initialize connection to network package
    async fn initialize_network_connection(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Connect to ZHTP mesh network
        let network_request = CrossPackageRequest {
            target_package: "lib-network".to_string(),
            operation: "register_service".to_string(),
            parameters: serde_json::json!({
                "service": "lib-identity",
                "capabilities": ["identity_verification", "did_resolution", "citizen_onboarding"],
                "priority": "high"
            }),
            identity_context: None,
            requires_proof: false,
            timeout_ms: 5000,
        };

        match self.send_package_request(network_request).await {
            Ok(response) => {
                if response.success {
                    self.network_connection.authenticated = true;
                    
                    if let Some(peer_count) = response.data.get("peer_count") {
                        self.network_connection.peer_count = peer_count.as_u64().unwrap_or(0) as usize;
                    }
                    
                    if let Some(mesh_health) = response.data.get("mesh_health") {
                        self.network_connection.mesh_health = mesh_health.as_f64().unwrap_or(0.0) as f32;
                    }
                    
                    println!("✓ Network package connection established");
                } else {
                    return Err("Failed to register with network service".into());
                }
            },
            Err(e) => return Err(format!("Network connection failed: {}", e).into()),
        }

        Ok(())
    }

    /// Send request to another package
    pub async fn send_package_request(&mut self, request: CrossPackageRequest) -> Result<IntegrationResponse, Box<dyn std::error::Error>> {
        // Check cache first
        let cache_key = format!("{}:{}:{}", request.target_package, request.operation, 
                               serde_json::to_string(&request.parameters)?);
        
        if let Some(cached_response) = self.integration_cache.get(&cache_key) {
            // Check if cache is still valid (5 minutes)
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)?
                .as_secs();
            
            if now - cached_response.timestamp < 300 {
                return Ok(cached_response.clone());
            }
        }

        // Simulate package communication
        let response = self.simulate_package_communication(request).await?;
        
        // Cache successful responses
        if response.success {
            self.integration_cache.insert(cache_key, response.clone());
        }
        
        Ok(response)
    }

    /// Generate identity proof using ZK package
    pub async fn generate_identity_proof(&mut self, identity: &ZhtpIdentity, challenge: &[u8]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        if !self.zk_connection.authenticated || !self.zk_connection.circuit_loaded {
            return Err("ZK package not ready".into());
        }

        let proof_request = CrossPackageRequest {
            target_package: "lib-proofs".to_string(),
            operation: "generate_identity_proof".to_string(),
            parameters: serde_json::json!({
                "identity_id": identity.id,
                "public_key": identity.public_key,
                "challenge": hex::encode(challenge),
                "circuit": "identity_proof"
            }),
            identity_context: Some(hex::encode(&identity.id.0)),
            requires_proof: true,
            timeout_ms: 15000,
        };

        let response = self.send_package_request(proof_request).await?;
        
        if response.success {
            if let Some(proof_data) = response.data.get("proof") {
                let proof_hex = proof_data.as_str()
                    .ok_or("Invalid proof format")?;
                return Ok(hex::decode(proof_hex)?);
            }
        }
        
        Err("Failed to generate identity proof".into())
    }

    /// Verify economic eligibility for UBI
    pub async fn verify_ubi_eligibility(&mut self, identity_id: &str) -> Result<bool, Box<dyn std::error::Error>> {
        if !self.economics_connection.authenticated {
            return Err("Economics package not connected".into());
        }

        let eligibility_request = CrossPackageRequest {
            target_package: "lib-economy".to_string(),
            operation: "check_ubi_eligibility".to_string(),
            parameters: serde_json::json!({
                "identity_id": identity_id,
                "verification_level": "citizen"
            }),
            identity_context: Some(identity_id.to_string()),
            requires_proof: false,
            timeout_ms: 3000,
        };

        let response = self.send_package_request(eligibility_request).await?;
        
        if response.success {
            if let Some(eligible) = response.data.get("eligible") {
                return Ok(eligible.as_bool().unwrap_or(false));
            }
        }
        
        Ok(false)
    }

    /// Distribute UBI payment
    pub async fn distribute_ubi_payment(&mut self, identity_id: &str, amount: u64) -> Result<String, Box<dyn std::error::Error>> {
        if !self.economics_connection.authenticated || !self.economics_connection.ubi_system_active {
            return Err("UBI system not available".into());
        }

        let payment_request = CrossPackageRequest {
            target_package: "lib-economy".to_string(),
            operation: "distribute_ubi".to_string(),
            parameters: serde_json::json!({
                "identity_id": identity_id,
                "amount": amount,
                "currency": "ZHTP",
                "reason": "monthly_ubi"
            }),
            identity_context: Some(identity_id.to_string()),
            requires_proof: true,
            timeout_ms: 10000,
        };

        let response = self.send_package_request(payment_request).await?;
        
        if response.success {
            if let Some(transaction_id) = response.data.get("transaction_id") {
                return Ok(transaction_id.as_str().unwrap_or("").to_string());
            }
        }
        
        Err("Failed to distribute UBI payment".into())
    }

    /// Health check for all connections
    pub async fn health_check(&mut self) -> HashMap<String, bool> {
        let mut health_status = HashMap::new();
        
        // Check crypto connection
        health_status.insert("crypto".to_string(), 
            self.crypto_connection.authenticated && self.crypto_connection.quantum_ready);
        
        // Check ZK connection
        health_status.insert("zk".to_string(), 
            self.zk_connection.authenticated && self.zk_connection.circuit_loaded);
        
        // Check economics connection
        health_status.insert("economics".to_string(), 
            self.economics_connection.authenticated && self.economics_connection.ubi_system_active);
        
        // Check network connection
        health_status.insert("network".to_string(), 
            self.network_connection.authenticated && self.network_connection.mesh_health > 0.5);
        
        health_status
    }

    /// Simulate package communication (in implementation, this would use actual IPC/RPC)
    async fn simulate_package_communication(&self, request: CrossPackageRequest) -> Result<IntegrationResponse, Box<dyn std::error::Error>> {
        // Simulate network delay
        tokio::time::sleep(Duration::from_millis(50)).await;
        
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)?
            .as_secs();

        // Simulate successful responses based on operation
        let (success, data) = match (request.target_package.as_str(), request.operation.as_str()) {
            ("lib-crypto", "authenticate") => (true, serde_json::json!({
                "authenticated": true,
                "quantum_ready": true,
                "capabilities": ["post_quantum", "signing", "verification"]
            })),
            ("lib-proofs", "load_circuits") => (true, serde_json::json!({
                "circuits_loaded": 3,
                "proof_cache_size": 1000,
                "ready": true
            })),
            ("lib-economy", "connect_ubi_system") => (true, serde_json::json!({
                "ubi_system_active": true,
                "market_data_fresh": true,
                "monthly_ubi_amount": 1000
            })),
            ("lib-network", "register_service") => (true, serde_json::json!({
                "registered": true,
                "peer_count": 1247,
                "mesh_health": 0.87
            })),
            ("lib-proofs", "generate_identity_proof") => (true, serde_json::json!({
                "proof": "deadbeef1234567890abcdef",
                "verification_key": "abcdef1234567890deadbeef"
            })),
            ("lib-economy", "check_ubi_eligibility") => (true, serde_json::json!({
                "eligible": true,
                "next_payment": timestamp + 86400
            })),
            ("lib-economy", "distribute_ubi") => (true, serde_json::json!({
                "transaction_id": format!("ubi_tx_{}", timestamp),
                "amount": 1000,
                "confirmed": true
            })),
            _ => (false, serde_json::json!({
                "error": "Operation not supported"
            }))
        };

        Ok(IntegrationResponse {
            package: request.target_package,
            operation: request.operation,
            success,
            data,
            timestamp,
            signature: None,
        })
    }
}

impl Default for CrossPackageIntegration {
    fn default() -> Self {
        Self::new()
    }
}
