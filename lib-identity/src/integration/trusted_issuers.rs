//! Trusted issuers management for identity verification

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Trusted issuers registry for identity verification
#[derive(Debug, Clone)]
pub struct TrustedIssuersRegistry {
    /// Registry of trusted issuers
    issuers: HashMap<String, TrustedIssuer>,
    /// Issuer verification cache
    verification_cache: HashMap<String, IssuerVerificationResult>,
    /// Registry settings
    settings: RegistrySettings,
}

/// Trusted issuer definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustedIssuer {
    pub issuer_id: String,
    pub name: String,
    pub description: String,
    pub public_key: Vec<u8>,
    pub issuer_type: IssuerType,
    pub trust_level: TrustLevel,
    pub capabilities: Vec<String>,
    pub verification_methods: Vec<VerificationMethod>,
    pub valid_from: u64,
    pub valid_until: u64,
    pub revocation_endpoint: Option<String>,
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Type of trusted issuer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum IssuerType {
    /// Government agency
    Government,
    /// Educational institution
    Educational,
    /// Financial institution
    Financial,
    /// Healthcare provider
    Healthcare,
    /// Professional organization
    Professional,
    /// Technology platform
    Technology,
    /// ZHTP Foundation
    ZhtpFoundation,
    /// Third-party verifier
    ThirdParty,
}

/// Trust level for issuers
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrustLevel {
    /// Minimal trust
    Minimal,
    /// Basic trust
    Basic,
    /// Standard trust
    Standard,
    /// High trust
    High,
    /// Maximum trust
    Maximum,
}

/// Verification method supported by issuer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationMethod {
    pub method_id: String,
    pub method_type: String,
    pub verification_endpoint: String,
    pub supported_proofs: Vec<String>,
    pub requires_registration: bool,
}

/// Registry settings
#[derive(Debug, Clone)]
pub struct RegistrySettings {
    pub auto_refresh_interval_hours: u32,
    pub max_cache_size: usize,
    pub require_certificate_chain: bool,
    pub enable_revocation_checking: bool,
    pub minimum_trust_level: TrustLevel,
}

/// Result of issuer verification
#[derive(Debug, Clone)]
pub struct IssuerVerificationResult {
    pub issuer_id: String,
    pub verified: bool,
    pub trust_level: TrustLevel,
    pub verification_timestamp: u64,
    pub expires_at: u64,
    pub verification_details: VerificationDetails,
}

/// Details of verification process
#[derive(Debug, Clone)]
pub struct VerificationDetails {
    pub certificate_valid: bool,
    pub signature_valid: bool,
    pub not_revoked: bool,
    pub trust_chain_valid: bool,
    pub capabilities_verified: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl TrustedIssuersRegistry {
    /// Create new trusted issuers registry
    pub fn new() -> Self {
        Self {
            issuers: Self::initialize_default_issuers(),
            verification_cache: HashMap::new(),
            settings: RegistrySettings::default(),
        }
    }

    /// Add trusted issuer to registry
    pub fn add_issuer(&mut self, issuer: TrustedIssuer) -> Result<(), Box<dyn std::error::Error>> {
        // Validate issuer
        self.validate_issuer(&issuer)?;
        
        // Check for conflicts
        if self.issuers.contains_key(&issuer.issuer_id) {
            return Err(format!("Issuer {} already exists", issuer.issuer_id).into());
        }

        // Add to registry
        self.issuers.insert(issuer.issuer_id.clone(), issuer.clone());
        
        println!("✓ Added trusted issuer: {} ({})", issuer.name, issuer.issuer_id);
        Ok(())
    }

    /// Remove issuer from registry
    pub fn remove_issuer(&mut self, issuer_id: &str) -> Result<(), Box<dyn std::error::Error>> {
        if self.issuers.remove(issuer_id).is_some() {
            // Also remove from cache
            self.verification_cache.retain(|k, _| !k.starts_with(issuer_id));
            println!("✓ Removed trusted issuer: {}", issuer_id);
            Ok(())
        } else {
            Err(format!("Issuer {} not found", issuer_id).into())
        }
    }

    /// Verify issuer authenticity and capabilities
    pub async fn verify_issuer(&mut self, issuer_id: &str) -> Result<IssuerVerificationResult, Box<dyn std::error::Error>> {
        // Check cache first
        if let Some(cached_result) = self.verification_cache.get(issuer_id) {
            let current_time = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)?
                .as_secs();
            
            if cached_result.expires_at > current_time {
                return Ok(cached_result.clone());
            }
        }

        // Get issuer
        let issuer = self.issuers.get(issuer_id)
            .ok_or_else(|| format!("Unknown issuer: {}", issuer_id))?;

        // Perform verification
        let verification_result = self.perform_issuer_verification(issuer).await?;
        
        // Cache result
        self.verification_cache.insert(issuer_id.to_string(), verification_result.clone());
        
        Ok(verification_result)
    }

    /// Perform actual issuer verification
    async fn perform_issuer_verification(&self, issuer: &TrustedIssuer) -> Result<IssuerVerificationResult, Box<dyn std::error::Error>> {
        let current_time = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)?
            .as_secs();

        let mut details = VerificationDetails {
            certificate_valid: false,
            signature_valid: false,
            not_revoked: true,
            trust_chain_valid: false,
            capabilities_verified: false,
            errors: Vec::new(),
            warnings: Vec::new(),
        };

        // Check validity period
        if current_time < issuer.valid_from || current_time > issuer.valid_until {
            details.errors.push("Issuer certificate expired or not yet valid".to_string());
            return Ok(IssuerVerificationResult {
                issuer_id: issuer.issuer_id.clone(),
                verified: false,
                trust_level: TrustLevel::Minimal,
                verification_timestamp: current_time,
                expires_at: current_time + 3600, // 1 hour
                verification_details: details,
            });
        }

        // Verify certificate
        details.certificate_valid = self.verify_certificate(issuer).await?;
        if !details.certificate_valid {
            details.errors.push("Invalid certificate".to_string());
        }

        // Verify signature
        details.signature_valid = self.verify_signature(issuer).await?;
        if !details.signature_valid {
            details.errors.push("Invalid signature".to_string());
        }

        // Check revocation status
        if self.settings.enable_revocation_checking {
            details.not_revoked = self.check_revocation_status(issuer).await?;
            if !details.not_revoked {
                details.errors.push("Issuer has been revoked".to_string());
            }
        }

        // Verify trust chain
        details.trust_chain_valid = self.verify_trust_chain(issuer).await?;
        if !details.trust_chain_valid {
            details.warnings.push("Trust chain verification incomplete".to_string());
        }

        // Verify capabilities
        details.capabilities_verified = self.verify_capabilities(issuer).await?;
        if !details.capabilities_verified {
            details.warnings.push("Some capabilities could not be verified".to_string());
        }

        // Determine overall verification result
        let verified = details.certificate_valid 
            && details.signature_valid 
            && details.not_revoked
            && issuer.trust_level >= self.settings.minimum_trust_level;

        Ok(IssuerVerificationResult {
            issuer_id: issuer.issuer_id.clone(),
            verified,
            trust_level: issuer.trust_level.clone(),
            verification_timestamp: current_time,
            expires_at: current_time + (self.settings.auto_refresh_interval_hours as u64 * 3600),
            verification_details: details,
        })
    }

    /// Verify issuer certificate
    async fn verify_certificate(&self, issuer: &TrustedIssuer) -> Result<bool, Box<dyn std::error::Error>> {
        // In implementation, would verify X.509 certificate chain
        // For now, simulate based on issuer type and trust level
        match issuer.issuer_type {
            IssuerType::ZhtpFoundation => Ok(true),
            IssuerType::Government => Ok(issuer.trust_level >= TrustLevel::High),
            IssuerType::Educational => Ok(issuer.trust_level >= TrustLevel::Standard),
            IssuerType::Financial => Ok(issuer.trust_level >= TrustLevel::High),
            _ => Ok(issuer.trust_level >= TrustLevel::Basic),
        }
    }

    /// Verify issuer signature
    async fn verify_signature(&self, issuer: &TrustedIssuer) -> Result<bool, Box<dyn std::error::Error>> {
        // In implementation, would verify digital signature
        // For now, check if public key is valid
        Ok(!issuer.public_key.is_empty() && issuer.public_key.len() >= 32)
    }

    /// Check revocation status
    async fn check_revocation_status(&self, issuer: &TrustedIssuer) -> Result<bool, Box<dyn std::error::Error>> {
        // In implementation, would check revocation endpoint
        if let Some(_revocation_endpoint) = &issuer.revocation_endpoint {
            // Simulate revocation check
            // In practice, would make HTTP request to revocation endpoint
            Ok(true) // Assume not revoked for simulation
        } else {
            Ok(true) // No revocation endpoint means cannot be revoked
        }
    }

    /// Verify trust chain
    async fn verify_trust_chain(&self, issuer: &TrustedIssuer) -> Result<bool, Box<dyn std::error::Error>> {
        // In implementation, would verify certificate chain to root CA
        match issuer.issuer_type {
            IssuerType::ZhtpFoundation => Ok(true), // Self-signed root
            IssuerType::Government => Ok(true), // Government CAs are trusted
            _ => Ok(issuer.trust_level >= TrustLevel::Standard),
        }
    }

    /// Verify issuer capabilities
    async fn verify_capabilities(&self, issuer: &TrustedIssuer) -> Result<bool, Box<dyn std::error::Error>> {
        // Check if issuer's claimed capabilities match their type
        let expected_capabilities = match issuer.issuer_type {
            IssuerType::Government => vec!["citizenship_verification", "identity_verification", "residence_verification"],
            IssuerType::Educational => vec!["qualification_verification", "education_verification"],
            IssuerType::Financial => vec!["income_verification", "credit_verification", "financial_verification"],
            IssuerType::Healthcare => vec!["health_verification", "medical_verification"],
            IssuerType::Professional => vec!["professional_verification", "certification_verification"],
            IssuerType::Technology => vec!["technical_verification", "platform_verification"],
            IssuerType::ZhtpFoundation => vec!["identity_verification", "citizenship_verification", "all_verifications"],
            IssuerType::ThirdParty => vec!["general_verification"],
        };

        // Check if issuer has at least some expected capabilities
        let has_expected = expected_capabilities.iter()
            .any(|cap| issuer.capabilities.contains(&cap.to_string()));

        Ok(has_expected)
    }

    /// Validate issuer before adding
    fn validate_issuer(&self, issuer: &TrustedIssuer) -> Result<(), Box<dyn std::error::Error>> {
        // Check required fields
        if issuer.issuer_id.is_empty() {
            return Err("Issuer ID cannot be empty".into());
        }
        
        if issuer.name.is_empty() {
            return Err("Issuer name cannot be empty".into());
        }
        
        if issuer.public_key.is_empty() {
            return Err("Public key cannot be empty".into());
        }

        // Check validity period
        if issuer.valid_from >= issuer.valid_until {
            return Err("Invalid validity period".into());
        }

        // Check capabilities
        if issuer.capabilities.is_empty() {
            return Err("Issuer must have at least one capability".into());
        }

        // Check verification methods
        if issuer.verification_methods.is_empty() {
            return Err("Issuer must support at least one verification method".into());
        }

        Ok(())
    }

    /// Get issuer by ID
    pub fn get_issuer(&self, issuer_id: &str) -> Option<&TrustedIssuer> {
        self.issuers.get(issuer_id)
    }

    /// List all issuers
    pub fn list_issuers(&self) -> Vec<&TrustedIssuer> {
        self.issuers.values().collect()
    }

    /// Find issuers by type
    pub fn find_issuers_by_type(&self, issuer_type: &IssuerType) -> Vec<&TrustedIssuer> {
        self.issuers.values()
            .filter(|issuer| &issuer.issuer_type == issuer_type)
            .collect()
    }

    /// Find issuers by capability
    pub fn find_issuers_by_capability(&self, capability: &str) -> Vec<&TrustedIssuer> {
        self.issuers.values()
            .filter(|issuer| issuer.capabilities.contains(&capability.to_string()))
            .collect()
    }

    /// Find issuers by minimum trust level
    pub fn find_issuers_by_trust_level(&self, min_trust_level: &TrustLevel) -> Vec<&TrustedIssuer> {
        self.issuers.values()
            .filter(|issuer| &issuer.trust_level >= min_trust_level)
            .collect()
    }

    /// Clear verification cache
    pub fn clear_cache(&mut self) {
        self.verification_cache.clear();
    }

    /// Get cache statistics
    pub fn get_cache_stats(&self) -> (usize, usize) {
        let total_entries = self.verification_cache.len();
        let current_time = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs();
        
        let expired_entries = self.verification_cache.values()
            .filter(|result| result.expires_at <= current_time)
            .count();
        
        (total_entries, expired_entries)
    }

    /// Initialize default trusted issuers
    fn initialize_default_issuers() -> HashMap<String, TrustedIssuer> {
        let mut issuers = HashMap::new();

        // ZHTP Foundation
        issuers.insert("lib_foundation".to_string(), TrustedIssuer {
            issuer_id: "lib_foundation".to_string(),
            name: "ZHTP Foundation".to_string(),
            description: "The foundational authority for ZHTP identity verification".to_string(),
            public_key: vec![1; 32], // Placeholder key
            issuer_type: IssuerType::ZhtpFoundation,
            trust_level: TrustLevel::Maximum,
            capabilities: vec![
                "identity_verification".to_string(),
                "citizenship_verification".to_string(),
                "ubi_verification".to_string(),
                "dao_verification".to_string(),
                "web4_verification".to_string(),
            ],
            verification_methods: vec![
                VerificationMethod {
                    method_id: "lib_proofs_proof".to_string(),
                    method_type: "zero_knowledge_proof".to_string(),
                    verification_endpoint: "https://verify.zhtp.foundation/zk".to_string(),
                    supported_proofs: vec!["citizenship_proof".to_string(), "identity_proof".to_string()],
                    requires_registration: false,
                }
            ],
            valid_from: 0,
            valid_until: u64::MAX,
            revocation_endpoint: Some("https://revoke.zhtp.foundation".to_string()),
            metadata: HashMap::new(),
        });

        // Government Registry
        issuers.insert("government_registry".to_string(), TrustedIssuer {
            issuer_id: "government_registry".to_string(),
            name: "Government Identity Registry".to_string(),
            description: "Official government identity verification authority".to_string(),
            public_key: vec![2; 32], // Placeholder key
            issuer_type: IssuerType::Government,
            trust_level: TrustLevel::Maximum,
            capabilities: vec![
                "citizenship_verification".to_string(),
                "identity_verification".to_string(),
                "residence_verification".to_string(),
                "age_verification".to_string(),
            ],
            verification_methods: vec![
                VerificationMethod {
                    method_id: "gov_digital_id".to_string(),
                    method_type: "digital_identity".to_string(),
                    verification_endpoint: "https://verify.gov.example/identity".to_string(),
                    supported_proofs: vec!["citizenship_proof".to_string(), "residence_proof".to_string()],
                    requires_registration: true,
                }
            ],
            valid_from: 0,
            valid_until: 2524608000, // Year 2050
            revocation_endpoint: Some("https://revoke.gov.example".to_string()),
            metadata: HashMap::new(),
        });

        // Educational Authority
        issuers.insert("education_authority".to_string(), TrustedIssuer {
            issuer_id: "education_authority".to_string(),
            name: "Educational Credentials Authority".to_string(),
            description: "Verification authority for educational qualifications".to_string(),
            public_key: vec![3; 32], // Placeholder key
            issuer_type: IssuerType::Educational,
            trust_level: TrustLevel::High,
            capabilities: vec![
                "qualification_verification".to_string(),
                "education_verification".to_string(),
                "degree_verification".to_string(),
            ],
            verification_methods: vec![
                VerificationMethod {
                    method_id: "edu_credential".to_string(),
                    method_type: "educational_credential".to_string(),
                    verification_endpoint: "https://verify.education.example/credentials".to_string(),
                    supported_proofs: vec!["qualification_proof".to_string()],
                    requires_registration: true,
                }
            ],
            valid_from: 0,
            valid_until: 2524608000,
            revocation_endpoint: None,
            metadata: HashMap::new(),
        });

        issuers
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            auto_refresh_interval_hours: 24,
            max_cache_size: 1000,
            require_certificate_chain: true,
            enable_revocation_checking: true,
            minimum_trust_level: TrustLevel::Basic,
        }
    }
}

impl Default for TrustedIssuersRegistry {
    fn default() -> Self {
        Self::new()
    }
}
