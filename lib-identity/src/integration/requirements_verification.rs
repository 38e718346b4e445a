//! Requirements verification for cross-package integration


use crate::identity::ZhtpIdentity;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Requirements verification system for identity operations
#[derive(Debug, Clone)]
pub struct RequirementsVerifier {
    /// Verification requirements database
    requirements_db: HashMap<String, VerificationRequirement>,
    /// Cached verification results
    verification_cache: HashMap<String, CachedVerificationResult>,
}

/// Verification requirement definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRequirement {
    pub requirement_id: String,
    pub name: String,
    pub description: String,
    pub required_proofs: Vec<ProofRequirement>,
    pub minimum_trust_level: TrustLevel,
    pub validity_period_hours: u32,
    pub required_attestations: u32,
}

/// Proof requirement specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofRequirement {
    pub proof_type: String,
    pub required_attributes: Vec<String>,
    pub privacy_level: PrivacyLevel,
    pub trusted_issuers: Vec<String>,
    pub minimum_confidence: f64,
}

/// Trust level for verification
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrustLevel {
    None,
    Basic,
    Standard,
    High,
    Maximum,
}

/// Privacy level specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PrivacyLevel {
    Public,
    Restricted,
    Confidential,
    Secret,
    TopSecret,
}

/// Cached verification result
#[derive(Debug, Clone)]
pub struct CachedVerificationResult {
    pub requirement_id: String,
    pub identity_id: String,
    pub result: RequirementVerificationResult,
    pub cached_at: u64,
    pub expires_at: u64,
}

/// Result of requirement verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementVerificationResult {
    pub requirement_id: String,
    pub satisfied: bool,
    pub trust_level_achieved: TrustLevel,
    pub proofs_verified: Vec<VerifiedProof>,
    pub attestations_count: u32,
    pub confidence_score: f64,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Verified proof information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedProof {
    pub proof_type: String,
    pub issuer: String,
    pub issued_at: u64,
    pub verified_at: u64,
    pub confidence: f64,
    pub attributes_disclosed: Vec<String>,
}

impl RequirementsVerifier {
    /// Create new requirements verifier
    pub fn new() -> Self {
        Self {
            requirements_db: Self::initialize_default_requirements(),
            verification_cache: HashMap::new(),
        }
    }

    /// Verify that identity meets specific requirements
    pub async fn verify_requirements(
        &mut self,
        identity: &ZhtpIdentity,
        requirement_id: &str,
    ) -> Result<RequirementVerificationResult, Box<dyn std::error::Error>> {
        // Check cache first
        let cache_key = format!("{}:{}", identity.id, requirement_id);
        if let Some(cached_result) = self.verification_cache.get(&cache_key) {
            let current_time = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)?
                .as_secs();
            
            if cached_result.expires_at > current_time {
                return Ok(cached_result.result.clone());
            }
        }

        // Get requirement definition
        let requirement = self.requirements_db.get(requirement_id)
            .ok_or_else(|| format!("Unknown requirement: {}", requirement_id))?;

        // Perform verification
        let result = self.perform_verification(identity, requirement).await?;
        
        // Cache result
        let current_time = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)?
            .as_secs();
        
        let cached_result = CachedVerificationResult {
            requirement_id: requirement_id.to_string(),
            identity_id: hex::encode(&identity.id.0),
            result: result.clone(),
            cached_at: current_time,
            expires_at: current_time + (requirement.validity_period_hours as u64 * 3600),
        };
        
        self.verification_cache.insert(cache_key, cached_result);
        
        Ok(result)
    }

    /// Perform actual verification against requirement
    async fn perform_verification(
        &self,
        identity: &ZhtpIdentity,
        requirement: &VerificationRequirement,
    ) -> Result<RequirementVerificationResult, Box<dyn std::error::Error>> {
        let mut result = RequirementVerificationResult {
            requirement_id: requirement.requirement_id.clone(),
            satisfied: false,
            trust_level_achieved: TrustLevel::None,
            proofs_verified: Vec::new(),
            attestations_count: 0,
            confidence_score: 0.0,
            errors: Vec::new(),
            warnings: Vec::new(),
            metadata: HashMap::new(),
        };

        // Verify each required proof
        let mut total_confidence = 0.0;
        let mut proofs_count = 0;

        for proof_req in &requirement.required_proofs {
            match self.verify_proof_requirement(identity, proof_req).await {
                Ok(verified_proof) => {
                    if verified_proof.confidence >= proof_req.minimum_confidence {
                        result.proofs_verified.push(verified_proof.clone());
                        total_confidence += verified_proof.confidence;
                        proofs_count += 1;
                        
                        // Update trust level based on proof quality
                        let proof_trust_level = self.calculate_proof_trust_level(&verified_proof);
                        if proof_trust_level > result.trust_level_achieved {
                            result.trust_level_achieved = proof_trust_level;
                        }
                    } else {
                        result.warnings.push(format!("Proof {} below minimum confidence", proof_req.proof_type));
                    }
                },
                Err(e) => {
                    result.errors.push(format!("Failed to verify proof {}: {}", proof_req.proof_type, e));
                }
            }
        }

        // Calculate overall confidence
        result.confidence_score = if proofs_count > 0 {
            total_confidence / proofs_count as f64
        } else {
            0.0
        };

        // Count attestations (simplified - would check actual attestations)
        result.attestations_count = identity.metadata.get("attestation_count")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0) as u32;

        // Determine if requirement is satisfied
        result.satisfied = result.proofs_verified.len() >= requirement.required_proofs.len()
            && result.trust_level_achieved >= requirement.minimum_trust_level
            && result.attestations_count >= requirement.required_attestations
            && result.confidence_score >= 0.7; // Minimum overall confidence

        // Add metadata
        result.metadata.insert("requirement_name".to_string(), 
            serde_json::Value::String(requirement.name.clone()));
        result.metadata.insert("verification_timestamp".to_string(),
            serde_json::Value::Number(serde_json::Number::from(
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)?
                    .as_secs()
            )));

        Ok(result)
    }

    /// Verify individual proof requirement
    async fn verify_proof_requirement(
        &self,
        identity: &ZhtpIdentity,
        proof_req: &ProofRequirement,
    ) -> Result<VerifiedProof, Box<dyn std::error::Error>> {
        // In implementation, would integrate with actual proof verification system
        // For now, simulate verification based on identity data
        
        let current_time = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)?
            .as_secs();

        // Simulate proof verification
        let confidence = match proof_req.proof_type.as_str() {
            "citizenship_proof" => 0.95,
            "identity_proof" => 0.90,
            "age_proof" => 0.85,
            "residence_proof" => 0.80,
            "qualification_proof" => 0.75,
            _ => 0.60,
        };

        // Check if identity has required attributes
        let mut disclosed_attributes = Vec::new();
        for attr in &proof_req.required_attributes {
            if identity.metadata.contains_key(attr) {
                disclosed_attributes.push(attr.clone());
            }
        }

        Ok(VerifiedProof {
            proof_type: proof_req.proof_type.clone(),
            issuer: "lib_identity_system".to_string(), // Would be actual issuer
            issued_at: current_time - 86400, // Simulate issued yesterday
            verified_at: current_time,
            confidence,
            attributes_disclosed: disclosed_attributes,
        })
    }

    /// Calculate trust level based on verified proof
    fn calculate_proof_trust_level(&self, proof: &VerifiedProof) -> TrustLevel {
        match (proof.confidence, proof.proof_type.as_str()) {
            (conf, "citizenship_proof") if conf >= 0.95 => TrustLevel::Maximum,
            (conf, "identity_proof") if conf >= 0.90 => TrustLevel::High,
            (conf, _) if conf >= 0.85 => TrustLevel::Standard,
            (conf, _) if conf >= 0.70 => TrustLevel::Basic,
            _ => TrustLevel::None,
        }
    }

    /// Initialize default verification requirements
    fn initialize_default_requirements() -> HashMap<String, VerificationRequirement> {
        let mut requirements = HashMap::new();

        // Citizenship verification requirement
        requirements.insert("citizenship_verification".to_string(), VerificationRequirement {
            requirement_id: "citizenship_verification".to_string(),
            name: "Citizenship Verification".to_string(),
            description: "Verify citizen status for UBI and DAO participation".to_string(),
            required_proofs: vec![
                ProofRequirement {
                    proof_type: "citizenship_proof".to_string(),
                    required_attributes: vec!["nationality".to_string(), "residence".to_string()],
                    privacy_level: PrivacyLevel::Restricted,
                    trusted_issuers: vec!["government_registry".to_string(), "lib_foundation".to_string()],
                    minimum_confidence: 0.90,
                },
                ProofRequirement {
                    proof_type: "identity_proof".to_string(),
                    required_attributes: vec!["full_name".to_string(), "date_of_birth".to_string()],
                    privacy_level: PrivacyLevel::Confidential,
                    trusted_issuers: vec!["identity_authority".to_string()],
                    minimum_confidence: 0.85,
                }
            ],
            minimum_trust_level: TrustLevel::High,
            validity_period_hours: 24,
            required_attestations: 2,
        });

        // Age verification requirement
        requirements.insert("age_verification".to_string(), VerificationRequirement {
            requirement_id: "age_verification".to_string(),
            name: "Age Verification".to_string(),
            description: "Verify minimum age for service access".to_string(),
            required_proofs: vec![
                ProofRequirement {
                    proof_type: "age_proof".to_string(),
                    required_attributes: vec!["age_over_18".to_string()],
                    privacy_level: PrivacyLevel::Restricted,
                    trusted_issuers: vec!["age_verification_service".to_string()],
                    minimum_confidence: 0.80,
                }
            ],
            minimum_trust_level: TrustLevel::Standard,
            validity_period_hours: 168, // 1 week
            required_attestations: 1,
        });

        // Financial qualification requirement
        requirements.insert("financial_qualification".to_string(), VerificationRequirement {
            requirement_id: "financial_qualification".to_string(),
            name: "Financial Qualification".to_string(),
            description: "Verify financial standing for advanced services".to_string(),
            required_proofs: vec![
                ProofRequirement {
                    proof_type: "income_proof".to_string(),
                    required_attributes: vec!["income_level".to_string(), "employment_status".to_string()],
                    privacy_level: PrivacyLevel::Confidential,
                    trusted_issuers: vec!["financial_institution".to_string(), "employer".to_string()],
                    minimum_confidence: 0.85,
                },
                ProofRequirement {
                    proof_type: "credit_proof".to_string(),
                    required_attributes: vec!["credit_score".to_string()],
                    privacy_level: PrivacyLevel::Secret,
                    trusted_issuers: vec!["credit_bureau".to_string()],
                    minimum_confidence: 0.80,
                }
            ],
            minimum_trust_level: TrustLevel::High,
            validity_period_hours: 720, // 30 days
            required_attestations: 3,
        });

        requirements
    }

    /// Add new verification requirement
    pub fn add_requirement(&mut self, requirement: VerificationRequirement) {
        self.requirements_db.insert(requirement.requirement_id.clone(), requirement);
    }

    /// Get all available requirements
    pub fn list_requirements(&self) -> Vec<&VerificationRequirement> {
        self.requirements_db.values().collect()
    }

    /// Clear verification cache
    pub fn clear_cache(&mut self) {
        self.verification_cache.clear();
    }

    /// Get cache statistics
    pub fn get_cache_stats(&self) -> (usize, usize) {
        let active_entries = self.verification_cache.len();
        let expired_entries = self.verification_cache
            .values()
            .filter(|entry| {
                let current_time = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap()
                    .as_secs();
                entry.expires_at <= current_time
            })
            .count();
        
        (active_entries, expired_entries)
    }
}

impl Default for RequirementsVerifier {
    fn default() -> Self {
        Self::new()
    }
}
