//! Proof generation for cross-package operations

use crate::identity::ZhtpIdentity;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Proof generation system for identity operations
#[derive(Debug, Clone)]
pub struct ProofGenerator {
    /// Available proof types
    proof_types: HashMap<String, ProofTypeDefinition>,
    /// Generation statistics
    generation_stats: ProofGenerationStats,
    /// Cached proofs
    proof_cache: HashMap<String, CachedProof>,
}

/// Definition of a proof type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofTypeDefinition {
    pub proof_type: String,
    pub name: String,
    pub description: String,
    pub required_inputs: Vec<String>,
    pub privacy_level: PrivacyLevel,
    pub complexity_level: ComplexityLevel,
    pub validity_duration_hours: u32,
    pub supports_selective_disclosure: bool,
}

/// Privacy level for proofs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PrivacyLevel {
    Public,
    Restricted,
    Confidential,
    Secret,
    TopSecret,
}

/// Complexity level for proof generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ComplexityLevel {
    Simple,
    Standard,
    Complex,
    Advanced,
}

/// Proof generation statistics
#[derive(Debug, Clone)]
pub struct ProofGenerationStats {
    pub total_proofs_generated: u64,
    pub successful_generations: u64,
    pub failed_generations: u64,
    pub average_generation_time_ms: f64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

/// Cached proof entry
#[derive(Debug, Clone)]
pub struct CachedProof {
    pub proof_id: String,
    pub proof_type: String,
    pub identity_id: String,
    pub proof_data: Vec<u8>,
    pub metadata: HashMap<String, serde_json::Value>,
    pub generated_at: u64,
    pub expires_at: u64,
    pub usage_count: u32,
}

/// Proof generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofGenerationRequest {
    pub proof_type: String,
    pub identity_id: String,
    pub required_attributes: Vec<String>,
    pub selective_disclosure: Option<Vec<String>>,
    pub challenge: Option<Vec<u8>>,
    pub privacy_requirements: PrivacyRequirements,
    pub additional_context: HashMap<String, serde_json::Value>,
}

/// Privacy requirements for proof generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivacyRequirements {
    pub minimum_privacy_level: PrivacyLevel,
    pub hide_identity: bool,
    pub use_pseudonym: bool,
    pub require_unlinkability: bool,
    pub zero_knowledge_required: bool,
}

/// Result of proof generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofGenerationResult {
    pub proof_id: String,
    pub proof_type: String,
    pub proof_data: Vec<u8>,
    pub verification_key: Vec<u8>,
    pub metadata: HashMap<String, serde_json::Value>,
    pub privacy_level_achieved: PrivacyLevel,
    pub attributes_included: Vec<String>,
    pub generation_time_ms: u64,
    pub validity_expires_at: u64,
}

impl ProofGenerator {
    /// Create new proof generator
    pub fn new() -> Self {
        Self {
            proof_types: Self::initialize_proof_types(),
            generation_stats: ProofGenerationStats {
                total_proofs_generated: 0,
                successful_generations: 0,
                failed_generations: 0,
                average_generation_time_ms: 0.0,
                cache_hits: 0,
                cache_misses: 0,
            },
            proof_cache: HashMap::new(),
        }
    }

    /// Generate proof for identity
    pub async fn generate_proof(
        &mut self,
        identity: &ZhtpIdentity,
        request: ProofGenerationRequest,
    ) -> Result<ProofGenerationResult, Box<dyn std::error::Error>> {
        let start_time = std::time::Instant::now();
        self.generation_stats.total_proofs_generated += 1;

        // Check cache first
        let cache_key = self.generate_cache_key(&request);
        if let Some(cached_proof) = self.proof_cache.get(&cache_key) {
            let current_time = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)?
                .as_secs();
            
            if cached_proof.expires_at > current_time {
                self.generation_stats.cache_hits += 1;
                return Ok(ProofGenerationResult {
                    proof_id: cached_proof.proof_id.clone(),
                    proof_type: cached_proof.proof_type.clone(),
                    proof_data: cached_proof.proof_data.clone(),
                    verification_key: vec![0; 32], // Would be actual verification key
                    metadata: cached_proof.metadata.clone(),
                    privacy_level_achieved: PrivacyLevel::Confidential,
                    attributes_included: request.required_attributes.clone(),
                    generation_time_ms: 0, // Cached result
                    validity_expires_at: cached_proof.expires_at,
                });
            }
        }
        self.generation_stats.cache_misses += 1;

        // Get proof type definition
        let proof_type_def = self.proof_types.get(&request.proof_type)
            .ok_or_else(|| format!("Unknown proof type: {}", request.proof_type))?;

        // Validate request
        self.validate_proof_request(identity, &request, proof_type_def)?;

        // Generate the proof
        let proof_result = self.perform_proof_generation(identity, &request, proof_type_def).await?;

        // Cache the proof
        self.cache_proof(&request, &proof_result);

        // Update statistics
        let generation_time = start_time.elapsed().as_millis() as f64;
        self.update_generation_stats(generation_time, true);

        self.generation_stats.successful_generations += 1;
        
        Ok(proof_result)
    }

    /// Validate proof generation request
    fn validate_proof_request(
        &self,
        identity: &ZhtpIdentity,
        request: &ProofGenerationRequest,
        proof_type_def: &ProofTypeDefinition,
    ) -> Result<(), Box<dyn std::error::Error>> {
        // Check if identity matches request
        if hex::encode(&identity.id.0) != request.identity_id {
            return Err("Identity ID mismatch".into());
        }

        // Check if all required inputs are available
        for required_input in &proof_type_def.required_inputs {
            if !identity.metadata.contains_key(required_input) {
                return Err(format!("Required input '{}' not available in identity", required_input).into());
            }
        }

        // Check privacy level compatibility
        if !self.is_privacy_level_compatible(&proof_type_def.privacy_level, &request.privacy_requirements.minimum_privacy_level) {
            return Err("Privacy level requirements cannot be satisfied".into());
        }

        // Check selective disclosure compatibility
        if let Some(ref selective_attrs) = request.selective_disclosure {
            if !proof_type_def.supports_selective_disclosure {
                return Err("Proof type does not support selective disclosure".into());
            }
            
            for attr in selective_attrs {
                if !request.required_attributes.contains(attr) {
                    return Err(format!("Selective disclosure attribute '{}' not in required attributes", attr).into());
                }
            }
        }

        Ok(())
    }

    /// Perform actual proof generation
    async fn perform_proof_generation(
        &self,
        identity: &ZhtpIdentity,
        request: &ProofGenerationRequest,
        proof_type_def: &ProofTypeDefinition,
    ) -> Result<ProofGenerationResult, Box<dyn std::error::Error>> {
        let proof_id = format!("proof_{}_{}", request.proof_type, 
            std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH)?.as_secs());

        // Generate proof based on type
        let (proof_data, verification_key, actual_privacy_level) = match request.proof_type.as_str() {
            "citizenship_proof" => self.generate_citizenship_proof(identity, request).await?,
            "age_proof" => self.generate_age_proof(identity, request).await?,
            "identity_proof" => self.generate_identity_proof(identity, request).await?,
            "qualification_proof" => self.generate_qualification_proof(identity, request).await?,
            "residence_proof" => self.generate_residence_proof(identity, request).await?,
            "ownership_proof" => self.generate_ownership_proof(identity, request).await?,
            _ => return Err(format!("Unsupported proof type: {}", request.proof_type).into()),
        };

        // Determine which attributes were actually included
        let attributes_included = if let Some(ref selective) = request.selective_disclosure {
            selective.clone()
        } else {
            request.required_attributes.clone()
        };

        // Create metadata
        let mut metadata = HashMap::new();
        metadata.insert("proof_type_definition".to_string(), 
            serde_json::to_value(proof_type_def)?);
        metadata.insert("generation_method".to_string(), 
            serde_json::Value::String("zk_snark".to_string()));
        metadata.insert("circuit_version".to_string(), 
            serde_json::Value::String("v1.0".to_string()));
        
        // Add additional context
        for (key, value) in &request.additional_context {
            metadata.insert(format!("context_{}", key), value.clone());
        }

        let current_time = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)?
            .as_secs();

        Ok(ProofGenerationResult {
            proof_id,
            proof_type: request.proof_type.clone(),
            proof_data,
            verification_key,
            metadata,
            privacy_level_achieved: actual_privacy_level,
            attributes_included,
            generation_time_ms: std::time::Instant::now().elapsed().as_millis() as u64,
            validity_expires_at: current_time + (proof_type_def.validity_duration_hours as u64 * 3600),
        })
    }

    /// Generate citizenship proof
    async fn generate_citizenship_proof(
        &self,
        identity: &ZhtpIdentity,
        request: &ProofGenerationRequest,
    ) -> Result<(Vec<u8>, Vec<u8>, PrivacyLevel), Box<dyn std::error::Error>> {
        // In implementation, would use actual ZK circuit for citizenship proof
        let mut proof_data = Vec::new();
        
        // Include nationality if required and available
        if request.required_attributes.contains(&"nationality".to_string()) {
            if let Some(nationality) = identity.metadata.get("nationality") {
                proof_data.extend_from_slice(nationality.as_bytes());
            }
        }
        
        // Include residence if required and available
        if request.required_attributes.contains(&"residence".to_string()) {
            if let Some(residence) = identity.metadata.get("residence") {
                proof_data.extend_from_slice(residence.as_bytes());
            }
        }

        // Generate ZK proof (simplified)
        let zk_proof = self.generate_zk_proof(&proof_data, request.challenge.as_ref()).await?;
        let verification_key = self.generate_verification_key(&proof_data).await?;
        
        Ok((zk_proof, verification_key, PrivacyLevel::Confidential))
    }

    /// Generate age proof
    async fn generate_age_proof(
        &self,
        identity: &ZhtpIdentity,
        request: &ProofGenerationRequest,
    ) -> Result<(Vec<u8>, Vec<u8>, PrivacyLevel), Box<dyn std::error::Error>> {
        // Age proof using range proofs to prove age without revealing exact age
        let mut proof_data = Vec::new();
        
        if let Some(birth_date) = identity.metadata.get("date_of_birth") {
            // Calculate age (simplified)
            let birth_year = birth_date
                .split('-')
                .next()
                .and_then(|year| year.parse::<u32>().ok())
                .unwrap_or(1990);
                
            let current_year = 2024; // In implementation, use actual current year
            let age = current_year - birth_year;
            
            // Create range proof for age > 18 (simplified)
            if request.required_attributes.contains(&"age_over_18".to_string()) {
                proof_data.push(if age >= 18 { 1 } else { 0 });
            }
            
            if request.required_attributes.contains(&"age_over_21".to_string()) {
                proof_data.push(if age >= 21 { 1 } else { 0 });
            }
        }

        let zk_proof = self.generate_zk_proof(&proof_data, request.challenge.as_ref()).await?;
        let verification_key = self.generate_verification_key(&proof_data).await?;
        
        Ok((zk_proof, verification_key, PrivacyLevel::Restricted))
    }

    /// Generate identity proof
    async fn generate_identity_proof(
        &self,
        identity: &ZhtpIdentity,
        request: &ProofGenerationRequest,
    ) -> Result<(Vec<u8>, Vec<u8>, PrivacyLevel), Box<dyn std::error::Error>> {
        // Identity proof using signature and ownership
        let mut proof_data = Vec::new();
        
        // Include identity public key
        proof_data.extend_from_slice(&identity.public_key.as_bytes());
        
        // Include required identity attributes
        for attr in &request.required_attributes {
            if let Some(value) = identity.metadata.get(attr) {
                proof_data.extend_from_slice(value.as_bytes());
            }
        }

        // Add challenge if provided
        if let Some(challenge) = &request.challenge {
            proof_data.extend_from_slice(challenge);
        }

        let zk_proof = self.generate_zk_proof(&proof_data, request.challenge.as_ref()).await?;
        let verification_key = self.generate_verification_key(&proof_data).await?;
        
        Ok((zk_proof, verification_key, PrivacyLevel::Confidential))
    }

    /// Generate qualification proof
    async fn generate_qualification_proof(
        &self,
        identity: &ZhtpIdentity,
        _request: &ProofGenerationRequest,
    ) -> Result<(Vec<u8>, Vec<u8>, PrivacyLevel), Box<dyn std::error::Error>> {
        // Simplified qualification proof
        let proof_data = format!("qualification_proof_for_{}", identity.id).into_bytes();
        let zk_proof = self.generate_zk_proof(&proof_data, None).await?;
        let verification_key = self.generate_verification_key(&proof_data).await?;
        
        Ok((zk_proof, verification_key, PrivacyLevel::Restricted))
    }

    /// Generate residence proof
    async fn generate_residence_proof(
        &self,
        identity: &ZhtpIdentity,
        _request: &ProofGenerationRequest,
    ) -> Result<(Vec<u8>, Vec<u8>, PrivacyLevel), Box<dyn std::error::Error>> {
        // Simplified residence proof
        let proof_data = format!("residence_proof_for_{}", identity.id).into_bytes();
        let zk_proof = self.generate_zk_proof(&proof_data, None).await?;
        let verification_key = self.generate_verification_key(&proof_data).await?;
        
        Ok((zk_proof, verification_key, PrivacyLevel::Restricted))
    }

    /// Generate ownership proof
    async fn generate_ownership_proof(
        &self,
        identity: &ZhtpIdentity,
        request: &ProofGenerationRequest,
    ) -> Result<(Vec<u8>, Vec<u8>, PrivacyLevel), Box<dyn std::error::Error>> {
        // Ownership proof using digital signature
        let mut proof_data = Vec::new();
        proof_data.extend_from_slice(&identity.public_key.as_bytes());
        
        if let Some(challenge) = &request.challenge {
            proof_data.extend_from_slice(challenge);
        }

        let zk_proof = self.generate_zk_proof(&proof_data, request.challenge.as_ref()).await?;
        let verification_key = self.generate_verification_key(&proof_data).await?;
        
        Ok((zk_proof, verification_key, PrivacyLevel::Confidential))
    }

    /// Generate ZK proof (simplified implementation)
    async fn generate_zk_proof(&self, data: &[u8], challenge: Option<&Vec<u8>>) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        // In implementation, would use actual ZK proof system
        use sha2::{Sha256, Digest};
        
        let mut hasher = Sha256::new();
        hasher.update(data);
        
        if let Some(challenge) = challenge {
            hasher.update(challenge);
        }
        
        hasher.update(b"zk_proof_salt");
        
        Ok(hasher.finalize().to_vec())
    }

    /// Generate verification key
    async fn generate_verification_key(&self, data: &[u8]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        use sha2::{Sha256, Digest};
        
        let mut hasher = Sha256::new();
        hasher.update(data);
        hasher.update(b"verification_key_salt");
        
        Ok(hasher.finalize().to_vec())
    }

    /// Check if privacy levels are compatible
    fn is_privacy_level_compatible(&self, provided: &PrivacyLevel, required: &PrivacyLevel) -> bool {
        let provided_level = self.privacy_level_to_number(provided);
        let required_level = self.privacy_level_to_number(required);
        provided_level >= required_level
    }

    /// Convert privacy level to number for comparison
    fn privacy_level_to_number(&self, level: &PrivacyLevel) -> u8 {
        match level {
            PrivacyLevel::Public => 0,
            PrivacyLevel::Restricted => 1,
            PrivacyLevel::Confidential => 2,
            PrivacyLevel::Secret => 3,
            PrivacyLevel::TopSecret => 4,
        }
    }

    /// Generate cache key for proof
    fn generate_cache_key(&self, request: &ProofGenerationRequest) -> String {
        use sha2::{Sha256, Digest};
        
        let mut hasher = Sha256::new();
        hasher.update(request.proof_type.as_bytes());
        hasher.update(request.identity_id.as_bytes());
        hasher.update(serde_json::to_string(&request.required_attributes).unwrap_or_default().as_bytes());
        
        if let Some(ref selective) = request.selective_disclosure {
            hasher.update(serde_json::to_string(selective).unwrap_or_default().as_bytes());
        }
        
        format!("{:x}", hasher.finalize())
    }

    /// Cache generated proof
    fn cache_proof(&mut self, request: &ProofGenerationRequest, result: &ProofGenerationResult) {
        let cache_key = self.generate_cache_key(request);
        
        let cached_proof = CachedProof {
            proof_id: result.proof_id.clone(),
            proof_type: result.proof_type.clone(),
            identity_id: request.identity_id.clone(),
            proof_data: result.proof_data.clone(),
            metadata: result.metadata.clone(),
            generated_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_secs(),
            expires_at: result.validity_expires_at,
            usage_count: 0,
        };
        
        self.proof_cache.insert(cache_key, cached_proof);
    }

    /// Update generation statistics
    fn update_generation_stats(&mut self, generation_time_ms: f64, success: bool) {
        if success {
            self.generation_stats.successful_generations += 1;
        } else {
            self.generation_stats.failed_generations += 1;
        }

        // Update average generation time
        let total_generations = self.generation_stats.total_proofs_generated as f64;
        self.generation_stats.average_generation_time_ms = 
            (self.generation_stats.average_generation_time_ms * (total_generations - 1.0) + generation_time_ms) / total_generations;
    }

    /// Initialize default proof types
    fn initialize_proof_types() -> HashMap<String, ProofTypeDefinition> {
        let mut proof_types = HashMap::new();

        proof_types.insert("citizenship_proof".to_string(), ProofTypeDefinition {
            proof_type: "citizenship_proof".to_string(),
            name: "Citizenship Proof".to_string(),
            description: "Zero-knowledge proof of citizenship status".to_string(),
            required_inputs: vec!["nationality".to_string(), "residence".to_string()],
            privacy_level: PrivacyLevel::Confidential,
            complexity_level: ComplexityLevel::Advanced,
            validity_duration_hours: 24,
            supports_selective_disclosure: true,
        });

        proof_types.insert("age_proof".to_string(), ProofTypeDefinition {
            proof_type: "age_proof".to_string(),
            name: "Age Verification Proof".to_string(),
            description: "Range proof for age verification without revealing exact age".to_string(),
            required_inputs: vec!["date_of_birth".to_string()],
            privacy_level: PrivacyLevel::Restricted,
            complexity_level: ComplexityLevel::Standard,
            validity_duration_hours: 168, // 1 week
            supports_selective_disclosure: true,
        });

        proof_types.insert("identity_proof".to_string(), ProofTypeDefinition {
            proof_type: "identity_proof".to_string(),
            name: "Identity Ownership Proof".to_string(),
            description: "Cryptographic proof of identity ownership".to_string(),
            required_inputs: vec!["public_key".to_string()],
            privacy_level: PrivacyLevel::Confidential,
            complexity_level: ComplexityLevel::Complex,
            validity_duration_hours: 1,
            supports_selective_disclosure: false,
        });

        proof_types.insert("qualification_proof".to_string(), ProofTypeDefinition {
            proof_type: "qualification_proof".to_string(),
            name: "Qualification Proof".to_string(),
            description: "Proof of educational or professional qualifications".to_string(),
            required_inputs: vec!["qualifications".to_string()],
            privacy_level: PrivacyLevel::Restricted,
            complexity_level: ComplexityLevel::Standard,
            validity_duration_hours: 720, // 30 days
            supports_selective_disclosure: true,
        });

        proof_types
    }

    /// Get generation statistics
    pub fn get_generation_stats(&self) -> &ProofGenerationStats {
        &self.generation_stats
    }

    /// Clear proof cache
    pub fn clear_cache(&mut self) {
        self.proof_cache.clear();
    }

    /// Get available proof types
    pub fn get_proof_types(&self) -> Vec<&ProofTypeDefinition> {
        self.proof_types.values().collect()
    }
}

impl Default for ProofGenerator {
    fn default() -> Self {
        Self::new()
    }
}
