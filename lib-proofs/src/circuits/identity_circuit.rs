//! Identity circuit implementation for zero-knowledge identity proofs
//! 
//! Implements cryptographic circuits for identity verification with privacy
//! preservation, based on the original ZHTP implementation

use anyhow::Result;
use serde::{Serialize, Deserialize};
use lib_crypto::hashing::hash_blake3;
use crate::plonky2::{Plonky2Proof, ZkProofSystem};

/// Identity circuit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityCircuitConfig {
    /// Maximum number of attributes
    pub max_attributes: u32,
    /// Minimum age requirement
    pub min_age: u64,
    /// Required jurisdiction (0 = no requirement)
    pub required_jurisdiction: u64,
    /// Biometric verification enabled
    pub biometric_verification: bool,
}

impl Default for IdentityCircuitConfig {
    fn default() -> Self {
        Self {
            max_attributes: 16,
            min_age: 18,
            required_jurisdiction: 0,
            biometric_verification: true,
        }
    }
}

/// Identity circuit witness data
#[derive(Debug, Clone)]
pub struct IdentityWitness {
    /// Secret identity key
    pub identity_secret: u64,
    /// Age value
    pub age: u64,
    /// Jurisdiction hash
    pub jurisdiction_hash: u64,
    /// Credential hash
    pub credential_hash: u64,
    /// Biometric commitment (optional)
    pub biometric_commitment: Option<[u8; 32]>,
    /// Additional attributes
    pub attributes: Vec<(String, u64)>,
}

/// Identity circuit public inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityPublicInputs {
    /// Minimum age requirement
    pub min_age: u64,
    /// Required jurisdiction (0 = no requirement)
    pub required_jurisdiction: u64,
    /// Public identity commitment
    pub identity_commitment: [u8; 32],
    /// Revealed attribute hashes
    pub revealed_attributes: Vec<[u8; 32]>,
}

/// Identity circuit implementation
pub struct IdentityCircuit {
    /// Circuit configuration
    config: IdentityCircuitConfig,
    /// Compiled circuit constraints
    constraints: Vec<u8>,
}

impl IdentityCircuit {
    /// Create a new identity circuit
    pub fn new(config: IdentityCircuitConfig) -> Result<Self> {
        let constraints = Self::compile_constraints(&config)?;
        Ok(Self {
            config,
            constraints,
        })
    }

    /// Create circuit with default configuration
    pub fn default() -> Result<Self> {
        Self::new(IdentityCircuitConfig::default())
    }

    /// Compile circuit constraints based on configuration
    fn compile_constraints(config: &IdentityCircuitConfig) -> Result<Vec<u8>> {
        let mut constraints = Vec::new();
        
        // Constraint 1: Age verification
        constraints.extend_from_slice(b"AGE_CONSTRAINT:");
        constraints.extend_from_slice(&config.min_age.to_le_bytes());
        
        // Constraint 2: Jurisdiction requirement
        constraints.extend_from_slice(b"JURISDICTION_CONSTRAINT:");
        constraints.extend_from_slice(&config.required_jurisdiction.to_le_bytes());
        
        // Constraint 3: Identity commitment validity
        constraints.extend_from_slice(b"IDENTITY_COMMITMENT:");
        constraints.extend_from_slice(&[1, 0, 1, 0]); // Commitment validation coefficients
        
        // Constraint 4: Attribute bounds
        constraints.extend_from_slice(b"ATTRIBUTE_BOUNDS:");
        constraints.extend_from_slice(&config.max_attributes.to_le_bytes());
        
        // Constraint 5: Biometric verification (if enabled)
        if config.biometric_verification {
            constraints.extend_from_slice(b"BIOMETRIC_VERIFICATION:");
            constraints.extend_from_slice(&[1, 1, 0, 1]); // Biometric validation coefficients
        }
        
        Ok(constraints)
    }

    /// Generate proof for identity with witness data
    pub fn prove(&self, witness: IdentityWitness) -> Result<Plonky2Proof> {
        // Validate witness against circuit constraints
        self.validate_witness(&witness)?;
        
        // Create ZK proof system instance
        let zk_system = ZkProofSystem::new()?;
        
        // Generate the identity proof using the witness
        zk_system.prove_identity(
            witness.identity_secret,
            witness.age,
            witness.jurisdiction_hash,
            witness.credential_hash,
            self.config.min_age,
            self.config.required_jurisdiction,
            1, // default verification level
        )
    }

    /// Verify an identity proof
    pub fn verify(&self, proof: &Plonky2Proof, public_inputs: &IdentityPublicInputs) -> Result<bool> {
        // Validate public inputs
        self.validate_public_inputs(public_inputs)?;
        
        // Create ZK proof system instance
        let zk_system = ZkProofSystem::new()?;
        
        // Verify the proof
        zk_system.verify_identity(proof)
    }

    /// Validate witness data against circuit constraints
    fn validate_witness(&self, witness: &IdentityWitness) -> Result<()> {
        // Check age requirement
        if witness.age < self.config.min_age {
            return Err(anyhow::anyhow!("Age {} below minimum {}", witness.age, self.config.min_age));
        }
        
        // Check jurisdiction requirement
        if self.config.required_jurisdiction != 0 && 
           witness.jurisdiction_hash != self.config.required_jurisdiction {
            return Err(anyhow::anyhow!("Jurisdiction requirement not met"));
        }
        
        // Check attribute count
        if witness.attributes.len() > self.config.max_attributes as usize {
            return Err(anyhow::anyhow!("Too many attributes: {} > {}", 
                witness.attributes.len(), self.config.max_attributes));
        }
        
        // Check biometric verification if required
        if self.config.biometric_verification && witness.biometric_commitment.is_none() {
            return Err(anyhow::anyhow!("Biometric commitment required"));
        }
        
        Ok(())
    }

    /// Validate public inputs
    fn validate_public_inputs(&self, inputs: &IdentityPublicInputs) -> Result<()> {
        // Check minimum age matches circuit configuration
        if inputs.min_age != self.config.min_age {
            return Err(anyhow::anyhow!("Public input age mismatch"));
        }
        
        // Check jurisdiction requirement matches
        if inputs.required_jurisdiction != self.config.required_jurisdiction {
            return Err(anyhow::anyhow!("Public input jurisdiction mismatch"));
        }
        
        // Validate identity commitment is not zero
        if inputs.identity_commitment.iter().all(|&b| b == 0) {
            return Err(anyhow::anyhow!("Invalid zero identity commitment"));
        }
        
        Ok(())
    }

    /// Get circuit configuration
    pub fn config(&self) -> &IdentityCircuitConfig {
        &self.config
    }

    /// Get compiled constraints
    pub fn constraints(&self) -> &[u8] {
        &self.constraints
    }

    /// Generate identity commitment from witness
    pub fn generate_identity_commitment(witness: &IdentityWitness) -> [u8; 32] {
        let mut commitment_data = Vec::new();
        commitment_data.extend_from_slice(&witness.identity_secret.to_le_bytes());
        commitment_data.extend_from_slice(&witness.credential_hash.to_le_bytes());
        
        // Add biometric data if available
        if let Some(biometric) = witness.biometric_commitment {
            commitment_data.extend_from_slice(&biometric);
        }
        
        // Add attribute hashes
        for (key, value) in &witness.attributes {
            let attr_data = [key.as_bytes(), &value.to_le_bytes()].concat();
            let attr_hash = hash_blake3(&attr_data);
            commitment_data.extend_from_slice(&attr_hash);
        }
        
        hash_blake3(&commitment_data)
    }

    /// Create selective disclosure proof
    pub fn prove_selective_disclosure(
        &self,
        witness: IdentityWitness,
        revealed_attributes: &[String],
    ) -> Result<(Plonky2Proof, IdentityPublicInputs)> {
        // Generate identity commitment
        let identity_commitment = Self::generate_identity_commitment(&witness);
        
        // Create revealed attribute hashes
        let mut revealed_hashes = Vec::new();
        for attr_name in revealed_attributes {
            if let Some((_, value)) = witness.attributes.iter().find(|(k, _)| k == attr_name) {
                let attr_data = [attr_name.as_bytes(), &value.to_le_bytes()].concat();
                revealed_hashes.push(hash_blake3(&attr_data));
            }
        }
        
        // Create public inputs
        let public_inputs = IdentityPublicInputs {
            min_age: self.config.min_age,
            required_jurisdiction: self.config.required_jurisdiction,
            identity_commitment,
            revealed_attributes: revealed_hashes,
        };
        
        // Generate proof
        let proof = self.prove(witness)?;
        
        Ok((proof, public_inputs))
    }
}

/// Batch identity verification
pub struct BatchIdentityVerifier {
    circuit: IdentityCircuit,
}

impl BatchIdentityVerifier {
    /// Create a new batch verifier
    pub fn new(config: IdentityCircuitConfig) -> Result<Self> {
        let circuit = IdentityCircuit::new(config)?;
        Ok(Self { circuit })
    }

    /// Verify multiple identity proofs in batch
    pub fn verify_batch(
        &self,
        proofs: &[(Plonky2Proof, IdentityPublicInputs)],
    ) -> Result<Vec<bool>> {
        let mut results = Vec::with_capacity(proofs.len());
        
        for (proof, public_inputs) in proofs {
            let result = self.circuit.verify(proof, public_inputs)?;
            results.push(result);
        }
        
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_circuit_creation() -> Result<()> {
        let config = IdentityCircuitConfig::default();
        let circuit = IdentityCircuit::new(config)?;
        assert!(!circuit.constraints().is_empty());
        Ok(())
    }

    #[test]
    fn test_witness_validation() -> Result<()> {
        let circuit = IdentityCircuit::default()?;
        
        let valid_witness = IdentityWitness {
            identity_secret: 12345,
            age: 25,
            jurisdiction_hash: 840,
            credential_hash: 9999,
            biometric_commitment: Some([1u8; 32]),
            attributes: vec![
                ("name".to_string(), 123),
                ("country".to_string(), 840),
            ],
        };
        
        assert!(circuit.validate_witness(&valid_witness).is_ok());
        Ok(())
    }

    #[test]
    fn test_identity_commitment_generation() -> Result<()> {
        let witness = IdentityWitness {
            identity_secret: 12345,
            age: 25,
            jurisdiction_hash: 840,
            credential_hash: 9999,
            biometric_commitment: Some([1u8; 32]),
            attributes: vec![
                ("name".to_string(), 123),
            ],
        };
        
        let commitment = IdentityCircuit::generate_identity_commitment(&witness);
        assert_ne!(commitment, [0u8; 32]);
        
        // Same witness should produce same commitment
        let commitment2 = IdentityCircuit::generate_identity_commitment(&witness);
        assert_eq!(commitment, commitment2);
        
        Ok(())
    }

    #[test]
    fn test_selective_disclosure() -> Result<()> {
        let circuit = IdentityCircuit::default()?;
        
        let witness = IdentityWitness {
            identity_secret: 12345,
            age: 25,
            jurisdiction_hash: 840,
            credential_hash: 9999,
            biometric_commitment: Some([1u8; 32]),
            attributes: vec![
                ("name".to_string(), 123),
                ("country".to_string(), 840),
                ("age".to_string(), 25),
            ],
        };
        
        let revealed = vec!["name".to_string(), "country".to_string()];
        let (proof, public_inputs) = circuit.prove_selective_disclosure(witness, &revealed)?;
        
        assert_eq!(public_inputs.revealed_attributes.len(), 2);
        assert!(circuit.verify(&proof, &public_inputs)?);
        
        Ok(())
    }

    #[test]
    fn test_batch_verification() -> Result<()> {
        let config = IdentityCircuitConfig::default();
        let verifier = BatchIdentityVerifier::new(config)?;
        
        // For this test, we'll create empty proofs since we can't easily generate ones
        let proofs = vec![];
        let results = verifier.verify_batch(&proofs)?;
        assert!(results.is_empty());
        
        Ok(())
    }
}
