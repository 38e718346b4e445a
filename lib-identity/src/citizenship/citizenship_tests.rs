//! Comprehensive tests for the citizenship system

use super::*;
use lib_crypto::Hash;
use crate::types::*;
use std::collections::HashMap;

// Mock types for testing citizenship system
#[derive(Debug, Clone)]
pub struct CitizenshipManager {
    citizens: HashMap<Hash, CitizenshipRecord>,
    total_registrations: u64,
}

#[derive(Debug, Clone)]
pub struct CitizenshipRecord {
    pub citizenship_id: Hash,
    pub identity_id: Hash,
    pub verification_data: CitizenshipVerificationData,
    pub status: CitizenshipStatus,
    pub registration_timestamp: u64,
    pub last_updated: u64,
}

#[derive(Debug, Clone)]
pub struct CitizenshipVerificationData {
    pub biometric_hash: Hash,
    pub document_hashes: Vec<Hash>,
    pub verification_level: CitizenshipVerificationLevel,
    pub verification_timestamp: u64,
    pub issuing_authority: String,
    pub additional_metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CitizenshipStatus {
    Active,
    Suspended,
    Revoked,
    Pending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CitizenshipVerificationLevel {
    Basic,
    Privacy,
    Complete,
}

#[derive(Debug, Clone)]
pub struct CitizenshipVerification {
    pub is_valid: bool,
    pub is_active: bool,
    pub verification_level: CitizenshipVerificationLevel,
    pub verification_hash: Hash,
    pub timestamp: u64,
}

#[derive(Debug, Clone)]
pub struct CitizenshipMetrics {
    pub total_citizens: usize,
    pub active_citizens: usize,
    pub suspended_citizens: usize,
    pub revoked_citizens: usize,
    pub total_registrations: u64,
}

impl CitizenshipManager {
    pub fn new() -> Self {
        Self {
            citizens: HashMap::new(),
            total_registrations: 0,
        }
    }

    pub fn register_citizen(
        &mut self,
        identity_id: &Hash,
        verification_data: CitizenshipVerificationData,
    ) -> anyhow::Result<Hash> {
        if self.citizens.contains_key(identity_id) {
            return Err(anyhow::anyhow!("Identity already registered as citizen"));
        }

        let citizenship_id = Hash::from_bytes(&lib_crypto::hash_blake3(&[
            identity_id.as_bytes(),
            &verification_data.verification_timestamp.to_le_bytes(),
            b"citizenship_registration",
        ].concat()));

        let record = CitizenshipRecord {
            citizenship_id: citizenship_id.clone(),
            identity_id: identity_id.clone(),
            verification_data,
            status: CitizenshipStatus::Active,
            registration_timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_secs(),
            last_updated: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_secs(),
        };

        self.citizens.insert(identity_id.clone(), record);
        self.total_registrations += 1;

        Ok(citizenship_id)
    }

    pub fn is_citizen(&self, identity_id: &Hash) -> bool {
        self.citizens.contains_key(identity_id)
    }

    pub fn get_citizenship_record(&self, identity_id: &Hash) -> Option<&CitizenshipRecord> {
        self.citizens.get(identity_id)
    }

    pub fn verify_citizenship(&self, identity_id: &Hash) -> anyhow::Result<CitizenshipVerification> {
        let record = self.citizens.get(identity_id)
            .ok_or_else(|| anyhow::anyhow!("Citizenship record not found"))?;

        let verification_hash = Hash::from_bytes(&lib_crypto::hash_blake3(&[
            identity_id.as_bytes(),
            &record.citizenship_id.as_bytes(),
            &record.registration_timestamp.to_le_bytes(),
        ].concat()));

        Ok(CitizenshipVerification {
            is_valid: true,
            is_active: record.status == CitizenshipStatus::Active,
            verification_level: record.verification_data.verification_level.clone(),
            verification_hash,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_secs(),
        })
    }

    pub fn get_citizenship_metrics(&self) -> CitizenshipMetrics {
        let mut active = 0;
        let mut suspended = 0;
        let mut revoked = 0;

        for record in self.citizens.values() {
            match record.status {
                CitizenshipStatus::Active => active += 1,
                CitizenshipStatus::Suspended => suspended += 1,
                CitizenshipStatus::Revoked => revoked += 1,
                CitizenshipStatus::Pending => {},
            }
        }

        CitizenshipMetrics {
            total_citizens: self.citizens.len(),
            active_citizens: active,
            suspended_citizens: suspended,
            revoked_citizens: revoked,
            total_registrations: self.total_registrations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_manager() -> CitizenshipManager {
        CitizenshipManager::new()
    }

    fn create_test_identity() -> Hash {
        Hash([1u8; 32])
    }

    fn create_test_verification_data() -> CitizenshipVerificationData {
        CitizenshipVerificationData {
            biometric_hash: Hash([2u8; 32]),
            document_hashes: vec![Hash([3u8; 32])],
            verification_level: CitizenshipVerificationLevel::Complete,
            verification_timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_secs(),
            issuing_authority: "Test Authority".to_string(),
            additional_metadata: HashMap::new(),
        }
    }

    #[test]
    fn test_register_citizen() {
        let mut manager = create_test_manager();
        let identity_id = create_test_identity();
        let verification_data = create_test_verification_data();

        let citizenship_id = manager.register_citizen(&identity_id, verification_data).unwrap();

        assert!(!citizenship_id.0.is_empty());
        assert!(manager.is_citizen(&identity_id));
        
        let record = manager.get_citizenship_record(&identity_id).unwrap();
        assert_eq!(record.identity_id, identity_id);
        assert_eq!(record.status, CitizenshipStatus::Active);
    }

    #[test]
    fn test_verify_citizenship() {
        let mut manager = create_test_manager();
        let identity_id = create_test_identity();
        let verification_data = create_test_verification_data();

        manager.register_citizen(&identity_id, verification_data).unwrap();

        let verification = manager.verify_citizenship(&identity_id).unwrap();
        assert!(verification.is_valid);
        assert!(verification.is_active);
        assert!(!verification.verification_hash.0.is_empty());
    }

    #[test]
    fn test_citizenship_metrics() {
        let mut manager = create_test_manager();
        
        // Register multiple citizens
        for i in 0..3 {
            let identity_id = Hash([i as u8; 32]);
            let verification_data = create_test_verification_data();
            manager.register_citizen(&identity_id, verification_data).unwrap();
        }

        let metrics = manager.get_citizenship_metrics();
        assert_eq!(metrics.total_citizens, 3);
        assert_eq!(metrics.active_citizens, 3);
        assert_eq!(metrics.total_registrations, 3);
    }

    #[test]
    fn test_duplicate_citizen_registration() {
        let mut manager = create_test_manager();
        let identity_id = create_test_identity();
        let verification_data = create_test_verification_data();

        // First registration should succeed
        manager.register_citizen(&identity_id, verification_data.clone()).unwrap();

        // Second registration should fail
        let result = manager.register_citizen(&identity_id, verification_data);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("already registered"));
    }

    #[test]
    fn test_non_citizen_verification() {
        let manager = create_test_manager();
        let non_citizen_id = Hash([99u8; 32]);

        let result = manager.verify_citizenship(&non_citizen_id);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }
}
