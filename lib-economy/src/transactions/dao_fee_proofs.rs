//! DAO fee proof generation and verification
//! 
//! Provides cryptographic proofs for DAO fee calculations to ensure transparency.

use crate::wasm::hash_blake3;

/// Generate a DAO fee proof for transparency
pub fn generate_dao_fee_proof(dao_fee: u64, timestamp: u64, tx_amount: u64) -> [u8; 32] {
    let proof_data = format!("dao_fee_proof_{}_{}_{}", dao_fee, timestamp, tx_amount);
    hash_blake3(proof_data.as_bytes())
}

/// Verify a DAO fee proof
pub fn verify_dao_fee_proof(
    proof: &[u8; 32],
    dao_fee: u64,
    timestamp: u64,
    tx_amount: u64,
) -> bool {
    let expected_proof = generate_dao_fee_proof(dao_fee, timestamp, tx_amount);
    proof == &expected_proof
}

/// Generate UBI transparency proof
pub fn generate_ubi_transparency_proof(
    total_dao_fees: u64,
    ubi_distributed: u64,
    citizen_count: u64,
) -> [u8; 32] {
    let proof_data = format!("ubi_transparency_{}_{}_{}",
        total_dao_fees, ubi_distributed, citizen_count);
    hash_blake3(proof_data.as_bytes())
}

/// Verify UBI distribution transparency
pub fn verify_ubi_distribution_proof(
    proof: &[u8; 32],
    total_dao_fees: u64,
    ubi_distributed: u64,
    citizen_count: u64,
) -> bool {
    let expected_proof = generate_ubi_transparency_proof(total_dao_fees, ubi_distributed, citizen_count);
    proof == &expected_proof
}
