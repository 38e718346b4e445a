//! UBI amount calculation based on treasury allocation
//! 
//! Calculates Universal Basic Income amounts based on available
//! treasury funds and citizen eligibility.

use anyhow::Result;
use crate::wasm::IdentityId;
use crate::treasury_economics::DaoTreasury;

/// Calculate UBI amount per citizen
pub fn calculate_ubi_amount(
    treasury: &DaoTreasury,
    verified_citizens: &[IdentityId],
) -> Result<u64> {
    if verified_citizens.is_empty() {
        return Ok(0);
    }
    
    treasury.calculate_ubi_per_citizen(verified_citizens.len() as u64);
    Ok(treasury.ubi_allocated / verified_citizens.len() as u64)
}

/// Calculate total UBI distribution required
pub fn calculate_total_ubi_distribution(
    ubi_per_citizen: u64,
    citizen_count: u64,
) -> u64 {
    ubi_per_citizen * citizen_count
}

/// Verify UBI eligibility for citizens
pub fn verify_ubi_eligibility(citizens: &[IdentityId]) -> Vec<IdentityId> {
    // In implementation, this would check identity verification status
    // For now, assume all provided citizens are verified
    citizens.to_vec()
}
