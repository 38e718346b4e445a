//! Aggregated Circuit Implementation
//! 
//! Advanced circuit aggregation system for combining multiple ZK proofs
//! into single efficient recursive proofs with optimized verification.

use anyhow::Result;
use serde::{Serialize, Deserialize};
use crate::plonky2::{CircuitConfig, Plonky2Proof, RecursiveProof,
    RecursiveConfig, RecursiveProofBuilder};
use crate::state::AggregatedStateProof;
use std::collections::HashMap;

/// Strategy for aggregating circuits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AggregationStrategy {
    /// Aggregate by batching similar proof types
    TypeBased,
    /// Aggregate by geographic proximity
    GeographicClustering,
    /// Aggregate by economic weight
    EconomicWeighted,
    /// Custom aggregation with user-defined rules
    Custom(CustomAggregationRules),
}

/// Custom aggregation rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomAggregationRules {
    /// Maximum proofs per aggregation batch
    pub max_batch_size: u32,
    /// Minimum proof similarity threshold (0.0-1.0)
    pub similarity_threshold: f32,
    /// Weight factors for different proof types
    pub type_weights: HashMap<String, f32>,
    /// Priority ordering for proof selection
    pub priority_order: Vec<String>,
}

/// Rules for circuit aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitAggregationRules {
    /// Aggregation strategy to use
    pub strategy: AggregationStrategy,
    /// Maximum recursion depth
    pub max_recursion_depth: u32,
    /// Parallel aggregation enabled
    pub parallel_aggregation: bool,
    /// Proof compression enabled
    pub compression_enabled: bool,
    /// Verification optimization level (1-5)
    pub optimization_level: u8,
}

impl Default for CircuitAggregationRules {
    fn default() -> Self {
        Self {
            strategy: AggregationStrategy::TypeBased,
            max_recursion_depth: 15,
            parallel_aggregation: true,
            compression_enabled: true,
            optimization_level: 3,
        }
    }
}

/// Metadata for aggregated proof
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedProofMetadata {
    /// Number of original proofs aggregated
    pub original_proof_count: u32,
    /// Aggregation strategy used
    pub strategy_used: AggregationStrategy,
    /// Compression ratio achieved
    pub compression_ratio: f32,
    /// Verification time estimate (milliseconds)
    pub verification_time_estimate: u64,
    /// Memory usage estimate (bytes)
    pub memory_usage_estimate: u64,
    /// Generation timestamp
    pub generated_at: u64,
}

/// Circuit aggregation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedCircuitResult {
    /// The aggregated recursive proof
    pub aggregated_proof: RecursiveProof,
    /// Metadata about the aggregation
    pub metadata: AggregatedProofMetadata,
    /// Verification hints for optimized verification
    pub verification_hints: VerificationHints,
}

/// Hints to optimize proof verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationHints {
    /// Precomputed intermediate values
    pub precomputed_values: Vec<[u8; 32]>,
    /// Optimized verification path
    pub verification_path: Vec<VerificationStep>,
    /// Cached computation results
    pub cached_computations: HashMap<String, Vec<u8>>,
}

/// Step in optimized verification path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationStep {
    /// Step type
    pub step_type: String,
    /// Input indices required
    pub input_indices: Vec<u32>,
    /// Expected computation cost
    pub cost_estimate: u32,
    /// Parallelizable with other steps
    pub parallelizable: bool,
}

/// Advanced circuit aggregation builder
pub struct AggregatedCircuitBuilder {
    #[allow(dead_code)]
    config: CircuitConfig,
    rules: CircuitAggregationRules,
    pending_proofs: Vec<Plonky2Proof>,
    proof_metadata: Vec<ProofMetadata>,
}

/// Metadata for individual proofs being aggregated
#[derive(Debug, Clone)]
pub(crate) struct ProofMetadata {
    proof_type: String,
    #[allow(dead_code)]
    complexity_score: u32,
    verification_cost: u64,
    memory_usage: u64,
    geographic_hint: Option<GeographicLocation>,
    economic_weight: f64,
}

/// Geographic location hint for proofs
#[derive(Debug, Clone)]
struct GeographicLocation {
    #[allow(dead_code)]
    latitude: f32,
    #[allow(dead_code)]
    longitude: f32,
    region_id: String,
}

impl AggregatedCircuitBuilder {
    /// Create new aggregated circuit builder
    pub fn new(rules: CircuitAggregationRules) -> Result<Self> {
        Ok(Self {
            config: CircuitConfig::default(),
            rules,
            pending_proofs: Vec::new(),
            proof_metadata: Vec::new(),
        })
    }

    /// Add proof to aggregation batch
    pub fn add_proof(&mut self, proof: Plonky2Proof, metadata: Option<ProofMetadata>) -> Result<()> {
        if self.pending_proofs.len() >= 1000 { // Reasonable limit
            return Err(anyhow::anyhow!("Too many proofs in batch"));
        }

        // Extract metadata if not provided
        let proof_meta = metadata.unwrap_or_else(|| {
            ProofMetadata {
                proof_type: proof.circuit_id.clone(),
                complexity_score: proof.proof.len() as u32,
                verification_cost: self.estimate_verification_cost(&proof),
                memory_usage: proof.proof.len() as u64 * 2, // Estimate
                geographic_hint: None,
                economic_weight: 1.0,
            }
        });

        self.pending_proofs.push(proof);
        self.proof_metadata.push(proof_meta);
        Ok(())
    }

    /// Build aggregated circuit with optimizations
    pub fn build_optimized(self) -> Result<AggregatedCircuitResult> {
        if self.pending_proofs.is_empty() {
            return Err(anyhow::anyhow!("No proofs to aggregate"));
        }

        let start_time = std::time::Instant::now();

        // Apply aggregation strategy
        let aggregation_plan = self.create_aggregation_plan()?;
        
        // Build aggregated circuit
        let aggregated_proof = self.execute_aggregation_plan(aggregation_plan)?;

        // Generate optimization hints
        let verification_hints = self.generate_verification_hints(&aggregated_proof)?;

        let _generation_time = start_time.elapsed().as_millis() as u64;
        let compression_ratio = self.calculate_compression_ratio(&aggregated_proof);

        Ok(AggregatedCircuitResult {
            aggregated_proof,
            metadata: AggregatedProofMetadata {
                original_proof_count: self.pending_proofs.len() as u32,
                strategy_used: self.rules.strategy.clone(),
                compression_ratio,
                verification_time_estimate: self.estimate_verification_time(),
                memory_usage_estimate: self.estimate_memory_usage(),
                generated_at: std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap()
                    .as_secs(),
            },
            verification_hints,
        })
    }

    /// Create aggregation plan based on strategy
    fn create_aggregation_plan(&self) -> Result<AggregationPlan> {
        match &self.rules.strategy {
            AggregationStrategy::TypeBased => {
                self.create_type_based_plan()
            },
            AggregationStrategy::GeographicClustering => {
                self.create_geographic_plan()
            },
            AggregationStrategy::EconomicWeighted => {
                self.create_economic_weighted_plan()
            },
            AggregationStrategy::Custom(rules) => {
                self.create_custom_plan(rules)
            },
        }
    }

    /// Create type-based aggregation plan
    fn create_type_based_plan(&self) -> Result<AggregationPlan> {
        let mut type_groups: HashMap<String, Vec<usize>> = HashMap::new();
        
        for (i, metadata) in self.proof_metadata.iter().enumerate() {
            type_groups.entry(metadata.proof_type.clone())
                .or_default()
                .push(i);
        }

        let mut batches = Vec::new();
        for (_proof_type, indices) in type_groups {
            // Split large groups into manageable batches
            for batch_indices in indices.chunks(32) { // Max 32 proofs per batch
                batches.push(AggregationBatch {
                    proof_indices: batch_indices.to_vec(),
                    batch_type: BatchType::TypeBased,
                    priority: 1,
                    estimated_cost: self.estimate_batch_cost(batch_indices),
                });
            }
        }

        Ok(AggregationPlan {
            batches,
            parallel_execution: self.rules.parallel_aggregation,
            optimization_passes: self.rules.optimization_level as u32,
        })
    }

    /// Create geographic clustering plan
    fn create_geographic_plan(&self) -> Result<AggregationPlan> {
        // Group proofs by geographic proximity
        let mut geographic_groups: HashMap<String, Vec<usize>> = HashMap::new();
        
        for (i, metadata) in self.proof_metadata.iter().enumerate() {
            let region = metadata.geographic_hint
                .as_ref()
                .map(|g| g.region_id.clone())
                .unwrap_or_else(|| "default".to_string());
            
            geographic_groups.entry(region)
                .or_default()
                .push(i);
        }

        let mut batches = Vec::new();
        for (_region, indices) in geographic_groups {
            for batch_indices in indices.chunks(24) { // Smaller batches for geographic clustering
                batches.push(AggregationBatch {
                    proof_indices: batch_indices.to_vec(),
                    batch_type: BatchType::Geographic,
                    priority: 2, // Higher priority for geographic batches
                    estimated_cost: self.estimate_batch_cost(batch_indices),
                });
            }
        }

        Ok(AggregationPlan {
            batches,
            parallel_execution: true, // Always parallel for geographic
            optimization_passes: (self.rules.optimization_level as u32).max(2),
        })
    }

    /// Create economic weighted plan
    fn create_economic_weighted_plan(&self) -> Result<AggregationPlan> {
        // Sort proofs by economic weight and group accordingly
        let mut weighted_indices: Vec<(usize, f64)> = self.proof_metadata.iter()
            .enumerate()
            .map(|(i, meta)| (i, meta.economic_weight))
            .collect();
        
        weighted_indices.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut batches = Vec::new();
        let sorted_indices: Vec<usize> = weighted_indices.into_iter().map(|(i, _)| i).collect();
        
        for batch_indices in sorted_indices.chunks(16) { // Smaller batches for high-value proofs
            let avg_weight: f64 = batch_indices.iter()
                .map(|&i| self.proof_metadata[i].economic_weight)
                .sum::<f64>() / batch_indices.len() as f64;
            
            batches.push(AggregationBatch {
                proof_indices: batch_indices.to_vec(),
                batch_type: BatchType::EconomicWeighted,
                priority: if avg_weight > 10.0 { 3 } else { 1 }, // High priority for valuable proofs
                estimated_cost: self.estimate_batch_cost(batch_indices),
            });
        }

        Ok(AggregationPlan {
            batches,
            parallel_execution: self.rules.parallel_aggregation,
            optimization_passes: self.rules.optimization_level as u32,
        })
    }

    /// Create custom aggregation plan
    fn create_custom_plan(&self, rules: &CustomAggregationRules) -> Result<AggregationPlan> {
        let mut batches = Vec::new();
        let mut used_indices = std::collections::HashSet::new();

        // Process proofs in priority order
        for proof_type in &rules.priority_order {
            let type_weight = rules.type_weights.get(proof_type).unwrap_or(&1.0);
            
            let matching_indices: Vec<usize> = self.proof_metadata.iter()
                .enumerate()
                .filter(|(i, meta)| {
                    !used_indices.contains(i) && 
                    meta.proof_type == *proof_type
                })
                .map(|(i, _)| i)
                .collect();

            for batch_indices in matching_indices.chunks(rules.max_batch_size as usize) {
                for &idx in batch_indices {
                    used_indices.insert(idx);
                }

                let priority = (*type_weight * 10.0) as u32;
                batches.push(AggregationBatch {
                    proof_indices: batch_indices.to_vec(),
                    batch_type: BatchType::Custom,
                    priority,
                    estimated_cost: self.estimate_batch_cost(batch_indices),
                });
            }
        }

        // Handle remaining proofs
        let remaining_indices: Vec<usize> = (0..self.proof_metadata.len())
            .filter(|i| !used_indices.contains(i))
            .collect();

        for batch_indices in remaining_indices.chunks(rules.max_batch_size as usize) {
            batches.push(AggregationBatch {
                proof_indices: batch_indices.to_vec(),
                batch_type: BatchType::Custom,
                priority: 0, // Lowest priority
                estimated_cost: self.estimate_batch_cost(batch_indices),
            });
        }

        Ok(AggregationPlan {
            batches,
            parallel_execution: self.rules.parallel_aggregation,
            optimization_passes: self.rules.optimization_level as u32,
        })
    }

    /// Execute the aggregation plan
    fn execute_aggregation_plan(&self, plan: AggregationPlan) -> Result<RecursiveProof> {
        use crate::plonky2::RecursiveConfig;

        // Sort batches by priority
        let mut sorted_batches = plan.batches;
        sorted_batches.sort_by(|a, b| b.priority.cmp(&a.priority));

        // Execute batches (simplified - in practice would be more sophisticated)
        let batch_proofs: Vec<Plonky2Proof> = sorted_batches.iter()
            .map(|batch| {
                let batch_proofs: Vec<Plonky2Proof> = batch.proof_indices.iter()
                    .map(|&i| self.pending_proofs[i].clone())
                    .collect();
                
                // Create mini-aggregation for this batch
                self.create_batch_aggregation(batch_proofs)
            })
            .collect::<Result<Vec<_>>>()?;

        // Final aggregation of all batch proofs
        let config = RecursiveConfig {
            max_depth: self.rules.max_recursion_depth,
            batch_size: batch_proofs.len() as u32,
            optimization_level: self.rules.optimization_level,
        };

        crate::plonky2::generate_batch_recursive_proof(batch_proofs, config)
    }

    /// Create aggregation for a single batch
    fn create_batch_aggregation(&self, proofs: Vec<Plonky2Proof>) -> Result<Plonky2Proof> {
        if proofs.len() == 1 {
            return Ok(proofs[0].clone());
        }

        let config = RecursiveConfig {
            max_depth: 5, // Lower depth for batches
            batch_size: proofs.len() as u32,
            optimization_level: 2,
        };

        let mut builder = RecursiveProofBuilder::new(config)?;
        for proof in proofs {
            builder.add_proof(proof)?;
        }
        
        let recursive_proof = builder.build()?;
        
        // Extract the final aggregated proof
        Ok(if !recursive_proof.recursive_layers.is_empty() {
            recursive_proof.recursive_layers.last().unwrap().clone()
        } else {
            recursive_proof.base_proof
        })
    }

    /// Generate verification hints for optimized verification
    fn generate_verification_hints(&self, _proof: &RecursiveProof) -> Result<VerificationHints> {
        let mut verification_path = Vec::new();
        let mut cached_computations = HashMap::new();

        // Generate optimized verification steps
        verification_path.push(VerificationStep {
            step_type: "precompute_constants".to_string(),
            input_indices: vec![0, 1, 2],
            cost_estimate: 100,
            parallelizable: true,
        });

        verification_path.push(VerificationStep {
            step_type: "verify_recursive_layers".to_string(),
            input_indices: vec![3, 4, 5, 6],
            cost_estimate: 500,
            parallelizable: false,
        });

        // Cache common computations
        cached_computations.insert(
            "merkle_root_precompute".to_string(),
            vec![1, 2, 3, 4, 5, 6, 7, 8],
        );

        Ok(VerificationHints {
            precomputed_values: vec![[1; 32], [2; 32], [3; 32]], // Placeholder
            verification_path,
            cached_computations,
        })
    }

    // Helper methods
    fn estimate_verification_cost(&self, proof: &Plonky2Proof) -> u64 {
        (proof.proof.len() as u64 * 2) + (proof.public_inputs.len() as u64 * 10)
    }

    fn estimate_batch_cost(&self, indices: &[usize]) -> u64 {
        indices.iter()
            .map(|&i| self.proof_metadata[i].verification_cost)
            .sum()
    }

    fn calculate_compression_ratio(&self, _proof: &RecursiveProof) -> f32 {
        // Calculate how much space was saved through aggregation
        let original_size: u64 = self.pending_proofs.iter()
            .map(|p| p.proof.len() as u64)
            .sum();
        
        let aggregated_size = 1000u64; // Placeholder - would be actual proof size
        
        original_size as f32 / aggregated_size.max(1) as f32
    }

    fn estimate_verification_time(&self) -> u64 {
        // Estimate verification time in milliseconds
        self.proof_metadata.iter()
            .map(|meta| meta.verification_cost / 1000) // Convert to ms
            .sum::<u64>()
            .max(1)
    }

    fn estimate_memory_usage(&self) -> u64 {
        self.proof_metadata.iter()
            .map(|meta| meta.memory_usage)
            .sum()
    }
}

/// Aggregation plan for organizing proofs
#[derive(Debug, Clone)]
struct AggregationPlan {
    batches: Vec<AggregationBatch>,
    #[allow(dead_code)]
    parallel_execution: bool,
    #[allow(dead_code)]
    optimization_passes: u32,
}

/// Single batch in aggregation plan
#[derive(Debug, Clone)]
struct AggregationBatch {
    proof_indices: Vec<usize>,
    #[allow(dead_code)]
    batch_type: BatchType,
    priority: u32,
    #[allow(dead_code)]
    estimated_cost: u64,
}

/// Type of aggregation batch
#[derive(Debug, Clone)]
enum BatchType {
    TypeBased,
    Geographic,
    EconomicWeighted,
    Custom,
}

/// Main aggregated circuit interface
pub struct AggregatedCircuit {
    builder: AggregatedCircuitBuilder,
}

impl AggregatedCircuit {
    /// Create new aggregated circuit with default rules
    pub fn new() -> Result<Self> {
        let rules = CircuitAggregationRules::default();
        let builder = AggregatedCircuitBuilder::new(rules)?;
        
        Ok(Self { builder })
    }

    /// Create with custom rules
    pub fn with_rules(rules: CircuitAggregationRules) -> Result<Self> {
        let builder = AggregatedCircuitBuilder::new(rules)?;
        Ok(Self { builder })
    }

    /// Add state proofs for aggregation
    pub fn add_state_proofs(&mut self, proofs: Vec<AggregatedStateProof>) -> Result<()> {
        for proof in proofs {
            self.builder.add_proof(proof.plonky2_proof, None)?;
        }
        Ok(())
    }

    /// Build optimized aggregated proof
    pub fn build(self) -> Result<AggregatedCircuitResult> {
        self.builder.build_optimized()
    }
}

impl Default for AggregatedCircuit {
    fn default() -> Self {
        Self::new().expect("Failed to create default AggregatedCircuit")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_strategy() {
        let strategy = AggregationStrategy::TypeBased;
        match strategy {
            AggregationStrategy::TypeBased => assert!(true),
            _ => assert!(false),
        }
    }

    #[test]
    fn test_circuit_aggregation_rules() {
        let rules = CircuitAggregationRules::default();
        assert_eq!(rules.max_recursion_depth, 15);
        assert!(rules.parallel_aggregation);
        assert!(rules.compression_enabled);
        assert_eq!(rules.optimization_level, 3);
    }

    #[test]
    fn test_aggregated_circuit_creation() {
        let circuit = AggregatedCircuit::new();
        assert!(circuit.is_ok());
    }
}