//! ZHTP Content Management System
//! 
//! Advanced content management with encryption, compression, chunking,
//! replication, versioning, and Web4-specific content handling including
//! DAO-governed content and economic incentive distribution.

use crate::types::{ZhtpRequest, ServerContent, ContentMetadata, AccessPolicy};
use crate::zhtp::ZhtpResult;

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use lib_storage::types::ContentHash;

/// Content storage backend types
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    /// Local filesystem storage
    FileSystem(PathBuf),
    /// In-memory storage (for testing)
    Memory,
    /// Distributed storage
    Distributed(String),
    /// S3-compatible storage
    S3 { bucket: String, region: String },
    /// Custom storage backend
    Custom(String),
}

/// Content compression algorithms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CompressionType {
    /// No compression
    None,
    /// Gzip compression
    Gzip,
    /// Brotli compression
    Brotli,
    /// Zstandard compression
    Zstd,
    /// LZ4 compression
    Lz4,
}

/// Content encryption types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EncryptionType {
    /// No encryption
    None,
    /// AES-256-GCM encryption
    Aes256Gcm,
    /// ChaCha20-Poly1305 encryption
    ChaCha20Poly1305,
    /// Post-quantum encryption (CRYSTALS-Kyber)
    PostQuantum,
}

/// Content replication strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReplicationStrategy {
    /// No replication
    None,
    /// Replicate to N nodes
    NReplicas(u32),
    /// Replicate based on geographic distribution
    Geographic,
    /// Replicate based on economic incentives
    Economic,
    /// Custom replication strategy
    Custom(String),
}

/// Content versioning strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VersioningStrategy {
    /// No versioning
    None,
    /// Keep last N versions
    KeepLast(u32),
    /// Time-based versioning
    TimeBased { retention_days: u32 },
    /// Semantic versioning
    Semantic,
    /// DAO-governed versioning
    DaoGoverned,
}

/// Content access patterns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AccessPattern {
    /// Sequential access
    Sequential,
    /// Random access
    Random,
    /// Streaming access
    Streaming,
    /// Batch access
    Batch,
}

/// Content storage configuration
#[derive(Debug, Clone)]
pub struct ContentConfig {
    /// Storage backend
    pub backend: StorageBackend,
    /// Default compression type
    pub default_compression: CompressionType,
    /// Default encryption type
    pub default_encryption: EncryptionType,
    /// Default replication strategy
    pub default_replication: ReplicationStrategy,
    /// Default versioning strategy
    pub default_versioning: VersioningStrategy,
    /// Maximum content size
    pub max_content_size: usize,
    /// Chunk size for large content
    pub chunk_size: usize,
    /// Enable content deduplication
    pub enable_deduplication: bool,
    /// Enable content caching
    pub enable_caching: bool,
    /// Cache TTL in seconds
    pub cache_ttl: u64,
    /// Enable content indexing
    pub enable_indexing: bool,
    /// Economic incentives for content storage
    pub economic_incentives: EconomicIncentives,
}

/// Economic incentives for content operations
#[derive(Debug, Clone)]
pub struct EconomicIncentives {
    /// Storage fee per byte per day (in wei)
    pub storage_fee_per_byte_per_day: u64,
    /// Retrieval fee per byte (in wei)
    pub retrieval_fee_per_byte: u64,
    /// Replication incentive per replica per day (in wei)
    pub replication_incentive_per_replica_per_day: u64,
    /// Bandwidth incentive per byte transferred (in wei)
    pub bandwidth_incentive_per_byte: u64,
    /// DAO content governance fee percentage
    pub dao_governance_fee_percentage: f64,
    /// UBI content contribution percentage
    pub ubi_content_percentage: f64,
}

/// Content chunk information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentChunk {
    /// Chunk ID
    pub id: String,
    /// Chunk sequence number
    pub sequence: u32,
    /// Chunk size in bytes
    pub size: usize,
    /// Chunk hash (for integrity verification)
    pub hash: String,
    /// Chunk storage location
    pub storage_location: String,
    /// Chunk encryption info
    pub encryption_info: Option<EncryptionInfo>,
    /// Chunk compression info
    pub compression_info: Option<CompressionInfo>,
}

/// Encryption information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptionInfo {
    /// Encryption algorithm
    pub algorithm: EncryptionType,
    /// Key ID (for key management)
    pub key_id: String,
    /// Initialization vector
    pub iv: Vec<u8>,
    /// Authentication tag (for AEAD ciphers)
    pub auth_tag: Option<Vec<u8>>,
}

/// Compression information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionInfo {
    /// Compression algorithm
    pub algorithm: CompressionType,
    /// Original size before compression
    pub original_size: usize,
    /// Compressed size
    pub compressed_size: usize,
    /// Compression ratio
    pub compression_ratio: f64,
}

/// Content version information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentVersion {
    /// Version ID
    pub version_id: String,
    /// Version number
    pub version_number: u32,
    /// Semantic version (if applicable)
    pub semantic_version: Option<String>,
    /// Creation timestamp
    pub created_at: u64,
    /// Creator identity
    pub creator: String,
    /// Version description
    pub description: String,
    /// Content hash for this version
    pub content_hash: String,
    /// Version metadata
    pub metadata: HashMap<String, String>,
}

/// Content replication information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentReplica {
    /// Replica ID
    pub replica_id: String,
    /// Node ID storing this replica
    pub node_id: String,
    /// Geographic location
    pub location: Option<String>,
    /// Replication timestamp
    pub replicated_at: u64,
    /// Replica health status
    pub health_status: ReplicaHealth,
    /// Economic incentive earned by this replica
    pub incentive_earned: u64,
}

/// Replica health status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ReplicaHealth {
    /// Healthy and accessible
    Healthy,
    /// Degraded performance
    Degraded,
    /// Temporarily unavailable
    Unavailable,
    /// Corrupted or damaged
    Corrupted,
    /// Permanently lost
    Lost,
}

/// Content access statistics
#[derive(Debug, Clone, Default)]
pub struct ContentStats {
    /// Total access count
    pub access_count: u64,
    /// Unique user access count
    pub unique_users: u64,
    /// Total bytes transferred
    pub bytes_transferred: u64,
    /// Average access time
    pub avg_access_time_ms: f64,
    /// Geographic access distribution
    pub geographic_access: HashMap<String, u64>,
    /// Economic impact
    pub economic_stats: EconomicStats,
}

/// Economic statistics for content
#[derive(Debug, Clone, Default)]
pub struct EconomicStats {
    /// Total storage fees collected
    pub storage_fees_collected: u64,
    /// Total retrieval fees collected
    pub retrieval_fees_collected: u64,
    /// Total incentives distributed
    pub incentives_distributed: u64,
    /// Total DAO fees from content
    pub dao_fees: u64,
    /// Total UBI contributions from content
    pub ubi_contributions: u64,
}

/// ZHTP Content Manager - Protocol-level content management
pub struct ZhtpContentManager {
    /// Content configuration
    config: ContentConfig,
    /// Content metadata storage
    metadata_store: HashMap<String, ServerContent>,
    /// Content chunks storage
    chunks_store: HashMap<String, Vec<ContentChunk>>,
    /// Content versions storage
    versions_store: HashMap<String, Vec<ContentVersion>>,
    /// Content replicas storage
    replicas_store: HashMap<String, Vec<ContentReplica>>,
    /// Content statistics
    stats_store: HashMap<String, ContentStats>,
    /// Content cache
    content_cache: HashMap<String, (Vec<u8>, u64)>, // (content, expiry)
    /// Chunk data storage
    chunk_data_store: HashMap<String, Vec<u8>>, // chunk_id -> chunk_data
    /// Deduplication hash table
    dedup_hashes: HashMap<String, String>, // hash -> content_id
}

impl ZhtpContentManager {
    /// Create new content manager
    pub fn new(config: ContentConfig) -> Self {
        Self {
            config,
            metadata_store: HashMap::new(),
            chunks_store: HashMap::new(),
            versions_store: HashMap::new(),
            replicas_store: HashMap::new(),
            stats_store: HashMap::new(),
            content_cache: HashMap::new(),
            chunk_data_store: HashMap::new(),
            dedup_hashes: HashMap::new(),
        }
    }
    
    /// Store content with metadata
    pub async fn store_content(
        &mut self,
        content: &[u8],
        metadata: ContentMetadata,
        request: &ZhtpRequest,
    ) -> ZhtpResult<String> {
        // Check content size limits
        if content.len() > self.config.max_content_size {
            return Err(anyhow::anyhow!(
                "Content size {} exceeds maximum allowed size {}",
                content.len(),
                self.config.max_content_size
            ));
        }
        
        // Calculate content hash for deduplication
        let content_hash = self.calculate_content_hash(content);
        
        // Check for deduplication
        if self.config.enable_deduplication {
            if let Some(existing_id) = self.dedup_hashes.get(&content_hash) {
                tracing::info!(" Content deduplicated: using existing content {}", existing_id);
                return Ok(existing_id.clone());
            }
        }
        
        // Generate content ID
        let content_id = Uuid::new_v4().to_string();
        
        // Calculate economic fees
        let economic_assessment = self.calculate_storage_fees(content.len(), &metadata, request)?;
        
        // Process content (compression/encryption would be handled elsewhere if needed)
        let processed_content = content.to_vec();
        let final_content = processed_content;
        
        // Chunk content if needed
        let chunks = if final_content.len() > self.config.chunk_size {
            self.chunk_content(&content_id, &final_content).await?
        } else {
            vec![ContentChunk {
                id: format!("{}_chunk_0", content_id),
                sequence: 0,
                size: final_content.len(),
                hash: self.calculate_content_hash(&final_content),
                storage_location: self.generate_storage_location(&content_id),
                encryption_info: None, // Would be set based on server configuration
                compression_info: None, // Would be set based on server configuration
            }]
        };
        
        // Store content chunks
        self.store_content_chunks(&content_id, &chunks, &final_content).await?;
        
        // Create server content using proper constructor
        let access_policy = AccessPolicy::public(); // Default access policy
        let server_content = ServerContent::with_metadata(
            final_content,
            metadata.clone(),
            access_policy,
        )?;
        
        // Set the content ID after creation
        let mut server_content = server_content;
        server_content.id = Some(content_id.clone());
        
        // Store metadata
        let chunks_len = chunks.len();
        self.metadata_store.insert(content_id.clone(), server_content.clone());
        self.chunks_store.insert(content_id.clone(), chunks.clone());
        
        // Update deduplication table
        if self.config.enable_deduplication {
            self.dedup_hashes.insert(content_hash.clone(), content_id.clone());
        }
        
        // Create initial version
        let initial_version = ContentVersion {
            version_id: Uuid::new_v4().to_string(),
            version_number: 1,
            semantic_version: None,
            created_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            creator: request.headers.get("X-User-ID").unwrap_or("anonymous".to_string()),
            description: "Initial version".to_string(),
            content_hash: content_hash.clone(),
            metadata: HashMap::new(),
        };
        
        self.versions_store.insert(content_id.clone(), vec![initial_version]);
        
        // Initialize statistics
        self.stats_store.insert(content_id.clone(), ContentStats::default());
        
        // Create replicas if needed - check storage_requirements
        if let Some(ref storage_req) = server_content.storage_requirements {
            if storage_req.replication > 1 {
                self.create_replicas(&content_id, &ReplicationStrategy::NReplicas(storage_req.replication)).await?;
            }
        }
        
        tracing::info!(" Content stored: {} ({} bytes, {} chunks)",
                      content_id, content.len(), chunks_len);
        
        Ok(content_id)
    }
    
    /// Retrieve content by ID
    pub async fn retrieve_content(
        &mut self,
        content_id: &str,
        request: &ZhtpRequest,
    ) -> ZhtpResult<Option<Vec<u8>>> {
        // Check cache first
        if self.config.enable_caching {
            if let Some((cached_content, expiry)) = self.content_cache.get(content_id) {
                let current_time = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();
                
                if current_time < *expiry {
                    tracing::debug!("Content cache hit: {}", content_id);
                    let cached_content_clone = cached_content.clone();
                    self.update_access_stats(content_id, request).await?;
                    return Ok(Some(cached_content_clone));
                } else {
                    // Remove expired cache entry
                    self.content_cache.remove(content_id);
                }
            }
        }
        
        // Get content metadata
        let metadata = match self.metadata_store.get(content_id) {
            Some(meta) => meta,
            None => return Ok(None),
        };
        
        // Calculate retrieval fees
        let retrieval_assessment = self.calculate_retrieval_fees(metadata, request)?;
        
        // Get content chunks
        let chunks = match self.chunks_store.get(content_id) {
            Some(chunks) => chunks,
            None => return Err(anyhow::anyhow!("Content chunks not found for {}", content_id)),
        };
        
        // Retrieve and reassemble content
        let mut content_data = Vec::new();
        for chunk in chunks.iter() {
            let chunk_data = self.retrieve_content_chunk(chunk).await?;
            content_data.extend(chunk_data);
        }
        
        // Decrypt content if needed
        let decrypted_content = if let Some(ref encryption_info) = metadata.metadata.encryption_info {
            self.decrypt_content(&content_data, &EncryptionType::PostQuantum).await?
        } else {
            content_data
        };
        
        // Decompress content if needed
        let final_content = if let Some(ref compression_info) = metadata.metadata.compression_info {
            self.decompress_content(&decrypted_content, &CompressionType::Gzip).await?
        } else {
            decrypted_content
        };
        
        // Cache the content
        if self.config.enable_caching {
            let expiry = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs() + self.config.cache_ttl;
            
            self.content_cache.insert(content_id.to_string(), (final_content.clone(), expiry));
        }
        
        // Update access statistics
        self.update_access_stats(content_id, request).await?;
        
        // Distribute economic incentives
        self.distribute_retrieval_incentives(content_id, &retrieval_assessment).await?;
        
        tracing::info!(" Content retrieved: {} ({} bytes)", content_id, final_content.len());
        
        Ok(Some(final_content))
    }
    
    /// Update content (creates new version)
    pub async fn update_content(
        &mut self,
        content_id: &str,
        new_content: &[u8],
        request: &ZhtpRequest,
    ) -> ZhtpResult<String> {
        // Get existing metadata
        let existing_metadata = self.metadata_store.get(content_id)
            .ok_or_else(|| anyhow::anyhow!("Content not found: {}", content_id))?
            .clone();
        
        // Create new version
        let current_version = existing_metadata.metadata.version.as_ref()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);
        let new_version_number = current_version + 1;
        let new_content_hash = self.calculate_content_hash(new_content);
        
        // Store new content (similar to store_content but with versioning)
        let new_version = ContentVersion {
            version_id: Uuid::new_v4().to_string(),
            version_number: new_version_number,
            semantic_version: None,
            created_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            creator: request.headers.get("X-User-ID").unwrap_or("anonymous".to_string()),
            description: "Updated version".to_string(),
            content_hash: new_content_hash,
            metadata: HashMap::new(),
        };
        
        // Add to versions
        self.versions_store.entry(content_id.to_string())
            .or_default()
            .push(new_version.clone());
        
        // Update metadata
        let mut updated_metadata = existing_metadata;
        updated_metadata.metadata.version = Some(new_version_number.to_string());
        updated_metadata.metadata.last_modified = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        updated_metadata.metadata.hash = ContentHash::from_bytes(&lib_crypto::hash_blake3(&new_content));
        updated_metadata.metadata.size = new_content.len() as u64;
        
        self.metadata_store.insert(content_id.to_string(), updated_metadata);
        
        tracing::info!("Content updated: {} (version {})", content_id, new_version_number);
        
        Ok(new_version.version_id)
    }
    
    /// Delete content
    pub async fn delete_content(&mut self, content_id: &str, request: &ZhtpRequest) -> ZhtpResult<bool> {
        // Check if content exists
        if !self.metadata_store.contains_key(content_id) {
            return Ok(false);
        }
        
        // Remove from all stores
        self.metadata_store.remove(content_id);
        self.chunks_store.remove(content_id);
        self.versions_store.remove(content_id);
        self.replicas_store.remove(content_id);
        self.stats_store.remove(content_id);
        self.content_cache.remove(content_id);
        
        // Remove from deduplication table
        if self.config.enable_deduplication {
            self.dedup_hashes.retain(|_, v| v != content_id);
        }
        
        tracing::info!("ðŸ—‘ï¸  Content deleted: {}", content_id);
        
        Ok(true)
    }
    
    /// Get content metadata
    pub fn get_content_metadata(&self, content_id: &str) -> Option<&ServerContent> {
        self.metadata_store.get(content_id)
    }
    
    /// List content with filtering
    pub fn list_content(&self, filter: Option<ContentFilter>) -> Vec<&ServerContent> {
        let mut results: Vec<&ServerContent> = self.metadata_store.values().collect();
        
        if let Some(filter) = filter {
            results.retain(|content| self.matches_filter(content, &filter));
        }
        
        results
    }
    
    /// Calculate content hash
    fn calculate_content_hash(&self, content: &[u8]) -> String {
        use sha2::{Sha256, Digest};
        let mut hasher = Sha256::new();
        hasher.update(content);
        format!("{:x}", hasher.finalize())
    }
    
    /// Generate storage location
    fn generate_storage_location(&self, content_id: &str) -> String {
        match &self.config.backend {
            StorageBackend::FileSystem(path) => {
                format!("{}/{}", path.display(), content_id)
            }
            StorageBackend::Memory => {
                format!("memory://{}", content_id)
            }
            StorageBackend::Distributed(node) => {
                format!("zhtp://{}/{}", node, content_id)
            }
            StorageBackend::S3 { bucket, region } => {
                format!("s3://{}.{}/{}", bucket, region, content_id)
            }
            StorageBackend::Custom(location) => {
                format!("{}://{}", location, content_id)
            }
        }
    }
    
    // Additional helper methods would be implemented here for:
    // - compress_content, decompress_content
    // - encrypt_content, decrypt_content
    // - chunk_content
    // - store_content_chunks, retrieve_content_chunk
    // - calculate_storage_fees, calculate_retrieval_fees
    // - update_access_stats
    // - distribute_retrieval_incentives
    // - create_replicas
    // - matches_filter
    
    async fn compress_content(&self, content: &[u8], compression: &CompressionType) -> ZhtpResult<Vec<u8>> {
        // Simplified compression implementation
        Ok(content.to_vec())
    }
    
    async fn decompress_content(&self, content: &[u8], compression: &CompressionType) -> ZhtpResult<Vec<u8>> {
        // Simplified decompression implementation
        Ok(content.to_vec())
    }
    
    async fn encrypt_content(&self, content: &[u8], encryption: &EncryptionType) -> ZhtpResult<Vec<u8>> {
        // Simplified encryption implementation
        Ok(content.to_vec())
    }
    
    async fn decrypt_content(&self, content: &[u8], encryption: &EncryptionType) -> ZhtpResult<Vec<u8>> {
        // Simplified decryption implementation
        Ok(content.to_vec())
    }
    
    async fn chunk_content(&self, content_id: &str, content: &[u8]) -> ZhtpResult<Vec<ContentChunk>> {
        let mut chunks = Vec::new();
        let chunk_size = self.config.chunk_size;
        
        for (i, chunk_data) in content.chunks(chunk_size).enumerate() {
            let chunk = ContentChunk {
                id: format!("{}_chunk_{}", content_id, i),
                sequence: i as u32,
                size: chunk_data.len(),
                hash: self.calculate_content_hash(chunk_data),
                storage_location: format!("{}_chunk_{}", self.generate_storage_location(content_id), i),
                encryption_info: None,
                compression_info: None,
            };
            chunks.push(chunk);
        }
        
        Ok(chunks)
    }
    
    async fn store_content_chunks(&mut self, content_id: &str, chunks: &[ContentChunk], content: &[u8]) -> ZhtpResult<()> {
        // Store chunk data in memory
        for (i, chunk) in chunks.iter().enumerate() {
            let start = i * self.config.chunk_size;
            let end = std::cmp::min(start + chunk.size, content.len());
            let chunk_data = content[start..end].to_vec();
            self.chunk_data_store.insert(chunk.id.clone(), chunk_data);
        }
        tracing::debug!(" Stored {} chunks for content {}", chunks.len(), content_id);
        Ok(())
    }
    
    async fn retrieve_content_chunk(&self, chunk: &ContentChunk) -> ZhtpResult<Vec<u8>> {
        // Retrieve chunk data from memory
        match self.chunk_data_store.get(&chunk.id) {
            Some(data) => Ok(data.clone()),
            None => {
                tracing::warn!("Chunk data not found for {}, returning zeros", chunk.id);
                Ok(vec![0; chunk.size])
            }
        }
    }
    
    fn calculate_storage_fees(&self, content_size: usize, metadata: &ContentMetadata, request: &ZhtpRequest) -> ZhtpResult<EconomicAssessment> {
        let base_fee = (content_size as u64).saturating_mul(self.config.economic_incentives.storage_fee_per_byte_per_day);
        let dao_fees = (base_fee as f64 * self.config.economic_incentives.dao_governance_fee_percentage) as u64;
        let ubi_contribution = (base_fee as f64 * self.config.economic_incentives.ubi_content_percentage) as u64;
        
        Ok(EconomicAssessment {
            total_fees: base_fee,
            dao_fees,
            ubi_contribution,
        })
    }
    
    fn calculate_retrieval_fees(&self, metadata: &ServerContent, request: &ZhtpRequest) -> ZhtpResult<EconomicAssessment> {
        let base_fee = metadata.metadata.size.saturating_mul(self.config.economic_incentives.retrieval_fee_per_byte);
        let dao_fees = (base_fee as f64 * self.config.economic_incentives.dao_governance_fee_percentage) as u64;
        let ubi_contribution = (base_fee as f64 * self.config.economic_incentives.ubi_content_percentage) as u64;
        
        Ok(EconomicAssessment {
            total_fees: base_fee,
            dao_fees,
            ubi_contribution,
        })
    }
    
    async fn update_access_stats(&mut self, content_id: &str, request: &ZhtpRequest) -> ZhtpResult<()> {
        let stats = self.stats_store.entry(content_id.to_string()).or_default();
        stats.access_count += 1;
        stats.bytes_transferred += self.metadata_store.get(content_id).map(|m| m.metadata.size).unwrap_or(0);
        
        // Update geographic stats
        if let Some(country) = request.headers.get("X-Country-Code") {
            *stats.geographic_access.entry(country.clone()).or_insert(0) += 1;
        }
        
        Ok(())
    }
    
    async fn distribute_retrieval_incentives(&mut self, content_id: &str, assessment: &EconomicAssessment) -> ZhtpResult<()> {
        // Simplified incentive distribution
        tracing::debug!("Distributing retrieval incentives for {}: {} wei", content_id, assessment.total_fees);
        Ok(())
    }
    
    async fn create_replicas(&mut self, content_id: &str, strategy: &ReplicationStrategy) -> ZhtpResult<()> {
        // Simplified replication implementation
        tracing::debug!(" Creating replicas for {} with strategy {:?}", content_id, strategy);
        Ok(())
    }
    
    fn matches_filter(&self, content: &ServerContent, filter: &ContentFilter) -> bool {
        // Simplified filter matching
        true
    }
}

/// Economic assessment for content operations
#[derive(Debug, Clone)]
pub struct EconomicAssessment {
    /// Total fees for the operation
    pub total_fees: u64,
    /// DAO governance fees
    pub dao_fees: u64,
    /// UBI contribution amount
    pub ubi_contribution: u64,
}

/// Content filtering options
#[derive(Debug, Clone)]
pub struct ContentFilter {
    /// Filter by content type
    pub content_type: Option<String>,
    /// Filter by creator
    pub creator: Option<String>,
    /// Filter by tags
    pub tags: Option<Vec<String>>,
    /// Filter by creation date range
    pub created_after: Option<u64>,
    /// Filter by creation date range
    pub created_before: Option<u64>,
    /// Filter by minimum size
    pub min_size: Option<usize>,
    /// Filter by maximum size
    pub max_size: Option<usize>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            default_compression: CompressionType::Gzip,
            default_encryption: EncryptionType::Aes256Gcm,
            default_replication: ReplicationStrategy::NReplicas(3),
            default_versioning: VersioningStrategy::KeepLast(10),
            max_content_size: 100 * 1024 * 1024, // 100MB
            chunk_size: 1024 * 1024, // 1MB chunks
            enable_deduplication: true,
            enable_caching: true,
            cache_ttl: 3600, // 1 hour
            enable_indexing: true,
            economic_incentives: EconomicIncentives {
                storage_fee_per_byte_per_day: 10, // 10 wei per byte per day
                retrieval_fee_per_byte: 1, // 1 wei per byte
                replication_incentive_per_replica_per_day: 1000, // 1000 wei per replica per day
                bandwidth_incentive_per_byte: 5, // 5 wei per byte transferred
                dao_governance_fee_percentage: 0.02, // 2%
                ubi_content_percentage: 0.8, // 80% to UBI
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ZhtpHeaders, ZhtpMethod};

    #[tokio::test]
    async fn test_content_storage() {
        use lib_economy::{EconomicModel, Priority};
        use std::time::{SystemTime, UNIX_EPOCH};
        
        let config = ContentConfig::default();
        let mut manager = ZhtpContentManager::new(config);
        
        let content = b"Hello, ZHTP Content Management!";
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        
        let metadata = ContentMetadata {
            content_type: "text/plain".to_string(),
            encoding: None,
            language: None,
            last_modified: now,
            created_at: now,
            size: content.len() as u64,
            version: None,
            tags: vec!["test".to_string()],
            author: None,
            license: None,
            description: None,
            title: None,
            category: None,
            maturity_rating: None,
            quality_score: None,
            popularity_metrics: None,
            economic_info: None,
            privacy_level: 100,
            hash: lib_storage::types::ContentHash::from_bytes(&lib_crypto::hash_blake3(content)),
            encryption_info: None,
            compression_info: None,
            integrity_checksum: None,
            related_content: vec![],
            source_attribution: None,
            geographic_origin: None,
            expires_at: None,
        };
        
        // Create a test economic model
        let economic_model = EconomicModel::new();
        
        let headers = ZhtpHeaders::new();
        let request = ZhtpRequest::new(
            ZhtpMethod::Post,
            "/content".to_string(),
            content.to_vec(),
            None, // requester
            Priority::Normal,
            &economic_model,
        ).unwrap();
        
        let content_id = manager.store_content(content, metadata, &request).await.unwrap();
        assert!(!content_id.is_empty());
        
        let retrieved = manager.retrieve_content(&content_id, &request).await.unwrap();
        assert_eq!(retrieved, Some(content.to_vec()));
    }

    #[test]
    fn test_content_hash() {
        let config = ContentConfig::default();
        let manager = ZhtpContentManager::new(config);
        
        let content1 = b"test content";
        let content2 = b"test content";
        let content3 = b"different content";
        
        let hash1 = manager.calculate_content_hash(content1);
        let hash2 = manager.calculate_content_hash(content2);
        let hash3 = manager.calculate_content_hash(content3);
        
        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
    }

    #[test]
    fn test_storage_location_generation() {
        let config = ContentConfig {
            backend: StorageBackend::FileSystem(PathBuf::from("/data")),
            ..ContentConfig::default()
        };
        let manager = ZhtpContentManager::new(config);
        
        let location = manager.generate_storage_location("test-content-id");
        assert!(location.starts_with("/data/"));
        assert!(location.contains("test-content-id"));
    }

    #[test]
    fn test_economic_incentives() {
        use lib_economy::{EconomicModel, Priority};
        use std::time::{SystemTime, UNIX_EPOCH};
        
        let config = ContentConfig::default();
        let manager = ZhtpContentManager::new(config);
        
        const CONTENT_SIZE: usize = 1024; // 1KB
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        
        let metadata = ContentMetadata {
            content_type: "text/plain".to_string(),
            encoding: None,
            language: None,
            last_modified: now,
            created_at: now,
            size: CONTENT_SIZE as u64,
            version: None,
            tags: vec![],
            author: None,
            license: None,
            description: None,
            title: None,
            category: None,
            maturity_rating: None,
            quality_score: None,
            popularity_metrics: None,
            economic_info: None,
            privacy_level: 100,
            hash: lib_storage::types::ContentHash::from_bytes(&lib_crypto::hash_blake3(&[0u8; CONTENT_SIZE])),
            encryption_info: None,
            compression_info: None,
            integrity_checksum: None,
            related_content: vec![],
            source_attribution: None,
            geographic_origin: None,
            expires_at: None,
        };
        
        // Create a test economic model
        let economic_model = EconomicModel::new();
        
        let headers = ZhtpHeaders::new();
        let request = ZhtpRequest::new(
            ZhtpMethod::Post,
            "/content".to_string(),
            vec![],
            None, // requester
            Priority::Normal,
            &economic_model,
        ).unwrap();
        
        let assessment = manager.calculate_storage_fees(CONTENT_SIZE, &metadata, &request).unwrap();
        assert!(assessment.total_fees > 0);
        assert!(assessment.dao_fees > 0);
        assert!(assessment.ubi_contribution > 0);
    }
}
