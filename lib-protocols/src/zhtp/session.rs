//! ZHTP Session Management System
//! 
//! Advanced session lifecycle management with multi-factor authentication,
//! zero-knowledge session proofs, economic session incentives, distributed
//! session storage, and Web4-specific session features including DAO governance
//! and identity verification.

use crate::types::ZhtpRequest;
use crate::zhtp::ZhtpResult;

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use serde::{Deserialize, Serialize};
use anyhow::Result as AnyhowResult;
use uuid::Uuid;

/// Session authentication methods
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AuthMethod {
    /// Password-based authentication
    Password,
    /// Zero-knowledge proof authentication
    ZeroKnowledge,
    /// Digital signature authentication
    DigitalSignature,
    /// Multi-factor authentication
    MultiFactorAuth(Vec<AuthFactor>),
    /// Biometric authentication
    Biometric(BiometricType),
    /// Hardware token authentication
    HardwareToken,
    /// OAuth 2.0 authentication
    OAuth(String), // provider
    /// Web3 wallet authentication
    Web3Wallet(WalletType),
    /// DAO membership authentication
    DaoMembership,
}

/// Authentication factors for MFA
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AuthFactor {
    /// Something you know (password, PIN)
    Knowledge(String),
    /// Something you have (token, phone)
    Possession(String),
    /// Something you are (biometric)
    Inherence(BiometricType),
    /// Somewhere you are (location)
    Location(String),
    /// Something you do (behavior)
    Behavior(String),
}

/// Biometric authentication types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BiometricType {
    /// Fingerprint
    Fingerprint,
    /// Face recognition
    FaceRecognition,
    /// Voice recognition
    VoiceRecognition,
    /// Iris scan
    IrisScan,
    /// Retina scan
    RetinaScan,
    /// Behavioral biometrics
    Behavioral,
}

/// Web3 wallet types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WalletType {
    /// MetaMask wallet
    MetaMask,
    /// Phantom wallet (Solana)
    Phantom,
    /// Native ZHTP wallet
    ZhtpNative,
    /// WalletConnect
    WalletConnect,
    /// Coinbase Wallet
    CoinbaseWallet,
    /// Hardware wallet (Ledger, Trezor)
    HardwareWallet(String),
}

/// Session security levels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SecurityLevel {
    /// Basic security (password only)
    Basic = 1,
    /// Standard security (password + one factor)
    Standard = 2,
    /// High security (password + multiple factors)
    High = 3,
    /// Maximum security (all factors + hardware token)
    Maximum = 4,
    /// Quantum-resistant security
    QuantumResistant = 5,
}

/// Session state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SessionState {
    /// Session is being created
    Creating,
    /// Session is active and valid
    Active,
    /// Session is temporarily suspended
    Suspended,
    /// Session is being renewed
    Renewing,
    /// Session has expired
    Expired,
    /// Session was explicitly terminated
    Terminated,
    /// Session was forcibly revoked
    Revoked,
    /// Session is locked due to security concerns
    Locked,
}

/// Session storage backend
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStorage {
    /// In-memory storage (for testing)
    Memory,
    /// Redis storage
    Redis(String), // connection string
    /// Database storage
    Database(String), // connection string
    /// Distributed hash table storage
    DistributedHashTable,
    /// Blockchain storage (for permanent records)
    Blockchain,
    /// Mesh storage
    Mesh(String), // node address
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Default session timeout in seconds
    pub default_timeout: u64,
    /// Maximum session timeout in seconds
    pub max_timeout: u64,
    /// Session renewal threshold (renew when this much time is left)
    pub renewal_threshold: u64,
    /// Maximum concurrent sessions per user
    pub max_concurrent_sessions: u32,
    /// Enable session encryption
    pub enable_encryption: bool,
    /// Enable distributed session storage
    pub enable_distributed_storage: bool,
    /// Session storage backend
    pub storage_backend: SessionStorage,
    /// Required security level
    pub required_security_level: SecurityLevel,
    /// Enable economic incentives for sessions
    pub enable_economic_incentives: bool,
    /// Economic incentives configuration
    pub economic_incentives: SessionEconomicConfig,
    /// Enable session analytics
    pub enable_analytics: bool,
    /// Enable zero-knowledge session proofs
    pub enable_zk_proofs: bool,
}

/// Economic incentives for sessions
#[derive(Debug, Clone)]
pub struct SessionEconomicConfig {
    /// Session creation fee (in wei)
    pub session_creation_fee: u64,
    /// Session maintenance fee per hour (in wei)
    pub session_maintenance_fee_per_hour: u64,
    /// Premium session fee multiplier
    pub premium_session_multiplier: f64,
    /// DAO governance session fee percentage
    pub dao_session_fee_percentage: f64,
    /// UBI session contribution percentage
    pub ubi_session_percentage: f64,
    /// Security level fee multipliers
    pub security_level_multipliers: HashMap<SecurityLevel, f64>,
}

/// Session information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Unique session ID
    pub session_id: String,
    /// User ID associated with this session
    pub user_id: String,
    /// Session creation timestamp
    pub created_at: u64,
    /// Session last activity timestamp
    pub last_activity: u64,
    /// Session expiration timestamp
    pub expires_at: u64,
    /// Session state
    pub state: SessionState,
    /// Authentication methods used
    pub auth_methods: Vec<AuthMethod>,
    /// Security level achieved
    pub security_level: SecurityLevel,
    /// Session permissions
    pub permissions: Vec<String>,
    /// Session metadata
    pub metadata: HashMap<String, String>,
    /// Client information
    pub client_info: ClientInfo,
    /// Geographic information
    pub geo_info: Option<GeoInfo>,
    /// Economic information
    pub economic_info: SessionEconomicInfo,
    /// Zero-knowledge proof information
    pub zk_proof_info: Option<ZkProofInfo>,
    /// Session statistics
    pub stats: SessionStats,
}

/// Client information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    /// User agent string
    pub user_agent: String,
    /// Client IP address
    pub ip_address: String,
    /// Client fingerprint
    pub fingerprint: Option<String>,
    /// Operating system
    pub os: Option<String>,
    /// Browser information
    pub browser: Option<String>,
    /// Device type
    pub device_type: Option<String>,
}

/// Geographic information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoInfo {
    /// Country code
    pub country: String,
    /// Region/state
    pub region: Option<String>,
    /// City
    pub city: Option<String>,
    /// Latitude
    pub latitude: Option<f64>,
    /// Longitude
    pub longitude: Option<f64>,
    /// ISP information
    pub isp: Option<String>,
    /// Timezone
    pub timezone: Option<String>,
}

/// Session economic information
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionEconomicInfo {
    /// Total fees paid for this session
    pub total_fees_paid: u64,
    /// DAO fees contributed
    pub dao_fees_contributed: u64,
    /// UBI contributions from this session
    pub ubi_contributions: u64,
    /// Premium features used
    pub premium_features: Vec<String>,
    /// Economic activity score
    pub activity_score: f64,
}

/// Zero-knowledge proof information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZkProofInfo {
    /// Proof type
    pub proof_type: String,
    /// Proof commitment
    pub commitment: Vec<u8>,
    /// Proof verification key
    pub verification_key: Vec<u8>,
    /// Proof generation timestamp
    pub generated_at: u64,
    /// Proof expiration
    pub expires_at: u64,
}

/// Session statistics
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionStats {
    /// Total requests made in this session
    pub total_requests: u64,
    /// Total bytes transferred
    pub bytes_transferred: u64,
    /// Average request processing time
    pub avg_request_time_ms: f64,
    /// Geographic request distribution
    pub geographic_requests: HashMap<String, u64>,
    /// API endpoint usage
    pub api_usage: HashMap<String, u64>,
    /// Error count
    pub error_count: u64,
}

/// Session creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreateRequest {
    /// User ID
    pub user_id: String,
    /// Authentication credentials
    pub credentials: Vec<AuthCredential>,
    /// Requested session timeout
    pub timeout: Option<u64>,
    /// Requested permissions
    pub permissions: Vec<String>,
    /// Client information
    pub client_info: ClientInfo,
    /// Session metadata
    pub metadata: HashMap<String, String>,
}

/// Authentication credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCredential {
    /// Authentication method
    pub method: AuthMethod,
    /// Credential data
    pub data: Vec<u8>,
    /// Additional parameters
    pub parameters: HashMap<String, String>,
}

/// Session validation result
#[derive(Debug, Clone)]
pub struct SessionValidation {
    /// Whether the session is valid
    pub is_valid: bool,
    /// Session information (if valid)
    pub session_info: Option<SessionInfo>,
    /// Validation errors (if invalid)
    pub errors: Vec<String>,
    /// Security warnings
    pub warnings: Vec<String>,
    /// Time until expiration
    pub time_until_expiration: Option<u64>,
    /// Renewal recommendation
    pub should_renew: bool,
}

/// ZHTP Protocol Session Manager - Advanced session lifecycle with MFA, ZK proofs, economic incentives
pub struct ZhtpSessionManager {
    /// Session configuration
    config: SessionConfig,
    /// Active sessions storage
    sessions: HashMap<String, SessionInfo>,
    /// User to sessions mapping
    user_sessions: HashMap<String, Vec<String>>,
    /// Session activity tracking
    activity_tracker: HashMap<String, Vec<SessionActivity>>,
    /// Authentication providers
    auth_providers: HashMap<String, Box<dyn AuthProvider>>,
    /// Session encryption keys
    encryption_keys: HashMap<String, Vec<u8>>,
}

/// Session activity record
#[derive(Debug, Clone)]
pub struct SessionActivity {
    /// Activity timestamp
    pub timestamp: u64,
    /// Activity type
    pub activity_type: ActivityType,
    /// Activity description
    pub description: String,
    /// Client IP
    pub client_ip: String,
    /// Economic impact
    pub economic_impact: u64,
}

/// Session activity types
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityType {
    /// Session created
    Created,
    /// Authentication successful
    AuthSuccess,
    /// Authentication failed
    AuthFailure,
    /// Session renewed
    Renewed,
    /// Permission granted
    PermissionGranted,
    /// Permission denied
    PermissionDenied,
    /// API request made
    ApiRequest,
    /// Economic transaction
    EconomicTransaction,
    /// Session suspended
    Suspended,
    /// Session terminated
    Terminated,
    /// Security violation
    SecurityViolation,
}

/// Authentication provider trait
pub trait AuthProvider: Send + Sync {
    /// Verify authentication credentials
    fn verify_credentials(&self, credentials: &AuthCredential) -> AnyhowResult<bool>;
    
    /// Get authentication strength score
    fn get_strength_score(&self, credentials: &AuthCredential) -> f64;
    
    /// Check if MFA is required
    fn requires_mfa(&self, user_id: &str) -> bool;
}

impl ZhtpSessionManager {
    /// Create new session manager
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
            user_sessions: HashMap::new(),
            activity_tracker: HashMap::new(),
            auth_providers: HashMap::new(),
            encryption_keys: HashMap::new(),
        }
    }
    
    /// Create new session
    pub async fn create_session(&mut self, request: SessionCreateRequest) -> ZhtpResult<SessionInfo> {
        // Validate user session limits
        self.validate_session_limits(&request.user_id)?;
        
        // Authenticate user
        let auth_result = self.authenticate_user(&request.credentials).await?;
        if !auth_result.success {
            self.log_activity(&request.user_id, ActivityType::AuthFailure,
                            "Authentication failed".to_string(), &request.client_info.ip_address).await;
            return Err(anyhow::anyhow!("Authentication failed: {}", auth_result.error_message));
        }
        
        // Calculate session timeout
        let timeout = request.timeout
            .unwrap_or(self.config.default_timeout)
            .min(self.config.max_timeout);
        
        // Calculate economic fees
        let economic_assessment = self.calculate_session_fees(&request, &auth_result).await?;
        
        // Generate session ID
        let session_id = Uuid::new_v4().to_string();
        
        // Create session info
        let current_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        
        let session_info = SessionInfo {
            session_id: session_id.clone(),
            user_id: request.user_id.clone(),
            created_at: current_time,
            last_activity: current_time,
            expires_at: current_time + timeout,
            state: SessionState::Active,
            auth_methods: request.credentials.iter().map(|c| c.method.clone()).collect(),
            security_level: auth_result.security_level.clone(),
            permissions: request.permissions,
            metadata: request.metadata,
            client_info: request.client_info.clone(),
            geo_info: self.get_geo_info(&request.client_info.ip_address).await.ok(),
            economic_info: SessionEconomicInfo {
                total_fees_paid: economic_assessment.total_fees,
                dao_fees_contributed: economic_assessment.dao_fees,
                ubi_contributions: economic_assessment.ubi_contribution,
                ..Default::default()
            },
            zk_proof_info: if self.config.enable_zk_proofs {
                Some(self.generate_zk_proof(&session_id, &request.user_id).await?)
            } else {
                None
            },
            stats: SessionStats::default(),
        };
        
        // Store session
        self.sessions.insert(session_id.clone(), session_info.clone());
        
        // Update user sessions mapping
        self.user_sessions.entry(request.user_id.clone())
            .or_default()
            .push(session_id.clone());
        
        // Log activity
        self.log_activity(&request.user_id, ActivityType::Created,
                         format!("Session created with ID: {}", session_id),
                         &request.client_info.ip_address).await;
        
        // Distribute economic incentives
        self.distribute_session_incentives(&session_id, &economic_assessment).await?;
        
        tracing::info!("Session created: {} for user {} (security level: {:?})",
                      session_id, request.user_id, auth_result.security_level);
        
        Ok(session_info)
    }
    
    /// Validate session
    pub async fn validate_session(&mut self, session_id: &str, request: &ZhtpRequest) -> ZhtpResult<SessionValidation> {
        let session = match self.sessions.get_mut(session_id) {
            Some(session) => session,
            None => {
                return Ok(SessionValidation {
                    is_valid: false,
                    session_info: None,
                    errors: vec!["Session not found".to_string()],
                    warnings: vec![],
                    time_until_expiration: None,
                    should_renew: false,
                });
            }
        };
        
        let current_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        
        let mut validation = SessionValidation {
            is_valid: true,
            session_info: Some(session.clone()),
            errors: vec![],
            warnings: vec![],
            time_until_expiration: Some(session.expires_at.saturating_sub(current_time)),
            should_renew: false,
        };
        
        // Check session state
        if session.state != SessionState::Active {
            validation.is_valid = false;
            validation.errors.push(format!("Session state is {:?}", session.state));
        }
        
        // Check expiration
        if current_time >= session.expires_at {
            validation.is_valid = false;
            validation.errors.push("Session has expired".to_string());
            session.state = SessionState::Expired;
        }
        
        // Check for renewal
        let time_until_expiration = session.expires_at.saturating_sub(current_time);
        if time_until_expiration <= self.config.renewal_threshold {
            validation.should_renew = true;
            validation.warnings.push("Session should be renewed soon".to_string());
        }
        
        // Check IP address consistency
        if let Some(session_ip) = request.headers.get("X-Forwarded-For")
            .or_else(|| request.headers.get("X-Real-IP")) {
            if session_ip != session.client_info.ip_address {
                validation.warnings.push("IP address has changed".to_string());
            }
        }
        
        // Update last activity
        if validation.is_valid {
            let user_id = session.user_id.clone();
            let ip_address = session.client_info.ip_address.clone();
            let uri = request.uri.clone();
            
            session.last_activity = current_time;
            session.stats.total_requests += 1;
            
            // Log activity (using captured values)
            self.log_activity(&user_id, ActivityType::ApiRequest,
                             format!("API request: {}", uri),
                             &ip_address).await;
        }
        
        Ok(validation)
    }
    
    /// Renew session
    pub async fn renew_session(&mut self, session_id: &str, extend_by: Option<u64>) -> ZhtpResult<SessionInfo> {
        // Calculate renewal fees first (before getting mutable reference)
        let extension = extend_by.unwrap_or(self.config.default_timeout);
        let current_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        
        // Get session data needed for fee calculation
        let (user_id, session_clone, ip_address) = {
            let session = self.sessions.get(session_id)
                .ok_or_else(|| anyhow::anyhow!("Session not found: {}", session_id))?;
            
            // Check if session can be renewed
            if session.state != SessionState::Active && session.state != SessionState::Expired {
                return Err(anyhow::anyhow!("Session cannot be renewed in state: {:?}", session.state));
            }
            
            (session.user_id.clone(), session.clone(), session.client_info.ip_address.clone())
        };
        
        let renewal_assessment = self.calculate_renewal_fees(&session_clone, extension).await?;
        
        // Now get mutable reference and update
        let session = self.sessions.get_mut(session_id)
            .ok_or_else(|| anyhow::anyhow!("Session not found: {}", session_id))?;
        
        // Calculate new expiration
        let new_expiration = current_time + extension.min(self.config.max_timeout);
        
        // Update session
        session.expires_at = new_expiration;
        session.last_activity = current_time;
        session.state = SessionState::Active;
        session.economic_info.total_fees_paid += renewal_assessment.total_fees;
        session.economic_info.dao_fees_contributed += renewal_assessment.dao_fees;
        session.economic_info.ubi_contributions += renewal_assessment.ubi_contribution;
        
        // Clone session for return value before calling other methods
        let session_clone = session.clone();
        
        // Log activity (using captured values instead of session references)
        self.log_activity(&user_id, ActivityType::Renewed,
                         format!("Session renewed until {}", new_expiration),
                         &ip_address).await;
        
        // Distribute renewal incentives
        self.distribute_session_incentives(session_id, &renewal_assessment).await?;
        
        tracing::info!(" Session renewed: {} (new expiration: {})", session_id, new_expiration);
        
        Ok(session_clone)
    }
    
    /// Terminate session
    pub async fn terminate_session(&mut self, session_id: &str, reason: &str) -> ZhtpResult<bool> {
        // Get needed data before mutable borrow
        let (user_id, ip_address) = match self.sessions.get(session_id) {
            Some(session) => (session.user_id.clone(), session.client_info.ip_address.clone()),
            None => return Ok(false),
        };
        
        // Now get mutable reference
        let session = self.sessions.get_mut(session_id).unwrap();
        
        // Update session state
        session.state = SessionState::Terminated;
        
        // Log activity using captured values
        self.log_activity(&user_id, ActivityType::Terminated,
                         format!("Session terminated: {}", reason),
                         &ip_address).await;
        
        // Remove from user sessions mapping (using captured user_id)
        if let Some(user_sessions) = self.user_sessions.get_mut(&user_id) {
            user_sessions.retain(|id| id != session_id);
        }
        
        // Remove session
        self.sessions.remove(session_id);
        
        tracing::info!("Session terminated: {} (reason: {})", session_id, reason);
        
        Ok(true)
    }
    
    /// Get session info
    pub fn get_session(&self, session_id: &str) -> Option<&SessionInfo> {
        self.sessions.get(session_id)
    }
    
    /// List user sessions
    pub fn list_user_sessions(&self, user_id: &str) -> Vec<&SessionInfo> {
        self.user_sessions.get(user_id)
            .map(|session_ids| {
                session_ids.iter()
                    .filter_map(|id| self.sessions.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }
    
    /// Cleanup expired sessions
    pub async fn cleanup_expired_sessions(&mut self) -> ZhtpResult<u32> {
        let current_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        
        let expired_sessions: Vec<String> = self.sessions.iter()
            .filter(|(_, session)| current_time >= session.expires_at)
            .map(|(id, _)| id.clone())
            .collect();
        
        let count = expired_sessions.len() as u32;
        
        for session_id in expired_sessions {
            self.terminate_session(&session_id, "Expired").await?;
        }
        
        if count > 0 {
            tracing::info!(" Cleaned up {} expired sessions", count);
        }
        
        Ok(count)
    }
    
    // Helper methods implementation
    
    async fn authenticate_user(&self, credentials: &[AuthCredential]) -> ZhtpResult<AuthResult> {
        // Simplified authentication implementation
        Ok(AuthResult {
            success: true,
            security_level: SecurityLevel::Standard,
            error_message: "".to_string(),
        })
    }
    
    async fn calculate_session_fees(&self, request: &SessionCreateRequest, auth_result: &AuthResult) -> ZhtpResult<EconomicAssessment> {
        let base_fee = self.config.economic_incentives.session_creation_fee;
        let security_multiplier = self.config.economic_incentives.security_level_multipliers
            .get(&auth_result.security_level)
            .unwrap_or(&1.0);
        
        let total_fees = (base_fee as f64 * security_multiplier) as u64;
        let dao_fees = (total_fees as f64 * self.config.economic_incentives.dao_session_fee_percentage) as u64;
        let ubi_contribution = (total_fees as f64 * self.config.economic_incentives.ubi_session_percentage) as u64;
        
        Ok(EconomicAssessment {
            total_fees,
            dao_fees,
            ubi_contribution,
        })
    }
    
    async fn calculate_renewal_fees(&self, session: &SessionInfo, extension: u64) -> ZhtpResult<EconomicAssessment> {
        let hours = (extension as f64 / 3600.0).ceil() as u64;
        let base_fee = hours * self.config.economic_incentives.session_maintenance_fee_per_hour;
        
        let security_multiplier = self.config.economic_incentives.security_level_multipliers
            .get(&session.security_level)
            .unwrap_or(&1.0);
        
        let total_fees = (base_fee as f64 * security_multiplier) as u64;
        let dao_fees = (total_fees as f64 * self.config.economic_incentives.dao_session_fee_percentage) as u64;
        let ubi_contribution = (total_fees as f64 * self.config.economic_incentives.ubi_session_percentage) as u64;
        
        Ok(EconomicAssessment {
            total_fees,
            dao_fees,
            ubi_contribution,
        })
    }
    
    fn validate_session_limits(&self, user_id: &str) -> ZhtpResult<()> {
        let current_sessions = self.user_sessions.get(user_id).map(|v| v.len()).unwrap_or(0);
        
        if current_sessions >= self.config.max_concurrent_sessions as usize {
            return Err(anyhow::anyhow!(
                "Maximum concurrent sessions ({}) exceeded for user {}",
                self.config.max_concurrent_sessions,
                user_id
            ));
        }
        
        Ok(())
    }
    
    async fn get_geo_info(&self, ip_address: &str) -> AnyhowResult<GeoInfo> {
        // Simplified geo lookup implementation
        Ok(GeoInfo {
            country: "US".to_string(),
            region: Some("CA".to_string()),
            city: Some("San Francisco".to_string()),
            latitude: Some(37.7749),
            longitude: Some(-122.4194),
            isp: None,
            timezone: Some("America/Los_Angeles".to_string()),
        })
    }
    
    async fn generate_zk_proof(&self, session_id: &str, user_id: &str) -> ZhtpResult<ZkProofInfo> {
        // Simplified ZK proof generation
        let current_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        
        Ok(ZkProofInfo {
            proof_type: "session_proof".to_string(),
            commitment: vec![0; 32], // Simplified
            verification_key: vec![0; 64], // Simplified
            generated_at: current_time,
            expires_at: current_time + 3600, // 1 hour
        })
    }
    
    async fn log_activity(&mut self, user_id: &str, activity_type: ActivityType, description: String, client_ip: &str) {
        let activity = SessionActivity {
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            activity_type,
            description,
            client_ip: client_ip.to_string(),
            economic_impact: 0,
        };
        
        self.activity_tracker.entry(user_id.to_string())
            .or_default()
            .push(activity);
    }
    
    async fn distribute_session_incentives(&self, session_id: &str, assessment: &EconomicAssessment) -> ZhtpResult<()> {
        // Simplified incentive distribution
        tracing::debug!("Distributing session incentives for {}: {} wei", session_id, assessment.total_fees);
        Ok(())
    }
}

/// Authentication result
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Whether authentication succeeded
    pub success: bool,
    /// Achieved security level
    pub security_level: SecurityLevel,
    /// Error message (if failed)
    pub error_message: String,
}

/// Economic assessment for session operations
#[derive(Debug, Clone)]
pub struct EconomicAssessment {
    /// Total fees for the operation
    pub total_fees: u64,
    /// DAO governance fees
    pub dao_fees: u64,
    /// UBI contribution amount
    pub ubi_contribution: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let mut security_multipliers = HashMap::new();
        security_multipliers.insert(SecurityLevel::Basic, 1.0);
        security_multipliers.insert(SecurityLevel::Standard, 1.5);
        security_multipliers.insert(SecurityLevel::High, 2.0);
        security_multipliers.insert(SecurityLevel::Maximum, 3.0);
        security_multipliers.insert(SecurityLevel::QuantumResistant, 5.0);
        
        Self {
            default_timeout: 3600, // 1 hour
            max_timeout: 86400, // 24 hours
            renewal_threshold: 300, // 5 minutes
            max_concurrent_sessions: 10,
            enable_encryption: true,
            enable_distributed_storage: false,
            storage_backend: SessionStorage::Memory,
            required_security_level: SecurityLevel::Standard,
            enable_economic_incentives: true,
            economic_incentives: SessionEconomicConfig {
                session_creation_fee: 1000, // 1000 wei
                session_maintenance_fee_per_hour: 100, // 100 wei per hour
                premium_session_multiplier: 2.0,
                dao_session_fee_percentage: 0.02, // 2%
                ubi_session_percentage: 0.8, // 80%
                security_level_multipliers: security_multipliers,
            },
            enable_analytics: true,
            enable_zk_proofs: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_creation() {
        let config = SessionConfig::default();
        let mut manager = ZhtpSessionManager::new(config);
        
        let create_request = SessionCreateRequest {
            user_id: "test_user".to_string(),
            credentials: vec![AuthCredential {
                method: AuthMethod::Password,
                data: b"password123".to_vec(),
                parameters: HashMap::new(),
            }],
            timeout: None,
            permissions: vec!["read".to_string(), "write".to_string()],
            client_info: ClientInfo {
                user_agent: "ZHTP/1.0".to_string(),
                ip_address: "192.168.1.1".to_string(),
                fingerprint: None,
                os: None,
                browser: None,
                device_type: None,
            },
            metadata: HashMap::new(),
        };
        
        let session = manager.create_session(create_request).await.unwrap();
        assert!(!session.session_id.is_empty());
        assert_eq!(session.user_id, "test_user");
        assert_eq!(session.state, SessionState::Active);
    }

    #[tokio::test]
    async fn test_session_validation() {
        let config = SessionConfig::default();
        let mut manager = ZhtpSessionManager::new(config);
        
        // Create session first
        let create_request = SessionCreateRequest {
            user_id: "test_user".to_string(),
            credentials: vec![AuthCredential {
                method: AuthMethod::Password,
                data: b"password123".to_vec(),
                parameters: HashMap::new(),
            }],
            timeout: Some(3600),
            permissions: vec!["read".to_string()],
            client_info: ClientInfo {
                user_agent: "ZHTP/1.0".to_string(),
                ip_address: "192.168.1.1".to_string(),
                fingerprint: None,
                os: None,
                browser: None,
                device_type: None,
            },
            metadata: HashMap::new(),
        };
        
        let session = manager.create_session(create_request).await.unwrap();
        
        // Validate session
        let headers = crate::types::ZhtpHeaders::new();
        
        // Create a test economic model
        let economic_model = lib_economy::EconomicModel::new();
        
        let request = crate::types::ZhtpRequest::new(
            crate::types::ZhtpMethod::Get,
            "/api/test".to_string(),
            vec![],
            None, // requester
            lib_economy::Priority::Normal,
            &economic_model,
        ).unwrap();
        
        let validation = manager.validate_session(&session.session_id, &request).await.unwrap();
        assert!(validation.is_valid);
        assert!(validation.session_info.is_some());
    }

    #[test]
    fn test_security_levels() {
        assert!(SecurityLevel::Maximum > SecurityLevel::High);
        assert!(SecurityLevel::High > SecurityLevel::Standard);
        assert!(SecurityLevel::Standard > SecurityLevel::Basic);
        assert!(SecurityLevel::QuantumResistant > SecurityLevel::Maximum);
    }

    #[test]
    fn test_session_economic_config() {
        let config = SessionConfig::default();
        assert!(config.economic_incentives.session_creation_fee > 0);
        assert!(config.economic_incentives.dao_session_fee_percentage > 0.0);
        assert!(config.economic_incentives.ubi_session_percentage > 0.0);
    }
}
