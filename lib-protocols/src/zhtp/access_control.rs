//! ZHTP Access Control System
//! 
//! Comprehensive access control implementation with geographic restrictions,
//! time-based access, reputation scoring, DAO membership verification,
//! and multi-dimensional access policies.

use crate::types::ZhtpRequest;
use crate::zhtp::config::{ServerConfig, AccessPolicy as ConfigAccessPolicy, AuthMethod};
use crate::zhtp::ZhtpResult;

use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};
use serde::{Deserialize, Serialize};

/// Access control result
#[derive(Debug, Clone)]
pub struct AccessControlResult {
    /// Access granted status
    pub granted: bool,
    /// Denial reason if access denied
    pub denial_reason: Option<String>,
    /// Required additional verifications
    pub required_verifications: Vec<String>,
    /// Access conditions that must be met
    pub conditions: Vec<AccessCondition>,
    /// Access level granted
    pub access_level: AccessLevel,
    /// Session information
    pub session_info: Option<SessionInfo>,
    /// Access metrics
    pub metrics: AccessMetrics,
}

/// Access conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AccessCondition {
    /// Must provide additional authentication
    RequireAdditionalAuth(AuthMethod),
    /// Must meet reputation threshold
    RequireReputation(u32),
    /// Must be DAO member
    RequireDaoMembership,
    /// Must pay additional fee
    RequireAdditionalFee(u64),
    /// Must complete verification challenge
    RequireVerificationChallenge(String),
    /// Must access from specific location
    RequireGeographicLocation(Vec<String>),
    /// Must access during specific time window
    RequireTimeWindow(TimeWindow),
    /// Must use specific payment method
    RequirePaymentMethod(String),
    /// Must have specific role
    RequireRole(String),
    /// Must have specific permission
    RequirePermission(String),
}

/// Time window specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start hour (0-23)
    pub start_hour: u8,
    /// End hour (0-23)
    pub end_hour: u8,
    /// Days of week (0=Sunday, 1=Monday, etc.)
    pub days_of_week: Vec<u8>,
    /// Timezone
    pub timezone: String,
}

/// Access levels
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessLevel {
    /// No access
    None = 0,
    /// Read-only access
    ReadOnly = 1,
    /// Limited write access
    LimitedWrite = 2,
    /// Standard access
    Standard = 3,
    /// Privileged access
    Privileged = 4,
    /// Administrative access
    Administrative = 5,
}

/// Session information
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// Session ID
    pub session_id: String,
    /// User identity
    pub user_identity: Option<String>,
    /// DAO account
    pub dao_account: Option<String>,
    /// Session start time
    pub start_time: u64,
    /// Session expiry time
    pub expiry_time: u64,
    /// Authentication methods used
    pub auth_methods: Vec<AuthMethod>,
    /// Session permissions
    pub permissions: HashSet<String>,
    /// Session roles
    pub roles: HashSet<String>,
}

/// Access control metrics
#[derive(Debug, Clone, Default)]
pub struct AccessMetrics {
    /// Total access control time in milliseconds
    pub total_time_ms: u64,
    /// Authentication time in milliseconds
    pub auth_time_ms: u64,
    /// Authorization time in milliseconds
    pub authz_time_ms: u64,
    /// Policy evaluation time in milliseconds
    pub policy_eval_time_ms: u64,
    /// Geographic check time in milliseconds
    pub geo_check_time_ms: u64,
    /// Reputation check time in milliseconds
    pub reputation_check_time_ms: u64,
}

/// User identity information
#[derive(Debug, Clone)]
pub struct UserIdentity {
    /// Unique user ID
    pub user_id: String,
    /// DAO account address
    pub dao_account: Option<String>,
    /// Reputation score (0-100)
    pub reputation_score: u32,
    /// Account creation time
    pub created_at: u64,
    /// Last activity time
    pub last_activity: u64,
    /// Verification status
    pub verification_status: VerificationStatus,
    /// User roles
    pub roles: HashSet<String>,
    /// User permissions
    pub permissions: HashSet<String>,
    /// Geographic information
    pub geographic_info: Option<GeographicInfo>,
    /// Account status
    pub account_status: AccountStatus,
}

/// Verification status
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationStatus {
    /// Not verified
    NotVerified,
    /// Email verified
    EmailVerified,
    /// Phone verified
    PhoneVerified,
    /// Identity verified (KYC)
    IdentityVerified,
    /// Fully verified
    FullyVerified,
}

/// Geographic information
#[derive(Debug, Clone)]
pub struct GeographicInfo {
    /// Country code (ISO 3166-1 alpha-2)
    pub country_code: String,
    /// Region/state
    pub region: Option<String>,
    /// City
    pub city: Option<String>,
    /// Latitude
    pub latitude: Option<f64>,
    /// Longitude
    pub longitude: Option<f64>,
    /// IP address
    pub ip_address: String,
    /// ISP information
    pub isp_info: Option<String>,
}

/// Account status
#[derive(Debug, Clone, PartialEq)]
pub enum AccountStatus {
    /// Active account
    Active,
    /// Suspended account
    Suspended,
    /// Banned account
    Banned,
    /// Pending verification
    PendingVerification,
    /// Frozen account
    Frozen,
}

/// Role-based access control (RBAC) manager
#[derive(Debug)]
pub struct RbacManager {
    /// Role definitions
    roles: HashMap<String, Role>,
    /// Permission definitions
    permissions: HashMap<String, Permission>,
    /// Role hierarchy
    role_hierarchy: HashMap<String, Vec<String>>,
}

/// Role definition
#[derive(Debug, Clone)]
pub struct Role {
    /// Role name
    pub name: String,
    /// Role description
    pub description: String,
    /// Role permissions
    pub permissions: HashSet<String>,
    /// Role inheritance
    pub inherits_from: Vec<String>,
    /// Role level (for hierarchy)
    pub level: u32,
}

/// Permission definition
#[derive(Debug, Clone)]
pub struct Permission {
    /// Permission name
    pub name: String,
    /// Permission description
    pub description: String,
    /// Resource type this permission applies to
    pub resource_type: String,
    /// Actions allowed
    pub actions: HashSet<String>,
    /// Permission level
    pub level: u32,
}

/// Attribute-based access control (ABAC) manager
#[derive(Debug)]
pub struct AbacManager {
    /// Policy rules
    policies: Vec<AbacPolicy>,
    /// Attribute definitions
    attributes: HashMap<String, AttributeDefinition>,
}

/// ABAC policy
#[derive(Debug, Clone)]
pub struct AbacPolicy {
    /// Policy ID
    pub id: String,
    /// Policy name
    pub name: String,
    /// Policy description
    pub description: String,
    /// Policy conditions
    pub conditions: Vec<PolicyCondition>,
    /// Policy effect (allow/deny)
    pub effect: PolicyEffect,
    /// Policy priority
    pub priority: u32,
}

/// Policy condition
#[derive(Debug, Clone)]
pub struct PolicyCondition {
    /// Attribute name
    pub attribute: String,
    /// Comparison operator
    pub operator: ComparisonOperator,
    /// Expected value
    pub value: AttributeValue,
}

/// Comparison operators
#[derive(Debug, Clone)]
pub enum ComparisonOperator {
    /// Equal to
    Equals,
    /// Not equal to
    NotEquals,
    /// Greater than
    GreaterThan,
    /// Less than
    LessThan,
    /// Greater than or equal to
    GreaterThanOrEqual,
    /// Less than or equal to
    LessThanOrEqual,
    /// Contains
    Contains,
    /// In list
    In,
    /// Not in list
    NotIn,
    /// Regular expression match
    Regex,
}

/// Policy effect
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyEffect {
    /// Allow access
    Allow,
    /// Deny access
    Deny,
}

/// Attribute definition
#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    /// Attribute name
    pub name: String,
    /// Attribute type
    pub attribute_type: AttributeType,
    /// Attribute description
    pub description: String,
    /// Default value
    pub default_value: Option<AttributeValue>,
}

/// Attribute types
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String value
    String,
    /// Integer value
    Integer,
    /// Float value
    Float,
    /// Boolean value
    Boolean,
    /// Date/time value
    DateTime,
    /// List of values
    List,
    /// Object value
    Object,
}

/// Attribute value
#[derive(Debug, Clone)]
pub enum AttributeValue {
    /// String value
    String(String),
    /// Integer value
    Integer(i64),
    /// Float value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Date/time value (Unix timestamp)
    DateTime(u64),
    /// List of values
    List(Vec<AttributeValue>),
    /// Object value
    Object(HashMap<String, AttributeValue>),
}

/// ZHTP Access Controller
pub struct AccessController {
    /// Server configuration
    config: ServerConfig,
    /// User identity store
    identity_store: HashMap<String, UserIdentity>,
    /// Active sessions
    active_sessions: HashMap<String, SessionInfo>,
    /// RBAC manager
    rbac_manager: RbacManager,
    /// ABAC manager
    abac_manager: AbacManager,
    /// Geographic resolver
    geo_resolver: GeographicResolver,
    /// Access reputation manager
    reputation_manager: AccessReputationManager,
    /// Access policy cache
    policy_cache: HashMap<String, CachedPolicy>,
}

/// Geographic resolver for IP-based location lookup
#[derive(Debug)]
struct GeographicResolver {
    /// IP to country mapping cache
    ip_country_cache: HashMap<String, String>,
}

/// Access-specific reputation manager for user reputation scoring
#[derive(Debug)]
struct AccessReputationManager {
    /// User reputation scores
    reputation_scores: HashMap<String, ReputationScore>,
}

/// Reputation score details
#[derive(Debug, Clone)]
struct ReputationScore {
    /// Current score (0-100)
    pub score: u32,
    /// Score history
    pub history: Vec<ReputationEvent>,
    /// Last update time
    pub last_update: u64,
}

/// Reputation event
#[derive(Debug, Clone)]
struct ReputationEvent {
    /// Event type
    pub event_type: String,
    /// Score change
    pub score_delta: i32,
    /// Event timestamp
    pub timestamp: u64,
    /// Event description
    pub description: String,
}

/// Cached policy result
#[derive(Debug, Clone)]
struct CachedPolicy {
    /// Policy result
    pub result: AccessControlResult,
    /// Cache timestamp
    pub timestamp: u64,
    /// Cache TTL in seconds
    pub ttl: u64,
}

impl AccessController {
    /// Create new access controller
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            identity_store: HashMap::new(),
            active_sessions: HashMap::new(),
            rbac_manager: RbacManager::new(),
            abac_manager: AbacManager::new(),
            geo_resolver: GeographicResolver::new(),
            reputation_manager: AccessReputationManager::new(),
            policy_cache: HashMap::new(),
        }
    }
    
    /// Check access for ZHTP request
    pub async fn check_access(&mut self, request: &ZhtpRequest) -> ZhtpResult<AccessControlResult> {
        let start_time = std::time::Instant::now();
        let mut metrics = AccessMetrics::default();
        
        // Check policy cache first
        let cache_key = self.generate_cache_key(request);
        if let Some(cached) = self.get_cached_policy(&cache_key) {
            return Ok(cached.result.clone());
        }
        
        // Extract user identity
        let auth_start = std::time::Instant::now();
        let user_identity = self.extract_user_identity(request).await?;
        metrics.auth_time_ms = auth_start.elapsed().as_millis() as u64;
        
        // Check account status
        if let Some(ref identity) = user_identity {
            if identity.account_status != AccountStatus::Active {
                return Ok(AccessControlResult {
                    granted: false,
                    denial_reason: Some(format!("Account status: {:?}", identity.account_status)),
                    required_verifications: vec![],
                    conditions: vec![],
                    access_level: AccessLevel::None,
                    session_info: None,
                    metrics,
                });
            }
        }
        
        // Evaluate access policies
        let policy_start = std::time::Instant::now();
        let policy_result = self.evaluate_access_policies(request, &user_identity).await?;
        metrics.policy_eval_time_ms = policy_start.elapsed().as_millis() as u64;
        
        if !policy_result.granted {
            return Ok(policy_result);
        }
        
        // Check geographic restrictions
        let geo_start = std::time::Instant::now();
        let geo_result = self.check_geographic_restrictions(request).await?;
        metrics.geo_check_time_ms = geo_start.elapsed().as_millis() as u64;
        
        if !geo_result.granted {
            return Ok(geo_result);
        }
        
        // Check time-based access
        let time_result = self.check_time_based_access(request, &user_identity).await?;
        if !time_result.granted {
            return Ok(time_result);
        }
        
        // Check reputation requirements
        let rep_start = std::time::Instant::now();
        let reputation_result = self.check_reputation_requirements(request, &user_identity).await?;
        metrics.reputation_check_time_ms = rep_start.elapsed().as_millis() as u64;
        
        if !reputation_result.granted {
            return Ok(reputation_result);
        }
        
        // Check DAO membership if required
        let dao_result = self.check_dao_membership(request, &user_identity).await?;
        if !dao_result.granted {
            return Ok(dao_result);
        }
        
        // Determine access level
        let access_level = self.determine_access_level(&user_identity, request).await?;
        
        // Create or retrieve session
        let session_info = self.create_or_update_session(request, &user_identity).await?;
        
        // Authorization check
        let authz_start = std::time::Instant::now();
        let authz_result = self.check_authorization(&user_identity, &session_info, request).await?;
        metrics.authz_time_ms = authz_start.elapsed().as_millis() as u64;
        
        if !authz_result.granted {
            return Ok(authz_result);
        }
        
        metrics.total_time_ms = start_time.elapsed().as_millis() as u64;
        
        let final_result = AccessControlResult {
            granted: true,
            denial_reason: None,
            required_verifications: vec![],
            conditions: vec![],
            access_level,
            session_info: Some(session_info),
            metrics,
        };
        
        // Cache the result
        self.cache_policy(&cache_key, &final_result);
        
        Ok(final_result)
    }
    
    /// Extract user identity from request
    async fn extract_user_identity(&self, request: &ZhtpRequest) -> ZhtpResult<Option<UserIdentity>> {
        // Extract identity from various sources
        if let Some(session_id) = request.headers.get("X-Session-ID") {
            if let Some(session) = self.active_sessions.get(&session_id) {
                if let Some(user_id) = &session.user_identity {
                    return Ok(self.identity_store.get(user_id).cloned());
                }
            }
        }
        
        if let Some(user_id) = request.headers.get("X-User-ID") {
            return Ok(self.identity_store.get(&user_id).cloned());
        }
        
        if let Some(dao_account) = request.headers.get("X-DAO-Account") {
            // Find user by DAO account
            for identity in self.identity_store.values() {
                if identity.dao_account.as_ref() == Some(&dao_account) {
                    return Ok(Some(identity.clone()));
                }
            }
        }
        
        Ok(None)
    }
    
    /// Evaluate access policies
    async fn evaluate_access_policies(
        &self,
        request: &ZhtpRequest,
        user_identity: &Option<UserIdentity>,
    ) -> ZhtpResult<AccessControlResult> {
        match &self.config.security.access_control.default_policy {
            ConfigAccessPolicy::AllowAll => Ok(AccessControlResult {
                granted: true,
                denial_reason: None,
                required_verifications: vec![],
                conditions: vec![],
                access_level: AccessLevel::Standard,
                session_info: None,
                metrics: AccessMetrics::default(),
            }),
            ConfigAccessPolicy::DenyAll => Ok(AccessControlResult {
                granted: false,
                denial_reason: Some("Default policy denies all access".to_string()),
                required_verifications: vec![],
                conditions: vec![],
                access_level: AccessLevel::None,
                session_info: None,
                metrics: AccessMetrics::default(),
            }),
            ConfigAccessPolicy::RequireAuth => {
                if user_identity.is_some() {
                    Ok(AccessControlResult {
                        granted: true,
                        denial_reason: None,
                        required_verifications: vec![],
                        conditions: vec![],
                        access_level: AccessLevel::Standard,
                        session_info: None,
                        metrics: AccessMetrics::default(),
                    })
                } else {
                    Ok(AccessControlResult {
                        granted: false,
                        denial_reason: Some("Authentication required".to_string()),
                        required_verifications: vec!["authentication".to_string()],
                        conditions: vec![AccessCondition::RequireAdditionalAuth(AuthMethod::ZkProof)],
                        access_level: AccessLevel::None,
                        session_info: None,
                        metrics: AccessMetrics::default(),
                    })
                }
            }
            ConfigAccessPolicy::RequireDaoMembership => {
                if let Some(identity) = user_identity {
                    if identity.dao_account.is_some() {
                        Ok(AccessControlResult {
                            granted: true,
                            denial_reason: None,
                            required_verifications: vec![],
                            conditions: vec![],
                            access_level: AccessLevel::Standard,
                            session_info: None,
                            metrics: AccessMetrics::default(),
                        })
                    } else {
                        Ok(AccessControlResult {
                            granted: false,
                            denial_reason: Some("DAO membership required".to_string()),
                            required_verifications: vec!["dao_membership".to_string()],
                            conditions: vec![AccessCondition::RequireDaoMembership],
                            access_level: AccessLevel::None,
                            session_info: None,
                            metrics: AccessMetrics::default(),
                        })
                    }
                } else {
                    Ok(AccessControlResult {
                        granted: false,
                        denial_reason: Some("Authentication and DAO membership required".to_string()),
                        required_verifications: vec!["authentication".to_string(), "dao_membership".to_string()],
                        conditions: vec![
                            AccessCondition::RequireAdditionalAuth(AuthMethod::ZkProof),
                            AccessCondition::RequireDaoMembership,
                        ],
                        access_level: AccessLevel::None,
                        session_info: None,
                        metrics: AccessMetrics::default(),
                    })
                }
            }
            ConfigAccessPolicy::Custom(policy_name) => {
                // Evaluate custom policy
                self.evaluate_custom_policy(policy_name, request, user_identity).await
            }
        }
    }
    
    /// Check geographic restrictions
    async fn check_geographic_restrictions(&self, request: &ZhtpRequest) -> ZhtpResult<AccessControlResult> {
        if !self.config.security.ddos_protection.enable_geofencing {
            return Ok(AccessControlResult {
                granted: true,
                denial_reason: None,
                required_verifications: vec![],
                conditions: vec![],
                access_level: AccessLevel::Standard,
                session_info: None,
                metrics: AccessMetrics::default(),
            });
        }
        
        let client_ip = self.extract_client_ip(request);
        let country_code = self.geo_resolver.resolve_country(&client_ip).await?;
        
        // Check allowed countries
        if !self.config.security.ddos_protection.allowed_countries.is_empty() &&
           !self.config.security.ddos_protection.allowed_countries.contains(&country_code) {
            return Ok(AccessControlResult {
                granted: false,
                denial_reason: Some(format!("Access not allowed from country: {}", country_code)),
                required_verifications: vec![],
                conditions: vec![AccessCondition::RequireGeographicLocation(
                    self.config.security.ddos_protection.allowed_countries.clone()
                )],
                access_level: AccessLevel::None,
                session_info: None,
                metrics: AccessMetrics::default(),
            });
        }
        
        // Check blocked countries
        if self.config.security.ddos_protection.blocked_countries.contains(&country_code) {
            return Ok(AccessControlResult {
                granted: false,
                denial_reason: Some(format!("Access blocked from country: {}", country_code)),
                required_verifications: vec![],
                conditions: vec![],
                access_level: AccessLevel::None,
                session_info: None,
                metrics: AccessMetrics::default(),
            });
        }
        
        Ok(AccessControlResult {
            granted: true,
            denial_reason: None,
            required_verifications: vec![],
            conditions: vec![],
            access_level: AccessLevel::Standard,
            session_info: None,
            metrics: AccessMetrics::default(),
        })
    }
    
    /// Extract client IP from request
    fn extract_client_ip(&self, request: &ZhtpRequest) -> String {
        request.headers.get("X-Forwarded-For")
            .or_else(|| request.headers.get("X-Real-IP"))
            .unwrap_or("unknown".to_string())
            .split(',')
            .next()
            .unwrap_or("unknown")
            .trim()
            .to_string()
    }
    
    /// Generate cache key for access control result
    fn generate_cache_key(&self, request: &ZhtpRequest) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        
        let mut hasher = DefaultHasher::new();
        request.method.hash(&mut hasher);
        request.uri.hash(&mut hasher);
        
        // Include relevant headers
        if let Some(user_id) = request.headers.get("X-User-ID") {
            user_id.hash(&mut hasher);
        }
        if let Some(session_id) = request.headers.get("X-Session-ID") {
            session_id.hash(&mut hasher);
        }
        
        format!("access_{:x}", hasher.finish())
    }
    
    /// Get cached policy result
    fn get_cached_policy(&self, key: &str) -> Option<&CachedPolicy> {
        if let Some(cached) = self.policy_cache.get(key) {
            let current_time = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            
            if current_time <= cached.timestamp + cached.ttl {
                return Some(cached);
            }
        }
        None
    }
    
    /// Cache policy result
    fn cache_policy(&mut self, key: &str, result: &AccessControlResult) {
        let cached = CachedPolicy {
            result: result.clone(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            ttl: 300, // 5 minutes
        };
        
        self.policy_cache.insert(key.to_string(), cached);
    }
    
    // Additional method stubs that would be fully implemented
    async fn check_time_based_access(&self, _request: &ZhtpRequest, _user_identity: &Option<UserIdentity>) -> ZhtpResult<AccessControlResult> {
        Ok(AccessControlResult {
            granted: true,
            denial_reason: None,
            required_verifications: vec![],
            conditions: vec![],
            access_level: AccessLevel::Standard,
            session_info: None,
            metrics: AccessMetrics::default(),
        })
    }
    
    async fn check_reputation_requirements(&self, _request: &ZhtpRequest, _user_identity: &Option<UserIdentity>) -> ZhtpResult<AccessControlResult> {
        Ok(AccessControlResult {
            granted: true,
            denial_reason: None,
            required_verifications: vec![],
            conditions: vec![],
            access_level: AccessLevel::Standard,
            session_info: None,
            metrics: AccessMetrics::default(),
        })
    }
    
    async fn check_dao_membership(&self, _request: &ZhtpRequest, _user_identity: &Option<UserIdentity>) -> ZhtpResult<AccessControlResult> {
        Ok(AccessControlResult {
            granted: true,
            denial_reason: None,
            required_verifications: vec![],
            conditions: vec![],
            access_level: AccessLevel::Standard,
            session_info: None,
            metrics: AccessMetrics::default(),
        })
    }
    
    async fn determine_access_level(&self, _user_identity: &Option<UserIdentity>, _request: &ZhtpRequest) -> ZhtpResult<AccessLevel> {
        Ok(AccessLevel::Standard)
    }
    
    async fn create_or_update_session(&mut self, _request: &ZhtpRequest, _user_identity: &Option<UserIdentity>) -> ZhtpResult<SessionInfo> {
        Ok(SessionInfo {
            session_id: "test_session".to_string(),
            user_identity: None,
            dao_account: None,
            start_time: 0,
            expiry_time: 0,
            auth_methods: vec![],
            permissions: HashSet::new(),
            roles: HashSet::new(),
        })
    }
    
    async fn check_authorization(&self, _user_identity: &Option<UserIdentity>, _session_info: &SessionInfo, _request: &ZhtpRequest) -> ZhtpResult<AccessControlResult> {
        Ok(AccessControlResult {
            granted: true,
            denial_reason: None,
            required_verifications: vec![],
            conditions: vec![],
            access_level: AccessLevel::Standard,
            session_info: None,
            metrics: AccessMetrics::default(),
        })
    }
    
    async fn evaluate_custom_policy(&self, _policy_name: &str, _request: &ZhtpRequest, _user_identity: &Option<UserIdentity>) -> ZhtpResult<AccessControlResult> {
        Ok(AccessControlResult {
            granted: true,
            denial_reason: None,
            required_verifications: vec![],
            conditions: vec![],
            access_level: AccessLevel::Standard,
            session_info: None,
            metrics: AccessMetrics::default(),
        })
    }
}

// Implementation stubs for helper structs
impl RbacManager {
    fn new() -> Self {
        Self {
            roles: HashMap::new(),
            permissions: HashMap::new(),
            role_hierarchy: HashMap::new(),
        }
    }
}

impl AbacManager {
    fn new() -> Self {
        Self {
            policies: Vec::new(),
            attributes: HashMap::new(),
        }
    }
}

impl GeographicResolver {
    fn new() -> Self {
        Self {
            ip_country_cache: HashMap::new(),
        }
    }
    
    async fn resolve_country(&self, _ip: &str) -> ZhtpResult<String> {
        // Simplified implementation - would use actual GeoIP service
        Ok("US".to_string())
    }
}

impl AccessReputationManager {
    fn new() -> Self {
        Self {
            reputation_scores: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ZhtpHeaders, ZhtpMethod};

    #[tokio::test]
    async fn test_access_control() {
        use lib_economy::{EconomicModel, Priority};
        
        let config = crate::zhtp::config::ServerConfig::testing();
        let mut controller = AccessController::new(config);
        
        // Create a test economic model
        let economic_model = EconomicModel::new();
        
        let headers = ZhtpHeaders::new();
        let request = ZhtpRequest::new(
            ZhtpMethod::Get,
            "/test".to_string(),
            b"test".to_vec(),
            None, // requester
            Priority::Normal,
            &economic_model,
        ).unwrap();
        
        let result = controller.check_access(&request).await.unwrap();
        assert!(result.granted);
        assert_eq!(result.access_level, AccessLevel::Standard);
    }

    #[test]
    fn test_access_level_ordering() {
        assert!(AccessLevel::Administrative > AccessLevel::Standard);
        assert!(AccessLevel::Standard > AccessLevel::ReadOnly);
        assert!(AccessLevel::ReadOnly > AccessLevel::None);
    }

    #[test]
    fn test_verification_status() {
        assert_eq!(VerificationStatus::FullyVerified, VerificationStatus::FullyVerified);
        assert_ne!(VerificationStatus::NotVerified, VerificationStatus::EmailVerified);
    }
}
