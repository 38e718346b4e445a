//! Monitoring Module
//! 
//! Provides peer reputation, performance metrics, and alerting

pub mod reputation;
pub mod metrics;
pub mod alerts;

pub use reputation::{PeerReputation, PeerRateLimit, PeerPerformanceStats};
pub use metrics::{SyncPerformanceMetrics, BroadcastMetrics, MetricsSnapshot, MetricsHistory};
pub use alerts::{AlertLevel, SyncAlert, AlertThresholds};
