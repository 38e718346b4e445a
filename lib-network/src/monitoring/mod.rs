pub mod health_monitoring;

// Re-export the main health monitoring types
pub use health_monitoring::{HealthMonitor, NetworkHealthSummary};

// Network health monitoring and statistics
