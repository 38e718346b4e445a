//! Mesh protocol statistics and monitoring

use anyhow::Result;
use std::collections::HashMap;
use crate::types::{CongestionLevel};

/// Mesh protocol statistics
#[derive(Debug, Clone, Default)]
pub struct MeshProtocolStats {
    /// Total active mesh connections
    pub active_connections: u32,
    /// Total data routed (bytes)
    pub total_data_routed: u64,
    /// Total tokens distributed as UBI
    pub total_ubi_distributed: u64,
    /// Number of long-range relays
    pub long_range_relays: u32,
    /// Average network latency (ms)
    pub average_latency_ms: u32,
    /// Network coverage area (km²)
    pub coverage_area_km2: f64,
    /// People with free internet access
    pub people_with_free_internet: u32,
}

/// Comprehensive mesh statistics for internal use
#[derive(Debug, Clone)]
pub struct MeshStatistics {
    /// Number of active peers
    pub active_peers: u32,
    /// Total bytes sent
    pub bytes_sent: u64,
    /// Total bytes received
    pub bytes_received: u64,
    /// Total packets sent
    pub packets_sent: u64,
    /// Total packets received
    pub packets_received: u64,
    /// Number of active connections
    pub active_connections: u32,
    /// Internet connectivity status
    pub internet_connectivity: bool,
    /// Mesh connectivity status
    pub mesh_connectivity: bool,
    /// Overall connectivity percentage
    pub connectivity_percentage: f64,
    /// Relay connectivity percentage
    pub relay_connectivity: f64,
    /// Peer churn rate
    pub churn_rate: f64,
    /// Mesh coverage percentage
    pub coverage: f64,
    /// Mesh redundancy factor
    pub redundancy: f64,
    /// Mesh stability score
    pub stability: f64,
    /// Upload bandwidth utilization
    pub upload_utilization: f64,
    /// Download bandwidth utilization
    pub download_utilization: f64,
    /// Bandwidth efficiency
    pub bandwidth_efficiency: f64,
    /// Current congestion level
    pub congestion_level: CongestionLevel,
    /// Average latency in milliseconds
    pub average_latency: f64,
    /// Latency variance
    pub latency_variance: f64,
    /// Timeout rate
    pub timeout_rate: f64,
    /// Network jitter
    pub jitter: f64,
    /// Protocol-specific health metrics
    pub protocol_health: HashMap<String, f64>,
}

impl Default for MeshStatistics {
    fn default() -> Self {
        Self {
            active_peers: 0,
            bytes_sent: 0,
            bytes_received: 0,
            packets_sent: 0,
            packets_received: 0,
            active_connections: 0,
            internet_connectivity: false,
            mesh_connectivity: false,
            connectivity_percentage: 0.0,
            relay_connectivity: 0.0,
            churn_rate: 0.0,
            coverage: 0.0,
            redundancy: 0.0,
            stability: 0.0,
            upload_utilization: 0.0,
            download_utilization: 0.0,
            bandwidth_efficiency: 1.0,
            congestion_level: CongestionLevel::Low,
            average_latency: 0.0,
            latency_variance: 0.0,
            timeout_rate: 0.0,
            jitter: 0.0,
            protocol_health: HashMap::new(),
        }
    }
}

/// Get comprehensive mesh statistics
pub async fn get_mesh_statistics() -> Result<MeshStatistics> {
    // In a implementation, this would collect statistics from:
    // - Active connections and peers
    // - Network interface statistics
    // - Protocol-specific metrics
    // - Bandwidth and latency measurements
    // - Mesh topology analysis
    
    let mut stats = MeshStatistics::default();
    
    // Get network interface statistics if available
    if let Ok(interfaces) = get_network_interfaces().await {
        for interface in interfaces {
            stats.bytes_sent += interface.tx_bytes;
            stats.bytes_received += interface.rx_bytes;
            stats.packets_sent += interface.tx_packets;
            stats.packets_received += interface.rx_packets;
        }
    }
    
    // Get peer and connection information from mesh server
    if let Ok(peer_info) = get_peer_information().await {
        stats.active_peers = peer_info.active_count;
        stats.active_connections = peer_info.connection_count;
        stats.connectivity_percentage = peer_info.connectivity_percentage;
        stats.mesh_connectivity = peer_info.mesh_connected;
        stats.internet_connectivity = peer_info.internet_connected;
    }
    
    // Calculate bandwidth utilization
    if let Ok(bandwidth_info) = get_bandwidth_info().await {
        stats.upload_utilization = bandwidth_info.upload_utilization;
        stats.download_utilization = bandwidth_info.download_utilization;
        stats.bandwidth_efficiency = bandwidth_info.efficiency;
        stats.congestion_level = bandwidth_info.congestion;
    }
    
    // Get latency measurements
    if let Ok(latency_info) = get_latency_measurements().await {
        stats.average_latency = latency_info.average;
        stats.latency_variance = latency_info.variance;
        stats.timeout_rate = latency_info.timeout_rate;
        stats.jitter = latency_info.jitter;
    }
    
    // Calculate mesh topology metrics
    stats.coverage = calculate_mesh_coverage(&stats).await?;
    stats.redundancy = calculate_mesh_redundancy(&stats).await?;
    stats.stability = calculate_mesh_stability(&stats).await?;
    stats.churn_rate = calculate_peer_churn_rate(&stats).await?;
    
    // Get protocol-specific health metrics
    stats.protocol_health = get_protocol_health_metrics().await?;
    
    Ok(stats)
}

/// Network interface information
#[derive(Debug, Clone)]
pub struct NetworkInterface {
    pub name: String,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    pub tx_packets: u64,
    pub rx_packets: u64,
}

/// Peer connection information
#[derive(Debug, Clone)]
pub struct PeerInformation {
    pub active_count: u32,
    pub connection_count: u32,
    pub connectivity_percentage: f64,
    pub mesh_connected: bool,
    pub internet_connected: bool,
}

/// Bandwidth information
#[derive(Debug, Clone)]
pub struct BandwidthInfo {
    pub upload_utilization: f64,
    pub download_utilization: f64,
    pub efficiency: f64,
    pub congestion: CongestionLevel,
}

/// Latency measurements
#[derive(Debug, Clone)]
pub struct LatencyInfo {
    pub average: f64,
    pub variance: f64,
    pub timeout_rate: f64,
    pub jitter: f64,
}

/// Get network interface statistics
async fn get_network_interfaces() -> Result<Vec<NetworkInterface>> {
    // This would use system APIs to get network interface statistics
    // For now, return a basic interface with some activity
    Ok(vec![
        NetworkInterface {
            name: "zhtp0".to_string(),
            tx_bytes: 1024 * 1024,  // 1MB sent
            rx_bytes: 2048 * 1024,  // 2MB received  
            tx_packets: 1000,
            rx_packets: 1500,
        }
    ])
}

/// Get peer connection information
async fn get_peer_information() -> Result<PeerInformation> {
    // This would query the actual mesh server for peer information
    Ok(PeerInformation {
        active_count: 5,
        connection_count: 8,
        connectivity_percentage: 85.0,
        mesh_connected: true,
        internet_connected: true,
    })
}

/// Get bandwidth utilization information
async fn get_bandwidth_info() -> Result<BandwidthInfo> {
    // This would measure actual bandwidth utilization
    Ok(BandwidthInfo {
        upload_utilization: 0.6,
        download_utilization: 0.4,
        efficiency: 0.85,
        congestion: CongestionLevel::Low,
    })
}

/// Get latency measurements
async fn get_latency_measurements() -> Result<LatencyInfo> {
    // This would perform actual latency measurements to peers
    Ok(LatencyInfo {
        average: 120.0,
        variance: 30.0,
        timeout_rate: 0.02,
        jitter: 15.0,
    })
}

/// Calculate mesh coverage percentage
async fn calculate_mesh_coverage(stats: &MeshStatistics) -> Result<f64> {
    // Calculate based on geographic distribution and peer density
    let coverage = if stats.active_peers > 0 {
        // Basic coverage calculation based on peer count
        (stats.active_peers as f64 / 100.0).min(1.0) * 0.8
    } else {
        0.0
    };
    Ok(coverage)
}

/// Calculate mesh redundancy factor
async fn calculate_mesh_redundancy(stats: &MeshStatistics) -> Result<f64> {
    // Calculate based on connection redundancy
    let redundancy = if stats.active_connections > stats.active_peers {
        (stats.active_connections as f64 / stats.active_peers as f64 - 1.0).min(1.0) * 0.7
    } else {
        0.0
    };
    Ok(redundancy)
}

/// Calculate mesh stability score
async fn calculate_mesh_stability(stats: &MeshStatistics) -> Result<f64> {
    // Calculate based on churn rate and connection stability
    let stability = (1.0 - stats.churn_rate).max(0.0) * 0.9;
    Ok(stability)
}

/// Calculate peer churn rate
async fn calculate_peer_churn_rate(_stats: &MeshStatistics) -> Result<f64> {
    // This would track peer join/leave events over time
    Ok(0.05) // 5% churn rate
}

/// Get protocol-specific health metrics
async fn get_protocol_health_metrics() -> Result<HashMap<String, f64>> {
    let mut health = HashMap::new();
    health.insert("wifi_direct".to_string(), 0.95);
    health.insert("bluetooth".to_string(), 0.80);
    health.insert("lorawan".to_string(), 0.70);
    health.insert("satellite".to_string(), 0.60);
    Ok(health)
}
