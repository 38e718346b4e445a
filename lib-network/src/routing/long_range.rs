//! Global Long-Range Routing Implementation
//! 
//! Intercontinental mesh routing for global coverage

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use lib_crypto::PublicKey;
use serde::{Serialize, Deserialize};

use crate::identity::unified_peer::UnifiedPeerId;
use crate::relays::LongRangeRelay;
use crate::types::relay_type::LongRangeRelayType;
use crate::types::geographic::GeographicLocation;
use crate::routing::message_routing::RouteHop;
use crate::protocols::NetworkProtocol;

/// Global long-range routing manager for intercontinental mesh
pub struct LongRangeRoutingManager {
    /// Available long-range relays
    pub long_range_relays: Arc<RwLock<HashMap<String, LongRangeRelay>>>,
    /// Global routing table for continent-to-continent paths
    pub global_routing_table: Arc<RwLock<GlobalRoutingTable>>,
    /// Satellite uplink pool
    pub satellite_uplinks: Arc<RwLock<Vec<SatelliteUplink>>>,
    /// Intercontinental backbone routes
    pub backbone_routes: Arc<RwLock<Vec<BackboneRoute>>>,
}

/// Global routing table for intercontinental routing
#[derive(Debug, Clone)]
pub struct GlobalRoutingTable {
    /// Continent-to-continent routing paths
    pub continental_routes: HashMap<(Continent, Continent), Vec<IntercontinentalPath>>,
    /// Satellite constellation mapping
    pub satellite_constellations: HashMap<String, SatelliteConstellation>,
    /// Global internet bridge points
    pub internet_bridges: HashMap<String, InternetBridge>,
    /// Oceanic relay chains for trans-oceanic routing
    pub oceanic_relays: HashMap<String, OceanicRelayChain>,
}

/// Continental identifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Continent {
    NorthAmerica,
    SouthAmerica,
    Europe,
    Asia,
    Africa,
    Australia,
    Antarctica,
}

/// Intercontinental routing path
#[derive(Debug, Clone)]
pub struct IntercontinentalPath {
    /// Source continent
    pub source: Continent,
    /// Destination continent
    pub destination: Continent,
    /// Relay hops for this intercontinental path
    pub relay_hops: Vec<GlobalRelayHop>,
    /// Path quality score (0.0 to 1.0)
    pub quality_score: f64,
    /// Estimated latency in milliseconds
    pub estimated_latency_ms: u32,
    /// Maximum throughput in Mbps
    pub max_throughput_mbps: u32,
    /// Path type (satellite, cable, mesh, hybrid)
    pub path_type: PathType,
}

/// Global relay hop for intercontinental routing
#[derive(Debug, Clone)]
pub struct GlobalRelayHop {
    /// Relay identifier
    pub relay_id: String,
    /// Relay type
    pub relay_type: LongRangeRelayType,
    /// Geographic position
    pub location: GeographicLocation,
    /// Coverage radius in kilometers
    pub coverage_radius_km: f64,
    /// Hop latency in milliseconds
    pub latency_ms: u32,
    /// Throughput capacity in Mbps
    pub throughput_mbps: u32,
}

/// Path type for intercontinental routing
#[derive(Debug, Clone, PartialEq)]
pub enum PathType {
    /// Direct satellite link (fastest, global)
    DirectSatellite,
    /// Internet bridge routing
    InternetBridge,
    /// Multi-hop mesh relays
    MeshRelay,
    /// Hybrid path using multiple technologies
    Hybrid,
    /// Oceanic relay chain (ships, buoys, islands)
    OceanicRelay,
}

/// Satellite constellation for global coverage
#[derive(Debug, Clone)]
pub struct SatelliteConstellation {
    /// Constellation name (Starlink, OneWeb, etc.)
    pub name: String,
    /// Number of active satellites
    pub satellite_count: u32,
    /// Coverage areas
    pub coverage_areas: Vec<SatelliteCoverageArea>,
    /// Constellation operator
    pub operator: PublicKey,
    /// Cost per MB for routing
    pub cost_per_mb: u64,
}

/// Satellite coverage area
#[derive(Debug, Clone)]
pub struct SatelliteCoverageArea {
    /// Center coordinates
    pub center: GeographicLocation,
    /// Coverage radius in kilometers
    pub radius_km: f64,
    /// Active satellite count in this area
    pub active_satellites: u32,
}

/// Satellite uplink for global routing
#[derive(Debug, Clone)]
pub struct SatelliteUplink {
    /// Uplink identifier
    pub uplink_id: String,
    /// Satellite constellation
    pub constellation: String,
    /// Ground station location
    pub ground_station: GeographicLocation,
    /// Uplink capacity in Mbps
    pub uplink_capacity_mbps: u32,
    /// Current utilization percentage
    pub utilization_percent: f32,
    /// Operator public key
    pub operator: PublicKey,
}

/// Internet bridge for global routing
#[derive(Debug, Clone)]
pub struct InternetBridge {
    /// Bridge identifier
    pub bridge_id: String,
    /// Physical location
    pub location: GeographicLocation,
    /// Available bandwidth in Mbps
    pub bandwidth_mbps: u32,
    /// Bridge operator
    pub operator: PublicKey,
    /// Supported protocols
    pub protocols: Vec<String>,
}

/// Oceanic relay chain for trans-oceanic routing
#[derive(Debug, Clone)]
pub struct OceanicRelayChain {
    /// Chain identifier
    pub chain_id: String,
    /// Ocean being covered
    pub ocean: String,
    /// Relay stations (ships, buoys, islands)
    pub relay_stations: Vec<OceanicRelay>,
    /// Total chain length in kilometers
    pub total_distance_km: f64,
}

/// Individual oceanic relay station
#[derive(Debug, Clone)]
pub struct OceanicRelay {
    /// Station identifier
    pub station_id: String,
    /// Station type (ship, buoy, island, platform)
    pub station_type: String,
    /// Current position
    pub position: GeographicLocation,
    /// Communication range in kilometers
    pub range_km: f64,
    /// Station operator
    pub operator: PublicKey,
}

/// Backbone route for high-capacity intercontinental traffic
#[derive(Debug, Clone)]
pub struct BackboneRoute {
    /// Route identifier
    pub route_id: String,
    /// Source continent
    pub source_continent: Continent,
    /// Destination continent
    pub destination_continent: Continent,
    /// Backbone capacity in Gbps
    pub capacity_gbps: u32,
    /// Route hops
    pub hops: Vec<BackboneHop>,
    /// Route priority (higher = more preferred)
    pub priority: u8,
}

/// Backbone hop for high-capacity routing
#[derive(Debug, Clone)]
pub struct BackboneHop {
    /// Hop identifier
    pub hop_id: String,
    /// Hop type (satellite, fiber, mesh)
    pub hop_type: String,
    /// Hop capacity in Gbps
    pub capacity_gbps: u32,
    /// Hop latency in milliseconds
    pub latency_ms: u32,
}

impl LongRangeRoutingManager {
    /// Create new long-range routing manager
    pub fn new(long_range_relays: Arc<RwLock<HashMap<String, LongRangeRelay>>>) -> Self {
        Self {
            long_range_relays,
            global_routing_table: Arc::new(RwLock::new(GlobalRoutingTable {
                continental_routes: HashMap::new(),
                satellite_constellations: HashMap::new(),
                internet_bridges: HashMap::new(),
                oceanic_relays: HashMap::new(),
            })),
            satellite_uplinks: Arc::new(RwLock::new(Vec::new())),
            backbone_routes: Arc::new(RwLock::new(Vec::new())),
        }
    }
    
    /// Initialize global routing infrastructure
    pub async fn initialize_global_routing(&self) -> Result<()> {
        info!("Initializing GLOBAL routing infrastructure...");
        
        // Initialize satellite constellations
        self.initialize_satellite_constellations().await?;
        
        // Initialize internet bridges
        self.initialize_internet_bridges().await?;
        
        // Initialize oceanic relay chains
        self.initialize_oceanic_relays().await?;
        
        // Build intercontinental routing table
        self.build_intercontinental_routes().await?;
        
        // Initialize backbone routes
        self.initialize_backbone_routes().await?;
        
        info!("Global routing infrastructure initialized - PLANETARY mesh network ready!");
        Ok(())
    }
    
    /// Initialize satellite constellations for global coverage
    async fn initialize_satellite_constellations(&self) -> Result<()> {
        info!("🛰️ Initializing satellite constellations for GLOBAL coverage...");
        
        let mut routing_table = self.global_routing_table.write().await;
        
        // Add major satellite constellations
        let constellations = vec![
            ("Starlink", 12000, 550.0), // 12,000 satellites at 550km altitude
            ("OneWeb", 7700, 1200.0),   // 7,700 satellites at 1,200km altitude
            ("Amazon Kuiper", 13000, 630.0), // 13,000 satellites at 630km altitude
            ("Telesat", 1671, 1000.0),  // 1,671 satellites at 1,000km altitude
        ];
        
        for (name, count, altitude_km) in constellations {
            let constellation = SatelliteConstellation {
                name: name.to_string(),
                satellite_count: count,
                coverage_areas: self.generate_global_coverage_areas(altitude_km).await,
                operator: PublicKey::new(vec![rand::random(), rand::random(), rand::random()]),
                cost_per_mb: 1, // Very low cost for satellite routing
            };
            
            routing_table.satellite_constellations.insert(name.to_string(), constellation);
            info!("🛰️ Added {} constellation: {} satellites, {:.0}km altitude", 
                  name, count, altitude_km);
        }
        
        // Create satellite uplinks
        let mut uplinks = self.satellite_uplinks.write().await;
        for i in 0..10 {
            let uplink = SatelliteUplink {
                uplink_id: format!("SAT_UPLINK_{}", i),
                constellation: "Starlink".to_string(),
                ground_station: GeographicLocation {
                    lat: (rand::random::<f64>() - 0.5) * 180.0,
                    lon: (rand::random::<f64>() - 0.5) * 360.0,
                    altitude_m: Some(500.0),
                },
                uplink_capacity_mbps: 1000 + rand::random::<u32>() % 9000, // 1-10 Gbps
                utilization_percent: rand::random::<f32>() * 50.0, // 0-50% utilization
                operator: PublicKey::new(vec![rand::random(), rand::random(), rand::random()]),
            };
            uplinks.push(uplink);
        }
        
        info!("🛰️ Created {} satellite uplinks for global access", uplinks.len());
        Ok(())
    }
    
    /// Generate global coverage areas for satellite constellation
    async fn generate_global_coverage_areas(&self, altitude_km: f64) -> Vec<SatelliteCoverageArea> {
        let mut coverage_areas = Vec::new();
        
        // Calculate coverage radius based on satellite altitude
        let earth_radius_km = 6371.0;
        let coverage_radius_km = (altitude_km * (altitude_km + 2.0 * earth_radius_km)).sqrt();
        
        // Create coverage grid for global coverage
        let lat_step = coverage_radius_km / earth_radius_km * 180.0 / std::f64::consts::PI;
        let lon_step = lat_step * 2.0; // Longitude spacing
        
        let mut lat = -90.0;
        while lat <= 90.0 {
            let mut lon = -180.0;
            while lon <= 180.0 {
                coverage_areas.push(SatelliteCoverageArea {
                    center: GeographicLocation {
                        lat: lat,
                        lon: lon,
                        altitude_m: Some((altitude_km * 1000.0) as f32),
                    },
                    radius_km: coverage_radius_km,
                    active_satellites: 1 + rand::random::<u32>() % 3, // 1-3 satellites per area
                });
                lon += lon_step;
            }
            lat += lat_step;
        }
        
        info!("Generated {} global coverage areas (radius: {:.0}km each)", 
              coverage_areas.len(), coverage_radius_km);
        coverage_areas
    }
    
    /// Initialize internet bridges for global connectivity
    async fn initialize_internet_bridges(&self) -> Result<()> {
        info!("Initializing internet bridges for global connectivity...");
        
        let mut routing_table = self.global_routing_table.write().await;
        
        // Major internet exchange points worldwide
        let ix_points = vec![
            ("DE-CIX Frankfurt", 50.1109, 8.6821, 100000), // 100 Gbps
            ("AMS-IX Amsterdam", 52.3676, 4.9041, 80000),  // 80 Gbps
            ("LINX London", 51.5074, -0.1278, 70000),      // 70 Gbps
            ("Equinix Ashburn", 39.0458, -77.5311, 90000), // 90 Gbps
            ("JPIX Tokyo", 35.6762, 139.6503, 60000),      // 60 Gbps
            ("HKIX Hong Kong", 22.3193, 114.1694, 50000),  // 50 Gbps
            ("NAP Brasil São Paulo", -23.5558, -46.6396, 40000), // 40 Gbps
            ("JINX Johannesburg", -26.2041, 28.0473, 30000), // 30 Gbps
        ];
        
        for (name, lat, lon, bandwidth_mbps) in ix_points {
            let bridge = InternetBridge {
                bridge_id: name.replace(" ", "_").to_uppercase(),
                location: GeographicLocation {
                    lat: lat,
                    lon: lon,
                    altitude_m: Some(100.0),
                },
                bandwidth_mbps,
                operator: PublicKey::new(vec![rand::random(), rand::random(), rand::random()]),
                protocols: vec!["TCP".to_string(), "UDP".to_string(), "QUIC".to_string()],
            };
            
            routing_table.internet_bridges.insert(bridge.bridge_id.clone(), bridge);
            info!("Added internet bridge: {} ({} Mbps)", name, bandwidth_mbps);
        }
        
        info!("Initialized {} internet bridges for global connectivity", 
              routing_table.internet_bridges.len());
        Ok(())
    }
    
    /// Initialize oceanic relay chains for trans-oceanic routing
    async fn initialize_oceanic_relays(&self) -> Result<()> {
        info!("🌊 Initializing oceanic relay chains for trans-oceanic routing...");
        
        let mut routing_table = self.global_routing_table.write().await;
        
        // Major oceanic relay chains
        let oceanic_chains = vec![
            ("TRANS_ATLANTIC", "Atlantic Ocean", vec![
                ("AZORES_RELAY", "Island", 38.7223, -27.2192),
                ("BERMUDA_RELAY", "Island", 32.3078, -64.7505),
                ("CAPE_VERDE_RELAY", "Island", 16.5388, -24.0132),
            ]),
            ("TRANS_PACIFIC", "Pacific Ocean", vec![
                ("HAWAII_RELAY", "Island", 21.3099, -157.8581),
                ("GUAM_RELAY", "Island", 13.4443, 144.7937),
                ("MIDWAY_RELAY", "Island", 28.2072, -177.3735),
            ]),
            ("INDIAN_OCEAN", "Indian Ocean", vec![
                ("MALDIVES_RELAY", "Island", 3.2028, 73.2207),
                ("SEYCHELLES_RELAY", "Island", -4.6796, 55.4920),
                ("MAURITIUS_RELAY", "Island", -20.3484, 57.5522),
            ]),
        ];
        
        for (chain_id, ocean, relay_stations) in oceanic_chains {
            let mut stations = Vec::new();
            let mut total_distance = 0.0;
            
            for (station_id, station_type, lat, lon) in relay_stations {
                let station = OceanicRelay {
                    station_id: station_id.to_string(),
                    station_type: station_type.to_string(),
                    position: GeographicLocation {
                        lat: lat,
                        lon: lon,
                        altitude_m: Some(50.0), // 50m above sea level
                    },
                    range_km: 500.0 + rand::random::<f64>() * 500.0, // 500-1000km range
                    operator: PublicKey::new(vec![rand::random(), rand::random(), rand::random()]),
                };
                
                // Calculate distance from previous station
                if !stations.is_empty() {
                    let prev_station: &OceanicRelay = &stations[stations.len() - 1];
                    let distance = self.calculate_distance(
                        &prev_station.position,
                        &station.position,
                    );
                    total_distance += distance;
                }
                
                stations.push(station);
                info!("🌊 Added oceanic relay: {} ({}) in {}", station_id, station_type, ocean);
            }
            
            let chain = OceanicRelayChain {
                chain_id: chain_id.to_string(),
                ocean: ocean.to_string(),
                relay_stations: stations,
                total_distance_km: total_distance,
            };
            
            routing_table.oceanic_relays.insert(chain_id.to_string(), chain);
            info!("🌊 Created oceanic relay chain: {} ({:.0}km total)", chain_id, total_distance);
        }
        
        info!("Initialized {} oceanic relay chains for trans-oceanic routing", 
              routing_table.oceanic_relays.len());
        Ok(())
    }
    
    /// Build intercontinental routing table
    async fn build_intercontinental_routes(&self) -> Result<()> {
        info!("Building intercontinental routing table...");
        
        let mut routing_table = self.global_routing_table.write().await;
        
        // Define all continent pairs for routing
        let continents = vec![
            Continent::NorthAmerica,
            Continent::SouthAmerica,
            Continent::Europe,
            Continent::Asia,
            Continent::Africa,
            Continent::Australia,
            Continent::Antarctica,
        ];
        
        // Build routes between all continent pairs
        for source in &continents {
            for destination in &continents {
                if source != destination {
                    let paths = self.find_intercontinental_paths(source.clone(), destination.clone()).await?;
                    routing_table.continental_routes.insert((source.clone(), destination.clone()), paths);
                    
                    info!("🗺️ Created intercontinental routes: {:?} → {:?}", source, destination);
                }
            }
        }
        
        info!("Built intercontinental routing table for {} continent pairs", 
              routing_table.continental_routes.len());
        Ok(())
    }
    
    /// Find intercontinental paths between two continents
    async fn find_intercontinental_paths(
        &self,
        source: Continent,
        destination: Continent,
    ) -> Result<Vec<IntercontinentalPath>> {
        let mut paths = Vec::new();
        
        // Direct satellite path (always available for any continent pair)
        paths.push(IntercontinentalPath {
            source: source.clone(),
            destination: destination.clone(),
            relay_hops: vec![GlobalRelayHop {
                relay_id: "GLOBAL_SATELLITE".to_string(),
                relay_type: LongRangeRelayType::Satellite,
                location: GeographicLocation {
                    lat: 0.0,
                    lon: 0.0,
                    altitude_m: Some(550_000.0), // 550km altitude
                },
                coverage_radius_km: 20000.0, // Global coverage
                latency_ms: 600, // Satellite latency
                throughput_mbps: 1000, // 1 Gbps
            }],
            quality_score: 0.9,
            estimated_latency_ms: 600,
            max_throughput_mbps: 1000,
            path_type: PathType::DirectSatellite,
        });
        
        // Internet bridge path (if applicable)
        if self.can_use_internet_bridge(&source, &destination).await {
            paths.push(IntercontinentalPath {
                source: source.clone(),
                destination: destination.clone(),
                relay_hops: vec![GlobalRelayHop {
                    relay_id: "INTERNET_BRIDGE".to_string(),
                    relay_type: LongRangeRelayType::WiFiRelay,
                    location: GeographicLocation {
                        lat: 0.0,
                        lon: 0.0,
                        altitude_m: Some(100.0),
                    },
                    coverage_radius_km: 50000.0, // Global internet reach
                    latency_ms: 150, // Internet latency
                    throughput_mbps: 10000, // 10 Gbps
                }],
                quality_score: 0.95,
                estimated_latency_ms: 150,
                max_throughput_mbps: 10000,
                path_type: PathType::InternetBridge,
            });
        }
        
        // Oceanic relay path (for cross-ocean routes)
        if let Some(oceanic_path) = self.find_oceanic_path(&source, &destination).await {
            paths.push(oceanic_path);
        }
        
        // Sort paths by quality score (highest first)
        paths.sort_by(|a, b| b.quality_score.partial_cmp(&a.quality_score).unwrap());
        
        Ok(paths)
    }
    
    /// Check if internet bridge can be used between continents
    async fn can_use_internet_bridge(&self, _source: &Continent, _destination: &Continent) -> bool {
        // Internet bridges can connect any continents with internet infrastructure
        true
    }
    
    /// Find oceanic relay path between continents
    async fn find_oceanic_path(
        &self,
        source: &Continent,
        destination: &Continent,
    ) -> Option<IntercontinentalPath> {
        // Determine which ocean separates these continents
        let ocean_chain = match (source, destination) {
            (Continent::NorthAmerica, Continent::Europe) | 
            (Continent::Europe, Continent::NorthAmerica) |
            (Continent::NorthAmerica, Continent::Africa) |
            (Continent::Africa, Continent::NorthAmerica) => "TRANS_ATLANTIC",
            
            (Continent::NorthAmerica, Continent::Asia) |
            (Continent::Asia, Continent::NorthAmerica) |
            (Continent::Australia, Continent::NorthAmerica) |
            (Continent::NorthAmerica, Continent::Australia) => "TRANS_PACIFIC",
            
            (Continent::Africa, Continent::Asia) |
            (Continent::Asia, Continent::Africa) |
            (Continent::Africa, Continent::Australia) |
            (Continent::Australia, Continent::Africa) => "INDIAN_OCEAN",
            
            _ => return None, // No direct oceanic path
        };
        
        // Create oceanic relay path
        Some(IntercontinentalPath {
            source: source.clone(),
            destination: destination.clone(),
            relay_hops: vec![GlobalRelayHop {
                relay_id: ocean_chain.to_string(),
                relay_type: LongRangeRelayType::LoRaWAN,
                location: GeographicLocation {
                    lat: 0.0,
                    lon: 0.0,
                    altitude_m: Some(50.0),
                },
                coverage_radius_km: 1000.0,
                latency_ms: 300,
                throughput_mbps: 100,
            }],
            quality_score: 0.7,
            estimated_latency_ms: 300,
            max_throughput_mbps: 100,
            path_type: PathType::OceanicRelay,
        })
    }
    
    /// Initialize backbone routes for high-capacity traffic
    async fn initialize_backbone_routes(&self) -> Result<()> {
        info!(" Initializing backbone routes for high-capacity intercontinental traffic...");
        
        let mut backbone_routes = self.backbone_routes.write().await;
        
        // Major intercontinental backbone routes
        let backbone_configs = vec![
            ("NA_EU_BACKBONE", Continent::NorthAmerica, Continent::Europe, 100), // 100 Gbps
            ("EU_AS_BACKBONE", Continent::Europe, Continent::Asia, 80),          // 80 Gbps
            ("NA_AS_BACKBONE", Continent::NorthAmerica, Continent::Asia, 120),   // 120 Gbps
            ("AS_AU_BACKBONE", Continent::Asia, Continent::Australia, 60),       // 60 Gbps
            ("EU_AF_BACKBONE", Continent::Europe, Continent::Africa, 40),        // 40 Gbps
        ];
        
        for (route_id, source, destination, capacity_gbps) in backbone_configs {
            let route = BackboneRoute {
                route_id: route_id.to_string(),
                source_continent: source.clone(),
                destination_continent: destination.clone(),
                capacity_gbps,
                hops: vec![BackboneHop {
                    hop_id: format!("{}_HOP_1", route_id),
                    hop_type: "Satellite".to_string(),
                    capacity_gbps,
                    latency_ms: 300,
                }],
                priority: 1,
            };
            
            backbone_routes.push(route);
            info!(" Added backbone route: {:?} → {:?} ({} Gbps)", 
                  source, destination, capacity_gbps);
        }
        
        info!("Initialized {} backbone routes for high-capacity traffic", 
              backbone_routes.len());
        Ok(())
    }
    
    /// Find optimal global route for long-range message delivery
    pub async fn find_global_route(
        &self,
        source_continent: Continent,
        destination_continent: Continent,
        quality_requirements: RouteQualityRequirements,
    ) -> Result<Vec<RouteHop>> {
        info!("Finding optimal global route: {:?} → {:?}", 
              source_continent, destination_continent);
        
        let routing_table = self.global_routing_table.read().await;
        
        // Get available paths for this continent pair
        if let Some(paths) = routing_table.continental_routes.get(&(source_continent, destination_continent)) {
            // Filter paths based on quality requirements
            let suitable_paths: Vec<&IntercontinentalPath> = paths.iter()
                .filter(|path| self.meets_quality_requirements(path, &quality_requirements))
                .collect();
            
            if let Some(best_path) = suitable_paths.first() {
                info!("Selected {} path with quality {:.2}",
                      format!("{:?}", best_path.path_type), best_path.quality_score);

                // Convert global relay hops to route hops
                // **MIGRATION (Ticket #146):** RouteHop now uses UnifiedPeerId
                let route_hops: Vec<RouteHop> = best_path.relay_hops.iter()
                    .map(|global_hop| {
                        // Generate a temporary PublicKey for relay identification
                        let relay_pub_key = PublicKey::new(vec![rand::random(), rand::random(), rand::random()]);
                        let unified_peer = UnifiedPeerId::from_public_key_legacy(relay_pub_key);
                        RouteHop {
                            peer_id: unified_peer,
                            protocol: match global_hop.relay_type {
                                LongRangeRelayType::Satellite => NetworkProtocol::Satellite,
                                LongRangeRelayType::LoRaWAN => NetworkProtocol::LoRaWAN,
                                LongRangeRelayType::WiFiRelay => NetworkProtocol::TCP,
                                _ => NetworkProtocol::UDP,
                            },
                            relay_id: Some(global_hop.relay_id.clone()),
                            latency_ms: global_hop.latency_ms,
                        }
                    })
                    .collect();

                return Ok(route_hops);
            }
        }
        
        Err(anyhow!("No suitable global route found"))
    }
    
    /// Check if path meets quality requirements
    fn meets_quality_requirements(
        &self,
        path: &IntercontinentalPath,
        requirements: &RouteQualityRequirements,
    ) -> bool {
        path.quality_score >= requirements.min_quality_score &&
        path.estimated_latency_ms <= requirements.max_latency_ms &&
        path.max_throughput_mbps >= requirements.min_throughput_mbps
    }
    
    /// Calculate distance between two geographic locations
    fn calculate_distance(&self, loc1: &GeographicLocation, loc2: &GeographicLocation) -> f64 {
        // Haversine formula for great-circle distance
        let earth_radius_km = 6371.0_f64;
        let lat1_rad = loc1.lat.to_radians();
        let lat2_rad = loc2.lat.to_radians();
        let delta_lat = (loc2.lat - loc1.lat).to_radians();
        let delta_lon = (loc2.lon - loc1.lon).to_radians();
        
        let a = (delta_lat / 2.0).sin().powi(2) +
                lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        
        let c = 2.0_f64 * a.sqrt().atan2((1.0_f64 - a).sqrt());
        
        earth_radius_km * c
    }
    
    /// Get global routing statistics
    pub async fn get_global_routing_stats(&self) -> GlobalRoutingStats {
        let routing_table = self.global_routing_table.read().await;
        let backbone_routes = self.backbone_routes.read().await;
        let satellite_uplinks = self.satellite_uplinks.read().await;
        
        let total_satellite_capacity: u32 = satellite_uplinks.iter()
            .map(|uplink| uplink.uplink_capacity_mbps)
            .sum();
        
        let total_backbone_capacity: u32 = backbone_routes.iter()
            .map(|route| route.capacity_gbps * 1000) // Convert to Mbps
            .sum();
        
        let total_internet_bridge_capacity: u32 = routing_table.internet_bridges.values()
            .map(|bridge| bridge.bandwidth_mbps)
            .sum();
        
        GlobalRoutingStats {
            total_continental_routes: routing_table.continental_routes.len(),
            total_satellite_constellations: routing_table.satellite_constellations.len(),
            total_internet_bridges: routing_table.internet_bridges.len(),
            total_oceanic_chains: routing_table.oceanic_relays.len(),
            total_backbone_routes: backbone_routes.len(),
            total_satellite_capacity_mbps: total_satellite_capacity,
            total_backbone_capacity_mbps: total_backbone_capacity,
            total_internet_bridge_capacity_mbps: total_internet_bridge_capacity,
            global_coverage_quality: self.assess_global_coverage_quality().await,
        }
    }
    
    /// Assess global coverage quality
    async fn assess_global_coverage_quality(&self) -> f64 {
        let routing_table = self.global_routing_table.read().await;
        
        // Quality based on available technologies
        let satellite_score = if !routing_table.satellite_constellations.is_empty() { 0.4 } else { 0.0 };
        let internet_score = if !routing_table.internet_bridges.is_empty() { 0.3 } else { 0.0 };
        let oceanic_score = if !routing_table.oceanic_relays.is_empty() { 0.2 } else { 0.0 };
        let backbone_score = if !self.backbone_routes.read().await.is_empty() { 0.1 } else { 0.0 };
        
        satellite_score + internet_score + oceanic_score + backbone_score
    }
}

/// Route quality requirements
#[derive(Debug, Clone)]
pub struct RouteQualityRequirements {
    pub min_quality_score: f64,
    pub max_latency_ms: u32,
    pub min_throughput_mbps: u32,
}

/// Global routing statistics
#[derive(Debug, Clone)]
pub struct GlobalRoutingStats {
    pub total_continental_routes: usize,
    pub total_satellite_constellations: usize,
    pub total_internet_bridges: usize,
    pub total_oceanic_chains: usize,
    pub total_backbone_routes: usize,
    pub total_satellite_capacity_mbps: u32,
    pub total_backbone_capacity_mbps: u32,
    pub total_internet_bridge_capacity_mbps: u32,
    pub global_coverage_quality: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    
    #[tokio::test]
    async fn test_long_range_routing_manager() {
        let relays = Arc::new(RwLock::new(HashMap::new()));
        let manager = LongRangeRoutingManager::new(relays);
        
        let result = manager.initialize_global_routing().await;
        assert!(result.is_ok());
    }
    
    #[tokio::test]
    async fn test_distance_calculation() {
        let relays = Arc::new(RwLock::new(HashMap::new()));
        let manager = LongRangeRoutingManager::new(relays);
        
        let loc1 = GeographicLocation {
            lat: 40.7128,
            lon: -74.0060,
            altitude_m: Some(0.0),
        };
        
        let loc2 = GeographicLocation {
            lat: 51.5074,
            lon: -0.1278,
            altitude_m: Some(0.0),
        };
        
        let distance = manager.calculate_distance(&loc1, &loc2);
        assert!(distance > 5500.0 && distance < 5600.0); // NYC to London ~5585km
    }
}
