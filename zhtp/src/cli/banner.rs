//! ZHTP Startup Banner Display
//! 
//! Displays the ZHTP startup banner with version and system information

/// Display the ZHTP startup banner
pub fn show_lib_banner() {
    println!(r#"
╔══════════════════════════════════════════════════════════════════════════════╗
║                                                                              ║
║    ███████╗██╗  ██╗████████╗██████╗     ███╗   ██╗ ██████╗ ██████╗ ███████╗ ║
║    ╚══███╔╝██║  ██║╚══██╔══╝██╔══██╗    ████╗  ██║██╔═══██╗██╔══██╗██╔════╝ ║
║      ███╔╝ ███████║   ██║   ██████╔╝    ██╔██╗ ██║██║   ██║██║  ██║█████╗   ║
║     ███╔╝  ██╔══██║   ██║   ██╔═══╝     ██║╚██╗██║██║   ██║██║  ██║██╔══╝   ║
║    ███████╗██║  ██║   ██║   ██║         ██║ ╚████║╚██████╔╝██████╔╝███████╗ ║
║    ╚══════╝╚═╝  ╚═╝   ╚═╝   ╚═╝         ╚═╝  ╚═══╝ ╚═════╝ ╚═════╝ ╚══════╝ ║
║                                                                              ║
║                    INTERNET REPLACEMENT                  ║
║                                                                              ║
║    ┌─────────────────────────────────────────────────────────────────────┐  ║
║    │  Zero Knowledge Hypertext Transfer Protocol - Web4 Orchestrator    │  ║
║    │  Version: {:<20}                                        │  ║
║    │                                                                     │  ║
║    │  Post-Quantum Cryptography (CRYSTALS-Dilithium/Kyber)           │  ║
║    │  Complete ISP Replacement via Mesh Networking                   │  ║
║    │  Universal Basic Income for All Network Participants            │  ║
║    │   Decentralized DAO Governance                                   │  ║
║    │   Zero-Knowledge Privacy for All Communications                  │  ║
║    │   Web4 Protocol Stack                              │  ║
║    └─────────────────────────────────────────────────────────────────────┘  ║
║                                                                              ║
║    ZHTP replaces the entire internet infrastructure:                     ║
║       • ISPs → Economic mesh networking                                     ║
║       • DNS → Zero-knowledge domain system (ZDNS)                          ║
║       • HTTP/HTTPS → Native ZHTP protocol with built-in economics          ║
║       • Governments → DAO governance with UBI distribution                 ║
║                                                                              ║
║     The result: A free internet that pays users to participate!           ║
║                                                                              ║
╚══════════════════════════════════════════════════════════════════════════════╝
"#, env!("CARGO_PKG_VERSION"));

    // System information
    println!("System Information:");
    println!("   • Node Type: Complete Internet Replacement Orchestrator");
    println!("   • Coordination: 11 ZHTP packages");
    println!("   • Architecture: Event-driven with dependency injection");
    println!("   • Security: Post-quantum cryptography enabled");
    println!("   • Economics: Universal Basic Income system ready");
    println!("   • Governance: DAO-based decision making");
    println!();
}

/// Display development mode warning
pub fn show_development_warning() {
    println!(" DEVELOPMENT MODE WARNING ");
    println!("   This node is running in development mode.");
    println!("   Do not use for production or economic transactions.");
    println!();
}

/// Display mainnet startup message
pub fn show_mainnet_startup() {
    println!(" MAINNET MODE - LIVE ECONOMIC SYSTEM");
    println!("   This node will participate in the live ZHTP network.");
    println!("   UBI payments and economic transactions are active.");
    println!("   All network activity is cryptographically secured.");
    println!();
}

/// Display pure mesh mode banner
pub fn show_pure_mesh_banner() {
    println!("PURE MESH MODE - ISP REPLACEMENT ACTIVE");
    println!("   Complete internet replacement via mesh networking:");
    println!("   • Bluetooth LE for device-to-device communication");
    println!("   • WiFi Direct for high-bandwidth local networking");
    println!("   • LoRaWAN for long-range coverage (up to 15km)");
    println!("   • Satellite uplinks for global connectivity");
    println!("   • Economic incentives for sharing connectivity");
    println!();
}

/// Display hybrid mode banner
pub fn show_hybrid_mode_banner() {
    println!("HYBRID MODE - GRADUAL TRANSITION");
    println!("   Mesh networking with TCP/IP fallback:");
    println!("   • Building mesh coverage while maintaining connectivity");
    println!("   • Transition path to complete ISP independence");
    println!("   • Economic rewards for mesh participation");
    println!();
}

/// Display startup progress
pub fn show_startup_progress(step: &str, current: usize, total: usize) {
    let percentage = (current as f32 / total as f32 * 100.0) as usize;
    let progress_bar = "█".repeat(percentage / 5) + &"░".repeat(20 - percentage / 5);
    
    println!(" [{:2}/{}] [{}] {}% - {}", 
             current, total, progress_bar, percentage, step);
}

/// Display component status
pub fn show_component_status(component: &str, status: &str, icon: &str) {
    println!("   {} {} - {}", icon, component, status);
}

/// Display success message
pub fn show_success_message() {
    println!();
    println!("ZHTP NODE INITIALIZATION COMPLETE");
    println!(" Ready to revolutionize the internet!");
    println!("Universal Basic Income system operational");
    println!("Zero-knowledge privacy protection active");
    println!("Mesh networking ready for ISP replacement");
    println!();
    println!("Monitoring dashboard: http://localhost:8081");
    println!("CLI commands available - type 'help' for assistance");
    println!();
}

/// Display error message
pub fn show_error_message(error: &str) {
    println!();
    println!("ZHTP NODE INITIALIZATION FAILED");
    println!("   Error: {}", error);
    println!("   Check logs for detailed information");
    println!("   Ensure all dependencies are properly configured");
    println!();
}

/// Display shutdown banner
pub fn show_shutdown_banner() {
    println!();
    println!("ZHTP NODE SHUTDOWN INITIATED");
    println!("   Gracefully stopping all components...");
    println!("   Preserving system state...");
    println!("   Thank you for participating in the internet revolution!");
    println!();
}
