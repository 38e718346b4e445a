//! macOS-specific networking implementation

use anyhow::Result;

/// Initialize macOS networking
pub async fn init_macos_networking() -> Result<()> {
    // macOS-specific networking initialization
    Ok(())
}

/// Scan for macOS Bluetooth devices using Core Bluetooth
pub async fn scan_macos_bluetooth() -> Result<Vec<String>> {
    // macOS Core Bluetooth scanning
    Ok(Vec::new())
}

/// Get macOS network interfaces
pub async fn get_macos_interfaces() -> Result<Vec<String>> {
    // macOS network interface detection
    Ok(Vec::new())
}
