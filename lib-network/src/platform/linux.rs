//! Linux-specific networking implementation

use anyhow::Result;

/// Initialize Linux networking
pub async fn init_linux_networking() -> Result<()> {
    // Linux-specific networking initialization
    Ok(())
}

/// Scan for Linux Bluetooth devices using BlueZ
pub async fn scan_linux_bluetooth() -> Result<Vec<String>> {
    // Linux BlueZ scanning
    Ok(Vec::new())
}

/// Get Linux network interfaces
pub async fn get_linux_interfaces() -> Result<Vec<String>> {
    // Linux network interface detection
    Ok(Vec::new())
}
