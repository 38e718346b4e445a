//! Windows-specific networking implementation

use anyhow::Result;

/// Initialize Windows networking
pub async fn init_windows_networking() -> Result<()> {
    // Windows-specific networking initialization
    Ok(())
}

/// Scan for Windows Bluetooth devices
pub async fn scan_windows_bluetooth() -> Result<Vec<String>> {
    // Windows Bluetooth scanning
    Ok(Vec::new())
}

/// Get Windows network interfaces
pub async fn get_windows_interfaces() -> Result<Vec<String>> {
    // Windows network interface detection
    Ok(Vec::new())
}
