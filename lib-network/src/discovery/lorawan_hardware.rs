//! LoRaWAN hardware detection and initialization
//!
//! Detects and initializes LoRaWAN radio hardware for mesh networking

use anyhow::Result;
use tracing::{info, warn, debug};

/// LoRaWAN hardware information
#[derive(Debug, Clone)]
pub struct LoRaWANHardware {
    /// Hardware device name
    pub device_name: String,
    /// Connection type (SPI, USB, I2C, etc.)
    pub connection_type: String,
    /// Device path or identifier
    pub device_path: Option<String>,
    /// Supported frequency bands
    pub frequency_bands: Vec<FrequencyBand>,
    /// Maximum transmission power (dBm)
    pub max_tx_power: i8,
    /// Hardware capabilities
    pub capabilities: LoRaWANCapabilities,
}

/// LoRaWAN frequency bands
#[derive(Debug, Clone, PartialEq)]
pub enum FrequencyBand {
    EU868,   // Europe 868 MHz
    US915,   // North America 915 MHz
    AS923,   // Asia 923 MHz
    AU915,   // Australia 915 MHz
    CN470,   // China 470 MHz
    IN865,   // India 865 MHz
    KR920,   // Korea 920 MHz
    RU864,   // Russia 864 MHz
}

/// LoRaWAN hardware capabilities
#[derive(Debug, Clone, Default)]
pub struct LoRaWANCapabilities {
    /// Supports Class A operation
    pub class_a: bool,
    /// Supports Class B operation
    pub class_b: bool,
    /// Supports Class C operation
    pub class_c: bool,
    /// Supports OTAA (Over-The-Air Activation)
    pub otaa_support: bool,
    /// Supports ABP (Activation By Personalization)
    pub abp_support: bool,
    /// Maximum payload size in bytes
    pub max_payload_size: usize,
    /// Supported spreading factors
    pub spreading_factors: Vec<u8>,
}

/// Detect LoRaWAN hardware on the system
pub async fn detect_lorawan_hardware() -> Result<Option<LoRaWANHardware>> {
    info!("Scanning for LoRaWAN radio hardware...");
    
    // Try different detection methods based on platform
    #[cfg(target_os = "linux")]
    {
        if let Ok(hardware) = detect_linux_lorawan().await {
            info!("LoRaWAN hardware detected: {}", hardware.device_name);
            return Ok(Some(hardware));
        }
    }
    
    #[cfg(target_os = "windows")]
    {
        if let Ok(hardware) = detect_windows_lorawan().await {
            info!("LoRaWAN hardware detected: {}", hardware.device_name);
            return Ok(Some(hardware));
        }
    }
    
    #[cfg(target_os = "macos")]
    {
        if let Ok(hardware) = detect_macos_lorawan().await {
            info!("LoRaWAN hardware detected: {}", hardware.device_name);
            return Ok(Some(hardware));
        }
    }
    
    info!("No LoRaWAN hardware detected");
    Ok(None)
}

/// Test if LoRaWAN hardware is functional
pub async fn test_lorawan_hardware(hardware: &LoRaWANHardware) -> Result<bool> {
    info!(" Testing LoRaWAN hardware: {}", hardware.device_name);
    
    match hardware.connection_type.as_str() {
        "SPI" => test_spi_lorawan_hardware(hardware).await,
        "USB" => test_usb_lorawan_hardware(hardware).await,
        "I2C" => test_i2c_lorawan_hardware(hardware).await,
        _ => {
            warn!("Unknown connection type: {}", hardware.connection_type);
            Ok(false)
        }
    }
}

// Linux LoRaWAN detection
#[cfg(target_os = "linux")]
async fn detect_linux_lorawan() -> Result<LoRaWANHardware> {
    use std::path::Path;
    use std::process::Command;
    
    // Check for SX127x/SX130x on SPI
    for spi_bus in [0, 1] {
        for cs in [0, 1] {
            let spi_path = format!("/dev/spidev{}.{}", spi_bus, cs);
            if Path::new(&spi_path).exists() {
                if let Ok(hardware) = detect_spi_sx127x(&spi_path).await {
                    return Ok(hardware);
                }
                if let Ok(hardware) = detect_spi_sx130x(&spi_path).await {
                    return Ok(hardware);
                }
            }
        }
    }
    
    // Check for USB LoRaWAN modules
    if let Ok(output) = Command::new("lsusb").output() {
        let usb_info = String::from_utf8_lossy(&output.stdout);
        
        // Check for specific LoRaWAN USB devices
        if usb_info.contains("1a86:7523") { // CH340
            return detect_usb_ch340_lorawan().await;
        }
        
        if usb_info.contains("0403:6001") { // FTDI
            return detect_usb_ftdi_lorawan().await;
        }
        
        if usb_info.contains("10c4:ea60") { // CP210x
            return detect_usb_cp210x_lorawan().await;
        }
    }
    
    // Check for I2C LoRaWAN modules
    if let Ok(output) = Command::new("i2cdetect").args(&["-y", "1"]).output() {
        let i2c_info = String::from_utf8_lossy(&output.stdout);
        
        // Common LoRaWAN I2C addresses
        for addr in ["48", "49", "4a", "4b"] {
            if i2c_info.contains(addr) {
                if let Ok(hardware) = detect_i2c_lorawan(addr).await {
                    return Ok(hardware);
                }
            }
        }
    }
    
    // Check for Raspberry Pi HATs
    if let Ok(hardware) = detect_raspberry_pi_lorawan_hat().await {
        return Ok(hardware);
    }
    
    Err(anyhow::anyhow!("No LoRaWAN hardware detected on Linux"))
}

#[cfg(target_os = "linux")]
async fn detect_spi_sx127x(spi_path: &str) -> Result<LoRaWANHardware> {
    use std::fs::OpenOptions;
    use std::io::{Read, Write};
    
    debug!("Testing for SX127x on {}", spi_path);
    
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(spi_path)?;
    
    // SX127x version register read command
    let version_cmd = [0x42, 0x00]; // Read register 0x42 (version)
    let mut response = [0u8; 2];
    
    if file.write_all(&version_cmd).is_ok() && file.read_exact(&mut response).is_ok() {
        match response[1] {
            0x12 => {
                info!("SX1276 detected on {}", spi_path);
                return Ok(create_sx127x_hardware("SX1276", spi_path));
            },
            0x22 => {
                info!("SX1277 detected on {}", spi_path);
                return Ok(create_sx127x_hardware("SX1277", spi_path));
            },
            0x21 => {
                info!("SX1278 detected on {}", spi_path);
                return Ok(create_sx127x_hardware("SX1278", spi_path));
            },
            0x24 => {
                info!("SX1279 detected on {}", spi_path);
                return Ok(create_sx127x_hardware("SX1279", spi_path));
            },
            _ => debug!("Unknown SX127x version: 0x{:02X}", response[1]),
        }
    }
    
    Err(anyhow::anyhow!("No SX127x detected on {}", spi_path))
}

#[cfg(target_os = "linux")]
async fn detect_spi_sx130x(spi_path: &str) -> Result<LoRaWANHardware> {
    use std::fs::OpenOptions;
    use std::io::{Read, Write};
    
    debug!("Testing for SX130x on {}", spi_path);
    
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(spi_path)?;
    
    // SX130x version register read command
    let version_cmd = [0x10, 0x00]; // Read register 0x10 (version)
    let mut response = [0u8; 2];
    
    if file.write_all(&version_cmd).is_ok() && file.read_exact(&mut response).is_ok() {
        if response[1] == 0x21 {
            info!("SX1301 concentrator detected on {}", spi_path);
            return Ok(create_sx130x_hardware("SX1301", spi_path));
        }
        if response[1] == 0x10 {
            info!("SX1302 concentrator detected on {}", spi_path);
            return Ok(create_sx130x_hardware("SX1302", spi_path));
        }
    }
    
    Err(anyhow::anyhow!("No SX130x detected on {}", spi_path))
}

#[cfg(target_os = "linux")]
async fn detect_usb_ch340_lorawan() -> Result<LoRaWANHardware> {
    // CH340 is commonly used with Arduino-based LoRaWAN modules
    for port in ["/dev/ttyUSB0", "/dev/ttyUSB1", "/dev/ttyUSB2"] {
        if std::path::Path::new(port).exists() {
            if let Ok(hardware) = test_serial_lorawan_module(port, "CH340").await {
                return Ok(hardware);
            }
        }
    }
    
    Err(anyhow::anyhow!("No CH340 LoRaWAN module detected"))
}

#[cfg(target_os = "linux")]
async fn detect_usb_ftdi_lorawan() -> Result<LoRaWANHardware> {
    // FTDI chips used in some professional LoRaWAN modules
    for port in ["/dev/ttyUSB0", "/dev/ttyUSB1", "/dev/ttyUSB2"] {
        if std::path::Path::new(port).exists() {
            if let Ok(hardware) = test_serial_lorawan_module(port, "FTDI").await {
                return Ok(hardware);
            }
        }
    }
    
    Err(anyhow::anyhow!("No FTDI LoRaWAN module detected"))
}

#[cfg(target_os = "linux")]
async fn detect_usb_cp210x_lorawan() -> Result<LoRaWANHardware> {
    // Silicon Labs CP210x used in some LoRaWAN modules
    for port in ["/dev/ttyUSB0", "/dev/ttyUSB1", "/dev/ttyUSB2"] {
        if std::path::Path::new(port).exists() {
            if let Ok(hardware) = test_serial_lorawan_module(port, "CP210x").await {
                return Ok(hardware);
            }
        }
    }
    
    Err(anyhow::anyhow!("No CP210x LoRaWAN module detected"))
}

#[cfg(target_os = "linux")]
async fn test_serial_lorawan_module(port: &str, chip_type: &str) -> Result<LoRaWANHardware> {
    use std::io::{Read, Write};
    use std::time::Duration;
    
    debug!(" Testing serial LoRaWAN module on {} ({})", port, chip_type);
    
    // Try to open serial port
    let mut serial_port = serialport::new(port, 9600)
        .timeout(Duration::from_secs(1))
        .open()?;
    
    // Send AT command to test if it's a LoRaWAN module
    serial_port.write_all(b"AT\r\n")?;
    
    let mut buffer = [0u8; 64];
    if let Ok(bytes_read) = serial_port.read(&mut buffer) {
        let response = String::from_utf8_lossy(&buffer[..bytes_read]);
        
        if response.contains("OK") || response.contains("AT") {
            // Try LoRaWAN-specific commands
            serial_port.write_all(b"AT+VER?\r\n")?;
            
            if let Ok(bytes_read) = serial_port.read(&mut buffer) {
                let version_response = String::from_utf8_lossy(&buffer[..bytes_read]);
                
                if version_response.to_lowercase().contains("lora") {
                    info!("LoRaWAN module detected on {} ({})", port, chip_type);
                    
                    return Ok(LoRaWANHardware {
                        device_name: format!("{} LoRaWAN Module", chip_type),
                        connection_type: "USB".to_string(),
                        device_path: Some(port.to_string()),
                        frequency_bands: vec![FrequencyBand::EU868, FrequencyBand::US915], // Common defaults
                        max_tx_power: 14,
                        capabilities: LoRaWANCapabilities {
                            class_a: true,
                            otaa_support: true,
                            abp_support: true,
                            max_payload_size: 242,
                            spreading_factors: vec![7, 8, 9, 10, 11, 12],
                            ..Default::default()
                        },
                    });
                }
            }
        }
    }
    
    Err(anyhow::anyhow!("No LoRaWAN module detected on {}", port))
}

#[cfg(target_os = "linux")]
async fn detect_i2c_lorawan(address: &str) -> Result<LoRaWANHardware> {
    debug!(" Testing I2C LoRaWAN module at address {}", address);
    
    // This would require actual I2C communication
    // For now, assume it's a LoRaWAN module if detected on common addresses
    if address == "48" || address == "49" {
        return Ok(LoRaWANHardware {
            device_name: format!("I2C LoRaWAN Module (0x{})", address),
            connection_type: "I2C".to_string(),
            device_path: Some(format!("/dev/i2c-1")),
            frequency_bands: vec![FrequencyBand::EU868],
            max_tx_power: 14,
            capabilities: LoRaWANCapabilities {
                class_a: true,
                otaa_support: true,
                abp_support: true,
                max_payload_size: 242,
                spreading_factors: vec![7, 8, 9, 10, 11, 12],
                ..Default::default()
            },
        });
    }
    
    Err(anyhow::anyhow!("No LoRaWAN module detected at I2C address {}", address))
}

#[cfg(target_os = "linux")]
async fn detect_raspberry_pi_lorawan_hat() -> Result<LoRaWANHardware> {
    use std::fs;
    use std::path::Path;
    
    debug!("Checking for Raspberry Pi LoRaWAN HAT");
    
    // Check device tree for HAT information
    if Path::new("/proc/device-tree/hat").exists() {
        if let Ok(entries) = fs::read_dir("/proc/device-tree/hat") {
            for entry in entries.flatten() {
                if let Ok(content) = fs::read_to_string(entry.path()) {
                    let content_lower = content.to_lowercase();
                    
                    if content_lower.contains("lora") || content_lower.contains("sx127") {
                        info!("LoRaWAN HAT detected via device tree");
                        
                        return Ok(LoRaWANHardware {
                            device_name: "Raspberry Pi LoRaWAN HAT".to_string(),
                            connection_type: "SPI".to_string(),
                            device_path: Some("/dev/spidev0.0".to_string()),
                            frequency_bands: vec![FrequencyBand::EU868, FrequencyBand::US915],
                            max_tx_power: 14,
                            capabilities: LoRaWANCapabilities {
                                class_a: true,
                                class_c: true,
                                otaa_support: true,
                                abp_support: true,
                                max_payload_size: 242,
                                spreading_factors: vec![7, 8, 9, 10, 11, 12],
                                ..Default::default()
                            },
                        });
                    }
                }
            }
        }
    }
    
    Err(anyhow::anyhow!("No Raspberry Pi LoRaWAN HAT detected"))
}

#[allow(dead_code)] // Used in SX127x hardware detection - false positive warning
fn create_sx127x_hardware(chip_name: &str, spi_path: &str) -> LoRaWANHardware {
    LoRaWANHardware {
        device_name: format!("Semtech {} LoRa Transceiver", chip_name),
        connection_type: "SPI".to_string(),
        device_path: Some(spi_path.to_string()),
        frequency_bands: vec![FrequencyBand::EU868, FrequencyBand::US915],
        max_tx_power: match chip_name {
            "SX1276" | "SX1277" => 14,
            "SX1278" | "SX1279" => 20,
            _ => 14,
        },
        capabilities: LoRaWANCapabilities {
            class_a: true,
            class_c: true,
            otaa_support: true,
            abp_support: true,
            max_payload_size: 242,
            spreading_factors: vec![6, 7, 8, 9, 10, 11, 12],
            ..Default::default()
        },
    }
}

#[allow(dead_code)] // Used in SX130x hardware detection - false positive warning
fn create_sx130x_hardware(chip_name: &str, spi_path: &str) -> LoRaWANHardware {
    LoRaWANHardware {
        device_name: format!("Semtech {} LoRaWAN Concentrator", chip_name),
        connection_type: "SPI".to_string(),
        device_path: Some(spi_path.to_string()),
        frequency_bands: vec![FrequencyBand::EU868, FrequencyBand::US915, FrequencyBand::AS923],
        max_tx_power: 27, // Concentrators can have higher power
        capabilities: LoRaWANCapabilities {
            class_a: true,
            class_b: true,
            class_c: true,
            otaa_support: true,
            abp_support: true,
            max_payload_size: 242,
            spreading_factors: vec![7, 8, 9, 10, 11, 12],
            ..Default::default()
        },
    }
}

// Windows LoRaWAN detection
#[cfg(target_os = "windows")]
async fn detect_windows_lorawan() -> Result<LoRaWANHardware> {
    use std::process::Command;
    
    // Check for COM ports with LoRaWAN modules
    for port_num in 1..=20 {
        let port_name = format!("COM{}", port_num);
        
        if std::path::Path::new(&format!("\\\\.\\{}", port_name)).exists() {
            if let Ok(hardware) = test_windows_com_lorawan(&port_name).await {
                return Ok(hardware);
            }
        }
    }
    
    // Check Device Manager for LoRaWAN devices
    if let Ok(output) = Command::new("powershell")
        .args(&["-Command", "Get-PnpDevice | Where-Object {$_.FriendlyName -like '*LoRa*'}"])
        .output() {
        
        let device_output = String::from_utf8_lossy(&output.stdout);
        
        if !device_output.trim().is_empty() {
            info!("LoRaWAN device found in Device Manager");
            
            return Ok(LoRaWANHardware {
                device_name: "Windows LoRaWAN Device".to_string(),
                connection_type: "USB".to_string(),
                device_path: None,
                frequency_bands: vec![FrequencyBand::US915, FrequencyBand::EU868],
                max_tx_power: 20,
                capabilities: LoRaWANCapabilities {
                    class_a: true,
                    otaa_support: true,
                    abp_support: true,
                    max_payload_size: 242,
                    spreading_factors: vec![7, 8, 9, 10],
                    ..Default::default()
                },
            });
        }
    }
    
    Err(anyhow::anyhow!("No LoRaWAN hardware detected on Windows"))
}

#[cfg(target_os = "windows")]
async fn test_windows_com_lorawan(port_name: &str) -> Result<LoRaWANHardware> {
    use std::io::{Read, Write};
    use std::time::Duration;
    
    debug!(" Testing Windows COM port for LoRaWAN: {}", port_name);
    
    // Try to open COM port
    let mut port = serialport::new(port_name, 9600)
        .timeout(Duration::from_secs(1))
        .open()?;
    
    // Send AT command
    port.write_all(b"AT\r\n")?;
    
    let mut buffer = [0u8; 64];
    if let Ok(bytes_read) = port.read(&mut buffer) {
        let response = String::from_utf8_lossy(&buffer[..bytes_read]);
        
        if response.contains("OK") {
            // Test for LoRaWAN-specific commands
            port.write_all(b"AT+VER?\r\n")?;
            
            if let Ok(bytes_read) = port.read(&mut buffer) {
                let version_response = String::from_utf8_lossy(&buffer[..bytes_read]);
                
                if version_response.to_lowercase().contains("lora") {
                    info!("LoRaWAN module detected on {}", port_name);
                    
                    return Ok(LoRaWANHardware {
                        device_name: format!("Windows LoRaWAN Module ({})", port_name),
                        connection_type: "Serial".to_string(),
                        device_path: Some(port_name.to_string()),
                        frequency_bands: vec![FrequencyBand::US915, FrequencyBand::EU868],
                        max_tx_power: 20,
                        capabilities: LoRaWANCapabilities {
                            class_a: true,
                            otaa_support: true,
                            abp_support: true,
                            max_payload_size: 242,
                            spreading_factors: vec![7, 8, 9, 10],
                            ..Default::default()
                        },
                    });
                }
            }
        }
    }
    
    Err(anyhow::anyhow!("No LoRaWAN module detected on {}", port_name))
}

// macOS LoRaWAN detection
#[cfg(target_os = "macos")]
async fn detect_macos_lorawan() -> Result<LoRaWANHardware> {
    use std::process::Command;
    
    // Check for USB serial devices
    if let Ok(output) = Command::new("ls").arg("/dev/tty.usb*").output() {
        let usb_devices = String::from_utf8_lossy(&output.stdout);
        
        for device in usb_devices.lines() {
            if !device.is_empty() {
                if let Ok(hardware) = test_macos_usb_lorawan(device).await {
                    return Ok(hardware);
                }
            }
        }
    }
    
    Err(anyhow::anyhow!("No LoRaWAN hardware detected on macOS"))
}

#[cfg(target_os = "macos")]
async fn test_macos_usb_lorawan(device_path: &str) -> Result<LoRaWANHardware> {
    use std::io::{Read, Write};
    use std::time::Duration;
    
    debug!(" Testing macOS USB device for LoRaWAN: {}", device_path);
    
    // Try to open USB serial device
    let mut port = serialport::new(device_path, 9600)
        .timeout(Duration::from_secs(1))
        .open()?;
    
    // Send AT command
    port.write_all(b"AT\r\n")?;
    
    let mut buffer = [0u8; 64];
    if let Ok(bytes_read) = port.read(&mut buffer) {
        let response = String::from_utf8_lossy(&buffer[..bytes_read]);
        
        if response.contains("OK") {
            // Test for LoRaWAN-specific commands
            port.write_all(b"AT+VER?\r\n")?;
            
            if let Ok(bytes_read) = port.read(&mut buffer) {
                let version_response = String::from_utf8_lossy(&buffer[..bytes_read]);
                
                if version_response.to_lowercase().contains("lora") {
                    info!("LoRaWAN module detected on {}", device_path);
                    
                    return Ok(LoRaWANHardware {
                        device_name: format!("macOS LoRaWAN Module ({})", device_path),
                        connection_type: "USB Serial".to_string(),
                        device_path: Some(device_path.to_string()),
                        frequency_bands: vec![FrequencyBand::US915, FrequencyBand::EU868],
                        max_tx_power: 14,
                        capabilities: LoRaWANCapabilities {
                            class_a: true,
                            otaa_support: true,
                            abp_support: true,
                            max_payload_size: 242,
                            spreading_factors: vec![7, 8, 9, 10, 11, 12],
                            ..Default::default()
                        },
                    });
                }
            }
        }
    }
    
    Err(anyhow::anyhow!("No LoRaWAN module detected on {}", device_path))
}

// Hardware testing functions
async fn test_spi_lorawan_hardware(hardware: &LoRaWANHardware) -> Result<bool> {
    if let Some(device_path) = &hardware.device_path {
        #[cfg(target_os = "linux")]
        {
            use std::fs::OpenOptions;
            use std::io::{Read, Write};
            
            if let Ok(mut file) = OpenOptions::new()
                .read(true)
                .write(true)
                .open(device_path) {
                
                // Try to read version register
                let version_cmd = [0x42, 0x00];
                let mut response = [0u8; 2];
                
                if file.write_all(&version_cmd).is_ok() && file.read_exact(&mut response).is_ok() {
                    if response[1] != 0x00 && response[1] != 0xFF {
                        info!("SPI LoRaWAN hardware test passed");
                        return Ok(true);
                    }
                }
            }
        }
    }
    
    warn!("SPI LoRaWAN hardware test failed");
    Ok(false)
}

async fn test_usb_lorawan_hardware(hardware: &LoRaWANHardware) -> Result<bool> {
    if let Some(device_path) = &hardware.device_path {
        use std::io::{Read, Write};
        use std::time::Duration;
        
        if let Ok(mut port) = serialport::new(device_path, 9600)
            .timeout(Duration::from_secs(1))
            .open() {
            
            // Send test command
            if port.write_all(b"AT\r\n").is_ok() {
                let mut buffer = [0u8; 32];
                if let Ok(bytes_read) = port.read(&mut buffer) {
                    let response = String::from_utf8_lossy(&buffer[..bytes_read]);
                    
                    if response.contains("OK") || response.contains("AT") {
                        info!("USB LoRaWAN hardware test passed");
                        return Ok(true);
                    }
                }
            }
        }
    }
    
    warn!("USB LoRaWAN hardware test failed");
    Ok(false)
}

async fn test_i2c_lorawan_hardware(_hardware: &LoRaWANHardware) -> Result<bool> {
    // I2C testing would require actual I2C communication
    // For now, assume it works if detected
    info!("I2C LoRaWAN hardware assumed functional");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[tokio::test]
    async fn test_lorawan_hardware_detection() {
        let result = detect_lorawan_hardware().await;
        
        match result {
            Ok(Some(hardware)) => {
                println!("LoRaWAN hardware detected: {:?}", hardware);
                
                let test_result = test_lorawan_hardware(&hardware).await;
                println!("Hardware test result: {:?}", test_result);
            },
            Ok(None) => {
                println!("No LoRaWAN hardware detected (expected on systems without hardware)");
            },
            Err(e) => {
                println!("LoRaWAN detection error: {}", e);
            }
        }
    }
}
