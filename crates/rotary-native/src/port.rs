//! Serial link to the rotary encoder.

use std::time::Duration;

use rotary_core::{ReaderSlot, SampleQueue, SERIAL_READ_TIMEOUT_MS};

/// Owns at most one open port and its reader thread.
pub struct SerialLink {
    slot: ReaderSlot,
    baud_rate: u32,
}

impl SerialLink {
    pub fn new(queue: SampleQueue, baud_rate: u32) -> Self {
        Self {
            slot: ReaderSlot::new(queue),
            baud_rate,
        }
    }

    pub fn is_open(&self) -> bool {
        self.slot.is_open()
    }

    /// Close any open port, then try `port_name`. Failure is logged and
    /// leaves the link closed.
    pub fn open(&mut self, port_name: &str) -> bool {
        // The old handle must be released before the device is opened again.
        self.slot.close();

        let path = device_path(port_name);
        let port = match serialport::new(&path, self.baud_rate)
            .timeout(Duration::from_millis(SERIAL_READ_TIMEOUT_MS))
            .flow_control(serialport::FlowControl::None)
            .open()
        {
            Ok(port) => port,
            Err(e) => {
                log::error!("error opening serial port {port_name}: {e}");
                return false;
            }
        };

        match self.slot.replace(port_name, port) {
            Ok(()) => {
                log::info!("opened serial port: {port_name} at {} baud", self.baud_rate);
                true
            }
            Err(e) => {
                log::error!("failed to start reader for {port_name}: {e}");
                false
            }
        }
    }

    /// Stop and join the reader; the port handle is released when the
    /// thread exits.
    pub fn close(&mut self) {
        self.slot.close();
    }

    pub fn drain(&self) -> Vec<String> {
        self.slot.drain()
    }
}

// On Windows, COM ports >= 10 need the \\.\COMxx form
#[cfg(target_os = "windows")]
fn device_path(port_name: &str) -> String {
    if port_name.starts_with("COM") && !port_name.starts_with(r"\\") {
        format!(r"\\.\{port_name}")
    } else {
        port_name.to_string()
    }
}

#[cfg(not(target_os = "windows"))]
fn device_path(port_name: &str) -> String {
    port_name.to_string()
}

pub fn available_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            log::warn!("failed to enumerate serial ports: {e}");
            Vec::new()
        }
    }
}

/// The port after `current` in `ports`, wrapping around. `None` when there
/// is nothing different to switch to.
pub fn next_port(current: &str, ports: &[String]) -> Option<String> {
    if ports.is_empty() {
        return None;
    }
    let next = match ports.iter().position(|p| p == current) {
        Some(i) => &ports[(i + 1) % ports.len()],
        None => &ports[0],
    };
    (next != current).then(|| next.clone())
}

pub fn list_ports() {
    match serialport::available_ports() {
        Ok(ports) if ports.is_empty() => println!("No serial ports found"),
        Ok(ports) => {
            println!("Available serial ports:");
            for p in ports {
                let kind = match p.port_type {
                    serialport::SerialPortType::UsbPort(info) => format!(
                        "USB {:04x}:{:04x} {}",
                        info.vid,
                        info.pid,
                        info.product.unwrap_or_default()
                    ),
                    serialport::SerialPortType::PciPort => "PCI".to_string(),
                    serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
                    serialport::SerialPortType::Unknown => "Unknown".to_string(),
                };
                println!("  {} ({kind})", p.port_name);
            }
        }
        Err(e) => eprintln!("Error listing ports: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn next_port_wraps() {
        let p = ports(&["COM3", "COM4", "COM5"]);
        assert_eq!(next_port("COM4", &p).as_deref(), Some("COM5"));
        assert_eq!(next_port("COM5", &p).as_deref(), Some("COM3"));
        assert_eq!(next_port("COM9", &p).as_deref(), Some("COM3"));
    }

    #[test]
    fn next_port_none_when_only_current() {
        assert_eq!(next_port("COM4", &ports(&["COM4"])), None);
        assert_eq!(next_port("COM4", &[]), None);
    }
}
