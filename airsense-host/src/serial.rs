use std::io::Read;
use std::time::Duration;

use airsense_embedded::ByteStream;
use serialport::{SerialPort, available_ports};

use crate::error::{Error, Result};

const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// PMS3003 attached to a host UART.
pub struct SerialPortStream {
    port: Box<dyn SerialPort>,
}

impl SerialPortStream {
    /// Opens `port_path`, or the first port the system reports when unset.
    pub fn open(port_path: Option<&str>, baud_rate: u32) -> Result<Self> {
        let port_path = match port_path {
            Some(path) => path.to_string(),
            None => available_ports()?
                .first()
                .map(|port| port.port_name.clone())
                .ok_or_else(|| Error::connection("no serial port found"))?,
        };

        tracing::debug!("Connect to port: {}", port_path);

        let port = serialport::new(&port_path, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| Error::connection_to(e.description, &port_path))?;

        Ok(Self { port })
    }
}

impl ByteStream for SerialPortStream {
    type Error = Error;

    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.port.read_exact(&mut byte)?;
        Ok(byte[0])
    }
}

