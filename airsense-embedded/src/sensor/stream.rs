use embedded_hal_nb::nb;
use embedded_hal_nb::serial;
use embedded_io::{Read, ReadReady};

use crate::error::Error;

/// Non-blocking byte source feeding the frame decoder.
pub trait ByteStream {
    type Error: core::fmt::Debug;

    /// Number of bytes that can be read right now without waiting.
    ///
    /// Implementations that cannot count may report any non-zero value while
    /// at least one byte is pending.
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Read one pending byte. Only called after `bytes_available` reported data.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;
}

impl<T: ByteStream + ?Sized> ByteStream for &mut T {
    type Error = T::Error;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        (**self).read_byte()
    }
}

/// Adapts an `embedded-hal-nb` UART receiver.
///
/// A successful poll is kept in `pending` until it is read, so availability
/// checks never lose bytes.
pub struct NbSerialStream<S> {
    serial: S,
    pending: Option<u8>,
}

impl<S> NbSerialStream<S>
where
    S: serial::Read<u8>,
{
    pub fn new(serial: S) -> Self {
        Self {
            serial,
            pending: None,
        }
    }

    pub fn into_inner(self) -> S {
        self.serial
    }

    fn poll(&mut self) -> Result<Option<u8>, Error> {
        match self.serial.read() {
            Ok(byte) => Ok(Some(byte)),
            Err(nb::Error::WouldBlock) => Ok(None),
            Err(nb::Error::Other(e)) => {
                log::warn!("UART read failed: {:?}", serial::Error::kind(&e));
                Err(Error::TransportError)
            }
        }
    }
}

impl<S> ByteStream for NbSerialStream<S>
where
    S: serial::Read<u8>,
{
    type Error = Error;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        if self.pending.is_none() {
            self.pending = self.poll()?;
        }
        Ok(usize::from(self.pending.is_some()))
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        if let Some(byte) = self.pending.take() {
            return Ok(byte);
        }
        self.poll()?.ok_or(Error::TransportError)
    }
}

/// Adapts an `embedded-io` reader that can report readiness.
pub struct IoStream<IO> {
    io: IO,
}

impl<IO> IoStream<IO>
where
    IO: Read + ReadReady,
{
    pub fn new(io: IO) -> Self {
        Self { io }
    }

    pub fn into_inner(self) -> IO {
        self.io
    }
}

impl<IO> ByteStream for IoStream<IO>
where
    IO: Read + ReadReady,
{
    type Error = Error;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        let ready = self.io.read_ready().map_err(|_| Error::TransportError)?;
        Ok(usize::from(ready))
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        let read_count = self.io.read(&mut buf).map_err(|_| Error::TransportError)?;
        if read_count == 0 {
            return Err(Error::TransportError);
        }
        Ok(buf[0])
    }
}

#[cfg(test)]
pub mod mock {
    use alloc::collections::VecDeque;
    use alloc::vec::Vec;

    use super::*;

    /// In-memory transport that counts how it is used.
    #[derive(Debug, Default)]
    pub struct MockStream {
        pub buffer: VecDeque<u8>,
        pub reads: usize,
        pub polls: usize,
        pub fail_after: Option<usize>,
    }

    impl MockStream {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_bytes(bytes: &[u8]) -> Self {
            let mut stream = Self::new();
            stream.push(bytes);
            stream
        }

        pub fn push(&mut self, bytes: &[u8]) {
            self.buffer.extend(bytes.iter().copied());
        }

        pub fn remaining(&self) -> Vec<u8> {
            self.buffer.iter().copied().collect()
        }

        pub fn touched(&self) -> bool {
            self.reads > 0 || self.polls > 0
        }
    }

    impl ByteStream for MockStream {
        type Error = Error;

        fn bytes_available(&mut self) -> Result<usize, Self::Error> {
            self.polls += 1;
            Ok(self.buffer.len())
        }

        fn read_byte(&mut self) -> Result<u8, Self::Error> {
            if self.fail_after.is_some_and(|limit| self.reads >= limit) {
                return Err(Error::TransportError);
            }
            self.reads += 1;
            self.buffer.pop_front().ok_or(Error::TransportError)
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::VecDeque;

    use super::*;

    struct MockUart {
        rx: VecDeque<u8>,
    }

    impl serial::ErrorType for MockUart {
        type Error = Error;
    }

    impl serial::Read<u8> for MockUart {
        fn read(&mut self) -> nb::Result<u8, Self::Error> {
            self.rx.pop_front().ok_or(nb::Error::WouldBlock)
        }
    }

    struct MockIo {
        data: VecDeque<u8>,
    }

    impl embedded_io::ErrorType for MockIo {
        type Error = embedded_io::ErrorKind;
    }

    impl Read for MockIo {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            match (self.data.pop_front(), buf.first_mut()) {
                (Some(byte), Some(slot)) => {
                    *slot = byte;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    impl ReadReady for MockIo {
        fn read_ready(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.data.is_empty())
        }
    }

    #[test]
    fn test_nb_stream_keeps_polled_byte() {
        let uart = MockUart {
            rx: VecDeque::from([0x42, 0x4D]),
        };
        let mut stream = NbSerialStream::new(uart);

        assert_eq!(stream.bytes_available().unwrap(), 1);
        assert_eq!(stream.bytes_available().unwrap(), 1);
        assert_eq!(stream.read_byte().unwrap(), 0x42);
        assert_eq!(stream.read_byte().unwrap(), 0x4D);
        assert_eq!(stream.bytes_available().unwrap(), 0);
        assert_eq!(stream.read_byte(), Err(Error::TransportError));
    }

    #[test]
    fn test_io_stream_reports_readiness() {
        let io = MockIo {
            data: VecDeque::from([0x01]),
        };
        let mut stream = IoStream::new(io);

        assert_eq!(stream.bytes_available().unwrap(), 1);
        assert_eq!(stream.read_byte().unwrap(), 0x01);
        assert_eq!(stream.bytes_available().unwrap(), 0);
        assert_eq!(stream.read_byte(), Err(Error::TransportError));
    }
}
