use bitflags::bitflags;

/// Class-specific requests of the printer class (USB Printer Class 1.1, 4.2).
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PrinterReq {
    /// Returns the IEEE 1284 device ID string, prefixed by its big endian length.
    GetDeviceId = 0x00,
    /// Returns one byte of [PortStatus].
    GetPortStatus = 0x01,
    /// Flushes all buffers and resets the bulk pipes, without a data stage.
    SoftReset = 0x02,
}

impl PrinterReq {
    pub fn from_u8(request: u8) -> Option<Self> {
        Some(match request {
            0x00 => Self::GetDeviceId,
            0x01 => Self::GetPortStatus,
            0x02 => Self::SoftReset,
            _ => return None,
        })
    }
}

bitflags! {
    /// The GET_PORT_STATUS answer, modelled on the status lines of a parallel port.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct PortStatus: u8 {
        const NOT_ERROR = 1 << 3;
        const SELECTED = 1 << 4;
        const PAPER_EMPTY = 1 << 5;
    }
}

/// Write a GET_DEVICE_ID answer for `device_id` into `buf` and return its length.
///
/// The answer is the two-byte big endian total length followed by the ID string, truncated to
/// the buffer.
pub fn encode_device_id(device_id: &str, buf: &mut [u8]) -> usize {
    let id = device_id.as_bytes();
    let total = (id.len() + 2).min(usize::from(u16::MAX)).min(buf.len());
    if total < 2 {
        return 0;
    }
    buf[..2].copy_from_slice(&(total as u16).to_be_bytes());
    buf[2..total].copy_from_slice(&id[..total - 2]);
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_is_length_prefixed() {
        let mut buf = [0u8; 64];
        let len = encode_device_id("MFG:Acme;MDL:P1;", &mut buf);
        assert_eq!(len, 18);
        assert_eq!(&buf[..2], &[0x00, 18]);
        assert_eq!(&buf[2..len], b"MFG:Acme;MDL:P1;");
    }

    #[test]
    fn device_id_truncates_to_buffer() {
        let mut buf = [0u8; 6];
        assert_eq!(encode_device_id("MFG:Acme;", &mut buf), 6);
        assert_eq!(&buf, b"\x00\x06MFG:");
        assert_eq!(encode_device_id("MFG:Acme;", &mut buf[..1]), 0);
    }

    #[test]
    fn request_codes() {
        assert_eq!(PrinterReq::from_u8(0x01), Some(PrinterReq::GetPortStatus));
        assert_eq!(PrinterReq::from_u8(0x03), None);
        let status = PortStatus::NOT_ERROR | PortStatus::SELECTED;
        assert_eq!(status.bits(), 0x18);
    }
}
