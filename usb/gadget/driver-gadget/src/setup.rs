use plain::Plain;

/// The 8-byte SETUP packet that starts every control transfer (USB2 9.3).
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Setup {
    pub kind: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
}

unsafe impl Plain for Setup {}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReqDirection {
    HostToDevice = 0,
    DeviceToHost = 1,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReqType {
    /// Requests defined by chapter 9, such as GET_STATUS and SET_INTERFACE.
    Standard = 0,

    /// Requests defined by the class specification of the addressed interface.
    Class = 1,

    Vendor = 2,

    Reserved = 3,
}

impl ReqType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Class => "class",
            Self::Vendor => "vendor",
            Self::Reserved => "reserved",
        }
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReqRecipient {
    Device = 0,
    Interface = 1,
    Endpoint = 2,
    Other = 3,
    // 4..=30 are reserved
    VendorSpecific = 31,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StandardReq {
    GetStatus = 0x00,
    ClearFeature = 0x01,
    SetFeature = 0x03,
    SetAddress = 0x05,
    GetDescriptor = 0x06,
    SetDescriptor = 0x07,
    GetConfiguration = 0x08,
    SetConfiguration = 0x09,
    GetInterface = 0x0A,
    SetInterface = 0x0B,
    SynchFrame = 0x0C,
}

impl StandardReq {
    pub fn from_u8(request: u8) -> Option<Self> {
        Some(match request {
            0x00 => Self::GetStatus,
            0x01 => Self::ClearFeature,
            0x03 => Self::SetFeature,
            0x05 => Self::SetAddress,
            0x06 => Self::GetDescriptor,
            0x07 => Self::SetDescriptor,
            0x08 => Self::GetConfiguration,
            0x09 => Self::SetConfiguration,
            0x0A => Self::GetInterface,
            0x0B => Self::SetInterface,
            0x0C => Self::SynchFrame,
            _ => return None,
        })
    }
}

pub const USB_SETUP_DIR_BIT: u8 = 1 << 7;
pub const USB_SETUP_REQ_TY_MASK: u8 = 0x60;
pub const USB_SETUP_REQ_TY_SHIFT: u8 = 5;
pub const USB_SETUP_RECIPIENT_MASK: u8 = 0x1F;
pub const USB_SETUP_RECIPIENT_SHIFT: u8 = 0;

pub const SETUP_PACKET_SIZE: usize = 8;

impl Setup {
    /// Parse a SETUP packet as delivered by the controller. Fields are little endian on the wire.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let setup = plain::from_bytes::<Setup>(bytes).ok()?;
        Some(Self {
            kind: setup.kind,
            request: setup.request,
            value: u16::from_le(setup.value),
            index: u16::from_le(setup.index),
            length: u16::from_le(setup.length),
        })
    }

    pub fn to_bytes(&self) -> [u8; SETUP_PACKET_SIZE] {
        let value = self.value.to_le_bytes();
        let index = self.index.to_le_bytes();
        let length = self.length.to_le_bytes();
        [
            self.kind, self.request, value[0], value[1], index[0], index[1], length[0], length[1],
        ]
    }

    pub fn direction(&self) -> ReqDirection {
        if self.kind & USB_SETUP_DIR_BIT == 0 {
            ReqDirection::HostToDevice
        } else {
            ReqDirection::DeviceToHost
        }
    }

    pub fn req_ty(&self) -> ReqType {
        match (self.kind & USB_SETUP_REQ_TY_MASK) >> USB_SETUP_REQ_TY_SHIFT {
            0 => ReqType::Standard,
            1 => ReqType::Class,
            2 => ReqType::Vendor,
            _ => ReqType::Reserved,
        }
    }

    pub const fn req_recipient(&self) -> u8 {
        (self.kind & USB_SETUP_RECIPIENT_MASK) >> USB_SETUP_RECIPIENT_SHIFT
    }

    pub const fn get_status() -> Self {
        Self {
            kind: 0b1000_0001,
            request: 0x00,
            value: 0,
            index: 0,
            length: 2,
        }
    }

    pub const fn get_interface(interface: u8) -> Self {
        Self {
            kind: 0b1000_0001,
            request: 0x0A,
            value: 0,
            index: interface as u16,
            length: 1,
        }
    }

    pub const fn set_interface(interface: u8, alternate_setting: u8) -> Self {
        Self {
            kind: 0b0000_0001,
            request: 0x0B,
            value: alternate_setting as u16,
            index: interface as u16,
            length: 0,
        }
    }

    pub const fn clear_feature(feature: u16) -> Self {
        Self {
            kind: 0b0000_0001,
            request: 0x01,
            value: feature,
            index: 0,
            length: 0,
        }
    }

    /// A class request addressed to `interface`.
    pub const fn class(
        direction: ReqDirection,
        request: u8,
        value: u16,
        interface: u8,
        length: u16,
    ) -> Self {
        Self {
            kind: ((direction as u8) << 7)
                | ((ReqType::Class as u8) << USB_SETUP_REQ_TY_SHIFT)
                | ReqRecipient::Interface as u8,
            request,
            value,
            index: interface as u16,
            length,
        }
    }
}
