//! Configuration descriptors of the printer function.
//!
//! Each speed has its own 32-byte configuration descriptor: the configuration header, one
//! printer interface and its two bulk endpoints. The interface number, the interface string
//! index and both endpoint addresses can be moved at runtime (for instance when the function is
//! part of a composite device), see [PrinterDescriptors::patch].

use bitflags::bitflags;
use driver_udc::{EndpointTy, UsbSpeed, EP0_MAX_PACKET_SIZE};
use plain::Plain;

pub const PRINTER_CONFIG_DESC_SIZE: usize = 32;
pub const DEVICE_QUALIFIER_DESC_SIZE: usize = 10;

pub const CONFIG_DESC_SIZE: u8 = 9;
pub const INTERFACE_DESC_SIZE: u8 = 9;
pub const ENDPOINT_DESC_SIZE: u8 = 7;

pub const DATA_HS_MAX_PACKET_SIZE: u16 = 512;
pub const DATA_FS_MAX_PACKET_SIZE: u16 = 64;

/// bInterfaceClass of a printer interface.
pub const PRINTER_CLASS: u8 = 0x07;
/// bInterfaceSubClass "Printers".
pub const PRINTER_SUBCLASS: u8 = 0x01;
/// bInterfaceProtocol of a bidirectional printer.
pub const PRINTER_PROTOCOL_BIDIRECTIONAL: u8 = 0x02;

pub const DEFAULT_INTERFACE_NUMBER: u8 = 0x00;
pub const DEFAULT_STRING_INDEX: u8 = 0x01;
pub const DEFAULT_IN_ENDPOINT: u8 = 0x81;
pub const DEFAULT_OUT_ENDPOINT: u8 = 0x01;
/// bMaxPower is expressed in units of 2 mA.
pub const DEFAULT_MAX_POWER: u8 = 0x32;

pub const INTERFACE_NUMBER_OFFSET: usize = 11;
pub const STRING_INDEX_OFFSET: usize = 17;
pub const IN_ENDPOINT_OFFSET: usize = 20;
pub const OUT_ENDPOINT_OFFSET: usize = 27;

const INTERFACE_OFFSET: usize = CONFIG_DESC_SIZE as usize;
const ENDPOINTS_OFFSET: usize = INTERFACE_OFFSET + INTERFACE_DESC_SIZE as usize;

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DescriptorKind {
    Configuration = 2,
    Interface = 4,
    Endpoint = 5,
    DeviceQualifier = 6,
    OtherSpeedConfiguration = 7,
}

bitflags! {
    /// bmAttributes of a configuration descriptor.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct ConfigAttributes: u8 {
        /// Must always be set (USB2 9.6.3).
        const RESERVED_ONE = 1 << 7;
        const SELF_POWERED = 1 << 6;
        const REMOTE_WAKEUP = 1 << 5;
    }
}

impl Default for ConfigAttributes {
    fn default() -> Self {
        Self::RESERVED_ONE
    }
}

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfigDescriptor {
    pub length: u8,
    pub kind: u8,
    pub total_length: u16,
    pub interfaces: u8,
    pub configuration_value: u8,
    pub configuration_str: u8,
    pub attributes: u8,
    pub max_power: u8,
}

unsafe impl Plain for ConfigDescriptor {}

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct InterfaceDescriptor {
    pub length: u8,
    pub kind: u8,
    pub number: u8,
    pub alternate_setting: u8,
    pub endpoints: u8,
    pub class: u8,
    pub sub_class: u8,
    pub protocol: u8,
    pub interface_str: u8,
}

unsafe impl Plain for InterfaceDescriptor {}

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct EndpointDescriptor {
    pub length: u8,
    pub kind: u8,
    pub address: u8,
    pub attributes: u8,
    pub max_packet_size: u16,
    pub interval: u8,
}

unsafe impl Plain for EndpointDescriptor {}

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default)]
pub struct DeviceQualifierDescriptor {
    pub length: u8,
    pub kind: u8,
    pub usb: u16,
    pub class: u8,
    pub sub_class: u8,
    pub protocol: u8,
    pub packet_size: u8,
    pub configurations: u8,
    pub reserved: u8,
}

unsafe impl Plain for DeviceQualifierDescriptor {}

/// The four values of the printer function that may be moved after construction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InterfaceConfig {
    pub interface_number: u8,
    pub in_endpoint: u8,
    pub out_endpoint: u8,
    pub string_index: u8,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            interface_number: DEFAULT_INTERFACE_NUMBER,
            in_endpoint: DEFAULT_IN_ENDPOINT,
            out_endpoint: DEFAULT_OUT_ENDPOINT,
            string_index: DEFAULT_STRING_INDEX,
        }
    }
}

/// Bulk max packet size for the negotiated bus speed.
pub fn max_packet_size(speed: UsbSpeed) -> u16 {
    match speed {
        UsbSpeed::High => DATA_HS_MAX_PACKET_SIZE,
        UsbSpeed::Full | UsbSpeed::Other => DATA_FS_MAX_PACKET_SIZE,
    }
}

const fn build_config_descriptor(
    kind: DescriptorKind,
    max_packet_size: u16,
    attributes: u8,
    max_power: u8,
) -> [u8; PRINTER_CONFIG_DESC_SIZE] {
    let total = (PRINTER_CONFIG_DESC_SIZE as u16).to_le_bytes();
    let mps = max_packet_size.to_le_bytes();
    let bulk = EndpointTy::Bulk as u8;

    [
        CONFIG_DESC_SIZE,
        kind as u8,
        total[0],
        total[1],
        0x01, // one interface
        0x01, // bConfigurationValue
        0x00, // no configuration string
        attributes,
        max_power,
        INTERFACE_DESC_SIZE,
        DescriptorKind::Interface as u8,
        DEFAULT_INTERFACE_NUMBER,
        0x00, // alternate setting
        0x02, // two endpoints
        PRINTER_CLASS,
        PRINTER_SUBCLASS,
        PRINTER_PROTOCOL_BIDIRECTIONAL,
        DEFAULT_STRING_INDEX,
        ENDPOINT_DESC_SIZE,
        DescriptorKind::Endpoint as u8,
        DEFAULT_IN_ENDPOINT,
        bulk,
        mps[0],
        mps[1],
        0x00,
        ENDPOINT_DESC_SIZE,
        DescriptorKind::Endpoint as u8,
        DEFAULT_OUT_ENDPOINT,
        bulk,
        mps[0],
        mps[1],
        0x00,
    ]
}

const fn build_device_qualifier() -> [u8; DEVICE_QUALIFIER_DESC_SIZE] {
    [
        DEVICE_QUALIFIER_DESC_SIZE as u8,
        DescriptorKind::DeviceQualifier as u8,
        0x00, // bcdUSB 2.00
        0x02,
        0x00, // class, subclass and protocol are given per interface
        0x00,
        0x00,
        EP0_MAX_PACKET_SIZE as u8,
        0x01,
        0x00,
    ]
}

/// One speed variant of the printer configuration descriptor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DescriptorTable {
    bytes: [u8; PRINTER_CONFIG_DESC_SIZE],
}

impl DescriptorTable {
    fn new(
        kind: DescriptorKind,
        max_packet_size: u16,
        attributes: ConfigAttributes,
        max_power: u8,
    ) -> Self {
        Self {
            bytes: build_config_descriptor(
                kind,
                max_packet_size,
                (attributes | ConfigAttributes::RESERVED_ONE).bits(),
                max_power,
            ),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn header(&self) -> Option<&ConfigDescriptor> {
        plain::from_bytes(&self.bytes[..INTERFACE_OFFSET]).ok()
    }

    pub fn interface(&self) -> Option<&InterfaceDescriptor> {
        plain::from_bytes(&self.bytes[INTERFACE_OFFSET..ENDPOINTS_OFFSET]).ok()
    }

    /// Endpoint descriptor `index`: 0 is bulk IN, 1 is bulk OUT.
    pub fn endpoint(&self, index: usize) -> Option<&EndpointDescriptor> {
        let start = ENDPOINTS_OFFSET + index * ENDPOINT_DESC_SIZE as usize;
        let end = start + ENDPOINT_DESC_SIZE as usize;
        self.bytes.get(start..end).and_then(|b| plain::from_bytes(b).ok())
    }

    fn patch(&mut self, config: &InterfaceConfig) {
        self.bytes[INTERFACE_NUMBER_OFFSET] = config.interface_number;
        self.bytes[STRING_INDEX_OFFSET] = config.string_index;
        self.bytes[IN_ENDPOINT_OFFSET] = config.in_endpoint;
        self.bytes[OUT_ENDPOINT_OFFSET] = config.out_endpoint;
    }
}

/// The descriptor set of the printer function together with the interface layout it encodes.
#[derive(Clone, Debug)]
pub struct PrinterDescriptors {
    hs: DescriptorTable,
    fs: DescriptorTable,
    other_speed: DescriptorTable,
    qualifier: [u8; DEVICE_QUALIFIER_DESC_SIZE],
    config: InterfaceConfig,
}

impl PrinterDescriptors {
    pub fn new(attributes: ConfigAttributes, max_power: u8) -> Self {
        Self {
            hs: DescriptorTable::new(
                DescriptorKind::Configuration,
                DATA_HS_MAX_PACKET_SIZE,
                attributes,
                max_power,
            ),
            fs: DescriptorTable::new(
                DescriptorKind::Configuration,
                DATA_FS_MAX_PACKET_SIZE,
                attributes,
                max_power,
            ),
            // Describes the full-speed layout while running at high speed (USB2 9.6.4).
            other_speed: DescriptorTable::new(
                DescriptorKind::OtherSpeedConfiguration,
                DATA_FS_MAX_PACKET_SIZE,
                attributes,
                max_power,
            ),
            qualifier: build_device_qualifier(),
            config: InterfaceConfig::default(),
        }
    }

    pub fn table(&self, speed: UsbSpeed) -> &DescriptorTable {
        match speed {
            UsbSpeed::High => &self.hs,
            UsbSpeed::Full => &self.fs,
            UsbSpeed::Other => &self.other_speed,
        }
    }

    pub fn get_descriptor(&self, speed: UsbSpeed) -> &[u8] {
        self.table(speed).as_bytes()
    }

    pub fn hs_config(&self) -> &[u8] {
        self.hs.as_bytes()
    }

    pub fn fs_config(&self) -> &[u8] {
        self.fs.as_bytes()
    }

    pub fn other_speed_config(&self) -> &[u8] {
        self.other_speed.as_bytes()
    }

    pub fn device_qualifier(&self) -> &[u8] {
        &self.qualifier
    }

    pub fn interface_config(&self) -> InterfaceConfig {
        self.config
    }

    /// Move the interface and its endpoints. Every table and the mirrored [InterfaceConfig] are
    /// rewritten together; values are taken as-is.
    pub fn patch(
        &mut self,
        interface_number: u8,
        in_endpoint: u8,
        out_endpoint: u8,
        string_index: u8,
    ) {
        let config = InterfaceConfig {
            interface_number,
            in_endpoint,
            out_endpoint,
            string_index,
        };
        self.hs.patch(&config);
        self.fs.patch(&config);
        self.other_speed.patch(&config);
        self.config = config;
    }
}

impl Default for PrinterDescriptors {
    fn default() -> Self {
        Self::new(ConfigAttributes::default(), DEFAULT_MAX_POWER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEEDS: [UsbSpeed; 3] = [UsbSpeed::Full, UsbSpeed::High, UsbSpeed::Other];

    #[test]
    fn total_length_matches_buffer() {
        let descriptors = PrinterDescriptors::default();
        for speed in SPEEDS {
            let bytes = descriptors.get_descriptor(speed);
            let header = descriptors.table(speed).header().unwrap();
            assert_eq!(bytes.len(), PRINTER_CONFIG_DESC_SIZE);
            assert_eq!(usize::from(u16::from_le(header.total_length)), bytes.len());
            assert_eq!(header.interfaces, 1);
        }
    }

    #[test]
    fn other_speed_table_has_its_own_type() {
        let descriptors = PrinterDescriptors::default();
        let kind = |speed| descriptors.get_descriptor(speed)[1];
        assert_eq!(kind(UsbSpeed::Full), DescriptorKind::Configuration as u8);
        assert_eq!(kind(UsbSpeed::High), DescriptorKind::Configuration as u8);
        assert_eq!(kind(UsbSpeed::Other), DescriptorKind::OtherSpeedConfiguration as u8);
        assert_eq!(descriptors.other_speed_config()[1], 0x07);
    }

    #[test]
    fn max_packet_sizes_per_speed() {
        let descriptors = PrinterDescriptors::default();
        for speed in SPEEDS {
            let table = descriptors.table(speed);
            for index in 0..2 {
                let endpoint = table.endpoint(index).unwrap();
                assert_eq!(u16::from_le(endpoint.max_packet_size), max_packet_size(speed));
                assert_eq!(endpoint.attributes, EndpointTy::Bulk as u8);
            }
            assert!(table.endpoint(2).is_none());
        }
        assert_eq!(max_packet_size(UsbSpeed::High), 512);
        assert_eq!(max_packet_size(UsbSpeed::Other), 64);
    }

    #[test]
    fn printer_interface_fields() {
        let descriptors = PrinterDescriptors::default();
        let interface = descriptors.table(UsbSpeed::Full).interface().unwrap();
        assert_eq!(interface.class, PRINTER_CLASS);
        assert_eq!(interface.sub_class, PRINTER_SUBCLASS);
        assert_eq!(interface.protocol, PRINTER_PROTOCOL_BIDIRECTIONAL);
        assert_eq!(interface.endpoints, 2);
        assert_eq!(interface.alternate_setting, 0);
    }

    #[test]
    fn patch_rewrites_every_table() {
        let mut descriptors = PrinterDescriptors::default();
        descriptors.patch(2, 0x83, 0x03, 5);

        for speed in SPEEDS {
            let bytes = descriptors.get_descriptor(speed);
            assert_eq!(bytes[INTERFACE_NUMBER_OFFSET], 2);
            assert_eq!(bytes[STRING_INDEX_OFFSET], 5);
            assert_eq!(bytes[IN_ENDPOINT_OFFSET], 0x83);
            assert_eq!(bytes[OUT_ENDPOINT_OFFSET], 0x03);

            let table = descriptors.table(speed);
            assert_eq!(table.interface().unwrap().number, 2);
            assert_eq!(table.endpoint(0).unwrap().address, 0x83);
            assert_eq!(table.endpoint(1).unwrap().address, 0x03);
        }
        assert_eq!(
            descriptors.interface_config(),
            InterfaceConfig {
                interface_number: 2,
                in_endpoint: 0x83,
                out_endpoint: 0x03,
                string_index: 5,
            }
        );
    }

    #[test]
    fn attributes_always_carry_reserved_bit() {
        let descriptors = PrinterDescriptors::new(ConfigAttributes::SELF_POWERED, 0);
        let header = descriptors.table(UsbSpeed::High).header().unwrap();
        assert_eq!(header.attributes, 0xC0);
        assert_eq!(header.max_power, 0);
    }

    #[test]
    fn device_qualifier_layout() {
        let descriptors = PrinterDescriptors::default();
        let qualifier: &DeviceQualifierDescriptor =
            plain::from_bytes(descriptors.device_qualifier()).unwrap();
        assert_eq!(usize::from(qualifier.length), DEVICE_QUALIFIER_DESC_SIZE);
        assert_eq!(qualifier.kind, DescriptorKind::DeviceQualifier as u8);
        assert_eq!(u16::from_le(qualifier.usb), 0x0200);
        assert_eq!(qualifier.configurations, 1);
    }
}
