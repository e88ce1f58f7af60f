//! USB printer class function driver (device side).
//!
//! Implements the bidirectional printer interface of the USB Printer Class 1.1 on top of a
//! device controller reached through [driver_udc::UDCAdapter]:
//!
//! - configuration descriptors for full, high and other speed, whose interface number,
//!   endpoint addresses and string index can be moved at runtime;
//! - activation and deactivation of the bulk IN/OUT endpoint pair;
//! - dispatch of printer class requests (GET_DEVICE_ID, GET_PORT_STATUS, SOFT_RESET) and of the
//!   few standard requests an interface answers itself;
//! - the bulk data path, including zero-length packet termination of IN transfers and explicit,
//!   application-paced re-arming of the OUT endpoint.
//!
//! The application provides its callbacks through [PrinterInterface] and drives the gadget
//! through the [driver_gadget::USBGadget] entry points.
//!
//! - USB2 - [Universal Serial Bus Specification](https://www.usb.org/document-library/usb-20-specification)
//! - PRINTER - [Universal Serial Bus Device Class Definition for Printing Devices 1.1](https://www.usb.org/document-library/printer-device-class-document-11)

mod bulk;
pub mod config;
mod control;
pub mod descriptor;
pub mod error;
mod gadget;
pub mod instance;
pub mod interface;
pub mod request;

pub use config::PrinterConfig;
pub use descriptor::{ConfigAttributes, DescriptorTable, InterfaceConfig, PrinterDescriptors};
pub use error::{PrinterError, Result};
pub use gadget::PrinterGadget;
pub use instance::{ClassInstance, TxState};
pub use interface::PrinterInterface;
pub use request::{PortStatus, PrinterReq};
