use driver_gadget::{DeviceState, StandardReq};
use syscall::error::{EBUSY, EINVAL, ENOBUFS, ENODEV, ENOMEM, EOPNOTSUPP};
use thiserror::Error;

pub type Result<T, E = PrinterError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PrinterError {
    #[error("printer instance is already bound")]
    ResourceUnavailable,

    #[error("{request:?} is not allowed in the {state:?} state")]
    InvalidState {
        request: StandardReq,
        state: DeviceState,
    },

    #[error("unsupported {kind} request {request:#04x}")]
    UnsupportedRequest { kind: &'static str, request: u8 },

    #[error("no printer interface registered")]
    NoInterfaceBound,

    #[error("no receive buffer registered")]
    NoReceiveBuffer,

    #[error("printer function is not active")]
    NotActive,

    #[error("a bulk IN transfer is already in flight")]
    Busy,

    #[error("device controller error: {0}")]
    Udc(#[from] syscall::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

impl From<PrinterError> for syscall::Error {
    fn from(err: PrinterError) -> Self {
        match err {
            PrinterError::Udc(err) => err,
            PrinterError::ResourceUnavailable => syscall::Error::new(ENOMEM),
            PrinterError::InvalidState { .. } => syscall::Error::new(EINVAL),
            PrinterError::UnsupportedRequest { .. } => syscall::Error::new(EOPNOTSUPP),
            PrinterError::NoInterfaceBound | PrinterError::NotActive => syscall::Error::new(ENODEV),
            PrinterError::NoReceiveBuffer => syscall::Error::new(ENOBUFS),
            PrinterError::Busy => syscall::Error::new(EBUSY),
            PrinterError::Toml(_) | PrinterError::InvalidConfig(_) => syscall::Error::new(EINVAL),
        }
    }
}
