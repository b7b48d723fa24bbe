//! HID transport layer for WitMotion servo boards
//!
//! This crate is the seam between the servo driver and the host HID stack:
//! the [`HidTransport`] / [`HidHandle`] traits, an `hidapi` implementation
//! (feature `hidapi`, on by default) and an in-memory [`mock`] transport for
//! tests.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod device_info;
pub mod hid_traits;
#[cfg(feature = "hidapi")]
pub mod hidapi_backend;

pub use device_info::*;
pub use hid_traits::*;
#[cfg(feature = "hidapi")]
pub use hidapi_backend::{HidApiHandle, HidApiTransport};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HidCommonError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to open device: {0}")]
    OpenError(String),

    #[error("Permission denied for device: {0}")]
    PermissionDenied(String),

    #[error("Failed to read from device: {0}")]
    ReadError(String),

    #[error("Failed to write to device: {0}")]
    WriteError(String),

    #[error("Short write: {actual} of {expected} bytes")]
    ShortWrite { expected: usize, actual: usize },

    #[error("Device disconnected")]
    Disconnected,

    #[error("HID backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type HidCommonResult<T> = Result<T, HidCommonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let err = HidCommonError::DeviceNotFound("1920:0100".to_string());
        assert_eq!(format!("{}", err), "Device not found: 1920:0100");

        let err = HidCommonError::ShortWrite {
            expected: 64,
            actual: 12,
        };
        assert_eq!(format!("{}", err), "Short write: 12 of 64 bytes");

        let err = HidCommonError::Disconnected;
        assert_eq!(format!("{}", err), "Device disconnected");
    }
}
