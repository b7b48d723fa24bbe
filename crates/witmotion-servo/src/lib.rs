//! Driver for WitMotion 16-channel USB HID servo controller boards.
//!
//! A [`ServoBoard`] owns one open HID handle and turns validated servo
//! commands into 64-byte output reports. Frame layout and parameter rules
//! live in [`hid_witmotion_protocol`]; host HID access goes through the
//! [`HidTransport`] seam from [`witmotion_hid_common`], so the same session
//! code runs against `hidapi` or an in-memory mock.
//!
//! ```no_run
//! # #[cfg(feature = "hidapi")]
//! # fn main() -> witmotion_servo::ServoResult<()> {
//! use witmotion_servo::{ServoBoard, ServoConfig};
//!
//! let mut board = ServoBoard::new(ServoConfig::default().with_serial("ABC123"))?;
//! board.open()?.emergency_recovery()?;
//! board.set_speed(0, 10)?;
//! board.set_position(0, 1500, false)?;
//! let status = board.heartbeat()?;
//! println!("board answered with {} bytes", status.len());
//! board.close()?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "hidapi"))]
//! # fn main() {}
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod discovery;
pub mod heartbeat;
pub mod session;

pub use config::{DeviceIdentity, ServoConfig};
pub use discovery::{list_device_info, list_devices};
#[cfg(feature = "hidapi")]
pub use discovery::discover;
pub use heartbeat::StatusReport;
pub use session::{ServoBoard, SessionState};

pub use hid_witmotion_protocol::{
    ProtocolError, ProtocolVersion, ServoCommand, ServoCommandEncoder, ServoFrame,
};
pub use witmotion_hid_common::{HidCommonError, HidDeviceInfo, HidHandle, HidTransport};

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the servo driver.
#[derive(Error, Debug)]
pub enum ServoError {
    /// A command parameter failed validation. Nothing was written.
    #[error("invalid command: {0}")]
    Validation(#[from] ProtocolError),

    /// The board could not be opened.
    #[error("failed to connect to servo board: {0}")]
    Connection(#[source] HidCommonError),

    /// A write, read or enumeration on the host HID stack failed.
    #[error("servo board I/O failed: {0}")]
    Transport(#[source] HidCommonError),

    /// No heartbeat response arrived before the deadline.
    #[error("heartbeat timed out after {}ms", timeout.as_millis())]
    Timeout { timeout: Duration },

    /// A command was issued on a closed session.
    #[error("servo board is not open")]
    NotOpen,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ServoError {
    /// True for errors caused by the caller's input rather than the device.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ServoError::Validation(_) | ServoError::NotOpen | ServoError::Config(_)
        )
    }
}

pub type ServoResult<T> = Result<T, ServoError>;
