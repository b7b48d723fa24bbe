//! HID protocol implementation for WitMotion 16-channel servo controller boards.
//!
//! The board enumerates as a vendor-defined USB HID device and accepts
//! fixed-length 64-byte output reports. This crate holds the wire constants,
//! parameter validation and report encoders; it does no I/O.
//!
//! ## Protocol Notes
//!
//! Two generations of host framing exist and are modelled as
//! [`ProtocolVersion`] profiles:
//!
//! | Profile | Prefix | Channels | Position range | Set-speed subcmd |
//! |---------|--------|----------|----------------|------------------|
//! | `Original` | `0x01` | 16 | 500–2500 | `0x02` |
//! | `Revised` | none | configurable | 500–2500 or 0–65535 | `0x01` |
//!
//! Both profiles emit exactly [`REPORT_LEN`] bytes per command.
//!
//! ### Commands
//!
//! | Command | Subcmd | Payload |
//! |---------|--------|---------|
//! | Heartbeat query | `0x00` | `0x12` |
//! | Set position | `0x02` | channel, value LE |
//! | Set speed | see above | channel, step, `0x00` |
//! | Action group | `0x09` | `0x00`, group, `0x00` |
//! | Emergency stop | `0x0B` | `0x00`, `0x01`, `0x00` |
//! | Emergency recovery | `0x0B` | `0x00`, `0x00`, `0x00` |
//!
//! The heartbeat response is returned to callers as raw bytes; its content
//! is not decoded here.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]

pub mod ids;
pub mod output;
pub mod types;

pub use ids::*;
pub use output::*;
pub use types::*;

use thiserror::Error;

/// Errors returned by parameter validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("channel {channel} out of range: board has {channel_count} channels")]
    ChannelOutOfRange { channel: u8, channel_count: u8 },

    #[error("position {value} out of range ({min}, {max})")]
    PositionOutOfRange { value: u16, min: u16, max: u16 },

    #[error("speed {value} out of range ({min}, {max})")]
    SpeedOutOfRange { value: u8, min: u8, max: u8 },

    #[error("action group {value} out of range ({min}, {max})")]
    ActionGroupOutOfRange { value: u8, min: u8, max: u8 },

    #[error("extended position range is not supported by the {version} protocol")]
    ExtendedRangeUnsupported { version: ProtocolVersion },

    #[error("invalid channel count {channels} for the {version} protocol")]
    InvalidChannelCount {
        channels: u8,
        version: ProtocolVersion,
    },
}

/// Convenience result alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
