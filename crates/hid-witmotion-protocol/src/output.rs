//! Output report encoding for WitMotion servo boards.
//!
//! Every command is a single 64-byte HID output report:
//!
//! ```text
//! [prefix?] REPORT_ID COMMAND_SERVO COMMAND_CONST subcmd payload... 0x00 padding
//! ```
//!
//! The optional prefix is the `0x01` byte of the original profile. Padding
//! always brings the report to exactly [`REPORT_LEN`] bytes.

use crate::types::{
    ACTION_GROUP_MAX, ACTION_GROUP_MIN, PositionRange, ProtocolVersion, SPEED_MAX, SPEED_MIN,
};
use crate::{DEFAULT_CHANNEL_COUNT, ProtocolError, ProtocolResult};

/// Length of every report exchanged with the board, in bytes.
pub const REPORT_LEN: usize = 64;

/// HID report id carried by every command.
pub const REPORT_ID: u8 = 0x05;

/// Leading byte of original-profile reports.
pub const ORIGINAL_PREFIX: u8 = 0x01;

/// Command byte following the report id.
pub const COMMAND_SERVO: u8 = 0x03;

/// Constant byte following the command byte.
pub const COMMAND_CONST: u8 = 0xFF;

/// Marker byte carried by the heartbeat query.
pub const HEARTBEAT_MARKER: u8 = 0x12;

/// Header length (report id, command, constant, subcommand) after the prefix.
pub const HEADER_LEN: usize = 4;

/// Subcommand bytes understood by the board firmware.
pub mod subcommand {
    pub const HEARTBEAT: u8 = 0x00;
    pub const SET_SPEED: u8 = 0x01;
    pub const SET_POSITION: u8 = 0x02;
    pub const ACTION_GROUP: u8 = 0x09;
    pub const EMERGENCY: u8 = 0x0B;
}

/// One outbound HID report.
pub type ServoFrame = [u8; REPORT_LEN];

/// Offset of the first payload byte for a profile.
pub fn payload_offset(version: ProtocolVersion) -> usize {
    version.prefix_len() + HEADER_LEN
}

/// Assemble a zero-padded report from its subcommand and payload.
///
/// Bytes past [`REPORT_LEN`] are dropped; every payload this crate emits is
/// at most three bytes.
pub fn build_frame(version: ProtocolVersion, subcommand: u8, payload: &[u8]) -> ServoFrame {
    let prefix: &[u8] = match version {
        ProtocolVersion::Original => &[ORIGINAL_PREFIX],
        ProtocolVersion::Revised => &[],
    };
    let header = [REPORT_ID, COMMAND_SERVO, COMMAND_CONST, subcommand];

    let mut frame = [0u8; REPORT_LEN];
    let bytes = prefix.iter().chain(header.iter()).chain(payload.iter());
    for (slot, byte) in frame.iter_mut().zip(bytes) {
        *slot = *byte;
    }
    frame
}

/// A board command described declaratively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoCommand {
    Heartbeat,
    SetPosition { channel: u8, value: u16, extended: bool },
    SetSpeed { channel: u8, value: u8 },
    ExecuteActionGroup { group: u8 },
    EmergencyStop,
    EmergencyRecovery,
}

impl ServoCommand {
    /// Short name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Heartbeat => "heartbeat",
            Self::SetPosition { .. } => "set_position",
            Self::SetSpeed { .. } => "set_speed",
            Self::ExecuteActionGroup { .. } => "execute_action_group",
            Self::EmergencyStop => "emergency_stop",
            Self::EmergencyRecovery => "emergency_recovery",
        }
    }
}

/// Validates command parameters and encodes them into output reports.
///
/// An encoder is bound to one protocol profile and one channel count; both
/// are checked at construction so every frame it emits is well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoCommandEncoder {
    version: ProtocolVersion,
    channel_count: u8,
}

impl Default for ServoCommandEncoder {
    fn default() -> Self {
        Self {
            version: ProtocolVersion::Revised,
            channel_count: DEFAULT_CHANNEL_COUNT,
        }
    }
}

impl ServoCommandEncoder {
    /// Create an encoder for `version` driving `channel_count` outputs.
    pub fn new(version: ProtocolVersion, channel_count: u8) -> ProtocolResult<Self> {
        version.validate_channel_count(channel_count)?;
        Ok(Self {
            version,
            channel_count,
        })
    }

    /// Encoder for the fixed 16-channel original profile.
    pub fn original() -> Self {
        Self {
            version: ProtocolVersion::Original,
            channel_count: DEFAULT_CHANNEL_COUNT,
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn channel_count(&self) -> u8 {
        self.channel_count
    }

    fn check_channel(&self, channel: u8) -> ProtocolResult<()> {
        if channel < self.channel_count {
            Ok(())
        } else {
            Err(ProtocolError::ChannelOutOfRange {
                channel,
                channel_count: self.channel_count,
            })
        }
    }

    /// Encode any [`ServoCommand`].
    pub fn encode(&self, command: &ServoCommand) -> ProtocolResult<ServoFrame> {
        match *command {
            ServoCommand::Heartbeat => Ok(self.heartbeat()),
            ServoCommand::SetPosition {
                channel,
                value,
                extended,
            } => self.set_position(channel, value, extended),
            ServoCommand::SetSpeed { channel, value } => self.set_speed(channel, value),
            ServoCommand::ExecuteActionGroup { group } => self.execute_action_group(group),
            ServoCommand::EmergencyStop => Ok(self.emergency_stop()),
            ServoCommand::EmergencyRecovery => Ok(self.emergency_recovery()),
        }
    }

    /// Status query sent at the start of a heartbeat transaction.
    pub fn heartbeat(&self) -> ServoFrame {
        build_frame(self.version, subcommand::HEARTBEAT, &[HEARTBEAT_MARKER])
    }

    /// Move `channel` to `value`.
    ///
    /// # Report layout (revised)
    /// ```text
    /// Byte 0:   REPORT_ID (0x05)
    /// Byte 1-2: 0x03 0xFF
    /// Byte 3:   SET_POSITION (0x02)
    /// Byte 4:   channel
    /// Byte 5-6: value u16 LE
    /// ```
    ///
    /// # Errors
    /// Channel past the board's channel count, value outside the selected
    /// range, or an extended request on the original profile.
    pub fn set_position(
        &self,
        channel: u8,
        value: u16,
        extended: bool,
    ) -> ProtocolResult<ServoFrame> {
        self.check_channel(channel)?;
        if extended && !self.version.supports_extended_range() {
            return Err(ProtocolError::ExtendedRangeUnsupported {
                version: self.version,
            });
        }
        let range = PositionRange::from_extended(extended).bounds();
        if !range.contains(&value) {
            return Err(ProtocolError::PositionOutOfRange {
                value,
                min: *range.start(),
                max: *range.end(),
            });
        }

        let [lo, hi] = value.to_le_bytes();
        Ok(build_frame(
            self.version,
            subcommand::SET_POSITION,
            &[channel, lo, hi],
        ))
    }

    /// Set the travel speed of `channel` to step `value` (9 °/s per step).
    ///
    /// # Errors
    /// Channel past the board's channel count or `value` outside 1..=20.
    pub fn set_speed(&self, channel: u8, value: u8) -> ProtocolResult<ServoFrame> {
        self.check_channel(channel)?;
        if !(SPEED_MIN..=SPEED_MAX).contains(&value) {
            return Err(ProtocolError::SpeedOutOfRange {
                value,
                min: SPEED_MIN,
                max: SPEED_MAX,
            });
        }
        Ok(build_frame(
            self.version,
            self.version.speed_subcommand(),
            &[channel, value, 0x00],
        ))
    }

    /// Run the firmware-stored action group `group`.
    ///
    /// # Errors
    /// `group` outside 1..=16.
    pub fn execute_action_group(&self, group: u8) -> ProtocolResult<ServoFrame> {
        if !(ACTION_GROUP_MIN..=ACTION_GROUP_MAX).contains(&group) {
            return Err(ProtocolError::ActionGroupOutOfRange {
                value: group,
                min: ACTION_GROUP_MIN,
                max: ACTION_GROUP_MAX,
            });
        }
        Ok(build_frame(
            self.version,
            subcommand::ACTION_GROUP,
            &[0x00, group, 0x00],
        ))
    }

    pub fn emergency_stop(&self) -> ServoFrame {
        build_frame(self.version, subcommand::EMERGENCY, &[0x00, 0x01, 0x00])
    }

    pub fn emergency_recovery(&self) -> ServoFrame {
        build_frame(self.version, subcommand::EMERGENCY, &[0x00, 0x00, 0x00])
    }
}
