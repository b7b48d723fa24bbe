//! Protocol profiles and parameter ranges for WitMotion servo boards.

use core::fmt;
use core::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::ids::DEFAULT_CHANNEL_COUNT;
use crate::output::subcommand;
use crate::{ProtocolError, ProtocolResult};

/// Lowest pulse width (µs) accepted in the standard position range.
pub const POSITION_MIN: u16 = 500;
/// Highest pulse width (µs) accepted in the standard position range.
pub const POSITION_MAX: u16 = 2500;

/// Slowest speed step.
pub const SPEED_MIN: u8 = 1;
/// Fastest speed step.
pub const SPEED_MAX: u8 = 20;
/// Each speed step adds this many degrees per second.
pub const DEGREES_PER_SECOND_PER_STEP: u16 = 9;

/// First action group slot stored in firmware.
pub const ACTION_GROUP_MIN: u8 = 1;
/// Last action group slot stored in firmware.
pub const ACTION_GROUP_MAX: u8 = 16;

/// Wire protocol profile spoken by a board.
///
/// The two profiles disagree on framing and on the set-speed subcommand, so
/// the profile is chosen once per session and never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    /// First-generation framing: a leading `0x01` byte, fixed 16 channels,
    /// standard position range only.
    Original,
    /// Revised framing: report id first, configurable channel count and
    /// extended position range.
    #[default]
    Revised,
}

impl ProtocolVersion {
    /// Number of bytes written before the report id.
    pub fn prefix_len(self) -> usize {
        match self {
            Self::Original => 1,
            Self::Revised => 0,
        }
    }

    /// Subcommand byte used for set-speed.
    ///
    /// The original profile sends the set-position subcommand here. Kept
    /// as-is so original-profile sessions put the same bytes on the wire as
    /// the first-generation host driver.
    pub fn speed_subcommand(self) -> u8 {
        match self {
            Self::Original => subcommand::SET_POSITION,
            Self::Revised => subcommand::SET_SPEED,
        }
    }

    /// Whether `set_position` may use the full 16-bit range.
    pub fn supports_extended_range(self) -> bool {
        matches!(self, Self::Revised)
    }

    /// Channel count this profile is locked to, if any.
    pub fn fixed_channel_count(self) -> Option<u8> {
        match self {
            Self::Original => Some(DEFAULT_CHANNEL_COUNT),
            Self::Revised => None,
        }
    }

    /// Check that a board with `channels` outputs can speak this profile.
    pub fn validate_channel_count(self, channels: u8) -> ProtocolResult<()> {
        let ok = match self.fixed_channel_count() {
            Some(fixed) => channels == fixed,
            None => channels > 0,
        };
        if ok {
            Ok(())
        } else {
            Err(ProtocolError::InvalidChannelCount {
                channels,
                version: self,
            })
        }
    }

    /// Parse a profile name as used in configuration and environment overrides.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "original" | "v1" | "1" => Some(Self::Original),
            "revised" | "v2" | "2" => Some(Self::Revised),
            _ => None,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => f.write_str("original"),
            Self::Revised => f.write_str("revised"),
        }
    }
}

/// Accepted range for a set-position value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionRange {
    /// Native servo pulse width, 500..=2500 µs.
    #[default]
    Standard,
    /// Full 16-bit value space (revised profile only).
    Extended,
}

impl PositionRange {
    pub fn from_extended(extended: bool) -> Self {
        if extended {
            Self::Extended
        } else {
            Self::Standard
        }
    }

    /// Inclusive bounds of the range.
    pub fn bounds(self) -> RangeInclusive<u16> {
        match self {
            Self::Standard => POSITION_MIN..=POSITION_MAX,
            Self::Extended => u16::MIN..=u16::MAX,
        }
    }

    pub fn contains(self, value: u16) -> bool {
        self.bounds().contains(&value)
    }
}

/// Angular speed in degrees per second for a speed step.
///
/// e.g. step 15 is 135 °/s.
pub fn speed_to_degrees_per_second(value: u8) -> u16 {
    u16::from(value).saturating_mul(DEGREES_PER_SECOND_PER_STEP)
}
