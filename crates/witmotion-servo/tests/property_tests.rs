//! Property-based tests for the servo session.
//!
//! Checks that valid commands reach the transport as exactly one frame and
//! that rejected commands never reach it at all.

use hid_witmotion_protocol::{
    ACTION_GROUP_MAX, ACTION_GROUP_MIN, POSITION_MAX, POSITION_MIN, ProtocolVersion, REPORT_LEN,
    SPEED_MAX, SPEED_MIN,
};
use proptest::prelude::*;
use witmotion_hid_common::mock::{MockHidDevice, MockHidTransport};
use witmotion_servo::{ServoBoard, ServoConfig, ServoError};

fn open_session(
    config: ServoConfig,
) -> Result<(ServoBoard<MockHidTransport>, MockHidDevice), TestCaseError> {
    let device = MockHidDevice::new(0x1920, 0x0100, "/dev/hidraw0").with_serial("PROP");
    let mut session =
        ServoBoard::with_transport(MockHidTransport::new().with_device(device.clone()), config)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
    session
        .open()
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    Ok((session, device))
}

fn any_version() -> impl Strategy<Value = ProtocolVersion> {
    prop_oneof![
        Just(ProtocolVersion::Original),
        Just(ProtocolVersion::Revised),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// A valid position writes one frame identical to the encoder's output.
    #[test]
    fn prop_valid_position_writes_encoder_frame(
        version in any_version(),
        channel in 0u8..16,
        value in POSITION_MIN..=POSITION_MAX,
    ) {
        let (mut session, device) = open_session(ServoConfig::default().with_protocol(version))?;
        let expected = session
            .encoder()
            .set_position(channel, value, false)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert!(session.set_position(channel, value, false).is_ok());
        let writes = device.write_history();
        prop_assert_eq!(writes.len(), 1);
        prop_assert_eq!(writes[0].len(), REPORT_LEN);
        prop_assert_eq!(&writes[0][..], &expected[..]);
    }

    /// Out-of-range positions are rejected without touching the device.
    #[test]
    fn prop_invalid_position_writes_nothing(
        channel in 0u8..16,
        value in prop_oneof![0u16..POSITION_MIN, (POSITION_MAX + 1)..=u16::MAX],
    ) {
        let (mut session, device) = open_session(ServoConfig::default())?;
        let result = session.set_position(channel, value, false);
        prop_assert!(matches!(result, Err(ServoError::Validation(_))));
        prop_assert!(device.write_history().is_empty());
    }

    /// Speed accepts exactly 1..=20.
    #[test]
    fn prop_speed_boundary(channel in 0u8..16, value in any::<u8>()) {
        let (mut session, device) = open_session(ServoConfig::default())?;
        let result = session.set_speed(channel, value);
        if (SPEED_MIN..=SPEED_MAX).contains(&value) {
            prop_assert!(result.is_ok());
            prop_assert_eq!(device.write_history().len(), 1);
        } else {
            prop_assert!(matches!(result, Err(ServoError::Validation(_))));
            prop_assert!(device.write_history().is_empty());
        }
    }

    /// Action groups accept exactly 1..=16.
    #[test]
    fn prop_action_group_boundary(group in any::<u8>()) {
        let (mut session, device) = open_session(ServoConfig::default())?;
        let result = session.execute_action_group(group);
        let valid = (ACTION_GROUP_MIN..=ACTION_GROUP_MAX).contains(&group);
        prop_assert_eq!(result.is_ok(), valid);
        prop_assert_eq!(device.write_history().len(), usize::from(valid));
    }

    /// Channels at or past the configured count are rejected.
    #[test]
    fn prop_channel_bound_follows_config(
        (channels, channel) in (1u8..=64).prop_flat_map(|n| (Just(n), any::<u8>())),
    ) {
        let (mut session, device) = open_session(ServoConfig::default().with_channels(channels))?;
        let result = session.set_speed(channel, SPEED_MIN);
        prop_assert_eq!(result.is_ok(), channel < channels);
        prop_assert_eq!(device.write_history().len(), usize::from(channel < channels));
    }
}
