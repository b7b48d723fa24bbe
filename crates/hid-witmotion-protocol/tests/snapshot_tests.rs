//! Snapshot tests for the WitMotion HID protocol.
//!
//! These tests lock in the wire format to catch accidental protocol regressions.

use hid_witmotion_protocol::{
    self as witmotion, ProtocolVersion, REPORT_LEN, ServoCommandEncoder, ServoFrame,
    payload_offset,
};
use insta::assert_snapshot;

/// Hex dump of the header and payload, followed by the padding length.
fn describe(frame: &ServoFrame, version: ProtocolVersion) -> String {
    let used = payload_offset(version) + 3;
    let (head, padding) = frame.split_at(used);
    let hex = head
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ");
    if padding.iter().all(|b| *b == 0) {
        format!("{hex} | {} zero bytes", padding.len())
    } else {
        format!("{hex} | non-zero padding")
    }
}

// -- IDs ----------------------------------------------------------------------

#[test]
fn snapshot_vendor_id() {
    assert_snapshot!(format!("{:#06X}", witmotion::WITMOTION_VENDOR_ID), @"0x1920");
}

#[test]
fn snapshot_product_id() {
    assert_snapshot!(format!("{:#06X}", witmotion::WITMOTION_PRODUCT_ID), @"0x0100");
}

// -- Set position -------------------------------------------------------------

#[test]
fn snapshot_set_position_revised() -> Result<(), String> {
    let frame = ServoCommandEncoder::default()
        .set_position(15, 1500, false)
        .map_err(|e| e.to_string())?;
    assert_eq!(frame.len(), REPORT_LEN);
    assert_snapshot!(describe(&frame, ProtocolVersion::Revised), @"05 03 ff 02 0f dc 05 | 57 zero bytes");
    Ok(())
}

#[test]
fn snapshot_set_position_original() -> Result<(), String> {
    let frame = ServoCommandEncoder::original()
        .set_position(15, 1500, false)
        .map_err(|e| e.to_string())?;
    assert_snapshot!(describe(&frame, ProtocolVersion::Original), @"01 05 03 ff 02 0f dc 05 | 56 zero bytes");
    Ok(())
}

#[test]
fn snapshot_set_position_extended_max() -> Result<(), String> {
    let frame = ServoCommandEncoder::default()
        .set_position(0, u16::MAX, true)
        .map_err(|e| e.to_string())?;
    assert_snapshot!(describe(&frame, ProtocolVersion::Revised), @"05 03 ff 02 00 ff ff | 57 zero bytes");
    Ok(())
}

// -- Set speed ----------------------------------------------------------------

#[test]
fn snapshot_set_speed_revised() -> Result<(), String> {
    let frame = ServoCommandEncoder::default()
        .set_speed(2, 15)
        .map_err(|e| e.to_string())?;
    assert_snapshot!(describe(&frame, ProtocolVersion::Revised), @"05 03 ff 01 02 0f 00 | 57 zero bytes");
    Ok(())
}

#[test]
fn snapshot_set_speed_original() -> Result<(), String> {
    let frame = ServoCommandEncoder::original()
        .set_speed(2, 15)
        .map_err(|e| e.to_string())?;
    assert_snapshot!(describe(&frame, ProtocolVersion::Original), @"01 05 03 ff 02 02 0f 00 | 56 zero bytes");
    Ok(())
}

// -- Action group / emergency -------------------------------------------------

#[test]
fn snapshot_action_group_max() -> Result<(), String> {
    let frame = ServoCommandEncoder::default()
        .execute_action_group(16)
        .map_err(|e| e.to_string())?;
    assert_snapshot!(describe(&frame, ProtocolVersion::Revised), @"05 03 ff 09 00 10 00 | 57 zero bytes");
    Ok(())
}

#[test]
fn snapshot_emergency_stop() {
    let frame = ServoCommandEncoder::default().emergency_stop();
    assert_snapshot!(describe(&frame, ProtocolVersion::Revised), @"05 03 ff 0b 00 01 00 | 57 zero bytes");
}

#[test]
fn snapshot_emergency_recovery() {
    let frame = ServoCommandEncoder::default().emergency_recovery();
    assert_snapshot!(describe(&frame, ProtocolVersion::Revised), @"05 03 ff 0b 00 00 00 | 57 zero bytes");
}

// -- Heartbeat ----------------------------------------------------------------

#[test]
fn snapshot_heartbeat_revised() {
    let frame = ServoCommandEncoder::default().heartbeat();
    assert_snapshot!(describe(&frame, ProtocolVersion::Revised), @"05 03 ff 00 12 00 00 | 57 zero bytes");
}

#[test]
fn snapshot_heartbeat_original() {
    let frame = ServoCommandEncoder::original().heartbeat();
    assert_snapshot!(describe(&frame, ProtocolVersion::Original), @"01 05 03 ff 00 12 00 00 | 56 zero bytes");
}

// -- Errors -------------------------------------------------------------------

#[test]
fn snapshot_channel_error_message() {
    let err = ServoCommandEncoder::default().set_position(16, 1500, false);
    let message = match err {
        Ok(_) => "accepted".to_string(),
        Err(e) => e.to_string(),
    };
    assert_snapshot!(message, @"channel 16 out of range: board has 16 channels");
}
