//! Board discovery.
//!
//! Enumeration never opens a device, so it is safe to call while another
//! session holds a board.

use hid_witmotion_protocol::{WITMOTION_PRODUCT_ID, WITMOTION_VENDOR_ID};
use tracing::debug;
use witmotion_hid_common::{HidDeviceInfo, HidTransport};

use crate::{ServoError, ServoResult};

/// Full enumeration records for every board matching the VID/PID pair.
pub fn list_device_info<T: HidTransport>(
    transport: &T,
    vendor_id: u16,
    product_id: u16,
) -> ServoResult<Vec<HidDeviceInfo>> {
    let devices = transport
        .enumerate(vendor_id, product_id)
        .map_err(ServoError::Transport)?;
    debug!(
        "found {} board(s) at {:04x}:{:04x}",
        devices.len(),
        vendor_id,
        product_id
    );
    Ok(devices)
}

/// Serial numbers of all attached WitMotion boards, in enumeration order.
///
/// A board that reports no serial shows up as an empty string, so the
/// length of the list is always the number of boards found.
pub fn list_devices<T: HidTransport>(transport: &T) -> ServoResult<Vec<String>> {
    serials(transport, WITMOTION_VENDOR_ID, WITMOTION_PRODUCT_ID)
}

pub(crate) fn serials<T: HidTransport>(
    transport: &T,
    vendor_id: u16,
    product_id: u16,
) -> ServoResult<Vec<String>> {
    Ok(list_device_info(transport, vendor_id, product_id)?
        .iter()
        .map(HidDeviceInfo::serial_or_empty)
        .collect())
}

/// [`list_devices`] against the host HID stack.
#[cfg(feature = "hidapi")]
pub fn discover() -> ServoResult<Vec<String>> {
    let transport =
        witmotion_hid_common::HidApiTransport::new().map_err(ServoError::Transport)?;
    list_devices(&transport)
}
