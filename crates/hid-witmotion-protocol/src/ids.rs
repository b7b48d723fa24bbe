//! USB identifiers for WitMotion servo controller boards.
//!
//! Every board ships with the same VID/PID pair; multiple boards on one host
//! are told apart by their USB serial number string.

/// WitMotion servo controller USB Vendor ID.
pub const WITMOTION_VENDOR_ID: u16 = 0x1920;

/// WitMotion servo controller USB Product ID.
pub const WITMOTION_PRODUCT_ID: u16 = 0x0100;

/// Channel count of the stock 16-channel board.
pub const DEFAULT_CHANNEL_COUNT: u8 = 16;

/// Returns `true` if the VID/PID pair belongs to a WitMotion servo board.
///
/// # Examples
/// ```
/// use hid_witmotion_protocol::ids::is_witmotion_device;
/// assert!(is_witmotion_device(0x1920, 0x0100));
/// assert!(!is_witmotion_device(0x1920, 0x0101));
/// ```
pub fn is_witmotion_device(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == WITMOTION_VENDOR_ID && product_id == WITMOTION_PRODUCT_ID
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_pair_recognised() {
        assert!(is_witmotion_device(WITMOTION_VENDOR_ID, WITMOTION_PRODUCT_ID));
    }

    #[test]
    fn foreign_pairs_not_recognised() {
        assert!(!is_witmotion_device(0x0000, WITMOTION_PRODUCT_ID));
        assert!(!is_witmotion_device(WITMOTION_VENDOR_ID, 0xFFFF));
        assert!(!is_witmotion_device(WITMOTION_PRODUCT_ID, WITMOTION_VENDOR_ID));
    }
}
