//! Device information types for HID devices

use serde::{Deserialize, Serialize};

/// One enumerated HID device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HidDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product_name: Option<String>,
    pub path: String,
}

impl HidDeviceInfo {
    pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
        Self {
            vendor_id,
            product_id,
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }

    /// Whether this device is the one named by `serial`.
    ///
    /// `None` matches any device.
    pub fn matches_serial(&self, serial: Option<&str>) -> bool {
        match serial {
            Some(wanted) => self.serial_number.as_deref() == Some(wanted),
            None => true,
        }
    }

    /// Serial number, or an empty string when the device reports none.
    pub fn serial_or_empty(&self) -> String {
        self.serial_number.clone().unwrap_or_default()
    }

    pub fn display_name(&self) -> String {
        let name = self
            .product_name
            .clone()
            .or_else(|| self.manufacturer.clone())
            .unwrap_or_else(|| format!("{:04x}:{:04x}", self.vendor_id, self.product_id));
        match &self.serial_number {
            Some(serial) if !serial.is_empty() => format!("{name} ({serial})"),
            _ => name,
        }
    }
}
