//! `hidapi`-backed transport for real hardware.

use std::sync::Mutex;

use hidapi::{DeviceInfo, HidApi, HidDevice};
use tracing::{debug, trace};

use crate::{HidCommonError, HidCommonResult, HidDeviceInfo, HidHandle, HidTransport};

/// Host HID stack reached through `hidapi`.
///
/// `hidapi` caches its device list; every [`enumerate`](HidTransport::enumerate)
/// refreshes it first so hot-plugged boards show up.
pub struct HidApiTransport {
    api: Mutex<HidApi>,
}

impl HidApiTransport {
    pub fn new() -> HidCommonResult<Self> {
        let api = HidApi::new().map_err(|e| HidCommonError::Backend(e.to_string()))?;
        Ok(Self {
            api: Mutex::new(api),
        })
    }
}

impl std::fmt::Debug for HidApiTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HidApiTransport").finish_non_exhaustive()
    }
}

fn to_device_info(device: &DeviceInfo) -> HidDeviceInfo {
    HidDeviceInfo {
        vendor_id: device.vendor_id(),
        product_id: device.product_id(),
        serial_number: device.serial_number().map(str::to_string),
        manufacturer: device.manufacturer_string().map(str::to_string),
        product_name: device.product_string().map(str::to_string),
        path: device.path().to_string_lossy().to_string(),
    }
}

fn open_error(
    message: String,
    vendor_id: u16,
    product_id: u16,
    serial: Option<&str>,
) -> HidCommonError {
    let target = match serial {
        Some(serial) => format!("{vendor_id:04x}:{product_id:04x} serial={serial}"),
        None => format!("{vendor_id:04x}:{product_id:04x}"),
    };
    let lower = message.to_ascii_lowercase();
    if lower.contains("permission denied") || lower.contains("access denied") {
        HidCommonError::PermissionDenied(format!("{target}: {message}"))
    } else {
        HidCommonError::OpenError(format!("{target}: {message}"))
    }
}

impl HidTransport for HidApiTransport {
    type Handle = HidApiHandle;

    fn enumerate(&self, vendor_id: u16, product_id: u16) -> HidCommonResult<Vec<HidDeviceInfo>> {
        let mut api = self.api.lock().unwrap_or_else(|e| e.into_inner());
        api.refresh_devices()
            .map_err(|e| HidCommonError::Backend(e.to_string()))?;
        let devices: Vec<HidDeviceInfo> = api
            .device_list()
            .filter(|d| d.vendor_id() == vendor_id && d.product_id() == product_id)
            .map(to_device_info)
            .collect();
        trace!(
            "hidapi enumerate {:04x}:{:04x} -> {} device(s)",
            vendor_id,
            product_id,
            devices.len()
        );
        Ok(devices)
    }

    fn open(
        &self,
        vendor_id: u16,
        product_id: u16,
        serial: Option<&str>,
    ) -> HidCommonResult<HidApiHandle> {
        let api = self.api.lock().unwrap_or_else(|e| e.into_inner());
        let device = match serial {
            Some(serial) => api.open_serial(vendor_id, product_id, serial),
            None => api.open(vendor_id, product_id),
        }
        .map_err(|e| open_error(e.to_string(), vendor_id, product_id, serial))?;
        debug!("hidapi opened {:04x}:{:04x}", vendor_id, product_id);
        Ok(HidApiHandle {
            device: Some(device),
        })
    }
}

/// An open `hidapi` device. Closing drops the underlying handle.
pub struct HidApiHandle {
    device: Option<HidDevice>,
}

impl HidApiHandle {
    fn device(&self) -> HidCommonResult<&HidDevice> {
        self.device.as_ref().ok_or(HidCommonError::Disconnected)
    }
}

impl HidHandle for HidApiHandle {
    fn set_nonblocking(&mut self, nonblocking: bool) -> HidCommonResult<()> {
        self.device()?
            .set_blocking_mode(!nonblocking)
            .map_err(|e| HidCommonError::Backend(e.to_string()))
    }

    fn write(&mut self, data: &[u8]) -> HidCommonResult<usize> {
        self.device()?
            .write(data)
            .map_err(|e| HidCommonError::WriteError(e.to_string()))
    }

    fn read(&mut self, buf: &mut [u8]) -> HidCommonResult<usize> {
        self.device()?
            .read(buf)
            .map_err(|e| HidCommonError::ReadError(e.to_string()))
    }

    fn close(&mut self) -> HidCommonResult<()> {
        if self.device.take().is_some() {
            debug!("hidapi device closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_error_classification() {
        let err = open_error("Permission denied (os error 13)".to_string(), 0x1920, 0x0100, None);
        assert!(matches!(err, HidCommonError::PermissionDenied(_)));

        let err = open_error("Failed to open a device".to_string(), 0x1920, 0x0100, Some("ABC"));
        assert!(matches!(
            err,
            HidCommonError::OpenError(ref message)
                if message == "1920:0100 serial=ABC: Failed to open a device"
        ));
    }

    #[test]
    fn test_closed_handle_reports_disconnected() {
        let mut handle = HidApiHandle { device: None };
        let mut buf = [0u8; 64];
        assert!(matches!(handle.read(&mut buf), Err(HidCommonError::Disconnected)));
        assert!(handle.close().is_ok());
    }
}
