//! HID transport traits

use crate::{HidCommonResult, HidDeviceInfo};

/// An open HID device.
///
/// Reads are expected to be non-blocking once [`set_nonblocking`] has been
/// called: `Ok(0)` means "no report yet", not end of stream.
///
/// [`set_nonblocking`]: HidHandle::set_nonblocking
pub trait HidHandle: Send {
    fn set_nonblocking(&mut self, nonblocking: bool) -> HidCommonResult<()>;

    /// Write one output report. The first byte is the report id.
    fn write(&mut self, data: &[u8]) -> HidCommonResult<usize>;

    /// Read one input report into `buf`, returning the number of bytes read.
    fn read(&mut self, buf: &mut [u8]) -> HidCommonResult<usize>;

    fn close(&mut self) -> HidCommonResult<()>;
}

/// The host HID stack: enumeration and opening of devices.
pub trait HidTransport {
    type Handle: HidHandle;

    /// List devices matching the VID/PID pair. No matches is an empty list.
    fn enumerate(&self, vendor_id: u16, product_id: u16) -> HidCommonResult<Vec<HidDeviceInfo>>;

    /// Open the first device matching the VID/PID pair, narrowed to `serial`
    /// when one is given.
    fn open(
        &self,
        vendor_id: u16,
        product_id: u16,
        serial: Option<&str>,
    ) -> HidCommonResult<Self::Handle>;
}

impl<T: HidTransport + ?Sized> HidTransport for &T {
    type Handle = T::Handle;

    fn enumerate(&self, vendor_id: u16, product_id: u16) -> HidCommonResult<Vec<HidDeviceInfo>> {
        (**self).enumerate(vendor_id, product_id)
    }

    fn open(
        &self,
        vendor_id: u16,
        product_id: u16,
        serial: Option<&str>,
    ) -> HidCommonResult<Self::Handle> {
        (**self).open(vendor_id, product_id, serial)
    }
}

pub mod mock {
    use super::*;
    use crate::HidCommonError;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex, MutexGuard};

    #[derive(Debug)]
    struct MockState {
        read_queue: VecDeque<Vec<u8>>,
        write_history: Vec<Vec<u8>>,
        connected: bool,
        open: bool,
        nonblocking: bool,
        fail_writes: bool,
        fail_nonblocking: bool,
        write_ack: Option<usize>,
        read_calls: usize,
        close_calls: usize,
    }

    impl Default for MockState {
        fn default() -> Self {
            Self {
                read_queue: VecDeque::new(),
                write_history: Vec::new(),
                connected: true,
                open: false,
                nonblocking: false,
                fail_writes: false,
                fail_nonblocking: false,
                write_ack: None,
                read_calls: 0,
                close_calls: 0,
            }
        }
    }

    /// A scripted device. Clones share state, so a test can keep one clone
    /// to inspect what the driver wrote through another.
    #[derive(Debug, Clone)]
    pub struct MockHidDevice {
        info: HidDeviceInfo,
        state: Arc<Mutex<MockState>>,
    }

    impl MockHidDevice {
        pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
            Self {
                info: HidDeviceInfo::new(vendor_id, product_id, path),
                state: Arc::new(Mutex::new(MockState::default())),
            }
        }

        pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
            self.info = self.info.with_serial(serial);
            self
        }

        fn state(&self) -> MutexGuard<'_, MockState> {
            self.state.lock().unwrap_or_else(|e| e.into_inner())
        }

        pub fn info(&self) -> &HidDeviceInfo {
            &self.info
        }

        /// Queue a report for a later read. An empty report makes that read
        /// return `Ok(0)`.
        pub fn queue_read(&self, data: Vec<u8>) {
            self.state().read_queue.push_back(data);
        }

        /// Make the next `polls` reads return no data.
        pub fn queue_empty_reads(&self, polls: usize) {
            let mut state = self.state();
            for _ in 0..polls {
                state.read_queue.push_back(Vec::new());
            }
        }

        pub fn write_history(&self) -> Vec<Vec<u8>> {
            self.state().write_history.clone()
        }

        pub fn read_calls(&self) -> usize {
            self.state().read_calls
        }

        pub fn close_calls(&self) -> usize {
            self.state().close_calls
        }

        pub fn is_open(&self) -> bool {
            self.state().open
        }

        pub fn is_nonblocking(&self) -> bool {
            self.state().nonblocking
        }

        /// Make every subsequent write fail.
        pub fn fail_writes(&self, fail: bool) {
            self.state().fail_writes = fail;
        }

        /// Make switching the read mode fail.
        pub fn fail_nonblocking(&self, fail: bool) {
            self.state().fail_nonblocking = fail;
        }

        /// Byte count reported by writes instead of the report length. The
        /// report is still recorded in full.
        pub fn ack_writes_with(&self, written: Option<usize>) {
            self.state().write_ack = written;
        }

        pub fn disconnect(&self) {
            self.state().connected = false;
        }

        pub fn reconnect(&self) {
            self.state().connected = true;
        }
    }

    /// Handle returned by [`MockHidTransport::open`].
    #[derive(Debug)]
    pub struct MockHidHandle {
        device: MockHidDevice,
    }

    impl MockHidHandle {
        pub fn device(&self) -> &MockHidDevice {
            &self.device
        }
    }

    impl HidHandle for MockHidHandle {
        fn set_nonblocking(&mut self, nonblocking: bool) -> HidCommonResult<()> {
            let mut state = self.device.state();
            if state.fail_nonblocking {
                return Err(HidCommonError::Backend("injected read mode failure".to_string()));
            }
            state.nonblocking = nonblocking;
            Ok(())
        }

        fn write(&mut self, data: &[u8]) -> HidCommonResult<usize> {
            let mut state = self.device.state();
            if !state.connected || !state.open {
                return Err(HidCommonError::Disconnected);
            }
            if state.fail_writes {
                return Err(HidCommonError::WriteError("injected write failure".to_string()));
            }
            state.write_history.push(data.to_vec());
            Ok(state.write_ack.unwrap_or(data.len()))
        }

        fn read(&mut self, buf: &mut [u8]) -> HidCommonResult<usize> {
            let mut state = self.device.state();
            if !state.connected || !state.open {
                return Err(HidCommonError::Disconnected);
            }
            state.read_calls += 1;
            let Some(report) = state.read_queue.pop_front() else {
                return Ok(0);
            };
            let mut copied = 0;
            for (slot, byte) in buf.iter_mut().zip(report.iter()) {
                *slot = *byte;
                copied += 1;
            }
            Ok(copied)
        }

        fn close(&mut self) -> HidCommonResult<()> {
            let mut state = self.device.state();
            state.open = false;
            state.close_calls += 1;
            Ok(())
        }
    }

    /// In-memory host HID stack.
    #[derive(Debug, Default)]
    pub struct MockHidTransport {
        devices: Vec<MockHidDevice>,
        deny_access: bool,
    }

    impl MockHidTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_device(mut self, device: MockHidDevice) -> Self {
            self.add_device(device);
            self
        }

        pub fn add_device(&mut self, device: MockHidDevice) {
            self.devices.push(device);
        }

        pub fn device_count(&self) -> usize {
            self.devices.len()
        }

        /// Make every open fail as if the OS refused access.
        pub fn deny_access(mut self) -> Self {
            self.deny_access = true;
            self
        }
    }

    impl HidTransport for MockHidTransport {
        type Handle = MockHidHandle;

        fn enumerate(
            &self,
            vendor_id: u16,
            product_id: u16,
        ) -> HidCommonResult<Vec<HidDeviceInfo>> {
            Ok(self
                .devices
                .iter()
                .filter(|d| d.info.matches(vendor_id, product_id))
                .map(|d| d.info.clone())
                .collect())
        }

        fn open(
            &self,
            vendor_id: u16,
            product_id: u16,
            serial: Option<&str>,
        ) -> HidCommonResult<MockHidHandle> {
            let device = self
                .devices
                .iter()
                .find(|d| d.info.matches(vendor_id, product_id) && d.info.matches_serial(serial))
                .ok_or_else(|| {
                    HidCommonError::DeviceNotFound(format!(
                        "{vendor_id:04x}:{product_id:04x} serial={serial:?}"
                    ))
                })?;
            if self.deny_access {
                return Err(HidCommonError::PermissionDenied(device.info.path.clone()));
            }
            device.state().open = true;
            Ok(MockHidHandle {
                device: device.clone(),
            })
        }
    }
}
