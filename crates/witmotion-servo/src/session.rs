//! Device session: one board, one handle, `Closed → Open → Closed`.

use std::fmt;

use hid_witmotion_protocol::{ServoCommand, ServoCommandEncoder, ServoFrame};
use tracing::{debug, info, warn};
use witmotion_hid_common::{HidCommonError, HidHandle, HidTransport};

use crate::config::{DeviceIdentity, ServoConfig};
use crate::{ServoError, ServoResult, discovery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Open,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Closed => f.write_str("closed"),
            SessionState::Open => f.write_str("open"),
        }
    }
}

/// A connection to one servo board.
///
/// Every operation that touches the device takes `&mut self`, so a session
/// is driven by one caller at a time. Parameters are validated before the
/// open check, which means a bad value is reported as
/// [`ServoError::Validation`] even on a closed session.
pub struct ServoBoard<T: HidTransport> {
    transport: T,
    config: ServoConfig,
    identity: DeviceIdentity,
    encoder: ServoCommandEncoder,
    pub(crate) handle: Option<T::Handle>,
}

#[cfg(feature = "hidapi")]
impl ServoBoard<witmotion_hid_common::HidApiTransport> {
    /// Session over the host HID stack. The board is not opened yet.
    pub fn new(config: ServoConfig) -> ServoResult<Self> {
        let transport =
            witmotion_hid_common::HidApiTransport::new().map_err(ServoError::Connection)?;
        Self::with_transport(transport, config)
    }
}

impl<T: HidTransport> ServoBoard<T> {
    /// Session over an arbitrary transport. The board is not opened yet.
    pub fn with_transport(transport: T, config: ServoConfig) -> ServoResult<Self> {
        config.validate()?;
        let encoder = config.encoder()?;
        let identity = config.identity();
        Ok(Self {
            transport,
            config,
            identity,
            encoder,
            handle: None,
        })
    }

    pub fn config(&self) -> &ServoConfig {
        &self.config
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn encoder(&self) -> &ServoCommandEncoder {
        &self.encoder
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> SessionState {
        if self.handle.is_some() {
            SessionState::Open
        } else {
            SessionState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Open the board and switch it to non-blocking reads.
    ///
    /// Without a configured serial the first matching board is bound.
    /// Opening an open session does nothing. Returns the session so calls
    /// can be chained: `board.open()?.emergency_recovery()?`.
    pub fn open(&mut self) -> ServoResult<&mut Self> {
        if self.handle.is_some() {
            debug!("servo board already open");
            return Ok(self);
        }

        let serial = self.identity.serial.as_deref();
        let mut handle = self
            .transport
            .open(self.identity.vendor_id, self.identity.product_id, serial)
            .map_err(ServoError::Connection)?;
        if let Err(e) = handle.set_nonblocking(true) {
            if let Err(close_err) = handle.close() {
                warn!("failed to close servo board after open error: {}", close_err);
            }
            return Err(ServoError::Connection(e));
        }

        info!(
            serial = serial.unwrap_or("<first>"),
            protocol = %self.encoder.version(),
            channels = self.encoder.channel_count(),
            "servo board opened"
        );
        self.handle = Some(handle);
        Ok(self)
    }

    /// Release the handle. Closing a closed session does nothing.
    pub fn close(&mut self) -> ServoResult<()> {
        let Some(mut handle) = self.handle.take() else {
            return Ok(());
        };
        handle.close().map_err(ServoError::Transport)?;
        info!("servo board closed");
        Ok(())
    }

    /// Serial numbers of boards matching this session's VID/PID pair.
    pub fn list_devices(&self) -> ServoResult<Vec<String>> {
        discovery::serials(
            &self.transport,
            self.identity.vendor_id,
            self.identity.product_id,
        )
    }

    /// Move `channel` to `value`.
    ///
    /// `value` is a pulse width in µs (500–2500) unless `extended` is set,
    /// in which case the full 16-bit range is accepted.
    pub fn set_position(&mut self, channel: u8, value: u16, extended: bool) -> ServoResult<()> {
        let frame = self.encoder.set_position(channel, value, extended)?;
        debug!(channel, value, extended, "set position");
        self.write_frame(&frame)
    }

    /// Set the travel speed of `channel` in 9°/s steps (1–20).
    pub fn set_speed(&mut self, channel: u8, value: u8) -> ServoResult<()> {
        let frame = self.encoder.set_speed(channel, value)?;
        debug!(channel, value, "set speed");
        self.write_frame(&frame)
    }

    /// Run action group `group` (1–16) stored on the board.
    pub fn execute_action_group(&mut self, group: u8) -> ServoResult<()> {
        let frame = self.encoder.execute_action_group(group)?;
        debug!(group, "execute action group");
        self.write_frame(&frame)
    }

    pub fn emergency_stop(&mut self) -> ServoResult<()> {
        let frame = self.encoder.emergency_stop();
        warn!("emergency stop");
        self.write_frame(&frame)
    }

    pub fn emergency_recovery(&mut self) -> ServoResult<()> {
        let frame = self.encoder.emergency_recovery();
        debug!("emergency recovery");
        self.write_frame(&frame)
    }

    /// Encode and send a declaratively described command.
    ///
    /// A [`ServoCommand::Heartbeat`] only writes the query; use
    /// [`heartbeat`](Self::heartbeat) to wait for the response.
    pub fn send(&mut self, command: &ServoCommand) -> ServoResult<()> {
        let frame = self.encoder.encode(command)?;
        debug!(command = command.name(), "send");
        self.write_frame(&frame)
    }

    pub(crate) fn handle_mut(&mut self) -> ServoResult<&mut T::Handle> {
        self.handle.as_mut().ok_or(ServoError::NotOpen)
    }

    /// Write one frame. Some HID stacks count padding or the report id in
    /// the returned length, so only a count below the frame length fails.
    pub(crate) fn write_frame(&mut self, frame: &ServoFrame) -> ServoResult<()> {
        let handle = self.handle_mut()?;
        let written = handle.write(frame).map_err(ServoError::Transport)?;
        if written < frame.len() {
            return Err(ServoError::Transport(HidCommonError::ShortWrite {
                expected: frame.len(),
                actual: written,
            }));
        }
        Ok(())
    }
}

impl<T: HidTransport> Drop for ServoBoard<T> {
    fn drop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            if let Err(e) = handle.close() {
                warn!("failed to close servo board on drop: {}", e);
            }
        }
    }
}

impl<T: HidTransport> fmt::Debug for ServoBoard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServoBoard")
            .field("identity", &self.identity)
            .field("protocol", &self.encoder.version())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
