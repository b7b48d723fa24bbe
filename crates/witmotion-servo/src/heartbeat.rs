//! Heartbeat transaction: write the status query, then poll for a response
//! until a deadline.

use std::time::{Duration, Instant};

use hid_witmotion_protocol::REPORT_LEN;
use tracing::{debug, trace};
use witmotion_hid_common::{HidHandle, HidTransport};

use crate::{ServoBoard, ServoError, ServoResult};

/// Raw bytes of a heartbeat response. The board's status layout is not
/// decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    bytes: Vec<u8>,
}

impl StatusReport {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// First byte of the response, which HID stacks report as the report id.
    pub fn report_id(&self) -> Option<u8> {
        self.bytes.first().copied()
    }
}

impl AsRef<[u8]> for StatusReport {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl<T: HidTransport> ServoBoard<T> {
    /// Query board status with the configured timeout (100 ms by default).
    pub fn heartbeat(&mut self) -> ServoResult<StatusReport> {
        let timeout = self.config().heartbeat_timeout;
        self.heartbeat_with_timeout(timeout)
    }

    /// Query board status, waiting at most `timeout` for a response.
    ///
    /// The first non-empty read is returned as soon as it arrives. Between
    /// empty reads the session sleeps for the configured poll interval.
    pub fn heartbeat_with_timeout(&mut self, timeout: Duration) -> ServoResult<StatusReport> {
        let query = self.encoder().heartbeat();
        self.write_frame(&query)?;

        let poll_interval = self.config().poll_interval;
        // A timeout too large to represent never expires.
        let deadline = Instant::now().checked_add(timeout);
        let mut buf = [0u8; REPORT_LEN];
        let mut polls: u32 = 0;

        while deadline.is_none_or(|deadline| Instant::now() < deadline) {
            let read = self
                .handle_mut()?
                .read(&mut buf)
                .map_err(ServoError::Transport)?;
            polls = polls.saturating_add(1);
            if read > 0 {
                debug!(polls, bytes = read, "heartbeat response");
                let mut bytes = buf.to_vec();
                bytes.truncate(read);
                return Ok(StatusReport::new(bytes));
            }
            trace!(polls, "heartbeat poll empty");
            std::thread::sleep(poll_interval);
        }

        debug!(polls, "heartbeat timed out after {}ms", timeout.as_millis());
        Err(ServoError::Timeout { timeout })
    }
}
