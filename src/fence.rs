use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::error::{Error, Result};

/// One-shot handle that signals once every device command enqueued before it
/// has finished. Created fresh each frame by `Device::install_fence`;
/// `wait` consumes it, so a signaled fence cannot be reused.
#[derive(Debug)]
pub struct Fence {
    signal: Receiver<()>,
}

impl Fence {
    pub(crate) fn new(signal: Receiver<()>) -> Self {
        Fence { signal }
    }

    /// Blocks until the fence signals. A wait that outlives `timeout` means
    /// the device is assumed hung; the error is fatal and the simulation
    /// must be torn down rather than retried.
    pub fn wait(self, timeout: Duration) -> Result<()> {
        match self.signal.recv_timeout(timeout) {
            Ok(()) => Ok(()),
            Err(RecvTimeoutError::Timeout) => Err(Error::FenceTimeout { waited: timeout }),
            Err(RecvTimeoutError::Disconnected) => Err(Error::DeviceLost),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn signaled_fence_returns_immediately() {
        let (tx, rx) = bounded(1);
        tx.send(()).unwrap();
        Fence::new(rx).wait(Duration::from_millis(1)).unwrap();
    }

    #[test]
    fn unsignaled_fence_times_out() {
        let (_tx, rx) = bounded::<()>(1);
        let result = Fence::new(rx).wait(Duration::from_millis(5));
        assert!(matches!(result, Err(Error::FenceTimeout { .. })));
    }

    #[test]
    fn dropped_signaler_reports_lost_device() {
        let (tx, rx) = bounded::<()>(1);
        drop(tx);
        let result = Fence::new(rx).wait(Duration::from_millis(5));
        assert!(matches!(result, Err(Error::DeviceLost)));
    }
}
