use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag, polled by long validation loops between
/// units of work.
#[derive(Clone)]
pub struct StopSignal {
	stopped: Arc<AtomicBool>,
}

impl Default for StopSignal {
	fn default() -> Self {
		StopSignal::new()
	}
}

impl StopSignal {
	pub fn new() -> Self {
		StopSignal {
			stopped: Arc::new(AtomicBool::new(false)),
		}
	}

	/// Request a stop. In-flight validations return `Error::ServiceStopped`
	/// at the next poll.
	pub fn stop(&self) {
		self.stopped.store(true, Ordering::SeqCst);
	}

	pub fn is_stopped(&self) -> bool {
		self.stopped.load(Ordering::SeqCst)
	}

	/// `Err(Error::ServiceStopped)` once a stop was requested.
	pub fn check(&self) -> Result<(), ::error::Error> {
		if self.is_stopped() {
			Err(::error::Error::ServiceStopped)
		} else {
			Ok(())
		}
	}
}
