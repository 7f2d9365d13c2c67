use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use viewkit_core::{ViewError, ViewResult};

/// Cooperative shutdown request, settable from the Ctrl+C handler.
#[derive(Clone, Default)]
pub struct ShutdownFlag {
    flag: Arc<AtomicBool>,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Only one handler can exist per process.
    pub fn install_ctrlc(&self) -> ViewResult<()> {
        let flag = self.flag.clone();
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::Relaxed);
        })
        .map_err(|e| ViewError::Platform(format!("ctrlc: {e}")))
    }
}
