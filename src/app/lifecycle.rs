use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};

use crate::display::PanelSink;
use crate::panel::screens::render_message;
use crate::{Error, Result};

const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Install a ctrl-c/SIGTERM handler that flips the shared running flag instead of exiting immediately.
pub(super) fn create_shutdown_flag() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let running_handle = running.clone();

    ctrlc::set_handler(move || {
        running_handle.store(false, Ordering::SeqCst);
    })
    .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;

    Ok(running)
}

/// Sleep for `total` in short slices, returning early once `running` clears.
/// Returns whether the loop should keep going.
pub fn sleep_while_running(total: Duration, running: &AtomicBool) -> bool {
    let deadline = Instant::now() + total;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
    false
}

/// Show the shutdown message before leaving the refresh loop.
pub fn render_shutdown<S: PanelSink + ?Sized>(sink: &mut S) -> Result<()> {
    sink.show(&render_message("offline"))
}
