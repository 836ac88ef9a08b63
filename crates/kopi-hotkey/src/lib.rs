pub mod gesture;

#[cfg(not(target_os = "macos"))]
mod listener;
#[cfg(target_os = "macos")]
mod macos;

pub use gesture::{CTRL_C_CONTROL_CHAR, DOUBLE_PRESS_WINDOW, GestureDetector, MACOS_KEY_C};

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use anyhow::Result;
use kopi_types::{Key, KeyEvent};

/// OS-level key hook. Implementations deliver raw key events to the sink
/// from their own execution context until torn down.
pub trait KeyEventSource: Send {
    fn install(&mut self, sink: Box<dyn FnMut(KeyEvent) + Send>) -> Result<()>;
    fn teardown(&mut self);
}

/// Keeps the hook installed; dropping the handle tears it down.
pub struct HookHandle {
    source: Box<dyn KeyEventSource>,
}

impl Drop for HookHandle {
    fn drop(&mut self) {
        self.source.teardown();
    }
}

#[cfg(target_os = "macos")]
fn platform_source() -> Box<dyn KeyEventSource> {
    Box::new(macos::EventTap::new())
}

#[cfg(target_os = "macos")]
fn platform_triggers() -> Vec<Key> {
    vec![Key::Code(MACOS_KEY_C)]
}

#[cfg(not(target_os = "macos"))]
fn platform_source() -> Box<dyn KeyEventSource> {
    Box::new(listener::HotkeyListener::new())
}

#[cfg(not(target_os = "macos"))]
fn platform_triggers() -> Vec<Key> {
    vec![Key::Char('c'), Key::Char(CTRL_C_CONTROL_CHAR)]
}

/// Installs the platform hook and runs a double-press detector over its
/// event stream. `on_double_copy` fires once per detected gesture, on the
/// hook's execution context.
///
/// Install failure (missing permission, no display server) is returned to
/// the caller so the rest of the app can keep running without the gesture.
pub fn spawn_hook<F>(window: Duration, on_double_copy: F) -> Result<HookHandle>
where
    F: FnMut() + Send + 'static,
{
    let mut detector = GestureDetector::new(window, &platform_triggers(), on_double_copy);
    let mut source = platform_source();
    source.install(Box::new(move |event| {
        // A bad key event must never take the hook down with it.
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| detector.on_key_event(event)));
        if outcome.is_err() {
            tracing::error!("gesture detector panicked on a key event, continuing");
        }
    }))?;
    Ok(HookHandle { source })
}
