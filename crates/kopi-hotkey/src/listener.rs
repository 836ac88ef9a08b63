use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use kopi_types::{Key, KeyEvent};

use crate::KeyEventSource;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Registers Ctrl+C as a global hotkey and replays its press/release
/// transitions into the sink as synthetic modifier + `c` events, leaving
/// all double-press timing to the detector.
///
/// The manager is not `Send`, so it lives on the listener thread; install
/// errors are reported back synchronously through a one-shot channel.
pub(crate) struct HotkeyListener {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl HotkeyListener {
    pub(crate) fn new() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }
}

impl KeyEventSource for HotkeyListener {
    fn install(&mut self, mut sink: Box<dyn FnMut(KeyEvent) + Send>) -> Result<()> {
        let stop = self.stop.clone();
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("kopi-hotkey".into())
            .spawn(move || {
                let manager = match GlobalHotKeyManager::new() {
                    Ok(manager) => manager,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow!("hotkey manager init failed: {err}")));
                        return;
                    }
                };
                let hotkey = HotKey::new(Some(Modifiers::CONTROL), Code::KeyC);
                if let Err(err) = manager.register(hotkey) {
                    let _ = ready_tx.send(Err(anyhow!("failed to register Ctrl+C: {err}")));
                    return;
                }
                let _ = ready_tx.send(Ok(()));

                let receiver = GlobalHotKeyEvent::receiver();
                while !stop.load(Ordering::Relaxed) {
                    while let Ok(event) = receiver.try_recv() {
                        if event.id != hotkey.id() {
                            continue;
                        }
                        let now = Instant::now();
                        match event.state {
                            HotKeyState::Pressed => {
                                sink(KeyEvent::press(Key::ModifierLeft, now));
                                sink(KeyEvent::press(Key::Char('c'), now));
                            }
                            HotKeyState::Released => {
                                sink(KeyEvent::release(Key::Char('c'), now));
                                sink(KeyEvent::release(Key::ModifierLeft, now));
                            }
                        }
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                let _ = manager.unregister(hotkey);
            })
            .context("failed to spawn hotkey listener thread")?;

        self.thread = Some(handle);
        ready_rx
            .recv()
            .map_err(|_| anyhow!("hotkey listener thread exited during install"))?
    }

    fn teardown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
