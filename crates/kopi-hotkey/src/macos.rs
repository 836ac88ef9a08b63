//! Quartz event tap. Listen-only, session level, running on its own
//! thread with a private run loop so the hook never touches the main
//! thread.

use std::ffi::c_void;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use kopi_types::{Key, KeyEvent};

use crate::KeyEventSource;

type CFMachPortRef = *mut c_void;
type CFRunLoopSourceRef = *mut c_void;
type CFRunLoopRef = *mut c_void;
type CFStringRef = *const c_void;
type CGEventRef = *mut c_void;
type CGEventTapProxy = *mut c_void;
type CGEventType = u32;
type CGEventMask = u64;
type CGEventFlags = u64;

const KCG_EVENT_KEY_DOWN: CGEventType = 10;
const KCG_EVENT_KEY_UP: CGEventType = 11;
const KCG_EVENT_FLAGS_CHANGED: CGEventType = 12;
const KCG_EVENT_TAP_DISABLED_BY_TIMEOUT: CGEventType = 0xFFFF_FFFE;
const KCG_EVENT_FLAG_MASK_COMMAND: CGEventFlags = 1 << 20;
const KCG_KEYBOARD_EVENT_KEYCODE: u32 = 9;
const KCG_SESSION_EVENT_TAP: u32 = 1;
const KCG_HEAD_INSERT_EVENT_TAP: u32 = 0;
const KCG_EVENT_TAP_OPTION_LISTEN_ONLY: u32 = 1;

type TapCallback = unsafe extern "C" fn(
    proxy: CGEventTapProxy,
    event_type: CGEventType,
    event: CGEventRef,
    user_info: *mut c_void,
) -> CGEventRef;

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn CGEventTapCreate(
        tap: u32,
        place: u32,
        options: u32,
        events_of_interest: CGEventMask,
        callback: TapCallback,
        user_info: *mut c_void,
    ) -> CFMachPortRef;
    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
    fn CGEventGetFlags(event: CGEventRef) -> CGEventFlags;
    fn CGEventGetIntegerValueField(event: CGEventRef, field: u32) -> i64;
}

#[link(name = "CoreFoundation", kind = "framework")]
unsafe extern "C" {
    static kCFRunLoopDefaultMode: CFStringRef;
    fn CFMachPortCreateRunLoopSource(
        allocator: *const c_void,
        port: CFMachPortRef,
        order: i64,
    ) -> CFRunLoopSourceRef;
    fn CFRunLoopGetCurrent() -> CFRunLoopRef;
    fn CFRunLoopAddSource(rl: CFRunLoopRef, source: CFRunLoopSourceRef, mode: CFStringRef);
    fn CFRunLoopRunInMode(mode: CFStringRef, seconds: f64, return_after_source_handled: bool)
    -> i32;
    fn CFRelease(cf: *const c_void);
}

struct TapState {
    sink: Box<dyn FnMut(KeyEvent) + Send>,
    command_down: bool,
    tap: CFMachPortRef,
}

unsafe extern "C" fn tap_callback(
    _proxy: CGEventTapProxy,
    event_type: CGEventType,
    event: CGEventRef,
    user_info: *mut c_void,
) -> CGEventRef {
    let state = unsafe { &mut *(user_info as *mut TapState) };
    let now = Instant::now();
    match event_type {
        KCG_EVENT_FLAGS_CHANGED => {
            let down = unsafe { CGEventGetFlags(event) } & KCG_EVENT_FLAG_MASK_COMMAND != 0;
            if down != state.command_down {
                state.command_down = down;
                let synthesized = if down {
                    KeyEvent::press(Key::ModifierLeft, now)
                } else {
                    KeyEvent::release(Key::ModifierLeft, now)
                };
                (state.sink)(synthesized);
            }
        }
        KCG_EVENT_KEY_DOWN | KCG_EVENT_KEY_UP => {
            let code =
                unsafe { CGEventGetIntegerValueField(event, KCG_KEYBOARD_EVENT_KEYCODE) } as u16;
            let synthesized = if event_type == KCG_EVENT_KEY_DOWN {
                KeyEvent::press(Key::Code(code), now)
            } else {
                KeyEvent::release(Key::Code(code), now)
            };
            (state.sink)(synthesized);
        }
        KCG_EVENT_TAP_DISABLED_BY_TIMEOUT => {
            // The WindowServer turns off taps it judges too slow; re-arm.
            if !state.tap.is_null() {
                unsafe { CGEventTapEnable(state.tap, true) };
            }
        }
        _ => {}
    }
    event
}

pub(crate) struct EventTap {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl EventTap {
    pub(crate) fn new() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }
}

impl KeyEventSource for EventTap {
    fn install(&mut self, sink: Box<dyn FnMut(KeyEvent) + Send>) -> Result<()> {
        let stop = self.stop.clone();
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("kopi-hotkey".into())
            .spawn(move || {
                let mut state = Box::new(TapState {
                    sink,
                    command_down: false,
                    tap: std::ptr::null_mut(),
                });
                let mask: CGEventMask = (1 << KCG_EVENT_KEY_DOWN)
                    | (1 << KCG_EVENT_KEY_UP)
                    | (1 << KCG_EVENT_FLAGS_CHANGED);
                let tap = unsafe {
                    CGEventTapCreate(
                        KCG_SESSION_EVENT_TAP,
                        KCG_HEAD_INSERT_EVENT_TAP,
                        KCG_EVENT_TAP_OPTION_LISTEN_ONLY,
                        mask,
                        tap_callback,
                        &mut *state as *mut TapState as *mut c_void,
                    )
                };
                if tap.is_null() {
                    let _ = ready_tx.send(Err(anyhow!(
                        "event tap creation failed (grant Accessibility permission in System Settings)"
                    )));
                    return;
                }
                state.tap = tap;

                let source = unsafe { CFMachPortCreateRunLoopSource(std::ptr::null(), tap, 0) };
                if source.is_null() {
                    unsafe { CFRelease(tap) };
                    let _ = ready_tx.send(Err(anyhow!("run loop source creation failed")));
                    return;
                }
                unsafe {
                    CFRunLoopAddSource(CFRunLoopGetCurrent(), source, kCFRunLoopDefaultMode);
                    CGEventTapEnable(tap, true);
                }
                let _ = ready_tx.send(Ok(()));

                while !stop.load(Ordering::Relaxed) {
                    unsafe { CFRunLoopRunInMode(kCFRunLoopDefaultMode, 0.25, false) };
                }

                unsafe {
                    CGEventTapEnable(tap, false);
                    CFRelease(source);
                    CFRelease(tap);
                }
            })
            .context("failed to spawn event tap thread")?;

        self.thread = Some(handle);
        ready_rx
            .recv()
            .map_err(|_| anyhow!("event tap thread exited during install"))?
    }

    fn teardown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
