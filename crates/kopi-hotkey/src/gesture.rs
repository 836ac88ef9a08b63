use std::time::{Duration, Instant};

use kopi_types::{Key, KeyAction, KeyEvent};

pub const DOUBLE_PRESS_WINDOW: Duration = Duration::from_millis(500);

/// Virtual key code macOS delivers for the `c` key.
pub const MACOS_KEY_C: u16 = 8;

/// ETX, what some listener backends report for the trigger key while the
/// modifier is held. Accepted only where the platform adapter opts in.
pub const CTRL_C_CONTROL_CHAR: char = '\u{3}';

/// Watches a raw key-event stream and fires once per double-press of the
/// modifier + trigger combination.
///
/// Modifier up/down is tracked independently of the trigger key. The
/// double-press window is armed by the first qualifying press and
/// disarmed by expiry or by the second press firing; after a fire the
/// window is consumed, so a third rapid press arms a fresh window instead
/// of firing again.
///
/// Detection happens on key-press only. Release events carry an
/// unpredictable modifier state across platforms and never trigger.
pub struct GestureDetector<F: FnMut()> {
    window: Duration,
    triggers: Vec<Key>,
    modifier_held: bool,
    last_trigger: Option<Instant>,
    on_double_copy: F,
}

impl<F: FnMut()> GestureDetector<F> {
    pub fn new(window: Duration, triggers: &[Key], on_double_copy: F) -> Self {
        Self {
            window,
            triggers: triggers.to_vec(),
            modifier_held: false,
            last_trigger: None,
            on_double_copy,
        }
    }

    /// Must stay cheap: runs on the hook's execution context.
    pub fn on_key_event(&mut self, event: KeyEvent) {
        match (event.key, event.action) {
            (Key::ModifierLeft | Key::ModifierRight, KeyAction::Press) => {
                self.modifier_held = true;
            }
            (Key::ModifierLeft | Key::ModifierRight, KeyAction::Release) => {
                self.modifier_held = false;
            }
            (key, KeyAction::Press) if self.modifier_held && self.is_trigger(key) => {
                match self.last_trigger {
                    Some(armed) if event.at.duration_since(armed) < self.window => {
                        self.last_trigger = None;
                        (self.on_double_copy)();
                    }
                    _ => self.last_trigger = Some(event.at),
                }
            }
            _ => {}
        }
    }

    fn is_trigger(&self, key: Key) -> bool {
        self.triggers.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn detector(
        triggers: &[Key],
    ) -> (GestureDetector<impl FnMut()>, Rc<Cell<usize>>) {
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let detector = GestureDetector::new(DOUBLE_PRESS_WINDOW, triggers, move || {
            counter.set(counter.get() + 1);
        });
        (detector, fired)
    }

    fn char_detector() -> (GestureDetector<impl FnMut()>, Rc<Cell<usize>>) {
        detector(&[Key::Char('c'), Key::Char(CTRL_C_CONTROL_CHAR)])
    }

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn double_press_within_window_fires_once() {
        let (mut d, fired) = char_detector();
        let t0 = Instant::now();

        d.on_key_event(KeyEvent::press(Key::ModifierLeft, t0));
        d.on_key_event(KeyEvent::press(Key::Char('c'), at(t0, 10)));
        d.on_key_event(KeyEvent::release(Key::Char('c'), at(t0, 60)));
        d.on_key_event(KeyEvent::press(Key::Char('c'), at(t0, 300)));

        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn gap_of_exactly_the_window_does_not_fire() {
        let (mut d, fired) = char_detector();
        let t0 = Instant::now();

        d.on_key_event(KeyEvent::press(Key::ModifierLeft, t0));
        d.on_key_event(KeyEvent::press(Key::Char('c'), t0));
        d.on_key_event(KeyEvent::press(Key::Char('c'), at(t0, 500)));

        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn slow_second_press_rearms_the_window() {
        let (mut d, fired) = char_detector();
        let t0 = Instant::now();

        d.on_key_event(KeyEvent::press(Key::ModifierLeft, t0));
        d.on_key_event(KeyEvent::press(Key::Char('c'), t0));
        d.on_key_event(KeyEvent::press(Key::Char('c'), at(t0, 700)));
        // Third press lands within the window the second press re-armed.
        d.on_key_event(KeyEvent::press(Key::Char('c'), at(t0, 900)));

        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn triple_press_fires_exactly_once() {
        let (mut d, fired) = char_detector();
        let t0 = Instant::now();

        d.on_key_event(KeyEvent::press(Key::ModifierLeft, t0));
        d.on_key_event(KeyEvent::press(Key::Char('c'), t0));
        d.on_key_event(KeyEvent::press(Key::Char('c'), at(t0, 200)));
        d.on_key_event(KeyEvent::press(Key::Char('c'), at(t0, 400)));

        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn consumed_window_restarts_cleanly_after_a_fire() {
        let (mut d, fired) = char_detector();
        let t0 = Instant::now();

        d.on_key_event(KeyEvent::press(Key::ModifierLeft, t0));
        d.on_key_event(KeyEvent::press(Key::Char('c'), t0));
        d.on_key_event(KeyEvent::press(Key::Char('c'), at(t0, 200))); // fire 1
        d.on_key_event(KeyEvent::press(Key::Char('c'), at(t0, 400))); // arms fresh
        d.on_key_event(KeyEvent::press(Key::Char('c'), at(t0, 700))); // fire 2

        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn no_fire_without_the_modifier_held() {
        let (mut d, fired) = char_detector();
        let t0 = Instant::now();

        d.on_key_event(KeyEvent::press(Key::Char('c'), t0));
        d.on_key_event(KeyEvent::press(Key::Char('c'), at(t0, 100)));

        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn modifier_release_disqualifies_later_presses() {
        let (mut d, fired) = char_detector();
        let t0 = Instant::now();

        d.on_key_event(KeyEvent::press(Key::ModifierLeft, t0));
        d.on_key_event(KeyEvent::press(Key::Char('c'), t0));
        d.on_key_event(KeyEvent::release(Key::ModifierLeft, at(t0, 50)));
        d.on_key_event(KeyEvent::press(Key::Char('c'), at(t0, 200)));

        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn right_modifier_counts_too() {
        let (mut d, fired) = char_detector();
        let t0 = Instant::now();

        d.on_key_event(KeyEvent::press(Key::ModifierRight, t0));
        d.on_key_event(KeyEvent::press(Key::Char('c'), t0));
        d.on_key_event(KeyEvent::press(Key::Char('c'), at(t0, 100)));

        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn release_events_never_trigger() {
        let (mut d, fired) = char_detector();
        let t0 = Instant::now();

        d.on_key_event(KeyEvent::press(Key::ModifierLeft, t0));
        d.on_key_event(KeyEvent::release(Key::Char('c'), t0));
        d.on_key_event(KeyEvent::release(Key::Char('c'), at(t0, 100)));
        d.on_key_event(KeyEvent::release(Key::Char('c'), at(t0, 200)));

        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn control_char_counts_where_configured() {
        let (mut d, fired) = char_detector();
        let t0 = Instant::now();

        d.on_key_event(KeyEvent::press(Key::ModifierLeft, t0));
        d.on_key_event(KeyEvent::press(Key::Char(CTRL_C_CONTROL_CHAR), t0));
        d.on_key_event(KeyEvent::press(Key::Char('c'), at(t0, 150)));

        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn control_char_is_ignored_on_keycode_platforms() {
        let (mut d, fired) = detector(&[Key::Code(MACOS_KEY_C)]);
        let t0 = Instant::now();

        d.on_key_event(KeyEvent::press(Key::ModifierLeft, t0));
        d.on_key_event(KeyEvent::press(Key::Char(CTRL_C_CONTROL_CHAR), t0));
        d.on_key_event(KeyEvent::press(Key::Char(CTRL_C_CONTROL_CHAR), at(t0, 100)));
        assert_eq!(fired.get(), 0);

        d.on_key_event(KeyEvent::press(Key::Code(MACOS_KEY_C), at(t0, 200)));
        d.on_key_event(KeyEvent::press(Key::Code(MACOS_KEY_C), at(t0, 350)));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn unrelated_keys_do_not_disturb_an_armed_window() {
        let (mut d, fired) = char_detector();
        let t0 = Instant::now();

        d.on_key_event(KeyEvent::press(Key::ModifierLeft, t0));
        d.on_key_event(KeyEvent::press(Key::Char('c'), t0));
        d.on_key_event(KeyEvent::press(Key::Char('x'), at(t0, 100)));
        d.on_key_event(KeyEvent::press(Key::Other, at(t0, 150)));
        d.on_key_event(KeyEvent::press(Key::Char('c'), at(t0, 300)));

        assert_eq!(fired.get(), 1);
    }
}
