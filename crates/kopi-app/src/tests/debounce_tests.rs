use std::time::Duration;

use kopi_types::{AppEvent, TextSource};
use tokio::time::timeout;

use crate::debounce::DebounceTrigger;

#[tokio::test(start_paused = true)]
async fn rapid_edits_coalesce_into_one_fire() {
    let (tx, rx) = kanal::bounded_async::<AppEvent>(8);
    let mut debounce = DebounceTrigger::new(Duration::from_millis(1000), tx);

    debounce.notify("first".to_string());
    tokio::time::sleep(Duration::from_millis(200)).await;
    debounce.notify("second".to_string());
    tokio::time::sleep(Duration::from_millis(200)).await;
    debounce.notify("third".to_string());

    // The timer restarts on every edit, so nothing fires yet.
    tokio::time::sleep(Duration::from_millis(900)).await;
    assert!(rx.try_recv().expect("channel alive").is_none());

    let event = timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("debounce never fired")
        .expect("channel closed");
    match event {
        AppEvent::Translate { text, source } => {
            assert_eq!(text, "third");
            assert_eq!(source, TextSource::Auto);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    // Exactly one fire for the whole burst.
    tokio::time::sleep(Duration::from_millis(3000)).await;
    assert!(rx.try_recv().expect("channel alive").is_none());
}

#[tokio::test(start_paused = true)]
async fn fire_lands_a_full_delay_after_the_last_edit() {
    let (tx, rx) = kanal::bounded_async::<AppEvent>(8);
    let mut debounce = DebounceTrigger::new(Duration::from_millis(1000), tx);

    debounce.notify("text".to_string());
    tokio::time::sleep(Duration::from_millis(999)).await;
    assert!(rx.try_recv().expect("channel alive").is_none());

    let event = timeout(Duration::from_millis(10), rx.recv())
        .await
        .expect("debounce never fired")
        .expect("channel closed");
    assert!(matches!(event, AppEvent::Translate { .. }));
}

#[tokio::test(start_paused = true)]
async fn suppression_blocks_armed_and_new_timers() {
    let (tx, rx) = kanal::bounded_async::<AppEvent>(8);
    let mut debounce = DebounceTrigger::new(Duration::from_millis(1000), tx);

    debounce.notify("armed".to_string());
    tokio::time::sleep(Duration::from_millis(500)).await;
    debounce.suppress(true);
    debounce.notify("while suppressed".to_string());

    tokio::time::sleep(Duration::from_millis(3000)).await;
    assert!(rx.try_recv().expect("channel alive").is_none());

    debounce.suppress(false);
    debounce.notify("after release".to_string());
    let event = timeout(Duration::from_millis(1100), rx.recv())
        .await
        .expect("debounce never fired")
        .expect("channel closed");
    assert!(matches!(event, AppEvent::Translate { ref text, .. } if text == "after release"));
}
