use super::*;
use crate::zone_map::{Action, Layout, MediaUsage};

const KEY_XY: (u16, u16) = (700, 700); // "[" -> 0x2F
const OTHER_KEY_XY: (u16, u16) = (1500, 700); // "-" -> 0x2D
const MEDIA_XY: (u16, u16) = (3000, 700); // Play/Pause

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

struct Harness {
    state: ClassifierState,
    zones: ZoneTable,
    thresholds: Thresholds,
    t0: Instant,
}

impl Harness {
    fn new() -> Self {
        Self::with_thresholds(Thresholds::default())
    }

    fn with_thresholds(thresholds: Thresholds) -> Self {
        Self {
            state: ClassifierState::default(),
            zones: Layout::Keyboard.table(),
            thresholds,
            t0: Instant::now(),
        }
    }

    fn touch(&mut self, (x, y): (u16, u16), at_ms: u64) -> Option<Action> {
        self.feed(TouchSample::pressed(x, y), at_ms)
    }

    fn release(&mut self, at_ms: u64) -> Option<Action> {
        self.feed(TouchSample::RELEASED, at_ms)
    }

    fn feed(&mut self, sample: TouchSample, at_ms: u64) -> Option<Action> {
        classify(
            &mut self.state,
            &self.zones,
            &self.thresholds,
            sample,
            self.t0 + ms(at_ms),
        )
        .map(|event| event.zone.action)
    }
}

#[test]
fn rising_edge_in_key_zone_fires_once() {
    let mut h = Harness::new();
    assert_eq!(h.touch(KEY_XY, 0), Some(Action::Key(0x2F)));
    assert_eq!(h.touch(KEY_XY, 100), None);
    assert_eq!(h.touch(KEY_XY, 499), None);
}

#[test]
fn held_key_repeats_after_repeat_delay() {
    let mut h = Harness::new();
    assert!(h.touch(KEY_XY, 0).is_some());
    assert_eq!(h.touch(KEY_XY, 600), Some(Action::Key(0x2F)));
    assert_eq!(h.touch(KEY_XY, 700), None);
    assert_eq!(h.touch(KEY_XY, 1100), Some(Action::Key(0x2F)));
}

#[test]
fn switching_zones_while_held_fires_immediately() {
    let mut h = Harness::new();
    assert!(h.touch(KEY_XY, 0).is_some());
    assert_eq!(h.touch(OTHER_KEY_XY, 20), Some(Action::Key(0x2D)));
    assert_eq!(h.touch(KEY_XY, 40), Some(Action::Key(0x2F)));
}

#[test]
fn media_key_never_repeats_while_held() {
    let mut h = Harness::new();
    let play = Some(Action::MediaKey(MediaUsage::PlayPause));
    assert_eq!(h.touch(MEDIA_XY, 0), play);
    assert_eq!(h.touch(MEDIA_XY, 300), None);
    assert_eq!(h.touch(MEDIA_XY, 600), None);
    assert_eq!(h.touch(MEDIA_XY, 5000), None);
}

#[test]
fn media_key_fires_again_after_release_and_retouch() {
    let mut h = Harness::new();
    assert!(h.touch(MEDIA_XY, 0).is_some());
    assert_eq!(h.release(100), None);
    assert_eq!(h.state.last_media_zone_sent, None);
    assert_eq!(
        h.touch(MEDIA_XY, 200),
        Some(Action::MediaKey(MediaUsage::PlayPause))
    );
}

#[test]
fn sliding_into_media_zone_does_not_fire_it() {
    let mut h = Harness::new();
    assert!(h.touch(KEY_XY, 0).is_some());
    assert_eq!(h.touch(MEDIA_XY, 100), None);
    assert_eq!(h.touch(MEDIA_XY, 1000), None);
}

#[test]
fn media_guard_blocks_same_zone_without_release() {
    // 人为构造：媒体区域刚刚发送过，且触摸状态被外部清掉但 last_media_zone_sent 仍在
    let mut h = Harness::new();
    let media_zone = h.zones.find(MEDIA_XY.0, MEDIA_XY.1).unwrap().clone();
    h.state.last_media_zone_sent = Some(media_zone);
    h.state.last_activation_time = Some(h.t0);
    assert_eq!(h.touch(MEDIA_XY, 200), None);

    let mut h = Harness::new();
    let media_zone = h.zones.find(MEDIA_XY.0, MEDIA_XY.1).unwrap().clone();
    h.state.last_media_zone_sent = Some(media_zone);
    h.state.last_activation_time = Some(h.t0);
    assert!(h.touch(MEDIA_XY, 500).is_some());
}

#[test]
fn quick_release_and_retouch_collapses_into_one_press() {
    let mut h = Harness::new();
    assert!(h.touch(KEY_XY, 0).is_some());
    assert_eq!(h.release(10), None);
    assert!(h.state.last_touch_active);
    assert_eq!(h.touch(KEY_XY, 20), None);
    assert_eq!(h.release(30), None);
    assert_eq!(h.touch(KEY_XY, 40), None);
}

#[test]
fn debounced_sample_leaves_state_untouched() {
    let mut h = Harness::new();
    assert!(h.touch(KEY_XY, 0).is_some());
    let before = h.state.clone();
    assert_eq!(h.release(49), None);
    assert_eq!(h.state, before);
}

#[test]
fn release_clears_zone_tracking() {
    let mut h = Harness::new();
    assert!(h.touch(KEY_XY, 0).is_some());
    assert!(h.state.last_zone.is_some());
    assert_eq!(h.release(100), None);
    assert!(!h.state.last_touch_active);
    assert_eq!(h.state.last_zone, None);
    assert_eq!(h.state.last_state_change_time, Some(h.t0 + ms(100)));
}

#[test]
fn release_then_retouch_past_debounce_fires_again() {
    let mut h = Harness::new();
    assert!(h.touch(KEY_XY, 0).is_some());
    assert_eq!(h.release(60), None);
    assert_eq!(h.touch(KEY_XY, 90), None, "inside debounce window");
    assert_eq!(h.touch(KEY_XY, 120), Some(Action::Key(0x2F)));
}

#[test]
fn touch_outside_zones_emits_nothing_but_counts_as_touched() {
    let mut h = Harness::new();
    assert_eq!(h.touch((0, 0), 0), None);
    assert!(h.state.last_touch_active);
    // 已经处于按下状态，进入区域时 last_zone 不同，仍然立即触发
    assert_eq!(h.touch(KEY_XY, 10), Some(Action::Key(0x2F)));
}

#[test]
fn joystick_buttons_follow_key_rules() {
    let mut h = Harness::new();
    h.zones = Layout::Joystick.table();
    assert_eq!(h.touch((400, 400), 0), Some(Action::JoystickButton(1)));
    assert_eq!(h.touch((400, 400), 200), None);
    assert_eq!(h.touch((400, 400), 500), Some(Action::JoystickButton(1)));
    assert_eq!(h.touch((3700, 3700), 510), Some(Action::JoystickButton(16)));
}

#[test]
fn stale_touch_expires_only_when_enabled() {
    let mut h = Harness::new();
    assert!(h.touch(KEY_XY, 0).is_some());
    assert!(!expire_stale_touch(&mut h.state, &h.thresholds, h.t0 + ms(5000)));
    assert!(h.state.last_touch_active);

    let mut h = Harness::with_thresholds(Thresholds {
        release_timeout: Some(ms(100)),
        ..Thresholds::default()
    });
    assert!(h.touch(KEY_XY, 0).is_some());
    assert!(!expire_stale_touch(&mut h.state, &h.thresholds, h.t0 + ms(100)));
    assert!(expire_stale_touch(&mut h.state, &h.thresholds, h.t0 + ms(101)));
    assert!(!h.state.last_touch_active);
    assert_eq!(h.state.last_zone, None);
    // 强制松开后同一位置再次上报视为新的按下
    assert_eq!(h.touch(KEY_XY, 150), Some(Action::Key(0x2F)));
}
