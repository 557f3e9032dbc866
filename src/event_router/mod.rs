//! 触摸采样到区域激活的判定
//!
//! 状态全部放在 [`ClassifierState`] 里，由轮询任务独占，每个采样调用一次 [`classify`]。
//! 普通按键和摇杆按钮按住时按 `repeat_delay` 自动重复，切换区域立即触发；
//! 媒体键只在按下沿触发，按住不会重复。

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::event_model::{ActivationEvent, TouchSample};
use crate::zone_map::{Zone, ZoneTable};

pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(50);
pub const REPEAT_DELAY: Duration = Duration::from_millis(500);
pub const MEDIA_KEY_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// 两次触摸状态切换之间的最小间隔
    pub debounce_window: Duration,
    pub repeat_delay: Duration,
    pub media_debounce: Duration,
    /// 读超时时，距离最后一次触摸报告超过该值就强制视为松开；`None` 表示关闭
    pub release_timeout: Option<Duration>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            debounce_window: DEBOUNCE_WINDOW,
            repeat_delay: REPEAT_DELAY,
            media_debounce: MEDIA_KEY_DEBOUNCE,
            release_timeout: None,
        }
    }
}

/// `None` 的时间戳表示从未发生过
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifierState {
    pub last_touch_active: bool,
    pub last_zone: Option<Zone>,
    pub last_activation_time: Option<Instant>,
    pub last_state_change_time: Option<Instant>,
    pub last_media_zone_sent: Option<Zone>,
    pub last_touch_report_time: Option<Instant>,
}

impl ClassifierState {
    fn release(&mut self) {
        self.last_touch_active = false;
        self.last_zone = None;
        self.last_media_zone_sent = None;
    }
}

/// `last` 为 `None` 时认为已经过去足够久
fn elapsed(last: Option<Instant>, now: Instant, window: Duration) -> bool {
    last.is_none_or(|at| now.saturating_duration_since(at) >= window)
}

pub fn classify(
    state: &mut ClassifierState,
    zones: &ZoneTable,
    thresholds: &Thresholds,
    sample: TouchSample,
    now: Instant,
) -> Option<ActivationEvent> {
    if sample.touched != state.last_touch_active {
        if !elapsed(state.last_state_change_time, now, thresholds.debounce_window) {
            trace!(touched = sample.touched, "touch transition debounced");
            return None;
        }
        state.last_state_change_time = Some(now);
    }

    if !sample.touched {
        if state.last_touch_active {
            debug!("touch released");
            state.last_media_zone_sent = None;
        }
        state.last_touch_active = false;
        state.last_zone = None;
        return None;
    }

    state.last_touch_report_time = Some(now);
    let activation = match zones.find(sample.x, sample.y) {
        None => {
            debug!(x = sample.x, y = sample.y, "touch outside every zone");
            None
        }
        Some(zone) if zone.action.is_media() => media_activation(state, thresholds, zone, now),
        Some(zone) => key_activation(state, thresholds, zone, now),
    };
    state.last_touch_active = true;

    activation.map(|zone| {
        debug!(x = sample.x, y = sample.y, zone = %zone.label, "zone activated");
        ActivationEvent { zone }
    })
}

fn media_activation(
    state: &mut ClassifierState,
    thresholds: &Thresholds,
    zone: &Zone,
    now: Instant,
) -> Option<Zone> {
    let rising = !state.last_touch_active;
    let fresh = state.last_media_zone_sent.as_ref() != Some(zone)
        || elapsed(state.last_activation_time, now, thresholds.media_debounce);
    if !(rising && fresh) {
        return None;
    }
    state.last_media_zone_sent = Some(zone.clone());
    state.last_activation_time = Some(now);
    Some(zone.clone())
}

fn key_activation(
    state: &mut ClassifierState,
    thresholds: &Thresholds,
    zone: &Zone,
    now: Instant,
) -> Option<Zone> {
    let fire = !state.last_touch_active
        || state.last_zone.as_ref() != Some(zone)
        || elapsed(state.last_activation_time, now, thresholds.repeat_delay);
    if !fire {
        return None;
    }
    state.last_zone = Some(zone.clone());
    state.last_activation_time = Some(now);
    Some(zone.clone())
}

/// 读超时时调用。触摸仍处于按下状态且超过 `release_timeout` 没有新的触摸报告，
/// 就把状态恢复为未触摸，返回是否发生了强制松开
pub fn expire_stale_touch(
    state: &mut ClassifierState,
    thresholds: &Thresholds,
    now: Instant,
) -> bool {
    let Some(timeout) = thresholds.release_timeout else {
        return false;
    };
    if !state.last_touch_active {
        return false;
    }
    let stale = state
        .last_touch_report_time
        .is_none_or(|at| now.saturating_duration_since(at) > timeout);
    if stale {
        debug!("touch timed out, treating as released");
        state.release();
    }
    stale
}

#[cfg(test)]
mod tests;
