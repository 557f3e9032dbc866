use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use super::report::MIN_REPORT_LEN;

/// 按住不放时两次诊断输出的最小间隔
pub const LOG_INTERVAL: Duration = Duration::from_millis(300);

/// 对一份原始报告的几种常见坐标解读，用来确认未知触摸屏的字段布局
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretations {
    pub raw: Vec<u8>,
    pub touched: bool,
    pub le_2345: (u16, u16),
    pub be_2345: (u16, u16),
    pub le_0123: (u16, u16),
    pub le_1234: (u16, u16),
}

impl Interpretations {
    pub fn of(raw: &[u8]) -> Option<Self> {
        if raw.len() < MIN_REPORT_LEN {
            return None;
        }
        let le = |lo: usize| u16::from_le_bytes([raw[lo], raw[lo + 1]]);
        let be = |hi: usize| u16::from_be_bytes([raw[hi], raw[hi + 1]]);
        Some(Self {
            raw: raw.to_vec(),
            touched: raw[1] > 0,
            le_2345: (le(2), le(4)),
            be_2345: (be(2), be(4)),
            le_0123: (le(0), le(2)),
            le_1234: (le(1), le(3)),
        })
    }
}

impl fmt::Display for Interpretations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("raw:")?;
        for byte in &self.raw {
            write!(f, " {byte:02x}")?;
        }
        write!(
            f,
            " | LE_2345: {:?} | BE_2345: {:?} | LE_0123: {:?} | LE_1234: {:?}",
            self.le_2345, self.be_2345, self.le_0123, self.le_1234
        )
    }
}

/// 第一次按下立即输出，按住期间每 [`LOG_INTERVAL`] 输出一次
#[derive(Debug, Default)]
pub struct Throttle {
    touch_active: bool,
    last_logged: Option<Instant>,
}

impl Throttle {
    pub fn should_log(&mut self, touched: bool, now: Instant) -> bool {
        let due = touched
            && (!self.touch_active
                || self
                    .last_logged
                    .is_none_or(|at| now.saturating_duration_since(at) >= LOG_INTERVAL));
        if due {
            self.last_logged = Some(now);
        }
        self.touch_active = touched;
        due
    }
}
