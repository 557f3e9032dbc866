use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

/// 半开矩形 `[x1, x2) x [y1, y2)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u16; 4]", into = "[u16; 4]")]
pub struct Rect {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl Rect {
    pub const fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        self.x1 <= x && x < self.x2 && self.y1 <= y && y < self.y2
    }

    pub fn is_empty(&self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x1 < other.x2 && other.x1 < self.x2 && self.y1 < other.y2 && other.y1 < self.y2
    }

    pub fn center(&self) -> (u16, u16) {
        (
            self.x1 + (self.x2 - self.x1) / 2,
            self.y1 + (self.y2 - self.y1) / 2,
        )
    }
}

impl From<[u16; 4]> for Rect {
    fn from([x1, y1, x2, y2]: [u16; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<Rect> for [u16; 4] {
    fn from(rect: Rect) -> Self {
        [rect.x1, rect.y1, rect.x2, rect.y2]
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})-({},{})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Consumer Page (0x0C) 上的媒体键用法
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Serialize, Deserialize,
)]
#[repr(u16)]
#[serde(rename_all = "snake_case")]
pub enum MediaUsage {
    ScanNext = 0xB5,
    ScanPrevious = 0xB6,
    Stop = 0xB7,
    PlayPause = 0xCD,
    Mute = 0xE2,
    VolumeUp = 0xE9,
    VolumeDown = 0xEA,
}

/// 区域被触发时要发出的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// 键盘扫描码 (Keyboard/Keypad page)
    #[serde(rename = "key")]
    Key(u8),
    #[serde(rename = "media")]
    MediaKey(MediaUsage),
    /// 1..=16
    #[serde(rename = "joystick")]
    JoystickButton(u8),
}

impl Action {
    pub fn is_media(&self) -> bool {
        matches!(self, Action::MediaKey(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Key(code) => write!(f, "key 0x{code:02x}"),
            Action::MediaKey(usage) => {
                write!(f, "media {usage:?} (0x{:02x})", u16::from(*usage))
            }
            Action::JoystickButton(button) => write!(f, "joystick button {button}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Zone {
    pub rect: Rect,
    pub action: Action,
    #[serde(default)]
    pub label: String,
}

impl Zone {
    pub fn new(rect: Rect, action: Action, label: impl Into<String>) -> Self {
        Self {
            rect,
            action,
            label: label.into(),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.rect, self.label, self.action)
    }
}
