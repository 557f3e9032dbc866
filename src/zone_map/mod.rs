mod layout;
mod zone;

pub use layout::*;
pub use zone::*;

use thiserror::Error;

/// 区域表固定为 4x4 网格
pub const ZONE_COUNT: usize = 16;

/// 虚拟摇杆的按钮数量
pub const JOYSTICK_BUTTONS: u8 = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ZoneError {
    #[error("expected {ZONE_COUNT} zones, got {0}")]
    Count(usize),
    #[error("zone {index} ({label}) has an empty rectangle {rect}")]
    EmptyRect {
        index: usize,
        label: String,
        rect: Rect,
    },
    #[error("zones {first} and {second} overlap")]
    Overlap { first: usize, second: usize },
    #[error("zone {index} ({label}) maps to joystick button {button}, valid range is 1..={JOYSTICK_BUTTONS}")]
    JoystickButton {
        index: usize,
        label: String,
        button: u8,
    },
}

/// 按表内顺序线性查找，返回第一个包含 `(x, y)` 的区域
pub fn find_zone(x: u16, y: u16, zones: &[Zone]) -> Option<&Zone> {
    zones.iter().find(|zone| zone.rect.contains(x, y))
}

/// 经过校验的区域表：恰好 16 个互不重叠的区域
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneTable {
    zones: Vec<Zone>,
}

impl ZoneTable {
    pub fn new(zones: Vec<Zone>) -> Result<Self, ZoneError> {
        if zones.len() != ZONE_COUNT {
            return Err(ZoneError::Count(zones.len()));
        }
        for (index, zone) in zones.iter().enumerate() {
            if zone.rect.is_empty() {
                return Err(ZoneError::EmptyRect {
                    index,
                    label: zone.label.clone(),
                    rect: zone.rect,
                });
            }
            if let Action::JoystickButton(button) = zone.action {
                if !(1..=JOYSTICK_BUTTONS).contains(&button) {
                    return Err(ZoneError::JoystickButton {
                        index,
                        label: zone.label.clone(),
                        button,
                    });
                }
            }
        }
        for (first, a) in zones.iter().enumerate() {
            for (second, b) in zones.iter().enumerate().skip(first + 1) {
                if a.rect.intersects(&b.rect) {
                    return Err(ZoneError::Overlap { first, second });
                }
            }
        }
        Ok(Self { zones })
    }

    pub fn find(&self, x: u16, y: u16) -> Option<&Zone> {
        find_zone(x, y, &self.zones)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }
}

impl Default for ZoneTable {
    fn default() -> Self {
        Layout::default().table()
    }
}
