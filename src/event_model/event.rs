use crate::zone_map::Zone;

/// 一次轮询得到的逻辑触摸采样，坐标已经换算到逻辑屏幕空间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchSample {
    pub touched: bool,
    pub x: u16,
    pub y: u16,
}

impl TouchSample {
    pub const RELEASED: Self = Self {
        touched: false,
        x: 0,
        y: 0,
    };

    pub fn pressed(x: u16, y: u16) -> Self {
        Self {
            touched: true,
            x,
            y,
        }
    }
}

/// `event_router` 判定某个区域应当发出一对按下/松开报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationEvent {
    pub zone: Zone,
}
