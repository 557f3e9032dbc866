use serde::{Deserialize, Serialize};

use super::{Action, MediaUsage, Rect, ZONE_COUNT, Zone, ZoneTable};

/// 网格左上角，逻辑坐标 300 以下是触摸屏边框
pub const GRID_ORIGIN: u16 = 300;
pub const GRID_CELL: u16 = 875;
pub const GRID_COLUMNS: u16 = 4;

/// 内置布局，配置里没有 `[[zones]]` 时使用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Keyboard,
    Joystick,
}

const KEYBOARD_ACTIONS: [(Action, &str); ZONE_COUNT] = [
    (Action::Key(0x2F), "["),
    (Action::Key(0x2D), "-"),
    (Action::Key(0x36), "<"),
    (Action::MediaKey(MediaUsage::PlayPause), "Play/Pause"),
    (Action::Key(0x30), "]"),
    (Action::Key(0x2E), "="),
    (Action::Key(0x37), ">"),
    (Action::Key(0x50), "Left Arrow"),
    (Action::MediaKey(MediaUsage::ScanPrevious), "Prev Song"),
    (Action::Key(0x4A), "Home"),
    (Action::Key(0x52), "Up Arrow"),
    (Action::Key(0x51), "Down Arrow"),
    (Action::MediaKey(MediaUsage::ScanNext), "Next Song"),
    (Action::Key(0x4D), "End"),
    (Action::Key(0x28), "Enter"),
    (Action::Key(0x4F), "Right Arrow"),
];

/// 第 `index` 个格子（行优先）
pub fn grid_cell(index: u16) -> Rect {
    let (col, row) = (index % GRID_COLUMNS, index / GRID_COLUMNS);
    let x1 = GRID_ORIGIN + col * GRID_CELL;
    let y1 = GRID_ORIGIN + row * GRID_CELL;
    Rect::new(x1, y1, x1 + GRID_CELL, y1 + GRID_CELL)
}

impl Layout {
    pub fn table(self) -> ZoneTable {
        let zones = match self {
            Layout::Keyboard => KEYBOARD_ACTIONS
                .iter()
                .zip(0u16..)
                .map(|(&(action, label), index)| Zone::new(grid_cell(index), action, label))
                .collect(),
            Layout::Joystick => (1..=ZONE_COUNT as u8)
                .zip(0u16..)
                .map(|(button, index)| {
                    Zone::new(
                        grid_cell(index),
                        Action::JoystickButton(button),
                        format!("Button{button}"),
                    )
                })
                .collect(),
        };
        ZoneTable { zones }
    }
}
