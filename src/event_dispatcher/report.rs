use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::descriptor::{CONSUMER_REPORT_ID, JOYSTICK_REPORT_ID};

pub const KEYBOARD_REPORT_LEN: usize = 8;
pub const CONSUMER_REPORT_LEN: usize = 2;
pub const JOYSTICK_REPORT_LEN: usize = 5;

/// 摇杆 X/Y 轴居中值
pub const AXIS_CENTER: u8 = 0x80;

/// 输出端的逻辑设备
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Keyboard,
    Consumer,
    Joystick,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeviceKind::Keyboard => "keyboard",
            DeviceKind::Consumer => "consumer control",
            DeviceKind::Joystick => "joystick",
        })
    }
}

/// 一份待发送的 HID 输入报告，每种设备一个变体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// modifier, reserved, 6 个键码
    Keyboard([u8; KEYBOARD_REPORT_LEN]),
    /// report id, 用法位图
    Consumer([u8; CONSUMER_REPORT_LEN]),
    /// report id, X, Y, 16 位按钮位图（小端）
    Joystick([u8; JOYSTICK_REPORT_LEN]),
}

impl Report {
    pub fn keyboard(keycode: u8) -> Self {
        Report::Keyboard([0, 0, keycode, 0, 0, 0, 0, 0])
    }

    pub fn consumer(bits: u8) -> Self {
        Report::Consumer([CONSUMER_REPORT_ID, bits])
    }

    pub fn joystick(buttons: u16) -> Self {
        let [lo, hi] = buttons.to_le_bytes();
        Report::Joystick([JOYSTICK_REPORT_ID, AXIS_CENTER, AXIS_CENTER, lo, hi])
    }

    /// 对应设备的全零（松开）报告，摇杆轴保持居中
    pub fn released(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Keyboard => Report::keyboard(0),
            DeviceKind::Consumer => Report::consumer(0),
            DeviceKind::Joystick => Report::joystick(0),
        }
    }

    pub fn kind(&self) -> DeviceKind {
        match self {
            Report::Keyboard(_) => DeviceKind::Keyboard,
            Report::Consumer(_) => DeviceKind::Consumer,
            Report::Joystick(_) => DeviceKind::Joystick,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Report::Keyboard(bytes) => bytes,
            Report::Consumer(bytes) => bytes,
            Report::Joystick(bytes) => bytes,
        }
    }
}

/// 按钮编号 1..=16 对应的位
pub fn joystick_button_mask(button: u8) -> Option<u16> {
    (1..=16)
        .contains(&button)
        .then(|| 1u16 << (button - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_layout() {
        assert_eq!(
            Report::keyboard(0x2F).as_bytes(),
            &[0, 0, 0x2F, 0, 0, 0, 0, 0]
        );
        assert_eq!(Report::keyboard(0).as_bytes(), &[0; 8]);
    }

    #[test]
    fn consumer_layout() {
        assert_eq!(Report::consumer(0x01).as_bytes(), &[5, 0x01]);
        assert_eq!(Report::consumer(0).kind(), DeviceKind::Consumer);
    }

    #[test]
    fn joystick_buttons_split_across_two_bytes() {
        let low = Report::joystick(joystick_button_mask(1).unwrap());
        assert_eq!(low.as_bytes(), &[4, 0x80, 0x80, 0x01, 0x00]);
        let eighth = Report::joystick(joystick_button_mask(8).unwrap());
        assert_eq!(eighth.as_bytes(), &[4, 0x80, 0x80, 0x80, 0x00]);
        let ninth = Report::joystick(joystick_button_mask(9).unwrap());
        assert_eq!(ninth.as_bytes(), &[4, 0x80, 0x80, 0x00, 0x01]);
        let last = Report::joystick(joystick_button_mask(16).unwrap());
        assert_eq!(last.as_bytes(), &[4, 0x80, 0x80, 0x00, 0x80]);
    }

    #[test]
    fn joystick_mask_rejects_out_of_range() {
        assert_eq!(joystick_button_mask(0), None);
        assert_eq!(joystick_button_mask(17), None);
    }
}
