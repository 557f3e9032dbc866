//! 三个 HID gadget function 的报告描述符
//!
//! 写进 configfs 的 `functions/hid.usbN/report_desc`，同时填 `protocol`、`subclass`、`report_length`。

use super::report::{
    CONSUMER_REPORT_LEN, DeviceKind, JOYSTICK_REPORT_LEN, KEYBOARD_REPORT_LEN,
};
use crate::zone_map::MediaUsage;

pub const CONSUMER_REPORT_ID: u8 = 5;
pub const JOYSTICK_REPORT_ID: u8 = 4;

/// Boot protocol 键盘，没有 report id
#[rustfmt::skip]
pub const KEYBOARD_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01,       // Usage Page (Generic Desktop)
    0x09, 0x06,       // Usage (Keyboard)
    0xA1, 0x01,       // Collection (Application)
    0x05, 0x07,       //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0,       //   Usage Minimum (Left Control)
    0x29, 0xE7,       //   Usage Maximum (Right GUI)
    0x15, 0x00,       //   Logical Minimum (0)
    0x25, 0x01,       //   Logical Maximum (1)
    0x75, 0x01,       //   Report Size (1)
    0x95, 0x08,       //   Report Count (8)
    0x81, 0x02,       //   Input (Data,Var,Abs) modifiers
    0x95, 0x01,       //   Report Count (1)
    0x75, 0x08,       //   Report Size (8)
    0x81, 0x01,       //   Input (Const) reserved
    0x05, 0x08,       //   Usage Page (LEDs)
    0x19, 0x01,       //   Usage Minimum (Num Lock)
    0x29, 0x05,       //   Usage Maximum (Kana)
    0x95, 0x05,       //   Report Count (5)
    0x75, 0x01,       //   Report Size (1)
    0x91, 0x02,       //   Output (Data,Var,Abs)
    0x95, 0x01,       //   Report Count (1)
    0x75, 0x03,       //   Report Size (3)
    0x91, 0x01,       //   Output (Const)
    0x05, 0x07,       //   Usage Page (Keyboard/Keypad)
    0x19, 0x00,       //   Usage Minimum (0)
    0x29, 0xFF,       //   Usage Maximum (255)
    0x15, 0x00,       //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x95, 0x06,       //   Report Count (6)
    0x75, 0x08,       //   Report Size (8)
    0x81, 0x00,       //   Input (Data,Array,Abs) keycodes
    0xC0,             // End Collection
];

/// 最小化的 Consumer Control：只有 Play/Pause 一个位，后面 7 位填充
#[rustfmt::skip]
pub const CONSUMER_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x0C,                 // Usage Page (Consumer)
    0x09, 0x01,                 // Usage (Consumer Control)
    0xA1, 0x01,                 // Collection (Application)
    0x85, CONSUMER_REPORT_ID,   //   Report ID (5)
    0x09, 0xCD,                 //   Usage (Play/Pause)
    0x15, 0x00,                 //   Logical Minimum (0)
    0x25, 0x01,                 //   Logical Maximum (1)
    0x75, 0x01,                 //   Report Size (1)
    0x95, 0x01,                 //   Report Count (1)
    0x81, 0x02,                 //   Input (Data,Var,Abs)
    0x75, 0x07,                 //   Report Size (7)
    0x95, 0x01,                 //   Report Count (1)
    0x81, 0x01,                 //   Input (Const)
    0xC0,                       // End Collection
];

/// 16 按钮摇杆，X/Y 两个 8 位轴固定居中
#[rustfmt::skip]
pub const JOYSTICK_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01,                 // Usage Page (Generic Desktop)
    0x09, 0x04,                 // Usage (Joystick)
    0xA1, 0x01,                 // Collection (Application)
    0x85, JOYSTICK_REPORT_ID,   //   Report ID (4)
    0x05, 0x01,                 //   Usage Page (Generic Desktop)
    0x09, 0x30,                 //   Usage (X)
    0x09, 0x31,                 //   Usage (Y)
    0x15, 0x00,                 //   Logical Minimum (0)
    0x26, 0xFF, 0x00,           //   Logical Maximum (255)
    0x75, 0x08,                 //   Report Size (8)
    0x95, 0x02,                 //   Report Count (2)
    0x81, 0x02,                 //   Input (Data,Var,Abs)
    0x05, 0x09,                 //   Usage Page (Button)
    0x19, 0x01,                 //   Usage Minimum (1)
    0x29, 0x10,                 //   Usage Maximum (16)
    0x15, 0x00,                 //   Logical Minimum (0)
    0x25, 0x01,                 //   Logical Maximum (1)
    0x75, 0x01,                 //   Report Size (1)
    0x95, 0x10,                 //   Report Count (16)
    0x81, 0x02,                 //   Input (Data,Var,Abs)
    0xC0,                       // End Collection
];

/// Consumer 描述符里每个用法占用的位
const CONSUMER_USAGE_BITS: &[(MediaUsage, u8)] = &[(MediaUsage::PlayPause, 0)];

/// 当前描述符无法表示的用法返回 `None`
pub fn consumer_mask(usage: MediaUsage) -> Option<u8> {
    CONSUMER_USAGE_BITS
        .iter()
        .find(|(supported, _)| *supported == usage)
        .map(|(_, bit)| 1 << bit)
}

/// configfs 里一个 HID function 需要的参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GadgetFunction {
    pub kind: DeviceKind,
    pub protocol: u8,
    pub subclass: u8,
    pub report_length: usize,
    pub report_desc: &'static [u8],
}

impl GadgetFunction {
    pub fn of(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Keyboard => Self {
                kind,
                protocol: 1,
                subclass: 1,
                report_length: KEYBOARD_REPORT_LEN,
                report_desc: KEYBOARD_REPORT_DESCRIPTOR,
            },
            DeviceKind::Consumer => Self {
                kind,
                protocol: 0,
                subclass: 0,
                report_length: CONSUMER_REPORT_LEN,
                report_desc: CONSUMER_REPORT_DESCRIPTOR,
            },
            DeviceKind::Joystick => Self {
                kind,
                protocol: 0,
                subclass: 0,
                report_length: JOYSTICK_REPORT_LEN,
                report_desc: JOYSTICK_REPORT_DESCRIPTOR,
            },
        }
    }
}
