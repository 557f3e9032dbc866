use serde::{Deserialize, Serialize};

use crate::event_model::TouchSample;

/// 触摸报告的最小长度，不足时视为未触摸
pub const MIN_REPORT_LEN: usize = 6;

pub const LOGICAL_WIDTH: u16 = 3800;
pub const LOGICAL_HEIGHT: u16 = 3800;
pub const RAW_WIDTH: u16 = 4096;
pub const RAW_HEIGHT: u16 = 3072;

/// 原始坐标是否需要换算
///
/// 不同的触摸控制器会上报两种编码：已经缩放到逻辑范围的坐标，或者 12 位原始值。
/// 具体是哪一种取决于硬件。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMode {
    /// 坐标超过逻辑宽高时才按原始范围换算
    #[default]
    Auto,
    Passthrough,
    Rescale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scaling {
    pub mode: ScalingMode,
    pub logical_width: u16,
    pub logical_height: u16,
    pub raw_width: u16,
    pub raw_height: u16,
}

impl Default for Scaling {
    fn default() -> Self {
        Self {
            mode: ScalingMode::Auto,
            logical_width: LOGICAL_WIDTH,
            logical_height: LOGICAL_HEIGHT,
            raw_width: RAW_WIDTH,
            raw_height: RAW_HEIGHT,
        }
    }
}

impl Scaling {
    fn axis(&self, raw: u16, logical: u16, range: u16) -> u16 {
        let rescale = match self.mode {
            ScalingMode::Auto => raw > logical,
            ScalingMode::Passthrough => false,
            ScalingMode::Rescale => true,
        };
        if !rescale || range == 0 {
            return raw;
        }
        let scaled = u32::from(raw) * u32::from(logical) / u32::from(range);
        u16::try_from(scaled).unwrap_or(u16::MAX)
    }

    pub fn x(&self, raw: u16) -> u16 {
        self.axis(raw, self.logical_width, self.raw_width)
    }

    pub fn y(&self, raw: u16) -> u16 {
        self.axis(raw, self.logical_height, self.raw_height)
    }
}

/// 报告布局：
/// ```text
/// byte 0     report id / 未使用
/// byte 1     触摸状态，非零即按下
/// byte 2..3  x，小端
/// byte 4..5  y，小端
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportParser {
    scaling: Scaling,
}

impl ReportParser {
    pub fn new(scaling: Scaling) -> Self {
        Self { scaling }
    }

    pub fn scaling(&self) -> &Scaling {
        &self.scaling
    }

    /// 报告太短时返回 [`TouchSample::RELEASED`]，这不是错误
    pub fn parse(&self, raw: &[u8]) -> TouchSample {
        if raw.len() < MIN_REPORT_LEN {
            return TouchSample::RELEASED;
        }
        TouchSample {
            touched: raw[1] > 0,
            x: self.scaling.x(u16::from_le_bytes([raw[2], raw[3]])),
            y: self.scaling.y(u16::from_le_bytes([raw[4], raw[5]])),
        }
    }
}

/// 使用默认换算策略解析一份报告
pub fn parse(raw: &[u8]) -> TouchSample {
    ReportParser::default().parse(raw)
}
