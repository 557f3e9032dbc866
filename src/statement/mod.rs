/// 触摸屏原始报告的解析与坐标换算
pub mod report;

/// `diagnose` 子命令使用的原始报告多种解读
pub mod diagnostic;

pub use report::{ReportParser, Scaling, ScalingMode, parse};
