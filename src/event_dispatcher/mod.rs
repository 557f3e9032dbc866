//! 区域激活到 HID gadget 报告的编码与发送
//!
//! 每次激活固定发两份报告：按下，保持一段时间，松开，再等一小段时间。
//! 按下时长不能为零，否则主机端识别不到独立的按键。

pub mod descriptor;
pub mod gadget;
mod report;

pub use report::*;

use std::future::Future;
use std::io;
use std::time::Duration;

use thiserror::Error;
use tracing::{trace, warn};

use crate::zone_map::{Action, MediaUsage};
use descriptor::consumer_mask;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("{0} device is not available")]
    DeviceUnavailable(DeviceKind),
    #[error("media usage {0:?} is not supported by current descriptor")]
    UnsupportedAction(MediaUsage),
    #[error("invalid joystick button {0}")]
    InvalidButton(u8),
    #[error("failed to write {kind} report")]
    Io {
        kind: DeviceKind,
        #[source]
        source: io::Error,
    },
}

/// 一个可以接收输出报告的设备
pub trait ReportSink {
    fn send_report(&mut self, report: &[u8]) -> impl Future<Output = io::Result<()>>;
}

/// 每种逻辑设备一个可选的输出端，启动时没找到的设备保持 `None`
#[derive(Debug)]
pub struct OutputDevices<S> {
    pub keyboard: Option<S>,
    pub consumer: Option<S>,
    pub joystick: Option<S>,
    /// 摇杆缺失时把按钮 n 映射成键盘键码 n + 3（A..P）
    pub joystick_keyboard_fallback: bool,
    /// 松开报告没能送达的设备，下次发送前先补发松开
    stuck: Vec<DeviceKind>,
}

impl<S> Default for OutputDevices<S> {
    fn default() -> Self {
        Self {
            keyboard: None,
            consumer: None,
            joystick: None,
            joystick_keyboard_fallback: false,
            stuck: Vec::new(),
        }
    }
}

impl<S: ReportSink> OutputDevices<S> {
    pub fn device(&mut self, kind: DeviceKind) -> Option<&mut S> {
        match kind {
            DeviceKind::Keyboard => self.keyboard.as_mut(),
            DeviceKind::Consumer => self.consumer.as_mut(),
            DeviceKind::Joystick => self.joystick.as_mut(),
        }
    }

    pub fn has(&self, kind: DeviceKind) -> bool {
        match kind {
            DeviceKind::Keyboard => self.keyboard.is_some(),
            DeviceKind::Consumer => self.consumer.is_some(),
            DeviceKind::Joystick => self.joystick.is_some(),
        }
    }

    pub async fn send(&mut self, report: Report) -> Result<(), SendError> {
        let kind = report.kind();
        let device = self
            .device(kind)
            .ok_or(SendError::DeviceUnavailable(kind))?;
        trace!(device = %kind, report = ?report.as_bytes(), "sending report");
        device
            .send_report(report.as_bytes())
            .await
            .map_err(|source| SendError::Io { kind, source })
    }

    /// 这个设备上是否还有没送达的松开报告
    pub fn is_stuck(&self, kind: DeviceKind) -> bool {
        self.stuck.contains(&kind)
    }

    /// 补发之前失败的松开报告，仍然失败时保持标记
    async fn unstick(&mut self, kind: DeviceKind) -> Result<(), SendError> {
        if !self.is_stuck(kind) {
            return Ok(());
        }
        self.send(Report::released(kind)).await?;
        self.stuck.retain(|stuck| *stuck != kind);
        Ok(())
    }

    /// 给每个已打开的设备发送全零报告，退出前调用
    pub async fn release_all(&mut self) {
        for kind in [DeviceKind::Keyboard, DeviceKind::Consumer, DeviceKind::Joystick] {
            if !self.has(kind) {
                continue;
            }
            match self.send(Report::released(kind)).await {
                Ok(()) => self.stuck.retain(|stuck| *stuck != kind),
                Err(error) => warn!(device = %kind, %error, "failed to release output"),
            }
        }
    }

    /// 摇杆 gadget 不存在且开启了回退时，把摇杆按钮改写成键盘按键
    fn route(&self, action: Action) -> Action {
        match action {
            Action::JoystickButton(button)
                if self.joystick_keyboard_fallback
                    && !self.has(DeviceKind::Joystick)
                    && joystick_button_mask(button).is_some() =>
            {
                Action::Key(button + 3)
            }
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub key_hold: Duration,
    pub key_settle: Duration,
    pub media_hold: Duration,
    pub media_settle: Duration,
    pub joystick_hold: Duration,
    pub joystick_settle: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            key_hold: Duration::from_millis(50),
            key_settle: Duration::ZERO,
            media_hold: Duration::from_millis(100),
            media_settle: Duration::from_millis(50),
            joystick_hold: Duration::from_millis(50),
            joystick_settle: Duration::from_millis(10),
        }
    }
}

/// 一次完整的按键：按下报告，保持，松开报告，稳定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stroke {
    pub press: Report,
    pub hold: Duration,
    pub release: Report,
    pub settle: Duration,
}

pub fn encode(action: Action, pacing: &Pacing) -> Result<Stroke, SendError> {
    match action {
        Action::Key(keycode) => Ok(Stroke {
            press: Report::keyboard(keycode),
            hold: pacing.key_hold,
            release: Report::keyboard(0),
            settle: pacing.key_settle,
        }),
        Action::MediaKey(usage) => {
            let mask = consumer_mask(usage).ok_or(SendError::UnsupportedAction(usage))?;
            Ok(Stroke {
                press: Report::consumer(mask),
                hold: pacing.media_hold,
                release: Report::consumer(0),
                settle: pacing.media_settle,
            })
        }
        Action::JoystickButton(button) => {
            let mask = joystick_button_mask(button).ok_or(SendError::InvalidButton(button))?;
            Ok(Stroke {
                press: Report::joystick(mask),
                hold: pacing.joystick_hold,
                release: Report::joystick(0),
                settle: pacing.joystick_settle,
            })
        }
    }
}

/// 编码并发送一次激活。目标设备缺失或动作不被支持时不做任何 I/O
///
/// 按下已经送达而松开写失败时，等待 `settle` 后重试一次；仍然失败就记下这个设备，
/// 下一次往它发送之前先补发松开报告，保证主机端不会一直按着
pub async fn encode_and_send<S: ReportSink>(
    action: Action,
    outputs: &mut OutputDevices<S>,
    pacing: &Pacing,
) -> Result<(), SendError> {
    let stroke = encode(outputs.route(action), pacing)?;
    let kind = stroke.press.kind();
    if !outputs.has(kind) {
        return Err(SendError::DeviceUnavailable(kind));
    }
    outputs.unstick(kind).await?;
    outputs.send(stroke.press).await?;
    tokio::time::sleep(stroke.hold).await;
    if let Err(error) = outputs.send(stroke.release).await {
        warn!(device = %kind, %error, "release report failed, retrying");
        tokio::time::sleep(stroke.settle).await;
        if outputs.send(stroke.release).await.is_err() && !outputs.is_stuck(kind) {
            outputs.stuck.push(kind);
        }
        return Err(error);
    }
    tokio::time::sleep(stroke.settle).await;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing;
