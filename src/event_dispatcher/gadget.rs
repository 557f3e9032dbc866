use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use super::{DeviceKind, OutputDevices, ReportSink};
use crate::config::{GadgetConfig, OutputConfig};

/// Linux USB gadget HID function 的字符设备 (`/dev/hidgN`)，每次写入一份完整报告
#[derive(Debug)]
pub struct HidGadget {
    path: PathBuf,
    file: File,
}

impl HidGadget {
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().write(true).open(&path).await?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for HidGadget {
    async fn send_report(&mut self, report: &[u8]) -> io::Result<()> {
        self.file.write_all(report).await?;
        self.file.flush().await
    }
}

async fn open_one(kind: DeviceKind, config: &GadgetConfig) -> Option<HidGadget> {
    if !config.enabled {
        info!(device = %kind, "output disabled by configuration");
        return None;
    }
    match HidGadget::open(&config.path).await {
        Ok(gadget) => {
            info!(device = %kind, path = %config.path.display(), "output device ready");
            Some(gadget)
        }
        Err(error) => {
            warn!(device = %kind, path = %config.path.display(), %error, "output device not available");
            None
        }
    }
}

/// 打开配置里的全部 gadget。打不开的设备保持缺失，对应动作之后一律报 `DeviceUnavailable`
pub async fn open_outputs(config: &OutputConfig) -> OutputDevices<HidGadget> {
    OutputDevices {
        keyboard: open_one(DeviceKind::Keyboard, &config.keyboard).await,
        consumer: open_one(DeviceKind::Consumer, &config.consumer).await,
        joystick: open_one(DeviceKind::Joystick, &config.joystick).await,
        joystick_keyboard_fallback: config.joystick_keyboard_fallback,
        ..OutputDevices::default()
    }
}
