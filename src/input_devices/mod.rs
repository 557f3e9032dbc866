//! 触摸屏输入端
//!
//! [`TouchConnector`] 负责发现并打开设备，[`TouchSource`] 负责按超时读取一份原始报告。
//! 读超时不是故障，其他读错误都意味着设备句柄作废，需要重新发现。

pub mod usb;

use std::future::Future;
use std::io;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

pub use usb::{UsbConnector, UsbFilter, UsbTouchscreen};

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("read timed out")]
    Timeout,
    #[error("usb transfer failed")]
    Usb(#[from] rusb::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("blocking read task failed")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("no touchscreen found among {scanned} usb devices")]
    NotFound { scanned: usize },
    #[error("usb error while opening touchscreen")]
    Usb(#[from] rusb::Error),
    #[error("blocking discovery task failed")]
    Task(#[from] tokio::task::JoinError),
}

pub trait TouchSource {
    /// 日志里显示的设备名
    fn name(&self) -> &str;

    fn read(&mut self, timeout: Duration) -> impl Future<Output = Result<Vec<u8>, ReadError>>;
}

pub trait TouchConnector {
    type Source: TouchSource;

    fn connect(&mut self) -> impl Future<Output = Result<Self::Source, ConnectError>>;
}

/// 一直重试到打开设备为止，每次失败后等待 `delay`
pub async fn connect_retrying<C: TouchConnector>(connector: &mut C, delay: Duration) -> C::Source {
    loop {
        match connector.connect().await {
            Ok(source) => return source,
            Err(ConnectError::NotFound { scanned }) => {
                info!(scanned, "no touchscreen found, retrying")
            }
            Err(error) => warn!(%error, "failed to open touchscreen, retrying"),
        }
        tokio::time::sleep(delay).await;
    }
}
