//! 轮询主循环
//!
//! 单个任务顺序完成：读一份报告，判定，必要时同步发出按下/松开报告，再回到读取。
//! 分类状态只属于这个任务，不需要加锁。读失败就放弃当前句柄，等待固定间隔后重新发现设备，永不退出。

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::event_dispatcher::{OutputDevices, Pacing, ReportSink, encode_and_send};
use crate::event_model::ActivationEvent;
use crate::event_router::{ClassifierState, Thresholds, classify, expire_stale_touch};
use crate::input_devices::{ConnectError, ReadError, TouchConnector, TouchSource};
use crate::statement::ReportParser;
use crate::zone_map::ZoneTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverSettings {
    pub parser: ReportParser,
    pub thresholds: Thresholds,
    pub pacing: Pacing,
    pub read_timeout: Duration,
    pub reconnect_delay: Duration,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            parser: ReportParser::default(),
            thresholds: Thresholds::default(),
            pacing: Pacing::default(),
            read_timeout: Duration::from_millis(100),
            reconnect_delay: Duration::from_secs(2),
        }
    }
}

impl From<&Config> for DriverSettings {
    fn from(config: &Config) -> Self {
        Self {
            parser: ReportParser::new(config.scaling),
            thresholds: config.timing.thresholds(),
            pacing: config.timing.pacing(),
            read_timeout: config.input.read_timeout(),
            reconnect_delay: config.input.reconnect_delay(),
        }
    }
}

pub struct TouchDriver<C, S> {
    connector: C,
    outputs: OutputDevices<S>,
    zones: ZoneTable,
    settings: DriverSettings,
    state: ClassifierState,
}

impl<C: TouchConnector, S: ReportSink> TouchDriver<C, S> {
    pub fn new(
        connector: C,
        outputs: OutputDevices<S>,
        zones: ZoneTable,
        settings: DriverSettings,
    ) -> Self {
        Self {
            connector,
            outputs,
            zones,
            settings,
            state: ClassifierState::default(),
        }
    }

    pub fn state(&self) -> &ClassifierState {
        &self.state
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// `run` 在某次按下的保持期间被取消时，主机端会一直按着；退出前调用一次
    pub async fn release_outputs(&mut self) {
        self.outputs.release_all().await;
    }

    /// 永远不会返回
    pub async fn run(&mut self) {
        loop {
            match self.cycle().await {
                Ok(error) => warn!(%error, "touchscreen read failed, reconnecting"),
                Err(ConnectError::NotFound { scanned }) => {
                    info!(scanned, "no touchscreen found, retrying")
                }
                Err(error) => warn!(%error, "failed to open touchscreen, retrying"),
            }
            tokio::time::sleep(self.settings.reconnect_delay).await;
        }
    }

    /// 发现一次设备并一直读到出错，返回结束会话的读错误
    pub async fn cycle(&mut self) -> Result<ReadError, ConnectError> {
        let mut source = self.connector.connect().await?;
        info!(device = source.name(), "reading touch events");
        Ok(self.session(&mut source).await)
    }

    pub async fn session<T: TouchSource>(&mut self, source: &mut T) -> ReadError {
        loop {
            match source.read(self.settings.read_timeout).await {
                Ok(report) if report.is_empty() => debug!("read returned 0 bytes"),
                Ok(report) => self.handle_report(&report, Instant::now()).await,
                Err(ReadError::Timeout) => self.handle_idle(Instant::now()),
                Err(error) => return error,
            }
        }
    }

    pub async fn handle_report(&mut self, report: &[u8], now: Instant) {
        let sample = self.settings.parser.parse(report);
        trace!(?report, ?sample, "touch report");
        let event = classify(
            &mut self.state,
            &self.zones,
            &self.settings.thresholds,
            sample,
            now,
        );
        if let Some(event) = event {
            self.dispatch(event).await;
        }
    }

    /// 读超时的收尾工作
    pub fn handle_idle(&mut self, now: Instant) {
        trace!("read timed out");
        expire_stale_touch(&mut self.state, &self.settings.thresholds, now);
    }

    async fn dispatch(&mut self, event: ActivationEvent) {
        let zone = &event.zone;
        match encode_and_send(zone.action, &mut self.outputs, &self.settings.pacing).await {
            Ok(()) => info!(zone = %zone.label, action = %zone.action, "activation sent"),
            Err(error) => warn!(zone = %zone.label, action = %zone.action, %error, "activation dropped"),
        }
    }
}
