use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use super::{DeviceKind, OutputDevices, ReportSink};

pub type ReportLog = Arc<Mutex<Vec<(Duration, Vec<u8>)>>>;

/// 记录每份报告及其相对创建时刻的发送时间
#[derive(Clone)]
pub struct RecordingSink {
    start: Instant,
    log: ReportLog,
}

impl ReportSink for RecordingSink {
    async fn send_report(&mut self, report: &[u8]) -> io::Result<()> {
        self.log
            .lock()
            .unwrap()
            .push((self.start.elapsed(), report.to_vec()));
        Ok(())
    }
}

pub const ALL_DEVICES: &[DeviceKind] = &[
    DeviceKind::Keyboard,
    DeviceKind::Consumer,
    DeviceKind::Joystick,
];

/// 所有设备共享同一份日志
pub fn recording_outputs(kinds: &[DeviceKind]) -> (OutputDevices<RecordingSink>, ReportLog) {
    let log = ReportLog::default();
    let sink = RecordingSink {
        start: Instant::now(),
        log: log.clone(),
    };
    let mut outputs = OutputDevices::default();
    for kind in kinds {
        match kind {
            DeviceKind::Keyboard => outputs.keyboard = Some(sink.clone()),
            DeviceKind::Consumer => outputs.consumer = Some(sink.clone()),
            DeviceKind::Joystick => outputs.joystick = Some(sink.clone()),
        }
    }
    (outputs, log)
}

pub fn sent(log: &ReportLog) -> Vec<Vec<u8>> {
    log.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
}
