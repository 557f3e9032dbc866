use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::time::Instant;
use tracing::{Level, info, warn};

use touchkeyd::config::Config;
use touchkeyd::event_dispatcher::descriptor::GadgetFunction;
use touchkeyd::event_dispatcher::gadget::open_outputs;
use touchkeyd::event_dispatcher::{DeviceKind, encode_and_send};
use touchkeyd::input_devices::{ReadError, TouchSource, UsbConnector, connect_retrying};
use touchkeyd::statement::diagnostic::{Interpretations, Throttle};
use touchkeyd::touch_driver::{DriverSettings, TouchDriver};

/// probe-output 两个动作之间的间隔
const PROBE_INTERVAL: Duration = Duration::from_millis(500);

/// 触摸屏区域到 USB HID gadget 的桥接
#[derive(Parser)]
#[command(name = "touchkeyd", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// 配置文件，不指定时尝试 /etc/touchkeyd/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 提高日志级别，可重复
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// 只输出警告和错误
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Default)]
enum Command {
    /// 读取触摸屏并发送 HID 报告（默认）
    #[default]
    Run,
    /// 打印当前生效的区域表
    Zones,
    /// 输出某个 gadget function 的报告描述符
    Descriptor {
        device: DeviceKind,
        /// 以十六进制文本输出，而不是原始字节
        #[arg(long)]
        hex: bool,
        /// 同时输出 protocol/subclass/report_length
        #[arg(long)]
        info: bool,
    },
    /// 打印触摸屏原始报告的几种解读，用于确认坐标字段
    Diagnose,
    /// 把区域表里的每个动作发送一次，检查主机能否收到
    ProbeOutput,
}

fn log_level(cli: &Cli, config: &Config) -> Result<Level> {
    if cli.quiet {
        return Ok(Level::WARN);
    }
    Ok(match cli.verbose {
        0 => match &config.log_level {
            Some(level) => level
                .parse()
                .with_context(|| format!("invalid log_level {level:?}"))?,
            None => Level::INFO,
        },
        1 => Level::DEBUG,
        _ => Level::TRACE,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref())?;
    tracing_subscriber::fmt()
        .with_max_level(log_level(&cli, &config)?)
        .init();

    match cli.command.unwrap_or_default() {
        Command::Run => run(&config).await,
        Command::Zones => zones(&config),
        Command::Descriptor { device, hex, info } => descriptor(device, hex, info),
        Command::Diagnose => diagnose(&config).await,
        Command::ProbeOutput => probe_output(&config).await,
    }
}

async fn run(config: &Config) -> Result<()> {
    let zones = config.zone_table()?;
    let outputs = open_outputs(&config.output).await;
    let connector = UsbConnector::new(&config.input);
    let mut driver = TouchDriver::new(connector, outputs, zones, DriverSettings::from(config));

    let signal = tokio::select! {
        _ = driver.run() => Ok(()),
        signal = tokio::signal::ctrl_c() => signal,
    };
    info!("shutting down");
    driver.release_outputs().await;
    signal.context("failed to listen for ctrl-c")
}

fn zones(config: &Config) -> Result<()> {
    let table = config.zone_table()?;
    for (index, zone) in table.iter().enumerate() {
        println!("{index:>2}  {zone}");
    }
    Ok(())
}

fn descriptor(device: DeviceKind, hex: bool, info: bool) -> Result<()> {
    let function = GadgetFunction::of(device);
    if info {
        eprintln!(
            "{}: protocol={} subclass={} report_length={}",
            function.kind, function.protocol, function.subclass, function.report_length
        );
    }
    if hex {
        let text: Vec<String> = function
            .report_desc
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        println!("{}", text.join(" "));
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(function.report_desc)?;
        stdout.flush()?;
    }
    Ok(())
}

async fn diagnose(config: &Config) -> Result<()> {
    let mut connector = UsbConnector::new(&config.input);
    let read_timeout = config.input.read_timeout();
    loop {
        let mut source = connect_retrying(&mut connector, config.input.reconnect_delay()).await;
        info!(device = source.name(), "touch the screen to see raw reports");

        let mut throttle = Throttle::default();
        let error = loop {
            match source.read(read_timeout).await {
                Ok(report) => {
                    let Some(view) = Interpretations::of(&report) else {
                        continue;
                    };
                    if throttle.should_log(view.touched, Instant::now()) {
                        info!("{view}");
                    }
                }
                Err(ReadError::Timeout) => {}
                Err(error) => break error,
            }
        };
        warn!(%error, "touchscreen read failed, reconnecting");
        tokio::time::sleep(config.input.reconnect_delay()).await;
    }
}

async fn probe_output(config: &Config) -> Result<()> {
    let table = config.zone_table()?;
    let mut outputs = open_outputs(&config.output).await;
    let pacing = config.timing.pacing();
    for zone in table.iter() {
        match encode_and_send(zone.action, &mut outputs, &pacing).await {
            Ok(()) => info!(zone = %zone.label, action = %zone.action, "sent"),
            Err(error) => warn!(zone = %zone.label, action = %zone.action, %error, "failed"),
        }
        tokio::time::sleep(PROBE_INTERVAL).await;
    }
    Ok(())
}
