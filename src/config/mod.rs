//! `touchkeyd` 的 TOML 配置
//!
//! 所有字段都有默认值，空文件等同于内置默认配置。

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event_dispatcher::Pacing;
use crate::event_router::Thresholds;
use crate::statement::Scaling;
use crate::zone_map::{Layout, Zone, ZoneError, ZoneTable};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/touchkeyd/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid zone table")]
    Zones(#[from] ZoneError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// 没有 `-v` 时使用的日志级别
    pub log_level: Option<String>,
    pub input: InputConfig,
    pub scaling: Scaling,
    pub timing: TimingConfig,
    pub output: OutputConfig,
    pub layout: Layout,
    pub zones: Vec<Zone>,
}

impl Config {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// 显式指定的路径必须存在；默认路径不存在时退回内置配置
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::load(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// `[[zones]]` 为空时使用 `layout` 指定的内置布局
    pub fn zone_table(&self) -> Result<ZoneTable, ConfigError> {
        if self.zones.is_empty() {
            return Ok(self.layout.table());
        }
        Ok(ZoneTable::new(self.zones.clone())?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
    pub read_timeout_ms: u64,
    pub reconnect_delay_ms: u64,
    /// 端点没有给出 max packet size 时的缓冲区大小
    pub packet_size: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            vendor_id: None,
            product_id: None,
            read_timeout_ms: 100,
            reconnect_delay_ms: 2000,
            packet_size: 8,
        }
    }
}

impl InputConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub debounce_ms: u64,
    pub repeat_delay_ms: u64,
    pub media_debounce_ms: u64,
    pub release_timeout_ms: Option<u64>,
    pub key_hold_ms: u64,
    pub key_settle_ms: u64,
    pub media_hold_ms: u64,
    pub media_settle_ms: u64,
    pub joystick_hold_ms: u64,
    pub joystick_settle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            repeat_delay_ms: 500,
            media_debounce_ms: 500,
            release_timeout_ms: None,
            key_hold_ms: 50,
            key_settle_ms: 0,
            media_hold_ms: 100,
            media_settle_ms: 50,
            joystick_hold_ms: 50,
            joystick_settle_ms: 10,
        }
    }
}

impl TimingConfig {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            debounce_window: Duration::from_millis(self.debounce_ms),
            repeat_delay: Duration::from_millis(self.repeat_delay_ms),
            media_debounce: Duration::from_millis(self.media_debounce_ms),
            release_timeout: self.release_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            key_hold: Duration::from_millis(self.key_hold_ms),
            key_settle: Duration::from_millis(self.key_settle_ms),
            media_hold: Duration::from_millis(self.media_hold_ms),
            media_settle: Duration::from_millis(self.media_settle_ms),
            joystick_hold: Duration::from_millis(self.joystick_hold_ms),
            joystick_settle: Duration::from_millis(self.joystick_settle_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GadgetConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub path: PathBuf,
}

fn enabled_by_default() -> bool {
    true
}

impl GadgetConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub keyboard: GadgetConfig,
    pub consumer: GadgetConfig,
    pub joystick: GadgetConfig,
    pub joystick_keyboard_fallback: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            keyboard: GadgetConfig::new("/dev/hidg0"),
            consumer: GadgetConfig::new("/dev/hidg1"),
            joystick: GadgetConfig::new("/dev/hidg2"),
            joystick_keyboard_fallback: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::ScalingMode;
    use crate::zone_map::{Action, MediaUsage, Rect};

    fn parse(text: &str) -> Config {
        Config::from_toml(text, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn empty_file_is_the_default_config() {
        let config = parse("");
        assert_eq!(config, Config::default());
        assert_eq!(config.timing.thresholds(), Thresholds::default());
        assert_eq!(config.timing.pacing(), Pacing::default());
        assert_eq!(config.zone_table().unwrap(), Layout::Keyboard.table());
    }

    #[test]
    fn reads_all_sections() {
        let config = parse(
            r#"
            log_level = "debug"
            layout = "joystick"

            [input]
            vendor_id = 0x0eef
            product_id = 0x0001
            read_timeout_ms = 1000

            [scaling]
            mode = "passthrough"

            [timing]
            repeat_delay_ms = 250
            release_timeout_ms = 100

            [output]
            joystick_keyboard_fallback = true

            [output.consumer]
            enabled = false
            path = "/dev/hidg5"
            "#,
        );
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.input.vendor_id, Some(0x0EEF));
        assert_eq!(config.input.read_timeout(), Duration::from_secs(1));
        assert_eq!(config.input.reconnect_delay(), Duration::from_secs(2));
        assert_eq!(config.scaling.mode, ScalingMode::Passthrough);
        assert_eq!(config.scaling.logical_width, 3800);
        let thresholds = config.timing.thresholds();
        assert_eq!(thresholds.repeat_delay, Duration::from_millis(250));
        assert_eq!(thresholds.release_timeout, Some(Duration::from_millis(100)));
        assert!(!config.output.consumer.enabled);
        assert_eq!(config.output.keyboard.path, PathBuf::from("/dev/hidg0"));
        assert!(config.output.joystick_keyboard_fallback);
        assert_eq!(config.zone_table().unwrap(), Layout::Joystick.table());
    }

    #[test]
    fn custom_zones_are_validated() {
        let mut text = String::new();
        for index in 0..16u16 {
            let x1 = index * 100;
            text.push_str(&format!(
                "[[zones]]\nrect = [{x1}, 0, {}, 100]\naction = {{ key = {} }}\n",
                x1 + 100,
                4 + index
            ));
        }
        let table = parse(&text).zone_table().unwrap();
        assert_eq!(table.zones()[0].rect, Rect::new(0, 0, 100, 100));
        assert_eq!(table.find(1550, 50).unwrap().action, Action::Key(19));

        let text = "[[zones]]\nrect = [0, 0, 10, 10]\naction = { media = \"play_pause\" }\n";
        let config = parse(text);
        assert_eq!(config.zones[0].action, Action::MediaKey(MediaUsage::PlayPause));
        assert!(matches!(
            config.zone_table(),
            Err(ConfigError::Zones(ZoneError::Count(1)))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml("[timing]\nrepeat_ms = 1\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_or_default(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"[input]\npacket_size = 64\n").unwrap();
        let config = Config::load_or_default(Some(file.path())).unwrap();
        assert_eq!(config.input.packet_size, 64);
    }
}
