use std::sync::Arc;
use std::time::Duration;

use rusb::{
    ConfigDescriptor, Device, DeviceDescriptor, DeviceHandle, Direction, GlobalContext,
    TransferType,
};
use tracing::{debug, info, warn};

use super::{ConnectError, ReadError, TouchConnector, TouchSource};
use crate::config::InputConfig;

pub const HID_CLASS: u8 = 0x03;

/// 可选的 VID/PID 过滤，未设置的字段匹配任意值
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsbFilter {
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
}

impl UsbFilter {
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id.is_none_or(|id| id == vendor_id)
            && self.product_id.is_none_or(|id| id == product_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointInfo {
    pub address: u8,
    pub interrupt: bool,
    pub max_packet_size: u16,
}

impl EndpointInfo {
    pub fn is_input(&self) -> bool {
        self.address & 0x80 != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub number: u8,
    pub setting: u8,
    pub class: u8,
    pub endpoints: Vec<EndpointInfo>,
}

/// 选中的 HID 输入端点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HidEndpoint {
    pub config: u8,
    pub interface: u8,
    pub setting: u8,
    pub address: u8,
    pub max_packet_size: u16,
}

/// 按描述符顺序取第一个 HID 接口上的第一个中断 IN 端点
pub fn select_endpoint(config: u8, interfaces: &[InterfaceInfo]) -> Option<HidEndpoint> {
    interfaces
        .iter()
        .filter(|iface| iface.class == HID_CLASS)
        .find_map(|iface| {
            iface
                .endpoints
                .iter()
                .find(|ep| ep.is_input() && ep.interrupt)
                .map(|ep| HidEndpoint {
                    config,
                    interface: iface.number,
                    setting: iface.setting,
                    address: ep.address,
                    max_packet_size: ep.max_packet_size,
                })
        })
}

fn interfaces_of(config: &ConfigDescriptor) -> Vec<InterfaceInfo> {
    config
        .interfaces()
        .flat_map(|iface| iface.descriptors())
        .map(|desc| InterfaceInfo {
            number: desc.interface_number(),
            setting: desc.setting_number(),
            class: desc.class_code(),
            endpoints: desc
                .endpoint_descriptors()
                .map(|ep| EndpointInfo {
                    address: ep.address(),
                    interrupt: ep.transfer_type() == TransferType::Interrupt
                        && ep.direction() == Direction::In,
                    max_packet_size: ep.max_packet_size(),
                })
                .collect(),
        })
        .collect()
}

/// 已经认领接口的 USB 触摸屏
pub struct UsbTouchscreen {
    name: String,
    handle: Arc<DeviceHandle<GlobalContext>>,
    endpoint: u8,
    packet_size: usize,
}

impl TouchSource for UsbTouchscreen {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&mut self, timeout: Duration) -> Result<Vec<u8>, ReadError> {
        let handle = Arc::clone(&self.handle);
        let endpoint = self.endpoint;
        let mut buf = vec![0u8; self.packet_size];
        let (mut buf, result) = tokio::task::spawn_blocking(move || {
            let result = handle.read_interrupt(endpoint, &mut buf, timeout);
            (buf, result)
        })
        .await?;
        match result {
            Ok(len) => {
                buf.truncate(len);
                Ok(buf)
            }
            Err(rusb::Error::Timeout) => Err(ReadError::Timeout),
            Err(error) => Err(error.into()),
        }
    }
}

fn open(
    device: &Device<GlobalContext>,
    descriptor: &DeviceDescriptor,
    endpoint: HidEndpoint,
    fallback_packet_size: usize,
) -> Result<UsbTouchscreen, rusb::Error> {
    let mut handle = device.open()?;
    let name = handle
        .read_product_string_ascii(descriptor)
        .unwrap_or_else(|_| {
            format!(
                "{:04x}:{:04x}",
                descriptor.vendor_id(),
                descriptor.product_id()
            )
        });

    // 非 Linux 平台不支持，忽略即可
    if let Err(error) = handle.set_auto_detach_kernel_driver(true) {
        debug!(%error, "kernel driver auto-detach unavailable");
    }
    if handle.active_configuration().ok() != Some(endpoint.config) {
        if let Err(error) = handle.set_active_configuration(endpoint.config) {
            warn!(%error, config = endpoint.config, "failed to set configuration");
        }
    }
    handle.claim_interface(endpoint.interface)?;
    if endpoint.setting != 0 {
        handle.set_alternate_setting(endpoint.interface, endpoint.setting)?;
    }

    let packet_size = match endpoint.max_packet_size {
        0 => fallback_packet_size,
        size => usize::from(size),
    };
    info!(
        device = %name,
        interface = endpoint.interface,
        endpoint = format_args!("{:#04x}", endpoint.address),
        packet_size,
        "touchscreen opened"
    );
    Ok(UsbTouchscreen {
        name,
        handle: Arc::new(handle),
        endpoint: endpoint.address,
        packet_size,
    })
}

fn discover(filter: UsbFilter, fallback_packet_size: usize) -> Result<UsbTouchscreen, ConnectError> {
    let devices = rusb::devices()?;
    let mut scanned = 0;
    for device in devices.iter() {
        scanned += 1;
        let descriptor = match device.device_descriptor() {
            Ok(descriptor) => descriptor,
            Err(error) => {
                debug!(%error, "skipping device without descriptor");
                continue;
            }
        };
        let (vendor_id, product_id) = (descriptor.vendor_id(), descriptor.product_id());
        debug!(
            vendor_id = format_args!("{vendor_id:04x}"),
            product_id = format_args!("{product_id:04x}"),
            "checking usb device"
        );
        if !filter.matches(vendor_id, product_id) {
            continue;
        }
        let config = match device.config_descriptor(0) {
            Ok(config) => config,
            Err(error) => {
                debug!(%error, "failed to read configuration descriptor");
                continue;
            }
        };
        let Some(endpoint) = select_endpoint(config.number(), &interfaces_of(&config)) else {
            continue;
        };
        match open(&device, &descriptor, endpoint, fallback_packet_size) {
            Ok(touchscreen) => return Ok(touchscreen),
            Err(error) => warn!(
                vendor_id = format_args!("{vendor_id:04x}"),
                product_id = format_args!("{product_id:04x}"),
                %error,
                "failed to open hid device"
            ),
        }
    }
    Err(ConnectError::NotFound { scanned })
}

/// 扫描 USB 总线，打开第一个匹配过滤条件、带中断 IN 端点的 HID 设备
#[derive(Debug, Clone)]
pub struct UsbConnector {
    filter: UsbFilter,
    packet_size: usize,
}

impl UsbConnector {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            filter: UsbFilter {
                vendor_id: config.vendor_id,
                product_id: config.product_id,
            },
            packet_size: config.packet_size,
        }
    }
}

impl TouchConnector for UsbConnector {
    type Source = UsbTouchscreen;

    async fn connect(&mut self) -> Result<UsbTouchscreen, ConnectError> {
        let filter = self.filter;
        let packet_size = self.packet_size;
        tokio::task::spawn_blocking(move || discover(filter, packet_size)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(address: u8, interrupt: bool) -> EndpointInfo {
        EndpointInfo {
            address,
            interrupt,
            max_packet_size: 8,
        }
    }

    fn interface(number: u8, class: u8, endpoints: Vec<EndpointInfo>) -> InterfaceInfo {
        InterfaceInfo {
            number,
            setting: 0,
            class,
            endpoints,
        }
    }

    #[test]
    fn picks_first_interrupt_in_endpoint_of_hid_interface() {
        let interfaces = vec![
            interface(0, 0x08, vec![endpoint(0x81, true)]),
            interface(1, HID_CLASS, vec![endpoint(0x02, true), endpoint(0x83, true)]),
            interface(2, HID_CLASS, vec![endpoint(0x84, true)]),
        ];
        let selected = select_endpoint(1, &interfaces).unwrap();
        assert_eq!(selected.interface, 1);
        assert_eq!(selected.address, 0x83);
        assert_eq!(selected.config, 1);
    }

    #[test]
    fn skips_hid_interfaces_without_interrupt_input() {
        let interfaces = vec![
            interface(0, HID_CLASS, vec![endpoint(0x81, false)]),
            interface(1, HID_CLASS, vec![]),
        ];
        assert_eq!(select_endpoint(1, &interfaces), None);
    }

    #[test]
    fn filter_matches_unset_fields() {
        let any = UsbFilter::default();
        assert!(any.matches(0x0EEF, 0x0001));
        let vendor = UsbFilter {
            vendor_id: Some(0x0EEF),
            product_id: None,
        };
        assert!(vendor.matches(0x0EEF, 0x1234));
        assert!(!vendor.matches(0x046D, 0x1234));
        let exact = UsbFilter {
            vendor_id: Some(0x0EEF),
            product_id: Some(0x0001),
        };
        assert!(!exact.matches(0x0EEF, 0x0002));
    }
}
