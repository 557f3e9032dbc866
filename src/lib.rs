
/// 配置文件的加载和校验
pub mod config;

/// 触摸采样和区域激活事件的模型
pub mod event_model;

/// 触摸屏原始报告的解析，以及诊断用的几种字段解读
pub mod statement;

/// 4x4 区域表和坐标查找
pub mod zone_map;

/// 去抖、自动重复和媒体键防误触的判定逻辑
pub mod event_router;

/// 区域动作编码成 HID 报告，写到 USB gadget
pub mod event_dispatcher;

/// 触摸屏的输入接口（目前只有 USB 主机读取）
pub mod input_devices;

/// 把上面的东西串起来的轮询循环
pub mod touch_driver;

// 数据流向：
// `input_devices` 读出原始报告 -> `statement` 解析成 `TouchSample`
// -> `event_router` 结合 `zone_map` 判定是否激活 -> `event_dispatcher` 发出按下/松开报告
// 整条链路都跑在 `touch_driver` 的一个任务里，发送报告时的 hold/settle 会直接阻塞下一次读取，
// 这和设备上原来的行为一致，判定逻辑里的时间阈值也是按这个节奏调出来的

// HACK: 有些触摸控制器上报的是 12 位原始坐标，有些已经缩放到了 0..3800，
// `ScalingMode::Auto` 只在坐标越界时换算，两种编码混在一起的设备会在边缘附近跳一下

// gadget 本身（configfs 下的 functions/hid.usbN）需要提前建好，
// `touchkeyd descriptor` 可以输出写进 `report_desc` 的字节
