pub mod change_detector;
pub mod monitor;
pub mod report;

pub use change_detector::{ChangeDetector, ChangeReason};
pub use monitor::{ChannelObserver, Monitor, MonitorConfig, MonitorEvent, StatusObserver};
pub use report::format_status_report;
