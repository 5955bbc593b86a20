pub mod log_panel;
pub mod pager;

pub use log_panel::show_log_panel;
pub use pager::PagerView;
