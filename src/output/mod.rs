pub mod format;
pub mod thread;

pub use format::{excerpt, format_relative_time, format_timestamp, status_label};
pub use thread::render_thread;
