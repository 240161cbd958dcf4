pub mod attendance;
pub mod calendar_mode;
pub mod owner;
pub mod worker;

pub use attendance::{AttendanceRecord, HalfShift, JoinedRecord};
pub use calendar_mode::CalendarMode;
pub use owner::Owner;
pub use worker::Worker;
