pub mod attendance;
pub mod backup;
pub mod calendar;
pub mod drilldown;
pub mod journal;
pub mod notify;
pub mod period;
pub mod report;
pub mod snapshot;
