use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Calendar used to bucket records into billing periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CalendarMode {
    Solar,
    Lunar,
}

impl CalendarMode {
    pub fn from_lunar_flag(lunar: bool) -> Self {
        if lunar {
            CalendarMode::Lunar
        } else {
            CalendarMode::Solar
        }
    }
}
