use chrono::{Local, Utc};
use crashlens_application::Clock;

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn file_timestamp(&self) -> String {
        Local::now().format("%Y%m%d-%H%M%S").to_string()
    }
}
