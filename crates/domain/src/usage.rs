pub const USAGE_LIMIT: u32 = 10;
pub const USAGE_COUNT_KEY: &str = "accidentReportAppUsageCount";

/// Number of reports generated on this device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UsageCounter(u32);

impl UsageCounter {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Reads a stored value the lenient way: leading digits are taken, and a
    /// missing, empty or non-numeric value counts as zero.
    pub fn parse_stored(stored: Option<&str>) -> Self {
        let Some(text) = stored else {
            return Self::default();
        };
        let digits: String = text
            .trim_start()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        if digits.is_empty() {
            return Self::default();
        }
        Self(digits.parse::<u32>().unwrap_or(u32::MAX))
    }

    pub fn to_stored(self) -> String {
        self.0.to_string()
    }

    pub fn can_proceed(self) -> bool {
        self.0 < USAGE_LIMIT
    }

    pub fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub fn remaining(self) -> u32 {
        USAGE_LIMIT.saturating_sub(self.0)
    }
}
