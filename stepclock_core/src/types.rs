//! Shared value types for motion commands and wall-clock input.

/// Speed profile for a single move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSpeed {
    /// 5x the base phase hold for the whole move; used for the final homing
    /// approach where repeatability matters more than speed.
    Slow,
    /// Base hold with acceleration/deceleration shaping at the move ends.
    Auto,
    /// Base hold throughout.
    Fast,
}

/// A signed move: sign selects direction, magnitude the number of phase
/// advances. Produced and consumed within a single motion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCommand {
    pub steps: i32,
    pub speed: StepSpeed,
}

impl StepCommand {
    #[inline]
    pub fn new(steps: i32, speed: StepSpeed) -> Self {
        Self { steps, speed }
    }

    /// Shorthand for the mapper's speed class.
    #[inline]
    pub fn auto(steps: i32) -> Self {
        Self::new(steps, StepSpeed::Auto)
    }
}

/// Wall-clock reading, hour and minute only. The time source (RTC, NTP, OS
/// clock) lives outside this crate; values are assumed valid per the caller
/// contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    /// Hour of day, 0..=23.
    pub hour: u8,
    /// Minute, 0..=59.
    pub minute: u8,
}

impl WallTime {
    #[inline]
    pub fn new(hour: u8, minute: u8) -> Self {
        debug_assert!(hour < 24 && minute < 60);
        Self { hour, minute }
    }

    /// Minutes elapsed since the most recent 12:00, in 0..=719.
    #[inline]
    pub fn minutes_since_noon(self) -> i32 {
        i32::from(self.hour % 12) * crate::config::MINUTES_PER_HOUR + i32::from(self.minute)
    }
}
