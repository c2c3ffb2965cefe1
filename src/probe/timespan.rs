// src/probe/timespan.rs
// Durations go over the wire as `[d.]hh:mm:ss[.fffffff]`, with 100ns ticks.
use serde::{Serialize, Serializer};
use std::fmt::{self, Write};
use std::time::Duration;

const NANOS_PER_TICK: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan(pub Duration);

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.0.as_secs();
        let days = total_secs / 86_400;
        let hours = (total_secs / 3_600) % 24;
        let minutes = (total_secs / 60) % 60;
        let seconds = total_secs % 60;
        let ticks = self.0.subsec_nanos() / NANOS_PER_TICK;

        if days > 0 {
            write!(f, "{}.", days)?;
        }
        write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)?;
        if ticks > 0 {
            f.write_char('.')?;
            write!(f, "{:07}", ticks)?;
        }
        Ok(())
    }
}

impl Serialize for TimeSpan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
