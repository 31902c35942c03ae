//! Sampler run parameters.
//!
//! The sampling procedure is deliberately fixed: the tools take no flags
//! and read no environment, so two runs on the same host are comparable.
//! `SamplerConfig::new()` is the shipped schedule; the builder methods
//! exist so tests can shrink the run.

use std::time::Duration;

use crate::pressure::DEFAULT_PRESSURE_BYTES;

/// Child-lifecycle action scheduled for a sampling round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildEvent {
    /// Fork the first pressure child.
    StartFirst,
    /// Fork the second pressure child.
    StartSecond,
    /// Kill and reap the first child.
    StopFirst,
    /// Kill and reap the second child.
    StopSecond,
}

/// Fixed parameters for one sampler run.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Sampling rounds after the warm-up phase
    pub rounds: u32,
    /// Delay after each round's stats line
    pub round_interval: Duration,
    /// Settling delay after the cache drop and each idle-bitmap step
    pub settle: Duration,
    /// Round on which the first pressure child starts
    pub first_start: u32,
    /// Round on which the second pressure child starts
    pub second_start: u32,
    /// Round on which the first child is stopped and reaped
    pub first_stop: u32,
    /// Round on which the second child is stopped and reaped
    pub second_stop: u32,
    /// Bytes each pressure child allocates
    pub pressure_bytes: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplerConfig {
    /// The shipped schedule: a hundred half-second rounds with two 1 GiB
    /// children phased through the middle of the run.
    pub fn new() -> Self {
        Self {
            rounds: 100,
            round_interval: Duration::from_millis(500),
            settle: Duration::from_secs(1),
            first_start: 10,
            second_start: 30,
            first_stop: 50,
            second_stop: 70,
            pressure_bytes: DEFAULT_PRESSURE_BYTES,
        }
    }

    // Builder methods

    pub fn rounds(mut self, n: u32) -> Self {
        self.rounds = n;
        self
    }

    pub fn round_interval(mut self, d: Duration) -> Self {
        self.round_interval = d;
        self
    }

    pub fn settle(mut self, d: Duration) -> Self {
        self.settle = d;
        self
    }

    pub fn pressure_bytes(mut self, bytes: usize) -> Self {
        self.pressure_bytes = bytes;
        self
    }

    pub fn schedule(mut self, starts: (u32, u32), stops: (u32, u32)) -> Self {
        self.first_start = starts.0;
        self.second_start = starts.1;
        self.first_stop = stops.0;
        self.second_stop = stops.1;
        self
    }

    /// The child-lifecycle action due on `round`, if any.
    pub fn event_at(&self, round: u32) -> Option<ChildEvent> {
        if round == self.first_start {
            Some(ChildEvent::StartFirst)
        } else if round == self.second_start {
            Some(ChildEvent::StartSecond)
        } else if round == self.first_stop {
            Some(ChildEvent::StopFirst)
        } else if round == self.second_stop {
            Some(ChildEvent::StopSecond)
        } else {
            None
        }
    }

    /// Validate the schedule and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rounds == 0 {
            return Err(ConfigError::InvalidValue("rounds must be > 0"));
        }
        if self.pressure_bytes == 0 {
            return Err(ConfigError::InvalidValue("pressure_bytes must be > 0"));
        }
        if self.first_start >= self.first_stop {
            return Err(ConfigError::InvalidValue(
                "first child must start before it stops",
            ));
        }
        if self.second_start >= self.second_stop {
            return Err(ConfigError::InvalidValue(
                "second child must start before it stops",
            ));
        }
        if self.first_stop > self.rounds || self.second_stop > self.rounds {
            return Err(ConfigError::InvalidValue(
                "child schedule runs past the last round",
            ));
        }
        // One event per round, or event_at cannot dispatch them all.
        let events = [
            self.first_start,
            self.second_start,
            self.first_stop,
            self.second_stop,
        ];
        for (i, a) in events.iter().enumerate() {
            if events[i + 1..].contains(a) {
                return Err(ConfigError::InvalidValue(
                    "child schedule rounds must be distinct",
                ));
            }
        }
        Ok(())
    }
}

/// Configuration error
#[derive(Debug, Clone)]
pub enum ConfigError {
    InvalidValue(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_schedule() {
        let config = SamplerConfig::new();
        assert_eq!(config.rounds, 100);
        assert_eq!(config.event_at(10), Some(ChildEvent::StartFirst));
        assert_eq!(config.event_at(30), Some(ChildEvent::StartSecond));
        assert_eq!(config.event_at(50), Some(ChildEvent::StopFirst));
        assert_eq!(config.event_at(70), Some(ChildEvent::StopSecond));
        for round in [1, 9, 11, 29, 49, 69, 71, 100] {
            assert_eq!(config.event_at(round), None, "round {}", round);
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SamplerConfig::new()
            .rounds(10)
            .round_interval(Duration::from_millis(1))
            .schedule((1, 3), (5, 7))
            .pressure_bytes(1 << 20);

        assert_eq!(config.rounds, 10);
        assert_eq!(config.event_at(3), Some(ChildEvent::StartSecond));
        assert_eq!(config.pressure_bytes, 1 << 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = SamplerConfig::new().rounds(0);
        assert!(config.validate().is_err());

        // Stop before start.
        let config = SamplerConfig::new().schedule((10, 30), (5, 70));
        assert!(config.validate().is_err());

        // Schedule past the end of the run.
        let config = SamplerConfig::new().rounds(60);
        assert!(config.validate().is_err());

        // Colliding rounds.
        let config = SamplerConfig::new().schedule((10, 10), (50, 70));
        assert!(config.validate().is_err());
    }
}
