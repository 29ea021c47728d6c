//! Partitioning and publishing configuration.

use crate::encoding::EncodingKind;
use crate::error::{CoreError, CoreResult};
use catsplit_codec::{DEFAULT_LEVEL, GZIP_TRAILER_RESERVE};
use rand::Rng;
use std::time::Duration;

/// Hard upper bound on a storage object's size imposed by the hosting runtime.
pub const DEFAULT_MAX_OBJECT_SIZE: usize = 1024 * 1024;

/// Literal token documents are split on.
pub const DEFAULT_SEPARATOR: &str = "---";

/// Text placed between documents when they are written back out.
pub const DEFAULT_JOINER: &str = "\n---\n";

/// Configuration for building a partition set.
#[derive(Debug, Clone)]
pub struct PartitionConfig {
    /// Maximum size of a single storage object, metadata included.
    pub max_object_size: usize,

    /// Bytes held back from the ceiling for data only written at seal time.
    pub trailer_reserve: usize,

    /// Separator token the raw content is split on.
    pub separator: String,

    /// Text inserted between documents inside a partition.
    pub joiner: String,

    /// Payload encoding.
    pub encoding: EncodingKind,

    /// Compression level (0-9) for compressed encodings.
    pub level: u32,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            max_object_size: DEFAULT_MAX_OBJECT_SIZE,
            trailer_reserve: GZIP_TRAILER_RESERVE,
            separator: DEFAULT_SEPARATOR.to_string(),
            joiner: DEFAULT_JOINER.to_string(),
            encoding: EncodingKind::Gzip,
            level: DEFAULT_LEVEL,
        }
    }
}

impl PartitionConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum storage object size.
    #[must_use]
    pub const fn max_object_size(mut self, size: usize) -> Self {
        self.max_object_size = size;
        self
    }

    /// Sets the reserved trailer margin.
    #[must_use]
    pub const fn trailer_reserve(mut self, reserve: usize) -> Self {
        self.trailer_reserve = reserve;
        self
    }

    /// Sets the payload encoding.
    #[must_use]
    pub const fn encoding(mut self, encoding: EncodingKind) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the compression level.
    #[must_use]
    pub const fn level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Sets the separator token and the joiner used between documents.
    #[must_use]
    pub fn separator(mut self, separator: impl Into<String>, joiner: impl Into<String>) -> Self {
        self.separator = separator.into();
        self.joiner = joiner.into();
        self
    }

    /// Returns the capacity ceiling probes are compared against.
    ///
    /// The plain encoding has no trailer, so nothing is held back for it.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match self.encoding {
            EncodingKind::Gzip => self.max_object_size.saturating_sub(self.trailer_reserve),
            EncodingKind::Plain => self.max_object_size,
        }
    }

    /// Checks that the configuration can produce a valid partition set.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the separator is empty, the
    /// joiner would not split back into the same documents, the level is out
    /// of range, or the capacity is zero.
    pub fn validate(&self) -> CoreResult<()> {
        if self.separator.is_empty() {
            return Err(CoreError::invalid_config("separator must not be empty"));
        }
        if !self.joiner.contains(&self.separator) {
            return Err(CoreError::invalid_config(format!(
                "joiner {:?} does not contain separator {:?}",
                self.joiner, self.separator
            )));
        }
        if self.level > 9 {
            return Err(CoreError::invalid_config(format!(
                "compression level {} is out of range 0-9",
                self.level
            )));
        }
        if self.capacity() == 0 {
            return Err(CoreError::invalid_config(format!(
                "max object size {} leaves no room after a {} byte trailer reserve",
                self.max_object_size, self.trailer_reserve
            )));
        }
        Ok(())
    }
}

/// Configuration for retrying persistence of a single descriptor.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays.
    pub add_jitter: bool,
}

impl RetryConfig {
    /// Creates a retry configuration with the given attempt budget.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }

    /// Creates a configuration that tries exactly once.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            add_jitter: false,
        }
    }

    /// Sets the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Enables or disables jitter.
    pub fn with_jitter(mut self, add_jitter: bool) -> Self {
        self.add_jitter = add_jitter;
        self
    }

    /// Calculates the delay before a given attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let base_delay =
            self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let delay_secs = base_delay.min(self.max_delay.as_secs_f64());

        if self.add_jitter {
            // Up to 25% on top of the base delay.
            let jitter = delay_secs * 0.25 * jitter_fraction();
            Duration::from_secs_f64(delay_secs + jitter)
        } else {
            Duration::from_secs_f64(delay_secs)
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(5)
    }
}

fn jitter_fraction() -> f64 {
    rand::thread_rng().gen::<f64>()
}
