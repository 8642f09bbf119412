/*!
 * Pid Table Configuration
 *
 * Runtime configuration for the identifier space and record memory.
 * Defaults come from `core::limits`; `from_env` overrides them from
 * `KERNEL_PROCS_MAX`, `KERNEL_PID_MIN`, `KERNEL_PID_MAX` and
 * `KERNEL_PID_HEAP_BYTES`.
 */

use crate::core::limits::{BOOTUP_PID, PID_MAX, PID_MAX_LIMIT, PID_MIN, PID_SCAN_SLACK, PROCS_MAX};
use crate::core::types::Pid;
use crate::memory::MemoryError;
use miette::Diagnostic;
use std::env::VarError;
use std::str::FromStr;
use thiserror::Error;

/// Configuration and bootstrap errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Capacity {0} is too small, need at least 2 slots")]
    #[diagnostic(
        code(config::capacity_too_small),
        help("One slot always belongs to the boot thread.")
    )]
    CapacityTooSmall(usize),

    #[error("Invalid pid range {min}..={max}")]
    #[diagnostic(
        code(config::invalid_range),
        help("PID_MIN must exceed the boot pid and PID_MAX must be at least PID_MIN and fit in a pid_t.")
    )]
    InvalidRange { min: Pid, max: Pid },

    #[error("Pid range of width {width} cannot cover {capacity} slots")]
    #[diagnostic(
        code(config::range_too_narrow),
        help("Every slot must be reachable by some identifier in the range.")
    )]
    RangeTooNarrow { width: usize, capacity: usize },

    #[error("Invalid value {value:?} for {var}")]
    #[diagnostic(code(config::invalid_env))]
    InvalidEnv { var: &'static str, value: String },

    #[error("Could not allocate the boot record: {0}")]
    #[diagnostic(
        code(config::bootstrap_allocation),
        help("The heap budget must hold at least the boot record.")
    )]
    BootstrapAllocation(MemoryError),

    #[error("Pid table already bootstrapped")]
    #[diagnostic(code(config::already_bootstrapped))]
    AlreadyBootstrapped,

    #[error("Boot thread already bound for this table")]
    #[diagnostic(
        code(config::boot_thread_bound),
        help("Only one host thread may carry the boot identity.")
    )]
    BootThreadBound,
}

/// Pid table configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PidTableConfig {
    /// Number of slots; identifier `p` lives in slot `p % capacity`
    pub capacity: usize,
    /// Lowest allocatable identifier
    pub pid_min: Pid,
    /// Highest allocatable identifier
    pub pid_max: Pid,
    /// Byte budget for record memory, `None` for unbounded
    pub heap_bytes: Option<usize>,
}

impl Default for PidTableConfig {
    fn default() -> Self {
        Self {
            capacity: PROCS_MAX,
            pid_min: PID_MIN,
            pid_max: PID_MAX,
            heap_bytes: None,
        }
    }
}

impl PidTableConfig {
    #[inline]
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_pid_range(mut self, pid_min: Pid, pid_max: Pid) -> Self {
        self.pid_min = pid_min;
        self.pid_max = pid_max;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_heap_bytes(mut self, bytes: usize) -> Self {
        self.heap_bytes = Some(bytes);
        self
    }

    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            capacity: env_var("KERNEL_PROCS_MAX")?.unwrap_or(defaults.capacity),
            pid_min: env_var("KERNEL_PID_MIN")?.unwrap_or(defaults.pid_min),
            pid_max: env_var("KERNEL_PID_MAX")?.unwrap_or(defaults.pid_max),
            heap_bytes: env_var("KERNEL_PID_HEAP_BYTES")?.or(defaults.heap_bytes),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity < 2 {
            return Err(ConfigError::CapacityTooSmall(self.capacity));
        }
        if self.pid_min <= BOOTUP_PID || self.pid_max < self.pid_min || self.pid_max > PID_MAX_LIMIT
        {
            return Err(ConfigError::InvalidRange {
                min: self.pid_min,
                max: self.pid_max,
            });
        }
        let width = self.range_width();
        if width < self.capacity {
            return Err(ConfigError::RangeTooNarrow {
                width,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Whether `pid` lies in the allocatable range
    #[inline]
    pub fn contains(&self, pid: Pid) -> bool {
        (self.pid_min..=self.pid_max).contains(&pid)
    }

    /// Next candidate after `pid`, wrapping PID_MAX back to PID_MIN
    #[inline]
    pub(crate) fn successor(&self, pid: Pid) -> Pid {
        if pid >= self.pid_max {
            self.pid_min
        } else {
            pid + 1
        }
    }

    /// Upper bound on candidates the allocation scan may skip
    #[inline]
    pub(crate) fn scan_limit(&self) -> usize {
        self.capacity * 2 + PID_SCAN_SLACK
    }

    #[inline]
    fn range_width(&self) -> usize {
        (self.pid_max - self.pid_min) as usize + 1
    }
}

fn env_var<T: FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => Err(ConfigError::InvalidEnv {
            var,
            value: raw.to_string_lossy().into_owned(),
        }),
    }
}
