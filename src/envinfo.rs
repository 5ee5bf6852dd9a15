//! Environment-variable helpers and the process capability probe.
//!
//! Capability facts are probed once into an explicit [`Capabilities`]
//! struct rather than scattered function-local statics; [`capabilities`]
//! memoizes one probe for the process, and the struct stays directly
//! constructible for tests.

use std::env;

use once_cell::sync::Lazy;
use serde::Serialize;

/// The variable's value, or `default` when it is unset or not unicode.
pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// True when the variable holds a truthy value: `1`, `true`, `yes`, or
/// `on`, case-insensitively.
pub fn env_flag(key: &str) -> bool {
    match env::var(key) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => false,
    }
}

/// Stable facts about the running process, probed once at first use.
#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    /// Operating system name, e.g. `"linux"`.
    pub os: &'static str,
    /// Target architecture, e.g. `"x86_64"`.
    pub arch: &'static str,
    /// Pointer width in bits.
    pub pointer_width: u32,
    /// Whether a CI environment is indicated (`CI` truthy).
    pub ci: bool,
    /// Available parallelism as reported by the OS, at least 1.
    pub parallelism: usize,
}

static CAPABILITIES: Lazy<Capabilities> = Lazy::new(Capabilities::detect);

/// The process-wide memoized [`Capabilities`].
pub fn capabilities() -> &'static Capabilities {
    &CAPABILITIES
}

impl Capabilities {
    /// Probes the environment directly, bypassing the memoized instance.
    pub fn detect() -> Self {
        Capabilities {
            os: env::consts::OS,
            arch: env::consts::ARCH,
            pointer_width: usize::BITS,
            ci: env_flag("CI"),
            parallelism: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back() {
        assert_eq!(env_or("SUNDRY_TEST_UNSET_VAR", "fallback"), "fallback");
    }

    #[test]
    fn test_env_flag_truthy_values() {
        // SAFETY: test-local variable names, no concurrent reader cares.
        unsafe {
            env::set_var("SUNDRY_TEST_FLAG_ON", "Yes");
            env::set_var("SUNDRY_TEST_FLAG_OFF", "0");
        }
        assert!(env_flag("SUNDRY_TEST_FLAG_ON"));
        assert!(!env_flag("SUNDRY_TEST_FLAG_OFF"));
        assert!(!env_flag("SUNDRY_TEST_FLAG_UNSET"));
    }

    #[test]
    fn test_detect_reports_sane_values() {
        let caps = Capabilities::detect();
        assert!(!caps.os.is_empty());
        assert!(!caps.arch.is_empty());
        assert!(caps.pointer_width == 32 || caps.pointer_width == 64);
        assert!(caps.parallelism >= 1);

        // The memoized accessor hands out the same probe every time.
        let first = capabilities();
        let second = capabilities();
        assert!(std::ptr::eq(first, second));
    }
}
