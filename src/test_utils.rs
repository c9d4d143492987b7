//! Environment helpers for the CLI and config tests
//!
//! clap reads `AWS_ACCOUNT`, `BOT_TOKEN` and `CHANNEL_ID` as flag fallbacks,
//! so any test that parses arguments holds [`ENV_MUTEX`] and changes those
//! variables only through an [`EnvVarGuard`].

use std::env;
use std::sync::Mutex;

/// Serializes tests that modify environment variables
pub static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// RAII guard for environment variable manipulation in tests
///
/// Restores every touched variable on drop, even if the test panics.
pub struct EnvVarGuard {
    vars: Vec<(String, Option<String>)>,
}

impl EnvVarGuard {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// Set an environment variable and remember its original value
    pub fn set(&mut self, key: &str, value: &str) {
        let original = env::var(key).ok();
        self.vars.push((key.to_string(), original));
        // env::set_var is unsafe in the 2024 edition
        unsafe {
            env::set_var(key, value);
        }
    }

    /// Remove an environment variable and remember its original value
    pub fn remove(&mut self, key: &str) {
        let original = env::var(key).ok();
        self.vars.push((key.to_string(), original));
        unsafe {
            env::remove_var(key);
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.vars.iter().rev() {
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

impl Default for EnvVarGuard {
    fn default() -> Self {
        Self::new()
    }
}
