//! Environment-based configuration.
//!
//! [`EnvConfig`] works on a snapshot of variables rather than reading the
//! process environment on every lookup, so tests can feed it fixed values.

use std::collections::HashMap;

use super::{HeaderOverrides, RecordConfig};
use crate::error::{CastError, Result};

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "CAST";

/// Variable names understood by [`EnvConfig::apply`], without the prefix.
pub mod vars {
    /// Typing mode (`instant` or `human`).
    pub const TYPING: &str = "TYPING";
    /// Capture mode (`plain` or `ansi`).
    pub const CAPTURE: &str = "CAPTURE";
    /// Real-time pacing.
    pub const PACE: &str = "PACE";
    /// Keystroke delay seed.
    pub const SEED: &str = "SEED";
    /// Execution shell.
    pub const SHELL: &str = "SHELL";
    /// Header idle time limit.
    pub const IDLE_TIME_LIMIT: &str = "IDLE_TIME_LIMIT";
    /// Header title.
    pub const TITLE: &str = "TITLE";
}

/// Environment variable reader.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Prefix for environment variables.
    prefix: String,
    /// Snapshot of the variables.
    vars: HashMap<String, String>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::from_env(DEFAULT_PREFIX)
    }
}

impl EnvConfig {
    /// Snapshot the process environment.
    #[must_use]
    pub fn from_env(prefix: impl Into<String>) -> Self {
        Self::from_vars(prefix, std::env::vars())
    }

    /// Build from explicit key/value pairs.
    #[must_use]
    pub fn from_vars<I, K, V>(prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Build the full environment variable name.
    fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a prefixed value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(&self.var_name(name)).map(String::as_str)
    }

    /// Get an unprefixed value such as `HOME` or `TERM`.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Get an unprefixed value, treating an empty one as unset.
    #[must_use]
    pub fn raw_non_empty(&self, name: &str) -> Option<&str> {
        self.raw(name).filter(|v| !v.is_empty())
    }

    /// Get a parsed value, reporting malformed ones.
    pub fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(name)
            .map(|v| {
                v.trim().parse().map_err(|e| {
                    CastError::config(format!("{}={v:?}: {e}", self.var_name(name)))
                })
            })
            .transpose()
    }

    /// Get a boolean value.
    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).map(|v| {
            matches!(
                v.to_lowercase().as_str(),
                "1" | "true" | "yes" | "on" | "enabled"
            )
        })
    }

    /// Overlay every recognised `CAST_*` variable onto `config`.
    pub fn apply(&self, config: &mut RecordConfig) -> Result<()> {
        if let Some(typing) = self.parse(vars::TYPING)? {
            config.typing = typing;
        }
        if let Some(capture) = self.parse(vars::CAPTURE)? {
            config.capture = capture;
        }
        if let Some(pace) = self.bool(vars::PACE) {
            config.pace = pace;
        }
        if let Some(seed) = self.parse(vars::SEED)? {
            config.seed = Some(seed);
        }
        if let Some(shell) = self.get(vars::SHELL).filter(|s| !s.is_empty()) {
            config.shell = shell.into();
        }
        config.header.merge(HeaderOverrides {
            idle_time_limit: self.parse(vars::IDLE_TIME_LIMIT)?,
            title: self.get(vars::TITLE).map(str::to_string),
            ..HeaderOverrides::default()
        });
        Ok(())
    }

    /// Expand `$NAME` and `${NAME}` references, then a leading `~`.
    ///
    /// Unknown variables are left as written so the shell still sees them.
    #[must_use]
    pub fn expand(&self, text: &str) -> String {
        let expanded = self.expand_vars(text);
        self.expand_home(&expanded)
    }

    fn expand_vars(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
                match braced.find('}') {
                    Some(end) => (&braced[..end], end + 2),
                    None => ("", 0),
                }
            } else {
                let end = after
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(after.len());
                (&after[..end], end)
            };

            match self.raw(name).filter(|_| !name.is_empty()) {
                Some(value) => {
                    out.push_str(value);
                    rest = &after[consumed..];
                }
                None => {
                    out.push('$');
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        out
    }

    fn expand_home(&self, text: &str) -> String {
        let Some(after) = text.strip_prefix('~') else {
            return text.to_string();
        };
        if !(after.is_empty() || after.starts_with('/')) {
            return text.to_string();
        }
        match self.raw_non_empty("HOME") {
            Some(home) => format!("{home}{after}"),
            None => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CaptureMode, TypingMode};

    fn env(pairs: &[(&str, &str)]) -> EnvConfig {
        EnvConfig::from_vars(DEFAULT_PREFIX, pairs.iter().copied())
    }

    #[test]
    fn env_config_prefix() {
        let config = EnvConfig::from_vars("TEST", Vec::<(String, String)>::new());
        assert_eq!(config.var_name("foo"), "TEST_FOO");
        assert_eq!(config.var_name("bar_baz"), "TEST_BAR_BAZ");
    }

    #[test]
    fn env_config_no_prefix() {
        let config = EnvConfig::from_vars("", Vec::<(String, String)>::new());
        assert_eq!(config.var_name("foo"), "FOO");
    }

    #[test]
    fn env_bool_parsing() {
        let config = env(&[("CAST_ENABLED", "true"), ("CAST_DISABLED", "off")]);
        assert_eq!(config.bool("ENABLED"), Some(true));
        assert_eq!(config.bool("DISABLED"), Some(false));
        assert_eq!(config.bool("MISSING"), None);
    }

    #[test]
    fn apply_overlays_known_vars() {
        let config_env = env(&[
            ("CAST_TYPING", "instant"),
            ("CAST_CAPTURE", "ansi"),
            ("CAST_PACE", "yes"),
            ("CAST_SEED", "42"),
            ("CAST_SHELL", "/bin/bash"),
            ("CAST_IDLE_TIME_LIMIT", "2.5"),
            ("CAST_TITLE", "demo"),
        ]);
        let mut config = RecordConfig::default();
        config_env.apply(&mut config).unwrap();

        assert_eq!(config.typing, TypingMode::Instant);
        assert_eq!(config.capture, CaptureMode::Ansi);
        assert!(config.pace);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.shell, std::path::PathBuf::from("/bin/bash"));
        assert_eq!(config.header.idle_time_limit, Some(2.5));
        assert_eq!(config.header.title.as_deref(), Some("demo"));
    }

    #[test]
    fn apply_keeps_unset_fields() {
        let mut config = RecordConfig::default().header(HeaderOverrides::new().title("kept"));
        env(&[]).apply(&mut config).unwrap();
        assert_eq!(config, RecordConfig::default().header(HeaderOverrides::new().title("kept")));
    }

    #[test]
    fn apply_reports_bad_values() {
        let mut config = RecordConfig::default();
        let err = env(&[("CAST_SEED", "many")]).apply(&mut config).unwrap_err();
        assert!(err.to_string().contains("CAST_SEED"));
    }

    #[test]
    fn expand_variables() {
        let config = env(&[("USER", "ada"), ("HOME", "/home/ada")]);
        assert_eq!(config.expand("echo $USER"), "echo ada");
        assert_eq!(config.expand("echo ${USER}s"), "echo adas");
        assert_eq!(config.expand("echo $NOPE $"), "echo $NOPE $");
        assert_eq!(config.expand("echo ${USER"), "echo ${USER");
        assert_eq!(config.expand("cost: 5$"), "cost: 5$");
    }

    #[test]
    fn expand_leading_tilde_only() {
        let config = env(&[("HOME", "/home/ada")]);
        assert_eq!(config.expand("~/bin/tool"), "/home/ada/bin/tool");
        assert_eq!(config.expand("~"), "/home/ada");
        assert_eq!(config.expand("ls ~/src"), "ls ~/src");
        assert_eq!(config.expand("~other/x"), "~other/x");
    }
}
