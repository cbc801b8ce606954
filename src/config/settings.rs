use std::time::Duration;

use thiserror::Error;

use crate::input::HotkeyBindings;

/// Runtime settings for the sequencer and its workflows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Master switch; when off, activation signals are ignored
    pub enabled: bool,
    pub bindings: HotkeyBindings,
    /// Settle delay after opening panels and after each use/release
    pub click_delay: Duration,
    /// Upper bound for every state-confirmation wait
    pub wait_timeout: Duration,
    /// When off, no inventory item is treated as a source unit
    pub detect_source_items: bool,
    /// Log every resolved item name during discovery
    pub debug_item_names: bool,
    /// Emit diagnostic-level logs
    pub show_debug_info: bool,
}

impl Settings {
    pub const MIN_CLICK_DELAY_MS: u64 = 50;
    pub const MAX_CLICK_DELAY_MS: u64 = 500;
    pub const DEFAULT_CLICK_DELAY_MS: u64 = 100;
    pub const MIN_WAIT_TIMEOUT_MS: u64 = 1000;
    pub const MAX_WAIT_TIMEOUT_MS: u64 = 5000;
    pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 2000;

    pub fn sanitize_click_delay(ms: u64) -> Duration {
        Duration::from_millis(ms.clamp(Self::MIN_CLICK_DELAY_MS, Self::MAX_CLICK_DELAY_MS))
    }

    pub fn sanitize_wait_timeout(ms: u64) -> Duration {
        Duration::from_millis(ms.clamp(Self::MIN_WAIT_TIMEOUT_MS, Self::MAX_WAIT_TIMEOUT_MS))
    }

    /// Sets the click delay, clamped to its range
    pub fn with_click_delay_ms(mut self, ms: u64) -> Self {
        self.click_delay = Self::sanitize_click_delay(ms);
        self
    }

    /// Sets the wait timeout, clamped to its range
    pub fn with_wait_timeout_ms(mut self, ms: u64) -> Self {
        self.wait_timeout = Self::sanitize_wait_timeout(ms);
        self
    }

    /// Construct settings from environment variables.
    ///
    /// Environment variables:
    /// - `BEAST_SORTER_ENABLED` - master switch (default: true)
    /// - `BEAST_SORTER_CLICK_DELAY_MS` - settle delay, 50..=500 (default: 100)
    /// - `BEAST_SORTER_WAIT_TIMEOUT_MS` - confirmation timeout, 1000..=5000 (default: 2000)
    /// - `BEAST_SORTER_DETECT_ORBS` - treat Bestiary Orbs as sources (default: true)
    /// - `BEAST_SORTER_DEBUG_ITEM_NAMES` - log resolved names (default: false)
    /// - `BEAST_SORTER_DEBUG` - diagnostic logging (default: false)
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] with an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        if let Some(enabled) = parse_var::<bool>(&lookup, "BEAST_SORTER_ENABLED")? {
            settings.enabled = enabled;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "BEAST_SORTER_CLICK_DELAY_MS")? {
            settings = settings.with_click_delay_ms(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "BEAST_SORTER_WAIT_TIMEOUT_MS")? {
            settings = settings.with_wait_timeout_ms(ms);
        }
        if let Some(detect) = parse_var::<bool>(&lookup, "BEAST_SORTER_DETECT_ORBS")? {
            settings.detect_source_items = detect;
        }
        if let Some(names) = parse_var::<bool>(&lookup, "BEAST_SORTER_DEBUG_ITEM_NAMES")? {
            settings.debug_item_names = names;
        }
        if let Some(debug) = parse_var::<bool>(&lookup, "BEAST_SORTER_DEBUG")? {
            settings.show_debug_info = debug;
        }

        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            bindings: HotkeyBindings::default(),
            click_delay: Duration::from_millis(Self::DEFAULT_CLICK_DELAY_MS),
            wait_timeout: Duration::from_millis(Self::DEFAULT_WAIT_TIMEOUT_MS),
            detect_source_items: true,
            debug_item_names: false,
            show_debug_info: false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, SettingsError>
where
    T: std::str::FromStr,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let parsed = raw.trim().parse::<T>();
    match parsed {
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(SettingsError::InvalidValue { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults_match_control_surface() {
        let settings = Settings::default();
        assert!(settings.enabled);
        assert_eq!(settings.click_delay, Duration::from_millis(100));
        assert_eq!(settings.wait_timeout, Duration::from_millis(2000));
        assert!(settings.detect_source_items);
    }

    #[test]
    fn numeric_settings_are_clamped() {
        let settings = Settings::default()
            .with_click_delay_ms(10)
            .with_wait_timeout_ms(60_000);
        assert_eq!(settings.click_delay, Duration::from_millis(50));
        assert_eq!(settings.wait_timeout, Duration::from_millis(5000));

        let settings = Settings::default().with_click_delay_ms(250);
        assert_eq!(settings.click_delay, Duration::from_millis(250));
    }

    #[test]
    fn lookup_overrides_and_clamps() {
        let settings = Settings::from_lookup(lookup(&[
            ("BEAST_SORTER_CLICK_DELAY_MS", "900"),
            ("BEAST_SORTER_WAIT_TIMEOUT_MS", " 3000 "),
            ("BEAST_SORTER_DEBUG", "true"),
        ]))
        .unwrap();

        assert_eq!(settings.click_delay, Duration::from_millis(500));
        assert_eq!(settings.wait_timeout, Duration::from_millis(3000));
        assert!(settings.show_debug_info);
        assert!(settings.enabled);
    }

    #[test]
    fn lookup_rejects_garbage() {
        let err = Settings::from_lookup(lookup(&[("BEAST_SORTER_ENABLED", "maybe")])).unwrap_err();
        assert_eq!(
            err,
            SettingsError::InvalidValue {
                key: "BEAST_SORTER_ENABLED",
                value: "maybe".to_string(),
            }
        );
    }
}
