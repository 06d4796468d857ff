use crate::error::InvalidSettingValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Temperature applied when nothing else was chosen.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Content-filtering strictness selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Standard filtering.
    #[default]
    Censored,
    /// Permissive filtering.
    Uncensored,
}

impl Mode {
    /// Every accepted mode.
    pub const ALL: [Mode; 2] = [Mode::Censored, Mode::Uncensored];

    /// Wire name, as stored and exported.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Censored => "censored",
            Mode::Uncensored => "uncensored",
        }
    }

    /// Capitalized name for status lines.
    pub fn title(&self) -> &'static str {
        match self {
            Mode::Censored => "Censored",
            Mode::Uncensored => "Uncensored",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = InvalidSettingValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| InvalidSettingValue::new("mode", s))
    }
}

/// Genre the narrator is asked to write in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    /// Swords and sorcery.
    #[default]
    Fantasy,
    /// Science fiction.
    #[serde(rename = "Sci-Fi")]
    SciFi,
    /// Horror.
    Horror,
    /// Mystery.
    Mystery,
    /// Comedy.
    Comedy,
    /// Historical fiction.
    Historical,
}

impl Tone {
    /// Every accepted tone, in menu order.
    pub const ALL: [Tone; 6] = [
        Tone::Fantasy,
        Tone::SciFi,
        Tone::Horror,
        Tone::Mystery,
        Tone::Comedy,
        Tone::Historical,
    ];

    /// Display and wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Fantasy => "Fantasy",
            Tone::SciFi => "Sci-Fi",
            Tone::Horror => "Horror",
            Tone::Mystery => "Mystery",
            Tone::Comedy => "Comedy",
            Tone::Historical => "Historical",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = InvalidSettingValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tone::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| InvalidSettingValue::new("tone", s))
    }
}

/// Generation configuration the player controls.
///
/// Fields are private so every change goes through a validating setter; a
/// rejected change leaves the previous value untouched. Serializes to the
/// `settings` object of an exported transcript.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionSettings {
    #[serde(rename = "current_mode")]
    mode: Mode,
    temperature: f64,
    tone: Tone,
}

impl SessionSettings {
    /// Builds settings from parts, validating the temperature.
    pub fn new(mode: Mode, temperature: f64, tone: Tone) -> Result<Self, InvalidSettingValue> {
        let mut settings = Self::default();
        settings.set_temperature(temperature)?;
        settings.mode = mode;
        settings.tone = tone;
        Ok(settings)
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current temperature, always within `[0.0, 1.0]`.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Current tone.
    pub fn tone(&self) -> Tone {
        self.tone
    }

    /// Selects a mode.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Selects a mode by its wire name.
    pub fn set_mode_str(&mut self, value: &str) -> Result<(), InvalidSettingValue> {
        self.mode = value.parse()?;
        Ok(())
    }

    /// Sets the temperature. Values outside `[0.0, 1.0]`, and NaN, are rejected.
    pub fn set_temperature(&mut self, value: f64) -> Result<(), InvalidSettingValue> {
        if !(0.0..=1.0).contains(&value) {
            return Err(InvalidSettingValue::new("temperature", value.to_string()));
        }
        self.temperature = value;
        Ok(())
    }

    /// Sets the temperature from text, e.g. a command argument.
    pub fn set_temperature_str(&mut self, value: &str) -> Result<(), InvalidSettingValue> {
        let parsed: f64 = value
            .trim()
            .parse()
            .map_err(|_| InvalidSettingValue::new("temperature", value))?;
        self.set_temperature(parsed)
    }

    /// Selects a tone.
    pub fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    /// Selects a tone by name (`"Sci-Fi"`, `"Horror"`, ...).
    pub fn set_tone_str(&mut self, value: &str) -> Result<(), InvalidSettingValue> {
        self.tone = value.parse()?;
        Ok(())
    }

    /// Restores all three defaults at once.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// One-line description for status displays.
    pub fn summary(&self) -> String {
        format!(
            "Mode: {} | Temperature: {} | Tone: {}",
            self.mode.title(),
            self.temperature,
            self.tone
        )
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            mode: Mode::Censored,
            temperature: DEFAULT_TEMPERATURE,
            tone: Tone::Fantasy,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = SessionSettings::default();
        assert_eq!(s.mode(), Mode::Censored);
        assert_eq!(s.temperature(), 0.7);
        assert_eq!(s.tone(), Tone::Fantasy);
    }

    #[test]
    fn test_valid_values_round_trip() {
        let mut s = SessionSettings::default();
        for mode in Mode::ALL {
            s.set_mode_str(mode.as_str()).unwrap();
            assert_eq!(s.mode(), mode);
        }
        for tone in Tone::ALL {
            s.set_tone_str(tone.as_str()).unwrap();
            assert_eq!(s.tone(), tone);
        }
        for t in [0.0, 0.05, 0.5, 1.0] {
            s.set_temperature(t).unwrap();
            assert_eq!(s.temperature(), t);
        }
    }

    #[test]
    fn test_invalid_temperature_keeps_prior() {
        let mut s = SessionSettings::default();
        s.set_temperature(0.3).unwrap();

        for bad in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let err = s.set_temperature(bad).unwrap_err();
            assert_eq!(err.field, "temperature");
            assert_eq!(s.temperature(), 0.3);
        }
        assert!(s.set_temperature_str("warm").is_err());
        assert_eq!(s.temperature(), 0.3);
    }

    #[test]
    fn test_invalid_mode_and_tone_keep_prior() {
        let mut s = SessionSettings::default();
        s.set_mode(Mode::Uncensored);
        s.set_tone(Tone::Horror);

        let err = s.set_mode_str("foo").unwrap_err();
        assert_eq!(err, InvalidSettingValue::new("mode", "foo"));
        assert_eq!(s.mode(), Mode::Uncensored);

        let err = s.set_tone_str("Unknown").unwrap_err();
        assert_eq!(err.field, "tone");
        assert_eq!(s.tone(), Tone::Horror);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert!("Censored".parse::<Mode>().is_err());
        assert!("sci-fi".parse::<Tone>().is_err());
        assert_eq!("Sci-Fi".parse::<Tone>().unwrap(), Tone::SciFi);
    }

    #[test]
    fn test_reset_restores_all_defaults() {
        let mut s = SessionSettings::new(Mode::Uncensored, 0.1, Tone::Comedy).unwrap();
        s.reset();
        assert_eq!(s, SessionSettings::default());
    }

    #[test]
    fn test_new_validates_temperature() {
        assert!(SessionSettings::new(Mode::Censored, 2.0, Tone::Fantasy).is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let s = SessionSettings::new(Mode::Uncensored, 0.9, Tone::SciFi).unwrap();
        assert_eq!(
            serde_json::to_value(s).unwrap(),
            serde_json::json!({"current_mode": "uncensored", "temperature": 0.9, "tone": "Sci-Fi"})
        );
    }

    #[test]
    fn test_summary() {
        assert_eq!(
            SessionSettings::default().summary(),
            "Mode: Censored | Temperature: 0.7 | Tone: Fantasy"
        );
    }
}
