use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Granularité de la règle de repos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestPolicy {
    /// Compare uniquement les `shift_date` (minuit) : seul le même jour est distingué.
    #[default]
    CalendarDate,
    /// Compare les heures réelles de fin et de début des shifts.
    ShiftTimes,
}

impl FromStr for RestPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calendar-date" | "date" => Ok(Self::CalendarDate),
            "shift-times" | "times" => Ok(Self::ShiftTimes),
            other => anyhow::bail!("unknown rest policy: {other}"),
        }
    }
}

/// Options du générateur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub min_rest_hours: u32,
    pub min_headcount: u32,
    pub rest_policy: RestPolicy,
    /// Branche les drapeaux `preferences.*` sur les règles (sinon ignorés).
    pub honor_preference_flags: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_rest_hours: 12,
            min_headcount: 2,
            rest_policy: RestPolicy::CalendarDate,
            honor_preference_flags: false,
        }
    }
}

impl GeneratorConfig {
    /// Charge une configuration JSON ; les champs absents gardent leur valeur par défaut.
    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let config: GeneratorConfig = serde_json::from_slice(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{ "rest_policy": "shift-times" }"#).unwrap();
        assert_eq!(config.rest_policy, RestPolicy::ShiftTimes);
        assert_eq!(config.min_rest_hours, 12);
        assert_eq!(config.min_headcount, 2);
        assert!(!config.honor_preference_flags);
    }

    #[test]
    fn rest_policy_from_str() {
        assert_eq!("times".parse::<RestPolicy>().unwrap(), RestPolicy::ShiftTimes);
        assert!("hourly".parse::<RestPolicy>().is_err());
    }
}
