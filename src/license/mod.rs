//! License checks gating the spaces feature.
//!
//! The license source itself is external to this service; it is modelled as
//! a `LicenseChecker` so deployments can plug in whatever reports the current
//! license state. `StaticLicense` reports a fixed state taken from config.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Message returned with every 403 produced by the license gate.
pub const LICENSE_INVALID_MESSAGE: &str = "License is invalid for spaces";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseState {
    Valid,
    Invalid,
    Expired,
    Unavailable,
}

impl LicenseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseState::Valid => "valid",
            LicenseState::Invalid => "invalid",
            LicenseState::Expired => "expired",
            LicenseState::Unavailable => "unavailable",
        }
    }
}

impl FromStr for LicenseState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "valid" => Ok(LicenseState::Valid),
            "invalid" => Ok(LicenseState::Invalid),
            "expired" => Ok(LicenseState::Expired),
            "unavailable" => Ok(LicenseState::Unavailable),
            other => Err(format!("unknown license state '{}'", other)),
        }
    }
}

/// Result of a single license check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseCheck {
    pub state: LicenseState,
}

impl LicenseCheck {
    pub fn is_valid(&self) -> bool {
        self.state == LicenseState::Valid
    }
}

pub trait LicenseChecker: Send + Sync {
    fn check(&self) -> LicenseCheck;
}

/// License checker reporting a fixed state
#[derive(Debug, Clone)]
pub struct StaticLicense {
    state: LicenseState,
}

impl StaticLicense {
    pub fn new(state: LicenseState) -> Self {
        Self { state }
    }

    pub fn valid() -> Self {
        Self::new(LicenseState::Valid)
    }

    pub fn invalid() -> Self {
        Self::new(LicenseState::Invalid)
    }
}

impl LicenseChecker for StaticLicense {
    fn check(&self) -> LicenseCheck {
        LicenseCheck { state: self.state }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_license_states_case_insensitively() {
        assert_eq!("VALID".parse::<LicenseState>(), Ok(LicenseState::Valid));
        assert_eq!(" expired ".parse::<LicenseState>(), Ok(LicenseState::Expired));
        assert!("gold".parse::<LicenseState>().is_err());
    }

    #[test]
    fn only_valid_state_passes() {
        assert!(StaticLicense::valid().check().is_valid());
        assert!(!StaticLicense::invalid().check().is_valid());
        assert!(!StaticLicense::new(LicenseState::Unavailable).check().is_valid());
    }
}
