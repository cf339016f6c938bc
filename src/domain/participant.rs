//! Participant identity.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::error::LotteryError;

/// Wallet identity of a pool participant or buyer.
///
/// Opaque to the lottery engine beyond its shape: an ASCII alphanumeric
/// address as reported by the payment gateway (`0x…` hex, base58, …).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Creates a participant identity from a wallet address.
    ///
    /// # Errors
    ///
    /// Returns [`LotteryError::InvalidRequest`] if the address is blank or
    /// contains anything other than ASCII letters and digits.
    pub fn new(address: impl Into<String>) -> Result<Self, LotteryError> {
        let address = address.into();
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(LotteryError::InvalidRequest(
                "participant address must not be empty".to_string(),
            ));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(LotteryError::InvalidRequest(format!(
                "participant address must be alphanumeric: {trimmed:?}"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the full address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the display form of the address: `0x64cB...B4e4`.
    #[must_use]
    pub fn shortened(&self) -> String {
        shorten_address(&self.0)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ParticipantId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

/// Shortens an address to its first 6 and last 4 characters.
///
/// Addresses shorter than 10 characters are returned unchanged.
#[must_use]
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() < 10 {
        return address.to_string();
    }
    let head: String = chars.iter().take(6).collect();
    let tail: String = chars.iter().skip(chars.len() - 4).collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn shortens_long_addresses() {
        assert_eq!(
            shorten_address("0x64cBdcCfa295a0dB0187E5Ef7fAC28205908B4e4"),
            "0x64cB...B4e4"
        );
    }

    #[test]
    fn keeps_short_addresses() {
        assert_eq!(shorten_address("alice"), "alice");
        assert_eq!(shorten_address("123456789"), "123456789");
        assert_eq!(shorten_address("1234567890"), "123456...7890");
    }

    #[test]
    fn blank_identity_is_rejected() {
        assert!(ParticipantId::new("   ").is_err());
        assert!(ParticipantId::new("").is_err());
    }

    #[test]
    fn non_address_characters_are_rejected() {
        for raw in ["0xvictim?network=mainnet#", "0xabc/../wallet", "0x ab", "0xabc%2F"] {
            assert!(ParticipantId::new(raw).is_err(), "{raw} should be rejected");
        }
        assert!(ParticipantId::new("0x64cBdcCfa295a0dB0187E5Ef7fAC28205908B4e4").is_ok());
    }

    #[test]
    fn identity_is_trimmed() {
        let Ok(id) = ParticipantId::new("  0xabc  ") else {
            panic!("valid identity");
        };
        assert_eq!(id.as_str(), "0xabc");
    }
}
