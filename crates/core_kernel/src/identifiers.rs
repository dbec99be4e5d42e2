//! Identity types for the two identity spaces of the claims system
//!
//! Claims are addressed by a four-part composite key; phase and accompaniment
//! records are addressed by a protocol triple. The two spaces are not linked
//! relationally - a claim record carries its protocol, and everything else
//! joins through that application-level lookup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Composite identity of a claim: insurance type, origin, branch, number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimKey {
    /// Insurance type component
    pub insurance_type: u32,
    /// Claim origin (2 digits, 01-99)
    pub origin: u32,
    /// Claim branch (2 digits, 00-99)
    pub branch: u32,
    /// Claim number (1-6 digits)
    pub claim_number: u32,
}

impl ClaimKey {
    pub fn new(insurance_type: u32, origin: u32, branch: u32, claim_number: u32) -> Self {
        Self {
            insurance_type,
            origin,
            branch,
            claim_number,
        }
    }
}

impl fmt::Display for ClaimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.insurance_type, self.origin, self.branch, self.claim_number
        )
    }
}

/// Protocol identity under which phases and accompaniment events are tracked
///
/// Distinct from [`ClaimKey`]; the check digit is a verification digit in
/// the 0-9 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Protocol {
    /// Protocol source
    pub source: u32,
    /// Protocol number
    pub number: u32,
    /// Check digit (0-9)
    pub check_digit: u32,
}

impl Protocol {
    pub fn new(source: u32, number: u32, check_digit: u32) -> Self {
        Self {
            source,
            number,
            check_digit,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}-{}", self.source, self.number, self.check_digit)
    }
}

/// Unique identifier of one authorization attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorizationId(Uuid);

impl AuthorizationId {
    /// Creates a new random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a new time-ordered identifier (v7)
    pub fn new_v7() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AuthorizationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AuthorizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AUTH-{}", self.0)
    }
}

impl FromStr for AuthorizationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid_str = s.strip_prefix("AUTH-").unwrap_or(s);
        Ok(Self(Uuid::parse_str(uuid_str)?))
    }
}

impl From<Uuid> for AuthorizationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<AuthorizationId> for Uuid {
    fn from(id: AuthorizationId) -> Uuid {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_key_display() {
        let key = ClaimKey::new(1, 10, 31, 123456);
        assert_eq!(key.to_string(), "1/10/31/123456");
    }

    #[test]
    fn test_protocol_display() {
        let protocol = Protocol::new(1, 4231, 7);
        assert_eq!(protocol.to_string(), "1/4231-7");
    }

    #[test]
    fn test_authorization_id_display() {
        let id = AuthorizationId::new();
        assert!(id.to_string().starts_with("AUTH-"));
    }

    #[test]
    fn test_authorization_id_parsing() {
        let original = AuthorizationId::new();
        let parsed: AuthorizationId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_claim_key_equality_is_structural() {
        let a = ClaimKey::new(1, 10, 31, 9);
        let b = ClaimKey::new(1, 10, 31, 9);
        let c = ClaimKey::new(1, 10, 31, 10);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
