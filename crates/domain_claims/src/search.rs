//! Claim search intents
//!
//! A search targets exactly one of three identity groups. The wire shape is a
//! bag of optional fields; [`ClaimSearch::from_criteria`] is the validating
//! factory that turns it into a single well-formed intent, so downstream code
//! never inspects half-filled field groups.

use serde::{Deserialize, Serialize};

use crate::error::ClaimError;
use core_kernel::Protocol;

/// Raw search criteria as received from callers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Protocol source
    pub protocol_source: Option<u32>,
    /// Protocol number
    pub protocol_number: Option<u32>,
    /// Protocol check digit (0-9)
    pub check_digit: Option<u32>,
    /// Claim origin
    pub origin: Option<u32>,
    /// Claim branch
    pub branch: Option<u32>,
    /// Claim number
    pub claim_number: Option<u32>,
    /// Reinsurance leader code
    pub leader_code: Option<u32>,
    /// Claim number under the leader
    pub leader_claim_number: Option<u32>,
}

/// A validated search intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimSearch {
    /// Lookup by protocol triple
    Protocol(Protocol),
    /// Lookup by claim origin, branch and number
    ClaimNumber {
        origin: u32,
        branch: u32,
        claim_number: u32,
    },
    /// Lookup by reinsurance leader
    Leader {
        leader_code: u32,
        leader_claim_number: u32,
    },
}

impl ClaimSearch {
    /// Validates raw criteria into a single search intent
    ///
    /// Groups are evaluated in priority order: protocol, then claim number,
    /// then leader. A criteria set with no complete group is rejected.
    pub fn from_criteria(criteria: &SearchCriteria) -> Result<Self, ClaimError> {
        if let (Some(source), Some(number), Some(check_digit)) = (
            criteria.protocol_source,
            criteria.protocol_number,
            criteria.check_digit,
        ) {
            if check_digit > 9 {
                return Err(ClaimError::InvalidSearchCriteria(
                    "check digit must be between 0 and 9".to_string(),
                ));
            }
            return Ok(ClaimSearch::Protocol(Protocol::new(
                source,
                number,
                check_digit,
            )));
        }

        if let (Some(origin), Some(branch), Some(claim_number)) =
            (criteria.origin, criteria.branch, criteria.claim_number)
        {
            return Ok(ClaimSearch::ClaimNumber {
                origin,
                branch,
                claim_number,
            });
        }

        if let (Some(leader_code), Some(leader_claim_number)) =
            (criteria.leader_code, criteria.leader_claim_number)
        {
            return Ok(ClaimSearch::Leader {
                leader_code,
                leader_claim_number,
            });
        }

        Err(ClaimError::InvalidSearchCriteria(
            "at least one complete criteria group is required: \
             protocol, claim number, or leader"
                .to_string(),
        ))
    }

    /// Human-readable name of the intent, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ClaimSearch::Protocol(_) => "protocol",
            ClaimSearch::ClaimNumber { .. } => "claim_number",
            ClaimSearch::Leader { .. } => "leader",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_search() {
        let criteria = SearchCriteria {
            protocol_source: Some(1),
            protocol_number: Some(4231),
            check_digit: Some(7),
            ..Default::default()
        };

        let search = ClaimSearch::from_criteria(&criteria).unwrap();
        assert_eq!(search, ClaimSearch::Protocol(Protocol::new(1, 4231, 7)));
        assert_eq!(search.kind(), "protocol");
    }

    #[test]
    fn test_claim_number_search() {
        let criteria = SearchCriteria {
            origin: Some(10),
            branch: Some(31),
            claim_number: Some(123456),
            ..Default::default()
        };

        let search = ClaimSearch::from_criteria(&criteria).unwrap();
        assert_eq!(
            search,
            ClaimSearch::ClaimNumber {
                origin: 10,
                branch: 31,
                claim_number: 123456
            }
        );
    }

    #[test]
    fn test_leader_search() {
        let criteria = SearchCriteria {
            leader_code: Some(5),
            leader_claim_number: Some(998),
            ..Default::default()
        };

        let search = ClaimSearch::from_criteria(&criteria).unwrap();
        assert_eq!(search.kind(), "leader");
    }

    #[test]
    fn test_protocol_takes_priority_over_other_groups() {
        let criteria = SearchCriteria {
            protocol_source: Some(1),
            protocol_number: Some(4231),
            check_digit: Some(7),
            origin: Some(10),
            branch: Some(31),
            claim_number: Some(123456),
            ..Default::default()
        };

        let search = ClaimSearch::from_criteria(&criteria).unwrap();
        assert_eq!(search.kind(), "protocol");
    }

    #[test]
    fn test_incomplete_group_is_rejected() {
        let criteria = SearchCriteria {
            protocol_source: Some(1),
            protocol_number: Some(4231),
            // check digit missing, and no other complete group
            origin: Some(10),
            ..Default::default()
        };

        assert!(ClaimSearch::from_criteria(&criteria).is_err());
    }

    #[test]
    fn test_check_digit_out_of_range_is_rejected() {
        let criteria = SearchCriteria {
            protocol_source: Some(1),
            protocol_number: Some(4231),
            check_digit: Some(12),
            ..Default::default()
        };

        assert!(ClaimSearch::from_criteria(&criteria).is_err());
    }

    #[test]
    fn test_empty_criteria_is_rejected() {
        assert!(ClaimSearch::from_criteria(&SearchCriteria::default()).is_err());
    }
}
