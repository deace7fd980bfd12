//! Committee configuration.
//!
//! The committee size, the signature curve and the hash function determine the
//! constraint system. Changing any of them requires new proving and verifying
//! keys, so they live in one immutable value that is passed to circuit
//! construction, witness assembly and setup.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Committee size of the light client reference deployment.
pub const DEFAULT_COMMITTEE_SIZE: usize = 90;

/// Rows taken by one signature verification: loading its public inputs, the
/// challenge hash, three decompositions, two scalar multiplications and the
/// final comparison.
const ROWS_PER_SIGNER: usize = 1_760;
/// Rows outside the per signer verifications, besides the ones counted in
/// [`CommitteeConfig::rows`].
const FIXED_ROWS: usize = 32;
/// Rows reserved by the proving system for blinding factors.
const BLINDING_ROWS: usize = 16;

/// Curve of the committee signatures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveId {
    /// Pallas, whose base field is the circuit field.
    Pallas,
    /// Vesta. Its base field is the scalar field of Pallas, so it cannot be
    /// verified natively by the circuit.
    Vesta,
}

/// Hash function used to derive signature challenges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashId {
    /// Poseidon with the `P128Pow5T3` parameters.
    Poseidon,
    /// Rescue. Not available in circuit.
    Rescue,
}

/// Minimum number of valid signatures for a committee of `committee_size`
/// members: 80% of the committee, rounded down.
pub const fn threshold_for(committee_size: usize) -> usize {
    committee_size * 8 / 10
}

/// Configuration fixed at setup time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitteeConfig {
    committee_size: usize,
    curve: CurveId,
    hash: HashId,
}

impl Default for CommitteeConfig {
    fn default() -> Self {
        CommitteeConfig {
            committee_size: DEFAULT_COMMITTEE_SIZE,
            curve: CurveId::Pallas,
            hash: HashId::Poseidon,
        }
    }
}

impl CommitteeConfig {
    /// Builds a validated configuration.
    pub fn new(committee_size: usize, curve: CurveId, hash: HashId) -> Result<Self, Error> {
        let config = CommitteeConfig {
            committee_size,
            curve,
            hash,
        };
        config.validate()?;
        Ok(config)
    }

    /// Pallas and Poseidon configuration for `committee_size` members.
    pub fn with_committee_size(committee_size: usize) -> Result<Self, Error> {
        Self::new(committee_size, CurveId::Pallas, HashId::Poseidon)
    }

    /// Checks that the configuration can be turned into a circuit. Needed for
    /// values that bypassed [`CommitteeConfig::new`], such as deserialized ones.
    pub fn validate(&self) -> Result<(), Error> {
        if self.committee_size == 0 {
            return Err(Error::EmptyCommittee);
        }
        if self.curve != CurveId::Pallas {
            return Err(Error::UnsupportedCurve(self.curve));
        }
        if self.hash != HashId::Poseidon {
            return Err(Error::UnsupportedHash(self.hash));
        }
        Ok(())
    }

    /// Number of committee members.
    pub fn committee_size(&self) -> usize {
        self.committee_size
    }

    /// Signature curve.
    pub fn curve(&self) -> CurveId {
        self.curve
    }

    /// Challenge hash.
    pub fn hash(&self) -> HashId {
        self.hash
    }

    /// Minimum number of valid signatures.
    pub fn threshold(&self) -> usize {
        threshold_for(self.committee_size)
    }

    /// Bits needed to represent any count between 0 and the committee size.
    pub fn count_bits(&self) -> usize {
        (usize::BITS - self.committee_size.leading_zeros()) as usize
    }

    /// Number of public inputs: the message, then for every member the public
    /// key, the signature point and the two limbs of the signature scalar.
    pub fn instance_len(&self) -> usize {
        1 + 6 * self.committee_size
    }

    /// Upper bound on the rows used by the circuit.
    pub fn rows(&self) -> usize {
        let n = self.committee_size;
        // accumulator and the three range checks of the threshold comparison
        let threshold_rows = n + 3 * (self.count_bits() + 2);
        n * ROWS_PER_SIGNER + threshold_rows + FIXED_ROWS
    }

    /// Smallest `k` such that the circuit fits in `2^k` rows.
    pub fn k(&self) -> u32 {
        let rows = self.rows() + BLINDING_ROWS;
        rows.next_power_of_two().trailing_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn thresholds_round_down() {
        let expected = [
            (1, 0),
            (2, 1),
            (3, 2),
            (4, 3),
            (5, 4),
            (9, 7),
            (10, 8),
            (11, 8),
            (63, 50),
            (89, 71),
            (90, 72),
            (91, 72),
            (99, 79),
            (100, 80),
        ];
        for (n, threshold) in expected {
            assert_eq!(threshold_for(n), threshold, "committee of {n}");
        }
    }

    #[test]
    fn default_is_reference_committee() {
        let config = CommitteeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.committee_size(), 90);
        assert_eq!(config.curve(), CurveId::Pallas);
        assert_eq!(config.hash(), HashId::Poseidon);
        assert_eq!(config.threshold(), 72);
        assert_eq!(config.count_bits(), 7);
        assert_eq!(config.instance_len(), 541);
        assert_eq!(config.k(), 18);
    }

    #[test]
    fn small_committees_fit_small_circuits() {
        assert_eq!(CommitteeConfig::with_committee_size(1).unwrap().k(), 11);
        assert_eq!(CommitteeConfig::with_committee_size(2).unwrap().k(), 12);
        assert_eq!(CommitteeConfig::with_committee_size(5).unwrap().k(), 14);
    }

    #[test]
    fn rejects_unsupported_configurations() {
        assert!(matches!(
            CommitteeConfig::with_committee_size(0),
            Err(Error::EmptyCommittee)
        ));
        assert!(matches!(
            CommitteeConfig::new(10, CurveId::Vesta, HashId::Poseidon),
            Err(Error::UnsupportedCurve(CurveId::Vesta))
        ));
        assert!(matches!(
            CommitteeConfig::new(10, CurveId::Pallas, HashId::Rescue),
            Err(Error::UnsupportedHash(HashId::Rescue))
        ));
    }

    #[test]
    fn deserialized_configs_are_validated() {
        let config: CommitteeConfig = serde_json::from_str(
            r#"{"committee_size": 90, "curve": "pallas", "hash": "poseidon"}"#,
        )
        .unwrap();
        assert_eq!(config, CommitteeConfig::default());

        let config: CommitteeConfig = serde_json::from_str(
            r#"{"committee_size": 90, "curve": "vesta", "hash": "poseidon"}"#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(Error::UnsupportedCurve(_))));

        let json = serde_json::to_string(&CommitteeConfig::default()).unwrap();
        assert!(json.contains(r#""hash":"poseidon""#));
    }

    proptest! {
        #[test]
        fn threshold_is_floor_of_eighty_percent(n in 1usize..10_000) {
            let threshold = threshold_for(n);
            prop_assert!(threshold * 10 <= n * 8);
            prop_assert!((threshold + 1) * 10 > n * 8);
        }

        #[test]
        fn counts_fit_in_count_bits(n in 1usize..10_000) {
            let config = CommitteeConfig::with_committee_size(n).unwrap();
            prop_assert!(n < 1 << config.count_bits());
            prop_assert!(config.threshold() < 1 << config.count_bits());
            prop_assert!(config.rows() + BLINDING_ROWS <= 1 << config.k());
        }
    }
}
