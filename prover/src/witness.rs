//! Committee data handed to the prover. API for higher level abstraction.

use ff::Field;
use pasta_curves::pallas::{Affine, Base, Scalar};

use crate::circuit::{signer_row, ThresholdCircuit, INPUTS_PER_SIGNER, MSG_ROW};
use crate::config::CommitteeConfig;
use crate::error::Error;
use crate::signatures::primitive::schnorr::{Schnorr, SchnorrSig};
use crate::util::{coordinates, scalar_limbs};

/// Schnorr public key, a point of the Pallas curve.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PublicKey(Affine);

impl PublicKey {
    /// The curve point.
    pub fn point(&self) -> Affine {
        self.0
    }
}

impl From<Affine> for PublicKey {
    fn from(point: Affine) -> Self {
        PublicKey(point)
    }
}

/// Schnorr signature, the announcement point `R` and the response `s`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Signature(Affine, Scalar);

impl Signature {
    pub fn new(announcement: Affine, response: Scalar) -> Self {
        Signature(announcement, response)
    }

    pub fn announcement(&self) -> Affine {
        self.0
    }

    pub fn response(&self) -> Scalar {
        self.1
    }
}

impl From<SchnorrSig> for Signature {
    fn from((announcement, response): SchnorrSig) -> Self {
        Signature(announcement, response)
    }
}

/// Public keys, signatures and message of one threshold statement, checked
/// against the committee configuration.
///
/// Everything here ends up in the public inputs, so the same value serves the
/// prover and the verifier.
#[derive(Clone, Debug)]
pub struct Witness {
    committee: CommitteeConfig,
    pks: Vec<PublicKey>,
    signatures: Vec<Signature>,
    msg: Base,
}

impl Witness {
    /// Builds a witness with one public key and one signature per member, in
    /// committee order.
    pub fn new(
        committee: &CommitteeConfig,
        pks: &[PublicKey],
        signatures: &[Signature],
        msg: Base,
    ) -> Result<Self, Error> {
        committee.validate()?;

        let expected = committee.committee_size();
        if pks.len() != expected || signatures.len() != expected {
            return Err(Error::CommitteeSizeMismatch {
                expected,
                public_keys: pks.len(),
                signatures: signatures.len(),
            });
        }

        Ok(Witness {
            committee: committee.clone(),
            pks: pks.to_vec(),
            signatures: signatures.to_vec(),
            msg,
        })
    }

    pub fn committee(&self) -> &CommitteeConfig {
        &self.committee
    }

    pub fn msg(&self) -> Base {
        self.msg
    }

    /// Circuit with this witness assigned.
    pub fn circuit(&self) -> ThresholdCircuit {
        ThresholdCircuit::with_witness(
            self.committee.clone(),
            self.pks.iter().map(PublicKey::point).collect(),
            self.signatures.iter().map(|sig| (sig.0, sig.1)).collect(),
            self.msg,
        )
    }

    /// Public inputs in instance order: the message, then per member the
    /// public key, the announcement and the response limbs.
    pub fn public_inputs(&self) -> Vec<Base> {
        let mut inputs = vec![Base::ZERO; self.committee.instance_len()];
        inputs[MSG_ROW] = self.msg;

        for (i, (pk, sig)) in self.pks.iter().zip(self.signatures.iter()).enumerate() {
            let (pk_x, pk_y) = coordinates(&pk.0);
            let (r_x, r_y) = coordinates(&sig.0);
            let (s_lo, s_hi) = scalar_limbs(&sig.1);

            let row = signer_row(i);
            inputs[row..row + INPUTS_PER_SIGNER]
                .copy_from_slice(&[pk_x, pk_y, r_x, r_y, s_lo, s_hi]);
        }

        inputs
    }

    /// Number of signatures that verify outside the circuit.
    pub fn valid_signatures(&self) -> usize {
        self.pks
            .iter()
            .zip(self.signatures.iter())
            .filter(|(pk, sig)| Schnorr::verify(self.msg, pk.0, (sig.0, sig.1)).is_ok())
            .count()
    }

    /// Whether the circuit would be satisfied by this witness.
    pub fn meets_threshold(&self) -> bool {
        self.valid_signatures() >= self.committee.threshold()
    }
}
