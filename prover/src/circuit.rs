//! The threshold circuit: `N` public keys, `N` signatures and one message as
//! public inputs, satisfied when at least `floor(0.8 N)` signatures are valid.
//!
//! Public input layout:
//!
//! | row           | value     |
//! |---------------|-----------|
//! | 0             | message   |
//! | 1 + 6i        | pk_i.x    |
//! | 1 + 6i + 1    | pk_i.y    |
//! | 1 + 6i + 2    | R_i.x     |
//! | 1 + 6i + 3    | R_i.y     |
//! | 1 + 6i + 4    | s_i low 128 bits  |
//! | 1 + 6i + 5    | s_i high 127 bits |
//!
//! Points use `(0, 0)` for the identity.

use halo2_proofs::circuit::{Layouter, SimpleFloorPlanner, Value};
use halo2_proofs::plonk::{Circuit, ConstraintSystem, Error};
use pasta_curves::pallas::{self, Base};

use crate::config::CommitteeConfig;
use crate::ecc::chip::EccInstructions;
use crate::instructions::MainGateInstructions;
use crate::signatures::schnorr::SchnorrSig;
use crate::signatures::threshold::{ThresholdVerifierConfig, ThresholdVerifierGate};
use crate::util::RegionCtx;

/// Instance row of the message.
pub const MSG_ROW: usize = 0;
/// Public inputs per committee member.
pub const INPUTS_PER_SIGNER: usize = 6;

/// First instance row of the member at `index`.
pub const fn signer_row(index: usize) -> usize {
    1 + INPUTS_PER_SIGNER * index
}

/// Circuit proving that enough committee members signed the message.
///
/// The constraint system depends on the [`CommitteeConfig`] only. The
/// threshold is a constant of the circuit, so keys generated for one
/// configuration cannot be used with a lower bar.
#[derive(Clone, Debug)]
pub struct ThresholdCircuit {
    committee: CommitteeConfig,
    pks: Vec<Value<pallas::Affine>>,
    signatures: Vec<Value<SchnorrSig>>,
    msg: Value<Base>,
}

impl ThresholdCircuit {
    /// Circuit without witnesses, used for key generation.
    pub fn new(committee: CommitteeConfig) -> Self {
        let n = committee.committee_size();
        ThresholdCircuit {
            committee,
            pks: vec![Value::unknown(); n],
            signatures: vec![Value::unknown(); n],
            msg: Value::unknown(),
        }
    }

    /// Circuit with known witnesses. Lengths are checked by the caller.
    pub(crate) fn with_witness(
        committee: CommitteeConfig,
        pks: Vec<pallas::Affine>,
        signatures: Vec<SchnorrSig>,
        msg: Base,
    ) -> Self {
        ThresholdCircuit {
            committee,
            pks: pks.into_iter().map(Value::known).collect(),
            signatures: signatures.into_iter().map(Value::known).collect(),
            msg: Value::known(msg),
        }
    }

    /// Configuration the circuit was built for.
    pub fn committee(&self) -> &CommitteeConfig {
        &self.committee
    }
}

impl Circuit<Base> for ThresholdCircuit {
    type Config = ThresholdVerifierConfig;
    type FloorPlanner = SimpleFloorPlanner;

    fn without_witnesses(&self) -> Self {
        Self::new(self.committee.clone())
    }

    fn configure(meta: &mut ConstraintSystem<Base>) -> Self::Config {
        ThresholdVerifierGate::configure(meta)
    }

    fn synthesize(&self, config: Self::Config, mut layouter: impl Layouter<Base>) -> Result<(), Error> {
        let n = self.committee.committee_size();
        if self.pks.len() != n || self.signatures.len() != n {
            return Err(Error::Synthesis);
        }

        let threshold_gate = ThresholdVerifierGate::new(config.clone());
        let ecc_gate = &threshold_gate.schnorr_gate.ecc_gate;

        let (msg, pks, signatures) = layouter.assign_region(
            || "public inputs",
            |region| {
                let mut ctx = RegionCtx::new(region, 0);
                let msg = ecc_gate.main_gate.assign_value(&mut ctx, self.msg)?;

                let mut pks = Vec::with_capacity(n);
                let mut signatures = Vec::with_capacity(n);
                for (pk, signature) in self.pks.iter().zip(self.signatures.iter()) {
                    pks.push(ecc_gate.witness_point(&mut ctx, pk)?);
                    let announcement =
                        ecc_gate.witness_point(&mut ctx, &signature.map(|sig| sig.0))?;
                    let response = ecc_gate.witness_scalar(&mut ctx, &signature.map(|sig| sig.1))?;
                    signatures.push((announcement, response));
                }

                Ok((msg, pks, signatures))
            },
        )?;

        let instance = config.maingate_config().instance();
        layouter.constrain_instance(msg.cell(), instance, MSG_ROW)?;
        for (i, (pk, (announcement, response))) in pks.iter().zip(signatures.iter()).enumerate() {
            let cells = [
                &pk.x,
                &pk.y,
                &announcement.x,
                &announcement.y,
                &response.lo,
                &response.hi,
            ];
            for (offset, cell) in cells.into_iter().enumerate() {
                layouter.constrain_instance(cell.cell(), instance, signer_row(i) + offset)?;
            }
        }

        threshold_gate.verify(
            layouter.namespace(|| "threshold verification"),
            &signatures,
            &pks,
            &msg,
            self.committee.threshold(),
            self.committee.count_bits(),
        )
    }
}
