//! We implement a gate that verifies that at least a threshold of the committee
//! signatures on a message are valid.
//!
//! Every signature goes through the non asserting [`SchnorrVerifierGate`], and
//! the resulting conditions are summed in a running count. Only the final
//! comparison against the threshold constrains the witness, so the circuit is
//! satisfiable exactly when enough signatures are valid, whichever they are.

use ff::Field;
use halo2_proofs::circuit::{Chip, Layouter};
use halo2_proofs::plonk::{ConstraintSystem, Error};
use pasta_curves::pallas::Base;

use crate::ecc::chip::AssignedEccPoint;
use crate::instructions::MainGateInstructions;
use crate::main_gate::{ColumnTags, MainGateColumn, MainGateConfig};
use crate::signatures::schnorr::{
    AssignedSchnorrSignature, SchnorrVerifierConfig, SchnorrVerifierGate,
};
use crate::util::RegionCtx;
use crate::{AssignedCondition, AssignedValue};

#[derive(Clone, Debug)]
pub struct ThresholdVerifierConfig {
    pub(crate) schnorr_config: SchnorrVerifierConfig,
}

impl ThresholdVerifierConfig {
    /// Configuration of the main gate shared by all chips.
    pub fn maingate_config(&self) -> &MainGateConfig {
        &self.schnorr_config.ecc_config.maingate_config
    }
}

#[derive(Clone, Debug)]
/// Threshold verifier gate. It consists of a schnorr chip, whose main gate
/// keeps the count.
pub struct ThresholdVerifierGate {
    pub(crate) schnorr_gate: SchnorrVerifierGate,
    config: ThresholdVerifierConfig,
}

impl ThresholdVerifierGate {
    /// Initialise the gate
    pub fn new(config: ThresholdVerifierConfig) -> Self {
        Self {
            schnorr_gate: SchnorrVerifierGate::new(config.schnorr_config.clone()),
            config,
        }
    }

    /// Configure the threshold gate
    pub fn configure(meta: &mut ConstraintSystem<Base>) -> ThresholdVerifierConfig {
        ThresholdVerifierConfig {
            schnorr_config: SchnorrVerifierGate::configure(meta),
        }
    }

    /// Threshold verifier instruction. Takes as input:
    /// * A list of signatures, one per committee member
    /// * The public keys of all committee members, in the same order
    /// * A message `msg`
    /// * The `threshold` of valid signatures, fixed by the circuit
    /// * The number of bits `count_bits` that holds any count up to the
    ///   committee size
    ///
    /// The circuit is satisfied if and only if at least `threshold` signatures
    /// are valid. Invalid signatures do not make the circuit unsatisfiable on
    /// their own.
    pub fn verify(
        &self,
        mut layouter: impl Layouter<Base>,
        signatures: &[AssignedSchnorrSignature],
        pks: &[AssignedEccPoint],
        msg: &AssignedValue<Base>,
        threshold: usize,
        count_bits: usize,
    ) -> Result<(), Error> {
        if signatures.len() != pks.len() {
            return Err(Error::Synthesis);
        }

        let indicators = signatures
            .iter()
            .zip(pks.iter())
            .enumerate()
            .map(|(i, (signature, pk))| {
                self.schnorr_gate.verify(
                    layouter.namespace(|| format!("signature {i}")),
                    signature,
                    pk,
                    msg,
                )
            })
            .collect::<Result<Vec<_>, Error>>()?;

        layouter.assign_region(
            || "threshold",
            |region| {
                let mut ctx = RegionCtx::new(region, 0);
                let count = self.accumulate(&mut ctx, &indicators)?;
                self.assert_threshold(&mut ctx, &count, threshold, count_bits)
            },
        )
    }

    /// Sums `indicators`, returning the count. The running count sits in
    /// consecutive rows of the accumulator column, starting from 0, and each
    /// row adds one indicator to it.
    pub fn accumulate(
        &self,
        ctx: &mut RegionCtx<'_, Base>,
        indicators: &[AssignedCondition<Base>],
    ) -> Result<AssignedValue<Base>, Error> {
        let config = self.config.maingate_config();
        let indicator_column = config.column(MainGateColumn::first());
        let count_column = config.column(MainGateColumn::next());

        let mut count = ctx.assign_advice_from_constant(|| "count 0", count_column, Base::ZERO)?;

        for (i, indicator) in indicators.iter().enumerate() {
            // count_next = count + indicator
            ctx.copy_advice(|| format!("indicator {i}"), indicator_column, indicator)?;
            ctx.assign_fixed(|| "sa", config.sa, Base::ONE)?;
            ctx.assign_fixed(|| "se", config.se, Base::ONE)?;
            ctx.assign_fixed(|| "se_next", config.se_next, -Base::ONE)?;

            let next = count
                .value()
                .zip(indicator.value())
                .map(|(count, indicator)| *count + *indicator);
            ctx.next();
            count = ctx.assign_advice(|| format!("count {}", i + 1), count_column, next)?;
        }
        ctx.next();

        Ok(count)
    }

    /// Constrains `threshold <= count`. The threshold is a constant of the
    /// circuit, not a witness.
    pub fn assert_threshold(
        &self,
        ctx: &mut RegionCtx<'_, Base>,
        count: &AssignedValue<Base>,
        threshold: usize,
        count_bits: usize,
    ) -> Result<(), Error> {
        let main_gate = &self.schnorr_gate.ecc_gate.main_gate;
        let threshold = main_gate.assign_constant(ctx, Base::from(threshold as u64))?;
        main_gate.assert_less_or_equal(ctx, &threshold, count, count_bits)
    }
}

impl Chip<Base> for ThresholdVerifierGate {
    type Config = ThresholdVerifierConfig;
    type Loaded = ();

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn loaded(&self) -> &Self::Loaded {
        &()
    }
}
