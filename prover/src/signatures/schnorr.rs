//! Schnorr signature verification
//!
//! The gate does not assert validity. It returns a condition cell that is `1`
//! for a valid signature and `0` otherwise, and every witness satisfies its
//! constraints either way, so a caller can count valid signatures.

use group::prime::PrimeCurveAffine;
use halo2_gadgets::poseidon::primitives::{ConstantLength, P128Pow5T3};
use halo2_gadgets::poseidon::{Hash as PoseidonHash, Pow5Chip, Pow5Config};
use halo2_proofs::circuit::{Chip, Layouter};
use halo2_proofs::plonk::{ConstraintSystem, Error};
use pasta_curves::pallas::{self, Base};

use crate::ecc::chip::{AssignedEccPoint, AssignedScalar, EccChip, EccConfig, EccInstructions};
use crate::main_gate::MainGate;
use crate::util::RegionCtx;
use crate::{AssignedCondition, AssignedValue};

pub use super::primitive::schnorr::SchnorrSig;

/// Type of a Schnorr Signature
pub type AssignedSchnorrSignature = (AssignedEccPoint, AssignedScalar);

/// Configuration for SchnorrVerifierGate
#[derive(Clone, Debug)]
pub struct SchnorrVerifierConfig {
    poseidon_config: Pow5Config<Base, 3, 2>,
    pub(crate) ecc_config: EccConfig,
}

/// Schnorr verifier Gate. It consists of a poseidon hash chip and ecc chip.
#[derive(Clone, Debug)]
pub struct SchnorrVerifierGate {
    pub(crate) ecc_gate: EccChip,
    config: SchnorrVerifierConfig,
}

impl SchnorrVerifierGate {
    /// Initialise the gate
    pub fn new(config: SchnorrVerifierConfig) -> Self {
        Self {
            ecc_gate: EccChip::new(config.ecc_config.clone()),
            config,
        }
    }

    /// Configure the schnorr gate, together with the main gate and the ecc
    /// chip it builds on.
    pub fn configure(meta: &mut ConstraintSystem<Base>) -> SchnorrVerifierConfig {
        let constants = meta.fixed_column();
        let maingate_config = MainGate::configure(meta, constants);

        // The permutation state lives in the main gate columns.
        let rc_a = [(); 3].map(|_| meta.fixed_column());
        let rc_b = [(); 3].map(|_| meta.fixed_column());
        let poseidon_config = Pow5Chip::<Base, 3, 2>::configure::<P128Pow5T3>(
            meta,
            [maingate_config.a, maingate_config.b, maingate_config.c],
            maingate_config.d,
            rc_a,
            rc_b,
        );

        SchnorrVerifierConfig {
            poseidon_config,
            ecc_config: EccChip::configure(meta, maingate_config),
        }
    }

    /// Computes `c = H(R.x, pk.x, msg)` in circuit.
    fn challenge(
        &self,
        mut layouter: impl Layouter<Base>,
        announcement: &AssignedEccPoint,
        pk: &AssignedEccPoint,
        msg: &AssignedValue<Base>,
    ) -> Result<AssignedValue<Base>, Error> {
        let chip = Pow5Chip::<Base, 3, 2>::construct(self.config.poseidon_config.clone());
        let hasher =
            PoseidonHash::<_, Pow5Chip<Base, 3, 2>, P128Pow5T3, ConstantLength<3>, 3, 2>::init(
                chip,
                layouter.namespace(|| "init challenge hash"),
            )?;

        hasher.hash(
            layouter.namespace(|| "H(R.x, pk.x, msg)"),
            [announcement.x(), pk.x(), msg.clone()],
        )
    }

    /// Schnorr verifier instruction. Returns `1` if `s·G = R + c·pk` and `0`
    /// otherwise.
    pub fn verify(
        &self,
        mut layouter: impl Layouter<Base>,
        signature: &AssignedSchnorrSignature,
        pk: &AssignedEccPoint,
        msg: &AssignedValue<Base>,
    ) -> Result<AssignedCondition<Base>, Error> {
        let challenge = self.challenge(layouter.namespace(|| "challenge"), &signature.0, pk, msg)?;

        layouter.assign_region(
            || "schnorr verification",
            |region| {
                let mut ctx = RegionCtx::new(region, 0);
                let generator = self
                    .ecc_gate
                    .constant_point(&mut ctx, pallas::Affine::generator())?;

                let response = self.ecc_gate.scalar_var(&mut ctx, &signature.1)?;
                let challenge = self.ecc_gate.scalar_var_from_base(&mut ctx, &challenge)?;

                let lhs = self.ecc_gate.mul(&mut ctx, &response, &generator)?;
                let challenge_pk = self.ecc_gate.mul(&mut ctx, &challenge, pk)?;
                let rhs = self.ecc_gate.add(&mut ctx, &signature.0, &challenge_pk)?;

                self.ecc_gate.is_equal(&mut ctx, &lhs, &rhs)
            },
        )
    }
}

impl Chip<Base> for SchnorrVerifierGate {
    type Config = SchnorrVerifierConfig;
    type Loaded = ();

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn loaded(&self) -> &Self::Loaded {
        &()
    }
}
