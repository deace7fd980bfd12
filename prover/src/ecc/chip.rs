//! Chip implementations for the ECC gadgets.

use std::fmt::Debug;

use ff::{Field, PrimeField};
use halo2_proofs::{
    arithmetic::CurveAffine,
    circuit::{Chip, Value},
    plonk::{Column, ConstraintSystem, Error, Instance},
};
use pasta_curves::pallas::{self, Base};

pub(super) mod add;
pub(super) mod witness_point;

use crate::instructions::MainGateInstructions;
use crate::main_gate::{MainGate, MainGateConfig};
use crate::util::{scalar_limbs, RegionCtx, HIGH_LIMB_BITS, LIMB_BITS};
use crate::{AssignedCondition, AssignedValue};

/// A curve point represented in affine (x, y) coordinates, or the
/// identity represented as (0, 0).
/// Each coordinate is assigned to a cell.
#[derive(Clone, Debug)]
pub struct AssignedEccPoint {
    /// x-coordinate
    pub x: AssignedValue<Base>,
    /// y-coordinate
    pub y: AssignedValue<Base>,
}

impl AssignedEccPoint {
    /// The cell containing the affine x-coordinate,
    /// or 0 for the zero point.
    pub fn x(&self) -> AssignedValue<Base> {
        self.x.clone()
    }
}

/// A Pallas scalar split in two base field limbs, `s = lo + 2^128 * hi`.
#[derive(Clone, Debug)]
pub struct AssignedScalar {
    /// Low 128 bits
    pub lo: AssignedValue<Base>,
    /// High 127 bits
    pub hi: AssignedValue<Base>,
}

/// Structure representing a scalar used in variable-base multiplication, as
/// boolean cells in little-endian order.
#[derive(Clone, Debug)]
pub struct ScalarVar(pub(crate) Vec<AssignedCondition<Base>>);

/// Configuration for [`EccChip`].
#[derive(Clone, Debug)]
pub struct EccConfig {
    /// Main gate, whose advice columns hold the coordinates
    pub(crate) maingate_config: MainGateConfig,

    /// Addition
    pub(crate) add: add::Config,

    /// Witness point
    witness_point: witness_point::Config,
}

/// An [`EccInstructions`] chip over the Pallas curve. It shares the five advice
/// columns of the main gate and adds seven of its own.
#[derive(Clone, Debug)]
pub struct EccChip {
    pub main_gate: MainGate<Base>,
    pub(crate) config: EccConfig,
}

impl EccChip {
    /// Given config creates new chip
    pub fn new(config: EccConfig) -> Self {
        Self {
            main_gate: MainGate::new(config.maingate_config.clone()),
            config,
        }
    }

    /// Configures the addition and point gates on top of `maingate_config`
    pub fn configure(
        meta: &mut ConstraintSystem<Base>,
        maingate_config: MainGateConfig,
    ) -> EccConfig {
        // we reuse maingate's columns for the coordinates and the slope
        let x_p = maingate_config.a;
        let y_p = maingate_config.b;
        let x_qr = maingate_config.c;
        let y_qr = maingate_config.d;
        let lambda = maingate_config.e;

        let helpers = [(); 4].map(|_| meta.advice_column());
        let select = [(); 3].map(|_| meta.advice_column());

        let add = add::Config::configure(meta, x_p, y_p, x_qr, y_qr, lambda, helpers, select);
        let witness_point = witness_point::Config::configure(meta, x_p, y_p);

        EccConfig {
            maingate_config,
            add,
            witness_point,
        }
    }

    /// Get the instance column
    pub fn instance_col(&self) -> Column<Instance> {
        self.config.maingate_config.instance
    }
}

impl Chip<Base> for EccChip {
    type Config = EccConfig;
    type Loaded = ();

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn loaded(&self) -> &Self::Loaded {
        &()
    }
}

/// The set of circuit instructions required to use the ECC gadgets.
pub trait EccInstructions<C: CurveAffine>: Chip<C::Base> + Clone + Debug {
    /// Variable representing a scalar used in variable-base scalar mul.
    type ScalarVar: Clone + Debug;
    /// Variable representing a scalar of the curve as it is witnessed.
    type Scalar: Clone + Debug;
    /// Variable representing an elliptic curve point.
    type Point: Clone + Debug;

    /// Witnesses the given point as a private input to the circuit.
    /// This allows the point to be the identity, mapped to (0, 0) in
    /// affine coordinates.
    fn witness_point(
        &self,
        ctx: &mut RegionCtx<'_, C::Base>,
        value: &Value<C>,
    ) -> Result<Self::Point, Error>;

    /// Assigns a point fixed by the circuit, such as the generator.
    fn constant_point(
        &self,
        ctx: &mut RegionCtx<'_, C::Base>,
        value: C,
    ) -> Result<Self::Point, Error>;

    /// Witnesses a full-width scalar.
    fn witness_scalar(
        &self,
        ctx: &mut RegionCtx<'_, C::Base>,
        value: &Value<C::Scalar>,
    ) -> Result<Self::Scalar, Error>;

    /// Decomposes a witnessed scalar into the bits used by [`Self::mul`].
    fn scalar_var(
        &self,
        ctx: &mut RegionCtx<'_, C::Base>,
        scalar: &Self::Scalar,
    ) -> Result<Self::ScalarVar, Error>;

    /// Decomposes a base field element into the bits used by [`Self::mul`].
    /// The multiplication then uses the integer value of the element.
    fn scalar_var_from_base(
        &self,
        ctx: &mut RegionCtx<'_, C::Base>,
        value: &AssignedValue<C::Base>,
    ) -> Result<Self::ScalarVar, Error>;

    /// Performs complete point addition, returning `a + b`.
    fn add(
        &self,
        ctx: &mut RegionCtx<'_, C::Base>,
        a: &Self::Point,
        b: &Self::Point,
    ) -> Result<Self::Point, Error>;

    /// Performs variable-base scalar multiplication, returning `[scalar] base`.
    fn mul(
        &self,
        ctx: &mut RegionCtx<'_, C::Base>,
        scalar: &Self::ScalarVar,
        base: &Self::Point,
    ) -> Result<Self::Point, Error>;

    /// Returns a condition that is `1` if `a == b` and `0` otherwise. Unlike
    /// an equality constraint, both outcomes satisfy the circuit.
    fn is_equal(
        &self,
        ctx: &mut RegionCtx<'_, C::Base>,
        a: &Self::Point,
        b: &Self::Point,
    ) -> Result<AssignedCondition<C::Base>, Error>;
}

impl EccInstructions<pallas::Affine> for EccChip {
    type ScalarVar = ScalarVar;
    type Scalar = AssignedScalar;
    type Point = AssignedEccPoint;

    fn witness_point(
        &self,
        ctx: &mut RegionCtx<'_, Base>,
        value: &Value<pallas::Affine>,
    ) -> Result<Self::Point, Error> {
        self.config.witness_point.point(ctx, value)
    }

    fn constant_point(
        &self,
        ctx: &mut RegionCtx<'_, Base>,
        value: pallas::Affine,
    ) -> Result<Self::Point, Error> {
        self.config.witness_point.constant_point(ctx, value)
    }

    fn witness_scalar(
        &self,
        ctx: &mut RegionCtx<'_, Base>,
        value: &Value<pallas::Scalar>,
    ) -> Result<Self::Scalar, Error> {
        let limbs = value.map(|s| scalar_limbs(&s));
        let lo = self.main_gate.assign_value(ctx, limbs.map(|(lo, _)| lo))?;
        let hi = self.main_gate.assign_value(ctx, limbs.map(|(_, hi)| hi))?;

        Ok(AssignedScalar { lo, hi })
    }

    fn scalar_var(
        &self,
        ctx: &mut RegionCtx<'_, Base>,
        scalar: &Self::Scalar,
    ) -> Result<Self::ScalarVar, Error> {
        let mut bits = self.main_gate.to_bits(ctx, &scalar.lo, LIMB_BITS)?;
        bits.extend(self.main_gate.to_bits(ctx, &scalar.hi, HIGH_LIMB_BITS)?);

        Ok(ScalarVar(bits))
    }

    fn scalar_var_from_base(
        &self,
        ctx: &mut RegionCtx<'_, Base>,
        value: &AssignedValue<Base>,
    ) -> Result<Self::ScalarVar, Error> {
        let bits = self.main_gate.to_bits(ctx, value, Base::NUM_BITS as usize)?;

        Ok(ScalarVar(bits))
    }

    fn add(
        &self,
        ctx: &mut RegionCtx<'_, Base>,
        a: &Self::Point,
        b: &Self::Point,
    ) -> Result<Self::Point, Error> {
        let sum = self.config.add.assign_region(ctx, a, b)?;
        ctx.next();

        Ok(sum)
    }

    fn mul(
        &self,
        ctx: &mut RegionCtx<'_, Base>,
        scalar: &Self::ScalarVar,
        base: &Self::Point,
    ) -> Result<Self::Point, Error> {
        let add = &self.config.add;

        // Initialise the aggregator at the identity
        let mut aggr = AssignedEccPoint {
            x: ctx.assign_advice_from_constant(|| "x of identity", add.x_qr, Base::ZERO)?,
            y: ctx.assign_advice_from_constant(|| "y of identity", add.y_qr, Base::ZERO)?,
        };

        // Double-and-add, most significant bit first. Every step takes two
        // rows, and each addition leaves the aggregator in the `q` cells of
        // the row where the next addition happens.
        for (index, bit) in scalar.0.iter().rev().enumerate() {
            // We copy the aggregator into the `p` cells for doubling
            let aggr_p = AssignedEccPoint {
                x: ctx.copy_advice(|| format!("x aggregator {index}"), add.x_p, &aggr.x)?,
                y: ctx.copy_advice(|| format!("y aggregator {index}"), add.y_p, &aggr.y)?,
            };
            aggr = add.assign_add_in_place(ctx, &aggr_p, &aggr)?;

            // Aggr = Aggr + bit * base
            let selected = add.assign_select(ctx, bit, base)?;
            aggr = add.assign_add_in_place(ctx, &selected, &aggr)?;
        }
        ctx.next();

        Ok(aggr)
    }

    fn is_equal(
        &self,
        ctx: &mut RegionCtx<'_, Base>,
        a: &Self::Point,
        b: &Self::Point,
    ) -> Result<AssignedCondition<Base>, Error> {
        let x_equal = self.main_gate.is_equal(ctx, &a.x, &b.x)?;
        let y_equal = self.main_gate.is_equal(ctx, &a.y, &b.y)?;
        self.main_gate.and(ctx, &x_equal, &y_equal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::coordinates;
    use group::prime::PrimeCurveAffine;
    use group::{Curve, Group};
    use halo2_proofs::circuit::{Layouter, SimpleFloorPlanner};
    use halo2_proofs::dev::MockProver;
    use halo2_proofs::plonk::Circuit;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;

    const K: u32 = 11;

    #[derive(Clone, Copy, Debug)]
    enum Multiplier {
        Scalar(pallas::Scalar),
        Base(Base),
    }

    // Computes `[multiplier] point + addend` and exposes the result as (x, y)
    // at instance rows 0 and 1, and `point == addend` at row 2.
    #[derive(Clone, Debug)]
    struct TestCircuit {
        point: pallas::Affine,
        multiplier: Multiplier,
        addend: pallas::Affine,
    }

    impl Circuit<Base> for TestCircuit {
        type Config = EccConfig;
        type FloorPlanner = SimpleFloorPlanner;

        fn without_witnesses(&self) -> Self {
            self.clone()
        }

        fn configure(meta: &mut ConstraintSystem<Base>) -> Self::Config {
            let constants = meta.fixed_column();
            let maingate_config = MainGate::configure(meta, constants);
            EccChip::configure(meta, maingate_config)
        }

        fn synthesize(
            &self,
            config: Self::Config,
            mut layouter: impl Layouter<Base>,
        ) -> Result<(), Error> {
            let ecc_chip = EccChip::new(config);

            let (result, equal) = layouter.assign_region(
                || "Ecc mult test",
                |region| {
                    let offset = 0;
                    let mut ctx = RegionCtx::new(region, offset);
                    let assigned_point =
                        ecc_chip.witness_point(&mut ctx, &Value::known(self.point))?;
                    let assigned_addend =
                        ecc_chip.witness_point(&mut ctx, &Value::known(self.addend))?;

                    let scalar_var = match self.multiplier {
                        Multiplier::Scalar(s) => {
                            let scalar = ecc_chip.witness_scalar(&mut ctx, &Value::known(s))?;
                            ecc_chip.scalar_var(&mut ctx, &scalar)?
                        }
                        Multiplier::Base(b) => {
                            let value = ecc_chip.main_gate.assign_value(&mut ctx, Value::known(b))?;
                            ecc_chip.scalar_var_from_base(&mut ctx, &value)?
                        }
                    };

                    let product = ecc_chip.mul(&mut ctx, &scalar_var, &assigned_point)?;
                    let result = ecc_chip.add(&mut ctx, &product, &assigned_addend)?;
                    let equal = ecc_chip.is_equal(&mut ctx, &assigned_point, &assigned_addend)?;

                    Ok((result, equal))
                },
            )?;

            layouter.constrain_instance(result.x.cell(), ecc_chip.instance_col(), 0)?;
            layouter.constrain_instance(result.y.cell(), ecc_chip.instance_col(), 1)?;
            layouter.constrain_instance(equal.cell(), ecc_chip.instance_col(), 2)?;

            Ok(())
        }
    }

    fn instance(result: pallas::Point, equal: bool) -> Vec<Vec<Base>> {
        let (x, y) = coordinates(&result.to_affine());
        vec![vec![x, y, Base::from(equal as u64)]]
    }

    fn base_as_scalar(b: Base) -> pallas::Scalar {
        // Base elements are smaller than the scalar modulus.
        Option::from(pallas::Scalar::from_repr(b.to_repr())).unwrap()
    }

    #[test]
    fn test_ec_mul() {
        let mut rng = ChaCha8Rng::from_seed([0u8; 32]);
        let point = pallas::Point::random(&mut rng);
        let scalar = pallas::Scalar::random(&mut rng);
        let addend = pallas::Point::random(&mut rng);

        let circuit = TestCircuit {
            point: point.to_affine(),
            multiplier: Multiplier::Scalar(scalar),
            addend: addend.to_affine(),
        };

        let prover = MockProver::run(K, &circuit, instance(point * scalar + addend, false)).unwrap();
        assert!(prover.verify().is_ok());

        let prover = MockProver::run(K, &circuit, instance(point * scalar, false)).unwrap();
        assert!(prover.verify().is_err());
    }

    #[test]
    fn test_ec_mul_by_base_element() {
        let mut rng = ChaCha8Rng::from_seed([1u8; 32]);
        let point = pallas::Point::random(&mut rng);
        let multiplier = Base::random(&mut rng);
        let scalar = base_as_scalar(multiplier);

        let circuit = TestCircuit {
            point: point.to_affine(),
            multiplier: Multiplier::Base(multiplier),
            addend: pallas::Affine::identity(),
        };

        let prover = MockProver::run(K, &circuit, instance(point * scalar, false)).unwrap();
        assert!(prover.verify().is_ok());
    }

    #[test]
    fn test_ec_exceptional_cases() {
        let mut rng = ChaCha8Rng::from_seed([2u8; 32]);
        let point = pallas::Point::random(&mut rng);

        // [0] P + P = P, and the points compare equal.
        let circuit = TestCircuit {
            point: point.to_affine(),
            multiplier: Multiplier::Scalar(pallas::Scalar::ZERO),
            addend: point.to_affine(),
        };
        let prover = MockProver::run(K, &circuit, instance(point, true)).unwrap();
        assert!(prover.verify().is_ok());

        // [1] P + (-P) = O
        let circuit = TestCircuit {
            point: point.to_affine(),
            multiplier: Multiplier::Scalar(pallas::Scalar::ONE),
            addend: (-point).to_affine(),
        };
        let prover =
            MockProver::run(K, &circuit, instance(pallas::Point::identity(), false)).unwrap();
        assert!(prover.verify().is_ok());

        // [-1] P + P = O, where -1 exercises every bit of both limbs.
        let circuit = TestCircuit {
            point: point.to_affine(),
            multiplier: Multiplier::Scalar(-pallas::Scalar::ONE),
            addend: point.to_affine(),
        };
        let prover =
            MockProver::run(K, &circuit, instance(pallas::Point::identity(), true)).unwrap();
        assert!(prover.verify().is_ok());

        // [2] O + O = O
        let circuit = TestCircuit {
            point: pallas::Affine::identity(),
            multiplier: Multiplier::Scalar(pallas::Scalar::from(2)),
            addend: pallas::Affine::identity(),
        };
        let prover =
            MockProver::run(K, &circuit, instance(pallas::Point::identity(), true)).unwrap();
        assert!(prover.verify().is_ok());
    }
}
