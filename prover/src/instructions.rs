//! Arithmetic instructions over the [`MainGate`].
//!
//! Every instruction lays out one or more full rows of the main gate, starting at
//! the current offset of the context, and leaves the context on the first free row.

use ff::PrimeField;
use halo2_proofs::circuit::{Chip, Value};
use halo2_proofs::plonk::Error;

use crate::main_gate::MainGate;
use crate::util::{decompose, RegionCtx};
use crate::{AssignedCondition, AssignedValue};

/// Instructions of the [`MainGate`].
pub trait MainGateInstructions<F: PrimeField>: Chip<F> {
    /// Assigns a free witness value.
    fn assign_value(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        value: Value<F>,
    ) -> Result<AssignedValue<F>, Error>;

    /// Assigns a value fixed by the circuit.
    fn assign_constant(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        constant: F,
    ) -> Result<AssignedValue<F>, Error>;

    /// Returns `a + b`.
    fn add(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        a: &AssignedValue<F>,
        b: &AssignedValue<F>,
    ) -> Result<AssignedValue<F>, Error>;

    /// Returns `a - b`.
    fn sub(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        a: &AssignedValue<F>,
        b: &AssignedValue<F>,
    ) -> Result<AssignedValue<F>, Error>;

    /// Returns `a * b`.
    fn mul(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        a: &AssignedValue<F>,
        b: &AssignedValue<F>,
    ) -> Result<AssignedValue<F>, Error>;

    /// Conjunction of two conditions. Inputs are assumed to be boolean.
    fn and(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        a: &AssignedCondition<F>,
        b: &AssignedCondition<F>,
    ) -> Result<AssignedCondition<F>, Error> {
        self.mul(ctx, a, b)
    }

    /// Constrains `a` and `b` to be equal.
    fn assert_equal(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        a: &AssignedValue<F>,
        b: &AssignedValue<F>,
    ) -> Result<(), Error>;

    /// Returns a condition that is `1` if `a == b` and `0` otherwise. Both
    /// outcomes satisfy the constraints.
    fn is_equal(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        a: &AssignedValue<F>,
        b: &AssignedValue<F>,
    ) -> Result<AssignedCondition<F>, Error>;

    /// Decomposes `composed` into `num_bits` boolean cells, little-endian.
    /// Unsatisfiable if `composed` does not fit in `num_bits` bits.
    fn to_bits(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        composed: &AssignedValue<F>,
        num_bits: usize,
    ) -> Result<Vec<AssignedCondition<F>>, Error>;

    /// Constrains `lhs <= rhs`, where both are integers below `2^num_bits`.
    ///
    /// The field has no order, so both operands and their difference are
    /// range checked: if `rhs < lhs` the difference wraps around the modulus
    /// and does not fit in `num_bits` bits.
    fn assert_less_or_equal(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        lhs: &AssignedValue<F>,
        rhs: &AssignedValue<F>,
        num_bits: usize,
    ) -> Result<(), Error> {
        // Differences of values below 2^num_bits must not reach the modulus.
        if num_bits >= F::CAPACITY as usize {
            return Err(Error::Synthesis);
        }

        self.to_bits(ctx, lhs, num_bits)?;
        self.to_bits(ctx, rhs, num_bits)?;
        let difference = self.sub(ctx, rhs, lhs)?;
        self.to_bits(ctx, &difference, num_bits)?;

        Ok(())
    }
}

impl<F: PrimeField> MainGateInstructions<F> for MainGate<F> {
    fn assign_value(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        value: Value<F>,
    ) -> Result<AssignedValue<F>, Error> {
        let assigned = ctx.assign_advice(|| "value", self.config().a, value)?;
        ctx.next();
        Ok(assigned)
    }

    fn assign_constant(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        constant: F,
    ) -> Result<AssignedValue<F>, Error> {
        let config = self.config();
        let assigned = ctx.assign_advice(|| "constant", config.a, Value::known(constant))?;
        ctx.assign_fixed(|| "sa", config.sa, F::ONE)?;
        ctx.assign_fixed(|| "s_constant", config.s_constant, -constant)?;
        ctx.next();
        Ok(assigned)
    }

    fn add(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        a: &AssignedValue<F>,
        b: &AssignedValue<F>,
    ) -> Result<AssignedValue<F>, Error> {
        let config = self.config();
        let sum = a.value().zip(b.value()).map(|(a, b)| *a + *b);

        ctx.copy_advice(|| "a", config.a, a)?;
        ctx.copy_advice(|| "b", config.b, b)?;
        let sum = ctx.assign_advice(|| "a + b", config.e, sum)?;
        ctx.assign_fixed(|| "sa", config.sa, F::ONE)?;
        ctx.assign_fixed(|| "sb", config.sb, F::ONE)?;
        ctx.assign_fixed(|| "se", config.se, -F::ONE)?;
        ctx.next();

        Ok(sum)
    }

    fn sub(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        a: &AssignedValue<F>,
        b: &AssignedValue<F>,
    ) -> Result<AssignedValue<F>, Error> {
        let config = self.config();
        let difference = a.value().zip(b.value()).map(|(a, b)| *a - *b);

        ctx.copy_advice(|| "a", config.a, a)?;
        ctx.copy_advice(|| "b", config.b, b)?;
        let difference = ctx.assign_advice(|| "a - b", config.e, difference)?;
        ctx.assign_fixed(|| "sa", config.sa, F::ONE)?;
        ctx.assign_fixed(|| "sb", config.sb, -F::ONE)?;
        ctx.assign_fixed(|| "se", config.se, -F::ONE)?;
        ctx.next();

        Ok(difference)
    }

    fn mul(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        a: &AssignedValue<F>,
        b: &AssignedValue<F>,
    ) -> Result<AssignedValue<F>, Error> {
        let config = self.config();
        let product = a.value().zip(b.value()).map(|(a, b)| *a * *b);

        ctx.copy_advice(|| "a", config.a, a)?;
        ctx.copy_advice(|| "b", config.b, b)?;
        let product = ctx.assign_advice(|| "a * b", config.e, product)?;
        ctx.assign_fixed(|| "s_mul_ab", config.s_mul_ab, F::ONE)?;
        ctx.assign_fixed(|| "se", config.se, -F::ONE)?;
        ctx.next();

        Ok(product)
    }

    fn assert_equal(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        a: &AssignedValue<F>,
        b: &AssignedValue<F>,
    ) -> Result<(), Error> {
        ctx.constrain_equal(a.cell(), b.cell())
    }

    fn is_equal(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        a: &AssignedValue<F>,
        b: &AssignedValue<F>,
    ) -> Result<AssignedCondition<F>, Error> {
        let config = self.config();

        let difference = a.value().zip(b.value()).map(|(a, b)| *a - *b);
        let inverse = difference.map(|d| d.invert().unwrap_or(F::ZERO));
        let equal = difference.map(|d| if d.is_zero_vartime() { F::ONE } else { F::ZERO });

        // a * inv - b * inv + eq - 1 = 0
        ctx.copy_advice(|| "a", config.a, a)?;
        let inverse = ctx.assign_advice(|| "inv", config.b, inverse)?;
        ctx.copy_advice(|| "b", config.c, b)?;
        ctx.copy_advice(|| "inv", config.d, &inverse)?;
        let equal = ctx.assign_advice(|| "eq", config.e, equal)?;
        ctx.assign_fixed(|| "s_mul_ab", config.s_mul_ab, F::ONE)?;
        ctx.assign_fixed(|| "s_mul_cd", config.s_mul_cd, -F::ONE)?;
        ctx.assign_fixed(|| "se", config.se, F::ONE)?;
        ctx.assign_fixed(|| "s_constant", config.s_constant, -F::ONE)?;
        ctx.next();

        // a * eq - b * eq = 0
        ctx.copy_advice(|| "a", config.a, a)?;
        ctx.copy_advice(|| "eq", config.b, &equal)?;
        ctx.copy_advice(|| "b", config.c, b)?;
        ctx.copy_advice(|| "eq", config.d, &equal)?;
        ctx.assign_fixed(|| "s_mul_ab", config.s_mul_ab, F::ONE)?;
        ctx.assign_fixed(|| "s_mul_cd", config.s_mul_cd, -F::ONE)?;
        ctx.next();

        Ok(equal)
    }

    fn to_bits(
        &self,
        ctx: &mut RegionCtx<'_, F>,
        composed: &AssignedValue<F>,
        num_bits: usize,
    ) -> Result<Vec<AssignedCondition<F>>, Error> {
        let config = self.config();

        let decomposition = composed.value().map(|v| decompose(v, num_bits));
        let bits: Vec<Value<F>> = (0..num_bits)
            .map(|i| decomposition.as_ref().map(|bits| bits[i]))
            .collect();

        // The running sum starts at zero, enforced by the main gate on this row.
        let mut acc_value = Value::known(F::ZERO);
        let mut acc = ctx.assign_advice(|| "acc", config.b, acc_value)?;
        ctx.assign_fixed(|| "sb", config.sb, F::ONE)?;

        let mut assigned = Vec::with_capacity(num_bits);
        for bit in bits.into_iter().rev() {
            ctx.enable(config.q_bit)?;
            assigned.push(ctx.assign_advice(|| "bit", config.a, bit)?);
            acc_value = acc_value.zip(bit).map(|(acc, bit)| acc.double() + bit);
            ctx.next();
            acc = ctx.assign_advice(|| "acc", config.b, acc_value)?;
        }
        ctx.constrain_equal(acc.cell(), composed.cell())?;
        ctx.next();

        assigned.reverse();
        Ok(assigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::main_gate::MainGateConfig;
    use ff::Field;
    use halo2_proofs::circuit::{Layouter, SimpleFloorPlanner};
    use halo2_proofs::dev::MockProver;
    use halo2_proofs::plonk::{Circuit, ConstraintSystem};
    use pasta_curves::pallas::Base;

    const K: u32 = 8;

    #[derive(Clone, Debug)]
    enum Operation {
        IsEqual,
        LessOrEqual(usize),
        ToBits(usize),
    }

    // Exposes the result of `op` over (lhs, rhs) at instance row 0 when the
    // operation returns one, and the bits at rows 0.. for `ToBits`.
    #[derive(Clone, Debug)]
    struct TestCircuit {
        lhs: Base,
        rhs: Base,
        op: Operation,
    }

    impl Circuit<Base> for TestCircuit {
        type Config = MainGateConfig;
        type FloorPlanner = SimpleFloorPlanner;

        fn without_witnesses(&self) -> Self {
            self.clone()
        }

        fn configure(meta: &mut ConstraintSystem<Base>) -> Self::Config {
            let constants = meta.fixed_column();
            MainGate::configure(meta, constants)
        }

        fn synthesize(
            &self,
            config: Self::Config,
            mut layouter: impl Layouter<Base>,
        ) -> Result<(), Error> {
            let main_gate = MainGate::<Base>::new(config.clone());

            let outputs = layouter.assign_region(
                || "main gate test",
                |region| {
                    let mut ctx = RegionCtx::new(region, 0);
                    let lhs = main_gate.assign_value(&mut ctx, Value::known(self.lhs))?;
                    let rhs = main_gate.assign_value(&mut ctx, Value::known(self.rhs))?;

                    match self.op {
                        Operation::IsEqual => Ok(vec![main_gate.is_equal(&mut ctx, &lhs, &rhs)?]),
                        Operation::LessOrEqual(num_bits) => {
                            main_gate.assert_less_or_equal(&mut ctx, &lhs, &rhs, num_bits)?;
                            Ok(vec![])
                        }
                        Operation::ToBits(num_bits) => main_gate.to_bits(&mut ctx, &lhs, num_bits),
                    }
                },
            )?;

            for (row, output) in outputs.iter().enumerate() {
                layouter.constrain_instance(output.cell(), config.instance(), row)?;
            }

            Ok(())
        }
    }

    fn run(lhs: u64, rhs: u64, op: Operation, instance: Vec<Base>) -> bool {
        let circuit = TestCircuit {
            lhs: Base::from(lhs),
            rhs: Base::from(rhs),
            op,
        };
        let prover = MockProver::run(K, &circuit, vec![instance]).unwrap();
        prover.verify().is_ok()
    }

    #[test]
    fn is_equal_never_aborts() {
        assert!(run(7, 7, Operation::IsEqual, vec![Base::ONE]));
        assert!(run(7, 8, Operation::IsEqual, vec![Base::ZERO]));
        assert!(run(0, 0, Operation::IsEqual, vec![Base::ONE]));

        // The condition is bound to the actual comparison.
        assert!(!run(7, 8, Operation::IsEqual, vec![Base::ONE]));
        assert!(!run(7, 7, Operation::IsEqual, vec![Base::ZERO]));
    }

    #[test]
    fn to_bits_little_endian() {
        let bits = [1u64, 0, 1, 1, 0].map(Base::from).to_vec();
        assert!(run(0b01101, 0, Operation::ToBits(5), bits));

        // 32 does not fit in 5 bits.
        let zeros = vec![Base::ZERO; 5];
        assert!(!run(32, 0, Operation::ToBits(5), zeros));
    }

    #[test]
    fn less_or_equal_boundaries() {
        let num_bits = 7;
        assert!(run(72, 90, Operation::LessOrEqual(num_bits), vec![]));
        assert!(run(72, 72, Operation::LessOrEqual(num_bits), vec![]));
        assert!(run(0, 0, Operation::LessOrEqual(num_bits), vec![]));
        assert!(!run(72, 71, Operation::LessOrEqual(num_bits), vec![]));
        assert!(!run(72, 0, Operation::LessOrEqual(num_bits), vec![]));
        assert!(!run(1, 0, Operation::LessOrEqual(num_bits), vec![]));
    }

    #[test]
    fn less_or_equal_rejects_out_of_range_operands() {
        // 200 is not a 7 bit value even though 72 <= 200.
        assert!(!run(72, 200, Operation::LessOrEqual(7), vec![]));
    }
}
