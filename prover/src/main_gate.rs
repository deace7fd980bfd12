//! The `main_gate` is a five width standard like PLONK gate
//! that constrains the equation below:
//!
//! q_a * a + q_b * b + q_c * c + q_d * d + q_e * e +
//! q_mul_ab * a * b +
//! q_mul_cd * c * d +
//! q_e_next * e_next +
//! q_constant
//! = 0
//!
//! Next to it lives a bit decomposition gate, active under `q_bit`, which reads
//! `a` as a bit and `b` as an MSB-first running sum:
//!
//! a * (1 - a) = 0
//! b_next - 2 * b - a = 0

use std::marker::PhantomData;

use ff::PrimeField;
use halo2_proofs::circuit::Chip;
use halo2_proofs::plonk::{
    Advice, Column, ConstraintSystem, Constraints, Expression, Fixed, Instance, Selector,
};
use halo2_proofs::poly::Rotation;

const WIDTH: usize = 5;

/// `ColumnTags` is an helper to find special columns that are frequently used
/// across gates
pub trait ColumnTags<Column> {
    /// Next row accumulator
    fn next() -> Column;
    /// First column
    fn first() -> Column;
}

/// Enumerates columns of the main gate
#[derive(Debug)]
pub enum MainGateColumn {
    /// A
    A = 0,
    /// B
    B = 1,
    /// C
    C = 2,
    /// D
    D = 3,
    /// E
    E = 4,
}

impl ColumnTags<MainGateColumn> for MainGateColumn {
    fn first() -> Self {
        MainGateColumn::A
    }

    fn next() -> Self {
        MainGateColumn::E
    }
}

/// Config defines fixed and witness columns of the main gate
#[derive(Clone, Debug)]
pub struct MainGateConfig {
    pub(crate) a: Column<Advice>,
    pub(crate) b: Column<Advice>,
    pub(crate) c: Column<Advice>,
    pub(crate) d: Column<Advice>,
    pub(crate) e: Column<Advice>,

    pub(crate) sa: Column<Fixed>,
    pub(crate) sb: Column<Fixed>,
    pub(crate) se: Column<Fixed>,

    pub(crate) se_next: Column<Fixed>,

    pub(crate) s_mul_ab: Column<Fixed>,
    pub(crate) s_mul_cd: Column<Fixed>,

    pub(crate) s_constant: Column<Fixed>,

    pub(crate) instance: Column<Instance>,

    pub(crate) q_bit: Selector,
}

impl MainGateConfig {
    /// Returns advice columns of `MainGateConfig`
    pub fn advices(&self) -> [Column<Advice>; WIDTH] {
        [self.a, self.b, self.c, self.d, self.e]
    }

    /// Returns the column of the given tag
    pub fn column(&self, tag: MainGateColumn) -> Column<Advice> {
        self.advices()[tag as usize]
    }

    /// Returns the public input column
    pub fn instance(&self) -> Column<Instance> {
        self.instance
    }
}

/// MainGate implements instructions with [`MainGateConfig`]
#[derive(Clone, Debug)]
pub struct MainGate<F: PrimeField> {
    config: MainGateConfig,
    _marker: PhantomData<F>,
}

impl<F: PrimeField> Chip<F> for MainGate<F> {
    type Config = MainGateConfig;
    type Loaded = ();

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn loaded(&self) -> &Self::Loaded {
        &()
    }
}

impl<F: PrimeField> MainGate<F> {
    /// Main Gate
    pub fn new(config: MainGateConfig) -> Self {
        MainGate {
            config,
            _marker: PhantomData,
        }
    }

    /// Configure polynomial relationship and returns the resulting Config.
    /// `constants` is enabled as the circuit wide constants column; it may be
    /// shared with other chips that only read it under their own selectors.
    pub fn configure(meta: &mut ConstraintSystem<F>, constants: Column<Fixed>) -> MainGateConfig {
        let a = meta.advice_column();
        let b = meta.advice_column();
        let c = meta.advice_column();
        let d = meta.advice_column();
        let e = meta.advice_column();

        let sa = meta.fixed_column();
        let sb = meta.fixed_column();
        let sc = meta.fixed_column();
        let sd = meta.fixed_column();
        let se = meta.fixed_column();

        let s_mul_ab = meta.fixed_column();
        let s_mul_cd = meta.fixed_column();

        let se_next = meta.fixed_column();
        let s_constant = meta.fixed_column();

        let instance = meta.instance_column();

        meta.enable_equality(a);
        meta.enable_equality(b);
        meta.enable_equality(c);
        meta.enable_equality(d);
        meta.enable_equality(e);
        meta.enable_equality(instance);
        meta.enable_constant(constants);

        let q_bit = meta.selector();

        meta.create_gate("main_gate", |meta| {
            let a = meta.query_advice(a, Rotation::cur());
            let b = meta.query_advice(b, Rotation::cur());
            let c = meta.query_advice(c, Rotation::cur());
            let d = meta.query_advice(d, Rotation::cur());
            let e_next = meta.query_advice(e, Rotation::next());
            let e = meta.query_advice(e, Rotation::cur());

            let sa = meta.query_fixed(sa);
            let sb = meta.query_fixed(sb);
            let sc = meta.query_fixed(sc);
            let sd = meta.query_fixed(sd);
            let se = meta.query_fixed(se);

            let se_next = meta.query_fixed(se_next);

            let s_mul_ab = meta.query_fixed(s_mul_ab);
            let s_mul_cd = meta.query_fixed(s_mul_cd);

            let s_constant = meta.query_fixed(s_constant);

            vec![
                a.clone() * sa
                    + b.clone() * sb
                    + c.clone() * sc
                    + d.clone() * sd
                    + e * se
                    + a * b * s_mul_ab
                    + c * d * s_mul_cd
                    + se_next * e_next
                    + s_constant,
            ]
        });

        meta.create_gate("bit decomposition", |meta| {
            let q_bit = meta.query_selector(q_bit);
            let bit = meta.query_advice(a, Rotation::cur());
            let acc = meta.query_advice(b, Rotation::cur());
            let acc_next = meta.query_advice(b, Rotation::next());

            let one = Expression::Constant(F::ONE);
            let two = Expression::Constant(F::from(2));

            Constraints::with_selector(
                q_bit,
                [
                    ("bit is boolean", bit.clone() * (one - bit.clone())),
                    ("running sum", acc_next - acc * two - bit),
                ],
            )
        });

        MainGateConfig {
            a,
            b,
            c,
            d,
            e,
            sa,
            sb,
            se,
            se_next,
            s_constant,
            s_mul_ab,
            s_mul_cd,
            instance,
            q_bit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::RegionCtx;
    use ff::Field;
    use halo2_proofs::circuit::{Layouter, SimpleFloorPlanner, Value};
    use halo2_proofs::dev::MockProver;
    use halo2_proofs::plonk::{Circuit, Error};
    use pasta_curves::pallas::Base;

    const K: u32 = 6;

    // Lays out three main gate rows by hand:
    //   a * b - e = 0
    //   a + e - e_next = 0
    //   a - constant = 0
    // followed by a two step bit decomposition of `bits`.
    #[derive(Clone, Debug)]
    struct TestCircuit {
        a: Base,
        b: Base,
        product: Base,
        sum: Base,
        constant: Base,
        bits: [Base; 2],
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
            layouter.assign_region(
                || "raw rows",
                |region| {
                    let mut ctx = RegionCtx::new(region, 0);

                    ctx.assign_advice(|| "a", config.a, Value::known(self.a))?;
                    ctx.assign_advice(|| "b", config.b, Value::known(self.b))?;
                    ctx.assign_advice(|| "e", config.e, Value::known(self.product))?;
                    ctx.assign_fixed(|| "s_mul_ab", config.s_mul_ab, Base::ONE)?;
                    ctx.assign_fixed(|| "se", config.se, -Base::ONE)?;
                    ctx.next();

                    ctx.assign_advice(|| "a", config.a, Value::known(self.a))?;
                    ctx.assign_advice(|| "e", config.e, Value::known(self.product))?;
                    ctx.assign_fixed(|| "sa", config.sa, Base::ONE)?;
                    ctx.assign_fixed(|| "se", config.se, Base::ONE)?;
                    ctx.assign_fixed(|| "se_next", config.se_next, -Base::ONE)?;
                    ctx.next();

                    ctx.assign_advice(|| "a", config.a, Value::known(self.a))?;
                    ctx.assign_advice(|| "e", config.e, Value::known(self.sum))?;
                    ctx.assign_fixed(|| "sa", config.sa, Base::ONE)?;
                    ctx.assign_fixed(|| "s_constant", config.s_constant, -self.constant)?;
                    ctx.next();

                    let mut acc = Base::ZERO;
                    for bit in self.bits {
                        ctx.enable(config.q_bit)?;
                        ctx.assign_advice(|| "bit", config.a, Value::known(bit))?;
                        ctx.assign_advice(|| "acc", config.b, Value::known(acc))?;
                        acc = acc.double() + bit;
                        ctx.next();
                    }
                    ctx.assign_advice(|| "acc", config.b, Value::known(acc))?;

                    Ok(())
                },
            )
        }
    }

    fn valid() -> TestCircuit {
        TestCircuit {
            a: Base::from(3),
            b: Base::from(4),
            product: Base::from(12),
            sum: Base::from(15),
            constant: Base::from(3),
            bits: [Base::ONE, Base::ZERO],
        }
    }

    fn satisfied(circuit: &TestCircuit) -> bool {
        let prover = MockProver::run(K, circuit, vec![vec![]]).unwrap();
        prover.verify().is_ok()
    }

    #[test]
    fn fixed_coefficients_select_the_terms() {
        assert!(satisfied(&valid()));

        let wrong_product = TestCircuit {
            product: Base::from(13),
            ..valid()
        };
        assert!(!satisfied(&wrong_product));

        let wrong_sum = TestCircuit {
            sum: Base::from(16),
            ..valid()
        };
        assert!(!satisfied(&wrong_sum));

        let wrong_constant = TestCircuit {
            constant: Base::from(4),
            ..valid()
        };
        assert!(!satisfied(&wrong_constant));
    }

    #[test]
    fn bit_gate_rejects_non_boolean_values() {
        let two = TestCircuit {
            bits: [Base::from(2), Base::ZERO],
            ..valid()
        };
        assert!(!satisfied(&two));
    }
}
