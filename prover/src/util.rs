//! Helpers shared by the chips: a region context that tracks the current row, and
//! conversions between native values and the cells the chips assign.

use std::fmt;

use ff::{Field, PrimeField};
use halo2_proofs::{
    circuit::{AssignedCell, Cell, Region, Value},
    plonk::{Advice, Column, Error, Fixed, Selector},
};
use pasta_curves::arithmetic::{Coordinates, CurveAffine};
use pasta_curves::pallas;

use crate::AssignedValue;

/// A [`Region`] together with the row the next assignment goes to. Chips write
/// through the context and call [`RegionCtx::next`] once a row is complete.
pub struct RegionCtx<'a, F: Field> {
    region: Region<'a, F>,
    offset: usize,
}

impl<F: Field> fmt::Debug for RegionCtx<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionCtx")
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl<'a, F: Field> RegionCtx<'a, F> {
    /// Wraps `region`, starting at row `offset`.
    pub fn new(region: Region<'a, F>, offset: usize) -> Self {
        RegionCtx { region, offset }
    }

    /// Assigns a witness value to `column` at the current row.
    pub fn assign_advice<A, AR>(
        &mut self,
        annotation: A,
        column: Column<Advice>,
        value: Value<F>,
    ) -> Result<AssignedValue<F>, Error>
    where
        A: Fn() -> AR,
        AR: Into<String>,
    {
        self.region
            .assign_advice(annotation, column, self.offset, || value)
    }

    /// Assigns a constant to an advice cell at the current row. The cell is
    /// copy-constrained to the fixed constants column.
    pub fn assign_advice_from_constant<A, AR>(
        &mut self,
        annotation: A,
        column: Column<Advice>,
        constant: F,
    ) -> Result<AssignedValue<F>, Error>
    where
        A: Fn() -> AR,
        AR: Into<String>,
    {
        self.region
            .assign_advice_from_constant(annotation, column, self.offset, constant)
    }

    /// Sets a fixed coefficient at the current row.
    pub fn assign_fixed<A, AR>(
        &mut self,
        annotation: A,
        column: Column<Fixed>,
        value: F,
    ) -> Result<AssignedCell<F, F>, Error>
    where
        A: Fn() -> AR,
        AR: Into<String>,
    {
        self.region
            .assign_fixed(annotation, column, self.offset, || Value::known(value))
    }

    /// Copies `cell` into `column` at the current row.
    pub fn copy_advice<A, AR>(
        &mut self,
        annotation: A,
        column: Column<Advice>,
        cell: &AssignedValue<F>,
    ) -> Result<AssignedValue<F>, Error>
    where
        A: Fn() -> AR,
        AR: Into<String>,
    {
        cell.copy_advice(annotation, &mut self.region, column, self.offset)
    }

    /// Constrains two cells to hold the same value.
    pub fn constrain_equal(&mut self, a: Cell, b: Cell) -> Result<(), Error> {
        self.region.constrain_equal(a, b)
    }

    /// Enables `selector` at the current row.
    pub fn enable(&mut self, selector: Selector) -> Result<(), Error> {
        selector.enable(&mut self.region, self.offset)
    }

    /// Moves to the next row.
    pub fn next(&mut self) {
        self.offset += 1
    }
}

/// Affine coordinates of `point`, with the identity mapped to `(0, 0)`.
pub fn coordinates(point: &pallas::Affine) -> (pallas::Base, pallas::Base) {
    Option::from(point.coordinates())
        .map(|c: Coordinates<pallas::Affine>| (*c.x(), *c.y()))
        .unwrap_or((pallas::Base::ZERO, pallas::Base::ZERO))
}

/// Number of bits in the low limb of a scalar.
pub const LIMB_BITS: usize = 128;
/// Number of bits in the high limb of a scalar. Pallas scalars are below 2^255.
pub const HIGH_LIMB_BITS: usize = 127;

/// Splits a Pallas scalar into two base field limbs `(lo, hi)` with
/// `s = lo + 2^128 · hi`, `lo < 2^128` and `hi < 2^127`.
pub fn scalar_limbs(scalar: &pallas::Scalar) -> (pallas::Base, pallas::Base) {
    let repr = scalar.to_repr();
    let mut lo = [0u8; 16];
    let mut hi = [0u8; 16];
    lo.copy_from_slice(&repr[..16]);
    hi.copy_from_slice(&repr[16..]);

    (
        pallas::Base::from_u128(u128::from_le_bytes(lo)),
        pallas::Base::from_u128(u128::from_le_bytes(hi)),
    )
}

/// The `num_bits` least significant bits of `value` as field elements,
/// little-endian. Assumes a little-endian `Repr`, as used by the pasta fields.
pub fn decompose<F: PrimeField>(value: &F, num_bits: usize) -> Vec<F> {
    let repr = value.to_repr();
    let bytes = repr.as_ref();

    (0..num_bits)
        .map(|i| {
            let bit = bytes
                .get(i / 8)
                .map_or(false, |byte| (byte >> (i % 8)) & 1 == 1);
            if bit {
                F::ONE
            } else {
                F::ZERO
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use group::prime::PrimeCurveAffine;
    use group::{Curve, Group};
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;

    #[test]
    fn limbs_recompose_to_scalar() {
        let mut rng = ChaCha8Rng::from_seed([0u8; 32]);
        let two_128 = pallas::Base::from_u128(1 << 64).square();

        for _ in 0..8 {
            let s = pallas::Scalar::random(&mut rng);
            let (lo, hi) = scalar_limbs(&s);

            let lo_bits = decompose(&lo, 255);
            let hi_bits = decompose(&hi, 255);
            assert!(lo_bits[LIMB_BITS..].iter().all(|b| b.is_zero_vartime()));
            assert!(hi_bits[HIGH_LIMB_BITS..].iter().all(|b| b.is_zero_vartime()));

            let recomposed = lo + two_128 * hi;
            assert_eq!(recomposed.to_repr(), s.to_repr());
        }
    }

    #[test]
    fn decompose_small_values() {
        let bits = decompose(&pallas::Base::from(0b1011u64), 6);
        let expected = [1u64, 1, 0, 1, 0, 0].map(pallas::Base::from);
        assert_eq!(bits, expected.to_vec());
    }

    #[test]
    fn identity_maps_to_origin() {
        let mut rng = ChaCha8Rng::from_seed([1u8; 32]);
        assert_eq!(
            coordinates(&pallas::Affine::identity()),
            (pallas::Base::ZERO, pallas::Base::ZERO)
        );

        let point = pallas::Point::random(&mut rng).to_affine();
        let (x, y) = coordinates(&point);
        assert_eq!(y.square(), x.square() * x + pallas::Affine::b());
    }
}
