use super::AssignedEccPoint;

use halo2_proofs::{
    arithmetic::CurveAffine,
    circuit::Value,
    plonk::{Advice, Column, ConstraintSystem, Error, Expression, Selector, VirtualCells},
    poly::Rotation,
};
use pasta_curves::pallas;

use crate::util::{coordinates, RegionCtx};
use crate::AssignedValue;

type Coordinates = (AssignedValue<pallas::Base>, AssignedValue<pallas::Base>);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    q_point: Selector,
    // x-coordinate
    pub x: Column<Advice>,
    // y-coordinate
    pub y: Column<Advice>,
}

impl Config {
    pub(super) fn configure(
        meta: &mut ConstraintSystem<pallas::Base>,
        x: Column<Advice>,
        y: Column<Advice>,
    ) -> Self {
        let config = Self {
            q_point: meta.selector(),
            x,
            y,
        };

        let curve_eqn = |meta: &mut VirtualCells<pallas::Base>| {
            let x = meta.query_advice(config.x, Rotation::cur());
            let y = meta.query_advice(config.y, Rotation::cur());

            // y^2 = x^3 + b
            y.square() - (x.clone().square() * x) - Expression::Constant(pallas::Affine::b())
        };

        meta.create_gate("witness point", |meta| {
            // Check that the point being witnessed is either:
            // - the identity, which is mapped to (0, 0) in affine coordinates; or
            // - a valid curve point y^2 = x^3 + b

            let q_point = meta.query_selector(config.q_point);
            let x = meta.query_advice(config.x, Rotation::cur());
            let y = meta.query_advice(config.y, Rotation::cur());

            [
                ("x == 0 v on_curve", q_point.clone() * x * curve_eqn(meta)),
                ("y == 0 v on_curve", q_point * y * curve_eqn(meta)),
            ]
        });

        config
    }

    fn assign_xy(
        &self,
        ctx: &mut RegionCtx<'_, pallas::Base>,
        value: &Value<(pallas::Base, pallas::Base)>,
    ) -> Result<Coordinates, Error> {
        // Assign `x` value
        let x_val = value.map(|value| value.0);
        let x_var = ctx.assign_advice(|| "x", self.x, x_val)?;

        // Assign `y` value
        let y_val = value.map(|value| value.1);
        let y_var = ctx.assign_advice(|| "y", self.y, y_val)?;

        ctx.next();

        Ok((x_var, y_var))
    }

    /// Assigns a point that can be the identity.
    pub(super) fn point(
        &self,
        ctx: &mut RegionCtx<'_, pallas::Base>,
        value: &Value<pallas::Affine>,
    ) -> Result<AssignedEccPoint, Error> {
        // Enable `q_point` selector
        ctx.enable(self.q_point)?;

        let value = value.map(|value| coordinates(&value));

        self.assign_xy(ctx, &value)
            .map(|(x, y)| AssignedEccPoint { x, y })
    }

    /// Assigns a point fixed by the circuit. The coordinates are copied from the
    /// constants column, so no curve check is needed.
    pub(super) fn constant_point(
        &self,
        ctx: &mut RegionCtx<'_, pallas::Base>,
        value: pallas::Affine,
    ) -> Result<AssignedEccPoint, Error> {
        let (x, y) = coordinates(&value);
        let x = ctx.assign_advice_from_constant(|| "fixed x", self.x, x)?;
        let y = ctx.assign_advice_from_constant(|| "fixed y", self.y, y)?;
        ctx.next();

        Ok(AssignedEccPoint { x, y })
    }
}
