use super::AssignedEccPoint;
use crate::util::RegionCtx;
use crate::AssignedCondition;
use ff::Field;
use halo2_proofs::{
    plonk::{Advice, Column, ConstraintSystem, Constraints, Error, Expression, Selector},
    poly::Rotation,
};
use pasta_curves::pallas::Base;

// Complete addition on a short Weierstrass curve y^2 = x^3 + b, with the identity
// encoded as (0, 0). For P + Q = R the gate constrains
//
// (x_q - x_p) * ((x_q - x_p) * λ - (y_q - y_p)) = 0
// (1 - (x_q - x_p) * α) * (2 * y_p * λ - 3 * x_p^2) = 0
// x_p * x_q * (x_q - x_p) * (λ^2 - x_p - x_q - x_r) = 0
// x_p * x_q * (x_q - x_p) * (λ * (x_p - x_r) - y_p - y_r) = 0
// x_p * x_q * (y_q + y_p) * (λ^2 - x_p - x_q - x_r) = 0
// x_p * x_q * (y_q + y_p) * (λ * (x_p - x_r) - y_p - y_r) = 0
// (1 - x_p * β) * (x_r - x_q) = 0
// (1 - x_p * β) * (y_r - y_q) = 0
// (1 - x_q * γ) * (x_r - x_p) = 0
// (1 - x_q * γ) * (y_r - y_p) = 0
// (1 - (x_q - x_p) * α - (y_q + y_p) * δ) * x_r = 0
// (1 - (x_q - x_p) * α - (y_q + y_p) * δ) * y_r = 0
//
// where α = inv0(x_q - x_p), β = inv0(x_p), γ = inv0(x_q), and
// δ = inv0(y_q + y_p) if x_q = x_p, 0 otherwise.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    q_add: Selector,
    q_select: Selector,
    // x-coordinate of P in P + Q = R
    pub x_p: Column<Advice>,
    // y-coordinate of P in P + Q = R
    pub y_p: Column<Advice>,
    // x-coordinate of Q or R in P + Q = R
    pub x_qr: Column<Advice>,
    // y-coordinate of Q or R in P + Q = R
    pub y_qr: Column<Advice>,
    // slope of the line through P and Q
    lambda: Column<Advice>,
    // α = inv0(x_q - x_p)
    alpha: Column<Advice>,
    // β = inv0(x_p)
    beta: Column<Advice>,
    // γ = inv0(x_q)
    gamma: Column<Advice>,
    // δ = inv0(y_q + y_p) if x_q = x_p, 0 otherwise
    delta: Column<Advice>,
    // selection bit and the point it selects, P = bit * B
    pub bit: Column<Advice>,
    x_b: Column<Advice>,
    y_b: Column<Advice>,
}

/// Witness values of one addition row.
struct AddWitness {
    lambda: Base,
    alpha: Base,
    beta: Base,
    gamma: Base,
    delta: Base,
    x_r: Base,
    y_r: Base,
}

fn inv0(value: Base) -> Base {
    value.invert().unwrap_or(Base::ZERO)
}

impl AddWitness {
    fn new(x_p: Base, y_p: Base, x_q: Base, y_q: Base) -> Self {
        let alpha = inv0(x_q - x_p);
        let beta = inv0(x_p);
        let gamma = inv0(x_q);
        let delta = if x_q == x_p {
            inv0(y_q + y_p)
        } else {
            Base::ZERO
        };

        let lambda = if x_q != x_p {
            (y_q - y_p) * alpha
        } else if !y_p.is_zero_vartime() {
            x_p.square() * Base::from(3) * inv0(y_p.double())
        } else {
            Base::ZERO
        };

        // No point on the curve has x = 0, so x = 0 means the identity.
        let (x_r, y_r) = if x_p.is_zero_vartime() {
            (x_q, y_q)
        } else if x_q.is_zero_vartime() {
            (x_p, y_p)
        } else if x_q == x_p && (y_q + y_p).is_zero_vartime() {
            (Base::ZERO, Base::ZERO)
        } else {
            let x_r = lambda.square() - x_p - x_q;
            let y_r = lambda * (x_p - x_r) - y_p;
            (x_r, y_r)
        };

        AddWitness {
            lambda,
            alpha,
            beta,
            gamma,
            delta,
            x_r,
            y_r,
        }
    }
}

impl Config {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn configure(
        meta: &mut ConstraintSystem<Base>,
        x_p: Column<Advice>,
        y_p: Column<Advice>,
        x_qr: Column<Advice>,
        y_qr: Column<Advice>,
        lambda: Column<Advice>,
        [alpha, beta, gamma, delta]: [Column<Advice>; 4],
        [bit, x_b, y_b]: [Column<Advice>; 3],
    ) -> Self {
        meta.enable_equality(x_p);
        meta.enable_equality(y_p);
        meta.enable_equality(x_qr);
        meta.enable_equality(y_qr);
        meta.enable_equality(bit);
        meta.enable_equality(x_b);
        meta.enable_equality(y_b);

        let config = Self {
            q_add: meta.selector(),
            q_select: meta.selector(),
            x_p,
            y_p,
            x_qr,
            y_qr,
            lambda,
            alpha,
            beta,
            gamma,
            delta,
            bit,
            x_b,
            y_b,
        };

        config.create_gate(meta);

        config
    }

    fn create_gate(&self, meta: &mut ConstraintSystem<Base>) {
        meta.create_gate("complete addition", |meta| {
            let q_add = meta.query_selector(self.q_add);
            let x_p = meta.query_advice(self.x_p, Rotation::cur());
            let y_p = meta.query_advice(self.y_p, Rotation::cur());
            let x_q = meta.query_advice(self.x_qr, Rotation::cur());
            let y_q = meta.query_advice(self.y_qr, Rotation::cur());
            let x_r = meta.query_advice(self.x_qr, Rotation::next());
            let y_r = meta.query_advice(self.y_qr, Rotation::next());
            let lambda = meta.query_advice(self.lambda, Rotation::cur());

            let alpha = meta.query_advice(self.alpha, Rotation::cur());
            let beta = meta.query_advice(self.beta, Rotation::cur());
            let gamma = meta.query_advice(self.gamma, Rotation::cur());
            let delta = meta.query_advice(self.delta, Rotation::cur());

            // Useful constants
            let one = Expression::Constant(Base::ONE);
            let two = Expression::Constant(Base::from(2));
            let three = Expression::Constant(Base::from(3));

            // Useful composite expressions
            // x_q - x_p
            let x_q_minus_x_p = x_q.clone() - x_p.clone();
            // y_q + y_p
            let y_q_plus_y_p = y_q.clone() + y_p.clone();
            // x_p * x_q
            let x_p_times_x_q = x_p.clone() * x_q.clone();
            // λ^2 - x_p - x_q - x_r
            let secant_x = lambda.clone().square() - x_p.clone() - x_q.clone() - x_r.clone();
            // λ * (x_p - x_r) - y_p - y_r
            let secant_y = lambda.clone() * (x_p.clone() - x_r.clone()) - y_p.clone() - y_r.clone();

            let poly1 = x_q_minus_x_p.clone()
                * (x_q_minus_x_p.clone() * lambda.clone() - (y_q.clone() - y_p.clone()));

            let poly2 = (one.clone() - x_q_minus_x_p.clone() * alpha.clone())
                * (two * y_p.clone() * lambda - three * x_p.clone().square());

            let poly3 = x_p_times_x_q.clone() * x_q_minus_x_p.clone() * secant_x.clone();
            let poly4 = x_p_times_x_q.clone() * x_q_minus_x_p.clone() * secant_y.clone();
            let poly5 = x_p_times_x_q.clone() * y_q_plus_y_p.clone() * secant_x;
            let poly6 = x_p_times_x_q * y_q_plus_y_p.clone() * secant_y;

            // P is the identity
            let p_is_identity = one.clone() - x_p.clone() * beta;
            let poly7 = p_is_identity.clone() * (x_r.clone() - x_q.clone());
            let poly8 = p_is_identity * (y_r.clone() - y_q.clone());

            // Q is the identity
            let q_is_identity = one.clone() - x_q * gamma;
            let poly9 = q_is_identity.clone() * (x_r.clone() - x_p);
            let poly10 = q_is_identity * (y_r.clone() - y_p);

            // P = -Q
            let p_is_minus_q = one - x_q_minus_x_p * alpha - y_q_plus_y_p * delta;
            let poly11 = p_is_minus_q.clone() * x_r;
            let poly12 = p_is_minus_q * y_r;

            Constraints::with_selector(
                q_add,
                [
                    ("secant slope", poly1),
                    ("tangent slope", poly2),
                    ("x_r, x_p != x_q", poly3),
                    ("y_r, x_p != x_q", poly4),
                    ("x_r, y_p != -y_q", poly5),
                    ("y_r, y_p != -y_q", poly6),
                    ("x_r, P = O", poly7),
                    ("y_r, P = O", poly8),
                    ("x_r, Q = O", poly9),
                    ("y_r, Q = O", poly10),
                    ("x_r, P = -Q", poly11),
                    ("y_r, P = -Q", poly12),
                ],
            )
        });

        meta.create_gate("select point", |meta| {
            let q_select = meta.query_selector(self.q_select);
            let bit = meta.query_advice(self.bit, Rotation::cur());
            let x_b = meta.query_advice(self.x_b, Rotation::cur());
            let y_b = meta.query_advice(self.y_b, Rotation::cur());
            let x_p = meta.query_advice(self.x_p, Rotation::cur());
            let y_p = meta.query_advice(self.y_p, Rotation::cur());

            let one = Expression::Constant(Base::ONE);

            Constraints::with_selector(
                q_select,
                [
                    ("bit is boolean", bit.clone() * (one - bit.clone())),
                    ("x_p = bit * x_b", x_p - bit.clone() * x_b),
                    ("y_p = bit * y_b", y_p - bit * y_b),
                ],
            )
        });
    }

    /// Adds the point held in (x_p, y_p) to the point held in (x_qr, y_qr) on the
    /// current row. The sum is assigned to (x_qr, y_qr) on the next row.
    ///
    /// This function calls `ctx.next()` once, leaving the offset at the row where
    /// the result is stored, so it can serve as `Q` of a following addition.
    pub(super) fn assign_add_in_place(
        &self,
        ctx: &mut RegionCtx<'_, Base>,
        p: &AssignedEccPoint,
        q: &AssignedEccPoint,
    ) -> Result<AssignedEccPoint, Error> {
        ctx.enable(self.q_add)?;

        let witness = p
            .x
            .value()
            .zip(p.y.value())
            .zip(q.x.value().zip(q.y.value()))
            .map(|((x_p, y_p), (x_q, y_q))| AddWitness::new(*x_p, *y_p, *x_q, *y_q));

        ctx.assign_advice(|| "lambda", self.lambda, witness.as_ref().map(|w| w.lambda))?;
        ctx.assign_advice(|| "alpha", self.alpha, witness.as_ref().map(|w| w.alpha))?;
        ctx.assign_advice(|| "beta", self.beta, witness.as_ref().map(|w| w.beta))?;
        ctx.assign_advice(|| "gamma", self.gamma, witness.as_ref().map(|w| w.gamma))?;
        ctx.assign_advice(|| "delta", self.delta, witness.as_ref().map(|w| w.delta))?;
        ctx.next();

        let x = ctx.assign_advice(|| "x_r", self.x_qr, witness.as_ref().map(|w| w.x_r))?;
        let y = ctx.assign_advice(|| "y_r", self.y_qr, witness.as_ref().map(|w| w.y_r))?;

        Ok(AssignedEccPoint { x, y })
    }

    /// Copies `p` and `q` into the current row and returns `p + q`. The offset is
    /// left at the row of the result.
    pub(super) fn assign_region(
        &self,
        ctx: &mut RegionCtx<'_, Base>,
        p: &AssignedEccPoint,
        q: &AssignedEccPoint,
    ) -> Result<AssignedEccPoint, Error> {
        let p = AssignedEccPoint {
            x: ctx.copy_advice(|| "x_p", self.x_p, &p.x)?,
            y: ctx.copy_advice(|| "y_p", self.y_p, &p.y)?,
        };
        let q = AssignedEccPoint {
            x: ctx.copy_advice(|| "x_q", self.x_qr, &q.x)?,
            y: ctx.copy_advice(|| "y_q", self.y_qr, &q.y)?,
        };

        self.assign_add_in_place(ctx, &p, &q)
    }

    /// Assigns `bit * base` to (x_p, y_p) on the current row, without moving to
    /// the next one.
    pub(super) fn assign_select(
        &self,
        ctx: &mut RegionCtx<'_, Base>,
        bit: &AssignedCondition<Base>,
        base: &AssignedEccPoint,
    ) -> Result<AssignedEccPoint, Error> {
        ctx.enable(self.q_select)?;

        let bit = ctx.copy_advice(|| "bit", self.bit, bit)?;
        let x_b = ctx.copy_advice(|| "x_b", self.x_b, &base.x)?;
        let y_b = ctx.copy_advice(|| "y_b", self.y_b, &base.y)?;

        let x = bit.value().zip(x_b.value()).map(|(bit, x)| *bit * *x);
        let y = bit.value().zip(y_b.value()).map(|(bit, y)| *bit * *y);

        Ok(AssignedEccPoint {
            x: ctx.assign_advice(|| "x_p", self.x_p, x)?,
            y: ctx.assign_advice(|| "y_p", self.y_p, y)?,
        })
    }
}
