//! Elliptic curve operations over Pallas, whose base field is the circuit field.
//!
//! Points are affine `(x, y)` pairs with the identity encoded as `(0, 0)`. The
//! addition gate is complete, so scalar multiplication needs no special casing
//! of the identity or of doublings, and it never fails on adversarial inputs.

pub mod chip;
