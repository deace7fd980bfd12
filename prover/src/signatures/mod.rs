//! Threshold verification of committee signatures with Schnorr over Pallas.
//!
//! - [`primitive`] signs and verifies natively.
//! - [`schnorr`] turns one verification into a condition cell.
//! - [`threshold`] counts the conditions and compares the count against the
//!   threshold.

pub mod primitive;
pub mod schnorr;
pub mod threshold;
