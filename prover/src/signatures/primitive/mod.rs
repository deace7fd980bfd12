//! Native implementations of the signature schemes verified in circuit.

pub mod schnorr;
