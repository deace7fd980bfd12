//! Errors returned by the configuration, witness and proving layers.
//!
//! Gadgets return [`halo2_proofs::plonk::Error`] like any other halo2 chip;
//! it surfaces here as [`Error::Backend`].

use thiserror::Error;

use crate::config::{CurveId, HashId};

/// Errors of the light client prover.
#[derive(Debug, Error)]
pub enum Error {
    /// A committee needs at least one member.
    #[error("committee size must be at least 1")]
    EmptyCommittee,

    /// The signature curve has no in-circuit implementation.
    #[error("unsupported signature curve: {0:?}")]
    UnsupportedCurve(CurveId),

    /// The hash function has no in-circuit implementation.
    #[error("unsupported hash function: {0:?}")]
    UnsupportedHash(HashId),

    /// The witness does not have one public key and one signature per member.
    #[error(
        "committee has {expected} members, got {public_keys} public keys and {signatures} signatures"
    )]
    CommitteeSizeMismatch {
        /// Committee size
        expected: usize,
        /// Number of public keys provided
        public_keys: usize,
        /// Number of signatures provided
        signatures: usize,
    },

    /// The public input vector does not match the instance layout.
    #[error("expected {expected} public inputs, got {actual}")]
    PublicInputLength {
        /// Length of the instance layout
        expected: usize,
        /// Length provided
        actual: usize,
    },

    /// A witness or proof was paired with keys for another configuration.
    #[error("keys were generated for another committee configuration")]
    ConfigMismatch,

    /// The witness does not satisfy the constraint system, for instance
    /// because too few signatures are valid.
    #[error("witness does not satisfy the constraint system")]
    Unsatisfiable,

    /// A signature does not satisfy the verification equation.
    #[error("invalid signature")]
    InvalidSignature,

    /// Error of the proving system.
    #[error("proof system error: {0}")]
    Backend(#[from] halo2_proofs::plonk::Error),
}
