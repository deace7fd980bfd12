//! # Threshold signature circuit for light clients
//! Circuit implementation proving that at least 80% of a committee signed a
//! message. A light client that knows the committee public keys checks one
//! proof instead of `N` signatures.
//!
//! The proving system is Plonk with IPA commitments over the Pasta cycle. The
//! circuit is defined over the Pallas base field, which lets us do in-circuit
//! arithmetic on Pallas points natively. Committee members sign with Schnorr
//! over Pallas, with a Poseidon challenge.
//!
//! ## Committee
//! The committee is an ordered list of `N` public keys, fixed by the setup
//! through the [`CommitteeConfig`]. The threshold is `floor(0.8 N)`, so 72 for
//! the reference committee of 90 members.
//!
//! ## Circuit
//! The public inputs are the message, the `N` public keys and the `N`
//! signatures. The proof guarantees that:
//! * every public key and signature point is on the curve, or the identity
//! * the number of signatures satisfying `s·G = R + c·pk`, with
//!   `c = Poseidon(R.x, pk.x, msg)`, is at least the threshold
//!
//! An invalid signature does not make the proof fail. It is only left out of
//! the count, and the proof does not reveal which signatures were counted.
//!
//! ```no_run
//! # use light_client_prover::*;
//! # fn run(pks: &[PublicKey], signatures: &[Signature], msg: pasta_curves::pallas::Base) -> Result<(), Error> {
//! let committee = CommitteeConfig::default();
//! let setup = setup(&committee)?;
//!
//! let witness = Witness::new(&committee, pks, signatures, msg)?;
//! let proof = prove(&setup, &witness, rand_core::OsRng)?;
//!
//! assert!(verify(&setup.verifier(), &witness.public_inputs(), &proof)?);
//! # Ok(())
//! # }
//! ```

#![deny(missing_debug_implementations)]

use halo2_proofs::circuit::AssignedCell;

pub mod circuit;
pub mod config;
pub mod ecc;
pub mod error;
pub mod instructions;
pub mod main_gate;
pub mod prover;
pub mod signatures;
pub mod util;
pub mod witness;

pub use crate::circuit::ThresholdCircuit;
pub use crate::config::{CommitteeConfig, CurveId, HashId, DEFAULT_COMMITTEE_SIZE};
pub use crate::error::Error;
pub use crate::prover::{prove, setup, verify, Proof, ProvingSetup, VerifierSetup};
pub use crate::witness::{PublicKey, Signature, Witness};

/// AssignedValue
pub type AssignedValue<F> = AssignedCell<F, F>;
/// AssignedCondition
pub type AssignedCondition<F> = AssignedCell<F, F>;
