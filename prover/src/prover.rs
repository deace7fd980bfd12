//! Setup, proving and verification with the halo2 IPA backend.
//!
//! The circuit is defined over the Pallas base field, so commitments use the
//! Vesta curve. Parameters need no trusted setup and are derived from `k`
//! alone, which makes [`setup`] deterministic for a given configuration.

use std::fmt;

use halo2_proofs::plonk::{
    create_proof, keygen_pk, keygen_vk, verify_proof, ProvingKey, SingleVerifier, VerifyingKey,
};
use halo2_proofs::poly::commitment::Params;
use halo2_proofs::transcript::{Blake2bRead, Blake2bWrite, Challenge255};
use pasta_curves::{pallas, vesta};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::circuit::ThresholdCircuit;
use crate::config::CommitteeConfig;
use crate::error::Error;
use crate::witness::Witness;

const LOG_TARGET: &str = "light_client::prover";

/// Serialized proof, as written by the Blake2b transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof(Vec<u8>);

impl Proof {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Proof(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Parameters and proving key of one committee configuration.
#[derive(Clone)]
pub struct ProvingSetup {
    committee: CommitteeConfig,
    k: u32,
    params: Params<vesta::Affine>,
    pk: ProvingKey<vesta::Affine>,
}

/// Parameters and verifying key of one committee configuration.
#[derive(Clone)]
pub struct VerifierSetup {
    committee: CommitteeConfig,
    k: u32,
    params: Params<vesta::Affine>,
    vk: VerifyingKey<vesta::Affine>,
}

impl fmt::Debug for ProvingSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvingSetup")
            .field("committee", &self.committee)
            .field("k", &self.k)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for VerifierSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifierSetup")
            .field("committee", &self.committee)
            .field("k", &self.k)
            .finish_non_exhaustive()
    }
}

impl ProvingSetup {
    pub fn committee(&self) -> &CommitteeConfig {
        &self.committee
    }

    /// The verifier half of the setup.
    pub fn verifier(&self) -> VerifierSetup {
        VerifierSetup {
            committee: self.committee.clone(),
            k: self.k,
            params: self.params.clone(),
            vk: self.pk.get_vk().clone(),
        }
    }
}

impl VerifierSetup {
    pub fn committee(&self) -> &CommitteeConfig {
        &self.committee
    }

    pub fn verifying_key(&self) -> &VerifyingKey<vesta::Affine> {
        &self.vk
    }
}

/// Generates the parameters and keys for `committee`.
pub fn setup(committee: &CommitteeConfig) -> Result<ProvingSetup, Error> {
    committee.validate()?;

    let k = committee.k();
    let params = Params::<vesta::Affine>::new(k);
    let circuit = ThresholdCircuit::new(committee.clone());

    let vk = keygen_vk(&params, &circuit)?;
    let pk = keygen_pk(&params, vk, &circuit)?;

    info!(
        target: LOG_TARGET,
        committee_size = committee.committee_size(),
        threshold = committee.threshold(),
        k,
        "generated proving and verifying keys"
    );

    Ok(ProvingSetup {
        committee: committee.clone(),
        k,
        params,
        pk,
    })
}

/// Proves that at least the threshold of signatures in `witness` are valid.
///
/// Fails with [`Error::Unsatisfiable`] when they are not, without saying how
/// many were.
pub fn prove<R: RngCore + CryptoRng>(
    setup: &ProvingSetup,
    witness: &Witness,
    rng: R,
) -> Result<Proof, Error> {
    if witness.committee() != &setup.committee {
        return Err(Error::ConfigMismatch);
    }
    if !witness.meets_threshold() {
        return Err(Error::Unsatisfiable);
    }

    create(setup, witness, rng)
}

// Runs the prover on `witness` as is. An unsatisfied circuit still yields
// bytes, which no verifier accepts.
fn create<R: RngCore + CryptoRng>(
    setup: &ProvingSetup,
    witness: &Witness,
    rng: R,
) -> Result<Proof, Error> {
    let circuit = witness.circuit();
    let public_inputs = witness.public_inputs();

    let mut transcript = Blake2bWrite::<_, vesta::Affine, Challenge255<_>>::init(vec![]);
    create_proof(
        &setup.params,
        &setup.pk,
        &[circuit],
        &[&[public_inputs.as_slice()]],
        rng,
        &mut transcript,
    )?;
    let proof = transcript.finalize();

    debug!(target: LOG_TARGET, proof_size = proof.len(), "created proof");

    Ok(Proof(proof))
}

/// Checks `proof` against `public_inputs`, laid out as
/// [`Witness::public_inputs`] does.
///
/// Returns `Ok(false)` for a proof that does not verify, and an error only
/// when the inputs cannot belong to this setup.
pub fn verify(
    setup: &VerifierSetup,
    public_inputs: &[pallas::Base],
    proof: &Proof,
) -> Result<bool, Error> {
    let expected = setup.committee.instance_len();
    if public_inputs.len() != expected {
        return Err(Error::PublicInputLength {
            expected,
            actual: public_inputs.len(),
        });
    }

    let strategy = SingleVerifier::new(&setup.params);
    let mut transcript = Blake2bRead::<_, _, Challenge255<_>>::init(proof.as_bytes());

    match verify_proof(
        &setup.params,
        &setup.vk,
        strategy,
        &[&[public_inputs]],
        &mut transcript,
    ) {
        Ok(()) => Ok(true),
        Err(err) => {
            debug!(target: LOG_TARGET, error = ?err, "proof rejected");
            Ok(false)
        }
    }
}
