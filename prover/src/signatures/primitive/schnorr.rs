//! Schnorr signatures over Pallas with a Poseidon challenge.
//!
//! A signature `(R, s)` on `msg` is valid for `pk` if `s·G = R + c·pk` with
//! `c = Poseidon(R.x, pk.x, msg)`. The challenge lives in the base field and is
//! read as an integer, which is below the scalar modulus.

use std::ops::Mul;

use ff::{Field, FromUniformBytes, PrimeField};
use group::prime::PrimeCurveAffine;
use group::Curve;
use halo2_gadgets::poseidon::primitives::{self as poseidon, ConstantLength, P128Pow5T3};
use pasta_curves::pallas::{Affine, Base, Scalar};
use rand_core::{CryptoRng, RngCore};

use crate::error::Error;
use crate::util::coordinates;

/// A Schnorr signature: the announcement `R` and the response `s`.
pub type SchnorrSig = (Affine, Scalar);

#[derive(Debug)]
pub struct Schnorr;

fn generator() -> Affine {
    Affine::generator()
}

impl Schnorr {
    pub fn keygen<R: CryptoRng + RngCore>(rng: &mut R) -> (Scalar, Affine) {
        let sk = Scalar::random(rng);
        let pk = generator().mul(sk).to_affine();

        (sk, pk)
    }

    /// The challenge hash of an announcement, a public key and a message.
    pub fn challenge(announcement: &Affine, pk: &Affine, msg: Base) -> Base {
        let input_hash = [coordinates(announcement).0, coordinates(pk).0, msg];

        poseidon::Hash::<_, P128Pow5T3, ConstantLength<3>, 3, 2>::init().hash(input_hash)
    }

    /// Maps a challenge to the scalar field. The challenge is below both
    /// moduli, so its integer value is kept.
    pub fn challenge_scalar(challenge: Base) -> Scalar {
        // we need to have some wide bytes to reduce the challenge.
        let mut wide_bytes = [0u8; 64];
        wide_bytes[..32].copy_from_slice(&challenge.to_repr());
        Scalar::from_uniform_bytes(&wide_bytes)
    }

    // probabilistic function. We can make this deterministic using EdDSA instead.
    pub fn sign<R: CryptoRng + RngCore>(
        key_pair: (Scalar, Affine),
        msg: Base,
        rng: &mut R,
    ) -> SchnorrSig {
        let k = Scalar::random(rng);
        let announcement = generator().mul(k).to_affine();

        let challenge = Self::challenge(&announcement, &key_pair.1, msg);
        let response = k + Self::challenge_scalar(challenge) * key_pair.0;

        (announcement, response)
    }

    pub fn verify(msg: Base, pk: Affine, sig: SchnorrSig) -> Result<(), Error> {
        let challenge = Self::challenge_scalar(Self::challenge(&sig.0, &pk, msg));

        if generator().mul(sig.1) == pk.mul(challenge) + sig.0 {
            Ok(())
        } else {
            Err(Error::InvalidSignature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use group::Group;
    use pasta_curves::pallas;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;

    #[test]
    fn schnorr_primitive() {
        let mut rng = ChaCha8Rng::from_seed([0u8; 32]);
        let msg = Base::random(&mut rng);

        let (sk, pk) = Schnorr::keygen(&mut rng);
        let sig = Schnorr::sign((sk, pk), msg, &mut rng);

        assert!(Schnorr::verify(msg, pk, sig).is_ok());

        let fake_msg = Base::random(&mut rng);
        assert!(Schnorr::verify(fake_msg, pk, sig).is_err());

        let fake_pk = pallas::Point::random(&mut rng).to_affine();
        assert!(Schnorr::verify(msg, fake_pk, sig).is_err());

        let tampered = (sig.0, sig.1 + Scalar::ONE);
        assert!(matches!(
            Schnorr::verify(msg, pk, tampered),
            Err(Error::InvalidSignature)
        ));
    }

    #[test]
    fn challenge_keeps_its_integer_value() {
        let mut rng = ChaCha8Rng::from_seed([1u8; 32]);
        let challenge = Base::random(&mut rng);
        let scalar = Schnorr::challenge_scalar(challenge);
        assert_eq!(scalar.to_repr(), challenge.to_repr());
    }
}
