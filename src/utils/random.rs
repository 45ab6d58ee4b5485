// Copyright 2023 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use core::marker::PhantomData;
use bls12_381_plus::Scalar;
use rand::{rngs::ThreadRng, CryptoRng, RngCore};
use crate::bbsplus::ciphersuites::BbsCiphersuite;
use crate::errors::Error;
use crate::utils::util::bbsplus_utils::{expand_message, os2ip, MAX_EXPAND_LEN};


/// Source of the blinding scalars consumed by proof generation.
pub trait RandomScalars {
    /// Exactly `count` scalars, uniformly distributed mod r.
    fn random_scalars(&mut self, count: usize) -> Result<Vec<Scalar>, Error>;
}


/// Draws every scalar as `OS2IP(48 random bytes) mod r`.
#[derive(Debug)]
pub struct RngScalars<R> {
    rng: R,
}

impl<R: RngCore + CryptoRng> RngScalars<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngScalars<ThreadRng> {
    pub fn thread() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl Default for RngScalars<ThreadRng> {
    fn default() -> Self {
        Self::thread()
    }
}

impl<R: RngCore + CryptoRng> RandomScalars for RngScalars<R> {
    fn random_scalars(&mut self, count: usize) -> Result<Vec<Scalar>, Error> {
        let mut buf = [0u8; 48];
        Ok((0..count).map(|_| {
            self.rng.fill_bytes(&mut buf);
            Scalar::from_okm(&buf)
        }).collect())
    }
}


/// Deterministic scalars expanded from a seed, for reproducible proofs in tests.
///
/// `expand_message(seed, dst, 48 * count)` split in 48-byte chunks, `dst` defaulting
/// to `ciphersuite_id || "MOCK_RANDOM_SCALARS_DST_"`. A seeded source yields one batch
/// only: reusing blinding scalars across two proofs leaks the hidden messages.
#[derive(Debug)]
pub struct SeededScalars<CS: BbsCiphersuite> {
    seed: Vec<u8>,
    dst: Vec<u8>,
    consumed: bool,
    _cs: PhantomData<CS>,
}

impl<CS: BbsCiphersuite> SeededScalars<CS> {
    pub fn new(seed: &[u8]) -> Self {
        Self::with_dst(seed, &CS::mock_random_dst())
    }

    pub fn with_dst(seed: &[u8], dst: &[u8]) -> Self {
        Self { seed: seed.to_vec(), dst: dst.to_vec(), consumed: false, _cs: PhantomData }
    }
}

impl<CS: BbsCiphersuite> RandomScalars for SeededScalars<CS> {
    fn random_scalars(&mut self, count: usize) -> Result<Vec<Scalar>, Error> {
        if self.consumed {
            return Err(Error::RandomnessExhausted);
        }
        if count == 0 {
            return Ok(Vec::new());
        }

        let out_len = count.checked_mul(CS::EXPAND_LEN)
            .filter(|len| *len <= MAX_EXPAND_LEN)
            .ok_or_else(|| Error::DomainError(format!("cannot expand {} mocked scalars", count)))?;

        let v = expand_message::<CS>(&self.seed, &self.dst, out_len)?;
        self.consumed = true;

        Ok(v.chunks_exact(CS::EXPAND_LEN).map(os2ip).collect())
    }
}


#[cfg(test)]
mod tests {
    use rand::rngs::OsRng;
    use crate::bbsplus::ciphersuites::{Bls12381Sha256, Bls12381Shake256};
    use crate::errors::Error;
    use super::{RandomScalars, RngScalars, SeededScalars};

    #[test]
    fn rng_scalars_are_fresh() {
        let mut rng = RngScalars::new(OsRng);
        let a = rng.random_scalars(3).unwrap();
        let b = rng.random_scalars(3).unwrap();
        assert_eq!(a.len(), 3);
        assert_ne!(a, b);
        assert!(RngScalars::default().random_scalars(0).unwrap().is_empty());
    }

    #[test]
    fn seeded_scalars_are_reproducible() {
        let seed = b"3.141592653589793238462643383279";
        let a = SeededScalars::<Bls12381Shake256>::new(seed).random_scalars(10).unwrap();
        let b = SeededScalars::<Bls12381Shake256>::new(seed).random_scalars(10).unwrap();
        let c = SeededScalars::<Bls12381Sha256>::new(seed).random_scalars(10).unwrap();
        assert_eq!(a.len(), 10);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn seeded_scalars_are_single_use() {
        let mut source = SeededScalars::<Bls12381Shake256>::new(b"seed");
        assert!(source.random_scalars(6).is_ok());
        assert_eq!(source.random_scalars(6), Err(Error::RandomnessExhausted));
    }

    #[test]
    fn seeded_scalars_cap_the_output_length() {
        let mut source = SeededScalars::<Bls12381Shake256>::new(b"seed");
        assert!(matches!(source.random_scalars(1366), Err(Error::DomainError(_))));
        // a rejected request does not consume the seed
        assert_eq!(source.random_scalars(1365).unwrap().len(), 1365);
    }
}
