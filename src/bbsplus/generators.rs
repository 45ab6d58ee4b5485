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

use bls12_381_plus::G1Projective;
use elliptic_curve::group::Curve;
use serde::{Serialize, Deserialize};
use serde::ser::{Serializer, SerializeStruct};
use crate::errors::Error;
use crate::utils::util::bbsplus_utils::{expand_message, i2osp};
use super::ciphersuites::BbsCiphersuite;



/// Generator points of a ciphersuite: the base point P1, Q1, Q2 and one H_i per message.
///
/// Derivation is deterministic and prefix-compatible: the message generators for
/// `count` are the first `count - 2` message generators of any larger set.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
pub struct Generators {
    pub g1_base_point: G1Projective,
    pub q1: G1Projective,
    pub q2: G1Projective,
    pub message_generators: Vec<G1Projective>
}

impl Serialize for Generators {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let result: Vec<String> = self.message_generators.iter()
            .map(|item| hex::encode(item.to_affine().to_compressed())).collect();

        let mut state = serializer.serialize_struct("Generators", 4)?;
        state.serialize_field("BP",
            &hex::encode(self.g1_base_point.to_affine().to_compressed()))?;

        state.serialize_field("Q1",
            &hex::encode(self.q1.to_affine().to_compressed()))?;
        state.serialize_field("Q2",
            &hex::encode(self.q2.to_affine().to_compressed()))?;

        state.serialize_field("MsgGenerators", &result)?;
        state.end()
    }
}

impl Generators {

    /// Derives `count` generators: Q1, Q2 and `count - 2` message generators.
    /// Signing L messages needs `count = L + 2`; values below 2 are raised to 2.
    pub fn create<CS: BbsCiphersuite>(count: usize) -> Result<Generators, Error> {
        let mut count = count;
        if count < 2 {
            log::warn!("count must be at least 2 -> default set to 2");
            count = 2;
        }

        let base_point = Self::create_g1_base_point::<CS>()?;
        let mut generators = Self::create_generators::<CS>(count)?;
        let message_generators = generators.split_off(2);

        log::debug!("derived {} message generators", message_generators.len());

        Ok(Generators {
            g1_base_point: base_point,
            q1: generators[0],
            q2: generators[1],
            message_generators
        })
    }

    /// Message generators available, i.e. the largest L this set can sign.
    pub fn messages_capacity(&self) -> usize {
        self.message_generators.len()
    }

    /// The first `L` message generators.
    pub(crate) fn h_points(&self, L: usize) -> Result<&[G1Projective], Error> {
        self.message_generators.get(..L).ok_or(Error::NotEnoughGenerators)
    }


    fn create_generators<CS: BbsCiphersuite>(count: usize) -> Result<Vec<G1Projective>, Error> {
        let mut generators: Vec<G1Projective> = Vec::with_capacity(count);

        let mut v = expand_message::<CS>(CS::GENERATOR_SEED, CS::GENERATOR_SEED_DST, CS::SEED_LEN)?;
        let mut n = 1usize;
        while generators.len() < count {
            // n is framed on 4 octets
            let n_octets = i2osp(n, 4)?;
            v = expand_message::<CS>(&[v.as_slice(), &n_octets].concat(), CS::GENERATOR_SEED_DST, CS::SEED_LEN)?;
            n += 1;

            let candidate = G1Projective::hash::<CS::Expander>(&v, CS::GENERATOR_DST);
            if generators.contains(&candidate) {
                log::trace!("duplicate generator candidate at n = {}, skipped", n - 1);
                continue;
            }
            generators.push(candidate);
        }

        Ok(generators)
    }

    fn create_g1_base_point<CS: BbsCiphersuite>() -> Result<G1Projective, Error> {
        let v = expand_message::<CS>(CS::GENERATOR_SEED_BP, CS::GENERATOR_SEED_DST, CS::SEED_LEN)?;
        let buffer = [v.as_slice(), &i2osp(1, 4)?].concat();
        let v = expand_message::<CS>(&buffer, CS::GENERATOR_SEED_DST, CS::SEED_LEN)?;

        Ok(G1Projective::hash::<CS::Expander>(&v, CS::GENERATOR_DST))
    }

}
