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

use core::fmt::Debug;
use sha3::Shake256;
use sha2::Sha256;
use elliptic_curve::hash2curve::{ExpandMsg, ExpandMsgXof, ExpandMsgXmd};
use serde::{Serialize, Deserialize};


/// Fixed bundle of {hash / XOF choice, domain separation strings} for BLS12-381.
///
/// Every DST used by the protocol is derived from [`BbsCiphersuite::ID`], so two
/// ciphersuites never produce interoperable keys, signatures or proofs.
pub trait BbsCiphersuite: Clone + Debug + Eq + 'static {
    const ID: &'static [u8];
    const GENERATOR_SEED: &'static [u8];
    const GENERATOR_SEED_BP: &'static [u8];
    const GENERATOR_SEED_DST: &'static [u8];
    const GENERATOR_DST: &'static [u8];
    /// ceil((ceil(log2(r)) + k) / 8) with k = 128
    const EXPAND_LEN: usize = 48;
    const SEED_LEN: usize = 48;
    /// Minimum length of the KeyGen input keying material
    const IKM_LEN: usize = 32;
    type Expander: for<'a> ExpandMsg<'a>;

    /// ciphersuite_id || "H2S_"
    fn h2s_dst() -> Vec<u8> {
        [Self::ID, b"H2S_"].concat()
    }

    /// ciphersuite_id || "MAP_MSG_TO_SCALAR_AS_HASH_"
    fn map_msg_dst() -> Vec<u8> {
        [Self::ID, b"MAP_MSG_TO_SCALAR_AS_HASH_"].concat()
    }

    /// ciphersuite_id || "MOCK_RANDOM_SCALARS_DST_"
    fn mock_random_dst() -> Vec<u8> {
        [Self::ID, b"MOCK_RANDOM_SCALARS_DST_"].concat()
    }
}


#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Bls12381Shake256 {}
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Bls12381Sha256 {}


impl BbsCiphersuite for Bls12381Shake256 {
    const ID: &'static [u8] = b"BBS_BLS12381G1_XOF:SHAKE-256_SSWU_RO_";
    const GENERATOR_SEED: &'static [u8] =  b"BBS_BLS12381G1_XOF:SHAKE-256_SSWU_RO_MESSAGE_GENERATOR_SEED";
    const GENERATOR_SEED_BP: &'static [u8] = b"BBS_BLS12381G1_XOF:SHAKE-256_SSWU_RO_BP_MESSAGE_GENERATOR_SEED";
    const GENERATOR_SEED_DST: &'static [u8] = b"BBS_BLS12381G1_XOF:SHAKE-256_SSWU_RO_SIG_GENERATOR_SEED_";
    const GENERATOR_DST: &'static [u8] = b"BBS_BLS12381G1_XOF:SHAKE-256_SSWU_RO_SIG_GENERATOR_DST_";
    type Expander = ExpandMsgXof<Shake256>;
}


impl BbsCiphersuite for Bls12381Sha256 {
    const ID: &'static [u8] = b"BBS_BLS12381G1_XMD:SHA-256_SSWU_RO_";
    const GENERATOR_SEED: &'static [u8] =  b"BBS_BLS12381G1_XMD:SHA-256_SSWU_RO_MESSAGE_GENERATOR_SEED";
    const GENERATOR_SEED_BP: &'static [u8] = b"BBS_BLS12381G1_XMD:SHA-256_SSWU_RO_BP_MESSAGE_GENERATOR_SEED";
    const GENERATOR_SEED_DST: &'static [u8] = b"BBS_BLS12381G1_XMD:SHA-256_SSWU_RO_SIG_GENERATOR_SEED_";
    const GENERATOR_DST: &'static [u8] = b"BBS_BLS12381G1_XMD:SHA-256_SSWU_RO_SIG_GENERATOR_DST_";
    type Expander = ExpandMsgXmd<Sha256>;
}
