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

//! BBS signatures over BLS12-381, following the IRTF CFRG BBS draft revision whose
//! signatures are `(A, e, s)` and whose proofs are `(A', Abar, D, c, e^, r2^, r3^, s^, m^_j)`.
//!
//! A signer holding `SK` signs an ordered list of messages together with an application
//! `header`. A holder of the signature can later disclose any subset of the messages and
//! prove, in zero knowledge, that the hidden ones were signed too. Each proof is bound to a
//! presentation header `ph` (e.g. a verifier nonce) and is unlinkable to the signature and to
//! other proofs derived from it.
//!
//! Two ciphersuites are available, [`ciphersuites::Bls12381Sha256`] (expand_message_xmd) and
//! [`ciphersuites::Bls12381Shake256`] (expand_message_xof). Keys, signatures and proofs of one
//! ciphersuite never verify under the other.
//!
//! # Example
//! ```
//! use zkbbs::keys::pair::KeyPair;
//! use zkbbs::schemes::algorithms::BbsBls12381Shake256;
//! use zkbbs::schemes::generics::{PoKSignature, Signature};
//!
//! let kp = KeyPair::<BbsBls12381Shake256>::random().unwrap();
//! let messages = vec![b"name".to_vec(), b"birthdate".to_vec()];
//!
//! let signature = Signature::<BbsBls12381Shake256>::sign(Some(&messages), kp.private_key(), kp.public_key(), None).unwrap();
//! assert!(signature.verify(kp.public_key(), Some(&messages), None).unwrap());
//!
//! let proof = PoKSignature::<BbsBls12381Shake256>::proof_gen(kp.public_key(), &signature.to_bytes(), None, Some(&b"nonce"[..]), Some(&messages), Some(&[1])).unwrap();
//! let disclosed = vec![messages[1].clone()];
//! assert!(proof.proof_verify(kp.public_key(), Some(&disclosed), Some(&[1]), 2, None, Some(&b"nonce"[..])).unwrap());
//! ```

/// Module for ciphersuites
pub mod ciphersuites;
/// Module for generators
pub mod generators;
/// Module for keys
pub mod keys;
/// Module for proofs
pub mod proof;
/// Module for signatures
pub mod signature;
