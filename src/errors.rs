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

use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// I2OSP overflow or a value that `encode_for_hash` cannot represent
    #[error("Encoding error: {0}")]
    EncodingError(String),
    /// DST or output length outside the bounds of `expand_message`
    #[error("Domain error: {0}")]
    DomainError(String),

    #[error("Error during keypair generation: {0}")]
    KeyGenError(String),
    #[error("Invalid key")]
    KeyDeserializationError,
    /// SK + e == 0 while signing
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Error during hash to scalar computation")]
    HashToScalarError,
    #[error("Not enough Generators")]
    NotEnoughGenerators,

    #[error("Malformed signature: {0}")]
    MalformedSignature(String),
    #[error("Malformed proof: {0}")]
    MalformedProof(String),

    #[error("Error during computation of a Proof of Knowledge of a Signature: {0}")]
    ProofGenError(String),
    /// A single-use randomness source was asked for a second batch
    #[error("Randomness source already consumed")]
    RandomnessExhausted,

    /// Disclosed indexes or messages inconsistent with the proof being verified
    #[error("Invalid Proof of Knowledge of a Signature: {0}")]
    InvalidProof(String),
}
