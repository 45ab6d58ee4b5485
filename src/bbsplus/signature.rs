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



use bls12_381_plus::{G1Projective, Scalar, G2Projective, multi_miller_loop, G2Prepared};
use elliptic_curve::group::{Curve, Group};
use serde::{Deserialize, Serialize};
use crate::{
    bbsplus::{ciphersuites::BbsCiphersuite, generators::Generators},
    errors::Error,
    schemes::{algorithms::BBSplus, generics::Signature},
    utils::{
        encoding::{encode_for_hash, HashInput},
        message::{messages_to_scalar, BBSplusMessage},
        util::bbsplus_utils::{calculate_domain, hash_to_scalar, parse_g1_projective, parse_scalar, ScalarExt, OCTET_POINT_LENGTH, OCTET_SCALAR_LENGTH},
    },
};
use super::keys::{BBSplusPublicKey, BBSplusSecretKey};



#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusSignature {
    pub(crate) a: G1Projective,
    pub(crate) e: Scalar,
    pub(crate) s: Scalar,
}

impl BBSplusSignature {

    pub const SIGNATURE_LENGTH: usize = OCTET_POINT_LENGTH + 2 * OCTET_SCALAR_LENGTH;

    pub fn a(&self) -> G1Projective {
        self.a
    }

    pub fn e(&self) -> Scalar {
        self.e
    }

    pub fn s(&self) -> Scalar {
        self.s
    }

    /// A (compressed) || e || s
    pub fn to_bytes(&self) -> [u8; Self::SIGNATURE_LENGTH] {
        let mut bytes = [0u8; Self::SIGNATURE_LENGTH];
        bytes[0..48].copy_from_slice(&self.a.to_affine().to_compressed());
        bytes[48..80].copy_from_slice(&self.e.to_bytes_be());
        bytes[80..112].copy_from_slice(&self.s.to_bytes_be());
        bytes
    }

    /// Fails with [`Error::MalformedSignature`] on a wrong length, an invalid or identity
    /// point A, or a scalar not in [0, r).
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        if data.len() != Self::SIGNATURE_LENGTH {
            return Err(Error::MalformedSignature(format!("expected {} bytes, got {}", Self::SIGNATURE_LENGTH, data.len())));
        }

        let a = parse_g1_projective(&data[0..48])
            .ok_or_else(|| Error::MalformedSignature("A is not a valid G1 point".to_owned()))?;
        if bool::from(a.is_identity()) {
            return Err(Error::MalformedSignature("A is the identity".to_owned()));
        }

        let e = parse_scalar(&data[48..80])
            .ok_or_else(|| Error::MalformedSignature("e is not in [0, r)".to_owned()))?;
        let s = parse_scalar(&data[80..112])
            .ok_or_else(|| Error::MalformedSignature("s is not in [0, r)".to_owned()))?;

        Ok(Self { a, e, s })
    }
}



impl <CS: BbsCiphersuite> Signature<BBSplus<CS>> {

    /// Signs the octet `messages` (mapped with MapMessageToScalarAsHash) and `header`.
    pub fn sign(messages: Option<&[Vec<u8>]>, sk: &BBSplusSecretKey, pk: &BBSplusPublicKey, header: Option<&[u8]>) -> Result<Self, Error> {
        let messages = messages.unwrap_or(&[]);
        let message_scalars = messages_to_scalar::<CS>(messages)?;
        let generators = Generators::create::<CS>(messages.len() + 2)?;

        Self::sign_with(&message_scalars, sk, pk, &generators, header)
    }

    /// Signs messages already mapped to scalars, using the given generators.
    pub fn sign_with(messages: &[BBSplusMessage], sk: &BBSplusSecretKey, pk: &BBSplusPublicKey, generators: &Generators, header: Option<&[u8]>) -> Result<Self, Error> {
        let signature = core_sign::<CS>(sk, pk, generators, header, messages)?;
        Ok(signature.into())
    }

    /// `Ok(false)` when the pairing check fails, `Err` on inputs that cannot be processed.
    pub fn verify(&self, pk: &BBSplusPublicKey, messages: Option<&[Vec<u8>]>, header: Option<&[u8]>) -> Result<bool, Error> {
        let messages = messages.unwrap_or(&[]);
        let message_scalars = messages_to_scalar::<CS>(messages)?;
        let generators = Generators::create::<CS>(messages.len() + 2)?;

        self.verify_with(pk, &message_scalars, &generators, header)
    }

    pub fn verify_with(&self, pk: &BBSplusPublicKey, messages: &[BBSplusMessage], generators: &Generators, header: Option<&[u8]>) -> Result<bool, Error> {
        core_verify::<CS>(pk, &self.inner, messages, generators, header)
    }

    pub fn bbsplus_signature(&self) -> &BBSplusSignature {
        &self.inner
    }

    pub fn to_bytes(&self) -> [u8; BBSplusSignature::SIGNATURE_LENGTH] {
        self.inner.to_bytes()
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        Ok(BBSplusSignature::from_bytes(data)?.into())
    }
}


/// B = P1 + Q1 * s + Q2 * domain + H_1 * msg_1 + ... + H_L * msg_L
pub(crate) fn compute_b(generators: &Generators, H_points: &[G1Projective], s: Scalar, domain: Scalar, messages: &[BBSplusMessage]) -> G1Projective {
    let mut points = vec![generators.g1_base_point, generators.q1, generators.q2];
    points.extend_from_slice(H_points);

    let mut scalars = vec![Scalar::ONE, s, domain];
    scalars.extend(messages.iter().map(|m| m.value));

    G1Projective::sum_of_products(&points, &scalars)
}


fn core_sign<CS: BbsCiphersuite>(sk: &BBSplusSecretKey, pk: &BBSplusPublicKey, generators: &Generators, header: Option<&[u8]>, messages: &[BBSplusMessage]) -> Result<BBSplusSignature, Error> {

    let L = messages.len();
    let H_points = generators.h_points(L)?;

    let domain = calculate_domain::<CS>(pk, generators, L, header)?;

    // (e, s) = hash_to_scalar(encode_for_hash(SK, domain, msg_1, ..., msg_L), 2)
    let mut e_s_array = vec![HashInput::Scalar(&sk.0), HashInput::Scalar(&domain)];
    e_s_array.extend(messages.iter().map(|m| HashInput::Scalar(&m.value)));
    let e_s_for_hash = encode_for_hash(&e_s_array)?;

    let scalars = hash_to_scalar::<CS>(&e_s_for_hash, 2, None)?;
    let (e, s) = match scalars[..] {
        [e, s] => (e, s),
        _ => return Err(Error::HashToScalarError),
    };

    let B = compute_b(generators, H_points, s, domain, messages);

    // A = B * (1 / (SK + e))
    let sk_plus_e_inv = Option::<Scalar>::from((sk.0 + e).invert())
        .ok_or_else(|| Error::InvalidKey("SK + e == 0".to_owned()))?;
    let A = B * sk_plus_e_inv;

    Ok(BBSplusSignature{ a: A, e, s })
}


fn core_verify<CS: BbsCiphersuite>(pk: &BBSplusPublicKey, signature: &BBSplusSignature, messages: &[BBSplusMessage], generators: &Generators, header: Option<&[u8]>) -> Result<bool, Error> {
    let L = messages.len();
    let H_points = generators.h_points(L)?;

    let domain = calculate_domain::<CS>(pk, generators, L, header)?;

    let B = compute_b(generators, H_points, signature.s, domain, messages);

    // e(A, W + P2 * e) * e(B, -P2) == Identity_GT
    let BP2 = G2Projective::GENERATOR;
    let A2 = pk.0 + BP2 * signature.e;

    let A_affine = signature.a.to_affine();
    let B_affine = B.to_affine();
    let A2_prepared = G2Prepared::from(A2.to_affine());
    let BP2_neg_prepared = G2Prepared::from(-BP2.to_affine());

    let pairing = multi_miller_loop(&[(&A_affine, &A2_prepared), (&B_affine, &BP2_neg_prepared)]).final_exponentiation();

    let valid = bool::from(pairing.is_identity());
    if !valid {
        log::debug!("signature rejected: pairing check failed");
    }
    Ok(valid)
}
