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


use bls12_381_plus::{G1Projective, Scalar, G2Projective, G2Prepared, multi_miller_loop};
use elliptic_curve::group::{Curve, Group};
use serde::{Serialize, Deserialize};
use crate::{
    bbsplus::{ciphersuites::BbsCiphersuite, generators::Generators},
    errors::Error,
    schemes::{algorithms::BBSplus, generics::PoKSignature},
    utils::{
        encoding::{encode_for_hash, HashInput},
        message::{messages_to_scalar, BBSplusMessage},
        random::{RandomScalars, RngScalars},
        util::bbsplus_utils::{calculate_domain, get_messages, get_remaining_indexes, hash_to_scalar, parse_g1_projective, parse_scalar, ScalarExt, OCTET_POINT_LENGTH, OCTET_SCALAR_LENGTH},
    },
};
use super::{signature::{compute_b, BBSplusSignature}, keys::BBSplusPublicKey};


/// Blinding scalars drawn besides the per-message ones: r1, r2, e~, r2~, r3~, s~
const PROOF_RANDOM_SCALARS: usize = 6;


#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusPoKSignature{
    A_prime: G1Projective,
    A_bar: G1Projective,
    D: G1Projective,
    c: Scalar,
    e_cap: Scalar,
    r2_cap: Scalar,
    r3_cap: Scalar,
    s_cap: Scalar,
    m_cap: Vec<Scalar>,
}

impl BBSplusPoKSignature {

    /// Length of a proof with no undisclosed messages
    pub const MIN_LENGTH: usize = 3 * OCTET_POINT_LENGTH + 5 * OCTET_SCALAR_LENGTH;

    /// Number of undisclosed messages the proof covers.
    pub fn undisclosed_count(&self) -> usize {
        self.m_cap.len()
    }

    /// A' || Abar || D || c || e^ || r2^ || r3^ || s^ || m^_1 || ... || m^_U
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::with_capacity(Self::MIN_LENGTH + self.m_cap.len() * OCTET_SCALAR_LENGTH);

        bytes.extend_from_slice(&self.A_prime.to_affine().to_compressed());
        bytes.extend_from_slice(&self.A_bar.to_affine().to_compressed());
        bytes.extend_from_slice(&self.D.to_affine().to_compressed());
        bytes.extend_from_slice(&self.c.to_bytes_be());
        bytes.extend_from_slice(&self.e_cap.to_bytes_be());
        bytes.extend_from_slice(&self.r2_cap.to_bytes_be());
        bytes.extend_from_slice(&self.r3_cap.to_bytes_be());
        bytes.extend_from_slice(&self.s_cap.to_bytes_be());
        self.m_cap.iter().for_each(|v| bytes.extend_from_slice(&v.to_bytes_be()));
        bytes
    }

    /// Fails with [`Error::MalformedProof`] on a length that is not `304 + 32 * U`,
    /// an invalid point or a scalar not in [0, r).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < Self::MIN_LENGTH || (bytes.len() - Self::MIN_LENGTH) % OCTET_SCALAR_LENGTH != 0 {
            return Err(Error::MalformedProof(format!("invalid proof length {}", bytes.len())));
        }

        let (points, scalars) = bytes.split_at(3 * OCTET_POINT_LENGTH);

        let parse_point = |slice: &[u8]| {
            parse_g1_projective(slice).ok_or_else(|| Error::MalformedProof("invalid G1 point".to_owned()))
        };
        let A_prime = parse_point(&points[0..48])?;
        let A_bar = parse_point(&points[48..96])?;
        let D = parse_point(&points[96..144])?;

        let mut scalars = scalars.chunks_exact(OCTET_SCALAR_LENGTH).map(|chunk| {
            parse_scalar(chunk).ok_or_else(|| Error::MalformedProof("scalar not in [0, r)".to_owned()))
        }).collect::<Result<Vec<Scalar>, Error>>()?;

        let m_cap = scalars.split_off(5);
        let (c, e_cap, r2_cap, r3_cap, s_cap) = match scalars[..] {
            [c, e_cap, r2_cap, r3_cap, s_cap] => (c, e_cap, r2_cap, r3_cap, s_cap),
            _ => return Err(Error::MalformedProof("missing proof scalars".to_owned())),
        };

        Ok(Self { A_prime, A_bar, D, c, e_cap, r2_cap, r3_cap, s_cap, m_cap })
    }
}



impl <CS: BbsCiphersuite> PoKSignature<BBSplus<CS>> {

    /// Proves knowledge of `signature` over `messages`, revealing only those at
    /// `disclosed_indexes`. Blinding scalars come from the thread RNG.
    pub fn proof_gen(pk: &BBSplusPublicKey, signature: &[u8], header: Option<&[u8]>, ph: Option<&[u8]>, messages: Option<&[Vec<u8>]>, disclosed_indexes: Option<&[usize]>) -> Result<Self, Error> {
        let messages = messages.unwrap_or(&[]);
        let disclosed_indexes = disclosed_indexes.unwrap_or(&[]);

        let message_scalars = messages_to_scalar::<CS>(messages)?;
        let generators = Generators::create::<CS>(messages.len() + 2)?;

        Self::proof_gen_with(pk, signature, header, ph, &message_scalars, disclosed_indexes, &generators, &mut RngScalars::default())
    }

    /// Like [`Self::proof_gen`] over pre-mapped messages, explicit generators and
    /// randomness. Disclosed indexes are sorted and de-duplicated.
    #[allow(clippy::too_many_arguments)]
    pub fn proof_gen_with<R: RandomScalars>(pk: &BBSplusPublicKey, signature: &[u8], header: Option<&[u8]>, ph: Option<&[u8]>, messages: &[BBSplusMessage], disclosed_indexes: &[usize], generators: &Generators, rng: &mut R) -> Result<Self, Error> {
        let signature = BBSplusSignature::from_bytes(signature)?;

        let proof = core_proof_gen::<CS, R>(pk, &signature, generators, messages, disclosed_indexes, header, ph, rng)?;

        Ok(proof.into())
    }

    /// Verifies the proof for a signature over `L` messages of which `disclosed_messages`
    /// sit at `disclosed_indexes` (strictly ascending).
    pub fn proof_verify(&self, pk: &BBSplusPublicKey, disclosed_messages: Option<&[Vec<u8>]>, disclosed_indexes: Option<&[usize]>, L: usize, header: Option<&[u8]>, ph: Option<&[u8]>) -> Result<bool, Error> {
        let disclosed_messages = disclosed_messages.unwrap_or(&[]);
        let disclosed_indexes = disclosed_indexes.unwrap_or(&[]);

        check_proof_shape(&self.inner, L, disclosed_messages.len(), disclosed_indexes)?;

        let message_scalars = messages_to_scalar::<CS>(disclosed_messages)?;
        let count = L.checked_add(2)
            .ok_or_else(|| Error::InvalidProof(format!("{} messages exceed the generator range", L)))?;
        let generators = Generators::create::<CS>(count)?;

        core_proof_verify::<CS>(pk, &self.inner, &generators, L, header, ph, &message_scalars, disclosed_indexes)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn proof_verify_with(&self, pk: &BBSplusPublicKey, L: usize, header: Option<&[u8]>, ph: Option<&[u8]>, disclosed_messages: &[BBSplusMessage], disclosed_indexes: &[usize], generators: &Generators) -> Result<bool, Error> {
        check_proof_shape(&self.inner, L, disclosed_messages.len(), disclosed_indexes)?;

        core_proof_verify::<CS>(pk, &self.inner, generators, L, header, ph, disclosed_messages, disclosed_indexes)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.inner.to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(BBSplusPoKSignature::from_bytes(bytes)?.into())
    }

    pub fn bbsplus_proof(&self) -> &BBSplusPoKSignature {
        &self.inner
    }
}


#[allow(clippy::too_many_arguments)]
fn core_proof_gen<CS: BbsCiphersuite, R: RandomScalars>(pk: &BBSplusPublicKey, signature: &BBSplusSignature, generators: &Generators, messages: &[BBSplusMessage], disclosed_indexes: &[usize], header: Option<&[u8]>, ph: Option<&[u8]>, rng: &mut R) -> Result<BBSplusPoKSignature, Error> {
    let L = messages.len();

    let mut disclosed_indexes = disclosed_indexes.to_vec();
    disclosed_indexes.sort_unstable();
    disclosed_indexes.dedup();

    if disclosed_indexes.iter().any(|&i| i >= L) {
        return Err(Error::ProofGenError(format!("disclosed index out of range for {} messages", L)));
    }

    let undisclosed_indexes = get_remaining_indexes(L, &disclosed_indexes);
    let U = undisclosed_indexes.len();

    let random_scalars = rng.random_scalars(PROOF_RANDOM_SCALARS + U)?;
    if random_scalars.len() != PROOF_RANDOM_SCALARS + U {
        return Err(Error::ProofGenError("randomness source returned a wrong number of scalars".to_owned()));
    }

    let init_res = proof_init::<CS>(pk, signature, generators, &random_scalars, header, messages, &undisclosed_indexes)?;

    let disclosed_messages = get_messages(messages, &disclosed_indexes);
    let undisclosed_messages = get_messages(messages, &undisclosed_indexes);

    let challenge = proof_challenge_calculate::<CS>(&init_res, &disclosed_indexes, &disclosed_messages, ph)?;

    proof_finalize(&init_res, challenge, signature, &random_scalars, &undisclosed_messages)
}


struct ProofInitResult {
    A_prime: G1Projective,
    A_bar: G1Projective,
    D: G1Projective,
    C1: G1Projective,
    C2: G1Projective,
    domain: Scalar,
}


fn proof_init<CS: BbsCiphersuite>(pk: &BBSplusPublicKey, signature: &BBSplusSignature, generators: &Generators, random_scalars: &[Scalar], header: Option<&[u8]>, messages: &[BBSplusMessage], undisclosed_indexes: &[usize]) -> Result<ProofInitResult, Error> {
    let L = messages.len();
    let H_points = generators.h_points(L)?;

    let (r1, r2, e_tilde, r2_tilde, r3_tilde, s_tilde, m_tilde) = match random_scalars {
        [r1, r2, e_tilde, r2_tilde, r3_tilde, s_tilde, m_tilde @ ..] => (*r1, *r2, *e_tilde, *r2_tilde, *r3_tilde, *s_tilde, m_tilde),
        _ => return Err(Error::ProofGenError("not enough random scalars".to_owned())),
    };

    let domain = calculate_domain::<CS>(pk, generators, L, header)?;

    let B = compute_b(generators, H_points, signature.s(), domain, messages);

    // A' = A * r1; Abar = A' * (-e) + B * r1; D = B * r1 + Q1 * r2
    let A_prime = signature.a() * r1;
    let B_r1 = B * r1;
    let A_bar = A_prime * (-signature.e()) + B_r1;
    let D = B_r1 + generators.q1 * r2;

    // C1 = A' * e~ + Q1 * r2~
    let C1 = G1Projective::sum_of_products(&[A_prime, generators.q1], &[e_tilde, r2_tilde]);

    // C2 = D * (-r3~) + Q1 * s~ + H_j1 * m~_j1 + ... + H_jU * m~_jU
    let mut C2_points = vec![D, generators.q1];
    let mut C2_scalars = vec![-r3_tilde, s_tilde];
    for (&j, m) in undisclosed_indexes.iter().zip(m_tilde) {
        C2_points.push(H_points[j]);
        C2_scalars.push(*m);
    }
    let C2 = G1Projective::sum_of_products(&C2_points, &C2_scalars);

    Ok(ProofInitResult { A_prime, A_bar, D, C1, C2, domain })
}


/// c = hash_to_scalar(encode_for_hash(A', Abar, D, C1, C2, R, i_1, ..., i_R, msg_i1, ..., msg_iR, domain, ph), 1)
fn proof_challenge_calculate<CS: BbsCiphersuite>(init_res: &ProofInitResult, disclosed_indexes: &[usize], disclosed_messages: &[BBSplusMessage], ph: Option<&[u8]>) -> Result<Scalar, Error> {
    let R = disclosed_indexes.len();
    let ph = ph.unwrap_or(b"");

    let mut c_array = vec![
        HashInput::G1(&init_res.A_prime),
        HashInput::G1(&init_res.A_bar),
        HashInput::G1(&init_res.D),
        HashInput::G1(&init_res.C1),
        HashInput::G1(&init_res.C2),
        HashInput::Integer(R),
    ];
    c_array.extend(disclosed_indexes.iter().map(|&i| HashInput::Integer(i)));
    c_array.extend(disclosed_messages.iter().map(|m| HashInput::Scalar(&m.value)));
    c_array.push(HashInput::Scalar(&init_res.domain));
    c_array.push(HashInput::Octets(ph));

    let c_for_hash = encode_for_hash(&c_array)?;

    let mut challenge = hash_to_scalar::<CS>(&c_for_hash, 1, None)?;
    challenge.pop().ok_or(Error::HashToScalarError)
}


fn proof_finalize(init_res: &ProofInitResult, challenge: Scalar, signature: &BBSplusSignature, random_scalars: &[Scalar], undisclosed_messages: &[BBSplusMessage]) -> Result<BBSplusPoKSignature, Error> {
    let (r1, r2, e_tilde, r2_tilde, r3_tilde, s_tilde, m_tilde) = match random_scalars {
        [r1, r2, e_tilde, r2_tilde, r3_tilde, s_tilde, m_tilde @ ..] => (*r1, *r2, *e_tilde, *r2_tilde, *r3_tilde, *s_tilde, m_tilde),
        _ => return Err(Error::ProofGenError("not enough random scalars".to_owned())),
    };

    if m_tilde.len() != undisclosed_messages.len() {
        return Err(Error::ProofGenError("random scalars do not match the undisclosed messages".to_owned()));
    }

    let r3 = Option::<Scalar>::from(r1.invert())
        .ok_or_else(|| Error::ProofGenError("r1 == 0".to_owned()))?;
    let s_prime = r2 * r3 + signature.s();

    let e_cap = challenge * signature.e() + e_tilde;
    let r2_cap = challenge * r2 + r2_tilde;
    let r3_cap = challenge * r3 + r3_tilde;
    let s_cap = challenge * s_prime + s_tilde;

    let m_cap: Vec<Scalar> = undisclosed_messages.iter().zip(m_tilde)
        .map(|(m, m_t)| challenge * m.value + m_t)
        .collect();

    Ok(BBSplusPoKSignature {
        A_prime: init_res.A_prime,
        A_bar: init_res.A_bar,
        D: init_res.D,
        c: challenge,
        e_cap,
        r2_cap,
        r3_cap,
        s_cap,
        m_cap,
    })
}


#[allow(clippy::too_many_arguments)]
fn core_proof_verify<CS: BbsCiphersuite>(pk: &BBSplusPublicKey, proof: &BBSplusPoKSignature, generators: &Generators, L: usize, header: Option<&[u8]>, ph: Option<&[u8]>, disclosed_messages: &[BBSplusMessage], disclosed_indexes: &[usize]) -> Result<bool, Error> {

    let init_res = proof_verify_init::<CS>(pk, proof, generators, L, header, disclosed_messages, disclosed_indexes)?;

    let challenge = proof_challenge_calculate::<CS>(&init_res, disclosed_indexes, disclosed_messages, ph)?;

    if proof.c != challenge {
        log::debug!("proof rejected: challenge mismatch");
        return Ok(false);
    }

    if bool::from(proof.A_prime.is_identity()) {
        log::debug!("proof rejected: A' is the identity");
        return Ok(false);
    }

    // e(A', W) * e(Abar, -P2) == Identity_GT
    let BP2 = G2Projective::GENERATOR;
    let A_prime_affine = proof.A_prime.to_affine();
    let A_bar_affine = proof.A_bar.to_affine();
    let pk_prepared = G2Prepared::from(pk.0.to_affine());
    let BP2_neg_prepared = G2Prepared::from(-BP2.to_affine());

    let pairing = multi_miller_loop(&[(&A_prime_affine, &pk_prepared), (&A_bar_affine, &BP2_neg_prepared)]).final_exponentiation();

    let valid = bool::from(pairing.is_identity());
    if !valid {
        log::debug!("proof rejected: pairing check failed");
    }
    Ok(valid)
}


/// Structural checks on the verifier inputs, run before any generator is derived.
fn check_proof_shape(proof: &BBSplusPoKSignature, L: usize, disclosed_messages: usize, disclosed_indexes: &[usize]) -> Result<(), Error> {
    let R = disclosed_indexes.len();
    if R > L {
        return Err(Error::InvalidProof(format!("{} disclosed indexes for {} messages", R, L)));
    }
    if disclosed_messages != R {
        return Err(Error::InvalidProof(format!("{} disclosed messages for {} disclosed indexes", disclosed_messages, R)));
    }
    if disclosed_indexes.windows(2).any(|w| w[0] >= w[1]) || disclosed_indexes.iter().any(|&i| i >= L) {
        return Err(Error::InvalidProof("disclosed indexes must be strictly ascending and below L".to_owned()));
    }

    let U = L - R;
    if proof.m_cap.len() != U {
        return Err(Error::MalformedProof(format!("proof covers {} undisclosed messages, expected {}", proof.m_cap.len(), U)));
    }
    Ok(())
}


fn proof_verify_init<CS: BbsCiphersuite>(pk: &BBSplusPublicKey, proof: &BBSplusPoKSignature, generators: &Generators, L: usize, header: Option<&[u8]>, disclosed_messages: &[BBSplusMessage], disclosed_indexes: &[usize]) -> Result<ProofInitResult, Error> {
    let H_points = generators.h_points(L)?;
    let undisclosed_indexes = get_remaining_indexes(L, disclosed_indexes);

    let domain = calculate_domain::<CS>(pk, generators, L, header)?;

    // C1 = (Abar - D) * c + A' * e^ + Q1 * r2^
    let C1 = G1Projective::sum_of_products(
        &[proof.A_bar - proof.D, proof.A_prime, generators.q1],
        &[proof.c, proof.e_cap, proof.r2_cap],
    );

    // T = P1 + Q2 * domain + H_i1 * msg_i1 + ... + H_iR * msg_iR
    let mut T_points = vec![generators.g1_base_point, generators.q2];
    let mut T_scalars = vec![Scalar::ONE, domain];
    for (&i, m) in disclosed_indexes.iter().zip(disclosed_messages) {
        T_points.push(H_points[i]);
        T_scalars.push(m.value);
    }
    let T = G1Projective::sum_of_products(&T_points, &T_scalars);

    // C2 = T * c - D * r3^ + Q1 * s^ + H_j1 * m^_j1 + ... + H_jU * m^_jU
    let mut C2_points = vec![T, proof.D, generators.q1];
    let mut C2_scalars = vec![proof.c, -proof.r3_cap, proof.s_cap];
    for (&j, m_cap) in undisclosed_indexes.iter().zip(&proof.m_cap) {
        C2_points.push(H_points[j]);
        C2_scalars.push(*m_cap);
    }
    let C2 = G1Projective::sum_of_products(&C2_points, &C2_scalars);

    Ok(ProofInitResult { A_prime: proof.A_prime, A_bar: proof.A_bar, D: proof.D, C1, C2, domain })
}
