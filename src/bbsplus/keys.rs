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


use bls12_381_plus::{Scalar, G2Projective, G2Affine};
use digest::Digest;
use elliptic_curve::group::Curve;
use ff::Field;
use hkdf::Hkdf;
use serde::{Serialize, Deserialize};
use sha2::Sha256;
use crate::{
    errors::Error,
    keys::{pair::KeyPair, traits::{PrivateKey, PublicKey}},
    schemes::algorithms::BBSplus,
    utils::util::bbsplus_utils::{generate_random_secret, i2osp, os2ip, ScalarExt, OCTET_SCALAR_LENGTH},
};
use super::ciphersuites::BbsCiphersuite;


const KEYGEN_SALT: &[u8] = b"BBS-SIG-KEYGEN-SALT-";
/// ceil((3 * ceil(log2(r))) / 16)
const KEYGEN_OKM_LEN: usize = 48;
const MAX_KEY_INFO_LEN: usize = 65535;


#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusPublicKey(pub G2Projective);

impl BBSplusPublicKey{

    pub fn to_bytes(&self) -> [u8; G2Affine::COMPRESSED_BYTES] {
        self.0.to_affine().to_compressed()
    }

    pub fn encode(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Decodes a 96-byte compressed G2 point, rejecting off-subgroup points and the identity.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: [u8; G2Affine::COMPRESSED_BYTES] = bytes.try_into().map_err(|_| Error::KeyDeserializationError)?;
        let g2 = Option::<G2Affine>::from(G2Affine::from_compressed(&bytes))
            .map(G2Projective::from)
            .ok_or(Error::KeyDeserializationError)?;

        if bool::from(g2.is_identity()) {
            return Err(Error::KeyDeserializationError);
        }
        Ok(Self(g2))
    }
}


#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusSecretKey(pub Scalar);

impl BBSplusSecretKey{
    //in BE order
    pub fn to_bytes(&self) -> [u8; OCTET_SCALAR_LENGTH] {
        self.0.to_bytes_be()
    }

    pub fn encode(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Decodes a 32-byte big-endian integer in (0, r).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: [u8; OCTET_SCALAR_LENGTH] = bytes.try_into().map_err(|_| Error::KeyDeserializationError)?;
        let s = Option::<Scalar>::from(Scalar::from_bytes_be(&bytes)).ok_or(Error::KeyDeserializationError)?;

        if bool::from(s.is_zero()) {
            return Err(Error::KeyDeserializationError);
        }
        Ok(Self(s))
    }

    pub fn public_key(&self) -> BBSplusPublicKey {
        BBSplusPublicKey(sk_to_pk(&self.0))
    }
}



impl PublicKey for BBSplusPublicKey{
    type Output = [u8; 96];

    fn to_bytes(&self) -> Self::Output {
        self.to_bytes()
    }
}


impl PrivateKey for BBSplusSecretKey{
    type Output = [u8; 32];

    fn to_bytes(&self) -> Self::Output{
        self.to_bytes()
    }
}



impl <CS: BbsCiphersuite> KeyPair<BBSplus<CS>>{

    /// KeyGen followed by SkToPk.
    pub fn generate(ikm: &[u8], key_info: Option<&[u8]>) -> Result<Self, Error> {
        let sk = key_gen::<CS>(ikm, key_info)?;
        let pk = sk_to_pk(&sk);

        Ok(Self{public: BBSplusPublicKey(pk), private: BBSplusSecretKey(sk)})
    }

    /// Key pair from fresh random input keying material.
    pub fn random() -> Result<Self, Error> {
        let ikm = generate_random_secret(CS::IKM_LEN);
        Self::generate(&ikm, None)
    }
}


/// SK = KeyGen(IKM, key_info)
///
/// # Description
/// Derives a secret key deterministically from the secret octet string `ikm`
/// with HKDF-SHA-256, re-salting until the result is non-zero.
///
/// # Inputs:
/// * `ikm` (REQUIRED), a secret octet string of at least 32 bytes.
/// * `key_info` (OPTIONAL), an octet string of at most 65535 bytes. Defaults to an
/// empty string if not supplied.
///
/// # Output:
/// * a scalar in (0, r) or [`Error::KeyGenError`]
pub fn key_gen<CS: BbsCiphersuite>(ikm: &[u8], key_info: Option<&[u8]>) -> Result<Scalar, Error> {

    if ikm.len() < CS::IKM_LEN {
        return Err(Error::KeyGenError(format!("length(IKM) < {}", CS::IKM_LEN)));
    }

    let key_info = key_info.unwrap_or(&[]);
    if key_info.len() > MAX_KEY_INFO_LEN {
        return Err(Error::KeyGenError(format!("length(key_info) > {}", MAX_KEY_INFO_LEN)));
    }

    let ikm_prime = [ikm, &i2osp(0, 1)?].concat();
    let info = [key_info, &i2osp(KEYGEN_OKM_LEN, 2)?].concat();

    let mut salt = KEYGEN_SALT.to_vec();
    let mut okm = [0u8; KEYGEN_OKM_LEN];

    loop {
        salt = Sha256::digest(&salt).to_vec();
        let (_, hk) = Hkdf::<Sha256>::extract(Some(&salt), &ikm_prime);
        hk.expand(&info, &mut okm).map_err(|_| Error::KeyGenError("HKDF-Expand failed".to_owned()))?;

        let sk = os2ip(&okm);
        if !bool::from(sk.is_zero()) {
            return Ok(sk);
        }
        log::trace!("KeyGen produced SK = 0, re-salting");
    }
}


/// PK = SkToPk(SK)
///
/// # Description
/// W = SK * P2, P2 being the standard generator of G2.
pub fn sk_to_pk(sk: &Scalar) -> G2Projective {
    G2Projective::GENERATOR * sk
}


#[cfg(test)]
mod tests {
    use bls12_381_plus::Scalar;
    use crate::bbsplus::ciphersuites::Bls12381Shake256;
    use crate::errors::Error;
    use crate::keys::pair::KeyPair;
    use crate::schemes::algorithms::{BbsBls12381Sha256, BbsBls12381Shake256};
    use super::{key_gen, BBSplusPublicKey, BBSplusSecretKey};

    const SK: &str = "4a39afffd624d69e81808b2e84385cc80bf86adadf764e030caa46c231f2a8d7";
    const PK: &str = "aaff983278257afc45fa9d44d156c454d716fb1a250dfed132d65b2009331f618c623c14efa16245f50cc92e60334051087f1ae92669b89690f5feb92e91568f95a8e286d110b011e9ac9923fd871238f57d1295395771331ff6edee43e4ccc6";

    #[test]
    fn sk_to_pk_vector() {
        let sk = BBSplusSecretKey::from_bytes(&hex::decode(SK).unwrap()).unwrap();
        assert_eq!(sk.public_key().encode(), PK);
        assert_eq!(sk.encode(), SK);
    }

    #[test]
    fn keys_round_trip_through_bytes() {
        let sk = BBSplusSecretKey::from_bytes(&hex::decode(SK).unwrap()).unwrap();
        let pk = sk.public_key();
        assert_eq!(BBSplusPublicKey::from_bytes(&pk.to_bytes()).unwrap(), pk);
    }

    #[test]
    fn invalid_key_encodings_are_rejected() {
        assert_eq!(BBSplusSecretKey::from_bytes(&[0u8; 32]), Err(Error::KeyDeserializationError));
        assert_eq!(BBSplusSecretKey::from_bytes(&[0xffu8; 32]), Err(Error::KeyDeserializationError));
        assert_eq!(BBSplusSecretKey::from_bytes(&[1u8; 31]), Err(Error::KeyDeserializationError));

        let pk = hex::decode(PK).unwrap();
        assert_eq!(BBSplusPublicKey::from_bytes(&pk[..95]), Err(Error::KeyDeserializationError));

        // compressed identity: infinity flag set, everything else zero
        let mut identity = [0u8; 96];
        identity[0] = 0xc0;
        assert_eq!(BBSplusPublicKey::from_bytes(&identity), Err(Error::KeyDeserializationError));

        let mut not_on_curve = [0u8; 96];
        not_on_curve[0] = 0x80;
        not_on_curve[95] = 0x01;
        assert!(BBSplusPublicKey::from_bytes(&not_on_curve).is_err());
    }

    #[test]
    fn key_gen_input_bounds() {
        assert!(matches!(key_gen::<Bls12381Shake256>(&[7u8; 31], None), Err(Error::KeyGenError(_))));
        let info = vec![0u8; 65536];
        assert!(matches!(key_gen::<Bls12381Shake256>(&[7u8; 32], Some(&info)), Err(Error::KeyGenError(_))));
        assert!(key_gen::<Bls12381Shake256>(&[7u8; 32], Some(&info[..65535])).is_ok());
    }

    #[test]
    fn key_gen_is_deterministic() {
        let a = KeyPair::<BbsBls12381Shake256>::generate(&[3u8; 32], Some(b"info")).unwrap();
        let b = KeyPair::<BbsBls12381Shake256>::generate(&[3u8; 32], Some(b"info")).unwrap();
        let c = KeyPair::<BbsBls12381Shake256>::generate(&[3u8; 32], None).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.private_key(), c.private_key());
        assert_ne!(a.private_key().0, Scalar::from(0u64));
    }

    #[test]
    fn random_key_pairs_are_consistent() {
        let kp = KeyPair::<BbsBls12381Sha256>::random().unwrap();
        let (sk, pk) = kp.into_parts();
        assert_eq!(sk.public_key(), pk);
    }
}
