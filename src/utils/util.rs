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

pub mod bbsplus_utils {
    use bls12_381_plus::{G1Affine, G1Projective, Scalar};
    use elliptic_curve::hash2curve::{ExpandMsg, Expander};
    use elliptic_curve::subtle::CtOption;
    use ff::Field;
    use rand::RngCore;
    use crate::{
        bbsplus::{ciphersuites::BbsCiphersuite, generators::Generators, keys::BBSplusPublicKey},
        errors::Error,
        utils::encoding::{encode_for_hash, HashInput},
    };

    /// Length of a serialized scalar
    pub const OCTET_SCALAR_LENGTH: usize = 32;
    /// Length of a compressed G1 point
    pub const OCTET_POINT_LENGTH: usize = 48;
    pub const MAX_DST_LEN: usize = 255;
    pub const MAX_EXPAND_LEN: usize = 65535;

    /// I2OSP: big-endian encoding of `value` on exactly `len` bytes.
    pub fn i2osp(value: usize, len: usize) -> Result<Vec<u8>, Error> {
        let value = u64::try_from(value)
            .map_err(|_| Error::EncodingError(format!("I2OSP: {} does not fit in 64 bits", value)))?;

        if len < 8 && value >> (8 * len) != 0 {
            return Err(Error::EncodingError(format!("I2OSP: {} does not fit in {} bytes", value, len)));
        }

        let be = value.to_be_bytes();
        let mut out = vec![0u8; len];
        if len >= 8 {
            out[len - 8..].copy_from_slice(&be);
        } else {
            out.copy_from_slice(&be[8 - len..]);
        }
        Ok(out)
    }

    /// OS2IP followed by a reduction mod r. Accepts any number of octets.
    pub fn os2ip(bytes: &[u8]) -> Scalar {
        let radix = Scalar::from(256u64);
        bytes.iter().fold(Scalar::ZERO, |acc, &b| acc * radix + Scalar::from(b as u64))
    }

    /// Fixed-width big-endian encoding of a scalar (numberToBytesBE).
    pub fn number_to_bytes_be(num: &Scalar, len: usize) -> Result<Vec<u8>, Error> {
        let bytes = num.to_bytes_be();
        if len >= OCTET_SCALAR_LENGTH {
            let mut out = vec![0u8; len - OCTET_SCALAR_LENGTH];
            out.extend_from_slice(&bytes);
            return Ok(out);
        }

        let (high, low) = bytes.split_at(OCTET_SCALAR_LENGTH - len);
        if high.iter().any(|&b| b != 0) {
            return Err(Error::EncodingError(format!("scalar does not fit in {} bytes", len)));
        }
        Ok(low.to_vec())
    }

    pub trait ScalarExt: Sized {
        fn to_bytes_be(&self) -> [u8; OCTET_SCALAR_LENGTH];
        /// Fails (is none) when the encoded integer is not below r
        fn from_bytes_be(bytes: &[u8; OCTET_SCALAR_LENGTH]) -> CtOption<Self>;
    }

    impl ScalarExt for Scalar {
        fn to_bytes_be(&self) -> [u8; OCTET_SCALAR_LENGTH] {
            self.to_be_bytes()
        }

        fn from_bytes_be(bytes: &[u8; OCTET_SCALAR_LENGTH]) -> CtOption<Self> {
            Scalar::from_be_bytes(bytes)
        }
    }

    /// Parses a big-endian scalar out of a 32-byte slice, rejecting values >= r.
    pub(crate) fn parse_scalar(slice: &[u8]) -> Option<Scalar> {
        let bytes = <[u8; OCTET_SCALAR_LENGTH]>::try_from(slice).ok()?;
        Option::from(Scalar::from_bytes_be(&bytes))
    }

    /// Parses a compressed G1 point, checking curve and subgroup membership.
    pub(crate) fn parse_g1_projective(slice: &[u8]) -> Option<G1Projective> {
        let bytes = <[u8; OCTET_POINT_LENGTH]>::try_from(slice).ok()?;
        Option::from(G1Affine::from_compressed(&bytes).map(G1Projective::from))
    }


    /// expand_message as selected by the ciphersuite (XMD or XOF).
    ///
    /// # Errors
    /// [`Error::DomainError`] if `len(dst) > 255`, if `len_in_bytes` is zero or above 65535,
    /// or if the underlying expander refuses the length (XMD caps it at 255 hash blocks).
    pub fn expand_message<CS: BbsCiphersuite>(msg: &[u8], dst: &[u8], len_in_bytes: usize) -> Result<Vec<u8>, Error> {
        if dst.len() > MAX_DST_LEN {
            return Err(Error::DomainError(format!("len(DST) = {} > {}", dst.len(), MAX_DST_LEN)));
        }
        if len_in_bytes == 0 || len_in_bytes > MAX_EXPAND_LEN {
            return Err(Error::DomainError(format!("len_in_bytes = {} out of range", len_in_bytes)));
        }

        let mut uniform_bytes = vec![0u8; len_in_bytes];
        CS::Expander::expand_message(&[msg], &[dst], len_in_bytes)
            .map_err(|_| Error::DomainError(format!("expand_message cannot output {} bytes", len_in_bytes)))?
            .fill_bytes(&mut uniform_bytes);

        Ok(uniform_bytes)
    }


    /// hash_to_scalar: `count` non-zero scalars derived from `msg_octets`.
    ///
    /// `msg_prime = msg_octets || I2OSP(t, 1) || I2OSP(count, 4)`; the whole batch is
    /// discarded and `t` incremented whenever one of the scalars is zero. `dst` defaults
    /// to `ciphersuite_id || "H2S_"`.
    pub fn hash_to_scalar<CS: BbsCiphersuite>(msg_octets: &[u8], count: usize, dst: Option<&[u8]>) -> Result<Vec<Scalar>, Error> {
        if count == 0 {
            return Err(Error::HashToScalarError);
        }

        let default_dst = CS::h2s_dst();
        let dst = dst.unwrap_or(&default_dst);

        let len_in_bytes = count.checked_mul(CS::EXPAND_LEN).ok_or(Error::HashToScalarError)?;
        let count_octets = i2osp(count, 4)?;

        let mut t = 0usize;
        loop {
            // t no longer fits in one octet after 256 rejected batches
            let t_octet = i2osp(t, 1).map_err(|_| Error::HashToScalarError)?;
            let msg_prime = [msg_octets, &t_octet, &count_octets].concat();
            let uniform_bytes = expand_message::<CS>(&msg_prime, dst, len_in_bytes)?;

            let scalars: Vec<Scalar> = uniform_bytes.chunks_exact(CS::EXPAND_LEN).map(os2ip).collect();

            if scalars.iter().all(|s| !bool::from(s.is_zero())) {
                return Ok(scalars);
            }

            log::trace!("hash_to_scalar: zero scalar with t = {}, retrying", t);
            t += 1;
        }
    }


    /// domain = hash_to_scalar(encode_for_hash(PK, L, Q_1, Q_2, H_1, ..., H_L, ciphersuite_id, header), 1)
    pub(crate) fn calculate_domain<CS: BbsCiphersuite>(pk: &BBSplusPublicKey, generators: &Generators, L: usize, header: Option<&[u8]>) -> Result<Scalar, Error> {
        let header = header.unwrap_or(b"");

        let h_points = generators.message_generators.get(..L).ok_or(Error::NotEnoughGenerators)?;
        let pk_octets = pk.to_bytes();

        let mut dom_array = vec![
            HashInput::PublicKey(&pk_octets),
            HashInput::Integer(L),
            HashInput::G1(&generators.q1),
            HashInput::G1(&generators.q2),
        ];
        dom_array.extend(h_points.iter().map(HashInput::G1));
        dom_array.push(HashInput::CiphersuiteId(CS::ID));
        dom_array.push(HashInput::Octets(header));

        let dom_for_hash = encode_for_hash(&dom_array)?;

        let mut domain = hash_to_scalar::<CS>(&dom_for_hash, 1, None)?;
        domain.pop().ok_or(Error::HashToScalarError)
    }


    /// Complement of `indexes` in `0..length`, ascending.
    pub fn get_remaining_indexes(length: usize, indexes: &[usize]) -> Vec<usize> {
        (0..length).filter(|i| !indexes.contains(i)).collect()
    }

    /// Picks `messages[i]` for every `i` in `indexes`. Out-of-range indexes are skipped.
    pub fn get_messages<T: Clone>(messages: &[T], indexes: &[usize]) -> Vec<T> {
        indexes.iter().filter_map(|&i| messages.get(i).cloned()).collect()
    }

    pub fn get_messages_vec(messages: &[Vec<u8>], indexes: &[usize]) -> Vec<Vec<u8>> {
        get_messages(messages, indexes)
    }

    /// `n` bytes from the thread RNG, e.g. a verifier nonce or key material.
    pub fn generate_random_secret(n: usize) -> Vec<u8> {
        let mut rng = rand::thread_rng();
        let mut secret = vec![0u8; n];
        rng.fill_bytes(&mut secret);
        secret
    }


    #[cfg(test)]
    mod tests {
        use bls12_381_plus::Scalar;
        use ff::Field;
        use crate::{
            bbsplus::ciphersuites::{BbsCiphersuite, Bls12381Sha256, Bls12381Shake256},
            errors::Error,
        };
        use super::*;

        #[test]
        fn i2osp_encodes_big_endian() {
            assert_eq!(i2osp(0, 1).unwrap(), vec![0u8]);
            assert_eq!(i2osp(258, 2).unwrap(), vec![1u8, 2]);
            assert_eq!(i2osp(1, 4).unwrap(), vec![0u8, 0, 0, 1]);
            assert_eq!(i2osp(5, 8).unwrap(), vec![0u8, 0, 0, 0, 0, 0, 0, 5]);
            assert_eq!(i2osp(5, 10).unwrap(), vec![0u8, 0, 0, 0, 0, 0, 0, 0, 0, 5]);
        }

        #[test]
        fn i2osp_rejects_values_that_do_not_fit() {
            assert!(matches!(i2osp(256, 1), Err(Error::EncodingError(_))));
            assert!(matches!(i2osp(65536, 2), Err(Error::EncodingError(_))));
            assert!(i2osp(255, 1).is_ok());
        }

        #[test]
        fn os2ip_matches_wide_reduction() {
            let okm: [u8; 48] = core::array::from_fn(|i| (i as u8).wrapping_mul(37).wrapping_add(0xa5));
            assert_eq!(os2ip(&okm), Scalar::from_okm(&okm));
            assert_eq!(os2ip(&[]), Scalar::ZERO);
            assert_eq!(os2ip(&[1, 0]), Scalar::from(256u64));
        }

        #[test]
        fn scalar_encoding_is_fixed_width() {
            let s = Scalar::from(0x0102u64);
            let bytes = number_to_bytes_be(&s, OCTET_SCALAR_LENGTH).unwrap();
            assert_eq!(bytes.len(), 32);
            assert_eq!(&bytes[30..], &[1u8, 2]);
            assert_eq!(number_to_bytes_be(&s, 2).unwrap(), vec![1u8, 2]);
            assert!(matches!(number_to_bytes_be(&s, 1), Err(Error::EncodingError(_))));
            assert_eq!(Option::<Scalar>::from(Scalar::from_bytes_be(&s.to_bytes_be())), Some(s));
        }

        #[test]
        fn scalar_parsing_rejects_values_above_modulus() {
            assert!(parse_scalar(&[0xffu8; 32]).is_none());
            assert!(parse_scalar(&[0u8; 31]).is_none());
            assert_eq!(parse_scalar(&[0u8; 32]), Some(Scalar::ZERO));
        }

        #[test]
        fn expand_message_xmd_reference_vector() {
            // expand_message_xmd(SHA-256), msg = "", len_in_bytes = 0x20
            let out = expand_message::<Bls12381Sha256>(b"", b"QUUX-V01-CS02-with-expander-SHA256-128", 0x20).unwrap();
            assert_eq!(hex::encode(out), "68a985b87eb6b46952128911f2a4412bbc302a9d759667f87f7a21d803f07235");
        }

        #[test]
        fn expand_message_xof_reference_vectors() {
            const DST: &[u8] = b"QUUX-V01-CS02-with-expander-SHAKE256";
            let cases: [(&[u8], usize, &str); 3] = [
                (b"", 0x20, "2ffc05c48ed32b95d72e807f6eab9f7530dd1c2f013914c8fed38c5ccc15ad76"),
                (b"abc", 0x20, "b39e493867e2767216792abce1f2676c197c0692aed061560ead251821808e07"),
                (b"", 0x80, "7a1361d2d7d82d79e035b8880c5a3c86c5afa719478c007d96e6c88737a3f631dd74a2c88df79a4cb5e5d9f7504957c70d669ec6bfedc31e01e2bacc4ff3fdf9b6a00b17cc18d9d72ace7d6b81c2e481b4f73f34f9a7505dccbe8f5485f3d20c5409b0310093d5d6492dea4e18aa6979c23c8ea5de01582e9689612afbb353df"),
            ];
            for (msg, len, expected) in cases {
                let out = expand_message::<Bls12381Shake256>(msg, DST, len).unwrap();
                assert_eq!(hex::encode(out), expected);
            }
        }

        #[test]
        fn hash_to_scalar_shake256_reference_vector() {
            let msg = hex::decode("9872ad089e452c7b6e283dfac2a80d58e8d0ff71cc4d5e310a1debdda4a45f02").unwrap();
            let scalar = hash_to_scalar::<Bls12381Shake256>(&msg, 1, Some(&Bls12381Shake256::map_msg_dst())).unwrap();
            assert_eq!(hex::encode(scalar[0].to_bytes_be()), "7237d3bc7a74563dfa26ab4ea12636309b409844fdafd4ba3e8fb5ed9e963d46");
        }

        #[test]
        fn expand_message_rejects_out_of_bound_inputs() {
            let long_dst = vec![b'a'; 256];
            assert!(matches!(expand_message::<Bls12381Sha256>(b"msg", &long_dst, 32), Err(Error::DomainError(_))));
            assert!(matches!(expand_message::<Bls12381Shake256>(b"msg", &long_dst, 32), Err(Error::DomainError(_))));
            assert!(matches!(expand_message::<Bls12381Shake256>(b"msg", b"dst", 0), Err(Error::DomainError(_))));
            assert!(matches!(expand_message::<Bls12381Shake256>(b"msg", b"dst", 65536), Err(Error::DomainError(_))));
            // XMD with SHA-256 stops at 255 blocks of 32 bytes
            assert!(matches!(expand_message::<Bls12381Sha256>(b"msg", b"dst", 255 * 32 + 1), Err(Error::DomainError(_))));
            assert_eq!(expand_message::<Bls12381Shake256>(b"msg", b"dst", 65535).unwrap().len(), 65535);
        }

        #[test]
        fn xmd_and_xof_disagree() {
            let a = expand_message::<Bls12381Sha256>(b"msg", b"dst", 48).unwrap();
            let b = expand_message::<Bls12381Shake256>(b"msg", b"dst", 48).unwrap();
            assert_ne!(a, b);
        }

        #[test]
        fn hash_to_scalar_outputs_count_non_zero_scalars() {
            fn check<CS: BbsCiphersuite>() {
                let scalars = hash_to_scalar::<CS>(b"some input", 5, None).unwrap();
                assert_eq!(scalars.len(), 5);
                assert!(scalars.iter().all(|s| !bool::from(s.is_zero())));
                assert_eq!(scalars, hash_to_scalar::<CS>(b"some input", 5, None).unwrap());

                // count is framed into msg_prime, so batches are not prefixes of each other
                let one = hash_to_scalar::<CS>(b"some input", 1, None).unwrap();
                assert_ne!(one[0], scalars[0]);

                let other_dst = hash_to_scalar::<CS>(b"some input", 1, Some(b"OTHER_DST_")).unwrap();
                assert_ne!(one, other_dst);
            }
            check::<Bls12381Sha256>();
            check::<Bls12381Shake256>();
        }

        #[test]
        fn hash_to_scalar_requires_a_positive_count() {
            assert_eq!(hash_to_scalar::<Bls12381Sha256>(b"x", 0, None), Err(Error::HashToScalarError));
        }

        #[test]
        fn index_helpers() {
            assert_eq!(get_remaining_indexes(5, &[0, 2, 4]), vec![1, 3]);
            assert_eq!(get_remaining_indexes(3, &[]), vec![0, 1, 2]);
            assert!(get_remaining_indexes(0, &[]).is_empty());
            assert_eq!(get_messages(&["a", "b", "c"], &[2, 0]), vec!["c", "a"]);
            assert_eq!(generate_random_secret(32).len(), 32);
        }
    }
}
