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

use bls12_381_plus::{G1Projective, G2Projective, Scalar};
use elliptic_curve::group::Curve;
use crate::errors::Error;
use super::util::bbsplus_utils::{i2osp, number_to_bytes_be, OCTET_SCALAR_LENGTH};

/// One element fed to [`encode_for_hash`], tagged with how it must be serialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashInput<'a> {
    /// Already serialized public key, copied as is
    PublicKey(&'a [u8]),
    /// I2OSP(n, 8)
    Integer(usize),
    /// 48-byte compressed point
    G1(&'a G1Projective),
    /// 96-byte compressed point
    G2(&'a G2Projective),
    /// 32-byte big-endian integer
    Scalar(&'a Scalar),
    /// I2OSP(len, 8) || octets
    Octets(&'a [u8]),
    /// Copied as is
    CiphersuiteId(&'a [u8]),
    /// I2OSP(len, 8) || UTF-8 bytes; must be ASCII
    Ascii(&'a str),
}

impl HashInput<'_> {
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        match self {
            HashInput::PublicKey(octets) | HashInput::CiphersuiteId(octets) => out.extend_from_slice(octets),
            HashInput::Integer(n) => out.extend(i2osp(*n, 8)?),
            HashInput::G1(point) => out.extend_from_slice(&point.to_affine().to_compressed()),
            HashInput::G2(point) => out.extend_from_slice(&point.to_affine().to_compressed()),
            HashInput::Scalar(scalar) => out.extend(number_to_bytes_be(scalar, OCTET_SCALAR_LENGTH)?),
            HashInput::Octets(octets) => {
                out.extend(i2osp(octets.len(), 8)?);
                out.extend_from_slice(octets);
            }
            HashInput::Ascii(text) => {
                if !text.is_ascii() {
                    return Err(Error::EncodingError(format!("{:?} is not an ASCII string", text)));
                }
                out.extend(i2osp(text.len(), 8)?);
                out.extend_from_slice(text.as_bytes());
            }
        }
        Ok(())
    }
}

/// Concatenates the serialization of every element, in order.
pub fn encode_for_hash(inputs: &[HashInput]) -> Result<Vec<u8>, Error> {
    let mut octets = Vec::new();
    for input in inputs {
        input.encode_into(&mut octets)?;
    }
    Ok(octets)
}
