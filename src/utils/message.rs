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

use bls12_381_plus::Scalar;
use serde::{Serialize, Deserialize};
use crate::bbsplus::ciphersuites::BbsCiphersuite;
use crate::errors::Error;
use crate::utils::encoding::{encode_for_hash, HashInput};
use crate::utils::util::bbsplus_utils::{hash_to_scalar, ScalarExt, MAX_DST_LEN};


/// A message already mapped to the scalar field.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BBSplusMessage{
    pub value: Scalar
}

impl BBSplusMessage {

    pub fn new(msg: Scalar) -> Self{
        Self{value: msg}
    }

    /// MapMessageToScalarAsHash: `hash_to_scalar(I2OSP(len(data), 8) || data, 1, dst)`,
    /// `dst` defaulting to `ciphersuite_id || "MAP_MSG_TO_SCALAR_AS_HASH_"`.
    pub fn map_message_to_scalar_as_hash<CS: BbsCiphersuite>(data: &[u8], dst: Option<&[u8]>) -> Result<Self, Error> {
        let default_dst = CS::map_msg_dst();
        let dst = dst.unwrap_or(&default_dst);

        if dst.len() > MAX_DST_LEN {
            return Err(Error::DomainError(format!("len(DST) = {} > {}", dst.len(), MAX_DST_LEN)));
        }

        let msg_for_hash = encode_for_hash(&[HashInput::Octets(data)])?;
        let mut scalar = hash_to_scalar::<CS>(&msg_for_hash, 1, Some(dst))?;

        scalar.pop().map(Self::new).ok_or(Error::HashToScalarError)
    }

    pub fn to_bytes_be(&self) -> [u8; 32] {
        self.value.to_bytes_be()
    }
}

/// Maps every octet message with the default DST of `CS`, preserving order.
pub fn messages_to_scalar<CS: BbsCiphersuite>(messages: &[Vec<u8>]) -> Result<Vec<BBSplusMessage>, Error> {
    messages.iter()
        .map(|m| BBSplusMessage::map_message_to_scalar_as_hash::<CS>(m, None))
        .collect()
}


#[cfg(test)]
mod tests {
    use crate::bbsplus::ciphersuites::{BbsCiphersuite, Bls12381Sha256, Bls12381Shake256};
    use crate::errors::Error;
    use crate::utils::util::bbsplus_utils::hash_to_scalar;
    use super::{messages_to_scalar, BBSplusMessage};

    #[test]
    fn message_is_length_prefixed_before_hashing() {
        let msg = b"hello";
        let mapped = BBSplusMessage::map_message_to_scalar_as_hash::<Bls12381Sha256>(msg, None).unwrap();

        let framed = [&5u64.to_be_bytes()[..], msg].concat();
        let expected = hash_to_scalar::<Bls12381Sha256>(&framed, 1, Some(&Bls12381Sha256::map_msg_dst())).unwrap();
        assert_eq!(mapped.value, expected[0]);

        let unframed = hash_to_scalar::<Bls12381Sha256>(msg, 1, Some(&Bls12381Sha256::map_msg_dst())).unwrap();
        assert_ne!(mapped.value, unframed[0]);
    }

    #[test]
    fn mapping_depends_on_message_and_ciphersuite() {
        let a = BBSplusMessage::map_message_to_scalar_as_hash::<Bls12381Shake256>(b"a", None).unwrap();
        let b = BBSplusMessage::map_message_to_scalar_as_hash::<Bls12381Shake256>(b"b", None).unwrap();
        let a_sha = BBSplusMessage::map_message_to_scalar_as_hash::<Bls12381Sha256>(b"a", None).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, a_sha);
        assert_eq!(a, BBSplusMessage::map_message_to_scalar_as_hash::<Bls12381Shake256>(b"a", None).unwrap());

        let empty = BBSplusMessage::map_message_to_scalar_as_hash::<Bls12381Shake256>(b"", None);
        assert!(empty.is_ok());
    }

    #[test]
    fn batch_mapping_preserves_order() {
        let messages = vec![b"first".to_vec(), b"second".to_vec()];
        let scalars = messages_to_scalar::<Bls12381Sha256>(&messages).unwrap();
        assert_eq!(scalars.len(), 2);
        assert_eq!(scalars[1], BBSplusMessage::map_message_to_scalar_as_hash::<Bls12381Sha256>(b"second", None).unwrap());
    }

    #[test]
    fn oversized_dst_is_rejected() {
        let dst = vec![0u8; 256];
        let res = BBSplusMessage::map_message_to_scalar_as_hash::<Bls12381Sha256>(b"m", Some(&dst));
        assert!(matches!(res, Err(Error::DomainError(_))));
    }
}
