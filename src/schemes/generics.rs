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

use super::algorithms::Scheme;
use serde::{Deserialize, Serialize};
use core::marker::PhantomData;
use crate::bbsplus::{proof::BBSplusPoKSignature, signature::BBSplusSignature};


/// A signature tagged with the scheme (and so the ciphersuite) that produced it.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Signature<S: Scheme> {
    pub(crate) inner: BBSplusSignature,
    #[serde(skip)]
    pub(crate) _scheme: PhantomData<S>,
}

/// A proof of knowledge of a signature, tagged with its scheme.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct PoKSignature<S: Scheme> {
    pub(crate) inner: BBSplusPoKSignature,
    #[serde(skip)]
    pub(crate) _scheme: PhantomData<S>,
}

impl<S: Scheme> From<BBSplusSignature> for Signature<S> {
    fn from(inner: BBSplusSignature) -> Self {
        Self { inner, _scheme: PhantomData }
    }
}

impl<S: Scheme> From<BBSplusPoKSignature> for PoKSignature<S> {
    fn from(inner: BBSplusPoKSignature) -> Self {
        Self { inner, _scheme: PhantomData }
    }
}
