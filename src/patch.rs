//! JSON patch construction for the admission mutation
//!
//! The patch value slot is a closed set of targets rather than a free-form
//! `serde_json::Value`: every patch this webhook can emit is enumerated here,
//! which keeps the wire shape checkable in one place.

use json_patch::{AddOperation, Patch, PatchOperation};
use jsonptr::PointerBuf;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;

use crate::error::Error;

/// A mutation this webhook knows how to emit
#[derive(Clone, Debug)]
pub enum PatchTarget {
    /// Set the object's owner-reference list to a single resolved reference
    ///
    /// An add at `/metadata/OwnerReferences` replaces the whole list, so any
    /// references the caller proposed are discarded and the object ends up
    /// with exactly one owner.
    // TODO: append to an existing ownerReferences list instead of replacing it
    OwnerReferences(OwnerReference),
}

impl PatchTarget {
    /// Build the JSON patch for this target
    pub fn into_patch(self) -> Result<Patch, Error> {
        match self {
            PatchTarget::OwnerReferences(owner) => {
                let value = serde_json::to_value(vec![owner])?;
                Ok(Patch(vec![PatchOperation::Add(AddOperation {
                    path: PointerBuf::from_tokens(["metadata", "OwnerReferences"]),
                    value,
                })]))
            }
        }
    }
}
