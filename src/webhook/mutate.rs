//! Owner-reference mutation pipeline
//!
//! Handles AdmissionReview requests: resolves the owner reference of the
//! requesting ServiceAccount and, when one of the configured kind exists,
//! returns a patch linking the incoming object to the same owner.
//!
//! The pipeline allows every request it can process; it mutates, never
//! gatekeeps. The only denied responses are failure paths where allowing
//! without the patch would leave the ownership graph inconsistent.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use kube::api::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview};
use tracing::{debug, error, info};

use crate::patch::PatchTarget;
use crate::resolver::resolve_owner;

use super::WebhookState;

/// Handle a mutating admission review
///
/// Decodes the envelope, runs the mutation decision, and re-wraps the
/// response. A review with no request inside is answered with a well-formed
/// "invalid" review rather than a transport error, so the API server never
/// sees a malformed reply.
pub async fn mutate_handler(
    State(state): State<Arc<WebhookState>>,
    Json(body): Json<AdmissionReview<DynamicObject>>,
) -> Json<AdmissionReview<DynamicObject>> {
    let req: AdmissionRequest<DynamicObject> = match body.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to parse admission request");
            return Json(AdmissionResponse::invalid(e.to_string()).into_review());
        }
    };

    let response = mutate(&state, &req).await;
    Json(response.into_review())
}

/// Decide the mutation for a single admission request
///
/// Every outcome echoes the request uid. Resolution failures deny the
/// request (fail-closed): silently allowing without the patch would produce
/// an object with the wrong ownership.
pub async fn mutate(
    state: &WebhookState,
    request: &AdmissionRequest<DynamicObject>,
) -> AdmissionResponse {
    let uid = request.uid.clone();
    let username = request.user_info.username.as_deref().unwrap_or_default();

    debug!(
        uid = %uid,
        username = %username,
        object = ?request.name,
        namespace = ?request.namespace,
        "Processing admission request"
    );

    let owner = match resolve_owner(state.store.as_ref(), username, &state.target_kind).await {
        Ok(Some(owner)) => owner,
        Ok(None) => {
            debug!(uid = %uid, username = %username, "No owner reference to propagate, allowing unchanged");
            return AdmissionResponse::from(request);
        }
        Err(e) => {
            error!(uid = %uid, username = %username, error = %e, "Owner resolution failed");
            return AdmissionResponse::from(request).deny(e.to_string());
        }
    };

    info!(
        uid = %uid,
        username = %username,
        owner_kind = %owner.kind,
        owner_name = %owner.name,
        "Propagating owner reference"
    );

    let patch = match PatchTarget::OwnerReferences(owner).into_patch() {
        Ok(patch) => patch,
        Err(e) => {
            error!(uid = %uid, error = %e, "Failed to build patch");
            return AdmissionResponse::from(request).deny(e.to_string());
        }
    };

    match AdmissionResponse::from(request).with_patch(patch) {
        Ok(response) => response,
        Err(e) => {
            error!(uid = %uid, error = %e, "Failed to serialize patch");
            AdmissionResponse::from(request).deny(format!("patch serialization error: {e}"))
        }
    }
}
