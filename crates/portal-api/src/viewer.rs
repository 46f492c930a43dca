//! Who is making the request.
//!
//! The session gate in front of the portal authenticates users and forwards
//! the identity in the [`USER_HEADER`] header. A request without it is
//! anonymous. The role is then looked up in the store's admin directory.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use portal_core::role::{DirectoryRoleResolver, ViewerRole};
use serde::Serialize;

use crate::{AppState, PortalStore};

/// Header carrying the authenticated user identifier.
pub const USER_HEADER: &str = "x-portal-user";

/// The resolved viewer of a request. Extraction never fails: directory
/// errors degrade to the least-privileged role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Viewer {
  pub user: Option<String>,
  pub role: ViewerRole,
}

fn user_from(parts: &Parts) -> Option<String> {
  parts
    .headers
    .get(USER_HEADER)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|u| !u.is_empty())
    .map(str::to_owned)
}

impl<S: PortalStore> FromRequestParts<AppState<S>> for Viewer {
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let user = user_from(parts);
    let role = DirectoryRoleResolver::new(state.store.as_ref(), user.as_deref())
      .resolve()
      .await;
    Ok(Viewer { user, role })
  }
}
