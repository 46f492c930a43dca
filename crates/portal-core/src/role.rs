//! Viewer roles and the seams that resolve them.
//!
//! The portal never decides who is an admin by itself. A [`RoleResolver`]
//! answers for the current viewer; [`DirectoryRoleResolver`] is the usual
//! one, backed by whatever [`AdminDirectory`] the deployment provides (a
//! table, a list from configuration, a policy service).

use std::{convert::Infallible, future::Future};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The privilege tier of whoever is looking at the calendar.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ViewerRole {
  /// Unauthenticated, or treated as such.
  Public,
  /// Authenticated, not an admin.
  Member,
  /// Authenticated and privileged.
  Admin,
}

impl ViewerRole {
  pub fn is_admin(self) -> bool { matches!(self, Self::Admin) }

  /// The role to fall back to when resolution fails. Never [`Self::Admin`].
  pub fn least_privileged(authenticated: bool) -> Self {
    if authenticated { Self::Member } else { Self::Public }
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Answers "what role does the current viewer have?".
pub trait RoleResolver: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn current_viewer_role(
    &self,
  ) -> impl Future<Output = Result<ViewerRole, Self::Error>> + Send + '_;
}

/// Resolve the viewer's role, degrading to `fallback` on failure.
///
/// A fallback of [`ViewerRole::Admin`] is lowered to [`ViewerRole::Member`]:
/// a failed lookup never grants privileges.
pub async fn resolve_role<R: RoleResolver>(resolver: &R, fallback: ViewerRole) -> ViewerRole {
  match resolver.current_viewer_role().await {
    Ok(role) => role,
    Err(e) => {
      let fallback = fallback.min(ViewerRole::Member);
      warn!(error = %e, %fallback, "role resolution failed; using least-privileged role");
      fallback
    }
  }
}

/// A resolver that always answers with the same role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRole(pub ViewerRole);

impl RoleResolver for FixedRole {
  type Error = Infallible;

  async fn current_viewer_role(&self) -> Result<ViewerRole, Infallible> { Ok(self.0) }
}

// ─── Admin directory ─────────────────────────────────────────────────────────

/// Knows which user identifiers hold platform-admin rights.
pub trait AdminDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn is_platform_admin<'a>(
    &'a self,
    user: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

/// Resolves the role of one viewer against an [`AdminDirectory`].
///
/// - no user (no session) → [`ViewerRole::Public`];
/// - a user the directory does not list → [`ViewerRole::Member`];
/// - a listed user → [`ViewerRole::Admin`].
#[derive(Debug)]
pub struct DirectoryRoleResolver<'a, D> {
  directory: &'a D,
  user:      Option<&'a str>,
}

impl<'a, D: AdminDirectory> DirectoryRoleResolver<'a, D> {
  pub fn new(directory: &'a D, user: Option<&'a str>) -> Self { Self { directory, user } }

  /// Resolve, falling back to the least-privileged role for this viewer if
  /// the directory fails.
  pub async fn resolve(&self) -> ViewerRole {
    resolve_role(self, ViewerRole::least_privileged(self.user.is_some())).await
  }
}

impl<D: AdminDirectory> RoleResolver for DirectoryRoleResolver<'_, D> {
  type Error = D::Error;

  async fn current_viewer_role(&self) -> Result<ViewerRole, D::Error> {
    let Some(user) = self.user else {
      return Ok(ViewerRole::Public);
    };
    if self.directory.is_platform_admin(user).await? {
      Ok(ViewerRole::Admin)
    } else {
      Ok(ViewerRole::Member)
    }
  }
}
