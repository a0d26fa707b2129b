//! Per-request access decisions while two-factor authentication is pending.
//!
//! Flow Overview: an external request-interception layer asks the decider
//! once per request whether the partially-authenticated principal may pass;
//! a `false` answer sends the user to the second-factor challenge. The
//! decider itself only combines the answers of injected collaborators — the
//! access map, the general decision evaluator and the logout-path check.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

/// Attribute granting access to everyone, authenticated or not.
pub const PUBLIC_ACCESS: &str = "PUBLIC_ACCESS";

/// Legacy spelling of [`PUBLIC_ACCESS`], still honored in older rule sets.
pub const IS_AUTHENTICATED_ANONYMOUSLY: &str = "IS_AUTHENTICATED_ANONYMOUSLY";

/// Attribute an external voter may grant while the second factor is pending.
pub const IS_AUTHENTICATED_2FA_IN_PROGRESS: &str = "IS_AUTHENTICATED_2FA_IN_PROGRESS";

/// Equivalent markers recognized as "publicly reachable".
const PUBLIC_ACCESS_MARKERS: [&str; 2] = [PUBLIC_ACCESS, IS_AUTHENTICATED_ANONYMOUSLY];

/// Access-control rule matched for a request by the external access map.
///
/// `attributes: None` means no rule matched, which resolves to default-deny.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    pub attributes: Option<Vec<String>>,
    pub required_channel: Option<String>,
}

/// Pattern-matching access map supplying the rule attributes per request.
pub trait AccessMap<R> {
    fn patterns(&self, request: &R) -> AccessRule;
}

/// General RBAC/voter decision over a token, attributes and a request.
///
/// Failure semantics are owned by the evaluator; errors pass through the
/// decider unchanged.
pub trait DecisionEvaluator<R, T> {
    /// # Errors
    ///
    /// Whatever the underlying evaluator raises; the decider never retries
    /// or suppresses.
    fn decide(&self, token: &T, attributes: &[String], request: &R) -> anyhow::Result<bool>;
}

/// Matches a request against a path with exact-match semantics.
pub trait RequestMatcher<R> {
    fn matches_path(&self, request: &R, path: &str) -> bool;
}

/// Yields the externally generated logout path.
pub trait LogoutUrlResolver {
    fn logout_path(&self) -> String;
}

/// Request surface the decider needs beyond what collaborators consume.
pub trait HttpRequest {
    /// Application base path prefix; empty when the app is mounted at `/`.
    fn base_url(&self) -> &str;
}

/// Decides whether a request may pass while two-factor authentication is
/// incomplete.
#[derive(Debug, Clone)]
pub struct TwoFactorAccessDecider<A, D, M, L> {
    access_map: A,
    evaluator: D,
    request_matcher: M,
    logout_urls: L,
}

impl<A, D, M, L> TwoFactorAccessDecider<A, D, M, L> {
    pub fn new(access_map: A, evaluator: D, request_matcher: M, logout_urls: L) -> Self {
        Self {
            access_map,
            evaluator,
            request_matcher,
            logout_urls,
        }
    }

    /// Whether the request is reachable regardless of authentication state.
    ///
    /// True iff the matched rule carries one of the recognized public-access
    /// markers. No matching rule means default-deny.
    pub fn is_publicly_accessible<R>(&self, request: &R) -> bool
    where
        A: AccessMap<R>,
    {
        let rule = self.access_map.patterns(request);
        Self::has_public_access_marker(rule.attributes.as_deref())
    }

    /// Whether the request may pass despite the pending second factor.
    ///
    /// Ordered list of independent predicates, first hit wins:
    /// 1. the matched rule is publicly accessible,
    /// 2. the external evaluator grants access for the token,
    /// 3. the request targets the logout path (always reachable, so a user
    ///    stuck in the gate can still log out).
    ///
    /// # Errors
    ///
    /// Propagates evaluator failures unchanged.
    pub fn is_accessible<R, T>(&self, request: &R, token: &T) -> Result<bool, Error>
    where
        R: HttpRequest,
        A: AccessMap<R>,
        D: DecisionEvaluator<R, T>,
        M: RequestMatcher<R>,
        L: LogoutUrlResolver,
    {
        let rule = self.access_map.patterns(request);
        if Self::has_public_access_marker(rule.attributes.as_deref()) {
            return Ok(true);
        }

        // Absent attributes still reach the evaluator, as an empty set.
        let attributes = rule.attributes.unwrap_or_default();
        if self.evaluator.decide(token, &attributes, request)? {
            return Ok(true);
        }

        if self.is_logout_path(request) {
            debug!("request allowed through the two-factor gate as logout path");
            return Ok(true);
        }

        Ok(false)
    }

    fn has_public_access_marker(attributes: Option<&[String]>) -> bool {
        attributes.is_some_and(|attributes| {
            attributes
                .iter()
                .any(|attribute| PUBLIC_ACCESS_MARKERS.contains(&attribute.as_str()))
        })
    }

    fn is_logout_path<R>(&self, request: &R) -> bool
    where
        R: HttpRequest,
        M: RequestMatcher<R>,
        L: LogoutUrlResolver,
    {
        let logout_path = self.logout_urls.logout_path();
        let relative = relative_to_base_url(&logout_path, request.base_url());
        self.request_matcher.matches_path(request, relative)
    }
}

/// Strip the application base path from a generated path. Exact prefix only;
/// a path outside the base is returned unchanged.
fn relative_to_base_url<'a>(path: &'a str, base_url: &str) -> &'a str {
    if base_url.is_empty() {
        return path;
    }
    path.strip_prefix(base_url).unwrap_or(path)
}
