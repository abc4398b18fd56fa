//! The Route Guard: may this navigation proceed?
//!
//! Each route carries a [`RouteMeta`]. Before a navigation the guard looks
//! up the destination's meta and decides, in this order:
//!
//! 1. requires auth, signed out, and no `share_token` in the query:
//!    redirect to login
//! 2. requires a guest and signed in: redirect home
//! 3. otherwise allow
//!
//! A non-empty `share_token` alone satisfies rule 1. It is not validated
//! here; the server does that when the shared file is fetched.

use std::sync::Arc;

use crate::{AuthContext, Redirect};

/// The navigation query parameter that carries a share token.
pub const SHARE_TOKEN_PARAM: &str = "share_token";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_guest: bool,
}

impl RouteMeta {
    pub const PUBLIC: RouteMeta = RouteMeta {
        requires_auth: false,
        requires_guest: false,
    };
    pub const AUTH: RouteMeta = RouteMeta {
        requires_auth: true,
        requires_guest: false,
    };
    pub const GUEST: RouteMeta = RouteMeta {
        requires_auth: false,
        requires_guest: true,
    };
}

#[derive(Debug, Clone)]
struct Route {
    segments: Vec<String>,
    meta: RouteMeta,
}

impl Route {
    /// `:name` segments match any single non-empty segment.
    fn matches(&self, path: &[&str]) -> bool {
        self.segments.len() == path.len()
            && self
                .segments
                .iter()
                .zip(path)
                .all(|(pattern, actual)| pattern.starts_with(':') || pattern.as_str() == *actual)
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Route patterns and their requirements. First match wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// An empty table: every path is public.
    pub fn new() -> Self {
        Self::default()
    }

    /// The application's routes: home and the file list need a signed-in
    /// user, login and register need a guest, and a single file is public.
    pub fn app() -> Self {
        Self::new()
            .route("/", RouteMeta::AUTH)
            .route("/login", RouteMeta::GUEST)
            .route("/register", RouteMeta::GUEST)
            .route("/files", RouteMeta::AUTH)
            .route("/files/:id", RouteMeta::PUBLIC)
    }

    pub fn route(mut self, pattern: &str, meta: RouteMeta) -> Self {
        self.routes.push(Route {
            segments: split_path(pattern).into_iter().map(str::to_owned).collect(),
            meta,
        });
        self
    }

    /// Requirements for `path`. Unknown paths have none.
    pub fn meta_for(&self, path: &str) -> RouteMeta {
        let path = split_path(path);
        self.routes
            .iter()
            .find(|route| route.matches(&path))
            .map_or(RouteMeta::PUBLIC, |route| route.meta)
    }
}

/// A navigation target: a path plus its query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Navigation {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Parses `"/files/42?share_token=abc"`. Any fragment is ignored.
    pub fn parse(target: &str) -> Self {
        let target = target.split('#').next().unwrap_or_default();
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        Self {
            path: path.to_owned(),
            query: url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether a non-empty `share_token` is present.
    pub fn has_share_token(&self) -> bool {
        self.query_value(SHARE_TOKEN_PARAM)
            .is_some_and(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Redirect),
}

impl GuardDecision {
    /// The decision for a route, given the current auth state.
    ///
    /// `authenticated` is only consulted when needed, so the auth state is
    /// never read for a share-token navigation.
    pub fn decide(
        meta: RouteMeta,
        has_share_token: bool,
        authenticated: impl Fn() -> bool,
    ) -> Self {
        if meta.requires_auth && !has_share_token && !authenticated() {
            return GuardDecision::Redirect(Redirect::Login);
        }
        if meta.requires_guest && authenticated() {
            return GuardDecision::Redirect(Redirect::Home);
        }
        GuardDecision::Allow
    }
}

/// Evaluates navigations against a route table and the shared auth state.
pub struct RouteGuard {
    routes: RouteTable,
    auth: Arc<AuthContext>,
}

impl RouteGuard {
    pub fn new(routes: RouteTable, auth: Arc<AuthContext>) -> Self {
        Self { routes, auth }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn evaluate(&self, navigation: &Navigation) -> GuardDecision {
        let meta = self.routes.meta_for(&navigation.path);
        let decision = GuardDecision::decide(meta, navigation.has_share_token(), || {
            self.auth.is_authenticated()
        });
        if let GuardDecision::Redirect(to) = decision {
            tracing::debug!(path = %navigation.path, redirect = to.path(), "navigation redirected");
        }
        decision
    }

    /// [`evaluate`](Self::evaluate) on a raw target like `"/files?x=1"`.
    pub fn check(&self, target: &str) -> GuardDecision {
        self.evaluate(&Navigation::parse(target))
    }
}
