//! Application composition.
//!
//! Builds the one router the whole server runs on: four handler groups
//! mounted at fixed prefixes in fixed registration order, a cross-origin
//! layer applied uniformly, and the inline root route. The routing table is
//! validated here — an unresolvable group or a duplicate (method, path) pair
//! fails composition before the listener is ever bound, never at request
//! time. Once [`build_application`] returns, the table is immutable.
//!
//! Mount order (also the match tie-break order):
//!
//! | Prefix      | Tag            | Group         |
//! |-------------|----------------|---------------|
//! | `/auth`     | Authentication | [`crate::routes::auth`]     |
//! | `/schedule` | Scheduling     | [`crate::routes::schedule`] |
//! | (none)      | Routes         | [`crate::routes::roster`]   |
//! | (none)      | (none)         | [`crate::routes::upload`]   |
//! | `/` (GET)   |                | inline welcome handler      |

use std::collections::BTreeMap;
use std::convert::Infallible;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, Method},
    response::IntoResponse,
    routing::{get, MethodRouter, Route},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use thiserror::Error;
use tower::{Layer, Service};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, CorsConfig};
use crate::routes;
use crate::state::AppState;

/// Application title, reported by the root route.
pub const APP_TITLE: &str = "NurseEase Admin API";
/// API version, independent of the crate version.
pub const APP_VERSION: &str = "1.0";

/// A composition-time failure. Both variants are fatal: the process must
/// exit non-zero without serving.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A mount cannot be realized as configured (empty handler group,
    /// unparseable CORS origin, or an unsafe CORS combination).
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Two mounts define the same externally observable (method, path) pair.
    #[error("route conflict: {method} {path} defined by both '{first}' and '{second}'")]
    RouteConflict {
        method: Method,
        path: String,
        first: String,
        second: String,
    },
}

/// A named, opaque set of request handlers mounted as a unit.
///
/// The composer never inspects handler internals — only the declared
/// (method, path) set, recorded as routes are added.
pub struct HandlerGroup {
    name: &'static str,
    paths: Vec<(Method, &'static str)>,
    router: Router<AppState>,
}

impl HandlerGroup {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            paths: Vec::new(),
            router: Router::new(),
        }
    }

    /// Add a handler and record it in the declared path set.
    pub fn route(mut self, method: Method, path: &'static str, handler: MethodRouter<AppState>) -> Self {
        self.paths.push((method, path));
        self.router = self.router.route(path, handler);
        self
    }

    /// Apply a middleware layer to every route in the group.
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<Route> + Clone + Send + Sync + 'static,
        L::Service: Service<Request> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request>>::Response: IntoResponse + 'static,
        <L::Service as Service<Request>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        self.router = self.router.layer(layer);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn paths(&self) -> &[(Method, &'static str)] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn into_router(self) -> Router<AppState> {
        self.router
    }
}

/// One mount: a handler group fixed at a prefix with documentation tags.
///
/// The full set of mounts is created once during composition and never
/// changes for the lifetime of the process.
pub struct RouteMount {
    /// Prepended to every path in the group; empty means mounted at root.
    pub prefix: &'static str,
    /// Documentation labels. No runtime effect.
    pub tags: &'static [&'static str],
    /// The mounted handlers.
    pub group: HandlerGroup,
}

impl RouteMount {
    pub fn new(prefix: &'static str, tags: &'static [&'static str], group: HandlerGroup) -> Self {
        Self { prefix, tags, group }
    }
}

/// The four admin API mounts, in canonical registration order.
pub fn admin_mounts(config: &Config) -> Vec<RouteMount> {
    vec![
        RouteMount::new("/auth", &["Authentication"], routes::auth::group()),
        RouteMount::new("/schedule", &["Scheduling"], routes::schedule::group()),
        RouteMount::new("", &["Routes"], routes::roster::group()),
        RouteMount::new("", &[], routes::upload::group(config)),
    ]
}

/// Build the complete application from the default mounts and the configured
/// cross-origin policy.
pub fn build_application(state: AppState) -> Result<Router, ComposeError> {
    let config = state.config.clone();
    let mounts = admin_mounts(&config);
    compose(mounts, &config.cors, state)
}

/// Compute the final (method, path) table for a mount set, including the
/// inline root route, rejecting duplicates.
///
/// The table is derived purely from the declared mounts, so two builds from
/// the same configuration always produce the same table.
pub fn route_table(
    mounts: &[RouteMount],
) -> Result<BTreeMap<(String, String), String>, ComposeError> {
    let mut table: BTreeMap<(String, String), String> = BTreeMap::new();
    table.insert(
        (Method::GET.to_string(), "/".to_string()),
        "root".to_string(),
    );

    for mount in mounts {
        if mount.group.is_empty() {
            return Err(ComposeError::Configuration(format!(
                "handler group '{}' resolves to no routes",
                mount.group.name()
            )));
        }
        for (method, path) in mount.group.paths() {
            let full = join_prefix(mount.prefix, path);
            let key = (method.to_string(), full.clone());
            if let Some(first) = table.insert(key, mount.group.name().to_string()) {
                return Err(ComposeError::RouteConflict {
                    method: method.clone(),
                    path: full,
                    first,
                    second: mount.group.name().to_string(),
                });
            }
        }
    }
    Ok(table)
}

/// Assemble a router from explicit mounts. Validation first, assembly second:
/// axum itself panics on duplicate routes, so no duplicate may survive to the
/// `nest`/`merge` calls below.
pub fn compose(
    mounts: Vec<RouteMount>,
    cors: &CorsConfig,
    state: AppState,
) -> Result<Router, ComposeError> {
    route_table(&mounts)?;
    let cors = cors_layer(cors)?;

    let mut app = Router::new().route("/", get(root));
    for mount in mounts {
        app = if mount.prefix.is_empty() {
            app.merge(mount.group.into_router())
        } else {
            app.nest(mount.prefix, mount.group.into_router())
        };
    }

    Ok(app
        .layer(Extension(state.sessions.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// `GET /` — inline welcome route. Cannot fail.
async fn root() -> Json<Value> {
    Json(json!({"message": format!("Welcome to {APP_TITLE}")}))
}

/// Concatenate a mount prefix and a group-internal path.
fn join_prefix(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        path.to_string()
    } else {
        format!("{prefix}{path}")
    }
}

/// Translate the configured cross-origin policy into a [`CorsLayer`].
///
/// `["*"]` methods/headers become mirror-request semantics, which is how a
/// wildcard must be encoded when credentials are allowed (browsers ignore a
/// literal `*` on credentialed responses). A wildcard origin combined with
/// credentials cannot be expressed safely at all, so it fails composition.
fn cors_layer(cors: &CorsConfig) -> Result<CorsLayer, ComposeError> {
    let wildcard_origin = cors.allowed_origins.iter().any(|o| o == "*");
    if cors.allow_credentials && wildcard_origin {
        return Err(ComposeError::Configuration(
            "cors: wildcard origin cannot be combined with allow_credentials; \
             list allowed origins explicitly"
                .to_string(),
        ));
    }

    let origin = if wildcard_origin {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::with_capacity(cors.allowed_origins.len());
        for o in &cors.allowed_origins {
            let value: HeaderValue = o.parse().map_err(|_| {
                ComposeError::Configuration(format!("cors: invalid origin {o:?}"))
            })?;
            origins.push(value);
        }
        AllowOrigin::list(origins)
    };

    let methods = if is_wildcard(&cors.allow_methods) {
        AllowMethods::mirror_request()
    } else {
        let mut list = Vec::with_capacity(cors.allow_methods.len());
        for m in &cors.allow_methods {
            let method: Method = m.parse().map_err(|_| {
                ComposeError::Configuration(format!("cors: invalid method {m:?}"))
            })?;
            list.push(method);
        }
        AllowMethods::list(list)
    };

    let headers = if is_wildcard(&cors.allow_headers) {
        AllowHeaders::mirror_request()
    } else {
        let mut list = Vec::with_capacity(cors.allow_headers.len());
        for h in &cors.allow_headers {
            let header: HeaderName = h.parse().map_err(|_| {
                ComposeError::Configuration(format!("cors: invalid header {h:?}"))
            })?;
            list.push(header);
        }
        AllowHeaders::list(list)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(cors.allow_credentials)
        .allow_methods(methods)
        .allow_headers(headers))
}

fn is_wildcard(values: &[String]) -> bool {
    values.iter().any(|v| v == "*")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::{get, post};

    async fn ping() -> &'static str {
        "pong"
    }

    fn ping_group(name: &'static str) -> HandlerGroup {
        HandlerGroup::new(name).route(Method::GET, "/ping", get(ping))
    }

    #[test]
    fn test_join_prefix() {
        assert_eq!(join_prefix("", "/ping"), "/ping");
        assert_eq!(join_prefix("/auth", "/login"), "/auth/login");
    }

    #[test]
    fn test_conflicting_mounts_fail_at_build() {
        let mounts = vec![
            RouteMount::new("", &[], ping_group("first")),
            RouteMount::new("", &[], ping_group("second")),
        ];
        let err = route_table(&mounts).unwrap_err();
        match err {
            ComposeError::RouteConflict {
                method,
                path,
                first,
                second,
            } => {
                assert_eq!(method, Method::GET);
                assert_eq!(path, "/ping");
                assert_eq!(first, "first");
                assert_eq!(second, "second");
            }
            other => panic!("expected RouteConflict, got {other}"),
        }
    }

    #[test]
    fn test_prefix_disambiguates() {
        let mounts = vec![
            RouteMount::new("/a", &[], ping_group("first")),
            RouteMount::new("/b", &[], ping_group("second")),
        ];
        let table = route_table(&mounts).unwrap();
        assert!(table.contains_key(&("GET".to_string(), "/a/ping".to_string())));
        assert!(table.contains_key(&("GET".to_string(), "/b/ping".to_string())));
    }

    #[test]
    fn test_empty_group_is_configuration_error() {
        let mounts = vec![RouteMount::new("", &[], HandlerGroup::new("empty"))];
        assert!(matches!(
            route_table(&mounts),
            Err(ComposeError::Configuration(_))
        ));
    }

    #[test]
    fn test_conflict_with_root_route() {
        let group = HandlerGroup::new("greeter").route(Method::GET, "/", get(ping));
        let mounts = vec![RouteMount::new("", &[], group)];
        assert!(matches!(
            route_table(&mounts),
            Err(ComposeError::RouteConflict { .. })
        ));
        // A POST on "/" is a different pair and must pass
        let group = HandlerGroup::new("greeter").route(Method::POST, "/", post(ping));
        let mounts = vec![RouteMount::new("", &[], group)];
        assert!(route_table(&mounts).is_ok());
    }

    #[test]
    fn test_route_table_is_deterministic() {
        let config = Config::default();
        let first = route_table(&admin_mounts(&config)).unwrap();
        let second = route_table(&admin_mounts(&config)).unwrap();
        assert_eq!(first, second);
        // Surface spot checks
        assert!(first.contains_key(&("POST".to_string(), "/auth/login".to_string())));
        assert!(first.contains_key(&(
            "POST".to_string(),
            "/schedule/generate_schedule".to_string()
        )));
        assert!(first.contains_key(&("GET".to_string(), "/nurses".to_string())));
        assert!(first.contains_key(&("POST".to_string(), "/upload_file".to_string())));
        assert!(first.contains_key(&("GET".to_string(), "/".to_string())));
    }

    #[test]
    fn test_wildcard_origin_with_credentials_rejected() {
        let cors = CorsConfig {
            allowed_origins: vec!["*".to_string()],
            ..CorsConfig::default()
        };
        assert!(matches!(
            cors_layer(&cors),
            Err(ComposeError::Configuration(_))
        ));

        // Without credentials the wildcard is fine
        let cors = CorsConfig {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: false,
            ..CorsConfig::default()
        };
        assert!(cors_layer(&cors).is_ok());
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let cors = CorsConfig {
            allowed_origins: vec!["not a header value\u{0}".to_string()],
            ..CorsConfig::default()
        };
        assert!(matches!(
            cors_layer(&cors),
            Err(ComposeError::Configuration(_))
        ));
    }
}
