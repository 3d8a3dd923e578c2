//! Route-Role Registry
//!
//! Static mapping from fully qualified gRPC method names to the roles allowed
//! to call them. Built once at startup, then only read.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Protobuf package shared by every tracer-study service
pub const PACKAGE: &str = "tracer_study_grpc";

pub type RoleId = u32;

/// Known role identifiers
pub mod role {
    use super::RoleId;

    pub const SUPER_ADMIN: RoleId = 1;
    pub const ADMIN: RoleId = 2;
    pub const MANAGER: RoleId = 3;
    pub const EXECUTIVE: RoleId = 4;
    pub const ADMIN_PRODI: RoleId = 5;
    pub const ALUMNI: RoleId = 6;
    pub const PENGGUNA_ALUMNI: RoleId = 7;
    pub const ADMIN_POST: RoleId = 8;
}

/// Build the route key `/<package>.<service>/<method>`
pub fn route_key(package: &str, service: &str, method: &str) -> String {
    format!("/{package}.{service}/{method}")
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("route {route} has an empty role set")]
    EmptyRoleSet { route: String },

    #[error("invalid route key: {route}")]
    InvalidRouteKey { route: String },

    #[error("route {route} is listed more than once")]
    DuplicateRoute { route: String },

    #[error("unknown role table preset: {0}")]
    UnknownPreset(String),

    #[error("invalid role table JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read role table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// RoleSet
// ============================================================================

/// Non-empty, order-irrelevant set of role identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<RoleId>);

impl RoleSet {
    /// Returns `None` when `roles` is empty
    pub fn new(roles: impl IntoIterator<Item = RoleId>) -> Option<Self> {
        let roles: BTreeSet<RoleId> = roles.into_iter().collect();
        (!roles.is_empty()).then_some(Self(roles))
    }

    pub fn contains(&self, role: RoleId) -> bool {
        self.0.contains(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = RoleId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roles: Vec<String> = self.0.iter().map(|r| r.to_string()).collect();
        write!(f, "{{{}}}", roles.join(","))
    }
}

// ============================================================================
// Presets
// ============================================================================

/// The two role tables the service has been deployed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleTablePreset {
    /// Writes restricted to Super Admin and Admin
    Standard,
    /// Writes also open to Admin Post
    #[default]
    PostAdmin,
}

impl RoleTablePreset {
    fn write_roles(self) -> &'static [RoleId] {
        match self {
            RoleTablePreset::Standard => &[role::SUPER_ADMIN, role::ADMIN],
            RoleTablePreset::PostAdmin => &[role::SUPER_ADMIN, role::ADMIN, role::ADMIN_POST],
        }
    }
}

impl FromStr for RoleTablePreset {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(RoleTablePreset::Standard),
            "post-admin" | "post_admin" => Ok(RoleTablePreset::PostAdmin),
            other => Err(RegistryError::UnknownPreset(other.to_string())),
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Immutable route to role table
#[derive(Debug, Clone, Default)]
pub struct RouteRoleRegistry {
    routes: HashMap<String, RoleSet>,
}

impl RouteRoleRegistry {
    pub fn builder() -> RouteRoleRegistryBuilder {
        RouteRoleRegistryBuilder::new(PACKAGE)
    }

    /// Registry with no entries: every route is unlisted
    pub fn empty() -> Self {
        Self::default()
    }

    /// Write operations of PostService and CommentService
    pub fn preset(preset: RoleTablePreset) -> Self {
        let roles = preset.write_roles();
        let mut routes = HashMap::new();

        for (service, method) in [
            ("PostService", "CreatePost"),
            ("PostService", "UpdatePost"),
            ("PostService", "DeletePost"),
            ("CommentService", "DeleteComment"),
        ] {
            routes.insert(
                route_key(PACKAGE, service, method),
                RoleSet(roles.iter().copied().collect()),
            );
        }

        Self { routes }
    }

    /// Parse a table of the form
    /// `{"/tracer_study_grpc.PostService/": {"CreatePost": [1, 2, 8]}}`
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let table: BTreeMap<String, BTreeMap<String, Vec<RoleId>>> = serde_json::from_str(json)?;
        let mut builder = RouteRoleRegistryBuilder::new(PACKAGE);

        for (prefix, methods) in table {
            if !(prefix.starts_with('/') && prefix.ends_with('/') && prefix.len() > 2) {
                return Err(RegistryError::InvalidRouteKey { route: prefix });
            }
            for (method, roles) in methods {
                builder = builder.raw_route(format!("{prefix}{method}"), roles);
            }
        }

        builder.build()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Exact, case-sensitive lookup
    pub fn required_roles(&self, route: &str) -> Option<&RoleSet> {
        self.routes.get(route)
    }

    /// Every entry, ordered by route key
    pub fn entries(&self) -> BTreeMap<&str, &RoleSet> {
        self.routes.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Collects routes and validates the table as a whole on [`build`](Self::build)
#[derive(Debug)]
pub struct RouteRoleRegistryBuilder {
    package: String,
    entries: Vec<(String, Vec<RoleId>)>,
}

impl RouteRoleRegistryBuilder {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            entries: Vec::new(),
        }
    }

    pub fn route(mut self, service: &str, method: &str, roles: impl IntoIterator<Item = RoleId>) -> Self {
        let key = route_key(&self.package, service, method);
        self.entries.push((key, roles.into_iter().collect()));
        self
    }

    fn raw_route(mut self, key: String, roles: Vec<RoleId>) -> Self {
        self.entries.push((key, roles));
        self
    }

    pub fn build(self) -> Result<RouteRoleRegistry, RegistryError> {
        let mut routes = HashMap::with_capacity(self.entries.len());

        for (route, roles) in self.entries {
            if !is_valid_route_key(&route) {
                return Err(RegistryError::InvalidRouteKey { route });
            }
            let Some(set) = RoleSet::new(roles) else {
                return Err(RegistryError::EmptyRoleSet { route });
            };
            if routes.contains_key(&route) {
                return Err(RegistryError::DuplicateRoute { route });
            }
            routes.insert(route, set);
        }

        Ok(RouteRoleRegistry { routes })
    }
}

/// `/<package>.<Service>/<Method>` with non-empty, slash-free parts
fn is_valid_route_key(route: &str) -> bool {
    let Some(rest) = route.strip_prefix('/') else {
        return false;
    };
    let Some((qualified_service, method)) = rest.split_once('/') else {
        return false;
    };
    let Some((package, service)) = qualified_service.rsplit_once('.') else {
        return false;
    };

    !package.is_empty() && !service.is_empty() && !method.is_empty() && !method.contains('/')
}
