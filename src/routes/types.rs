//! Core types for the console's route table.
//!
//! A route table is the static list of pages the console can navigate to,
//! each tagged with the two attributes the navigation guard cares about:
//! whether it requires authentication and whether it commands motor motion.

use crate::utils::paths::normalize_route_path;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A navigation target defined by the route table. Immutable at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// Route name (e.g., "TiltMotor")
    pub name: String,
    /// Normalized path (e.g., "/tilt-motor")
    pub path: String,
    /// Navigating here needs a session
    #[serde(default)]
    pub requires_auth: bool,
    /// Member of the motor-control route set
    #[serde(default)]
    pub motor: bool,
}

impl RouteDescriptor {
    /// Human-readable one-liner for `motorctl routes` and `motorctl check`.
    pub fn describe(&self) -> String {
        let mut tags = Vec::new();
        if self.requires_auth {
            tags.push("auth");
        }
        if self.motor {
            tags.push("motor");
        }
        if tags.is_empty() {
            format!("{} {}", self.name, self.path)
        } else {
            format!("{} {} [{}]", self.name, self.path, tags.join(", "))
        }
    }
}

/// A validated route table with its four designated routes.
///
/// Construction guarantees the designated routes exist, so lookups of
/// login/dashboard/calibration/run never fail at navigation time.
#[derive(Debug, Clone)]
pub struct RouteTable {
    /// Table name/identifier (e.g., "lab-console-v1")
    console: String,
    /// Optional human-readable description
    description: Option<String>,
    routes: Vec<RouteDescriptor>,
    login: usize,
    dashboard: usize,
    calibration: usize,
    run: usize,
}

/// Names of the routes the guard treats specially.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignatedRoutes {
    pub login: String,
    pub dashboard: String,
    pub calibration: String,
    pub run: String,
}

impl RouteTable {
    /// Build a table, validating names, paths and designated routes.
    pub fn new(
        console: impl Into<String>,
        description: Option<String>,
        routes: Vec<RouteDescriptor>,
        designated: DesignatedRoutes,
    ) -> Result<Self> {
        let console = console.into();
        if console.trim().is_empty() {
            bail!("Route table must have a non-empty 'console' name");
        }
        if routes.is_empty() {
            bail!("Route table must have at least one route");
        }

        let routes: Vec<RouteDescriptor> = routes
            .into_iter()
            .map(|r| RouteDescriptor {
                path: normalize_route_path(&r.path),
                ..r
            })
            .collect();

        let mut names = HashSet::new();
        let mut paths = HashSet::new();
        for route in &routes {
            if route.name.trim().is_empty() {
                bail!("Route at path '{}' has an empty name", route.path);
            }
            if !names.insert(route.name.as_str()) {
                bail!("Duplicate route name '{}'", route.name);
            }
            if !paths.insert(route.path.as_str()) {
                bail!("Duplicate route path '{}'", route.path);
            }
        }

        let index_of = |role: &str, name: &str| -> Result<usize> {
            match routes.iter().position(|r| r.name == name) {
                Some(i) => Ok(i),
                None => bail!("The {} route '{}' is not defined in the table", role, name),
            }
        };

        let login = index_of("login", &designated.login)?;
        let dashboard = index_of("dashboard", &designated.dashboard)?;
        let calibration = index_of("calibration", &designated.calibration)?;
        let run = index_of("run", &designated.run)?;

        // An auth-gated login route would bounce unauthenticated users forever
        if routes[login].requires_auth {
            bail!(
                "The login route '{}' must not require authentication",
                routes[login].name
            );
        }
        if login == dashboard {
            bail!("The login and dashboard routes must be different routes");
        }

        Ok(Self {
            console,
            description,
            routes,
            login,
            dashboard,
            calibration,
            run,
        })
    }

    /// Look up the route for a path (query and trailing slash ignored).
    /// Unknown paths resolve to `None`.
    pub fn resolve(&self, path: &str) -> Option<&RouteDescriptor> {
        let path = normalize_route_path(path);
        self.routes.iter().find(|r| r.path == path)
    }

    /// Whether the path requires a session. Unknown paths carry no attributes.
    pub fn requires_auth(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|r| r.requires_auth)
    }

    /// Whether the path belongs to the motor-control route set.
    pub fn is_motor(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|r| r.motor)
    }

    pub fn is_login(&self, path: &str) -> bool {
        normalize_route_path(path) == self.login_route().path
    }

    pub fn is_calibration(&self, path: &str) -> bool {
        normalize_route_path(path) == self.calibration_route().path
    }

    pub fn is_run(&self, path: &str) -> bool {
        normalize_route_path(path) == self.run_route().path
    }

    pub fn login_route(&self) -> &RouteDescriptor {
        &self.routes[self.login]
    }

    pub fn dashboard_route(&self) -> &RouteDescriptor {
        &self.routes[self.dashboard]
    }

    /// The peristaltic calibration route (origin of the no-confirm adjacency).
    pub fn calibration_route(&self) -> &RouteDescriptor {
        &self.routes[self.calibration]
    }

    /// The peristaltic run route (target of the no-confirm adjacency).
    pub fn run_route(&self) -> &RouteDescriptor {
        &self.routes[self.run]
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn console_name(&self) -> &str {
        &self.console
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The motor-control route set.
    pub fn motor_routes(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter().filter(|r| r.motor)
    }
}

/// A concrete navigation target: a path plus optional query pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<(String, String)>,
}

impl Location {
    /// Location for a path, without a query.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            path: normalize_route_path(path.as_ref()),
            query: Vec::new(),
        }
    }

    /// Parse a full path such as `/login?redirect=%2Ftilt-motor`.
    pub fn parse(full_path: &str) -> Self {
        let (path, query) = match full_path.split_once('?') {
            Some((path, query)) => (path, query),
            None => (full_path, ""),
        };
        let query = query.split('#').next().unwrap_or("");
        Self {
            path: normalize_route_path(path),
            query: url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// Add a query pair.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// First value for a query key.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Path plus encoded query string.
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_path())
    }
}

impl From<&str> for Location {
    fn from(full_path: &str) -> Self {
        Location::parse(full_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(name: &str, path: &str, requires_auth: bool, motor: bool) -> RouteDescriptor {
        RouteDescriptor {
            name: name.to_string(),
            path: path.to_string(),
            requires_auth,
            motor,
        }
    }

    fn designated() -> DesignatedRoutes {
        DesignatedRoutes {
            login: "Login".to_string(),
            dashboard: "Dashboard".to_string(),
            calibration: "Calibration".to_string(),
            run: "Run".to_string(),
        }
    }

    fn routes() -> Vec<RouteDescriptor> {
        vec![
            route("Login", "/login", false, false),
            route("Dashboard", "/", true, false),
            route("Calibration", "/calibration/", true, false),
            route("Run", "run", true, true),
        ]
    }

    #[test]
    fn test_paths_are_normalized() {
        let table = RouteTable::new("test", None, routes(), designated()).unwrap();
        assert_eq!(table.calibration_route().path, "/calibration");
        assert_eq!(table.run_route().path, "/run");
        assert!(table.is_run("/run/"));
        assert!(table.is_motor("/run?x=1"));
    }

    #[test]
    fn test_unknown_route_has_no_attributes() {
        let table = RouteTable::new("test", None, routes(), designated()).unwrap();
        assert!(table.resolve("/nowhere").is_none());
        assert!(!table.requires_auth("/nowhere"));
        assert!(!table.is_motor("/nowhere"));
    }

    #[test]
    fn test_missing_designated_route_rejected() {
        let mut d = designated();
        d.run = "Missing".to_string();
        let err = RouteTable::new("test", None, routes(), d).unwrap_err();
        assert!(err.to_string().contains("run route 'Missing'"));
    }

    #[test]
    fn test_auth_gated_login_rejected() {
        let mut r = routes();
        r[0].requires_auth = true;
        assert!(RouteTable::new("test", None, r, designated()).is_err());
    }

    #[test]
    fn test_duplicate_paths_rejected() {
        let mut r = routes();
        r.push(route("Other", "/run/", true, false));
        let err = RouteTable::new("test", None, r, designated()).unwrap_err();
        assert!(err.to_string().contains("Duplicate route path"));
    }

    #[test]
    fn test_location_full_path_encodes_query() {
        let loc = Location::new("/login").with_query("redirect", "/tilt-motor");
        assert_eq!(loc.full_path(), "/login?redirect=%2Ftilt-motor");

        let parsed = Location::parse(&loc.full_path());
        assert_eq!(parsed, loc);
        assert_eq!(parsed.query_value("redirect"), Some("/tilt-motor"));
    }

    #[test]
    fn test_location_without_query() {
        let loc = Location::parse("/rotary-motor/");
        assert_eq!(loc.path, "/rotary-motor");
        assert!(loc.query.is_empty());
        assert_eq!(loc.to_string(), "/rotary-motor");
    }
}
