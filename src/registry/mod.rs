//! CommandRegistry: the authoritative mapping from HTTP surface to node commands.
//!
//! The registry is built once at startup from the per-category route tables in
//! `routes`, validated against its invariants, and then only read. Matching is
//! a linear scan in declaration order; first structural match wins.

pub mod route;
pub mod routes;

use std::collections::HashSet;

use crate::error::GatewayError;

pub use route::{
    HttpMethod, OutputShape, ParamSource, ParamSpec, ParamType, PathTemplate, Program, RouteSpec,
    Scalar, Segment, TimeoutClass,
};

/// Immutable, validated table of routes.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    routes: Vec<RouteSpec>,
}

/// A route matched against a request path, with its raw path captures.
#[derive(Debug)]
pub struct RouteMatch<'r, 'p> {
    pub route: &'r RouteSpec,
    pub captures: Vec<(&'static str, &'p str)>,
}

impl CommandRegistry {
    /// Build a registry from routes, checking every invariant.
    ///
    /// Returns `GatewayError::InvalidRoute` if:
    /// - two routes share (method, path template)
    /// - a route's placeholders differ from its path-sourced params
    /// - a route declares the same param name twice
    /// - a required request param follows an optional one without a default
    /// - a default is declared on a required param
    pub fn new(routes: Vec<RouteSpec>) -> crate::Result<Self> {
        let mut seen: HashSet<(HttpMethod, &'static str)> = HashSet::new();
        for route in &routes {
            let id = format!("{} {}", route.method, route.path);
            if !seen.insert((route.method, route.path.as_str())) {
                return Err(GatewayError::InvalidRoute(
                    id,
                    "duplicate (method, path)".to_string(),
                ));
            }
            validate_route(route).map_err(|reason| GatewayError::InvalidRoute(id, reason))?;
        }
        Ok(Self { routes })
    }

    /// The full built-in route catalogue.
    pub fn builtin() -> crate::Result<Self> {
        Self::new(routes::all())
    }

    pub fn routes(&self) -> &[RouteSpec] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the first route matching method and raw path.
    pub fn resolve<'r, 'p>(
        &'r self,
        method: HttpMethod,
        path: &'p str,
    ) -> Option<RouteMatch<'r, 'p>> {
        self.routes
            .iter()
            .filter(|route| route.method == method)
            .find_map(|route| {
                route
                    .path
                    .matches(path)
                    .map(|captures| RouteMatch { route, captures })
            })
    }
}

fn validate_route(route: &RouteSpec) -> std::result::Result<(), String> {
    if route.verb.is_empty() {
        return Err("empty command verb".to_string());
    }

    // Placeholder names must be exactly the path-sourced params
    let placeholders: HashSet<&str> = route.path.param_names().collect();
    let path_params: HashSet<&str> = route
        .params
        .iter()
        .filter(|p| p.source == ParamSource::Path)
        .map(|p| p.name)
        .collect();
    if placeholders != path_params {
        return Err(format!(
            "placeholders {:?} do not match path params {:?}",
            sorted(&placeholders),
            sorted(&path_params)
        ));
    }
    if placeholders.len() != route.path.param_names().count() {
        return Err("placeholder declared twice".to_string());
    }

    let mut names: HashSet<&str> = HashSet::new();
    let mut gap_before: Option<&str> = None;
    for param in &route.params {
        if !names.insert(param.name) {
            return Err(format!("param '{}' declared twice", param.name));
        }
        if param.required && param.default.is_some() {
            return Err(format!("required param '{}' has a default", param.name));
        }
        if param.source == ParamSource::Path && !param.required {
            return Err(format!("path param '{}' must be required", param.name));
        }
        match param.source {
            ParamSource::Fixed(_) => {
                if let Some(optional) = gap_before {
                    return Err(format!(
                        "fixed param '{}' follows optional param '{}'",
                        param.name, optional
                    ));
                }
            }
            _ if param.required => {
                if let Some(optional) = gap_before {
                    return Err(format!(
                        "required param '{}' follows optional param '{}'",
                        param.name, optional
                    ));
                }
            }
            _ => {
                if param.default.is_none() && gap_before.is_none() {
                    gap_before = Some(param.name);
                }
            }
        }
    }
    Ok(())
}

fn sorted<'a>(set: &HashSet<&'a str>) -> Vec<&'a str> {
    let mut v: Vec<&str> = set.iter().copied().collect();
    v.sort_unstable();
    v
}
