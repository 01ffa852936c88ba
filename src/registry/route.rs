//! Route declarations: the data half of the command registry.
//!
//! A `RouteSpec` maps one HTTP endpoint to one node command. Everything the
//! dispatcher needs (parameter order and types, output shape, timeout class,
//! sensitivity) lives here as plain data, so each route is testable without a
//! server or a node.

use std::fmt;

/// HTTP method of a route. GET is read-only, POST mutates node state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn from_http(method: &axum::http::Method) -> Option<Self> {
        if method == axum::http::Method::GET {
            Some(HttpMethod::Get)
        } else if method == axum::http::Method::POST {
            Some(HttpMethod::Post)
        } else {
            None
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// Which executable a route runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    /// The command-line front-end (`bitcoin-cli`).
    Cli,
    /// The daemon binary (`bitcoind`), used only to start the node.
    Daemon,
}

/// Where a parameter value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    /// A named placeholder in the path template.
    Path,
    /// A query-string key.
    Query,
    /// A literal supplied by the route itself, never read from the request.
    Fixed(&'static str),
}

/// Declared type of a parameter; values are validated before any subprocess runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Opaque text (hashes, addresses, hex blobs).
    String,
    /// Base-10 integer, optionally signed.
    Integer,
    /// Finite decimal number.
    Number,
    /// Exactly `true` or `false`.
    Boolean,
    /// A JSON document, forwarded in compact form.
    Json,
    /// One of a fixed set of words.
    Choice(&'static [&'static str]),
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::String => write!(f, "string"),
            ParamType::Integer => write!(f, "integer"),
            ParamType::Number => write!(f, "number"),
            ParamType::Boolean => write!(f, "boolean"),
            ParamType::Json => write!(f, "json"),
            ParamType::Choice(options) => write!(f, "one of {}", options.join("|")),
        }
    }
}

/// One positional argument of a node command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub source: ParamSource,
    pub ty: ParamType,
    pub required: bool,
    /// Forwarded when an optional parameter is omitted.
    pub default: Option<&'static str>,
}

impl ParamSpec {
    /// A required path placeholder.
    pub fn path(name: &'static str, ty: ParamType) -> Self {
        Self {
            name,
            source: ParamSource::Path,
            ty,
            required: true,
            default: None,
        }
    }

    /// A required query parameter.
    pub fn query(name: &'static str, ty: ParamType) -> Self {
        Self {
            name,
            source: ParamSource::Query,
            ty,
            required: true,
            default: None,
        }
    }

    /// An optional query parameter.
    pub fn optional(name: &'static str, ty: ParamType) -> Self {
        Self {
            required: false,
            ..Self::query(name, ty)
        }
    }

    /// A literal argument supplied by the route.
    pub fn fixed(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            source: ParamSource::Fixed(value),
            ty: ParamType::String,
            required: true,
            default: None,
        }
    }

    /// Forward `value` when the caller omits this (optional) parameter.
    pub fn or(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }
}

/// Kind of scalar a `WrapScalar` shape produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    /// JSON string; empty output relays as `null`.
    Text,
    /// JSON number; non-numeric output is a protocol error.
    Number,
}

/// How a successful command's stdout becomes the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    /// stdout is a JSON document and becomes the body verbatim.
    PassthroughJson,
    /// `{"<key>": <stdout without trailing whitespace>}`.
    WrapScalar { key: &'static str, scalar: Scalar },
    /// `{"<key>": true|false}`.
    WrapBoolean { key: &'static str },
    /// `{"acknowledged": true}` for commands with a null result.
    Acknowledge,
}

impl fmt::Display for OutputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputShape::PassthroughJson => write!(f, "passthrough-json"),
            OutputShape::WrapScalar { key, .. } => write!(f, "wrap-scalar:{}", key),
            OutputShape::WrapBoolean { key } => write!(f, "wrap-boolean:{}", key),
            OutputShape::Acknowledge => write!(f, "acknowledge"),
        }
    }
}

/// Which configured timeout applies to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutClass {
    Default,
    Slow,
}

/// Declarative mapping from one HTTP endpoint to one node command.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub method: HttpMethod,
    pub path: PathTemplate,
    pub program: Program,
    pub verb: &'static str,
    pub params: Vec<ParamSpec>,
    pub output: OutputShape,
    /// Arguments and stderr of sensitive routes are never echoed or logged.
    pub sensitive: bool,
    pub timeout: TimeoutClass,
}

impl RouteSpec {
    fn new(method: HttpMethod, template: &'static str, verb: &'static str) -> Self {
        Self {
            method,
            path: PathTemplate::parse(template),
            program: Program::Cli,
            verb,
            params: Vec::new(),
            output: OutputShape::PassthroughJson,
            sensitive: false,
            timeout: TimeoutClass::Default,
        }
    }

    /// A read-only route.
    pub fn get(template: &'static str, verb: &'static str) -> Self {
        Self::new(HttpMethod::Get, template, verb)
    }

    /// A state-mutating route.
    pub fn post(template: &'static str, verb: &'static str) -> Self {
        Self::new(HttpMethod::Post, template, verb)
    }

    pub fn params(mut self, params: Vec<ParamSpec>) -> Self {
        self.params = params;
        self
    }

    pub fn text(mut self, key: &'static str) -> Self {
        self.output = OutputShape::WrapScalar {
            key,
            scalar: Scalar::Text,
        };
        self
    }

    pub fn number(mut self, key: &'static str) -> Self {
        self.output = OutputShape::WrapScalar {
            key,
            scalar: Scalar::Number,
        };
        self
    }

    pub fn boolean(mut self, key: &'static str) -> Self {
        self.output = OutputShape::WrapBoolean { key };
        self
    }

    pub fn acknowledge(mut self) -> Self {
        self.output = OutputShape::Acknowledge;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn slow(mut self) -> Self {
        self.timeout = TimeoutClass::Slow;
        self
    }

    pub fn daemon(mut self) -> Self {
        self.program = Program::Daemon;
        self
    }

    pub fn is_mutating(&self) -> bool {
        self.method == HttpMethod::Post
    }
}

/// One segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(&'static str),
    Param(&'static str),
}

/// A path template of literal segments and `:name` placeholders.
///
/// No wildcards, no regex: a request path matches when it has the same number
/// of segments and every literal segment is equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: &'static str,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(raw: &'static str) -> Self {
        let segments = raw
            .trim_start_matches('/')
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => Segment::Param(name),
                None => Segment::Literal(segment),
            })
            .collect();
        Self { raw, segments }
    }

    pub fn as_str(&self) -> &'static str {
        self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in template order.
    pub fn param_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(*name),
            Segment::Literal(_) => None,
        })
    }

    /// Match a raw request path, returning `(name, raw value)` captures.
    ///
    /// Captured values are still percent-encoded; decoding happens during
    /// parameter extraction so that an encoded `/` cannot split a segment.
    pub fn matches<'p>(&self, path: &'p str) -> Option<Vec<(&'static str, &'p str)>> {
        let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut captures = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) => {
                    if *literal != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    captures.push((*name, part));
                }
            }
        }
        Some(captures)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw)
    }
}
