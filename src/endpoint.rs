//! Identity of link endpoints and of whole links.
//!
//! An [`Endpoint`] names one side of a link: a port on a node plus its
//! direction. It is the key for every per-port cache in the editor. The
//! string form `"{node_id}_{port}_{kind}"` is kept for hosts that need a flat
//! id (selection ids, logging, persistence), and parses back with
//! [`extract_endpoint_info`].

use crate::error::EndpointParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    Input,
    Output,
}

impl PortKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortKind::Input => "input",
            PortKind::Output => "output",
        }
    }

    pub fn opposite(&self) -> PortKind {
        match self {
            PortKind::Input => PortKind::Output,
            PortKind::Output => PortKind::Input,
        }
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a link: `(node, port index, direction)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub node_id: String,
    pub port: usize,
    pub kind: PortKind,
}

impl Endpoint {
    pub fn new(node_id: impl Into<String>, port: usize, kind: PortKind) -> Self {
        Self {
            node_id: node_id.into(),
            port,
            kind,
        }
    }

    pub fn input(node_id: impl Into<String>, port: usize) -> Self {
        Self::new(node_id, port, PortKind::Input)
    }

    pub fn output(node_id: impl Into<String>, port: usize) -> Self {
        Self::new(node_id, port, PortKind::Output)
    }

    /// Flat string id of this endpoint.
    pub fn id(&self) -> String {
        compute_id(&self.node_id, self.port, self.kind)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.node_id, self.port, self.kind)
    }
}

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        extract_endpoint_info(s)
    }
}

/// `"{node_id}_{port}_{kind}"`
pub fn compute_id(node_id: &str, port: usize, kind: PortKind) -> String {
    format!("{}_{}_{}", node_id, port, kind)
}

/// Parse an id produced by [`compute_id`].
///
/// The `_{digits}_{input|output}` suffix is matched from the right, so node
/// ids may themselves contain underscores and digits.
pub fn extract_endpoint_info(id: &str) -> Result<Endpoint, EndpointParseError> {
    let illegal = || EndpointParseError::IllegalEndpointId(id.to_string());

    let mut parts = id.rsplitn(3, '_');
    let kind = match parts.next() {
        Some("input") => PortKind::Input,
        Some("output") => PortKind::Output,
        _ => return Err(illegal()),
    };
    let port = parts.next().ok_or_else(illegal)?;
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(illegal());
    }
    let port: usize = port.parse().map_err(|_| illegal())?;
    let node_id = parts.next().filter(|n| !n.is_empty()).ok_or_else(illegal)?;

    Ok(Endpoint::new(node_id, port, kind))
}

/// Identity of a full link, always stored as `(input side, output side)`.
///
/// Its string form is `"{input id}__{output id}"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId {
    pub input: Endpoint,
    pub output: Endpoint,
}

impl ConnectionId {
    pub fn new(input: Endpoint, output: Endpoint) -> Self {
        Self { input, output }
    }

    /// True if either side belongs to `node_id`.
    pub fn touches(&self, node_id: &str) -> bool {
        self.input.node_id == node_id || self.output.node_id == node_id
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}__{}", self.input, self.output)
    }
}

impl FromStr for ConnectionId {
    type Err = EndpointParseError;

    /// Splits on the first `"__"` whose halves are both valid endpoint ids.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let separators = (0..s.len()).filter(|&i| s.is_char_boundary(i) && s[i..].starts_with("__"));
        for index in separators {
            let (input, output) = (&s[..index], &s[index + 2..]);
            if let (Ok(input), Ok(output)) = (extract_endpoint_info(input), extract_endpoint_info(output)) {
                return Ok(ConnectionId::new(input, output));
            }
        }
        Err(EndpointParseError::IllegalConnectionId(s.to_string()))
    }
}
