use crate::endpoint::{ConnectionId, Endpoint, PortKind};
use crate::model::{find_node, find_node_mut, find_port, Connection, Node, Port, PortConnection};
use thiserror::Error;

/// A link read from the node list, with the display data of both halves.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionInfo {
    pub id: ConnectionId,
    /// Output half's class names first, then the input half's.
    pub class_names: Vec<String>,
    /// Output half's notes, falling back to the input half's.
    pub notes: Option<String>,
}

impl ConnectionInfo {
    pub fn input(&self) -> &Endpoint {
        &self.id.input
    }

    pub fn output(&self) -> &Endpoint {
        &self.id.output
    }
}

/// Derive the list of links from the input side of every port.
///
/// Links whose peer node or output port no longer exists are skipped.
pub fn derive_connections<P>(nodes: &[Node<P>]) -> Vec<ConnectionInfo> {
    let mut result = Vec::new();
    for node in nodes {
        for (index, port) in node.inputs.iter().enumerate() {
            for connection in port.connections() {
                let output = Endpoint::output(connection.node_id.clone(), connection.port);
                let Some(peer_port) = find_port(nodes, &output) else {
                    continue;
                };
                let opposite = peer_port
                    .connection
                    .as_ref()
                    .and_then(|pc| pc.find(&node.id, index));

                let mut class_names: Vec<String> = opposite
                    .map(|c| c.class_names.clone())
                    .unwrap_or_default();
                class_names.extend(connection.class_names.iter().cloned());
                let notes = opposite
                    .and_then(|c| c.notes.clone())
                    .or_else(|| connection.notes.clone());

                result.push(ConnectionInfo {
                    id: ConnectionId::new(Endpoint::input(node.id.clone(), index), output),
                    class_names,
                    notes,
                });
            }
        }
    }
    result
}

/// Every link touching `node_id`, collected from the node's own ports and from
/// peers that reference it. De-duplicated, in discovery order.
pub fn corresponding_connections<P>(nodes: &[Node<P>], node_id: &str) -> Vec<ConnectionId> {
    let mut result: Vec<ConnectionId> = Vec::new();
    let mut push = |id: ConnectionId| {
        if !result.contains(&id) {
            result.push(id);
        }
    };

    if let Some(node) = find_node(nodes, node_id) {
        for (index, port) in node.inputs.iter().enumerate() {
            for c in port.connections() {
                push(ConnectionId::new(
                    Endpoint::input(node_id, index),
                    Endpoint::output(c.node_id.clone(), c.port),
                ));
            }
        }
        for (index, port) in node.outputs.iter().enumerate() {
            for c in port.connections() {
                push(ConnectionId::new(
                    Endpoint::input(c.node_id.clone(), c.port),
                    Endpoint::output(node_id, index),
                ));
            }
        }
    }

    // Peers may still hold a half whose opposite was already dropped
    for peer in nodes.iter().filter(|n| n.id != node_id) {
        for (index, port) in peer.inputs.iter().enumerate() {
            for c in port.connections().iter().filter(|c| c.node_id == node_id) {
                push(ConnectionId::new(
                    Endpoint::input(peer.id.clone(), index),
                    Endpoint::output(node_id, c.port),
                ));
            }
        }
        for (index, port) in peer.outputs.iter().enumerate() {
            for c in port.connections().iter().filter(|c| c.node_id == node_id) {
                push(ConnectionId::new(
                    Endpoint::input(node_id, c.port),
                    Endpoint::output(peer.id.clone(), index),
                ));
            }
        }
    }

    result
}

/// Order two endpoints as `(input, output)`. `None` if the kinds are equal.
pub fn normalize_direction(a: Endpoint, b: Endpoint) -> Option<(Endpoint, Endpoint)> {
    match (a.kind, b.kind) {
        (PortKind::Input, PortKind::Output) => Some((a, b)),
        (PortKind::Output, PortKind::Input) => Some((b, a)),
        _ => None,
    }
}

/// Pre-flight checks for a new link, in the order the editor applies them:
/// directions, existence of both ports, single-occupied ports, then the
/// host validator with `(output, input)`.
pub fn check_connection<P>(
    nodes: &[Node<P>],
    input: &Endpoint,
    output: &Endpoint,
    validator: Option<&dyn ConnectionValidator<P>>,
) -> ValidationResult {
    if input.kind != PortKind::Input || output.kind != PortKind::Output {
        return ValidationResult::Invalid(ValidationError::IncompatibleDirection);
    }
    for endpoint in [input, output] {
        let Some(node) = find_node(nodes, &endpoint.node_id) else {
            return ValidationResult::Invalid(ValidationError::NodeNotFound(endpoint.node_id.clone()));
        };
        let Some(port) = node.port(endpoint.kind, endpoint.port) else {
            return ValidationResult::Invalid(ValidationError::PortNotFound(endpoint.clone()));
        };
        if port.is_singly_occupied() {
            return ValidationResult::Invalid(ValidationError::PortOccupied(endpoint.clone()));
        }
    }
    match validator {
        Some(v) => v.validate(output, input, nodes),
        None => ValidationResult::Valid,
    }
}

fn push_half(port: &mut Port, half: Connection) {
    match &mut port.connection {
        Some(PortConnection::Many(list)) => list.push(half),
        slot => *slot = Some(PortConnection::Single(half)),
    }
}

/// Write both halves of a link. Returns `false` and changes nothing when a
/// port is missing or became singly occupied since the link was checked.
pub fn attach_connection<P>(nodes: &mut [Node<P>], input: &Endpoint, output: &Endpoint) -> bool {
    for endpoint in [input, output] {
        match find_port(nodes, endpoint) {
            None => {
                tracing::warn!(%endpoint, "cannot attach connection, port is gone");
                return false;
            }
            Some(port) if port.is_singly_occupied() => {
                tracing::warn!(%endpoint, "cannot attach connection, port is already occupied");
                return false;
            }
            Some(_) => {}
        }
    }

    if let Some(port) = find_node_mut(nodes, &input.node_id).and_then(|n| n.port_mut(PortKind::Input, input.port)) {
        push_half(port, Connection::new(output.node_id.clone(), output.port));
    }
    if let Some(port) = find_node_mut(nodes, &output.node_id).and_then(|n| n.port_mut(PortKind::Output, output.port)) {
        push_half(port, Connection::new(input.node_id.clone(), input.port));
    }
    true
}

fn remove_half(port: &mut Port, node_id: &str, index: usize) -> bool {
    match &mut port.connection {
        Some(PortConnection::Many(list)) => {
            let Some(position) = list.iter().position(|c| c.matches(node_id, index)) else {
                return false;
            };
            list.remove(position);
            return true;
        }
        Some(PortConnection::Single(c)) if c.matches(node_id, index) => {}
        _ => return false,
    }
    port.connection = None;
    true
}

/// Remove the first matching half from each side. Returns `true` if anything
/// was removed.
pub fn detach_connection<P>(nodes: &mut [Node<P>], input: &Endpoint, output: &Endpoint) -> bool {
    let mut removed = false;
    if let Some(port) = find_node_mut(nodes, &input.node_id).and_then(|n| n.port_mut(PortKind::Input, input.port)) {
        removed |= remove_half(port, &output.node_id, output.port);
    }
    if let Some(port) = find_node_mut(nodes, &output.node_id).and_then(|n| n.port_mut(PortKind::Output, output.port)) {
        removed |= remove_half(port, &input.node_id, input.port);
    }
    removed
}

/// Drop every half still pointing at `node_id` from the other nodes' ports.
/// Returns how many halves were removed.
pub fn detach_node<P>(nodes: &mut [Node<P>], node_id: &str) -> usize {
    let mut removed = 0;
    for node in nodes.iter_mut().filter(|n| n.id != node_id) {
        for port in node.inputs.iter_mut().chain(node.outputs.iter_mut()) {
            let clear = match &mut port.connection {
                Some(PortConnection::Many(list)) => {
                    let before = list.len();
                    list.retain(|c| c.node_id != node_id);
                    removed += before - list.len();
                    false
                }
                Some(PortConnection::Single(c)) => c.node_id == node_id,
                None => false,
            };
            if clear {
                port.connection = None;
                removed += 1;
            }
        }
    }
    removed
}

// ============================================================================
// Connection Validation Framework
// ============================================================================

/// Result of connection validation with optional rejection reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Combine two results (AND logic): returns first error if any
    pub fn and(self, other: ValidationResult) -> ValidationResult {
        match self {
            ValidationResult::Valid => other,
            invalid => invalid,
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(e) => Err(e),
        }
    }
}

/// Reasons why a connection was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Must connect input to output")]
    IncompatibleDirection,

    #[error("Node {0} not found")]
    NodeNotFound(String),

    #[error("Port {0} not found")]
    PortNotFound(Endpoint),

    #[error("Port {0} already holds its single connection")]
    PortOccupied(Endpoint),

    #[error("Connection already exists")]
    DuplicateConnection,

    #[error("Rejected by connection validator")]
    Rejected,

    #[error("{0}")]
    Custom(String),
}

/// Host hook deciding whether `output` may be linked to `input`.
///
/// Any `Fn(&Endpoint, &Endpoint) -> bool` is a validator; a `false` return
/// becomes [`ValidationError::Rejected`]. Implement the trait directly to
/// inspect the node list or report a specific reason.
///
/// # Example
///
/// ```ignore
/// struct FanOut { max: usize }
///
/// impl<P> ConnectionValidator<P> for FanOut {
///     fn validate(&self, output: &Endpoint, _input: &Endpoint, nodes: &[Node<P>]) -> ValidationResult {
///         let used = find_port(nodes, output).map_or(0, |p| p.connections().len());
///         if used >= self.max {
///             ValidationResult::Invalid(ValidationError::Custom("fan-out limit".into()))
///         } else {
///             ValidationResult::Valid
///         }
///     }
/// }
/// ```
pub trait ConnectionValidator<P = serde_json::Value> {
    fn validate(&self, output: &Endpoint, input: &Endpoint, nodes: &[Node<P>]) -> ValidationResult;
}

impl<P, F> ConnectionValidator<P> for F
where
    F: Fn(&Endpoint, &Endpoint) -> bool,
{
    fn validate(&self, output: &Endpoint, input: &Endpoint, _nodes: &[Node<P>]) -> ValidationResult {
        if self(output, input) {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(ValidationError::Rejected)
        }
    }
}

/// Refuses a link the output port already holds.
#[derive(Clone, Debug, Default)]
pub struct NoDuplicatesValidator;

impl<P> ConnectionValidator<P> for NoDuplicatesValidator {
    fn validate(&self, output: &Endpoint, input: &Endpoint, nodes: &[Node<P>]) -> ValidationResult {
        let exists = find_port(nodes, output)
            .and_then(|port| port.connection.as_ref())
            .is_some_and(|pc| pc.contains(&input.node_id, input.port));
        if exists {
            ValidationResult::Invalid(ValidationError::DuplicateConnection)
        } else {
            ValidationResult::Valid
        }
    }
}

/// Composite validator that combines multiple validators
///
/// All validators must return Valid for the connection to be valid (AND logic).
/// Returns the first error encountered.
///
/// # Example
///
/// ```ignore
/// let validator = CompositeValidator::new()
///     .add(NoDuplicatesValidator)
///     .add(|output: &Endpoint, input: &Endpoint| output.node_id != input.node_id);
/// ```
pub struct CompositeValidator<P = serde_json::Value> {
    validators: Vec<Box<dyn ConnectionValidator<P>>>,
}

impl<P> Default for CompositeValidator<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> CompositeValidator<P> {
    pub fn new() -> Self {
        Self { validators: Vec::new() }
    }

    /// Validators run in the order they were added.
    pub fn add<V: ConnectionValidator<P> + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }
}

impl<P> ConnectionValidator<P> for CompositeValidator<P> {
    fn validate(&self, output: &Endpoint, input: &Endpoint, nodes: &[Node<P>]) -> ValidationResult {
        for v in &self.validators {
            let result = v.validate(output, input, nodes);
            if !result.is_valid() {
                return result;
            }
        }
        ValidationResult::Valid
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, inputs: Vec<Port>, outputs: Vec<Port>) -> Node<()> {
        Node::new(id, "t", id, ()).with_inputs(inputs).with_outputs(outputs)
    }

    /// a.out0 -> b.in0 on array ports, plus an unconnected c
    fn setup() -> Vec<Node<()>> {
        vec![
            node("a", vec![], vec![Port::multi("out", vec![Connection::new("b", 0)])]),
            node(
                "b",
                vec![Port::multi("in", vec![Connection::new("a", 0)]), Port::new("in2")],
                vec![Port::multi("out", vec![])],
            ),
            node("c", vec![Port::multi("in", vec![])], vec![Port::new("out")]),
        ]
    }

    // ========================================================================
    // derive_connections()
    // ========================================================================

    #[test]
    fn test_derive_connections_reads_input_side() {
        let nodes = setup();
        let links = derive_connections(&nodes);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].input(), &Endpoint::input("b", 0));
        assert_eq!(links[0].output(), &Endpoint::output("a", 0));
    }

    #[test]
    fn test_derive_connections_skips_missing_peers() {
        let mut nodes = setup();
        nodes.retain(|n| n.id != "a");
        assert!(derive_connections(&nodes).is_empty());

        let mut nodes = setup();
        nodes[0].outputs.clear();
        assert!(derive_connections(&nodes).is_empty());
    }

    #[test]
    fn test_derive_connections_merges_class_names_and_notes() {
        let nodes = vec![
            node(
                "a",
                vec![],
                vec![Port::multi(
                    "out",
                    vec![Connection::new("b", 0).with_class_names(vec!["hot".into()])],
                )],
            ),
            node(
                "b",
                vec![Port::single(
                    "in",
                    Connection::new("a", 0)
                        .with_class_names(vec!["wide".into()])
                        .with_notes("from b"),
                )],
                vec![],
            ),
        ];
        let links = derive_connections(&nodes);
        assert_eq!(links[0].class_names, vec!["hot".to_string(), "wide".to_string()]);
        assert_eq!(links[0].notes.as_deref(), Some("from b"));
    }

    // ========================================================================
    // attach / detach
    // ========================================================================

    #[test]
    fn test_attach_then_detach_restores_graph() {
        let mut nodes = setup();
        let before = nodes.clone();
        let (input, output) = (Endpoint::input("c", 0), Endpoint::output("b", 0));

        assert!(attach_connection(&mut nodes, &input, &output));
        assert!(nodes[2].inputs[0].connection.as_ref().unwrap().contains("b", 0));
        assert!(nodes[1].outputs[0].connection.as_ref().unwrap().contains("c", 0));

        assert!(detach_connection(&mut nodes, &input, &output));
        assert_eq!(nodes, before);
    }

    #[test]
    fn test_attach_to_empty_port_stores_single() {
        let mut nodes = setup();
        let (input, output) = (Endpoint::input("b", 1), Endpoint::output("c", 0));
        assert!(attach_connection(&mut nodes, &input, &output));
        assert!(nodes[1].inputs[1].is_singly_occupied());
        assert!(nodes[2].outputs[0].is_singly_occupied());

        // A second attach onto the now single ports is refused
        let before = nodes.clone();
        assert!(!attach_connection(&mut nodes, &input, &output));
        assert_eq!(nodes, before);
    }

    #[test]
    fn test_detach_single_clears_only_on_match() {
        let mut nodes = vec![
            node("a", vec![], vec![Port::single("out", Connection::new("b", 0))]),
            node("b", vec![Port::single("in", Connection::new("a", 0))], vec![]),
        ];
        assert!(!detach_connection(&mut nodes, &Endpoint::input("b", 0), &Endpoint::output("x", 0)));
        assert!(nodes[1].inputs[0].is_connected());

        assert!(detach_connection(&mut nodes, &Endpoint::input("b", 0), &Endpoint::output("a", 0)));
        assert_eq!(nodes[0].outputs[0].connection, None);
        assert_eq!(nodes[1].inputs[0].connection, None);
    }

    #[test]
    fn test_detach_without_match_is_noop() {
        let mut nodes = setup();
        let before = nodes.clone();
        assert!(!detach_connection(&mut nodes, &Endpoint::input("c", 0), &Endpoint::output("a", 0)));
        assert_eq!(nodes, before);
    }

    #[test]
    fn test_detach_node_drops_duplicate_halves() {
        let mut nodes = setup();
        attach_connection(&mut nodes, &Endpoint::input("b", 0), &Endpoint::output("a", 0));
        nodes[2].inputs[0].connection = Some(PortConnection::Single(Connection::new("b", 0)));

        assert_eq!(detach_node(&mut nodes, "b"), 3);
        assert!(nodes[0].outputs[0].connections().is_empty());
        assert_eq!(nodes[2].inputs[0].connection, None);
        // b's own ports are left alone
        assert_eq!(nodes[1].inputs[0].connections().len(), 2);
    }

    // ========================================================================
    // corresponding_connections()
    // ========================================================================

    #[test]
    fn test_corresponding_connections_both_directions() {
        let mut nodes = setup();
        attach_connection(&mut nodes, &Endpoint::input("c", 0), &Endpoint::output("b", 0));

        let links = corresponding_connections(&nodes, "b");
        assert_eq!(
            links,
            vec![
                ConnectionId::new(Endpoint::input("b", 0), Endpoint::output("a", 0)),
                ConnectionId::new(Endpoint::input("c", 0), Endpoint::output("b", 0)),
            ]
        );
    }

    #[test]
    fn test_corresponding_connections_includes_dangling_peer_halves() {
        let mut nodes = setup();
        // b forgot its half, a still references b
        nodes[1].inputs[0].connection = Some(PortConnection::Many(vec![]));
        let links = corresponding_connections(&nodes, "b");
        assert_eq!(
            links,
            vec![ConnectionId::new(Endpoint::input("b", 0), Endpoint::output("a", 0))]
        );
    }

    #[test]
    fn test_corresponding_connections_unconnected() {
        assert!(corresponding_connections(&setup(), "c").is_empty());
        assert!(corresponding_connections(&setup(), "missing").is_empty());
    }

    // ========================================================================
    // check_connection() and validators
    // ========================================================================

    #[test]
    fn test_check_connection_rules() {
        let nodes = setup();
        let ok = check_connection(&nodes, &Endpoint::input("c", 0), &Endpoint::output("b", 0), None);
        assert!(ok.is_valid());

        let same_kind = check_connection(&nodes, &Endpoint::output("c", 0), &Endpoint::output("b", 0), None);
        assert_eq!(same_kind, ValidationResult::Invalid(ValidationError::IncompatibleDirection));

        let missing = check_connection(&nodes, &Endpoint::input("z", 0), &Endpoint::output("b", 0), None);
        assert_eq!(missing, ValidationResult::Invalid(ValidationError::NodeNotFound("z".into())));

        let no_port = check_connection(&nodes, &Endpoint::input("c", 9), &Endpoint::output("b", 0), None);
        assert_eq!(
            no_port,
            ValidationResult::Invalid(ValidationError::PortNotFound(Endpoint::input("c", 9)))
        );
    }

    #[test]
    fn test_check_connection_refuses_single_ports() {
        let nodes = vec![
            node("a", vec![], vec![Port::single("out", Connection::new("x", 0))]),
            node("b", vec![Port::new("in")], vec![]),
        ];
        let result = check_connection(&nodes, &Endpoint::input("b", 0), &Endpoint::output("a", 0), None);
        assert_eq!(
            result,
            ValidationResult::Invalid(ValidationError::PortOccupied(Endpoint::output("a", 0)))
        );
    }

    #[test]
    fn test_closure_validator_gets_output_first() {
        let nodes = setup();
        let validator = |output: &Endpoint, input: &Endpoint| {
            output.kind == PortKind::Output && input.kind == PortKind::Input && output.node_id != "b"
        };
        let result = check_connection(
            &nodes,
            &Endpoint::input("c", 0),
            &Endpoint::output("b", 0),
            Some(&validator),
        );
        assert_eq!(result, ValidationResult::Invalid(ValidationError::Rejected));

        let result = check_connection(
            &nodes,
            &Endpoint::input("c", 0),
            &Endpoint::output("a", 0),
            Some(&validator),
        );
        assert!(result.is_valid());
    }

    #[test]
    fn test_no_duplicates_validator() {
        let nodes = setup();
        let v = NoDuplicatesValidator;
        assert_eq!(
            v.validate(&Endpoint::output("a", 0), &Endpoint::input("b", 0), &nodes),
            ValidationResult::Invalid(ValidationError::DuplicateConnection)
        );
        assert!(v
            .validate(&Endpoint::output("a", 0), &Endpoint::input("c", 0), &nodes)
            .is_valid());
    }

    #[test]
    fn test_composite_validator_first_error_wins() {
        let nodes = setup();
        let validator: CompositeValidator<()> = CompositeValidator::new()
            .add(NoDuplicatesValidator)
            .add(|_: &Endpoint, _: &Endpoint| false);

        assert_eq!(
            validator.validate(&Endpoint::output("a", 0), &Endpoint::input("b", 0), &nodes),
            ValidationResult::Invalid(ValidationError::DuplicateConnection)
        );
        assert_eq!(
            validator.validate(&Endpoint::output("a", 0), &Endpoint::input("c", 0), &nodes),
            ValidationResult::Invalid(ValidationError::Rejected)
        );
    }

    #[test]
    fn test_validation_result_and_combinator() {
        assert!(ValidationResult::Valid.and(ValidationResult::Valid).is_valid());
        assert_eq!(
            ValidationResult::Invalid(ValidationError::Rejected)
                .and(ValidationResult::Invalid(ValidationError::DuplicateConnection)),
            ValidationResult::Invalid(ValidationError::Rejected)
        );
        assert_eq!(
            ValidationResult::Invalid(ValidationError::Rejected).into_result(),
            Err(ValidationError::Rejected)
        );
    }

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            ValidationError::PortOccupied(Endpoint::output("a", 1)).to_string(),
            "Port a_1_output already holds its single connection"
        );
        assert_eq!(ValidationError::Custom("nope".into()).to_string(), "nope");
    }

    #[test]
    fn test_normalize_direction() {
        let (i, o) = (Endpoint::input("a", 0), Endpoint::output("b", 0));
        assert_eq!(normalize_direction(o.clone(), i.clone()), Some((i.clone(), o.clone())));
        assert_eq!(normalize_direction(i.clone(), o.clone()), Some((i.clone(), o)));
        assert_eq!(normalize_direction(i.clone(), i), None);
    }
}
