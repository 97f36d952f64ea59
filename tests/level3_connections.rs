//! Level 3: Connection Tests
//!
//! Tests creating connections by dragging between ports, rejection rules,
//! removal, and how the change listener sees connection changes.

mod common;

use common::harness::{chain_nodes, EditorHarness};
use common::CommitMode;
use flow_editor::{
    ChangeAction, Connection, EditorConfig, Endpoint, Node, NoDuplicatesValidator, Port, PortConnection,
    ValidationError, ValidationResult, Vector2d,
};

fn a_out() -> Endpoint {
    Endpoint::output("a", 0)
}

fn b_rhs() -> Endpoint {
    Endpoint::input("b", 1)
}

// ============================================================================
// Dragging between ports
// ============================================================================

#[test]
fn test_drag_from_output_to_input_connects() {
    let mut harness = EditorHarness::new();
    harness.drag_connection(&a_out(), &b_rhs());

    assert_eq!(harness.connection_count(), 3);
    assert!(harness.port(&b_rhs()).connections().contains(&Connection::new("a", 0)));
    assert!(harness.port(&a_out()).connections().contains(&Connection::new("b", 1)));
    assert!(harness.editor.state().working_connection().is_none());
}

#[test]
fn test_drag_from_input_to_output_connects() {
    let mut harness = EditorHarness::new();
    harness.drag_connection(&b_rhs(), &a_out());
    assert!(harness.port(&b_rhs()).connections().contains(&Connection::new("a", 0)));
}

#[test]
fn test_working_connection_follows_pointer() {
    let mut harness = EditorHarness::new();
    let start = harness.anchor_client(&a_out());
    harness.press(start);
    harness.move_to(Vector2d::new(220.0, 330.0));

    let working = harness.editor.state().working_connection().unwrap().clone();
    assert_eq!(working.origin, a_out());
    assert_eq!(working.output, Vector2d::new(50.0, 150.0));
    // Client minus the editor origin (20, 30)
    assert_eq!(working.input, Vector2d::new(200.0, 300.0));

    let frame = harness.editor.frame(|_| ());
    assert!(frame.working.unwrap().path.starts_with("M 50 150 C "));
}

#[test]
fn test_release_on_background_discards() {
    let mut harness = EditorHarness::new();
    let start = harness.anchor_client(&a_out());
    harness.press(start);
    harness.move_to(Vector2d::new(900.0, 700.0));
    harness.release(Vector2d::new(900.0, 700.0));

    assert_eq!(harness.connection_count(), 2);
    assert!(harness.editor.state().working_connection().is_none());
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_output_to_output_is_a_no_op() {
    let nodes: Vec<Node> = vec![
        Node::new("p", "t", "P", serde_json::Value::Null).with_outputs(vec![Port::new("out")]),
        Node::new("q", "t", "Q", serde_json::Value::Null)
            .with_position(Vector2d::new(400.0, 0.0))
            .with_outputs(vec![Port::new("out")]),
    ];
    let tracker = common::ChangeTracker::new();
    let config = EditorConfig::default().with_listener(tracker.listener(CommitMode::Immediate));
    let mut harness = EditorHarness::with_config(nodes.clone(), config);

    let result = harness
        .editor
        .create_connection(Endpoint::output("p", 0), Endpoint::output("q", 0));
    assert_eq!(result, ValidationResult::Invalid(ValidationError::IncompatibleDirection));
    assert_eq!(harness.editor.nodes(), &nodes[..]);
    assert!(tracker.actions.borrow().is_empty());
}

#[test]
fn test_single_connection_port_is_refused() {
    let mut harness = EditorHarness::with_listener(CommitMode::Immediate);
    let c_in = Endpoint::input("c", 0);
    let before = harness.port(&c_in).clone();

    let result = harness.editor.create_connection(a_out(), c_in.clone());
    assert_eq!(result, ValidationResult::Invalid(ValidationError::PortOccupied(c_in.clone())));
    assert_eq!(harness.port(&c_in), &before);
    assert!(harness.tracker.actions.borrow().is_empty());
}

#[test]
fn test_validator_sees_output_then_input() {
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let config = EditorConfig::default().with_connection_validator({
        let seen = seen.clone();
        move |output: &Endpoint, input: &Endpoint| {
            seen.borrow_mut().push((output.clone(), input.clone()));
            input.node_id != "b"
        }
    });
    let mut harness = EditorHarness::with_config(chain_nodes(), config);

    harness.drag_connection(&b_rhs(), &a_out());
    assert_eq!(harness.connection_count(), 2);
    assert_eq!(seen.borrow().as_slice(), &[(a_out(), b_rhs())]);
}

#[test]
fn test_duplicate_links_allowed_unless_validated() {
    let mut harness = EditorHarness::new();
    assert!(harness
        .editor
        .create_connection(a_out(), Endpoint::input("b", 0))
        .is_valid());
    assert_eq!(harness.port(&a_out()).connections().len(), 2);

    let mut harness = EditorHarness::with_config(
        chain_nodes(),
        EditorConfig::default().with_validator(NoDuplicatesValidator),
    );
    let result = harness.editor.create_connection(a_out(), Endpoint::input("b", 0));
    assert_eq!(result, ValidationResult::Invalid(ValidationError::DuplicateConnection));
}

#[test]
fn test_unknown_port_is_refused() {
    let mut harness = EditorHarness::new();
    let result = harness.editor.create_connection(a_out(), Endpoint::input("b", 9));
    assert_eq!(
        result,
        ValidationResult::Invalid(ValidationError::PortNotFound(Endpoint::input("b", 9)))
    );
    let result = harness.editor.create_connection(a_out(), Endpoint::input("zz", 0));
    assert_eq!(result, ValidationResult::Invalid(ValidationError::NodeNotFound("zz".into())));
}

// ============================================================================
// Create / remove round trip
// ============================================================================

#[test]
fn test_create_then_remove_restores_empty_field() {
    let nodes: Vec<Node> = vec![
        Node::new("p", "t", "P", serde_json::Value::Null).with_outputs(vec![Port::new("out")]),
        Node::new("q", "t", "Q", serde_json::Value::Null)
            .with_position(Vector2d::new(400.0, 0.0))
            .with_inputs(vec![Port::new("in")]),
    ];
    let mut harness = EditorHarness::with_config(nodes.clone(), EditorConfig::default());
    let (input, output) = (Endpoint::input("q", 0), Endpoint::output("p", 0));

    assert!(harness.editor.create_connection(input.clone(), output.clone()).is_valid());
    assert_eq!(
        harness.port(&input).connection,
        Some(PortConnection::Single(Connection::new("p", 0)))
    );

    harness.editor.remove_connection(input.clone(), output);
    assert_eq!(harness.port(&input).connection, None);
    assert_eq!(harness.editor.nodes(), &nodes[..]);
}

#[test]
fn test_create_then_remove_restores_array_field() {
    let mut harness = EditorHarness::new();
    let before = harness.editor.nodes().to_vec();
    assert!(harness.editor.create_connection(a_out(), b_rhs()).is_valid());
    harness.editor.remove_connection(b_rhs(), a_out());
    assert_eq!(harness.editor.nodes(), &before[..]);
}

#[test]
fn test_remove_without_match_is_a_no_op() {
    let mut harness = EditorHarness::new();
    let before = harness.editor.nodes().to_vec();
    harness.editor.remove_connection(b_rhs(), a_out());
    assert_eq!(harness.editor.nodes(), &before[..]);
}

// ============================================================================
// Change listener
// ============================================================================

#[test]
fn test_listener_sees_connection_created() {
    let mut harness = EditorHarness::with_listener(CommitMode::Immediate);
    harness.drag_connection(&a_out(), &b_rhs());

    assert_eq!(
        harness.tracker.last(),
        Some(ChangeAction::ConnectionCreated {
            input: b_rhs(),
            output: a_out(),
        })
    );
    assert_eq!(harness.connection_count(), 3);
}

#[test]
fn test_deferred_commit_applies_later() {
    let mut harness = EditorHarness::with_listener(CommitMode::Defer);
    harness.drag_connection(&a_out(), &b_rhs());
    assert_eq!(harness.connection_count(), 2);

    let pending = harness.tracker.take_pending();
    assert_eq!(pending.len(), 1);
    for commit in pending {
        assert!(harness.editor.commit(commit));
    }
    assert_eq!(harness.connection_count(), 3);
}

#[test]
fn test_discarded_commit_leaves_graph_to_host() {
    let mut harness = EditorHarness::with_listener(CommitMode::Discard);
    harness.drag_connection(&a_out(), &b_rhs());
    assert_eq!(harness.connection_count(), 2);
    assert_eq!(harness.tracker.names(), vec!["ConnectionCreated"]);
}

#[test]
fn test_demo_mode_applies_and_notifies() {
    let mut harness = EditorHarness::demo(CommitMode::Defer);
    harness.drag_connection(&a_out(), &b_rhs());

    assert_eq!(harness.connection_count(), 3);
    assert_eq!(*harness.tracker.settled.borrow(), 1);
    // Committing a settled change does nothing
    for commit in harness.tracker.take_pending() {
        assert!(!harness.editor.commit(commit));
    }
    assert_eq!(harness.connection_count(), 3);
}

#[test]
fn test_remove_connection_event_carries_id() {
    let mut harness = EditorHarness::with_listener(CommitMode::Immediate);
    harness.editor.remove_connection(Endpoint::input("c", 0), Endpoint::output("b", 0));

    assert_eq!(
        harness.tracker.last(),
        Some(ChangeAction::ConnectionRemoved {
            id: "c_0_input__b_0_output".into(),
            input: Endpoint::input("c", 0),
            output: Endpoint::output("b", 0),
        })
    );
    assert_eq!(harness.port(&Endpoint::input("c", 0)).connection, None);
    assert!(harness.port(&Endpoint::output("b", 0)).connections().is_empty());
}
