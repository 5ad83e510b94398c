use std::sync::Arc;
use std::thread;

use orderflow_core::{ErrorKind, StatusId, WorkflowError};
use orderflow_workflow::purchase_order::{
    CANCELLED, CONFIRMED, DELIVERED, INVOICED, SHIPPED, UPLOADED,
};
use orderflow_workflow::{StatusService, TransitionOptions, TransitionType};
use serde_json::json;

fn service() -> StatusService {
    let definition = orderflow_workflow::purchase_order::definition()
        .expect("built-in workflow must load");
    StatusService::from_definition(definition)
}

#[test]
fn skipping_a_step_is_rejected_with_choices() {
    let result = service().validate_transition(UPLOADED, SHIPPED, &json!({}));

    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, ErrorKind::InvalidTransition);
    assert_eq!(
        result.metadata.allowed_transitions,
        Some(vec![StatusId::from(CONFIRMED), StatusId::from(CANCELLED)])
    );
}

#[test]
fn confirmation_requires_po_number() {
    let svc = service();

    let missing = svc.validate_transition(UPLOADED, CONFIRMED, &json!({}));
    assert!(!missing.valid);
    assert_eq!(missing.errors.len(), 1);
    assert_eq!(missing.errors[0].kind, ErrorKind::RequirementsNotMet);
    assert_eq!(missing.errors[0].requirement.as_deref(), Some("poNumber"));

    let present = svc.validate_transition(UPLOADED, CONFIRMED, &json!({ "poNumber": "PO1" }));
    assert!(present.valid);
    assert!(present.errors.is_empty());
    assert_eq!(present.metadata.requirements, Some(vec!["poNumber".to_string()]));
}

#[test]
fn confirming_records_history_for_the_user() {
    let options = TransitionOptions::default()
        .with_data(json!({ "poNumber": "PO1" }))
        .with_user("u1");

    let result = service().transition(UPLOADED, CONFIRMED, options).unwrap();

    assert!(result.success);
    assert_eq!(result.history_entry.to, CONFIRMED);
    assert_eq!(result.history_entry.user_id.as_str(), "u1");
    assert_eq!(result.kind, TransitionType::Forward);
    assert_eq!(result.transition.from, UPLOADED);
    assert_eq!(result.timestamp, result.history_entry.timestamp);
}

#[test]
fn cancelling_a_shipped_order_is_a_reset() {
    let result = service()
        .transition(SHIPPED, CANCELLED, TransitionOptions::default())
        .unwrap();

    assert!(result.success);
    assert_eq!(result.kind, TransitionType::Reset);
}

#[test]
fn full_lifecycle() {
    let svc = service();
    let steps = [
        (UPLOADED, CONFIRMED, json!({ "poNumber": "PO-77" })),
        (CONFIRMED, SHIPPED, json!({ "trackingNumber": "1Z999" })),
        (SHIPPED, INVOICED, json!({ "invoiceNumber": "INV-12" })),
        (INVOICED, DELIVERED, json!({})),
    ];

    let mut history = Vec::new();
    for (from, to, data) in steps {
        let result = svc
            .transition(from, to, TransitionOptions::default().with_data(data))
            .unwrap();
        assert_eq!(result.kind, TransitionType::Forward);
        history.push(result.history_entry);
    }

    let visited: Vec<_> = history.iter().map(|h| h.to.as_str()).collect();
    assert_eq!(visited, vec![CONFIRMED, SHIPPED, INVOICED, DELIVERED]);
    assert!(svc.is_terminal_status(DELIVERED));
    assert!(svc.get_available_transitions(DELIVERED).is_empty());
}

#[test]
fn voiding_an_invoice_moves_backward() {
    let result = service()
        .transition(
            INVOICED,
            SHIPPED,
            TransitionOptions::default()
                .with_reason("invoice voided")
                .with_data(json!({ "trackingNumber": "1Z999" })),
        )
        .unwrap();
    assert_eq!(result.kind, TransitionType::Backward);
    assert_eq!(result.history_entry.reason, "invoice voided");
}

#[test]
fn terminal_statuses_cannot_move() {
    let result = service().validate_transition(DELIVERED, CANCELLED, &json!({}));
    assert_eq!(result.errors[0].kind, ErrorKind::InvalidTransition);
    assert_eq!(result.metadata.allowed_transitions, Some(vec![]));
}

#[test]
fn rejected_transition_surfaces_one_message() {
    let err = service()
        .transition(CONFIRMED, SHIPPED, TransitionOptions::default())
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "transition rejected: Tracking number is required to mark an order as shipped"
    );
    assert_eq!(err.kind(), ErrorKind::RequirementsNotMet);
    assert!(matches!(err, WorkflowError::TransitionRejected { ref errors, .. } if errors.len() == 1));
}

#[test]
fn shared_across_threads() {
    let svc = Arc::new(service());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let svc = Arc::clone(&svc);
            thread::spawn(move || {
                let po = format!("PO-{i}");
                svc.validate_transition(UPLOADED, CONFIRMED, &json!({ "poNumber": po }))
                    .valid
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
