//! End-to-end dispatch scenarios against recording executors

mod common;

use common::*;
use serde_json::json;
use workflow_manager::commands::OperationCommand;
use workflow_manager::models::{
    DataMap, Element, ElementKind, EventDefinition, EventDefinitionKind, InstanceKey,
};
use workflow_manager::validation::{Rule, ValidationError};
use workflow_manager::{BroadcastResolutionError, WorkflowError};

fn require_amount(harness: &Harness) {
    harness
        .manager
        .on_data_validation(|validator, _definition, _element| {
            if !validator.data().contains_key("amount") {
                return Err(ValidationError::single(
                    "amount",
                    "required",
                    "The amount field is required.",
                ));
            }
            Ok(())
        });
}

#[test]
fn rejected_payload_dispatches_nothing() {
    let harness = Harness::new();
    require_amount(&harness);
    let instance = InstanceBuilder::new("A").build();
    let token = token_at(&instance, "approve");

    let err = harness
        .manager
        .complete_task(instance.definition(), &instance, &token, DataMap::new())
        .unwrap_err();

    let violations = err.as_validation().expect("validation error");
    assert!(violations.has_field("amount"));
    assert_eq!(harness.dispatched(), 0);
}

#[test]
fn complete_task_executes_one_command_synchronously() {
    let harness = Harness::new();
    let instance = InstanceBuilder::new("A").build();
    let token = token_at(&instance, "approve");
    let data = payload(json!({"amount": 5}));

    harness
        .manager
        .complete_task(instance.definition(), &instance, &token, data.clone())
        .unwrap();

    let commands = harness.executor.commands();
    assert_eq!(commands.len(), 1);
    match &commands[0] {
        OperationCommand::CompleteActivity(command) => {
            assert_eq!(command.data, data);
            assert_eq!(command.token.element_id(), "approve");
            assert_eq!(command.instance.key(), &InstanceKey::new("A"));
        }
        other => panic!("unexpected command {}", other.name()),
    }
    assert_eq!(harness.queue.count(), 0);
}

#[test]
fn run_script_task_enqueues_on_bpmn_lane_only() {
    let harness = Harness::new();
    let instance = InstanceBuilder::new("A").build();
    let token = token_at(&instance, "score");
    let script = instance.definition().require_element("score").unwrap().clone();

    harness.manager.run_script_task(&script, &token).unwrap();

    let queued = harness.queue.commands();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].0, "bpmn");
    match &queued[0].1 {
        OperationCommand::RunScriptTask(command) => {
            assert!(command.data.is_empty());
            assert_eq!(command.definition.id, "invoice_approval");
        }
        other => panic!("unexpected command {}", other.name()),
    }
    assert_eq!(harness.executor.count(), 0);
}

#[test]
fn run_service_task_enqueues_on_bpmn_lane_only() {
    let harness = Harness::new();
    require_amount(&harness);
    let instance = InstanceBuilder::new("A").build();
    let token = token_at(&instance, "notify");
    let service = instance.definition().require_element("notify").unwrap().clone();

    harness.manager.run_service_task(&service, &token).unwrap();

    let queued = harness.queue.commands();
    assert_eq!(queued.len(), 1);
    assert!(matches!(queued[0].1, OperationCommand::RunServiceTask(_)));
    assert_eq!(harness.executor.count(), 0);
}

#[test]
fn signal_from_collaboration_excludes_every_member() {
    let harness = Harness::new();
    let shared = collaboration("order_choreography", &["X", "Y"]);
    let x = InstanceBuilder::new("X")
        .in_collaboration(shared.clone())
        .with_value("order_id", json!(42))
        .build();
    let token = token_at(&x, "approve");

    harness
        .manager
        .throw_signal_event_definition(&EventDefinition::signal("sig", "S1"), &token)
        .unwrap();

    let commands = harness.executor.commands();
    assert_eq!(commands.len(), 1);
    match &commands[0] {
        OperationCommand::ThrowSignal(command) => {
            assert_eq!(command.signal_ref, "S1");
            assert_eq!(
                command.exclude,
                vec![InstanceKey::new("X"), InstanceKey::new("Y")]
            );
            assert_eq!(command.data, payload(json!({"order_id": 42})));
        }
        other => panic!("unexpected command {}", other.name()),
    }
}

#[test]
fn signal_from_standalone_instance_excludes_only_itself() {
    let harness = Harness::new();
    let z = InstanceBuilder::new("Z").build();
    let token = token_at(&z, "approve");

    harness
        .manager
        .throw_signal_event_definition(&EventDefinition::signal("sig", "S2"), &token)
        .unwrap();

    match &harness.executor.commands()[0] {
        OperationCommand::ThrowSignal(command) => {
            assert_eq!(command.exclude, vec![InstanceKey::new("Z")]);
        }
        other => panic!("unexpected command {}", other.name()),
    }
}

/// The explicit call shape bypasses derived exclusion. Whether an empty
/// list is a deliberate rebroadcast path or lets a thrower re-trigger
/// itself is undecided; this pins the current behavior of passing the
/// list through untouched.
#[test]
fn explicit_signal_exclusion_is_passed_through_untouched() {
    let harness = Harness::new();
    let _z = InstanceBuilder::new("Z").build();

    harness
        .manager
        .throw_signal_event("S2", DataMap::new(), vec![])
        .unwrap();

    match &harness.executor.commands()[0] {
        OperationCommand::ThrowSignal(command) => {
            assert_eq!(command.signal_ref, "S2");
            assert!(command.exclude.is_empty());
        }
        other => panic!("unexpected command {}", other.name()),
    }
}

#[test]
fn signal_without_signal_ref_aborts_broadcast() {
    let harness = Harness::new();
    let z = InstanceBuilder::new("Z").build();
    let token = token_at(&z, "approve");
    let definition = EventDefinition::new("sig", EventDefinitionKind::Signal);

    let err = harness
        .manager
        .throw_signal_event_definition(&definition, &token)
        .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::BroadcastResolution(BroadcastResolutionError::MissingSignalRef { .. })
    ));
    assert_eq!(harness.dispatched(), 0);
}

#[test]
fn hooks_receive_target_element_per_operation() {
    let harness = Harness::new();
    let seen = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
    let recorder = seen.clone();
    harness.manager.on_data_validation(move |_, _, element| {
        recorder.lock().push(element.id.clone());
        Ok(())
    });

    let instance = InstanceBuilder::new("A").build();
    let definition = instance.definition().clone();
    let approve = token_at(&instance, "approve");
    let waiting = token_at(&instance, "await_payment");
    let boundary = definition.require_element("approval_timeout").unwrap().clone();
    let start = definition.require_element("start").unwrap().clone();
    let process = definition.require_element("invoice_approval").unwrap().clone();

    harness
        .manager
        .complete_task(&definition, &instance, &approve, DataMap::new())
        .unwrap();
    harness
        .manager
        .complete_catch_event(&definition, &instance, &waiting, DataMap::new())
        .unwrap();
    harness
        .manager
        .trigger_boundary_event(&definition, &instance, &approve, &boundary, DataMap::new())
        .unwrap();
    let started = harness
        .manager
        .trigger_start_event(&definition, &start, DataMap::new())
        .unwrap();
    let called = harness
        .manager
        .call_process(&definition, &process, DataMap::new())
        .unwrap();

    assert_eq!(
        *seen.lock(),
        vec![
            "approve",
            "await_payment",
            "approval_timeout",
            "start",
            "invoice_approval"
        ]
    );
    assert_eq!(
        harness.executor.names(),
        vec![
            "complete_activity",
            "catch_event",
            "boundary_event",
            "start_event",
            "call_process"
        ]
    );
    assert_ne!(started.key(), called.key());
}

#[test]
fn rules_from_several_hooks_are_reported_together() {
    let harness = Harness::new();
    harness.manager.on_data_validation(|validator, _, _| {
        validator
            .rule("amount", Rule::Required)
            .rule("amount", Rule::Min(1.0));
        Ok(())
    });
    harness.manager.on_data_validation(|validator, _, element| {
        if element.kind == ElementKind::UserTask {
            validator.rule("approver", Rule::Required);
        }
        Ok(())
    });

    let instance = InstanceBuilder::new("A").build();
    let token = token_at(&instance, "approve");
    let err = harness
        .manager
        .complete_task(
            instance.definition(),
            &instance,
            &token,
            payload(json!({"amount": 0})),
        )
        .unwrap_err();

    let violations = err.as_validation().unwrap();
    assert_eq!(violations.violations.len(), 2);
    assert!(violations.has_field("amount"));
    assert!(violations.has_field("approver"));
    assert_eq!(harness.dispatched(), 0);
}

#[test]
fn message_throw_needs_no_validation() {
    let harness = Harness::new();
    require_amount(&harness);

    harness
        .manager
        .throw_message_event(
            InstanceKey::new("B"),
            "await_payment",
            "PaymentReceived",
            payload(json!({"paid": true})),
        )
        .unwrap();

    assert_eq!(harness.executor.names(), vec!["throw_message"]);
}

#[test]
fn wrong_element_kind_is_rejected_before_dispatch() {
    let harness = Harness::new();
    let instance = InstanceBuilder::new("A").build();
    let token = token_at(&instance, "approve");
    let not_a_script = Element::new("approve", ElementKind::UserTask);

    let err = harness
        .manager
        .run_script_task(&not_a_script, &token)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Model(_)));
    assert_eq!(harness.dispatched(), 0);
}
