//! # Signal Broadcast Preparation
//!
//! Resolves the signal thrown by an event definition, snapshots the
//! throwing instance's data as payload, and computes which instances the
//! broadcast must skip.
//!
//! A signal thrown from inside a collaboration skips every instance of that
//! collaboration; otherwise only the throwing instance is skipped.

use serde_json::Value;

use super::errors::BroadcastResolutionError;
use crate::commands::ThrowSignalCommand;
use crate::models::{EventDefinition, InstanceKey, ProcessInstance};

/// Property of a signal event definition naming the signal
pub const SIGNAL_REF_PROPERTY: &str = "signalRef";

/// Read `signalRef` from a throwing event definition
pub fn resolve_signal_ref(
    event_definition: &EventDefinition,
) -> Result<String, BroadcastResolutionError> {
    match event_definition.property(SIGNAL_REF_PROPERTY) {
        Some(Value::String(signal_ref)) if !signal_ref.is_empty() => Ok(signal_ref.clone()),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            Err(BroadcastResolutionError::MissingSignalRef {
                event_definition_id: event_definition.id.clone(),
            })
        }
        Some(_) => Err(BroadcastResolutionError::InvalidSignalRef {
            event_definition_id: event_definition.id.clone(),
        }),
    }
}

/// Instances a signal thrown from `instance` must not reach
///
/// Keys keep collaboration membership order with duplicates removed.
pub fn exclusion_set(instance: &ProcessInstance) -> Vec<InstanceKey> {
    match instance.collaboration() {
        Some(collaboration) => {
            let mut exclude: Vec<InstanceKey> = Vec::with_capacity(collaboration.instance_keys().len());
            for key in collaboration.instance_keys() {
                if !exclude.contains(key) {
                    exclude.push(key.clone());
                }
            }
            exclude
        }
        None => vec![instance.key().clone()],
    }
}

/// Build the broadcast command for a signal thrown by `instance`
///
/// Steps run in order and stop at the first failure: signal resolution,
/// data store read, exclusion computation.
pub fn prepare_signal_broadcast(
    event_definition: &EventDefinition,
    instance: &ProcessInstance,
) -> Result<ThrowSignalCommand, BroadcastResolutionError> {
    let signal_ref = resolve_signal_ref(event_definition)?;
    let data = instance.data_store().get_data().map_err(|source| {
        BroadcastResolutionError::DataStoreUnavailable {
            instance_key: instance.key().to_string(),
            source,
        }
    })?;
    let exclude = exclusion_set(instance);

    Ok(ThrowSignalCommand {
        signal_ref,
        data,
        exclude,
    })
}
