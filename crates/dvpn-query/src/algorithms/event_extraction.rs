//! # Event Extraction
//!
//! The ledger reports the ID of a newly started subscription in the event log
//! of the start-subscription transaction. The log is first flattened the way
//! the ledger's own tooling stringifies it: events of the same type are merged
//! into one (attributes kept in emission order) and the merged events are
//! sorted by type. The ID is then the first attribute of the second flattened
//! event. That layout is a contract with the ledger and is only known here.

use std::collections::BTreeMap;

use crate::domain::{Event, EventAttribute, ResolutionError, SubscriptionId};

/// Position of the flattened event carrying the subscription ID.
pub const SUBSCRIPTION_EVENT_INDEX: usize = 1;

/// Position of the subscription ID attribute within that event.
pub const SUBSCRIPTION_ID_ATTRIBUTE_INDEX: usize = 0;

/// Merge events of the same type and order the result by type.
///
/// Attributes of merged events are concatenated in emission order. A type
/// whose events carry no attributes still yields an (empty) event.
pub fn flatten_events(events: &[Event]) -> Vec<Event> {
    let mut by_type: BTreeMap<&str, Vec<EventAttribute>> = BTreeMap::new();
    for event in events {
        by_type
            .entry(event.kind.as_str())
            .or_default()
            .extend(event.attributes.iter().cloned());
    }

    by_type
        .into_iter()
        .map(|(kind, attributes)| Event::new(kind, attributes))
        .collect()
}

/// Read the subscription ID from a start-subscription event log.
///
/// Only existence is checked; the ID itself is opaque.
pub fn extract_subscription_id(events: &[Event]) -> Result<SubscriptionId, ResolutionError> {
    let flattened = flatten_events(events);

    let event = flattened.get(SUBSCRIPTION_EVENT_INDEX).ok_or_else(|| {
        ResolutionError::MalformedEvent(format!(
            "expected at least {} event types, found {}",
            SUBSCRIPTION_EVENT_INDEX + 1,
            flattened.len()
        ))
    })?;

    let attribute = event
        .attributes
        .get(SUBSCRIPTION_ID_ATTRIBUTE_INDEX)
        .ok_or_else(|| {
            ResolutionError::MalformedEvent(format!(
                "event #{} (`{}`) has no attributes",
                SUBSCRIPTION_EVENT_INDEX, event.kind
            ))
        })?;

    Ok(SubscriptionId::new(attribute.value.clone()))
}
