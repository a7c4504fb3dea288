//! Plain JSON projection of a parsed calendar.
//!
//! The projection flattens each component into an object keyed by
//! property name. A property that appears once maps to its value
//! directly; repeated properties collect into an array. A property with
//! parameters, or a non-standard one, wraps its value in a
//! `{"key", "value", "parameters"}` object so no information is dropped.
//! Sub-components group under their component name.

use serde_json::map::Entry;
use serde_json::{Map, Value as Json, json};

use crate::ical::core::{Component, ICalendar, Parameter, Property, Value};

/// Projects a parsed calendar stream into plain JSON.
#[must_use]
pub fn to_plain(calendar: &ICalendar) -> Json {
    json!({
        "VCALENDAR": calendar
            .calendars
            .iter()
            .map(component_json)
            .collect::<Vec<_>>(),
    })
}

fn component_json(component: &Component) -> Json {
    let mut map = Map::new();

    for property in &component.properties {
        let value = property_json(property);
        match map.entry(property.name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if let Json::Array(items) = existing {
                    items.push(value);
                } else {
                    let first = existing.take();
                    *existing = Json::Array(vec![first, value]);
                }
            }
        }
    }

    for child in &component.children {
        let entry = map
            .entry(child.kind.as_str().to_owned())
            .or_insert_with(|| Json::Array(Vec::new()));
        if let Json::Array(items) = entry {
            items.push(component_json(child));
        }
    }

    Json::Object(map)
}

fn property_json(property: &Property) -> Json {
    let value = value_json(property);
    if property.params.is_empty() && !property.is_non_standard() {
        return value;
    }
    let parameters: Map<String, Json> = property
        .params
        .iter()
        .map(|p| (p.name.clone(), parameter_json(p)))
        .collect();
    json!({
        "key": property.name,
        "value": value,
        "parameters": parameters,
    })
}

fn parameter_json(parameter: &Parameter) -> Json {
    match parameter.values.as_slice() {
        [single] => Json::String(single.clone()),
        values => Json::Array(values.iter().cloned().map(Json::String).collect()),
    }
}

/// Scalar types map to native JSON; everything else keeps its canonical
/// iCalendar text so the projection stays lossless.
fn value_json(property: &Property) -> Json {
    match &property.value {
        Value::Text(s) => Json::String(s.clone()),
        Value::TextList(items) => {
            Json::Array(items.iter().cloned().map(Json::String).collect())
        }
        Value::Integer(i) => json!(i),
        Value::Float(f) => json!(f),
        Value::Boolean(b) => Json::Bool(*b),
        _ => Json::String(property.raw_value.clone()),
    }
}
