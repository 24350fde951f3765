//! Pure mapping from raw CRM objects to [`IntegrationItem`]s.

// self
use crate::{
	_prelude::*,
	config::DEFAULT_RECORD_URL_TEMPLATE,
	crm::{IntegrationItem, ObjectType},
};

const UNKNOWN_ID: &str = "Unknown";

/// Normalizes `raw` using the default HubSpot record link.
pub fn normalize(raw: &JsonValue, item_type: &ObjectType) -> IntegrationItem {
	normalize_with(raw, item_type, DEFAULT_RECORD_URL_TEMPLATE)
}

/// Normalizes `raw`, rendering the record link from `url_template` (`{id}` is replaced with the
/// remote id).
///
/// Names come from the type's display property; missing, null, or blank values fall back to
/// `"{type} {id}"`. Contacts try `firstname lastname`, then `email`.
pub fn normalize_with(raw: &JsonValue, item_type: &ObjectType, url_template: &str) -> IntegrationItem {
	let remote_id = remote_id(raw);
	let fallback = || format!("{item_type} {remote_id}");
	let name = match item_type {
		ObjectType::Contact => contact_name(raw).unwrap_or_else(fallback),
		other => other
			.name_property()
			.and_then(|key| property(raw, key))
			.map(ToOwned::to_owned)
			.unwrap_or_else(fallback),
	};

	IntegrationItem {
		id: format!("{remote_id}_{item_type}"),
		name,
		item_type: item_type.clone(),
		parent_id: None,
		parent_name: None,
		creation_time: passthrough(raw.get("createdAt")),
		last_modified_time: passthrough(raw.get("updatedAt")),
		url: url_template.replace("{id}", &remote_id),
	}
}

fn contact_name(raw: &JsonValue) -> Option<String> {
	let first = property(raw, "firstname").unwrap_or_default();
	let last = property(raw, "lastname").unwrap_or_default();
	let full = format!("{first} {last}");
	let full = full.trim();

	if !full.is_empty() {
		return Some(full.to_owned());
	}

	property(raw, "email").map(ToOwned::to_owned)
}

fn property<'a>(raw: &'a JsonValue, key: &str) -> Option<&'a str> {
	raw.get("properties")?.get(key)?.as_str().filter(|value| !value.trim().is_empty())
}

fn remote_id(raw: &JsonValue) -> String {
	match raw.get("id") {
		Some(JsonValue::String(id)) if !id.is_empty() => id.clone(),
		Some(JsonValue::Number(id)) => id.to_string(),
		_ => UNKNOWN_ID.into(),
	}
}

fn passthrough(value: Option<&JsonValue>) -> Option<String> {
	match value? {
		JsonValue::Null => None,
		JsonValue::String(raw) => Some(raw.clone()),
		other => Some(other.to_string()),
	}
}
