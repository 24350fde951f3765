//! Uniform item shape produced from every CRM object.

// self
use crate::{_prelude::*, crm::ObjectType};

/// Normalized representation of a remote CRM object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationItem {
	/// `{remote_id}_{type}`.
	pub id: String,
	/// Display name derived per object type.
	pub name: String,
	/// Object type label.
	#[serde(rename = "type")]
	pub item_type: ObjectType,
	/// Parent item id, when the object is nested.
	pub parent_id: Option<String>,
	/// Parent item name or path, when the object is nested.
	pub parent_name: Option<String>,
	/// Provider `createdAt`, verbatim.
	pub creation_time: Option<String>,
	/// Provider `updatedAt`, verbatim.
	pub last_modified_time: Option<String>,
	/// Link to the record in the HubSpot UI.
	pub url: String,
}
impl IntegrationItem {
	/// Attaches parent information.
	pub fn with_parent(mut self, parent_id: impl Into<String>, parent_name: impl Into<String>) -> Self {
		self.parent_id = Some(parent_id.into());
		self.parent_name = Some(parent_name.into());

		self
	}
}
