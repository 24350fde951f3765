//! HubSpot CRM object collections and their normalization into [`IntegrationItem`]s.

pub mod item;
pub mod normalize;

pub use item::*;
pub use normalize::*;

// self
use crate::_prelude::*;

/// Collections queried by an item fetch, in output order.
pub const CRM_ENDPOINTS: [CrmEndpoint; 4] = [
	CrmEndpoint { object: ObjectType::Contact, path: "contacts" },
	CrmEndpoint { object: ObjectType::Company, path: "companies" },
	CrmEndpoint { object: ObjectType::Deal, path: "deals" },
	CrmEndpoint { object: ObjectType::Ticket, path: "tickets" },
];

/// Kind of CRM object an item was normalized from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObjectType {
	/// `crm/v3/objects/contacts`.
	Contact,
	/// `crm/v3/objects/companies`.
	Company,
	/// `crm/v3/objects/deals`.
	Deal,
	/// `crm/v3/objects/tickets`.
	Ticket,
	/// Any other label; names fall back to `"{label} {id}"`.
	Other(String),
}
impl ObjectType {
	/// Label used in item ids, default names, and the serialized `type` field.
	pub fn label(&self) -> &str {
		match self {
			Self::Contact => "Contact",
			Self::Company => "Company",
			Self::Deal => "Deal",
			Self::Ticket => "Ticket",
			Self::Other(label) => label,
		}
	}

	/// Property holding the display name, when the type has one.
	pub const fn name_property(&self) -> Option<&'static str> {
		match self {
			Self::Company => Some("name"),
			Self::Deal => Some("dealname"),
			Self::Ticket => Some("subject"),
			Self::Contact | Self::Other(_) => None,
		}
	}
}
impl From<&str> for ObjectType {
	fn from(label: &str) -> Self {
		match label {
			"Contact" => Self::Contact,
			"Company" => Self::Company,
			"Deal" => Self::Deal,
			"Ticket" => Self::Ticket,
			other => Self::Other(other.to_owned()),
		}
	}
}
impl Display for ObjectType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.label())
	}
}
impl Serialize for ObjectType {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(self.label())
	}
}
impl<'de> Deserialize<'de> for ObjectType {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let label = String::deserialize(deserializer)?;

		Ok(Self::from(label.as_str()))
	}
}

/// One CRM object collection and the path segment that lists it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrmEndpoint {
	/// Object type produced by this collection.
	pub object: ObjectType,
	/// Segment appended to `crm/v3/objects/`.
	pub path: &'static str,
}
impl CrmEndpoint {
	/// Listing URL relative to the API base, with the page-size limit applied.
	pub fn url(&self, api_base: &Url, limit: u32) -> Result<Url, url::ParseError> {
		let mut url = api_base.join(&format!("crm/v3/objects/{}", self.path))?;

		url.query_pairs_mut().append_pair("limit", &limit.to_string());

		Ok(url)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn endpoints_keep_fixed_order() {
		let labels = CRM_ENDPOINTS.iter().map(|endpoint| endpoint.object.label()).collect::<Vec<_>>();

		assert_eq!(labels, ["Contact", "Company", "Deal", "Ticket"]);
	}

	#[test]
	fn endpoint_urls_carry_the_limit() {
		let base = Url::parse("https://api.hubapi.com/").expect("API base fixture should parse.");
		let url = CRM_ENDPOINTS[2].url(&base, 100).expect("Deals URL should build.");

		assert_eq!(url.as_str(), "https://api.hubapi.com/crm/v3/objects/deals?limit=100");
	}

	#[test]
	fn object_type_round_trips_labels() {
		assert_eq!(ObjectType::from("Company"), ObjectType::Company);
		assert_eq!(ObjectType::from("Note"), ObjectType::Other("Note".into()));
		assert_eq!(
			serde_json::to_value(ObjectType::Other("Note".into()))
				.expect("Object type should serialize."),
			"Note"
		);
	}
}
