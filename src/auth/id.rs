//! Strongly typed identifiers for the users and organizations that connect HubSpot.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;
/// Separator used by store keys; identifiers may not contain it.
const KEY_SEPARATOR: char = ':';

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (user, organization).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (user, organization).
		kind: &'static str,
	},
	/// The identifier contains the store key separator.
	#[error("{kind} identifier cannot contain `:`.")]
	ContainsSeparator {
		/// Kind of identifier (user, organization).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed byte count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (user, organization).
		kind: &'static str,
		/// Maximum permitted byte count.
		max: usize,
	},
}

def_id! { UserId, "Identifier of the end user who connects HubSpot.", "User" }
def_id! { OrgId, "Identifier of the organization the connecting user belongs to.", "Org" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.contains(KEY_SEPARATOR) {
		return Err(IdentifierError::ContainsSeparator { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_padding_and_separators() {
		assert!(UserId::new(" user-123").is_err(), "Leading whitespace must be rejected.");
		assert!(UserId::new("user-123 ").is_err(), "Trailing whitespace must be rejected.");
		assert_eq!(
			OrgId::new("org:1").expect_err("Separators must be rejected."),
			IdentifierError::ContainsSeparator { kind: "Org" }
		);

		let user = UserId::new("user-123").expect("User fixture should be considered valid.");

		assert_eq!(user.as_ref(), "user-123");
		assert!(OrgId::new("").is_err());
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let org: OrgId =
			serde_json::from_str("\"org-42\"").expect("Org should deserialize successfully.");

		assert_eq!(org.as_ref(), "org-42");
		assert!(serde_json::from_str::<OrgId>("\"with space\"").is_err());
		assert!(serde_json::from_str::<UserId>("\"a:b\"").is_err());
	}

	#[test]
	fn length_limit_is_inclusive() {
		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		UserId::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(IDENTIFIER_MAX_LEN + 1);

		assert!(UserId::new(&too_long).is_err());
	}

	#[test]
	fn debug_names_the_kind() {
		let user = UserId::new("u1").expect("User fixture should be valid.");

		assert_eq!(format!("{user:?}"), "User(u1)");
	}
}
