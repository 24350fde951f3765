//! Auth-domain identifiers, scope sets, authorization state, and cached credentials.

pub mod credentials;
pub mod id;
pub mod scope;
pub mod secret;
pub mod state;

pub use credentials::*;
pub use id::*;
pub use scope::*;
pub use secret::*;
pub use state::*;
