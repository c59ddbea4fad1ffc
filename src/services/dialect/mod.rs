// Backend profile registry
pub mod profile;
pub mod relational;
pub mod document;

pub use profile::BackendProfile;
pub use relational::RelationalProfile;
pub use document::DocumentProfile;

use crate::models::{BackendKind, QueryConstruct};

static RELATIONAL: RelationalProfile = RelationalProfile;
static DOCUMENT: DocumentProfile = DocumentProfile;

/// Look up the profile for a backend
pub fn profile_for(backend: BackendKind) -> &'static dyn BackendProfile {
    match backend {
        BackendKind::Relational => &RELATIONAL,
        BackendKind::Document => &DOCUMENT,
    }
}

pub fn constructs_for(backend: BackendKind) -> &'static [QueryConstruct] {
    profile_for(backend).constructs()
}

pub fn list_endpoint_for(backend: BackendKind) -> &'static str {
    profile_for(backend).list_endpoint()
}
