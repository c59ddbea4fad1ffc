pub mod backend;
pub mod envelope;
pub mod generated;
pub mod query;
pub mod schema;

pub use backend::*;
pub use envelope::*;
pub use generated::*;
pub use query::*;
pub use schema::*;
