pub mod error;
pub mod routes;
pub mod transport;

pub use error::{AppError, ErrorKind};
pub use transport::{HttpTransport, Transport, TransportResponse, UploadForm};
