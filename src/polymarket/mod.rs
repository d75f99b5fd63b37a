pub mod data_client;
pub mod transport;

pub use data_client::{ClientError, DataClient};
pub use transport::{HttpTransport, Transport, TransportError};
