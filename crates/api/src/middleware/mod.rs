pub mod request_id;

pub use request_id::{CorrelationId, REQUEST_ID_HEADER, request_id_middleware};
