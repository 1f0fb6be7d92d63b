//! Bidirectional translation between the platform wire shapes and the
//! normalized `http` request/response values.

mod event;
mod result;

pub use event::ConnectionInfo;
pub(crate) use event::request_from_event;
pub use result::HeaderShape;
pub(crate) use result::result_from_response;
