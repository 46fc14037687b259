// Session API endpoints and error taxonomy

pub mod error;
pub mod session;

pub use error::ApiError;
pub use session::{create_session_router, ApiAppState};
