mod response;

pub mod error;
pub use error::{ApiError, ApiErrorKind, Detail};

pub mod files;
pub mod project;
pub mod view;

mod payload;
pub use payload::Payload;
