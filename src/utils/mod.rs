pub mod error;
pub mod extract;
pub mod types;
pub mod validate;

pub use error::AppError;
pub use error::handler_404;
pub use error::internal_error;
pub use extract::{AppJson, AppMultipart, AppPath, AppQuery};
pub use validate::ValidatedJson;
