use diesel_async::{AsyncPgConnection, pooled_connection::AsyncDieselConnectionManager};

use super::error::AppError;

pub type Pool = bb8::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

pub type JsonResult<T> = std::result::Result<axum::Json<T>, AppError>;
