mod clash_error;
mod context;
mod error;
mod validation_error;

pub use clash_error::{
    IllegalUsageError,
    NotFoundError,
    illegal_usage,
    not_found_error,
};
pub use error::{
    WrapError,
    WrapOptionError,
    WrapResultError,
};
pub use validation_error::{
    ValidatedEntity,
    ValidationError,
};
