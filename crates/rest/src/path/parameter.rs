use std::fmt;

use crate::error::ApiException;
use crate::response::Response;

/// A path variable captured during routing, named after the variable in the
/// URI template that matched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParameter {
    name: String,
    value: String,
}

impl PathParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> PathParameter {
        PathParameter { name: name.into(), value: value.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self) -> &str {
        &self.value
    }

    /// Reads the captured value as an integer. Values that do not parse are
    /// rejected with a 400 response.
    pub fn as_int(&self) -> Result<i64, ApiException> {
        match self.value.parse::<i64>() {
            Ok(value) => Ok(value),
            Err(_) => Err(ApiException::new(Response::with_body(
                http::StatusCode::BAD_REQUEST,
                format!(
                    "Illegal input value for path parameter {}: Unable to read value '{}' as integer.",
                    self.name, self.value
                ),
            ))),
        }
    }
}

impl fmt::Display for PathParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}
