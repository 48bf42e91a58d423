use std::error::Error;
use std::fmt;

pub mod client;
pub mod database;
pub mod memory;

#[derive(Debug)]
pub enum RequestError {
    NotFound,
    InvalidInput(String),
    Other(Box<dyn Error + Send + Sync>),
}

impl RequestError {
    pub fn other<T: Error + Send + Sync + 'static>(why: T) -> Self {
        Self::Other(Box::new(why))
    }

    pub fn invalid_input<S: Into<String>>(why: S) -> Self {
        Self::InvalidInput(why.into())
    }
}

impl Error for RequestError {}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RequestError::NotFound => write!(f, "Not found."),
            RequestError::InvalidInput(why) => write!(f, "Invalid input: {}", why),
            RequestError::Other(why) => write!(f, "{}", why),
        }
    }
}

impl From<database::DatabaseError> for RequestError {
    fn from(value: database::DatabaseError) -> Self {
        match value {
            database::DatabaseError::NotFound => Self::NotFound,
            overtaken @ database::DatabaseError::Overtaken(_) => {
                Self::InvalidInput(overtaken.to_string())
            }
            database::DatabaseError::Other(why) => Self::Other(why),
        }
    }
}

impl From<model::marker::ValidationError> for RequestError {
    fn from(value: model::marker::ValidationError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}

pub type RequestResult<O> = Result<O, RequestError>;

pub fn not_found_to_none<O>(result: RequestResult<O>) -> RequestResult<Option<O>> {
    if let Err(RequestError::NotFound) = result {
        Ok(None)
    } else {
        result.map(Some)
    }
}
