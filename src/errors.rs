use std::fmt;
use std::fmt::Formatter;
use crate::initialization::ConfigError;
use crate::registry::RegistryError;


#[derive(Debug)]
pub struct UnrecoverableError(pub String);

impl fmt::Display for UnrecoverableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "UnrecoverableError: {}", self.0)
    }
}
impl From<ConfigError> for UnrecoverableError {
    fn from(e: ConfigError) -> Self { UnrecoverableError(e.to_string()) }
}
impl From<RegistryError> for UnrecoverableError {
    fn from(e: RegistryError) -> Self { UnrecoverableError(e.to_string()) }
}
impl From<std::io::Error> for UnrecoverableError {
    fn from(e: std::io::Error) -> Self { UnrecoverableError(e.to_string()) }
}
