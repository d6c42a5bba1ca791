use std::fmt;
use std::fmt::Formatter;


#[derive(Debug)]
pub enum AppendError {
    NotConfigured(String),
    RemoteRejected(String),
    IoFailure(String),
}

impl fmt::Display for AppendError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            AppendError::NotConfigured(e)  => write!(f, "AppendError::NotConfigured: {}", e),
            AppendError::RemoteRejected(e) => write!(f, "AppendError::RemoteRejected: {}", e),
            AppendError::IoFailure(e)      => write!(f, "AppendError::IoFailure: {}", e),
        }
    }
}
impl From<std::io::Error> for AppendError {
    fn from(e: std::io::Error) -> AppendError {
        AppendError::IoFailure(e.to_string())
    }
}
impl From<csv::Error> for AppendError {
    fn from(e: csv::Error) -> AppendError {
        AppendError::IoFailure(e.to_string())
    }
}
impl From<reqwest::Error> for AppendError {
    fn from(e: reqwest::Error) -> AppendError {
        AppendError::IoFailure(e.to_string())
    }
}
