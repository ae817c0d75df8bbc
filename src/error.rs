use std::convert;
use std::io;

use hyper::http::uri::InvalidUri;
use hyper::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot construct date: {0}")]
    Date(String),

    #[error("invalid url: {0}")]
    Url(#[from] InvalidUri),

    #[error("http error: {0}")]
    Http(#[from] hyper::Error),

    #[error("http status {0}")]
    Status(StatusCode),

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("terminal error: {0}")]
    Terminal(String),

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub fn config<T: AsRef<str>>(msg: T) -> Error {
        Error::Config(msg.as_ref().into())
    }
}

// crossterm 0.19 reports failures through its own ErrorKind
impl convert::From<crossterm::ErrorKind> for Error {
    fn from(err: crossterm::ErrorKind) -> Self {
        Error::Terminal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
