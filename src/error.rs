use std::env;
use std::fmt;
use std::io;

use crate::config::ConfigError;

/// Everything that can abort a run. All failures are fatal; nothing is
/// printed to stdout once the pipeline has failed.
#[derive(Debug)]
pub enum Error {
    Cli(getopts::Fail),
    Home(env::VarError),
    Config(ConfigError),
    Credentials(keyring::Error),
    Http(reqwest::Error),
    Browser(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Cli(err) => write!(f, "{}", err),
            Error::Home(err) => write!(f, "HOME is not set: {}", err),
            Error::Config(err) => write!(f, "configuration: {}", err),
            Error::Credentials(err) => write!(f, "credential lookup: {}", err),
            Error::Http(err) => write!(f, "gitlab request: {}", err),
            Error::Browser(err) => write!(f, "couldn't launch browser: {}", err),
        }
    }
}

impl From<getopts::Fail> for Error {
    fn from(error: getopts::Fail) -> Self {
        Error::Cli(error)
    }
}

impl From<env::VarError> for Error {
    fn from(error: env::VarError) -> Self {
        Error::Home(error)
    }
}

impl From<ConfigError> for Error {
    fn from(error: ConfigError) -> Self {
        Error::Config(error)
    }
}

impl From<keyring::Error> for Error {
    fn from(error: keyring::Error) -> Self {
        Error::Credentials(error)
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Http(error)
    }
}
