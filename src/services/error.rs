// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum Error {
    #[error("failed to load WHOIS server list: {reason}")]
    ServerListError { reason: String },
    #[error("invalid WHOIS query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },
    #[error("WHOIS lookup for {domain} failed: {reason}")]
    LookupFailed { domain: String, reason: String },
    #[error("WHOIS lookup for {domain} timed out")]
    Timeout { domain: String },
    #[error("execution has been cancelled")]
    CancelledError,
    #[error("execution panicked")]
    RuntimePanicError,
}

impl From<JoinError> for Error {
    fn from(error: JoinError) -> Self {
        if error.is_cancelled() {
            return Error::CancelledError;
        }
        Error::RuntimePanicError
    }
}
