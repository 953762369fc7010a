// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Look up DNS records, reverse DNS and WHOIS data for lists of domains.
//!
//! The [`dispatcher::Dispatcher`] runs the selected record lookups of many domains concurrently and hands back one
//! [`dispatcher::DomainReport`] per domain in input order.

pub use error::Error;
pub use hickory_resolver::proto::rr::RecordType;

#[cfg(feature = "app")]
pub mod app;
pub mod dispatcher;
pub mod error;
pub mod ordered;
pub mod query;
pub mod resolver;
pub mod services;
#[doc(hidden)]
pub mod utils;

pub type Result<T> = std::result::Result<T, Error>;
