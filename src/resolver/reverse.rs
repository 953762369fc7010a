// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::net::IpAddr;
use std::str::FromStr;

use hickory_resolver::proto::rr::Name;
use serde::Serialize;
use tracing::debug;

use crate::resolver::{Error, QueryResult, RecordResolver};
use crate::RecordType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReverseReport {
    pub ip: String,
    pub result: QueryResult,
}

/// Looks up the PTR records of `ip`, e.g. `34.216.184.93.in-addr.arpa.` for `93.184.216.34`.
pub async fn reverse_lookup<R: RecordResolver + ?Sized>(resolver: &R, ip: &str) -> ReverseReport {
    let result = match IpAddr::from_str(ip.trim()) {
        Ok(ip_addr) => {
            let name = Name::from(ip_addr).to_ascii();
            debug!("Reverse lookup for {} via '{}'.", ip_addr, name);
            resolver.query(&name, RecordType::PTR).await
        }
        Err(e) => QueryResult::Failed(Error::InvalidName {
            name: ip.to_string(),
            reason: e.to_string(),
        }),
    };

    ReverseReport {
        ip: ip.to_string(),
        result,
    }
}
