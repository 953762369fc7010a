// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! WHOIS lookups for domain registration data.
//!
//! The WHOIS protocol itself is handled by `whois-rust`; this module picks the server from an embedded list,
//! bounds the blocking lookup by a timeout and extracts the fields shown to the user.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task;
use tracing::{debug, instrument, warn};
use whois_rust::{WhoIs, WhoIsLookupOptions};

pub use parser::{parse_whois, WhoisInfo};

use crate::services::{Error, Result};

mod parser;

/// node-whois style mapping of TLDs to WHOIS servers
const SERVERS_JSON: &str = include_str!("servers.json");

/// Something that answers WHOIS queries for domain names.
pub trait WhoisService: Send + Sync {
    fn lookup(&self, domain: &str) -> impl Future<Output = Result<WhoisInfo>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WhoisLookup {
    Info(WhoisInfo),
    Failed(Error),
}

impl WhoisLookup {
    pub fn info(&self) -> Option<&WhoisInfo> {
        match self {
            WhoisLookup::Info(ref info) => Some(info),
            _ => None,
        }
    }

    pub fn err(&self) -> Option<&Error> {
        match self {
            WhoisLookup::Failed(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<Result<WhoisInfo>> for WhoisLookup {
    fn from(res: Result<WhoisInfo>) -> Self {
        match res {
            Ok(info) => WhoisLookup::Info(info),
            Err(err) => WhoisLookup::Failed(err),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WhoisClientOpts {
    timeout: Duration,
    /// Number of referrals to follow, e.g. from the registry to the registrar's WHOIS server
    follow: u16,
}

impl WhoisClientOpts {
    pub fn new(timeout: Duration, follow: u16) -> WhoisClientOpts {
        WhoisClientOpts { timeout, follow }
    }
}

impl Default for WhoisClientOpts {
    fn default() -> Self {
        WhoisClientOpts {
            timeout: Duration::from_secs(10),
            follow: 1,
        }
    }
}

#[derive(Clone)]
pub struct WhoisClient {
    servers: Arc<WhoIs>,
    opts: Arc<WhoisClientOpts>,
}

impl std::fmt::Debug for WhoisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhoisClient").field("opts", &self.opts).finish()
    }
}

impl WhoisClient {
    pub fn new(opts: WhoisClientOpts) -> Result<WhoisClient> {
        let servers = WhoIs::from_string(SERVERS_JSON).map_err(|e| Error::ServerListError { reason: e.to_string() })?;

        Ok(WhoisClient {
            servers: Arc::new(servers),
            opts: Arc::new(opts),
        })
    }

    #[instrument(name = "whois lookup", level = "debug", skip(self))]
    async fn query(&self, domain: &str) -> Result<String> {
        let servers = self.servers.clone();
        let timeout = self.opts.timeout;
        let follow = self.opts.follow;
        let target = domain.to_string();

        let lookup = task::spawn_blocking(move || {
            let mut options = WhoIsLookupOptions::from_string(&target).map_err(|e| Error::InvalidQuery {
                query: target.clone(),
                reason: e.to_string(),
            })?;
            options.timeout = Some(timeout);
            options.follow = follow;

            servers.lookup(options).map_err(|e| Error::LookupFailed {
                domain: target,
                reason: e.to_string(),
            })
        });

        // The blocking lookup keeps running on its thread after a timeout; its result is discarded.
        match tokio::time::timeout(timeout, lookup).await {
            Ok(joined) => joined?,
            Err(_) => Err(Error::Timeout {
                domain: domain.to_string(),
            }),
        }
    }
}

impl WhoisService for WhoisClient {
    async fn lookup(&self, domain: &str) -> Result<WhoisInfo> {
        let domain = registered_domain(domain);
        debug!("Sending WHOIS query for '{}'.", domain);
        match self.query(&domain).await {
            Ok(raw) => Ok(parse_whois(&raw)),
            Err(err) => {
                warn!("WHOIS lookup for '{}' failed: {}", domain, err);
                Err(err)
            }
        }
    }
}

/// Public suffixes with two labels; a registered domain below them has three labels.
const TWO_LABEL_SUFFIXES: &[&str] = &[
    "ac.jp", "ac.uk", "co.at", "co.hu", "co.id", "co.il", "co.in", "co.it", "co.jp", "co.ke", "co.kr", "co.nz",
    "co.th", "co.tz", "co.uk", "co.za", "com.ar", "com.au", "com.br", "com.cn", "com.de", "com.es", "com.hk",
    "com.mx", "com.my", "com.ng", "com.ph", "com.pl", "com.pt", "com.ro", "com.sg", "com.tr", "com.tw", "com.ua",
    "com.vn", "edu.au", "edu.cn", "gov.au", "gov.br", "gov.in", "gov.uk", "me.uk", "ne.jp", "ne.kr", "net.au",
    "net.br", "net.cn", "net.in", "net.nz", "net.uk", "or.at", "or.jp", "or.kr", "org.au", "org.br", "org.cn",
    "org.in", "org.nz", "org.uk", "org.za",
];

/// Reduces a host name to the domain registered with the registry, e.g. `mail.example.co.uk` to `example.co.uk`.
pub fn registered_domain(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('.').to_lowercase();
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() <= 2 {
        return domain;
    }

    let suffix = labels[labels.len() - 2..].join(".");
    let keep = if TWO_LABEL_SUFFIXES.contains(&suffix.as_str()) { 3 } else { 2 };

    labels[labels.len() - keep..].join(".")
}

#[cfg(test)]
mod tests {
    use spectral::prelude::*;

    use super::*;

    #[test]
    fn embedded_server_list_loads() {
        let client = WhoisClient::new(WhoisClientOpts::default());

        assert_that(&client.is_ok()).is_true();
    }

    #[test]
    fn registered_domain_of_host_names() {
        assert_that(&registered_domain("www.Example.com.")).is_equal_to("example.com".to_string());
        assert_that(&registered_domain("mail.example.com")).is_equal_to("example.com".to_string());
        assert_that(&registered_domain("a.b.example.org")).is_equal_to("example.org".to_string());
        assert_that(&registered_domain("example.com")).is_equal_to("example.com".to_string());
        assert_that(&registered_domain("www.com")).is_equal_to("www.com".to_string());
    }

    #[test]
    fn registered_domain_below_two_label_suffix() {
        assert_that(&registered_domain("www.example.co.uk")).is_equal_to("example.co.uk".to_string());
        assert_that(&registered_domain("shop.example.com.au")).is_equal_to("example.com.au".to_string());
        assert_that(&registered_domain("example.co.uk")).is_equal_to("example.co.uk".to_string());
    }

    #[test]
    fn unlisted_tld_falls_back_to_iana() {
        let servers: serde_json::Value = serde_json::from_str(SERVERS_JSON).unwrap();

        assert_that(&servers.get("example")).is_none();
        assert_that(&servers[""]).is_equal_to(serde_json::Value::from("whois.iana.org"));
        assert_that(&servers["shop"]).is_equal_to(serde_json::Value::from("whois.nic.shop"));
    }

    #[test]
    fn whois_lookup_from_result() {
        let failed: WhoisLookup = Err(Error::Timeout {
            domain: "example.com".to_string(),
        })
        .into();
        let info: WhoisLookup = Ok(WhoisInfo::default()).into();

        assert_that(&failed.err()).is_some();
        assert_that(&info.info()).is_some();
    }
}
