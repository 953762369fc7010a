// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::fmt;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::config::{self as hickory, NameServerConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::TokioResolver;
use tracing::trace;

pub use error::Error;
pub use lookup::{lookup_record, QueryResult, RecordLookup};
pub use reverse::{reverse_lookup, ReverseReport};

use crate::RecordType;
use lookup::IntoQueryResult;

pub mod error;
pub mod lookup;
pub mod reverse;

pub type ResolverResult<T> = std::result::Result<T, Error>;

pub const DEFAULT_PORT: u16 = 53;

/// Process wide resolver settings; read-only once constructed and shared by all lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// If set, the only nameserver used; otherwise the system's nameservers are used.
    pub name_server: Option<SocketAddr>,
    pub timeout: Duration,
    pub attempts: usize,
}

impl ResolverConfig {
    pub fn new(name_server: Option<SocketAddr>, timeout: Duration) -> ResolverConfig {
        ResolverConfig {
            name_server,
            timeout,
            ..Default::default()
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            name_server: None,
            timeout: Duration::from_secs(1),
            attempts: 2,
        }
    }
}

/// Parses a nameserver given as `IP` or `IP:PORT`; port 53 is used if omitted.
pub fn parse_name_server(str: &str) -> crate::Result<SocketAddr> {
    if let Ok(socket_addr) = SocketAddr::from_str(str) {
        return Ok(socket_addr);
    }
    IpAddr::from_str(str)
        .map(|ip| SocketAddr::new(ip, DEFAULT_PORT))
        .map_err(|e| crate::Error::ParserError {
            what: str.to_string(),
            to: "SocketAddr",
            why: e.to_string(),
        })
}

/// A resolver capable of sending typed queries.
///
/// Implementations must be safe to call concurrently from multiple tasks.
pub trait RecordResolver: Send + Sync {
    fn query(&self, name: &str, record_type: RecordType) -> impl Future<Output = QueryResult> + Send;

    /// The nameservers queries are sent to.
    fn name_servers(&self) -> Vec<SocketAddr>;
}

#[derive(Clone)]
pub struct DnsResolver {
    inner: Arc<TokioResolver>,
    name_servers: Arc<Vec<SocketAddr>>,
}

impl fmt::Debug for DnsResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsResolver")
            .field("name_servers", &self.name_servers)
            .finish()
    }
}

impl DnsResolver {
    /// Creates a new resolver.
    ///
    /// Without a custom nameserver, the system configuration is loaded. Unix: Parses `/etc/resolv.conf`.
    pub fn new(config: &ResolverConfig) -> ResolverResult<Self> {
        let (hickory_config, mut opts) = match config.name_server {
            Some(name_server) => (single_name_server_config(name_server), hickory::ResolverOpts::default()),
            None => hickory_resolver::system_conf::read_system_conf().map_err(|e| Error::SystemConfigError {
                reason: e.to_string(),
            })?,
        };
        opts.timeout = config.timeout;
        opts.attempts = config.attempts;

        let mut name_servers: Vec<SocketAddr> = Vec::new();
        for ns in hickory_config.name_servers() {
            if !name_servers.contains(&ns.socket_addr) {
                name_servers.push(ns.socket_addr);
            }
        }

        let inner = TokioResolver::builder_with_config(hickory_config, TokioConnectionProvider::default())
            .with_options(opts)
            .build();

        Ok(DnsResolver {
            inner: Arc::new(inner),
            name_servers: Arc::new(name_servers),
        })
    }
}

fn single_name_server_config(name_server: SocketAddr) -> hickory::ResolverConfig {
    let mut config = hickory::ResolverConfig::new();
    config.add_name_server(NameServerConfig::new(name_server, Protocol::Udp));
    config.add_name_server(NameServerConfig::new(name_server, Protocol::Tcp));

    config
}

impl RecordResolver for DnsResolver {
    async fn query(&self, name: &str, record_type: RecordType) -> QueryResult {
        trace!(
            "Sending Query for '{}', record type {} to {:?}.",
            name,
            record_type,
            self.name_servers
        );
        self.inner.lookup(name, record_type).await.into_query_result(record_type)
    }

    fn name_servers(&self) -> Vec<SocketAddr> {
        self.name_servers.as_ref().clone()
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use spectral::prelude::*;

    use super::*;

    #[test]
    fn parse_name_server_without_port() {
        let socket_addr = parse_name_server("1.1.1.1");

        assert_that(&socket_addr)
            .is_ok()
            .is_equal_to(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)), 53));
    }

    #[test]
    fn parse_name_server_with_port() {
        let socket_addr = parse_name_server("127.0.0.1:5353");

        assert_that(&socket_addr)
            .is_ok()
            .is_equal_to(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5353));
    }

    #[test]
    fn parse_name_server_ipv6() {
        assert_that(&parse_name_server("2606:4700:4700::1111").map(|x| x.port()))
            .is_ok()
            .is_equal_to(53);
        assert_that(&parse_name_server("[::1]:53").map(|x| x.ip()))
            .is_ok()
            .is_equal_to(IpAddr::from_str("::1").unwrap());
    }

    #[test]
    fn parse_name_server_rejects_host_names() {
        assert_that(&parse_name_server("dns.google")).is_err();
    }

    #[test]
    fn default_timeout_is_one_second() {
        let config = ResolverConfig::default();

        assert_that(&config.timeout).is_equal_to(Duration::from_secs(1));
        assert_that(&config.name_server).is_none();
    }

    #[tokio::test]
    async fn custom_name_server_is_the_only_one() {
        crate::utils::tests::logging::init();
        let name_server = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(9, 9, 9, 9)), 53);
        let config = ResolverConfig::new(Some(name_server), Duration::from_secs(1));

        let resolver = DnsResolver::new(&config);

        assert_that(&resolver).is_ok();
        let resolver = resolver.unwrap();
        assert_that(&resolver.name_servers()).is_equal_to(vec![name_server]);
    }
}
