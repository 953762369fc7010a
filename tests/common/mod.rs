// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use domaintool::resolver::{self, QueryResult, RecordResolver, ResolverConfig};
use domaintool::services;
use domaintool::services::whois::{WhoisInfo, WhoisService};
use domaintool::RecordType;

/// One query as seen by `MockResolver`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub name: String,
    pub record_type: RecordType,
    pub name_servers: Vec<SocketAddr>,
}

/// Answers from a fixed table; names ending in `.invalid` do not exist, everything else has no records.
///
/// Clones share the call log, so a clone handed to the code under test can be inspected afterwards.
#[derive(Clone)]
pub struct MockResolver {
    name_servers: Vec<SocketAddr>,
    answers: HashMap<(String, RecordType), QueryResult>,
    delays: HashMap<String, Duration>,
    panics: HashSet<String>,
    configs: Arc<Mutex<Vec<ResolverConfig>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockResolver {
    pub fn new() -> MockResolver {
        MockResolver {
            name_servers: vec![SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 53)), 53)],
            answers: HashMap::new(),
            delays: HashMap::new(),
            panics: HashSet::new(),
            configs: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A clone that uses the name server of `config`, like `DnsResolver::new` does.
    pub fn from_config(&self, config: &ResolverConfig) -> resolver::ResolverResult<MockResolver> {
        self.configs.lock().unwrap().push(config.clone());
        let mut resolver = self.clone();
        if let Some(name_server) = config.name_server {
            resolver.name_servers = vec![name_server];
        }

        Ok(resolver)
    }

    pub fn with_records(mut self, name: &str, record_type: RecordType, records: &[&str]) -> Self {
        let records = records.iter().map(ToString::to_string).collect();
        self.answers
            .insert((name.to_string(), record_type), QueryResult::Records(records));
        self
    }

    pub fn with_result(mut self, name: &str, record_type: RecordType, result: QueryResult) -> Self {
        self.answers.insert((name.to_string(), record_type), result);
        self
    }

    /// Every query for `name` takes `delay` to complete.
    pub fn with_delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    /// Every query for `name` panics.
    pub fn with_panic(mut self, name: &str) -> Self {
        self.panics.insert(name.to_string());
        self
    }

    /// Configurations passed to `from_config`.
    pub fn configs(&self) -> Vec<ResolverConfig> {
        self.configs.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl RecordResolver for MockResolver {
    async fn query(&self, name: &str, record_type: RecordType) -> QueryResult {
        self.calls.lock().unwrap().push(Call {
            name: name.to_string(),
            record_type,
            name_servers: self.name_servers.clone(),
        });
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(name) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panics.contains(name) {
            panic!("mock resolver panics for '{}'", name);
        }

        match self.answers.get(&(name.to_string(), record_type)) {
            Some(result) => result.clone(),
            None if name.ends_with(".invalid") => QueryResult::NxDomain,
            None => QueryResult::NoAnswer,
        }
    }

    fn name_servers(&self) -> Vec<SocketAddr> {
        self.name_servers.clone()
    }
}

#[derive(Default)]
pub struct MockWhois {
    lookups: Mutex<Vec<String>>,
}

impl MockWhois {
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl WhoisService for MockWhois {
    async fn lookup(&self, domain: &str) -> services::Result<WhoisInfo> {
        self.lookups.lock().unwrap().push(domain.to_string());
        if domain.ends_with(".invalid") {
            return Err(services::Error::LookupFailed {
                domain: domain.to_string(),
                reason: "no whois server is known for this kind of object".to_string(),
            });
        }

        Ok(WhoisInfo {
            domain_name: Some(domain.to_uppercase()),
            registrar: Some("Example Registrar".to_string()),
            ..Default::default()
        })
    }
}
