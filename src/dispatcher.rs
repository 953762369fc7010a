// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Runs the selected lookups for a list of domains with bounded parallelism.
//!
//! Each domain is handled by its own task which runs the domain's lookups one after another. At most
//! `max_concurrent` domain tasks are in flight at any time. Reports are handed out in input order regardless of
//! completion order.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use futures::FutureExt;
use serde::Serialize;
use tokio::task;
use tracing::{debug, info, warn};

use crate::ordered::OrderedOutput;
use crate::query::LookupRequest;
use crate::resolver::{self, lookup_record, RecordLookup, RecordResolver};
use crate::services::whois::{WhoisLookup, WhoisService};
use crate::utils::serialize::ser_opt_to_string;

#[derive(Debug, Clone)]
pub struct DispatcherOpts {
    pub max_concurrent: usize,
}

impl DispatcherOpts {
    pub fn new(max_concurrent: usize) -> DispatcherOpts {
        DispatcherOpts {
            max_concurrent: max_concurrent.max(1),
        }
    }
}

impl Default for DispatcherOpts {
    fn default() -> Self {
        DispatcherOpts { max_concurrent: 5 }
    }
}

/// Everything looked up for one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainReport {
    pub domain: String,
    /// In the fixed order NS, A, MX, DNSSEC, TXT, DMARC; only selected kinds are present.
    pub records: Vec<RecordLookup>,
    pub whois: Option<WhoisLookup>,
    /// Set if the domain's task failed as a whole, e.g. by panicking.
    #[serde(serialize_with = "ser_opt_to_string")]
    pub error: Option<resolver::Error>,
}

impl DomainReport {
    pub fn failed<T: Into<String>>(domain: T, error: resolver::Error) -> DomainReport {
        DomainReport {
            domain: domain.into(),
            records: Vec::new(),
            whois: None,
            error: Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

pub struct Dispatcher<R, W> {
    resolver: Arc<R>,
    whois: Arc<W>,
    opts: DispatcherOpts,
}

impl<R, W> Clone for Dispatcher<R, W> {
    fn clone(&self) -> Self {
        Dispatcher {
            resolver: self.resolver.clone(),
            whois: self.whois.clone(),
            opts: self.opts.clone(),
        }
    }
}

impl<R, W> Dispatcher<R, W>
where
    R: RecordResolver + 'static,
    W: WhoisService + 'static,
{
    pub fn new(resolver: Arc<R>, whois: Arc<W>, opts: DispatcherOpts) -> Dispatcher<R, W> {
        Dispatcher { resolver, whois, opts }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn opts(&self) -> &DispatcherOpts {
        &self.opts
    }

    /// Runs the lookups of a single domain sequentially on the calling task.
    pub async fn lookup_domain(&self, request: LookupRequest) -> DomainReport {
        lookup_domain(self.resolver.as_ref(), self.whois.as_ref(), request).await
    }

    /// Returns one report per request in input order.
    ///
    /// A single request is processed on the calling task, more requests are processed by the worker pool.
    pub async fn run(&self, requests: Vec<LookupRequest>) -> Vec<DomainReport> {
        if requests.len() == 1 {
            let mut reports = Vec::with_capacity(1);
            for request in requests {
                let domain = request.domain.clone();
                let report = AssertUnwindSafe(self.lookup_domain(request))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| DomainReport::failed(domain, resolver::Error::RuntimePanicError));
                reports.push(report);
            }
            return reports;
        }

        self.run_pooled(requests).await
    }

    /// Like `run`, but always uses the worker pool.
    pub async fn run_pooled(&self, requests: Vec<LookupRequest>) -> Vec<DomainReport> {
        let mut output: OrderedOutput<DomainReport> = OrderedOutput::new(requests.len());

        let mut completed = self.spawn_bounded(requests);
        while let Some((index, report)) = completed.next().await {
            output.insert(index, report);
        }

        output.into_ordered()
    }

    /// Hands each report to `sink` as soon as the reports of all preceding requests have been handed over.
    ///
    /// Returns the number of reports handed over, which always equals the number of requests.
    pub async fn run_streaming<F>(&self, requests: Vec<LookupRequest>, mut sink: F) -> usize
    where
        F: FnMut(DomainReport),
    {
        let mut output: OrderedOutput<DomainReport> = OrderedOutput::new(requests.len());
        let mut handed_over = 0;

        let mut completed = self.spawn_bounded(requests);
        while let Some((index, report)) = completed.next().await {
            output.insert(index, report);
            for report in output.pop_ready() {
                sink(report);
                handed_over += 1;
            }
        }
        if !output.is_complete() {
            warn!("Only {} report(s) have been handed over.", handed_over);
        }
        info!("Finished lookups for {} domain(s).", handed_over);

        handed_over
    }

    /// Yields `(input index, report)` in completion order with at most `max_concurrent` domain tasks in flight.
    fn spawn_bounded(&self, requests: Vec<LookupRequest>) -> impl Stream<Item = (usize, DomainReport)> + '_ {
        info!(
            "Dispatching lookups for {} domain(s) with at most {} concurrent.",
            requests.len(),
            self.opts.max_concurrent
        );

        let tasks = requests.into_iter().enumerate().map(move |(index, request)| {
            let dns = self.resolver.clone();
            let whois = self.whois.clone();
            let domain = request.domain.clone();
            // Spawned lazily: buffer_unordered only pulls the next task when a slot is free
            let handle = task::spawn(async move { lookup_domain(dns.as_ref(), whois.as_ref(), request).await });
            async move {
                let report = match handle.await {
                    Ok(report) => report,
                    Err(err) => {
                        let err = resolver::Error::from(err);
                        debug!("Task for '{}' failed: {}", domain, err);
                        DomainReport::failed(domain, err)
                    }
                };
                (index, report)
            }
        });

        stream::iter(tasks).buffer_unordered(self.opts.max_concurrent.max(1))
    }
}

async fn lookup_domain<R, W>(resolver: &R, whois: &W, request: LookupRequest) -> DomainReport
where
    R: RecordResolver + ?Sized,
    W: WhoisService + ?Sized,
{
    let LookupRequest { domain, selection } = request;
    debug!("Looking up '{}'.", domain);

    let mut records = Vec::new();
    for kind in selection.kinds() {
        records.push(lookup_record(resolver, &domain, kind).await);
    }

    let whois = if selection.whois() {
        Some(WhoisLookup::from(whois.lookup(&domain).await))
    } else {
        None
    };

    DomainReport {
        domain,
        records,
        whois,
        error: None,
    }
}
