// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::{Error, RecordType, Result};

/// The record lookups a domain can be checked for.
///
/// The declaration order is the order in which lookups run and are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RecordKind {
    Ns,
    A,
    Mx,
    Dnssec,
    Txt,
    Dmarc,
}

struct Messages {
    caption: &'static str,
    nxdomain: &'static str,
    no_answer: &'static str,
    failure: &'static str,
}

static NS_MESSAGES: Messages = Messages {
    caption: "DNS Servers for",
    nxdomain: "No DNS Servers found for (NXDOMAIN)",
    no_answer: "No DNS Servers found for (NoAnswer)",
    failure: "Error while fetching DNS Servers for",
};

static A_MESSAGES: Messages = Messages {
    caption: "A Records for",
    nxdomain: "No A Records found for (NXDOMAIN)",
    no_answer: "No A Records found for (NoAnswer)",
    failure: "Error while fetching A records for",
};

static MX_MESSAGES: Messages = Messages {
    caption: "MX Records for",
    nxdomain: "MX Records not found for (NXDOMAIN)",
    no_answer: "No MX Records found for (NoAnswer)",
    failure: "Error while fetching Mail Servers for",
};

static DNSSEC_MESSAGES: Messages = Messages {
    caption: "DNSSEC is enabled for",
    nxdomain: "DNSSEC is not enabled for (NXDOMAIN)",
    no_answer: "No DS Records found for (NoAnswer)",
    failure: "Error while checking DNSSEC for",
};

static TXT_MESSAGES: Messages = Messages {
    caption: "TXT Records for",
    nxdomain: "TXT Records not found for (NXDOMAIN)",
    no_answer: "No TXT Records found for (NoAnswer)",
    failure: "Error while fetching TXT Records for",
};

static DMARC_MESSAGES: Messages = Messages {
    caption: "DMARC Policy for",
    nxdomain: "DMARC Policy not found for (NXDOMAIN)",
    no_answer: "No DMARC Policy found for (NoAnswer)",
    failure: "Error while fetching DMARC Policy for",
};

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        RecordKind::Ns,
        RecordKind::A,
        RecordKind::Mx,
        RecordKind::Dnssec,
        RecordKind::Txt,
        RecordKind::Dmarc,
    ];

    pub fn record_type(&self) -> RecordType {
        match self {
            RecordKind::Ns => RecordType::NS,
            RecordKind::A => RecordType::A,
            RecordKind::Mx => RecordType::MX,
            RecordKind::Dnssec => RecordType::DS,
            RecordKind::Txt | RecordKind::Dmarc => RecordType::TXT,
        }
    }

    /// The name that is actually sent to the nameserver when checking `domain`.
    pub fn query_name(&self, domain: &str) -> String {
        match self {
            RecordKind::Dmarc => format!("_dmarc.{}", domain),
            _ => domain.to_string(),
        }
    }

    pub fn caption(&self, domain: &str) -> String {
        format!("{} {}", self.messages().caption, domain)
    }

    pub fn nxdomain_message(&self, domain: &str) -> String {
        format!("{} {}", self.messages().nxdomain, domain)
    }

    pub fn no_answer_message(&self, domain: &str) -> String {
        format!("{} {}", self.messages().no_answer, domain)
    }

    pub fn failure_message(&self, domain: &str) -> String {
        format!("{} {}", self.messages().failure, domain)
    }

    fn messages(&self) -> &'static Messages {
        match self {
            RecordKind::Ns => &NS_MESSAGES,
            RecordKind::A => &A_MESSAGES,
            RecordKind::Mx => &MX_MESSAGES,
            RecordKind::Dnssec => &DNSSEC_MESSAGES,
            RecordKind::Txt => &TXT_MESSAGES,
            RecordKind::Dmarc => &DMARC_MESSAGES,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let str = match self {
            RecordKind::Ns => "NS",
            RecordKind::A => "A",
            RecordKind::Mx => "MX",
            RecordKind::Dnssec => "DNSSEC",
            RecordKind::Txt => "TXT",
            RecordKind::Dmarc => "DMARC",
        };
        f.write_str(str)
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(str: &str) -> std::result::Result<Self, Self::Err> {
        match str.to_lowercase().as_str() {
            "ns" | "dns" => Ok(RecordKind::Ns),
            "a" => Ok(RecordKind::A),
            "mx" => Ok(RecordKind::Mx),
            "dnssec" | "ds" => Ok(RecordKind::Dnssec),
            "txt" => Ok(RecordKind::Txt),
            "dmarc" => Ok(RecordKind::Dmarc),
            _ => Err(Error::ParserError {
                what: str.to_string(),
                to: "RecordKind",
                why: "unknown record kind".to_string(),
            }),
        }
    }
}

/// Which checks to run for every domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    kinds: BTreeSet<RecordKind>,
    whois: bool,
}

impl Selection {
    pub fn new<I: IntoIterator<Item = RecordKind>>(kinds: I, whois: bool) -> Selection {
        Selection {
            kinds: kinds.into_iter().collect(),
            whois,
        }
    }

    /// Every record kind plus WHOIS.
    pub fn all() -> Selection {
        Selection::new(RecordKind::ALL, true)
    }

    pub fn with(mut self, kind: RecordKind) -> Selection {
        self.kinds.insert(kind);
        self
    }

    pub fn with_whois(self, whois: bool) -> Selection {
        Selection { whois, ..self }
    }

    /// Selected record kinds in lookup order.
    pub fn kinds(&self) -> impl Iterator<Item = RecordKind> + '_ {
        self.kinds.iter().copied()
    }

    pub fn contains(&self, kind: RecordKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn whois(&self) -> bool {
        self.whois
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty() && !self.whois
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupRequest {
    pub domain: String,
    pub selection: Selection,
}

impl LookupRequest {
    pub fn new<T: Into<String>>(domain: T, selection: Selection) -> LookupRequest {
        LookupRequest {
            domain: domain.into(),
            selection,
        }
    }

    /// Creates one request per domain, all sharing the same selection.
    pub fn for_domains<I, T>(domains: I, selection: &Selection) -> Vec<LookupRequest>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        domains
            .into_iter()
            .map(|domain| LookupRequest::new(domain, selection.clone()))
            .collect()
    }
}

/// Reads one domain per line; surrounding whitespace is trimmed and blank lines are skipped.
pub async fn read_domains<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::InputFileError {
            path: path.to_path_buf(),
            source,
        })?;
    let domains = parse_domains(&content);
    debug!("Read {} domains from '{}'.", domains.len(), path.display());

    Ok(domains)
}

pub fn parse_domains(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}
