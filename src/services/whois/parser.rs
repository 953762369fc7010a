// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Registration data extracted from a raw WHOIS response. Fields missing in the response stay empty.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct WhoisInfo {
    pub domain_name: Option<String>,
    pub registrar: Option<String>,
    pub creation_date: Option<String>,
    pub expiration_date: Option<String>,
    pub updated_date: Option<String>,
    pub name_servers: Vec<String>,
    pub status: Vec<String>,
    pub organization: Option<String>,
    pub country: Option<String>,
}

impl WhoisInfo {
    pub fn is_empty(&self) -> bool {
        self == &WhoisInfo::default()
    }
}

const DOMAIN_NAME_KEYS: &[&str] = &["domain name", "domain"];
const REGISTRAR_KEYS: &[&str] = &["registrar", "registrar name", "sponsoring registrar"];
const CREATION_KEYS: &[&str] = &[
    "creation date",
    "created",
    "created on",
    "registration date",
    "registered on",
    "registration time",
];
const EXPIRATION_KEYS: &[&str] = &[
    "registry expiry date",
    "registrar registration expiration date",
    "expiration date",
    "expires",
    "expires on",
    "expiry date",
    "paid-till",
];
const UPDATED_KEYS: &[&str] = &["updated date", "last updated", "last modified", "changed", "last-update"];
const NAME_SERVER_KEYS: &[&str] = &["name server", "name servers", "nserver", "nameserver"];
const STATUS_KEYS: &[&str] = &["domain status", "status"];
const ORGANIZATION_KEYS: &[&str] = &["registrant organization", "org", "organization", "org-name"];
const COUNTRY_KEYS: &[&str] = &["registrant country", "country"];

/// Extracts the well-known fields from a raw WHOIS response.
///
/// The first occurrence of a single-valued field wins. Name servers are lower-cased, name servers and statuses are
/// de-duplicated while keeping their order. Dates are normalized to `DATE_FORMAT` if they can be parsed.
pub fn parse_whois(raw: &str) -> WhoisInfo {
    let mut info = WhoisInfo::default();
    // Nominet style responses put values into an indented block below a `Key:` line without value
    let mut block: Option<(String, usize)> = None;

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') || trimmed.starts_with('#') || trimmed.starts_with(">>>") {
            block = None;
            continue;
        }
        let indent = line.len() - line.trim_start().len();

        if let Some((block_key, block_indent)) = block.as_ref() {
            if indent > *block_indent {
                match split_line(trimmed) {
                    Some((key, value)) if key == "name" && block_key == "registrar" => {
                        set_once(&mut info.registrar, value)
                    }
                    Some((key, value)) => apply_field(&mut info, &key, value),
                    None => apply_field(&mut info, block_key, strip_registrar_tag(trimmed)),
                }
                continue;
            }
        }
        block = None;

        let (key, value) = match split_line(trimmed) {
            Some(kv) => kv,
            None => continue,
        };
        if value.is_empty() {
            block = Some((key, indent));
        } else {
            apply_field(&mut info, &key, value);
        }
    }

    info
}

fn apply_field(info: &mut WhoisInfo, key: &str, value: &str) {
    if REGISTRAR_KEYS.contains(&key) {
        set_once(&mut info.registrar, value);
    } else if DOMAIN_NAME_KEYS.contains(&key) {
        set_once(&mut info.domain_name, value);
    } else if CREATION_KEYS.contains(&key) {
        set_once(&mut info.creation_date, &normalize_date(value));
    } else if EXPIRATION_KEYS.contains(&key) {
        set_once(&mut info.expiration_date, &normalize_date(value));
    } else if UPDATED_KEYS.contains(&key) {
        set_once(&mut info.updated_date, &normalize_date(value));
    } else if NAME_SERVER_KEYS.contains(&key) {
        // Some registries append glue addresses: `ns1.example.com 192.0.2.1`
        if let Some(ns) = value.split_whitespace().next() {
            push_unique(&mut info.name_servers, ns.trim_end_matches('.').to_lowercase());
        }
    } else if STATUS_KEYS.contains(&key) {
        // ICANN status lines carry an explanatory URL: `clientTransferProhibited https://icann.org/epp#...`
        let status = match value.find(" http") {
            Some(pos) => &value[..pos],
            None => value,
        };
        push_unique(&mut info.status, status.trim().to_string());
    } else if ORGANIZATION_KEYS.contains(&key) {
        set_once(&mut info.organization, value);
    } else if COUNTRY_KEYS.contains(&key) {
        set_once(&mut info.country, value);
    }
}

/// Nominet appends the registrar's tag to its name: `Example Registrar Ltd [Tag = EXAMPLE]`.
fn strip_registrar_tag(value: &str) -> &str {
    match value.find(" [Tag =") {
        Some(pos) => value[..pos].trim_end(),
        None => value,
    }
}

/// Splits `Key: value` into the lower-cased key and the trimmed value; colons in the value are preserved.
fn split_line(line: &str) -> Option<(String, &str)> {
    let pos = line.find(':')?;
    let key = line[..pos].trim().to_lowercase();
    if key.is_empty() {
        return None;
    }

    Some((key, line[pos + 1..].trim()))
}

fn set_once(field: &mut Option<String>, value: &str) {
    if field.is_none() && !value.is_empty() {
        *field = Some(value.to_string());
    }
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !value.is_empty() && !values.contains(&value) {
        values.push(value);
    }
}

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y.%m.%d %H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%d-%b-%Y", "%d.%m.%Y", "%Y%m%d"];

/// Normalizes a WHOIS date to `DATE_FORMAT`; unparsable values are returned unchanged.
pub fn normalize_date(value: &str) -> String {
    let value = value.trim();

    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return date_time.naive_utc().format(DATE_FORMAT).to_string();
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(value, format) {
            return date_time.format(DATE_FORMAT).to_string();
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            if let Some(date_time) = date.and_hms_opt(0, 0, 0) {
                return date_time.format(DATE_FORMAT).to_string();
            }
        }
    }

    value.to_string()
}
