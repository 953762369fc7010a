// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::RData;
use hickory_resolver::proto::ProtoErrorKind;
use hickory_resolver::{ResolveError, ResolveErrorKind};
use serde::Serialize;
use tracing::debug;

use crate::query::RecordKind;
use crate::resolver::{Error, RecordResolver};
use crate::utils::serialize::ser_to_string;
use crate::RecordType;

/// Outcome of a single query.
///
/// `NxDomain`, `NoAnswer` and `Failed` never overlap: the first means the name does not exist at all, the second that
/// it exists but has no record of the requested type, the last that no conclusive answer has been received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum QueryResult {
    Records(Vec<String>),
    NxDomain,
    NoAnswer,
    Failed(Error),
}

impl QueryResult {
    pub fn records(&self) -> Option<&[String]> {
        match self {
            QueryResult::Records(ref records) => Some(records.as_slice()),
            _ => None,
        }
    }

    pub fn err(&self) -> Option<&Error> {
        match self {
            QueryResult::Failed(ref err) => Some(err),
            _ => None,
        }
    }
}

/// The result of checking one record kind of one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordLookup {
    #[serde(serialize_with = "ser_to_string")]
    pub kind: RecordKind,
    /// The name actually queried, e.g. `_dmarc.example.com` for DMARC.
    pub name: String,
    pub result: QueryResult,
}

/// Issues exactly one query for `kind` of `domain`.
pub async fn lookup_record<R: RecordResolver + ?Sized>(resolver: &R, domain: &str, kind: RecordKind) -> RecordLookup {
    let name = kind.query_name(domain);
    let result = resolver.query(&name, kind.record_type()).await;
    match (result.records(), result.err()) {
        (Some(records), _) => debug!(
            "Lookup returned for '{}', record type {}: {} record(s)",
            &name,
            kind.record_type(),
            records.len()
        ),
        (_, Some(err)) => debug!("Lookup failed for '{}', record type {}: {}", &name, kind.record_type(), err),
        _ => debug!("Lookup returned for '{}', record type {}: {:?}", &name, kind.record_type(), result),
    }

    RecordLookup { kind, name, result }
}

#[doc(hidden)]
pub(crate) trait IntoQueryResult {
    fn into_query_result(self, record_type: RecordType) -> QueryResult;
}

#[doc(hidden)]
impl IntoQueryResult for std::result::Result<hickory_resolver::lookup::Lookup, ResolveError> {
    fn into_query_result(self, record_type: RecordType) -> QueryResult {
        match self {
            Ok(lookup) => {
                // Answers may contain the CNAME chain leading to the requested records
                let records: Vec<String> = lookup
                    .iter()
                    .filter(|rdata| rdata.record_type() == record_type)
                    .map(format_rdata)
                    .collect();
                if records.is_empty() {
                    QueryResult::NoAnswer
                } else {
                    QueryResult::Records(records)
                }
            }
            Err(err) => classify_error(err),
        }
    }
}

fn classify_error(err: ResolveError) -> QueryResult {
    if let ResolveErrorKind::Proto(proto_error) = err.kind() {
        if let ProtoErrorKind::NoRecordsFound { response_code, .. } = proto_error.kind() {
            return match *response_code {
                ResponseCode::NXDomain => QueryResult::NxDomain,
                ResponseCode::NoError => QueryResult::NoAnswer,
                ResponseCode::Refused => QueryResult::Failed(Error::QueryRefused),
                ResponseCode::ServFail => QueryResult::Failed(Error::ServerFailure),
                _ => QueryResult::Failed(Error::ResolveError {
                    reason: err.to_string(),
                }),
            };
        }
    }

    let err = Error::from(err);
    debug!("Lookup error: {}", &err);
    QueryResult::Failed(err)
}

fn format_rdata(rdata: &RData) -> String {
    match rdata {
        RData::TXT(txt) => txt
            .txt_data()
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).to_string())
            .collect::<Vec<_>>()
            .join(""),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use hickory_resolver::proto::rr::rdata::{A, TXT};
    use spectral::prelude::*;

    use super::*;

    #[test]
    fn txt_character_strings_are_concatenated() {
        let txt = RData::TXT(TXT::new(vec!["v=spf1 include:_spf.example.com".to_string(), " -all".to_string()]));

        assert_that(&format_rdata(&txt)).is_equal_to("v=spf1 include:_spf.example.com -all".to_string());
    }

    #[test]
    fn other_records_use_their_text_form() {
        let a = RData::A(A(Ipv4Addr::new(93, 184, 216, 34)));

        assert_that(&format_rdata(&a)).is_equal_to("93.184.216.34".to_string());
    }

    #[test]
    fn query_result_accessors() {
        let records = QueryResult::Records(vec!["93.184.216.34".to_string()]);

        assert_that(&records.records().map(|x| x.len())).is_some().is_equal_to(1);
        assert_that(&QueryResult::NxDomain.records()).is_none();
        assert_that(&QueryResult::Failed(Error::Timeout).err()).is_some().is_equal_to(&Error::Timeout);
    }
}
