// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! One line per record in the form `<domain> - <TYPE> - <value>`, convenient for grep and friends.

use super::*;
use crate::dispatcher::DomainReport;
use crate::resolver::{QueryResult, ReverseReport};
use crate::services::whois::WhoisLookup;

#[derive(Debug, Default)]
pub struct LinesFormat {}

pub trait LinesFormatter {
    fn output<W: Write>(&self, writer: &mut W) -> Result<()>;
}

impl<T: LinesFormatter> OutputFormat<T> for LinesFormat {
    fn output<W: Write>(&self, writer: &mut W, data: &T) -> Result<()> {
        data.output(writer)
    }
}

fn output_result<W: Write>(writer: &mut W, name: &str, record_type: &str, result: &QueryResult) -> Result<()> {
    match result {
        QueryResult::Records(records) => {
            for r in records {
                writeln!(writer, "{} - {} - {}", name, record_type, r)?;
            }
        }
        QueryResult::NxDomain => writeln!(writer, "{} - {} - Domain does not exist (NXDOMAIN)", name, record_type)?,
        QueryResult::NoAnswer => writeln!(writer, "{} Does not have any {} Record", name, record_type)?,
        QueryResult::Failed(err) => writeln!(writer, "{} - {} - Error: {}", name, record_type, err)?,
    }

    Ok(())
}

impl LinesFormatter for DomainReport {
    fn output<W: Write>(&self, writer: &mut W) -> Result<()> {
        if let Some(ref err) = self.error {
            writeln!(writer, "{} - Error: {}", self.domain, err)?;
            return Ok(());
        }

        for record in &self.records {
            output_result(writer, &self.domain, &record.kind.to_string(), &record.result)?;
        }

        match self.whois {
            Some(WhoisLookup::Info(ref info)) => {
                let multi_valued = info
                    .name_servers
                    .iter()
                    .map(|ns| ("Name Server", ns.as_str()))
                    .chain(info.status.iter().map(|status| ("Status", status.as_str())));
                let fields = whois_fields(info)
                    .into_iter()
                    .chain(multi_valued)
                    .chain(whois_trailing_fields(info));
                for (label, value) in fields {
                    writeln!(writer, "{} - WHOIS - {}: {}", self.domain, label, value)?;
                }
            }
            Some(WhoisLookup::Failed(ref err)) => writeln!(writer, "{} - WHOIS - Error: {}", self.domain, err)?,
            None => {}
        }

        Ok(())
    }
}

impl LinesFormatter for ReverseReport {
    fn output<W: Write>(&self, writer: &mut W) -> Result<()> {
        output_result(writer, &self.ip, "PTR", &self.result)
    }
}

#[cfg(test)]
mod tests {
    use spectral::prelude::*;

    use super::*;
    use crate::query::RecordKind;
    use crate::resolver::{self, RecordLookup};
    use crate::services::whois::WhoisInfo;

    fn render<T: LinesFormatter>(data: &T) -> String {
        let mut buf = Vec::new();
        data.output(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn one_line_per_record() {
        let report = DomainReport {
            domain: "example.com".to_string(),
            records: vec![
                RecordLookup {
                    kind: RecordKind::Ns,
                    name: "example.com".to_string(),
                    result: QueryResult::Records(vec!["a.iana-servers.net.".to_string(), "b.iana-servers.net.".to_string()]),
                },
                RecordLookup {
                    kind: RecordKind::Mx,
                    name: "example.com".to_string(),
                    result: QueryResult::NoAnswer,
                },
                RecordLookup {
                    kind: RecordKind::Txt,
                    name: "example.com".to_string(),
                    result: QueryResult::Failed(resolver::Error::ServerFailure),
                },
            ],
            whois: Some(WhoisLookup::Info(WhoisInfo {
                registrar: Some("Example Registrar".to_string()),
                status: vec!["ok".to_string()],
                ..Default::default()
            })),
            error: None,
        };

        let out = render(&report);

        let lines: Vec<_> = out.lines().collect();
        assert_that(&lines[0]).is_equal_to("example.com - NS - a.iana-servers.net.");
        assert_that(&lines[1]).is_equal_to("example.com - NS - b.iana-servers.net.");
        assert_that(&lines[2]).is_equal_to("example.com Does not have any MX Record");
        assert_that(&lines[3].starts_with("example.com - TXT - Error: ")).is_true();
        assert_that(&lines[4]).is_equal_to("example.com - WHOIS - Registrar: Example Registrar");
        assert_that(&lines[5]).is_equal_to("example.com - WHOIS - Status: ok");
    }

    #[test]
    fn missing_domain_and_missing_record_differ() {
        let report = |result: QueryResult| DomainReport {
            domain: "x.example".to_string(),
            records: vec![RecordLookup {
                kind: RecordKind::Mx,
                name: "x.example".to_string(),
                result,
            }],
            whois: None,
            error: None,
        };

        let nxdomain = render(&report(QueryResult::NxDomain));
        let no_answer = render(&report(QueryResult::NoAnswer));

        assert_that(&nxdomain).is_equal_to("x.example - MX - Domain does not exist (NXDOMAIN)\n".to_string());
        assert_that(&no_answer).is_equal_to("x.example Does not have any MX Record\n".to_string());
        assert_that(&nxdomain).is_not_equal_to(no_answer);
    }

    #[test]
    fn reverse_line() {
        let report = ReverseReport {
            ip: "93.184.216.34".to_string(),
            result: QueryResult::Records(vec!["example.com.".to_string()]),
        };

        assert_that(&render(&report)).is_equal_to("93.184.216.34 - PTR - example.com.\n".to_string());
    }
}
