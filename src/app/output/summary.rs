// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Colorized text blocks, one per domain or IP address.

use std::fmt::Display;

use yansi::{Paint, Style};

use super::*;
use crate::app::output::styles::{CAPTION, NEGATIVE, RECORD};
use crate::dispatcher::DomainReport;
use crate::resolver::{self, QueryResult, RecordLookup, ReverseReport};
use crate::services::whois::WhoisLookup;

#[derive(Debug, Default)]
pub struct SummaryFormat {}

pub trait SummaryFormatter {
    fn output<W: Write>(&self, writer: &mut W) -> Result<()>;
}

impl<T: SummaryFormatter> OutputFormat<T> for SummaryFormat {
    fn output<W: Write>(&self, writer: &mut W, data: &T) -> Result<()> {
        data.output(writer)
    }
}

fn styled<W: Write, T: Display>(writer: &mut W, style: Style, line: T) -> Result<()> {
    writeln!(writer, "{}", line.paint(style))?;
    Ok(())
}

fn error_details<W: Write, E: Display>(writer: &mut W, err: E) -> Result<()> {
    styled(writer, NEGATIVE, format!("Error details: {}", err))
}

impl SummaryFormatter for DomainReport {
    fn output<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer)?;
        styled(writer, CAPTION, format!("LOOKING UP {}", self.domain))?;
        writeln!(writer)?;

        if let Some(ref err) = self.error {
            styled(writer, NEGATIVE, format!("Unexpected error while looking up {}", self.domain))?;
            error_details(writer, err)?;
        } else if self.records.is_empty() && self.whois.is_none() {
            styled(
                writer,
                NEGATIVE,
                format!("No lookups selected for {}; use --all or a record flag", self.domain),
            )?;
        }

        for record in &self.records {
            output_record(writer, &self.domain, record)?;
        }
        if let Some(ref whois) = self.whois {
            output_whois(writer, &self.domain, whois)?;
        }

        writeln!(writer)?;
        Ok(())
    }
}

fn output_record<W: Write>(writer: &mut W, domain: &str, record: &RecordLookup) -> Result<()> {
    let kind = record.kind;
    match record.result {
        QueryResult::Records(ref records) => {
            styled(writer, CAPTION, kind.caption(domain))?;
            for r in records {
                styled(writer, RECORD, r)?;
            }
        }
        QueryResult::NxDomain => styled(writer, NEGATIVE, kind.nxdomain_message(domain))?,
        QueryResult::NoAnswer => styled(writer, NEGATIVE, kind.no_answer_message(domain))?,
        QueryResult::Failed(ref err) => {
            styled(writer, NEGATIVE, kind.failure_message(domain))?;
            error_details(writer, err)?;
        }
    }

    Ok(())
}

fn output_whois<W: Write>(writer: &mut W, domain: &str, whois: &WhoisLookup) -> Result<()> {
    let info = match whois {
        WhoisLookup::Info(info) => info,
        WhoisLookup::Failed(err) => {
            styled(writer, NEGATIVE, format!("Error while fetching WHOIS information for {}", domain))?;
            return error_details(writer, err);
        }
    };

    styled(writer, CAPTION, format!("WHOIS Information for {}", domain))?;
    if info.is_empty() {
        return styled(writer, NEGATIVE, format!("No WHOIS information found for {}", domain));
    }

    for (label, value) in whois_fields(info) {
        styled(writer, RECORD, format!("{}: {}", label, value))?;
    }
    if !info.name_servers.is_empty() {
        styled(writer, RECORD, "Name Servers:")?;
        for ns in &info.name_servers {
            styled(writer, RECORD, format!("  {}", ns))?;
        }
    }
    match info.status.as_slice() {
        [] => {}
        [status] => styled(writer, RECORD, format!("Status: {}", status))?,
        statuses => {
            styled(writer, RECORD, "Status:")?;
            for status in statuses {
                styled(writer, RECORD, format!("  {}", status))?;
            }
        }
    }
    for (label, value) in whois_trailing_fields(info) {
        styled(writer, RECORD, format!("{}: {}", label, value))?;
    }

    Ok(())
}

impl SummaryFormatter for ReverseReport {
    fn output<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer)?;
        styled(writer, CAPTION, format!("LOOKING UP IP - {}", self.ip))?;
        writeln!(writer)?;

        match self.result {
            QueryResult::Records(ref records) => {
                writeln!(writer, "Reverse Lookup for {}:", self.ip)?;
                for r in records {
                    styled(writer, RECORD, r)?;
                }
            }
            QueryResult::NxDomain | QueryResult::NoAnswer => {
                styled(writer, NEGATIVE, format!("No PTR record found for {}", self.ip))?
            }
            QueryResult::Failed(ref err @ resolver::Error::InvalidName { .. }) => {
                styled(writer, NEGATIVE, format!("Unexpected error during reverse lookup for {}", self.ip))?;
                error_details(writer, err)?;
            }
            QueryResult::Failed(ref err) => {
                styled(writer, NEGATIVE, format!("Error while performing reverse lookup for {}", self.ip))?;
                error_details(writer, err)?;
            }
        }

        writeln!(writer)?;
        Ok(())
    }
}
