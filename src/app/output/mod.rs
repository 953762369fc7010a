// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::convert::TryFrom;
use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::services::whois::WhoisInfo;
use crate::Error;

pub mod json;
pub mod lines;
pub mod styles;
pub mod summary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Json,
    Lines,
    Summary,
}

impl TryFrom<&str> for OutputType {
    type Error = Error;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value {
            "json" => Ok(OutputType::Json),
            "lines" => Ok(OutputType::Lines),
            "summary" => Ok(OutputType::Summary),
            _ => Err(Error::ParserError {
                what: value.to_string(),
                to: "OutputType",
                why: "invalid output type".to_string(),
            }),
        }
    }
}

pub trait OutputFormat<T> {
    fn output<W: Write>(&self, writer: &mut W, data: &T) -> Result<()>;
}

#[derive(Debug)]
pub enum OutputConfig {
    Json { format: json::JsonFormat },
    Lines { format: lines::LinesFormat },
    Summary { format: summary::SummaryFormat },
}

impl OutputConfig {
    pub fn json(opts: json::JsonOptions) -> Self {
        OutputConfig::Json {
            format: json::JsonFormat::new(opts),
        }
    }

    pub fn lines() -> Self {
        OutputConfig::Lines {
            format: lines::LinesFormat::default(),
        }
    }

    pub fn summary() -> Self {
        OutputConfig::Summary {
            format: summary::SummaryFormat::default(),
        }
    }

    /// Only the human readable summary carries the banner and the blank lines between blocks.
    pub fn is_summary(&self) -> bool {
        matches!(self, OutputConfig::Summary { .. })
    }
}

#[derive(Debug)]
pub struct Output<'a> {
    config: &'a OutputConfig,
}

impl Output<'_> {
    pub fn new(config: &OutputConfig) -> Output {
        Output { config }
    }
}

impl<T: Serialize + summary::SummaryFormatter + lines::LinesFormatter> OutputFormat<T> for Output<'_> {
    fn output<W: Write>(&self, writer: &mut W, data: &T) -> Result<()> {
        match self.config {
            OutputConfig::Json { format } => format.output(writer, data),
            OutputConfig::Lines { format } => format.output(writer, data),
            OutputConfig::Summary { format } => format.output(writer, data),
        }
    }
}

/// Single-valued WHOIS fields with their labels in display order; absent fields are left out.
pub fn whois_fields(info: &WhoisInfo) -> Vec<(&'static str, &str)> {
    let fields = [
        ("Domain Name", &info.domain_name),
        ("Registrar", &info.registrar),
        ("Creation Date", &info.creation_date),
        ("Expiration Date", &info.expiration_date),
        ("Updated Date", &info.updated_date),
    ];

    fields
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|value| (label, value)))
        .collect()
}

/// Single-valued WHOIS fields printed after the name servers and status codes.
pub fn whois_trailing_fields(info: &WhoisInfo) -> Vec<(&'static str, &str)> {
    let fields = [("Organization", &info.organization), ("Country", &info.country)];

    fields
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|value| (label, value)))
        .collect()
}
