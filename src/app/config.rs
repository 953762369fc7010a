// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::convert::TryFrom;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::ArgMatches;

use crate::app::output::json::JsonOptions;
use crate::app::output::{OutputConfig, OutputType};
use crate::query::{RecordKind, Selection};
use crate::resolver::{parse_name_server, ResolverConfig};

#[derive(Debug)]
pub struct AppConfig {
    pub domains: Vec<String>,
    pub file: Option<PathBuf>,
    pub reverse: Option<String>,
    pub selection: Selection,
    pub name_server: Option<SocketAddr>,
    pub timeout: Duration,
    pub max_concurrent: usize,
    pub quiet: bool,
    pub verbosity: u8,
    pub no_color: bool,
    pub ascii: bool,
    pub debug: bool,
    pub output_config: OutputConfig,
}

impl AppConfig {
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::new(self.name_server, self.timeout)
    }
}

impl TryFrom<&ArgMatches> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: &ArgMatches) -> std::result::Result<Self, Self::Error> {
        let domains: Vec<String> = args
            .get_many::<String>("domains")
            .map(|xs| xs.map(|x| x.trim().to_string()).filter(|x| !x.is_empty()).collect())
            .unwrap_or_default();
        let file = args.get_one::<String>("file").map(PathBuf::from);
        let reverse = args.get_one::<String>("reverse").cloned();
        if domains.is_empty() && file.is_none() && reverse.is_none() {
            return Err(anyhow!(
                "at least one domain, a file path, or an IP address must be provided"
            ));
        }

        let name_server = args
            .get_one::<String>("dns-server")
            .map(|x| parse_name_server(x).context("failed to parse dns server"))
            .transpose()?;

        let output = args
            .get_one::<String>("output")
            .map(|x| OutputType::try_from(x.as_str()).context("failed to parse output type"))
            .transpose()?
            .unwrap_or(OutputType::Summary);

        let config = AppConfig {
            domains,
            file,
            reverse,
            selection: selection(args),
            name_server,
            timeout: args
                .get_one::<u64>("timeout")
                .copied()
                .map(Duration::from_secs)
                .unwrap_or_else(|| Duration::from_secs(1)),
            max_concurrent: args.get_one::<u64>("max-concurrent").map(|x| *x as usize).unwrap_or(5),
            quiet: args.get_flag("quiet"),
            verbosity: args.get_count("v"),
            no_color: args.get_flag("no-color"),
            ascii: args.get_flag("ascii"),
            debug: args.get_flag("debug"),
            output_config: output_config(output, args),
        };

        Ok(config)
    }
}

fn selection(args: &ArgMatches) -> Selection {
    if args.get_flag("all") {
        return Selection::all();
    }

    let flags = [
        ("ns", RecordKind::Ns),
        ("a", RecordKind::A),
        ("mx", RecordKind::Mx),
        ("dnssec", RecordKind::Dnssec),
        ("txt", RecordKind::Txt),
        ("dmarc", RecordKind::Dmarc),
    ];
    let kinds = flags
        .iter()
        .filter(|(flag, _)| args.get_flag(flag))
        .map(|(_, kind)| *kind);

    Selection::new(kinds, args.get_flag("who"))
}

fn output_config(output_type: OutputType, args: &ArgMatches) -> OutputConfig {
    match output_type {
        OutputType::Json => OutputConfig::json(JsonOptions::new(args.get_flag("pretty"))),
        OutputType::Summary => OutputConfig::summary(),
        OutputType::Lines => OutputConfig::lines(),
    }
}
