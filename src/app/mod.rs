// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::convert::TryFrom;
use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use tracing::{debug, info};

use crate::app::console::{Console, ConsoleOpts};
use crate::app::output::{styles, Output, OutputFormat};
use crate::dispatcher::{Dispatcher, DispatcherOpts};
use crate::query::{self, LookupRequest};
use crate::resolver::{reverse_lookup, DnsResolver, RecordResolver, ResolverConfig, ResolverResult};
use crate::services::whois::{WhoisClient, WhoisClientOpts, WhoisService};

pub mod cli_parser;
pub mod config;
pub mod console;
pub mod logging;
pub mod output;

pub use config::AppConfig;

/// `ExitStatus` represents the exit states that will be return to the OS after termination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// All fine, even if individual lookups failed.
    Ok = 0,
    /// CLI argument parsing failed or the input file could not be read.
    InvalidInput = 1,
    /// An unrecoverable error occurred. This is worst case and should not happen.
    UnrecoverableError = 3,
}

/// Parses the command line into an `AppConfig`.
///
/// If there is nothing to run, e.g., because help has been requested or the arguments are invalid, the message has
/// already been printed and the exit status is returned as error.
pub fn parse_args<I, T>(args: I) -> std::result::Result<AppConfig, ExitStatus>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args = cli_parser::normalize_legacy_flags(args);
    let mut parser = cli_parser::create_parser();

    if args.len() <= 1 {
        let _ = parser.print_help();
        println!();
        return Err(ExitStatus::Ok);
    }

    let matches = match parser.try_get_matches_from_mut(args) {
        Ok(matches) => matches,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Err(ExitStatus::Ok),
                _ => Err(ExitStatus::InvalidInput),
            };
        }
    };

    AppConfig::try_from(&matches).map_err(|err| {
        Console::new(ConsoleOpts::default()).error(format!("Error: {:#}.", err));
        eprintln!("{}", parser.render_usage());
        ExitStatus::InvalidInput
    })
}

/// Applies the presentation settings which are global to the process.
pub fn setup_output(app_config: &AppConfig) {
    if app_config.no_color {
        styles::no_color_mode();
    }
    if app_config.ascii {
        styles::ascii_mode();
    }
}

/// Creates the WHOIS client and runs all lookups with the system or custom resolver, writing to stdout.
pub async fn run(app_config: &AppConfig) -> ExitStatus {
    let console = Console::new(ConsoleOpts::from(app_config));

    let whois = match WhoisClient::new(WhoisClientOpts::default()) {
        Ok(whois) => whois,
        Err(err) => {
            console.error(format!("Error: failed to create WHOIS client: {}.", err));
            return ExitStatus::UnrecoverableError;
        }
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match run_with(app_config, DnsResolver::new, Arc::new(whois), &mut handle).await {
        Ok(status) => status,
        Err(err) => {
            console.error(format!("Error: {:#}.", err));
            ExitStatus::UnrecoverableError
        }
    }
}

/// Runs all lookups of `app_config` and writes the reports to `writer`.
///
/// The resolver is created by `new_resolver` from the resolver configuration of `app_config`. Domains from the input
/// file come first, followed by the domains given on the command line. If the input file cannot be read, no resolver
/// is created and no lookup is sent at all.
pub async fn run_with<R, F, W, O>(app_config: &AppConfig, new_resolver: F, whois: Arc<W>, writer: &mut O) -> Result<ExitStatus>
where
    R: RecordResolver + 'static,
    F: FnOnce(&ResolverConfig) -> ResolverResult<R>,
    W: WhoisService + 'static,
    O: Write,
{
    let console = Console::new(ConsoleOpts::from(app_config));

    let mut domains = Vec::new();
    if let Some(ref path) = app_config.file {
        match query::read_domains(path).await {
            Ok(from_file) => {
                if from_file.is_empty() {
                    console.attention(format!("No domains found in '{}'.", path.display()));
                }
                domains.extend(from_file);
            }
            Err(err) => {
                let err = anyhow::Error::from(err);
                console.error(format!("Error: {:#}.", err));
                return Ok(ExitStatus::InvalidInput);
            }
        }
    }
    domains.extend(app_config.domains.iter().cloned());
    debug!("Looking up {} domains.", domains.len());

    let resolver = match new_resolver(&app_config.resolver_config()) {
        Ok(resolver) => Arc::new(resolver),
        Err(err) => {
            console.error(format!("Error: failed to create resolver: {}.", err));
            return Ok(ExitStatus::UnrecoverableError);
        }
    };
    console.print_name_servers(&resolver.name_servers());

    let output = Output::new(&app_config.output_config);
    let requests = LookupRequest::for_domains(domains, &app_config.selection);
    let dispatcher = Dispatcher::new(resolver.clone(), whois, DispatcherOpts::new(app_config.max_concurrent));

    if requests.len() > 1 {
        let mut written: Result<()> = Ok(());
        dispatcher
            .run_streaming(requests, |report| {
                if written.is_ok() {
                    written = output.output(writer, &report).and_then(|_| writer.flush().map_err(Into::into));
                }
            })
            .await;
        written.context("failed to write report")?;
    } else {
        for report in dispatcher.run(requests).await {
            output.output(writer, &report).context("failed to write report")?;
        }
    }

    if let Some(ref ip) = app_config.reverse {
        info!("Reverse lookup for {}.", ip);
        let report = reverse_lookup(resolver.as_ref(), ip).await;
        output.output(writer, &report).context("failed to write reverse lookup")?;
    }
    writer.flush().context("failed to flush output")?;

    Ok(ExitStatus::Ok)
}
