// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::ffi::OsString;

use clap::{crate_name, value_parser, Arg, ArgAction, Command};

pub static SUPPORTED_OUTPUT_FORMATS: [&str; 3] = ["summary", "lines", "json"];

/// Single-dash spellings of the record flags and their long forms.
pub static LEGACY_FLAGS: &[(&str, &str)] = &[
    ("-all", "--all"),
    ("-dns", "--dns"),
    ("-ns", "--ns"),
    ("-mx", "--mx"),
    ("-dnssec", "--dnssec"),
    ("-ds", "--ds"),
    ("-txt", "--txt"),
    ("-dmarc", "--dmarc"),
    ("-who", "--who"),
];

/// Rewrites single-dash record flags like `-mx` to `--mx`.
///
/// Without rewriting, clap would read `-dns` as `-d ns`. Arguments after `--` are left untouched.
pub fn normalize_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut verbatim = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if verbatim {
                return arg;
            }
            if arg.as_os_str() == "--" {
                verbatim = true;
                return arg;
            }
            match arg.to_str().and_then(long_form) {
                Some(long) => OsString::from(long),
                None => arg,
            }
        })
        .collect()
}

fn long_form(arg: &str) -> Option<&'static str> {
    LEGACY_FLAGS
        .iter()
        .find(|(legacy, _)| *legacy == arg)
        .map(|(_, long)| *long)
}

pub fn create_parser() -> Command {
    Command::new(crate_name!())
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .after_help("Single-dash flags like -all, -ns, -mx, -dnssec, -txt, -dmarc and -who are accepted as well.")
        .arg(
            Arg::new("domains")
                .value_name("DOMAIN")
                .num_args(0..)
                .action(ArgAction::Append)
                .help("Domain names to look up"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Reads domain names from file, one per line"),
        )
        .arg(
            Arg::new("reverse")
                .short('r')
                .long("reverse")
                .value_name("IP ADDR")
                .help("Performs reverse lookup of IP address"),
        )
        .arg(
            Arg::new("all")
                .long("all")
                .action(ArgAction::SetTrue)
                .help("Looks up all record types and WHOIS information"),
        )
        .arg(
            Arg::new("ns")
                .long("ns")
                .visible_alias("dns")
                .action(ArgAction::SetTrue)
                .help("Looks up nameservers"),
        )
        .arg(
            Arg::new("a")
                .short('a')
                .long("a-record")
                .action(ArgAction::SetTrue)
                .help("Looks up A records"),
        )
        .arg(
            Arg::new("mx")
                .long("mx")
                .action(ArgAction::SetTrue)
                .help("Looks up MX records"),
        )
        .arg(
            Arg::new("dnssec")
                .long("dnssec")
                .visible_alias("ds")
                .action(ArgAction::SetTrue)
                .help("Checks if DNSSEC is enabled by looking up DS records"),
        )
        .arg(
            Arg::new("txt")
                .long("txt")
                .action(ArgAction::SetTrue)
                .help("Looks up TXT records"),
        )
        .arg(
            Arg::new("dmarc")
                .long("dmarc")
                .action(ArgAction::SetTrue)
                .help("Looks up DMARC policy"),
        )
        .arg(
            Arg::new("who")
                .long("who")
                .visible_alias("whois")
                .action(ArgAction::SetTrue)
                .help("Looks up WHOIS information"),
        )
        .arg(
            Arg::new("dns-server")
                .short('d')
                .long("dns-server")
                .value_name("IP ADDR[:PORT]")
                .help("Uses this nameserver instead of the system's nameservers"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .default_value("1")
                .value_parser(value_parser!(u64).range(1..))
                .help("Sets timeout for each query"),
        )
        .arg(
            Arg::new("max-concurrent")
                .long("max-concurrent")
                .value_name("NUMBER")
                .default_value("5")
                .value_parser(value_parser!(u64).range(1..))
                .help("Sets max. number of domains looked up concurrently"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FORMAT")
                .default_value("summary")
                .value_parser(SUPPORTED_OUTPUT_FORMATS)
                .help("Sets the output format"),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .action(ArgAction::SetTrue)
                .help("Pretty prints JSON output"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Does not print the nameservers in use"),
        )
        .arg(
            Arg::new("v")
                .short('v')
                .action(ArgAction::Count)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .action(ArgAction::SetTrue)
                .help("Disables colorful output"),
        )
        .arg(
            Arg::new("ascii")
                .long("ascii")
                .action(ArgAction::SetTrue)
                .help("Uses only ASCII compatible characters for output"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Uses debug formatting for logging -- much more verbose"),
        )
}
