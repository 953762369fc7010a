// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::fmt;
use std::net::SocketAddr;

use yansi::Paint;

use crate::app::output::styles::{self, ATTENTION, EMPH, ERROR};
use crate::app::AppConfig;

#[derive(Debug, Default)]
pub struct ConsoleOpts {
    quiet: bool,
}

impl From<&AppConfig> for ConsoleOpts {
    fn from(app_config: &AppConfig) -> Self {
        ConsoleOpts {
            // Machine readable output must not be mixed with status lines
            quiet: app_config.quiet || !app_config.output_config.is_summary(),
        }
    }
}

/// Status messages for the user; reports themselves are written by `output`.
#[derive(Debug)]
pub struct Console {
    opts: ConsoleOpts,
}

impl Console {
    pub fn new(opts: ConsoleOpts) -> Console {
        Console { opts }
    }

    pub fn print_name_servers(&self, name_servers: &[SocketAddr]) {
        if self.not_quiet() {
            let name_servers: Vec<_> = name_servers.iter().map(ToString::to_string).collect();
            self.info(format!("Using DNS Server: {}", Fmt::emph(name_servers.join(", "))));
        }
    }

    pub fn info<T: AsRef<str>>(&self, str: T) {
        println!("{} {}", styles::info_prefix(), str.as_ref());
    }

    pub fn attention<T: AsRef<str>>(&self, str: T) {
        eprintln!("{} {}", Fmt::attention(styles::attention_prefix()), str.as_ref());
    }

    /// Warnings and errors go to stderr, so they remain visible even if stdout is redirected.
    pub fn error<T: AsRef<str>>(&self, str: T) {
        eprintln!("{} {}", Fmt::error(styles::error_prefix()), str.as_ref());
    }

    pub fn not_quiet(&self) -> bool {
        !self.opts.quiet
    }
}

pub struct Fmt;

impl Fmt {
    pub fn emph<T: fmt::Display>(item: T) -> String {
        item.paint(EMPH).to_string()
    }

    pub fn attention<T: fmt::Display>(item: T) -> String {
        item.paint(ATTENTION).to_string()
    }

    pub fn error<T: fmt::Display>(item: T) -> String {
        item.paint(ERROR).to_string()
    }
}
