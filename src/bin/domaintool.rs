// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::process;

use tracing::info;

use domaintool::app::logging::Logging;
use domaintool::app::{self, ExitStatus};

#[tokio::main]
async fn main() {
    let app_config = match app::parse_args(std::env::args_os()) {
        Ok(app_config) => app_config,
        Err(exit_status) => process::exit(exit_status as i32),
    };

    app::setup_output(&app_config);
    if let Err(err) = Logging::from(&app_config).start() {
        eprintln!("Failed to initialize logging: {:#}", err);
        process::exit(ExitStatus::UnrecoverableError as i32);
    }
    info!("Parsed args and set up logging.");

    let exit_status = app::run(&app_config).await;
    info!("Exit status: {:?}", exit_status);

    // Exiting here does not wait for WHOIS lookups that outlived their timeout on the blocking pool
    process::exit(exit_status as i32);
}
