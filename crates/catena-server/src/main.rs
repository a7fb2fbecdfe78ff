// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use tracing::error;

use catena_server::config::Config;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    if let Err(e) = catena_server::run::run(config).await {
        error!("fatal: {e:#}");
        std::process::exit(1);
    }
}
