//! Tracing setup.
//!
//! Brook reports reconciliation decisions at `trace` level and delegation setup at
//! `debug` level through [`tracing`]. Applications that already install a subscriber
//! do not need this module.

use std::panic;
use std::sync::Once;

use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info";

static TRACING_INSTALLED: Once = Once::new();
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Installs a formatting subscriber filtered by `RUST_LOG`, falling back to `info`
/// (idempotent).
pub fn install_tracing() {
    install_tracing_with_default(DEFAULT_FILTER);
}

/// Like [`install_tracing`], with a custom fallback filter such as `"brook_core=trace"`.
pub fn install_tracing_with_default(default_filter: &str) {
    TRACING_INSTALLED.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

        let result = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_filter(filter))
            .try_init();

        if result.is_err() {
            eprintln!("brook tracing subscriber failed to initialize");
        }
    });
}

/// Reports panics, for example from a component's render function, as `error` events
/// (idempotent).
///
/// The previously installed hook still runs afterwards.
pub fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            tracing_panic::panic_hook(info);
            previous(info);
        }));
    });
}
