//! Logging setup.
//!
//! Modules pull the macros in through [`prelude`] so the subscriber
//! configuration stays in one place.

use tracing_subscriber::{
    EnvFilter, fmt::time::LocalTime, layer::SubscriberExt, util::SubscriberInitExt,
};

pub mod prelude {
    pub use ::tracing::{debug, error, info, trace, warn};
}

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "pooldash=info";

/// Install the global subscriber.
///
/// Logs go to stderr so rendered pages on stdout stay clean. Calling this
/// more than once is harmless; later calls are ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(LocalTime::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .try_init();
}
