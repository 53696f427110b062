use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_tree::HierarchicalLayer;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Calling this more than once is
/// harmless; later calls leave the first subscriber in place.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(HierarchicalLayer::new(2).with_targets(true).with_bracketed_fields(true))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialisation_is_harmless() {
        init_logging("rift_strip=debug");
        init_logging("trace");
        tracing::debug!("still logging");
    }
}
