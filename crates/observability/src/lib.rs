//! Tracing and logging setup shared by orderflow binaries.

/// Initialize process-wide tracing with the default `warn` filter.
///
/// `RUST_LOG` overrides the default when set.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init("warn");
}

/// Tracing configuration (filters, layers).
pub mod tracing;

#[cfg(test)]
mod tests {
    #[test]
    fn default_init_is_idempotent() {
        super::init();
        super::init();
        ::tracing::warn!("still logging after repeated init");
    }
}
