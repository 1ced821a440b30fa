//! # Diagnostic Tracing
//!
//! Diagnostics go through the `tracing` crate with structured fields
//! (`actor`, `order`, `pending`, ...). They are separate from the service
//! journal: the journal is the story of the shift, tracing is for whoever is
//! debugging the pipeline.
//!
//! ```bash
//! # Quiet by default
//! cargo run -- orders.txt
//!
//! # Phase changes and worker start/stop
//! RUST_LOG=info cargo run -- orders.txt
//!
//! # Every journal line mirrored as a debug event, plus queue traffic
//! RUST_LOG=debug cargo run -- orders.txt
//! ```

/// Initializes the tracing subscriber.
///
/// Filtering comes from `RUST_LOG`; output goes to stderr in the compact
/// format with module targets hidden, so it never interleaves with the
/// console lines printed on stdout.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
