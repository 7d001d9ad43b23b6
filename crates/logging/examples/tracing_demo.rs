//! Shows how `mtpsync` wires a [`logging::Verbosity`] into a running
//! `tracing` subscriber. Run with e.g. `RUST_LOG=debug cargo run --example
//! tracing_demo --features tracing`.

fn main() {
    let verbosity = logging::Verbosity::from_flags(1, false);
    logging::init(verbosity);

    tracing::info!("mtpsync starting up");
    tracing::debug!(?verbosity, "resolved verbosity from CLI flags");
    tracing::warn!("this is what a warning looks like");
}
