// ABOUTME: Shared pieces of the regressivos command-line console
// ABOUTME: Terminal rendering, argument parsing, QR export and tracing setup

pub mod input;
pub mod logging;
pub mod qr;
pub mod render;

pub use logging::init_tracing;
