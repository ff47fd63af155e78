/// Re-export `Config` from `dataforecast-core` for use within this crate.
///
/// All environment-variable parsing lives in `dataforecast-core` so it can be
/// shared with integration tests without depending on the full server.
pub use dataforecast_core::config::Config;
