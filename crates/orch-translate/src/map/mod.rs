//! Explicit field-by-field mapping from [`RunOptions`](crate::RunOptions) into the model bundles.
//!
//! Each function reads only the flags of its own bundle and fails on the first malformed value it
//! meets.

mod container;
pub use container::map_container;

mod host;
pub use host::map_host;

mod network;
pub use network::map_network;

use orch_model::Env;

use crate::{Flag, RunOptions, TranslateError};

/// Network name used for endpoint settings when `--network` is absent.
pub(crate) const DEFAULT_NETWORK: &str = "default";

pub(crate) fn network_name(opts: &RunOptions) -> Option<&str> {
    opts.last(Flag::Network).filter(|n| !n.is_empty())
}

pub(crate) fn flag_bool(opts: &RunOptions, flag: Flag) -> Result<bool, TranslateError> {
    match opts.last(flag) {
        Some(v) => {
            crate::units::parse_bool(v).map_err(|e| TranslateError::invalid(flag.long(), v, e))
        }
        None => Ok(false),
    }
}

pub(crate) fn flag_with<T>(
    opts: &RunOptions,
    flag: Flag,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Option<T>, TranslateError> {
    opts.last(flag)
        .map(|v| parse(v).map_err(|e| TranslateError::invalid(flag.long(), v, e)))
        .transpose()
}

pub(crate) fn non_empty(opts: &RunOptions, flag: Flag) -> Result<Option<String>, TranslateError> {
    flag_with(opts, flag, |v| {
        if v.trim().is_empty() {
            Err("value is empty".into())
        } else {
            Ok(v.to_string())
        }
    })
}

/// `KEY=value` list. For env, a bare `KEY` is taken from the agent's own environment and dropped
/// when unset.
pub(crate) fn key_values(
    opts: &RunOptions,
    flag: Flag,
    inherit: bool,
) -> Result<Env, TranslateError> {
    let mut out = Env::new();
    for raw in opts.values(flag) {
        match raw.split_once('=') {
            Some(("", _)) => {
                return Err(TranslateError::invalid(flag.long(), raw, "empty key"));
            }
            Some((k, v)) => out.push(k, v),
            None if raw.is_empty() => {
                return Err(TranslateError::invalid(flag.long(), raw, "empty key"));
            }
            None if inherit => {
                if let Ok(v) = std::env::var(raw) {
                    out.push(raw, v);
                }
            }
            None => out.push(raw, ""),
        }
    }
    Ok(out)
}
