//! Translation of `docker run`-style invocation parameters into the three configuration bundles a
//! runtime consumes on create.
//!
//! The pipeline has two stages:
//! 1. [`lex`] turns the flag tokens into ordered [`RunOptions`] (raw strings, no value validation);
//! 2. `map_container`, `map_host` and `map_network` each validate and map only the flags of
//!    their own bundle.
//!
//! Every mapping step returns its own `Result`, so a malformed `--ip` never costs the caller its
//! environment variables or port bindings.
//! [`Translation::into_bundle`] substitutes the empty value for a failed axis and pins the image
//! reference.

mod error;
pub use error::{Axis, TranslateError};

mod flags;
pub use flags::{Arity, Flag, unmapped_long, unmapped_short};

mod lexer;
pub use lexer::{Lexed, lex};

mod options;
pub use options::RunOptions;

mod units;

mod map;
pub use map::{map_container, map_host, map_network};

mod translator;
pub use translator::{PrefixRule, Translation, Translator, TranslatorConfig};
