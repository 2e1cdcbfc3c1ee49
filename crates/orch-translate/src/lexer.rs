use crate::{Arity, Flag, RunOptions, TranslateError, unmapped_long, unmapped_short};

/// Outcome of lexing: the flags read and, if lexing stopped early, why.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexed {
    pub options: RunOptions,
    /// Recognised `docker run` options with no bundle field, as written (`--gpus`, `-q`).
    pub skipped: Vec<String>,
    pub stopped: Option<TranslateError>,
}

/// Read run flags from `args`.
///
/// Accepts `--long value`, `--long=value`, `-s value`, `-svalue` and clustered boolean
/// shorthands (`-it`). Options `docker run` knows but the bundles cannot carry are stepped
/// over together with their argument and listed in [`Lexed::skipped`].
/// The first unknown flag, missing argument or stray positional stops lexing; everything
/// read up to that point is kept.
pub fn lex<S: AsRef<str>>(args: &[S]) -> Lexed {
    let mut lexed = Lexed::default();
    let mut i = 0;

    while i < args.len() {
        let arg = args[i].as_ref();
        i += 1;

        let step = if arg == "--" {
            // Nothing may follow the terminator: the image is not part of `args`.
            match args.get(i) {
                Some(next) => Err(TranslateError::UnexpectedArgument(next.as_ref().to_string())),
                None => Ok(()),
            }
        } else if let Some(body) = arg.strip_prefix("--") {
            lex_long(body, args, &mut i, &mut lexed)
        } else if let Some(body) = arg.strip_prefix('-').filter(|b| !b.is_empty()) {
            lex_short(body, args, &mut i, &mut lexed)
        } else {
            Err(TranslateError::UnexpectedArgument(arg.to_string()))
        };

        if let Err(e) = step {
            lexed.stopped = Some(e);
            return lexed;
        }
        if arg == "--" {
            break;
        }
    }
    lexed
}

fn lex_long<S: AsRef<str>>(
    body: &str,
    args: &[S],
    i: &mut usize,
    lexed: &mut Lexed,
) -> Result<(), TranslateError> {
    let (name, inline) = match body.split_once('=') {
        Some((n, v)) => (n, Some(v)),
        None => (body, None),
    };

    let Some(flag) = Flag::from_long(name) else {
        let arity = unmapped_long(name)
            .ok_or_else(|| TranslateError::UnknownFlag(format!("--{name}")))?;
        if arity == Arity::Value && inline.is_none() {
            take_next(args, i).ok_or_else(|| TranslateError::MissingValue(format!("--{name}")))?;
        }
        lexed.skipped.push(format!("--{name}"));
        return Ok(());
    };

    if flag.is_bool() {
        lexed.options.push(flag, inline.unwrap_or("true"));
        return Ok(());
    }

    let value = match inline {
        Some(v) => v.to_string(),
        None => take_next(args, i)
            .ok_or_else(|| TranslateError::MissingValue(format!("--{name}")))?,
    };
    lexed.options.push(flag, value);
    Ok(())
}

fn lex_short<S: AsRef<str>>(
    body: &str,
    args: &[S],
    i: &mut usize,
    lexed: &mut Lexed,
) -> Result<(), TranslateError> {
    for (pos, c) in body.char_indices() {
        let Some(flag) = Flag::from_short(c) else {
            match unmapped_short(c) {
                Some(_) => {
                    lexed.skipped.push(format!("-{c}"));
                    continue;
                }
                None => return Err(TranslateError::UnknownFlag(format!("-{c}"))),
            }
        };

        let rest = &body[pos + c.len_utf8()..];
        if flag.is_bool() {
            // `-t=false` is the only way to pass a value to a boolean shorthand.
            if let Some(v) = rest.strip_prefix('=') {
                lexed.options.push(flag, v);
                return Ok(());
            }
            lexed.options.push(flag, "true");
            continue;
        }

        let value = if rest.is_empty() {
            take_next(args, i).ok_or_else(|| TranslateError::MissingValue(format!("-{c}")))?
        } else {
            rest.strip_prefix('=').unwrap_or(rest).to_string()
        };
        lexed.options.push(flag, value);
        return Ok(());
    }
    Ok(())
}

fn take_next<S: AsRef<str>>(args: &[S], i: &mut usize) -> Option<String> {
    let next = args.get(*i)?.as_ref().to_string();
    *i += 1;
    Some(next)
}
