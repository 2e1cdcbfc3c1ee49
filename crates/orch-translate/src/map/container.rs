use orch_model::ContainerConfig;

use super::{flag_bool, flag_with, key_values, network_name, non_empty};
use crate::{Flag, RunOptions, TranslateError, units};

/// Build the container bundle. The image is left empty; the translator pins it afterwards.
pub fn map_container(opts: &RunOptions) -> Result<ContainerConfig, TranslateError> {
    let mut cfg = ContainerConfig {
        name: non_empty(opts, Flag::Name)?,
        env: key_values(opts, Flag::Env, true)?,
        labels: key_values(opts, Flag::Label, false)?,
        working_dir: flag_with(opts, Flag::Workdir, |v| {
            if v.starts_with('/') {
                Ok(v.to_string())
            } else {
                Err("working directory must be an absolute path".into())
            }
        })?,
        user: non_empty(opts, Flag::User)?,
        hostname: non_empty(opts, Flag::Hostname)?,
        domainname: non_empty(opts, Flag::Domainname)?,
        entrypoint: opts.last(Flag::Entrypoint).map(|e| vec![e.to_string()]),
        tty: flag_bool(opts, Flag::Tty)?,
        open_stdin: flag_bool(opts, Flag::Interactive)?,
        stop_signal: non_empty(opts, Flag::StopSignal)?,
        stop_timeout: flag_with(opts, Flag::StopTimeout, units::parse_int)?,
        network_disabled: network_name(opts) == Some("none"),
        ..ContainerConfig::default()
    };

    for port in opts.values(Flag::Expose) {
        let ports = units::parse_expose(port)
            .map_err(|e| TranslateError::invalid(Flag::Expose.long(), port, e))?;
        cfg.exposed_ports.extend(ports);
    }

    let attach: Vec<&str> = opts.values(Flag::Attach).collect();
    let detach = flag_bool(opts, Flag::Detach)?;
    if let (true, Some(first)) = (detach, attach.first()) {
        return Err(TranslateError::invalid(
            Flag::Attach.long(),
            first,
            "conflicts with --detach",
        ));
    }

    if attach.is_empty() && !detach {
        // Foreground defaults of `docker run`: stdout/stderr attached, stdin only with -i.
        cfg.attach_stdout = true;
        cfg.attach_stderr = true;
        cfg.attach_stdin = cfg.open_stdin;
    } else {
        for stream in attach {
            match stream.to_ascii_lowercase().as_str() {
                "stdin" => cfg.attach_stdin = true,
                "stdout" => cfg.attach_stdout = true,
                "stderr" => cfg.attach_stderr = true,
                _ => {
                    return Err(TranslateError::invalid(
                        Flag::Attach.long(),
                        stream,
                        "valid streams are stdin, stdout and stderr",
                    ));
                }
            }
        }
    }

    Ok(cfg)
}
