//! Value grammars shared by the mapping steps: sizes, cpu quotas, booleans, port and volume specs.

use std::net::IpAddr;

use orch_model::{DeviceMapping, Mount, PortBinding, Protocol, RestartPolicy, TmpfsMount, Ulimit};

/// Parse a size with an optional binary unit suffix (`512m`, `1.5g`, `1024`, `2GB`).
pub(crate) fn parse_bytes(s: &str) -> Result<i64, String> {
    let lower = s.trim().to_ascii_lowercase();
    let body = lower.strip_suffix('b').unwrap_or(&lower);

    let (number, shift) = match body.char_indices().last() {
        Some((idx, 'k')) => (&body[..idx], 10),
        Some((idx, 'm')) => (&body[..idx], 20),
        Some((idx, 'g')) => (&body[..idx], 30),
        Some((idx, 't')) => (&body[..idx], 40),
        Some(_) => (body, 0),
        None => return Err("empty size".into()),
    };

    let value: f64 = number
        .parse()
        .map_err(|_| format!("{s:?} is not a size"))?;
    if !value.is_finite() || value < 0.0 {
        return Err("size must be a non-negative number".into());
    }

    let bytes = value * (1u64 << shift) as f64;
    if bytes > i64::MAX as f64 {
        return Err("size overflows".into());
    }
    Ok(bytes as i64)
}

/// Like [`parse_bytes`], but `-1` means unlimited.
pub(crate) fn parse_bytes_or_unlimited(s: &str) -> Result<i64, String> {
    if s.trim() == "-1" {
        return Ok(-1);
    }
    parse_bytes(s)
}

/// Fractional cpu count to nano-cpus (`1.5` → `1_500_000_000`).
pub(crate) fn parse_nano_cpus(s: &str) -> Result<i64, String> {
    let cpus: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("{s:?} is not a number"))?;
    if !cpus.is_finite() || cpus < 0.0 {
        return Err("cpus must be a non-negative number".into());
    }
    let nanos = (cpus * 1e9).round();
    if nanos > i64::MAX as f64 {
        return Err("cpus overflows".into());
    }
    Ok(nanos as i64)
}

pub(crate) fn parse_bool(s: &str) -> Result<bool, String> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err("expected a boolean".into()),
    }
}

pub(crate) fn parse_int(s: &str) -> Result<i64, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("{s:?} is not an integer"))
}

/// `no`, `always`, `unless-stopped` or `on-failure[:max-retries]`.
pub(crate) fn parse_restart(s: &str) -> Result<RestartPolicy, String> {
    let (name, retries) = match s.split_once(':') {
        Some((n, r)) => (n, Some(r)),
        None => (s, None),
    };
    match (name, retries) {
        ("no", None) | ("", None) => Ok(RestartPolicy::No),
        ("always", None) => Ok(RestartPolicy::Always),
        ("unless-stopped", None) => Ok(RestartPolicy::UnlessStopped),
        ("on-failure", None) => Ok(RestartPolicy::OnFailure { max_retries: None }),
        ("on-failure", Some(r)) => {
            let n = r
                .parse::<u32>()
                .map_err(|_| format!("maximum retry count {r:?} is not a number"))?;
            Ok(RestartPolicy::OnFailure {
                max_retries: Some(n),
            })
        }
        (_, Some(_)) => Err("maximum retry count only applies to on-failure".into()),
        (other, None) => Err(format!("unknown restart policy {other:?}")),
    }
}

/// `port[-end][/proto]`.
fn parse_port_range(s: &str) -> Result<(u16, u16), String> {
    let (start, end) = match s.split_once('-') {
        Some((a, b)) => (a, b),
        None => (s, s),
    };
    let start: u16 = start.parse().map_err(|_| format!("invalid port {s:?}"))?;
    let end: u16 = end.parse().map_err(|_| format!("invalid port {s:?}"))?;
    if start == 0 || end < start {
        return Err(format!("invalid port range {s:?}"));
    }
    Ok((start, end))
}

fn split_proto(s: &str) -> Result<(&str, Protocol), String> {
    match s.rsplit_once('/') {
        Some((rest, proto)) => Ok((rest, proto.parse()?)),
        None => Ok((s, Protocol::Tcp)),
    }
}

/// `--expose` value: `port[-end][/proto]`.
pub(crate) fn parse_expose(s: &str) -> Result<Vec<PortBinding>, String> {
    let (ports, protocol) = split_proto(s)?;
    let (start, end) = parse_port_range(ports)?;
    Ok((start..=end)
        .map(|container_port| PortBinding {
            container_port,
            protocol,
            host_ip: None,
            host_port: None,
        })
        .collect())
}

/// `--publish` value: `[ip:][host-port[-end]:]container-port[-end][/proto]`; IPv6 hosts in
/// brackets.
pub(crate) fn parse_publish(s: &str) -> Result<Vec<PortBinding>, String> {
    let (rest, protocol) = split_proto(s)?;

    let (host_ip, rest) = match rest.strip_prefix('[') {
        Some(bracketed) => {
            let (ip, tail) = bracketed
                .split_once("]:")
                .ok_or_else(|| format!("invalid IPv6 binding {s:?}"))?;
            (Some(ip), tail)
        }
        None => (None, rest),
    };

    let parts: Vec<&str> = rest.split(':').collect();
    let (ip, host, container) = match (host_ip, parts.as_slice()) {
        (None, [c]) => (None, None, *c),
        (None, [h, c]) => (None, Some(*h), *c),
        (None, [ip, h, c]) => (Some(*ip), Some(*h), *c),
        (Some(ip), [h, c]) => (Some(ip), Some(*h), *c),
        _ => return Err(format!("invalid port specification {s:?}")),
    };

    let ip = match ip.filter(|ip| !ip.is_empty()) {
        Some(ip) => {
            ip.parse::<IpAddr>()
                .map_err(|_| format!("invalid host ip {ip:?}"))?;
            Some(ip.to_string())
        }
        None => None,
    };

    let (c_start, c_end) = parse_port_range(container)?;
    let host = match host.filter(|h| !h.is_empty()) {
        Some(h) => Some(parse_port_range(h)?),
        None => None,
    };

    let count = c_end - c_start;
    if let Some((h_start, h_end)) = host
        && h_end - h_start != count
    {
        return Err(format!("port ranges do not match in {s:?}"));
    }

    Ok((0..=count)
        .map(|offset| PortBinding {
            container_port: c_start + offset,
            protocol,
            host_ip: ip.clone(),
            host_port: host.map(|(h_start, _)| h_start + offset),
        })
        .collect())
}

/// `--volume` value: `target`, `source:target` or `source:target:opts`.
pub(crate) fn parse_volume(s: &str) -> Result<Mount, String> {
    let parts: Vec<&str> = s.split(':').collect();
    let (source, target, opts) = match parts.as_slice() {
        [t] => (None, *t, None),
        [src, t] => (Some(*src), *t, None),
        [src, t, o] => (Some(*src), *t, Some(*o)),
        _ => return Err(format!("invalid volume specification {s:?}")),
    };

    if !target.starts_with('/') {
        return Err(format!("mount destination {target:?} is not an absolute path"));
    }
    if source.is_some_and(str::is_empty) {
        return Err("empty mount source".into());
    }

    let mut read_only = false;
    let mut options = Vec::new();
    for opt in opts.into_iter().flat_map(|o| o.split(',')).filter(|o| !o.is_empty()) {
        match opt {
            "ro" => read_only = true,
            "rw" => read_only = false,
            other => options.push(other.to_string()),
        }
    }

    Ok(Mount {
        source: source.map(str::to_string),
        target: target.to_string(),
        read_only,
        options,
    })
}

/// `--device` value: `host[:container[:permissions]]`.
pub(crate) fn parse_device(s: &str) -> Result<DeviceMapping, String> {
    let parts: Vec<&str> = s.split(':').collect();
    let (host, container, perms) = match parts.as_slice() {
        [h] => (*h, *h, "rwm"),
        [h, c] if is_cgroup_perms(c) => (*h, *h, *c),
        [h, c] => (*h, *c, "rwm"),
        [h, c, p] => (*h, *c, *p),
        _ => return Err(format!("invalid device specification {s:?}")),
    };
    if !host.starts_with('/') || !container.starts_with('/') {
        return Err(format!("device paths must be absolute in {s:?}"));
    }
    if !is_cgroup_perms(perms) {
        return Err(format!("invalid device permissions {perms:?}"));
    }
    Ok(DeviceMapping {
        path_on_host: host.to_string(),
        path_in_container: container.to_string(),
        cgroup_permissions: perms.to_string(),
    })
}

fn is_cgroup_perms(s: &str) -> bool {
    !s.is_empty() && s.len() <= 3 && s.chars().all(|c| matches!(c, 'r' | 'w' | 'm'))
}

/// `--add-host` value: `name:ip` (`host-gateway` allowed as ip).
pub(crate) fn parse_extra_host(s: &str) -> Result<String, String> {
    let (name, ip) = s
        .split_once(':')
        .ok_or_else(|| format!("{s:?} is not in name:ip form"))?;
    if name.is_empty() {
        return Err("empty host name".into());
    }
    if ip != "host-gateway" {
        ip.parse::<IpAddr>()
            .map_err(|_| format!("invalid ip address {ip:?}"))?;
    }
    Ok(format!("{name}:{ip}"))
}

/// `--tmpfs` value: `target[:opts]`.
pub(crate) fn parse_tmpfs(s: &str) -> Result<TmpfsMount, String> {
    let (target, opts) = match s.split_once(':') {
        Some((t, o)) => (t, o),
        None => (s, ""),
    };
    if !target.starts_with('/') {
        return Err(format!("tmpfs destination {target:?} is not an absolute path"));
    }
    Ok(TmpfsMount {
        target: target.to_string(),
        options: opts
            .split(',')
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

/// `--ulimit` value: `name=soft[:hard]`; a missing hard limit equals the soft one.
pub(crate) fn parse_ulimit(s: &str) -> Result<Ulimit, String> {
    let (name, limits) = s
        .split_once('=')
        .ok_or_else(|| format!("{s:?} is not in name=soft[:hard] form"))?;
    if name.is_empty() {
        return Err("empty ulimit name".into());
    }
    let (soft, hard) = match limits.split_once(':') {
        Some((soft, hard)) => (parse_int(soft)?, parse_int(hard)?),
        None => {
            let soft = parse_int(limits)?;
            (soft, soft)
        }
    };
    if hard != -1 && soft > hard {
        return Err(format!("soft limit {soft} exceeds hard limit {hard}"));
    }
    Ok(Ulimit {
        name: name.to_string(),
        soft,
        hard,
    })
}

/// `aa:bb:cc:dd:ee:ff`.
pub(crate) fn is_mac_address(s: &str) -> bool {
    let parts: Vec<&str> = s.split(':').collect();
    parts.len() == 6
        && parts
            .iter()
            .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit()))
}
