use std::net::IpAddr;

use orch_model::{Env, HostConfig, LogConfig, Resources, RestartPolicy};

use super::{flag_bool, flag_with, key_values, network_name, non_empty};
use crate::{Flag, RunOptions, TranslateError, units};

/// Build the host bundle: port publishing, mounts, namespaces, restart policy, privileges,
/// logging and resource limits.
pub fn map_host(opts: &RunOptions) -> Result<HostConfig, TranslateError> {
    let mut cfg = HostConfig {
        publish_all_ports: flag_bool(opts, Flag::PublishAll)?,
        network_mode: network_name(opts).map(str::to_string),
        restart_policy: flag_with(opts, Flag::Restart, units::parse_restart)?
            .unwrap_or(RestartPolicy::No),
        auto_remove: flag_bool(opts, Flag::Rm)?,
        privileged: flag_bool(opts, Flag::Privileged)?,
        read_only_rootfs: flag_bool(opts, Flag::ReadOnly)?,
        cap_add: opts.values(Flag::CapAdd).map(str::to_string).collect(),
        cap_drop: opts.values(Flag::CapDrop).map(str::to_string).collect(),
        dns_search: opts.values(Flag::DnsSearch).map(str::to_string).collect(),
        dns_options: opts.values(Flag::DnsOption).map(str::to_string).collect(),
        security_opt: opts.values(Flag::SecurityOpt).map(str::to_string).collect(),
        ipc_mode: non_empty(opts, Flag::Ipc)?,
        pid_mode: non_empty(opts, Flag::Pid)?,
        uts_mode: non_empty(opts, Flag::Uts)?,
        userns_mode: non_empty(opts, Flag::Userns)?,
        cgroup_parent: non_empty(opts, Flag::CgroupParent)?,
        runtime: non_empty(opts, Flag::Runtime)?,
        log_config: LogConfig {
            driver: non_empty(opts, Flag::LogDriver)?,
            options: pairs(opts, Flag::LogOpt)?,
        },
        sysctls: pairs(opts, Flag::Sysctl)?,
        group_add: opts.values(Flag::GroupAdd).map(str::to_string).collect(),
        init: flag_bool(opts, Flag::Init)?,
        oom_score_adj: flag_with(opts, Flag::OomScoreAdj, |v| {
            let score = units::parse_int(v)?;
            if (-1000..=1000).contains(&score) {
                Ok(score)
            } else {
                Err("must be between -1000 and 1000".into())
            }
        })?,
        resources: map_resources(opts)?,
        shm_size: flag_with(opts, Flag::ShmSize, units::parse_bytes)?,
        ..HostConfig::default()
    };

    if cfg.auto_remove && cfg.restart_policy != RestartPolicy::No {
        return Err(TranslateError::invalid(
            Flag::Restart.long(),
            opts.last(Flag::Restart).unwrap_or_default(),
            "conflicts with --rm",
        ));
    }

    for spec in opts.values(Flag::Publish) {
        let bindings = units::parse_publish(spec)
            .map_err(|e| TranslateError::invalid(Flag::Publish.long(), spec, e))?;
        cfg.port_bindings.extend(bindings);
    }

    for spec in opts.values(Flag::Volume) {
        let mount = units::parse_volume(spec)
            .map_err(|e| TranslateError::invalid(Flag::Volume.long(), spec, e))?;
        cfg.binds.push(mount);
    }

    for server in opts.values(Flag::Dns) {
        server
            .parse::<IpAddr>()
            .map_err(|_| TranslateError::invalid(Flag::Dns.long(), server, "not an ip address"))?;
        cfg.dns.push(server.to_string());
    }

    for entry in opts.values(Flag::AddHost) {
        let host = units::parse_extra_host(entry)
            .map_err(|e| TranslateError::invalid(Flag::AddHost.long(), entry, e))?;
        cfg.extra_hosts.push(host);
    }

    for spec in opts.values(Flag::Tmpfs) {
        let mount = units::parse_tmpfs(spec)
            .map_err(|e| TranslateError::invalid(Flag::Tmpfs.long(), spec, e))?;
        cfg.tmpfs.push(mount);
    }

    Ok(cfg)
}

/// `key=value` list where the `=` is mandatory (`--sysctl`, `--log-opt`).
fn pairs(opts: &RunOptions, flag: Flag) -> Result<Env, TranslateError> {
    if let Some(bare) = opts.values(flag).find(|v| !v.contains('=')) {
        return Err(TranslateError::invalid(flag.long(), bare, "expected key=value"));
    }
    key_values(opts, flag, false)
}

fn map_resources(opts: &RunOptions) -> Result<Resources, TranslateError> {
    let mut res = Resources {
        memory: flag_with(opts, Flag::Memory, units::parse_bytes)?,
        memory_swap: flag_with(opts, Flag::MemorySwap, units::parse_bytes_or_unlimited)?,
        nano_cpus: flag_with(opts, Flag::Cpus, units::parse_nano_cpus)?,
        cpu_shares: flag_with(opts, Flag::CpuShares, units::parse_int)?,
        cpuset_cpus: non_empty(opts, Flag::CpusetCpus)?,
        cpuset_mems: non_empty(opts, Flag::CpusetMems)?,
        cpu_period: flag_with(opts, Flag::CpuPeriod, units::parse_int)?,
        cpu_quota: flag_with(opts, Flag::CpuQuota, units::parse_int)?,
        memory_reservation: flag_with(opts, Flag::MemoryReservation, units::parse_bytes)?,
        pids_limit: flag_with(opts, Flag::PidsLimit, units::parse_int)?,
        ulimits: Vec::new(),
        oom_kill_disable: flag_bool(opts, Flag::OomKillDisable)?,
        devices: Vec::new(),
    };

    if let (Some(memory), Some(swap)) = (res.memory, res.memory_swap)
        && swap != -1
        && swap < memory
    {
        return Err(TranslateError::invalid(
            Flag::MemorySwap.long(),
            opts.last(Flag::MemorySwap).unwrap_or_default(),
            "must be larger than the memory limit",
        ));
    }

    for spec in opts.values(Flag::Device) {
        let device = units::parse_device(spec)
            .map_err(|e| TranslateError::invalid(Flag::Device.long(), spec, e))?;
        res.devices.push(device);
    }

    for spec in opts.values(Flag::Ulimit) {
        let limit = units::parse_ulimit(spec)
            .map_err(|e| TranslateError::invalid(Flag::Ulimit.long(), spec, e))?;
        // A later `--ulimit` for the same resource replaces the earlier one.
        res.ulimits.retain(|u| u.name != limit.name);
        res.ulimits.push(limit);
    }

    Ok(res)
}

#[cfg(test)]
mod tests {
    use orch_model::Protocol;

    use super::*;
    use crate::lex;

    fn opts(args: &[&str]) -> RunOptions {
        let lexed = lex(args);
        assert!(lexed.stopped.is_none(), "{:?}", lexed.stopped);
        lexed.options
    }

    #[test]
    fn maps_ports_volumes_and_mode() {
        let cfg = map_host(&opts(&[
            "-p", "8080:80", "-p", "53:53/udp", "-v", "/data:/data:ro", "--network", "host",
            "--restart", "on-failure:5", "--privileged",
        ]))
        .unwrap();

        assert_eq!(cfg.port_bindings.len(), 2);
        assert_eq!(cfg.port_bindings[1].protocol, Protocol::Udp);
        assert_eq!(cfg.binds.len(), 1);
        assert!(cfg.binds[0].read_only);
        assert_eq!(cfg.network_mode.as_deref(), Some("host"));
        assert_eq!(
            cfg.restart_policy,
            RestartPolicy::OnFailure {
                max_retries: Some(5)
            }
        );
        assert!(cfg.privileged);
        assert!(!cfg.auto_remove);
    }

    #[test]
    fn maps_resource_limits() {
        let cfg = map_host(&opts(&[
            "-m", "256m", "--memory-swap", "-1", "--cpus", "0.5", "-c", "512", "--pids-limit",
            "100", "--device", "/dev/ttyUSB0", "--shm-size", "64m",
        ]))
        .unwrap();

        assert_eq!(cfg.resources.memory, Some(256 * 1024 * 1024));
        assert_eq!(cfg.resources.memory_swap, Some(-1));
        assert_eq!(cfg.resources.nano_cpus, Some(500_000_000));
        assert_eq!(cfg.resources.cpu_shares, Some(512));
        assert_eq!(cfg.resources.pids_limit, Some(100));
        assert_eq!(cfg.resources.devices.len(), 1);
        assert_eq!(cfg.shm_size, Some(64 * 1024 * 1024));
    }

    #[test]
    fn maps_namespaces_logging_and_limits() {
        let cfg = map_host(&opts(&[
            "--security-opt", "no-new-privileges", "--tmpfs", "/run:size=64m", "--ipc", "host",
            "--pid", "host", "--uts", "host", "--userns", "host", "--cgroup-parent", "/batch",
            "--runtime", "runsc", "--log-driver", "json-file", "--log-opt", "max-size=10m",
            "--sysctl", "net.core.somaxconn=1024", "--group-add", "video", "--init",
            "--dns-search", "lan", "--dns-opt", "ndots:2", "--oom-score-adj", "-500",
            "--ulimit", "nofile=1024:2048", "--ulimit", "nofile=4096", "--cpu-period", "100000",
            "--cpu-quota", "50000", "--memory-reservation", "64m", "--cpuset-mems", "0",
            "--oom-kill-disable",
        ]))
        .unwrap();

        assert_eq!(cfg.security_opt, vec!["no-new-privileges"]);
        assert_eq!(cfg.tmpfs[0].target, "/run");
        assert_eq!(cfg.ipc_mode.as_deref(), Some("host"));
        assert_eq!(cfg.pid_mode.as_deref(), Some("host"));
        assert_eq!(cfg.uts_mode.as_deref(), Some("host"));
        assert_eq!(cfg.userns_mode.as_deref(), Some("host"));
        assert_eq!(cfg.cgroup_parent.as_deref(), Some("/batch"));
        assert_eq!(cfg.runtime.as_deref(), Some("runsc"));
        assert_eq!(cfg.log_config.driver.as_deref(), Some("json-file"));
        assert_eq!(cfg.log_config.options.get("max-size"), Some("10m"));
        assert_eq!(cfg.sysctls.get("net.core.somaxconn"), Some("1024"));
        assert_eq!(cfg.group_add, vec!["video"]);
        assert!(cfg.init);
        assert_eq!(cfg.dns_search, vec!["lan"]);
        assert_eq!(cfg.dns_options, vec!["ndots:2"]);
        assert_eq!(cfg.oom_score_adj, Some(-500));

        let res = &cfg.resources;
        assert_eq!(res.ulimits.len(), 1);
        assert_eq!((res.ulimits[0].soft, res.ulimits[0].hard), (4096, 4096));
        assert_eq!(res.cpu_period, Some(100_000));
        assert_eq!(res.cpu_quota, Some(50_000));
        assert_eq!(res.memory_reservation, Some(64 * 1024 * 1024));
        assert_eq!(res.cpuset_mems.as_deref(), Some("0"));
        assert!(res.oom_kill_disable);
    }

    #[test]
    fn sysctl_and_log_opt_need_a_value() {
        assert!(map_host(&opts(&["--sysctl", "net.ipv4.ip_forward"])).is_err());
        assert!(map_host(&opts(&["--log-opt", "max-size"])).is_err());
        assert!(map_host(&opts(&["--oom-score-adj", "2000"])).is_err());
        assert!(map_host(&opts(&["--tmpfs", "run"])).is_err());
    }

    #[test]
    fn swap_smaller_than_memory_is_rejected() {
        let err = map_host(&opts(&["-m", "1g", "--memory-swap", "512m"])).unwrap_err();
        assert!(matches!(err, TranslateError::InvalidValue { flag: "memory-swap", .. }));
    }

    #[test]
    fn rm_conflicts_with_restart() {
        assert!(map_host(&opts(&["--rm", "--restart", "always"])).is_err());
        assert!(map_host(&opts(&["--rm", "--restart", "no"])).is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(map_host(&opts(&["-p", "http"])).is_err());
        assert!(map_host(&opts(&["-v", "data:rel"])).is_err());
        assert!(map_host(&opts(&["--dns", "resolver"])).is_err());
        assert!(map_host(&opts(&["--add-host", "db"])).is_err());
        assert!(map_host(&opts(&["--cpus", "lots"])).is_err());
    }

    #[test]
    fn ignores_network_endpoint_flags() {
        let cfg = map_host(&opts(&["--ip", "garbage", "-p", "80:80"])).unwrap();
        assert_eq!(cfg.port_bindings.len(), 1);
    }
}
