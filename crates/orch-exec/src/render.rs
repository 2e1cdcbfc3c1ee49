//! Rendering of a [`ConfigBundle`] back into `docker create` arguments.

use orch_model::{
    ConfigBundle, ContainerConfig, EndpointSettings, HostConfig, PortBinding, RestartPolicy,
};
use orch_translate::Flag;
use tracing::warn;

const DEFAULT_NETWORK: &str = "default";

struct Args(Vec<String>);

impl Args {
    fn switch(&mut self, flag: Flag, on: bool) {
        if on {
            self.0.push(format!("--{}", flag.long()));
        }
    }

    fn value(&mut self, flag: Flag, value: impl std::fmt::Display) {
        self.0.push(format!("--{}={}", flag.long(), value));
    }

    fn opt<T: std::fmt::Display>(&mut self, flag: Flag, value: Option<T>) {
        if let Some(v) = value {
            self.value(flag, v);
        }
    }

    fn each<T: std::fmt::Display>(&mut self, flag: Flag, values: impl IntoIterator<Item = T>) {
        for v in values {
            self.value(flag, v);
        }
    }
}

/// Arguments following `docker create`: flags, the image, then any entrypoint arguments beyond the
/// first.
///
/// Only the endpoint of the network the container joins (its network mode, or `default`) can be
/// expressed on
/// the command line; settings for other networks are dropped with a warning.
pub fn create_args(bundle: &ConfigBundle) -> Vec<String> {
    let mut args = Args(Vec::new());
    container_args(&mut args, &bundle.container);
    host_args(&mut args, &bundle.host, bundle.container.network_disabled);

    let joined = bundle.host.network_mode.as_deref().unwrap_or(DEFAULT_NETWORK);
    for (name, endpoint) in &bundle.network.endpoints {
        if name == joined {
            endpoint_args(&mut args, endpoint);
        } else {
            warn!(
                target: "orch.exec.docker",
                network = %name,
                "endpoint settings for a network the container does not join are dropped"
            );
        }
    }

    let mut args = args.0;
    args.push(bundle.container.image.clone());
    if let Some(extra) = bundle.container.entrypoint.as_ref().and_then(|e| e.get(1..)) {
        args.extend(extra.iter().cloned());
    }
    args
}

fn container_args(args: &mut Args, c: &ContainerConfig) {
    args.opt(Flag::Name, c.name.as_ref());
    args.each(Flag::Env, c.env.to_pairs());
    args.each(Flag::Label, c.labels.to_pairs());
    args.opt(Flag::Workdir, c.working_dir.as_ref());
    args.opt(Flag::User, c.user.as_ref());
    args.opt(Flag::Hostname, c.hostname.as_ref());
    args.opt(Flag::Domainname, c.domainname.as_ref());
    args.opt(Flag::Entrypoint, c.entrypoint.as_ref().and_then(|e| e.first()));
    args.switch(Flag::Tty, c.tty);
    args.switch(Flag::Interactive, c.open_stdin);

    let default_attach = c.attach_stdout && c.attach_stderr && c.attach_stdin == c.open_stdin;
    let detached = !(c.attach_stdin || c.attach_stdout || c.attach_stderr);
    args.switch(Flag::Detach, detached);
    if !default_attach && !detached {
        for (on, stream) in [
            (c.attach_stdin, "stdin"),
            (c.attach_stdout, "stdout"),
            (c.attach_stderr, "stderr"),
        ] {
            if on {
                args.value(Flag::Attach, stream);
            }
        }
    }

    args.each(
        Flag::Expose,
        c.exposed_ports
            .iter()
            .map(|p| format!("{}/{}", p.container_port, p.protocol)),
    );
    args.opt(Flag::StopSignal, c.stop_signal.as_ref());
    args.opt(Flag::StopTimeout, c.stop_timeout);
}

fn host_args(args: &mut Args, h: &HostConfig, network_disabled: bool) {
    args.each(Flag::Publish, h.port_bindings.iter().map(publish_spec));
    args.switch(Flag::PublishAll, h.publish_all_ports);

    for mount in &h.binds {
        let Some(source) = &mount.source else {
            args.value(Flag::Volume, &mount.target);
            continue;
        };
        let mut opts = Vec::new();
        if mount.read_only {
            opts.push("ro".to_string());
        }
        opts.extend(mount.options.iter().cloned());
        if opts.is_empty() {
            args.value(Flag::Volume, format!("{source}:{}", mount.target));
        } else {
            args.value(Flag::Volume, format!("{source}:{}:{}", mount.target, opts.join(",")));
        }
    }

    match (&h.network_mode, network_disabled) {
        (Some(mode), _) => args.value(Flag::Network, mode),
        (None, true) => args.value(Flag::Network, "none"),
        (None, false) => {}
    }

    match h.restart_policy {
        RestartPolicy::No => {}
        RestartPolicy::Always => args.value(Flag::Restart, "always"),
        RestartPolicy::UnlessStopped => args.value(Flag::Restart, "unless-stopped"),
        RestartPolicy::OnFailure { max_retries: None } => args.value(Flag::Restart, "on-failure"),
        RestartPolicy::OnFailure {
            max_retries: Some(n),
        } => args.value(Flag::Restart, format!("on-failure:{n}")),
    }

    args.switch(Flag::Rm, h.auto_remove);
    args.switch(Flag::Privileged, h.privileged);
    args.switch(Flag::ReadOnly, h.read_only_rootfs);
    args.each(Flag::CapAdd, &h.cap_add);
    args.each(Flag::CapDrop, &h.cap_drop);
    args.each(Flag::Dns, &h.dns);
    args.each(Flag::DnsSearch, &h.dns_search);
    args.each(Flag::DnsOption, &h.dns_options);
    args.each(Flag::AddHost, &h.extra_hosts);
    args.each(Flag::SecurityOpt, &h.security_opt);
    args.each(
        Flag::Tmpfs,
        h.tmpfs.iter().map(|t| {
            if t.options.is_empty() {
                t.target.clone()
            } else {
                format!("{}:{}", t.target, t.options.join(","))
            }
        }),
    );
    args.opt(Flag::Ipc, h.ipc_mode.as_ref());
    args.opt(Flag::Pid, h.pid_mode.as_ref());
    args.opt(Flag::Uts, h.uts_mode.as_ref());
    args.opt(Flag::Userns, h.userns_mode.as_ref());
    args.opt(Flag::CgroupParent, h.cgroup_parent.as_ref());
    args.opt(Flag::Runtime, h.runtime.as_ref());
    args.opt(Flag::LogDriver, h.log_config.driver.as_ref());
    args.each(Flag::LogOpt, h.log_config.options.to_pairs());
    args.each(Flag::Sysctl, h.sysctls.to_pairs());
    args.each(Flag::GroupAdd, &h.group_add);
    args.switch(Flag::Init, h.init);
    args.opt(Flag::OomScoreAdj, h.oom_score_adj);

    let r = &h.resources;
    args.opt(Flag::Memory, r.memory);
    args.opt(Flag::MemorySwap, r.memory_swap);
    args.opt(Flag::MemoryReservation, r.memory_reservation);
    args.opt(Flag::Cpus, r.nano_cpus.map(|n| n as f64 / 1e9));
    args.opt(Flag::CpuShares, r.cpu_shares);
    args.opt(Flag::CpuPeriod, r.cpu_period);
    args.opt(Flag::CpuQuota, r.cpu_quota);
    args.opt(Flag::CpusetCpus, r.cpuset_cpus.as_ref());
    args.opt(Flag::CpusetMems, r.cpuset_mems.as_ref());
    args.opt(Flag::PidsLimit, r.pids_limit);
    args.each(
        Flag::Ulimit,
        r.ulimits
            .iter()
            .map(|u| format!("{}={}:{}", u.name, u.soft, u.hard)),
    );
    args.switch(Flag::OomKillDisable, r.oom_kill_disable);
    args.each(
        Flag::Device,
        r.devices.iter().map(|d| {
            format!("{}:{}:{}", d.path_on_host, d.path_in_container, d.cgroup_permissions)
        }),
    );
    args.opt(Flag::ShmSize, h.shm_size);
}

fn endpoint_args(args: &mut Args, e: &EndpointSettings) {
    args.opt(Flag::Ip, e.ipv4_address);
    args.opt(Flag::Ip6, e.ipv6_address);
    args.each(Flag::NetworkAlias, &e.aliases);
    args.each(Flag::Link, &e.links);
    args.opt(Flag::MacAddress, e.mac_address.as_ref());
}

fn publish_spec(p: &PortBinding) -> String {
    let ip = match p.host_ip.as_deref() {
        Some(ip) if ip.contains(':') => format!("[{ip}]:"),
        Some(ip) => format!("{ip}:"),
        None => String::new(),
    };
    match (ip.is_empty(), p.host_port) {
        (true, None) => format!("{}/{}", p.container_port, p.protocol),
        (_, Some(host)) => format!("{ip}{host}:{}/{}", p.container_port, p.protocol),
        (false, None) => format!("{ip}:{}/{}", p.container_port, p.protocol),
    }
}
