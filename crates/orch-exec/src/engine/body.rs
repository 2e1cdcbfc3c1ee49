//! Engine API `POST /containers/create` body built from a [`ConfigBundle`].

use std::collections::BTreeMap;

use orch_model::{
    ConfigBundle, ContainerConfig, EndpointSettings, Env, HostConfig, Mount, PortBinding,
    RestartPolicy,
};
use serde_json::{Map, Value, json};

/// Create body in the Engine API's own field names.
///
/// Anonymous volumes go to `Volumes`, every other mount to `Binds`. Published ports are also
/// listed under `ExposedPorts`, as `docker run` does.
pub fn create_body(bundle: &ConfigBundle) -> Value {
    let mut body = container_body(&bundle.container);
    let (host, volumes) = host_body(&bundle.host);

    let mut exposed = Map::new();
    for port in bundle
        .container
        .exposed_ports
        .iter()
        .chain(&bundle.host.port_bindings)
    {
        exposed.insert(port_key(port), json!({}));
    }

    insert_non_empty(&mut body, "ExposedPorts", Value::Object(exposed));
    insert_non_empty(&mut body, "Volumes", Value::Object(volumes));
    body.insert("HostConfig".into(), Value::Object(host));
    if !bundle.network.is_empty() {
        let endpoints: Map<String, Value> = bundle
            .network
            .endpoints
            .iter()
            .map(|(name, e)| (name.clone(), endpoint_body(e)))
            .collect();
        body.insert("NetworkingConfig".into(), json!({ "EndpointsConfig": endpoints }));
    }
    Value::Object(body)
}

fn container_body(c: &ContainerConfig) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("Image".into(), json!(c.image));
    insert_opt(&mut body, "Hostname", c.hostname.as_ref());
    insert_opt(&mut body, "Domainname", c.domainname.as_ref());
    insert_opt(&mut body, "User", c.user.as_ref());
    insert_opt(&mut body, "WorkingDir", c.working_dir.as_ref());
    insert_opt(&mut body, "StopSignal", c.stop_signal.as_ref());
    insert_opt(&mut body, "StopTimeout", c.stop_timeout);
    body.insert("AttachStdin".into(), json!(c.attach_stdin));
    body.insert("AttachStdout".into(), json!(c.attach_stdout));
    body.insert("AttachStderr".into(), json!(c.attach_stderr));
    body.insert("Tty".into(), json!(c.tty));
    body.insert("OpenStdin".into(), json!(c.open_stdin));
    body.insert("NetworkDisabled".into(), json!(c.network_disabled));
    insert_non_empty(&mut body, "Env", json!(c.env.to_pairs()));
    insert_non_empty(&mut body, "Labels", Value::Object(string_map(&c.labels)));

    if let Some((first, rest)) = c.entrypoint.as_deref().and_then(<[String]>::split_first) {
        body.insert("Entrypoint".into(), json!([first]));
        insert_non_empty(&mut body, "Cmd", json!(rest));
    }
    body
}

fn host_body(h: &HostConfig) -> (Map<String, Value>, Map<String, Value>) {
    let mut body = Map::new();
    let mut volumes = Map::new();

    let mut bindings: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for port in &h.port_bindings {
        bindings.entry(port_key(port)).or_default().push(json!({
            "HostIp": port.host_ip.clone().unwrap_or_default(),
            "HostPort": port.host_port.map(|p| p.to_string()).unwrap_or_default(),
        }));
    }
    insert_non_empty(&mut body, "PortBindings", json!(bindings));
    body.insert("PublishAllPorts".into(), json!(h.publish_all_ports));

    let mut binds = Vec::new();
    for mount in &h.binds {
        match bind_spec(mount) {
            Some(spec) => binds.push(spec),
            None => {
                volumes.insert(mount.target.clone(), json!({}));
            }
        }
    }
    insert_non_empty(&mut body, "Binds", json!(binds));

    insert_opt(&mut body, "NetworkMode", h.network_mode.as_ref());
    body.insert("RestartPolicy".into(), restart_body(h.restart_policy));
    body.insert("AutoRemove".into(), json!(h.auto_remove));
    body.insert("Privileged".into(), json!(h.privileged));
    body.insert("ReadonlyRootfs".into(), json!(h.read_only_rootfs));
    body.insert("Init".into(), json!(h.init));
    insert_non_empty(&mut body, "CapAdd", json!(h.cap_add));
    insert_non_empty(&mut body, "CapDrop", json!(h.cap_drop));
    insert_non_empty(&mut body, "Dns", json!(h.dns));
    insert_non_empty(&mut body, "DnsSearch", json!(h.dns_search));
    insert_non_empty(&mut body, "DnsOptions", json!(h.dns_options));
    insert_non_empty(&mut body, "ExtraHosts", json!(h.extra_hosts));
    insert_non_empty(&mut body, "SecurityOpt", json!(h.security_opt));
    insert_non_empty(&mut body, "GroupAdd", json!(h.group_add));
    insert_non_empty(&mut body, "Sysctls", Value::Object(string_map(&h.sysctls)));

    let tmpfs: Map<String, Value> = h
        .tmpfs
        .iter()
        .map(|t| (t.target.clone(), json!(t.options.join(","))))
        .collect();
    insert_non_empty(&mut body, "Tmpfs", Value::Object(tmpfs));

    insert_opt(&mut body, "IpcMode", h.ipc_mode.as_ref());
    insert_opt(&mut body, "PidMode", h.pid_mode.as_ref());
    insert_opt(&mut body, "UTSMode", h.uts_mode.as_ref());
    insert_opt(&mut body, "UsernsMode", h.userns_mode.as_ref());
    insert_opt(&mut body, "CgroupParent", h.cgroup_parent.as_ref());
    insert_opt(&mut body, "Runtime", h.runtime.as_ref());
    insert_opt(&mut body, "OomScoreAdj", h.oom_score_adj);
    insert_opt(&mut body, "ShmSize", h.shm_size);
    if !h.log_config.is_empty() {
        body.insert(
            "LogConfig".into(),
            json!({
                "Type": h.log_config.driver.clone().unwrap_or_default(),
                "Config": string_map(&h.log_config.options),
            }),
        );
    }

    let r = &h.resources;
    insert_opt(&mut body, "Memory", r.memory);
    insert_opt(&mut body, "MemorySwap", r.memory_swap);
    insert_opt(&mut body, "MemoryReservation", r.memory_reservation);
    insert_opt(&mut body, "NanoCpus", r.nano_cpus);
    insert_opt(&mut body, "CpuShares", r.cpu_shares);
    insert_opt(&mut body, "CpuPeriod", r.cpu_period);
    insert_opt(&mut body, "CpuQuota", r.cpu_quota);
    insert_opt(&mut body, "CpusetCpus", r.cpuset_cpus.as_ref());
    insert_opt(&mut body, "CpusetMems", r.cpuset_mems.as_ref());
    insert_opt(&mut body, "PidsLimit", r.pids_limit);
    if r.oom_kill_disable {
        body.insert("OomKillDisable".into(), json!(true));
    }
    let ulimits: Vec<Value> = r
        .ulimits
        .iter()
        .map(|u| json!({ "Name": u.name, "Soft": u.soft, "Hard": u.hard }))
        .collect();
    insert_non_empty(&mut body, "Ulimits", json!(ulimits));
    let devices: Vec<Value> = r
        .devices
        .iter()
        .map(|d| {
            json!({
                "PathOnHost": d.path_on_host,
                "PathInContainer": d.path_in_container,
                "CgroupPermissions": d.cgroup_permissions,
            })
        })
        .collect();
    insert_non_empty(&mut body, "Devices", json!(devices));

    (body, volumes)
}

fn endpoint_body(e: &EndpointSettings) -> Value {
    let mut body = Map::new();
    let mut ipam = Map::new();
    insert_opt(&mut ipam, "IPv4Address", e.ipv4_address.map(|a| a.to_string()));
    insert_opt(&mut ipam, "IPv6Address", e.ipv6_address.map(|a| a.to_string()));
    insert_non_empty(&mut body, "IPAMConfig", Value::Object(ipam));
    insert_non_empty(&mut body, "Aliases", json!(e.aliases));
    insert_non_empty(&mut body, "Links", json!(e.links));
    insert_opt(&mut body, "MacAddress", e.mac_address.as_ref());
    Value::Object(body)
}

fn restart_body(policy: RestartPolicy) -> Value {
    match policy {
        RestartPolicy::No => json!({ "Name": "no" }),
        RestartPolicy::Always => json!({ "Name": "always" }),
        RestartPolicy::UnlessStopped => json!({ "Name": "unless-stopped" }),
        RestartPolicy::OnFailure { max_retries } => json!({
            "Name": "on-failure",
            "MaximumRetryCount": max_retries.unwrap_or(0),
        }),
    }
}

/// `source:target[:opts]`; `None` for an anonymous volume.
fn bind_spec(mount: &Mount) -> Option<String> {
    let source = mount.source.as_ref()?;
    let mut opts = Vec::new();
    if mount.read_only {
        opts.push("ro".to_string());
    }
    opts.extend(mount.options.iter().cloned());
    Some(if opts.is_empty() {
        format!("{source}:{}", mount.target)
    } else {
        format!("{source}:{}:{}", mount.target, opts.join(","))
    })
}

fn port_key(port: &PortBinding) -> String {
    format!("{}/{}", port.container_port, port.protocol)
}

fn string_map(env: &Env) -> Map<String, Value> {
    env.iter()
        .map(|kv| (kv.key().to_string(), json!(kv.value())))
        .collect()
}

fn insert_opt<T: serde::Serialize>(body: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(v) = value {
        body.insert(key.into(), json!(v));
    }
}

fn insert_non_empty(body: &mut Map<String, Value>, key: &str, value: Value) {
    let empty = match &value {
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    };
    if !empty {
        body.insert(key.into(), value);
    }
}
