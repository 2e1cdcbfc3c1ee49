use crate::Axis;

/// Run flags understood by the translator.
///
/// Names, shorthands and arity follow `docker run`, so parameter lists written for an existing
/// deployment keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    // container
    Name,
    Env,
    Label,
    Workdir,
    User,
    Hostname,
    Domainname,
    Entrypoint,
    Tty,
    Interactive,
    Attach,
    Detach,
    Expose,
    StopSignal,
    StopTimeout,

    // host
    Publish,
    PublishAll,
    Volume,
    Network,
    Restart,
    Rm,
    Privileged,
    ReadOnly,
    CapAdd,
    CapDrop,
    Dns,
    DnsSearch,
    DnsOption,
    AddHost,
    Device,
    SecurityOpt,
    Tmpfs,
    Ipc,
    Pid,
    Uts,
    Userns,
    CgroupParent,
    Runtime,
    LogDriver,
    LogOpt,
    Sysctl,
    GroupAdd,
    Init,
    Memory,
    MemorySwap,
    MemoryReservation,
    Cpus,
    CpuShares,
    CpuPeriod,
    CpuQuota,
    CpusetCpus,
    CpusetMems,
    PidsLimit,
    Ulimit,
    OomKillDisable,
    OomScoreAdj,
    ShmSize,

    // network
    Ip,
    Ip6,
    NetworkAlias,
    Link,
    MacAddress,
}

impl Flag {
    pub const ALL: &'static [Flag] = &[
        Flag::Name,
        Flag::Env,
        Flag::Label,
        Flag::Workdir,
        Flag::User,
        Flag::Hostname,
        Flag::Domainname,
        Flag::Entrypoint,
        Flag::Tty,
        Flag::Interactive,
        Flag::Attach,
        Flag::Detach,
        Flag::Expose,
        Flag::StopSignal,
        Flag::StopTimeout,
        Flag::Publish,
        Flag::PublishAll,
        Flag::Volume,
        Flag::Network,
        Flag::Restart,
        Flag::Rm,
        Flag::Privileged,
        Flag::ReadOnly,
        Flag::CapAdd,
        Flag::CapDrop,
        Flag::Dns,
        Flag::DnsSearch,
        Flag::DnsOption,
        Flag::AddHost,
        Flag::Device,
        Flag::SecurityOpt,
        Flag::Tmpfs,
        Flag::Ipc,
        Flag::Pid,
        Flag::Uts,
        Flag::Userns,
        Flag::CgroupParent,
        Flag::Runtime,
        Flag::LogDriver,
        Flag::LogOpt,
        Flag::Sysctl,
        Flag::GroupAdd,
        Flag::Init,
        Flag::Memory,
        Flag::MemorySwap,
        Flag::MemoryReservation,
        Flag::Cpus,
        Flag::CpuShares,
        Flag::CpuPeriod,
        Flag::CpuQuota,
        Flag::CpusetCpus,
        Flag::CpusetMems,
        Flag::PidsLimit,
        Flag::Ulimit,
        Flag::OomKillDisable,
        Flag::OomScoreAdj,
        Flag::ShmSize,
        Flag::Ip,
        Flag::Ip6,
        Flag::NetworkAlias,
        Flag::Link,
        Flag::MacAddress,
    ];

    /// Canonical long name, without the leading `--`.
    pub fn long(&self) -> &'static str {
        match self {
            Flag::Name => "name",
            Flag::Env => "env",
            Flag::Label => "label",
            Flag::Workdir => "workdir",
            Flag::User => "user",
            Flag::Hostname => "hostname",
            Flag::Domainname => "domainname",
            Flag::Entrypoint => "entrypoint",
            Flag::Tty => "tty",
            Flag::Interactive => "interactive",
            Flag::Attach => "attach",
            Flag::Detach => "detach",
            Flag::Expose => "expose",
            Flag::StopSignal => "stop-signal",
            Flag::StopTimeout => "stop-timeout",
            Flag::Publish => "publish",
            Flag::PublishAll => "publish-all",
            Flag::Volume => "volume",
            Flag::Network => "network",
            Flag::Restart => "restart",
            Flag::Rm => "rm",
            Flag::Privileged => "privileged",
            Flag::ReadOnly => "read-only",
            Flag::CapAdd => "cap-add",
            Flag::CapDrop => "cap-drop",
            Flag::Dns => "dns",
            Flag::DnsSearch => "dns-search",
            Flag::DnsOption => "dns-option",
            Flag::AddHost => "add-host",
            Flag::Device => "device",
            Flag::SecurityOpt => "security-opt",
            Flag::Tmpfs => "tmpfs",
            Flag::Ipc => "ipc",
            Flag::Pid => "pid",
            Flag::Uts => "uts",
            Flag::Userns => "userns",
            Flag::CgroupParent => "cgroup-parent",
            Flag::Runtime => "runtime",
            Flag::LogDriver => "log-driver",
            Flag::LogOpt => "log-opt",
            Flag::Sysctl => "sysctl",
            Flag::GroupAdd => "group-add",
            Flag::Init => "init",
            Flag::Memory => "memory",
            Flag::MemorySwap => "memory-swap",
            Flag::MemoryReservation => "memory-reservation",
            Flag::Cpus => "cpus",
            Flag::CpuShares => "cpu-shares",
            Flag::CpuPeriod => "cpu-period",
            Flag::CpuQuota => "cpu-quota",
            Flag::CpusetCpus => "cpuset-cpus",
            Flag::CpusetMems => "cpuset-mems",
            Flag::PidsLimit => "pids-limit",
            Flag::Ulimit => "ulimit",
            Flag::OomKillDisable => "oom-kill-disable",
            Flag::OomScoreAdj => "oom-score-adj",
            Flag::ShmSize => "shm-size",
            Flag::Ip => "ip",
            Flag::Ip6 => "ip6",
            Flag::NetworkAlias => "network-alias",
            Flag::Link => "link",
            Flag::MacAddress => "mac-address",
        }
    }

    /// Deprecated long spellings still accepted by `docker run`.
    fn long_aliases(&self) -> &'static [&'static str] {
        match self {
            Flag::Network => &["net"],
            Flag::NetworkAlias => &["net-alias"],
            Flag::DnsOption => &["dns-opt"],
            _ => &[],
        }
    }

    pub fn short(&self) -> Option<char> {
        match self {
            Flag::Env => Some('e'),
            Flag::Label => Some('l'),
            Flag::Workdir => Some('w'),
            Flag::User => Some('u'),
            Flag::Hostname => Some('h'),
            Flag::Tty => Some('t'),
            Flag::Interactive => Some('i'),
            Flag::Attach => Some('a'),
            Flag::Detach => Some('d'),
            Flag::Publish => Some('p'),
            Flag::PublishAll => Some('P'),
            Flag::Volume => Some('v'),
            Flag::Memory => Some('m'),
            Flag::CpuShares => Some('c'),
            _ => None,
        }
    }

    /// Boolean flags take no separate argument (`--rm`, `-it`, `--privileged=false`).
    pub fn is_bool(&self) -> bool {
        matches!(
            self,
            Flag::Tty
                | Flag::Interactive
                | Flag::Detach
                | Flag::PublishAll
                | Flag::Rm
                | Flag::Privileged
                | Flag::ReadOnly
                | Flag::Init
                | Flag::OomKillDisable
        )
    }

    /// Bundle whose mapping step consumes this flag.
    ///
    /// `--network` feeds all three (host network mode, endpoint key, `network_disabled`); it is
    /// listed under host.
    pub fn axis(&self) -> Axis {
        match self {
            Flag::Name
            | Flag::Env
            | Flag::Label
            | Flag::Workdir
            | Flag::User
            | Flag::Hostname
            | Flag::Domainname
            | Flag::Entrypoint
            | Flag::Tty
            | Flag::Interactive
            | Flag::Attach
            | Flag::Detach
            | Flag::Expose
            | Flag::StopSignal
            | Flag::StopTimeout => Axis::Container,
            Flag::Ip | Flag::Ip6 | Flag::NetworkAlias | Flag::Link | Flag::MacAddress => {
                Axis::Network
            }
            _ => Axis::Host,
        }
    }

    pub fn from_long(name: &str) -> Option<Flag> {
        Flag::ALL
            .iter()
            .copied()
            .find(|f| f.long() == name || f.long_aliases().contains(&name))
    }

    pub fn from_short(c: char) -> Option<Flag> {
        Flag::ALL.iter().copied().find(|f| f.short() == Some(c))
    }
}

/// Whether a flag consumes an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Switch,
    Value,
}

/// `docker run` options that have no field in the bundles.
///
/// The lexer steps over them (with their argument) instead of stopping, so the flags after them
/// still count.
const UNMAPPED_VALUES: &[&str] = &[
    "annotation",
    "blkio-weight",
    "blkio-weight-device",
    "cgroupns",
    "cidfile",
    "cpu-count",
    "cpu-percent",
    "cpu-rt-period",
    "cpu-rt-runtime",
    "detach-keys",
    "device-cgroup-rule",
    "device-read-bps",
    "device-read-iops",
    "device-write-bps",
    "device-write-iops",
    "env-file",
    "gpus",
    "health-cmd",
    "health-interval",
    "health-retries",
    "health-start-interval",
    "health-start-period",
    "health-timeout",
    "io-maxbandwidth",
    "io-maxiops",
    "isolation",
    "kernel-memory",
    "label-file",
    "link-local-ip",
    "memory-swappiness",
    "mount",
    "platform",
    "pull",
    "storage-opt",
    "volume-driver",
    "volumes-from",
];

const UNMAPPED_SWITCHES: &[&str] =
    &["disable-content-trust", "no-healthcheck", "quiet", "sig-proxy"];

/// Arity of a known but unmapped long option.
pub fn unmapped_long(name: &str) -> Option<Arity> {
    if UNMAPPED_VALUES.contains(&name) {
        Some(Arity::Value)
    } else if UNMAPPED_SWITCHES.contains(&name) {
        Some(Arity::Switch)
    } else {
        None
    }
}

/// Arity of a known but unmapped shorthand (`-q`).
pub fn unmapped_short(c: char) -> Option<Arity> {
    (c == 'q').then_some(Arity::Switch)
}
