use orch_model::{ConfigBundle, ContainerConfig, HostConfig, NetworkingConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Axis, TranslateError, lex, map_container, map_host, map_network};

/// How many leading parameters are a command prefix rather than flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrefixRule {
    /// Skip every leading token that does not start with `-` (`docker`, `run`, ...).
    Words,
    /// Skip exactly this many tokens.
    Fixed(usize),
}

impl Default for PrefixRule {
    fn default() -> Self {
        PrefixRule::Words
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslatorConfig {
    pub prefix: PrefixRule,
}

/// Per-bundle translation results.
///
/// A failure on one axis leaves the other two untouched.
#[derive(Debug, Clone)]
pub struct Translation {
    pub container: Result<ContainerConfig, TranslateError>,
    pub host: Result<HostConfig, TranslateError>,
    pub network: Result<NetworkingConfig, TranslateError>,
    /// Image reference taken from the last parameter.
    pub image: String,
    /// Recognised options that no bundle carries; they were stepped over.
    pub skipped: Vec<String>,
    /// Set when lexing stopped before the end of the flags.
    pub stopped: Option<TranslateError>,
}

impl Translation {
    /// `true` when all flags were read and every bundle mapped.
    pub fn is_complete(&self) -> bool {
        self.stopped.is_none()
            && self.container.is_ok()
            && self.host.is_ok()
            && self.network.is_ok()
    }

    /// Axes whose mapping failed.
    pub fn failed_axes(&self) -> Vec<Axis> {
        let mut out = Vec::new();
        if self.container.is_err() {
            out.push(Axis::Container);
        }
        if self.host.is_err() {
            out.push(Axis::Host);
        }
        if self.network.is_err() {
            out.push(Axis::Network);
        }
        out
    }

    /// Collapse into a bundle, substituting the empty value for each failed axis.
    ///
    /// The image is always pinned to the request's last parameter, whatever the flags said.
    /// A request without flags does not produce the empty bundle: its container config carries
    /// the `docker run` defaults (stdout and stderr attached). Only a failed axis is empty.
    pub fn into_bundle(self) -> ConfigBundle {
        let mut container = settle(Axis::Container, self.container);
        container.image = self.image;

        ConfigBundle {
            container,
            host: settle(Axis::Host, self.host),
            network: settle(Axis::Network, self.network),
        }
    }
}

fn settle<T: Default>(axis: Axis, res: Result<T, TranslateError>) -> T {
    res.unwrap_or_else(|e| {
        warn!(
            target: "orch.translate",
            %axis,
            error = %e,
            "configuration parsing error; using empty bundle"
        );
        T::default()
    })
}

/// Maps invocation parameters into a [`ConfigBundle`].
#[derive(Debug, Clone, Default)]
pub struct Translator {
    cfg: TranslatorConfig,
}

impl Translator {
    pub fn new(cfg: TranslatorConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.cfg
    }

    /// Flags between the command prefix and the trailing image reference.
    pub fn flag_args<'a>(&self, parameters: &'a [String]) -> &'a [String] {
        match parameters.split_last() {
            Some((_, leading)) => self.strip_prefix(leading),
            None => &[],
        }
    }

    fn strip_prefix<'a>(&self, leading: &'a [String]) -> &'a [String] {
        let skip = match self.cfg.prefix {
            PrefixRule::Words => leading
                .iter()
                .position(|p| p.starts_with('-'))
                .unwrap_or(leading.len()),
            PrefixRule::Fixed(n) => n.min(leading.len()),
        };
        &leading[skip..]
    }

    /// Translate the full parameter list (prefix, flags, image).
    pub fn translate(&self, parameters: &[String]) -> Translation {
        match parameters.split_last() {
            Some((image, leading)) => self.translate_parts(leading, image),
            None => self.translate_parts(&[], ""),
        }
    }

    /// Translate a request already split into its leading parameters and image reference.
    pub fn translate_parts(&self, leading: &[String], image: &str) -> Translation {
        let flags = self.strip_prefix(leading);

        let lexed = lex(flags);
        if let Some(e) = &lexed.stopped {
            warn!(
                target: "orch.translate",
                error = %e,
                parsed = lexed.options.len(),
                "flag parsing stopped early"
            );
        }
        if !lexed.skipped.is_empty() {
            warn!(
                target: "orch.translate",
                skipped = ?lexed.skipped,
                "options without a configuration field ignored"
            );
        }
        debug!(
            target: "orch.translate",
            flags = flags.len(),
            parsed = lexed.options.len(),
            image,
            "flags parsed"
        );

        let opts = &lexed.options;
        Translation {
            container: map_container(opts),
            host: map_host(opts),
            network: map_network(opts),
            image: image.to_string(),
            skipped: lexed.skipped,
            stopped: lexed.stopped,
        }
    }

    /// [`translate`](Self::translate) followed by [`Translation::into_bundle`].
    pub fn bundle(&self, parameters: &[String]) -> ConfigBundle {
        self.translate(parameters).into_bundle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn run_with_env() {
        let bundle =
            Translator::default().bundle(&params(&["run", "-e", "FOO=bar", "myimage:latest"]));
        assert_eq!(bundle.container.image, "myimage:latest");
        assert_eq!(bundle.container.env.get("FOO"), Some("bar"));
        assert!(bundle.host.port_bindings.is_empty());
        assert!(bundle.network.is_empty());
    }

    #[test]
    fn word_prefix_skips_command_words() {
        let t = Translator::default();
        let p = params(&["docker", "run", "--rm", "-p", "80:80", "nginx"]);
        assert_eq!(t.flag_args(&p), &p[2..5]);

        let only_words = params(&["docker", "run", "nginx"]);
        assert!(t.flag_args(&only_words).is_empty());
    }

    #[test]
    fn fixed_prefix() {
        let t = Translator::new(TranslatorConfig {
            prefix: PrefixRule::Fixed(2),
        });
        let p = params(&["docker", "run", "-e", "A=1", "alpine"]);
        assert_eq!(t.flag_args(&p), &p[2..4]);

        let short = params(&["alpine"]);
        assert!(t.flag_args(&short).is_empty());
    }

    #[test]
    fn image_is_pinned_to_last_parameter() {
        let bundle = Translator::default().bundle(&params(&[
            "run", "--name", "other:tag", "-l", "image=evil:latest", "good:1.0",
        ]));
        assert_eq!(bundle.container.image, "good:1.0");
        assert_eq!(bundle.container.name.as_deref(), Some("other:tag"));
    }

    #[test]
    fn bad_network_flags_leave_other_bundles_intact() {
        let t = Translator::default();
        let translation = t.translate(&params(&[
            "run", "-e", "FOO=bar", "-p", "8080:80", "--ip", "not-an-ip", "app:1",
        ]));

        assert!(translation.container.is_ok());
        assert!(translation.host.is_ok());
        assert!(translation.network.is_err());
        assert_eq!(translation.failed_axes(), vec![Axis::Network]);
        assert!(!translation.is_complete());

        let bundle = translation.into_bundle();
        assert_eq!(bundle.container.env.get("FOO"), Some("bar"));
        assert_eq!(bundle.host.port_bindings[0].host_port, Some(8080));
        assert!(bundle.network.is_empty());
    }

    #[test]
    fn bad_container_flags_still_pin_image() {
        let translation = Translator::default().translate(&params(&[
            "run", "-w", "relative", "-p", "80:80", "app:1",
        ]));
        assert_eq!(translation.failed_axes(), vec![Axis::Container]);

        let bundle = translation.into_bundle();
        assert_eq!(bundle.container.image, "app:1");
        assert!(bundle.container.env.is_empty());
        assert_eq!(bundle.host.port_bindings.len(), 1);
    }

    #[test]
    fn unknown_flag_keeps_earlier_flags() {
        let translation = Translator::default().translate(&params(&[
            "run", "-e", "A=1", "--frobnicate", "all", "-e", "B=2", "cuda:12",
        ]));
        assert!(matches!(translation.stopped, Some(TranslateError::UnknownFlag(_))));

        let bundle = translation.into_bundle();
        assert_eq!(bundle.container.env.get("A"), Some("1"));
        assert_eq!(bundle.container.env.get("B"), None);
    }

    #[test]
    fn empty_parameters() {
        let translation = Translator::default().translate(&[]);
        assert!(translation.is_complete());

        let bundle = translation.into_bundle();
        assert!(bundle.image().is_empty());
        assert!(bundle.container.attach_stdout && bundle.container.attach_stderr);
        assert!(!bundle.container.attach_stdin);
        assert_ne!(bundle, ConfigBundle::default());
        assert!(bundle.host.is_empty());
        assert!(bundle.network.is_empty());
    }

    #[test]
    fn unmapped_docker_options_keep_later_flags() {
        for (flag, value) in [
            ("--log-driver", "syslog"),
            ("--ulimit", "nofile=1024"),
            ("--security-opt", "seccomp=unconfined"),
            ("--tmpfs", "/run"),
            ("--cpu-quota", "50000"),
            ("--ipc", "host"),
            ("--gpus", "all"),
            ("--health-cmd", "true"),
            ("--env-file", "/etc/app.env"),
        ] {
            let translation = Translator::default().translate(&params(&[
                "docker", "run", flag, value, "-e", "A=1", "-p", "80:80", "img:1",
            ]));
            assert!(translation.stopped.is_none(), "{flag}: {:?}", translation.stopped);
            assert!(translation.is_complete(), "{flag}: {:?}", translation.failed_axes());

            let bundle = translation.into_bundle();
            assert_eq!(bundle.container.env.get("A"), Some("1"), "{flag}");
            assert_eq!(bundle.host.port_bindings.len(), 1, "{flag}");
        }
    }

    #[test]
    fn skipped_options_are_reported() {
        let translation = Translator::default().translate(&params(&[
            "run", "--gpus", "all", "--no-healthcheck", "--rm", "img:1",
        ]));
        assert_eq!(translation.skipped, vec!["--gpus", "--no-healthcheck"]);
        assert!(translation.is_complete());
        assert!(translation.into_bundle().host.auto_remove);
    }

    #[test]
    fn split_request_translates_like_the_full_list() {
        let t = Translator::default();
        let full = params(&["run", "-e", "A=1", "app:1"]);
        let (image, leading) = full.split_last().unwrap();
        assert_eq!(
            t.translate_parts(leading, image).into_bundle(),
            t.bundle(&full)
        );
    }

    #[test]
    fn full_invocation_round_trip() {
        let bundle = Translator::default().bundle(&params(&[
            "docker", "run", "--rm", "-e", "MODE=edge", "-p", "127.0.0.1:9090:90",
            "-v", "/var/data:/data", "--network", "edgenet", "--ip", "10.1.0.9", "-m", "128m",
            "registry.local/svc@sha256:abcd",
        ]));

        assert_eq!(bundle.image(), "registry.local/svc@sha256:abcd");
        assert_eq!(bundle.container.env.get("MODE"), Some("edge"));
        assert!(bundle.host.auto_remove);
        assert_eq!(bundle.host.port_bindings[0].host_ip.as_deref(), Some("127.0.0.1"));
        assert_eq!(bundle.host.binds[0].target, "/data");
        assert_eq!(bundle.host.network_mode.as_deref(), Some("edgenet"));
        assert_eq!(bundle.host.resources.memory, Some(128 * 1024 * 1024));
        assert_eq!(
            bundle.network.endpoint("edgenet").and_then(|e| e.ipv4_address),
            Some("10.1.0.9".parse().unwrap())
        );
    }

    #[test]
    fn config_deserializes() {
        let cfg: TranslatorConfig = serde_json::from_str(r#"{"prefix":{"fixed":2}}"#).unwrap();
        assert_eq!(cfg.prefix, PrefixRule::Fixed(2));
        let cfg: TranslatorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.prefix, PrefixRule::Words);
    }
}
