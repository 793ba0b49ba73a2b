//! Host inventory configuration.

use std::collections::HashSet;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::devices::Features;

use super::validation::{ConfigError, expand_env_vars, seconds_or_humantime};

/// Default SNMP port.
pub const DEFAULT_SNMP_PORT: u16 = 161;

/// Default per-request SNMP timeout (5 seconds).
pub const DEFAULT_SNMP_TIMEOUT: Duration = Duration::from_secs(5);

/// Default SNMP retries after the first attempt.
pub const DEFAULT_SNMP_RETRIES: u32 = 1;

/// Default GETBULK max-repetitions.
pub const DEFAULT_MAX_REPETITIONS: u32 = 25;

fn default_device_type() -> String {
    "generic".to_string()
}

fn default_community() -> String {
    "public".to_string()
}

fn default_port() -> u16 {
    DEFAULT_SNMP_PORT
}

fn default_snmp_timeout() -> Duration {
    DEFAULT_SNMP_TIMEOUT
}

fn default_retries() -> u32 {
    DEFAULT_SNMP_RETRIES
}

fn default_max_repetitions() -> u32 {
    DEFAULT_MAX_REPETITIONS
}

// =============================================================================
// SNMP Parameters
// =============================================================================

/// SNMP protocol version, written as `1`, `2` or `3` in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "u8")]
pub enum SnmpVersion {
    V1,
    #[default]
    V2c,
    V3,
}

impl TryFrom<u8> for SnmpVersion {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2c),
            3 => Ok(Self::V3),
            other => Err(format!("unsupported SNMP version {other}, expected 1, 2 or 3")),
        }
    }
}

/// SNMPv3 USM security level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(try_from = "String")]
#[strum(ascii_case_insensitive)]
pub enum SecurityLevel {
    #[default]
    NoAuthNoPriv,
    AuthNoPriv,
    AuthPriv,
}

/// SNMPv3 authentication protocol.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(try_from = "String")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum AuthProtocol {
    Md5,
    #[default]
    #[strum(to_string = "SHA", serialize = "SHA1")]
    Sha,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

/// SNMPv3 privacy protocol.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(try_from = "String")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum PrivProtocol {
    Des,
    #[default]
    #[strum(to_string = "AES", serialize = "AES128")]
    Aes,
    Aes192,
    Aes256,
}

macro_rules! try_from_string {
    ($($ty:ty),*) => {$(
        impl TryFrom<String> for $ty {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value
                    .parse()
                    .map_err(|_| format!("unknown {} '{}'", stringify!($ty), value))
            }
        }
    )*};
}

try_from_string!(SecurityLevel, AuthProtocol, PrivProtocol);

/// Per-host SNMP session parameters.
#[derive(Clone, Deserialize)]
pub struct SnmpConfig {
    /// Protocol version (default: 2).
    #[serde(default)]
    pub version: SnmpVersion,

    /// Community string for v1/v2c (default: "public").
    #[serde(default = "default_community")]
    pub community: String,

    /// UDP port (default: 161).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request timeout (default: 5s, bare integers are seconds).
    #[serde(
        default = "default_snmp_timeout",
        deserialize_with = "seconds_or_humantime"
    )]
    pub timeout: Duration,

    /// Retries after the first attempt (default: 1).
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// GETBULK max-repetitions (default: 25).
    #[serde(default = "default_max_repetitions")]
    pub max_repetitions: u32,

    /// SNMPv3 security level.
    #[serde(default)]
    pub security_level: SecurityLevel,

    /// SNMPv3 user name.
    #[serde(default)]
    pub username: String,

    /// SNMPv3 authentication protocol.
    #[serde(default)]
    pub auth_protocol: AuthProtocol,

    /// SNMPv3 authentication passphrase, `${VAR}` expanded.
    #[serde(default)]
    pub auth_password: String,

    /// SNMPv3 privacy protocol.
    #[serde(default)]
    pub priv_protocol: PrivProtocol,

    /// SNMPv3 privacy passphrase, `${VAR}` expanded.
    #[serde(default)]
    pub priv_password: String,
}

impl Default for SnmpConfig {
    fn default() -> Self {
        Self {
            version: SnmpVersion::default(),
            community: default_community(),
            port: DEFAULT_SNMP_PORT,
            timeout: DEFAULT_SNMP_TIMEOUT,
            retries: DEFAULT_SNMP_RETRIES,
            max_repetitions: DEFAULT_MAX_REPETITIONS,
            security_level: SecurityLevel::default(),
            username: String::new(),
            auth_protocol: AuthProtocol::default(),
            auth_password: String::new(),
            priv_protocol: PrivProtocol::default(),
            priv_password: String::new(),
        }
    }
}

impl std::fmt::Debug for SnmpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnmpConfig")
            .field("version", &self.version)
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .field("security_level", &self.security_level)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl SnmpConfig {
    /// Worst-case time one request can block: `timeout * (retries + 1)`.
    pub fn request_budget(&self) -> Duration {
        self.timeout.saturating_mul(self.retries.saturating_add(1))
    }

    fn expand_secrets(&mut self) {
        self.community = expand_env_vars(&self.community);
        self.auth_password = expand_env_vars(&self.auth_password);
        self.priv_password = expand_env_vars(&self.priv_password);
    }

    fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("snmp port must be non-zero".to_string());
        }
        if self.timeout.is_zero() {
            return Err("snmp timeout must be positive".to_string());
        }
        if self.version == SnmpVersion::V3 {
            if self.username.is_empty() {
                return Err("snmp v3 requires a username".to_string());
            }
            if self.security_level != SecurityLevel::NoAuthNoPriv && self.auth_password.is_empty()
            {
                return Err(format!(
                    "snmp v3 security level {} requires auth_password",
                    self.security_level
                ));
            }
            if self.security_level == SecurityLevel::AuthPriv && self.priv_password.is_empty() {
                return Err("snmp v3 security level AuthPriv requires priv_password".to_string());
            }
        }
        Ok(())
    }
}

// =============================================================================
// Host Configuration
// =============================================================================

/// One polled device.
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    /// Management address.
    pub ip: IpAddr,

    /// Vendor type tag, matched case-insensitively (default: "generic").
    #[serde(rename = "type", default = "default_device_type")]
    pub device_type: String,

    /// SNMP session parameters.
    #[serde(default)]
    pub snmp: SnmpConfig,

    /// Enabled feature collectors.
    #[serde(default)]
    pub features: Features,
}

impl HostConfig {
    /// Create a host with default SNMP parameters and no features.
    pub fn new(ip: IpAddr, device_type: impl Into<String>) -> Self {
        Self {
            ip,
            device_type: device_type.into(),
            snmp: SnmpConfig::default(),
            features: Features::default(),
        }
    }

    /// Set enabled features.
    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    /// Set SNMP parameters.
    pub fn with_snmp(mut self, snmp: SnmpConfig) -> Self {
        self.snmp = snmp;
        self
    }

    pub(crate) fn expand_secrets(&mut self) {
        self.snmp.expand_secrets();
    }

    /// Validate this host's parameters.
    pub fn validate(&self) -> Result<(), String> {
        self.snmp.validate()
    }
}

/// A file holding nothing but a host list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostsFile {
    #[serde(default)]
    pub hosts: Vec<HostConfig>,
}

impl HostsFile {
    /// Load hosts from a YAML file, or from every YAML file in a directory.
    ///
    /// Directory entries are read in file-name order.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::ValidationError(format!(
                "hosts path '{}' does not exist",
                path.display()
            )));
        }
        if path.is_file() {
            return Self::load_file(path);
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry_path = entry?.path();
            if !entry_path.is_file() {
                continue;
            }
            let ext = entry_path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext == "yaml" || ext == "yml" {
                files.push(entry_path);
            }
        }
        files.sort();

        let mut merged = Self::default();
        for file in files {
            merged.hosts.extend(Self::load_file(&file)?.hosts);
        }
        Ok(merged)
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!("Loading hosts from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ValidationError(format!("failed to parse '{}': {}", path.display(), e))
        })
    }
}

/// Validate a host list: per-host parameters and unique addresses.
pub(crate) fn validate_hosts(hosts: &[HostConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for host in hosts {
        if !seen.insert(host.ip) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate host: '{}'",
                host.ip
            )));
        }
        host.validate()
            .map_err(|e| ConfigError::ValidationError(format!("host '{}': {}", host.ip, e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::Feature;

    #[test]
    fn test_host_defaults() {
        let host: HostConfig = serde_yaml::from_str("ip: 10.0.0.1").unwrap();
        assert_eq!(host.device_type, "generic");
        assert_eq!(host.snmp.version, SnmpVersion::V2c);
        assert_eq!(host.snmp.port, 161);
        assert_eq!(host.snmp.community, "public");
        assert!(host.features.enabled().next().is_none());
    }

    #[test]
    fn test_host_full_v3() {
        let yaml = r#"
ip: 10.0.0.2
type: Cisco-IOS-XR
snmp:
  version: 3
  timeout: 2
  retries: 0
  security_level: authpriv
  username: monitor
  auth_protocol: sha256
  auth_password: secret
  priv_protocol: aes
  priv_password: hidden
features:
  uptime: true
  bgp_peers: true
"#;
        let host: HostConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(host.snmp.version, SnmpVersion::V3);
        assert_eq!(host.snmp.timeout, Duration::from_secs(2));
        assert_eq!(host.snmp.security_level, SecurityLevel::AuthPriv);
        assert_eq!(host.snmp.auth_protocol, AuthProtocol::Sha256);
        assert_eq!(host.snmp.priv_protocol, PrivProtocol::Aes);
        assert!(host.features.is_enabled(Feature::BgpPeers));
        assert!(host.validate().is_ok());
    }

    #[test]
    fn test_invalid_version_rejected() {
        let result: Result<HostConfig, _> = serde_yaml::from_str("ip: 10.0.0.1\nsnmp: {version: 4}");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_ip_rejected() {
        let result: Result<HostConfig, _> = serde_yaml::from_str("ip: not-an-ip");
        assert!(result.is_err());
    }

    #[test]
    fn test_v3_requires_username() {
        let mut host = HostConfig::new("10.0.0.1".parse().unwrap(), "generic");
        host.snmp.version = SnmpVersion::V3;
        let err = host.validate().unwrap_err();
        assert!(err.contains("username"));
    }

    #[test]
    fn test_auth_protocol_parse_aliases() {
        assert_eq!("sha".parse::<AuthProtocol>().unwrap(), AuthProtocol::Sha);
        assert_eq!("SHA1".parse::<AuthProtocol>().unwrap(), AuthProtocol::Sha);
        assert_eq!("md5".parse::<AuthProtocol>().unwrap(), AuthProtocol::Md5);
        assert!("blake".parse::<AuthProtocol>().is_err());
    }

    #[test]
    fn test_duplicate_hosts_rejected() {
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        let hosts = vec![HostConfig::new(ip, "generic"), HostConfig::new(ip, "mrv")];
        let err = validate_hosts(&hosts).unwrap_err();
        assert!(err.to_string().contains("duplicate host"));
    }

    #[test]
    fn test_request_budget() {
        let snmp = SnmpConfig {
            timeout: Duration::from_secs(3),
            retries: 2,
            ..SnmpConfig::default()
        };
        assert_eq!(snmp.request_budget(), Duration::from_secs(9));
    }

    #[test]
    fn test_hosts_file_load_dir_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.yaml"), "hosts:\n  - ip: 10.0.0.2\n").unwrap();
        std::fs::write(dir.path().join("a.yml"), "hosts:\n  - ip: 10.0.0.1\n").unwrap();
        std::fs::write(dir.path().join("ignored.txt"), "hosts: []\n").unwrap();

        let file = HostsFile::load(dir.path()).unwrap();
        let ips: Vec<String> = file.hosts.iter().map(|h| h.ip.to_string()).collect();
        assert_eq!(ips, vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn test_hosts_file_missing_path() {
        let result = HostsFile::load("/nonexistent/netfetch/hosts");
        assert!(result.is_err());
    }
}
