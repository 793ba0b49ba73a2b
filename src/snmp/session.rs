//! `snmp2`-backed transport.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use snmp2::{AsyncSession, Oid, Value, v3};

use crate::config::{AuthProtocol, HostConfig, PrivProtocol, SecurityLevel, SnmpConfig, SnmpVersion};

use super::index::{format_oid, parse_oid};
use super::{Connector, Pdu, SnmpError, SnmpValue, WalkClient};

/// Initial request id for new sessions.
const REQUEST_ID_SEED: i32 = 1;

/// Production connector opening one UDP session per host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnmpConnector;

#[async_trait::async_trait]
impl Connector for SnmpConnector {
    async fn connect(&self, host: &HostConfig) -> Result<Box<dyn WalkClient>, SnmpError> {
        let session = SnmpSession::open(host).await?;
        Ok(Box::new(session))
    }
}

#[derive(Clone, Copy)]
enum Request<'a> {
    Get(&'a Oid<'static>),
    Next(&'a Oid<'static>),
    Bulk(&'a Oid<'static>, u32),
}

/// Varbinds of one response; `None` marks an SNMP exception value
/// (noSuchObject, noSuchInstance, endOfMibView).
type Varbinds = Vec<(Vec<u64>, Option<SnmpValue>)>;

/// One open SNMP session with its timeout/retry policy.
pub struct SnmpSession {
    session: AsyncSession,
    target: String,
    timeout: Duration,
    retries: u32,
    max_repetitions: u32,
    bulk_capable: bool,
}

impl std::fmt::Debug for SnmpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnmpSession")
            .field("target", &self.target)
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}

impl SnmpSession {
    /// Open a session for `host`, running USM engine discovery for v3.
    pub async fn open(host: &HostConfig) -> Result<Self, SnmpError> {
        let snmp = &host.snmp;
        let addr = SocketAddr::new(host.ip, snmp.port);
        let target = addr.to_string();
        let connect_error = |reason: String| SnmpError::Connect {
            target: target.clone(),
            reason,
        };

        let session = match snmp.version {
            SnmpVersion::V1 => {
                AsyncSession::new_v1(addr, snmp.community.as_bytes(), REQUEST_ID_SEED)
                    .await
                    .map_err(|e| connect_error(e.to_string()))?
            }
            SnmpVersion::V2c => {
                AsyncSession::new_v2c(addr, snmp.community.as_bytes(), REQUEST_ID_SEED)
                    .await
                    .map_err(|e| connect_error(e.to_string()))?
            }
            SnmpVersion::V3 => {
                let mut session = AsyncSession::new_v3(addr, REQUEST_ID_SEED, security(snmp))
                    .await
                    .map_err(|e| connect_error(e.to_string()))?;
                match tokio::time::timeout(snmp.timeout, session.init()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => return Err(connect_error(format!("engine discovery: {e:?}"))),
                    Err(_) => return Err(connect_error("engine discovery timed out".into())),
                }
                session
            }
        };

        Ok(Self {
            session,
            target,
            timeout: snmp.timeout,
            retries: snmp.retries,
            max_repetitions: snmp.max_repetitions.max(1),
            bulk_capable: snmp.version != SnmpVersion::V1,
        })
    }

    async fn send(&mut self, request: Request<'_>) -> Result<Varbinds, SnmpError> {
        let attempts = self.retries + 1;
        for attempt in 1..=attempts {
            let session = &mut self.session;
            let call = async move {
                let pdu = match request {
                    Request::Get(oid) => session.get(oid).await?,
                    Request::Next(oid) => session.getnext(oid).await?,
                    Request::Bulk(oid, max) => session.getbulk(&[oid], 0, max).await?,
                };
                let status = pdu.error_status;
                let varbinds = pdu
                    .varbinds
                    .map(|(oid, value)| (oid.to_string(), convert(value)))
                    .collect::<Vec<_>>();
                Ok::<_, snmp2::Error>((status, varbinds))
            };

            match tokio::time::timeout(self.timeout, call).await {
                Ok(Ok((0, varbinds))) => {
                    return varbinds
                        .into_iter()
                        .map(|(oid, value)| Ok((parse_oid(&oid)?, value)))
                        .collect();
                }
                Ok(Ok((status, _))) => {
                    return Err(SnmpError::Status {
                        target: self.target.clone(),
                        status,
                    });
                }
                Ok(Err(e)) => {
                    return Err(SnmpError::Request {
                        target: self.target.clone(),
                        reason: format!("{e:?}"),
                    });
                }
                Err(_) => {
                    tracing::debug!(host = %self.target, attempt, attempts, "SNMP request timed out");
                }
            }
        }

        Err(SnmpError::Timeout {
            target: self.target.clone(),
            attempts,
        })
    }
}

#[async_trait::async_trait]
impl WalkClient for SnmpSession {
    fn target(&self) -> &str {
        &self.target
    }

    async fn get(&mut self, oids: &[&str]) -> Result<Vec<Pdu>, SnmpError> {
        let mut out = Vec::with_capacity(oids.len());
        for oid in oids {
            let oid = to_snmp_oid(&parse_oid(oid)?)?;
            for (name, value) in self.send(Request::Get(&oid)).await? {
                if let Some(value) = value {
                    out.push(Pdu::new(format_oid(&name), value));
                }
            }
        }
        Ok(out)
    }

    async fn walk(&mut self, oid: &str, bulk: bool) -> Result<Vec<Pdu>, SnmpError> {
        let root = parse_oid(oid)?;
        let bulk = bulk && self.bulk_capable;
        let mut cursor = root.clone();
        let mut rows = Vec::new();

        'walk: loop {
            let start = to_snmp_oid(&cursor)?;
            let request = if bulk {
                Request::Bulk(&start, self.max_repetitions)
            } else {
                Request::Next(&start)
            };
            let varbinds = match self.send(request).await {
                Ok(varbinds) => varbinds,
                Err(e) if !bulk && e.is_end_of_mib() => break,
                Err(e) => return Err(e),
            };
            if varbinds.is_empty() {
                break;
            }
            for (name, value) in varbinds {
                let Some(value) = value else { break 'walk };
                if !name.starts_with(&root) || name <= cursor {
                    break 'walk;
                }
                rows.push(Pdu {
                    oid: format_oid(&name),
                    value,
                });
                cursor = name;
            }
        }

        // A walk rooted at a scalar instance returns nothing; fall back to GET.
        if rows.is_empty() {
            let leaf = to_snmp_oid(&root)?;
            if let Ok(varbinds) = self.send(Request::Get(&leaf)).await {
                rows.extend(
                    varbinds
                        .into_iter()
                        .filter(|(name, _)| *name == root)
                        .filter_map(|(name, value)| {
                            value.map(|value| Pdu {
                                oid: format_oid(&name),
                                value,
                            })
                        })
                        .filter(|pdu| pdu.value != SnmpValue::Null),
                );
            }
        }

        Ok(rows)
    }
}

fn to_snmp_oid(parts: &[u64]) -> Result<Oid<'static>, SnmpError> {
    Oid::from(parts).map_err(|_| SnmpError::InvalidOid(format_oid(parts)))
}

fn convert(value: Value<'_>) -> Option<SnmpValue> {
    let converted = match value {
        Value::Integer(v) => SnmpValue::Integer(v),
        Value::Counter32(v) | Value::Unsigned32(v) | Value::Timeticks(v) => SnmpValue::Unsigned(v),
        Value::Counter64(v) => SnmpValue::Counter64(v),
        Value::OctetString(bytes) | Value::Opaque(bytes) => SnmpValue::OctetString(bytes.to_vec()),
        Value::IpAddress(octets) => {
            SnmpValue::OctetString(Ipv4Addr::from(octets).to_string().into_bytes())
        }
        Value::ObjectIdentifier(oid) => SnmpValue::OctetString(oid.to_string().into_bytes()),
        Value::Boolean(b) => SnmpValue::Integer(i64::from(b)),
        Value::EndOfMibView | Value::NoSuchObject | Value::NoSuchInstance => return None,
        _ => SnmpValue::Null,
    };
    Some(converted)
}

fn security(snmp: &SnmpConfig) -> v3::Security {
    let security = v3::Security::new(snmp.username.as_bytes(), snmp.auth_password.as_bytes())
        .with_auth_protocol(auth_protocol(snmp.auth_protocol));
    match snmp.security_level {
        SecurityLevel::NoAuthNoPriv => security.with_auth(v3::Auth::NoAuthNoPriv),
        SecurityLevel::AuthNoPriv => security.with_auth(v3::Auth::AuthNoPriv),
        SecurityLevel::AuthPriv => security.with_auth(v3::Auth::AuthPriv {
            cipher: cipher(snmp.priv_protocol),
            privacy_password: snmp.priv_password.as_bytes().to_vec(),
        }),
    }
}

fn auth_protocol(protocol: AuthProtocol) -> v3::AuthProtocol {
    match protocol {
        AuthProtocol::Md5 => v3::AuthProtocol::Md5,
        AuthProtocol::Sha => v3::AuthProtocol::Sha1,
        AuthProtocol::Sha224 => v3::AuthProtocol::Sha224,
        AuthProtocol::Sha256 => v3::AuthProtocol::Sha256,
        AuthProtocol::Sha384 => v3::AuthProtocol::Sha384,
        AuthProtocol::Sha512 => v3::AuthProtocol::Sha512,
    }
}

fn cipher(protocol: PrivProtocol) -> v3::Cipher {
    match protocol {
        PrivProtocol::Des => v3::Cipher::Des,
        PrivProtocol::Aes => v3::Cipher::Aes128,
        PrivProtocol::Aes192 => v3::Cipher::Aes192,
        PrivProtocol::Aes256 => v3::Cipher::Aes256,
    }
}
