//! SNMP transport error types.

use thiserror::Error;

/// Errors raised by the SNMP transport.
///
/// None of these abort a collection cycle: the join engine logs them and the
/// affected table simply yields no rows.
#[derive(Debug, Error)]
pub enum SnmpError {
    /// OID text could not be parsed into numeric components.
    #[error("invalid oid '{0}'")]
    InvalidOid(String),

    /// Session could not be opened (socket bind, v3 engine discovery).
    #[error("failed to open session to {target}: {reason}")]
    Connect { target: String, reason: String },

    /// Request failed at the protocol level.
    #[error("request to {target} failed: {reason}")]
    Request { target: String, reason: String },

    /// No response within the per-request timeout after all retries.
    #[error("request to {target} timed out after {attempts} attempt(s)")]
    Timeout { target: String, attempts: u32 },

    /// Agent answered with a non-zero error-status.
    #[error("agent {target} returned error status {status}")]
    Status { target: String, status: u32 },
}

/// SNMPv1 `noSuchName` error-status.
const NO_SUCH_NAME: u32 = 2;

impl SnmpError {
    /// A v1 agent answering GETNEXT past the last object reports
    /// `noSuchName` instead of an end-of-MIB value.
    pub fn is_end_of_mib(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == NO_SUCH_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_such_name_ends_walk() {
        let end = SnmpError::Status {
            target: "10.0.0.1:161".to_string(),
            status: 2,
        };
        assert!(end.is_end_of_mib());

        let too_big = SnmpError::Status {
            target: "10.0.0.1:161".to_string(),
            status: 1,
        };
        assert!(!too_big.is_end_of_mib());

        let timeout = SnmpError::Timeout {
            target: "10.0.0.1:161".to_string(),
            attempts: 2,
        };
        assert!(!timeout.is_end_of_mib());
    }
}
