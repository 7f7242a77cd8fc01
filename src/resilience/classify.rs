//! Failure classification.
//!
//! # Responsibilities
//! - Decide whether a remote failure is transient (retry) or permanent (fail fast)
//! - Map well-known status codes to operator-facing guidance
//!
//! # Design Decisions
//! - Status code membership is checked before message sniffing
//! - Message matching is lower-cased substring search, transport errors only
//! - Unknown failures are permanent; retrying them burns the attempt budget

use crate::resilience::types::{ErrorKind, RemoteError};

/// Status codes the remote network reports for conditions that clear up on
/// their own: throttling, consensus lag, node restarts, pending funding, and
/// receipts/records that have not landed yet.
pub const RETRYABLE_STATUS_CODES: [&str; 7] = [
    "BUSY",
    "PLATFORM_TRANSACTION_NOT_CREATED",
    "PLATFORM_NOT_ACTIVE",
    "INSUFFICIENT_PAYER_BALANCE",
    "TRANSACTION_EXPIRED",
    "RECEIPT_NOT_FOUND",
    "RECORD_NOT_FOUND",
];

/// Lower-case markers of transport-level failures in error messages that
/// carry no status code.
const TRANSIENT_MESSAGE_MARKERS: [&str; 10] = [
    "timeout",
    "timed out",
    "connection reset",
    "connection refused",
    "econnreset",
    "econnrefused",
    "socket closed",
    "socket hang up",
    "getaddrinfo",
    "name resolution",
];

/// Classify a remote failure. Pure function, safe to call concurrently.
pub fn classify(error: &RemoteError) -> ErrorKind {
    if let Some(status) = &error.status {
        if RETRYABLE_STATUS_CODES.contains(&status.as_str()) {
            return ErrorKind::Transient;
        }
        return ErrorKind::Permanent;
    }

    let message = error.message.to_lowercase();
    if TRANSIENT_MESSAGE_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
    {
        return ErrorKind::Transient;
    }

    ErrorKind::Permanent
}

/// True when the failure is worth another attempt.
pub fn is_retryable(error: &RemoteError) -> bool {
    classify(error) == ErrorKind::Transient
}

/// Operator-facing guidance for a well-known status code.
///
/// Advisory only: the retry loop never consults this. The `kind` here always
/// agrees with [`classify`] for the same code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorAdvice {
    pub kind: ErrorKind,
    pub hint: &'static str,
}

/// Map a status code to remediation guidance, when we have any.
pub fn explain_error(error: &RemoteError) -> Option<ErrorAdvice> {
    let status = error.status.as_deref()?;
    let advice = match status {
        "INVALID_SIGNATURE" => ErrorAdvice {
            kind: ErrorKind::Permanent,
            hint: "signature rejected; verify the operator key pair and the signature encoding",
        },
        "INVALID_ACCOUNT_ID" => ErrorAdvice {
            kind: ErrorKind::Permanent,
            hint: "account id is malformed or does not exist on this network",
        },
        "INSUFFICIENT_PAYER_BALANCE" => ErrorAdvice {
            kind: ErrorKind::Transient,
            hint: "payer balance too low; fund the account and the retry will succeed",
        },
        "TRANSACTION_EXPIRED" => ErrorAdvice {
            kind: ErrorKind::Transient,
            hint: "valid-duration window elapsed before submission; check local clock skew",
        },
        "BUSY" => ErrorAdvice {
            kind: ErrorKind::Transient,
            hint: "network is throttling submissions; backoff is already applied",
        },
        _ => return None,
    };
    Some(advice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_is_retryable() {
        let err = RemoteError::with_status("BUSY", "node throttling");
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_invalid_signature_is_permanent() {
        let err = RemoteError::with_status("INVALID_SIGNATURE", "signature check failed");
        assert!(!is_retryable(&err));
        assert_eq!(classify(&err), ErrorKind::Permanent);
    }

    #[test]
    fn test_status_code_wins_over_message() {
        // A permanent status with a transient-looking message stays permanent.
        let err = RemoteError::with_status("INVALID_ACCOUNT_ID", "request timed out upstream");
        assert_eq!(classify(&err), ErrorKind::Permanent);
    }

    #[test]
    fn test_transport_messages_are_transient() {
        for message in [
            "Request Timeout after 10s",
            "connection reset by peer",
            "connect ECONNREFUSED 127.0.0.1:50211",
            "getaddrinfo ENOTFOUND mainnet.example.com",
            "socket closed before response",
        ] {
            let err = RemoteError::new(message);
            assert!(is_retryable(&err), "expected transient: {message}");
        }
    }

    #[test]
    fn test_unknown_message_is_permanent() {
        let err = RemoteError::new("malformed request body");
        assert_eq!(classify(&err), ErrorKind::Permanent);
    }

    #[test]
    fn test_every_retryable_status_classifies_transient() {
        for code in RETRYABLE_STATUS_CODES {
            let err = RemoteError::with_status(code, "status failure");
            assert_eq!(classify(&err), ErrorKind::Transient, "code {code}");
        }
    }

    #[test]
    fn test_advice_agrees_with_classifier() {
        let err = RemoteError::with_status("INSUFFICIENT_PAYER_BALANCE", "balance 0");
        let advice = explain_error(&err).unwrap();
        assert_eq!(advice.kind, classify(&err));
        assert!(advice.hint.contains("fund"));

        let err = RemoteError::with_status("INVALID_SIGNATURE", "bad sig");
        let advice = explain_error(&err).unwrap();
        assert_eq!(advice.kind, ErrorKind::Permanent);
    }

    #[test]
    fn test_advice_absent_for_unknown_code() {
        let err = RemoteError::with_status("SOMETHING_ELSE", "other");
        assert!(explain_error(&err).is_none());
        assert!(explain_error(&RemoteError::new("timeout")).is_none());
    }
}
