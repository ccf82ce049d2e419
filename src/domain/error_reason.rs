use crate::error::ClassifyError;
use serde::Serialize;
use std::fmt;

/// Closed set of error reasons the FCM endpoint is known to report.
///
/// Covers both the legacy HTTP error codes (`InvalidRegistration`,
/// `NotRegistered`, ...), the v1 `FcmError` codes (`INVALID_ARGUMENT`,
/// `UNREGISTERED`, ...) and the `google.rpc` statuses FCM puts in the v1
/// envelope when no `FcmError` detail is attached. A reason outside this set is rejected by
/// [`ErrorReason::parse`] so new server codes surface instead of being
/// folded into a generic bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorReason {
    MissingRegistration,
    InvalidRegistration,
    NotRegistered,
    InvalidPackageName,
    MismatchSenderId,
    InvalidParameters,
    MessageTooBig,
    InvalidDataKey,
    InvalidTtl,
    Unavailable,
    InternalServerError,
    DeviceMessageRateExceeded,
    TopicsMessageRateExceeded,
    InvalidApnsCredential,
    UnspecifiedError,
    InvalidArgument,
    Unregistered,
    SenderIdMismatch,
    QuotaExceeded,
    Internal,
    ThirdPartyAuthError,
    NotFound,
    ResourceExhausted,
    PermissionDenied,
    Unauthenticated,
}

impl ErrorReason {
    pub const ALL: [Self; 25] = [
        Self::MissingRegistration,
        Self::InvalidRegistration,
        Self::NotRegistered,
        Self::InvalidPackageName,
        Self::MismatchSenderId,
        Self::InvalidParameters,
        Self::MessageTooBig,
        Self::InvalidDataKey,
        Self::InvalidTtl,
        Self::Unavailable,
        Self::InternalServerError,
        Self::DeviceMessageRateExceeded,
        Self::TopicsMessageRateExceeded,
        Self::InvalidApnsCredential,
        Self::UnspecifiedError,
        Self::InvalidArgument,
        Self::Unregistered,
        Self::SenderIdMismatch,
        Self::QuotaExceeded,
        Self::Internal,
        Self::ThirdPartyAuthError,
        Self::NotFound,
        Self::ResourceExhausted,
        Self::PermissionDenied,
        Self::Unauthenticated,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingRegistration => "missing_registration",
            Self::InvalidRegistration => "invalid_registration",
            Self::NotRegistered => "not_registered",
            Self::InvalidPackageName => "invalid_package_name",
            Self::MismatchSenderId => "mismatch_sender_id",
            Self::InvalidParameters => "invalid_parameters",
            Self::MessageTooBig => "message_too_big",
            Self::InvalidDataKey => "invalid_data_key",
            Self::InvalidTtl => "invalid_ttl",
            Self::Unavailable => "unavailable",
            Self::InternalServerError => "internal_server_error",
            Self::DeviceMessageRateExceeded => "device_message_rate_exceeded",
            Self::TopicsMessageRateExceeded => "topics_message_rate_exceeded",
            Self::InvalidApnsCredential => "invalid_apns_credential",
            Self::UnspecifiedError => "unspecified_error",
            Self::InvalidArgument => "invalid_argument",
            Self::Unregistered => "unregistered",
            Self::SenderIdMismatch => "sender_id_mismatch",
            Self::QuotaExceeded => "quota_exceeded",
            Self::Internal => "internal",
            Self::ThirdPartyAuthError => "third_party_auth_error",
            Self::NotFound => "not_found",
            Self::ResourceExhausted => "resource_exhausted",
            Self::PermissionDenied => "permission_denied",
            Self::Unauthenticated => "unauthenticated",
        }
    }

    /// Looks up an already-normalized symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|reason| reason.as_str() == symbol)
    }

    /// Normalizes a server-reported reason phrase and maps it onto the known set.
    ///
    /// # Errors
    /// Returns `ClassifyError::UnrecognizedReason` if the normalized symbol is not a known reason.
    pub fn parse(phrase: &str) -> Result<Self, ClassifyError> {
        let symbol = normalize(phrase);
        Self::from_symbol(&symbol).ok_or_else(|| ClassifyError::UnrecognizedReason { reason: phrase.to_string(), symbol })
    }

    /// Whether the device token should be discarded by the caller.
    #[must_use]
    pub const fn is_token_invalid(self) -> bool {
        matches!(self, Self::InvalidRegistration | Self::NotRegistered | Self::Unregistered | Self::MissingRegistration)
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converts "Invalid Registration", "InvalidRegistration" or "INVALID_REGISTRATION"
/// into `invalid_registration`.
#[must_use]
pub fn normalize(phrase: &str) -> String {
    let chars: Vec<char> = phrase.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_whitespace() || c == '_' || c == '-' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if c.is_uppercase() && i > 0 && !out.ends_with('_') {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_spaced_phrase() {
        assert_eq!(normalize("Invalid Registration"), "invalid_registration");
        assert_eq!(normalize("  Mismatch Sender Id "), "mismatch_sender_id");
    }

    #[test]
    fn test_normalize_camel_case() {
        assert_eq!(normalize("InvalidRegistration"), "invalid_registration");
        assert_eq!(normalize("DeviceMessageRateExceeded"), "device_message_rate_exceeded");
        assert_eq!(normalize("InvalidTTL"), "invalid_ttl");
        assert_eq!(normalize("InvalidApnsCredential"), "invalid_apns_credential");
    }

    #[test]
    fn test_normalize_screaming_snake() {
        assert_eq!(normalize("INVALID_ARGUMENT"), "invalid_argument");
        assert_eq!(normalize("THIRD_PARTY_AUTH_ERROR"), "third_party_auth_error");
    }

    #[test]
    fn test_every_symbol_round_trips() {
        for reason in ErrorReason::ALL {
            assert_eq!(ErrorReason::from_symbol(reason.as_str()), Some(reason));
        }
    }

    #[test]
    fn test_parse_unknown_reason_is_rejected() {
        let err = ErrorReason::parse("Totally New Failure").unwrap_err();
        let ClassifyError::UnrecognizedReason { reason, symbol } = err else {
            panic!("expected an unrecognized reason");
        };
        assert_eq!(reason, "Totally New Failure");
        assert_eq!(symbol, "totally_new_failure");
    }

    #[test]
    fn test_token_invalid_reasons() {
        assert!(ErrorReason::NotRegistered.is_token_invalid());
        assert!(ErrorReason::Unregistered.is_token_invalid());
        assert!(!ErrorReason::QuotaExceeded.is_token_invalid());
        assert!(!ErrorReason::NotFound.is_token_invalid());
    }
}
