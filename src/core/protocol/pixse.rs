//! `$PIXSE,CONFIG` request encoder and reply decoder
//!
//! Request layout:
//!
//! ```text
//! $PIXSE,CONFIG,<payload>*<xor-hex>\r\n
//! ```
//!
//! Replies are raw ASCII. The value of interest is the last comma-separated
//! field, terminated by the `*` checksum marker.

use super::checksum;
use super::{CommandKind, DecodeError, EncodeError};
use crate::core::fix::GpsFix;

/// Sentence header preceding every payload
pub const FRAME_PREFIX: &str = "$PIXSE,CONFIG,";

/// Line terminator appended after the checksum
pub const FRAME_TERMINATOR: &str = "\r\n";

/// Standard deviations sent with a manual fix: horizontal (m), horizontal (m), vertical (m)
const MANUAL_FIX_STDDEV: &str = "0.5,0.5,5.0";

/// An encoded request ready for the wire
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Command this request was built from
    pub kind: CommandKind,
    /// Payload body between the header and the checksum
    pub payload: String,
    /// Complete frame including checksum and CR/LF
    pub message: String,
}

impl Request {
    /// Whether a reply must be read back for this request
    pub fn expects_reply(&self) -> bool {
        self.kind.expects_reply()
    }

    /// Checksum field as rendered in the frame
    pub fn checksum(&self) -> &str {
        let start = self.message.rfind('*').map_or(self.message.len(), |i| i + 1);
        self.message[start..].trim_end_matches(FRAME_TERMINATOR)
    }
}

/// Build the payload body for a command
pub fn payload(kind: CommandKind, fix: Option<&GpsFix>) -> Result<String, EncodeError> {
    let body = match kind {
        CommandKind::SetManualFix => {
            let fix = fix.ok_or(EncodeError::NoFixAvailable)?;
            format!(
                "MANGPS,{:.6},{:.6},{:.6},{}",
                fix.latitude, fix.longitude, fix.altitude, MANUAL_FIX_STDDEV
            )
        }
        other => other.template().to_string(),
    };
    Ok(body)
}

/// Encode a command into a complete request frame
pub fn encode(kind: CommandKind, fix: Option<&GpsFix>) -> Result<Request, EncodeError> {
    let payload = payload(kind, fix)?;

    let mut message = String::with_capacity(FRAME_PREFIX.len() + payload.len() + 6);
    message.push_str(FRAME_PREFIX);
    message.push_str(&payload);

    let sum = checksum::sentence_checksum(&message);
    message.push('*');
    message.push_str(&checksum::render(sum));
    message.push_str(FRAME_TERMINATOR);

    Ok(Request {
        kind,
        payload,
        message,
    })
}

/// Extract the value token from a raw device reply.
///
/// The token sits between the last `,` and the next `*`. The search never
/// looks past the end of `raw`.
pub fn decode(raw: &[u8]) -> Result<String, DecodeError> {
    let comma = raw
        .iter()
        .rposition(|&b| b == b',')
        .ok_or_else(|| DecodeError::Malformed("no field separator".to_string()))?;

    let field = &raw[comma + 1..];
    let star = field
        .iter()
        .position(|&b| b == b'*')
        .ok_or_else(|| DecodeError::Malformed("no checksum marker after last field".to_string()))?;

    std::str::from_utf8(&field[..star])
        .map(str::to_string)
        .map_err(|_| DecodeError::Malformed("reply token is not ASCII".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(payload: &str, sum: &str) -> String {
        format!("$PIXSE,CONFIG,{payload}*{sum}\r\n")
    }

    #[test]
    fn test_fixed_payloads() {
        let expected = [
            (CommandKind::Reset, "RESET_", "57"),
            (CommandKind::StartWaitForPosition, "START_,1", "5f"),
            (CommandKind::StartRestorePosition, "START_,2", "5c"),
            (CommandKind::StartRestoreAttitude, "START_,3", "5d"),
            (CommandKind::IgnoreGps, "GPSKFM,1", "44"),
            (CommandKind::UseGps, "GPSKFM,2", "47"),
            (CommandKind::QueryGpsStatus, "GPSKFM,,", "59"),
            (CommandKind::QueryStartMode, "START_,,", "42"),
        ];

        for (kind, body, sum) in expected {
            let request = encode(kind, None).unwrap();
            assert_eq!(request.payload, body, "{kind}");
            assert_eq!(request.message, frame(body, sum), "{kind}");
            assert_eq!(request.checksum(), sum);
            assert!(checksum::verify(&request.message));
        }
    }

    #[test]
    fn test_checksum_matches_xor_fold() {
        for kind in CommandKind::ALL {
            let fix = GpsFix::new(48.117_3, 11.516_7, 545.4);
            let request = encode(kind, Some(&fix)).unwrap();
            let body = format!("PIXSE,CONFIG,{}", request.payload);
            let sum = body.bytes().fold(0u8, |a, b| a ^ b);
            assert_eq!(request.checksum(), format!("{sum:x}"));
        }
    }

    #[test]
    fn test_manual_fix_requires_fix() {
        assert_eq!(
            encode(CommandKind::SetManualFix, None),
            Err(EncodeError::NoFixAvailable)
        );
    }

    #[test]
    fn test_manual_fix_payload() {
        let fix = GpsFix::new(12.345678, -98.765432, 10.5);
        let request = encode(CommandKind::SetManualFix, Some(&fix)).unwrap();
        assert_eq!(
            request.payload,
            "MANGPS,12.345678,-98.765432,10.500000,0.5,0.5,5.0"
        );
        assert_eq!(
            request.message,
            frame("MANGPS,12.345678,-98.765432,10.500000,0.5,0.5,5.0", "7f")
        );
    }

    #[test]
    fn test_query_requests_expect_reply() {
        assert!(encode(CommandKind::QueryGpsStatus, None).unwrap().expects_reply());
        assert!(encode(CommandKind::QueryStartMode, None).unwrap().expects_reply());
        assert!(!encode(CommandKind::Reset, None).unwrap().expects_reply());
    }

    #[test]
    fn test_decode_extracts_last_field() {
        assert_eq!(decode(b"$PIXSE,CONFIG,GPSKFM,1*1a").unwrap(), "1");
        assert_eq!(decode(b"$PIXSE,CONFIG,START_,2*5c\r\n").unwrap(), "2");
        assert_eq!(decode(b",*").unwrap(), "");
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(decode(b"PIXSE CONFIG 1*1a"), Err(DecodeError::Malformed(_))));
        assert!(matches!(decode(b"$PIXSE,CONFIG,GPSKFM,1"), Err(DecodeError::Malformed(_))));
        // A star before the last comma does not count
        assert!(matches!(decode(b"$PIXSE*,CONFIG,1"), Err(DecodeError::Malformed(_))));
        assert!(matches!(decode(b""), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_decode_rejects_non_ascii() {
        assert!(matches!(decode(b"a,\xff\xfe*00"), Err(DecodeError::Malformed(_))));
    }
}
