//! Parsing of the verifier's raw output.

use serde::{Deserialize, Serialize};
use umbra_common::codec::Reader;
use umbra_common::{CoreError, CoreResult};

const CHECK_RESULT_MAGIC: &[u8; 4] = b"URES";
const RESULT_VERSION: u8 = 1;

/// Outcome of verifying a proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the verifier accepted the proof.
    pub accepted: bool,
    /// Verifier diagnostic, present on rejection (and occasionally on
    /// acceptance, e.g. deprecation notices).
    pub diagnostic: Option<String>,
}

/// Deserialize a verifier result buffer.
///
/// Any inconsistency (truncation, wrong magic, unknown version, a
/// verdict byte that is neither 0 nor 1, non-UTF-8 diagnostics, trailing
/// bytes) is `MalformedResult`. The verifier's output crosses a trust
/// boundary, so nothing about it is assumed.
pub fn parse_check_result(bytes: &[u8]) -> CoreResult<CheckResult> {
    let mut r = Reader::new(bytes);

    let magic = r.read_exact(4).map_err(malformed)?;
    if magic != CHECK_RESULT_MAGIC {
        return Err(CoreError::MalformedResult(
            "result buffer has wrong magic tag".into(),
        ));
    }

    let version = r.read_u8().map_err(malformed)?;
    if version != RESULT_VERSION {
        return Err(CoreError::MalformedResult(format!(
            "unsupported result version {}",
            version
        )));
    }

    let accepted = match r.read_u8().map_err(malformed)? {
        0 => false,
        1 => true,
        other => {
            return Err(CoreError::MalformedResult(format!(
                "verdict byte must be 0 or 1, got {}",
                other
            )))
        }
    };

    let diag_bytes = r.read_var_bytes().map_err(malformed)?;
    let diagnostic = if diag_bytes.is_empty() {
        None
    } else {
        Some(String::from_utf8(diag_bytes.to_vec()).map_err(|_| {
            CoreError::MalformedResult("diagnostic is not valid UTF-8".into())
        })?)
    };

    r.finish().map_err(malformed)?;
    Ok(CheckResult {
        accepted,
        diagnostic,
    })
}

fn malformed(err: CoreError) -> CoreError {
    CoreError::MalformedResult(err.to_string())
}
