//! Conversion between named character encodings.

use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::error::{Error, Result};

/// `"utf-8"`, `"UTF8"` and `"Utf-8"` all compare equal.
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|&c| c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn lookup(name: &str) -> Result<&'static Encoding> {
    Encoding::for_label(name.trim().as_bytes())
        .ok_or_else(|| Error::UnsupportedEncoding(name.to_string()))
}

/// Re-encode `input` from `from` to `to`.
///
/// Identical names (ignoring case and hyphens) return the input untouched.
/// The input is assumed to really be in `from`; bytes that are not, and
/// characters the target cannot represent, fail the conversion.
pub fn convert_encoding<'a>(input: &'a [u8], to: &str, from: &str) -> Result<Cow<'a, [u8]>> {
    if from.is_empty() {
        return Err(Error::UnsupportedEncoding(
            "no source encoding was provided".to_string(),
        ));
    }
    if to.is_empty() {
        return Err(Error::UnsupportedEncoding(
            "no target encoding was provided".to_string(),
        ));
    }
    if normalize_name(from) == normalize_name(to) {
        return Ok(Cow::Borrowed(input));
    }

    let source = lookup(from)?;
    let target = lookup(to)?;
    let failed = |message: String| Error::ConversionFailed {
        from: from.to_string(),
        to: to.to_string(),
        message,
    };

    let (decoded, malformed) = source.decode_without_bom_handling(input);
    if malformed {
        return Err(failed(format!("input is not valid {}", source.name())));
    }
    if target.output_encoding() != target {
        return Err(failed(format!("cannot encode into {}", target.name())));
    }

    let (encoded, _, unmappable) = target.encode(&decoded);
    if unmappable {
        return Err(failed(format!(
            "input has characters {} cannot represent",
            target.name()
        )));
    }
    Ok(Cow::Owned(encoded.into_owned()))
}
