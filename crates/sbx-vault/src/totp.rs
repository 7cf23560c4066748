//! Time-based one-time passwords (RFC 6238 over RFC 4226 HOTP)
//!
//! HMAC-SHA1 with dynamic truncation: the low nibble of the last HMAC byte
//! picks a 4-byte window, the top bit of that window is masked off, and
//! the result is reduced mod 10^digits.

use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use rand::{rngs::OsRng, RngCore};
use sha1::Sha1;
use zeroize::Zeroizing;

use sbx_core::config::TotpConfig;

/// Shared-secret length in bytes (160-bit)
pub const SECRET_SIZE: usize = 20;

type HmacSha1 = Hmac<Sha1>;

/// Generate a fresh 160-bit TOTP secret.
pub fn generate_secret() -> Zeroizing<Vec<u8>> {
    let mut secret = Zeroizing::new(vec![0u8; SECRET_SIZE]);
    OsRng.fill_bytes(&mut secret);
    secret
}

/// Render a secret Base32 (no padding) for authenticator-app transcription.
pub fn secret_to_base32(secret: &[u8]) -> String {
    base32::encode(base32::Alphabet::Rfc4648 { padding: false }, secret)
}

/// Compute the code for a given unix time. Pure in (secret, time step):
/// every call within one period yields the same code.
pub fn code_at(secret: &[u8], unix_time: u64, params: &TotpConfig) -> u32 {
    hotp(secret, unix_time / params.period_secs, params.digits)
}

fn hotp(secret: &[u8], counter: u64, digits: u32) -> u32 {
    let mut mac = HmacSha1::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(&counter.to_be_bytes());
    let hmac = mac.finalize().into_bytes();

    let offset = (hmac[hmac.len() - 1] & 0x0F) as usize;
    let binary = ((u32::from(hmac[offset]) & 0x7F) << 24)
        | (u32::from(hmac[offset + 1]) << 16)
        | (u32::from(hmac[offset + 2]) << 8)
        | u32::from(hmac[offset + 3]);

    // The truncated value is 31 bits, so any digits >= 10 passes it through
    // whole; the u64 modulus keeps an oversized config from overflowing.
    (u64::from(binary) % 10u64.pow(digits.min(10))) as u32
}

/// Verify a submitted code, tolerating `drift_steps` time steps of clock
/// skew either side of `unix_time`.
///
/// No single-use tracking: a captured code stays valid for its whole
/// acceptance window (±`drift_steps` × period).
pub fn verify(secret: &[u8], submitted: u32, unix_time: u64, params: &TotpConfig) -> bool {
    let drift = i64::from(params.drift_steps);
    let period = params.period_secs as i64;

    for step in -drift..=drift {
        let Some(time) = unix_time.checked_add_signed(step * period) else {
            continue;
        };
        if code_at(secret, time, params) == submitted {
            return true;
        }
    }
    false
}

/// Zero-padded display form: 81_804 with 6 digits renders as "081804".
pub fn format_code(code: u32, digits: u32) -> String {
    format!("{code:0width$}", width = digits as usize)
}

/// Build a Key URI Format provisioning string for the QR collaborator:
///
/// `otpauth://totp/{issuer}:{account}?secret=...&issuer=...&algorithm=SHA1&digits=6&period=30`
pub fn provisioning_uri(issuer: &str, account: &str, secret: &[u8], params: &TotpConfig) -> String {
    let label = format!("{issuer}:{account}");
    format!(
        "otpauth://totp/{}?secret={}&issuer={}&algorithm=SHA1&digits={}&period={}",
        utf8_percent_encode(&label, NON_ALPHANUMERIC),
        secret_to_base32(secret),
        utf8_percent_encode(issuer, NON_ALPHANUMERIC),
        params.digits,
        params.period_secs,
    )
}
