//! Record identifiers and creation timestamps.
//!
//! Identifiers are random v4 UUIDs drawn from the operating system's secure
//! random source. If that source fails, a composite of the wall clock and a
//! mixed suffix is used instead:
//!
//! `expense_<unix-millis>_<9 base36 chars>`

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Builder;

const FALLBACK_PREFIX: &str = "expense_";
const FALLBACK_SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);
static LAST_CREATED_AT: AtomicI64 = AtomicI64::new(0);

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

fn now_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}

/// Generate a new opaque record id.
pub fn generate_id() -> String {
    let mut bytes = [0_u8; 16];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => Builder::from_random_bytes(bytes)
            .into_uuid()
            .to_string(),
        Err(err) => {
            log::warn!("Secure random source unavailable, using fallback id: {}", err);
            fallback_id(now_millis(), now_nanos())
        }
    }
}

fn fallback_id(millis: i64, nanos: u128) -> String {
    let counter = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    // splitmix64 finalizer over clock and counter
    let mut x = (nanos as u64) ^ counter.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^= x >> 31;

    let mut suffix = String::with_capacity(FALLBACK_SUFFIX_LEN);
    for _ in 0..FALLBACK_SUFFIX_LEN {
        suffix.push(BASE36[(x % 36) as usize] as char);
        x /= 36;
    }
    format!("{}{}_{}", FALLBACK_PREFIX, millis, suffix)
}

/// Current Unix time in milliseconds, strictly increasing within the process.
pub fn next_created_at() -> i64 {
    let now = now_millis();
    let mut last = LAST_CREATED_AT.load(Ordering::Relaxed);
    loop {
        let next = if now > last { now } else { last + 1 };
        match LAST_CREATED_AT.compare_exchange_weak(
            last,
            next,
            Ordering::SeqCst,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}
