//! Time and record id helpers

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU16, Ordering};

/// 2024-01-01 00:00:00 UTC
const ID_EPOCH_MS: i64 = 1_704_067_200_000;
const SEQUENCE_BITS: u32 = 12;
const SEQUENCE_MASK: u16 = (1 << SEQUENCE_BITS) - 1;

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn sequence() -> &'static AtomicU16 {
    static SEQUENCE: OnceLock<AtomicU16> = OnceLock::new();
    SEQUENCE.get_or_init(|| AtomicU16::new(rand::random::<u16>() & SEQUENCE_MASK))
}

/// Record id of a unit order
///
/// `(ms since 2024-01-01) << 12 | sequence`, 53 bits in total so JSON
/// clients read it exactly. The sequence is shared by the whole process:
/// cups of one checkout are stamped in the same millisecond and still get
/// distinct ids.
pub fn record_id() -> i64 {
    let ts = (now_millis() - ID_EPOCH_MS) & 0x1FF_FFFF_FFFF;
    let seq = sequence().fetch_add(1, Ordering::Relaxed) & SEQUENCE_MASK;
    (ts << SEQUENCE_BITS) | i64::from(seq)
}
