//! Unix-millisecond timestamps
//!
//! 全库统一使用 Unix 毫秒 (i64)：数值排序即时间排序。

use chrono::Utc;

/// Current server time as Unix millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_monotonic_enough() {
        let a = now_millis();
        let b = now_millis();
        assert!(b >= a);
        // Sanity: after 2020-01-01
        assert!(a > 1_577_836_800_000);
    }
}
