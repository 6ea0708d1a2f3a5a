//! Mastery ("power rating") of a topic

/// Points at which a topic counts as fully mastered
pub const MASTERY_THRESHOLD: u32 = 500;

/// Percentage of the threshold reached, rounded and clamped to 100
pub fn mastery_percent(points: u32) -> u8 {
    let percent = (f64::from(points) / f64::from(MASTERY_THRESHOLD) * 100.0).round();
    percent.min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mastery_values() {
        assert_eq!(mastery_percent(0), 0);
        assert_eq!(mastery_percent(10), 2);
        assert_eq!(mastery_percent(250), 50);
        assert_eq!(mastery_percent(497), 99);
        assert_eq!(mastery_percent(500), 100);
        assert_eq!(mastery_percent(u32::MAX), 100);
    }

    #[test]
    fn test_mastery_monotonic() {
        let mut previous = 0;
        for points in 0..=1_000 {
            let current = mastery_percent(points);
            assert!(current >= previous);
            assert!(current <= 100);
            previous = current;
        }
    }
}
