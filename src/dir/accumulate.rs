//! Growable collection of entry names filled from a cursor.

use std::ffi::OsString;

use crate::errors::{OsError, OsResult};

/// Capacity schedule for the accumulator: start at `initial`, double while the
/// capacity is at most `threshold`, then grow by `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPolicy {
    pub initial: usize,
    pub threshold: usize,
    pub step: usize,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl GrowthPolicy {
    pub const DEFAULT: GrowthPolicy = GrowthPolicy {
        initial: 100,
        threshold: 1000,
        step: 1000,
    };

    /// Capacity to grow to once `cap` slots are full.
    pub fn next_capacity(&self, cap: usize) -> usize {
        if cap == 0 {
            self.initial.max(1)
        } else if cap <= self.threshold {
            cap.saturating_mul(2)
        } else {
            cap.saturating_add(self.step.max(1))
        }
    }
}

/// Drain `entries` into a vector sized by `policy`, shrunk to fit at the end.
///
/// Stops at the first error and returns it alongside everything read so far.
pub fn accumulate<I>(entries: I, policy: GrowthPolicy) -> (Vec<OsString>, OsResult<()>)
where
    I: IntoIterator<Item = OsResult<OsString>>,
{
    let mut names: Vec<OsString> = Vec::new();
    let mut cap = 0usize;
    let mut status = Ok(());

    for entry in entries {
        let name = match entry {
            Ok(name) => name,
            Err(e) => {
                status = Err(e);
                break;
            }
        };
        if names.len() == cap {
            let next = policy.next_capacity(cap);
            if let Err(e) = names.try_reserve_exact(next - names.len()) {
                status = Err(OsError::from(e));
                break;
            }
            cap = next;
        }
        names.push(name);
    }

    names.shrink_to_fit();
    (names, status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_doubles_then_steps() {
        let p = GrowthPolicy::default();
        let mut caps = vec![];
        let mut cap = 0;
        for _ in 0..8 {
            cap = p.next_capacity(cap);
            caps.push(cap);
        }
        assert_eq!(caps, vec![100, 200, 400, 800, 1600, 2600, 3600, 4600]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let p = GrowthPolicy::DEFAULT;
        assert_eq!(p.next_capacity(1000), 2000);
        assert_eq!(p.next_capacity(1001), 2001);
    }

    #[test]
    fn empty_input_gives_empty_ok() {
        let (names, status) = accumulate(std::iter::empty(), GrowthPolicy::DEFAULT);
        assert!(names.is_empty());
        assert_eq!(status, Ok(()));
    }

    #[test]
    fn keeps_order_and_shrinks() {
        let input: Vec<OsResult<OsString>> =
            (0..1500).map(|i| Ok(OsString::from(format!("e{i}")))).collect();
        let (names, status) = accumulate(input, GrowthPolicy::DEFAULT);
        assert_eq!(status, Ok(()));
        assert_eq!(names.len(), 1500);
        assert_eq!(names[0], "e0");
        assert_eq!(names[1499], "e1499");
        // 1600 before the shrink
        assert!(names.capacity() < 1600);
    }

    #[test]
    fn late_error_keeps_partial_names() {
        let input = vec![
            Ok(OsString::from("a")),
            Ok(OsString::from("b")),
            Err(OsError::Io(5)),
            Ok(OsString::from("never")),
        ];
        let (names, status) = accumulate(input, GrowthPolicy::DEFAULT);
        assert_eq!(names, vec![OsString::from("a"), OsString::from("b")]);
        assert_eq!(status, Err(OsError::Io(5)));
    }

    #[test]
    fn tiny_policy_still_collects_everything() {
        let p = GrowthPolicy { initial: 1, threshold: 2, step: 1 };
        let input: Vec<OsResult<OsString>> = (0..10).map(|i| Ok(i.to_string().into())).collect();
        let (names, _) = accumulate(input, p);
        assert_eq!(names.len(), 10);
    }
}
