//! Stack growth for deep nesting.
//!
//! Nested evaluations, command substitutions, and parenthesized expressions all recurse on
//! the native stack.  The recursion limit bounds how deep they may go; these helpers make
//! sure the native stack can hold that depth, so that running past the limit is reported
//! as a `RecursionLimit` error rather than a stack overflow.

/// Grow the stack when less than this remains.
const RED_ZONE: usize = 128 * 1024;

/// The size of each newly allocated stack segment.
const STACK_SEGMENT: usize = 1024 * 1024;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        /// Calls `f`.  WASM manages its own stack.
        #[inline]
        pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
            f()
        }
    } else {
        /// Calls `f`, first moving to a fresh stack segment if the current one is nearly
        /// used up.
        #[inline]
        pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
            stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, f)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_recursion() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }

        assert_eq!(depth(100_000), 100_000);
    }

    #[test]
    fn test_passes_result_through() {
        let result: Result<i32, &str> = ensure_sufficient_stack(|| Err("no"));
        assert_eq!(result, Err("no"));
    }
}
