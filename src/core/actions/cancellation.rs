use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Points computed between cancellation polls inside a chunk row.
pub const CANCEL_CHECK_INTERVAL_POINTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled")]
pub struct Cancelled;

pub trait CancelToken: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F> CancelToken for F
where
    F: Fn() -> bool + Send + Sync,
{
    #[inline]
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// Cancelled as soon as the shared generation counter moves past the generation
/// this token was issued for.
#[derive(Debug, Clone)]
pub struct GenerationToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl GenerationToken {
    #[must_use]
    pub fn new(generation: u64, current: Arc<AtomicU64>) -> Self {
        Self {
            generation,
            current,
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl CancelToken for GenerationToken {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.current.load(Ordering::Relaxed) != self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn never_cancel_always_returns_false() {
        let token = NeverCancel;
        assert!(!token.is_cancelled());
        assert!(!token.is_cancelled());
    }

    #[test]
    fn closure_token_reflects_atomic_state() {
        let flag = AtomicBool::new(false);
        let token = || flag.load(Ordering::Relaxed);

        assert!(!token.is_cancelled());

        flag.store(true, Ordering::Relaxed);
        assert!(token.is_cancelled());
    }

    #[test]
    fn generation_token_cancels_when_superseded() {
        let current = Arc::new(AtomicU64::new(3));
        let token = GenerationToken::new(3, Arc::clone(&current));

        assert!(!token.is_cancelled());
        assert_eq!(token.generation(), 3);

        current.fetch_add(1, Ordering::SeqCst);
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancelled_displays_message() {
        assert_eq!(Cancelled.to_string(), "operation cancelled");
    }
}
