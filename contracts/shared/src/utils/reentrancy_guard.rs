use crate::errors::Error;
use scale::{Decode, Encode};

/// Single-slot lock stored alongside contract state.
///
/// Messages that move funds take the lock through [`non_reentrant!`] so a
/// nested call into the same contract cannot observe half-applied state.
///
/// [`non_reentrant!`]: crate::non_reentrant
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct ReentrancyGuard {
    entered: bool,
}

impl ReentrancyGuard {
    pub const fn new() -> Self {
        Self { entered: false }
    }

    /// Takes the lock, failing with [`Error::ReentrantCall`] if it is held.
    pub fn enter(&mut self) -> Result<(), Error> {
        if self.entered {
            return Err(Error::ReentrantCall);
        }
        self.entered = true;
        Ok(())
    }

    /// Releases the lock.
    pub fn exit(&mut self) {
        self.entered = false;
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }
}

/// Runs `$body` while holding `$self.reentrancy_guard`.
///
/// The guard is released whether `$body` succeeds or fails, so `$body` must
/// be an expression that yields the message result and must not `return`
/// early. Keep the work in a private helper and call it here.
#[macro_export]
macro_rules! non_reentrant {
    ($self:ident, $body:expr) => {{
        $self.reentrancy_guard.enter()?;
        let result = $body;
        $self.reentrancy_guard.exit();
        result
    }};
}
