//! Owned byte storage that is zeroed on every destruction path.
//!
//! A `SecureBuffer` is wiped when it is dropped, when its contents are
//! moved out with [`SecureBuffer::take`], when it is overwritten with
//! [`SecureBuffer::replace`], or when [`SecureBuffer::wipe`] is called
//! explicitly, whichever comes first.
//!
//! Tests can observe wipes through a process-wide hook registered with
//! [`observe_wipes`].  The hook only ever receives an all-zero vector of
//! the pre-wipe length, never the secret bytes themselves.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use zeroize::Zeroize;

type WipeObserver = Box<dyn Fn(&[u8]) + Send>;

static WIPE_OBSERVER: Mutex<Option<WipeObserver>> = Mutex::new(None);

/// Register a process-wide callback invoked after every wipe.
///
/// The observer stays registered until the returned guard is dropped.
/// Registering a new observer replaces the previous one.  Intended for
/// tests; nothing in the library depends on an observer being present.
#[must_use = "the observer is removed when the guard is dropped"]
pub fn observe_wipes<F>(observer: F) -> WipeObserverGuard
where
    F: Fn(&[u8]) + Send + 'static,
{
    let mut slot = WIPE_OBSERVER
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    *slot = Some(Box::new(observer));
    WipeObserverGuard { _private: () }
}

/// Removes the wipe observer when dropped.
pub struct WipeObserverGuard {
    _private: (),
}

impl Drop for WipeObserverGuard {
    fn drop(&mut self) {
        let mut slot = WIPE_OBSERVER
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }
}

fn notify_wiped(len: usize) {
    let proof = vec![0u8; len];
    let slot = WIPE_OBSERVER
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(observer) = slot.as_ref() {
        observer(&proof);
    }
}

/// A move-only byte buffer that zeroes its contents before releasing them.
pub struct SecureBuffer {
    bytes: Vec<u8>,
    wiped: bool,
}

impl SecureBuffer {
    /// Take ownership of `bytes`.
    ///
    /// The allocation is never moved; [`wipe`](Self::wipe) clears its full
    /// capacity.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            wiped: false,
        }
    }

    /// Allocate a zero-filled buffer of `len` bytes, ready to be written.
    pub fn with_len(len: usize) -> Self {
        Self::new(vec![0u8; len])
    }

    /// Copy `bytes` into a new buffer.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns `true` once the buffer has been wiped or moved out of.
    pub fn is_wiped(&self) -> bool {
        self.wiped
    }

    /// Zero every byte of the allocation and truncate to length 0.
    ///
    /// Calling this on an already wiped buffer does nothing, and in
    /// particular does not notify the observer a second time.
    pub fn wipe(&mut self) {
        if self.wiped {
            return;
        }
        let len = self.bytes.len();
        // `Vec::zeroize` clears the full capacity with volatile writes
        // and then sets the length to 0.
        self.bytes.zeroize();
        self.wiped = true;
        notify_wiped(len);
    }

    /// Move the contents into a new buffer, leaving `self` wiped and empty.
    ///
    /// The bytes are transferred without being copied, so the moved-out
    /// sequence has exactly one live owner.
    pub fn take(&mut self) -> SecureBuffer {
        let taken = SecureBuffer {
            bytes: std::mem::take(&mut self.bytes),
            wiped: self.wiped,
        };
        self.wiped = true;
        taken
    }

    /// Wipe the current contents, then take over the contents of `other`.
    pub fn replace(&mut self, mut other: SecureBuffer) {
        self.wipe();
        self.bytes = std::mem::take(&mut other.bytes);
        self.wiped = other.wiped;
        other.wiped = true;
    }
}

impl Drop for SecureBuffer {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl fmt::Debug for SecureBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureBuffer")
            .field("len", &self.bytes.len())
            .field("wiped", &self.wiped)
            .finish_non_exhaustive()
    }
}
