//! Key material and secure erasure for PlugVault.
//!
//! This module provides:
//! - `SecureBuffer`, byte storage zeroed on every destruction path (`secure_buffer`)
//! - `Key<Symmetric>` / `Key<Asymmetric>` and their constructors (`keys`)
//! - Parsing of base64 key metadata (`metadata`)

pub mod keys;
pub mod metadata;
pub mod secure_buffer;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{Key, Symmetric, SecureBuffer, ...};
pub use keys::{Asymmetric, Key, KeyCategory, Symmetric, DEFAULT_KEY_BITS};
pub use metadata::{encode_key_metadata, parse_key_metadata};
pub use secure_buffer::{observe_wipes, SecureBuffer, WipeObserverGuard};
