//! At-rest protection for the serialized token.

use crate::error::Result;

/// Reversible protection applied to the serialized snapshot before it
/// touches disk.
///
/// Implementations are injected into [`crate::manager::TokenManager`]; the
/// crate never consults any process-wide encryption state. `is_robust`
/// drives the consent gate: a sealer that cannot protect the cache beyond
/// file permissions must return `false` so the operator is warned before
/// anything is persisted.
pub trait TokenSealer: Send + Sync {
    fn seal(&self, plain: &[u8]) -> Result<Vec<u8>>;
    fn unseal(&self, sealed: &[u8]) -> Result<Vec<u8>>;

    /// Whether the sealed bytes stay protected if the file leaves this
    /// machine (for example on a removed disk).
    fn is_robust(&self) -> bool;
}

/// Identity sealer: the cache is protected by file permissions only.
///
/// This is the default on platforms without an OS-backed secret store, and
/// it is what makes the consent gate fire.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextSealer;

impl TokenSealer for PlaintextSealer {
    fn seal(&self, plain: &[u8]) -> Result<Vec<u8>> {
        Ok(plain.to_vec())
    }

    fn unseal(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        Ok(sealed.to_vec())
    }

    fn is_robust(&self) -> bool {
        false
    }
}
