pub mod content_digest_hasher;

pub use content_digest_hasher::{ContentDigestVerifier, Sha256Verifier, VerificationError};
