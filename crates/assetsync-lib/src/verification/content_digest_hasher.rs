use digest::Digest;
use sha2::Sha256;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Verification failed: expected {}, got {}",
        hex::encode(.expected),
        hex::encode(.actual)
    )]
    VerificationFailed { expected: Vec<u8>, actual: Vec<u8> },
}

/// Incrementally hashes content and compares it with an expected digest.
pub struct ContentDigestVerifier<D: Digest> {
    hasher: D,
    expected_digest: Vec<u8>,
}

pub type Sha256Verifier = ContentDigestVerifier<Sha256>;

impl<D: Digest> ContentDigestVerifier<D> {
    #[inline]
    pub fn new(expected_digest: impl Into<Vec<u8>>) -> Self {
        Self {
            hasher: D::new(),
            expected_digest: expected_digest.into(),
        }
    }

    #[inline]
    pub fn update(&mut self, data: impl AsRef<[u8]>) {
        Digest::update(&mut self.hasher, data.as_ref());
    }

    pub fn verify(self) -> Result<(), VerificationError> {
        let actual_digest = self.hasher.finalize().to_vec();

        if actual_digest == self.expected_digest {
            Ok(())
        } else {
            Err(VerificationError::VerificationFailed {
                expected: self.expected_digest,
                actual: actual_digest,
            })
        }
    }

    /// One-shot check of a complete buffer.
    pub fn check(
        expected_digest: impl Into<Vec<u8>>,
        data: impl AsRef<[u8]>,
    ) -> Result<(), VerificationError> {
        let mut verifier = Self::new(expected_digest);
        verifier.update(data);
        verifier.verify()
    }

    pub fn matches(expected_digest: impl Into<Vec<u8>>, data: impl AsRef<[u8]>) -> bool {
        Self::check(expected_digest, data).is_ok()
    }
}
