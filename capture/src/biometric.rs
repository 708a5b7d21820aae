//! Platform biometric capture via a credential-creation ceremony.
//!
//! Each attempt draws a fresh 32-byte challenge, binds it with the relying
//! party and subject into a creation request, and runs the platform
//! authenticator. The challenge is zeroized as soon as the ceremony settles.
//! A successful ceremony yields an opaque [`ProofToken`]; its content is left
//! to the backend.

use attest_types::{CredentialSubject, ProofToken, SessionRecord};
use blake2::digest::consts::U16;
use blake2::{Blake2b, Digest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{BiometricError, PlatformError};
use crate::platform::{
    AttestationPreference, AuthenticatorAttachment, CredentialCreationOptions,
    PlatformAuthenticator, RandomSource, UserEntity, UserVerification, ES256,
};

pub const CHALLENGE_LEN: usize = 32;
pub const DEFAULT_RELYING_PARTY: &str = "BioApp";
pub const DEFAULT_CEREMONY_TIMEOUT: Duration = Duration::from_secs(60);

type Blake2b128 = Blake2b<U16>;

/// Single-use random challenge for one ceremony attempt.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct BiometricChallenge([u8; CHALLENGE_LEN]);

impl BiometricChallenge {
    pub fn generate(random: &dyn RandomSource) -> Result<Self, BiometricError> {
        let mut bytes = [0u8; CHALLENGE_LEN];
        random
            .fill_bytes(&mut bytes)
            .map_err(|e| BiometricError::Randomness(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Blake2b-128 of `data`.
pub fn digest16(data: &[u8]) -> [u8; 16] {
    let mut hasher = Blake2b128::new();
    hasher.update(data);
    let mut out = [0u8; 16];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// 16-byte user handle derived from the subject name.
pub fn user_handle(subject: &str) -> [u8; 16] {
    digest16(subject.as_bytes())
}

/// Short hex tag for a credential id, safe to log. Authenticators may
/// derive ids from the challenge, so raw id bytes never reach the logs.
pub fn credential_tag(id: &[u8]) -> String {
    hex::encode(&digest16(id)[..8])
}

pub struct BiometricCaptureController {
    authenticator: Arc<dyn PlatformAuthenticator>,
    random: Arc<dyn RandomSource>,
    relying_party: String,
    timeout: Duration,
}

impl BiometricCaptureController {
    pub fn new(authenticator: Arc<dyn PlatformAuthenticator>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            authenticator,
            random,
            relying_party: DEFAULT_RELYING_PARTY.to_string(),
            timeout: DEFAULT_CEREMONY_TIMEOUT,
        }
    }

    pub fn with_relying_party(mut self, name: impl Into<String>) -> Self {
        self.relying_party = name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one ceremony for `subject` and return the proof token.
    pub async fn capture_biometric(
        &self,
        subject: &CredentialSubject,
    ) -> Result<ProofToken, BiometricError> {
        if !self.authenticator.is_supported() {
            warn!(authenticator = self.authenticator.name(), "platform authenticator unsupported");
            return Err(BiometricError::Unsupported);
        }

        let challenge = BiometricChallenge::generate(self.random.as_ref())?;
        let options = CredentialCreationOptions {
            challenge: challenge.as_bytes(),
            relying_party: &self.relying_party,
            user: UserEntity {
                id: user_handle(&subject.name),
                name: subject.name.clone(),
                display_name: subject.display_name.clone(),
            },
            algorithm: ES256,
            attachment: AuthenticatorAttachment::Platform,
            user_verification: UserVerification::Required,
            timeout: self.timeout,
            attestation: AttestationPreference::None,
        };

        let outcome = self.authenticator.create_credential(&options).await;
        drop(options);
        drop(challenge);

        match outcome {
            Ok(Some(credential)) => {
                info!(credential = %credential_tag(&credential.id), "biometric ceremony completed");
                Ok(ProofToken::verified())
            }
            Ok(None) => {
                warn!("authenticator returned no credential");
                Err(BiometricError::NotVerified)
            }
            Err(PlatformError::Unsupported) => Err(BiometricError::Unsupported),
            Err(e) => {
                warn!(error = %e, "biometric ceremony failed");
                Err(BiometricError::CeremonyFailed(e.to_string()))
            }
        }
    }

    /// Run a ceremony for the record's subject and store the proof.
    pub async fn capture_into(&self, record: &mut SessionRecord) -> Result<(), BiometricError> {
        let subject = record.subject();
        let proof = self.capture_biometric(&subject).await?;
        record.set_biometric_proof(proof);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformCredential;
    use async_trait::async_trait;
    use attest_types::Flow;
    use std::sync::atomic::{AtomicU8, Ordering};
    use std::sync::Mutex;

    /// Counter-based random source: every fill uses a new byte value.
    struct Counter(AtomicU8);

    impl RandomSource for Counter {
        fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), PlatformError> {
            let v = self.0.fetch_add(1, Ordering::SeqCst);
            dest.fill(v);
            Ok(())
        }

        fn name(&self) -> &str {
            "counter"
        }
    }

    struct Authenticator {
        supported: bool,
        outcome: Result<Option<PlatformCredential>, PlatformError>,
        seen: Mutex<Vec<(Vec<u8>, String, UserEntity)>>,
    }

    #[async_trait]
    impl PlatformAuthenticator for Authenticator {
        fn is_supported(&self) -> bool {
            self.supported
        }

        async fn create_credential(
            &self,
            options: &CredentialCreationOptions<'_>,
        ) -> Result<Option<PlatformCredential>, PlatformError> {
            self.seen.lock().unwrap().push((
                options.challenge.to_vec(),
                options.relying_party.to_string(),
                options.user.clone(),
            ));
            self.outcome.clone()
        }

        fn name(&self) -> &str {
            "test-authenticator"
        }
    }

    fn controller(
        supported: bool,
        outcome: Result<Option<PlatformCredential>, PlatformError>,
    ) -> (Arc<Authenticator>, BiometricCaptureController) {
        let auth = Arc::new(Authenticator {
            supported,
            outcome,
            seen: Mutex::new(Vec::new()),
        });
        let controller =
            BiometricCaptureController::new(auth.clone(), Arc::new(Counter(AtomicU8::new(7))));
        (auth, controller)
    }

    fn credential() -> Result<Option<PlatformCredential>, PlatformError> {
        Ok(Some(PlatformCredential {
            id: vec![0xde, 0xad, 0xbe, 0xef],
        }))
    }

    #[tokio::test]
    async fn success_writes_proof_into_record() {
        let (auth, controller) = controller(true, credential());
        let mut record = SessionRecord::check_in("CS101");
        controller.capture_into(&mut record).await.unwrap();
        assert_eq!(record.biometric_proof(), Some(&ProofToken::verified()));

        let seen = auth.seen.lock().unwrap();
        let (challenge, rp, user) = &seen[0];
        assert_eq!(challenge.len(), CHALLENGE_LEN);
        assert_eq!(rp, DEFAULT_RELYING_PARTY);
        assert_eq!(user.name, "CS101");
        assert_eq!(user.id, user_handle("CS101"));
    }

    #[tokio::test]
    async fn every_attempt_uses_a_fresh_challenge() {
        let (auth, controller) = controller(true, credential());
        let subject = SessionRecord::check_in("CS101").subject();
        controller.capture_biometric(&subject).await.unwrap();
        controller.capture_biometric(&subject).await.unwrap();

        let seen = auth.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_ne!(seen[0].0, seen[1].0);
    }

    #[tokio::test]
    async fn unsupported_fails_without_a_ceremony() {
        let (auth, controller) = controller(false, credential());
        let mut record = SessionRecord::new(Flow::CheckIn);
        let err = controller.capture_into(&mut record).await.unwrap_err();
        assert!(matches!(err, BiometricError::Unsupported));
        assert!(auth.seen.lock().unwrap().is_empty());
        assert!(record.biometric_proof().is_none());
    }

    #[tokio::test]
    async fn cancellation_is_a_ceremony_failure() {
        let (_, controller) = controller(true, Err(PlatformError::Denied("NotAllowedError".into())));
        let mut record = SessionRecord::check_in("CS101");
        let err = controller.capture_into(&mut record).await.unwrap_err();
        assert!(matches!(err, BiometricError::CeremonyFailed(_)));
        assert_eq!(
            err.user_message(),
            "Fingerprint authentication failed or was cancelled."
        );
        assert!(record.biometric_proof().is_none());
    }

    #[tokio::test]
    async fn empty_outcome_is_not_verified() {
        let (_, controller) = controller(true, Ok(None));
        let subject = SessionRecord::check_in("CS101").subject();
        let err = controller.capture_biometric(&subject).await.unwrap_err();
        assert!(matches!(err, BiometricError::NotVerified));
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Authenticator whose credential id is the head of the challenge.
    struct ChallengeEcho;

    #[async_trait]
    impl PlatformAuthenticator for ChallengeEcho {
        fn is_supported(&self) -> bool {
            true
        }

        async fn create_credential(
            &self,
            options: &CredentialCreationOptions<'_>,
        ) -> Result<Option<PlatformCredential>, PlatformError> {
            Ok(Some(PlatformCredential {
                id: options.challenge[..16].to_vec(),
            }))
        }

        fn name(&self) -> &str {
            "challenge-echo"
        }
    }

    #[tokio::test]
    async fn challenge_bytes_never_reach_the_logs() {
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let controller = BiometricCaptureController::new(
            Arc::new(ChallengeEcho),
            Arc::new(Counter(AtomicU8::new(0xab))),
        );
        let subject = SessionRecord::check_in("CS101").subject();
        controller.capture_biometric(&subject).await.unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("biometric ceremony completed"), "{output}");
        assert!(output.contains(&credential_tag(&[0xab; 16])), "{output}");
        assert!(!output.contains("abababab"), "{output}");
    }

    #[test]
    fn credential_tag_hides_the_id() {
        let id = [0x5a; 16];
        let tag = credential_tag(&id);
        assert_eq!(tag.len(), 16);
        assert_ne!(tag, hex::encode(&id[..8]));
        assert_eq!(tag, credential_tag(&id));
    }

    #[test]
    fn user_handle_is_stable_per_subject() {
        assert_eq!(user_handle("CS101"), user_handle("CS101"));
        assert_ne!(user_handle("CS101"), user_handle("CS102"));
    }
}
