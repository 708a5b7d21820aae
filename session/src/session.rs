//! The capture view orchestrator.
//!
//! An [`AttendanceSession`] owns the [`SessionRecord`] for one enrol or
//! check-in view together with the controller for each factor. Captures run
//! independently and each writes only its own slice of the record. Submit
//! validates whatever has been captured at that instant and sends it only
//! if every active rule passes.
//!
//! The location request runs as a background task once started, so the
//! user can work the camera and the authenticator while it is out. Its fix
//! is collected by [`AttendanceSession::locate`], by
//! [`AttendanceSession::poll_location`], and before every submit.
//!
//! Results that settle after the view went away are dropped: every step
//! re-checks the [`ActivityHandle`] after its suspension point and leaves
//! the record untouched when the session is no longer active.

use attest_capture::{
    BiometricCaptureController, CameraState, FaceCaptureController, GeolocationAcquirer,
    NetworkIdentityProbe,
};
use attest_submit::{SubmissionPipeline, SuccessMessage};
use attest_types::{
    CaptureOutcome, EnrolmentProfile, Flow, LocationFix, NetworkIdentity, SessionRecord,
};
use attest_validation::{validate, RuleSet, ValidationContext};
use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::status::{StatusLine, DETECTING_LOCATION, PHOTO_CAPTURED};
use crate::{AttestConfig, AttestError, Capabilities};

/// Shared liveness flag for a session. Clone it into whatever tracks the
/// view's lifetime (navigation, a shutdown signal) and call
/// [`deactivate`](Self::deactivate) when the view goes away.
///
/// The handle cannot reach the camera itself. The session releases it on
/// its next step or state query, and [`AttendanceSession::unmount`]
/// releases it at once.
#[derive(Clone, Debug)]
pub struct ActivityHandle(Arc<AtomicBool>);

impl ActivityHandle {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn deactivate(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct AttendanceSession {
    record: SessionRecord,
    rules: RuleSet,
    geolocation: GeolocationAcquirer,
    network: NetworkIdentityProbe,
    camera: FaceCaptureController,
    biometric: BiometricCaptureController,
    pipeline: SubmissionPipeline,
    activity: ActivityHandle,
    status: Option<StatusLine>,
    pending_location: Option<JoinHandle<LocationFix>>,
}

fn spawn_fix(geolocation: &GeolocationAcquirer) -> JoinHandle<LocationFix> {
    let geolocation = geolocation.clone();
    tokio::spawn(async move { geolocation.acquire_fix().await })
}

impl AttendanceSession {
    /// Mount a fresh session for `flow`.
    pub fn new(flow: Flow, config: &AttestConfig, caps: Capabilities) -> Self {
        let network = match caps.wifi {
            Some(source) => NetworkIdentityProbe::new(source, config.network_fallback.clone()),
            None => NetworkIdentityProbe::without_platform(config.network_fallback.clone()),
        };
        let camera = FaceCaptureController::new(caps.camera, config.video.clone())
            .with_stabilization(config.stabilization());
        let biometric = BiometricCaptureController::new(caps.authenticator, caps.random)
            .with_relying_party(config.relying_party.clone())
            .with_timeout(config.ceremony_timeout());

        debug!(%flow, "session mounted");
        Self {
            record: SessionRecord::new(flow),
            rules: RuleSet::from_config(&config.policy),
            geolocation: GeolocationAcquirer::new(caps.geolocation),
            network,
            camera,
            biometric,
            pipeline: SubmissionPipeline::new(caps.backend),
            activity: ActivityHandle::new(),
            status: None,
            pending_location: None,
        }
    }

    // ── Identity fields ────────────────────────────────────────────────

    pub fn flow(&self) -> Flow {
        self.record.flow()
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn set_roll_number(&mut self, roll_number: impl Into<String>) {
        self.record.roll_number = roll_number.into();
    }

    /// Profile fields, for enrolment sessions only.
    pub fn profile_mut(&mut self) -> Option<&mut EnrolmentProfile> {
        self.record.profile.as_mut()
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Toggle policy rules at runtime.
    pub fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    // ── Lifecycle ──────────────────────────────────────────────────────

    pub fn activity(&self) -> ActivityHandle {
        self.activity.clone()
    }

    pub fn is_active(&self) -> bool {
        self.activity.is_active()
    }

    /// Stop accepting results, cancel an outstanding location request and
    /// release the camera.
    pub fn deactivate(&mut self) {
        self.activity.deactivate();
        if let Some(task) = self.pending_location.take() {
            task.abort();
        }
        self.camera.close();
        debug!(flow = %self.record.flow(), "session deactivated");
    }

    /// Tear the view down. The record is discarded with the session.
    pub fn unmount(mut self) {
        self.deactivate();
    }

    fn ensure_active(&self) -> Result<(), AttestError> {
        if self.activity.is_active() {
            Ok(())
        } else {
            Err(AttestError::Inactive)
        }
    }

    /// After a suspension point: drop the result if the view went away.
    fn still_active(&mut self, step: &str) -> Result<(), AttestError> {
        if self.activity.is_active() {
            return Ok(());
        }
        debug!(step, "discarding result that settled after deactivation");
        self.camera.close();
        Err(AttestError::Inactive)
    }

    fn release_if_inactive(&mut self) {
        if !self.activity.is_active() && self.camera.state() != CameraState::Closed {
            debug!("releasing camera after deactivation");
            self.camera.close();
        }
    }

    // ── Passive captures ───────────────────────────────────────────────

    /// Issue the geolocation request in the background and return at once.
    /// A no-op while a request is already out.
    pub fn start_locating(&mut self) -> Result<(), AttestError> {
        self.ensure_active()?;
        if self.pending_location.is_none() {
            self.pending_location = Some(spawn_fix(&self.geolocation));
        }
        Ok(())
    }

    /// Wait for the geolocation request, issuing one if none is out, and
    /// settle the record's location.
    pub async fn locate(&mut self) -> Result<LocationFix, AttestError> {
        self.ensure_active()?;
        let task = self
            .pending_location
            .get_or_insert_with(|| spawn_fix(&self.geolocation));
        let joined = task.await;
        self.pending_location = None;
        self.still_active("geolocation")?;
        let fix = joined.unwrap_or(LocationFix::Unavailable);
        self.record.apply(CaptureOutcome::Location(fix));
        Ok(fix)
    }

    /// Apply a background fix if it has arrived, without waiting, and
    /// return the record's location.
    pub fn poll_location(&mut self) -> LocationFix {
        let finished = self
            .pending_location
            .as_ref()
            .is_some_and(JoinHandle::is_finished);
        if finished && self.activity.is_active() {
            if let Some(task) = self.pending_location.take() {
                let fix = task
                    .now_or_never()
                    .and_then(Result::ok)
                    .unwrap_or(LocationFix::Unavailable);
                self.record.apply(CaptureOutcome::Location(fix));
            }
        }
        self.record.location()
    }

    /// Run the network probe and store the identity it reports.
    pub async fn probe_network(&mut self) -> Result<NetworkIdentity, AttestError> {
        self.ensure_active()?;
        let identity = self.network.probe().await;
        self.still_active("network probe")?;
        self.record.apply(CaptureOutcome::Network(identity.clone()));
        Ok(identity)
    }

    /// Run geolocation and the network probe concurrently, applying each
    /// result as soon as it settles.
    pub async fn gather_passive(&mut self) -> Result<(), AttestError> {
        self.ensure_active()?;
        let location = self
            .pending_location
            .get_or_insert_with(|| spawn_fix(&self.geolocation));
        let network = &self.network;
        let record = &mut self.record;
        let activity = &self.activity;

        let mut pending: FuturesUnordered<BoxFuture<'_, CaptureOutcome>> = FuturesUnordered::new();
        pending.push(
            async move {
                let fix = location.await.unwrap_or(LocationFix::Unavailable);
                CaptureOutcome::Location(fix)
            }
            .boxed(),
        );
        pending.push(async move { CaptureOutcome::Network(network.probe().await) }.boxed());

        let mut discarded = false;
        while let Some(outcome) = pending.next().await {
            if activity.is_active() {
                record.apply(outcome);
            } else {
                discarded = true;
            }
        }
        drop(pending);
        self.pending_location = None;

        if discarded {
            return self.still_active("passive gather");
        }
        Ok(())
    }

    // ── Face ───────────────────────────────────────────────────────────

    pub fn camera_state(&mut self) -> CameraState {
        self.release_if_inactive();
        self.camera.state()
    }

    pub fn camera_tracks(&mut self) -> usize {
        self.release_if_inactive();
        self.camera.active_tracks()
    }

    pub async fn open_camera(&mut self) -> Result<(), AttestError> {
        self.ensure_active()?;
        self.status = None;
        let result = self.camera.request_capture().await;
        self.still_active("camera request")?;
        result.map_err(|e| self.fail(e.into()))
    }

    /// Suspend until the camera has stabilized.
    pub async fn wait_for_camera(&mut self) -> Result<CameraState, AttestError> {
        self.ensure_active()?;
        let state = self.camera.wait_until_ready().await;
        self.still_active("camera stabilization")?;
        Ok(state)
    }

    /// Take or retake the face still. `Ok(false)` while the camera is not
    /// ready yet.
    pub fn take_photo(&mut self) -> Result<bool, AttestError> {
        self.ensure_active()?;
        match self.camera.take_photo(&mut self.record) {
            Ok(true) => {
                self.status = Some(StatusLine::info(PHOTO_CAPTURED));
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    pub fn close_camera(&mut self) {
        self.camera.close();
    }

    // ── Biometric ──────────────────────────────────────────────────────

    pub async fn capture_biometric(&mut self) -> Result<(), AttestError> {
        self.ensure_active()?;
        let subject = self.record.subject();
        let result = self.biometric.capture_biometric(&subject).await;
        self.still_active("biometric ceremony")?;
        match result {
            Ok(proof) => {
                self.record.apply(CaptureOutcome::Biometric(proof));
                self.status = None;
                Ok(())
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    // ── Submission ─────────────────────────────────────────────────────

    /// Whether the submit control is enabled: the session is live and the
    /// location request has settled. A second submit cannot start while one
    /// is in flight because [`submit`](Self::submit) holds `&mut self`.
    pub fn can_submit(&self) -> bool {
        let fix_arrived = self
            .pending_location
            .as_ref()
            .is_some_and(JoinHandle::is_finished);
        self.activity.is_active() && (self.record.location().is_settled() || fix_arrived)
    }

    /// Run validation without submitting.
    pub fn check(&self, ctx: &ValidationContext) -> Result<(), AttestError> {
        validate(&self.record, &self.rules, ctx)
            .map(|_| ())
            .map_err(AttestError::from)
    }

    /// Validate against the local clock and submit.
    pub async fn submit(&mut self) -> Result<SuccessMessage, AttestError> {
        self.submit_at(&ValidationContext::now()).await
    }

    /// Validate the record as it stands and, if it passes, send it.
    ///
    /// On success the record is discarded and the camera released. On any
    /// failure the record is left as it was so the user can fix one factor
    /// and resubmit.
    pub async fn submit_at(
        &mut self,
        ctx: &ValidationContext,
    ) -> Result<SuccessMessage, AttestError> {
        self.ensure_active()?;
        if !self.poll_location().is_settled() {
            self.status = Some(StatusLine::info(DETECTING_LOCATION));
            return Err(AttestError::NotReady(DETECTING_LOCATION.to_string()));
        }
        self.status = None;

        let verified = match validate(&self.record, &self.rules, ctx) {
            Ok(verified) => verified,
            Err(failure) => {
                info!(rule = %failure.rule, "submission blocked by validation");
                return Err(self.fail(failure.into()));
            }
        };
        let result = self.pipeline.submit(verified).await;
        self.still_active("submission")?;

        match result {
            Ok(message) => {
                self.status = Some(StatusLine::success(message.as_str()));
                self.record.reset();
                self.camera.close();
                Ok(message)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    fn fail(&mut self, error: AttestError) -> AttestError {
        self.status = Some(StatusLine::error(error.user_message()));
        error
    }
}
