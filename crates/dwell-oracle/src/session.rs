//! Per-upload tracking session.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use dwell_media::artifacts::encode_jpeg;
use dwell_media::{Frame, MediaResult, TrackingOracle};
use dwell_models::{SessionId, TrackedObject};

use crate::client::OracleClient;
use crate::error::{OracleError, OracleResult};
use crate::types::TrackRequest;

/// [`TrackingOracle`] backed by the tracking service.
///
/// Every request carries the session ID, so identities persist across the
/// frames of one upload and never leak into the next one.
#[derive(Debug, Clone)]
pub struct OracleSession {
    client: OracleClient,
    session_id: SessionId,
    requests: u64,
}

impl OracleSession {
    pub fn new(client: OracleClient, session_id: SessionId) -> Self {
        Self {
            client,
            session_id,
            requests: 0,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Number of frames sent so far.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    fn build_request(&self, frame: &Frame, persist: bool) -> OracleResult<TrackRequest> {
        let jpeg = encode_jpeg(frame, self.client.config().jpeg_quality)
            .map_err(|e| OracleError::Encode(e.to_string()))?;

        Ok(TrackRequest {
            session_id: self.session_id.to_string(),
            persist,
            width: frame.width(),
            height: frame.height(),
            image: STANDARD.encode(jpeg),
        })
    }
}

#[async_trait]
impl TrackingOracle for OracleSession {
    async fn track(&mut self, frame: &Frame, persist: bool) -> MediaResult<Vec<TrackedObject>> {
        let request = self.build_request(frame, persist)?;
        self.requests += 1;
        Ok(self.client.track(&request).await?)
    }
}
