//! Result of a completed processing session.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Summary returned to the uploader once a session completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessingSummary {
    /// Number of distinct identities that ever reached violation status
    #[serde(rename = "tracked_objects")]
    pub violation_count: usize,
    /// Where the annotated video can be fetched
    pub video_url: String,
    /// Where the snapshot can be fetched, if one was produced
    pub snapshot_url: Option<String>,
}
