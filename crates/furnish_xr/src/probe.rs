//! Scripted surface probe for headless sessions and tests.
//!
//! Stands in for a tracking runtime: the caller decides when the source
//! resolves and what pose (if any) the probe reports each frame.

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::{FrameTiming, Pose, SurfaceProbe, XrError};

/// Source handed out by [`ScriptedSurfaceProbe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptedSource {
    /// Request generation this source was issued for
    pub generation: u32,
}

/// Surface probe driven by the caller instead of a tracking runtime.
#[derive(Debug, Default)]
pub struct ScriptedSurfaceProbe {
    /// Pose reported to every query while set
    current: Option<Pose>,
    /// Resolve requests as soon as they are made
    resolve_immediately: bool,
    /// Outstanding request waiting for `resolve_pending`
    pending: Option<Sender<Result<ScriptedSource, XrError>>>,
    /// Number of requests made so far
    requests: u32,
    /// Number of queries answered so far
    queries: u64,
}

impl ScriptedSurfaceProbe {
    /// Probe whose requests stay pending until `resolve_pending` is called
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe that resolves every request right away
    pub fn immediate() -> Self {
        Self {
            resolve_immediately: true,
            ..Self::default()
        }
    }

    /// Report `pose` from now on
    pub fn set_pose(&mut self, pose: Pose) {
        self.current = Some(pose);
    }

    /// Report "no surface found" from now on
    pub fn clear_pose(&mut self) {
        self.current = None;
    }

    /// Pose currently reported
    pub fn pose(&self) -> Option<Pose> {
        self.current
    }

    /// Resolve the outstanding request, if any. Returns whether one was resolved.
    pub fn resolve_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(tx) => {
                let source = ScriptedSource {
                    generation: self.requests,
                };
                // Receiver may already be gone after a session end
                let _ = tx.send(Ok(source));
                true
            }
            None => false,
        }
    }

    /// Fail the outstanding request, if any
    pub fn fail_pending(&mut self, reason: impl Into<String>) -> bool {
        match self.pending.take() {
            Some(tx) => {
                let _ = tx.send(Err(XrError::SourceUnavailable(reason.into())));
                true
            }
            None => false,
        }
    }

    /// Number of source requests received
    pub fn request_count(&self) -> u32 {
        self.requests
    }

    /// Number of per-frame queries answered
    pub fn query_count(&self) -> u64 {
        self.queries
    }

    /// Whether a request is waiting to be resolved
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl SurfaceProbe for ScriptedSurfaceProbe {
    type Source = ScriptedSource;

    fn request_source(&mut self) -> Receiver<Result<ScriptedSource, XrError>> {
        let (tx, rx) = bounded(1);
        self.requests += 1;
        log::debug!("Surface probe source requested (#{})", self.requests);

        self.pending = Some(tx);
        if self.resolve_immediately {
            self.resolve_pending();
        }
        rx
    }

    fn query(&mut self, _source: &ScriptedSource, _timing: &FrameTiming) -> Option<Pose> {
        self.queries += 1;
        self.current
    }

    fn release_source(&mut self) {
        self.pending = None;
    }
}
