//! Drive source supervision
//!
//! Exactly one source drives the active token: the engine's boundary stream
//! (authoritative) or the fallback estimator (estimated). The first real
//! boundary always wins and the estimator is never restarted for that
//! utterance afterwards.

/// Which source currently drives the active token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriveSource {
    #[default]
    Authoritative,
    Estimated,
}

/// Action the controller must take after a supervisor transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    StartEstimator,
    StopEstimator,
}

/// Two-state supervisor for one utterance
#[derive(Debug, Clone, Default)]
pub struct DriveSupervisor {
    source: DriveSource,
    boundary_seen: bool,
}

impl DriveSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous utterance
    pub fn reset(&mut self) {
        self.source = DriveSource::Authoritative;
        self.boundary_seen = false;
    }

    pub fn source(&self) -> DriveSource {
        self.source
    }

    pub fn boundary_seen(&self) -> bool {
        self.boundary_seen
    }

    /// A real boundary event arrived
    pub fn on_boundary(&mut self) -> Transition {
        self.boundary_seen = true;
        match self.source {
            DriveSource::Estimated => {
                self.source = DriveSource::Authoritative;
                Transition::StopEstimator
            }
            DriveSource::Authoritative => Transition::None,
        }
    }

    /// The grace period expired
    pub fn on_grace_elapsed(&mut self) -> Transition {
        if self.boundary_seen || self.source == DriveSource::Estimated {
            return Transition::None;
        }
        self.source = DriveSource::Estimated;
        Transition::StartEstimator
    }

    /// Estimated ticks may move the active token
    pub fn accepts_estimate(&self) -> bool {
        self.source == DriveSource::Estimated
    }
}
