use thiserror::Error;

use crate::target::TargetId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("unknown render target {0}")]
    UnknownTarget(TargetId),
    #[error("render target {0} is auto-updated; only manual targets are advanced by the host")]
    NotManual(TargetId),
    #[error("orchestrator is already in use on this thread")]
    Reentrant,
}
