//! The computation unit: owns the analysis module and turns every request
//! into exactly one terminal [`WorkerStatus`].

use serde_json::Value;
use shared::{AnalysisRequest, GseaError, WorkerStatus};
use std::future::Future;

/// The external analysis module, reduced to its single entry point.
pub trait AnalysisModule {
    /// Runs one prerank analysis. The returned value is passed on untouched.
    fn prerank(&self, request: &AnalysisRequest) -> impl Future<Output = Result<Value, String>>;
}

/// Brings an [`AnalysisModule`] up. Called once per session.
pub trait ModuleLoader {
    type Module: AnalysisModule;

    fn load(&self) -> impl Future<Output = Result<Self::Module, String>>;
}

pub struct ComputationUnit<M: AnalysisModule> {
    module: M,
    handled: u64,
}

impl<M: AnalysisModule> ComputationUnit<M> {
    /// Loads the module. On failure the returned status is the only message
    /// the unit will ever send; there is no retry.
    pub async fn initialize<L>(loader: &L) -> Result<Self, WorkerStatus>
    where
        L: ModuleLoader<Module = M>,
    {
        match loader.load().await {
            Ok(module) => Ok(Self { module, handled: 0 }),
            Err(error) => Err(WorkerStatus::error(
                GseaError::Initialization(error).to_string(),
            )),
        }
    }

    /// Number of requests answered so far.
    pub fn handled(&self) -> u64 {
        self.handled
    }

    pub async fn handle(&mut self, request: &AnalysisRequest) -> WorkerStatus {
        self.handled += 1;
        match self.module.prerank(request).await {
            Ok(result) => WorkerStatus::Success { result },
            Err(error) => WorkerStatus::error(error),
        }
    }

    /// Answers a message that may not have decoded into a request.
    pub async fn handle_message(
        &mut self,
        decoded: Result<AnalysisRequest, String>,
    ) -> WorkerStatus {
        match decoded {
            Ok(request) => self.handle(&request).await,
            Err(error) => {
                self.handled += 1;
                WorkerStatus::error(format!("Malformed request: {error}"))
            }
        }
    }
}
