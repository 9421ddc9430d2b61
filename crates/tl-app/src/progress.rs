#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingConfig,
    CheckingCache,
    LoadingCachedResult,
    Compiling,
    Simulating,
    SavingResults,
    Completed,
}

impl RunStage {
    pub fn label(&self) -> &'static str {
        match self {
            RunStage::LoadingConfig => "loading",
            RunStage::CheckingCache => "cache",
            RunStage::LoadingCachedResult => "cache-load",
            RunStage::Compiling => "compile",
            RunStage::Simulating => "integrate",
            RunStage::SavingResults => "save",
            RunStage::Completed => "done",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulationProgress {
    pub sim_time_d: f64,
    pub t_end_d: f64,
    pub fraction_complete: f64,
    pub step: usize,
    pub steps: usize,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub simulation: Option<SimulationProgress>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
            simulation: None,
        }
    }
}
