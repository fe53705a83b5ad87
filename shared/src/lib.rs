// ===== PROTOCOL & DOMAIN =====
pub mod protocol;
pub mod summary;

// ===== PAGE-SIDE LOGIC =====
pub mod coordinator;
pub mod form;
pub mod view;

// ===== AMBIENT =====
pub mod config;
pub mod error;
#[cfg(feature = "js")]
pub mod js;

pub use config::PageConfig;
pub use coordinator::{Coordinator, Ignored, Outcome, Phase, UnitHandle};
pub use error::{GseaError, INITIALIZATION_PREFIX, InputParseError};
pub use form::FormInput;
pub use protocol::{AnalysisRequest, GeneSets, UnitEvent, WorkerStatus};
pub use summary::{AnalysisResult, TermSummary};
pub use view::{ResultView, SummaryRow};
