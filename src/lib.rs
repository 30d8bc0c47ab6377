// Core functionality
pub mod core {
    pub mod config;
    pub mod error;
    pub mod logging;
}

// Search service access
pub mod search {
    pub mod backend;
    pub mod model;
    pub mod orchestrator;
}

// User interfaces
pub mod ui {
    pub mod cli;
    pub mod highlight;
    pub mod input;
    pub mod results;
    pub mod suggestions;
    pub mod tui;
}

// Re-export commonly used types
pub use crate::core::config::{Config, ConfigOverrides};
pub use crate::core::error::{Error, Result};
pub use crate::search::backend::{HttpBackend, SearchBackend};
pub use crate::search::model::{QueryType, SearchRequest, SnippetResult};
pub use crate::search::orchestrator::{RequestId, SearchOrchestrator, SearchState, Settlement};
pub use crate::ui::cli::Cli;
pub use crate::ui::input::QueryInput;
pub use crate::ui::results::ResultView;
pub use crate::ui::tui::SearchTui;
