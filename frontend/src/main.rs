//! GSEA page entry point

use std::sync::OnceLock;
use zoon::*;

/// Stores the main application task handle to prevent it from being dropped.
static MAIN_TASK: OnceLock<TaskHandle> = OnceLock::new();

mod app;
mod config;
mod form;
mod results;
mod worker_unit;

pub fn main() {
    let handle = Task::start_droppable(async {
        let app = crate::app::GseaApp::new(crate::config::load_page_config());
        let root_element = app.root();
        // The app owns the worker and its event loop; it lives as long as the page.
        std::mem::forget(app);
        start_app("app", move || root_element);
    });
    let _ = MAIN_TASK.set(handle);
}
