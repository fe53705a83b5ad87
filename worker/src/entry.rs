use crate::js_module::JsModuleLoader;
use crate::unit::ComputationUnit;
use futures::StreamExt;
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use shared::js::describe;
use shared::{AnalysisRequest, WorkerStatus};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{DedicatedWorkerGlobalScope, MessageEvent};

fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(&format!("[gsea-worker] {message}")));
}

fn post(scope: &DedicatedWorkerGlobalScope, status: &WorkerStatus) {
    let message = match status.serialize(&Serializer::json_compatible()) {
        Ok(message) => message,
        Err(error) => {
            // The module answered with something that cannot cross the
            // boundary; the page still gets its one terminal message.
            let fallback = WorkerStatus::error(format!("Failed to send result: {error}"));
            match fallback.serialize(&Serializer::json_compatible()) {
                Ok(message) => message,
                Err(_) => return,
            }
        }
    };
    if let Err(error) = scope.post_message(&message) {
        log(&format!("postMessage failed: {}", describe(&error)));
    }
}

/// Entry point called by the bootstrap script once this bundle is
/// instantiated inside the dedicated worker.
#[wasm_bindgen]
pub fn start_unit(module_url: String, entry_point: String) {
    let scope: DedicatedWorkerGlobalScope = js_sys::global().unchecked_into();
    wasm_bindgen_futures::spawn_local(run(scope, JsModuleLoader::new(module_url, entry_point)));
}

async fn run(scope: DedicatedWorkerGlobalScope, loader: JsModuleLoader) {
    log("loading analysis module");
    let mut unit = match ComputationUnit::initialize(&loader).await {
        Ok(unit) => unit,
        Err(status) => {
            log("analysis module failed to load");
            post(&scope, &status);
            return;
        }
    };

    // Requests are queued and drained one at a time, in arrival order, even
    // if the module answers asynchronously.
    let (request_sender, mut request_stream) = futures::channel::mpsc::unbounded::<JsValue>();
    let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        let _ = request_sender.unbounded_send(event.data());
    });
    scope.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

    post(&scope, &WorkerStatus::Ready);
    log("ready");

    while let Some(data) = request_stream.next().await {
        let decoded = serde_wasm_bindgen::from_value::<AnalysisRequest>(data)
            .map_err(|error| error.to_string());
        let status = unit.handle_message(decoded).await;
        log(&format!("request {} answered", unit.handled()));
        post(&scope, &status);
    }

    drop(on_message);
}
