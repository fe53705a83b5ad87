use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use shared::js::describe;
use shared::{AnalysisRequest, PageConfig, UnitEvent, UnitHandle, WorkerStatus};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, ErrorEvent, MessageEvent, Url, Worker, WorkerOptions, WorkerType};

/// Module script run as the worker. It imports and instantiates the unit's
/// own bundle, then hands over the analysis module location. Both steps sit
/// inside the `try`, so a bundle that fails to fetch or instantiate is still
/// answered with the initialization error the page waits for.
pub fn bootstrap_script(script_url: &str, wasm_url: &str, module_url: &str, entry_point: &str) -> String {
    let quote = |text: &str| serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r#"try {{
  const {{ default: init, start_unit }} = await import({script});
  await init({{ module_or_path: {wasm} }});
  start_unit({module}, {entry});
}} catch (error) {{
  self.postMessage({{ status: "error", error: {prefix} + String(error) }});
}}
"#,
        script = quote(script_url),
        wasm = quote(wasm_url),
        module = quote(module_url),
        entry = quote(entry_point),
        prefix = quote(shared::INITIALIZATION_PREFIX),
    )
}

/// Resolves a configured path against the page URL; the bootstrap runs from
/// a `blob:` URL, where relative specifiers do not resolve.
fn absolute_url(path: &str) -> Result<String, String> {
    let window = web_sys::window().ok_or("No window available")?;
    let base = window.location().href().map_err(|error| describe(&error))?;
    Url::new_with_base(path, &base)
        .map(|url| url.href())
        .map_err(|error| describe(&error))
}

/// [`UnitHandle`] backed by a dedicated module Web Worker.
///
/// Everything the worker says is pushed, in order, into the event stream
/// returned by [`WebWorkerUnit::new`].
pub struct WebWorkerUnit {
    config: PageConfig,
    event_sender: UnboundedSender<UnitEvent>,
    worker: Option<Worker>,
    bootstrap_url: Option<String>,
    _on_message: Option<Closure<dyn FnMut(MessageEvent)>>,
    _on_error: Option<Closure<dyn FnMut(ErrorEvent)>>,
}

impl WebWorkerUnit {
    pub fn new(config: PageConfig) -> (Self, UnboundedReceiver<UnitEvent>) {
        let (event_sender, event_stream) = unbounded();
        let unit = WebWorkerUnit {
            config,
            event_sender,
            worker: None,
            bootstrap_url: None,
            _on_message: None,
            _on_error: None,
        };
        (unit, event_stream)
    }

    fn bootstrap_blob_url(&self) -> Result<String, String> {
        let script = bootstrap_script(
            &absolute_url(&self.config.worker.script)?,
            &absolute_url(&self.config.worker.wasm)?,
            &absolute_url(&self.config.module.url)?,
            &self.config.module.entry_point,
        );
        let parts = js_sys::Array::of1(&JsValue::from_str(&script));
        let options = BlobPropertyBag::new();
        options.set_type("text/javascript");
        let blob = Blob::new_with_str_sequence_and_options(&parts, &options)
            .map_err(|error| describe(&error))?;
        Url::create_object_url_with_blob(&blob).map_err(|error| describe(&error))
    }
}

impl UnitHandle for WebWorkerUnit {
    fn start(&mut self) -> Result<(), String> {
        let bootstrap_url = self.bootstrap_blob_url()?;
        let options = WorkerOptions::new();
        options.set_type(WorkerType::Module);
        let worker = Worker::new_with_options(&bootstrap_url, &options)
            .map_err(|error| describe(&error))?;

        let sender = self.event_sender.clone();
        let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            let unit_event = match serde_wasm_bindgen::from_value::<WorkerStatus>(event.data()) {
                Ok(status) => UnitEvent::Status(status),
                Err(error) => UnitEvent::Malformed(error.to_string()),
            };
            let _ = sender.unbounded_send(unit_event);
        });
        worker.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        let sender = self.event_sender.clone();
        let on_error = Closure::<dyn FnMut(ErrorEvent)>::new(move |event: ErrorEvent| {
            event.prevent_default();
            let _ = sender.unbounded_send(UnitEvent::Fault(event.message()));
        });
        worker.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        zoon::println!("Worker started from {}", self.config.worker.script);
        self.worker = Some(worker);
        self.bootstrap_url = Some(bootstrap_url);
        self._on_message = Some(on_message);
        self._on_error = Some(on_error);
        Ok(())
    }

    fn dispatch(&mut self, request: &AnalysisRequest) -> Result<(), String> {
        let worker = self.worker.as_ref().ok_or("Worker is not running")?;
        // Seeds use the full u64 range; BigInt keeps every bit.
        let serializer = Serializer::json_compatible().serialize_large_number_types_as_bigints(true);
        let message = request
            .serialize(&serializer)
            .map_err(|error| error.to_string())?;
        worker.post_message(&message).map_err(|error| describe(&error))
    }

    fn terminate(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.set_onmessage(None);
            worker.set_onerror(None);
            worker.terminate();
            zoon::println!("Worker terminated");
        }
        if let Some(url) = self.bootstrap_url.take() {
            let _ = Url::revoke_object_url(&url);
        }
        self._on_message = None;
        self._on_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_imports_bundle_and_starts_unit() {
        let script = bootstrap_script(
            "http://localhost:8080/_api/public/worker/gsea_worker.js",
            "http://localhost:8080/_api/public/worker/gsea_worker_bg.wasm",
            "http://localhost:8080/_api/public/pkg/gsea_rs.js",
            "prerank_rs",
        );
        assert!(script.starts_with("try {"));
        assert!(script.contains(
            "await import(\"http://localhost:8080/_api/public/worker/gsea_worker.js\");"
        ));
        assert!(script.contains("start_unit(\"http://localhost:8080/_api/public/pkg/gsea_rs.js\", \"prerank_rs\");"));
        assert!(script.contains("\"Failed to initialize WebAssembly: \" + String(error)"));
    }

    #[test]
    fn bootstrap_quotes_urls() {
        let script = bootstrap_script("/a\"b.js", "/w.wasm", "/m.js", "run");
        assert!(script.contains(r#"import("/a\"b.js");"#));
    }
}
