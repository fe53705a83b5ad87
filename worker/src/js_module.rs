//! The analysis module as seen from inside the worker: an ES module that is
//! imported at runtime, initialized through its default export and then
//! called through one named function.

use crate::unit::{AnalysisModule, ModuleLoader};
use js_sys::{Array, BigInt, Function, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use serde_wasm_bindgen::Serializer;
use shared::AnalysisRequest;
use shared::js::describe;
use shared::protocol::deserialize_lossless;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen(inline_js = r#"
export function import_module(url) {
  return import(url);
}
"#)]
extern "C" {
    #[wasm_bindgen(catch)]
    fn import_module(url: &str) -> Result<Promise, JsValue>;
}

async fn settle(value: JsValue) -> Result<JsValue, JsValue> {
    match value.dyn_into::<Promise>() {
        Ok(promise) => JsFuture::from(promise).await,
        Err(value) => Ok(value),
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, String> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|error| error.to_string())
}

pub struct JsModuleLoader {
    url: String,
    entry_point: String,
}

impl JsModuleLoader {
    pub fn new(url: String, entry_point: String) -> Self {
        Self { url, entry_point }
    }
}

impl ModuleLoader for JsModuleLoader {
    type Module = JsAnalysisModule;

    async fn load(&self) -> Result<JsAnalysisModule, String> {
        let namespace = match import_module(&self.url) {
            Ok(promise) => JsFuture::from(promise).await,
            Err(error) => Err(error),
        }
        .map_err(|error| describe(&error))?;

        // wasm-bindgen bundles export their instantiation as `default`.
        let init = Reflect::get(&namespace, &JsValue::from_str("default"))
            .map_err(|error| describe(&error))?;
        if let Some(init) = init.dyn_ref::<Function>() {
            let pending = init.call0(&JsValue::UNDEFINED).map_err(|error| describe(&error))?;
            settle(pending).await.map_err(|error| describe(&error))?;
        }

        let entry = Reflect::get(&namespace, &JsValue::from_str(&self.entry_point))
            .map_err(|error| describe(&error))?
            .dyn_into::<Function>()
            .map_err(|_| format!("module {} has no function export '{}'", self.url, self.entry_point))?;
        Ok(JsAnalysisModule { entry })
    }
}

pub struct JsAnalysisModule {
    entry: Function,
}

impl AnalysisModule for JsAnalysisModule {
    async fn prerank(&self, request: &AnalysisRequest) -> Result<Value, String> {
        let arguments = Array::new();
        arguments.push(&to_js(&request.genes)?);
        arguments.push(&to_js(&request.metric)?);
        arguments.push(&to_js(&request.gene_sets)?);
        arguments.push(&JsValue::from_f64(request.weight));
        arguments.push(&JsValue::from(request.min_size));
        arguments.push(&JsValue::from(request.max_size));
        arguments.push(&JsValue::from(request.nperm));
        arguments.push(&BigInt::from(request.seed).into());

        let returned = self
            .entry
            .apply(&JsValue::UNDEFINED, &arguments)
            .map_err(|error| describe(&error))?;
        let result = settle(returned).await.map_err(|error| describe(&error))?;
        // Scores may be NaN or infinite; they must not collapse to null.
        deserialize_lossless(serde_wasm_bindgen::Deserializer::from(result))
            .map_err(|error| error.to_string())
    }
}
