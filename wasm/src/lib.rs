use mindflow_renderer::theme::Theme;
use mindflow_renderer::{Config, DiagramView, GraphDocument, Point, export_document_svg};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiagramOptions {
    theme: Option<String>,
    font_family: Option<String>,
    fast_text: Option<bool>,
}

fn build_config(options: DiagramOptions) -> Config {
    let mut config = Config::default();
    if let Some(theme) = options.theme.as_deref().and_then(Theme::from_name) {
        config.theme = theme;
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(fast_text) = options.fast_text {
        config.layout.fast_text_metrics = fast_text;
    }
    config
}

fn parse_options(options_json: Option<String>) -> Result<DiagramOptions, JsValue> {
    match options_json {
        Some(raw_options) => serde_json::from_str::<DiagramOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(DiagramOptions::default()),
    }
}

fn js_error(error: impl ToString) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Browser-side handle on one live diagram view.
#[wasm_bindgen]
pub struct DiagramHandle {
    view: DiagramView,
}

#[wasm_bindgen]
impl DiagramHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, options_json: Option<String>) -> Result<DiagramHandle, JsValue> {
        let mut view = DiagramView::new(build_config(parse_options(options_json)?));
        view.resize(width, height).map_err(js_error)?;
        Ok(DiagramHandle { view })
    }

    pub fn load(&mut self, document_json: &str) -> Result<(), JsValue> {
        self.view.load_json(document_json).map_err(js_error)
    }

    pub fn pan(&mut self, dx: f32, dy: f32) -> Result<(), JsValue> {
        self.view.pan(dx, dy).map(|_| ()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self, x: f32, y: f32) {
        self.view.begin_drag(Point::new(x, y));
    }

    #[wasm_bindgen(js_name = dragTo)]
    pub fn drag_to(&mut self, x: f32, y: f32) -> Result<(), JsValue> {
        self.view.drag_to(Point::new(x, y)).map(|_| ()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = endDrag)]
    pub fn end_drag(&mut self) {
        self.view.end_drag();
    }

    #[wasm_bindgen(js_name = zoomBy)]
    pub fn zoom_by(&mut self, factor: f32) -> Result<(), JsValue> {
        self.view.zoom_by(factor).map(|_| ()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) -> Result<(), JsValue> {
        self.view.zoom_in().map(|_| ()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) -> Result<(), JsValue> {
        self.view.zoom_out().map(|_| ()).map_err(js_error)
    }

    /// Wheel handler: pass the pointer in canvas pixels and the event's deltaY.
    #[wasm_bindgen(js_name = zoomAt)]
    pub fn zoom_at(&mut self, x: f32, y: f32, delta: f32) -> Result<(), JsValue> {
        self.view.zoom_at(Point::new(x, y), delta).map(|_| ()).map_err(js_error)
    }

    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.view.reset().map(|_| ()).map_err(js_error)
    }

    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), JsValue> {
        self.view.resize(width, height).map_err(js_error)
    }

    pub fn render(&self) -> String {
        self.view.render()
    }

    #[wasm_bindgen(js_name = exportSvg)]
    pub fn export_svg(&self) -> Result<String, JsValue> {
        self.view.export_svg().map_err(js_error)
    }

    #[wasm_bindgen(js_name = exportFileName)]
    pub fn export_file_name(&self) -> Option<String> {
        self.view.export_file_name()
    }

    /// Current transform as `{"panX", "panY", "zoom"}` JSON.
    pub fn viewport(&self) -> String {
        serde_json::to_string(&self.view.viewport()).unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.view.warnings().iter().map(ToString::to_string).collect()
    }
}

/// One-shot export surface of a document, for hosts that do not need a live view.
#[wasm_bindgen]
pub fn render_diagram_svg(document_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let config = build_config(parse_options(options_json)?);
    let document = GraphDocument::from_json(document_json).map_err(js_error)?;
    Ok(export_document_svg(&document, &config))
}
