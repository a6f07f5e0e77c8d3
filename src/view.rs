use crate::config::Config;
use crate::error::{DocumentError, ExportError, RenderWarning, ViewportError};
use crate::export;
use crate::ir::{GraphDocument, Point};
use crate::layout::{Layout, Positions, compute_layout, report_warnings, resolve_positions};
use crate::render::render_svg;
use crate::viewport::{DragGesture, SurfaceSize, ViewportState};
use log::{debug, info, warn};

/// The live view of one diagram: the loaded document, its resolved positions,
/// the surface it draws into and the pan/zoom state.
///
/// Viewport operations that would produce a non-finite transform are refused;
/// the view keeps its previous state and the error is returned.
#[derive(Debug, Clone)]
pub struct DiagramView {
    config: Config,
    document: Option<GraphDocument>,
    positions: Positions,
    warnings: Vec<RenderWarning>,
    surface: SurfaceSize,
    viewport: ViewportState,
    drag: Option<DragGesture>,
}

impl Default for DiagramView {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl DiagramView {
    pub fn new(config: Config) -> Self {
        let surface = SurfaceSize::new(config.render.width, config.render.height);
        Self {
            config,
            document: None,
            positions: Positions::new(),
            warnings: Vec::new(),
            surface,
            viewport: ViewportState::IDENTITY,
            drag: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> Option<&GraphDocument> {
        self.document.as_ref()
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    /// Problems found in the loaded document. None of them stop rendering.
    pub fn warnings(&self) -> &[RenderWarning] {
        &self.warnings
    }

    /// Replaces the displayed document. An invalid document leaves the view
    /// as it was.
    pub fn load(&mut self, document: GraphDocument) -> Result<(), DocumentError> {
        document.validate()?;
        let (logical_width, _) = document.logical_size();
        let viewport = ViewportState::reset(logical_width, self.surface.width, &self.config.viewport)
            .unwrap_or(ViewportState::IDENTITY);

        let resolved = resolve_positions(&document, &self.config.layout);
        let scene = compute_layout(
            &document,
            &resolved.positions,
            &self.config.theme,
            &self.config.layout,
        );
        let mut warnings = resolved.warnings;
        warnings.extend(scene.warnings);
        report_warnings(&warnings);

        info!(
            id = document.id.as_str(),
            kind = document.kind.as_str(),
            nodes = document.nodes.len(),
            edges = document.edges.len(),
            warnings = warnings.len();
            "Loaded diagram"
        );
        self.positions = resolved.positions;
        self.warnings = warnings;
        self.document = Some(document);
        self.viewport = viewport;
        self.drag = None;
        Ok(())
    }

    pub fn load_json(&mut self, input: &str) -> Result<(), DocumentError> {
        let document = GraphDocument::from_json(input)?;
        self.load(document)
    }

    /// Scene for the current document, rebuilt from scratch.
    pub fn layout(&self) -> Option<Layout> {
        let document = self.document.as_ref()?;
        Some(compute_layout(
            document,
            &self.positions,
            &self.config.theme,
            &self.config.layout,
        ))
    }

    pub fn pan(&mut self, dx: f32, dy: f32) -> Result<ViewportState, ViewportError> {
        let next = self.viewport.panned(dx, dy);
        self.apply(next)
    }

    /// Jumps to an explicit transform. The zoom is clamped to the configured
    /// range.
    pub fn set_viewport(&mut self, state: ViewportState) -> Result<ViewportState, ViewportError> {
        let next = ViewportState::new(
            state.pan_x,
            state.pan_y,
            self.config.viewport.clamp_zoom(state.zoom),
        );
        self.apply(next)
    }

    pub fn begin_drag(&mut self, pointer: Point) {
        self.drag = Some(DragGesture::begin(pointer, &self.viewport));
    }

    /// Moves the view with the pointer. Without an active drag this does nothing.
    pub fn drag_to(&mut self, pointer: Point) -> Result<ViewportState, ViewportError> {
        let Some(drag) = self.drag else {
            return Ok(self.viewport);
        };
        let next = drag.update(pointer, self.viewport);
        self.apply(next)
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn zoom_by(&mut self, factor: f32) -> Result<ViewportState, ViewportError> {
        let next = self.viewport.scaled(factor, &self.config.viewport);
        self.apply(next)
    }

    pub fn zoom_in(&mut self) -> Result<ViewportState, ViewportError> {
        self.zoom_by(self.config.viewport.button_factor)
    }

    pub fn zoom_out(&mut self) -> Result<ViewportState, ViewportError> {
        self.zoom_by(1.0 / self.config.viewport.button_factor)
    }

    /// Wheel zoom around `pointer`, in surface pixels.
    pub fn zoom_at(&mut self, pointer: Point, delta: f32) -> Result<ViewportState, ViewportError> {
        let next = self.viewport.zoomed_at(pointer, delta, &self.config.viewport);
        self.apply(next)
    }

    pub fn reset(&mut self) -> Result<ViewportState, ViewportError> {
        let logical_width = self
            .document
            .as_ref()
            .map(|document| document.logical_size().0)
            .unwrap_or(0.0);
        let next = ViewportState::reset(logical_width, self.surface.width, &self.config.viewport);
        self.apply(next)
    }

    /// Changes the surface size. The pan/zoom state is kept as is.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), ViewportError> {
        let surface = SurfaceSize::new(width, height);
        if !surface.is_valid() {
            let err = ViewportError::InvalidSurface { width, height };
            warn!("Ignoring resize: {err}");
            return Err(err);
        }
        debug!(width = width, height = height; "Resized view surface");
        self.surface = surface;
        Ok(())
    }

    /// The live frame as SVG. Without a document only the background is drawn.
    pub fn render(&self) -> String {
        match self.layout() {
            Some(layout) => render_svg(&layout, &self.viewport, self.surface, &self.config),
            None => render_svg(&empty_layout(), &self.viewport, self.surface, &self.config),
        }
    }

    pub fn export_svg(&self) -> Result<String, ExportError> {
        let layout = self.layout().ok_or(ExportError::NothingLoaded)?;
        Ok(export::export_svg(&layout, &self.config))
    }

    /// PNG bytes at the document's logical resolution, independent of the
    /// current pan and zoom.
    #[cfg(feature = "png")]
    pub fn export_image(&self) -> Result<Vec<u8>, ExportError> {
        let layout = self.layout().ok_or(ExportError::NothingLoaded)?;
        export::export_png(&layout, &self.config)
    }

    pub fn export_file_name(&self) -> Option<String> {
        self.document.as_ref().map(export::export_file_name)
    }

    fn apply(
        &mut self,
        next: Result<ViewportState, ViewportError>,
    ) -> Result<ViewportState, ViewportError> {
        match next {
            Ok(state) => {
                self.viewport = state;
                Ok(state)
            }
            Err(err) => {
                warn!(zoom = self.viewport.zoom; "Rejected viewport update: {err}");
                Err(err)
            }
        }
    }
}

fn empty_layout() -> Layout {
    Layout {
        kind: crate::ir::DiagramKind::Flowchart,
        width: 0.0,
        height: 0.0,
        nodes: Vec::new(),
        edges: Vec::new(),
        warnings: Vec::new(),
    }
}
