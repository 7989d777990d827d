//! Paginated image export of a hierarchy layout.
//!
//! The export temporarily takes over a [`Viewport`], captures it through a
//! [`Snapshotter`] and hands the image to a [`DocumentAssembler`]. The viewport
//! is restored by [`ViewportGuard`] on every exit path.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::{ExportConfig, LayoutConfig};
use crate::layout::HierarchyLayout;
use crate::render::render_hierarchy_svg;
use crate::theme::Theme;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("snapshot capture failed: {0}")]
    Snapshot(String),
    #[error("document assembly failed: {0}")]
    Assembly(String),
    #[error("export bounds are degenerate ({width}x{height})")]
    Degenerate { width: f32, height: f32 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportMargins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl ExportMargins {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            left: config.margin_left,
            right: config.margin_right,
            top: config.margin_top,
            bottom: config.margin_bottom,
        }
    }
}

impl Default for ExportMargins {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

/// Margin-expanded box around every node, in layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// `None` when the layout has no nodes. Unmeasured nodes use `default_height`.
pub fn compute_export_bounds(
    layout: &HierarchyLayout,
    margins: &ExportMargins,
    default_height: f32,
) -> Option<ExportBounds> {
    let first = layout.nodes.first()?;
    let mut min_x = first.x;
    let mut min_y = first.y;
    let mut max_x = first.x + first.width;
    let mut max_y = first.y + first.height_or(default_height);
    for node in &layout.nodes[1..] {
        min_x = min_x.min(node.x);
        min_y = min_y.min(node.y);
        max_x = max_x.max(node.x + node.width);
        max_y = max_y.max(node.y + node.height_or(default_height));
    }
    Some(ExportBounds {
        x: min_x - margins.left,
        y: min_y - margins.top,
        width: max_x - min_x + margins.left + margins.right,
        height: max_y - min_y + margins.top + margins.bottom,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub transform: ViewportTransform,
    pub size: ViewportSize,
}

/// The rendering surface an export resizes and pans.
pub trait Viewport {
    fn transform(&self) -> ViewportTransform;
    fn set_transform(&mut self, transform: ViewportTransform);
    fn size(&self) -> ViewportSize;
    fn set_size(&mut self, size: ViewportSize);

    fn state(&self) -> ViewportState {
        ViewportState {
            transform: self.transform(),
            size: self.size(),
        }
    }
}

/// Holds a viewport for the duration of an export and puts its original
/// transform and size back when dropped.
pub struct ViewportGuard<'a, V: Viewport + ?Sized> {
    viewport: &'a mut V,
    original: ViewportState,
}

impl<'a, V: Viewport + ?Sized> ViewportGuard<'a, V> {
    pub fn acquire(viewport: &'a mut V) -> Self {
        let original = viewport.state();
        Self { viewport, original }
    }

    pub fn viewport(&self) -> &V {
        self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        self.viewport
    }
}

impl<V: Viewport + ?Sized> Drop for ViewportGuard<'_, V> {
    fn drop(&mut self) {
        self.viewport.set_size(self.original.size);
        self.viewport.set_transform(self.original.transform);
        tracing::debug!("viewport restored");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRequest {
    pub background: String,
    pub pixel_ratio: f32,
    pub width: f32,
    pub height: f32,
}

/// Premultiplied RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub trait Snapshotter<V: Viewport + ?Sized> {
    fn capture(&mut self, viewport: &V, request: &SnapshotRequest) -> Result<RasterImage, ExportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn for_size(width: f32, height: f32) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub orientation: Orientation,
}

impl PageSetup {
    /// Page dimensions rotated to match the exported content's aspect.
    pub fn for_content(config: &ExportConfig, width: f32, height: f32) -> Self {
        let orientation = Orientation::for_size(width, height);
        let short = config.page_width.min(config.page_height);
        let long = config.page_width.max(config.page_height);
        let (width, height) = match orientation {
            Orientation::Landscape => (long, short),
            Orientation::Portrait => (short, long),
        };
        Self {
            width,
            height,
            margin: config.page_margin,
            orientation,
        }
    }

    pub fn printable_width(&self) -> f32 {
        (self.width - self.margin * 2.0).max(1.0)
    }

    pub fn printable_height(&self) -> f32 {
        (self.height - self.margin * 2.0).max(1.0)
    }
}

/// One page's slice of the image. Source values are image pixels, destination
/// values page units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTile {
    pub page: usize,
    pub source_y: u32,
    pub source_height: u32,
    pub dest_x: f32,
    pub dest_y: f32,
    pub dest_width: f32,
    pub dest_height: f32,
}

/// Scales the image to the printable width and cuts it into page-high bands,
/// top to bottom.
pub fn plan_pages(image_width: u32, image_height: u32, setup: &PageSetup) -> Vec<PageTile> {
    if image_width == 0 || image_height == 0 {
        return Vec::new();
    }
    let scale = setup.printable_width() / image_width as f32;
    let band = ((setup.printable_height() / scale).floor() as u32).max(1);
    let mut tiles = Vec::new();
    let mut source_y = 0u32;
    while source_y < image_height {
        let source_height = band.min(image_height - source_y);
        tiles.push(PageTile {
            page: tiles.len(),
            source_y,
            source_height,
            dest_x: setup.margin,
            dest_y: setup.margin,
            dest_width: setup.printable_width(),
            dest_height: source_height as f32 * scale,
        });
        source_y += source_height;
    }
    tiles
}

/// File stem for the exported document, derived from the entity name.
pub fn document_file_name(entity_name: &str) -> String {
    let mut slug = String::new();
    for ch in entity_name.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "company-ownership".to_string()
    } else {
        format!("{slug}-ownership")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledDocument {
    pub name: String,
    pub files: Vec<PathBuf>,
}

pub trait DocumentAssembler {
    fn assemble(
        &mut self,
        image: &RasterImage,
        pages: &[PageTile],
        setup: &PageSetup,
        name: &str,
    ) -> Result<AssembledDocument, ExportError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub bounds: ExportBounds,
    pub orientation: Orientation,
    pub image_width: u32,
    pub image_height: u32,
    pub pages: usize,
    pub document: AssembledDocument,
}

pub struct ExportRequest<'a> {
    pub layout: &'a HierarchyLayout,
    pub entity_name: &'a str,
    pub background: &'a str,
    pub config: &'a ExportConfig,
}

/// Runs the export pipeline. Returns `Ok(None)` without touching anything when
/// a collaborator is missing or the layout is empty.
pub fn export_hierarchy<V, S, D>(
    request: &ExportRequest<'_>,
    viewport: Option<&mut V>,
    snapshotter: Option<&mut S>,
    assembler: &mut D,
) -> Result<Option<ExportOutcome>, ExportError>
where
    V: Viewport + ?Sized,
    S: Snapshotter<V> + ?Sized,
    D: DocumentAssembler + ?Sized,
{
    let (Some(viewport), Some(snapshotter)) = (viewport, snapshotter) else {
        tracing::warn!(entity = request.entity_name, "export skipped: viewport or snapshotter unavailable");
        return Ok(None);
    };
    let margins = ExportMargins::from_config(request.config);
    let Some(bounds) = compute_export_bounds(request.layout, &margins, request.layout.default_node_height)
    else {
        tracing::warn!(entity = request.entity_name, "export skipped: layout has no nodes");
        return Ok(None);
    };
    if !(bounds.width > 0.0 && bounds.height > 0.0) {
        return Err(ExportError::Degenerate {
            width: bounds.width,
            height: bounds.height,
        });
    }

    let mut guard = ViewportGuard::acquire(viewport);
    guard.viewport_mut().set_size(ViewportSize {
        width: bounds.width,
        height: bounds.height,
    });
    guard.viewport_mut().set_transform(ViewportTransform {
        x: -bounds.x,
        y: -bounds.y,
        zoom: 1.0,
    });

    let snapshot_request = SnapshotRequest {
        background: request.background.to_string(),
        pixel_ratio: request.config.pixel_ratio.max(0.1),
        width: bounds.width,
        height: bounds.height,
    };
    let image = snapshotter.capture(guard.viewport(), &snapshot_request)?;

    let setup = PageSetup::for_content(request.config, bounds.width, bounds.height);
    let tiles = plan_pages(image.width, image.height, &setup);
    let name = document_file_name(request.entity_name);
    let document = assembler.assemble(&image, &tiles, &setup, &name)?;
    drop(guard);

    tracing::info!(
        entity = request.entity_name,
        pages = tiles.len(),
        width = image.width,
        height = image.height,
        "exported ownership chart"
    );
    Ok(Some(ExportOutcome {
        bounds,
        orientation: setup.orientation,
        image_width: image.width,
        image_height: image.height,
        pages: tiles.len(),
        document,
    }))
}

/// In-memory viewport over the reference SVG rendering of a layout.
#[derive(Debug, Clone)]
pub struct SvgViewport {
    layout: HierarchyLayout,
    theme: Theme,
    config: LayoutConfig,
    state: ViewportState,
}

impl SvgViewport {
    pub fn new(layout: HierarchyLayout, theme: Theme, config: LayoutConfig, size: ViewportSize) -> Self {
        Self {
            layout,
            theme,
            config,
            state: ViewportState {
                transform: ViewportTransform::default(),
                size,
            },
        }
    }

    pub fn layout(&self) -> &HierarchyLayout {
        &self.layout
    }

    /// The layout as currently seen through the viewport.
    pub fn svg(&self) -> String {
        render_hierarchy_svg(&self.layout, &self.theme, &self.config, Some(&self.state))
    }
}

impl Viewport for SvgViewport {
    fn transform(&self) -> ViewportTransform {
        self.state.transform
    }

    fn set_transform(&mut self, transform: ViewportTransform) {
        self.state.transform = transform;
    }

    fn size(&self) -> ViewportSize {
        self.state.size
    }

    fn set_size(&mut self, size: ViewportSize) {
        self.state.size = size;
    }
}

#[cfg(feature = "png")]
pub use raster::{PngPageAssembler, ResvgSnapshotter};

#[cfg(feature = "png")]
mod raster {
    use std::path::PathBuf;

    use resvg::tiny_skia::{self, IntRect, Pixmap, PixmapPaint, Transform};

    use super::{
        AssembledDocument, DocumentAssembler, ExportError, PageSetup, PageTile, RasterImage,
        SnapshotRequest, Snapshotter, SvgViewport,
    };
    use crate::config::RenderConfig;
    use crate::render::rasterize_svg;
    use crate::theme::parse_hex_color;

    /// Rasterizes an [`SvgViewport`] with resvg.
    #[derive(Debug, Clone, Default)]
    pub struct ResvgSnapshotter {
        pub render: RenderConfig,
    }

    impl Snapshotter<SvgViewport> for ResvgSnapshotter {
        fn capture(
            &mut self,
            viewport: &SvgViewport,
            request: &SnapshotRequest,
        ) -> Result<RasterImage, ExportError> {
            let svg = viewport.svg();
            let pixmap = rasterize_svg(&svg, request.pixel_ratio, Some(&request.background), &self.render)
                .map_err(|err| ExportError::Snapshot(err.to_string()))?;
            Ok(RasterImage {
                width: pixmap.width(),
                height: pixmap.height(),
                pixels: pixmap.take(),
            })
        }
    }

    /// Writes each page as `<name>-page-<n>.png` under `output_dir`.
    #[derive(Debug, Clone)]
    pub struct PngPageAssembler {
        pub output_dir: PathBuf,
        pub pixel_ratio: f32,
        pub page_background: String,
    }

    impl PngPageAssembler {
        pub fn new(output_dir: impl Into<PathBuf>, pixel_ratio: f32) -> Self {
            Self {
                output_dir: output_dir.into(),
                pixel_ratio,
                page_background: "#FFFFFF".to_string(),
            }
        }
    }

    impl DocumentAssembler for PngPageAssembler {
        fn assemble(
            &mut self,
            image: &RasterImage,
            pages: &[PageTile],
            setup: &PageSetup,
            name: &str,
        ) -> Result<AssembledDocument, ExportError> {
            let size = tiny_skia::IntSize::from_wh(image.width, image.height)
                .ok_or_else(|| ExportError::Assembly("empty snapshot".to_string()))?;
            let source = Pixmap::from_vec(image.pixels.clone(), size)
                .ok_or_else(|| ExportError::Assembly("snapshot buffer does not match its size".to_string()))?;

            let ratio = self.pixel_ratio.max(0.1);
            let page_width = (setup.width * ratio).ceil() as u32;
            let page_height = (setup.height * ratio).ceil() as u32;
            let (r, g, b) = parse_hex_color(&self.page_background).unwrap_or((255, 255, 255));

            std::fs::create_dir_all(&self.output_dir)?;
            let mut files = Vec::with_capacity(pages.len());
            for tile in pages {
                let mut page = Pixmap::new(page_width, page_height)
                    .ok_or_else(|| ExportError::Assembly("failed to allocate page".to_string()))?;
                page.fill(tiny_skia::Color::from_rgba8(r, g, b, 255));

                let rect = IntRect::from_xywh(0, tile.source_y as i32, image.width, tile.source_height)
                    .ok_or_else(|| ExportError::Assembly(format!("invalid band on page {}", tile.page + 1)))?;
                let band = source
                    .clone_rect(rect)
                    .ok_or_else(|| ExportError::Assembly(format!("band outside snapshot on page {}", tile.page + 1)))?;
                let scale = tile.dest_width * ratio / image.width as f32;
                let transform = Transform::from_row(scale, 0.0, 0.0, scale, tile.dest_x * ratio, tile.dest_y * ratio);
                page.draw_pixmap(0, 0, band.as_ref(), &PixmapPaint::default(), transform, None);

                let path = self.output_dir.join(format!("{name}-page-{}.png", tile.page + 1));
                page.save_png(&path)
                    .map_err(|err| ExportError::Assembly(err.to_string()))?;
                files.push(path);
            }
            Ok(AssembledDocument {
                name: name.to_string(),
                files,
            })
        }
    }
}
