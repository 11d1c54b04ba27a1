use crate::core::projector::{render_popup, Projection};
use crate::models::{BoundingRegion, LatLng, Marker};
use serde::Serialize;
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// Pixel size of one map tile at zoom 0
const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the spherical Web Mercator projection
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_6;

/// Handle for a marker layer on a map surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LayerId(pub u32);

/// Center and integer zoom of a map view
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
}

/// Pixel dimensions of the map container
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

/// How a bounds fit is framed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitOptions {
    /// Margin kept clear on every side, in pixels
    #[serde(rename = "paddingPx")]
    pub padding_px: f64,
    /// Closer than this is not useful at city scale
    #[serde(rename = "maxZoom")]
    pub max_zoom: u8,
}

/// Background tile source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    #[serde(rename = "urlTemplate")]
    pub url_template: String,
    pub attribution: String,
    pub subdomains: String,
    #[serde(rename = "maxZoom")]
    pub max_zoom: u8,
}

/// Everything needed to mount a map view
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub tiles: TileLayer,
    pub default_view: Viewport,
    pub fit: FitOptions,
}

/// Map-rendering substrate
///
/// Implementations own the actual drawing target: a browser map widget, a
/// static renderer, or the in-memory [`SceneSurface`].
pub trait MapSurface {
    fn set_view(&mut self, viewport: Viewport);
    fn viewport(&self) -> Viewport;
    fn add_tile_layer(&mut self, tiles: &TileLayer);
    fn remove_tile_layer(&mut self);
    fn add_marker_layer(&mut self) -> LayerId;
    fn remove_marker_layer(&mut self, layer: LayerId);
    fn clear_layer(&mut self, layer: LayerId);
    fn add_marker(&mut self, layer: LayerId, marker: &Marker, popup_html: String);
    fn fit_bounds(&mut self, bounds: &BoundingRegion, options: &FitOptions);
}

/// A map bound to one surface, owning its marker layer
///
/// The tile and marker layers are acquired on [`MapView::mount`] and released
/// when the view is dropped. Every [`MapView::render`] clears the marker layer
/// and redraws it from scratch.
pub struct MapView<'s, S: MapSurface> {
    surface: &'s mut S,
    marker_layer: LayerId,
    fit: FitOptions,
}

/// What a render pass did to the view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOutcome {
    pub markers: usize,
    /// `None` when there was nothing to fit and the view was left alone
    pub fitted: Option<Viewport>,
}

impl<'s, S: MapSurface> MapView<'s, S> {
    pub fn mount(surface: &'s mut S, config: &MapConfig) -> Self {
        surface.set_view(config.default_view);
        surface.add_tile_layer(&config.tiles);
        let marker_layer = surface.add_marker_layer();

        tracing::debug!("Mounted map view with marker layer {:?}", marker_layer);

        Self {
            surface,
            marker_layer,
            fit: config.fit,
        }
    }

    /// Replace all markers with the projection and fit the view to its bounds
    pub fn render(&mut self, projection: &Projection) -> RenderOutcome {
        self.surface.clear_layer(self.marker_layer);

        for marker in &projection.markers {
            let popup_html = render_popup(&marker.popup).into_string();
            self.surface.add_marker(self.marker_layer, marker, popup_html);
        }

        let fitted = projection.bounds.map(|bounds| {
            tracing::debug!(
                "Fitting {} markers across {:.1} km",
                projection.markers.len(),
                bounds.diagonal_km()
            );
            self.surface.fit_bounds(&bounds, &self.fit);
            self.surface.viewport()
        });

        RenderOutcome {
            markers: projection.markers.len(),
            fitted,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.surface.viewport()
    }

    pub fn surface(&self) -> &S {
        &*self.surface
    }
}

impl<S: MapSurface> Drop for MapView<'_, S> {
    fn drop(&mut self) {
        self.surface.remove_marker_layer(self.marker_layer);
        self.surface.remove_tile_layer();
        tracing::trace!("Released map view layers");
    }
}

/// Project a point to Web Mercator pixels at zoom 0
fn project(p: LatLng) -> (f64, f64) {
    let lat = p.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let sin = lat.to_radians().sin();
    let x = (p.lng + 180.0) / 360.0 * TILE_SIZE;
    let y = (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * TILE_SIZE;
    (x, y)
}

/// Inverse of [`project`]
fn unproject(x: f64, y: f64) -> LatLng {
    let lng = x / TILE_SIZE * 360.0 - 180.0;
    let psi = (0.5 - y / TILE_SIZE) * 2.0 * PI;
    let lat = (2.0 * psi.exp().atan() - PI / 2.0).to_degrees();
    LatLng { lat, lng }
}

/// Largest integer zoom that shows `bounds` inside the padded viewport
///
/// A degenerate region (a single marker) fits at `max_zoom`. The center is
/// the projected midpoint of the region, not its arithmetic center.
pub fn fit_viewport(bounds: &BoundingRegion, size: ViewportSize, options: &FitOptions) -> Viewport {
    let available_w = (size.width - 2.0 * options.padding_px).max(1.0);
    let available_h = (size.height - 2.0 * options.padding_px).max(1.0);

    let (west, north) = project(LatLng { lat: bounds.max_lat, lng: bounds.min_lng });
    let (east, south) = project(LatLng { lat: bounds.min_lat, lng: bounds.max_lng });

    let span_x = (east - west).abs();
    let span_y = (south - north).abs();

    let scale = (available_w / span_x).min(available_h / span_y);
    let zoom = if scale.is_finite() {
        scale.log2().floor().clamp(0.0, options.max_zoom as f64) as u8
    } else {
        options.max_zoom
    };

    Viewport {
        center: unproject((west + east) / 2.0, (north + south) / 2.0),
        zoom,
    }
}

/// Marker as drawn on a [`SceneSurface`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMarker {
    #[serde(flatten)]
    pub marker: Marker,
    #[serde(rename = "popupHtml")]
    pub popup_html: String,
}

/// Serializable snapshot of a [`SceneSurface`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapScene {
    pub viewport: Viewport,
    pub tiles: Option<TileLayer>,
    pub markers: Vec<RenderedMarker>,
}

/// In-memory map surface
///
/// Keeps layers and the viewport as plain data so a render can be shipped to
/// a client as JSON or inspected in tests.
#[derive(Debug, Clone)]
pub struct SceneSurface {
    size: ViewportSize,
    viewport: Viewport,
    tiles: Option<TileLayer>,
    layers: BTreeMap<LayerId, Vec<RenderedMarker>>,
    next_layer: u32,
}

impl SceneSurface {
    pub fn new(size: ViewportSize, initial: Viewport) -> Self {
        Self {
            size,
            viewport: initial,
            tiles: None,
            layers: BTreeMap::new(),
            next_layer: 0,
        }
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn has_tiles(&self) -> bool {
        self.tiles.is_some()
    }

    pub fn markers(&self) -> impl Iterator<Item = &RenderedMarker> {
        self.layers.values().flatten()
    }

    pub fn scene(&self) -> MapScene {
        MapScene {
            viewport: self.viewport,
            tiles: self.tiles.clone(),
            markers: self.markers().cloned().collect(),
        }
    }
}

impl MapSurface for SceneSurface {
    fn set_view(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn add_tile_layer(&mut self, tiles: &TileLayer) {
        self.tiles = Some(tiles.clone());
    }

    fn remove_tile_layer(&mut self) {
        self.tiles = None;
    }

    fn add_marker_layer(&mut self) -> LayerId {
        let id = LayerId(self.next_layer);
        self.next_layer += 1;
        self.layers.insert(id, Vec::new());
        id
    }

    fn remove_marker_layer(&mut self, layer: LayerId) {
        self.layers.remove(&layer);
    }

    fn clear_layer(&mut self, layer: LayerId) {
        if let Some(markers) = self.layers.get_mut(&layer) {
            markers.clear();
        }
    }

    fn add_marker(&mut self, layer: LayerId, marker: &Marker, popup_html: String) {
        match self.layers.get_mut(&layer) {
            Some(markers) => markers.push(RenderedMarker {
                marker: marker.clone(),
                popup_html,
            }),
            None => tracing::warn!("Marker added to unknown layer {:?}", layer),
        }
    }

    fn fit_bounds(&mut self, bounds: &BoundingRegion, options: &FitOptions) {
        let max_zoom = self
            .tiles
            .as_ref()
            .map_or(options.max_zoom, |tiles| options.max_zoom.min(tiles.max_zoom));
        let options = FitOptions { max_zoom, ..*options };
        self.viewport = fit_viewport(bounds, self.size, &options);
    }
}
