use crate::models::{BoundingRegion, LatLng};
use geo::{coord, HaversineDistance, Point, Rect};

/// Half-width in degrees of the detail view's embedded map
pub const DETAIL_EMBED_DELTA: f64 = 0.01;

impl From<LatLng> for Point<f64> {
    fn from(p: LatLng) -> Self {
        Point::new(p.lng, p.lat)
    }
}

impl BoundingRegion {
    /// Degenerate region containing exactly one point
    pub fn from_point(p: LatLng) -> Self {
        Self {
            min_lat: p.lat,
            max_lat: p.lat,
            min_lng: p.lng,
            max_lng: p.lng,
        }
    }

    /// Square region of `delta` degrees either side of a point
    pub fn around(p: LatLng, delta: f64) -> Self {
        Self {
            min_lat: p.lat - delta,
            max_lat: p.lat + delta,
            min_lng: p.lng - delta,
            max_lng: p.lng + delta,
        }
    }

    /// Grow the region to include `p`
    pub fn extend(&mut self, p: LatLng) {
        self.min_lat = self.min_lat.min(p.lat);
        self.max_lat = self.max_lat.max(p.lat);
        self.min_lng = self.min_lng.min(p.lng);
        self.max_lng = self.max_lng.max(p.lng);
    }

    /// Region over all points, `None` for an empty input
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLng>,
    {
        points.into_iter().fold(None, |acc, p| Some(accumulate(acc, p)))
    }

    #[inline]
    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.min_lat
            && p.lat <= self.max_lat
            && p.lng >= self.min_lng
            && p.lng <= self.max_lng
    }

    pub fn is_point(&self) -> bool {
        self.min_lat == self.max_lat && self.min_lng == self.max_lng
    }

    pub fn south_west(&self) -> LatLng {
        LatLng { lat: self.min_lat, lng: self.min_lng }
    }

    pub fn north_east(&self) -> LatLng {
        LatLng { lat: self.max_lat, lng: self.max_lng }
    }

    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.min_lng, y: self.min_lat },
            coord! { x: self.max_lng, y: self.max_lat },
        )
    }

    /// Arithmetic center in degrees
    pub fn center(&self) -> LatLng {
        let c = self.to_rect().center();
        LatLng { lat: c.y, lng: c.x }
    }

    /// Great-circle length of the south-west to north-east diagonal
    pub fn diagonal_km(&self) -> f64 {
        let sw: Point<f64> = self.south_west().into();
        let ne: Point<f64> = self.north_east().into();
        sw.haversine_distance(&ne) / 1000.0
    }
}

/// OpenStreetMap embed for the detail view, centered on one listing
pub fn osm_embed_url(p: LatLng) -> String {
    let b = BoundingRegion::around(p, DETAIL_EMBED_DELTA);
    format!(
        "https://www.openstreetmap.org/export/embed.html?bbox={},{},{},{}&layer=mapnik&marker={},{}",
        b.min_lng, b.min_lat, b.max_lng, b.max_lat, p.lat, p.lng
    )
}

/// Fold one more point into an optional running region
#[inline]
pub fn accumulate(acc: Option<BoundingRegion>, p: LatLng) -> BoundingRegion {
    match acc {
        Some(mut region) => {
            region.extend(p);
            region
        }
        None => BoundingRegion::from_point(p),
    }
}
