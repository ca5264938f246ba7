use std::collections::BTreeMap;

use crate::core::error::InputError;
use crate::core::scoring::validate_point;
use crate::models::{BoundingBox, ClusterResult, GeoPoint, MapCluster, MapPin};

/// Deepest zoom level a map client requests
pub const MAX_ZOOM: u8 = 22;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterSettings {
    /// Grid cells per world tile edge at zoom 0, multiplied by 2^zoom
    pub grid_divisions: u32,
    /// Smallest cell population that collapses into a cluster
    pub min_cluster_size: usize,
    /// From this zoom on every point renders individually
    pub max_cluster_zoom: u8,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            grid_divisions: 8,
            min_cluster_size: 2,
            max_cluster_zoom: 16,
        }
    }
}

/// Single-pass grid clustering of map pins
#[derive(Debug, Clone, Default)]
pub struct ClusterBuilder {
    settings: ClusterSettings,
}

impl ClusterBuilder {
    pub fn new(settings: ClusterSettings) -> Self {
        Self { settings }
    }

    /// Edge length of a grid cell in degrees: 360 / (2^zoom * divisions)
    pub fn cell_size_degrees(&self, zoom: u8) -> f64 {
        let divisions = self.settings.grid_divisions.max(1) as f64;
        360.0 / (2f64.powi(zoom as i32) * divisions)
    }

    /// Group pins into clusters for the given zoom
    ///
    /// Output is ordered by cell (clusters) and by id (pins), so identical
    /// input always yields identical output.
    pub fn build(&self, pins: Vec<MapPin>, zoom: u8) -> Result<ClusterResult, InputError> {
        if zoom > MAX_ZOOM {
            return Err(InputError::InvalidZoom(zoom));
        }
        for pin in &pins {
            validate_point(pin.point())?;
        }

        if zoom >= self.settings.max_cluster_zoom {
            return Ok(ClusterResult {
                zoom,
                clusters: Vec::new(),
                pins: sorted_pins(pins),
            });
        }

        let cell = self.cell_size_degrees(zoom);
        let mut cells: BTreeMap<(i64, i64), Vec<MapPin>> = BTreeMap::new();
        for pin in pins {
            let key = (
                (pin.longitude / cell).floor() as i64,
                (pin.latitude / cell).floor() as i64,
            );
            cells.entry(key).or_default().push(pin);
        }

        let min_size = self.settings.min_cluster_size.max(2);
        let mut clusters = Vec::new();
        let mut singles = Vec::new();

        for ((x, y), members) in cells {
            if members.len() < min_size {
                singles.extend(members);
                continue;
            }
            clusters.push(collapse(zoom, x, y, members));
        }

        tracing::debug!(
            "Clustered at zoom {} (cell {:.5}°): {} clusters, {} pins",
            zoom,
            cell,
            clusters.len(),
            singles.len()
        );

        Ok(ClusterResult {
            zoom,
            clusters,
            pins: sorted_pins(singles),
        })
    }
}

fn collapse(zoom: u8, x: i64, y: i64, members: Vec<MapPin>) -> MapCluster {
    let points: Vec<GeoPoint> = members.iter().map(MapPin::point).collect();
    let count = points.len();
    let centroid = GeoPoint::new(
        points.iter().map(|p| p.latitude).sum::<f64>() / count as f64,
        points.iter().map(|p| p.longitude).sum::<f64>() / count as f64,
    );
    let bounds = BoundingBox::enclosing(&points).unwrap_or(BoundingBox {
        min_lat: centroid.latitude,
        max_lat: centroid.latitude,
        min_lon: centroid.longitude,
        max_lon: centroid.longitude,
    });

    let mut member_ids: Vec<String> = members.into_iter().map(|p| p.id).collect();
    member_ids.sort();

    MapCluster {
        id: format!("cluster:{}:{}:{}", zoom, x, y),
        centroid,
        bounds,
        member_ids,
        count,
    }
}

fn sorted_pins(mut pins: Vec<MapPin>) -> Vec<MapPin> {
    pins.sort_by(|a, b| {
        a.id.cmp(&b.id)
            .then_with(|| a.latitude.total_cmp(&b.latitude))
            .then_with(|| a.longitude.total_cmp(&b.longitude))
    });
    pins
}
