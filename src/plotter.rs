use egui::Color32;
use egui_plot::{Line, Plot, PlotBounds, PlotPoints, Points};

use crate::config::TrackConfig;
use crate::track::{Domain, PointTrack, TrackGeometry};

/// Fixed-width axis labels so the plot does not jitter.
fn format_axis_label(value: f64) -> String {
    let abs_value = value.abs();
    if abs_value >= 1000.0 {
        format!("{:-6.1e}", value)
    } else if abs_value >= 100.0 {
        format!("{:-6.0}", value)
    } else if abs_value >= 10.0 {
        format!("{:-6.1}", value)
    } else {
        format!("{:-6.2}", value)
    }
}

/// Pads a domain so single points and straight runs still get a visible area.
fn padded(domain: Domain) -> (f64, f64) {
    let range = (domain.max - domain.min).max(0.1);
    (domain.min - range * 0.05, domain.max + range * 0.05)
}

fn rgb(c: [u8; 3]) -> Color32 {
    Color32::from_rgb(c[0], c[1], c[2])
}

/// Map of the odometry track. Geometry is rebuilt only when the track's
/// revision changes, so redrawing an unchanged track is a no-op rebind.
#[derive(Debug)]
pub struct TrackPlot {
    geometry: TrackGeometry,
    bound_revision: Option<u64>,
    skip_first: bool,
    point_radius: f32,
    line_width: f32,
    path_color: Color32,
    latest_color: Color32,
}

impl TrackPlot {
    pub fn new(config: &TrackConfig) -> Self {
        Self {
            geometry: TrackGeometry::default(),
            bound_revision: None,
            skip_first: config.skip_first,
            point_radius: config.point_radius,
            line_width: config.line_width,
            path_color: rgb(config.colors.path),
            latest_color: rgb(config.colors.latest),
        }
    }

    /// Rebinds against `track`. Returns whether the geometry was recomputed.
    pub fn rebind(&mut self, track: &PointTrack) -> bool {
        if self.bound_revision == Some(track.revision()) {
            return false;
        }
        self.geometry = TrackGeometry::build(track.samples(), self.skip_first);
        self.bound_revision = Some(track.revision());
        true
    }

    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    pub fn ui(&self, ui: &mut egui::Ui, id: &str) {
        let geometry = &self.geometry;
        Plot::new(id)
            .data_aspect(1.0)
            .x_axis_formatter(|v, _| format_axis_label(v.value))
            .y_axis_formatter(|v, _| format_axis_label(v.value))
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                let Some(domain) = geometry.domain else {
                    return;
                };
                let (min, max) = padded(domain);
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([min, min], [max, max]));

                if geometry.path.len() > 1 {
                    plot_ui.line(
                        Line::new("path", PlotPoints::from(geometry.path.clone()))
                            .color(self.path_color)
                            .width(self.line_width),
                    );
                }
                if let Some(segment) = geometry.latest_segment {
                    plot_ui.line(
                        Line::new("latest segment", PlotPoints::from(segment.to_vec()))
                            .color(self.latest_color)
                            .width(self.line_width),
                    );
                }
                if !geometry.path.is_empty() {
                    plot_ui.points(
                        Points::new("samples", PlotPoints::from(geometry.path.clone()))
                            .radius(self.point_radius)
                            .filled(true)
                            .color(self.path_color),
                    );
                }
                // newest point last so it sits on top
                if let Some(latest) = geometry.latest {
                    plot_ui.points(
                        Points::new("latest", PlotPoints::from(vec![latest]))
                            .radius(self.point_radius)
                            .filled(true)
                            .color(self.latest_color),
                    );
                }
            });
    }
}
