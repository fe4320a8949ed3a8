// src/render/gauge.rs
//! Semicircular risk gauge

use std::f64::consts::PI;

pub const LOW_COLOR: &str = "#22c55e";
pub const MEDIUM_COLOR: &str = "#eab308";
pub const HIGH_COLOR: &str = "#ef4444";
pub const NEUTRAL_COLOR: &str = "#6366f1";
pub const TRACK_COLOR: &str = "#e2e8f0";

const CENTER_X: f64 = 100.0;
const CENTER_Y: f64 = 100.0;
const RADIUS: f64 = 70.0;
const STROKE: f64 = 20.0;

pub fn color_for_level(level: &str) -> &'static str {
    match level {
        "Low" => LOW_COLOR,
        "Medium" => MEDIUM_COLOR,
        "High" => HIGH_COLOR,
        _ => NEUTRAL_COLOR,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskGauge {
    pub score: f64,
    pub level: String,
    pub color: &'static str,
}

impl RiskGauge {
    pub fn new(score: f64, level: &str) -> Self {
        let score = if score.is_finite() {
            score.clamp(0.0, 100.0)
        } else {
            0.0
        };

        Self {
            score,
            level: level.to_string(),
            color: color_for_level(level),
        }
    }

    /// Filled share of the half circle, 0.0..=1.0
    pub fn proportion(&self) -> f64 {
        self.score / 100.0
    }

    /// Point on the arc for a proportion, starting at the left end
    fn arc_point(proportion: f64) -> (f64, f64) {
        let angle = PI * (1.0 - proportion);
        (
            CENTER_X + RADIUS * angle.cos(),
            CENTER_Y - RADIUS * angle.sin(),
        )
    }

    fn arc_path(proportion: f64) -> String {
        let (start_x, start_y) = Self::arc_point(0.0);
        let (end_x, end_y) = Self::arc_point(proportion);
        format!(
            "M {:.2} {:.2} A {r} {r} 0 0 1 {:.2} {:.2}",
            start_x,
            start_y,
            end_x,
            end_y,
            r = RADIUS
        )
    }

    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r#"<svg class="risk-gauge" viewBox="0 0 200 110" width="240" role="img" aria-label="Risk score {score} of 100"><path d="{track}" fill="none" stroke="{track_color}" stroke-width="{stroke}"/>"#,
            score = self.score,
            track = Self::arc_path(1.0),
            track_color = TRACK_COLOR,
            stroke = STROKE,
        );

        if self.proportion() > 0.0 {
            svg.push_str(&format!(
                r#"<path class="risk-gauge-fill" d="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
                Self::arc_path(self.proportion()),
                self.color,
                STROKE
            ));
        }

        svg.push_str("</svg>");
        svg
    }
}
