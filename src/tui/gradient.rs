//! Gradient color interpolation for true-color terminal rendering.
//!
//! RGB lerp between ordered stops. The theme system builds its title bars
//! and histogram heat colors from these.

use ratatui::style::Color;

/// A single color stop (position 0.0..=1.0, RGB).
#[derive(Debug, Clone, Copy)]
pub struct GradientStop {
    pub position: f32,
    pub rgb: (u8, u8, u8),
}

impl GradientStop {
    pub const fn new(position: f32, r: u8, g: u8, b: u8) -> Self {
        Self {
            position,
            rgb: (r, g, b),
        }
    }
}

/// A multi-stop gradient. Stops must be sorted by position.
#[derive(Debug, Clone)]
pub struct Gradient {
    stops: Vec<GradientStop>,
}

impl Gradient {
    pub fn new(stops: Vec<GradientStop>) -> Self {
        assert!(stops.len() >= 2, "gradient needs at least 2 stops");
        Self { stops }
    }

    /// Interpolate at position t (clamped to 0.0..=1.0).
    pub fn at(&self, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];

        if t <= first.position {
            let (r, g, b) = first.rgb;
            return Color::Rgb(r, g, b);
        }
        if t >= last.position {
            let (r, g, b) = last.rgb;
            return Color::Rgb(r, g, b);
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.position {
                let span = b.position - a.position;
                let local = if span > 0.0 { (t - a.position) / span } else { 0.0 };
                return lerp_rgb(a.rgb, b.rgb, local);
            }
        }

        let (r, g, b) = last.rgb;
        Color::Rgb(r, g, b)
    }

    /// Sample the gradient into N evenly spaced colors.
    pub fn sample(&self, n: usize) -> Vec<Color> {
        match n {
            0 => vec![],
            1 => vec![self.at(0.5)],
            _ => (0..n)
                .map(|i| self.at(i as f32 / (n - 1) as f32))
                .collect(),
        }
    }
}

fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f32) -> Color {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color::Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Color each character of `text` along the gradient.
pub fn gradient_text(text: &str, gradient: &Gradient) -> Vec<(char, Color)> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![];
    }
    let colors = gradient.sample(chars.len());
    chars.into_iter().zip(colors).collect()
}
