//! Color themes for the dashboard.
//!
//! Named palettes: thermal (default, warm amber), glow (neon blue/purple),
//! ice (cold cyan), mono (grayscale). The `heat` gradient colors the margin
//! histogram bars from low to high bins.

use super::gradient::{Gradient, GradientStop};
use ratatui::style::{Color, Modifier, Style};

/// A complete visual theme for the dashboard.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    /// Gradient for the title bar text.
    pub title_gradient: Gradient,
    /// Gradient for histogram bars (low margin -> high margin).
    pub heat: Gradient,
    /// Accent color for panel titles and highlights.
    pub accent: Color,
    /// Dimmed text color.
    pub muted: Color,
    /// Normal text color.
    pub text: Color,
    /// Color for warnings (missing pricing columns, load problems).
    pub warn: Color,
    /// Color for error text.
    pub error: Color,
    /// Style for unfocused panel borders.
    pub border_style: Style,
    /// Style for the focused panel border.
    pub focus_border_style: Style,
}

impl Theme {
    /// Get a theme by name. Defaults to "thermal" if unknown.
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "glow" => Self::glow(),
            "ice" => Self::ice(),
            "mono" => Self::mono(),
            _ => Self::thermal(),
        }
    }

    /// Thermal theme: warm amber. Default.
    pub fn thermal() -> Self {
        Self {
            name: "thermal".into(),
            title_gradient: Gradient::new(vec![
                GradientStop::new(0.0, 255, 110, 0),
                GradientStop::new(0.5, 255, 230, 90),
                GradientStop::new(1.0, 255, 110, 0),
            ]),
            heat: Gradient::new(vec![
                GradientStop::new(0.0, 255, 60, 60),
                GradientStop::new(0.5, 255, 210, 0),
                GradientStop::new(1.0, 30, 210, 90),
            ]),
            accent: Color::Rgb(255, 180, 0),
            muted: Color::Rgb(110, 105, 100),
            text: Color::Rgb(225, 220, 210),
            warn: Color::Rgb(255, 190, 60),
            error: Color::Rgb(255, 85, 70),
            border_style: Style::default().fg(Color::Rgb(90, 80, 70)),
            focus_border_style: Style::default()
                .fg(Color::Rgb(255, 180, 0))
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Glow theme: neon blue/purple.
    pub fn glow() -> Self {
        Self {
            name: "glow".into(),
            title_gradient: Gradient::new(vec![
                GradientStop::new(0.0, 0, 150, 255),
                GradientStop::new(0.5, 200, 60, 255),
                GradientStop::new(1.0, 0, 150, 255),
            ]),
            heat: Gradient::new(vec![
                GradientStop::new(0.0, 255, 60, 180),
                GradientStop::new(0.5, 140, 80, 255),
                GradientStop::new(1.0, 0, 200, 255),
            ]),
            accent: Color::Rgb(120, 120, 255),
            muted: Color::Rgb(85, 85, 135),
            text: Color::Rgb(205, 205, 240),
            warn: Color::Rgb(255, 170, 90),
            error: Color::Rgb(255, 95, 120),
            border_style: Style::default().fg(Color::Rgb(65, 65, 125)),
            focus_border_style: Style::default()
                .fg(Color::Rgb(120, 120, 255))
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Ice theme: cold blue/cyan.
    pub fn ice() -> Self {
        Self {
            name: "ice".into(),
            title_gradient: Gradient::new(vec![
                GradientStop::new(0.0, 100, 200, 255),
                GradientStop::new(0.5, 210, 245, 255),
                GradientStop::new(1.0, 100, 200, 255),
            ]),
            heat: Gradient::new(vec![
                GradientStop::new(0.0, 60, 110, 170),
                GradientStop::new(1.0, 160, 230, 255),
            ]),
            accent: Color::Rgb(100, 200, 255),
            muted: Color::Rgb(85, 115, 135),
            text: Color::Rgb(200, 220, 240),
            warn: Color::Rgb(255, 200, 120),
            error: Color::Rgb(255, 110, 110),
            border_style: Style::default().fg(Color::Rgb(75, 115, 140)),
            focus_border_style: Style::default()
                .fg(Color::Rgb(100, 200, 255))
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Mono theme: grayscale.
    pub fn mono() -> Self {
        Self {
            name: "mono".into(),
            title_gradient: Gradient::new(vec![
                GradientStop::new(0.0, 170, 170, 170),
                GradientStop::new(0.5, 255, 255, 255),
                GradientStop::new(1.0, 170, 170, 170),
            ]),
            heat: Gradient::new(vec![
                GradientStop::new(0.0, 90, 90, 90),
                GradientStop::new(1.0, 245, 245, 245),
            ]),
            accent: Color::White,
            muted: Color::Rgb(105, 105, 105),
            text: Color::Rgb(220, 220, 220),
            warn: Color::Rgb(200, 200, 200),
            error: Color::White,
            border_style: Style::default().fg(Color::Rgb(100, 100, 100)),
            focus_border_style: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_by_name() {
        assert_eq!(Theme::by_name("thermal").name, "thermal");
        assert_eq!(Theme::by_name("glow").name, "glow");
        assert_eq!(Theme::by_name("ice").name, "ice");
        assert_eq!(Theme::by_name("mono").name, "mono");
        assert_eq!(Theme::by_name("GLOW").name, "glow");
        assert_eq!(Theme::by_name("unknown").name, "thermal");
    }

    #[test]
    fn test_heat_gradient_samples() {
        for theme in [Theme::thermal(), Theme::glow(), Theme::ice(), Theme::mono()] {
            assert_eq!(theme.heat.sample(10).len(), 10);
            assert_eq!(theme.title_gradient.sample(5).len(), 5);
        }
    }
}
