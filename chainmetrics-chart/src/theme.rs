//! Color tokens for terminal charts.
//!
//! Neon accents on a near-black surface. Series without an explicit color
//! take the next entry of the palette.

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Near-black plot surface
    pub background: Color,
    /// Axis lines and tick labels
    pub axis: Color,
    /// Axis titles and legend text
    pub text: Color,
    /// Price overlay on the secondary axes
    pub price: Color,
    /// Zero line and other guides
    pub reference: Color,
    /// Cycled through for series without a color
    pub palette: [Color; 5],
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub fn parrot_neon() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            axis: Color::Rgb(100, 149, 237),
            text: Color::Rgb(170, 170, 170),
            // white plays the role black has on paper
            price: Color::White,
            reference: Color::Rgb(110, 110, 110),
            palette: [
                Color::Rgb(0, 255, 255),
                Color::Rgb(0, 255, 128),
                Color::Rgb(255, 20, 147),
                Color::Rgb(255, 140, 0),
                Color::Rgb(147, 112, 219),
            ],
        }
    }

    /// Palette color for the `index`-th uncolored series.
    pub fn series_color(&self, index: usize) -> Color {
        self.palette[index % self.palette.len()]
    }
}
