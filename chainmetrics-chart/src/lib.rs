//! chainmetrics chart: dual-axis line charts in the terminal.
//!
//! - `Figure`: primary axes, optional twin axes, line series
//! - Helpers: price overlay canvas and the impermanent-loss chart
//! - `FigureView`: ratatui widget; `show` draws it full-screen

pub mod error;
pub mod figure;
pub mod helpers;
pub mod render;
pub mod terminal;
pub mod theme;

pub use error::ChartError;
pub use figure::{Axes, Figure, FigureSize, Scale, Series, Stroke};
pub use helpers::{impermanent_loss_figure, plot_impermanent_loss, prepare_canvas, with_price_overlay};
pub use render::{render_to_buffer, FigureView};
pub use terminal::show;
pub use theme::Theme;
