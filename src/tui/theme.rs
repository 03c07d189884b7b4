//! Shared palette

use ratatui::style::Color;

/// Accent for package titles and the logo
pub const PINK: Color = Color::Rgb(245, 169, 184);
/// Package names
pub const BLUE: Color = Color::Rgb(91, 206, 250);
/// Selected row background
pub const SEL_BG: Color = Color::Rgb(45, 35, 55);
pub const BRIGHT_WHITE: Color = Color::Rgb(255, 255, 255);
/// Secondary text and disabled buttons
pub const DIM: Color = Color::Rgb(130, 130, 140);
/// Descriptions inside the selected row
pub const DESC_DIM: Color = Color::Rgb(180, 180, 190);
/// Enabled action buttons
pub const ACTION: Color = Color::Rgb(120, 220, 140);
/// Not-on-AnDistro banner and failure notices
pub const WARN: Color = Color::Rgb(240, 190, 90);
