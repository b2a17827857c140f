//! Command-line arguments.
//!
//! Usage examples:
//!   retouch -i photo.png -o out.png wand 120,80
//!   retouch -i photo.png -o out.png --action heal rect 10,10,60,40
//!   retouch -i photo.png -o cut.png --action extract polygon 10,10 80,10 40,70

use clap::{Parser, Subcommand, ValueEnum};
use kurbo::{Point, Rect};
use retouch_core::PixelColor;
use std::path::PathBuf;

/// Retouch headless selection and compositing.
#[derive(Parser, Debug)]
#[command(name = "retouch", about = "Select a region of an image and fill, delete, stroke, heal or extract it")]
pub struct CliArgs {
    /// Input image.
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output image; the format follows the extension. For `extract` this
    /// receives the cut pixels.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// JSON editor config. Flags below override its fields.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// What to do with the selection.
    #[arg(short, long, value_enum, default_value_t = Action::Fill)]
    pub action: Action,

    /// Foreground colour for fill and stroke (`#rgb`, `#rrggbb`, `#rrggbbaa`).
    #[arg(long, value_name = "HEX")]
    pub color: Option<PixelColor>,

    /// Background colour for delete and extract.
    #[arg(long, value_name = "HEX")]
    pub background: Option<PixelColor>,

    /// Stroke width in pixels.
    #[arg(long, default_value_t = 2.0)]
    pub width: f64,

    /// Magic wand tolerance (0-255).
    #[arg(short, long)]
    pub tolerance: Option<u8>,

    /// Log algorithm details.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub select: Select,
}

/// How the selection is made.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Select {
    /// Magic wand from a seed pixel `x,y`.
    Wand {
        #[arg(value_parser = parse_point)]
        at: Point,
    },
    /// Rectangle between two corners `x0,y0,x1,y1`.
    Rect {
        #[arg(value_parser = parse_rect)]
        rect: Rect,
    },
    /// Ellipse inscribed in `x0,y0,x1,y1`.
    Ellipse {
        #[arg(value_parser = parse_rect)]
        rect: Rect,
    },
    /// Polygon through three or more `x,y` vertices.
    Polygon {
        #[arg(value_parser = parse_point, num_args = 3.., required = true)]
        points: Vec<Point>,
    },
    /// The whole image.
    All,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Fill,
    Delete,
    Stroke,
    /// Content-aware fill.
    Heal,
    Extract,
}

fn parse_numbers(s: &str, n: usize) -> Result<Vec<f64>, String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|e| format!("'{}': {}", part, e)))
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != n {
        return Err(format!("expected {} comma-separated numbers, got {}", n, values.len()));
    }
    Ok(values)
}

pub fn parse_point(s: &str) -> Result<Point, String> {
    let v = parse_numbers(s, 2)?;
    Ok(Point::new(v[0], v[1]))
}

pub fn parse_rect(s: &str) -> Result<Rect, String> {
    let v = parse_numbers(s, 4)?;
    Ok(Rect::new(v[0], v[1], v[2], v[3]))
}
