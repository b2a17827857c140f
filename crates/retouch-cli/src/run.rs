//! Headless driver: one selection, one region operation, one output file.

use crate::cli::{Action, CliArgs, Select};
use kurbo::Point;
use retouch_core::tools::SelectionToolKind;
use retouch_core::{
    ComposeError, ConfigError, Editor, EditorConfig, GestureOutcome, ImageSurface, PixelSize, PointerOutcome,
    RasterSurface, ToolKind,
};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("{}", .0.user_message())]
    Compose(#[from] ComposeError),
    #[error("Selection produced no region: {0}")]
    NoSelection(String),
}

pub type CliResult<T> = Result<T, CliError>;

/// What a successful run wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub committed: usize,
}

/// Configuration from `--config`, with flag overrides applied.
pub fn resolve_config(args: &CliArgs) -> CliResult<EditorConfig> {
    let mut config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    if let Some(tolerance) = args.tolerance {
        config.wand_tolerance = tolerance;
    }
    if let Some(color) = args.color {
        config.foreground = color;
    }
    if let Some(color) = args.background {
        config.background = color;
    }
    Ok(config)
}

/// Drive the selection tools the way pointer input would.
fn make_selection(editor: &mut Editor, select: &Select, surface: &mut ImageSurface) -> CliResult<()> {
    let drag = |editor: &mut Editor, surface: &mut ImageSurface, kind, from: Point, to: Point| {
        editor.set_tool(ToolKind::Selection(kind));
        editor.pointer_down(from, &mut *surface);
        editor.pointer_move(to, &*surface);
        editor.pointer_up(to)
    };
    let outcome = match select {
        Select::Wand { at } => {
            editor.set_tool(ToolKind::Selection(SelectionToolKind::MagicWand));
            editor.pointer_down(*at, &mut *surface)
        }
        Select::Rect { rect } => drag(editor, surface, SelectionToolKind::Rectangle, rect.origin(), Point::new(rect.x1, rect.y1)),
        Select::Ellipse { rect } => drag(editor, surface, SelectionToolKind::Ellipse, rect.origin(), Point::new(rect.x1, rect.y1)),
        Select::Polygon { points } => {
            editor.set_tool(ToolKind::Selection(SelectionToolKind::Polygon));
            for p in points {
                editor.pointer_down(*p, &mut *surface);
                editor.pointer_up(*p);
            }
            PointerOutcome::Gesture(editor.finish_gesture())
        }
        Select::All => {
            editor.select_all(surface.size());
            PointerOutcome::Gesture(GestureOutcome::Closed)
        }
    };
    match outcome {
        PointerOutcome::Gesture(GestureOutcome::Closed) if editor.outline().is_some() => Ok(()),
        other => Err(CliError::NoSelection(format!("{:?} gave {:?}", select, other))),
    }
}

/// Run the command described by `args`.
pub fn run(args: &CliArgs) -> CliResult<RunSummary> {
    let config = resolve_config(args)?;
    let image = image::open(&args.input)?.to_rgba8();
    log::info!("Loaded {} ({}x{})", args.input.display(), image.width(), image.height());

    let mut surface = ImageSurface::new(image);
    let mut editor = Editor::new(config);
    make_selection(&mut editor, &args.select, &mut surface)?;

    let extracted = match args.action {
        Action::Fill => editor.fill(&mut surface).map(|_| None)?,
        Action::Delete => editor.delete(&mut surface).map(|_| None)?,
        Action::Stroke => editor.stroke(&mut surface, args.width).map(|_| None)?,
        Action::Heal => editor.content_aware_fill(&mut surface).map(|_| None)?,
        Action::Extract => {
            editor.extract(&mut surface)?;
            editor.clipboard.get().map(|record| record.pixels.clone())
        }
    };
    let committed = editor.flush_commits(&mut surface).len();

    let out = match extracted {
        Some(pixels) => pixels,
        None => surface.into_image(),
    };
    out.save(&args.output)?;
    let size = PixelSize::new(out.width(), out.height());
    log::info!("Wrote {} ({}x{})", args.output.display(), size.width, size.height);
    Ok(RunSummary {
        output: args.output.clone(),
        width: size.width,
        height: size.height,
        committed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use image::{Rgba, RgbaImage};
    use std::path::Path;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn two_tone(dir: &Path) -> PathBuf {
        let path = dir.join("in.png");
        RgbaImage::from_fn(60, 40, |x, _| if x < 30 { RED } else { BLUE })
            .save(&path)
            .unwrap();
        path
    }

    fn args(input: &Path, output: &Path, rest: &[&str]) -> CliArgs {
        let mut argv = vec![
            "retouch".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
        ];
        argv.extend(rest.iter().map(|s| s.to_string()));
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_wand_fill_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = two_tone(dir.path());
        let output = dir.path().join("out.png");
        let summary = run(&args(&input, &output, &["--color", "#00ff00", "wand", "10,10"])).unwrap();
        assert_eq!(summary.committed, 1);
        assert_eq!((summary.width, summary.height), (60, 40));

        let result = image::open(&output).unwrap().to_rgba8();
        assert_eq!(result.get_pixel(10, 10), &Rgba([0, 255, 0, 255]));
        assert_eq!(result.get_pixel(50, 10), &BLUE);
    }

    #[test]
    fn test_rect_delete_uses_background_flag() {
        let dir = tempfile::tempdir().unwrap();
        let input = two_tone(dir.path());
        let output = dir.path().join("out.png");
        run(&args(&input, &output, &["-a", "delete", "--background", "#000", "rect", "40,5,50,15"])).unwrap();
        let result = image::open(&output).unwrap().to_rgba8();
        assert_eq!(result.get_pixel(45, 10), &Rgba([0, 0, 0, 255]));
        assert_eq!(result.get_pixel(45, 20), &BLUE);
    }

    #[test]
    fn test_extract_writes_clipboard_and_commits_cut() {
        let dir = tempfile::tempdir().unwrap();
        let input = two_tone(dir.path());
        let output = dir.path().join("cut.png");
        let summary = run(&args(&input, &output, &["-a", "extract", "--background", "#000", "rect", "20,0,40,10"])).unwrap();
        assert_eq!((summary.width, summary.height), (20, 10));
        assert_eq!(summary.committed, 1);
        let result = image::open(&output).unwrap().to_rgba8();
        assert_eq!(result.get_pixel(0, 0), &RED);
        assert_eq!(result.get_pixel(19, 0), &BLUE);
    }

    #[test]
    fn test_heal_polygon() {
        let dir = tempfile::tempdir().unwrap();
        let input = two_tone(dir.path());
        let output = dir.path().join("out.png");
        let summary = run(&args(&input, &output, &["-a", "heal", "polygon", "5,5", "20,5", "20,20", "5,20"])).unwrap();
        assert_eq!(summary.committed, 1);
        let result = image::open(&output).unwrap().to_rgba8();
        // surrounded by red on every side, so it stays red
        assert_eq!(result.get_pixel(12, 12), &RED);
    }

    #[test]
    fn test_degenerate_rect_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = two_tone(dir.path());
        let output = dir.path().join("out.png");
        let err = run(&args(&input, &output, &["rect", "5,5,5,5"])).unwrap_err();
        assert!(matches!(err, CliError::NoSelection(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_config_file_and_override() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.json");
        std::fs::write(&config, r##"{"wand_tolerance": 5, "foreground": "#123456ff"}"##).unwrap();
        let parsed = args(
            Path::new("in.png"),
            Path::new("out.png"),
            &["-c", config.to_str().unwrap(), "-t", "40", "all"],
        );
        let resolved = resolve_config(&parsed).unwrap();
        assert_eq!(resolved.wand_tolerance, 40);
        assert_eq!(resolved.foreground, retouch_core::PixelColor::rgb(0x12, 0x34, 0x56));
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&args(&dir.path().join("nope.png"), &dir.path().join("o.png"), &["all"])).unwrap_err();
        assert!(matches!(err, CliError::Image(_)));
    }
}
