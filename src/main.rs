use std::env;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use tracing::info;

use gallery_grid::captions::{CaptionPipeline, SidecarCaptionSource};
use gallery_grid::config::GalleryConfig;
use gallery_grid::layout::FixedAdvanceMetrics;
use gallery_grid::models::{FileEntry, GridPosition, GroupHeader};
use gallery_grid::scanner::FileScanner;
use gallery_grid::selection::SelectionState;
use gallery_grid::view::{render_rows, CellState, GridDataSource, ItemRenderer};
use gallery_grid::GalleryModel;

#[derive(Debug)]
struct CliArgs {
    dir: PathBuf,
    config: Option<PathBuf>,
    width: f32,
    grouped: Option<bool>,
    current: Option<PathBuf>,
}

fn parse_args() -> Result<CliArgs> {
    let mut dir = None;
    let mut config = None;
    let mut width = 800.0;
    let mut grouped = None;
    let mut current = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().context("Missing value for --config")?;
                config = Some(PathBuf::from(value));
            }
            "--width" => {
                let value = args.next().context("Missing value for --width")?;
                width = value
                    .parse()
                    .context("Failed to parse --width as a number")?;
            }
            "--current" => {
                let value = args.next().context("Missing value for --current")?;
                current = Some(PathBuf::from(value));
            }
            "--grouped" => grouped = Some(true),
            "--flat" => grouped = Some(false),
            other if other.starts_with("--") => bail!("Unknown option {}", other),
            other => {
                if dir.is_some() {
                    bail!("Only one directory may be given");
                }
                dir = Some(PathBuf::from(other));
            }
        }
    }

    if width <= 0.0 {
        bail!("--width must be greater than 0");
    }
    let dir = dir.context("Usage: gallery-grid <directory> [--width N] [--grouped|--flat]")?;
    Ok(CliArgs {
        dir,
        config,
        width,
        grouped,
        current,
    })
}

/// Prints one line per cell.
struct TextRenderer<'a> {
    model: &'a GalleryModel,
    measure: FixedAdvanceMetrics,
    now: Instant,
}

impl ItemRenderer for TextRenderer<'_> {
    fn header(&mut self, pos: GridPosition, header: &GroupHeader) {
        println!(
            "[{:>4}] == {} ({} files)",
            pos.row,
            header.key.label(),
            header.file_count
        );
    }

    fn file(&mut self, pos: GridPosition, file: &FileEntry, state: CellState) {
        let marker = match state.selection {
            SelectionState::Primary => '*',
            SelectionState::Secondary => '+',
            SelectionState::None => ' ',
        };
        let caption = self
            .model
            .caption_layout(pos, &self.measure, self.now)
            .map(|layout| {
                layout
                    .fragments
                    .iter()
                    .map(|f| f.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" / ")
            })
            .unwrap_or_default();
        println!(
            "[{:>4}:{}] {} {} | {}",
            pos.row,
            pos.column,
            marker,
            file.display_name(),
            caption
        );
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gallery_grid=info".parse()?),
        )
        .init();

    let args = parse_args()?;
    let mut config = match &args.config {
        Some(path) => GalleryConfig::load_from(path)?,
        None => GalleryConfig::load()?,
    };
    if let Some(grouped) = args.grouped {
        config.group_by_folder = grouped;
    }

    let files = FileScanner::new().discover(&args.dir)?;
    info!(count = files.len(), dir = ?args.dir, "Scanned gallery directory");

    let now = Instant::now();
    let pipeline = CaptionPipeline::new(SidecarCaptionSource::new());
    let mut model = GalleryModel::new(config, pipeline);
    model.set_viewport_width(args.width, now)?;
    model.set_files(files, now)?;
    if let Some(current) = args.current {
        let current = current.canonicalize().unwrap_or(current);
        model.set_current_file(Some(current));
    }

    let mut renderer = TextRenderer {
        model: &model,
        measure: FixedAdvanceMetrics::default(),
        now,
    };
    let drawn = render_rows(&model, 0..model.row_count(), &mut renderer);
    info!(
        drawn,
        rows = model.row_count(),
        columns = model.column_count(),
        "Rendered gallery"
    );
    Ok(())
}
