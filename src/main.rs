use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::info;
use std::path::{Path, PathBuf};

use label_sheet::config::{load_csv_data, load_settings_config, Settings};
use label_sheet::label::{LabelComposer, LabelFields, SheetRenderer};
use label_sheet::pdf::{build_document, resolve_fonts, FontPair, PdfSurface};
use label_sheet::sticker::{StickerComposer, StickerLayout};

/// Print sheets of barcode labels, or QR stickers, as PDF.
#[derive(Parser, Debug)]
#[command(name = "label_sheet")]
#[command(about = "Print sheets of Code 128 barcode labels, or QR stickers, as PDF.", long_about = None)]
struct Args {
    /// Directory containing optional settings.json and data.csv
    #[arg(short, long, default_value = ".")]
    target_dir: PathBuf,

    /// Output file (default: output.pdf, or sticker.pdf, in the target directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Identifier encoded in the barcode when no data.csv is present
    #[arg(long)]
    identifier: Option<String>,

    /// SKU printed under the barcode
    #[arg(long)]
    sku: Option<String>,

    /// Product description
    #[arg(long)]
    description: Option<String>,

    /// Country of origin
    #[arg(long)]
    country: Option<String>,

    /// Fill one sheet with the first data.csv label
    #[arg(long)]
    fill_sheet: bool,

    /// Leave labels with unencodable identifiers blank instead of failing
    #[arg(long)]
    skip_invalid: bool,

    /// Print a QR sticker for ID instead of a label sheet (repeatable, one page each)
    #[arg(
        long = "sticker",
        value_name = "ID",
        conflicts_with_all = ["identifier", "sku", "description", "country", "fill_sheet", "skip_invalid"]
    )]
    stickers: Vec<String>,

    /// Sticker page format [default: square]
    #[arg(long, value_enum, requires = "stickers")]
    sticker_style: Option<StickerStyle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StickerStyle {
    /// 250 x 250 pt, 150 pt code
    Square,
    /// 2 x 2.5 in, 120 pt code, high error correction
    Tall,
}

impl StickerStyle {
    fn layout(self) -> StickerLayout {
        match self {
            StickerStyle::Square => StickerLayout::square(),
            StickerStyle::Tall => StickerLayout::tall(),
        }
    }
}

impl Args {
    fn sticker_layout(&self) -> StickerLayout {
        self.sticker_style.unwrap_or(StickerStyle::Square).layout()
    }

    /// Label fields given on the command line, if any.
    fn label_flags(&self) -> Option<LabelFields> {
        let flags = [&self.identifier, &self.sku, &self.description, &self.country];
        if flags.iter().all(|flag| flag.is_none()) {
            return None;
        }
        Some(LabelFields::from_parts(
            self.identifier.as_deref(),
            self.sku.as_deref(),
            self.description.as_deref(),
            self.country.as_deref(),
        ))
    }
}

/// Where the labels of a sheet come from.
#[derive(Debug, PartialEq)]
enum LabelSource {
    Csv(PathBuf),
    Single(LabelFields),
}

fn label_source(args: &Args, data_csv_path: &Path) -> Result<LabelSource> {
    let flags = args.label_flags();
    if data_csv_path.exists() {
        if flags.is_some() {
            bail!(
                "--identifier, --sku, --description and --country describe a single label and cannot be combined with {:?}",
                data_csv_path
            );
        }
        return Ok(LabelSource::Csv(data_csv_path.to_path_buf()));
    }
    Ok(LabelSource::Single(flags.unwrap_or_default()))
}

fn run(args: Args) -> Result<()> {
    let target_dir = &args.target_dir;
    if !target_dir.exists() {
        return Err(anyhow!("Target directory not found: {:?}", target_dir));
    }
    if !target_dir.is_dir() {
        return Err(anyhow!("Target path is not a directory: {:?}", target_dir));
    }

    let settings_json_path = target_dir.join("settings.json");
    let settings = if settings_json_path.exists() {
        info!("Loading configuration from {:?}", settings_json_path);
        load_settings_config(&settings_json_path)?
    } else {
        info!("No settings.json found, using the default A4 sheet");
        Settings::default()
    };
    let fonts = resolve_fonts(settings.settings.font.as_deref())?;

    if args.stickers.is_empty() {
        run_sheet(&args, &settings, &fonts)
    } else {
        run_stickers(&args, &fonts)
    }
}

fn run_sheet(args: &Args, settings: &Settings, fonts: &FontPair) -> Result<()> {
    let target_dir = &args.target_dir;
    let output_pdf_path = args
        .output
        .clone()
        .unwrap_or_else(|| target_dir.join("output.pdf"));

    let spec = settings.grid_spec();
    let composer = LabelComposer::new(settings.label_style(), fonts);
    let renderer = SheetRenderer::new(&spec, composer)
        .with_context(|| "Label grid does not fit the page")?
        .skip_invalid(args.skip_invalid);

    let labels = match label_source(args, &target_dir.join("data.csv"))? {
        LabelSource::Csv(path) => {
            info!("Loading labels from {:?}", path);
            let labels = load_csv_data(&path)?;
            info!("Found {} labels in data.csv", labels.len());
            if args.fill_sheet && !labels.is_empty() {
                info!("Filling one sheet with {:?}", labels[0].identifier);
                renderer.fill_sheet(&labels[0])
            } else {
                labels
            }
        }
        LabelSource::Single(fields) => {
            info!("No data.csv found, filling one sheet with {:?}", fields.identifier);
            renderer.fill_sheet(&fields)
        }
    };

    if labels.is_empty() {
        return Err(anyhow!("No labels to print"));
    }

    let (pages, summary) = renderer.render(&labels, |_| PdfSurface::new(spec.page_height))?;
    let mut document = build_document(pages, spec.page_width, spec.page_height, fonts)?;
    document
        .save(&output_pdf_path)
        .with_context(|| format!("Failed to save {:?}", output_pdf_path))?;

    info!(
        "Saved {:?}: {} pages, {} labels drawn, {} skipped, {} descriptions truncated",
        output_pdf_path,
        summary.pages,
        summary.labels_drawn,
        summary.labels_skipped,
        summary.descriptions_truncated
    );
    Ok(())
}

fn run_stickers(args: &Args, fonts: &FontPair) -> Result<()> {
    let output_pdf_path = args
        .output
        .clone()
        .unwrap_or_else(|| args.target_dir.join("sticker.pdf"));

    let layout = args.sticker_layout();
    let composer = StickerComposer::new(layout, fonts);
    let pages = composer
        .render(&args.stickers, |_| PdfSurface::new(layout.page_height))
        .with_context(|| "Failed to generate QR stickers")?;

    let mut document = build_document(pages, layout.page_width, layout.page_height, fonts)?;
    document
        .save(&output_pdf_path)
        .with_context(|| format!("Failed to save {:?}", output_pdf_path))?;

    info!("Saved {:?}: {} stickers", output_pdf_path, args.stickers.len());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        for cause in e.chain().skip(1) {
            eprintln!("Caused by: {}", cause);
        }
        std::process::exit(1);
    }
}
