//! CLI binary for pdf2img.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and writes images to a directory.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2img::{
    convert_many_to_dir, inspect, Color, ConfigSummary, ConversionConfig,
    ConversionProgressCallback, DocumentInfo, ImageType, NameTemplate, PageSelection,
    PdfiumBackend, ProgressCallback, RenderBackend, RenderIntent, Source, WrittenImage,
};
use futures::future;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar shared by every input document.
///
/// Each document's `on_conversion_start` grows the bar, so several inputs
/// converting at once still add up to one total. Events carry no document
/// identity, so nothing is tracked per page.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        bar.set_style(style);
        bar.set_prefix("Rendering");
        bar.enable_steady_tick(Duration::from_millis(80));
        Self::with_bar(bar)
    }

    fn with_bar(bar: ProgressBar) -> Arc<Self> {
        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.bar.inc_length(total_pages as u64);
        self.bar.reset_eta();
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, encoded_bytes: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{:>7} KiB", encoded_bytes / 1024)),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Every page as PNG into the current directory (document-1.png, ...)
  pdf2img -i document.pdf

  # First page only, as JPEG, into ./thumbs
  pdf2img -i document.pdf -p firstPage -t jpg -o thumbs

  # Several selections; duplicates are rendered again
  pdf2img -i book.pdf -p 1..3 -p 10 -p lastPage

  # Fit inside 1600x1200 without ever upscaling
  pdf2img -i poster.pdf -s 8 --maxWidth 1600 --maxHeight 1200

  # Custom file names and a transparent background
  pdf2img -i slides.pdf -n 'slide-{i}.{ext}' -b transparent

  # Download and convert
  pdf2img -i https://arxiv.org/pdf/1706.03762 -p 1 -o attention

  # Page count and page sizes only
  pdf2img -i document.pdf --inspect-only --json

PAGE SELECTION:
  all          every page (default)
  firstPage    page 1
  lastPage     the last page
  7            a single page
  2..5         an inclusive range
  1,3..4       a list (also: repeat -p)

NAME TEMPLATE PLACEHOLDERS:
  {i}    1-based index of the image      {p}    page number
  {ext}  png or jpg                      {f}    input file stem

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (otherwise ./ and the system library)
  RUST_LOG          Log filter, e.g. RUST_LOG=pdf2img=debug
  PDF2IMG_*         Default for the matching flag (see --help)
"#;

/// Convert PDF pages to PNG or JPEG images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Convert PDF pages to images (png/jpg)",
    long_about = "Convert pages of PDF documents (local files or URLs) to PNG or JPEG images. \
Pages are rendered concurrently with pdfium and written in the order they were selected.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input PDF file path or HTTP/HTTPS URL (repeatable).
    #[arg(short, long, required = true)]
    input: Vec<String>,

    /// Directory to save output images.
    #[arg(short, long, env = "PDF2IMG_OUT", default_value = ".")]
    out: PathBuf,

    /// Image type: png or jpg.
    #[arg(short = 't', long = "imgType", alias = "img-type", env = "PDF2IMG_IMG_TYPE",
          default_value = "png")]
    img_type: ImageType,

    /// Scale factor (positive number).
    #[arg(short, long, env = "PDF2IMG_SCALE", default_value_t = 3.0,
          value_parser = positive_f32)]
    scale: f32,

    /// Pages to convert: all, firstPage, lastPage, numbers or ranges like 1..3.
    #[arg(short, long, num_args = 1.., env = "PDF2IMG_PAGES", default_value = "all")]
    pages: Vec<String>,

    /// Naming template for output files ({i}, {p}, {ext}, {f}).
    #[arg(short, long, env = "PDF2IMG_NAME", default_value = "{f}-{p}.{ext}")]
    name: NameTemplate,

    /// Password for encrypted PDFs.
    #[arg(long, alias = "ps", env = "PDF2IMG_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Rendering intent: display, print or any.
    #[arg(long, alias = "in", env = "PDF2IMG_INTENT", default_value = "display")]
    intent: RenderIntent,

    /// Background colour: a CSS name, #rrggbb[aa] or rgb()/rgba().
    #[arg(short, long, env = "PDF2IMG_BACKGROUND", default_value = "rgb(255,255,255)")]
    background: Color,

    /// Maximum image width in pixels; the scale is reduced to fit.
    #[arg(long = "maxWidth", aliases = ["mw", "max-width"], env = "PDF2IMG_MAX_WIDTH",
          value_parser = positive_f32)]
    max_width: Option<f32>,

    /// Maximum image height in pixels; the scale is reduced to fit.
    #[arg(long = "maxHeight", aliases = ["mh", "max-height"], env = "PDF2IMG_MAX_HEIGHT",
          value_parser = positive_f32)]
    max_height: Option<f32>,

    /// Cap both dimensions at 4096 px (canvas limits), unless set explicitly.
    #[arg(long = "scaleForBrowserSupport", aliases = ["sb", "scale-for-browser-support"],
          env = "PDF2IMG_SCALE_FOR_BROWSER_SUPPORT")]
    scale_for_browser_support: bool,

    /// JPEG quality (1–100).
    #[arg(long, env = "PDF2IMG_JPEG_QUALITY", default_value_t = 92,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Pages rendered concurrently per document.
    #[arg(short, long, env = "PDF2IMG_CONCURRENCY", default_value_t = 8)]
    concurrency: usize,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2IMG_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print page count and page sizes only, no rendering.
    #[arg(long)]
    inspect_only: bool,

    /// Print a JSON report on stdout.
    #[arg(long, env = "PDF2IMG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2IMG_QUIET")]
    quiet: bool,
}

fn positive_f32(s: &str) -> Result<f32, String> {
    let v: f32 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if !v.is_finite() || v <= 0.0 {
        return Err(format!("must be a positive number, got {s}"));
    }
    Ok(v)
}

#[derive(Serialize)]
struct SourceReport {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<WrittenImage>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<DocumentInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct Report {
    config: ConfigSummary,
    sources: Vec<SourceReport>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Ensure the pdfium engine can be bound ────────────────────────────
    let backend = match cli.pdfium_lib {
        Some(ref path) => PdfiumBackend::with_library_path(path),
        None => PdfiumBackend::new(),
    };
    {
        let backend = backend.clone();
        tokio::task::spawn_blocking(move || backend.check())
            .await
            .context("pdfium check panicked")?
            .context("PDF engine unavailable")?;
    }

    let progress: Option<Arc<CliProgressCallback>> =
        show_progress.then(CliProgressCallback::new);
    let config = build_config(
        &cli,
        Arc::new(backend),
        progress
            .clone()
            .map(|cb| cb as Arc<dyn ConversionProgressCallback>),
    )?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let infos = future::join_all(
            cli.input
                .iter()
                .map(|input| inspect(Source::from(input.as_str()), &config)),
        )
        .await;

        let mut reports = Vec::with_capacity(infos.len());
        for (input, info) in cli.input.iter().zip(infos) {
            let info = if cli.json {
                info.map_err(|e| e.to_string())
            } else {
                Ok(info.with_context(|| format!("Failed to inspect {input}"))?)
            };
            match info {
                Ok(info) if !cli.json => print_info(input, &info),
                Ok(info) => reports.push(SourceReport {
                    input: input.clone(),
                    images: None,
                    info: Some(info),
                    error: None,
                }),
                Err(e) => reports.push(SourceReport {
                    input: input.clone(),
                    images: None,
                    info: None,
                    error: Some(e),
                }),
            }
        }

        if cli.json {
            print_json(&Report {
                config: config.summary(),
                sources: reports,
            })?;
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let started = Instant::now();
    let results = convert_many_to_dir(
        cli.input.iter().map(|input| Source::from(input.as_str())),
        &cli.out,
        &cli.name,
        &config,
    )
    .await;

    if let Some(ref cb) = progress {
        cb.finish();
    }

    let mut reports = Vec::with_capacity(results.len());
    let mut failed = 0usize;
    let mut written_total = 0usize;

    for (input, result) in cli.input.iter().zip(results) {
        match result {
            Ok(images) => {
                written_total += images.len();
                if !cli.quiet && !cli.json {
                    for image in &images {
                        eprintln!(
                            "  {} {}  {}",
                            dim("→"),
                            image.path.display(),
                            dim(&format!("{}x{}", image.width, image.height)),
                        );
                    }
                }
                reports.push(SourceReport {
                    input: input.clone(),
                    images: Some(images),
                    info: None,
                    error: None,
                });
            }
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", red("✘"), bold(input), e);
                reports.push(SourceReport {
                    input: input.clone(),
                    images: None,
                    info: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    if cli.json {
        print_json(&Report {
            config: config.summary(),
            sources: reports,
        })?;
    } else if !cli.quiet {
        let page_errors = progress
            .as_ref()
            .map(|cb| cb.errors.load(Ordering::SeqCst))
            .unwrap_or(0);
        eprintln!(
            "{}  {} images  {}ms  →  {}{}",
            if failed == 0 { green("✔") } else { cyan("⚠") },
            bold(&written_total.to_string()),
            started.elapsed().as_millis(),
            bold(&cli.out.display().to_string()),
            if page_errors > 0 {
                format!("  ({} page errors)", red(&page_errors.to_string()))
            } else {
                String::new()
            },
        );
    }

    if failed > 0 {
        anyhow::bail!("{} of {} inputs failed", failed, cli.input.len());
    }
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(
    cli: &Cli,
    backend: Arc<dyn RenderBackend>,
    progress: Option<ProgressCallback>,
) -> Result<ConversionConfig> {
    let pages = parse_pages(&cli.pages)?;

    let mut builder = ConversionConfig::builder()
        .scale(cli.scale)
        .scale_for_browser_support(cli.scale_for_browser_support)
        .background(cli.background)
        .intent(cli.intent)
        .img_type(cli.img_type)
        .jpeg_quality(cli.jpeg_quality)
        .pages(pages)
        .concurrency(cli.concurrency)
        .download_timeout_secs(cli.download_timeout)
        .backend(backend);

    if let Some(w) = cli.max_width {
        builder = builder.max_width(w);
    }
    if let Some(h) = cli.max_height {
        builder = builder.max_height(h);
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// One `-p` value keeps its own shape; repeated `-p` values form a list.
fn parse_pages(values: &[String]) -> Result<PageSelection> {
    match values {
        [single] => single
            .parse()
            .with_context(|| format!("Invalid --pages value '{single}'")),
        many => PageSelection::from_tokens(many).context("Invalid --pages values"),
    }
}

fn print_info(input: &str, info: &DocumentInfo) {
    println!("File:         {}", input);
    println!("Pages:        {}", info.page_count);
    for (i, size) in info.page_sizes.iter().enumerate() {
        println!(
            "  page {:>4}:  {:.1} x {:.1} pt",
            i + 1,
            size.width,
            size.height
        );
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialise report")?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_short_and_alias_flags() {
        let cli = Cli::try_parse_from([
            "pdf2img", "-i", "a.pdf", "-t", "jpg", "-s", "2", "-p", "1..3", "-p", "lastPage",
            "--ps", "secret", "--in", "print", "-b", "#000", "--mw", "800", "--sb",
        ])
        .unwrap();
        assert_eq!(cli.img_type, ImageType::Jpg);
        assert_eq!(cli.scale, 2.0);
        assert_eq!(cli.pages, vec!["1..3", "lastPage"]);
        assert_eq!(cli.password.as_deref(), Some("secret"));
        assert_eq!(cli.intent, RenderIntent::Print);
        assert_eq!(cli.background, Color::BLACK);
        assert_eq!(cli.max_width, Some(800.0));
        assert!(cli.scale_for_browser_support);
    }

    #[test]
    fn cli_rejects_bad_scale() {
        assert!(Cli::try_parse_from(["pdf2img", "-i", "a.pdf", "-s", "0"]).is_err());
        assert!(Cli::try_parse_from(["pdf2img", "-i", "a.pdf", "-s", "-1"]).is_err());
        assert!(Cli::try_parse_from(["pdf2img", "-i", "a.pdf", "--maxWidth", "abc"]).is_err());
    }

    #[test]
    fn repeated_pages_each_advance_the_bar() {
        let cb = CliProgressCallback::with_bar(ProgressBar::hidden());
        cb.on_conversion_start(2);
        cb.on_conversion_start(1);
        for _ in 0..2 {
            cb.on_page_start(1, 2);
        }
        cb.on_page_complete(1, 2, 2048);
        cb.on_page_error(1, 2, "broken");
        cb.on_page_start(1, 1);
        cb.on_page_complete(1, 1, 10);

        assert_eq!(cb.bar.length(), Some(3));
        assert_eq!(cb.bar.position(), 3);
        assert_eq!(cb.errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn single_pages_value_keeps_shape() {
        let sel = parse_pages(&["firstPage".to_string()]).unwrap();
        assert!(sel.is_single_page());
        let sel = parse_pages(&["1".to_string(), "2".to_string()]).unwrap();
        assert!(!sel.is_single_page());
        assert!(parse_pages(&["0".to_string()]).is_err());
    }
}
