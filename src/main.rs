//! bookset - typeset canonical book JSON into compositor-ready HTML

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};

use bookset::compositor::{Compositor, PrinceCompositor};
use bookset::markup::HyphenationExceptions;
use bookset::render::FigureOverlays;
use bookset::{Book, RenderConfig, RenderContext, render_book};

#[derive(Parser)]
#[command(name = "bookset")]
#[command(version, about = "Typeset canonical book JSON into HTML for a print compositor", long_about = None)]
#[command(after_help = "EXAMPLES:
    bookset book.json -o book.html                     Render the whole book
    bookset book.json --chapter 3 -o ch3.html          Preview one chapter
    bookset book.json --pdf book.pdf --assets img/     Render and compose a PDF")]
struct Cli {
    /// Canonical book JSON
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output HTML file [default: INPUT with .html extension]
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Render configuration (TOML)
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Hyphenation exceptions (JSON: word -> forbidden offsets)
    #[arg(long, value_name = "JSON")]
    hyphenation: Option<PathBuf>,

    /// Figure overlays (JSON: figure number or file name -> asset path)
    #[arg(long, value_name = "JSON")]
    overlays: Option<PathBuf>,

    /// Asset directory; enables the missing-figure check
    #[arg(long, value_name = "DIR")]
    assets: Option<PathBuf>,

    /// Only render this chapter
    #[arg(long, value_name = "N")]
    chapter: Option<String>,

    /// With --chapter, stop after this section number
    #[arg(long, value_name = "N.M", requires = "chapter")]
    until_section: Option<String>,

    /// Write the decision manifest (JSON)
    #[arg(long, value_name = "JSON")]
    manifest: Option<PathBuf>,

    /// Compose a PDF with the compositor
    #[arg(long, value_name = "PDF")]
    pdf: Option<PathBuf>,

    /// Compositor program
    #[arg(long, value_name = "PROGRAM", default_value = "prince")]
    prince: PathBuf,

    /// Extra argument passed to the compositor (repeatable)
    #[arg(long = "prince-arg", value_name = "ARG", allow_hyphen_values = true)]
    prince_args: Vec<String>,

    /// Compositor timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    timeout: u64,

    /// More log output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log to this file instead of the terminal
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("error: failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let level = if cli.quiet {
        LevelFilter::Error
    } else {
        match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    match &cli.log_file {
        Some(path) => WriteLogger::init(level, Config::default(), File::create(path)?)?,
        None => TermLogger::init(
            level,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )?,
    }
    Ok(())
}

fn run(cli: &Cli) -> bookset::Result<()> {
    let mut book = Book::open(&cli.input)?;
    if let Some(chapter) = &cli.chapter {
        book = book.slice_chapter(chapter, cli.until_section.as_deref())?;
    }

    let config = match &cli.config {
        Some(path) => RenderConfig::open(path)?,
        None => RenderConfig::default(),
    };
    let mut ctx = RenderContext::new(&book.meta, config);
    if let Some(path) = &cli.hyphenation {
        let exceptions = HyphenationExceptions::open(path)?;
        info!("Loaded {} hyphenation exceptions", exceptions.len());
        ctx = ctx.with_hyphenation(exceptions);
    }
    if let Some(path) = &cli.overlays {
        let overlays = FigureOverlays::open(path)?;
        info!("Loaded {} figure overlays", overlays.len());
        ctx = ctx.with_overlays(overlays);
    }
    if let Some(dir) = &cli.assets {
        ctx = ctx.with_asset_root(dir);
    }

    let rendered = render_book(&book, &ctx);

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("html"));
    std::fs::write(&output, &rendered.html)?;
    if !cli.quiet {
        println!("Wrote {}", output.display());
    }

    if let Some(path) = &cli.manifest {
        std::fs::write(path, rendered.manifest.to_json()?)?;
        if !cli.quiet {
            println!("Wrote {}", path.display());
        }
    }

    if let Some(pdf) = &cli.pdf {
        let base_dir = cli
            .assets
            .clone()
            .unwrap_or_else(|| parent_dir(&output));
        let compositor = cli.prince_args.iter().fold(
            PrinceCompositor::new(pdf)
                .program(&cli.prince)
                .timeout(Duration::from_secs(cli.timeout))
                .base_dir(base_dir),
            |compositor, arg| compositor.arg(arg),
        );
        let artifact = compositor.compose(&rendered.html)?;
        if !cli.quiet {
            println!("Wrote {}", artifact.path.display());
        }
    }

    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
