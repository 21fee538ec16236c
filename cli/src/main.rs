mod test_runner;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use renderer::config::Mode;
use renderer::{EngineConfig, RenderError};

const SUBCOMMANDS: &[&str] = &[
    "render", "toc", "width", "shorten", "wrap", "repair", "check", "test", "help",
];

#[derive(Parser)]
#[command(name = "markup", version, about = "Unicode-aware text tools and heading renderer")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a document to HTML or plain text
    Render(RenderArgs),

    /// Print only the table of contents of a document
    Toc(RenderArgs),

    /// Print the console display width of each argument
    Width {
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Shorten text to a number of characters, preferring word boundaries
    Shorten(ShortenArgs),

    /// Break text into lines of at most a number of characters
    Wrap(WrapArgs),

    /// Print a file with invalid UTF-8 replaced by U+FFFD
    Repair { file: String },

    /// Check that a file is well-formed UTF-8
    Check { file: String },

    /// Run .test.md fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Document to render
    file: String,

    /// Config file (default: ./markup.toml when present)
    #[arg(short, long)]
    config: Option<String>,

    /// Render plain text instead of HTML
    #[arg(long)]
    text: bool,

    /// Skip heading anchors and the table of contents
    #[arg(long)]
    no_toc: bool,

    /// Replace invalid UTF-8 instead of failing
    #[arg(long)]
    repair: bool,
}

#[derive(clap::Args)]
struct ShortenArgs {
    text: String,

    /// Maximum length in characters
    #[arg(short, long, default_value_t = 80)]
    length: usize,

    /// Appended when the cut is not at a sentence end
    #[arg(short, long, default_value = glyphs::ELLIPSIS)]
    terminal: String,
}

#[derive(clap::Args)]
struct WrapArgs {
    text: String,

    /// Characters per line, 0 for no wrapping
    #[arg(short, long, default_value_t = 72)]
    width: usize,

    /// Treat the text as HTML: tags take no room, entities one character
    #[arg(long)]
    html: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.md file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_logging();

    // `markup doc.txt` is short for `markup render doc.txt`
    let mut args: Vec<String> = std::env::args().collect();
    let first_positional = args
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, a)| !a.starts_with('-'))
        .map(|(pos, a)| (pos, SUBCOMMANDS.contains(&a.as_str())));
    if let Some((pos, false)) = first_positional {
        args.insert(pos, "render".to_string());
    }

    let cli = Cli::parse_from(&args);
    let no_color = cli.no_color;

    match cli.command {
        Command::Render(args) => do_render(args, false, no_color),
        Command::Toc(args) => do_render(args, true, no_color),
        Command::Width { text } => {
            for t in &text {
                println!("{}", glyphs::display_width(t));
            }
        }
        Command::Shorten(args) => {
            println!("{}", glyphs::shorten(&args.text, args.length, &args.terminal));
        }
        Command::Wrap(args) => {
            let lines = if args.html {
                glyphs::wrap::hard_wrap_html(&args.text, args.width)
            } else {
                glyphs::wrap::hard_wrap(&args.text, args.width)
            };
            for line in lines {
                println!("{}", line);
            }
        }
        Command::Repair { file } => {
            let bytes = read_or_exit(&file);
            let repaired = glyphs::repair(&bytes);
            if let Err(e) = std::io::stdout().write_all(repaired.as_bytes()) {
                eprintln!("error: cannot write output: {}", e);
                process::exit(1);
            }
        }
        Command::Check { file } => do_check(&file, no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn read_or_exit(file: &str) -> Vec<u8> {
    match std::fs::read(file) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", file, e);
            process::exit(1);
        }
    }
}

fn emit(no_color: bool, files: &SimpleFiles<String, String>, diagnostic: &Diagnostic<usize>) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, diagnostic);
}

/// Report a render error against the (repaired) source and exit.
fn fail(no_color: bool, file: &str, source: &[u8], error: &RenderError) -> ! {
    let mut files = SimpleFiles::new();
    let file_id = files.add(file.to_string(), glyphs::repair(source).into_owned());
    emit(no_color, &files, &error.to_diagnostic(file_id));
    process::exit(1);
}

fn load_config(args: &RenderArgs, no_color: bool) -> EngineConfig {
    let mut config = match renderer::load_from(args.config.as_deref().map(PathBuf::from)) {
        Ok(config) => config,
        Err(e) => fail(no_color, "config", b"", &e),
    };
    if args.text {
        config.output.mode = Mode::Text;
    }
    if args.no_toc {
        config.header.generate_toc = false;
    }
    config
}

fn do_render(args: RenderArgs, toc_only: bool, no_color: bool) {
    let config = load_config(&args, no_color);
    let source = read_or_exit(&args.file);

    let document = if args.repair {
        renderer::render_str(&glyphs::repair(&source), &config)
    } else {
        match renderer::render_document(&source, &config) {
            Ok(document) => document,
            Err(e) => fail(no_color, &args.file, &source, &e),
        }
    };

    if let Some(toc) = document.toc_html() {
        println!("{}", toc);
    }
    if !toc_only {
        println!("{}", document.body());
    }
}

fn do_check(file: &str, no_color: bool) {
    let source = read_or_exit(file);
    match glyphs::to_str(&source) {
        Ok(_) => {
            let plane = if glyphs::codec::is_utf8_with_only_bmp(&source) {
                " (Basic Multilingual Plane only)"
            } else {
                ""
            };
            eprintln!("ok: {} is valid UTF-8{}", file, plane);
        }
        Err(e) => fail(no_color, file, &source, &RenderError::from(e)),
    }
}
