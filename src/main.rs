use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;
use webflow::{CompileError, CompileOutput, ComponentCache, FsLoader, compile_file, compile_with};

const EXTENSION: &str = "webf";

#[derive(Parser)]
#[command(name = "webflow")]
#[command(about = "Webflow - compile .webf markup to HTML")]
struct Cli {
    /// Log resolver activity (overridden by WEBFLOW_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile .webf files to HTML
    Build {
        /// Path to .webf file or directory
        #[arg(required_unless_present = "stdin")]
        path: Option<PathBuf>,

        /// Write output under this directory instead of next to each source
        #[arg(long, conflicts_with = "stdin")]
        out: Option<PathBuf>,

        /// Read from stdin and print HTML to stdout
        #[arg(long)]
        stdin: bool,

        /// Directory imports resolve against when reading stdin
        #[arg(long, requires = "stdin")]
        base: Option<PathBuf>,

        /// Print the result as JSON instead of writing .html (stdin or a single file)
        #[arg(long, conflicts_with = "out")]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build { path, out, stdin, base, json } => {
            if stdin {
                build_stdin(base, json);
            } else if let Some(path) = path {
                build_path(&path, out.as_deref(), json);
            } else {
                eprintln!("Error: provide a file/directory or use --stdin");
                std::process::exit(1);
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "webflow=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("WEBFLOW_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn build_stdin(base: Option<PathBuf>, json_output: bool) {
    let mut source = String::new();
    if let Err(err) = io::stdin().read_to_string(&mut source) {
        eprintln!("Error: failed to read stdin: {}", err);
        std::process::exit(1);
    }

    let base = base.unwrap_or_else(|| PathBuf::from("."));
    let mut cache = ComponentCache::new();

    match compile_with(&FsLoader, &source, &base, &mut cache) {
        Ok(html) if json_output => print_json(&CompileOutput {
            html,
            components: cache.names(),
        }),
        Ok(html) => print!("{}", html),
        Err(err) => {
            print_error(&err, &source, "<stdin>");
            std::process::exit(1);
        }
    }
}

fn build_path(path: &Path, out: Option<&Path>, json_output: bool) {
    if path.is_file() {
        if path.extension().is_none_or(|ext| ext != EXTENSION) {
            eprintln!("Error: {} is not a .{} file", path.display(), EXTENSION);
            std::process::exit(1);
        }
        if json_output {
            build_file_json(path);
            return;
        }
        let start = Instant::now();
        let output = match out {
            Some(dir) => dir.join(path.file_name().unwrap_or_default()).with_extension("html"),
            None => path.with_extension("html"),
        };
        if !build_file(path, &output) {
            std::process::exit(1);
        }
        print_summary(1, start.elapsed());
    } else if path.is_dir() {
        if json_output {
            eprintln!("Error: --json needs a single .{} file or --stdin", EXTENSION);
            std::process::exit(1);
        }
        build_directory(path, out);
    } else {
        eprintln!("Error: {} does not exist", path.display());
        std::process::exit(1);
    }
}

fn build_directory(dir: &Path, out: Option<&Path>) {
    let start = Instant::now();
    let mut built = 0;
    let mut failed = 0;

    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == EXTENSION))
    {
        let path = entry.path();
        let output = match out {
            Some(out_dir) => {
                let relative = path.strip_prefix(dir).unwrap_or(path);
                out_dir.join(relative).with_extension("html")
            }
            None => path.with_extension("html"),
        };

        if build_file(path, &output) {
            built += 1;
        } else {
            failed += 1;
        }
    }

    if built + failed == 0 {
        eprintln!("No .{} files found in {}", EXTENSION, dir.display());
        std::process::exit(1);
    }

    print_summary(built, start.elapsed());
    if failed > 0 {
        eprintln!("{} file(s) failed to compile", failed);
        std::process::exit(1);
    }
}

/// Compile one file with a fresh component cache. Returns false on failure.
fn build_file(path: &Path, output: &Path) -> bool {
    let result = match compile_file(&FsLoader, path) {
        Ok(result) => result,
        Err(err) => {
            let source = fs::read_to_string(path).unwrap_or_default();
            print_error(&err, &source, &path.display().to_string());
            return false;
        }
    };

    if let Some(parent) = output.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            eprintln!("Error: failed to create {}: {}", parent.display(), err);
            return false;
        }
    }
    if let Err(err) = fs::write(output, &result.html) {
        eprintln!("Error: failed to write {}: {}", output.display(), err);
        return false;
    }

    print_generated(&output.display().to_string());
    true
}

/// Compile one file and print its `CompileOutput` to stdout without writing anything.
fn build_file_json(path: &Path) {
    match compile_file(&FsLoader, path) {
        Ok(output) => print_json(&output),
        Err(err) => {
            let source = fs::read_to_string(path).unwrap_or_default();
            print_error(&err, &source, &path.display().to_string());
            std::process::exit(1);
        }
    }
}

fn print_json(output: &CompileOutput) {
    match serde_json::to_string(output) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}

/// Render the failing file's error, then the chain of imports that reached it.
fn print_error(err: &CompileError, root_source: &str, root_name: &str) {
    let (inner, chain) = err.innermost();
    let (source, filename) = match chain.last() {
        Some((_, path)) => (
            fs::read_to_string(path).unwrap_or_default(),
            path.display().to_string(),
        ),
        None => (root_source.to_string(), root_name.to_string()),
    };

    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprint!("{}", inner.render_color(&source, &filename));
    } else {
        eprint!("{}", inner.render(&source, &filename));
    }

    for (name, path) in chain.iter().rev() {
        eprintln!(" note: in component '{}' ({})", name, path.display());
    }
    if !chain.is_empty() {
        eprintln!(" note: while compiling {}", root_name);
    }
}

fn print_generated(path: &str) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("  \x1b[32m✓\x1b[0m {}", path);
    } else {
        eprintln!("  ✓ {}", path);
    }
}

fn print_summary(count: usize, elapsed: std::time::Duration) {
    let is_tty = io::stderr().is_terminal();
    let time_str = format_duration(elapsed);
    let files_word = if count == 1 { "file" } else { "files" };

    if is_tty {
        eprintln!("\n\x1b[1m✨ Built {} {} in {}\x1b[0m", count, files_word, time_str);
    } else {
        eprintln!("\n✨ Built {} {} in {}", count, files_word, time_str);
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
