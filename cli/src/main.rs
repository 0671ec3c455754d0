use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use bumpjson::{
    parse_with_options, Document, Location, NodeArena, ParseError, ParseOptions, WriteOptions,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

const TAB_WIDTH: usize = 4;

#[derive(Parser, Debug)]
#[command(name = "bumpjson", version, about = "Validate and pretty-print JSON")]
struct Args {
    /// Input file path. Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Indent with this many spaces instead of a tab.
    #[arg(long, value_name = "number", conflicts_with = "tab")]
    indent: Option<usize>,

    /// Indent with a tab (default).
    #[arg(long)]
    tab: bool,

    /// Reject raw control characters inside strings.
    #[arg(long)]
    strict: bool,

    /// Maximum nesting depth of arrays and objects (at most 1024).
    #[arg(long, value_name = "number", default_value_t = bumpjson::constants::MAX_DEPTH)]
    max_depth: usize,

    /// Report input size, parse time and arena usage on stderr.
    #[arg(long)]
    stats: bool,

    /// Only validate; print nothing on success.
    #[arg(long)]
    check: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn parse_options(&self) -> ParseOptions {
        ParseOptions::new()
            .with_max_depth(self.max_depth)
            .with_strict(self.strict)
    }

    fn write_options(&self) -> WriteOptions {
        match self.indent {
            Some(spaces) if !self.tab => WriteOptions::new().with_spaces(spaces),
            _ => WriteOptions::default(),
        }
    }

    fn input_label(&self) -> &str {
        match self.input.as_deref() {
            None | Some("-") => "<stdin>",
            Some(path) => path,
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("ERROR  {err}");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Returns `Ok(false)` when the input is not valid JSON; the diagnostic has
/// already been printed.
fn run(args: &Args) -> Result<bool, Box<dyn Error>> {
    let source = read_input(args.input.as_deref())?;
    let mut buffer = source.clone();
    let mut arena = NodeArena::new();

    let started = Instant::now();
    let outcome = parse_with_options(&mut buffer, &mut arena, &args.parse_options());
    let elapsed = started.elapsed();

    let document = match outcome {
        Ok(document) => document,
        Err(err) => {
            eprint!("{}", render_error(args.input_label(), &source, &err));
            return Ok(false);
        }
    };

    tracing::info!(input = args.input_label(), end = document.end(), "parsed");

    if !args.check {
        let mut text = bumpjson::to_string_with_options(document.root(), &args.write_options());
        text.push('\n');
        write_output(args.output.as_deref(), text.as_bytes())?;
    }

    if args.stats {
        print_stats(source.len(), &document, elapsed);
    }
    Ok(true)
}

fn read_input(input: Option<&str>) -> Result<Vec<u8>, Box<dyn Error>> {
    match input {
        None | Some("-") => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(fs::read(path)?),
    }
}

fn write_output(path: Option<&str>, data: &[u8]) -> Result<(), Box<dyn Error>> {
    match path {
        Some(path) if path != "-" => fs::write(path, data)?,
        _ => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(data)?;
            handle.flush()?;
        }
    }
    Ok(())
}

fn print_stats(input_len: usize, document: &Document<'_, '_>, elapsed: Duration) {
    let arena = document.arena().stats();
    let seconds = elapsed.as_secs_f64();
    let throughput = if seconds > 0.0 {
        input_len as f64 / seconds / (1024.0 * 1024.0)
    } else {
        0.0
    };
    eprintln!("input:  {input_len} bytes ({} parsed)", document.end());
    eprintln!("time:   {:.3} ms ({throughput:.1} MiB/s)", seconds * 1000.0);
    eprintln!(
        "arena:  {} nodes in {} zones ({} bytes reserved)",
        arena.slots_used, arena.zones, arena.bytes_reserved
    );
}

/// `file:line:col: error KIND`, then the offending line and a caret under the
/// failing byte. Tabs are expanded so the caret lines up.
fn render_error(label: &str, source: &[u8], err: &ParseError) -> String {
    let Location { line, column, offset } = err.location(source);
    let line_start = offset + 1 - column;
    let line_end = line_end(source, line_start);

    let mut text = String::new();
    let mut caret = 0;
    for (idx, &byte) in source[line_start..line_end].iter().enumerate() {
        let width_before = text.len();
        match byte {
            b'\t' => text.push_str(&" ".repeat(TAB_WIDTH)),
            b'\r' => text.push_str("\\r"),
            0x08 => text.push_str("\\b"),
            0x0C => text.push_str("\\f"),
            0 => text.push_str("\\0"),
            byte if byte.is_ascii() => text.push(byte as char),
            _ => text.push('?'),
        }
        if line_start + idx < offset {
            caret += text.len() - width_before;
        }
    }

    format!(
        "{label}:{line}:{column}: error {}\n{text}\n{:>width$}\n",
        err.kind().as_str(),
        "^",
        width = caret + 1
    )
}

fn line_end(source: &[u8], from: usize) -> usize {
    memchr::memchr(b'\n', &source[from..]).map_or(source.len(), |idx| from + idx)
}
