use serde::Serialize;
use std::io::Read;
use std::sync::Arc;
use trellis::trellis_core::{
    ClassDiagram, DeterministicTextMeasurer, ExpandedFlags, NestedFlags, compute_block_sizes,
};
use trellis::trellis_hierarchy::{PlacementInput, place};
use trellis::{
    ConnectionLine, DiagnosticEvent, OverlapReport, PlacedBlock, RecordingSink, Session,
    SessionConfig,
};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Trellis(trellis::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Trellis(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<trellis::Error> for CliError {
    fn from(value: trellis::Error) -> Self {
        Self::Trellis(value)
    }
}

impl From<trellis::trellis_core::Error> for CliError {
    fn from(value: trellis::trellis_core::Error) -> Self {
        Self::Trellis(value.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Layout,
    Place,
    Lines,
}

#[derive(Debug)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    frames: usize,
    dt: f64,
    expand_all: bool,
    config: Option<String>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            command: Command::Layout,
            input: None,
            pretty: false,
            frames: 600,
            dt: 1.0 / 60.0,
            expand_all: false,
            config: None,
        }
    }
}

#[derive(Serialize)]
struct LayoutOut<'a> {
    name: &'a str,
    settled: bool,
    frames: usize,
    blocks: &'a [PlacedBlock],
    lines: &'a [ConnectionLine],
    overlaps: &'a OverlapReport,
    diagnostics: &'a [DiagnosticEvent],
}

#[derive(Serialize)]
struct PlaceOut<'a> {
    name: &'a str,
    blocks: &'a [PlacedBlock],
}

fn usage() -> &'static str {
    "trellis\n\
\n\
USAGE:\n\
  trellis [layout] [--pretty] [--frames <n>] [--dt <seconds>] [--expand-all] [--config <path>] [<path>|-]\n\
  trellis place [--pretty] [--expand-all] [--config <path>] [<path>|-]\n\
  trellis lines [--pretty] [--frames <n>] [--dt <seconds>] [--expand-all] [--config <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the diagram JSON is read from stdin.\n\
  - layout runs the settling engine for at most --frames frames (default 600) and prints blocks, lines and diagnostics.\n\
  - place prints the initial hierarchy placement without any settling.\n\
  - lines prints only the connection lines of the settled layout.\n\
  - --config takes a JSON file with session settings; missing fields keep their defaults.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "place" => args.command = Command::Place,
            "lines" => args.command = Command::Lines,
            "--pretty" => args.pretty = true,
            "--expand-all" => args.expand_all = true,
            "--frames" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.frames = n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--dt" => {
                let Some(dt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.dt = dt.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                if !(args.dt.is_finite() && args.dt > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn read_config(path: Option<&str>) -> Result<SessionConfig, CliError> {
    match path {
        None => Ok(SessionConfig::default()),
        Some(path) => Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn run_place(diagram: &ClassDiagram, config: &SessionConfig, args: &Args) -> Result<(), CliError> {
    let placement = &config.engine.placement;
    let expanded: ExpandedFlags = diagram
        .classes
        .iter()
        .map(|c| (c.id.clone(), args.expand_all))
        .collect();
    let sizes = compute_block_sizes(
        &diagram.classes,
        &expanded,
        &NestedFlags::default(),
        &DeterministicTextMeasurer::default(),
        &placement.text_style,
        &placement.constants,
    );
    let placed = place(
        &PlacementInput::new(&diagram.classes, &expanded).with_sizes(&sizes),
        placement,
    );
    write_json(
        &PlaceOut {
            name: &diagram.name,
            blocks: &placed.blocks,
        },
        args.pretty,
    )
}

fn run_settle(diagram: ClassDiagram, config: SessionConfig, args: &Args) -> Result<(), CliError> {
    let sink = RecordingSink::new();
    let mut session = Session::new(config)?.with_sink(sink.clone());
    let diagram = Arc::new(diagram);
    session.set_diagram(diagram.clone());
    if args.expand_all {
        session.expand_all();
    }

    let mut frames = 0;
    let mut out = session.frame(args.dt);
    while frames + 1 < args.frames && !session.is_settled() {
        out = session.frame(args.dt);
        frames += 1;
    }
    frames += 1;

    if args.command == Command::Lines {
        return write_json(&out.lines, args.pretty);
    }
    let diagnostics = sink.events();
    write_json(
        &LayoutOut {
            name: &diagram.name,
            settled: out.settled,
            frames,
            blocks: &out.placed.blocks,
            lines: &out.lines,
            overlaps: &out.overlaps,
            diagnostics: &diagnostics,
        },
        args.pretty,
    )
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let diagram = ClassDiagram::from_json_str(&text)?;
    let config = read_config(args.config.as_deref())?;
    match args.command {
        Command::Place => run_place(&diagram, &config, &args),
        Command::Layout | Command::Lines => run_settle(diagram, config, &args),
    }
}

fn main() {
    let argv: Vec<String> = std::env::args().collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
