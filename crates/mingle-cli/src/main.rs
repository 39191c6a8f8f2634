use mingle::{
    AngleProfile, Bundler, BundlerJson, BundlerOptions, CurveStyle, EdgeInput, MingleReport,
    Point, SvgOptions,
};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Mingle(mingle::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Mingle(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<mingle::Error> for CliError {
    fn from(value: mingle::Error) -> Self {
        Self::Mingle(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Bundle,
    Render,
    Tree,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    config: Option<String>,
    k: Option<usize>,
    angle_strength: Option<f64>,
    profile: Option<AngleProfile>,
    max_rounds: Option<usize>,
    seed: Option<u64>,
    delta: f64,
    pretty: bool,
    out: Option<String>,
    svg: SvgOptions,
    verbosity: u8,
}

#[derive(Serialize)]
struct EdgeOut<'a> {
    id: &'a str,
    points: Vec<Point>,
}

#[derive(Serialize)]
struct BundleOut<'a> {
    report: &'a MingleReport,
    edges: Vec<EdgeOut<'a>>,
}

fn usage() -> &'static str {
    "mingle-cli\n\
\n\
USAGE:\n\
  mingle-cli [bundle] [OPTIONS] [--delta <0..1>] [--pretty] [--out <path>] [<path>|-]\n\
  mingle-cli render [OPTIONS] [--delta <0..1>] [--curve line|quadratic|bezier] [--curviness <x>] [--margin <x>] [--width <w>] [--height <h>] [--out <path>] [<path>|-]\n\
  mingle-cli tree [OPTIONS] [--pretty] [--out <path>] [<path>|-]\n\
\n\
OPTIONS:\n\
  --k <n>                  proximity neighbors per edge\n\
  --angle-strength <x>     bend penalty divisor\n\
  --profile ink|balanced|smooth\n\
  --max-rounds <n>\n\
  --seed <n>               shuffle input edges before bundling (edge arrays only)\n\
  --config <path>          JSON bundler options (camelCase); flags override it\n\
  -v, -vv                  log to stderr (or set MINGLE_LOG)\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - Input is either an array of edges `{id, name?, data: {coords, weight?, color?, alpha?}}`\n\
    or a graph previously printed by `tree`, which is used as-is without bundling again;\n\
    --seed is rejected for such graphs.\n\
  - bundle prints `{report, edges: [{id, points}]}` at strength --delta (default 1).\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a str, CliError> {
    it.next()
        .map(String::as_str)
        .ok_or(CliError::Usage(usage()))
}

fn parse_num<T: std::str::FromStr>(raw: &str) -> Result<T, CliError> {
    raw.parse::<T>().map_err(|_| CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Bundle,
        delta: 1.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "bundle" => args.command = Command::Bundle,
            "render" => args.command = Command::Render,
            "tree" => args.command = Command::Tree,
            "--pretty" => args.pretty = true,
            "-v" => args.verbosity = args.verbosity.max(1),
            "-vv" => args.verbosity = 2,
            "--k" => args.k = Some(parse_num(next_value(&mut it)?)?),
            "--angle-strength" => {
                args.angle_strength = Some(parse_num(next_value(&mut it)?)?);
            }
            "--profile" => {
                args.profile = Some(
                    next_value(&mut it)?
                        .parse::<AngleProfile>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--max-rounds" => args.max_rounds = Some(parse_num(next_value(&mut it)?)?),
            "--seed" => args.seed = Some(parse_num(next_value(&mut it)?)?),
            "--config" => args.config = Some(next_value(&mut it)?.to_string()),
            "--delta" => {
                args.delta = parse_num(next_value(&mut it)?)?;
                if !(0.0..=1.0).contains(&args.delta) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--out" => args.out = Some(next_value(&mut it)?.to_string()),
            "--curve" => {
                args.svg.curve = next_value(&mut it)?
                    .parse::<CurveStyle>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--curviness" => {
                let c: f64 = parse_num(next_value(&mut it)?)?;
                if !(0.0..=1.0).contains(&c) {
                    return Err(CliError::Usage(usage()));
                }
                args.svg.path.curviness = c;
            }
            "--margin" => args.svg.path.margin = parse_num(next_value(&mut it)?)?,
            "--width" => args.svg.width = Some(parse_num(next_value(&mut it)?)?),
            "--height" => args.svg.height = Some(parse_num(next_value(&mut it)?)?),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    args.svg.path.delta = args.delta;
    Ok(args)
}

fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "mingle=debug",
        _ => "mingle=trace",
    };
    let filter = if verbosity == 0 {
        EnvFilter::try_from_env("MINGLE_LOG").unwrap_or_else(|_| EnvFilter::new(default))
    } else {
        EnvFilter::new(default)
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
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

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn to_json_text(value: &impl Serialize, pretty: bool) -> Result<String, CliError> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');
    Ok(text)
}

fn build_options(args: &Args) -> Result<BundlerOptions, CliError> {
    let mut options = match &args.config {
        Some(path) => BundlerOptions::from_json_str(&std::fs::read_to_string(path)?)?,
        None => BundlerOptions::default(),
    };
    if let Some(profile) = args.profile {
        options = options.with_profile(profile);
    }
    if let Some(strength) = args.angle_strength {
        options.angle_strength = strength;
    }
    if let Some(k) = args.k {
        options.k = k;
    }
    if args.max_rounds.is_some() {
        options.max_rounds = args.max_rounds;
    }
    options.validate()?;
    Ok(options)
}

/// Loads a saved graph as-is, or bundles a fresh edge list.
fn load(
    text: &str,
    options: BundlerOptions,
    seed: Option<u64>,
) -> Result<(Bundler, MingleReport), CliError> {
    let value: Value = serde_json::from_str(text)?;
    if value.get("nodes").is_some() {
        if seed.is_some() {
            return Err(CliError::Usage(usage()));
        }
        let json: BundlerJson = serde_json::from_value(value)?;
        let bundler = Bundler::from_json(json, options)?;
        return Ok((bundler, MingleReport::default()));
    }
    let mut edges: Vec<EdgeInput> = serde_json::from_value(value)?;
    if let Some(seed) = seed {
        edges = mingle::util::shuffle(edges, seed);
    }
    let mut bundler = Bundler::from_edges(options, edges)?;
    let report = bundler.mingle();
    Ok((bundler, report))
}

fn run(args: Args) -> Result<(), CliError> {
    init_logging(args.verbosity);
    let options = build_options(&args)?;
    let text = read_input(args.input.as_deref())?;
    let (bundler, report) = load(&text, options, args.seed)?;

    let output = match args.command {
        Command::Bundle => {
            let edges = bundler.unbundle_all(args.delta);
            let out = BundleOut {
                report: &report,
                edges: edges
                    .iter()
                    .map(|e| EdgeOut {
                        id: bundler.node(e.leaf).id(),
                        points: e.points().collect(),
                    })
                    .collect(),
            };
            to_json_text(&out, args.pretty)?
        }
        Command::Render => mingle::render_svg(&bundler, &args.svg),
        Command::Tree => {
            let mut text = bundler.to_json_string(args.pretty)?;
            text.push('\n');
            text
        }
    };
    write_text(&output, args.out.as_deref())
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
