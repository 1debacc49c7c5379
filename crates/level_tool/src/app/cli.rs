use std::path::PathBuf;

use tilenav::{CellCoord, Connectivity, Vec2};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ToolOptions {
    /// Overrides the tile size stored in the level file.
    pub(crate) tile_size: Option<f32>,
    /// Overrides the connectivity stored in the level file.
    pub(crate) connectivity: Option<Connectivity>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    Demo { out: PathBuf },
    Export { input: PathBuf, out: PathBuf },
    Inspect { input: PathBuf },
    Classify { input: PathBuf, pos: Vec2 },
    Path {
        input: PathBuf,
        from: CellCoord,
        to: CellCoord,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParsedArgs {
    Help,
    Run {
        options: ToolOptions,
        command: Command,
    },
}

pub(crate) fn parse_args(args: &[String], defaults: ToolOptions) -> Result<ParsedArgs, String> {
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        return Ok(ParsedArgs::Help);
    }

    let mut options = defaults;
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--tile-size" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --tile-size".to_string())?;
                let tile_size = value
                    .parse::<f32>()
                    .map_err(|_| format!("invalid --tile-size value '{value}' (expected f32)"))?;
                if !(tile_size.is_finite() && tile_size > 0.0) {
                    return Err(format!("--tile-size must be greater than zero, got {value}"));
                }
                options.tile_size = Some(tile_size);
                index += 2;
            }
            "--diagonal" => {
                options.connectivity = Some(Connectivity::Eight);
                index += 1;
            }
            _ => break,
        }
    }

    let command = args
        .get(index)
        .ok_or_else(|| "missing subcommand".to_string())?
        .as_str();
    let command_args = &args[(index + 1)..];

    let command = match command {
        "demo" => {
            let [out] = expect_args::<1>("demo", "<out>", command_args)?;
            Command::Demo {
                out: PathBuf::from(out),
            }
        }
        "export" => {
            let [input, out] = expect_args::<2>("export", "<in> <out>", command_args)?;
            Command::Export {
                input: PathBuf::from(input),
                out: PathBuf::from(out),
            }
        }
        "inspect" => {
            let [input] = expect_args::<1>("inspect", "<in>", command_args)?;
            Command::Inspect {
                input: PathBuf::from(input),
            }
        }
        "classify" => {
            let [input, x, y] = expect_args::<3>("classify", "<in> <x> <y>", command_args)?;
            Command::Classify {
                input: PathBuf::from(input),
                pos: Vec2::new(parse_number("x", x)?, parse_number("y", y)?),
            }
        }
        "path" => {
            let [input, x0, y0, x1, y1] =
                expect_args::<5>("path", "<in> <x0> <y0> <x1> <y1>", command_args)?;
            Command::Path {
                input: PathBuf::from(input),
                from: CellCoord::new(parse_number("x0", x0)?, parse_number("y0", y0)?),
                to: CellCoord::new(parse_number("x1", x1)?, parse_number("y1", y1)?),
            }
        }
        other => return Err(format!("unknown subcommand '{other}'")),
    };

    Ok(ParsedArgs::Run { options, command })
}

fn expect_args<'a, const N: usize>(
    command: &str,
    shape: &str,
    args: &'a [String],
) -> Result<[&'a str; N], String> {
    if args.len() != N {
        return Err(format!("{command} expects {shape}, got {} argument(s)", args.len()));
    }
    let mut out = [""; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg.as_str();
    }
    Ok(out)
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, String> {
    raw.parse::<T>()
        .map_err(|_| format!("invalid {name} value '{raw}'"))
}

pub(crate) fn print_usage() {
    println!("{}", usage_text());
}

fn usage_text() -> String {
    [
        "level_tool - build, export and query tile navigation levels",
        "",
        "Usage:",
        "  level_tool [--tile-size <f32>] [--diagonal] demo <out>",
        "  level_tool [--tile-size <f32>] [--diagonal] export <in> <out>",
        "  level_tool [--tile-size <f32>] [--diagonal] inspect <in>",
        "  level_tool [--tile-size <f32>] [--diagonal] classify <in> <x> <y>",
        "  level_tool [--tile-size <f32>] [--diagonal] path <in> <x0> <y0> <x1> <y1>",
        "",
        "Environment:",
        "  TILENAV_CONNECTIVITY  4 or 8 (default 4; --diagonal forces 8)",
        "  RUST_LOG              tracing filter (default info)",
    ]
    .join("\n")
}
