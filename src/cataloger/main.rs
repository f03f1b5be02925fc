// This is free and unencumbered software released into the public domain.

#[cfg(not(feature = "std"))]
compile_error!("asimov-vivotek-cataloger requires the 'std' feature");

use asimov_module::SysexitsError::{self, *};
use asimov_vivotek_module::{
    cli::{ConnectionOptions, handle_error, info_user},
    shared::{Camera, CameraError, ParameterEntry},
};
use clap::Parser;
use clientele::StandardOptions;
use serde_json::json;
use std::error::Error as StdError;

/// Lists the CGI parameters or events a Vivotek camera exposes.
#[derive(Debug, Parser)]
struct Options {
    #[clap(flatten)]
    flags: StandardOptions,

    #[clap(flatten)]
    connection: ConnectionOptions,

    /// Only list the parameter group GROUP (e.g. `system`, `event_i0`)
    #[arg(long, value_name = "GROUP", conflicts_with = "events")]
    group: Option<String>,

    /// List configured events and whether they are enabled
    #[arg(long)]
    events: bool,

    #[arg(
        value_name = "FORMAT",
        short = 'o',
        long = "output",
        value_enum,
        default_value = "text"
    )]
    output: OutputFormat,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Jsonl,
}

pub fn main() -> Result<SysexitsError, Box<dyn StdError>> {
    asimov_module::dotenv().ok();
    let args = asimov_module::args_os()?;
    let options = Options::parse_from(args);

    if options.flags.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(EX_OK);
    }

    if options.flags.license {
        print!("{}", include_str!("../../UNLICENSE"));
        return Ok(EX_OK);
    }

    #[cfg(feature = "tracing")]
    asimov_module::init_tracing_subscriber(&options.flags).expect("failed to initialize logging");

    let exit_code = match run_cataloger(&options) {
        Ok(()) => EX_OK,
        Err(err) => handle_error(&err, &options.flags),
    };

    Ok(exit_code)
}

fn run_cataloger(options: &Options) -> Result<(), CameraError> {
    let camera = Camera::open(options.connection.to_config()?)?;

    if options.events {
        return list_events(options, &camera);
    }

    info_user(&options.flags, "enumerating camera parameters");

    let params = camera.params();
    let entries: Box<dyn Iterator<Item = ParameterEntry>> = match &options.group {
        Some(group) => Box::new(params.group(group)?),
        None => Box::new(params.items(&[])?),
    };

    let mut count = 0usize;
    for entry in entries {
        match options.output {
            OutputFormat::Text => println!("{}={}", entry.key, entry.value),
            OutputFormat::Jsonl => println!("{}", json!({ "key": entry.key, "value": entry.value })),
        }
        count += 1;
    }

    info_user(&options.flags, &format!("{count} parameters listed"));
    Ok(())
}

fn list_events(options: &Options, camera: &Camera) -> Result<(), CameraError> {
    let events = camera.events();
    let enabled = events.enabled();

    for index in events.indices()? {
        let Some(event) = events.get(index)? else {
            continue;
        };
        let name = event
            .entries()
            .iter()
            .find(|entry| entry.key == format!("{}name", event.prefix()))
            .map(|entry| entry.value.clone())
            .unwrap_or_default();
        let is_enabled = enabled.contains(index);

        match options.output {
            OutputFormat::Text => println!(
                "event {index}: {name} [{}]",
                if is_enabled { "enabled" } else { "disabled" }
            ),
            OutputFormat::Jsonl => println!(
                "{}",
                json!({ "index": index, "name": name, "enabled": is_enabled })
            ),
        }
    }

    Ok(())
}
