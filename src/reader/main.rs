// This is free and unencumbered software released into the public domain.

#[cfg(not(feature = "std"))]
compile_error!("asimov-vivotek-reader requires the 'std' feature");

use asimov_module::SysexitsError::{self, *};
use asimov_vivotek_module::{
    cli::{ConnectionOptions, handle_error, info_user, warn_user_with_error},
    shared::{Camera, CameraError, DEFAULT_SNAPSHOT_QUALITY, MotorView},
};
use clap::Parser;
use clientele::StandardOptions;
use std::{error::Error as StdError, path::PathBuf};

/// Prints identity and status information of a Vivotek camera.
#[derive(Debug, Parser)]
struct Options {
    #[clap(flatten)]
    flags: StandardOptions,

    #[clap(flatten)]
    connection: ConnectionOptions,

    /// Also print focus and zoom motor status
    #[arg(long)]
    motors: bool,

    /// Save a still image to FILE
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Still image quality, 1 (lowest) to 5 (highest)
    #[arg(long, default_value_t = DEFAULT_SNAPSHOT_QUALITY, value_parser = clap::value_parser!(u8).range(1..=5))]
    quality: u8,
}

const REPORT: &[(&str, &str)] = &[
    ("Firmware", "system_info_firmwareversion"),
    ("Network info", "status_eth_i0"),
    ("RTSP port", "network_rtsp_port"),
];

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

    let exit_code = match run_reader(&options) {
        Ok(()) => EX_OK,
        Err(err) => handle_error(&err, &options.flags),
    };

    Ok(exit_code)
}

fn run_reader(opts: &Options) -> Result<(), CameraError> {
    let config = opts.connection.to_config()?;
    info_user(
        &opts.flags,
        &format!(
            "connecting to {}://{}:{} as {}",
            config.scheme(),
            config.host(),
            config.port(),
            config.security_level()
        ),
    );

    let mut camera = Camera::open(config)?;

    println!("Camera model:  {}", camera.model_name()?);
    for (label, key) in REPORT {
        print_row(opts, label, camera.get_param(key));
    }
    print_row(opts, "Serial number", camera.get_serial());
    print_row(opts, "MAC address", camera.get_mac());

    let date_time = camera
        .params()
        .items(&["system_date", "system_time"])
        .map(|entries| entries.map(|e| e.value).collect::<Vec<_>>().join(" "));
    print_row(opts, "Date & time", date_time);
    print_row(opts, "Status", camera.get_param("status_vi_i0"));

    if opts.motors {
        print_motor(opts, "Focus", camera.focus());
        print_motor(opts, "Zoom", camera.zoom());
    }

    if let Some(path) = &opts.snapshot {
        let jpeg = camera.snapshot(opts.quality)?;
        let image = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg)
            .map_err(|e| CameraError::other(format!("device returned an unreadable image: {e}")))?;
        std::fs::write(path, &jpeg)
            .map_err(|e| CameraError::other(format!("failed to write {}: {e}", path.display())))?;
        println!(
            "Snapshot:      {} ({}x{}, {} bytes)",
            path.display(),
            image.width(),
            image.height(),
            jpeg.len()
        );
    }

    Ok(())
}

fn print_row(opts: &Options, label: &str, value: Result<String, CameraError>) {
    let label = format!("{label}:");
    match value {
        Ok(value) => println!("{label:<15}{value}"),
        Err(err) => {
            warn_user_with_error(&opts.flags, &format!("could not read {label}"), &err);
            println!("{label:<15}n/a");
        },
    }
}

fn print_motor(opts: &Options, label: &str, motor: Result<MotorView<'_>, CameraError>) {
    let label = format!("{label}:");
    match motor {
        Ok(motor) => {
            let status = motor.status();
            println!(
                "{label:<15}{} (range {}..={}, max {}, {})",
                status.motor,
                status.motor_start,
                status.motor_end,
                status.motor_max,
                if status.enable { "enabled" } else { "disabled" }
            );
        },
        Err(err) => {
            warn_user_with_error(&opts.flags, &format!("could not read {label}"), &err);
            println!("{label:<15}n/a");
        },
    }
}
