use anyhow::{bail, Context, Result};
use clipcam::config::ClipcamConfig;
use clipcam::recording::{ClipRecorder, ContainerFormat, NativeBackend, VideoCodec};
use clipcam::source::{list_devices, CameraSource, Resolution};
use std::env;

fn main() -> Result<()> {
    clipcam::init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: clipcam-cli <list-devices|record> [args]");
        std::process::exit(1);
    }

    let command = &args[1];
    match command.as_str() {
        "list-devices" => cmd_list_devices(&args),
        "record" => cmd_record(&args),
        _ => {
            eprintln!("Unknown command: {}", command);
            std::process::exit(1);
        }
    }
}

fn cmd_list_devices(args: &[String]) -> Result<()> {
    let devices = list_devices().context("Failed to list cameras")?;
    if args.contains(&"--json".to_string()) {
        println!("{}", serde_json::to_string(&devices)?);
    } else if devices.is_empty() {
        println!("No cameras found");
    } else {
        for d in devices {
            println!("{}: {} ({})", d.id, d.name, d.description);
        }
    }
    Ok(())
}

fn cmd_record(args: &[String]) -> Result<()> {
    // record [--config <file>] [--device <n>] [--output <path>] [--duration <s>]
    //        [--fps <n>] [--resolution <WxH>] [--format <name>] [--codec <name>] [--json]
    let mut config = match flag_value(args, "--config")? {
        Some(path) => ClipcamConfig::load_from_file(path)?,
        None => ClipcamConfig::load_or_default(),
    };
    let json = args.contains(&"--json".to_string());

    if let Some(device) = flag_value(args, "--device")? {
        config.camera.device_index = device.parse().context("--device must be a number")?;
    }
    if let Some(output) = flag_value(args, "--output")? {
        config.recording.output_path = output.to_string();
    }
    if let Some(duration) = flag_value(args, "--duration")? {
        config.recording.duration_secs = duration.parse().context("--duration must be a number")?;
    }
    if let Some(fps) = flag_value(args, "--fps")? {
        config.recording.frames_per_second = fps.parse().context("--fps must be a number")?;
    }
    if let Some(res) = flag_value(args, "--resolution")? {
        let res: Resolution = res.parse()?;
        config.camera.resolution = [res.width, res.height];
    }
    if let Some(format) = flag_value(args, "--format")? {
        if ContainerFormat::from_name(format).is_none() {
            bail!("Unknown container format: {}", format);
        }
        config.recording.container_format = Some(format.to_string());
    }
    if let Some(codec) = flag_value(args, "--codec")? {
        if VideoCodec::from_name(codec).is_none() {
            bail!("Unknown codec: {}", codec);
        }
        config.recording.codec = Some(codec.to_string());
    }

    let session = config.session()?;
    let mut camera = CameraSource::new(
        config.camera.device_index,
        session.resolution(),
        session.frames_per_second.get(),
    )
    .with_context(|| format!("Failed to open camera {}", config.camera.device_index))?;

    let mut backend = NativeBackend::new().with_fast_start(config.output.fast_start);
    if let Some(ref title) = config.output.title {
        backend = backend.with_title(title);
    }

    if !json {
        println!("Ongoing recording...");
    }
    let stats = ClipRecorder::new(backend)
        .record(&mut camera, &session)
        .with_context(|| format!("Recording to {} failed", session.target_path.display()))?;

    if json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        println!(
            "Recording finished: {} frames, {} bytes, {:.1}s of video in {:.1}s -> {}",
            stats.frames_submitted,
            stats.bytes_written,
            stats.media_duration_secs,
            stats.elapsed_secs,
            stats.output_path
        );
    }

    Ok(())
}

/// Value following `flag`, if the flag is present
fn flag_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>> {
    match args.iter().position(|a| a == flag) {
        Some(i) => match args.get(i + 1) {
            Some(value) if !value.starts_with("--") => Ok(Some(value.as_str())),
            _ => bail!("{} requires a value", flag),
        },
        None => Ok(None),
    }
}
