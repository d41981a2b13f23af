use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};

use snipcast::capture::xcap::XcapGrabber;
use snipcast::config::STATUS_POLL_INTERVAL;
use snipcast::screencast::RecordingOutcome;
use snipcast::session::{PointerEvent, SelectionOutcome, SessionEvent};
use snipcast::surface::{GifSaveDialog, NoOverlay};
use snipcast::{CaptureMode, CaptureSession, Settings};

const USAGE: &str = "usage:
  snipcast shot X0 Y0 X1 Y1
  snipcast record X0 Y0 X1 Y1 [normal|quality|fps] [SECONDS]";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        bail!("{USAGE}");
    };

    match command.as_str() {
        "shot" => shot(rest),
        "record" => record(rest),
        other => bail!("unknown command {other:?}\n{USAGE}"),
    }
}

fn parse_region(args: &[String]) -> anyhow::Result<[i32; 4]> {
    if args.len() < 4 {
        bail!("expected four region coordinates\n{USAGE}");
    }
    let mut coords = [0; 4];
    for (slot, arg) in coords.iter_mut().zip(args) {
        *slot = arg
            .parse()
            .with_context(|| format!("invalid coordinate {arg:?}"))?;
    }
    Ok(coords)
}

/// Open a session and drag out the region as a user would
fn open_session(region: [i32; 4]) -> anyhow::Result<CaptureSession> {
    let settings = Settings::load();
    let mut session = CaptureSession::new(Arc::new(XcapGrabber::new()), &settings)
        .context("failed to open capture session")?;

    let [x0, y0, x1, y1] = region;
    session.pointer(PointerEvent::Down { x: x0, y: y0 })?;
    session.pointer(PointerEvent::Drag { x: x1, y: y1 })?;
    match session.pointer(PointerEvent::Up { x: x1, y: y1 })? {
        SessionEvent::Selection(SelectionOutcome::Committed(rect)) => {
            log::info!("Region {:?}", rect);
            Ok(session)
        }
        SessionEvent::Selection(SelectionOutcome::TooSmall) => {
            bail!("region is too small")
        }
        other => bail!("region was not accepted: {other:?}"),
    }
}

fn shot(args: &[String]) -> anyhow::Result<()> {
    let mut session = open_session(parse_region(args)?)?;
    let path = session.export_still().context("failed to export still")?;
    println!("{}", path.display());
    Ok(())
}

fn record(args: &[String]) -> anyhow::Result<()> {
    let mut session = open_session(parse_region(args)?)?;

    let mode = match args.get(4) {
        Some(name) => CaptureMode::by_name(name)
            .with_context(|| format!("unknown capture mode {name:?}"))?,
        None => CaptureMode::default(),
    };
    let mut request = session.record_request(mode)?;
    if let Some(secs) = args.get(5) {
        let secs: u64 = secs
            .parse()
            .with_context(|| format!("invalid duration {secs:?}"))?;
        request = request.with_duration_limit(Duration::from_secs(secs));
    }

    session
        .start_recording(request, Box::new(NoOverlay), Box::new(GifSaveDialog))
        .context("failed to start recording")?;

    let (enter_tx, enter_rx) = crossbeam_channel::bounded(1);
    std::thread::spawn(move || {
        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line).is_ok() {
            let _ = enter_tx.send(());
        }
    });
    eprintln!("Recording, press Enter to stop");

    loop {
        if enter_rx.try_recv().is_ok() {
            session.stop_recording();
        }
        let status = session.recording_status();
        if status.phase.is_finished() {
            break;
        }
        if status.countdown > 0 {
            eprint!("\rStarting in {}s   ", status.countdown);
        } else if status.is_saving {
            eprint!("\rSaving {:>3}%      ", status.progress);
        } else if status.is_recording {
            eprint!("\r{}   ", session.recording_label());
        }
        session.wait_recording_change(STATUS_POLL_INTERVAL);
    }
    eprintln!();

    match session.finish_recording().context("recording failed")? {
        RecordingOutcome::Saved(path) => println!("{}", path.display()),
        RecordingOutcome::SaveCancelled => eprintln!("Save cancelled"),
        RecordingOutcome::Cancelled => eprintln!("Recording cancelled"),
    }
    Ok(())
}
