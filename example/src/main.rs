use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use swiper_core::{
    CancelReason, EventKind, HeadlessSurface, Instant, PointerEvent, PointerKind,
    PointerPosition, Swiper, SwiperArgs, SwiperEvent,
};
use tracing::{trace, warn};

mod output;
mod script;

use script::Step;

const DEFAULT_SCRIPT: &str = "drag:250,drag:10@600,drag:12@90,next+prev,goto:4,next,jump:1,\
goto:abc,resize:480,scroll:200,tap,escape,drag:-400";

#[derive(Parser)]
#[command(name = "example")]
#[command(version, about = "Drive a headless swiper with a gesture script", long_about = None)]
struct Cli {
    /// Number of panels
    #[arg(long, default_value_t = 5)]
    panels: usize,
    /// Viewport width in pixels
    #[arg(long, default_value_t = 320.0)]
    width: f32,
    /// JSON configuration record (camelCase keys, durations in milliseconds)
    #[arg(long)]
    config: Option<std::path::PathBuf>,
    /// Steps separated by `,`; steps joined by `+` run without settling in between
    #[arg(long, default_value = DEFAULT_SCRIPT)]
    script: String,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let args = load_args(cli.config.as_deref())?;
    let batches = script::parse(&cli.script).context("Failed to parse the gesture script")?;

    let mut swiper = Swiper::new(HeadlessSurface::new(cli.width), cli.panels, args);
    report_events(&mut swiper);
    output::status(
        "Mounted",
        format!(
            "{} panels, page width {}px, on page {}",
            swiper.panel_count(),
            swiper.page_width().raw(),
            swiper.current_index()
        ),
    );

    for batch in batches {
        for step in batch {
            output::status("Step", format!("{step:?}"));
            run_step(&mut swiper, step);
        }
        settle(&mut swiper);
    }

    output::status(
        "Finished",
        format!(
            "on page {} of {}, strip at {}px",
            swiper.current_index(),
            swiper.panel_count(),
            swiper.surface().strip_offset()
        ),
    );
    swiper.destroy();
    Ok(())
}

fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new("warn,swiper_core=info,example=info")
        {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("warn"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .try_init();
}

fn load_args(path: Option<&Path>) -> Result<SwiperArgs> {
    let Some(path) = path else {
        return Ok(SwiperArgs::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    SwiperArgs::from_json(&json).with_context(|| format!("Failed to load {}", path.display()))
}

fn report_events(swiper: &mut Swiper<HeadlessSurface>) {
    for kind in EventKind::ALL {
        swiper.on(kind, |event| match event {
            SwiperEvent::PageChange { index } => output::event("pageChange", format!("{index}")),
            SwiperEvent::TransitionEnd { index } => {
                output::event("transitionEnd", format!("{index}"))
            }
            SwiperEvent::DragStart { position } => {
                output::event("dragStart", format!("at {:.0},{:.0}", position.x, position.y))
            }
            SwiperEvent::Drag { delta, .. } => trace!(delta, "drag"),
            SwiperEvent::DragEnd {
                delta,
                elapsed,
                cancelled,
            } => output::event(
                "dragEnd",
                format!(
                    "delta {delta:.1}px after {}ms{}",
                    elapsed.as_millis(),
                    if *cancelled { ", cancelled" } else { "" }
                ),
            ),
        });
    }
}

// Lets the owed transition run out instead of waiting for it.
fn settle(swiper: &mut Swiper<HeadlessSurface>) {
    let horizon = swiper.args().speed + Duration::from_secs(1);
    swiper.tick(Instant::now() + horizon);
}

fn run_step(swiper: &mut Swiper<HeadlessSurface>, step: Step) {
    match step {
        Step::Next => {
            if !swiper.next(None) {
                output::warn("already on the last page");
            }
        }
        Step::Prev => {
            if !swiper.prev(None) {
                output::warn("already on the first page");
            }
        }
        Step::Goto(raw) => match script::host_index(&raw) {
            Some(index) => swiper.move_to_index(index, None, false),
            None => warn!(%raw, "goto ignored a non-numeric index"),
        },
        Step::Jump(raw) => match script::host_index(&raw) {
            Some(index) => swiper.move_to_index(index, Some(Duration::ZERO), false),
            None => warn!(%raw, "jump ignored a non-numeric index"),
        },
        Step::Drag { delta, held } => drag(swiper, delta, 0.0, held),
        Step::Scroll { delta } => drag(swiper, 2.0, delta, DEFAULT_HOLD),
        Step::Tap => {
            let t0 = Instant::now();
            let at = centre(swiper);
            swiper.handle_pointer(&PointerEvent::down(t0, PointerKind::Mouse, at));
            swiper.handle_pointer(&PointerEvent::up(t0, PointerKind::Mouse));
        }
        Step::Escape => {
            let t0 = Instant::now();
            let at = centre(swiper);
            swiper.handle_pointer(&PointerEvent::down(t0, PointerKind::Mouse, at));
            swiper.handle_pointer(&PointerEvent::moved(
                t0 + Duration::from_millis(40),
                PointerKind::Mouse,
                PointerPosition::new(at.x - 120.0, at.y),
            ));
            swiper.handle_pointer(&PointerEvent::cancel(
                t0 + Duration::from_millis(80),
                PointerKind::Mouse,
                CancelReason::Escape,
            ));
        }
        Step::Resize(width) => {
            swiper.surface_mut().set_viewport_width(width);
            swiper.resize();
            output::status("Resized", format!("page width {}px", swiper.page_width().raw()));
        }
    }
}

const DEFAULT_HOLD: Duration = Duration::from_millis(400);

fn centre(swiper: &Swiper<HeadlessSurface>) -> PointerPosition {
    PointerPosition::new(swiper.page_width().to_f32() / 2.0, 120.0)
}

fn drag(swiper: &mut Swiper<HeadlessSurface>, dx: f32, dy: f32, held: Duration) {
    let t0 = Instant::now();
    let start = centre(swiper);
    swiper.handle_pointer(&PointerEvent::down(t0, PointerKind::Touch, start));
    for fraction in [0.5, 1.0] {
        swiper.handle_pointer(&PointerEvent::moved(
            t0 + held.mul_f32(fraction / 2.0),
            PointerKind::Touch,
            PointerPosition::new(start.x - dx * fraction, start.y - dy * fraction),
        ));
    }
    let response = swiper.handle_pointer(&PointerEvent::up(t0 + held, PointerKind::Touch));
    if response.suppress_next_click {
        output::event("click", "suppressed");
    }
}
