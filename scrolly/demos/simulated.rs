use std::fs::File;
use std::rc::Rc;

use framepump::{FrameScheduler, ManualDriver, Ticker, TimerQueue};
use log::info;
use scrolly::sim::{RecordingSurface, SimContainer};
use scrolly::{ScrollContainer, ScrollbarConfig, ScrollbarController};
use simplelog::{Config, LevelFilter, WriteLogger};

/// Print what the styling layer currently sees.
fn show(label: &str, container: &SimContainer, surface: &RecordingSurface) {
    let thumb = surface
        .thumb()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:<28} offset={:>6.1} content={:>6.1} thumb={:<32} flags={:?}",
        label,
        container.scroll_offset(),
        container.scroll_extent(),
        thumb,
        surface.attributes()
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    // Set up file logging
    let log_file = File::create("simulated.log")?;
    WriteLogger::init(LevelFilter::Trace, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let driver = Rc::new(ManualDriver::new());
    let scheduler = FrameScheduler::new(driver.clone())
        .on_error(|err| eprintln!("observer failed: {err}"));
    let timers = TimerQueue::new().on_error(|err| eprintln!("timer failed: {err}"));
    let ticker = Ticker::new(scheduler.clone(), driver, timers.clone());

    let container = Rc::new(SimContainer::new(600.0, 200.0).with_widths(317.0, 300.0));
    let surface = Rc::new(RecordingSurface::new());
    let ctrl = ScrollbarController::mount(
        &scheduler,
        &timers,
        container.clone(),
        surface.clone(),
        ScrollbarConfig::new().dark(true),
    )
    .expect("Failed to mount scrollbar");

    println!("class={:?} hider={:?}", surface.class(), surface.hider());

    ticker.run_ticks(2).await;
    show("mounted", &container, &surface);

    ticker.run_ticks(8).await;
    show("settled", &container, &surface);

    // Grab the thumb and drag it down in small steps while content keeps loading.
    ctrl.pointer_down(50.0);
    for step in 1..=6 {
        ctrl.pointer_move(50.0 + 10.0 * step as f64);
        if step % 2 == 0 {
            container.set_content_extent(container.scroll_extent() + 200.0);
            info!("Content grew to {}", container.scroll_extent());
        }
        ticker.run_ticks(1).await;
        show(&format!("drag step {step}"), &container, &surface);
    }
    ctrl.pointer_up();
    ticker.run_ticks(1).await;
    show("released", &container, &surface);

    ticker.run_ticks(8).await;
    show("quiet", &container, &surface);

    // Shrink below the viewport: the scrollbar hides itself.
    container.set_content_extent(150.0);
    ticker.run_ticks(1).await;
    show("content fits", &container, &surface);

    ctrl.unmount();
    let frames = ticker.run_until_idle().await;
    println!(
        "unmounted, {} trailing frames, {} total",
        frames,
        scheduler.frames_pumped()
    );

    Ok(())
}
