//! Small tray showing every kind of menu entry.
//!
//! Run with `--simulated` on a machine without a desktop shell; the simulated
//! shell clicks through the menu by itself so the dispatch path can be
//! watched in the logs.

use clap::Parser;
use minitray::{
    Backend, ItemFlags, MenuItem, SimulatedBackend, SimulatedShell, Tray, TrayConfig, TrayHandle,
};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tray-demo", about = "Show a system tray icon with a demo menu")]
struct Args {
    /// Icon theme name or path to an icon file
    #[arg(long, default_value = "applications-system")]
    icon: String,

    /// Tooltip text
    #[arg(long, default_value = "minitray demo")]
    tooltip: String,

    /// Tray identifier reported to the shell
    #[arg(long, default_value = "minitray-demo")]
    id: String,

    /// Render into an in-process shell instead of the desktop
    #[arg(long)]
    simulated: bool,
}

struct Clicks(u32);

fn demo_tray(args: &Args) -> Tray {
    Tray::new(&args.icon, &args.tooltip).with_menu([
        MenuItem::new("Clicked 0 times")
            .with_context(Clicks(0))
            .on_activate(|item| {
                let count = match item.context_mut::<Clicks>() {
                    Some(clicks) => {
                        clicks.0 += 1;
                        clicks.0
                    }
                    None => 0,
                };
                item.text = format!("Clicked {count} times");
                info!(count, "counter clicked");
            }),
        MenuItem::new("Notifications")
            .with_flags(ItemFlags::CHECKED)
            .on_activate(|item| {
                item.flags.toggle(ItemFlags::CHECKED);
                info!(enabled = item.is_checked(), "notifications toggled");
            }),
        MenuItem::new("Unavailable").with_flags(ItemFlags::DISABLED),
        MenuItem::separator(),
    ])
}

fn run<B: Backend>(mut handle: TrayHandle<B>) {
    let exit = handle.exit_signal();
    handle.tray_mut().menu.push(
        MenuItem::new("Quit")
            .with_icon("application-exit")
            .on_activate(move |_| exit.request()),
    );
    handle.redraw();

    while !handle.run_once(true) {
        // Callbacks may have relabeled or toggled their item.
        handle.redraw();
    }

    let tray = handle.shutdown();
    info!(items = tray.menu.len(), "tray closed");
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = TrayConfig::default()
        .with_id(&args.id)
        .with_title(&args.tooltip);
    let tray = demo_tray(&args);

    if args.simulated {
        let shell = SimulatedShell::new();
        let handle = match TrayHandle::initialize(tray, config, SimulatedBackend::new(shell.clone())) {
            Ok(handle) => handle,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        };
        std::thread::spawn(move || {
            for label in ["Clicked 0 times", "Notifications", "Quit"] {
                std::thread::sleep(Duration::from_millis(200));
                info!(label, "simulated click");
                shell.click_label(label);
            }
        });
        run(handle);
        return ExitCode::SUCCESS;
    }

    match minitray::initialize(tray, config) {
        Ok(handle) => {
            run(handle);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
