//! Generation CLI commands: one-shot `generate` and the `watch` auto-changer.

use std::sync::Arc;

use clap::Args;
use colored::Colorize;

use super::types::PromptArgs;
use crate::app::AppContext;
use crate::cli::output::{StepProgress, print_error};
use crate::error::AiwallError;
use crate::generation::schedule::cost_label;
use crate::generation::{AutoChanger, GenerationRequest, Interval, ProgressObserver, PromptSelection};
use crate::instance::InstanceLock;
use crate::platform::on_interrupt;

/// Arguments of `aiwall generate`.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub prompt: PromptArgs,
}

/// Arguments of `aiwall watch`.
#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// How often to change the wallpaper, e.g. "30 minutes" or "6 hours".
    /// Defaults to `schedule.interval` from the configuration.
    #[arg(long, short, value_name = "INTERVAL")]
    pub interval: Option<Interval>,

    /// Generate one wallpaper right away instead of waiting a full interval.
    #[arg(long)]
    pub now: bool,

    #[command(flatten)]
    pub prompt: PromptArgs,
}

/// Builds a request from the flags and the configured defaults.
fn build_request(
    selection: &PromptSelection,
    save_to_library: bool,
) -> Result<GenerationRequest, AiwallError> {
    let prompt = selection.resolve(&mut rand::rng())?;
    Ok(GenerationRequest::new(prompt, save_to_library))
}

/// Execute the generate command.
///
/// # Errors
///
/// Returns the pipeline error if the generation fails.
pub fn generate(ctx: &AppContext, args: &GenerateArgs) -> Result<(), AiwallError> {
    let _lock = InstanceLock::acquire(&ctx.paths.data_dir)?;
    ctx.startup_check()?;

    let selection = args.prompt.selection(ctx.default_selection());
    let request =
        build_request(&selection, args.prompt.save_to_library(ctx.config.library.save_by_default))?;

    println!("{}", "Generating wallpaper".bold());
    println!("  {}\n", request.prompt.dimmed());

    let runner = ctx.runner.clone();
    let interrupted = on_interrupt(move || {
        runner.cancel_current();
    })?;

    let handle = ctx.runner.submit(request, Arc::new(StepProgress::default()))?;
    if interrupted.is_set() {
        handle.cancel();
    }
    let message = handle.wait()?;

    println!("\n{}", message.green().bold());
    Ok(())
}

/// Execute the watch command. Runs until interrupted with Ctrl+C.
///
/// # Errors
///
/// Returns an error if the interval is `Never` or invalid, the prompt
/// selection is invalid, or the changer cannot start.
pub fn watch(ctx: &AppContext, args: &WatchArgs) -> Result<(), AiwallError> {
    let _lock = InstanceLock::acquire(&ctx.paths.data_dir)?;
    ctx.startup_check()?;

    let interval = match args.interval {
        Some(interval) => interval,
        None => ctx.configured_interval()?,
    };
    let Some(period) = interval.as_duration() else {
        return Err(AiwallError::InvalidArguments(
            "Auto-change is off (interval: Never). Pass --interval or set schedule.interval."
                .to_string(),
        ));
    };

    let selection = args.prompt.selection(ctx.default_selection());
    let save = args.prompt.save_to_library(ctx.config.library.save_by_default);
    let first = build_request(&selection, save)?;

    println!(
        "Changing wallpaper every {}. {}",
        interval.to_string().bold(),
        cost_label(interval, ctx.config.schedule.price_per_image).dimmed()
    );
    println!("{}", "Press Ctrl+C to stop.".dimmed());

    let progress: Arc<dyn ProgressObserver> = Arc::new(StepProgress::default());
    let changer = AutoChanger::start(
        ctx.runner.clone(),
        period,
        move || build_request(&selection, save),
        Arc::clone(&progress),
    )?;

    let stop = changer.stop_handle();
    let runner = ctx.runner.clone();
    let interrupted = on_interrupt(move || {
        stop.stop();
        runner.cancel_current();
    })?;

    if args.now {
        let handle = ctx.runner.submit(first, progress)?;
        if interrupted.is_set() {
            handle.cancel();
        }
        match handle.wait() {
            Ok(message) => println!("{}", message.green()),
            Err(AiwallError::Cancelled) if interrupted.is_set() => {}
            Err(err) => print_error(&err),
        }
    }

    changer.join();
    println!("{}", "Auto-change stopped.".dimmed());
    Ok(())
}
