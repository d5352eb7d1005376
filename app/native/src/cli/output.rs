//! CLI output formatting.
//!
//! Live pipeline progress, preset and cost tables, and small colored helpers.

use colored::Colorize;
use parking_lot::Mutex;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style, Width};
use tabled::{Table, Tabled};

use crate::error::AiwallError;
use crate::generation::prompts::PRESETS;
use crate::generation::schedule::{INTERVAL_CHOICES, Interval, cost_label};
use crate::generation::{ProgressObserver, Stage};

/// Display state of one pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Pending,
    Active,
    Done,
    Failed,
}

/// Renders pipeline steps to stdout as they change.
///
/// Step states are tracked here rather than inferred from what has been
/// printed; a new run starts when the credential check begins.
#[derive(Debug)]
pub struct StepProgress {
    states: Mutex<[StepState; Stage::ALL.len()]>,
    quiet: bool,
}

impl Default for StepProgress {
    fn default() -> Self { Self::new(false) }
}

impl StepProgress {
    /// `quiet` tracks states without printing.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self { states: Mutex::new([StepState::Pending; Stage::ALL.len()]), quiet }
    }

    #[must_use]
    pub fn state(&self, stage: Stage) -> StepState { self.states.lock()[stage.number() - 1] }

    fn set(&self, stage: Stage, state: StepState) {
        let mut states = self.states.lock();
        if stage == Stage::CredentialCheck && state == StepState::Active {
            *states = [StepState::Pending; Stage::ALL.len()];
        }
        states[stage.number() - 1] = state;
        drop(states);

        if !self.quiet {
            println!("{}", step_line(stage, state));
        }
    }
}

impl ProgressObserver for StepProgress {
    fn stage_started(&self, stage: Stage) { self.set(stage, StepState::Active); }

    fn stage_finished(&self, stage: Stage) { self.set(stage, StepState::Done); }

    fn stage_failed(&self, stage: Stage, _error: &AiwallError) { self.set(stage, StepState::Failed); }

    fn library_changed(&self) {
        if !self.quiet {
            println!("      {}", "Saved to library".dimmed());
        }
    }
}

/// One progress line, e.g. `  ✓ [2/5] 🌟 AI is bringing your vision to life...`.
#[must_use]
pub fn step_line(stage: Stage, state: StepState) -> String {
    let counter = format!("[{}/{}]", stage.number(), Stage::ALL.len());
    match state {
        StepState::Pending => format!("  · {counter} {}", stage.label()).dimmed().to_string(),
        StepState::Active => format!("  {} {counter} {}", "…".yellow(), stage.label()),
        StepState::Done => format!("  {} {counter} {}", "✓".green(), stage.label()),
        StepState::Failed => format!("  {} {counter} {}", "✗".red(), stage.label().red()),
    }
}

/// Prints an error message the way every command reports failures.
pub fn print_error(err: &AiwallError) {
    eprintln!("{} {err}", "Error:".red().bold());
}

/// Formats a boolean as a colored mark.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}

/// Table of preset names and their prompt texts.
#[must_use]
pub fn presets_table() -> String {
    #[derive(Tabled)]
    struct PresetRow {
        #[tabled(rename = "Preset")]
        name: &'static str,
        #[tabled(rename = "Prompt")]
        text: &'static str,
    }

    let rows = PRESETS.iter().map(|&(name, text)| PresetRow { name, text });
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::last()).with(Width::wrap(80)))
        .to_string()
}

/// Table of every offered interval with its monthly cost.
#[must_use]
pub fn cost_table(price_per_image: f64) -> String {
    #[derive(Tabled)]
    struct CostRow {
        #[tabled(rename = "Interval")]
        interval: String,
        #[tabled(rename = "Estimate")]
        cost: String,
    }

    let rows = INTERVAL_CHOICES.iter().filter_map(|choice| choice.parse::<Interval>().ok()).map(|interval| {
        CostRow { interval: interval.to_string(), cost: cost_label(interval, price_per_image) }
    });

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::last()).with(Alignment::right()))
        .to_string()
}
