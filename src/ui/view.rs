use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::models::{GenerateIconResponse, RepoInfo, TaskOutcome, TaskStatusResponse};
use crate::ui::icons::{CHECK, CROSS, IMAGE, PROMPT, REPO, SPARKLE, STAR};

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

/// Name, description, language and stars, one per line.
pub fn format_repo_card(info: &RepoInfo) -> String {
    let name = match &info.owner {
        Some(owner) => format!("{}/{}", owner, info.name),
        None => info.name.clone(),
    };
    let stars = info
        .stars
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}{}\n  {}\n  Language: {}  {}{}",
        REPO,
        style(name).bold(),
        style(or_dash(info.description.as_deref())).dim(),
        or_dash(info.language.as_deref()),
        STAR,
        stars
    )
}

pub fn format_prompt(prompt: &str) -> String {
    format!("{}{}\n  {}", PROMPT, style("Prompt").bold(), prompt.trim())
}

/// Final line for a finished task.
pub fn format_outcome(outcome: &TaskOutcome) -> String {
    match outcome {
        TaskOutcome::Pending => format!("{}", style("Generating image...").dim()),
        TaskOutcome::Image { url } => format!("{}{}{}", CHECK, IMAGE, style(url).cyan().underlined()),
        TaskOutcome::Failed { error } => {
            format!("{}{}", CROSS, style(format!("Error: {}", error.display_message())).red())
        }
    }
}

pub fn format_submission_error(message: &str) -> String {
    format!("{}{}", CROSS, style(message).red())
}

/// Spinner message while a task is pending.
pub fn format_pending(status: Option<&TaskStatusResponse>, attempts: u32) -> String {
    match status {
        Some(status) => format!(
            "Generating image... {}",
            style(format!("({}, check {})", status.status, attempts)).dim()
        ),
        None => "Generating image...".to_string(),
    }
}

/// Terminal front-end for one generation run.
///
/// The spinner draws on stderr; result lines go to stdout with the spinner
/// suspended so they are not torn by redraws.
pub struct GenerationView {
    spinner: ProgressBar,
    show_prompt: bool,
}

impl GenerationView {
    pub fn new(show_prompt: bool, quiet: bool) -> Self {
        let spinner = if quiet {
            ProgressBar::hidden()
        } else {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner} {msg} {elapsed:.dim}")
                    .expect("spinner template is a valid static string"),
            );
            spinner
        };
        Self {
            spinner,
            show_prompt,
        }
    }

    fn print_line(&self, msg: impl AsRef<str>) {
        self.spinner.suspend(|| println!("{}", msg.as_ref()));
    }

    pub fn submitting(&self, url: &str) {
        self.spinner
            .set_message(format!("Submitting {}", style(url).yellow()));
        self.spinner.enable_steady_tick(Duration::from_millis(100));
    }

    pub fn submitted(&self, generation: &GenerateIconResponse) {
        self.print_line(format_repo_card(&generation.repo_info));
        if self.show_prompt {
            self.print_line(format_prompt(&generation.prompt));
        }
        self.print_line(format!(
            "{}Task {}",
            SPARKLE,
            style(&generation.task_id).dim()
        ));
        self.spinner.set_message(format_pending(None, 0));
    }

    pub fn status(&self, status: &TaskStatusResponse, attempts: u32) {
        self.spinner.set_message(format_pending(Some(status), attempts));
    }

    pub fn finish(&self, outcome: &TaskOutcome) {
        self.spinner.finish_and_clear();
        self.print_line(format_outcome(outcome));
    }

    pub fn submission_failed(&self, message: &str) {
        self.spinner.finish_and_clear();
        self.print_line(format_submission_error(message));
    }

    /// Stop the spinner without a result (e.g. Ctrl-C).
    pub fn abandon(&self, message: &str) {
        self.spinner.finish_and_clear();
        self.print_line(format!("{}", style(message).dim()));
    }
}
