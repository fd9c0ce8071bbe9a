use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {msg} {spinner:.green}";

/// Spinner for work of unknown size (snapshot loading). Hidden in quiet mode.
pub fn create_spinner(quiet_mode: bool, msg: &str) -> ProgressBar {
    let spinner = if quiet_mode {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };

    spinner.set_message(msg);
    spinner.set_style(ProgressStyle::default_spinner().template(SPINNER_TEMPLATE));
    spinner.inc(0); // Just to avoid the drawing after the log.
    spinner.enable_steady_tick(200);

    spinner
}
