mod cli;
mod commands;

use section_lottery::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
