mod app;
mod audio;
mod block;
mod clock;
mod config;
mod error;
mod fade;
mod runtime;
mod ui;
mod vault;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()?;
    Ok(())
}
