use log::LevelFilter;
use std::path::Path;

pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<(), fern::InitError> {
  let mut dispatch = fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "{} {:<5} [{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level(),
        record.target(),
        message
      ))
    })
    .level(level)
    .level_for("h2", LevelFilter::Warn)
    .level_for("hyper", LevelFilter::Warn)
    .level_for("tower", LevelFilter::Warn)
    .chain(std::io::stdout());
  if let Some(path) = log_file {
    dispatch = dispatch.chain(fern::log_file(path)?);
  }
  dispatch.apply()?;
  Ok(())
}
