use std::io::Write;
use chrono::Local;
use env_logger::Env;

/// Initializes the process wide logger. Filter defaults to info and can be
/// overridden through RUST_LOG
pub fn setup_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}
