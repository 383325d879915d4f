use chrono::Local;
use env_logger::Env;
use std::io::Write;

/// `<timestamp> | <target> | <LEVEL> | <message>`, info by default, `RUST_LOG` overrides.
pub fn init_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} | {} | {} | {}",
                Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.target(),
                record.level(),
                record.args()
            )
        })
        .init();
}
