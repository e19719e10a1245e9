use log::error;

use creaturebox_install::cli::Cli;
use creaturebox_install::install::runners;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();

    if let Err(e) = runners::run(Cli::parse_args()) {
        error!("{e:#}");
        std::process::exit(1);
    }
}
