use kitsudex::{Config, run};

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all().thread_name("kitsudex-worker");

    // 0 keeps tokio's default of one worker per core
    match config.general.worker_threads {
        0 => {}
        n => {
            builder.worker_threads(n);
        }
    }

    builder.build()?.block_on(run())
}
