use anyhow::Context;
use log::warn;
use matchcore::matching::CancellationFlag;
use std::thread;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

/// Sets `flag` on the first Ctrl+C, from a background signal thread.
pub fn cancel_on_ctrl_c(flag: CancellationFlag) -> anyhow::Result<()> {
    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime for signal handling")?;
    thread::spawn(move || {
        runtime.block_on(async move {
            if signal::ctrl_c().await.is_ok() {
                warn!("Ctrl+C received, finishing current truth sample and stopping");
                flag.cancel();
            }
        });
    });
    Ok(())
}
