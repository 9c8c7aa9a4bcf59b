//! Headless player: loads a deck and auto-plays it until Ctrl-C.

use lingoflow_lib::commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = lingoflow_lib::run()?;

    let Some(path) = std::env::args().nth(1) else {
        tracing::info!("no deck given; usage: lingoflow-desktop <deck.csv>");
        return Ok(());
    };

    let summary = commands::import_file(&path, &state).await?;
    println!("{}", serde_json::to_string(&summary)?);

    let settings = commands::get_playback_settings(&state).await?;
    commands::start_autoplay(settings.options(), &state).await?;

    let wait = commands::wait_autoplay(&state);
    tokio::pin!(wait);
    let outcome = tokio::select! {
        outcome = &mut wait => outcome?,
        _ = tokio::signal::ctrl_c() => {
            commands::stop_autoplay(&state).await?;
            wait.await?
        }
    };
    println!("{}", serde_json::to_string(&outcome)?);

    Ok(())
}
