//! Print live events from a KEF speaker until Ctrl-C.
//!
//! Run with: cargo run --example live_events -- 192.168.1.40
//!
//! Set `KEF_LOG_MODE=development` to see the poll loop's own logging.

use kef_stream::logging::init_logging_from_env;
use kef_stream::{EventData, KefStream, StreamConfig};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    let host = std::env::args()
        .nth(1)
        .ok_or("usage: live_events <speaker-host>")?;

    let stream = KefStream::connect_host(&host, StreamConfig::default()).await?;
    println!("Connected to {} (session {})", host, stream.session_id());

    let mut events = stream.events().ok_or("event receiver already taken")?;
    let cancel = CancellationToken::new();
    let task = stream.spawn(cancel.clone());

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    while let Some(event) = events.recv().await {
        let time = event.timestamp.format("%H:%M:%S");
        match &event.data {
            EventData::Volume(volume) => println!("[{}] volume {}", time, volume),
            EventData::Mute(muted) => println!("[{}] muted {}", time, muted),
            EventData::Source(source) => println!("[{}] source {}", time, source),
            EventData::Power(status) => println!("[{}] power {}", time, status),
            EventData::PlayerData(player) => println!(
                "[{}] {} - {} by {} ({} ms)",
                time, player.state, player.title, player.artist, player.duration_ms
            ),
            EventData::PlayTime(ms) if *ms >= 0 => println!("[{}] position {} ms", time, ms),
            other => println!("[{}] {} {:?}", time, event.kind(), other),
        }
    }

    match task.await? {
        Ok(()) | Err(kef_stream::StreamError::Cancelled) => println!("Stopped"),
        Err(e) => eprintln!("Stream ended: {}", e),
    }

    Ok(())
}
