use engine::{Engine, SessionContext};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Marks the end of every reply so clients know when to stop reading.
pub const END_OF_TRANSMISSION: char = '\u{4}';

/// Serve the line protocol. Connections are handled one after another, each
/// starting with no database selected.
pub async fn serve(engine: Engine, addr: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on {addr}");

    loop {
        let (socket, peer) = listener.accept().await?;
        log::info!("Connection from {peer}");

        let (r, w) = socket.into_split();
        if let Err(err) = handle_connection(&engine, BufReader::new(r), w).await {
            log::error!("Connection with {peer} failed: {err}");
        }

        log::info!("{peer} disconnected");
    }
}

/// Run every line from `reader` as a command until the client hangs up.
/// The session lives and dies with the connection.
pub async fn handle_connection<R, W>(
    engine: &Engine,
    reader: R,
    mut writer: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = SessionContext::new();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let (response, updated) = engine.execute(line.trim(), session);
        session = updated;

        let reply = format!("{response}\n{END_OF_TRANSMISSION}\n");
        writer.write_all(reply.as_bytes()).await?;
    }

    writer.flush().await
}
