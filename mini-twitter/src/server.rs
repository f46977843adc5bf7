use std::{future::Future, io, net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use tokio::{
    io::BufReader,
    net::{TcpListener, TcpStream},
    select,
    sync::Semaphore,
};
use tracing::{debug, info, warn};

use crate::{
    message::{Request, Response, read_message, write_message},
    service::MessageService,
};

pub const DEFAULT_WORKERS: usize = 10;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Number of calls that may touch the store at once. Further calls wait.
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

pub struct Server {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl Server {
    pub fn new(listener: TcpListener, config: ServerConfig) -> Self {
        Self {
            listener,
            state: Arc::new(ServerState::new(MessageService::new(), config.workers)),
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let Server { listener, state } = self;
        tokio::pin!(shutdown);

        loop {
            select! {
                _ = &mut shutdown => {
                    info!("server shutting down");
                    break;
                }
                accept_result = listener.accept() => {
                    handle_accept_result(accept_result, &state);
                }
            }
        }

        Ok(())
    }

    pub async fn run_until_ctrl_c(self) -> Result<()> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = ?err, "failed to install ctrl-c handler");
            }
        })
        .await
    }
}

struct ServerState {
    service: MessageService,
    workers: Semaphore,
}

impl ServerState {
    fn new(service: MessageService, workers: usize) -> Self {
        Self {
            service,
            workers: Semaphore::new(workers.max(1)),
        }
    }

    async fn dispatch(&self, request: Request) -> Result<Response> {
        let _permit = self
            .workers
            .acquire()
            .await
            .context("worker pool closed")?;
        Ok(self.service.handle(request))
    }
}

fn handle_accept_result(result: io::Result<(TcpStream, SocketAddr)>, state: &Arc<ServerState>) {
    match result {
        Ok((stream, peer)) => spawn_session(stream, peer, state),
        Err(err) => warn!(error = ?err, "failed to accept connection"),
    }
}

fn spawn_session(stream: TcpStream, peer: SocketAddr, state: &Arc<ServerState>) {
    let state = Arc::clone(state);
    tokio::spawn(async move {
        info!(%peer, "client connected");
        match handle_connection(stream, &state).await {
            Ok(()) => info!(%peer, "client disconnected"),
            Err(err) => warn!(%peer, error = ?err, "client connection closed with error"),
        }
    });
}

async fn handle_connection(stream: TcpStream, state: &ServerState) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    loop {
        let response = match read_message::<_, Request>(&mut reader).await {
            Ok(Some(request)) => {
                debug!(?request, "handling call");
                state.dispatch(request).await?
            }
            Ok(None) => break,
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                debug!(error = %err, "rejecting malformed request");
                Response::Error {
                    message: err.to_string(),
                }
            }
            Err(err) => return Err(err).context("failed to read request"),
        };

        write_message(&mut writer, &response)
            .await
            .context("failed to write response")?;
    }

    Ok(())
}
