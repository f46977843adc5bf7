use std::net::SocketAddr;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tokio::{
    io::{AsyncWriteExt, BufReader},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
};
use tracing::{info, warn};

use crate::{
    cli::ClientArgs,
    console,
    message::{
        GetMessagesRequest, GetMessagesResponse, Request, Response, SendMessageRequest,
        SendMessageResponse, read_message, write_message,
    },
    service::MessageApi,
};

pub async fn run(args: ClientArgs) -> Result<()> {
    let mut client = RpcClient::connect(args.server).await?;

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    console::run_repl(&mut client, &mut stdin, &mut stdout).await?;

    client.shutdown().await;
    Ok(())
}

/// Client end of one connection. Calls are sent one at a time and each waits
/// for its response.
pub struct RpcClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl RpcClient {
    pub async fn connect(server: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(server)
            .await
            .with_context(|| format!("failed to connect to {server}"))?;

        info!("connected to {}", server);

        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
        })
    }

    pub async fn call(&mut self, request: &Request) -> Result<Response> {
        write_message(&mut self.writer, request)
            .await
            .context("failed to send request")?;

        match read_message::<_, Response>(&mut self.reader)
            .await
            .context("failed to read response")?
        {
            Some(response) => Ok(response),
            None => bail!("server closed the connection"),
        }
    }

    pub async fn shutdown(&mut self) {
        if let Err(error) = self.writer.shutdown().await {
            warn!(?error, "failed to shutdown client writer cleanly");
        }
    }
}

#[async_trait]
impl MessageApi for RpcClient {
    async fn send_message(&mut self, request: SendMessageRequest) -> Result<SendMessageResponse> {
        match self.call(&Request::SendMessage(request)).await? {
            Response::SendMessage(response) => Ok(response),
            Response::Error { message } => bail!("server rejected request: {message}"),
            other => bail!("unexpected response to send_message: {other:?}"),
        }
    }

    async fn get_messages(&mut self, request: GetMessagesRequest) -> Result<GetMessagesResponse> {
        match self.call(&Request::GetMessages(request)).await? {
            Response::GetMessages(response) => Ok(response),
            Response::Error { message } => bail!("server rejected request: {message}"),
            other => bail!("unexpected response to get_messages: {other:?}"),
        }
    }
}
