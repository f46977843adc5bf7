use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::{
    message::{
        GetMessagesRequest, GetMessagesResponse, Request, Response, SendMessageRequest,
        SendMessageResponse,
    },
    store::MessageStore,
};

pub const SEND_STATUS: &str = "Message sent successfully";
pub const GET_STATUS: &str = "Messages retrieved successfully";

/// The two procedures a client can call.
///
/// Implemented by the network stub and by [`MessageService`] itself, so the
/// console can be driven either remotely or in-process.
#[async_trait]
pub trait MessageApi: Send {
    async fn send_message(&mut self, request: SendMessageRequest) -> Result<SendMessageResponse>;

    async fn get_messages(&mut self, request: GetMessagesRequest) -> Result<GetMessagesResponse>;
}

/// Server-side handler for both procedures.
///
/// Clones share one [`MessageStore`].
#[derive(Clone, Default)]
pub struct MessageService {
    store: Arc<MessageStore>,
}

impl MessageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn send_message(&self, request: SendMessageRequest) -> SendMessageResponse {
        debug!(len = request.message.len(), "appending message");
        self.store.append(request.message);
        SendMessageResponse {
            status: SEND_STATUS.to_string(),
        }
    }

    pub fn get_messages(&self, request: GetMessagesRequest) -> GetMessagesResponse {
        let messages = self.store.read_recent(request.count);
        debug!(
            requested = request.count,
            returned = messages.len(),
            "reading recent messages"
        );
        GetMessagesResponse {
            status: GET_STATUS.to_string(),
            messages,
        }
    }

    pub fn handle(&self, request: Request) -> Response {
        match request {
            Request::SendMessage(request) => Response::SendMessage(self.send_message(request)),
            Request::GetMessages(request) => Response::GetMessages(self.get_messages(request)),
        }
    }
}

#[async_trait]
impl MessageApi for MessageService {
    async fn send_message(&mut self, request: SendMessageRequest) -> Result<SendMessageResponse> {
        Ok(MessageService::send_message(self, request))
    }

    async fn get_messages(&mut self, request: GetMessagesRequest) -> Result<GetMessagesResponse> {
        Ok(MessageService::get_messages(self, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send(service: &MessageService, text: &str) -> SendMessageResponse {
        service.send_message(SendMessageRequest {
            message: text.to_string(),
        })
    }

    fn get(service: &MessageService, count: i32) -> GetMessagesResponse {
        service.get_messages(GetMessagesRequest { count })
    }

    #[test]
    fn send_message_stores_and_reports_success() {
        let service = MessageService::new();
        let response = send(&service, "Hello, world!");
        assert_eq!(response.status, SEND_STATUS);
        assert_eq!(service.store().read_recent(10), vec!["Hello, world!"]);
    }

    #[test]
    fn send_empty_message_is_accepted() {
        let service = MessageService::new();
        let response = send(&service, "");
        assert_eq!(response.status, "Message sent successfully");
        assert_eq!(service.store().read_recent(10), vec![""]);
    }

    #[test]
    fn get_messages_returns_trailing_window() {
        let service = MessageService::new();
        for text in ["Message 1", "Message 2", "Message 3"] {
            send(&service, text);
        }

        let response = get(&service, 2);
        assert_eq!(response.status, "Messages retrieved successfully");
        assert_eq!(response.messages, vec!["Message 2", "Message 3"]);
    }

    #[test]
    fn get_more_messages_than_available() {
        let service = MessageService::new();
        send(&service, "Only message");

        let response = get(&service, 5);
        assert_eq!(response.status, GET_STATUS);
        assert_eq!(response.messages, vec!["Only message"]);
    }

    #[test]
    fn get_from_fresh_store_and_zero_count_are_empty() {
        let service = MessageService::new();
        let response = get(&service, 5);
        assert_eq!(response.status, GET_STATUS);
        assert!(response.messages.is_empty());

        send(&service, "x");
        let response = get(&service, 0);
        assert_eq!(response.status, GET_STATUS);
        assert!(response.messages.is_empty());
    }

    #[test]
    fn duplicate_sends_create_duplicate_entries() {
        let service = MessageService::new();
        send(&service, "again");
        send(&service, "again");
        assert_eq!(get(&service, 10).messages, vec!["again", "again"]);
    }

    #[test]
    fn clones_share_one_store() {
        let service = MessageService::new();
        let other = service.clone();
        send(&service, "from first");
        send(&other, "from second");
        assert_eq!(
            get(&service, 10).messages,
            vec!["from first", "from second"]
        );
    }

    #[test]
    fn handle_dispatches_by_request_kind() {
        let service = MessageService::new();
        let sent = service.handle(Request::SendMessage(SendMessageRequest {
            message: "hi".into(),
        }));
        assert_eq!(
            sent,
            Response::SendMessage(SendMessageResponse {
                status: SEND_STATUS.into()
            })
        );

        let got = service.handle(Request::GetMessages(GetMessagesRequest { count: 1 }));
        assert_eq!(
            got,
            Response::GetMessages(GetMessagesResponse {
                status: GET_STATUS.into(),
                messages: vec!["hi".into()],
            })
        );
    }

    #[tokio::test]
    async fn api_trait_calls_through_to_the_store() -> Result<()> {
        let mut service = MessageService::new();
        let api: &mut dyn MessageApi = &mut service;
        api.send_message(SendMessageRequest {
            message: "via trait".into(),
        })
        .await?;
        let response = api.get_messages(GetMessagesRequest { count: 1 }).await?;
        assert_eq!(response.messages, vec!["via trait"]);
        Ok(())
    }
}
