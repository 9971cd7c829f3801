use bridge_client::{BridgeConfig, Forwarder};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::{
    errors::FrameError,
    frame::{read_message, write_message},
    translator::{OutboundResponse, handle},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Responses written, one per inbound frame attempt.
    pub responses: u64,
    /// Responses with `ok: false`.
    pub failures: u64,
}

/// Request/response loop over one input and one output stream.
///
/// One frame is read, answered and flushed before the next read starts.
/// Errors inside a message are answered on the channel; only channel I/O
/// failures end the loop with an error.
pub struct BridgeLoop<'a, R, W, F> {
    reader: R,
    writer: W,
    forwarder: &'a F,
    config: &'a BridgeConfig,
    state: LoopState,
    stats: LoopStats,
}

impl<'a, R, W, F> BridgeLoop<'a, R, W, F>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    F: Forwarder,
{
    pub fn new(reader: R, writer: W, forwarder: &'a F, config: &'a BridgeConfig) -> Self {
        Self {
            reader,
            writer,
            forwarder,
            config,
            state: LoopState::Running,
            stats: LoopStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Handles a single frame. Returns the state the loop is in afterwards.
    pub async fn step(&mut self) -> Result<LoopState, FrameError> {
        if self.state == LoopState::Stopped {
            return Ok(LoopState::Stopped);
        }

        let response = match read_message(&mut self.reader).await {
            Ok(Some(message)) => handle(self.forwarder, self.config, &message).await,
            Ok(None) => {
                info!("input stream closed");
                self.state = LoopState::Stopped;
                return Ok(LoopState::Stopped);
            }
            Err(e) if e.is_fatal() => {
                self.state = LoopState::Stopped;
                return Err(e);
            }
            Err(e) => {
                warn!("rejected native message: {}", e);
                OutboundResponse::failure(e.to_string())
            }
        };

        self.stats.responses += 1;
        if !response.is_ok() {
            self.stats.failures += 1;
        }

        if let Err(e) = write_message(&mut self.writer, &response.into_json()).await {
            self.state = LoopState::Stopped;
            return Err(e);
        }
        debug!("response {} written", self.stats.responses);

        Ok(LoopState::Running)
    }

    /// Runs until the input ends cleanly or the channel fails.
    pub async fn run(mut self) -> Result<LoopStats, FrameError> {
        while self.step().await? == LoopState::Running {}
        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        message_codec::PREFIX_LEN,
        test_support::{MockForwarder, Scripted},
        translator::HOST_NAME,
    };
    use serde_json::{Value, json};
    use std::{
        io,
        pin::Pin,
        task::{Context, Poll},
    };

    fn frame(body: &[u8]) -> Vec<u8> {
        let mut bytes = (body.len() as u32).to_le_bytes().to_vec();
        bytes.extend_from_slice(body);
        bytes
    }

    fn split_frames(mut output: &[u8]) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        while !output.is_empty() {
            let len = u32::from_le_bytes([output[0], output[1], output[2], output[3]]) as usize;
            frames.push(output[PREFIX_LEN..PREFIX_LEN + len].to_vec());
            output = &output[PREFIX_LEN + len..];
        }
        frames
    }

    fn responses(output: &[u8]) -> Vec<Value> {
        split_frames(output)
            .iter()
            .map(|body| serde_json::from_slice(body).unwrap())
            .collect()
    }

    async fn run_with(input: &[u8], forwarder: &MockForwarder, config: &BridgeConfig) -> (LoopStats, Vec<u8>) {
        let mut output = Vec::new();
        let stats = BridgeLoop::new(input, &mut output, forwarder, config)
            .run()
            .await
            .unwrap();
        (stats, output)
    }

    fn config() -> BridgeConfig {
        BridgeConfig::new("http://127.0.0.1:16789/add", "token-1")
    }

    #[tokio::test]
    async fn empty_input_stops_without_output() {
        let forwarder = MockForwarder::new(Scripted::Reply(200, String::new()));
        let (stats, output) = run_with(&[], &forwarder, &config()).await;
        assert_eq!(stats, LoopStats::default());
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn download_reply_is_forwarded_byte_for_byte() {
        let forwarder = MockForwarder::new(Scripted::Reply(200, r#"{"ok":true,"id":"7"}"#.into()));
        let input = frame(br#"{"url":"http://example.com/a.zip","save_dir":"/tmp"}"#);

        let (stats, output) = run_with(&input, &forwarder, &config()).await;
        assert_eq!(split_frames(&output), vec![br#"{"ok":true,"id":"7"}"#.to_vec()]);
        assert_eq!(stats, LoopStats { responses: 1, failures: 0 });
    }

    #[tokio::test]
    async fn http_500_becomes_error_response() {
        let forwarder = MockForwarder::new(Scripted::Reply(500, "server error".into()));
        let input = frame(br#"{"url":"http://example.com/a.zip"}"#);

        let (stats, output) = run_with(&input, &forwarder, &config()).await;
        assert_eq!(
            split_frames(&output),
            vec![br#"{"ok":false,"error":"bridge request failed: 500","detail":"server error"}"#.to_vec()]
        );
        assert_eq!(stats.failures, 1);
    }

    #[tokio::test]
    async fn malformed_frame_does_not_stop_the_loop() {
        let forwarder = MockForwarder::new(Scripted::Reply(200, String::new()));
        let mut input = frame(b"{not json");
        input.extend(frame(br#"{"action":"ping"}"#));
        input.extend(frame(b"[1]"));
        input.extend(frame(br#"{"action":"PING"}"#));

        let (stats, output) = run_with(&input, &forwarder, &config()).await;
        let replies = responses(&output);
        assert_eq!(replies.len(), 4);
        assert_eq!(replies[0]["ok"], json!(false));
        assert!(replies[0]["error"].as_str().unwrap().starts_with("invalid JSON payload"));
        assert_eq!(replies[1], json!({"ok": true, "host": HOST_NAME}));
        assert_eq!(
            replies[2],
            json!({"ok": false, "error": "message payload must be object"})
        );
        assert_eq!(replies[3], json!({"ok": true, "host": HOST_NAME}));
        assert_eq!(stats, LoopStats { responses: 4, failures: 2 });
        assert_eq!(forwarder.call_count(), 0);
    }

    #[tokio::test]
    async fn truncated_tail_is_answered_then_stream_ends() {
        let forwarder = MockForwarder::new(Scripted::Reply(200, String::new()));
        let mut input = frame(br#"{"action":"ping"}"#);
        input.extend_from_slice(&50u32.to_le_bytes());
        input.extend_from_slice(br#"{"url":"#);

        let (_, output) = run_with(&input, &forwarder, &config()).await;
        let replies = responses(&output);
        assert_eq!(replies.len(), 2);
        assert_eq!(
            replies[1],
            json!({"ok": false, "error": "message body truncated"})
        );
    }

    #[tokio::test]
    async fn dangling_prefix_bytes_are_answered() {
        let forwarder = MockForwarder::new(Scripted::Reply(200, String::new()));
        let (_, output) = run_with(&[7, 0], &forwarder, &config()).await;
        assert_eq!(
            responses(&output),
            vec![json!({"ok": false, "error": "invalid message length"})]
        );
    }

    #[tokio::test]
    async fn step_reports_state() {
        let forwarder = MockForwarder::new(Scripted::Reply(200, String::new()));
        let config = config();
        let input = frame(br#"{"action":"ping"}"#);
        let mut output = Vec::new();

        let mut bridge = BridgeLoop::new(&input[..], &mut output, &forwarder, &config);
        assert_eq!(bridge.step().await.unwrap(), LoopState::Running);
        assert_eq!(bridge.step().await.unwrap(), LoopState::Stopped);
        assert_eq!(bridge.state(), LoopState::Stopped);
        assert_eq!(bridge.step().await.unwrap(), LoopState::Stopped);
        assert_eq!(bridge.stats().responses, 1);
    }

    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(self: Pin<&mut Self>, _: &mut Context<'_>, _: &[u8]) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn write_failure_is_fatal() {
        let forwarder = MockForwarder::new(Scripted::Reply(200, String::new()));
        let config = config();
        let input = frame(br#"{"action":"ping"}"#);

        let result = BridgeLoop::new(&input[..], BrokenPipe, &forwarder, &config)
            .run()
            .await;
        assert!(matches!(result, Err(FrameError::Io(_))));
    }
}
