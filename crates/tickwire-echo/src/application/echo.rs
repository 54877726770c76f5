//! Reply rules for the echo server.
//!
//! | Inbound         | Action                                    |
//! |-----------------|-------------------------------------------|
//! | `Text(s)`       | reply `Text(s)`                           |
//! | `Binary(b)`     | reply `Binary(b)`                         |
//! | `Ping` / `Pong` | nothing (tungstenite queues the Pong)     |
//! | `Close`         | end the session                           |
//! | raw `Frame`     | nothing                                   |

use tokio_tungstenite::tungstenite::Message;

/// What the connection task should do with one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EchoAction {
    /// Write this message back to the client.
    Reply(Message),
    /// Nothing to send.
    Ignore,
    /// The client asked to close; stop reading.
    Close,
}

/// Returns the action for an inbound message.  Data frames are echoed with
/// their frame type preserved.
pub fn echo_reply(inbound: Message) -> EchoAction {
    match inbound {
        Message::Text(_) | Message::Binary(_) => EchoAction::Reply(inbound),
        Message::Close(_) => EchoAction::Close,
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => EchoAction::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_echoed_as_text() {
        let msg = Message::Text("pos(320, 239); roll: 7".to_string());
        assert_eq!(echo_reply(msg.clone()), EchoAction::Reply(msg));
    }

    #[test]
    fn test_binary_is_echoed_as_binary() {
        let msg = Message::Binary(vec![0, 1, 2, 0xff]);
        assert_eq!(echo_reply(msg.clone()), EchoAction::Reply(msg));
    }

    #[test]
    fn test_empty_text_is_still_echoed() {
        let msg = Message::Text(String::new());
        assert_eq!(echo_reply(msg.clone()), EchoAction::Reply(msg));
    }

    #[test]
    fn test_close_ends_session() {
        assert_eq!(echo_reply(Message::Close(None)), EchoAction::Close);
    }

    #[test]
    fn test_control_frames_are_not_echoed() {
        assert_eq!(echo_reply(Message::Ping(vec![1])), EchoAction::Ignore);
        assert_eq!(echo_reply(Message::Pong(vec![1])), EchoAction::Ignore);
    }
}
