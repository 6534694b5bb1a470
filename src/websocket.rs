//! Websocket handle returned by the websocket binder.
//!
//! The wire protocol (handshake, framing) is the host's concern; this module
//! only models the in-handler view of an established connection as a pair of
//! message channels, which also makes handlers testable without a socket.

use bytes::Bytes;
use tokio::sync::{Mutex, mpsc};

/// A websocket message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
	Text(String),
	Binary(Bytes),
	Close,
}

/// Handler-side view of an established websocket connection.
pub struct Websocket {
	outgoing: mpsc::UnboundedSender<Message>,
	incoming: Mutex<mpsc::UnboundedReceiver<Message>>,
}

/// Peer-side view, held by the transport (or a test) driving the connection.
pub struct WebsocketPeer {
	outgoing: mpsc::UnboundedSender<Message>,
	incoming: Mutex<mpsc::UnboundedReceiver<Message>>,
}

impl Websocket {
	/// Creates a connected handler/peer pair.
	///
	/// # Examples
	///
	/// ```
	/// use hyper_depends::websocket::{Message, Websocket};
	///
	/// # tokio_test::block_on(async {
	/// let (ws, peer) = Websocket::pair();
	/// peer.send(Message::Text("ping".to_string())).unwrap();
	/// assert_eq!(ws.receive().await, Some(Message::Text("ping".to_string())));
	/// # });
	/// ```
	pub fn pair() -> (Websocket, WebsocketPeer) {
		let (to_peer_tx, to_peer_rx) = mpsc::unbounded_channel();
		let (to_handler_tx, to_handler_rx) = mpsc::unbounded_channel();
		(
			Websocket {
				outgoing: to_peer_tx,
				incoming: Mutex::new(to_handler_rx),
			},
			WebsocketPeer {
				outgoing: to_handler_tx,
				incoming: Mutex::new(to_peer_rx),
			},
		)
	}

	/// Sends a message toward the peer. Errors when the peer is gone.
	pub fn send(&self, message: Message) -> Result<(), mpsc::error::SendError<Message>> {
		self.outgoing.send(message)
	}

	/// Receives the next message, `None` once the peer hung up.
	pub async fn receive(&self) -> Option<Message> {
		self.incoming.lock().await.recv().await
	}
}

impl WebsocketPeer {
	pub fn send(&self, message: Message) -> Result<(), mpsc::error::SendError<Message>> {
		self.outgoing.send(message)
	}

	pub async fn receive(&self) -> Option<Message> {
		self.incoming.lock().await.recv().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_messages_flow_both_ways() {
		let (ws, peer) = Websocket::pair();
		peer.send(Message::Text("hello".to_string())).unwrap();
		assert_eq!(ws.receive().await, Some(Message::Text("hello".to_string())));

		ws.send(Message::Binary(Bytes::from_static(b"\x01"))).unwrap();
		assert_eq!(
			peer.receive().await,
			Some(Message::Binary(Bytes::from_static(b"\x01")))
		);
	}

	#[tokio::test]
	async fn test_receive_ends_when_peer_dropped() {
		let (ws, peer) = Websocket::pair();
		drop(peer);
		assert_eq!(ws.receive().await, None);
	}
}
