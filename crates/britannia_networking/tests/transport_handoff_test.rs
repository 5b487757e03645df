//! A transport thread feeding the frame-loop client.

use std::thread;

use britannia_networking::{
    ChannelNetworkClient, ConnectionState, InboundQueue, NetworkClient, Packet,
};

#[test]
fn test_transport_thread_then_disconnect() {
    let mut queue = InboundQueue::new(256);
    let sender = queue.sender().unwrap();
    queue.seal();

    let transport = thread::spawn(move || {
        for i in 0..100u8 {
            sender.push_blocking(Packet::new(vec![0x73, i]).unwrap()).unwrap();
        }
    });
    transport.join().unwrap();

    let mut handled = 0usize;
    let mut client = ChannelNetworkClient::new(queue, |_: &Packet| handled += 1, 64);

    let first = client.slice();
    assert_eq!(first.processed, 64);
    assert_eq!(first.state, ConnectionState::Connected);

    let second = client.slice();
    assert_eq!(second.processed, 36);
    assert_eq!(second.state, ConnectionState::Disconnected);

    // Once disconnected, slices do nothing.
    assert_eq!(client.slice().processed, 0);
    assert_eq!(client.state(), ConnectionState::Disconnected);
    drop(client);
    assert_eq!(handled, 100);
}
