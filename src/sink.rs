//! Destinations for formatted statsd lines.

use crate::error::EmitError;
use std::{
    future::Future,
    net::{
        Ipv4Addr,
        Ipv6Addr,
        SocketAddr,
    },
    pin::Pin,
};
use tokio::net::{
    lookup_host,
    UdpSocket,
};

/// Receives complete statsd lines such as `haproxy.api.scur:3|g`.
///
/// Implementations are shared by all emissions of a cycle and must accept
/// concurrent calls.
pub trait MetricsSink: Send + Sync {
    fn send<'a>(&'a self, line: &'a str) -> Pin<Box<dyn Future<Output = Result<(), EmitError>> + Send + 'a>>;
}

/// Writes one datagram per line to a statsd server.
#[derive(Debug)]
pub struct StatsdSink {
    socket: UdpSocket,
}

impl StatsdSink {
    /// Resolves `address` (`host:port`) once and keeps the socket for the whole run.
    pub async fn connect(address: &str) -> Result<Self, EmitError> {
        let target = lookup_host(address)
            .await?
            .next()
            .ok_or_else(|| EmitError::Unresolved(address.to_string()))?;

        let local: SocketAddr = match target {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(target).await?;
        debug!(%target, "Connected statsd socket");

        Ok(Self { socket })
    }

    pub fn peer_addr(&self) -> Result<SocketAddr, EmitError> {
        Ok(self.socket.peer_addr()?)
    }
}

impl MetricsSink for StatsdSink {
    fn send<'a>(&'a self, line: &'a str) -> Pin<Box<dyn Future<Output = Result<(), EmitError>> + Send + 'a>> {
        Box::pin(async move {
            self.socket.send(line.as_bytes()).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sends_one_datagram_per_line() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let address = server.local_addr().unwrap().to_string();

        let sink = StatsdSink::connect(&address).await.unwrap();
        assert_eq!(sink.peer_addr().unwrap(), server.local_addr().unwrap());

        sink.send("haproxy.api.scur:3|g").await.unwrap();
        sink.send("haproxy.api.hrsp_2xx:40|c").await.unwrap();

        let mut buf = [0u8; 512];
        let len = server.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"haproxy.api.scur:3|g");
        let len = server.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"haproxy.api.hrsp_2xx:40|c");
    }

    #[tokio::test]
    async fn unresolvable_address_fails() {
        assert!(StatsdSink::connect("not an address").await.is_err());
    }
}
