use std::io::{self, Read, Write};
use std::net::{IpAddr, SocketAddr, TcpStream};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};

/// Opens the transport a probe session runs over.
pub trait Dialer {
    type Stream: Read + Write;

    fn dial(&mut self, addr: &SocketAddr) -> io::Result<Self::Stream>;
}

/// Plain TCP, optionally bound to a local address.
///
/// Without a timeout every socket call blocks until the peer answers or the
/// kernel gives up, which matches how the classic tool behaves.
#[derive(Debug, Clone, Default)]
pub struct TcpDialer {
    bind: Option<IpAddr>,
    timeout: Option<Duration>,
}

impl TcpDialer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bind(mut self, bind: Option<IpAddr>) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|timeout| !timeout.is_zero());
        self
    }
}

impl Dialer for TcpDialer {
    type Stream = TcpStream;

    fn dial(&mut self, addr: &SocketAddr) -> io::Result<TcpStream> {
        let stream = match self.bind {
            Some(local) => connect_from(local, addr, self.timeout)?,
            None => match self.timeout {
                Some(timeout) => TcpStream::connect_timeout(addr, timeout)?,
                None => TcpStream::connect(addr)?,
            },
        };
        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;
        Ok(stream)
    }
}

fn connect_from(
    local: IpAddr,
    addr: &SocketAddr,
    timeout: Option<Duration>,
) -> io::Result<TcpStream> {
    let socket = Socket::new(Domain::for_address(*addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.bind(&SocketAddr::new(local, 0).into())?;
    match timeout {
        Some(timeout) => socket.connect_timeout(&(*addr).into(), timeout)?,
        None => socket.connect(&(*addr).into())?,
    }
    Ok(socket.into())
}
