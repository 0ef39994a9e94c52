use may::coroutine::JoinHandle;
use may_minihttp::{HttpServer, HttpService};
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

/// Handle to a running server: readiness polling, graceful stop, join.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Poll the listen address until the server accepts connections.
    ///
    /// # Errors
    ///
    /// `TimedOut` if the server is not reachable within ~250ms.
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Cancel the accept coroutine and wait for it to finish.
    pub fn stop(self) {
        // SAFETY: cancel() is unsafe in the may runtime; the handle is
        // valid and cancellation is the intended shutdown path here.
        #[allow(unsafe_code)]
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
    }

    /// Block until the accept coroutine exits.
    ///
    /// # Errors
    ///
    /// Returns the panic payload if the server coroutine panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

/// Bind and start a `may_minihttp` server for the given service.
///
/// # Errors
///
/// Fails when the address is invalid or the port cannot be bound.
pub fn start_server<T, A>(service: T, addr: A) -> io::Result<ServerHandle>
where
    T: HttpService + Clone + Send + Sync + 'static,
    A: ToSocketAddrs,
{
    let addr = addr
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid listen address"))?;
    let handle = HttpServer(service).start(addr)?;
    Ok(ServerHandle { addr, handle })
}
