//! FTP-backed [`FileStoreClient`] using the blocking `suppaftp` client.
//!
//! Every FTP command runs on the blocking thread pool. Retrievals stream:
//! a blocking task reads the data connection in chunks and hands them to the
//! async side through a bounded channel, so assets are never buffered whole.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    file_store::{FileStoreClient, FileStoreConnector, FileStoreSettings},
};
use bytes::Bytes;
use std::io::{self, Read};
use std::net::ToSocketAddrs;
use std::sync::{Arc, Mutex, PoisonError};
use suppaftp::list::File;
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream};
use tokio::sync::{mpsc, oneshot};
use tokio_util::io::StreamReader;
use tracing::{debug, info, warn};

const CHUNK_SIZE: usize = 64 * 1024;

/// Chunks buffered between the transfer thread and the consumer.
const CHUNK_QUEUE_DEPTH: usize = 8;

type Session = Arc<Mutex<Option<FtpStream>>>;

/// A single FTP session.
///
/// The control connection is opened on first use and kept until
/// [`close`](FileStoreClient::close) or until a command fails, after which
/// the next call dials again.
pub struct FtpFileStore {
    settings: FileStoreSettings,
    session: Session,
}

impl FtpFileStore {
    pub fn new(settings: FileStoreSettings) -> Self {
        Self {
            settings,
            session: Arc::new(Mutex::new(None)),
        }
    }

    /// Run `op` against the session slot on the blocking pool.
    async fn with_session<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Option<FtpStream>, &FileStoreSettings) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let session = Arc::clone(&self.session);
        let settings = self.settings.clone();

        tokio::task::spawn_blocking(move || {
            let mut slot = session.lock().unwrap_or_else(PoisonError::into_inner);
            op(&mut slot, &settings)
        })
        .await
        .map_err(|e| BridgeError::OperationFailed(format!("File store worker failed: {}", e)))?
    }
}

fn dial(settings: &FileStoreSettings) -> Result<FtpStream> {
    if settings.host.is_empty() {
        return Err(BridgeError::NotConnected(
            "File store host is not configured".to_string(),
        ));
    }

    let addr = (settings.host.as_str(), settings.port)
        .to_socket_addrs()
        .map_err(|e| BridgeError::NotConnected(format!("{}: {}", settings.address(), e)))?
        .next()
        .ok_or_else(|| {
            BridgeError::NotConnected(format!("{}: no address resolved", settings.address()))
        })?;

    let mut stream = FtpStream::connect_timeout(addr, settings.connect_timeout)
        .map_err(|e| BridgeError::NotConnected(format!("FTP dial failed: {}", e)))?;

    if let Err(e) = stream.login(settings.username.as_str(), settings.password.as_str()) {
        let _ = stream.quit();
        return Err(BridgeError::NotConnected(format!("FTP login failed: {}", e)));
    }

    stream
        .transfer_type(FileType::Binary)
        .map_err(|e| BridgeError::NotConnected(format!("FTP binary mode refused: {}", e)))?;

    if let Some(dir) = settings.working_directory() {
        stream
            .cwd(dir)
            .map_err(|e| BridgeError::NotConnected(format!("FTP chdir to {} failed: {}", dir, e)))?;
    }

    info!(address = %settings.address(), "Connected to file store");
    Ok(stream)
}

/// Names of the regular files in a `LIST` reply. Directories, links and
/// lines that are not entries (such as `total 8`) are skipped.
fn file_names(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| match line.trim_end().parse::<File>() {
            Ok(entry) if entry.is_file() => Some(entry.name().to_string()),
            Ok(_) => None,
            Err(e) => {
                debug!(line = %line, error = ?e, "Skipping LIST line");
                None
            }
        })
        .collect()
}

fn ensure_open<'a>(
    slot: &'a mut Option<FtpStream>,
    settings: &FileStoreSettings,
) -> Result<&'a mut FtpStream> {
    if slot.is_none() {
        *slot = Some(dial(settings)?);
    }
    slot.as_mut()
        .ok_or_else(|| BridgeError::NotConnected("FTP session unavailable".to_string()))
}

/// Copy the data connection into the channel chunk by chunk.
fn pump(reader: &mut dyn Read, chunks: &mpsc::Sender<io::Result<Bytes>>) -> io::Result<()> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        if chunks
            .blocking_send(Ok(Bytes::copy_from_slice(&buf[..read])))
            .is_err()
        {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "asset reader dropped",
            ));
        }
    }
}

#[async_trait]
impl FileStoreClient for FtpFileStore {
    async fn connect(&self) -> Result<()> {
        self.with_session(|slot, settings| ensure_open(slot, settings).map(|_| ()))
            .await
    }

    async fn retrieve(
        &self,
        remote_path: &str,
    ) -> Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>> {
        let session = Arc::clone(&self.session);
        let settings = self.settings.clone();
        let path = remote_path.to_string();
        let (chunk_tx, chunk_rx) = mpsc::channel::<io::Result<Bytes>>(CHUNK_QUEUE_DEPTH);
        let (ready_tx, ready_rx) = oneshot::channel::<Result<()>>();

        tokio::task::spawn_blocking(move || {
            let mut slot = session.lock().unwrap_or_else(PoisonError::into_inner);
            let stream = match ensure_open(&mut slot, &settings) {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            let mut ready_tx = Some(ready_tx);
            let outcome = stream.retr(path.as_str(), |reader| {
                if let Some(ready) = ready_tx.take() {
                    let _ = ready.send(Ok(()));
                }
                pump(reader, &chunk_tx).map_err(FtpError::ConnectionError)
            });

            if let Err(e) = outcome {
                warn!(path = %path, error = %e, "FTP transfer failed");
                match ready_tx.take() {
                    Some(ready) => {
                        let _ = ready.send(Err(BridgeError::remote(format!(
                            "FTP retrieve of {} failed: {}",
                            path, e
                        ))));
                    }
                    None => {
                        let _ = chunk_tx.blocking_send(Err(io::Error::other(format!(
                            "FTP transfer of {} interrupted: {}",
                            path, e
                        ))));
                    }
                }
                // The control channel state is unknown after a failed transfer
                *slot = None;
            } else {
                debug!(path = %path, "FTP transfer complete");
            }
        });

        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(BridgeError::OperationFailed(
                    "File store worker exited before the transfer started".to_string(),
                ))
            }
        }

        let chunks = futures_util::stream::unfold(chunk_rx, |mut rx| async move {
            rx.recv().await.map(|chunk| (chunk, rx))
        });

        Ok(Box::new(StreamReader::new(Box::pin(chunks))))
    }

    async fn list(&self, path: &str) -> Result<Vec<String>> {
        let path = path.to_string();
        self.with_session(move |slot, settings| {
            let stream = ensure_open(slot, settings)?;
            match stream.list(Some(path.as_str())) {
                Ok(lines) => Ok(file_names(&lines)),
                Err(e) => {
                    *slot = None;
                    Err(BridgeError::remote(format!("FTP list of {} failed: {}", path, e)))
                }
            }
        })
        .await
    }

    async fn close(&self) -> Result<()> {
        self.with_session(|slot, _| {
            if let Some(mut stream) = slot.take() {
                if let Err(e) = stream.quit() {
                    debug!(error = %e, "FTP QUIT failed; dropping connection");
                }
            }
            Ok(())
        })
        .await
    }
}

/// Opens one [`FtpFileStore`] session per request.
#[derive(Debug, Clone)]
pub struct FtpConnector {
    settings: FileStoreSettings,
}

impl FtpConnector {
    pub fn new(settings: FileStoreSettings) -> Self {
        Self { settings }
    }
}

impl FileStoreConnector for FtpConnector {
    fn open_session(&self) -> Box<dyn FileStoreClient> {
        Box::new(FtpFileStore::new(self.settings.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::time::Duration;

    fn unreachable_settings() -> FileStoreSettings {
        FileStoreSettings {
            host: "127.0.0.1".to_string(),
            port: 1,
            username: "player".to_string(),
            password: "secret".to_string(),
            connect_timeout: Duration::from_secs(2),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_close_without_connection_is_noop() {
        let store = FtpFileStore::new(unreachable_settings());
        store.close().await.unwrap();
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_retrieve_reports_not_connected() {
        let store = FtpFileStore::new(unreachable_settings());
        let result = store.retrieve("upload/clip.mp4").await;
        assert!(matches!(result, Err(BridgeError::NotConnected(_))));
    }

    #[tokio::test]
    async fn test_missing_host_reports_not_connected() {
        let store = FtpFileStore::new(FileStoreSettings::default());
        let result = store.connect().await;
        assert!(matches!(result, Err(BridgeError::NotConnected(_))));
    }

    const LISTING: [&str; 4] = [
        "total 8",
        "-rw-r--r--    1 ftp      ftp          1024 Mar 01 06:30 a.jpg",
        "drwxr-xr-x    2 ftp      ftp          4096 Mar 01 06:30 upload",
        "-rw-r--r--    1 ftp      ftp       7340032 Feb 27 18:02 clip.mp4",
    ];

    #[test]
    fn test_file_names_skip_directories() {
        let lines: Vec<String> = LISTING.iter().map(|line| line.to_string()).collect();
        assert_eq!(file_names(&lines), vec!["a.jpg", "clip.mp4"]);
    }

    /// Minimal passive-mode FTP server answering one session.
    fn serve_listing(listener: TcpListener) -> std::thread::JoinHandle<Vec<String>> {
        std::thread::spawn(move || {
            let (control, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(control.try_clone().unwrap());
            let mut control = control;
            let data = TcpListener::bind("127.0.0.1:0").unwrap();
            let port = data.local_addr().unwrap().port();
            let mut commands = Vec::new();

            control.write_all(b"220 ready\r\n").unwrap();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 {
                    break;
                }
                let command = line.trim_end().to_string();
                let verb = command.split(' ').next().unwrap_or("").to_ascii_uppercase();
                commands.push(command);
                match verb.as_str() {
                    "USER" => control.write_all(b"331 password please\r\n").unwrap(),
                    "PASS" => control.write_all(b"230 logged in\r\n").unwrap(),
                    "TYPE" => control.write_all(b"200 type set\r\n").unwrap(),
                    "CWD" => control.write_all(b"250 directory changed\r\n").unwrap(),
                    "PASV" => {
                        let reply = format!(
                            "227 Entering Passive Mode (127,0,0,1,{},{})\r\n",
                            port >> 8,
                            port & 0xff
                        );
                        control.write_all(reply.as_bytes()).unwrap();
                    }
                    "LIST" => {
                        control.write_all(b"150 listing\r\n").unwrap();
                        let (mut conn, _) = data.accept().unwrap();
                        for entry in LISTING {
                            conn.write_all(format!("{}\r\n", entry).as_bytes()).unwrap();
                        }
                        drop(conn);
                        control.write_all(b"226 done\r\n").unwrap();
                    }
                    "QUIT" => {
                        control.write_all(b"221 bye\r\n").unwrap();
                        break;
                    }
                    _ => control.write_all(b"502 not implemented\r\n").unwrap(),
                }
            }
            commands
        })
    }

    #[tokio::test]
    async fn test_list_returns_only_files() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = serve_listing(listener);

        let store = FtpFileStore::new(FileStoreSettings {
            host: "127.0.0.1".to_string(),
            port,
            username: "player".to_string(),
            password: "secret".to_string(),
            connect_timeout: Duration::from_secs(2),
            ..Default::default()
        });

        let names = store.list("/").await.unwrap();
        store.close().await.unwrap();

        assert_eq!(names, vec!["a.jpg", "clip.mp4"]);
        let commands = tokio::task::spawn_blocking(move || server.join().unwrap())
            .await
            .unwrap();
        assert!(commands.iter().any(|command| command == "LIST /"));
    }

    #[test]
    fn test_pump_copies_all_chunks() {
        let (tx, mut rx) = mpsc::channel(CHUNK_QUEUE_DEPTH);
        let payload = vec![7u8; CHUNK_SIZE + 10];
        let mut reader = io::Cursor::new(payload.clone());

        pump(&mut reader, &tx).unwrap();
        drop(tx);

        let mut copied = Vec::new();
        while let Some(chunk) = rx.blocking_recv() {
            copied.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(copied, payload);
    }
}
