#![allow(dead_code)]

use pydoc_scraper::client::Client;
use pydoc_scraper::config::Config;
use pydoc_scraper::modes::Context;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Minimal HTTP/1.1 server answering GET requests from a fixed route table.
/// Unknown paths get a 404. Truncated paths announce twice their body length
/// and close the connection after the real body.
pub struct FixtureServer {
    base: String,
    task: tokio::task::JoinHandle<()>,
}

impl FixtureServer {
    pub async fn start(routes: Vec<(&str, Vec<u8>)>) -> Self {
        Self::start_truncating(routes, &[]).await
    }

    pub async fn start_truncating(routes: Vec<(&str, Vec<u8>)>, truncated: &[&str]) -> Self {
        let truncated: Arc<Vec<String>> =
            Arc::new(truncated.iter().map(|path| path.to_string()).collect());
        let routes: Arc<HashMap<String, Vec<u8>>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, body)| (path.to_string(), body))
                .collect(),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let routes = Arc::clone(&routes);
                let truncated = Arc::clone(&truncated);
                tokio::spawn(async move {
                    let _ = respond(stream, &routes, &truncated).await;
                });
            }
        });

        Self { base, task }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Stops accepting and waits until the listening socket is closed.
    pub async fn shutdown(mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn respond(
    mut stream: TcpStream,
    routes: &HashMap<String, Vec<u8>>,
    truncated: &[String],
) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&buf[..n]);
    }

    let request = String::from_utf8_lossy(&request);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    let (status, body) = match routes.get(&path) {
        Some(body) => ("200 OK", body.clone()),
        None => ("404 Not Found", b"not found".to_vec()),
    };

    let announced = if truncated.contains(&path) {
        body.len() * 2
    } else {
        body.len()
    };
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status, announced
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(&body).await?;
    stream.shutdown().await
}

/// A context pointed at `server` with all output directories under `dir`
/// and no response cache.
pub fn context(server: &FixtureServer, dir: &Path) -> Context {
    let config = Config {
        doc_url: server.url("/3/"),
        pep_url: server.url("/peps/"),
        results_dir: dir.join("results"),
        downloads_dir: dir.join("downloads"),
        ..Config::default()
    };
    Context {
        client: Client::builder().build().unwrap(),
        config,
    }
}
