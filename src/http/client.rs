use std::thread;

use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{Endpoints, ServerConfig};
use crate::control::CommandSink;
use crate::types::{
    CmdVelRequest, CurrentReading, PoseReply, ProcessStatus, ServerReply, TwistState, VelocityCommand,
};

/// Errors talking to the bridge.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{method} {path} returned HTTP {status}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
    },
    #[error("{path} reported an error: {message}")]
    Server { path: String, message: String },
}

#[derive(Serialize)]
struct LaunchRequest<'a> {
    command: &'a str,
}

/// Blocking client for the bridge's JSON endpoints.
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct RobotClient {
    client: Client,
    base_url: String,
    endpoints: Endpoints,
}

impl RobotClient {
    pub fn new(config: &ServerConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .no_proxy()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            endpoints: config.endpoints.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.client.get(self.url(path)).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                method: "GET",
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.json::<T>()?)
    }

    fn post<B: Serialize>(&self, path: &str, body: Option<&B>) -> Result<ServerReply, ClientError> {
        let mut req = self.client.post(self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                method: "POST",
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        let reply = resp.json::<ServerReply>()?;
        if reply.is_error() {
            return Err(ClientError::Server {
                path: path.to_string(),
                message: reply.message.unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        Ok(reply)
    }

    /// `POST /cmd_vel {linear_x, angular_z}`
    pub fn send_velocity(&self, cmd: VelocityCommand) -> Result<(), ClientError> {
        self.post(&self.endpoints.cmd_vel, Some(&CmdVelRequest::from(cmd)))?;
        Ok(())
    }

    pub fn twist(&self) -> Result<TwistState, ClientError> {
        self.get_json(&self.endpoints.twist)
    }

    pub fn current(&self) -> Result<CurrentReading, ClientError> {
        self.get_json(&self.endpoints.current)
    }

    pub fn pose(&self) -> Result<PoseReply, ClientError> {
        self.get_json(&self.endpoints.pose)
    }

    pub fn pose_fusion(&self) -> Result<PoseReply, ClientError> {
        self.get_json(&self.endpoints.pose_fusion)
    }

    pub fn check_processes(&self) -> Result<ProcessStatus, ClientError> {
        self.get_json(&self.endpoints.check_processes)
    }

    pub fn check_processes_pos(&self) -> Result<ProcessStatus, ClientError> {
        self.get_json(&self.endpoints.check_processes_pos)
    }

    pub fn kill_mapping_scripts(&self) -> Result<ServerReply, ClientError> {
        self.post::<()>(&self.endpoints.kill_mapping_scripts, None)
    }

    pub fn kill_pos_scripts(&self) -> Result<ServerReply, ClientError> {
        self.post::<()>(&self.endpoints.kill_pos_scripts, None)
    }

    pub fn launch_ros_command(&self, command: &str) -> Result<ServerReply, ClientError> {
        self.post(&self.endpoints.launch_ros_command, Some(&LaunchRequest { command }))
    }

    /// Runs a one-off request on its own thread and only logs the outcome.
    /// Used for teardown calls that must not block the UI.
    pub fn fire_and_forget<T, F>(&self, what: &'static str, request: F)
    where
        F: FnOnce(&RobotClient) -> Result<T, ClientError> + Send + 'static,
        T: Send + 'static,
    {
        let client = self.clone();
        let spawned = thread::Builder::new()
            .name(format!("oneshot-{}", what))
            .spawn(move || match request(&client) {
                Ok(_) => info!("{} succeeded", what),
                Err(e) => warn!("{} failed: {}", what, e),
            });
        if let Err(e) = spawned {
            warn!("Failed to spawn {} request thread: {}", what, e);
        }
    }
}

impl CommandSink for RobotClient {
    fn send_command(&self, cmd: VelocityCommand) {
        // runs on a dispatch thread; the next tick sends again anyway
        if let Err(e) = self.send_velocity(cmd) {
            debug!("cmd_vel not delivered: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    /// Accepts one connection, answers with `status` and `body`, and returns
    /// the raw request it received.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (base_url, handle)
    }

    fn client_for(base_url: &str) -> RobotClient {
        let config = ServerConfig {
            base_url: format!("{}/", base_url),
            ..ServerConfig::default()
        };
        RobotClient::new(&config).unwrap()
    }

    #[test]
    fn test_url_join() {
        let client = client_for("http://robot:1880");
        assert_eq!(client.base_url(), "http://robot:1880");
        assert_eq!(client.url("/get_pose"), "http://robot:1880/get_pose");
        assert_eq!(client.url("twist"), "http://robot:1880/twist");
    }

    #[test]
    fn test_send_velocity_posts_json_body() {
        let (base_url, server) = serve_once("200 OK", r#"{"status":"success"}"#);
        let client = client_for(&base_url);
        client.send_velocity(VelocityCommand::new(0.22, -0.5)).unwrap();

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /cmd_vel "));
        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let parsed: CmdVelRequest = serde_json::from_str(body).unwrap();
        assert_eq!(parsed, CmdVelRequest { linear_x: 0.22, angular_z: -0.5 });
    }

    #[test]
    fn test_get_pose() {
        let (base_url, server) = serve_once("200 OK", r#"{"position":{"x":0.5,"y":1.25}}"#);
        let client = client_for(&base_url);
        let reply = client.pose().unwrap();
        assert_eq!(reply.sample(), Some(crate::types::PoseSample::new(0.5, 1.25)));
        assert!(server.join().unwrap().starts_with("GET /get_pose "));
    }

    #[test]
    fn test_http_error_status() {
        let (base_url, server) = serve_once("500 Internal Server Error", "{}");
        let client = client_for(&base_url);
        match client.current() {
            Err(ClientError::Status { status, path, .. }) => {
                assert_eq!(status, 500);
                assert_eq!(path, "/get_current");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_launch_error_reply() {
        let (base_url, server) = serve_once("200 OK", r#"{"status":"error","message":"no such package"}"#);
        let client = client_for(&base_url);
        match client.launch_ros_command("ros2 launch missing thing.py") {
            Err(ClientError::Server { message, .. }) => assert_eq!(message, "no such package"),
            other => panic!("unexpected result: {:?}", other),
        }
        let request = server.join().unwrap();
        assert!(request.starts_with("POST /launch_ros_command "));
        assert!(request.contains(r#""command":"ros2 launch missing thing.py""#));
    }

    #[test]
    fn test_connection_refused_is_http_error() {
        // bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = client_for(&format!("http://127.0.0.1:{}", port));
        assert!(matches!(client.twist(), Err(ClientError::Http(_))));
    }
}
