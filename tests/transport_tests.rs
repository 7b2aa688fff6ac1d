//! TCP transport tests against a real in-process listener.

use std::io::{BufRead, BufReader};
use std::net::{SocketAddr, TcpListener};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rstest::{fixture, rstest};
use serde::Deserialize;

use logstash_handler::{BuildError, Level, LogRecord, LogstashHandlerBuilder};

#[derive(Debug, Deserialize)]
struct Event {
    #[serde(rename = "@timestamp")]
    timestamp: String,
    #[serde(rename = "@version")]
    version: String,
    message: String,
    level: String,
    logger_name: String,
    service: Option<String>,
    host: Option<String>,
    order_id: Option<u64>,
}

#[fixture]
fn tcp_listener() -> TcpListener {
    TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener")
}

/// Accept one connection and forward each received line to the test.
fn spawn_line_server(listener: TcpListener) -> (SocketAddr, mpsc::Receiver<String>) {
    let addr = listener.local_addr().expect("listener has address");
    let (notify_tx, notify_rx) = mpsc::channel();
    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept connection");
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let Ok(line) = line else { break };
            if notify_tx.send(line).is_err() {
                break;
            }
        }
    });
    (addr, notify_rx)
}

fn recv_event(lines: &mpsc::Receiver<String>) -> Event {
    let line = lines
        .recv_timeout(Duration::from_secs(2))
        .expect("event received");
    serde_json::from_str(&line).expect("valid json event")
}

#[rstest]
fn ships_newline_delimited_json_events(tcp_listener: TcpListener) {
    let (addr, lines) = spawn_line_server(tcp_listener);
    let handler = LogstashHandlerBuilder::new()
        .with_tcp(addr.ip().to_string(), addr.port())
        .with_extra_field("service", "orders")
        .with_extra_field("host", "web-1")
        .build()
        .expect("build handler");

    handler.emit(
        LogRecord::new("orders.checkout", Level::Warn, "payment retried")
            .with_field("order_id", 4182),
    );
    handler.close();
    handler.wait_closed();

    let event = recv_event(&lines);
    assert_eq!(event.version, "1");
    assert_eq!(event.message, "payment retried");
    assert_eq!(event.level, "WARN");
    assert_eq!(event.logger_name, "orders.checkout");
    assert_eq!(event.order_id, Some(4182));
    assert_eq!(event.service.as_deref(), Some("orders"));
    assert_eq!(event.host.as_deref(), Some("web-1"));
    assert!(event.timestamp.ends_with('Z'), "timestamp is UTC");
}

#[rstest]
fn events_arrive_one_per_line(tcp_listener: TcpListener) {
    let (addr, lines) = spawn_line_server(tcp_listener);
    let handler = LogstashHandlerBuilder::new()
        .with_tcp(addr.ip().to_string(), addr.port())
        .build()
        .expect("build handler");

    for n in 0..3 {
        handler.emit(LogRecord::new("seq", Level::Info, &format!("event {n}")));
    }
    handler.close();
    handler.wait_closed();

    for n in 0..3 {
        let event = recv_event(&lines);
        assert_eq!(event.message, format!("event {n}"));
    }
}

#[rstest]
fn initial_connect_failure_surfaces_to_the_caller(tcp_listener: TcpListener) {
    let addr = tcp_listener.local_addr().expect("listener has address");
    // Free the port so the connection is refused.
    drop(tcp_listener);

    let result = LogstashHandlerBuilder::new()
        .with_tcp(addr.ip().to_string(), addr.port())
        .with_connect_timeout(Duration::from_millis(500))
        .build();
    assert!(matches!(result, Err(BuildError::Io(_))));
}
