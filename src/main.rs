// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Streamnet CLI
//!
//! Example usage and demonstration of the streamnet library.

use std::env;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use parking_lot::Mutex;
use streamnet::{ChunkKind, Client, Request, SseDechunker, Subscription, Url};

fn main() -> ExitCode {
    // Initialize logging
    let directive = match "streamnet=info".parse() {
        Ok(directive) => directive,
        Err(_) => return ExitCode::from(1),
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let outcome = match args[1].as_str() {
        "get" => {
            if args.len() < 3 {
                eprintln!("Usage: streamnet get <url>");
                return ExitCode::from(1);
            }
            get_url(&args[2])
        }
        "stream" => {
            if args.len() < 3 {
                eprintln!("Usage: streamnet stream <url> [json-body]");
                return ExitCode::from(1);
            }
            stream_events(&args[2], args.get(3).map(String::as_str))
        }
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("streamnet {}", streamnet::VERSION);
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Streamnet - Blocking HTTP client with inline streaming

USAGE:
    streamnet <COMMAND> [ARGS]

COMMANDS:
    get <url>                   Fetch a URL and print status, headers and body
    stream <url> [json-body]    POST (or GET without body) and print SSE events as they arrive
    help                        Show this help message
    version                     Show version information

ENVIRONMENT:
    STREAMNET_USER_AGENT, STREAMNET_PROXY, STREAMNET_CONNECT_TIMEOUT_MS,
    STREAMNET_TIMEOUT_MS, STREAMNET_MAX_REDIRECTS, STREAMNET_READ_CHUNK
    RUST_LOG                    Log filter (default streamnet=info)

EXAMPLES:
    streamnet get "https://example.com/?q=rust"
    streamnet stream http://localhost:8080/v1/chat '{{"stream":true}}'
"#
    );
}

fn get_url(url: &str) -> anyhow::Result<ExitCode> {
    let url = Url::parse(url).context("invalid URL")?;
    let mut client = Client::new(url)?;
    client.set_follow_redirects(true);

    let response = client.send(Request::default()).into_result()?;

    println!("{}", response.status_line);
    let mut headers: Vec<_> = response.headers.iter().collect();
    headers.sort();
    for (name, value) in headers {
        println!("{}: {}", name, value);
    }
    println!();
    println!("{}", response);

    Ok(exit_for_status(response.status_code))
}

fn stream_events(url: &str, body: Option<&str>) -> anyhow::Result<ExitCode> {
    let url = Url::parse(url).context("invalid URL")?;
    let mut client = Client::new(url)?;
    client.set_default_header("Accept", "text/event-stream");

    let mut request = Request::default();
    if let Some(body) = body {
        let value: serde_json::Value = serde_json::from_str(body).context("body is not JSON")?;
        request.set_json(&value)?;
    }

    let dechunker = Arc::new(Mutex::new(SseDechunker::new(|event, data| {
        let mut out = std::io::stdout().lock();
        let _ = match event {
            "" => writeln!(out, "{}", data),
            name => writeln!(out, "[{}] {}", name, data),
        };
        let _ = out.flush();
    })));

    let status_line = Arc::new(Mutex::new(String::new()));
    let status_sink = status_line.clone();
    request.subscribe(Subscription::from_fn(move |chunk, kind| {
        let mut status = status_sink.lock();
        if kind == ChunkKind::Header && status.is_empty() {
            *status = String::from_utf8_lossy(chunk).trim().to_string();
            eprintln!("{}", status);
        }
    }));
    request.subscribe(Subscription::shared(dechunker.clone()));

    let response = client.send(request).into_result()?;

    if !dechunker.lock().started() && !response.body.is_empty() {
        // Not an event stream; show whatever came back.
        println!("{}", response);
    }

    Ok(exit_for_status(response.status_code))
}

fn exit_for_status(status: u16) -> ExitCode {
    if (200..300).contains(&status) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}
