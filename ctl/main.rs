#![forbid(unsafe_code)]

//! `teleshell-ctl` — command-line client for `teleshell`.
//!
//! Connects to the server over TCP and drives one complete command exchange
//! per invocation: send the command name, read the response, and when the
//! server prompts for arguments (`expect > 0`), send them as a single
//! `$`-joined payload and read the final response.
//!
//! Server text is printed verbatim; `screenshot` base64-decodes the reply
//! into a local image file.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::{Parser, Subcommand};

/// Separator byte between frame header fields and between joined arguments.
///
/// Mirrors the server's wire module but is defined locally because the ctl
/// binary does not depend on the library crate.
const FIELD_DELIMITER: u8 = b'$';

#[derive(Debug, Parser)]
#[command(
    name = "teleshell-ctl",
    about = "Command-line client for the teleshell server",
    version,
    long_about = None
)]
struct Cli {
    /// Server host to connect to.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to connect to.
    #[arg(long, default_value_t = 17207)]
    port: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the files in a directory on the server host.
    Dir {
        /// Directory path on the server host.
        path: String,
    },

    /// Delete a file on the server host.
    Delete {
        /// File path on the server host.
        path: String,
    },

    /// Copy a file on the server host.
    Copy {
        /// Source file path.
        src: String,
        /// Destination file path.
        dest: String,
    },

    /// Execute a program on the server host.
    Execute {
        /// Program path on the server host.
        path: String,
    },

    /// Capture a screenshot of the server host display.
    Screenshot {
        /// Local file the decoded image is written to.
        #[arg(long, default_value = "screenshot.png")]
        output: PathBuf,
    },

    /// Ask the server to close the session.
    Exit,
}

impl Command {
    /// The wire command name and its argument values.
    fn request(&self) -> (&'static str, Vec<String>) {
        match self {
            Self::Dir { path } => ("DIR", vec![path.clone()]),
            Self::Delete { path } => ("DELETE", vec![path.clone()]),
            Self::Copy { src, dest } => ("COPY", vec![src.clone(), dest.clone()]),
            Self::Execute { path } => ("EXECUTE", vec![path.clone()]),
            Self::Screenshot { .. } => ("TAKE SCREENSHOT", Vec::new()),
            Self::Exit => ("EXIT", Vec::new()),
        }
    }
}

fn main() {
    let args = Cli::parse();

    if let Err(err) = run(&args) {
        eprintln!("Failed to reach server: {err}");
        eprintln!("Is teleshell running on {}:{}?", args.host, args.port);
        std::process::exit(1);
    }
}

/// Drive one full command exchange against the server.
fn run(args: &Cli) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut stream = TcpStream::connect((args.host.as_str(), args.port))?;

    let (name, values) = args.command.request();
    write_message(&mut stream, 0, name.as_bytes())?;

    let (expect, payload) = read_message(&mut stream)?;

    let reply = if expect > 0 {
        if values.len() != expect {
            return Err(format!(
                "server expects {expect} argument(s) for {name}, {} provided",
                values.len()
            )
            .into());
        }
        let joined = values.join("$");
        write_message(&mut stream, expect, joined.as_bytes())?;
        let (_, reply) = read_message(&mut stream)?;
        reply
    } else {
        payload
    };

    present(&args.command, &reply)
}

/// Print or persist the server's reply.
fn present(command: &Command, reply: &[u8]) -> std::result::Result<(), Box<dyn std::error::Error>> {
    if let Command::Screenshot { output } = command {
        let text = std::str::from_utf8(reply)?;
        if text.starts_with("ERROR:") {
            eprintln!("{text}");
            std::process::exit(1);
        }
        let image = BASE64.decode(text.trim())?;
        std::fs::write(output, image)?;
        println!("screenshot saved to {}", output.display());
    } else {
        println!("{}", String::from_utf8_lossy(reply));
    }

    Ok(())
}

// ── Wire helpers ──────────────────────────────────────────────────────────────

/// Send one `expect$length$payload` frame, retrying partial writes.
fn write_message(stream: &mut TcpStream, expect: usize, payload: &[u8]) -> std::io::Result<()> {
    let mut message = format!("{expect}${}$", payload.len()).into_bytes();
    message.extend_from_slice(payload);
    stream.write_all(&message)?;
    stream.flush()
}

/// Read one frame: two numeric header fields, then the exact payload.
fn read_message(
    stream: &mut TcpStream,
) -> std::result::Result<(usize, Vec<u8>), Box<dyn std::error::Error>> {
    let expect = read_header_field(stream)?;
    let length = read_header_field(stream)?;

    let mut payload = vec![0u8; length];
    stream.read_exact(&mut payload)?;
    Ok((expect, payload))
}

/// Read one byte at a time until the field delimiter, then parse the digits.
fn read_header_field(
    stream: &mut TcpStream,
) -> std::result::Result<usize, Box<dyn std::error::Error>> {
    let mut digits = String::new();

    loop {
        let mut byte = [0u8; 1];
        let read = stream.read(&mut byte)?;
        if read == 0 {
            return Err("server closed the connection".into());
        }

        if byte[0] == FIELD_DELIMITER {
            return Ok(digits.parse()?);
        }
        digits.push(char::from(byte[0]));
    }
}
