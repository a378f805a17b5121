//! Roomchat client - terminal entry point
//!
//! Reads lines from stdin and sends them to the room; prints whatever the
//! session folds into its conversation state.

use anyhow::Context;
use clap::Parser;
use roomchat_client::config::OutboundKind;
use roomchat_client::stores::MessageKind;
use roomchat_client::{logging, ChatSession, ClientConfig, Identity, SessionUpdate};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Debug, Parser)]
#[command(name = "roomchat", about = "Terminal client for a room-based WebSocket chat")]
struct Args {
    /// Display name; prompted for when not given
    #[arg(short, long, env = "ROOMCHAT_USERNAME")]
    username: Option<String>,

    /// Room identifier to join
    #[arg(short, long, env = "ROOMCHAT_ROOM")]
    room: Option<String>,

    /// Endpoint URL, overrides ROOMCHAT_WS_URL
    #[arg(long)]
    url: Option<String>,

    /// Send chat messages as BROADCAST events
    #[arg(long)]
    broadcast: bool,
}

const HELP: &str = "commands: /who  /typing on|off  /reconnect  /leave  /quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init(logging::DEFAULT_FILTER);

    let args = Args::parse();
    let mut config = ClientConfig::from_env().context("invalid configuration")?;
    if let Some(url) = args.url {
        config.ws_url = url;
    }
    if args.broadcast {
        config.outbound = OutboundKind::Broadcast;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let username = match args.username {
        Some(name) => name,
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(b"Username: ").await?;
            stdout.flush().await?;
            lines
                .next_line()
                .await?
                .context("no username given")?
        }
    };
    let identity = Identity::new(&username, args.room.as_deref())?;

    let mut session = ChatSession::new(config, identity);
    let mut screen = Screen::default();

    let who = session.identity();
    match who.room_id() {
        Some(room) => println!("* {} in room {}", who.username(), room),
        None => println!("* {}", who.username()),
    }
    session.connect().await;
    println!("{}", HELP);
    screen.render(&session);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "/quit" => break,
                    "/leave" => session.disconnect().await,
                    "/reconnect" => {
                        session.connect().await;
                    }
                    "/who" => {
                        let participants = session.state().participants();
                        let names = participants.sorted();
                        println!(
                            "* online ({}): {}",
                            participants.len(),
                            if names.is_empty() { "-".to_string() } else { names.join(", ") }
                        );
                    }
                    "/typing on" => {
                        session.send_typing(true);
                    }
                    "/typing off" => {
                        session.send_typing(false);
                    }
                    text if text.starts_with('/') => println!("{}", HELP),
                    text => {
                        if !text.is_empty() && !session.send_message(text) {
                            println!("* not sent ({})", session.status());
                        }
                    }
                }
            }
            update = session.next_update() => {
                match update {
                    Some(SessionUpdate::Status(status)) => println!("* {}", status),
                    Some(_) => {}
                    None => break,
                }
            }
        }
        screen.render(&session);
    }

    session.disconnect().await;
    Ok(())
}

#[derive(Default)]
struct Screen {
    printed: usize,
    last_error: Option<String>,
    typing: bool,
}

impl Screen {
    /// Print history entries not shown yet, plus error and typing changes.
    fn render(&mut self, session: &ChatSession) {
        let state = session.state();
        let messages = state.messages();
        if messages.len() < self.printed {
            // History was reset.
            self.printed = 0;
        }
        for msg in &messages[self.printed..] {
            match msg.kind {
                MessageKind::System => println!("[{}] * {}", msg.time, msg.content),
                MessageKind::Chat if msg.is_me => println!("[{}] me: {}", msg.time, msg.content),
                MessageKind::Chat => println!("[{}] {}: {}", msg.time, msg.sender, msg.content),
            }
        }
        self.printed = messages.len();

        let error = state.last_error().map(str::to_string);
        if error != self.last_error {
            if let Some(e) = &error {
                println!("! {}", e);
            }
            self.last_error = error;
        }

        if state.is_typing() != self.typing {
            self.typing = state.is_typing();
            if self.typing {
                println!("* someone is typing...");
            }
        }
    }
}
