use std::sync::Arc;

use async_trait::async_trait;
use dotenvy::dotenv;
use env_logger::Builder;
use log::LevelFilter;
use tokio::io::{AsyncBufReadExt, BufReader};

use mafia_engine::models::config::GameConfig;
use mafia_engine::models::player::UserId;
use mafia_engine::notifier::{Notifier, NotifyError, TargetPrompt};
use mafia_engine::services::{discussion_service, game_service};
use mafia_engine::AppState;

const HELP: &str = "Welcome to Mafia! Commands:\n\
    join <id> <name>   - join as a real player\n\
    bot <name>         - add an autonomous filler\n\
    players            - list the roster\n\
    start_game         - deal roles and start\n\
    end_game           - end the game\n\
    target <id> <name> - submit a night action\n\
    end_night          - resolve the night\n\
    start_discussion   - begin the discussion round\n\
    skip               - cut the discussion short\n\
    vote <id> <name>   - vote to exclude a player\n\
    end_day            - tally the votes\n\
    quit               - leave the console";

/// Stand-in transport: every private message is printed to the terminal
/// tagged with its recipient, prompts included.
struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send_to(
        &self,
        recipient: UserId,
        text: &str,
        prompt: Option<TargetPrompt>,
    ) -> Result<(), NotifyError> {
        match prompt {
            Some(prompt) => println!(
                "[to {recipient}] {text} {:?} (reply: {}<name>)",
                prompt.targets, prompt.callback_prefix
            ),
            None => println!("[to {recipient}] {text}"),
        }
        Ok(())
    }
}

fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .format_target(true)
        .init();
}

fn report<T>(result: Result<T, mafia_engine::GameError>) {
    if let Err(e) = result {
        println!("error: {e}");
    }
}

async fn dispatch(state: &AppState, line: &str) {
    let mut parts = line.split_whitespace();
    let command = match parts.next() {
        Some(command) => command,
        None => return,
    };
    match command {
        "help" => println!("{HELP}"),
        "join" => match (parts.next().and_then(|s| s.parse::<UserId>().ok()), parts.next()) {
            (Some(id), Some(name)) => {
                report(game_service::register(state.clone(), Some(id), name.to_string()).await)
            }
            _ => println!("usage: join <id> <name>"),
        },
        "bot" => match parts.next() {
            Some(name) => {
                report(game_service::register(state.clone(), None, name.to_string()).await)
            }
            None => println!("usage: bot <name>"),
        },
        "players" => {
            let roster = game_service::list_roster(state.clone()).await;
            if roster.is_empty() {
                println!("nobody has joined yet");
            } else {
                println!("{}", roster.join("\n"));
            }
        }
        "start_game" => report(game_service::start(state.clone()).await),
        "end_game" => game_service::end_game(state.clone()).await,
        "target" => match (parts.next().and_then(|s| s.parse::<UserId>().ok()), parts.next()) {
            (Some(id), Some(name)) => report(
                game_service::submit_night_action(state.clone(), id, name.to_string()).await,
            ),
            _ => println!("usage: target <id> <name>"),
        },
        "end_night" => match game_service::end_night(state.clone()).await {
            Ok(outcome) => println!("night resolved: {outcome:?}"),
            Err(e) => println!("error: {e}"),
        },
        "start_discussion" => report(discussion_service::start_discussion(state.clone()).await),
        "skip" => report(discussion_service::skip_discussion(state.clone()).await),
        "vote" => match (parts.next().and_then(|s| s.parse::<UserId>().ok()), parts.next()) {
            (Some(id), Some(name)) => {
                report(game_service::submit_vote(state.clone(), id, name.to_string()).await)
            }
            _ => println!("usage: vote <id> <name>"),
        },
        "end_day" => match game_service::end_day(state.clone()).await {
            Ok(outcome) => println!("day resolved: {outcome:?}"),
            Err(e) => println!("error: {e}"),
        },
        _ => println!("unknown command (try: help)"),
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logger();

    let state = AppState::new(Arc::new(ConsoleNotifier), GameConfig::from_env());
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim() == "quit" {
            break;
        }
        dispatch(&state, &line).await;
    }
}
