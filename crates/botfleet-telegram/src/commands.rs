//! Bot commands registered for every session.

use teloxide::utils::command::BotCommands;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start a conversation")]
    Start,

    #[command(description = "Show help message")]
    Help,
}
