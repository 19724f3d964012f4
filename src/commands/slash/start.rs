//! # Start Command
//!
//! Opens the main menu.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use serenity::builder::CreateApplicationCommand;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_start_command()]
}

fn create_start_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("start")
        .description("Open the airdrop keeper menu");
    command
}
