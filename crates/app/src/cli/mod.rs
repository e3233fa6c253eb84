use clap::{Parser, Subcommand};

mod admin;
mod db;

#[derive(Debug, Parser)]
#[command(name = "umutoza-app", about = "Umutoza CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Admin(admin::AdminCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Admin(command) => admin::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}
