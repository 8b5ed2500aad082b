mod cli;
mod config;
mod console;
mod menu;

use pgcrud::DatabaseManager;

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    match cli::parse_args(&args)? {
        cli::Command::Help => {
            cli::print_help();
            Ok(())
        }
        cli::Command::Run(args) => {
            let _ = dotenvy::dotenv();
            let settings = config::Settings::load(&args)?;

            let db = DatabaseManager::connect_with_credentials(
                &settings.database_url,
                settings.user.as_deref(),
                settings.password.as_deref(),
                settings.manager.clone(),
            )
            .await
            .map_err(|e| anyhow::anyhow!("cannot connect to the database: {e}"))?;

            let stdin = std::io::stdin();
            let io = console::Prompter::new(stdin.lock(), std::io::stdout());
            let result = menu::Menu::new(&db, io).run(settings.schema.as_deref()).await;
            db.close();
            result
        }
    }
}
