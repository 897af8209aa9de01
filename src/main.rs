use anyhow::Result;
use clap::Parser;
use todaydo_background::BackgroundProvider;
use todaydo_core::{App, AppConfig, AppError, SettingsPatch};
use todaydo_services::{
    format_date, format_time, Pomodoro, QuickNotes, QuoteBoard, QuoteBook, SearchPreference,
    TodoError, TodoList,
};
use todaydo_weather::WeatherProvider;
use tokio_util::sync::CancellationToken;

mod cli;

use cli::{Cli, Commands, NotesCommand, SettingsArgs, SettingsCommand, TodoCommand};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = todaydo_core::init() {
        eprintln!("Failed to initialize logging: {:#}", e);
    }

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<AppError>() {
            Some(app_err) => {
                tracing::debug!("{:?}", app_err);
                eprintln!("{}", app_err.user_message());
            }
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let app = match &cli.config {
        Some(path) => App::with_config(AppConfig::load_validated_from(path)?.0)?,
        None => App::new()?,
    };
    tracing::debug!("Today Do started");

    match cli.command {
        Commands::Weather { refresh, location } => weather(&app, refresh, location, cli.json).await,
        Commands::Background { refresh } => background(&app, refresh, cli.json).await,
        Commands::Settings(cmd) => settings(&app, cmd, cli.json),
        Commands::Todo(cmd) => todo(&app, cmd, cli.json),
        Commands::Search {
            query,
            engine,
            save,
            next,
        } => search(&app, &query.join(" "), engine, save, next),
        Commands::Clock => clock(&app),
        Commands::Quote { random } => quote(random),
        Commands::Notes(cmd) => notes(&app, cmd),
        Commands::Pomodoro => pomodoro().await,
    }
}

async fn weather(app: &App, refresh: bool, location: Option<String>, json: bool) -> Result<()> {
    let provider = WeatherProvider::from_app(app);
    let lang = app.settings().get().language;
    let service_err = |e: todaydo_weather::WeatherError| AppError::Service(e.user_message(lang));

    if let Some(location) = location {
        provider.update_location(&location).map_err(service_err)?;
    }

    let result = if refresh {
        provider.refresh().await
    } else {
        provider.load().await
    };
    let weather = result.map_err(service_err)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&weather)?);
    } else {
        println!("{}  {}°C  {}", weather.location, weather.temp, weather.condition);
        println!("Humidity {}%  Wind {} m/s", weather.humidity, weather.wind_speed);
    }
    Ok(())
}

async fn background(app: &App, refresh: bool, json: bool) -> Result<()> {
    let provider = BackgroundProvider::from_app(app);
    let background = if refresh {
        provider.refresh().await
    } else {
        provider.load().await
    };

    match background {
        Some(bg) if json => println!("{}", serde_json::to_string_pretty(&bg)?),
        Some(bg) => {
            println!("{}", bg.url);
            println!("Photo by {} ({})", bg.photographer, bg.photographer_url);
        }
        None if json => println!("null"),
        None => println!("No background image. Set a Pexels API key with `today-do settings set --pexels-key`."),
    }
    Ok(())
}

/// Show only the last four characters of an API key.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.trim().chars().collect();
    match chars.len() {
        0 => "(not set)".to_string(),
        n if n <= 4 => "****".to_string(),
        n => format!("****{}", chars[n - 4..].iter().collect::<String>()),
    }
}

fn settings(app: &App, cmd: SettingsCommand, json: bool) -> Result<()> {
    let store = app.settings();
    let current = match cmd {
        SettingsCommand::Show => store.get(),
        SettingsCommand::Reset => store.reset().map_err(AppError::from)?,
        SettingsCommand::Set(args) => {
            let patch = settings_patch(args);
            if patch.is_empty() {
                anyhow::bail!("Nothing to change; see `today-do settings set --help`");
            }
            store.update(patch).map_err(AppError::from)?
        }
    };

    for warning in current.validate().warnings {
        tracing::warn!("{}", warning);
    }

    if json {
        let mut value = serde_json::to_value(&current)?;
        value["pexelsApiKey"] = mask(&current.pexels_api_key).into();
        value["qweatherApiKey"] = mask(&current.qweather_api_key).into();
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Pexels API key:   {}", mask(&current.pexels_api_key));
        println!("QWeather API key: {}", mask(&current.qweather_api_key));
        println!("QWeather host:    {}", current.qweather_host());
        println!("Language:         {}", current.language);
        println!(
            "Weather location: {}",
            current.weather_location().unwrap_or("(auto-detect)")
        );
    }
    Ok(())
}

fn settings_patch(args: SettingsArgs) -> SettingsPatch {
    SettingsPatch {
        pexels_api_key: args.pexels_key,
        qweather_api_key: args.qweather_key,
        qweather_api_host: args.qweather_host,
        language: args.language,
        weather_location: if args.auto_location {
            Some(None)
        } else {
            args.location.map(Some)
        },
        is_first_time: None,
    }
}

fn todo_err(e: TodoError) -> AppError {
    match e {
        TodoError::Store(e) => AppError::Store(e),
        other => AppError::Service(other.user_message().to_string()),
    }
}

fn todo(app: &App, cmd: TodoCommand, json: bool) -> Result<()> {
    let todos = TodoList::load(app.store().clone());

    match cmd {
        TodoCommand::List => {
            let sorted = todos.sorted();
            if json {
                println!("{}", serde_json::to_string_pretty(&sorted)?);
                return Ok(());
            }
            for todo in &sorted {
                let mark = if todo.completed { "x" } else { " " };
                println!("[{}] {:<6} {}  {}", mark, todo.priority.to_string(), todo.text, todo.id);
            }
            let stats = todos.stats();
            println!(
                "{} total, {} done, {} remaining",
                stats.total, stats.completed, stats.remaining
            );
        }
        TodoCommand::Add { text, priority } => {
            let todo = todos.add(&text.join(" "), priority).map_err(todo_err)?;
            println!("Added {}", todo.id);
        }
        TodoCommand::Done { id } => {
            let todo = todos.toggle(&id).map_err(todo_err)?;
            let state = if todo.completed { "done" } else { "not done" };
            println!("Marked \"{}\" {}", todo.text, state);
        }
        TodoCommand::Edit { id, text } => {
            let todo = todos.update_text(&id, &text.join(" ")).map_err(todo_err)?;
            println!("Updated \"{}\"", todo.text);
        }
        TodoCommand::Priority { id, priority } => {
            let todo = todos.update_priority(&id, priority).map_err(todo_err)?;
            println!("\"{}\" is now {}", todo.text, todo.priority);
        }
        TodoCommand::Rm { id } => {
            let todo = todos.delete(&id).map_err(todo_err)?;
            println!("Deleted \"{}\"", todo.text);
        }
        TodoCommand::Clear => {
            let removed = todos.clear_completed().map_err(todo_err)?;
            println!("Deleted {} completed todos", removed);
        }
    }
    Ok(())
}

fn search(
    app: &App,
    query: &str,
    engine: Option<todaydo_services::SearchEngine>,
    save: bool,
    next: bool,
) -> Result<()> {
    let preference = SearchPreference::new(app.store().clone());
    if let (Some(engine), true) = (engine, save) {
        preference.set_engine(engine).map_err(AppError::from)?;
    }
    if next {
        let engine = preference.cycle().map_err(AppError::from)?;
        tracing::info!("Default search engine is now {}", engine);
    }

    let engine = engine.unwrap_or_else(|| preference.engine());
    match engine.search_url(query) {
        Some(url) => println!("{}", url),
        None => anyhow::bail!("Search query is empty"),
    }
    Ok(())
}

fn clock(app: &App) -> Result<()> {
    let now = chrono::Local::now();
    println!("{}", format_time(&now));
    println!("{}", format_date(&now, app.settings().get().language));
    Ok(())
}

fn quote(random: bool) -> Result<()> {
    let board = QuoteBoard::new(QuoteBook::builtin());
    let quote = if random { board.shuffle() } else { board.current() };
    if let Some(quote) = quote {
        println!("\"{}\"", quote.text);
        println!("  - {}", quote.author);
    }
    Ok(())
}

fn notes(app: &App, cmd: NotesCommand) -> Result<()> {
    let notes = QuickNotes::load(app.store().clone());
    match cmd {
        NotesCommand::Show => println!("{}", notes.text()),
        NotesCommand::Set { text } => {
            notes.set(text.join(" "));
            notes.flush().map_err(AppError::from)?;
            if let Some(status) = notes.status().describe(chrono::Utc::now()) {
                println!("{}", status);
            }
        }
    }
    Ok(())
}

async fn pomodoro() -> Result<()> {
    let cancel = CancellationToken::new();
    let (tx, mut rx) = tokio::sync::mpsc::channel(8);
    let timer = tokio::spawn(Pomodoro::new().run(tx, cancel.clone()));

    println!("Focus for 25 minutes. Ctrl-C to stop.");
    let ctrl_c = {
        let stop = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.cancel();
            }
        })
    };

    while let Some(event) = rx.recv().await {
        println!("{}", event.message());
    }

    ctrl_c.abort();
    let timer = timer.await?;
    println!("{} sessions completed", timer.sessions());
    Ok(())
}
