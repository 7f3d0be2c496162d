use std::io;
use std::path;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use dialoguer::Input;
use dialoguer::Password;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Author;
use crate::domain::models::Conversation;
use crate::domain::services::actions::help_text;
use crate::domain::services::CredentialStore;
use crate::domain::services::Themes;
use crate::infrastructure::api::types::ProfileUpdate;
use crate::infrastructure::api::types::RegisterRequest;
use crate::infrastructure::api::ApiClient;
use crate::infrastructure::api::ApiError;
use crate::infrastructure::api::AuthApi;
use crate::infrastructure::api::ChatApi;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

fn api_client() -> (Arc<CredentialStore>, ApiClient) {
    let store = Arc::new(CredentialStore::load(path::PathBuf::from(Config::get(
        ConfigKey::AuthFile,
    ))));
    let client = ApiClient::new(&Config::get(ConfigKey::ApiUrl), store.clone());

    return (store, client);
}

fn print_api_error(err: &ApiError) {
    match err {
        ApiError::Validation { detail, .. } => {
            eprintln!("{}", Paint::red(detail));
        }
        _ => {
            eprintln!("{}", Paint::red(err.to_string()));
        }
    }
}

fn format_conversation(idx: usize, conversation: &Conversation) -> String {
    let n = idx + 1;
    let mut res = format!(
        "- ({n}) {title}, {count} messages, updated {updated}",
        title = conversation.display_title(),
        count = conversation.message_count,
        updated = conversation.updated_at,
    );

    if let Some(preview) = &conversation.latest_message {
        let mut line = preview.content.split('\n').collect::<Vec<_>>()[0].to_string();
        if line.len() >= 70 {
            line = format!("{}...", &line[..67]);
        }
        res = format!("{res}, {line}");
    }

    return res;
}

async fn run_login() -> Result<()> {
    let (_store, client) = api_client();
    let auth = AuthApi::new(client);

    let username: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Username")
        .interact_text()?;
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Password")
        .interact()?;

    match auth.login(&username, &password).await {
        Ok(user) => {
            println!(
                "{}",
                Paint::green(format!(
                    "Login successful. Welcome back, {username}!",
                    username = user.username
                ))
            );
        }
        Err(err) => {
            print_api_error(&err);
        }
    }

    return Ok(());
}

async fn run_register() -> Result<()> {
    let (_store, client) = api_client();
    let auth = AuthApi::new(client);

    let theme = ColorfulTheme::default();
    let username: String = Input::with_theme(&theme)
        .with_prompt("Username")
        .interact_text()?;
    let email: String = Input::with_theme(&theme)
        .with_prompt("Email")
        .interact_text()?;
    let password = Password::with_theme(&theme)
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords don't match")
        .interact()?;
    let first_name: String = Input::with_theme(&theme)
        .with_prompt("First name")
        .allow_empty(true)
        .interact_text()?;
    let last_name: String = Input::with_theme(&theme)
        .with_prompt("Last name")
        .allow_empty(true)
        .interact_text()?;

    let req = RegisterRequest {
        username,
        email,
        password: password.clone(),
        password_confirm: password,
        first_name,
        last_name,
    };

    match auth.register(&req).await {
        Ok(user) => {
            println!(
                "{}",
                Paint::green(format!(
                    "Registration successful, {username}! Sign in with `talkflow login`.",
                    username = user.username
                ))
            );
        }
        Err(err) => {
            print_api_error(&err);
        }
    }

    return Ok(());
}

fn run_logout() {
    let (store, client) = api_client();
    if !store.is_authenticated() {
        println!("You are not signed in.");
        return;
    }

    AuthApi::new(client).logout();
    println!("Signed out. Your stored session has been removed.");
}

fn require_auth(store: &CredentialStore) -> Result<bool> {
    if store.is_authenticated() {
        return Ok(true);
    }

    println!(
        "{}",
        Paint::yellow("You are not signed in. Run `talkflow login` first.")
    );
    return Ok(false);
}

async fn run_profile(matches: &ArgMatches) -> Result<()> {
    let (store, client) = api_client();
    if !require_auth(&store)? {
        return Ok(());
    }
    let auth = AuthApi::new(client);

    let update = ProfileUpdate {
        email: matches.get_one::<String>("email").cloned(),
        first_name: matches.get_one::<String>("first-name").cloned(),
        last_name: matches.get_one::<String>("last-name").cloned(),
    };
    let has_update =
        update.email.is_some() || update.first_name.is_some() || update.last_name.is_some();

    let res = if has_update {
        auth.update_profile(&update).await
    } else {
        auth.profile().await
    };

    match res {
        Ok(user) => {
            println!("Username: {username}", username = user.username);
            println!("Email: {email}", email = user.email);
            if !user.first_name.is_empty() || !user.last_name.is_empty() {
                println!(
                    "Name: {first} {last}",
                    first = user.first_name,
                    last = user.last_name
                );
            }
        }
        Err(err) => {
            print_api_error(&err);
        }
    }

    return Ok(());
}

async fn print_conversations_list() -> Result<()> {
    let (store, client) = api_client();
    if !require_auth(&store)? {
        return Ok(());
    }

    let conversations = ChatApi::new(client).conversations().await?;
    if conversations.is_empty() {
        println!("There are no conversations yet. You should start your first one!");
        return Ok(());
    }

    let lines = conversations
        .iter()
        .enumerate()
        .map(|(idx, conversation)| {
            return format_conversation(idx, conversation);
        })
        .collect::<Vec<String>>();
    println!("{}", lines.join("\n"));

    return Ok(());
}

async fn run_conversations_delete(matches: &ArgMatches) -> Result<()> {
    let (store, client) = api_client();
    if !require_auth(&store)? {
        return Ok(());
    }

    let id = matches.get_one::<String>("conversation-id").unwrap();
    let confirmed = matches.get_flag("yes")
        || Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Delete this conversation?")
            .default(false)
            .interact()?;

    if !confirmed {
        return Ok(());
    }

    match ChatApi::new(client).delete_conversation(id).await {
        Ok(()) => {
            println!("Deleted conversation {id}");
        }
        Err(err) => {
            print_api_error(&err);
        }
    }

    return Ok(());
}

async fn print_history(matches: &ArgMatches) -> Result<()> {
    let (store, client) = api_client();
    if !require_auth(&store)? {
        return Ok(());
    }

    let id = matches.get_one::<String>("conversation-id").unwrap();
    let messages = ChatApi::new(client).history(id).await?;
    for message in messages {
        let role = match message.author {
            Author::User => "User",
            _ => "Assistant",
        };
        println!("**{role}:** {text}\n", text = message.text);
    }

    return Ok(());
}

async fn print_stats() -> Result<()> {
    let (store, client) = api_client();
    if !require_auth(&store)? {
        return Ok(());
    }

    match ChatApi::new(client).stats().await {
        Ok(stats) => {
            println!("Usage for {username}:", username = stats.username);
            println!("- Messages sent: {n}", n = stats.total_messages);
            println!("- Tokens used: {n}", n = stats.total_tokens);
            if let Some(last_request_at) = stats.last_request_at {
                println!("- Last request: {last_request_at}");
            }
        }
        Err(err) => {
            print_api_error(&err);
        }
    }

    return Ok(());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if !config_file_path.parent().unwrap().exists() {
        fs::create_dir_all(config_file_path.parent().unwrap()).await?;
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    let config_path_display = config_file_path.as_os_str().to_str().unwrap();
    println!("Created default config file at {config_path_display}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(clap::ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_login() -> Command {
    return Command::new("login")
        .about("Sign in to the TalkFlow API and store the session locally. Prompts for your credentials.");
}

fn subcommand_profile() -> Command {
    return Command::new("profile")
        .about("Show your profile, or update it when any flag is passed.")
        .arg(
            clap::Arg::new("email")
                .long("email")
                .help("New email address.")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("first-name")
                .long("first-name")
                .help("New first name.")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("last-name")
                .long("last-name")
                .help("New last name.")
                .num_args(1),
        );
}

fn subcommand_conversations() -> Command {
    return Command::new("conversations")
        .about("Manage your conversations.")
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List all conversations with their numbers and titles."))
        .subcommand(
            Command::new("history")
                .about("Print the full message history of a conversation as Markdown.")
                .arg(
                    clap::Arg::new("conversation-id")
                        .short('i')
                        .long("id")
                        .help("Conversation ID")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a conversation.")
                .arg(
                    clap::Arg::new("conversation-id")
                        .short('i')
                        .long("id")
                        .help("Conversation ID")
                        .required(true),
                )
                .arg(
                    clap::Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .help("Skip the confirmation prompt.")
                        .action(clap::ArgAction::SetTrue),
                ),
        );
}

fn subcommand_chat() -> Command {
    return Command::new("chat").about("Start the chat screen. This is the default when no subcommand is passed.");
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") || line.starts_with("HOTKEYS:") {
                return Paint::new(format!("CHAT {line}")).underline().bold().to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    let themes = Themes::list();

    return Command::new("talkflow")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_conversations())
        .subcommand(subcommand_login())
        .subcommand(Command::new("logout").about("Sign out and remove the stored session."))
        .subcommand(subcommand_profile())
        .subcommand(Command::new("register").about("Create a new TalkFlow account."))
        .subcommand(Command::new("stats").about("Show your usage statistics."))
        .arg(
            Arg::new(ConfigKey::ApiUrl.to_string())
                .short('a')
                .long(ConfigKey::ApiUrl.to_string())
                .env("TALKFLOW_API_URL")
                .num_args(1)
                .help(format!(
                    "Base URL of the TalkFlow API. [default: {}]",
                    Config::default(ConfigKey::ApiUrl)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::AuthFile.to_string())
                .long(ConfigKey::AuthFile.to_string())
                .env("TALKFLOW_AUTH_FILE")
                .num_args(1)
                .help(format!(
                    "Path where the signed-in session (tokens and profile) is stored. [default: {}]",
                    Config::default(ConfigKey::AuthFile)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("TALKFLOW_CONFIG_FILE")
                .num_args(1)
                .help(format!(
                    "Path to configuration file [default: {}]",
                    Config::default(ConfigKey::ConfigFile)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Theme.to_string())
                .short('t')
                .long(ConfigKey::Theme.to_string())
                .env("TALKFLOW_THEME")
                .num_args(1)
                .help(format!(
                    "Sets code syntax highlighting theme. [default: {}]",
                    Config::default(ConfigKey::Theme)
                ))
                .value_parser(PossibleValuesParser::new(themes))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ThemeFile.to_string())
                .long(ConfigKey::ThemeFile.to_string())
                .env("TALKFLOW_THEME_FILE")
                .num_args(1)
                .help("Absolute path to a TextMate tmTheme to use for code syntax highlighting.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Username.to_string())
                .long(ConfigKey::Username.to_string())
                .env("TALKFLOW_USERNAME")
                .num_args(1)
                .help("Your user name displayed in your chat bubbles.")
                .global(true),
        );
}

/// Handles every subcommand that completes on its own. Returns true when the
/// chat screen should start.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(false);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("login", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            run_login().await?;
            return Ok(false);
        }
        Some(("register", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            run_register().await?;
            return Ok(false);
        }
        Some(("logout", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            run_logout();
            return Ok(false);
        }
        Some(("profile", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            run_profile(subcmd_matches).await?;
            return Ok(false);
        }
        Some(("stats", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            print_stats().await?;
            return Ok(false);
        }
        Some(("conversations", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            match subcmd_matches.subcommand() {
                Some(("list", _)) => {
                    print_conversations_list().await?;
                }
                Some(("history", history_matches)) => {
                    print_history(history_matches).await?;
                }
                Some(("delete", delete_matches)) => {
                    run_conversations_delete(delete_matches).await?;
                }
                _ => {
                    subcommand_conversations().print_long_help()?;
                }
            }
            return Ok(false);
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    // Chat path. The TUI is useless without a session, so gate it here with
    // a friendly pointer instead of a hard error.
    let (store, _client) = api_client();
    if !store.is_authenticated() {
        println!(
            "{}",
            Paint::yellow("You are not signed in. Run `talkflow login` first.")
        );
        return Ok(false);
    }

    // An explicit --username wins; otherwise the signed-in profile does.
    if Config::get(ConfigKey::Username) == Config::default(ConfigKey::Username) {
        if let Some(user) = store.user() {
            Config::set(ConfigKey::Username, &user.username);
        }
    }

    return Ok(true);
}
