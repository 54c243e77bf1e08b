// ABOUTME: Interactive console front-end for the viewer
// ABOUTME: Prompts for the login form, then runs numbered query controls on a single thread

use std::io::{self, BufRead, IsTerminal, Write};

use crate::cli::Startup;
use crate::config::ConnectionProfile;
use crate::db::{Connector, PgConnector};
use crate::models::RowLimit;
use crate::viewer::{Action, Dialog, LoginForm, Outcome, Viewer};

const TITLE: &str = "IN450 Unit 3 Shermaine Kerford Database Viewer";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(Action),
    SetLimit(String),
    Show,
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" | "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        "s" | "show" => Command::Show,
        "l" | "limit" => Command::SetLimit(rest.to_string()),
        other => match other.parse::<usize>() {
            Ok(n) if (1..=Action::ALL.len()).contains(&n) => Command::Run(Action::ALL[n - 1]),
            _ => Command::Unknown(line.to_string()),
        },
    }
}

/// What the session ended with, for the caller to persist
#[derive(Debug, Default)]
pub struct ConsoleReport {
    /// Profile that logged in, if any
    pub profile: Option<ConnectionProfile>,
    /// Last row limit that parsed cleanly
    pub row_limit: Option<RowLimit>,
}

/// Line-oriented front-end over any reader and writer
pub struct Console<C: Connector, R, W> {
    viewer: Viewer<C>,
    defaults: LoginForm,
    limit: String,
    mask_password: bool,
    input: R,
    output: W,
}

impl<C: Connector, R: BufRead, W: Write> Console<C, R, W> {
    pub fn new(connector: C, defaults: LoginForm, limit: RowLimit, input: R, output: W) -> Self {
        Self {
            viewer: Viewer::new(connector),
            defaults,
            limit: limit.to_string(),
            mask_password: false,
            input,
            output,
        }
    }

    /// Read the password from the terminal without echo instead of from `input`
    pub fn masked_password(mut self, mask: bool) -> Self {
        self.mask_password = mask;
        self
    }

    /// Run until the user quits or input ends. The session is always
    /// released before returning, even when terminal I/O failed.
    pub async fn run(mut self) -> io::Result<ConsoleReport> {
        let result = self.interact().await;

        let mut report = ConsoleReport {
            profile: self.viewer.profile().cloned(),
            row_limit: RowLimit::parse(&self.limit).ok(),
        };
        if let Some(profile) = report.profile.as_mut() {
            profile.password.clear();
        }

        if let Err(e) = self.viewer.shutdown().await {
            log::warn!("Error while closing the connection: {}", e);
            let _ = writeln!(self.output, "Warning: {}", e);
        }
        let _ = writeln!(self.output, "Goodbye.");

        result.map(|()| report)
    }

    async fn interact(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", TITLE)?;

        while !self.viewer.is_logged_in() {
            writeln!(self.output, "\nDatabase Login")?;
            let Some(form) = self.read_login_form()? else {
                return Ok(());
            };
            let outcome = self.viewer.login(&form).await;
            self.show(&outcome)?;
        }

        self.print_menu()?;
        loop {
            let Some(line) = self.prompt("> ")? else {
                return Ok(());
            };
            match parse_command(&line) {
                Command::Run(action) => {
                    let outcome = self.viewer.perform(action, &self.limit).await;
                    self.show(&outcome)?;
                }
                Command::SetLimit(text) => {
                    writeln!(self.output, "Row limit set to '{}'", text)?;
                    self.limit = text;
                }
                Command::Show => {
                    let text = self.viewer.display().text().to_string();
                    write!(self.output, "\n{}", text)?;
                }
                Command::Help => self.print_menu()?,
                Command::Quit => return Ok(()),
                Command::Unknown(text) => {
                    writeln!(self.output, "Unknown command '{}', type h for help", text)?;
                }
            }
        }
    }

    fn read_login_form(&mut self) -> io::Result<Option<LoginForm>> {
        let defaults = self.defaults.clone();

        let Some(host) = self.ask("Server (host)", &defaults.host)? else {
            return Ok(None);
        };
        let Some(port) = self.ask("Port", &defaults.port)? else {
            return Ok(None);
        };
        let Some(database) = self.ask("Database", &defaults.database)? else {
            return Ok(None);
        };
        let Some(username) = self.ask("User", &defaults.username)? else {
            return Ok(None);
        };

        let password = if defaults.password.is_empty() {
            self.read_password("Password: ")?
        } else {
            self.read_password("Password [from environment]: ")?
                .map(|p| if p.is_empty() { defaults.password.clone() } else { p })
        };
        let Some(password) = password else {
            return Ok(None);
        };

        Ok(Some(LoginForm {
            host,
            port,
            database,
            username,
            password,
        }))
    }

    /// Prompt with a default that an empty answer keeps
    fn ask(&mut self, label: &str, default: &str) -> io::Result<Option<String>> {
        let prompt = if default.is_empty() {
            format!("{}: ", label)
        } else {
            format!("{} [{}]: ", label, default)
        };
        Ok(self.prompt(&prompt)?.map(|answer| {
            if answer.trim().is_empty() {
                default.to_string()
            } else {
                answer
            }
        }))
    }

    fn read_password(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if !self.mask_password {
            return self.prompt(prompt);
        }

        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        match rpassword::read_password() {
            Ok(password) => Ok(Some(password)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                writeln!(self.output)?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// One line of input without its line ending; `None` at end of input
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        for (i, action) in Action::ALL.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, action.label())?;
        }
        writeln!(
            self.output,
            "  l <n>) Row limit (now '{}')   s) Show last table   q) Quit",
            self.limit
        )?;
        Ok(())
    }

    fn show(&mut self, outcome: &Outcome) -> io::Result<()> {
        match outcome {
            Outcome::Rendered { text } => write!(self.output, "\n{}", text),
            Outcome::Dialog(dialog) => self.show_dialog(dialog),
        }
    }

    fn show_dialog(&mut self, dialog: &Dialog) -> io::Result<()> {
        let tag = if dialog.is_error() { "ERROR" } else { "INFO" };
        writeln!(self.output, "[{}] {}", tag, dialog.title)?;
        for line in dialog.message.lines() {
            writeln!(self.output, "    {}", line)?;
        }
        Ok(())
    }
}

/// Run the console on stdin/stdout. Database calls block this thread, so a
/// current-thread runtime is all that is needed.
pub fn run_stdio(mut startup: Startup) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let defaults = LoginForm::from_profile(&startup.profile);
    let stdin = io::stdin();
    let masked = stdin.is_terminal();
    let console = Console::new(
        PgConnector,
        defaults,
        startup.row_limit,
        stdin.lock(),
        io::stdout(),
    )
    .masked_password(masked);

    let report = runtime.block_on(console.run())?;
    if let Some(profile) = &report.profile {
        startup.remember(profile, report.row_limit.unwrap_or(startup.row_limit));
    }
    Ok(())
}
