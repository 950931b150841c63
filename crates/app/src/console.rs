//! Line-oriented front end driving the shell, editor and browser.

use std::fmt::Write as _;

use thiserror::Error;

use shopkeep_auth::Credentials;
use shopkeep_core::{Entity, EntryId};

use crate::browser::CatalogBrowser;
use crate::editor::CatalogEditor;
use crate::shell::{AppShell, NavigationError, Screen};
use crate::state::{AppState, SharedStore};

pub const HELP: &str = "\
commands:
  login <email> <password>     sign in
  signup <email> <password>    create an account
  logout                       sign out
  go <home|manager|signup|login>
  back
  list                         show product cards
  search [text]                filter cards by title
  field <image|title|name|price> <value>
  edit <id>                    load an entry into the form
  save                         add or update from the form
  cancel                       clear the form
  delete <id>
  help
  quit";

pub const SIGNED_OUT_MESSAGE: &str = "Please log in first.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(Credentials),
    SignUp(Credentials),
    Logout,
    Go(Screen),
    Back,
    List,
    Search(String),
    Field(FormField, String),
    Edit(EntryId),
    Save,
    Cancel,
    Delete(EntryId),
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Image,
    Title,
    Name,
    Price,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl Command {
    /// Catalog commands are only accepted while signed in.
    pub fn requires_session(&self) -> bool {
        matches!(
            self,
            Command::List
                | Command::Search(_)
                | Command::Field(..)
                | Command::Edit(_)
                | Command::Save
                | Command::Cancel
                | Command::Delete(_)
        )
    }

    /// Screen a signed-out-only command belongs to; refused while signed in,
    /// same as navigating there.
    pub fn signed_out_screen(&self) -> Option<Screen> {
        match self {
            Command::Login(_) => Some(Screen::Login),
            Command::SignUp(_) => Some(Screen::SignUp),
            _ => None,
        }
    }

    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        match verb {
            "" => Err(ParseError::Empty),
            "login" | "signup" => {
                let [email, password] = args[..] else {
                    return Err(ParseError::Usage("login|signup <email> <password>"));
                };
                let credentials = Credentials::new(email, password);
                Ok(if verb == "login" {
                    Command::Login(credentials)
                } else {
                    Command::SignUp(credentials)
                })
            }
            "logout" => Ok(Command::Logout),
            "go" => match rest {
                "home" => Ok(Command::Go(Screen::Home)),
                "manager" => Ok(Command::Go(Screen::ProductManager)),
                "signup" => Ok(Command::Go(Screen::SignUp)),
                "login" => Ok(Command::Go(Screen::Login)),
                _ => Err(ParseError::Usage("go <home|manager|signup|login>")),
            },
            "back" => Ok(Command::Back),
            "list" => Ok(Command::List),
            "search" => Ok(Command::Search(rest.to_string())),
            "field" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let field = match field {
                    "image" => FormField::Image,
                    "title" => FormField::Title,
                    "name" => FormField::Name,
                    "price" => FormField::Price,
                    _ => return Err(ParseError::Usage("field <image|title|name|price> <value>")),
                };
                Ok(Command::Field(field, value.trim().to_string()))
            }
            "edit" | "delete" => {
                let id = EntryId::parse(rest).map_err(|_| ParseError::Usage("edit|delete <id>"))?;
                Ok(if verb == "edit" {
                    Command::Edit(id)
                } else {
                    Command::Delete(id)
                })
            }
            "save" => Ok(Command::Save),
            "cancel" => Ok(Command::Cancel),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}

/// Interactive session over one [`AppState`].
pub struct Console {
    shell: AppShell,
    editor: CatalogEditor<SharedStore>,
    browser: CatalogBrowser<SharedStore>,
}

impl Console {
    pub fn new(state: &AppState) -> Self {
        Self {
            shell: AppShell::new(state.session.clone()),
            editor: CatalogEditor::new(state.catalog.clone()),
            browser: CatalogBrowser::new(state.catalog.clone(), state.config.currency_symbol.clone()),
        }
    }

    pub fn screen(&self) -> Screen {
        self.shell.screen()
    }

    /// Run one command and return what to print.
    ///
    /// Rejected commands (bad credentials, invalid form, unknown id) are
    /// reported as text; only storage failures surface as errors.
    pub async fn execute(&mut self, command: Command) -> anyhow::Result<String> {
        if command.requires_session() && !self.shell.is_authenticated() {
            return Ok(SIGNED_OUT_MESSAGE.to_string());
        }
        if let Some(screen) = command.signed_out_screen() {
            if self.shell.is_authenticated() {
                return Ok(NavigationError::AlreadySignedIn(screen).to_string());
            }
        }
        let out = match command {
            Command::Login(credentials) => match self.shell.login(&credentials).await {
                Ok(_) => "Login Successful!".to_string(),
                Err(e) => e.to_string(),
            },
            Command::SignUp(credentials) => match self.shell.sign_up(&credentials).await {
                Ok(_) => "Account created.".to_string(),
                Err(e) => e.to_string(),
            },
            Command::Logout => {
                self.shell.logout().await?;
                self.editor.cancel();
                "Signed out.".to_string()
            }
            Command::Go(screen) => match self.shell.navigate(screen) {
                Ok(screen) => screen.title().to_string(),
                Err(e) => e.to_string(),
            },
            Command::Back => self.shell.back().title().to_string(),
            Command::List => self.render_cards(),
            Command::Search(text) => {
                self.browser.search(text);
                self.render_cards()
            }
            Command::Field(field, value) => {
                match field {
                    FormField::Image => self.editor.set_image(value),
                    FormField::Title => self.editor.set_title(value),
                    FormField::Name => self.editor.set_name(value),
                    FormField::Price => self.editor.set_price(value),
                }
                format!("{:?}", self.editor.form())
            }
            Command::Edit(id) => match self.editor.entries().into_iter().find(|e| e.has_id(&id)) {
                Some(entry) => {
                    self.editor.begin_edit(&entry);
                    self.editor.heading().to_string()
                }
                None => format!("no product with id {id}"),
            },
            Command::Save => match self.editor.submit().await {
                Ok(entry) => format!("saved {}", entry.title()),
                Err(e) if e.is_rejection() => e.to_string(),
                Err(e) => return Err(e.into()),
            },
            Command::Cancel => {
                self.editor.cancel();
                self.editor.heading().to_string()
            }
            Command::Delete(id) => match self.browser.delete(&id).await {
                Ok(entry) => format!("deleted {}", entry.title()),
                Err(e) if e.is_rejection() => e.to_string(),
                Err(e) => return Err(e.into()),
            },
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
        };
        Ok(out)
    }

    fn render_cards(&mut self) -> String {
        if let Some(message) = self.browser.empty_message() {
            return message.to_string();
        }
        let mut out = String::new();
        for card in self.browser.cards() {
            let _ = writeln!(
                out,
                "[{}] {} / {} / {} ({})",
                card.id, card.title, card.name, card.price_label, card.image_locator
            );
        }
        out.trim_end().to_string()
    }
}
