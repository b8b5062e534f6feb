use clap::{Parser, Subcommand};
use folio::auth::{Authenticator, Session, SessionFile};
use folio::cache::CaptionCache;
use folio::caption::{Captioner, DisabledCaptioner, GeminiCaptioner};
use folio::config::{self, FolioConfig};
use folio::credentials::{caption_key_chain, passcode_chain, remote_token_chain};
use folio::gallery::{Key, Showcase, Viewport};
use folio::remote::{GitHubHost, RemoteConfig, RemoteHost};
use folio::store::{self, CollectionKeys, FileStore};
use folio::studio::{DeleteOutcome, Move, Studio};
use folio::types::{Collection, Direction, Photo, Portfolio};
use folio::upload::{self, Uploader};
use folio::{generate, output};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

type CliResult<T> = Result<T, Box<dyn Error>>;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

/// Which studio collection a command targets.
#[derive(clap::Args, Clone, Copy)]
struct TabArgs {
    /// Target the showcase heroes instead of the full archive
    #[arg(long)]
    heroes: bool,
}

impl TabArgs {
    fn collection(self) -> Collection {
        if self.heroes {
            Collection::Heroes
        } else {
            Collection::Gallery
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Photography portfolio: public showcase and owner studio")]
#[command(long_about = "\
Photography portfolio: public showcase and owner studio

The showcase groups published photos by category, opens with a curated
overview of hero shots, and shows one photo at a time in a cyclic lightbox.
The studio, behind a passcode, lets the owner curate both collections and
upload new work with machine-written captions.

Project layout:

  <root>/
  ├── config.toml          # Site, studio, storage, caption and color settings
  ├── about.md             # Optional markdown for the about page
  ├── snapshot.json        # Optional published {photos, homeHeroes} snapshot
  └── .folio/              # Local state
      ├── gallery.json     # Full archive
      ├── heroes.json      # Showcase heroes
      ├── remote.json      # Remote image host coordinates
      ├── session.json     # Studio session (login / logout)
      └── .caption-cache.json

Studio commands (list, add, upload, publish, move, category, layout,
details, delete, export, remote) need `folio login` first. Login reads the
passcode from $FOLIO_PASSCODE when set and prompts otherwise.

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project root (holds config.toml)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Output directory for the static site
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the public site (showcase, lightbox pages, about, contact)
    Build,
    /// Walk through the showcase in the terminal
    Browse,
    /// List a studio collection
    List(TabArgs),
    /// Open a studio session (reads $FOLIO_PASSCODE, else prompts)
    Login,
    /// End the studio session
    Logout,
    /// Add a photo by URL
    Add {
        url: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Add unpublished
        #[arg(long)]
        draft: bool,
        #[command(flatten)]
        tab: TabArgs,
    },
    /// Caption and add image files (directories are walked)
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Add unpublished regardless of config
        #[arg(long)]
        draft: bool,
        /// Ignore the caption cache
        #[arg(long)]
        no_cache: bool,
        #[command(flatten)]
        tab: TabArgs,
    },
    /// Toggle a photo between published and draft
    Publish {
        id: String,
        #[command(flatten)]
        tab: TabArgs,
    },
    /// Move a photo one slot up or down
    Move {
        id: String,
        #[arg(value_enum)]
        direction: MoveArg,
        #[command(flatten)]
        tab: TabArgs,
    },
    /// Change a photo's category
    Category {
        id: String,
        category: String,
        #[command(flatten)]
        tab: TabArgs,
    },
    /// Step a photo's layout: classic → editorial → wide
    Layout {
        id: String,
        #[command(flatten)]
        tab: TabArgs,
    },
    /// Edit a photo's title or description
    Details {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        tab: TabArgs,
    },
    /// Delete a photo
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        #[command(flatten)]
        tab: TabArgs,
    },
    /// Write folio-backup.json with both collections
    Export {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Manage the remote image host
    #[command(subcommand)]
    Remote(RemoteCommand),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum MoveArg {
    Up,
    Down,
}

#[derive(Subcommand)]
enum RemoteCommand {
    /// Store GitHub repository coordinates for uploads
    Set {
        /// owner/name
        repo: String,
        #[arg(long, default_value = "images")]
        path: String,
        #[arg(long, default_value = "main")]
        branch: String,
        /// Access token (falls back to $GITHUB_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },
    /// Show the stored coordinates
    Show,
    /// Forget the stored coordinates
    Clear,
}

/// Resolved root and config shared by every command.
struct Context {
    root: PathBuf,
    config: FolioConfig,
}

impl Context {
    fn state_dir(&self) -> PathBuf {
        self.config.state_path(&self.root)
    }

    fn keys(&self) -> CollectionKeys {
        CollectionKeys::from_config(&self.config.storage)
    }

    fn snapshot(&self) -> Option<Portfolio> {
        store::load_snapshot(&self.config.snapshot_path(&self.root))
    }

    fn session(&self) -> CliResult<Session> {
        Ok(SessionFile::new(&self.state_dir()).require()?)
    }

    /// Public view of the portfolio: snapshot first.
    fn public_portfolio(&self) -> Portfolio {
        let store = FileStore::new(self.state_dir());
        store::hydrate_public(&store, &self.keys(), self.snapshot())
    }

    /// Open the studio on `tab` and run `f` against it.
    fn with_studio<T>(
        &self,
        tab: Collection,
        f: impl FnOnce(&mut Studio<'_>) -> CliResult<T>,
    ) -> CliResult<T> {
        let session = self.session()?;
        let mut store = FileStore::new(self.state_dir());
        let portfolio = store::hydrate_studio(&store, &self.keys(), self.snapshot());
        let mut studio = Studio::new(
            portfolio,
            &mut store,
            self.keys(),
            self.config.storage.remote_key.clone(),
            session,
        );
        studio.select_tab(tab);
        f(&mut studio)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Something went wrong: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> CliResult<()> {
    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let ctx = Context {
        config: config::load_config(&cli.root)?,
        root: cli.root,
    };

    match cli.command {
        // Printed before the config is loaded.
        Command::GenConfig => {}
        Command::Build => {
            let portfolio = ctx.public_portfolio();
            println!("==> Generating HTML \u{2192} {}", cli.output.display());
            let summary = generate::generate(&portfolio, &ctx.config, &ctx.root, &cli.output)?;
            output::print_generate_output(&summary);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Browse => browse(&ctx.public_portfolio())?,
        Command::List(tab) => ctx.with_studio(tab.collection(), |studio| {
            output::print_collection(studio.active_tab(), studio.items());
            Ok(())
        })?,
        Command::Login => {
            let input = match passcode_chain().resolve() {
                Some(p) => p,
                None => prompt("Passcode: ")?,
            };
            let session = Authenticator::from_config(&ctx.config.studio).login(&input)?;
            SessionFile::new(&ctx.state_dir()).save(&session)?;
            println!(
                "Studio open until {}",
                session.expires_at.format("%Y-%m-%d %H:%M UTC")
            );
        }
        Command::Logout => {
            SessionFile::new(&ctx.state_dir()).clear()?;
            println!("Studio closed");
        }
        Command::Add {
            url,
            title,
            category,
            description,
            draft,
            tab,
        } => ctx.with_studio(tab.collection(), |studio| {
            let photo = Photo::new(url, title, category)
                .with_description(description)
                .published(!draft);
            let id = photo.id.clone();
            studio.add(photo)?;
            println!("Added {} to {}", id, studio.active_tab().label());
            Ok(())
        })?,
        Command::Upload {
            paths,
            draft,
            no_cache,
            tab,
        } => upload_files(&ctx, &paths, tab.collection(), !draft, no_cache)?,
        Command::Publish { id, tab } => ctx.with_studio(tab.collection(), |studio| {
            if studio.toggle_publish(&id)? {
                let published = studio.find(&id).is_some_and(|p| p.is_published);
                println!("{} is now {}", id, if published { "published" } else { "a draft" });
            } else {
                not_found(&id, studio);
            }
            Ok(())
        })?,
        Command::Move { id, direction, tab } => ctx.with_studio(tab.collection(), |studio| {
            let direction = match direction {
                MoveArg::Up => Move::Up,
                MoveArg::Down => Move::Down,
            };
            if studio.move_item(&id, direction)? {
                output::print_collection(studio.active_tab(), studio.items());
            } else if studio.find(&id).is_some() {
                println!("{} is already at the edge", id);
            } else {
                not_found(&id, studio);
            }
            Ok(())
        })?,
        Command::Category { id, category, tab } => ctx.with_studio(tab.collection(), |studio| {
            if studio.update_category(&id, &category)? {
                println!("{} \u{2192} {}", id, category.trim());
            } else {
                not_found(&id, studio);
            }
            Ok(())
        })?,
        Command::Layout { id, tab } => ctx.with_studio(tab.collection(), |studio| {
            match studio.toggle_layout(&id)? {
                Some(layout) => println!("{} \u{2192} {}", id, layout),
                None => not_found(&id, studio),
            }
            Ok(())
        })?,
        Command::Details {
            id,
            title,
            description,
            tab,
        } => ctx.with_studio(tab.collection(), |studio| {
            if studio.update_details(&id, title.as_deref(), description.as_deref())? {
                println!("Updated {}", id);
            } else {
                not_found(&id, studio);
            }
            Ok(())
        })?,
        Command::Delete { id, yes, tab } => ctx.with_studio(tab.collection(), |studio| {
            let outcome = studio.delete(&id, |photo| {
                yes || confirm(&format!("Delete '{}' from {}? [y/N] ", photo.title, tab.collection().label()))
            })?;
            match outcome {
                DeleteOutcome::Deleted(photo) => println!("Deleted '{}'", photo.title),
                DeleteOutcome::Declined => println!("Kept {}", id),
                DeleteOutcome::NotFound => not_found(&id, studio),
            }
            Ok(())
        })?,
        Command::Export { dir } => ctx.with_studio(Collection::Gallery, |studio| {
            let path = studio.export(&dir)?;
            println!("Exported \u{2192} {}", path.display());
            Ok(())
        })?,
        Command::Remote(cmd) => ctx.with_studio(Collection::Gallery, |studio| {
            match cmd {
                RemoteCommand::Set {
                    repo,
                    path,
                    branch,
                    token,
                } => {
                    let remote = RemoteConfig {
                        repo,
                        token: token.unwrap_or_default(),
                        path,
                        branch,
                    };
                    remote.validate()?;
                    studio.set_remote(&remote)?;
                    output::print_remote(Some(&remote));
                }
                RemoteCommand::Show => output::print_remote(studio.remote().as_ref()),
                RemoteCommand::Clear => {
                    studio.clear_remote()?;
                    output::print_remote(None);
                }
            }
            Ok(())
        })?,
    }

    Ok(())
}

fn upload_files(
    ctx: &Context,
    paths: &[PathBuf],
    collection: Collection,
    publish: bool,
    no_cache: bool,
) -> CliResult<()> {
    let files = upload::collect_inputs(paths)?;
    let state_dir = ctx.state_dir();
    let caption_config = &ctx.config.caption;

    let captioner: Box<dyn Captioner> = if caption_config.enabled {
        let key = caption_key_chain(caption_config, &state_dir).resolve();
        Box::new(GeminiCaptioner::new(caption_config, key))
    } else {
        Box::new(DisabledCaptioner)
    };
    let mut cache = if no_cache {
        CaptionCache::empty()
    } else {
        CaptionCache::load(&state_dir)
    };
    let publish = publish && ctx.config.studio.publish_uploads;

    ctx.with_studio(collection, |studio| {
        let host = studio.remote().and_then(|remote| {
            let token = remote_token_chain(remote.stored_token()).resolve();
            match GitHubHost::new(&remote, token, caption_config.timeout_secs) {
                Ok(host) => Some(host),
                Err(e) => {
                    log::warn!("remote host unavailable, images stay inline: {e}");
                    None
                }
            }
        });

        let (tx, rx) = std::sync::mpsc::channel();
        let printer = std::thread::spawn(move || {
            for event in rx {
                for line in output::format_upload_event(&event) {
                    println!("{}", line);
                }
            }
        });
        let mut uploader = Uploader {
            captioner: captioner.as_ref(),
            host: host.as_ref().map(|h| h as &dyn RemoteHost),
            cache: &mut cache,
            collection,
            publish,
        };
        let report = uploader.run(studio, &files, Some(tx));
        printer.join().map_err(|_| "progress printer panicked")?;
        output::print_upload_summary(&report?);
        Ok(())
    })?;

    if !no_cache {
        cache.save(&state_dir)?;
    }
    Ok(())
}

// ============================================================================
// browse
// ============================================================================

/// Terminal stand-in for the page viewport.
#[derive(Default)]
struct TerminalViewport {
    locked: bool,
}

impl Viewport for TerminalViewport {
    fn scroll_to(&mut self, anchor: &str) {
        log::debug!("scroll to #{anchor}");
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        if locked != self.locked {
            log::debug!("scroll {}", if locked { "locked" } else { "unlocked" });
        }
        self.locked = locked;
    }
}

const BROWSE_HELP: &str = "\
Commands:
  <n>            open tile n (overview: jump to its category)
  tab <name>     switch category tab
  ] / [          next / previous tab
  > / <          next / previous photo in the lightbox
  x              close the lightbox
  q              quit";

fn browse(portfolio: &Portfolio) -> CliResult<()> {
    let mut showcase = Showcase::mount(TerminalViewport::default());
    output::print_showcase(showcase.state(), portfolio);
    println!("\n{}", BROWSE_HELP);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        match line {
            "" => continue,
            "q" | "quit" => break,
            "?" | "help" => {
                println!("{}", BROWSE_HELP);
                continue;
            }
            "]" => showcase.cycle_category(portfolio, Direction::Next),
            "[" => showcase.cycle_category(portfolio, Direction::Prev),
            ">" => showcase.key(portfolio, Key::ArrowRight),
            "<" => showcase.key(portfolio, Key::ArrowLeft),
            "x" => showcase.key(portfolio, Key::Escape),
            _ => {
                if let Some(name) = line.strip_prefix("tab ") {
                    showcase.change_category(name.trim());
                } else if let Ok(n) = line.parse::<usize>() {
                    if n == 0 || showcase.click(portfolio, n - 1).is_none() {
                        println!("No tile {}", n);
                        continue;
                    }
                } else {
                    showcase.key(portfolio, Key::from_name(line));
                }
            }
        }
        showcase.current_photo(portfolio);
        println!();
        output::print_showcase(showcase.state(), portfolio);
    }
    Ok(())
}

// ============================================================================
// Prompts
// ============================================================================

fn prompt(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Yes/no question on stdin. Anything but `y`/`yes` declines.
fn confirm(message: &str) -> bool {
    prompt(message)
        .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
        .unwrap_or(false)
}

fn not_found(id: &str, studio: &Studio<'_>) {
    println!("No photo '{}' in {}", id, studio.active_tab().label());
}
