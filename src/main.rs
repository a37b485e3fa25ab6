use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use git_diffview::{Buffer, DiffView, GitRepo, Region, StringBuffer, ViewSettings};

#[derive(Parser)]
#[command(name = "git-diffview")]
#[command(about = "Render an interactive-style git diff view and stage hunks by offset")]
struct Cli {
    /// Repository path
    #[arg(short = 'C', long = "repo", default_value = ".")]
    repo: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rendered diff view
    Show {
        /// Show the staged (index) diff instead of the working tree
        #[arg(long)]
        cached: bool,
        /// Restrict the diff to one file
        #[arg(long)]
        file: Option<String>,
        /// Context lines around each hunk
        #[arg(long, default_value_t = 3)]
        context: u32,
    },
    /// Stage the hunks at the given view offsets
    Stage {
        /// Byte offsets into the rendered view (as printed by `show`)
        offsets: Vec<usize>,
        #[arg(long)]
        file: Option<String>,
        #[arg(long, default_value_t = 3)]
        context: u32,
    },
    /// Discard the hunks at the given view offsets
    Discard {
        /// Byte offsets into the rendered view (as printed by `show`)
        offsets: Vec<usize>,
        /// Operate on the staged diff (unstage instead of revert)
        #[arg(long)]
        cached: bool,
        #[arg(long)]
        file: Option<String>,
        #[arg(long, default_value_t = 3)]
        context: u32,
    },
    /// Generate shell completions
    Completions { shell: Shell },
    /// Generate the man page
    Man,
}

fn render(
    repo: &GitRepo<'_>,
    settings: ViewSettings,
) -> Result<(DiffView, StringBuffer), Box<dyn std::error::Error>> {
    let mut view = DiffView::new(settings);
    let mut buffer = StringBuffer::default();
    view.refresh(repo, &mut buffer)?;
    Ok((view, buffer))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let repo = GitRepo::new(&cli.repo);

    match cli.command {
        Commands::Show {
            cached,
            file,
            context,
        } => {
            let settings = ViewSettings {
                cached_mode: cached,
                context_lines: context,
                file_path: file,
                ..ViewSettings::default()
            };
            let (_view, buffer) = render(&repo, settings)?;
            print!("{}", buffer.text());
        }
        Commands::Stage {
            offsets,
            file,
            context,
        } => {
            let settings = ViewSettings {
                context_lines: context,
                file_path: file,
                ..ViewSettings::default()
            };
            let (mut view, mut buffer) = render(&repo, settings)?;
            buffer.set_selection(offsets.into_iter().map(Region::point).collect());
            view.stage_or_reset_hunks(&repo, &mut buffer, false)?;
        }
        Commands::Discard {
            offsets,
            cached,
            file,
            context,
        } => {
            let settings = ViewSettings {
                cached_mode: cached,
                context_lines: context,
                file_path: file,
                ..ViewSettings::default()
            };
            let (mut view, mut buffer) = render(&repo, settings)?;
            buffer.set_selection(offsets.into_iter().map(Region::point).collect());
            view.stage_or_reset_hunks(&repo, &mut buffer, true)?;
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "git-diffview", &mut std::io::stdout());
        }
        Commands::Man => {
            clap_mangen::Man::new(Cli::command()).render(&mut std::io::stdout())?;
        }
    }

    Ok(())
}
