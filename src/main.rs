use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use tagship::changelog::Changelog;
use tagship::config::{self, Config};
use tagship::docker::{context, copy, Channel, ImageBuilder};
use tagship::domain::is_production_identifier;
use tagship::git::GitGateway;
use tagship::process::SystemRunner;
use tagship::release::ReleaseWorkflow;
use tagship::ui;
use tagship::version_file::write_version_file;

#[derive(clap::Parser)]
#[command(
    name = "tagship",
    version,
    about = "Release tags from the changelog and versioned docker images from git describe"
)]
struct Args {
    #[arg(short = 'C', long, global = true, default_value = ".", help = "Project directory")]
    project_dir: PathBuf,

    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the version derived from git describe
    PrintVersion,

    /// Write the version to the version file
    WriteVersion {
        #[arg(short, long, help = "Target file instead of the configured one")]
        file: Option<PathBuf>,
    },

    /// Tag HEAD with the latest changelog release and push the tag
    CreateTag,

    /// Check that a production tag exists locally and on the remote
    ValidateTag { name: String },

    /// Build and publish docker images
    #[command(subcommand)]
    Docker(DockerCommand),
}

#[derive(Subcommand)]
enum DockerCommand {
    /// Print the version tag of every stage
    PrintTag,

    /// Sync the build context directory
    Prepare,

    /// Build all stages for the local platforms
    Build,

    /// Push the version tags of all stages
    Push {
        #[arg(long, help = "Also push the dev tags, existing version tags are kept")]
        dev: bool,
    },

    /// Push the dev tags of all stages
    PushDev,

    /// Copy a path out of a built image
    Copy {
        /// Path inside the image
        src: String,
        /// Local destination
        dest: PathBuf,
        #[arg(long, default_value = "", help = "Stage whose image to copy from")]
        stage: String,
        #[arg(long, help = "Platform of the image to copy from")]
        platform: Option<String>,
    },
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let project_dir = args.project_dir;
    let config = config::load_config(&project_dir, args.config.as_deref())?;
    let gateway = GitGateway::open_with_remote(&project_dir, &config.git.remote)?;

    match args.command {
        Command::PrintVersion => {
            println!("{}", gateway.describe()?);
        }
        Command::WriteVersion { file } => {
            let version = gateway.describe()?;
            let path = match file {
                Some(file) => project_dir.join(file),
                None => config.version_file_path(&project_dir),
            };
            if write_version_file(&path, &version)? {
                ui::display_success(&format!("Wrote {} to {}", version, path.display()));
            } else {
                ui::display_status(&format!("{} is up to date", path.display()));
            }
        }
        Command::CreateTag => {
            let changelog = config.changelog_path(&project_dir);
            ui::display_status(&format!(
                "Releasing from {}",
                Changelog::locate(&changelog)?.path().display()
            ));
            let entry = ReleaseWorkflow::new(&gateway, changelog).run()?;
            ui::display_release(&entry, gateway.remote());
        }
        Command::ValidateTag { name } => {
            if !is_production_identifier(&name) {
                bail!("{} is not a production version tag", name);
            }
            gateway.validate_production_tag(&name)?;
            ui::display_success(&format!("Tag {} matches {}", name, gateway.remote()));
        }
        Command::Docker(command) => run_docker(command, &project_dir, &config, &gateway)?,
    }
    Ok(())
}

fn run_docker(
    command: DockerCommand,
    project_dir: &Path,
    config: &Config,
    gateway: &GitGateway,
) -> Result<()> {
    let docker_config = config.docker.clone();
    docker_config.validate()?;

    let context_dir = project_dir.join(&docker_config.context_dir);
    let prepare = || -> Result<()> {
        let files = context::prepare_context(
            project_dir,
            &docker_config.dockerfile,
            &docker_config.files,
            &docker_config.context_dir,
        )
        .context("preparing docker build context")?;
        ui::display_status(&format!(
            "Prepared {} ({} files)",
            context_dir.display(),
            files.len()
        ));
        Ok(())
    };

    let version = gateway.describe()?;
    let builder = ImageBuilder::new(docker_config.clone(), version, &context_dir, SystemRunner);

    match command {
        DockerCommand::PrintTag => ui::display_image_tags(&builder.version_tags()),
        DockerCommand::Prepare => prepare()?,
        DockerCommand::Build => {
            prepare()?;
            builder.build()?;
            ui::display_success(&format!("Built {}", builder.version_tags().join(", ")));
        }
        DockerCommand::Push { dev } => {
            prepare()?;
            builder.push(gateway, dev)?;
            if dev {
                builder.push_dev()?;
            }
            ui::display_success(&format!("Pushed {}", builder.version_tags().join(", ")));
        }
        DockerCommand::PushDev => {
            prepare()?;
            builder.push_dev()?;
            ui::display_success("Pushed dev tags");
        }
        DockerCommand::Copy {
            src,
            dest,
            stage,
            platform,
        } => {
            let image = builder.tag(&stage, Channel::Version(builder.version()));
            let dest = project_dir.join(dest);
            copy::copy_from_image(
                builder.runner(),
                project_dir,
                &image,
                &src,
                &dest,
                platform.as_deref(),
            )?;
            ui::display_success(&format!("Copied {} from {}", src, image));
        }
    }
    Ok(())
}
