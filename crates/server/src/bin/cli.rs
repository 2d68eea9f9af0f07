use blog_core::{
    client::RpcStore,
    config::BlogConfig,
    controller::{PostViewController, ViewError},
    draft::Draft,
    post::{PostId, PostType},
    BlogError, BlogResult,
};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::io::{Read, Write};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about=None)]
struct Cli {
    #[arg(short, long, value_name = "FILE")]
    /// Path to config file; defaults to ~/.blog/blog.toml
    config: Option<PathBuf>,

    #[arg(short, long)]
    /// The socket address of the post store. For ex, localhost:8080
    socket_addr: Option<SocketAddr>,

    #[arg(short, long, action = ArgAction::SetTrue)]
    /// Select if the output should be json
    json: bool,

    #[command(subcommand)]
    command: BlogCommand,
}

#[derive(Subcommand, Clone, Debug)]
pub enum BlogCommand {
    /// Lists every post, in store order
    List,

    /// Creates a new post; prompts for a missing title or content
    New {
        #[command(flatten)]
        fields: PostFields,
    },

    /// Edits the post with the given id; unset flags keep current values
    Edit {
        id: PostId,
        #[command(flatten)]
        fields: PostFields,
    },

    /// Writes the effective settings, including --socket-addr, to the config file
    Config,
}

#[derive(Args, Clone, Debug, Default)]
pub struct PostFields {
    #[arg(long, value_name = "standard|video")]
    post_type: Option<PostType>,
    #[arg(short, long)]
    title: Option<String>,
    #[arg(short = 'm', long)]
    content: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
    #[arg(long)]
    video_url: Option<String>,
}

impl PostFields {
    /// Overwrite the draft with every flag that was given.
    fn apply(self, draft: &mut Draft) {
        if let Some(post_type) = self.post_type {
            draft.post_type = post_type;
        }
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(content) = self.content {
            draft.content = content;
        }
        if let Some(image_url) = self.image_url {
            draft.image_url = image_url;
        }
        if let Some(video_url) = self.video_url {
            draft.video_url = video_url;
        }
    }
}

fn prompt_title() -> BlogResult<String> {
    print!("Enter post title: ");
    std::io::stdout().flush()?;
    let mut buf = String::new();
    std::io::stdin().read_line(&mut buf)?;
    Ok(buf.trim().into())
}

fn prompt_content() -> BlogResult<String> {
    println!("Enter post content(Press Ctrl-d on new line to end): ");
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf.trim().into())
}

fn print_posts(controller: &PostViewController<RpcStore>, json: bool) -> BlogResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(controller.posts())?);
    } else if controller.posts().is_empty() {
        println!("No posts yet.");
    } else {
        for post in controller.posts() {
            println!("{}", post);
        }
    }
    Ok(())
}

/// Submit the open draft and explain any failure field by field.
async fn submit(controller: &mut PostViewController<RpcStore>, json: bool) -> BlogResult<()> {
    match controller.submit().await {
        Ok(id) => {
            println!("Saved post #{id}");
            print_posts(controller, json)
        }
        Err(ViewError::Invalid(errors)) => {
            for (field, msg) in errors.iter() {
                eprintln!("{field}: {msg}");
            }
            Err(BlogError::custom_error("The post was not sent".into()).into())
        }
        Err(err) => Err(err.into()),
    }
}

async fn new_post(
    controller: &mut PostViewController<RpcStore>,
    mut fields: PostFields,
    json: bool,
) -> BlogResult<()> {
    if fields.title.is_none() {
        fields.title = Some(prompt_title()?);
    }
    if fields.content.is_none() {
        fields.content = Some(prompt_content()?);
    }

    controller.open_create()?;
    if let Some(draft) = controller.draft_mut() {
        fields.apply(draft);
    }
    submit(controller, json).await
}

async fn edit_post(
    controller: &mut PostViewController<RpcStore>,
    id: PostId,
    fields: PostFields,
    json: bool,
) -> BlogResult<()> {
    controller.load_all().await?;
    controller.open_edit(id)?;
    if let Some(draft) = controller.draft_mut() {
        fields.apply(draft);
    }
    submit(controller, json).await
}

async fn run(cli: Cli) -> BlogResult<()> {
    let config = BlogConfig::load(cli.config.as_deref())?;
    server::init_tracing(&config.log_filter);

    let socket = cli.socket_addr.unwrap_or(config.socket);
    let mut controller = PostViewController::from_config(RpcStore::new(socket), &config);

    match cli.command {
        BlogCommand::List => {
            controller.load_all().await?;
            print_posts(&controller, cli.json)
        }
        BlogCommand::New { fields } => new_post(&mut controller, fields, cli.json).await,
        BlogCommand::Edit { id, fields } => edit_post(&mut controller, id, fields, cli.json).await,
        BlogCommand::Config => save_config(BlogConfig { socket, ..config }, cli.config),
    }
}

fn save_config(config: BlogConfig, path: Option<PathBuf>) -> BlogResult<()> {
    let path = match path {
        Some(path) => path,
        None => BlogConfig::default_path()?,
    };
    config.save(&path)?;
    println!("Wrote config to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn config_command_persists_socket_override() {
        let dir = std::env::temp_dir().join(format!("blog-cli-{}", std::process::id()));
        let path = dir.join("blog.toml");
        let cli = Cli::parse_from([
            "cli",
            "--config",
            path.to_str().unwrap(),
            "--socket-addr",
            "10.0.0.3:9100",
            "config",
        ]);
        run(cli).await.unwrap();

        let saved = BlogConfig::load(Some(&path)).unwrap();
        assert_eq!(saved.socket, "10.0.0.3:9100".parse::<SocketAddr>().unwrap());
        assert_eq!(saved.request_timeout_ms, BlogConfig::default().request_timeout_ms);

        std::fs::remove_dir_all(dir).expect("Config cleanup failed");
    }
}
