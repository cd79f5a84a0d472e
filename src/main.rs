use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use rtnpx::editor::persist::{load_state, save_state};
use rtnpx::editor::Event;
use rtnpx::encoder::encode_grid;
use rtnpx::grid::Grid;
use rtnpx::{render, OutputFormat, RenderOptions, RenderRequest};

#[derive(Parser, Debug)]
#[command(name = "rtnpx")]
#[command(about = "Render pixel-art images from a compact URL-safe grid encoding", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an SVG document to stdout
    Render(ImageArgs),
    /// Render a PNG preview to stdout (axis labels are not drawn)
    Png {
        #[command(flatten)]
        image: ImageArgs,
        /// Preview canvas width
        #[arg(long, default_value_t = 1200)]
        canvas_width: u32,
        /// Preview canvas height
        #[arg(long, default_value_t = 630)]
        canvas_height: u32,
        /// Scale small images up to fill the canvas
        #[arg(long)]
        upscale: bool,
    },
    /// Render an HTML page embedding the SVG
    Html {
        #[command(flatten)]
        image: ImageArgs,
        /// Origin for the preview and edit links (e.g. https://example.com)
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Encode a dense grid (CSV on stdin, top row first) into data and palette query
    Encode {
        /// Palette slots in order, comma separated (slot 1 first)
        #[arg(long, value_delimiter = ',')]
        palette: Vec<String>,
    },
    /// Apply editor events to a saved session and print its share path
    Edit {
        /// Session file (JSON)
        #[arg(long)]
        state: PathBuf,
        /// Editor or render URL to import; skips the saved session
        #[arg(long)]
        import: Option<String>,
        /// Events: paint:ROW,COL resize:ROWS,COLS cell:W,H alpha:A color:TOKEN select:N clear import:URL
        events: Vec<Event>,
    },
}

#[derive(Args, Debug)]
struct ImageArgs {
    /// Orientation: r|right or b|bottom
    direction: String,
    /// Cell width
    width: String,
    /// Cell height
    height: String,
    /// Encoded grid data (e.g. '1-3_5.c2/_/2')
    data: String,
    /// Extra parameter as key=value (repeatable), e.g. -p pal_c2=ff0000 -p rows=a,b
    #[arg(short = 'p', long = "param")]
    params: Vec<String>,
    /// Extra parameters as a URL query string (e.g. 'alpha=0.5&gap=1,1')
    #[arg(short, long)]
    query: Option<String>,
}

impl ImageArgs {
    fn request(&self) -> Result<RenderRequest> {
        let mut pairs: Vec<(String, String)> = Vec::new();
        if let Some(query) = &self.query {
            let query = query.strip_prefix('?').unwrap_or(query);
            pairs.extend(url::form_urlencoded::parse(query.as_bytes()).into_owned());
        }
        for param in &self.params {
            let Some((key, value)) = param.split_once('=') else {
                bail!("parameter '{}' must be key=value", param);
            };
            pairs.push((key.to_string(), value.to_string()));
        }
        Ok(RenderRequest::from_path(
            &self.direction,
            &self.width,
            &self.height,
            &self.data,
            pairs,
        ))
    }
}

fn write_stdout(bytes: &[u8]) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(bytes)
        .context("Failed to write output to stdout")?;
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

fn run_render(image: &ImageArgs, options: RenderOptions) -> Result<()> {
    let request = image.request()?;
    let response = render(&request, &options);
    write_stdout(&response.body)?;
    if !response.is_success() {
        bail!("render failed with status {}", response.status);
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Render(image) => run_render(&image, RenderOptions::default()),
        Command::Png {
            image,
            canvas_width,
            canvas_height,
            upscale,
        } => run_render(
            &image,
            RenderOptions {
                width: canvas_width,
                height: canvas_height,
                format: OutputFormat::Png,
                upscale,
                ..RenderOptions::default()
            },
        ),
        Command::Html { image, base_url } => run_render(
            &image,
            RenderOptions {
                format: OutputFormat::Html,
                base_url,
                ..RenderOptions::default()
            },
        ),
        Command::Encode { palette } => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read grid CSV from stdin")?;
            let grid = Grid::from_csv(input.as_bytes()).context("Failed to parse grid CSV")?;
            let encoded = encode_grid(&grid, &palette);
            let line = if encoded.query.is_empty() {
                encoded.data
            } else {
                format!("{}?{}", encoded.data, encoded.query)
            };
            write_stdout(format!("{line}\n").as_bytes())
        }
        Command::Edit {
            state,
            import,
            events,
        } => {
            let mut session = load_state(&state, import.as_deref());
            for event in events {
                session.apply(event);
            }
            if let Err(err) = save_state(&session, &state) {
                warn!("{err:#}");
            }
            write_stdout(format!("{}\n", session.share_path()).as_bytes())
        }
    }
}
