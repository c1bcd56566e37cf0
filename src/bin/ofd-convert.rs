//! OFD Convert CLI tool
//!
//! A command-line tool for converting OFD documents to PDF or images.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process;

use ofd_convert::convert::{self, ImageOptions, OutputFormat};
use ofd_convert::model::Rgba;

/// OFD Convert - render OFD documents to PDF or raster images
#[derive(Parser)]
#[command(name = "ofd-convert")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Convert a document to PDF
    ofd-convert pdf input.ofd -o output.pdf

    # Render every page to PNG at 300 DPI
    ofd-convert image input.ofd -o pages/

    # Render page 3 only, as JPEG on white
    ofd-convert image input.ofd -o pages/ --page 3 --format jpeg --bg \"255 255 255\"

    # 256px thumbnails
    ofd-convert image input.ofd -o thumbs/ --thumbnail 256")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an OFD document to a single PDF
    Pdf {
        /// Input OFD file
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Render an OFD document to PNG or JPEG images
    Image {
        /// Input OFD file
        input: PathBuf,

        /// Output directory (one file per page)
        #[arg(short, long)]
        output: PathBuf,

        /// Render resolution in dots per inch
        #[arg(long, default_value_t = 300.0)]
        dpi: f64,

        /// Output format: png or jpeg
        #[arg(long, default_value = "png")]
        format: String,

        /// Page to render (one-based; 0 renders all pages)
        #[arg(long, default_value_t = 0)]
        page: usize,

        /// Longest thumbnail edge in pixels (0 disables thumbnailing)
        #[arg(long, default_value_t = 0)]
        thumbnail: u32,

        /// Background colour as "R G B" or "R G B A" (default transparent)
        #[arg(long)]
        bg: Option<String>,
    },
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Pdf { input, output } => {
            let mut out = fs::File::create(&output)?;
            convert::to_pdf(input, &mut out)?;
            println!("Wrote {}", output.display());
        }
        Commands::Image { input, output, dpi, format, page, thumbnail, bg } => {
            let format = match format.as_str() {
                "png" => OutputFormat::Png,
                "jpeg" | "jpg" => OutputFormat::Jpeg,
                other => anyhow::bail!("unknown format '{other}', expected png or jpeg"),
            };
            let bg_color = match bg {
                Some(spec) => Rgba::parse(&spec)?,
                None => Rgba::new(0, 0, 0, 0),
            };
            fs::create_dir_all(&output)?;

            let ext = if format == OutputFormat::Png { "png" } else { "jpg" };
            let dir = output.clone();
            let mut options = ImageOptions {
                dpi,
                format,
                bg_color,
                page,
                thumbnail,
                file_writer: None,
                image_writer: None,
            };
            if thumbnail > 0 {
                // Thumbnails are produced on the decoded-image path.
                options.image_writer = Some(Box::new(move |page_number, img| {
                    let path = dir.join(format!("page_{page_number}.{ext}"));
                    match format {
                        OutputFormat::Png => img.save_with_format(&path, image::ImageFormat::Png)?,
                        OutputFormat::Jpeg => {
                            image::DynamicImage::ImageRgba8(img)
                                .to_rgb8()
                                .save_with_format(&path, image::ImageFormat::Jpeg)?;
                        }
                    }
                    Ok(())
                }));
            } else {
                options.file_writer = Some(Box::new(move |page_number| {
                    let path = dir.join(format!("page_{page_number}.{ext}"));
                    let file = fs::File::create(path)?;
                    Ok(Box::new(file))
                }));
            }
            convert::to_images(input, options)?;
            println!("Wrote pages to {}", output.display());
        }
    }
    Ok(())
}
