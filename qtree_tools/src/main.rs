mod utils;

use std::{fs::File, io::BufWriter, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use image::ImageReader;
use log::info;
use qtree::{QTree, Raster, Settings};
use utils::{exists_decision, load_compressed, setup_logger, Assume};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Subcommands,

    /// Overwrite output files
    #[arg(short = 'n', long = "overwrite", conflicts_with = "assumeno")]
    assumeyes: bool,

    /// Do not overwrite output files
    #[arg(short = 'y', long = "preserve", conflicts_with = "assumeyes")]
    assumeno: bool,

    /// Print more information, repeat for even more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    /// Compress a raw image into a quadtree
    Compress(CompressArgs),

    /// Uncompress a quadtree back into a raw image
    Uncompress(UncompressArgs),

    /// Print the preorder tokens of a compressed image
    Show(ShowArgs),

    /// Convert an image of any type supported by `image` into a raw image
    Convert(ConvertArgs),

    /// Save a compressed image as an image of any type supported by `image`
    Export(ExportArgs),
}

#[derive(Debug, Args)]
struct CompressArgs {
    /// Input raw image, one intensity per line
    input: PathBuf,

    /// Output compressed image
    output: PathBuf,

    /// Write the binary container instead of text
    #[arg(short, long)]
    binary: bool,

    /// Build quadrants on multiple threads
    #[arg(short, long)]
    parallel: bool,
}

#[derive(Debug, Args)]
struct UncompressArgs {
    /// Input compressed image, text or binary
    input: PathBuf,

    /// Output raw image
    output: PathBuf,

    /// Ignore tokens past the end of the tree
    #[arg(long)]
    permissive: bool,
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Input compressed image, text or binary
    input: PathBuf,
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Input image file of any type supported by `image`
    input: PathBuf,

    /// Output raw image
    output: PathBuf,
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Input compressed image, text or binary
    input: PathBuf,

    /// Output image file, type picked by extension
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    setup_logger(args.verbose)?;

    let assume = if args.assumeyes {
        Some(Assume::Yes)
    } else if args.assumeno {
        Some(Assume::No)
    } else {
        None
    };

    match args.command {
        Subcommands::Compress(a) => compress(a, assume),
        Subcommands::Uncompress(a) => uncompress(a, assume),
        Subcommands::Show(a) => show(a),
        Subcommands::Convert(a) => convert(a, assume),
        Subcommands::Export(a) => export(a, assume),
    }
}

fn compress(args: CompressArgs, assume: Option<Assume>) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    if args.output.try_exists()?
        && !exists_decision("Output", "Overwrite", &args.output, assume)
    {
        return Ok(())
    }

    let settings = Settings {
        parallel: args.parallel,
        ..Default::default()
    };

    let mut tree = QTree::with_settings(settings);
    tree.open_raw(&args.input)
        .with_context(|| format!("Could not compress {:?}", args.input))?;

    if args.binary {
        let output = BufWriter::new(File::create(&args.output)?);
        let bytes = tree.encode_binary(output)?;
        info!("Wrote {bytes} bytes");
    } else {
        tree.save_compressed(&args.output)?;
    }

    println!("Image dimension: {0}×{0}", tree.dim());
    println!("Raw image size: {}", tree.raw_size());
    println!("Compressed image size: {}", tree.compressed_size());
    println!("Compression: {:.2}%", tree.compression_ratio() * 100.0);

    Ok(())
}

fn uncompress(args: UncompressArgs, assume: Option<Assume>) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    if args.output.try_exists()?
        && !exists_decision("Output", "Overwrite", &args.output, assume)
    {
        return Ok(())
    }

    let settings = Settings {
        strict: !args.permissive,
        ..Default::default()
    };

    let tree = load_compressed(&args.input, settings)?;
    tree.save_uncompressed(&args.output)?;

    println!("Uncompressing: {:?}", args.input);
    println!("{tree}");
    println!("Output file: {:?}", args.output);

    Ok(())
}

fn show(args: ShowArgs) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    let tree = load_compressed(&args.input, Settings::default())?;
    println!("{tree}");

    Ok(())
}

fn convert(args: ConvertArgs, assume: Option<Assume>) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    if args.output.try_exists()?
        && !exists_decision("Output", "Overwrite", &args.output, assume)
    {
        return Ok(())
    }

    let image = ImageReader::open(&args.input)?
        .decode()?
        .into_luma8();

    if image.width() != image.height() {
        bail!("Image is {}×{}, it must be square", image.width(), image.height());
    }

    let raster = Raster::from_raw(image.into_raw())?;
    info!("Converted {0}×{0} image", raster.side());

    let output = BufWriter::new(File::create(&args.output)?);
    qtree::text::write_raw(&raster, output)?;

    Ok(())
}

fn export(args: ExportArgs, assume: Option<Assume>) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    if args.output.try_exists()?
        && !exists_decision("Output", "Overwrite", &args.output, assume)
    {
        return Ok(())
    }

    let tree = load_compressed(&args.input, Settings::default())?;
    let Some(raster) = tree.raster() else {
        bail!("{:?} did not contain an image", args.input);
    };

    let side = u32::try_from(raster.side())?;
    image::save_buffer(
        &args.output,
        raster.as_raw(),
        side,
        side,
        image::ColorType::L8,
    )?;

    Ok(())
}
