use std::{
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use mask_overlay::{
    CpuOverlayBackend, OverlayOpts, OverlayPlan, Selector, Size, composite_over_image,
    host::memory::{MemoryHost, NodeId},
};

#[derive(Parser, Debug)]
#[command(name = "mask-overlay", version)]
struct Cli {
    /// JSON file with option overrides (markers, thresholds, style defaults).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a payload and print the masks and chosen source as JSON.
    Decode(DecodeArgs),
    /// Print the paint plan for an image box as JSON.
    Plan(PlanArgs),
    /// Draw the overlay over an image and write a PNG.
    Preview(PreviewArgs),
}

#[derive(Args, Debug)]
struct PayloadArgs {
    /// Structured payload JSON (the embedded script text).
    #[arg(long, conflicts_with = "payload_file")]
    payload: Option<String>,

    /// File holding the structured payload JSON.
    #[arg(long)]
    payload_file: Option<PathBuf>,

    /// Legacy base64 masks attribute.
    #[arg(long)]
    masks_b64: Option<String>,

    /// Legacy active attribute.
    #[arg(long)]
    active: Option<String>,
}

#[derive(Args, Debug)]
struct StyleArgs {
    /// Side mode attribute (`front` or anything else).
    #[arg(long)]
    side: Option<String>,

    /// Stroke color attribute.
    #[arg(long)]
    stroke: Option<String>,

    /// Active fill color attribute.
    #[arg(long)]
    fill_front: Option<String>,

    /// Other fill color attribute.
    #[arg(long)]
    fill_other: Option<String>,

    /// Outline width attribute.
    #[arg(long)]
    outline_px: Option<String>,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    #[command(flatten)]
    payload: PayloadArgs,
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Image box width in CSS pixels.
    #[arg(long)]
    width: f64,

    /// Image box height in CSS pixels.
    #[arg(long)]
    height: f64,

    /// Device pixel ratio.
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,

    #[command(flatten)]
    payload: PayloadArgs,

    #[command(flatten)]
    style: StyleArgs,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// Input image (PNG, JPEG, ...).
    #[arg(long)]
    image: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Device pixel ratio; the image is treated as `dpr` device pixels per CSS pixel.
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,

    #[command(flatten)]
    payload: PayloadArgs,

    #[command(flatten)]
    style: StyleArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let opts = match &cli.config {
        Some(path) => read_opts(path)?,
        None => OverlayOpts::default(),
    };

    match cli.cmd {
        Command::Decode(args) => cmd_decode(&opts, args),
        Command::Plan(args) => cmd_plan(&opts, args),
        Command::Preview(args) => cmd_preview(&opts, args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_opts(path: &Path) -> anyhow::Result<OverlayOpts> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    let opts = OverlayOpts::from_json_str(&text)
        .with_context(|| format!("load config '{}'", path.display()))?;
    Ok(opts)
}

/// A one-root page in memory, marked up the way card templates do it.
struct Page {
    host: Rc<MemoryHost>,
    root: NodeId,
}

fn build_page(
    opts: &OverlayOpts,
    payload: &PayloadArgs,
    style: Option<&StyleArgs>,
) -> anyhow::Result<Page> {
    let markers = &opts.markers;
    let host = Rc::new(MemoryHost::new());
    let root = host.append(host.body(), "div");
    host.set_attr(root, "id", &markers.root_id);

    let structured = match (&payload.payload, &payload.payload_file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("read payload '{}'", path.display()))?,
        ),
        (None, None) => None,
    };
    if let Some(text) = structured {
        let script = host.append(root, "script");
        host.add_class(script, &markers.payload_class);
        host.set_text(script, &text);
    }

    let mut attrs = vec![
        (&markers.masks_attr, payload.masks_b64.as_ref()),
        (&markers.active_attr, payload.active.as_ref()),
    ];
    if let Some(style) = style {
        attrs.extend([
            (&markers.side_attr, style.side.as_ref()),
            (&markers.stroke_attr, style.stroke.as_ref()),
            (&markers.fill_active_attr, style.fill_front.as_ref()),
            (&markers.fill_other_attr, style.fill_other.as_ref()),
            (&markers.outline_width_attr, style.outline_px.as_ref()),
        ]);
    }
    for (name, value) in attrs {
        if let Some(value) = value {
            host.set_attr(root, name, value);
        }
    }

    Ok(Page { host, root })
}

/// Run the overlay pipeline for an image box and return the plan it painted.
fn paint_page(
    opts: &OverlayOpts,
    page: &Page,
    css_box: Size,
    dpr: f64,
) -> anyhow::Result<OverlayPlan> {
    let img = page.host.append(page.root, "img");
    page.host.set_box(img, css_box.width, css_box.height);
    page.host.set_device_pixel_ratio(dpr);
    page.host.set_complete(img, true);

    mask_overlay::init_one(&page.host, &page.root, opts)?
        .context("overlay root is inert")?;

    let selector = Selector::tag_class("canvas", &opts.markers.surface_class);
    let surface = page
        .host
        .find_all(page.root, &selector)
        .into_iter()
        .next()
        .context("overlay surface missing")?;
    let state = page.host.canvas_state(surface).with_context(|| {
        format!(
            "image box {}x{} is below the layout threshold; nothing painted",
            css_box.width, css_box.height
        )
    })?;
    state
        .plans
        .last()
        .cloned()
        .context("overlay surface has no paints")
}

fn cmd_decode(opts: &OverlayOpts, args: DecodeArgs) -> anyhow::Result<()> {
    let page = build_page(opts, &args.payload, None)?;
    let resolved = mask_overlay::resolve_payload(page.host.as_ref(), &page.root, &opts.markers);
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

fn cmd_plan(opts: &OverlayOpts, args: PlanArgs) -> anyhow::Result<()> {
    let page = build_page(opts, &args.payload, Some(&args.style))?;
    let plan = paint_page(opts, &page, Size::new(args.width, args.height), args.dpr)?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn cmd_preview(opts: &OverlayOpts, args: PreviewArgs) -> anyhow::Result<()> {
    if !(args.dpr.is_finite() && args.dpr > 0.0) {
        anyhow::bail!("--dpr must be a positive number, got {}", args.dpr);
    }

    let base = image::open(&args.image)
        .with_context(|| format!("open image '{}'", args.image.display()))?
        .to_rgba8();
    let (width, height) = base.dimensions();

    let page = build_page(opts, &args.payload, Some(&args.style))?;
    let css_box = Size::new(f64::from(width) / args.dpr, f64::from(height) / args.dpr);
    let plan = paint_page(opts, &page, css_box, args.dpr)?;

    let mut backend = CpuOverlayBackend::new();
    let frame = backend.render_plan(&plan)?;
    if (frame.width, frame.height) != (width, height) {
        anyhow::bail!(
            "overlay is {}x{} but image is {width}x{height}; pick a --dpr that divides the image",
            frame.width,
            frame.height
        );
    }
    if backend.skipped_ops() > 0 {
        eprintln!(
            "warning: {} paint ops used colors the preview cannot parse",
            backend.skipped_ops()
        );
    }

    let mut data = base.into_raw();
    composite_over_image(&frame, &mut data)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &data,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
